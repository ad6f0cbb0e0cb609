mod config;
mod detail;
mod listing;
mod process;
mod progress;
mod report;
mod store;

use std::time::Instant;

use clap::{Parser, Subcommand};

use config::CrawlConfig;
use progress::{BarProgress, LogProgress};

#[derive(Parser)]
#[command(
    name = "steam_scraper",
    about = "Steam top-sellers scraper and price-efficiency analysis"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the top-sellers search pages into the raw listing CSV
    Crawl {
        /// Number of search pages to scrape
        #[arg(short = 'n', long, default_value = "10")]
        pages: u32,
    },
    /// Fetch storefront details for every appid in the listing CSV
    Fetch,
    /// Crawl + fetch in one pipeline
    Run {
        #[arg(short = 'n', long, default_value = "10")]
        pages: u32,
    },
    /// Merge and clean the raw CSVs into the processed dataset
    Process,
    /// Summary statistics and price-efficiency distribution
    Report,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Crawl { pages } => {
            run_crawl(pages).await?;
            Ok(())
        }
        Commands::Fetch => {
            let listings: Vec<listing::ListingRecord> = store::read_csv(store::LISTING_PATH)?;
            run_fetch(&listings).await
        }
        Commands::Run { pages } => {
            let listings = run_crawl(pages).await?;
            run_fetch(&listings).await
        }
        Commands::Process => {
            let listings: Vec<listing::ListingRecord> = store::read_csv(store::LISTING_PATH)?;
            let details: Vec<detail::DetailRecord> = store::read_csv(store::DETAIL_PATH)?;
            let games = process::merge_and_clean(&listings, &details);
            store::write_csv(store::PROCESSED_PATH, &games)?;
            println!(
                "Merged {} listings x {} details -> {} games ({})",
                listings.len(),
                details.len(),
                games.len(),
                store::PROCESSED_PATH
            );
            Ok(())
        }
        Commands::Report => {
            let games: Vec<process::GameRow> = store::read_csv(store::PROCESSED_PATH)?;
            if games.is_empty() {
                println!("No processed games. Run 'process' first.");
                return Ok(());
            }
            print!("{}", report::render(&games));
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

async fn run_crawl(pages: u32) -> anyhow::Result<Vec<listing::ListingRecord>> {
    let crawler = listing::ListingCrawler::new(CrawlConfig::default())?;
    println!("Crawling {} top-sellers pages...", pages);
    let rows = crawler.crawl(pages, &LogProgress).await;
    store::write_csv(store::LISTING_PATH, &rows)?;
    println!("{} unique appids ({})", rows.len(), store::LISTING_PATH);
    Ok(rows)
}

async fn run_fetch(listings: &[listing::ListingRecord]) -> anyhow::Result<()> {
    if listings.is_empty() {
        println!("No listings to fetch. Run 'crawl' first.");
        return Ok(());
    }
    let ids: Vec<u32> = listings.iter().map(|l| l.id).collect();

    let fetcher = detail::DetailFetcher::new(CrawlConfig::default())?;
    println!("Fetching details for {} appids...", ids.len());
    let bar = BarProgress::new(ids.len());
    let records = fetcher.fetch_many(&ids, &bar).await;
    bar.finish();

    store::write_csv(store::DETAIL_PATH, &records)?;
    println!(
        "Done: {} of {} appids returned data ({}).",
        records.len(),
        ids.len(),
        store::DETAIL_PATH
    );
    Ok(())
}


fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
