use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

/// Progress reporting injected into the crawl/fetch loops so the core never
/// touches the console directly.
pub trait Progress {
    /// A search page was fetched and parsed; `found` entries carried an appid.
    fn on_page_fetched(&self, page: u32, found: usize);
    /// A search page came back non-200 and was skipped.
    fn on_page_skipped(&self, page: u32, reason: &str);
    /// One detail id finished (`ok` = a record was produced).
    fn on_id_fetched(&self, index: usize, total: usize, id: u32, ok: bool);
}

/// Plain tracing output, one line per event.
pub struct LogProgress;

impl Progress for LogProgress {
    fn on_page_fetched(&self, page: u32, found: usize) {
        info!("Page {}: {} entries", page, found);
    }

    fn on_page_skipped(&self, page: u32, reason: &str) {
        warn!("Page {}: skipped ({})", page, reason);
    }

    fn on_id_fetched(&self, index: usize, total: usize, id: u32, ok: bool) {
        if ok {
            info!("[{}/{}] appid {} fetched", index, total, id);
        } else {
            warn!("[{}/{}] appid {} unavailable", index, total, id);
        }
    }
}

/// indicatif bar for interactive runs of the detail fetch.
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta}) {msg}")
                .expect("static template")
                .progress_chars("=> "),
        );
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Progress for BarProgress {
    fn on_page_fetched(&self, page: u32, found: usize) {
        self.bar.println(format!("Page {}: {} entries", page, found));
    }

    fn on_page_skipped(&self, page: u32, reason: &str) {
        self.bar.println(format!("Page {}: skipped ({})", page, reason));
    }

    fn on_id_fetched(&self, _index: usize, _total: usize, id: u32, ok: bool) {
        if !ok {
            self.bar.println(format!("appid {}: no data", id));
        }
        self.bar.inc(1);
    }
}
