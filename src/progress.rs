// src/progress.rs
/// Progress reporting for the crawl. The CLI implements this to surface status.
pub trait Progress {
    /// Called at the start with the total number of threads (if known).
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// Called when one thread has been assembled (or was not an event).
    fn item_done(&mut self, _index: usize) {}

    /// Called when one thread had to be skipped.
    fn item_failed(&mut self, _index: usize, _url: &str) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// Forwards status lines to the log.
pub struct LogProgress {
    total: usize,
}

impl LogProgress {
    pub fn new() -> Self {
        Self { total: 0 }
    }
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress for LogProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
        logf!("Crawling {total} event threads");
    }

    fn log(&mut self, msg: &str) {
        logf!("{msg}");
    }

    fn item_failed(&mut self, index: usize, url: &str) {
        logd!("Thread {} of {} skipped: {url}", index + 1, self.total);
    }

    fn finish(&mut self) {
        logd!("Crawl finished ({} threads)", self.total);
    }
}
