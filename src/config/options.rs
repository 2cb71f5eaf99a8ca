// src/config/options.rs
use std::path::PathBuf;
use super::consts::*;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppOptions {
    pub crawl: CrawlOptions,
    pub files: FileOptions,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Crawl the forum, or decode the cached snapshot instead.
    pub fresh: bool,
    pub server_path: String,
    pub listing_path: String,
    pub page_size: usize,
    pub pause_ms: u64,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            fresh: CRAWL_FRESH,
            server_path: s!(SERVER_PATH),
            listing_path: s!(LISTING_PATH),
            page_size: THREADS_PER_PAGE,
            pause_ms: REQUEST_PAUSE_MS,
        }
    }
}

impl CrawlOptions {
    pub fn listing_url(&self) -> String {
        join!(&self.server_path, &self.listing_path)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileOptions {
    pub snapshot: PathBuf,
    /// Attendance ledger; a missing file means "no ledger".
    pub ledger: PathBuf,
    pub players_seed: PathBuf,
    pub maps_seed: PathBuf,
    /// Directory holding replacement `*.json` lookup tables.
    pub tables_dir: Option<PathBuf>,
    /// Where to write the ledger rebuilt from the events, if anywhere.
    pub ledger_out: Option<PathBuf>,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            snapshot: PathBuf::from(STORE_DIR).join(SNAPSHOT_FILE),
            ledger: PathBuf::from(LEDGER_FILE),
            players_seed: PathBuf::from(PLAYERS_SEED),
            maps_seed: PathBuf::from(MAPS_SEED),
            tables_dir: None,
            ledger_out: None,
        }
    }
}
