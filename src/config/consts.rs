// src/config/consts.rs

// Net config
pub const SERVER_PATH: &str = "http://www.gruppe-w.de/forum/";
pub const LISTING_PATH: &str = "viewforum.php?forum_id=4";
pub const ROWSTART_PARAM: &str = "&rowstart=";
pub const THREADS_PER_PAGE: usize = 20;
pub const REQUEST_PAUSE_MS: u64 = 75; // be polite
pub const TIMEOUT_SECS: u64 = 15;

// Listing page markers
pub const LISTING_START: &str = "<!--pre_forum-->";
pub const LISTING_END: &str = "<!--sub_forum_table-->";
pub const PINNED_MARKER: &str = "Thema gepinnt";
pub const THREAD_LINK: &str = "<a href='viewthread.php?thread_id=";
pub const PINNED_SKIP: usize = 7;
pub const THREAD_SKIP: usize = 6;

// Thread page anchors
pub const TITLE_MARKER: &str = "class='forum_thread_title'>";
pub const CREATOR_MARKER: &str = "<!--forum_thread_user_name-->";
pub const POST_MARKER: &str = "id='post_";
pub const POST_END: &str = "'>#1</a>";
pub const BODY_END: &str = "<!--sub_forum_post_message-->";
pub const ANONYMOUS_USER: &str = "Anonymer Benutzer";
pub const CREATOR_OFFSET: usize = 5;
pub const POST_OFFSET: usize = 3;
pub const POSTED_AT_OFFSET: usize = 9;

// Sentinels
pub const UNKNOWN_PLAYER: &str = "UNKNOWN";
pub const UNKNOWN_MAP: &str = "Unknown";
pub const RESERVE_SLOT_NUMBER: i32 = -2;
pub const EARLIEST_YEAR: i32 = 2012;

// Tabular format
pub const FORUM_ID: u32 = 4;
pub const EVENT_STATE: u32 = 7;
pub const SLOTLIST_SUFFIX: &str = " - Slotlist";
pub const SLOTLIST_COMMENT: &str = "auto-generated";

// Local cache
pub const STORE_DIR: &str = ".store";
pub const LOG_FILE: &str = "debug.log";
pub const SNAPSHOT_FILE: &str = "events.csv";
pub const PLAYERS_SNAPSHOT_FILE: &str = "players.csv";
pub const CREATORS_SNAPSHOT_FILE: &str = "creators.csv";
pub const LEDGER_FILE: &str = "res/DatenInput.csv";
pub const PLAYERS_SEED: &str = "res/players.csv";
pub const MAPS_SEED: &str = "res/maps.csv";

// Run
pub const CRAWL_FRESH: bool = true;
pub const PROGRESS_EVERY: usize = 10;

// Formats
pub const DATE_FMT: &str = "%d.%m.%Y";
pub const TABLE_DATE_FMT: &str = "%Y-%m-%d";
pub const TABLE_TIME_FMT: &str = "%H:%M:%S";
