//! Application constants and game tuning

pub const APP_NAME: &str = "ZERO2ONE";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_TAGLINE: &str = "Break your limits. Evolve. Become stronger.";
pub const DASHBOARD_QUOTE: &str = "\"You don't rise to the level of your goals, you fall to the level of your systems. Break yourself down as many times as necessary until you turn zero to one.\"";

/// Version written into every saved/exported document
pub const SAVE_FORMAT_VERSION: &str = "1.0";

// Files inside the data directory
pub const DATA_DIR_NAME: &str = "ZERO2ONE";
pub const DATA_DIR_ENV: &str = "ZERO2ONE_DATA_DIR";
pub const SAVE_FILE: &str = "zero2one_data.json";
pub const BACKUP_DIR: &str = "backups";
pub const DB_FILE: &str = "zero2one.db";
pub const SETTINGS_FILE: &str = "settings.json";
pub const EXPORT_FILE_NAME: &str = "zero2one_progress.json";
pub const DEFAULT_MAX_BACKUPS: usize = 10;
pub const DEFAULT_USERNAME: &str = "player";

// Game settings
pub const POINTS_PER_RANK: u32 = 85;
pub const DESCRIPTION_MAX_CHARS: usize = 200;
pub const WEEKLY_FREQUENCY_MAX: u32 = 7;

/// Hours granted to catch up after a single missed day
pub const MAKEUP_WINDOW_HOURS: i64 = 12;
/// Probability a penalty lands on one attribute instead of being spread
pub const PENALTY_SINGLE_TARGET_CHANCE: f64 = 0.7;

/// Random event rolls happen at most once per this many seconds
pub const EVENT_CHECK_INTERVAL_SECS: i64 = 3600;
/// Chance a dynamic event is generated on an event roll
pub const DYNAMIC_EVENT_CHANCE: f64 = 0.3;
/// Chance a generated dynamic event carries a bonus challenge
pub const DYNAMIC_CHALLENGE_CHANCE: f64 = 0.3;
/// Speed runner challenge window
pub const SPEED_RUN_WINDOW_SECS: i64 = 6 * 3600;

/// Number of recent history entries shown on the events page
pub const EVENT_HISTORY_SHOWN: usize = 10;
