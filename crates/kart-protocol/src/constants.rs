/// Port the name server listens on by convention.
pub const DEFAULT_SYNC_PORT: u16 = 9003;

/// Number of default labels (`0..16`) used when no cached names exist.
/// Independent of how many spots the layout actually defines.
pub const DEFAULT_SPOT_COUNT: usize = 16;

/// Key under which the comma-separated name list is cached locally.
pub const NAME_CACHE_KEY: &str = "kart";

/// Separator between names in an inbound frame and in the cache.
pub const NAME_SEPARATOR: char = ',';

/// Outbound token asking the name server to reshuffle.
pub const SCRAMBLE_COMMAND: &str = "SCRAMBLE";

pub const COMMENT_START: &str = "/*";
pub const COMMENT_END: &str = "*/";

/// Default location of the layout source, relative to the working directory.
pub const DEFAULT_LAYOUT_SOURCE: &str = "layout.txt";
