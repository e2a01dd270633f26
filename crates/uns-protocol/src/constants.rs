/// Schema tag written into every exported compact document.
pub const COMPACT_SCHEMA_VERSION: &str = "v1";

/// Maximum namespace depth (segment count) accepted by the self-test.
pub const DEFAULT_MAX_DEPTH: usize = 7;

/// Hard ceiling on segments for untrusted input (imports, live topics),
/// checked before building.
pub const MAX_INPUT_SEGMENTS: usize = 64;

/// Window used to turn a live message count into messages per second.
pub const LIVE_RATE_WINDOW_MS: i64 = 60_000;

/// Display name of the synthetic container root.
pub const CONTAINER_ROOT: &str = "root";

/// Id and path of the synthetic container root. No normalized path is empty.
pub const CONTAINER_PATH: &str = "";

/// Number of entries returned by the analytics "top" rankings.
pub const TOP_RANKING_SIZE: usize = 10;
