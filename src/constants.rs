pub const DEFAULT_RUN_TIMEOUT_SECS: f64 = 5.0;
pub const DEFAULT_CASE_TIMEOUT_SECS: f64 = 2.0;
pub const DEFAULT_MAX_TIMEOUT_SECS: f64 = 30.0;

/// Return code reported for a run that hit its time limit.
pub const TIMEOUT_RETURNCODE: i32 = -1;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_INTERPRETER: &str = "python3";
pub const ISOLATED_FLAG: &str = "-I";
pub const SOURCE_DIR_NAME: &str = "codehelper";
pub const SOURCE_EXTENSION: &str = "py";
pub const DEFAULT_OUTPUT_LIMIT_BYTES: usize = 8 * 1024 * 1024;
pub const DEFAULT_GRADE_CONCURRENCY: usize = 1;
/// Longest request line a client may send before its connection is dropped.
pub const MAX_REQUEST_LINE_BYTES: usize = 16 * 1024 * 1024;

pub const GREETING: &str = "Hello CodeHelper!";

pub const MSG_TX_ERR: &str = "Failed to send message to handler";
pub const RES_TX_ERR: &str = "Failed to send response";
