pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_PORT: u16 = 8000;
// 10 MiB
pub const SERVER_REQUEST_BODY_LIMIT: usize = 10 * 1024 * 1024;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

pub const MAX_LABELS: i32 = 5;
pub const DEFAULT_LABEL_MIN_CONFIDENCE: f32 = 80.0;
pub const TOP_EMOTIONS: usize = 3;

pub const FILE_FIELD: &str = "file";
pub const NO_FILE_UPLOADED: &str = "No file uploaded";
pub const STATUS_MESSAGE: &str = "Smart Photo Album API is running 🚀";
