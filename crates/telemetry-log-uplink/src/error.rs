/// Errors that can occur in the log collection and upload core.
#[derive(Debug, thiserror::Error)]
pub enum UplinkError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Log collector is not ready: {0}")]
    NotReady(&'static str),

    #[error("Not initialized: {0}")]
    NotInitialized(&'static str),

    #[error("Out of memory: failed to allocate {0} bytes for a log record")]
    OutOfMemory(usize),

    #[error("Write failed: {needed} bytes needed, {remaining} remaining in the frame")]
    WriteFailed { needed: usize, remaining: usize },

    #[error("Bad state: {0}")]
    BadState(String),

    #[error("Truncated frame: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, UplinkError>;
