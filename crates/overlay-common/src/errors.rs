use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Failures of the host message channel.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("call to '{endpoint}' timed out after {after_ms}ms")]
    Timeout { endpoint: String, after_ms: u64 },

    #[error("host rejected '{endpoint}': {reason}")]
    Rejected { endpoint: String, reason: String },

    #[error("host channel disconnected")]
    Disconnected,

    #[error("inbound stream already taken")]
    StreamTaken,

    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// An inbound payload that cannot be presented.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("malformed '{event}' payload: {reason}")]
    Malformed { event: String, reason: String },

    #[error("invalid '{event}' payload: {reason}")]
    Invalid { event: String, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("no form is open")]
    NotOpen,

    #[error("row {index} ('{label}') is required")]
    RequiredMissing { index: usize, label: String },

    #[error("row {index} does not exist (form has {len} rows)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("row {index} is a {kind} row and cannot hold {got}")]
    TypeMismatch {
        index: usize,
        kind: &'static str,
        got: &'static str,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("handler error: {0}")]
    Handler(String),

    #[error("{0} overlay is not mounted")]
    Unmounted(&'static str),
}
