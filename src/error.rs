use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ClipwiseError {
    #[error("connect to {address} failed: {reason}")]
    Connect { address: String, reason: String },

    #[error("connect to {address} cancelled")]
    ConnectCancelled { address: String },

    #[error("client send error: {reason}")]
    SendFailed { reason: String },

    #[error("client receive error: {reason}")]
    RecvFailed { reason: String },

    #[error("transport closed")]
    TransportClosed,

    #[error("hotkey registration failed for {combination}: {reason}")]
    Register { combination: String, reason: String },

    #[error("invalid hotkey combination '{combination}': {reason}")]
    InvalidHotkey { combination: String, reason: String },

    #[error("event loop error: {reason}")]
    EventLoop { reason: String },

    #[error("clipboard error: {reason}")]
    Clipboard { reason: String },

    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },

    #[error("config parse error in {path}: {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    #[error("dispatcher stopped")]
    DispatcherStopped,

    #[error("backend error: {reason}")]
    Backend { reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ClipwiseError>;
