use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Duplicate tool: {0}")]
    DuplicateTool(String),

    #[error("Unknown tab: {0}")]
    UnknownTab(String),

    #[error("No active tab")]
    NoActiveTab,

    #[error("Browser launch failed: {0}")]
    Launch(String),

    #[error("Engine operation failed: {0}")]
    Engine(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
