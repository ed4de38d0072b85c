//! Session management, tool registry, and tool dispatch.

pub mod capture;
pub mod dispatch;
pub mod interaction;
pub mod navigation;
pub mod registry;
pub mod schema;
pub mod session;
pub mod utility;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatch::Dispatcher;
pub use registry::{ToolDescriptor, ToolRegistry};
pub use session::BrowserSession;

use browserd_core::Error;
use serde_json::Value;

/// One block of tool output.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Text(String),
    Json(Value),
    Image { data: Vec<u8>, media_type: String },
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Content::Text(text.into())
    }
}

/// Tool-level failure classes surfaced to clients. Distinct from
/// protocol-shape errors, which never reach this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    UnknownTool,
    InvalidArguments,
    UnknownTab,
    NoActiveTab,
    LaunchFailed,
    EngineOperationFailed,
    Timeout,
    Internal,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::UnknownTool => "unknown_tool",
            FailureKind::InvalidArguments => "invalid_arguments",
            FailureKind::UnknownTab => "unknown_tab",
            FailureKind::NoActiveTab => "no_active_tab",
            FailureKind::LaunchFailed => "launch_failed",
            FailureKind::EngineOperationFailed => "engine_operation_failed",
            FailureKind::Timeout => "timeout",
            FailureKind::Internal => "internal",
        }
    }
}

/// Outcome of one tool invocation. Dispatch always produces one of these;
/// errors never escape as panics or raw `Err` values.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    Success(Vec<Content>),
    Failure { kind: FailureKind, message: String },
}

impl ToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        ToolResult::Success(vec![Content::text(text)])
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ToolResult::Failure { .. })
    }
}

impl From<Error> for ToolResult {
    fn from(err: Error) -> Self {
        let kind = match &err {
            Error::UnknownTool(_) => FailureKind::UnknownTool,
            Error::InvalidArguments(_) => FailureKind::InvalidArguments,
            Error::UnknownTab(_) => FailureKind::UnknownTab,
            Error::NoActiveTab => FailureKind::NoActiveTab,
            Error::Launch(_) => FailureKind::LaunchFailed,
            Error::Engine(_) => FailureKind::EngineOperationFailed,
            Error::Timeout(_) => FailureKind::Timeout,
            Error::DuplicateTool(_)
            | Error::Protocol(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::Internal(_) => FailureKind::Internal,
        };
        ToolResult::Failure {
            kind,
            message: err.to_string(),
        }
    }
}
