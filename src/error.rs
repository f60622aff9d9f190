use serde::Serialize;
use std::fmt;

pub const EMPTY_OR_INVALID_INPUT: &str = "empty or invalid input";
pub const BLANK_ROW_REFUSED: &str = "all values empty, refusing to append a blank row";

#[derive(thiserror::Error, Debug)]
pub enum LedgerError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("schema unavailable: {0}")]
    SchemaUnavailable(String),

    #[error("schema bootstrap failed: {0}")]
    SchemaBootstrap(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl LedgerError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }

    /// Stable machine-readable name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "InvalidInput",
            Self::SchemaUnavailable(_) => "SchemaUnavailable",
            Self::SchemaBootstrap(_) => "SchemaBootstrapError",
            Self::Transport(_) => "TransportError",
            Self::Config(_) => "ConfigError",
        }
    }

    /// Message without the variant prefix.
    pub fn reason(&self) -> &str {
        match self {
            Self::InvalidInput(msg)
            | Self::SchemaUnavailable(msg)
            | Self::SchemaBootstrap(msg)
            | Self::Transport(msg)
            | Self::Config(msg) => msg,
        }
    }
}

impl From<opendal::Error> for LedgerError {
    fn from(err: opendal::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<reqwest::Error> for LedgerError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Transport(format!("malformed payload: {}", err))
    }
}

/// Non-fatal failure of the cosmetic styling step that follows an append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattingWarning {
    pub cell: String,
    pub message: String,
}

impl fmt::Display for FormattingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not style {}: {}", self.cell, self.message)
    }
}

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;
