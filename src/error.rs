use serde::{Serialize, Deserialize};
use std::fmt;

/// Unified error type for the whole crate.
/// Store, route and config functions return Result<T, LeetspaceError>.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeetspaceError {
    pub message: String,
    pub stage: String,
    pub context: Option<String>,
    pub source: Option<String>,
}

impl LeetspaceError {
    /// Create a new error with stage and message
    pub fn new<S: Into<String>>(message: S, stage: &'static str) -> Self {
        LeetspaceError {
            message: message.into(),
            stage: stage.to_string(),
            context: None,
            source: None,
        }
    }

    /// Add additional context information
    pub fn with_context<S: Into<String>>(mut self, context: S) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add source error information
    pub fn with_source<S: Into<String>>(mut self, source: S) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn not_found<S: Into<String>>(what: S) -> Self {
        LeetspaceError::new(format!("{} not found", what.into()), "not_found")
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        LeetspaceError::new(message, "validation")
    }

    pub fn is_not_found(&self) -> bool {
        self.stage == "not_found"
    }
}

impl fmt::Display for LeetspaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.stage, self.message)?;
        if let Some(ref context) = self.context {
            write!(f, " (context: {})", context)?;
        }
        if let Some(ref source) = self.source {
            write!(f, " (source: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for LeetspaceError {}

impl From<anyhow::Error> for LeetspaceError {
    fn from(err: anyhow::Error) -> Self {
        LeetspaceError::new(
            err.to_string(),
            "unknown"
        ).with_source("anyhow")
    }
}

impl From<std::io::Error> for LeetspaceError {
    fn from(err: std::io::Error) -> Self {
        LeetspaceError::new(
            format!("I/O error: {}", err),
            "io"
        ).with_source("std::io")
    }
}

impl From<serde_json::Error> for LeetspaceError {
    fn from(err: serde_json::Error) -> Self {
        LeetspaceError::new(
            format!("JSON error: {}", err),
            "json_parse"
        ).with_source("serde_json")
    }
}

impl From<toml::de::Error> for LeetspaceError {
    fn from(err: toml::de::Error) -> Self {
        LeetspaceError::new(
            format!("TOML error: {}", err),
            "config"
        ).with_source("toml")
    }
}
