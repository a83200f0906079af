//! Error types for DOM snapshot and query operations
//!
//! Simple, flat error hierarchy. No over-engineering.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("Node not found: {0}")]
    NodeNotFound(u32),

    #[error("Invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    #[error("Malformed snapshot: {0}")]
    Snapshot(String),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl DomError {
    /// Shorthand for selector syntax faults.
    pub fn selector(selector: impl Into<String>, reason: impl Into<String>) -> Self {
        DomError::Selector {
            selector: selector.into(),
            reason: reason.into(),
        }
    }
}
