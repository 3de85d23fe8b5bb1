//! Error types for ncompare operations

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, NcompareError>;

#[derive(Error, Debug)]
pub enum NcompareError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    #[error("Expected a '{expected}' path, got: {path}")]
    PathWrongSuffix { path: PathBuf, expected: String },

    #[error("Could not open data source {path}: {message}")]
    SourceOpen { path: PathBuf, message: String },

    #[error("Read error: {message}")]
    SourceRead { message: String },

    #[error("Group not found: <{group}>")]
    GroupNotFound { group: String },

    #[error("Variable not found: <{variable}> in {}", .group.as_deref().map_or_else(|| "root group".to_string(), |g| format!("group <{g}>")))]
    VariableNotFound {
        variable: String,
        group: Option<String>,
    },

    #[error("Unable to decode times: {message}")]
    TimeDecoding { message: String },

    #[error("Could not write {path}: {message}")]
    ExportWrite { path: PathBuf, message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl NcompareError {
    pub fn source_open(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::SourceOpen {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn source_read(msg: impl Into<String>) -> Self {
        Self::SourceRead {
            message: msg.into(),
        }
    }

    pub fn group_not_found(group: impl Into<String>) -> Self {
        Self::GroupNotFound {
            group: group.into(),
        }
    }

    pub fn variable_not_found(variable: impl Into<String>, group: Option<&str>) -> Self {
        Self::VariableNotFound {
            variable: variable.into(),
            group: group.map(str::to_string),
        }
    }

    pub fn time_decoding(msg: impl Into<String>) -> Self {
        Self::TimeDecoding {
            message: msg.into(),
        }
    }

    pub fn export_write(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::ExportWrite {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    /// Whether this is a failed group/variable lookup, which the targeted
    /// inspection reports inline instead of aborting the pass.
    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::GroupNotFound { .. } | Self::VariableNotFound { .. })
    }

    /// Render this error followed by every `source()` in its chain.
    pub fn chain(&self) -> Vec<String> {
        let mut lines = vec![self.to_string()];
        let mut current = std::error::Error::source(self);
        while let Some(err) = current {
            lines.push(format!("caused by: {err}"));
            current = err.source();
        }
        lines
    }
}
