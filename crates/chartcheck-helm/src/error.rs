//! Error types for chartcheck-helm

use thiserror::Error;

/// Result type for helm operations
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors that can occur while invoking helm
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RenderError {
    /// helm ran and exited non-zero; `stderr` is exactly what helm printed
    #[error("helm {command} failed ({status}): {stderr}")]
    Helm {
        command: String,
        status: String,
        stderr: String,
    },

    /// The helm process could not be started
    #[error("failed to run '{program}': {source}\nHint: install helm or point HELM_BIN at it")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// helm printed something that is not UTF-8
    #[error("helm {command} produced non UTF-8 output")]
    InvalidOutput { command: String },

    /// A mock renderer was asked for a render it has no answer for
    #[error("no canned output for release '{release}'")]
    NoCannedOutput { release: String },

    /// Values overlay could not be serialized
    #[error("values error: {0}")]
    Values(#[from] chartcheck_core::CoreError),

    /// IO error (temporary values files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    /// helm's stderr for failed invocations
    pub fn stderr(&self) -> Option<&str> {
        match self {
            RenderError::Helm { stderr, .. } => Some(stderr),
            _ => None,
        }
    }

    /// Whether this is a helm failure whose message contains `needle`
    pub fn helm_message_contains(&self, needle: &str) -> bool {
        self.stderr().is_some_and(|stderr| stderr.contains(needle))
    }
}
