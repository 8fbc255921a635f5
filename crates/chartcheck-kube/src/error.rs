//! Error types for chartcheck-kube

use thiserror::Error;

/// Result type for chartcheck-kube operations
pub type Result<T> = std::result::Result<T, KubeError>;

/// Errors from decoding documents and driving clusters
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KubeError {
    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),

    /// Kubeconfig could not be loaded
    #[error("kubeconfig error: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    /// A kind command exited non-zero
    #[error("kind {command} failed ({status}): {stderr}")]
    Kind {
        command: String,
        status: String,
        stderr: String,
    },

    /// The kind process could not be started
    #[error("failed to run '{program}': {source}\nHint: install kind or point KIND_BIN at it")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Document is YAML but not a Kubernetes object
    #[error("document is not a Kubernetes resource: {0}")]
    NotAResource(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_yaml::Error> for KubeError {
    fn from(e: serde_yaml::Error) -> Self {
        KubeError::Serialization(e.to_string())
    }
}

/// Why an actual field does not match an expectation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Mismatch {
    #[error("expected env var named '{expected}', found '{actual}'")]
    Name { expected: String, actual: String },

    #[error("expected value from {expected}, found {actual}")]
    Source { expected: String, actual: String },

    #[error("expected {source_kind} reference '{expected}', found '{actual}'")]
    RefName {
        source_kind: String,
        expected: String,
        actual: String,
    },

    #[error("expected {source_kind} key '{expected}', found '{actual}'")]
    RefKey {
        source_kind: String,
        expected: String,
        actual: String,
    },

    #[error("{source_kind} '{name}' is not in the rendered manifest")]
    MissingObject { source_kind: String, name: String },

    #[error("{source_kind} '{name}' has no key '{key}'")]
    MissingKey {
        source_kind: String,
        name: String,
        key: String,
    },

    #[error("{source_kind} '{name}' key '{key}' is '{actual}', expected '{expected}'")]
    Value {
        source_kind: String,
        name: String,
        key: String,
        expected: String,
        actual: String,
    },

    #[error("env var '{0}' is not declared")]
    MissingEnvVar(String),

    #[error("pod spec has no volume named '{0}'")]
    MissingVolume(String),

    #[error("volume '{volume}' should be backed by {expected}, found {actual}")]
    VolumeSource {
        volume: String,
        expected: String,
        actual: String,
    },

    #[error("pod spec has no containers")]
    NoContainers,

    #[error("container '{container}' does not mount volume '{volume}'")]
    MissingMount { container: String, volume: String },

    #[error("volume '{volume}' mounted at '{actual}', expected '{expected}'")]
    MountPath {
        volume: String,
        expected: String,
        actual: String,
    },

    #[error("volume '{volume}' mounted with sub-path '{actual}', expected '{expected}'")]
    SubPath {
        volume: String,
        expected: String,
        actual: String,
    },
}
