//! Chartcheck Kube - the Kubernetes side of the chart test harness
//!
//! This crate provides:
//! - **Manifest decoding**: split rendered multi-document YAML and decode each
//!   document into a typed `k8s-openapi` object
//! - **Lookup**: find resources by kind and name, or by `App`
//! - **Expectations**: describe where an env var or volume mount should come
//!   from and verify it against the decoded objects
//! - **Clusters**: ephemeral kind clusters for install-style tests

pub mod cluster;
pub mod env;
pub mod error;
pub mod expect;
pub mod manifest;
pub mod resource;

pub use cluster::{ClusterOptions, KindCluster};
pub use env::{ValueSource, env_var_map};
pub use error::{KubeError, Mismatch, Result};
pub use expect::{
    EnvVarRef, ExpectedEnvVar, ExpectedVolumeMount, MountRef, check_env_vars, verify_env_var,
    verify_env_vars, verify_volume_mount,
};
pub use manifest::{Manifest, split_documents};
pub use resource::Resource;
