//! Kubernetes kinds decoded into typed objects

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Resource kinds the harness decodes into typed objects
///
/// Any other kind found in a rendered manifest is still kept, but only as a
/// dynamic object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    ConfigMap,
    Secret,
    Deployment,
    StatefulSet,
    Job,
    Pod,
    Service,
    ServiceAccount,
    Role,
    RoleBinding,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 10] = [
        Self::ConfigMap,
        Self::Secret,
        Self::Deployment,
        Self::StatefulSet,
        Self::Job,
        Self::Pod,
        Self::Service,
        Self::ServiceAccount,
        Self::Role,
        Self::RoleBinding,
    ];

    /// The `kind` field as it appears in a manifest
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigMap => "ConfigMap",
            Self::Secret => "Secret",
            Self::Deployment => "Deployment",
            Self::StatefulSet => "StatefulSet",
            Self::Job => "Job",
            Self::Pod => "Pod",
            Self::Service => "Service",
            Self::ServiceAccount => "ServiceAccount",
            Self::Role => "Role",
            Self::RoleBinding => "RoleBinding",
        }
    }

    /// Whether objects of this kind carry a pod template
    pub fn has_pod_spec(&self) -> bool {
        matches!(
            self,
            Self::Deployment | Self::StatefulSet | Self::Job | Self::Pod
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = CoreError;

    /// Case-insensitive, so `deployment` and `Deployment` both parse
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::UnknownKind(s.to_string()))
    }
}
