//! Deployable units of a chart release

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::kind::ResourceKind;

/// Default release name used by the chart tests
pub const DEFAULT_RELEASE: &str = "airbyte";

/// A deployable unit within a chart release
///
/// The chart names every workload `<release>-<name>`, so an `App` is enough
/// to find its resource in a rendered manifest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct App {
    pub name: String,
    pub kind: ResourceKind,
    pub release: String,
}

impl App {
    /// An app of the default `airbyte` release
    pub fn new(name: impl Into<String>, kind: ResourceKind) -> Self {
        Self::with_release(name, kind, DEFAULT_RELEASE)
    }

    pub fn with_release(
        name: impl Into<String>,
        kind: ResourceKind,
        release: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            release: release.into(),
        }
    }

    /// Expected resource name: `<release>-<name>`
    pub fn fqn(&self) -> String {
        format!("{}-{}", self.release, self.name)
    }
}

impl fmt::Display for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.fqn())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fqn_uses_default_release() {
        let app = App::new("server", ResourceKind::Deployment);
        assert_eq!(app.fqn(), "airbyte-server");
        assert_eq!(app.to_string(), "Deployment/airbyte-server");
    }

    #[test]
    fn test_fqn_with_custom_release() {
        let app = App::with_release("keycloak", ResourceKind::StatefulSet, "ab");
        assert_eq!(app.fqn(), "ab-keycloak");
    }
}
