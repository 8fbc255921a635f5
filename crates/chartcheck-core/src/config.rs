//! Harness configuration resolved once at start-up
//!
//! The chart under test is located through `HELM_CHART_PATH`. When the
//! variable is unset the harness walks up from the working directory looking
//! for `charts/airbyte/Chart.yaml`. That fallback depends on where the test
//! binary happens to be launched from, so CI should always set the variable.

use std::env;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};

pub const CHART_PATH_ENV: &str = "HELM_CHART_PATH";
pub const K8S_VERSION_ENV: &str = "K8S_VERSION";
pub const HELM_BIN_ENV: &str = "HELM_BIN";
pub const KIND_BIN_ENV: &str = "KIND_BIN";

/// Chart directory relative to a repository root
const CHART_RELATIVE_PATH: &str = "charts/airbyte";

/// Settings shared by every test in a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Directory containing the chart's `Chart.yaml`
    pub chart_path: PathBuf,
    /// Kubernetes version for kind node images (e.g. `1.31.0`)
    pub k8s_version: Option<String>,
    /// helm executable
    pub helm_bin: String,
    /// kind executable
    pub kind_bin: String,
}

impl HarnessConfig {
    /// Build a config for an explicit chart path with default tool names
    pub fn new(chart_path: impl Into<PathBuf>) -> Self {
        Self {
            chart_path: chart_path.into(),
            k8s_version: None,
            helm_bin: "helm".to_string(),
            kind_bin: "kind".to_string(),
        }
    }

    /// Resolve the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        let cwd = env::current_dir()?;
        Self::from_lookup(|key| env::var(key).ok(), &cwd)
    }

    /// Resolve the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F, cwd: &Path) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let chart_path = match non_empty(CHART_PATH_ENV) {
            Some(path) => PathBuf::from(path),
            None => {
                let found = discover_chart(cwd).ok_or_else(|| CoreError::ChartPathUnresolved {
                    searched_from: cwd.display().to_string(),
                })?;
                tracing::debug!(chart = %found.display(), "chart path discovered from working directory");
                found
            }
        };

        Ok(Self {
            chart_path,
            k8s_version: non_empty(K8S_VERSION_ENV).map(|v| v.trim_start_matches('v').to_string()),
            helm_bin: non_empty(HELM_BIN_ENV).unwrap_or_else(|| "helm".to_string()),
            kind_bin: non_empty(KIND_BIN_ENV).unwrap_or_else(|| "kind".to_string()),
        })
    }

    /// Fail early when the chart directory has no `Chart.yaml`
    pub fn validate(&self) -> Result<()> {
        if self.chart_path.join("Chart.yaml").is_file() {
            Ok(())
        } else {
            Err(CoreError::ChartNotFound {
                path: self.chart_path.display().to_string(),
            })
        }
    }

    /// kind node image for the configured Kubernetes version
    pub fn node_image(&self) -> Option<String> {
        self.k8s_version
            .as_ref()
            .map(|version| format!("kindest/node:v{}", version))
    }
}

/// Walk up from `start` looking for the chart directory
fn discover_chart(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        let candidate = dir.join(CHART_RELATIVE_PATH);
        candidate.join("Chart.yaml").is_file().then_some(candidate)
    })
}
