//! `helm install` / `helm uninstall` against a live cluster
//!
//! Used by install-style tests, which apply the chart to an ephemeral
//! cluster instead of only rendering it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chartcheck_core::RenderOptions;
use tempfile::NamedTempFile;

use crate::error::Result;
use crate::renderer::{HelmRenderer, override_args, write_overlays};

/// Options for an install against a specific cluster
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Release name
    pub release: String,

    /// Target namespace
    pub namespace: String,

    /// Kubeconfig of the target cluster
    pub kubeconfig: PathBuf,

    /// Create the namespace if it doesn't exist
    pub create_namespace: bool,

    /// Wait for workloads to become ready, up to this long
    pub wait: Option<Duration>,
}

impl InstallOptions {
    pub fn new(
        release: impl Into<String>,
        namespace: impl Into<String>,
        kubeconfig: impl Into<PathBuf>,
    ) -> Self {
        Self {
            release: release.into(),
            namespace: namespace.into(),
            kubeconfig: kubeconfig.into(),
            create_namespace: true,
            wait: None,
        }
    }

    /// Enable waiting for resources
    pub fn with_wait(mut self, timeout: Duration) -> Self {
        self.wait = Some(timeout);
        self
    }

    /// Arguments selecting the cluster and namespace
    fn target_args(&self) -> Vec<String> {
        vec![
            "--kubeconfig".to_string(),
            self.kubeconfig.display().to_string(),
            "--namespace".to_string(),
            self.namespace.clone(),
        ]
    }
}

impl HelmRenderer {
    /// Argument list for `helm install`
    pub fn install_args(
        chart: &Path,
        install: &InstallOptions,
        options: &RenderOptions,
        overlay_files: &[&Path],
    ) -> Vec<String> {
        let mut args = vec![
            "install".to_string(),
            install.release.clone(),
            chart.display().to_string(),
        ];
        args.extend(install.target_args());
        if install.create_namespace {
            args.push("--create-namespace".to_string());
        }
        if let Some(timeout) = install.wait {
            args.push("--wait".to_string());
            args.push("--timeout".to_string());
            args.push(format!("{}s", timeout.as_secs()));
        }
        args.extend(override_args(options, overlay_files));
        args.extend(options.extra_args.iter().cloned());
        args
    }

    /// Install the chart as a release on the target cluster
    pub fn install(
        &self,
        chart: &Path,
        install: &InstallOptions,
        options: &RenderOptions,
    ) -> Result<String> {
        let overlays = write_overlays(options)?;
        let overlay_paths: Vec<&Path> = overlays.iter().map(NamedTempFile::path).collect();
        let args = Self::install_args(chart, install, options, &overlay_paths);

        tracing::info!(
            release = %install.release,
            namespace = %install.namespace,
            "installing chart"
        );
        self.run("install", &args)
    }

    /// Remove the release from the target cluster
    pub fn uninstall(&self, install: &InstallOptions) -> Result<String> {
        let mut args = vec!["uninstall".to_string(), install.release.clone()];
        args.extend(install.target_args());
        if install.wait.is_some() {
            args.push("--wait".to_string());
        }

        tracing::info!(release = %install.release, "uninstalling chart");
        self.run("uninstall", &args)
    }
}
