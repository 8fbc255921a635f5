//! CLI commands

pub mod cluster;
pub mod env;
pub mod template;

use std::path::PathBuf;

use clap::Args;

use chartcheck_core::{HarnessConfig, RenderOptions};
use chartcheck_helm::{HelmRenderer, Renderer};
use chartcheck_kube::Manifest;

use crate::error::Result;

/// Flags shared by every command that renders the chart
#[derive(Args, Debug, Clone, Default)]
pub struct RenderArgs {
    /// Chart directory (defaults to discovering charts/airbyte upwards)
    #[arg(long, env = "HELM_CHART_PATH")]
    pub chart: Option<PathBuf>,

    /// helm executable
    #[arg(long, env = "HELM_BIN")]
    pub helm_bin: Option<String>,

    /// Set values on command line (key=value)
    #[arg(long = "set")]
    pub set: Vec<String>,

    /// Set JSON values on command line (key=json)
    #[arg(long = "set-json")]
    pub set_json: Vec<String>,

    /// Values file(s) to pass to helm
    #[arg(short = 'f', long = "values")]
    pub values: Vec<PathBuf>,

    /// Render only these templates
    #[arg(short = 's', long = "show-only")]
    pub show_only: Vec<String>,

    /// Target namespace
    #[arg(short, long)]
    pub namespace: Option<String>,
}

impl RenderArgs {
    /// Harness config with command-line overrides applied
    pub fn config(&self) -> Result<HarnessConfig> {
        let mut config = match &self.chart {
            Some(chart) => HarnessConfig::new(chart),
            None => HarnessConfig::from_env()?,
        };
        if let Some(helm) = &self.helm_bin {
            config.helm_bin = helm.clone();
        }
        config.validate()?;
        Ok(config)
    }

    pub fn options(&self) -> Result<RenderOptions> {
        let mut options = RenderOptions::new();
        options
            .apply_set_args(&self.set)?
            .apply_set_json_args(&self.set_json)?;
        for file in &self.values {
            options.values_file(file);
        }
        for template in &self.show_only {
            options.show_only(template);
        }
        if let Some(namespace) = &self.namespace {
            options.namespace(namespace);
        }
        Ok(options)
    }

    /// Render the chart and return helm's raw output
    pub fn render(&self, release: &str) -> Result<String> {
        let config = self.config()?;
        let options = self.options()?;
        let renderer = HelmRenderer::from_config(&config);

        tracing::debug!(chart = %config.chart_path.display(), release, "rendering");
        Ok(renderer.render(&config.chart_path, release, &options)?)
    }

    pub fn render_manifest(&self, release: &str) -> Result<Manifest> {
        Ok(Manifest::parse(&self.render(release)?))
    }
}
