//! Airbyte chart test support
//!
//! Value presets, a render helper bound to the chart under test, and lookup
//! helpers that fail the test with a useful message instead of returning
//! `Option`. The suites themselves live under `tests/`.

pub mod presets;

use std::path::{Path, PathBuf};

use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{ConfigMap, Container, EnvVar, Pod, PodSpec, Secret};

use chartcheck_core::{DEFAULT_RELEASE, HarnessConfig, RenderOptions};
use chartcheck_helm::{HelmRenderer, RenderError, Renderer};
use chartcheck_kube::{Manifest, Resource};

pub use presets::{base_helm_options, base_helm_options_for_enterprise_with_values};

/// Install a test-friendly tracing subscriber once per test binary
///
/// Output goes through the test harness capture; set `RUST_LOG` to see it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// The chart under test, paired with the renderer that renders it
#[derive(Debug, Clone)]
pub struct ChartUnderTest<R = HelmRenderer> {
    chart: PathBuf,
    release: String,
    renderer: R,
}

impl ChartUnderTest<HelmRenderer> {
    /// Resolve the chart from `HELM_CHART_PATH` and render with helm
    ///
    /// # Panics
    ///
    /// Panics when the chart cannot be located.
    #[track_caller]
    pub fn from_env() -> Self {
        let config = match HarnessConfig::from_env().and_then(|c| c.validate().map(|_| c)) {
            Ok(config) => config,
            Err(e) => panic!("chart under test is not available: {}", e),
        };
        Self::with_renderer(&config.chart_path, HelmRenderer::from_config(&config))
    }
}

impl<R: Renderer> ChartUnderTest<R> {
    pub fn with_renderer(chart: impl Into<PathBuf>, renderer: R) -> Self {
        Self {
            chart: chart.into(),
            release: DEFAULT_RELEASE.to_string(),
            renderer,
        }
    }

    pub fn release(mut self, release: impl Into<String>) -> Self {
        self.release = release.into();
        self
    }

    pub fn chart(&self) -> &Path {
        &self.chart
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Render and return helm's output or failure
    pub fn try_render(&self, options: &RenderOptions) -> Result<String, RenderError> {
        tracing::debug!(chart = %self.chart.display(), release = %self.release, "rendering chart");
        self.renderer.render(&self.chart, &self.release, options)
    }

    /// Render and decode, failing the test if helm refuses
    #[track_caller]
    pub fn render(&self, options: &RenderOptions) -> Manifest {
        match self.try_render(options) {
            Ok(yaml) => Manifest::parse(&yaml),
            Err(e) => panic!("rendering {} failed: {}", self.chart.display(), e),
        }
    }

    /// Render expecting helm to reject the values
    ///
    /// # Panics
    ///
    /// Panics when rendering succeeds.
    #[track_caller]
    pub fn render_err(&self, options: &RenderOptions) -> RenderError {
        match self.try_render(options) {
            Ok(_) => panic!("rendering {} should have failed", self.chart.display()),
            Err(e) => e,
        }
    }
}

/// Assert that helm rejected a render with a message containing `needle`
#[track_caller]
pub fn assert_render_error_contains(err: &RenderError, needle: &str) {
    assert!(
        err.helm_message_contains(needle),
        "expected helm to fail with `{}`, got: {}",
        needle,
        err
    );
}

macro_rules! getter {
    ($(#[$doc:meta])* $fn_name:ident, $lookup:ident, $ty:ty, $kind:literal) => {
        $(#[$doc])*
        #[track_caller]
        pub fn $fn_name<'a>(manifest: &'a Manifest, name: &str) -> &'a $ty {
            match manifest.$lookup(name) {
                Some(obj) => obj,
                None => panic!("{} '{}' not found in the rendered manifest", $kind, name),
            }
        }
    };
}

getter!(
    /// The named ConfigMap, failing the test when absent
    get_config_map, config_map, ConfigMap, "ConfigMap"
);
getter!(get_secret, secret, Secret, "Secret");
getter!(get_deployment, deployment, Deployment, "Deployment");
getter!(get_stateful_set, stateful_set, StatefulSet, "StatefulSet");
getter!(get_job, job, Job, "Job");
getter!(get_pod, pod, Pod, "Pod");

/// The resource `kind`/`name`, failing the test when absent
#[track_caller]
pub fn get_resource<'a>(manifest: &'a Manifest, kind: &str, name: &str) -> &'a Resource {
    match manifest.find(kind, name) {
        Some(resource) => resource,
        None => panic!("{} '{}' not found in the rendered manifest", kind, name),
    }
}

#[track_caller]
pub fn pod_spec_of<'a>(manifest: &'a Manifest, kind: &str, name: &str) -> &'a PodSpec {
    match get_resource(manifest, kind, name).pod_spec() {
        Some(spec) => spec,
        None => panic!("{} '{}' has no pod template", kind, name),
    }
}

#[track_caller]
pub fn main_container<'a>(manifest: &'a Manifest, kind: &str, name: &str) -> &'a Container {
    match pod_spec_of(manifest, kind, name).containers.first() {
        Some(container) => container,
        None => panic!("{} '{}' has no containers", kind, name),
    }
}

/// Env of the first container, empty when none is declared
#[track_caller]
pub fn main_container_env<'a>(manifest: &'a Manifest, kind: &str, name: &str) -> &'a [EnvVar] {
    main_container(manifest, kind, name)
        .env
        .as_deref()
        .unwrap_or_default()
}

/// Value of `key` in config map `name`, failing the test when absent
#[track_caller]
pub fn config_map_value<'a>(manifest: &'a Manifest, name: &str, key: &str) -> &'a str {
    get_config_map(manifest, name);
    match manifest.config_map_value(name, key) {
        Some(value) => value,
        None => panic!("ConfigMap '{}' has no key '{}'", name, key),
    }
}
