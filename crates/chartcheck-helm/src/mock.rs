//! Mock renderer for testing
//!
//! Replays canned manifests (or canned helm failures) per release name and
//! records every request, useful for exercising render helpers without helm.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chartcheck_core::RenderOptions;

use crate::error::{RenderError, Result};
use crate::renderer::Renderer;

/// One call made against a `MockRenderer`
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRender {
    pub chart: PathBuf,
    pub release: String,
    pub options: RenderOptions,
}

#[derive(Debug, Clone)]
enum Canned {
    Manifest(String),
    Failure(String),
}

#[derive(Debug, Default)]
struct State {
    by_release: HashMap<String, Canned>,
    fallback: Option<Canned>,
    calls: Vec<RecordedRender>,
}

/// In-memory renderer for testing
#[derive(Debug, Clone, Default)]
pub struct MockRenderer {
    state: Arc<Mutex<State>>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every release with `manifest` unless a per-release answer exists
    pub fn with_manifest(manifest: impl Into<String>) -> Self {
        let renderer = Self::new();
        renderer.lock().fallback = Some(Canned::Manifest(manifest.into()));
        renderer
    }

    /// Answer `release` with `manifest`
    pub fn respond(&self, release: impl Into<String>, manifest: impl Into<String>) -> &Self {
        self.lock()
            .by_release
            .insert(release.into(), Canned::Manifest(manifest.into()));
        self
    }

    /// Answer `release` with a helm failure carrying `stderr`
    pub fn fail(&self, release: impl Into<String>, stderr: impl Into<String>) -> &Self {
        self.lock()
            .by_release
            .insert(release.into(), Canned::Failure(stderr.into()));
        self
    }

    /// Every render requested so far, in order
    pub fn calls(&self) -> Vec<RecordedRender> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panicking test must not poison the mock for the next assertion
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Renderer for MockRenderer {
    fn render(&self, chart: &Path, release: &str, options: &RenderOptions) -> Result<String> {
        let mut state = self.lock();
        state.calls.push(RecordedRender {
            chart: chart.to_path_buf(),
            release: release.to_string(),
            options: options.clone(),
        });

        let canned = state
            .by_release
            .get(release)
            .or(state.fallback.as_ref())
            .cloned();

        match canned {
            Some(Canned::Manifest(manifest)) => Ok(manifest),
            Some(Canned::Failure(stderr)) => Err(RenderError::Helm {
                command: "template".to_string(),
                status: "exit status: 1".to_string(),
                stderr,
            }),
            None => Err(RenderError::NoCannedOutput {
                release: release.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_and_per_release_answers() {
        let mock = MockRenderer::with_manifest("kind: ConfigMap\n");
        mock.respond("other", "kind: Secret\n");

        let opts = RenderOptions::new();
        assert_eq!(
            mock.render(Path::new("chart"), "airbyte", &opts).unwrap(),
            "kind: ConfigMap\n"
        );
        assert_eq!(
            mock.render(Path::new("chart"), "other", &opts).unwrap(),
            "kind: Secret\n"
        );
        assert_eq!(mock.call_count(), 2);
    }

    #[test]
    fn test_canned_failure() {
        let mock = MockRenderer::new();
        mock.fail("airbyte", "Error: You must set `global.edition`");

        let err = mock
            .render(Path::new("chart"), "airbyte", &RenderOptions::new())
            .unwrap_err();
        assert!(err.helm_message_contains("You must set `global.edition`"));
    }

    #[test]
    fn test_unknown_release_without_fallback() {
        let mock = MockRenderer::new();
        let err = mock
            .render(Path::new("chart"), "airbyte", &RenderOptions::new())
            .unwrap_err();
        assert!(matches!(err, RenderError::NoCannedOutput { .. }));
    }

    #[test]
    fn test_records_requests() {
        let mock = MockRenderer::with_manifest("");
        let mut opts = RenderOptions::new();
        opts.set("global.edition", "enterprise");

        mock.render(Path::new("/charts/airbyte"), "ab", &opts).unwrap();

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].release, "ab");
        assert_eq!(calls[0].chart, PathBuf::from("/charts/airbyte"));
        assert_eq!(calls[0].options.set_values["global.edition"], "enterprise");
    }
}
