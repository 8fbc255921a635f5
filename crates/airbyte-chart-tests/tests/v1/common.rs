//! Shared helpers for the v1 suite

use airbyte_chart_tests::{ChartUnderTest, init_tracing};
use chartcheck_helm::MockRenderer;

pub const ENTERPRISE: &str = include_str!("../fixtures/v1/enterprise.yaml");
pub const STORAGE_GCS: &str = include_str!("../fixtures/v1/storage-gcs.yaml");
pub const STORAGE_MINIO: &str = include_str!("../fixtures/v1/storage-minio.yaml");

/// The real chart, rendered by helm
pub fn chart() -> ChartUnderTest {
    init_tracing();
    ChartUnderTest::from_env()
}

/// A chart whose every render returns `manifest`
pub fn canned(manifest: &str) -> ChartUnderTest<MockRenderer> {
    init_tracing();
    ChartUnderTest::with_renderer("charts/airbyte", MockRenderer::with_manifest(manifest))
}
