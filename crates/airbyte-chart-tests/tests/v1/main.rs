//! Airbyte chart v1 suite
//!
//! Tests marked `#[ignore]` render the real chart and need helm plus
//! `HELM_CHART_PATH` (or a checkout containing `charts/airbyte`):
//!
//! ```bash
//! HELM_CHART_PATH=../charts/airbyte cargo test -p airbyte-chart-tests -- --ignored
//! ```
//!
//! The remaining tests feed the same assertions hand-written manifests under
//! `tests/fixtures/v1`, shaped like the chart's output but not generated by
//! helm, so the assertions stay covered in a plain `cargo test`.

mod common;
mod enterprise_config;
mod install;
mod storage;
