//! Storage backends: config map wiring and credential mounts

use airbyte_chart_tests::{base_helm_options, config_map_value, get_secret, pod_spec_of};
use chartcheck_core::RenderOptions;
use chartcheck_kube::{ExpectedVolumeMount, Manifest, Mismatch, verify_volume_mount};

use crate::common::{STORAGE_GCS, STORAGE_MINIO, canned, chart};

const ENV_CONFIG_MAP: &str = "airbyte-airbyte-env";

fn minio_options() -> RenderOptions {
    let mut options = base_helm_options();
    options.set("global.storage.type", "minio");
    options
}

fn gcs_options() -> RenderOptions {
    let mut options = base_helm_options();
    options
        .set("global.storage.type", "gcs")
        .set("global.storage.bucket.log", "airbyte-storage")
        .set("global.storage.bucket.state", "airbyte-storage")
        .set("global.storage.bucket.workloadOutput", "airbyte-storage")
        .set("global.storage.gcs.projectId", "airbyte-chart-tests")
        .set(
            "global.storage.gcs.credentialsJson",
            "eyJ0eXBlIjoic2VydmljZV9hY2NvdW50In0=",
        );
    options
}

fn gcs_creds_mount() -> ExpectedVolumeMount {
    ExpectedVolumeMount::secret()
        .ref_name("airbyte-gcs-log-creds")
        .volume("gcs-log-creds-volume")
        .mount_path("/secrets/gcs-log-creds")
}

fn assert_minio_env(manifest: &Manifest) {
    assert_eq!(config_map_value(manifest, ENV_CONFIG_MAP, "STORAGE_TYPE"), "minio");
    assert_eq!(
        config_map_value(manifest, ENV_CONFIG_MAP, "MINIO_ENDPOINT"),
        "http://airbyte-minio-svc:9000"
    );
    assert_eq!(
        config_map_value(manifest, ENV_CONFIG_MAP, "S3_PATH_STYLE_ACCESS"),
        "true"
    );
}

fn assert_gcs_creds_mounted(manifest: &Manifest) {
    get_secret(manifest, "airbyte-gcs-log-creds");
    let spec = pod_spec_of(manifest, "Deployment", "airbyte-server");
    verify_volume_mount(spec, &gcs_creds_mount());
}

#[test]
#[ignore = "requires helm and the Airbyte chart (HELM_CHART_PATH)"]
fn test_minio_storage_env() {
    let manifest = chart().render(&minio_options());
    assert_minio_env(&manifest);
}

#[test]
#[ignore = "requires helm and the Airbyte chart (HELM_CHART_PATH)"]
fn test_gcs_credentials_mount() {
    let manifest = chart().render(&gcs_options());
    assert_gcs_creds_mounted(&manifest);
}

#[test]
fn test_minio_storage_env_canned() {
    let manifest = canned(STORAGE_MINIO).render(&minio_options());
    assert_minio_env(&manifest);
}

#[test]
fn test_gcs_credentials_mount_canned() {
    let manifest = canned(STORAGE_GCS).render(&gcs_options());
    assert_gcs_creds_mounted(&manifest);

    assert_eq!(
        manifest
            .secret_value("airbyte-gcs-log-creds", "gcp.json")
            .as_deref(),
        Some(r#"{"type":"service_account"}"#)
    );
}

#[test]
fn test_minio_render_has_no_gcs_mount() {
    let manifest = canned(STORAGE_MINIO).render(&minio_options());
    let spec = pod_spec_of(&manifest, "Deployment", "airbyte-server");

    assert_eq!(
        gcs_creds_mount().check(spec),
        Err(Mismatch::MissingVolume("gcs-log-creds-volume".to_string()))
    );
}
