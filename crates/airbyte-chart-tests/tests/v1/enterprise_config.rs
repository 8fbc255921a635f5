//! Enterprise edition: required values and the env wiring of SSO

use std::collections::BTreeMap;

use airbyte_chart_tests::presets::enterprise_with_oidc;
use airbyte_chart_tests::{
    assert_render_error_contains, base_helm_options, base_helm_options_for_enterprise_with_values,
    get_stateful_set, main_container_env,
};
use chartcheck_core::RenderOptions;
use chartcheck_kube::{ExpectedEnvVar, Manifest, verify_env_vars};

use crate::common::{ENTERPRISE, canned, chart};

const ENV_CONFIG_MAP: &str = "airbyte-airbyte-env";

fn config_map_var(key: &str) -> ExpectedEnvVar {
    ExpectedEnvVar::config_map()
        .ref_name(ENV_CONFIG_MAP)
        .ref_key(key)
}

fn secret_var(secret: &str, key: &str) -> ExpectedEnvVar {
    ExpectedEnvVar::secret().ref_name(secret).ref_key(key)
}

/// Env shared by the keycloak setup job and the server
fn sso_env() -> BTreeMap<String, ExpectedEnvVar> {
    [
        ("AIRBYTE_URL", config_map_var("AIRBYTE_URL")),
        (
            "INITIAL_USER_FIRST_NAME",
            config_map_var("INITIAL_USER_FIRST_NAME").value("Octavia"),
        ),
        (
            "INITIAL_USER_LAST_NAME",
            config_map_var("INITIAL_USER_LAST_NAME").value("Squidington"),
        ),
        (
            "INITIAL_USER_EMAIL",
            secret_var("sso-secrets", "instance-admin-email"),
        ),
        (
            "INITIAL_USER_PASSWORD",
            secret_var("sso-secrets", "instance-admin-password"),
        ),
        (
            "IDENTITY_PROVIDER_TYPE",
            config_map_var("IDENTITY_PROVIDER_TYPE").value("oidc"),
        ),
        (
            "OIDC_DOMAIN",
            config_map_var("OIDC_DOMAIN").value("sso.example.org"),
        ),
        (
            "OIDC_APP_NAME",
            config_map_var("OIDC_APP_NAME").value("sso-app"),
        ),
        ("OIDC_CLIENT_ID", secret_var("sso-secrets", "client-id")),
        ("OIDC_CLIENT_SECRET", secret_var("sso-secrets", "client-secret")),
    ]
    .into_iter()
    .map(|(name, expected)| (name.to_string(), expected))
    .collect()
}

fn enterprise_env_options() -> RenderOptions {
    let mut options = enterprise_with_oidc("sso.example.org", "sso-app");
    options
        .set("global.enterprise.secretName", "airbyte-license")
        .set("global.auth.instanceAdmin.secretName", "sso-secrets");
    options
}

fn assert_enterprise_env(manifest: &Manifest) {
    let job_env = main_container_env(manifest, "Job", "airbyte-keycloak-setup");
    verify_env_vars(manifest, job_env, &sso_env());

    let mut server_expected = sso_env();
    server_expected.insert(
        "AIRBYTE_LICENSE_KEY".to_string(),
        secret_var("airbyte-license", "license-key"),
    );
    let server_env = main_container_env(manifest, "Deployment", "airbyte-server");
    verify_env_vars(manifest, server_env, &server_expected);

    let keycloak_env = main_container_env(manifest, "StatefulSet", "airbyte-keycloak");
    let keycloak_expected = BTreeMap::from([(
        "KEYCLOAK_DATABASE_URL".to_string(),
        config_map_var("KEYCLOAK_DATABASE_URL")
            .value("jdbc:postgresql://airbyte-db-svc:5432/db-airbyte?currentSchema=keycloak"),
    )]);
    verify_env_vars(manifest, keycloak_env, &keycloak_expected);
}

fn keycloak_init_image(manifest: &Manifest) -> String {
    let keycloak = get_stateful_set(manifest, "airbyte-keycloak");
    keycloak
        .spec
        .as_ref()
        .and_then(|spec| spec.template.spec.as_ref())
        .and_then(|pod| pod.init_containers.as_ref())
        .and_then(|init| init.first())
        .and_then(|container| container.image.clone())
        .unwrap_or_default()
}

/// (override, expected helm message) pairs for values enterprise requires
fn required_enterprise_values() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "global.enterprise.secretName",
            "You must set `global.enterprise.secretName` when `global.edition` is 'enterprise'",
        ),
        (
            "global.enterprise.licenseKeySecretKey",
            "You must set `global.enterprise.licenseKeySecretKey` when `global.edition` is 'enterprise'",
        ),
        (
            "global.auth.instanceAdmin.secretName",
            "You must set `global.auth.instanceAdmin.secretName` when `global.edition` is 'enterprise'",
        ),
        (
            "global.auth.instanceAdmin.firstName",
            "You must set `global.auth.instanceAdmin.firstName` when `global.edition` is 'enterprise'",
        ),
        (
            "global.auth.instanceAdmin.lastName",
            "You must set `global.auth.instanceAdmin.lastName` when `global.edition` is 'enterprise'",
        ),
        (
            "global.auth.instanceAdmin.emailSecretKey",
            "You must set `global.auth.instanceAdmin.emailSecretKey` when `global.edition` is 'enterprise'",
        ),
        (
            "global.auth.instanceAdmin.passwordSecretKey",
            "You must set `global.auth.instanceAdmin.passwordSecretKey` when `global.edition` is 'enterprise'",
        ),
    ]
}

/// Identity provider values SSO requires, each reported by its own key
const REQUIRED_SSO_VALUES: [&str; 5] = [
    "global.auth.identityProvider.type",
    "global.auth.identityProvider.oidc.domain",
    "global.auth.identityProvider.oidc.appName",
    "global.auth.identityProvider.oidc.clientIdSecretKey",
    "global.auth.identityProvider.oidc.clientSecretSecretKey",
];

#[test]
#[ignore = "requires helm and the Airbyte chart (HELM_CHART_PATH)"]
fn test_enterprise_requires_values() {
    let chart = chart();

    for (key, message) in required_enterprise_values() {
        // Empty string overrides the chart default
        let mut options = base_helm_options_for_enterprise_with_values();
        options.set(key, "");

        let err = chart.render_err(&options);
        assert_render_error_contains(&err, message);
    }
}

#[test]
#[ignore = "requires helm and the Airbyte chart (HELM_CHART_PATH)"]
fn test_sso_requires_identity_provider_secret() {
    let mut options = base_helm_options();
    options
        .set("global.edition", "enterprise")
        .set("global.auth.instanceAdmin.firstName", "Octavia")
        .set("global.auth.instanceAdmin.lastName", "Squidington")
        .set("global.auth.identityProvider.secretName", "");

    let err = chart().render_err(&options);
    assert_render_error_contains(
        &err,
        "You must set `global.auth.identityProvider.secretName` when enabling SSO",
    );
}

#[test]
#[ignore = "requires helm and the Airbyte chart (HELM_CHART_PATH)"]
fn test_sso_requires_identity_provider_values() {
    let chart = chart();

    for key in REQUIRED_SSO_VALUES {
        let mut options = enterprise_with_oidc("sso.example.com", "example-app");
        options.set(key, "");

        let err = chart.render_err(&options);
        assert_render_error_contains(&err, &format!("You must set `{}` when enabling SSO", key));
    }
}

#[test]
#[ignore = "requires helm and the Airbyte chart (HELM_CHART_PATH)"]
fn test_enterprise_config_env_vars() {
    let manifest = chart().render(&enterprise_env_options());
    assert_enterprise_env(&manifest);
}

#[test]
#[ignore = "requires helm and the Airbyte chart (HELM_CHART_PATH)"]
fn test_keycloak_init_container_default_image() {
    let manifest = chart().render(&enterprise_with_oidc("example.com", "example-app"));
    assert_eq!(keycloak_init_image(&manifest), "postgres:13-alpine");
}

#[test]
#[ignore = "requires helm and the Airbyte chart (HELM_CHART_PATH)"]
fn test_keycloak_init_container_image_override() {
    let mut options = enterprise_with_oidc("example.com", "example-app");
    options.set(
        "keycloak.initContainers.initDb.image",
        "airbyte/custom-postgres-image",
    );

    let manifest = chart().render(&options);
    assert_eq!(keycloak_init_image(&manifest), "airbyte/custom-postgres-image");
}

#[test]
fn test_enterprise_config_env_vars_canned() {
    let chart = canned(ENTERPRISE);
    let manifest = chart.render(&enterprise_env_options());

    assert_enterprise_env(&manifest);
    assert_eq!(keycloak_init_image(&manifest), "postgres:13-alpine");

    let calls = chart.renderer().calls();
    assert_eq!(
        calls[0]
            .options
            .set_values
            .get("global.enterprise.secretName")
            .map(String::as_str),
        Some("airbyte-license")
    );
}

#[test]
fn test_canned_manifest_keeps_every_document() {
    let manifest = canned(ENTERPRISE).render(&base_helm_options());

    let kinds: Vec<&str> = manifest.iter().map(|r| r.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            "ConfigMap",
            "Secret",
            "Job",
            "Deployment",
            "StatefulSet",
            "Service",
            "PodDisruptionBudget",
        ]
    );
}

#[test]
#[should_panic(expected = "AIRBYTE_LICENSE_KEY")]
fn test_canned_wrong_license_secret_is_reported() {
    let manifest = canned(ENTERPRISE).render(&base_helm_options());
    let env = main_container_env(&manifest, "Deployment", "airbyte-server");

    let expected = BTreeMap::from([(
        "AIRBYTE_LICENSE_KEY".to_string(),
        secret_var("airbyte-enterprise", "license-key"),
    )]);
    verify_env_vars(&manifest, env, &expected);
}
