//! Value presets shared by the suites
//!
//! Each call returns a fresh `RenderOptions`; tests add their own overrides
//! on top without affecting other tests.

use chartcheck_core::RenderOptions;

pub const ENTERPRISE_ADMIN_FIRST_NAME: &str = "Octavia";
pub const ENTERPRISE_ADMIN_LAST_NAME: &str = "Squidington";

/// Options for a plain community render
pub fn base_helm_options() -> RenderOptions {
    RenderOptions::new()
}

/// Enterprise edition with the instance admin values the chart requires
pub fn base_helm_options_for_enterprise_with_values() -> RenderOptions {
    let mut options = base_helm_options();
    options
        .set("global.edition", "enterprise")
        .set("global.auth.instanceAdmin.firstName", ENTERPRISE_ADMIN_FIRST_NAME)
        .set("global.auth.instanceAdmin.lastName", ENTERPRISE_ADMIN_LAST_NAME);
    options
}

/// Enterprise preset plus a complete OIDC identity provider
///
/// `domain` and `app_name` vary between tests; secret names and keys do not.
pub fn enterprise_with_oidc(domain: &str, app_name: &str) -> RenderOptions {
    let mut options = base_helm_options_for_enterprise_with_values();
    options
        .set("global.auth.identityProvider.secretName", "sso-secrets")
        .set("global.auth.identityProvider.type", "oidc")
        .set("global.auth.identityProvider.oidc.domain", domain)
        .set("global.auth.identityProvider.oidc.appName", app_name)
        .set("global.auth.identityProvider.oidc.clientIdSecretKey", "client-id")
        .set(
            "global.auth.identityProvider.oidc.clientSecretSecretKey",
            "client-secret",
        );
    options
}
