//! Expectations on env vars and volume mounts
//!
//! Expectations are small value types built with copy-setters: every setter
//! takes `&self` and returns a new expectation, so a shared base can be
//! specialised per test without being changed.
//!
//! ```ignore
//! let base = ExpectedEnvVar::config_map().ref_name("airbyte-airbyte-env");
//! let host = base.ref_key("DATABASE_HOST");
//! let port = base.ref_key("DATABASE_PORT");
//! ```

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{EnvVar, PodSpec, Volume};

use crate::env::{ValueSource, env_var_map};
use crate::error::Mismatch;
use crate::manifest::Manifest;

const CONFIG_MAP: &str = "configmap";
const SECRET: &str = "secret";

/// Reference fields of an expected env var
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvVarRef {
    /// Name of the referenced ConfigMap or Secret
    pub ref_name: String,
    /// Key inside the referenced object
    pub ref_key: String,
    /// Env var name, checked only when set
    pub name: Option<String>,
    /// Value the referenced key must hold, checked only when set
    pub value: Option<String>,
}

/// An env var expected to be sourced from a ConfigMap or Secret key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedEnvVar {
    FromConfigMap(EnvVarRef),
    FromSecret(EnvVarRef),
}

impl ExpectedEnvVar {
    pub fn config_map() -> Self {
        ExpectedEnvVar::FromConfigMap(EnvVarRef::default())
    }

    pub fn secret() -> Self {
        ExpectedEnvVar::FromSecret(EnvVarRef::default())
    }

    pub fn reference(&self) -> &EnvVarRef {
        match self {
            ExpectedEnvVar::FromConfigMap(r) | ExpectedEnvVar::FromSecret(r) => r,
        }
    }

    fn with(&self, update: impl FnOnce(&mut EnvVarRef)) -> Self {
        let mut next = self.clone();
        match &mut next {
            ExpectedEnvVar::FromConfigMap(r) | ExpectedEnvVar::FromSecret(r) => update(r),
        }
        next
    }

    pub fn ref_name(&self, ref_name: impl Into<String>) -> Self {
        let ref_name = ref_name.into();
        self.with(|r| r.ref_name = ref_name)
    }

    pub fn ref_key(&self, ref_key: impl Into<String>) -> Self {
        let ref_key = ref_key.into();
        self.with(|r| r.ref_key = ref_key)
    }

    pub fn name(&self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.with(|r| r.name = Some(name))
    }

    pub fn value(&self, value: impl Into<String>) -> Self {
        let value = value.into();
        self.with(|r| r.value = Some(value))
    }

    fn source_kind(&self) -> &'static str {
        match self {
            ExpectedEnvVar::FromConfigMap(_) => CONFIG_MAP,
            ExpectedEnvVar::FromSecret(_) => SECRET,
        }
    }

    /// Compare against an actual env var
    ///
    /// `manifest` is only consulted when a value is expected, to resolve the
    /// referenced key.
    pub fn check(&self, manifest: &Manifest, actual: &EnvVar) -> Result<(), Mismatch> {
        let expected = self.reference();
        let source_kind = self.source_kind();

        if let Some(name) = &expected.name
            && *name != actual.name
        {
            return Err(Mismatch::Name {
                expected: name.clone(),
                actual: actual.name.clone(),
            });
        }

        let source = ValueSource::of(actual);
        let (ref_name, ref_key) = match (self, &source) {
            (ExpectedEnvVar::FromConfigMap(_), ValueSource::ConfigMapKey { name, key })
            | (ExpectedEnvVar::FromSecret(_), ValueSource::SecretKey { name, key }) => (name, key),
            _ => {
                return Err(Mismatch::Source {
                    expected: format!("{} key", source_kind),
                    actual: source.to_string(),
                });
            }
        };

        if *ref_name != expected.ref_name {
            return Err(Mismatch::RefName {
                source_kind: source_kind.to_string(),
                expected: expected.ref_name.clone(),
                actual: ref_name.clone(),
            });
        }
        if *ref_key != expected.ref_key {
            return Err(Mismatch::RefKey {
                source_kind: source_kind.to_string(),
                expected: expected.ref_key.clone(),
                actual: ref_key.clone(),
            });
        }

        match &expected.value {
            Some(value) => self.check_value(manifest, value),
            None => Ok(()),
        }
    }

    fn check_value(&self, manifest: &Manifest, value: &str) -> Result<(), Mismatch> {
        let expected = self.reference();
        let source_kind = self.source_kind().to_string();
        let missing_object = || Mismatch::MissingObject {
            source_kind: source_kind.clone(),
            name: expected.ref_name.clone(),
        };

        let actual = match self {
            ExpectedEnvVar::FromConfigMap(_) => {
                manifest
                    .config_map(&expected.ref_name)
                    .ok_or_else(missing_object)?;
                manifest
                    .config_map_value(&expected.ref_name, &expected.ref_key)
                    .map(str::to_string)
            }
            ExpectedEnvVar::FromSecret(_) => {
                manifest.secret(&expected.ref_name).ok_or_else(missing_object)?;
                manifest.secret_value(&expected.ref_name, &expected.ref_key)
            }
        };

        let Some(actual) = actual else {
            return Err(Mismatch::MissingKey {
                source_kind,
                name: expected.ref_name.clone(),
                key: expected.ref_key.clone(),
            });
        };
        if actual != value {
            return Err(Mismatch::Value {
                source_kind,
                name: expected.ref_name.clone(),
                key: expected.ref_key.clone(),
                expected: value.to_string(),
                actual,
            });
        }
        Ok(())
    }
}

/// Assert that `actual` matches `expected`
///
/// # Panics
///
/// Panics with the mismatch description when the comparison fails.
#[track_caller]
pub fn verify_env_var(manifest: &Manifest, actual: &EnvVar, expected: &ExpectedEnvVar) {
    if let Err(mismatch) = expected.check(manifest, actual) {
        panic!("env var '{}': {}", actual.name, mismatch);
    }
}

/// Check a set of expectations keyed by env var name
///
/// Returns every failure, in name order. An empty result means all
/// expectations hold.
pub fn check_env_vars(
    manifest: &Manifest,
    env: &[EnvVar],
    expected: &BTreeMap<String, ExpectedEnvVar>,
) -> Vec<(String, Mismatch)> {
    let actual = env_var_map(env);

    expected
        .iter()
        .filter_map(|(name, expectation)| {
            let result = match actual.get(name.as_str()) {
                Some(var) => expectation.check(manifest, var),
                None => Err(Mismatch::MissingEnvVar(name.clone())),
            };
            result.err().map(|mismatch| (name.clone(), mismatch))
        })
        .collect()
}

/// Assert a set of expectations keyed by env var name
///
/// # Panics
///
/// Panics listing every failed expectation.
#[track_caller]
pub fn verify_env_vars(
    manifest: &Manifest,
    env: &[EnvVar],
    expected: &BTreeMap<String, ExpectedEnvVar>,
) {
    let failures = check_env_vars(manifest, env, expected);
    if !failures.is_empty() {
        let lines: Vec<String> = failures
            .iter()
            .map(|(name, mismatch)| format!("  {}: {}", name, mismatch))
            .collect();
        panic!(
            "{} env var expectation(s) failed:\n{}",
            failures.len(),
            lines.join("\n")
        );
    }
}

/// Fields of an expected volume mount
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountRef {
    /// Pod volume name, also the mount name
    pub volume: String,
    pub mount_path: String,
    /// Absent and empty compare equal
    pub sub_path: Option<String>,
    /// Name of the ConfigMap or Secret backing the volume
    pub ref_name: String,
}

/// A volume expected to be backed by a ConfigMap or Secret and mounted in
/// the first container
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedVolumeMount {
    FromConfigMap(MountRef),
    FromSecret(MountRef),
}

impl ExpectedVolumeMount {
    pub fn config_map() -> Self {
        ExpectedVolumeMount::FromConfigMap(MountRef::default())
    }

    pub fn secret() -> Self {
        ExpectedVolumeMount::FromSecret(MountRef::default())
    }

    pub fn mount(&self) -> &MountRef {
        match self {
            ExpectedVolumeMount::FromConfigMap(m) | ExpectedVolumeMount::FromSecret(m) => m,
        }
    }

    fn with(&self, update: impl FnOnce(&mut MountRef)) -> Self {
        let mut next = self.clone();
        match &mut next {
            ExpectedVolumeMount::FromConfigMap(m) | ExpectedVolumeMount::FromSecret(m) => {
                update(m)
            }
        }
        next
    }

    pub fn volume(&self, volume: impl Into<String>) -> Self {
        let volume = volume.into();
        self.with(|m| m.volume = volume)
    }

    pub fn mount_path(&self, mount_path: impl Into<String>) -> Self {
        let mount_path = mount_path.into();
        self.with(|m| m.mount_path = mount_path)
    }

    pub fn sub_path(&self, sub_path: impl Into<String>) -> Self {
        let sub_path = sub_path.into();
        self.with(|m| m.sub_path = Some(sub_path))
    }

    pub fn ref_name(&self, ref_name: impl Into<String>) -> Self {
        let ref_name = ref_name.into();
        self.with(|m| m.ref_name = ref_name)
    }

    fn source_kind(&self) -> &'static str {
        match self {
            ExpectedVolumeMount::FromConfigMap(_) => CONFIG_MAP,
            ExpectedVolumeMount::FromSecret(_) => SECRET,
        }
    }

    /// Compare against a pod spec
    pub fn check(&self, spec: &PodSpec) -> Result<(), Mismatch> {
        let expected = self.mount();

        let volume = spec
            .volumes
            .iter()
            .flatten()
            .find(|v| v.name == expected.volume)
            .ok_or_else(|| Mismatch::MissingVolume(expected.volume.clone()))?;

        let backing = match self {
            ExpectedVolumeMount::FromConfigMap(_) => {
                volume.config_map.as_ref().map(|c| c.name.as_str())
            }
            ExpectedVolumeMount::FromSecret(_) => volume
                .secret
                .as_ref()
                .map(|s| s.secret_name.as_deref().unwrap_or_default()),
        };
        let Some(backing) = backing else {
            return Err(Mismatch::VolumeSource {
                volume: expected.volume.clone(),
                expected: self.source_kind().to_string(),
                actual: describe_volume_source(volume).to_string(),
            });
        };
        if backing != expected.ref_name {
            return Err(Mismatch::RefName {
                source_kind: self.source_kind().to_string(),
                expected: expected.ref_name.clone(),
                actual: backing.to_string(),
            });
        }

        let container = spec.containers.first().ok_or(Mismatch::NoContainers)?;
        let mount = container
            .volume_mounts
            .iter()
            .flatten()
            .find(|m| m.name == expected.volume)
            .ok_or_else(|| Mismatch::MissingMount {
                container: container.name.clone(),
                volume: expected.volume.clone(),
            })?;

        if mount.mount_path != expected.mount_path {
            return Err(Mismatch::MountPath {
                volume: expected.volume.clone(),
                expected: expected.mount_path.clone(),
                actual: mount.mount_path.clone(),
            });
        }

        let want = expected.sub_path.as_deref().unwrap_or_default();
        let got = mount.sub_path.as_deref().unwrap_or_default();
        if want != got {
            return Err(Mismatch::SubPath {
                volume: expected.volume.clone(),
                expected: want.to_string(),
                actual: got.to_string(),
            });
        }

        Ok(())
    }
}

/// Assert that `spec` carries the expected volume and mount
///
/// # Panics
///
/// Panics with the mismatch description when the comparison fails.
#[track_caller]
pub fn verify_volume_mount(spec: &PodSpec, expected: &ExpectedVolumeMount) {
    if let Err(mismatch) = expected.check(spec) {
        panic!("volume '{}': {}", expected.mount().volume, mismatch);
    }
}

fn describe_volume_source(volume: &Volume) -> &'static str {
    if volume.config_map.is_some() {
        CONFIG_MAP
    } else if volume.secret.is_some() {
        SECRET
    } else if volume.empty_dir.is_some() {
        "emptyDir"
    } else if volume.persistent_volume_claim.is_some() {
        "persistentVolumeClaim"
    } else if volume.projected.is_some() {
        "projected"
    } else if volume.host_path.is_some() {
        "hostPath"
    } else {
        "another source"
    }
}
