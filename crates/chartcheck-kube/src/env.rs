//! Container environment helpers

use std::collections::BTreeMap;
use std::fmt;

use k8s_openapi::api::core::v1::EnvVar;

/// Index env vars by name
///
/// When a name is declared twice the later declaration wins, which is what
/// the kubelet does.
pub fn env_var_map(env: &[EnvVar]) -> BTreeMap<&str, &EnvVar> {
    env.iter().map(|var| (var.name.as_str(), var)).collect()
}

/// Where an env var takes its value from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Inline `value`, possibly unset
    Literal(Option<String>),
    ConfigMapKey { name: String, key: String },
    SecretKey { name: String, key: String },
    /// Field or resource refs, which the harness does not inspect
    Other(String),
}

impl ValueSource {
    pub fn of(var: &EnvVar) -> Self {
        let Some(from) = var.value_from.as_ref() else {
            return ValueSource::Literal(var.value.clone());
        };

        if let Some(sel) = &from.config_map_key_ref {
            return ValueSource::ConfigMapKey {
                name: sel.name.clone(),
                key: sel.key.clone(),
            };
        }
        if let Some(sel) = &from.secret_key_ref {
            return ValueSource::SecretKey {
                name: sel.name.clone(),
                key: sel.key.clone(),
            };
        }
        if from.field_ref.is_some() {
            return ValueSource::Other("fieldRef".to_string());
        }
        if from.resource_field_ref.is_some() {
            return ValueSource::Other("resourceFieldRef".to_string());
        }
        ValueSource::Other("empty valueFrom".to_string())
    }

    pub fn is_config_map(&self) -> bool {
        matches!(self, ValueSource::ConfigMapKey { .. })
    }

    pub fn is_secret(&self) -> bool {
        matches!(self, ValueSource::SecretKey { .. })
    }
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSource::Literal(Some(v)) => write!(f, "literal '{}'", v),
            ValueSource::Literal(None) => write!(f, "no value"),
            ValueSource::ConfigMapKey { name, key } => write!(f, "configmap {}/{}", name, key),
            ValueSource::SecretKey { name, key } => write!(f, "secret {}/{}", name, key),
            ValueSource::Other(what) => f.write_str(what),
        }
    }
}
