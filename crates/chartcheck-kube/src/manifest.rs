//! Decoding rendered manifests and looking resources up
//!
//! Rendering a chart yields one long string of YAML documents. Decoding is
//! best-effort: a document that is empty, malformed, or not a Kubernetes
//! object is skipped rather than failing the whole manifest, because tests
//! assert on the presence of the resources they care about anyway.

use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{ConfigMap, Pod, Secret, Service, ServiceAccount};
use k8s_openapi::api::rbac::v1::{Role, RoleBinding};

use chartcheck_core::App;

use crate::resource::Resource;

/// Decoded resources of one render, in document order
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    resources: Vec<Resource>,
}

/// Typed lookup by name for one `Resource` variant
macro_rules! typed_lookup {
    ($(#[$doc:meta])* $fn_name:ident, $variant:ident, $ty:ty) => {
        $(#[$doc])*
        pub fn $fn_name(&self, name: &str) -> Option<&$ty> {
            self.resources.iter().find_map(|r| match r {
                Resource::$variant(obj) if r.name() == name => Some(obj),
                _ => None,
            })
        }
    };
}

impl Manifest {
    /// Decode every resource document in `yaml`
    pub fn parse(yaml: &str) -> Self {
        let resources = split_documents(yaml)
            .into_iter()
            .enumerate()
            .filter_map(|(index, doc)| match Resource::from_yaml(&doc) {
                Ok(resource) => Some(resource),
                Err(e) => {
                    tracing::debug!(document = index, error = %e, "skipping undecodable document");
                    None
                }
            })
            .collect();

        Self { resources }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// First resource with this kind and name
    pub fn find(&self, kind: &str, name: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.is(kind, name))
    }

    /// The resource an `App` renders to
    pub fn find_app(&self, app: &App) -> Option<&Resource> {
        self.find(app.kind.as_str(), &app.fqn())
    }

    /// All resources of one kind, in document order
    pub fn of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Resource> + 'a {
        self.resources.iter().filter(move |r| r.kind() == kind)
    }

    typed_lookup!(config_map, ConfigMap, ConfigMap);
    typed_lookup!(secret, Secret, Secret);
    typed_lookup!(deployment, Deployment, Deployment);
    typed_lookup!(stateful_set, StatefulSet, StatefulSet);
    typed_lookup!(job, Job, Job);
    typed_lookup!(pod, Pod, Pod);
    typed_lookup!(service, Service, Service);
    typed_lookup!(service_account, ServiceAccount, ServiceAccount);
    typed_lookup!(role, Role, Role);
    typed_lookup!(role_binding, RoleBinding, RoleBinding);

    /// Value of `key` in config map `name`
    pub fn config_map_value(&self, name: &str, key: &str) -> Option<&str> {
        self.config_map(name)?
            .data
            .as_ref()?
            .get(key)
            .map(String::as_str)
    }

    /// Value of `key` in secret `name`, from `stringData` or decoded `data`
    pub fn secret_value(&self, name: &str, key: &str) -> Option<String> {
        let secret = self.secret(name)?;
        if let Some(value) = secret.string_data.as_ref().and_then(|d| d.get(key)) {
            return Some(value.clone());
        }
        secret
            .data
            .as_ref()?
            .get(key)
            .map(|bytes| String::from_utf8_lossy(&bytes.0).into_owned())
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a Resource;
    type IntoIter = std::slice::Iter<'a, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.iter()
    }
}

/// Split multi-document YAML into document bodies
///
/// A separator is a column-0 line that is `---` or starts with `--- `.
/// Anything after the marker on that line is discarded, so an inline
/// `--- {kind: A}` document is lost; helm never writes one. Full-line comments
/// at column 0 (helm's `# Source:` headers) are dropped; indented `#` lines
/// are left alone since they may be block scalar content. Documents that are
/// empty after that are omitted.
pub fn split_documents(yaml: &str) -> Vec<String> {
    let mut docs = Vec::new();
    let mut current = String::new();

    let mut flush = |current: &mut String| {
        if !current.trim().is_empty() {
            docs.push(std::mem::take(current));
        } else {
            current.clear();
        }
    };

    for line in yaml.lines() {
        if is_separator(line) {
            flush(&mut current);
            continue;
        }
        if line.starts_with('#') {
            continue;
        }
        current.push_str(line);
        current.push('\n');
    }
    flush(&mut current);

    docs
}

fn is_separator(line: &str) -> bool {
    let line = line.trim_end();
    line == "---" || line.starts_with("--- ")
}
