//! Typed view of one decoded Kubernetes object

use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{
    ConfigMap, Container, Pod, PodSpec, Secret, Service, ServiceAccount,
};
use k8s_openapi::api::rbac::v1::{Role, RoleBinding};
use k8s_openapi::Resource as _;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::DynamicObject;
use serde_yaml::Value as YamlValue;

use chartcheck_core::ResourceKind;

use crate::error::{KubeError, Result};

/// One object from a rendered manifest
///
/// Kinds the harness asserts on are decoded into their `k8s-openapi` type;
/// every other kind is kept as a `DynamicObject` so it still shows up in
/// listings and lookups.
#[derive(Debug, Clone)]
pub enum Resource {
    ConfigMap(ConfigMap),
    Secret(Secret),
    Deployment(Deployment),
    StatefulSet(StatefulSet),
    Job(Job),
    Pod(Pod),
    Service(Service),
    ServiceAccount(ServiceAccount),
    Role(Role),
    RoleBinding(RoleBinding),
    Other(DynamicObject),
}

impl Resource {
    /// Decode a single YAML document
    ///
    /// A typed variant is used only when both `kind` and `apiVersion` match
    /// the built-in type, so a CRD that reuses a kind name such as `Service`
    /// stays a `DynamicObject`.
    pub fn from_yaml(doc: &str) -> Result<Self> {
        let value: YamlValue = serde_yaml::from_str(doc)?;
        Self::from_value(value)
    }

    pub fn from_value(value: YamlValue) -> Result<Self> {
        let kind = value
            .get("kind")
            .and_then(YamlValue::as_str)
            .ok_or_else(|| KubeError::NotAResource("missing `kind`".to_string()))?
            .to_string();
        let api_version = value.get("apiVersion").and_then(YamlValue::as_str);

        let typed = kind
            .parse::<ResourceKind>()
            .ok()
            .filter(|known| api_version == Some(typed_api_version(*known)));

        let Some(known) = typed else {
            let obj: DynamicObject = serde_yaml::from_value(value)?;
            if obj.types.is_none() {
                return Err(KubeError::NotAResource(format!(
                    "kind '{}' without apiVersion",
                    kind
                )));
            }
            return Ok(Resource::Other(obj));
        };

        let resource = match known {
            ResourceKind::ConfigMap => Resource::ConfigMap(serde_yaml::from_value(value)?),
            ResourceKind::Secret => Resource::Secret(serde_yaml::from_value(value)?),
            ResourceKind::Deployment => Resource::Deployment(serde_yaml::from_value(value)?),
            ResourceKind::StatefulSet => Resource::StatefulSet(serde_yaml::from_value(value)?),
            ResourceKind::Job => Resource::Job(serde_yaml::from_value(value)?),
            ResourceKind::Pod => Resource::Pod(serde_yaml::from_value(value)?),
            ResourceKind::Service => Resource::Service(serde_yaml::from_value(value)?),
            ResourceKind::ServiceAccount => {
                Resource::ServiceAccount(serde_yaml::from_value(value)?)
            }
            ResourceKind::Role => Resource::Role(serde_yaml::from_value(value)?),
            ResourceKind::RoleBinding => Resource::RoleBinding(serde_yaml::from_value(value)?),
        };
        Ok(resource)
    }

    /// The `kind` field as written in the manifest
    pub fn kind(&self) -> &str {
        match self {
            Resource::Other(obj) => obj.types.as_ref().map(|t| t.kind.as_str()).unwrap_or(""),
            typed => typed
                .resource_kind()
                .map(|k| k.as_str())
                .unwrap_or_default(),
        }
    }

    /// The typed kind, `None` for dynamic objects
    pub fn resource_kind(&self) -> Option<ResourceKind> {
        let kind = match self {
            Resource::ConfigMap(_) => ResourceKind::ConfigMap,
            Resource::Secret(_) => ResourceKind::Secret,
            Resource::Deployment(_) => ResourceKind::Deployment,
            Resource::StatefulSet(_) => ResourceKind::StatefulSet,
            Resource::Job(_) => ResourceKind::Job,
            Resource::Pod(_) => ResourceKind::Pod,
            Resource::Service(_) => ResourceKind::Service,
            Resource::ServiceAccount(_) => ResourceKind::ServiceAccount,
            Resource::Role(_) => ResourceKind::Role,
            Resource::RoleBinding(_) => ResourceKind::RoleBinding,
            Resource::Other(_) => return None,
        };
        Some(kind)
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Resource::ConfigMap(r) => &r.metadata,
            Resource::Secret(r) => &r.metadata,
            Resource::Deployment(r) => &r.metadata,
            Resource::StatefulSet(r) => &r.metadata,
            Resource::Job(r) => &r.metadata,
            Resource::Pod(r) => &r.metadata,
            Resource::Service(r) => &r.metadata,
            Resource::ServiceAccount(r) => &r.metadata,
            Resource::Role(r) => &r.metadata,
            Resource::RoleBinding(r) => &r.metadata,
            Resource::Other(r) => &r.metadata,
        }
    }

    /// `metadata.name`, empty when unset
    pub fn name(&self) -> &str {
        self.metadata().name.as_deref().unwrap_or_default()
    }

    /// Whether this resource is `kind`/`name`
    ///
    /// The kind comparison is exact so dynamic kinds match as written.
    pub fn is(&self, kind: &str, name: &str) -> bool {
        self.kind() == kind && self.name() == name
    }

    /// Pod spec of workloads and pods, `None` for everything else
    pub fn pod_spec(&self) -> Option<&PodSpec> {
        match self {
            Resource::Deployment(d) => d.spec.as_ref()?.template.spec.as_ref(),
            Resource::StatefulSet(s) => s.spec.as_ref()?.template.spec.as_ref(),
            Resource::Job(j) => j.spec.as_ref()?.template.spec.as_ref(),
            Resource::Pod(p) => p.spec.as_ref(),
            Resource::ConfigMap(_)
            | Resource::Secret(_)
            | Resource::Service(_)
            | Resource::ServiceAccount(_)
            | Resource::Role(_)
            | Resource::RoleBinding(_)
            | Resource::Other(_) => None,
        }
    }

    /// First (main) container of the pod spec
    pub fn first_container(&self) -> Option<&Container> {
        self.pod_spec()?.containers.first()
    }

    /// Container images, init containers first
    pub fn images(&self) -> Vec<&str> {
        let Some(spec) = self.pod_spec() else {
            return Vec::new();
        };
        spec.init_containers
            .iter()
            .flatten()
            .chain(spec.containers.iter())
            .filter_map(|c| c.image.as_deref())
            .collect()
    }
}

/// `apiVersion` of the built-in type behind a typed kind
fn typed_api_version(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::ConfigMap => ConfigMap::API_VERSION,
        ResourceKind::Secret => Secret::API_VERSION,
        ResourceKind::Deployment => Deployment::API_VERSION,
        ResourceKind::StatefulSet => StatefulSet::API_VERSION,
        ResourceKind::Job => Job::API_VERSION,
        ResourceKind::Pod => Pod::API_VERSION,
        ResourceKind::Service => Service::API_VERSION,
        ResourceKind::ServiceAccount => ServiceAccount::API_VERSION,
        ResourceKind::Role => Role::API_VERSION,
        ResourceKind::RoleBinding => RoleBinding::API_VERSION,
    }
}
