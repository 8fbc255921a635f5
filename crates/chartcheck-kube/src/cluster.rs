//! Ephemeral kind clusters
//!
//! A `KindCluster` owns a cluster created through the `kind` binary and the
//! kubeconfig exported for it. Dropping the value deletes the cluster, so an
//! install-style test cleans up even when an assertion panics.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chartcheck_core::HarnessConfig;
use k8s_openapi::api::core::v1::Node;
use kube::api::{Api, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::{KubeError, Result};

/// Default time kind waits for the control plane
pub const DEFAULT_WAIT: Duration = Duration::from_secs(300);

/// How to create a cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterOptions {
    pub name: String,
    /// Worker nodes in addition to the control plane
    pub workers: usize,
    /// Node image, kind's default when unset
    pub node_image: Option<String>,
    pub wait: Duration,
    pub kind_bin: String,
}

impl ClusterOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            workers: 0,
            node_image: None,
            wait: DEFAULT_WAIT,
            kind_bin: "kind".to_string(),
        }
    }

    /// Options with a name no other test run is using
    pub fn unique(prefix: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or_default();
        Self::new(format!("{}-{}-{}", prefix, std::process::id(), nanos % 100_000))
    }

    /// Take node image and kind binary from the harness config
    pub fn from_config(name: impl Into<String>, config: &HarnessConfig) -> Self {
        let mut options = Self::new(name);
        options.node_image = config.node_image();
        options.kind_bin = config.kind_bin.clone();
        options
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_node_image(mut self, image: impl Into<String>) -> Self {
        self.node_image = Some(image.into());
        self
    }

    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    /// kind cluster config, only needed once workers are requested
    pub fn kind_config(&self) -> Option<KindConfig> {
        if self.workers == 0 {
            return None;
        }
        let mut nodes = vec![KindNode {
            role: "control-plane",
        }];
        nodes.extend((0..self.workers).map(|_| KindNode { role: "worker" }));
        Some(KindConfig {
            kind: "Cluster",
            api_version: "kind.x-k8s.io/v1alpha4",
            nodes,
        })
    }

    /// Argument list for `kind create cluster`
    pub fn create_args(&self, kubeconfig: &Path, config: Option<&Path>) -> Vec<String> {
        let mut args = vec![
            "create".to_string(),
            "cluster".to_string(),
            "--name".to_string(),
            self.name.clone(),
            "--wait".to_string(),
            format!("{}s", self.wait.as_secs()),
        ];
        if let Some(image) = &self.node_image {
            args.push("--image".to_string());
            args.push(image.clone());
        }
        if let Some(config) = config {
            args.push("--config".to_string());
            args.push(config.display().to_string());
        }
        args.push("--kubeconfig".to_string());
        args.push(kubeconfig.display().to_string());
        args
    }
}

/// Cluster config file understood by `kind create cluster --config`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KindConfig {
    kind: &'static str,
    api_version: &'static str,
    nodes: Vec<KindNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct KindNode {
    role: &'static str,
}

impl KindConfig {
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// A running kind cluster, deleted on drop
#[derive(Debug)]
pub struct KindCluster {
    name: String,
    kind_bin: String,
    kubeconfig: NamedTempFile,
    deleted: bool,
}

impl KindCluster {
    /// Create the cluster and wait for the control plane
    pub fn create(options: &ClusterOptions) -> Result<Self> {
        let kubeconfig = tempfile::Builder::new()
            .prefix("chartcheck-kubeconfig-")
            .suffix(".yaml")
            .tempfile()?;

        let config_file = match options.kind_config() {
            Some(config) => {
                let file = tempfile::Builder::new()
                    .prefix("chartcheck-kind-")
                    .suffix(".yaml")
                    .tempfile()?;
                std::fs::write(file.path(), config.to_yaml()?)?;
                Some(file)
            }
            None => None,
        };

        let args = options.create_args(
            kubeconfig.path(),
            config_file.as_ref().map(NamedTempFile::path),
        );

        tracing::info!(
            cluster = %options.name,
            workers = options.workers,
            image = options.node_image.as_deref().unwrap_or("default"),
            "creating kind cluster"
        );
        run_kind(&options.kind_bin, "create cluster", &args)?;

        Ok(Self {
            name: options.name.clone(),
            kind_bin: options.kind_bin.clone(),
            kubeconfig,
            deleted: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kubeconfig exported for this cluster, valid while `self` lives
    pub fn kubeconfig_path(&self) -> &Path {
        self.kubeconfig.path()
    }

    /// Copy the kubeconfig somewhere that outlives the cluster handle
    pub fn export_kubeconfig(&self, to: impl Into<PathBuf>) -> Result<PathBuf> {
        let to = to.into();
        std::fs::copy(self.kubeconfig.path(), &to)?;
        Ok(to)
    }

    /// API client for this cluster
    pub async fn client(&self) -> Result<Client> {
        let kubeconfig = Kubeconfig::read_from(self.kubeconfig.path())?;
        let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?;
        Ok(Client::try_from(config)?)
    }

    /// Number of nodes reporting `Ready=True`
    pub async fn ready_nodes(&self) -> Result<usize> {
        let nodes: Api<Node> = Api::all(self.client().await?);
        let list = nodes.list(&ListParams::default()).await?;
        Ok(list.items.iter().filter(|node| is_node_ready(node)).count())
    }

    /// Delete the cluster now instead of on drop
    pub fn delete(mut self) -> Result<()> {
        self.delete_cluster()
    }

    /// Leave the cluster running after the handle goes away
    ///
    /// Returns the cluster name; the temporary kubeconfig is still removed,
    /// so export it first if it is needed.
    pub fn detach(mut self) -> String {
        self.deleted = true;
        std::mem::take(&mut self.name)
    }

    /// Delete a cluster this process does not hold a handle for
    pub fn delete_by_name(kind_bin: &str, name: &str) -> Result<()> {
        tracing::info!(cluster = %name, "deleting kind cluster");
        let args = [
            "delete".to_string(),
            "cluster".to_string(),
            "--name".to_string(),
            name.to_string(),
        ];
        run_kind(kind_bin, "delete cluster", &args).map(|_| ())
    }

    fn delete_cluster(&mut self) -> Result<()> {
        if self.deleted {
            return Ok(());
        }
        self.deleted = true;
        Self::delete_by_name(&self.kind_bin, &self.name)
    }
}

impl Drop for KindCluster {
    fn drop(&mut self) {
        if let Err(e) = self.delete_cluster() {
            tracing::warn!(cluster = %self.name, error = %e, "failed to delete kind cluster");
        }
    }
}

fn is_node_ready(node: &Node) -> bool {
    node.status
        .as_ref()
        .and_then(|s| s.conditions.as_ref())
        .is_some_and(|conditions| {
            conditions
                .iter()
                .any(|c| c.type_ == "Ready" && c.status == "True")
        })
}

fn run_kind(program: &str, command: &str, args: &[String]) -> Result<String> {
    tracing::debug!(program, ?args, "running kind");

    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|source| KubeError::Spawn {
            program: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(KubeError::Kind {
            command: command.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
