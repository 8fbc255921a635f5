//! Cluster commands - scratch kind clusters for trying the chart by hand

use std::path::PathBuf;
use std::time::Duration;

use console::style;

use chartcheck_kube::{ClusterOptions, KindCluster};

use crate::error::{CliError, Result};

pub struct CreateArgs {
    pub name: String,
    pub nodes: usize,
    pub k8s_version: Option<String>,
    pub wait: u64,
    pub kind_bin: String,
    pub kubeconfig: Option<PathBuf>,
}

impl CreateArgs {
    pub fn options(&self) -> Result<ClusterOptions> {
        if self.nodes == 0 {
            return Err(CliError::Cluster {
                message: "a cluster needs at least one node".to_string(),
                help: Some("--nodes counts the control plane".to_string()),
            });
        }

        let mut options = ClusterOptions::new(&self.name)
            .with_workers(self.nodes - 1)
            .with_wait(Duration::from_secs(self.wait));
        if let Some(version) = &self.k8s_version {
            options = options.with_node_image(format!(
                "kindest/node:v{}",
                version.trim_start_matches('v')
            ));
        }
        options.kind_bin = self.kind_bin.clone();
        Ok(options)
    }

    fn kubeconfig_target(&self) -> PathBuf {
        self.kubeconfig
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.kubeconfig", self.name)))
    }
}

pub async fn create(args: &CreateArgs) -> Result<()> {
    let options = args.options()?;

    println!(
        "{} Creating kind cluster {} ({} node(s))",
        style("→").blue().bold(),
        style(&options.name).cyan(),
        args.nodes
    );

    let cluster = KindCluster::create(&options)?;
    let ready = cluster.ready_nodes().await?;
    let kubeconfig = cluster.export_kubeconfig(args.kubeconfig_target())?;
    let name = cluster.detach();

    println!(
        "{} Cluster {} is up, {}/{} node(s) ready",
        style("✓").green().bold(),
        style(&name).cyan(),
        ready,
        args.nodes
    );
    println!("  export KUBECONFIG={}", kubeconfig.display());
    println!("  chartcheck cluster delete --name {}", name);
    Ok(())
}

pub fn delete(name: &str, kind_bin: &str) -> Result<()> {
    KindCluster::delete_by_name(kind_bin, name)?;
    println!("{} Deleted kind cluster {}", style("✓").green().bold(), style(name).cyan());
    Ok(())
}
