//! chartcheck - render and inspect the Airbyte Helm chart from the terminal

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod display;
mod error;

use commands::RenderArgs;
use commands::cluster::CreateArgs;

#[derive(Parser)]
#[command(name = "chartcheck")]
#[command(version)]
#[command(about = "Render and inspect Helm charts under test", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the chart and summarise the resources it produces
    Template {
        /// Release name
        release: String,

        #[command(flatten)]
        render: RenderArgs,

        /// Print helm's output unchanged
        #[arg(long)]
        raw: bool,
    },

    /// Show where each env var of a workload's first container comes from
    Env {
        /// Release name
        release: String,

        /// Resource kind (Deployment, StatefulSet, Job, Pod)
        kind: String,

        /// Resource name as rendered (e.g. airbyte-server)
        name: String,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Manage scratch kind clusters
    Cluster {
        #[command(subcommand)]
        command: ClusterCommands,
    },
}

#[derive(Subcommand)]
enum ClusterCommands {
    /// Create a cluster and leave it running
    Create {
        /// Cluster name
        #[arg(long, default_value = "chartcheck")]
        name: String,

        /// Total node count, control plane included
        #[arg(long, default_value_t = 1)]
        nodes: usize,

        /// Kubernetes version of the node image
        #[arg(long, env = "K8S_VERSION")]
        k8s_version: Option<String>,

        /// Seconds to wait for the control plane
        #[arg(long, default_value_t = 300)]
        wait: u64,

        /// Where to write the kubeconfig (default: <name>.kubeconfig)
        #[arg(long)]
        kubeconfig: Option<PathBuf>,

        /// kind executable
        #[arg(long, env = "KIND_BIN", default_value = "kind")]
        kind_bin: String,
    },

    /// Delete a cluster
    Delete {
        /// Cluster name
        #[arg(long)]
        name: String,

        /// kind executable
        #[arg(long, env = "KIND_BIN", default_value = "kind")]
        kind_bin: String,
    },
}

fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    match cli.command {
        Commands::Template {
            release,
            render,
            raw,
        } => commands::template::run(&release, &render, raw)?,

        Commands::Env {
            release,
            kind,
            name,
            render,
        } => commands::env::run(&release, &kind, &name, &render)?,

        Commands::Cluster { command } => match command {
            ClusterCommands::Create {
                name,
                nodes,
                k8s_version,
                wait,
                kubeconfig,
                kind_bin,
            } => {
                let args = CreateArgs {
                    name,
                    nodes,
                    k8s_version,
                    wait,
                    kind_bin,
                    kubeconfig,
                };
                commands::cluster::create(&args).await?
            }
            ClusterCommands::Delete { name, kind_bin } => {
                commands::cluster::delete(&name, &kind_bin)?
            }
        },
    }

    Ok(())
}
