//! CLI error type
//!
//! Library errors are converted here so every failure reaches the terminal
//! as a miette report with a code and, where we have one, a hint.

use miette::Diagnostic;
use thiserror::Error;

use chartcheck_core::CoreError;
use chartcheck_helm::RenderError;
use chartcheck_kube::KubeError;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Harness configuration could not be resolved
    #[error("Configuration error: {message}")]
    #[diagnostic(code(chartcheck::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// helm failed to render the chart
    #[error("Render failed: {message}")]
    #[diagnostic(code(chartcheck::cli::render))]
    Render {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// The requested object is not in the rendered manifest
    #[error("{kind}/{name} not found in the rendered manifest")]
    #[diagnostic(
        code(chartcheck::cli::not_found),
        help("run `chartcheck template` to list what the chart renders")
    )]
    NotFound { kind: String, name: String },

    /// The object has no pod template
    #[error("{kind}/{name} has no containers")]
    #[diagnostic(code(chartcheck::cli::no_containers))]
    NoContainers { kind: String, name: String },

    /// kind cluster operations failed
    #[error("Cluster error: {message}")]
    #[diagnostic(code(chartcheck::cli::cluster))]
    Cluster {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("IO error: {0}")]
    #[diagnostic(code(chartcheck::cli::io))]
    Io(#[from] std::io::Error),
}

impl From<CoreError> for CliError {
    fn from(e: CoreError) -> Self {
        let help = match &e {
            CoreError::ChartNotFound { .. } | CoreError::ChartPathUnresolved { .. } => {
                Some("pass --chart or set HELM_CHART_PATH".to_string())
            }
            _ => None,
        };
        CliError::Config {
            message: e.to_string(),
            help,
        }
    }
}

impl From<RenderError> for CliError {
    fn from(e: RenderError) -> Self {
        let help = match &e {
            RenderError::Spawn { .. } => Some("install helm or set HELM_BIN".to_string()),
            RenderError::Helm { .. } => {
                Some("the message above comes from helm itself".to_string())
            }
            _ => None,
        };
        CliError::Render {
            message: e.to_string(),
            help,
        }
    }
}

impl From<KubeError> for CliError {
    fn from(e: KubeError) -> Self {
        let help = match &e {
            KubeError::Spawn { .. } => Some("install kind or set KIND_BIN".to_string()),
            KubeError::Kind { .. } => Some("is docker running?".to_string()),
            _ => None,
        };
        CliError::Cluster {
            message: e.to_string(),
            help,
        }
    }
}
