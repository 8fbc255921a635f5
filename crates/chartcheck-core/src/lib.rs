//! Chartcheck Core - shared types for the chart test harness
//!
//! This crate provides the foundational types used throughout chartcheck:
//! - `RenderOptions`: value overrides and template selection for one render
//! - `Values`: in-memory values trees with deep merge support
//! - `App`: a deployable unit of a release and its expected resource name
//! - `ResourceKind`: the Kubernetes kinds the harness decodes
//! - `HarnessConfig`: chart location and tool settings resolved at start-up

pub mod app;
pub mod config;
pub mod error;
pub mod kind;
pub mod options;
pub mod values;

pub use app::{App, DEFAULT_RELEASE};
pub use config::HarnessConfig;
pub use error::{CoreError, Result};
pub use kind::ResourceKind;
pub use options::RenderOptions;
pub use values::Values;
