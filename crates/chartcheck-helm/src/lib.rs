//! Chartcheck Helm - the boundary to the `helm` binary
//!
//! Templating is owned by helm; this crate only builds the invocation and
//! hands back what helm printed. Chart validation failures (`fail` and
//! `required` in templates) come back as [`RenderError::Helm`] with helm's
//! stderr untouched, so tests can match on the message text.

pub mod error;
pub mod install;
pub mod mock;
pub mod renderer;

pub use error::{RenderError, Result};
pub use install::InstallOptions;
pub use mock::{MockRenderer, RecordedRender};
pub use renderer::{HelmRenderer, Renderer};
