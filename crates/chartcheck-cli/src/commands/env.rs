//! Env command - show where each env var of a workload comes from

use console::style;

use chartcheck_core::ResourceKind;

use crate::commands::RenderArgs;
use crate::display;
use crate::error::{CliError, Result};

pub fn run(release: &str, kind: &str, name: &str, render: &RenderArgs) -> Result<()> {
    // Accept `deployment` as well as `Deployment`; unknown kinds are matched as written
    let kind = kind
        .parse::<ResourceKind>()
        .map(|k| k.as_str().to_string())
        .unwrap_or_else(|_| kind.to_string());

    let manifest = render.render_manifest(release)?;
    let resource = manifest
        .find(&kind, name)
        .ok_or_else(|| CliError::NotFound {
            kind: kind.clone(),
            name: name.to_string(),
        })?;
    let container = resource
        .first_container()
        .ok_or_else(|| CliError::NoContainers {
            kind: kind.clone(),
            name: name.to_string(),
        })?;

    println!(
        "{} {}/{} container {}",
        style("→").blue().bold(),
        kind,
        style(name).cyan(),
        style(&container.name).yellow()
    );

    let env = container.env.as_deref().unwrap_or_default();
    if env.is_empty() {
        println!("  (no env vars)");
        return Ok(());
    }
    print!("{}", display::format_env_rows(&display::env_rows(&manifest, env)));
    Ok(())
}
