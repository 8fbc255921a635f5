//! Plain-text rendering of manifests and env var provenance
//!
//! Functions here return strings without styling so they can be snapshot
//! tested; commands add colour when printing.

use indexmap::IndexMap;

use chartcheck_kube::{Manifest, ValueSource};
use k8s_openapi::api::core::v1::EnvVar;

/// `Kind` heading followed by the names of that kind, kinds in order of
/// first appearance
pub fn summary(manifest: &Manifest) -> String {
    let mut by_kind: IndexMap<&str, Vec<&str>> = IndexMap::new();
    for resource in manifest {
        by_kind.entry(resource.kind()).or_default().push(resource.name());
    }

    let mut out = String::new();
    for (kind, names) in &by_kind {
        out.push_str(&format!("{} ({})\n", kind, names.len()));
        for name in names {
            out.push_str(&format!("  {}\n", name));
        }
    }
    out.push_str(&format!(
        "{} resource(s) of {} kind(s)\n",
        manifest.len(),
        by_kind.len()
    ));
    out
}

/// One env var with where it comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvRow {
    pub name: String,
    pub source: ValueSource,
    /// Value resolved from a config map in the same manifest
    pub resolved: Option<String>,
}

/// Provenance of each env var, in declaration order
///
/// Secret values are never resolved.
pub fn env_rows(manifest: &Manifest, env: &[EnvVar]) -> Vec<EnvRow> {
    env.iter()
        .map(|var| {
            let source = ValueSource::of(var);
            let resolved = match &source {
                ValueSource::ConfigMapKey { name, key } => {
                    manifest.config_map_value(name, key).map(str::to_string)
                }
                _ => None,
            };
            EnvRow {
                name: var.name.clone(),
                source,
                resolved,
            }
        })
        .collect()
}

pub fn format_env_rows(rows: &[EnvRow]) -> String {
    let width = rows.iter().map(|r| r.name.len()).max().unwrap_or(0);

    rows.iter()
        .map(|row| match &row.resolved {
            Some(value) => format!(
                "{:width$}  {} = {}\n",
                row.name,
                row.source,
                value,
                width = width
            ),
            None => format!("{:width$}  {}\n", row.name, row.source, width = width),
        })
        .collect()
}
