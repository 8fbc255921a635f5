//! Render options: the value overrides and template selection for one render

use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::{CoreError, Result};
use crate::values::Values;

/// Everything that varies between two renders of the same chart
///
/// Override maps are ordered so the resulting helm argument list is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOptions {
    /// `--set key=value` overrides
    pub set_values: BTreeMap<String, String>,
    /// `--set-string key=value` overrides (never type-coerced by helm)
    pub set_str_values: BTreeMap<String, String>,
    /// `--set-json key=<json>` overrides, stored already encoded
    pub set_json_values: BTreeMap<String, String>,
    /// `-f file` values files, applied in order
    pub values_files: Vec<PathBuf>,
    /// In-memory values documents, applied after `values_files`
    pub values: Vec<Values>,
    /// `--namespace`
    pub namespace: Option<String>,
    /// `--show-only` template paths; empty renders every template
    pub show_only: Vec<String>,
    /// Extra arguments appended verbatim to the helm invocation
    pub extra_args: Vec<String>,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a `--set` override, replacing any previous value for `key`
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.set_values.insert(key.into(), value.into());
        self
    }

    pub fn set_str(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.set_str_values.insert(key.into(), value.into());
        self
    }

    /// Set a `--set-json` override from a JSON value
    pub fn set_json(&mut self, key: impl Into<String>, value: &JsonValue) -> Result<&mut Self> {
        let encoded = serde_json::to_string(value)?;
        self.set_json_values.insert(key.into(), encoded);
        Ok(self)
    }

    pub fn values_file(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.values_files.push(path.into());
        self
    }

    pub fn overlay(&mut self, values: Values) -> &mut Self {
        self.values.push(values);
        self
    }

    pub fn namespace(&mut self, namespace: impl Into<String>) -> &mut Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn show_only(&mut self, template: impl Into<String>) -> &mut Self {
        self.show_only.push(template.into());
        self
    }

    pub fn extra_arg(&mut self, arg: impl Into<String>) -> &mut Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Remove an override from every override map
    pub fn unset(&mut self, key: &str) -> &mut Self {
        self.set_values.remove(key);
        self.set_str_values.remove(key);
        self.set_json_values.remove(key);
        self
    }

    /// Apply `key=value` command-line style arguments as `--set` overrides
    pub fn apply_set_args<S: AsRef<str>>(&mut self, args: &[S]) -> Result<&mut Self> {
        for arg in args {
            let (key, value) = parse_set_arg(arg.as_ref())?;
            self.set_values.insert(key, value);
        }
        Ok(self)
    }

    /// Apply `key=<json>` arguments as `--set-json` overrides, validating the JSON
    pub fn apply_set_json_args<S: AsRef<str>>(&mut self, args: &[S]) -> Result<&mut Self> {
        for arg in args {
            let (key, raw) = parse_set_arg(arg.as_ref())?;
            let value: JsonValue = serde_json::from_str(&raw)?;
            self.set_json(key, &value)?;
        }
        Ok(self)
    }
}

/// Split a `key=value` argument at the first `=`
pub fn parse_set_arg(arg: &str) -> Result<(String, String)> {
    let (key, value) = arg.split_once('=').ok_or_else(|| CoreError::Values {
        message: format!("Invalid --set format: '{}'. Expected key=value", arg),
    })?;

    if key.trim().is_empty() {
        return Err(CoreError::Values {
            message: format!("Invalid --set format: '{}'. Key is empty", arg),
        });
    }

    Ok((key.trim().to_string(), value.to_string()))
}
