//! Chart rendering through `helm template`

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};

use chartcheck_core::{HarnessConfig, RenderOptions};
use tempfile::NamedTempFile;

use crate::error::{RenderError, Result};

/// Something that turns a chart plus overrides into manifest text
///
/// `HelmRenderer` is the real implementation; `MockRenderer` replays canned
/// manifests so the layers above can be tested without helm installed.
pub trait Renderer {
    /// Render `chart` as `release` and return the multi-document YAML
    fn render(&self, chart: &Path, release: &str, options: &RenderOptions) -> Result<String>;
}

/// Renders charts by running the helm binary
#[derive(Debug, Clone)]
pub struct HelmRenderer {
    program: String,
}

impl Default for HelmRenderer {
    fn default() -> Self {
        Self::new("helm")
    }
}

impl HelmRenderer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new(config.helm_bin.clone())
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Full argument list for `helm template`
    ///
    /// `overlay_files` are the on-disk copies of `options.values`, in order.
    pub fn template_args(
        chart: &Path,
        release: &str,
        options: &RenderOptions,
        overlay_files: &[&Path],
    ) -> Vec<String> {
        let mut args = vec![
            "template".to_string(),
            release.to_string(),
            chart.display().to_string(),
        ];
        if let Some(namespace) = &options.namespace {
            args.push("--namespace".to_string());
            args.push(namespace.clone());
        }
        args.extend(override_args(options, overlay_files));
        for template in &options.show_only {
            args.push("--show-only".to_string());
            args.push(template.clone());
        }
        args.extend(options.extra_args.iter().cloned());
        args
    }

    /// Run helm with `args`, returning stdout on success
    pub(crate) fn run(&self, command: &str, args: &[String]) -> Result<String> {
        tracing::debug!(program = %self.program, ?args, "running helm");

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|source| RenderError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        into_stdout(command, output)
    }
}

impl Renderer for HelmRenderer {
    fn render(&self, chart: &Path, release: &str, options: &RenderOptions) -> Result<String> {
        let overlays = write_overlays(options)?;
        let overlay_paths: Vec<&Path> = overlays.iter().map(NamedTempFile::path).collect();
        let args = Self::template_args(chart, release, options, &overlay_paths);
        self.run("template", &args)
    }
}

/// Value override arguments shared by `template` and `install`
pub(crate) fn override_args(options: &RenderOptions, overlay_files: &[&Path]) -> Vec<String> {
    let mut args = Vec::new();
    for (key, value) in &options.set_values {
        args.push("--set".to_string());
        args.push(format!("{}={}", key, value));
    }
    for (key, value) in &options.set_str_values {
        args.push("--set-string".to_string());
        args.push(format!("{}={}", key, value));
    }
    for (key, value) in &options.set_json_values {
        args.push("--set-json".to_string());
        args.push(format!("{}={}", key, value));
    }
    for file in options
        .values_files
        .iter()
        .map(|p| p.as_path())
        .chain(overlay_files.iter().copied())
    {
        args.push("-f".to_string());
        args.push(file.display().to_string());
    }
    args
}

/// Write in-memory values overlays to temporary files
///
/// The files are deleted when the returned handles drop, so callers keep
/// them alive until helm has exited.
pub(crate) fn write_overlays(options: &RenderOptions) -> Result<Vec<NamedTempFile>> {
    options
        .values
        .iter()
        .map(|values| -> Result<NamedTempFile> {
            let mut file = tempfile::Builder::new()
                .prefix("chartcheck-values-")
                .suffix(".yaml")
                .tempfile()?;
            file.write_all(values.to_yaml()?.as_bytes())?;
            file.flush()?;
            Ok(file)
        })
        .collect()
}

fn into_stdout(command: &str, output: Output) -> Result<String> {
    if !output.status.success() {
        return Err(RenderError::Helm {
            command: command.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
        });
    }

    String::from_utf8(output.stdout).map_err(|_| RenderError::InvalidOutput {
        command: command.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartcheck_core::Values;
    use std::path::PathBuf;

    fn enterprise_options() -> RenderOptions {
        let mut opts = RenderOptions::new();
        opts.set("global.edition", "enterprise")
            .set("global.auth.instanceAdmin.firstName", "Octavia")
            .set_str("global.enterprise.licenseKeySecretKey", "license-key")
            .values_file("/tmp/base-values.yaml")
            .show_only("templates/airbyte-server/deployment.yaml")
            .extra_arg("--kube-version=1.31.0");
        opts.set_json("global.jobs.kube.nodeSelector", &serde_json::json!({"pool": "jobs"}))
            .unwrap();
        opts
    }

    #[test]
    fn test_template_args() {
        let args = HelmRenderer::template_args(
            Path::new("/charts/airbyte"),
            "airbyte",
            &enterprise_options(),
            &[Path::new("/tmp/overlay.yaml")],
        );
        insta::assert_debug_snapshot!(args, @r###"
        [
            "template",
            "airbyte",
            "/charts/airbyte",
            "--set",
            "global.auth.instanceAdmin.firstName=Octavia",
            "--set",
            "global.edition=enterprise",
            "--set-string",
            "global.enterprise.licenseKeySecretKey=license-key",
            "--set-json",
            "global.jobs.kube.nodeSelector={\"pool\":\"jobs\"}",
            "-f",
            "/tmp/base-values.yaml",
            "-f",
            "/tmp/overlay.yaml",
            "--show-only",
            "templates/airbyte-server/deployment.yaml",
            "--kube-version=1.31.0",
        ]
        "###);
    }

    #[test]
    fn test_template_args_with_namespace() {
        let mut opts = RenderOptions::new();
        opts.namespace("ab");
        let args = HelmRenderer::template_args(Path::new("chart"), "rel", &opts, &[]);
        assert_eq!(args, vec!["template", "rel", "chart", "--namespace", "ab"]);
    }

    #[test]
    fn test_empty_value_is_passed_through() {
        let mut opts = RenderOptions::new();
        opts.set("global.enterprise.secretName", "");
        let args = override_args(&opts, &[]);
        assert_eq!(args, vec!["--set", "global.enterprise.secretName="]);
    }

    #[test]
    fn test_write_overlays_round_trips_values() {
        let mut opts = RenderOptions::new();
        opts.overlay(Values::new().with("global.storage.type", "minio").unwrap());

        let files = write_overlays(&opts).unwrap();
        assert_eq!(files.len(), 1);

        let path: PathBuf = files[0].path().to_path_buf();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("yaml"));
        let reread = Values::from_file(&path).unwrap();
        assert_eq!(reread.get("global.storage.type").unwrap(), "minio");

        drop(files);
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_binary_is_a_spawn_error() {
        let renderer = HelmRenderer::new("chartcheck-no-such-helm-binary");
        let err = renderer
            .render(Path::new("chart"), "airbyte", &RenderOptions::new())
            .unwrap_err();
        assert!(matches!(err, RenderError::Spawn { .. }));
        assert!(err.to_string().contains("HELM_BIN"));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_keeps_stderr() {
        // `sh -c` stands in for helm: print to stderr and fail
        let renderer = HelmRenderer::new("sh");
        let err = renderer
            .run(
                "template",
                &[
                    "-c".to_string(),
                    "echo 'Error: You must set `global.enterprise.secretName`' >&2; exit 1"
                        .to_string(),
                ],
            )
            .unwrap_err();

        assert_eq!(
            err.stderr(),
            Some("Error: You must set `global.enterprise.secretName`")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_success_returns_stdout() {
        let renderer = HelmRenderer::new("sh");
        let out = renderer
            .run(
                "template",
                &["-c".to_string(), "printf 'kind: ConfigMap\\n'".to_string()],
            )
            .unwrap();
        assert_eq!(out, "kind: ConfigMap\n");
    }
}
