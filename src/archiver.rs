//! External archiver command model and detection.

use crate::config::ArchiverConfig;
use anyhow::Context;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Errors raised at the archiver process boundary.
#[derive(Debug, thiserror::Error)]
pub enum ArchiverError {
    /// The archiver command could not be found.
    #[error("archiver not found: {command}")]
    NotFound { command: String },
}

/// Fully resolved invocation template for the external archiver.
///
/// Every conversion job runs the same command shape with a different input
/// file: `<command> -c <config_path> <input> --root <output_root> [--verbose]`.
#[derive(Debug, Clone)]
pub struct ArchiverCommand {
    pub command: String,
    pub config_path: PathBuf,
    pub output_root: PathBuf,
    pub verbose: bool,
}

impl ArchiverCommand {
    /// Build the template from config, requiring the two archiver paths.
    pub fn from_config(config: &ArchiverConfig) -> anyhow::Result<Self> {
        let config_path = config
            .config_path
            .clone()
            .context("archiver.config_path is not set (add it to the config file)")?;
        let output_root = config
            .output_root
            .clone()
            .context("archiver.output_root is not set (add it to the config file)")?;

        Ok(Self {
            command: config.command.clone(),
            config_path,
            output_root,
            verbose: config.verbose,
        })
    }

    /// Arguments handed to the archiver for one capture file.
    pub fn args_for(&self, input: &Path) -> Vec<OsString> {
        let mut args = vec![
            OsString::from("-c"),
            self.config_path.clone().into_os_string(),
            input.as_os_str().to_os_string(),
            OsString::from("--root"),
            self.output_root.clone().into_os_string(),
        ];
        if self.verbose {
            args.push(OsString::from("--verbose"));
        }
        args
    }

    /// Build a ready-to-spawn command for one capture file.
    pub fn build(&self, input: &Path) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.args(self.args_for(input));
        cmd
    }

    /// Render the invocation as a single line for dry-run display.
    pub fn render(&self, input: &Path) -> String {
        let mut line = format!(
            "{} -c {} {} --root {}",
            self.command,
            self.config_path.display(),
            input.display(),
            self.output_root.display()
        );
        if self.verbose {
            line.push_str(" --verbose");
        }
        line
    }
}

/// Resolve the archiver command to an executable path.
///
/// Bare names go through PATH; names containing a separator are checked
/// directly.
pub fn resolve_archiver(command: &str) -> Result<PathBuf, ArchiverError> {
    which::which(command).map_err(|_| ArchiverError::NotFound {
        command: command.to_string(),
    })
}

/// Information about the external archiver installation.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// Version string if available.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

/// Check whether a tool is available and get its information.
///
/// Asks the tool for `--version`; a tool that is on PATH but does not answer
/// still counts as available.
pub fn check_tool(name: &str) -> ToolInfo {
    let result = Command::new(name).arg("--version").output();

    match result {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|s| s.to_string());

            let path = which::which(name).ok();

            ToolInfo {
                name: name.to_string(),
                available: true,
                version,
                path,
            }
        }
        _ => match which::which(name) {
            Ok(path) => ToolInfo {
                name: name.to_string(),
                available: true,
                version: None,
                path: Some(path),
            },
            Err(_) => ToolInfo {
                name: name.to_string(),
                available: false,
                version: None,
                path: None,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> ArchiverCommand {
        ArchiverCommand {
            command: "baseband_archiver".to_string(),
            config_path: PathBuf::from("/etc/basebatch/archiver.yaml"),
            output_root: PathBuf::from("/data/princeton/baseband/raw"),
            verbose: true,
        }
    }

    #[test]
    fn test_args_for_fixed_template() {
        let args = template().args_for(Path::new("/data/raw/baseband_1.data"));
        let expected: Vec<OsString> = [
            "-c",
            "/etc/basebatch/archiver.yaml",
            "/data/raw/baseband_1.data",
            "--root",
            "/data/princeton/baseband/raw",
            "--verbose",
        ]
        .iter()
        .map(OsString::from)
        .collect();

        assert_eq!(args, expected);
    }

    #[test]
    fn test_args_without_verbose() {
        let mut cmd = template();
        cmd.verbose = false;
        let args = cmd.args_for(Path::new("/data/raw/baseband_1.data"));
        assert!(!args.contains(&OsString::from("--verbose")));
        assert_eq!(args.len(), 5);
    }

    #[test]
    fn test_render_matches_template() {
        let line = template().render(Path::new("/data/raw/baseband_1.data"));
        assert_eq!(
            line,
            "baseband_archiver -c /etc/basebatch/archiver.yaml \
             /data/raw/baseband_1.data --root /data/princeton/baseband/raw --verbose"
        );
    }

    #[test]
    fn test_from_config_requires_paths() {
        let config = ArchiverConfig::default();
        let err = ArchiverCommand::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("config_path"));
    }

    #[test]
    fn test_resolve_archiver_not_found() {
        let err = resolve_archiver("nonexistent_archiver_12345").unwrap_err();
        assert!(matches!(err, ArchiverError::NotFound { .. }));
    }

    #[test]
    fn test_check_tool_not_found() {
        let info = check_tool("nonexistent_archiver_12345");
        assert!(!info.available);
        assert!(info.version.is_none());
        assert!(info.path.is_none());
    }
}
