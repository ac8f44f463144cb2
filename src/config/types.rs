use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub archiver: ArchiverConfig,

    #[serde(default)]
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArchiverConfig {
    /// Command name or path of the external archiver
    #[serde(default = "default_command")]
    pub command: String,

    /// Config file handed to the archiver via -c
    #[serde(default)]
    pub config_path: Option<PathBuf>,

    /// Destination root handed to the archiver via --root
    #[serde(default)]
    pub output_root: Option<PathBuf>,

    /// Pass --verbose to the archiver (default: true)
    #[serde(default = "default_archiver_verbose")]
    pub verbose: bool,
}

fn default_command() -> String {
    "baseband_archiver".to_string()
}

fn default_archiver_verbose() -> bool {
    true
}

impl Default for ArchiverConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            config_path: None,
            output_root: None,
            verbose: default_archiver_verbose(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchConfig {
    /// Maximum number of concurrent conversion jobs (default: 10)
    #[serde(default = "default_batch_size")]
    pub size: usize,

    /// Seconds to wait between job launches within a batch (default: 1)
    #[serde(default = "default_launch_stagger")]
    pub launch_stagger_secs: u64,

    /// Kill a job still running after this many seconds (unset = no timeout)
    #[serde(default)]
    pub job_timeout_secs: Option<u64>,
}

fn default_batch_size() -> usize {
    10
}

fn default_launch_stagger() -> u64 {
    1
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            size: default_batch_size(),
            launch_stagger_secs: default_launch_stagger(),
            job_timeout_secs: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.archiver.command, "baseband_archiver");
        assert!(config.archiver.config_path.is_none());
        assert!(config.archiver.output_root.is_none());
        assert!(config.archiver.verbose);
        assert_eq!(config.batch.size, 10);
        assert_eq!(config.batch.launch_stagger_secs, 1);
        assert!(config.batch.job_timeout_secs.is_none());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.archiver.command, "baseband_archiver");
        assert_eq!(config.batch.size, 10);
    }

    #[test]
    fn test_full_toml() {
        let config: Config = toml::from_str(
            r#"
[archiver]
command = "/opt/kotekan/baseband_archiver"
config_path = "/etc/basebatch/archiver.yaml"
output_root = "/data/princeton/baseband/raw"
verbose = false

[batch]
size = 4
launch_stagger_secs = 2
job_timeout_secs = 600
"#,
        )
        .unwrap();

        assert_eq!(config.archiver.command, "/opt/kotekan/baseband_archiver");
        assert_eq!(
            config.archiver.config_path.as_deref(),
            Some(std::path::Path::new("/etc/basebatch/archiver.yaml"))
        );
        assert_eq!(
            config.archiver.output_root.as_deref(),
            Some(std::path::Path::new("/data/princeton/baseband/raw"))
        );
        assert!(!config.archiver.verbose);
        assert_eq!(config.batch.size, 4);
        assert_eq!(config.batch.launch_stagger_secs, 2);
        assert_eq!(config.batch.job_timeout_secs, Some(600));
    }

    #[test]
    fn test_partial_batch_section() {
        let config: Config = toml::from_str(
            r#"
[batch]
size = 3
"#,
        )
        .unwrap();

        assert_eq!(config.batch.size, 3);
        assert_eq!(config.batch.launch_stagger_secs, 1);
        assert!(config.batch.job_timeout_secs.is_none());
    }
}
