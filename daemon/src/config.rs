//! Daemon configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use ballot_election::WhitelistPolicy;
use ballot_utils::LogFormat;

use crate::error::DaemonError;

/// Configuration for the `ballot` binary.
///
/// Can be loaded from a TOML file via [`DaemonConfig::from_toml_file`];
/// command-line flags override individual fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// When whitelisting is accepted: "any_phase" or "registration_only".
    #[serde(default)]
    pub whitelist_policy: WhitelistPolicy,

    /// Where `run` writes the final snapshot, if anywhere.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,

    /// Abort a script at the first rejected step.
    #[serde(default = "default_true")]
    pub stop_on_error: bool,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

// ── Impl ───────────────────────────────────────────────────────────────

impl DaemonConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, DaemonError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DaemonError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, DaemonError> {
        toml::from_str(s).map_err(|e| DaemonError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, DaemonError> {
        toml::to_string_pretty(self).map_err(|e| DaemonError::Config(e.to_string()))
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            whitelist_policy: WhitelistPolicy::default(),
            snapshot_path: None,
            stop_on_error: default_true(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = DaemonConfig::from_toml_str("").unwrap();
        assert_eq!(config, DaemonConfig::default());
        assert!(config.stop_on_error);
        assert_eq!(config.whitelist_policy, WhitelistPolicy::AnyPhase);
    }

    #[test]
    fn parses_all_fields() {
        let config = DaemonConfig::from_toml_str(
            r#"
            log_format = "json"
            log_level = "debug"
            whitelist_policy = "registration_only"
            snapshot_path = "/tmp/election.snapshot"
            stop_on_error = false
            "#,
        )
        .unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.whitelist_policy, WhitelistPolicy::RegistrationOnly);
        assert_eq!(
            config.snapshot_path.as_deref(),
            Some(Path::new("/tmp/election.snapshot"))
        );
        assert!(!config.stop_on_error);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let err = DaemonConfig::from_toml_str(r#"whitelist_policy = "never""#).unwrap_err();
        assert!(matches!(err, DaemonError::Config(_)));
    }

    #[test]
    fn toml_roundtrip() {
        let config = DaemonConfig {
            log_format: LogFormat::Json,
            whitelist_policy: WhitelistPolicy::RegistrationOnly,
            snapshot_path: Some(PathBuf::from("out.snapshot")),
            ..Default::default()
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(DaemonConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn file_loading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ballot.toml");
        std::fs::write(&path, "log_level = \"warn\"\n").unwrap();
        assert_eq!(DaemonConfig::from_toml_file(&path).unwrap().log_level, "warn");
        assert!(DaemonConfig::from_toml_file(&dir.path().join("missing.toml")).is_err());
    }
}
