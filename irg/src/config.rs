// Configuration constants, CLI arguments and environment helpers
use std::path::PathBuf;

use clap::Parser;

use crate::IrgError;

// Bundle layout
pub const RECORDS_KEY: &str = "Records";
pub const JSON_EXTENSION: &str = ".json";

// Logging
pub const DEFAULT_LOG_FILTER: &str = "irg=info,irg_graph=info";
pub const LOG_FORMAT_ENV: &str = "IRG_LOG_FORMAT";

/// Identity Relationship Graph - connects IAM users to the resources they touched
#[derive(Parser, Debug)]
#[command(name = "irg")]
#[command(about = "Shows the identity relationship graph from audit-trail logs")]
pub struct Cli {
    /// Location of the data files
    #[arg(long = "data_dir", short = 'd', env = "IRG_DATA_DIR")]
    pub data_dir: PathBuf,

    /// Build and report the graph without rendering it
    #[arg(long = "skip_graph", short = 's')]
    pub skip_graph: bool,
}

impl Cli {
    /// Validate arguments into a run configuration
    pub fn into_config(self) -> Result<Config, IrgError> {
        Config::new(self.data_dir, self.skip_graph)
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    /// Read the format from `IRG_LOG_FORMAT`; anything but `json` is pretty
    pub fn from_env() -> Self {
        std::env::var(LOG_FORMAT_ENV)
            .map(|value| Self::parse(&value))
            .unwrap_or_default()
    }

    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Validated run configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Resolved absolute data directory
    pub data_dir: PathBuf,
    pub skip_graph: bool,
}

impl Config {
    /// Resolve and check the data directory.
    pub fn new(data_dir: impl Into<PathBuf>, skip_graph: bool) -> Result<Self, IrgError> {
        let data_dir = data_dir.into();
        let resolved = std::fs::canonicalize(&data_dir).map_err(|e| {
            IrgError::config(format!("cannot resolve {}: {}", data_dir.display(), e))
        })?;
        if !resolved.is_dir() {
            return Err(IrgError::config(format!(
                "{} is not a directory",
                resolved.display()
            )));
        }
        Ok(Self {
            data_dir: resolved,
            skip_graph,
        })
    }
}

/// Whether a file name has the bundle extension, ignoring case
pub fn is_bundle_name(name: &str) -> bool {
    name.to_lowercase().ends_with(JSON_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from(["irg", "--data_dir", "./logs", "--skip_graph"]).unwrap();
        assert_eq!(cli.data_dir, PathBuf::from("./logs"));
        assert!(cli.skip_graph);

        let cli = Cli::try_parse_from(["irg", "-d", "./logs"]).unwrap();
        assert!(!cli.skip_graph);

        let cli = Cli::try_parse_from(["irg", "-d", "./logs", "-s"]).unwrap();
        assert!(cli.skip_graph);
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse(""), LogFormat::Pretty);
    }

    #[test]
    fn test_bundle_names() {
        assert!(is_bundle_name("trail.json"));
        assert!(is_bundle_name("TRAIL.JSON"));
        assert!(is_bundle_name("trail.Json"));
        assert!(!is_bundle_name("trail.json.gz"));
        assert!(!is_bundle_name("trail.txt"));
    }

    #[test]
    fn test_config_resolves_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(dir.path(), false).unwrap();
        assert!(config.data_dir.is_absolute());
        assert!(config.data_dir.is_dir());
    }

    #[test]
    fn test_config_rejects_missing_and_file_paths() {
        let dir = tempfile::tempdir().unwrap();

        let missing = Config::new(dir.path().join("missing"), false);
        assert!(matches!(missing, Err(IrgError::ConfigError(_))));

        let file = dir.path().join("bundle.json");
        std::fs::write(&file, "{}").unwrap();
        let not_dir = Config::new(&file, false);
        assert!(matches!(not_dir, Err(IrgError::ConfigError(_))));
    }
}
