use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const LOCAL_CONFIG_FILE: &str = ".spellreview.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub auto_select_single: bool,
    pub keep_patterns: Vec<String>,
    pub max_candidates: usize,
}

/// One config file layer. Only the keys a file actually sets are `Some`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConfigLayer {
    pub auto_select_single: Option<bool>,
    pub keep_patterns: Option<Vec<String>>,
    pub max_candidates: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_select_single: true,
            keep_patterns: Vec::new(),
            max_candidates: 5,
        }
    }
}

impl Config {
    /// Load configuration with priority: CLI args > explicit file > local config > global config > defaults
    pub fn load(explicit: Option<&Path>, cli_patterns: Vec<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                debug!(path = %global_path.display(), "loading global config");
                config = config.merge(ConfigLayer::from_file(&global_path)?);
            }
        }

        let local_path = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_path.exists() {
            debug!(path = %local_path.display(), "loading local config");
            config = config.merge(ConfigLayer::from_file(&local_path)?);
        }

        if let Some(path) = explicit {
            debug!(path = %path.display(), "loading config from command line");
            config = config.merge(ConfigLayer::from_file(path)?);
        }

        if !cli_patterns.is_empty() {
            config.keep_patterns.extend(cli_patterns);
        }

        Ok(config)
    }

    /// Apply every key the layer sets; unset keys keep the current value.
    pub fn merge(mut self, layer: ConfigLayer) -> Self {
        if let Some(auto_select_single) = layer.auto_select_single {
            self.auto_select_single = auto_select_single;
        }
        if let Some(keep_patterns) = layer.keep_patterns {
            self.keep_patterns = keep_patterns;
        }
        if let Some(max_candidates) = layer.max_candidates {
            self.max_candidates = max_candidates;
        }
        self
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "spellreview").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

impl ConfigLayer {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn layer_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.auto_select_single);
        assert_eq!(config.max_candidates, 5);
        assert!(config.keep_patterns.is_empty());
    }

    #[test]
    fn test_merge_configs() {
        let layer = ConfigLayer {
            auto_select_single: Some(false),
            keep_patterns: None,
            max_candidates: Some(3),
        };

        let merged = Config::default().merge(layer);
        assert!(!merged.auto_select_single);
        assert_eq!(merged.max_candidates, 3);
        assert!(merged.keep_patterns.is_empty());
    }

    #[test]
    fn test_partial_file_sets_only_its_keys() {
        let file = layer_file("max_candidates = 2\n");

        let layer = ConfigLayer::from_file(file.path()).unwrap();
        assert_eq!(
            layer,
            ConfigLayer {
                max_candidates: Some(2),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_later_layer_can_restore_default_value() {
        let global = ConfigLayer::from_file(
            layer_file("max_candidates = 3\nauto_select_single = false\n").path(),
        )
        .unwrap();
        let local = ConfigLayer::from_file(layer_file("max_candidates = 5\n").path()).unwrap();

        let config = Config::default().merge(global).merge(local);
        assert_eq!(config.max_candidates, 5);
        // the local layer does not mention it, so the global value stands
        assert!(!config.auto_select_single);
    }

    #[test]
    fn test_layer_can_clear_patterns() {
        let config = Config {
            keep_patterns: vec!["^[A-Z]+$".to_string()],
            ..Default::default()
        };
        let layer = ConfigLayer::from_file(layer_file("keep_patterns = []\n").path()).unwrap();

        let cleared = config.merge(layer);
        assert!(cleared.keep_patterns.is_empty());
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let file = layer_file("max_candidates = \"lots\"\n");

        let err = ConfigLayer::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
