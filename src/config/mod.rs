//! Configuration types for dataset preparation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::writers::WriteMode;
use crate::processors::merging::{DEFAULT_CSV_OUTPUT, DEFAULT_DELIMITER, DEFAULT_TEXT_OUTPUT};

/// Defaults for the folder merge operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Output path for merged text
    #[serde(default = "default_text_output")]
    pub text_output: PathBuf,

    /// Output path for merged CSV
    #[serde(default = "default_csv_output")]
    pub csv_output: PathBuf,

    /// Field delimiter for CSV input and output
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

fn default_text_output() -> PathBuf {
    PathBuf::from(DEFAULT_TEXT_OUTPUT)
}

fn default_csv_output() -> PathBuf {
    PathBuf::from(DEFAULT_CSV_OUTPUT)
}

fn default_delimiter() -> char {
    DEFAULT_DELIMITER
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            text_output: default_text_output(),
            csv_output: default_csv_output(),
            delimiter: default_delimiter(),
        }
    }
}

/// Defaults for duplicate-row removal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DedupConfig {
    /// Replace the file by rename instead of truncating it in place
    #[serde(default)]
    pub atomic: bool,
}

impl DedupConfig {
    pub fn write_mode(&self) -> WriteMode {
        if self.atomic {
            WriteMode::Atomic
        } else {
            WriteMode::Truncate
        }
    }
}

/// Top-level configuration combining all sub-configs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrepConfig {
    #[serde(default)]
    pub merge: MergeConfig,

    #[serde(default)]
    pub dedup: DedupConfig,
}

impl PrepConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: PrepConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_prep_config() {
        let config = PrepConfig::default();
        assert_eq!(config.merge.text_output, PathBuf::from("output_file.txt"));
        assert_eq!(config.merge.csv_output, PathBuf::from("output_file.csv"));
        assert_eq!(config.merge.delimiter, ',');
        assert_eq!(config.dedup.write_mode(), WriteMode::Truncate);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: PrepConfig = serde_yaml::from_str("merge:\n  delimiter: ';'\n").unwrap();
        assert_eq!(config.merge.delimiter, ';');
        assert_eq!(config.merge.csv_output, PathBuf::from("output_file.csv"));
        assert!(!config.dedup.atomic);
    }

    #[test]
    fn test_yaml_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prep.yaml");
        let mut config = PrepConfig::default();
        config.dedup.atomic = true;
        config.merge.text_output = PathBuf::from("merged/all.txt");

        config.to_yaml(&path).unwrap();
        let loaded = PrepConfig::from_yaml(&path).unwrap();

        assert_eq!(loaded, config);
        assert_eq!(loaded.dedup.write_mode(), WriteMode::Atomic);
    }
}
