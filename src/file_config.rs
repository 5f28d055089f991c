//! Optional `-config PATH` JSON document (SPEC_FULL.md §4.7): a mirror of the
//! subset of `Config` fields that can be set outside the CLI. Loaded first;
//! CLI flags are always applied on top and win on conflict.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Unknown keys are ignored on purpose (no `deny_unknown_fields`): config
/// files should stay forward-compatible with newer flag sets.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub ignore_case: Option<bool>,
    pub workers: Option<usize>,
    pub io_workers: Option<usize>,
    pub cpu_workers: Option<usize>,
    pub max_workers: Option<usize>,
    pub backpressure: Option<usize>,
    pub dynamic_workers: Option<bool>,
    pub extensions: Option<Vec<String>>,
    pub exclude_dir: Option<Vec<String>>,
    pub format: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<FileConfig> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("could not read config file '{}'", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("could not parse config file '{}'", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_keys_are_tolerated() {
        let json = r#"{"workers": 4, "from_the_future": true}"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.workers, Some(4));
    }

    #[test]
    fn missing_keys_default_to_none() {
        let config: FileConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.workers, None);
        assert_eq!(config.format, None);
    }
}
