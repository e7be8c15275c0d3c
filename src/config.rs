//! Explorer settings
//!
//! Plain `key=value` lines; unknown keys are ignored and bad values fall back
//! to the defaults. Command-line flags override whatever the file says.

use crate::arena;
use anyhow::{Context, Result};
use std::path::Path;

pub const DEFAULT_DATA_PATH: &str = "data/CardList.csv";
pub const DEFAULT_RESULT_LIMIT: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerConfig {
    /// Card list path or http(s) URL
    pub data_source: String,
    /// Arena the explorer opens on (column key or display name)
    pub default_arena: String,
    /// Maximum search results shown per view
    pub result_limit: usize,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            data_source: DEFAULT_DATA_PATH.to_string(),
            default_arena: arena::default_arena().display_name.to_string(),
            result_limit: DEFAULT_RESULT_LIMIT,
        }
    }
}

impl ExplorerConfig {
    /// Read settings from `path`. The file must exist; its contents are lenient.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Ok(Self::parse(&content))
    }

    pub fn parse(content: &str) -> Self {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                log::warn!("Ignoring config line without '=': {}", line);
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "data" | "data_source" => config.data_source = value.to_string(),
                "default_arena" => {
                    if arena::resolve_arena(value).is_some() {
                        config.default_arena = value.to_string();
                    } else {
                        log::warn!("Unknown default_arena '{}', keeping default", value);
                    }
                }
                "result_limit" => match value.parse::<usize>() {
                    Ok(n) if n > 0 => config.result_limit = n,
                    _ => log::warn!("Invalid result_limit '{}', keeping default", value),
                },
                other => log::debug!("Ignoring unknown config key '{}'", other),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExplorerConfig::default();
        assert_eq!(config.data_source, "data/CardList.csv");
        assert_eq!(config.default_arena, "Legendary Arena");
        assert_eq!(config.result_limit, 40);
    }

    #[test]
    fn test_parse() {
        let config = ExplorerConfig::parse(
            "# explorer\ndata = cards/season18.csv\ndefault_arena=Spooky Town\nresult_limit=10\ncolor=red\n",
        );
        assert_eq!(config.data_source, "cards/season18.csv");
        assert_eq!(config.default_arena, "Spooky Town");
        assert_eq!(config.result_limit, 10);
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = ExplorerConfig::parse("default_arena=Nowhere\nresult_limit=zero\nnonsense\n");
        assert_eq!(config, ExplorerConfig::default());

        let config = ExplorerConfig::parse("default_arena=count_9\n");
        assert_eq!(config.default_arena, "Legendary Arena");
    }

    #[test]
    fn test_from_file() {
        use std::io::Write;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("explorer.conf");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "default_arena=count_1").unwrap();
        f.flush().unwrap();

        let config = ExplorerConfig::from_file(&path).unwrap();
        assert_eq!(config.default_arena, "count_1");
        assert!(ExplorerConfig::from_file(&dir.path().join("missing.conf")).is_err());
    }
}
