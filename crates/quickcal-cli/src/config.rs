use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use quickcal_engine::{parse_wall_time, WallTime};
use serde::Deserialize;

pub static DEFAULT_TIMEZONE: &str = "UTC";

/// User configuration at ~/.config/quickcal/config.toml
///
/// ```toml
/// default_timezone = "America/New_York"
/// quick_times = ["09:00", "1:30 PM", "18:00"]
/// ```
#[derive(Deserialize, Clone, Debug, Default)]
pub struct Config {
    pub default_timezone: Option<String>,

    /// Times offered for starts typed without a time of day (`--quick N`).
    #[serde(default)]
    pub quick_times: Vec<String>,
}

impl Config {
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("quickcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from `path`, or the default location. A missing file yields the
    /// defaults; an unreadable or malformed one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        tracing::debug!(path = %path.display(), quick_times = config.quick_times.len(), "loaded config");
        Ok(config)
    }

    /// Timezone to resolve in: the flag (or its env var) first, then the file.
    pub fn timezone<'a>(&'a self, flag: Option<&'a str>) -> &'a str {
        flag.or(self.default_timezone.as_deref())
            .unwrap_or(DEFAULT_TIMEZONE)
    }

    /// The `n`th quick time, 1-based.
    pub fn quick_time(&self, n: usize) -> Result<WallTime> {
        let raw = n
            .checked_sub(1)
            .and_then(|i| self.quick_times.get(i))
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Quick time {} not configured ({} available)",
                    n,
                    self.quick_times.len()
                )
            })?;

        parse_wall_time(raw).with_context(|| format!("Invalid quick time '{}' in config", raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Config {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_empty_file_is_default() {
        let config = parse("");
        assert_eq!(config.default_timezone, None);
        assert!(config.quick_times.is_empty());
        assert_eq!(config.timezone(None), "UTC");
    }

    #[test]
    fn test_flag_beats_file() {
        let config = parse("default_timezone = \"Europe/Paris\"");
        assert_eq!(config.timezone(None), "Europe/Paris");
        assert_eq!(config.timezone(Some("Asia/Tokyo")), "Asia/Tokyo");
    }

    #[test]
    fn test_quick_times_are_one_based() {
        let config = parse("quick_times = [\"09:00\", \"1:30 PM\"]");
        assert_eq!(config.quick_time(1).unwrap(), WallTime::new(9, 0).unwrap());
        assert_eq!(config.quick_time(2).unwrap(), WallTime::new(13, 30).unwrap());
        assert!(config.quick_time(0).is_err());
        assert!(config.quick_time(3).is_err());
    }

    #[test]
    fn test_bad_quick_time_is_reported() {
        let config = parse("quick_times = [\"930\"]");
        let err = config.quick_time(1).unwrap_err();
        assert!(err.to_string().contains("930"));
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = std::env::temp_dir().join("quickcal-missing-config-does-not-exist.toml");
        let config = Config::load(Some(&path)).unwrap();
        assert!(config.quick_times.is_empty());
    }
}
