//! Engine configuration
//!
//! Every field has a compiled default from [`crate::constants`]; a TOML file
//! only needs to name the settings it overrides.
//!
//! ```toml
//! debounce_ms = 150
//! transition_steps = 11
//! precache_opt_in = true
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;

use crate::constants::{artwork, cache, precache, reactor, transition};
use crate::error::{Result, ThemeError};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemingConfig {
    /// Reactor poll interval (ms)
    pub poll_interval_ms: u64,
    /// Quiet period after a selection change before it is processed (ms)
    pub debounce_ms: u64,
    /// Total transition duration (ms)
    pub transition_duration_ms: u64,
    /// Interpolated frames per transition
    pub transition_steps: u32,
    /// Probe distance below which a transition is applied without animating
    pub skip_distance: f64,
    /// Palettes kept in RAM before the RAM tier is reset
    pub ram_capacity: usize,
    /// Quiet period before pending disk cache writes are flushed (ms)
    pub disk_save_debounce_ms: u64,
    /// Disk cache location; defaults to the per-user cache directory
    pub cache_file: Option<PathBuf>,
    /// Smallest accepted artwork side (px)
    pub min_image_dimension: u32,
    /// Artwork is downscaled so neither side exceeds this before sampling
    pub max_decode_dimension: u32,
    /// Whether the background precache pass may run
    pub precache_opt_in: bool,
    /// Maximum new palettes computed per precache pass
    pub precache_batch_size: usize,
    /// Delay between precached items (ms)
    pub precache_item_delay_ms: u64,
    /// Re-check interval while precache is gated off (ms)
    pub precache_idle_poll_ms: u64,
}

impl Default for ThemingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: reactor::POLL_INTERVAL_MS,
            debounce_ms: reactor::DEBOUNCE_MS,
            transition_duration_ms: transition::DURATION_MS,
            transition_steps: transition::STEPS,
            skip_distance: transition::SKIP_DISTANCE,
            ram_capacity: cache::RAM_CAPACITY,
            disk_save_debounce_ms: cache::DISK_SAVE_DEBOUNCE_MS,
            cache_file: None,
            min_image_dimension: artwork::MIN_DIMENSION,
            max_decode_dimension: artwork::MAX_DECODE_DIMENSION,
            precache_opt_in: false,
            precache_batch_size: precache::BATCH_SIZE,
            precache_item_delay_ms: precache::ITEM_DELAY_MS,
            precache_idle_poll_ms: precache::IDLE_POLL_MS,
        }
    }
}

impl ThemingConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)
            .map_err(|e| ThemeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(ThemeError::Config(msg.to_string()));
        if self.poll_interval_ms == 0 {
            return invalid("poll_interval_ms must be greater than zero");
        }
        if self.transition_steps == 0 {
            return invalid("transition_steps must be at least 1");
        }
        if self.ram_capacity == 0 {
            return invalid("ram_capacity must be at least 1");
        }
        if !self.skip_distance.is_finite() || self.skip_distance < 0.0 {
            return invalid("skip_distance must be a non-negative number");
        }
        if self.max_decode_dimension < self.min_image_dimension {
            return invalid(
                "max_decode_dimension must not be below min_image_dimension",
            );
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn transition_duration(&self) -> Duration {
        Duration::from_millis(self.transition_duration_ms)
    }

    pub fn disk_save_debounce(&self) -> Duration {
        Duration::from_millis(self.disk_save_debounce_ms)
    }

    pub fn precache_item_delay(&self) -> Duration {
        Duration::from_millis(self.precache_item_delay_ms)
    }

    pub fn precache_idle_poll(&self) -> Duration {
        Duration::from_millis(self.precache_idle_poll_ms)
    }

    /// The configured cache file, or the per-user default location.
    pub fn cache_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.cache_file {
            return Ok(path.clone());
        }
        let dirs = ProjectDirs::from("", "tinct", "tinct").ok_or_else(|| {
            ThemeError::Config("failed to resolve ProjectDirs".to_string())
        })?;
        Ok(dirs.cache_dir().join(cache::FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = ThemingConfig::from_toml_str("").unwrap();
        assert_eq!(config, ThemingConfig::default());
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.disk_save_debounce(), Duration::from_secs(45));
    }

    #[test]
    fn toml_overrides_selected_fields() {
        let config = ThemingConfig::from_toml_str(
            r#"
            debounce_ms = 150
            transition_steps = 11
            precache_opt_in = true
            cache_file = "/tmp/tinct/colors.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.debounce(), Duration::from_millis(150));
        assert_eq!(config.transition_steps, 11);
        assert!(config.precache_opt_in);
        assert_eq!(
            config.cache_path().unwrap(),
            PathBuf::from("/tmp/tinct/colors.json")
        );
        assert_eq!(config.ram_capacity, cache::RAM_CAPACITY);
    }

    #[test]
    fn rejects_unknown_keys_and_invalid_values() {
        assert!(matches!(
            ThemingConfig::from_toml_str("debounce = 5"),
            Err(ThemeError::Config(_))
        ));
        assert!(matches!(
            ThemingConfig::from_toml_str("transition_steps = 0"),
            Err(ThemeError::Config(_))
        ));
        assert!(matches!(
            ThemingConfig::from_toml_str("ram_capacity = 0"),
            Err(ThemeError::Config(_))
        ));
    }
}
