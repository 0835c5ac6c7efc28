//! Configuration model for the map-vote coordinator
//!
//! All sections have defaults matching a stock competitive setup, and every
//! struct is `#[serde(default)]` so partial config files load cleanly.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::maps::Map;

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config has no maps")]
    EmptyMapList,
}

/// Rock-the-vote settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct RtvConfig {
    pub enabled: bool,
    pub enabled_in_warmup: bool,
    pub nomination_enabled: bool,
    /// Minimum eligible players before the command is accepted
    pub min_players: u32,
    /// Minimum rounds played before the command is accepted
    pub min_rounds: u32,
    /// Apply the winning map as soon as the session resolves
    pub change_map_immediately: bool,
    pub maps_to_show: usize,
    /// Session duration in seconds
    pub vote_duration: u32,
    /// Percentage of eligible players required to trigger the session
    pub vote_percentage: u32,
    /// Lockout after a failed RTV session, in seconds
    pub vote_cooldown_time: u32,
    /// Countdown before the actual level change, in seconds
    pub change_map_delay: u32,
}

impl Default for RtvConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            enabled_in_warmup: false,
            nomination_enabled: true,
            min_players: 0,
            min_rounds: 0,
            change_map_immediately: true,
            maps_to_show: 6,
            vote_duration: 30,
            vote_percentage: 60,
            vote_cooldown_time: 300,
            change_map_delay: 5,
        }
    }
}

/// Per-map quorum vote settings (`votemap`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct VotemapConfig {
    pub enabled: bool,
    pub vote_percentage: u32,
    pub change_map_immediately: bool,
    pub min_players: u32,
}

impl Default for VotemapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            vote_percentage: 60,
            change_map_immediately: true,
            min_players: 0,
        }
    }
}

/// Scheduled end-of-map vote settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct EndOfMapConfig {
    pub enabled: bool,
    pub maps_to_show: usize,
    pub vote_duration: u32,
    /// Start the vote when map time remaining drops to this many seconds
    pub trigger_seconds_before_end: u32,
    /// Start the vote when this many rounds (or winning-score gap) remain
    pub trigger_rounds_before_end: u32,
    pub allow_extend: bool,
    /// Minutes added to the time limit per extension
    pub extend_time_step: u32,
    /// Rounds added to the round limit per extension
    pub extend_round_step: u32,
    /// Extensions available per map
    pub extend_limit: u32,
    pub change_map_delay: u32,
}

impl Default for EndOfMapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            maps_to_show: 6,
            vote_duration: 30,
            trigger_seconds_before_end: 120,
            trigger_rounds_before_end: 4,
            allow_extend: true,
            extend_time_step: 15,
            extend_round_step: 5,
            extend_limit: 3,
            change_map_delay: 10,
        }
    }
}

/// Match-extension quorum vote settings (`extend` command)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ExtendVoteConfig {
    pub enabled: bool,
    pub enabled_in_warmup: bool,
    pub min_players: u32,
    pub min_rounds: u32,
    pub vote_percentage: u32,
}

impl Default for ExtendVoteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            enabled_in_warmup: false,
            min_players: 0,
            min_rounds: 0,
            vote_percentage: 60,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct MapVoteConfig {
    pub rtv: RtvConfig,
    pub votemap: VotemapConfig,
    pub end_of_map: EndOfMapConfig,
    pub extend_vote: ExtendVoteConfig,
    /// How many previously played maps stay excluded from candidacy.
    /// Zero or negative disables the cooldown entirely.
    pub maps_in_cooldown: i32,
    /// Whether spectators may vote and count toward quorum denominators
    pub allow_spectators_to_vote: bool,
    /// The rotation pool
    pub maps: Vec<Map>,
    /// Message template overrides, keyed by message id (see [`crate::locale`])
    pub messages: HashMap<String, String>,
}

impl Default for MapVoteConfig {
    fn default() -> Self {
        Self {
            rtv: RtvConfig::default(),
            votemap: VotemapConfig::default(),
            end_of_map: EndOfMapConfig::default(),
            extend_vote: ExtendVoteConfig::default(),
            maps_in_cooldown: 3,
            allow_spectators_to_vote: false,
            maps: Vec::new(),
            messages: HashMap::new(),
        }
    }
}

impl MapVoteConfig {
    /// Load configuration from a TOML file.
    pub fn load_toml(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        if config.maps.is_empty() {
            return Err(ConfigError::EmptyMapList);
        }
        Ok(config)
    }
}

impl MapVoteConfig {
    /// Default configuration plus the given map pool.
    pub fn with_maps(maps: Vec<Map>) -> Self {
        Self {
            maps,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_stock_setup() {
        let config = MapVoteConfig::default();
        assert!(config.rtv.enabled);
        assert_eq!(config.rtv.vote_percentage, 60);
        assert_eq!(config.rtv.maps_to_show, 6);
        assert_eq!(config.end_of_map.trigger_seconds_before_end, 120);
        assert_eq!(config.end_of_map.extend_limit, 3);
        assert_eq!(config.maps_in_cooldown, 3);
        assert!(!config.allow_spectators_to_vote);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let raw = r#"
            maps_in_cooldown = 5

            [rtv]
            vote_percentage = 51

            [[maps]]
            id = "de_mirage"
            name = "Mirage"
        "#;
        let config: MapVoteConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.maps_in_cooldown, 5);
        assert_eq!(config.rtv.vote_percentage, 51);
        // Untouched fields keep their defaults
        assert_eq!(config.rtv.vote_duration, 30);
        assert!(config.end_of_map.allow_extend);
        assert_eq!(config.maps.len(), 1);
        assert_eq!(config.maps[0].name, "Mirage");
    }

    #[test]
    fn test_load_toml_rejects_empty_map_list() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "maps_in_cooldown = 2").unwrap();

        let err = MapVoteConfig::load_toml(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyMapList));
    }

    #[test]
    fn test_load_toml_roundtrip() {
        let config = MapVoteConfig::with_maps(vec![
            Map::new("de_mirage", "Mirage"),
            Map::new("3124567099", "Workshop Arena"),
        ]);
        let raw = toml::to_string(&config).unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(raw.as_bytes()).unwrap();

        let loaded = MapVoteConfig::load_toml(file.path()).unwrap();
        assert_eq!(loaded.maps.len(), 2);
        assert_eq!(loaded.maps_in_cooldown, 3);
    }
}
