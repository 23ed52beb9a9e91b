use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use engine::{EmptyTilePolicy, SpriteBox, DEFAULT_STEP};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

pub(crate) const CONFIG_FILE_NAME: &str = "tanks.json";

/// Game settings read from `tanks.json` in the asset directory. Every field is
/// optional; asset paths are relative to the asset directory.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) tile_sheet: PathBuf,
    pub(crate) map: PathBuf,
    pub(crate) tick_interval_ms: u64,
    pub(crate) move_step_px: f32,
    pub(crate) rotation_step_degrees: f32,
    pub(crate) tank_sprite: SpriteBox,
    pub(crate) empty_tiles: EmptyTilePolicy,
    pub(crate) clear_color: [u8; 4],
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tile_sheet: PathBuf::from("images/tile-sheet.png"),
            map: PathBuf::from("maps/tanks-tilemap.tmx"),
            tick_interval_ms: 100,
            move_step_px: DEFAULT_STEP,
            rotation_step_degrees: 90.0,
            tank_sprite: SpriteBox {
                x: 64.0,
                y: 256.0,
                width: 32.0,
                height: 32.0,
                ..SpriteBox::default()
            },
            empty_tiles: EmptyTilePolicy::default(),
            clear_color: [0, 0, 0, 255],
        }
    }
}

impl GameConfig {
    pub(crate) fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Loads the config at `path`, falling back to defaults when the file does
/// not exist.
pub(crate) fn load_game_config(path: &Path) -> Result<GameConfig, ConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "config_defaults");
            return Ok(GameConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let config = parse_game_config(&raw).map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })?;
    info!(path = %path.display(), "config_loaded");
    Ok(config)
}

fn parse_game_config(raw: &str) -> Result<GameConfig, String> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, GameConfig>(&mut deserializer).map_err(|error| {
        let path = error.path().to_string();
        let source = error.into_inner();
        if path.is_empty() || path == "." {
            source.to_string()
        } else {
            format!("at {path}: {source}")
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = load_game_config(&temp.path().join(CONFIG_FILE_NAME)).expect("config");
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.tick_interval(), Duration::from_millis(100));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            r#"{ "tick_interval_ms": 50, "empty_tiles": "blit", "tank_sprite": { "x": 10 } }"#,
        )
        .expect("write config");

        let config = load_game_config(&path).expect("config");

        assert_eq!(config.tick_interval_ms, 50);
        assert_eq!(config.empty_tiles, EmptyTilePolicy::Blit);
        assert_eq!(config.tank_sprite.x, 10.0);
        assert_eq!(config.tank_sprite.width, 64.0);
        assert_eq!(config.map, GameConfig::default().map);
    }

    #[test]
    fn parse_error_names_field_path() {
        let err = parse_game_config(r#"{ "tank_sprite": { "width": "wide" } }"#)
            .expect_err("invalid width");
        assert!(err.starts_with("at tank_sprite.width:"), "{err}");
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = parse_game_config(r#"{ "tick_ms": 10 }"#).expect_err("unknown field");
        assert!(err.contains("tick_ms"), "{err}");
    }

    #[test]
    fn tank_source_is_not_a_setting() {
        let err = parse_game_config(r#"{ "tank_source": { "x": 32 } }"#)
            .expect_err("unknown field");
        assert!(err.contains("tank_source"), "{err}");
    }

    #[test]
    fn invalid_json_reports_load_error_with_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "{ not json").expect("write config");

        let err = load_game_config(&path).expect_err("parse error");
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }
}
