use std::path::Path;

use engine::{
    load_text_asset, resolve_app_paths, source_region, AssetError, AssetTracker, Game,
    LoopConfig, MapFormatError, MapRenderer, Sprite, StartupError, TankController, TileSheet,
    ANIMATION_FRAMES, TILE_SIZE_PX,
};
use thiserror::Error;
use tracing::{info, warn};

use super::config::{load_game_config, ConfigError, GameConfig, CONFIG_FILE_NAME};
use super::tank_game::TankGame;

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) game: Box<dyn Game>,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("failed to load tile map {path}: {source}")]
    Map {
        path: String,
        #[source]
        source: MapFormatError,
    },
    #[error("required assets not loaded: {missing:?}")]
    AssetsNotReady { missing: Vec<String> },
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    let paths = resolve_app_paths()?;
    info!(root = %paths.root.display(), "root_resolved");
    build_app_from_assets(&paths.assets_dir)
}

/// Wires config, assets, map, tank and animator into a runnable game.
pub(crate) fn build_app_from_assets(assets_dir: &Path) -> Result<AppWiring, BootstrapError> {
    let config = load_game_config(&assets_dir.join(CONFIG_FILE_NAME))?;

    let sheet_key = config.tile_sheet.display().to_string();
    let map_key = config.map.display().to_string();
    let mut tracker = AssetTracker::new([sheet_key.clone(), map_key.clone()]);

    let map_xml = load_text_asset(&assets_dir.join(&config.map))?;
    tracker.mark_loaded(&map_key);
    let sheet = TileSheet::load(&assets_dir.join(&config.tile_sheet))?;
    tracker.mark_loaded(&sheet_key);

    if !tracker.is_ready() {
        let missing = tracker
            .required_assets()
            .filter(|required| !tracker.loaded_assets().any(|loaded| loaded == *required))
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        return Err(BootstrapError::AssetsNotReady { missing });
    }

    let mut map = MapRenderer::new(config.empty_tiles);
    map.load_tile_map_xml(&map_xml)
        .map_err(|source| BootstrapError::Map {
            path: map_key.clone(),
            source,
        })?;

    let loop_config = loop_config_for(&config, &map);
    let tank = TankController::new(Sprite {
        source: source_region(ANIMATION_FRAMES[0]),
        bounds: config.tank_sprite,
    });
    let game = TankGame::new(
        sheet,
        map,
        tank,
        config.move_step_px,
        config.rotation_step_degrees,
    );

    Ok(AppWiring {
        config: loop_config,
        game: Box::new(game),
    })
}

fn loop_config_for(config: &GameConfig, map: &MapRenderer) -> LoopConfig {
    let defaults = LoopConfig::default();
    let tile = TILE_SIZE_PX as u32;
    let (window_width, window_height) = match map.metadata() {
        Some(metadata) if metadata.width > 0 && metadata.height > 0 => (
            metadata.width.saturating_mul(tile),
            metadata.height.saturating_mul(tile),
        ),
        _ => {
            warn!("map_size_unknown");
            (defaults.window_width, defaults.window_height)
        }
    };

    LoopConfig {
        window_width,
        window_height,
        tick_interval: config.tick_interval(),
        clear_color: config.clear_color,
        ..defaults
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::Duration;

    use super::*;

    const MAP_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<map version="1.0" orientation="orthogonal" width="3" height="2" tilewidth="32" tileheight="32">
  <layer name="ground" width="3" height="2">
    <data encoding="csv">
1,2,3,
4,5,6
</data>
  </layer>
</map>"#;

    fn write_assets(dir: &Path, map_xml: &str) {
        fs::create_dir_all(dir.join("images")).expect("images dir");
        fs::create_dir_all(dir.join("maps")).expect("maps dir");
        image::RgbaImage::new(64, 64)
            .save(dir.join("images").join("tile-sheet.png"))
            .expect("save sheet");
        fs::write(dir.join("maps").join("tanks-tilemap.tmx"), map_xml).expect("write map");
    }

    #[test]
    fn builds_window_sized_to_map() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_assets(temp.path(), MAP_XML);
        fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            r#"{ "tick_interval_ms": 40 }"#,
        )
        .expect("write config");

        let wiring = build_app_from_assets(temp.path()).expect("wiring");

        assert_eq!(
            (wiring.config.window_width, wiring.config.window_height),
            (96, 64)
        );
        assert_eq!(wiring.config.tick_interval, Duration::from_millis(40));
        assert_eq!(wiring.config.window_title, "Tanks");
    }

    #[test]
    fn shipped_assets_build() {
        let assets_dir = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("assets");

        let wiring = build_app_from_assets(&assets_dir).expect("shipped assets");

        assert_eq!(
            (wiring.config.window_width, wiring.config.window_height),
            (640, 480)
        );
    }

    #[test]
    fn missing_tile_sheet_is_an_asset_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(temp.path().join("maps")).expect("maps dir");
        fs::write(temp.path().join("maps").join("tanks-tilemap.tmx"), MAP_XML).expect("write map");

        let err = build_app_from_assets(temp.path())
            .err()
            .expect("missing sheet");
        assert!(matches!(err, BootstrapError::Asset(_)), "{err}");
    }

    #[test]
    fn malformed_map_reports_map_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_assets(temp.path(), "<tileset/>");

        let err = build_app_from_assets(temp.path())
            .err()
            .expect("bad map");
        assert!(matches!(
            err,
            BootstrapError::Map {
                source: MapFormatError::InvalidRoot { .. },
                ..
            }
        ));
        assert!(err.to_string().contains("tanks-tilemap.tmx"), "{err}");
    }

    #[test]
    fn invalid_config_stops_startup() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_assets(temp.path(), MAP_XML);
        fs::write(temp.path().join(CONFIG_FILE_NAME), r#"{ "map": 7 }"#).expect("write config");

        let err = build_app_from_assets(temp.path())
            .err()
            .expect("bad config");
        assert!(matches!(err, BootstrapError::Config(_)), "{err}");
    }
}
