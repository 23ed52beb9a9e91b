use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod animator;
pub mod app;
pub mod assets;
pub mod map;
pub mod sprite;
pub mod strategy;
pub mod surface;
pub mod tank;

pub use animator::{PlayerAnimator, ANIMATION_FRAMES};
pub use app::{
    run_app, AppError, Game, InputAction, InputSnapshot, LoopConfig, RenderError, Renderer,
    Viewport,
};
pub use assets::{load_text_asset, AssetError, AssetTracker, TileSheet};
pub use map::{
    parse_tile_map, render_tile_map, EmptyTilePolicy, MapFormatError, MapMetadata, MapRenderer,
    TileGrid, TileMapDocument,
};
pub use sprite::{source_region, Rect, Sprite, SpriteBox, SHEET_COLUMNS, TILE_SIZE_PX};
pub use strategy::RenderStrategy;
pub use surface::{DrawCall, DrawError, DrawSurface, PixelSurface, RecordingSurface};
pub use tank::{TankController, DEFAULT_STEP};

pub const ROOT_ENV_VAR: &str = "TANKS_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub assets_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error(
        "TANKS_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and an assets/ directory."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and assets/.\n\
Set {env_var} explicitly, for example:\n\
export {env_var}=\"/path/to/tanks\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    let assets_dir = root.join("assets");
    Ok(AppPaths { root, assets_dir })
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let normalized = normalize_path(&PathBuf::from(value));
            if is_repo_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot { path: normalized })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;
            find_root_from(&exe_dir).ok_or_else(|| StartupError::RootNotFound {
                start_dir: normalize_path(&exe_dir),
                env_var: ROOT_ENV_VAR,
            })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn find_root_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|candidate| is_repo_marker(candidate))
        .map(normalize_path)
}

fn is_repo_marker(path: &Path) -> bool {
    path.join("Cargo.toml").is_file() && path.join("assets").is_dir()
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
