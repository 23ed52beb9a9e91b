mod renderer;
mod tmx;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use renderer::{render_tile_map, MapRenderer};
pub use tmx::parse_tile_map;

/// Map attributes read from the root `<map>` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapMetadata {
    pub width: u32,
    pub height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
}

/// Row-major grid of 1-based tile indices; `0` marks an empty cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tiles: Vec<u32>,
}

impl TileGrid {
    pub fn new(width: u32, height: u32, tiles: Vec<u32>) -> Result<Self, MapFormatError> {
        let expected = width as usize * height as usize;
        let actual = tiles.len();
        if expected != actual {
            return Err(MapFormatError::TileCountMismatch { expected, actual });
        }
        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, row: u32, col: u32) -> Option<u32> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.tiles
            .get(row as usize * self.width as usize + col as usize)
            .copied()
    }

    pub fn row(&self, row: u32) -> Option<&[u32]> {
        if row >= self.height {
            return None;
        }
        let start = row as usize * self.width as usize;
        self.tiles.get(start..start + self.width as usize)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        (0..self.height).filter_map(move |row| self.row(row))
    }

    pub fn to_rows(&self) -> Vec<Vec<u32>> {
        self.rows().map(<[u32]>::to_vec).collect()
    }
}

/// Result of parsing one tile-map document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileMapDocument {
    pub metadata: MapMetadata,
    pub grid: TileGrid,
}

/// How cells holding `0` are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyTilePolicy {
    /// Empty cells are left untouched.
    #[default]
    Skip,
    /// Empty cells are blitted from sheet index `-1`, which lies outside the
    /// sheet and so draws nothing on a clipping surface.
    Blit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapFormatError {
    #[error("malformed XML at line {line}, column {column}: {message}")]
    Malformed {
        message: String,
        line: u32,
        column: u32,
    },
    #[error("root element must be <map>, found <{found}>")]
    InvalidRoot { found: String },
    #[error("<map> is missing required attribute '{name}'")]
    MissingAttribute { name: &'static str },
    #[error("<map> attribute '{name}' must be a positive integer, got '{value}'")]
    InvalidAttribute { name: &'static str, value: String },
    #[error("<map> has no <layer>")]
    MissingLayer,
    #[error("<layer> has no <data>")]
    MissingData,
    #[error("unsupported tile data encoding '{encoding}'; only csv is supported")]
    UnsupportedEncoding { encoding: String },
    #[error("tile '{token}' at row {row}, column {column} is not a non-negative integer")]
    InvalidTile {
        row: usize,
        column: usize,
        token: String,
    },
    #[error("row {row} has {actual} tiles, expected {expected}")]
    RowLengthMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("tile data has {actual} rows, expected {expected}")]
    RowCountMismatch { expected: usize, actual: usize },
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
}
