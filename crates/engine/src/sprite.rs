use serde::{Deserialize, Serialize};

/// Number of cell columns in one row of the tile sheet.
pub const SHEET_COLUMNS: i32 = 8;
/// Edge length of a single tile sheet cell, in pixels.
pub const TILE_SIZE_PX: i32 = 32;

const DEFAULT_SPRITE_SIZE_PX: f32 = 64.0;

/// Axis-aligned rectangle used both for tile sheet lookups and for placement
/// on the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle one tile cell in size with its top-left corner at `(x, y)`.
    pub const fn tile(x: f32, y: f32) -> Self {
        Self::new(x, y, TILE_SIZE_PX as f32, TILE_SIZE_PX as f32)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Maps a 0-based sheet index to the cell it occupies in the tile sheet.
///
/// The column keeps the sign of `index` and the row rounds toward negative
/// infinity, so `-1` lands on `(-32, -32)` rather than wrapping into the sheet.
/// Indices past the sheet yield regions past its edge; nothing overflows.
pub fn source_region(index: i32) -> Rect {
    let tile = i64::from(TILE_SIZE_PX);
    let column = i64::from(index % SHEET_COLUMNS);
    let row = i64::from(index.div_euclid(SHEET_COLUMNS));
    Rect::tile((column * tile) as f32, (row * tile) as f32)
}

/// Mutable on-screen state of one entity.
///
/// `vx`/`vy` hold the last per-axis delta applied by a movement command, not a
/// continuous velocity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub vx: f32,
    pub vy: f32,
}

impl Default for SpriteBox {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: DEFAULT_SPRITE_SIZE_PX,
            height: DEFAULT_SPRITE_SIZE_PX,
            vx: 0.0,
            vy: 0.0,
        }
    }
}

impl SpriteBox {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// The one-cell box drawn for this sprite, anchored at its position.
    pub fn tile_rect(&self) -> Rect {
        Rect::tile(self.x, self.y)
    }
}

/// A sheet region paired with the box it is drawn into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    /// Sheet region of the sprite's still image. `PlayerAnimator` draws from
    /// its own frame list and does not read this.
    pub source: Rect,
    pub bounds: SpriteBox,
}

impl Sprite {
    /// Builds a sprite from two box configurations; only the rectangle of
    /// `source` is used, its velocity fields are ignored.
    pub fn new(source: SpriteBox, sprite: SpriteBox) -> Self {
        Self {
            source: source.rect(),
            bounds: sprite,
        }
    }
}

impl Default for Sprite {
    fn default() -> Self {
        Self::new(SpriteBox::default(), SpriteBox::default())
    }
}
