use crate::assets::TileSheet;
use crate::sprite::{Rect, SpriteBox, TILE_SIZE_PX};
use crate::surface::{DrawError, DrawSurface, SavedTransform};

const HALF_TILE_PX: f32 = TILE_SIZE_PX as f32 / 2.0;

/// How a sprite is drawn for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RenderStrategy {
    /// Plain blit at the sprite position.
    #[default]
    Default,
    /// Blit rotated by `degrees` around the sprite's cell center.
    Rotate { degrees: f32 },
}

impl RenderStrategy {
    pub fn apply(
        &self,
        surface: &mut dyn DrawSurface,
        sheet: &TileSheet,
        source: Rect,
        sprite: &SpriteBox,
    ) -> Result<(), DrawError> {
        match *self {
            RenderStrategy::Default => draw_default(surface, sheet, source, sprite),
            RenderStrategy::Rotate { degrees } => {
                draw_rotated(surface, sheet, source, sprite, degrees)
            }
        }
    }
}

fn draw_default(
    surface: &mut dyn DrawSurface,
    sheet: &TileSheet,
    source: Rect,
    sprite: &SpriteBox,
) -> Result<(), DrawError> {
    let result = surface.draw_image(
        sheet,
        Rect::tile(source.x, source.y),
        Rect::tile(sprite.x, sprite.y),
    );
    surface.restore();
    result
}

fn draw_rotated(
    surface: &mut dyn DrawSurface,
    sheet: &TileSheet,
    source: Rect,
    sprite: &SpriteBox,
    degrees: f32,
) -> Result<(), DrawError> {
    let mut scoped = SavedTransform::new(surface);
    scoped.reset_transform();
    scoped.translate(sprite.x + HALF_TILE_PX, sprite.y + HALF_TILE_PX);
    scoped.rotate(degrees.to_radians());
    scoped.draw_image(
        sheet,
        Rect::tile(source.x, source.y),
        Rect::tile(-HALF_TILE_PX, -HALF_TILE_PX),
    )
}
