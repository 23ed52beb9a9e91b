mod pixel;
mod recording;

use std::ops::{Deref, DerefMut};

use thiserror::Error;

use crate::assets::TileSheet;
use crate::sprite::Rect;

pub use pixel::{Affine, PixelSurface};
pub use recording::{DrawCall, RecordingSurface};

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DrawError {
    #[error("tile sheet has no pixels")]
    EmptySheet,
    #[error("transform is not invertible")]
    SingularTransform,
}

/// Canvas-style drawing target.
///
/// Transform calls compose onto the current transform the way a 2D canvas
/// does; `restore` without a matching `save` is a no-op.
pub trait DrawSurface {
    /// Copies `src` from `sheet` into `dest`, scaling when the sizes differ.
    fn draw_image(&mut self, sheet: &TileSheet, src: Rect, dest: Rect) -> Result<(), DrawError>;

    fn clear_rect(&mut self, rect: Rect);

    fn save(&mut self);

    fn restore(&mut self);

    fn reset_transform(&mut self);

    fn translate(&mut self, x: f32, y: f32);

    fn rotate(&mut self, radians: f32);
}

/// Saves the surface transform on creation and restores it on drop, so the
/// restore also runs when a draw inside the scope returns early with an error.
pub struct SavedTransform<'a, S: DrawSurface + ?Sized> {
    surface: &'a mut S,
}

impl<'a, S: DrawSurface + ?Sized> SavedTransform<'a, S> {
    pub fn new(surface: &'a mut S) -> Self {
        surface.save();
        Self { surface }
    }
}

impl<S: DrawSurface + ?Sized> Deref for SavedTransform<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: DrawSurface + ?Sized> DerefMut for SavedTransform<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: DrawSurface + ?Sized> Drop for SavedTransform<'_, S> {
    fn drop(&mut self) {
        self.surface.restore();
    }
}
