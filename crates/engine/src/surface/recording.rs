use crate::assets::TileSheet;
use crate::sprite::Rect;

use super::{DrawError, DrawSurface};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCall {
    DrawImage { src: Rect, dest: Rect },
    ClearRect(Rect),
    Save,
    Restore,
    ResetTransform,
    Translate { x: f32, y: f32 },
    Rotate { radians: f32 },
}

/// Surface that records every call instead of drawing. Used for headless
/// runs and for asserting draw order in tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    calls: Vec<DrawCall>,
    draw_failure: Option<DrawError>,
}

impl RecordingSurface {
    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }

    /// Source/destination pairs of every recorded blit, in call order.
    pub fn blits(&self) -> Vec<(Rect, Rect)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::DrawImage { src, dest } => Some((*src, *dest)),
                _ => None,
            })
            .collect()
    }

    /// Makes every later `draw_image` call fail with `error` after recording it.
    pub fn fail_draws_with(&mut self, error: DrawError) {
        self.draw_failure = Some(error);
    }
}

impl DrawSurface for RecordingSurface {
    fn draw_image(&mut self, _sheet: &TileSheet, src: Rect, dest: Rect) -> Result<(), DrawError> {
        self.calls.push(DrawCall::DrawImage { src, dest });
        match self.draw_failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.calls.push(DrawCall::ClearRect(rect));
    }

    fn save(&mut self) {
        self.calls.push(DrawCall::Save);
    }

    fn restore(&mut self) {
        self.calls.push(DrawCall::Restore);
    }

    fn reset_transform(&mut self) {
        self.calls.push(DrawCall::ResetTransform);
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.calls.push(DrawCall::Translate { x, y });
    }

    fn rotate(&mut self, radians: f32) {
        self.calls.push(DrawCall::Rotate { radians });
    }
}
