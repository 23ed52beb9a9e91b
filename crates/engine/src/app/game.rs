use crate::surface::{DrawError, DrawSurface};

use super::InputSnapshot;

/// Per-tick hooks the host loop drives: `update` then `render`, once each
/// per tick, on a single thread.
pub trait Game {
    fn update(&mut self, input: &InputSnapshot);

    fn render(&mut self, surface: &mut dyn DrawSurface) -> Result<(), DrawError>;

    fn shutdown(&mut self) {}
}
