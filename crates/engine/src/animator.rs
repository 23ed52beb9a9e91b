use crate::assets::TileSheet;
use crate::sprite::source_region;
use crate::surface::{DrawError, DrawSurface};
use crate::tank::TankController;

/// Sheet indices of the tank's track animation, in play order.
pub const ANIMATION_FRAMES: [i32; 8] = [1, 2, 3, 4, 5, 6, 7, 8];

/// Cycles a tank through its animation frames, one frame per render call.
#[derive(Debug, Clone, Default)]
pub struct PlayerAnimator {
    frame_index: usize,
}

impl PlayerAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn current_frame(&self) -> i32 {
        ANIMATION_FRAMES[self.frame_index]
    }

    /// Draws the current frame with the tank's pending strategy, then moves
    /// to the next frame.
    ///
    /// The pending strategy is consumed even when drawing fails; the frame
    /// index only advances after a successful draw.
    pub fn render(
        &mut self,
        tank: &mut TankController,
        sheet: &TileSheet,
        surface: &mut dyn DrawSurface,
    ) -> Result<(), DrawError> {
        let source = source_region(self.current_frame());
        let strategy = tank.take_strategy();
        strategy.apply(surface, sheet, source, tank.sprite_box())?;

        self.frame_index += 1;
        if self.frame_index == ANIMATION_FRAMES.len() {
            self.frame_index = 0;
        }
        Ok(())
    }
}
