use crate::sprite::{Sprite, SpriteBox};
use crate::strategy::RenderStrategy;

/// Distance moved by a movement command when the caller gives no magnitude.
pub const DEFAULT_STEP: f32 = 1.0;

/// Owns a tank's sprite and applies movement and rotation commands to it.
///
/// Movement is not clamped and values are not validated; keeping the tank on
/// screen is the caller's job.
#[derive(Debug, Clone, PartialEq)]
pub struct TankController {
    sprite: Sprite,
    strategy: RenderStrategy,
}

impl TankController {
    pub fn new(sprite: Sprite) -> Self {
        Self {
            sprite,
            strategy: RenderStrategy::Default,
        }
    }

    pub fn sprite(&self) -> &Sprite {
        &self.sprite
    }

    pub fn sprite_mut(&mut self) -> &mut Sprite {
        &mut self.sprite
    }

    pub fn sprite_box(&self) -> &SpriteBox {
        &self.sprite.bounds
    }

    pub fn move_right(&mut self, dx: f32) {
        let bounds = &mut self.sprite.bounds;
        bounds.vx = dx;
        bounds.x += bounds.vx;
    }

    pub fn move_left(&mut self, dx: f32) {
        let bounds = &mut self.sprite.bounds;
        bounds.vx = dx;
        bounds.x -= bounds.vx;
    }

    pub fn move_up(&mut self, dy: f32) {
        let bounds = &mut self.sprite.bounds;
        bounds.vy = dy;
        bounds.y -= bounds.vy;
    }

    pub fn move_down(&mut self, dy: f32) {
        let bounds = &mut self.sprite.bounds;
        bounds.vy = dy;
        bounds.y += bounds.vy;
    }

    /// Sets `vx` and adds the raw value to `x`; a negative value moves left.
    pub fn set_x_velocity(&mut self, vx: f32) {
        let bounds = &mut self.sprite.bounds;
        bounds.vx = vx;
        bounds.x += vx;
    }

    /// Requests a rotated draw for the next rendered frame only.
    pub fn rotate(&mut self, degrees: f32) {
        self.strategy = RenderStrategy::Rotate { degrees };
    }

    pub fn pending_strategy(&self) -> RenderStrategy {
        self.strategy
    }

    /// Hands out the pending strategy and falls back to the default one.
    pub fn take_strategy(&mut self) -> RenderStrategy {
        std::mem::take(&mut self.strategy)
    }
}

impl Default for TankController {
    fn default() -> Self {
        Self::new(Sprite::default())
    }
}
