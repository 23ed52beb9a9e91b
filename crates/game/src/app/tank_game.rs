use engine::{
    DrawError, DrawSurface, Game, InputAction, InputSnapshot, MapRenderer, PlayerAnimator, Rect,
    TankController, TileSheet,
};
use tracing::{debug, info};

/// One tank driven by the keyboard over a single tile map.
pub(crate) struct TankGame {
    sheet: TileSheet,
    map: MapRenderer,
    tank: TankController,
    animator: PlayerAnimator,
    move_step_px: f32,
    rotation_step_degrees: f32,
    last_tank_box: Option<Rect>,
}

impl TankGame {
    pub(crate) fn new(
        sheet: TileSheet,
        map: MapRenderer,
        tank: TankController,
        move_step_px: f32,
        rotation_step_degrees: f32,
    ) -> Self {
        Self {
            sheet,
            map,
            tank,
            animator: PlayerAnimator::new(),
            move_step_px,
            rotation_step_degrees,
            last_tank_box: None,
        }
    }

    #[cfg(test)]
    fn tank(&self) -> &TankController {
        &self.tank
    }
}

impl Game for TankGame {
    fn update(&mut self, input: &InputSnapshot) {
        let step = self.move_step_px;
        let up = input.is_down(InputAction::MoveUp);
        let down = input.is_down(InputAction::MoveDown);
        let left = input.is_down(InputAction::MoveLeft);
        let right = input.is_down(InputAction::MoveRight);

        if up && !down {
            self.tank.move_up(step);
        }
        if down && !up {
            self.tank.move_down(step);
        }
        if left && !right {
            self.tank.move_left(step);
        }
        if right && !left {
            self.tank.move_right(step);
        }

        match (input.rotate_left_pressed(), input.rotate_right_pressed()) {
            (true, false) => self.tank.rotate(-self.rotation_step_degrees),
            (false, true) => self.tank.rotate(self.rotation_step_degrees),
            _ => {}
        }

        let bounds = self.tank.sprite_box();
        debug!(x = bounds.x, y = bounds.y, "tank_updated");
    }

    fn render(&mut self, surface: &mut dyn DrawSurface) -> Result<(), DrawError> {
        if let Some(previous) = self.last_tank_box.take() {
            surface.clear_rect(previous);
        }
        self.map.render(&self.sheet, surface)?;
        self.animator.render(&mut self.tank, &self.sheet, surface)?;
        self.last_tank_box = Some(self.tank.sprite_box().tile_rect());
        Ok(())
    }

    fn shutdown(&mut self) {
        let bounds = self.tank.sprite_box();
        info!(x = bounds.x, y = bounds.y, "tank_game_shutdown");
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use engine::{
        DrawCall, EmptyTilePolicy, PixelSurface, RecordingSurface, RenderStrategy, Sprite,
        SpriteBox,
    };

    use super::*;

    const MAP_XML: &str = r#"<map width="2" height="1" tilewidth="32" tileheight="32">
  <layer name="ground" width="2" height="1">
    <data encoding="csv">1,0,</data>
  </layer>
</map>"#;

    fn game() -> TankGame {
        let sheet = TileSheet::from_rgba(1, 1, vec![255; 4]).expect("sheet");
        let mut map = MapRenderer::new(EmptyTilePolicy::Skip);
        map.load_tile_map_xml(MAP_XML).expect("map");
        let tank = TankController::new(Sprite::new(
            SpriteBox::default(),
            SpriteBox {
                x: 64.0,
                y: 96.0,
                ..SpriteBox::default()
            },
        ));
        TankGame::new(sheet, map, tank, 4.0, 90.0)
    }

    #[test]
    fn held_keys_move_tank_by_step() {
        let mut game = game();
        game.update(&InputSnapshot::with_held(&[
            InputAction::MoveRight,
            InputAction::MoveUp,
        ]));

        let bounds = game.tank().sprite_box();
        assert_eq!((bounds.x, bounds.y), (68.0, 92.0));
        assert_eq!((bounds.vx, bounds.vy), (4.0, 4.0));
    }

    #[test]
    fn opposing_keys_cancel() {
        let mut game = game();
        game.update(&InputSnapshot::with_held(&[
            InputAction::MoveLeft,
            InputAction::MoveRight,
            InputAction::MoveUp,
            InputAction::MoveDown,
        ]));

        let bounds = game.tank().sprite_box();
        assert_eq!((bounds.x, bounds.y), (64.0, 96.0));
    }

    #[test]
    fn rotate_press_queues_one_rotated_frame() {
        let mut game = game();
        game.update(&InputSnapshot::default().with_rotate_pressed(false, true));
        let mut surface = RecordingSurface::default();

        game.render(&mut surface).expect("render");

        assert!(surface.calls().contains(&DrawCall::Translate { x: 80.0, y: 112.0 }));
        let radians = surface
            .calls()
            .iter()
            .find_map(|call| match call {
                DrawCall::Rotate { radians } => Some(*radians),
                _ => None,
            })
            .expect("rotate call");
        assert!((radians - FRAC_PI_2).abs() < 1e-6);
        assert_eq!(game.tank().pending_strategy(), RenderStrategy::Default);
    }

    #[test]
    fn both_rotate_keys_cancel() {
        let mut game = game();
        game.update(&InputSnapshot::default().with_rotate_pressed(true, true));
        assert_eq!(game.tank().pending_strategy(), RenderStrategy::Default);
    }

    #[test]
    fn render_draws_map_then_tank_and_clears_previous_box() {
        let mut game = game();
        let mut surface = RecordingSurface::default();

        game.render(&mut surface).expect("first render");
        let first = surface.take_calls();
        assert!(!first.iter().any(|call| matches!(call, DrawCall::ClearRect(_))));
        assert_eq!(
            first[0],
            DrawCall::DrawImage {
                src: Rect::tile(0.0, 0.0),
                dest: Rect::tile(0.0, 0.0),
            }
        );
        assert_eq!(
            first[1],
            DrawCall::DrawImage {
                src: Rect::tile(32.0, 0.0),
                dest: Rect::tile(64.0, 96.0),
            }
        );

        game.update(&InputSnapshot::with_held(&[InputAction::MoveDown]));
        game.render(&mut surface).expect("second render");
        let second = surface.take_calls();
        assert_eq!(second[0], DrawCall::ClearRect(Rect::tile(64.0, 96.0)));
        assert!(second.contains(&DrawCall::DrawImage {
            src: Rect::tile(64.0, 0.0),
            dest: Rect::tile(64.0, 100.0),
        }));
    }

    #[test]
    fn far_off_canvas_tank_renders_only_the_map() {
        let mut game = game();
        for _ in 0..2 {
            game.tank.move_right(3.0e9);
            game.tank.move_up(3.0e9);
        }
        let mut buffer = vec![0; 64 * 32 * 4];
        let mut canvas = PixelSurface::new(&mut buffer, 64, 32);

        game.render(&mut canvas).expect("render");
        game.render(&mut canvas).expect("render again");

        assert_eq!(&buffer[..4], &[255, 255, 255, 255]);
        assert!(buffer[32 * 4..64 * 4].iter().all(|byte| *byte == 0));
    }

    #[test]
    fn draw_failure_propagates() {
        let mut game = game();
        let mut surface = RecordingSurface::default();
        surface.fail_draws_with(DrawError::EmptySheet);

        let err = game.render(&mut surface).expect_err("draw fails");
        assert_eq!(err, DrawError::EmptySheet);
    }
}
