use std::sync::Arc;

use pixels::{Pixels, SurfaceTexture};
use thiserror::Error;
use winit::window::Window;

use crate::app::Game;
use crate::surface::{DrawError, PixelSurface};

/// Size of the drawing canvas in pixels. The canvas is scaled to the window
/// surface on present, so it stays fixed across window resizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("draw failed: {0}")]
    Draw(#[from] DrawError),
    #[error("present failed: {0}")]
    Present(#[from] pixels::Error),
    #[error("surface resize failed: {0}")]
    Resize(#[from] pixels::TextureError),
}

pub struct Renderer {
    pixels: Pixels<'static>,
    viewport: Viewport,
    clear_color: [u8; 4],
}

impl Renderer {
    pub fn new(
        window: Arc<Window>,
        viewport: Viewport,
        clear_color: [u8; 4],
    ) -> Result<Self, pixels::Error> {
        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width, size.height, window);
        let mut pixels = Pixels::new(viewport.width, viewport.height, surface)?;
        let mut canvas = PixelSurface::new(pixels.frame_mut(), viewport.width, viewport.height);
        canvas.fill(clear_color);
        Ok(Self {
            pixels,
            viewport,
            clear_color,
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels.resize_surface(width, height)?;
        Ok(())
    }

    /// Lets `game` draw onto the persistent canvas, then presents it.
    pub fn render_frame(&mut self, game: &mut dyn Game) -> Result<(), RenderError> {
        let mut canvas = PixelSurface::new(
            self.pixels.frame_mut(),
            self.viewport.width,
            self.viewport.height,
        )
        .with_clear_color(self.clear_color);
        game.render(&mut canvas)?;
        self.pixels.render()?;
        Ok(())
    }

    /// Presents the canvas as last drawn.
    pub fn present(&mut self) -> Result<(), RenderError> {
        self.pixels.render()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_errors_convert_into_render_errors() {
        let error: RenderError = DrawError::EmptySheet.into();
        assert!(matches!(error, RenderError::Draw(DrawError::EmptySheet)));
        assert_eq!(error.to_string(), "draw failed: tile sheet has no pixels");
    }
}
