use crate::assets::TileSheet;
use crate::sprite::Rect;

use super::{DrawError, DrawSurface};

const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// 2D affine transform in canvas order:
/// `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Affine {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn translated(self, tx: f32, ty: f32) -> Self {
        Self {
            e: self.a * tx + self.c * ty + self.e,
            f: self.b * tx + self.d * ty + self.f,
            ..self
        }
    }

    pub fn rotated(self, radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self {
            a: self.a * cos + self.c * sin,
            b: self.b * cos + self.d * sin,
            c: self.c * cos - self.a * sin,
            d: self.d * cos - self.b * sin,
            ..self
        }
    }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    pub fn inverse(&self) -> Option<Self> {
        let det = self.a * self.d - self.b * self.c;
        if !det.is_finite() || det.abs() <= f32::EPSILON {
            return None;
        }
        Some(Self {
            a: self.d / det,
            b: -self.b / det,
            c: -self.c / det,
            d: self.a / det,
            e: (self.c * self.f - self.d * self.e) / det,
            f: (self.b * self.e - self.a * self.f) / det,
        })
    }
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Software surface drawing into a row-major RGBA8 frame.
pub struct PixelSurface<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
    transform: Affine,
    saved: Vec<Affine>,
    clear_color: [u8; 4],
}

impl<'a> PixelSurface<'a> {
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            frame,
            width,
            height,
            transform: Affine::IDENTITY,
            saved: Vec::new(),
            clear_color: TRANSPARENT,
        }
    }

    /// Color written by `clear_rect`.
    pub fn with_clear_color(mut self, color: [u8; 4]) -> Self {
        self.clear_color = color;
        self
    }

    pub fn transform(&self) -> Affine {
        self.transform
    }

    pub fn fill(&mut self, color: [u8; 4]) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let bytes = self.frame.get(offset..offset + 4)?;
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

impl DrawSurface for PixelSurface<'_> {
    fn draw_image(&mut self, sheet: &TileSheet, src: Rect, dest: Rect) -> Result<(), DrawError> {
        if sheet.is_empty() {
            return Err(DrawError::EmptySheet);
        }
        if src.is_empty() || dest.is_empty() {
            return Ok(());
        }
        let inverse = self.transform.inverse().ok_or(DrawError::SingularTransform)?;
        let scale_x = src.width / dest.width;
        let scale_y = src.height / dest.height;

        for (x, y, local_x, local_y) in
            covered_pixels(self.width, self.height, &self.transform, &inverse, dest)
        {
            let u = src.x + (local_x - dest.x) * scale_x;
            let v = src.y + (local_y - dest.y) * scale_y;
            let Some(texel) = sheet.texel(u.floor() as i32, v.floor() as i32) else {
                continue;
            };
            if texel[3] == 0 {
                continue;
            }
            write_pixel_rgba_clipped(self.frame, self.width as usize, x, y, texel);
        }
        Ok(())
    }

    fn clear_rect(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        let Some(inverse) = self.transform.inverse() else {
            return;
        };
        for (x, y, _, _) in covered_pixels(self.width, self.height, &self.transform, &inverse, rect)
        {
            write_pixel_rgba_clipped(self.frame, self.width as usize, x, y, self.clear_color);
        }
    }

    fn save(&mut self) {
        self.saved.push(self.transform);
    }

    fn restore(&mut self) {
        if let Some(transform) = self.saved.pop() {
            self.transform = transform;
        }
    }

    fn reset_transform(&mut self) {
        self.transform = Affine::IDENTITY;
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.transform = self.transform.translated(x, y);
    }

    fn rotate(&mut self, radians: f32) {
        self.transform = self.transform.rotated(radians);
    }
}

/// Frame pixels whose centers fall inside `rect` after `transform`, paired
/// with the center position in `rect`'s untransformed space.
fn covered_pixels(
    width: u32,
    height: u32,
    transform: &Affine,
    inverse: &Affine,
    rect: Rect,
) -> impl Iterator<Item = (i32, i32, f32, f32)> {
    let corners = [
        transform.apply(rect.x, rect.y),
        transform.apply(rect.right(), rect.y),
        transform.apply(rect.x, rect.bottom()),
        transform.apply(rect.right(), rect.bottom()),
    ];
    let (mut min_x, mut min_y) = (f32::INFINITY, f32::INFINITY);
    let (mut max_x, mut max_y) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
    for (x, y) in corners {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    // Clamped before the cast so far-off coordinates cannot wrap.
    let (frame_width, frame_height) = (width as f32, height as f32);
    let left = min_x.floor().clamp(0.0, frame_width) as i32;
    let top = min_y.floor().clamp(0.0, frame_height) as i32;
    let right = max_x.ceil().clamp(0.0, frame_width) as i32;
    let bottom = max_y.ceil().clamp(0.0, frame_height) as i32;
    let (rows, columns) = if left < right && top < bottom {
        (top..bottom, left..right)
    } else {
        (0..0, 0..0)
    };
    let inverse = *inverse;

    rows.flat_map(move |y| {
        columns.clone().filter_map(move |x| {
            let (local_x, local_y) = inverse.apply(x as f32 + 0.5, y as f32 + 0.5);
            rect.contains(local_x, local_y)
                .then_some((x, y, local_x, local_y))
        })
    })
}

fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 {
        return;
    }
    let x = x as usize;
    let y = y as usize;
    let Some(pixel_offset) = y.checked_mul(width).and_then(|row| row.checked_add(x)) else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}
