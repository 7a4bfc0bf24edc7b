use std::ops::Range;

use crate::{surface::SurfaceSize, ui::Rect};

pub type Color = [u8; 4];

// A tiny 3x5 block font (no external deps). Scaled up it doubles as the flip-clock digits.
pub const GLYPH_W: u32 = 3;
pub const GLYPH_H: u32 = 5;

pub fn glyph_advance_x(scale: u32) -> u32 {
    (GLYPH_W + 1) * scale.max(1)
}

pub fn line_advance_y(scale: u32) -> u32 {
    (GLYPH_H + 1) * scale.max(1)
}

/// Pixel width of the longest line of `text` at `scale`, without trailing spacing.
pub fn text_width(text: &str, scale: u32) -> u32 {
    let scale = scale.max(1);
    text.lines()
        .map(|line| {
            let n = line.chars().count() as u32;
            if n == 0 {
                0
            } else {
                glyph_advance_x(scale) * n - scale
            }
        })
        .max()
        .unwrap_or(0)
}

pub fn text_height(text: &str, scale: u32) -> u32 {
    let lines = text.lines().count().max(1) as u32;
    line_advance_y(scale) * lines - scale.max(1)
}

/// Unified 2D rendering interface.
///
/// Widget code only talks to this trait, so the same drawing runs against a window or an
/// in-memory buffer in tests.
pub trait Renderer2d {
    fn begin_frame(&mut self, size: SurfaceSize);
    fn size(&self) -> SurfaceSize;

    /// Opaque fill.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Alpha-blended rect over existing content (alpha is applied to `color`'s RGB).
    fn blend_rect(&mut self, rect: Rect, color: Color, alpha: u8);

    /// Alpha-blended single pixel; coordinates may be off-surface and are clipped.
    fn blend_pixel(&mut self, x: i32, y: i32, color: Color, alpha: u8);

    fn draw_text_scaled(&mut self, x: u32, y: u32, text: &str, color: Color, scale: u32);

    /// Draws `text` centered inside `rect`.
    fn draw_text_centered(&mut self, rect: Rect, text: &str, color: Color, scale: u32) {
        let w = text_width(text, scale);
        let h = text_height(text, scale);
        let x = rect.x + rect.w.saturating_sub(w) / 2;
        let y = rect.y + rect.h.saturating_sub(h) / 2;
        self.draw_text_scaled(x, y, text, color, scale);
    }

    fn rect_outline(&mut self, rect: Rect, color: Color) {
        if rect.is_empty() {
            return;
        }
        self.fill_rect(Rect::new(rect.x, rect.y, rect.w, 1), color);
        self.fill_rect(Rect::new(rect.x, rect.bottom() - 1, rect.w, 1), color);
        self.fill_rect(Rect::new(rect.x, rect.y, 1, rect.h), color);
        self.fill_rect(Rect::new(rect.right() - 1, rect.y, 1, rect.h), color);
    }

    fn clear(&mut self, color: Color) {
        let s = self.size();
        self.fill_rect(Rect::from_size(s.width, s.height), color);
    }
}

/// CPU renderer that draws into an RGBA frame buffer.
pub struct CpuRenderer<'a> {
    frame: &'a mut [u8],
    size: SurfaceSize,
}

impl<'a> CpuRenderer<'a> {
    pub fn new(frame: &'a mut [u8], size: SurfaceSize) -> Self {
        Self { frame, size }
    }

    /// Byte ranges of each clipped row of `rect`, or `None` if nothing is visible.
    fn clipped_rows(&self, rect: Rect) -> Option<Vec<Range<usize>>> {
        let max_x = rect.right().min(self.size.width);
        let max_y = rect.bottom().min(self.size.height);
        if rect.x >= max_x || rect.y >= max_y || self.frame.len() < self.size.rgba_len() {
            return None;
        }

        let stride = self.size.width as usize * 4;
        let x0 = rect.x as usize * 4;
        let x1 = max_x as usize * 4;
        Some(
            (rect.y as usize..max_y as usize)
                .map(|row| {
                    let start = row * stride;
                    start + x0..start + x1
                })
                .collect(),
        )
    }

    fn put_pixel(&mut self, x: u32, y: u32, color: Color) {
        if x >= self.size.width || y >= self.size.height {
            return;
        }
        let idx = ((y as usize) * (self.size.width as usize) + x as usize) * 4;
        if let Some(px) = self.frame.get_mut(idx..idx + 4) {
            px.copy_from_slice(&color);
        }
    }
}

fn blend_channel(dst: u8, src: u8, alpha: u32) -> u8 {
    let inv = 255 - alpha;
    ((dst as u32 * inv + src as u32 * alpha + 127) / 255) as u8
}

fn blend_into(px: &mut [u8], color: Color, alpha: u8) {
    let a = alpha as u32;
    px[0] = blend_channel(px[0], color[0], a);
    px[1] = blend_channel(px[1], color[1], a);
    px[2] = blend_channel(px[2], color[2], a);
    px[3] = 255;
}

impl Renderer2d for CpuRenderer<'_> {
    fn begin_frame(&mut self, size: SurfaceSize) {
        self.size = size;
    }

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some(rows) = self.clipped_rows(rect) else {
            return;
        };
        for range in rows {
            for px in self.frame[range].chunks_exact_mut(4) {
                px.copy_from_slice(&color);
            }
        }
    }

    fn blend_rect(&mut self, rect: Rect, color: Color, alpha: u8) {
        match alpha {
            0 => {}
            255 => self.fill_rect(rect, color),
            _ => {
                let Some(rows) = self.clipped_rows(rect) else {
                    return;
                };
                for range in rows {
                    for px in self.frame[range].chunks_exact_mut(4) {
                        blend_into(px, color, alpha);
                    }
                }
            }
        }
    }

    fn blend_pixel(&mut self, x: i32, y: i32, color: Color, alpha: u8) {
        if alpha == 0 || x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.size.width || y >= self.size.height {
            return;
        }
        let idx = ((y as usize) * (self.size.width as usize) + x as usize) * 4;
        if let Some(px) = self.frame.get_mut(idx..idx + 4) {
            blend_into(px, color, alpha);
        }
    }

    fn draw_text_scaled(&mut self, x: u32, y: u32, text: &str, color: Color, scale: u32) {
        let scale = scale.max(1);
        let adv_x = glyph_advance_x(scale);
        let adv_y = line_advance_y(scale);

        let mut cursor_x = x;
        let mut cursor_y = y;
        for ch in text.chars() {
            if ch == '\n' {
                cursor_x = x;
                cursor_y = cursor_y.saturating_add(adv_y);
                continue;
            }
            if cursor_x >= self.size.width || cursor_y >= self.size.height {
                continue;
            }
            if ch != ' ' {
                for (row, bits) in glyph_rows(ch).into_iter().enumerate() {
                    for col in 0..GLYPH_W {
                        if bits & (1u8 << (GLYPH_W - 1 - col)) == 0 {
                            continue;
                        }
                        let px0 = cursor_x + col * scale;
                        let py0 = cursor_y + row as u32 * scale;
                        for dy in 0..scale {
                            for dx in 0..scale {
                                self.put_pixel(px0 + dx, py0 + dy, color);
                            }
                        }
                    }
                }
            }
            cursor_x = cursor_x.saturating_add(adv_x);
        }
    }
}

/// Row bitmaps (MSB = left column) for the block font. Lowercase maps to uppercase; unknown
/// characters render as `?`.
pub fn glyph_rows(ch: char) -> [u8; GLYPH_H as usize] {
    match ch.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],

        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b111, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b110, 0b100, 0b110, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b101, 0b111, 0b111, 0b111, 0b101],
        'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'R' => [0b111, 0b101, 0b111, 0b110, 0b101],
        'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],

        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '\'' => [0b010, 0b010, 0b000, 0b000, 0b000],

        _ => [0b111, 0b001, 0b010, 0b000, 0b010],
    }
}
