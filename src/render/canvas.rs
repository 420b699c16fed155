//! Fixed-size PNG canvas renderer.
//!
//! Each distinct word of a blob is drawn as text in an embedded 5×8 bitmap
//! font. The glyph scale is proportional to the word's share of the blob (the
//! most frequent word is about a quarter of the canvas tall), and words are
//! shelf-packed left to right, top to bottom, most frequent first. Words that
//! do not fit are dropped, as a word cloud drops words it cannot place.

use std::path::Path;

use image::{ImageFormat, Rgb, RgbImage};

use super::font::{self, ADVANCE, GLYPH_H, GLYPH_W};
use super::{RenderError, Renderer};
use crate::blob::term_counts;

/// Canvas settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasConfig {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Background colour.
    pub background: [u8; 3],
    /// Most distinct words drawn.
    pub max_words: usize,
    /// Gap around and between words.
    pub margin: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            background: [0, 0, 0],
            max_words: 200,
            margin: 4,
        }
    }
}

impl CanvasConfig {
    /// Create the default 800×400 black canvas.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set canvas size.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set background colour.
    pub fn with_background(mut self, rgb: [u8; 3]) -> Self {
        self.background = rgb;
        self
    }

    /// Set the word limit.
    pub fn with_max_words(mut self, n: usize) -> Self {
        self.max_words = n;
        self
    }
}

/// Where one word landed on the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// The word.
    pub term: String,
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Text width.
    pub width: u32,
    /// Text height.
    pub height: u32,
    /// Canvas pixels per font pixel.
    pub scale: u32,
    /// Text colour.
    pub color: [u8; 3],
}

/// Renders blobs as PNG word clouds.
#[derive(Debug, Clone, Default)]
pub struct CanvasRenderer {
    config: CanvasConfig,
}

impl CanvasRenderer {
    /// Create a renderer for `config`.
    pub fn new(config: CanvasConfig) -> Self {
        Self { config }
    }

    /// Canvas settings in use.
    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Lay out the words of `blob`. An empty blob places nothing.
    pub fn layout(&self, blob: &str) -> Vec<Placement> {
        let CanvasConfig {
            width,
            height,
            margin,
            max_words,
            ..
        } = self.config;
        let usable_w = width.saturating_sub(2 * margin);
        let usable_h = height.saturating_sub(2 * margin);
        if usable_w == 0 || usable_h == 0 {
            return Vec::new();
        }

        let mut terms = term_counts(blob);
        // Stable: equal counts keep first-seen order.
        terms.sort_by(|a, b| b.1.cmp(&a.1));
        terms.truncate(max_words);
        let Some(&(_, top)) = terms.first() else {
            return Vec::new();
        };

        let max_scale = (usable_h / 4 / GLYPH_H).max(1);
        let (mut x, mut y, mut shelf) = (margin, margin, 0u32);
        let mut placed = Vec::with_capacity(terms.len());

        for (term, count) in terms {
            let mut scale = ((max_scale as f64) * count as f64 / top as f64).round() as u32;
            scale = scale.clamp(1, max_scale);
            while scale > 1 && font::text_width(term, scale) > usable_w {
                scale -= 1;
            }
            let (w, h) = (font::text_width(term, scale), GLYPH_H * scale);
            if w > usable_w || h > usable_h {
                continue;
            }

            if x + w > margin + usable_w {
                y += shelf + margin;
                x = margin;
                shelf = 0;
            }
            if y + h > margin + usable_h {
                continue;
            }

            placed.push(Placement {
                term: term.to_string(),
                x,
                y,
                width: w,
                height: h,
                scale,
                color: term_color(term),
            });
            x += w + margin;
            shelf = shelf.max(h);
        }
        placed
    }

    /// Draw `blob` onto a fresh canvas.
    pub fn draw(&self, blob: &str) -> RgbImage {
        let mut img =
            RgbImage::from_pixel(self.config.width, self.config.height, Rgb(self.config.background));
        for p in self.layout(blob) {
            for (i, c) in p.term.chars().enumerate() {
                let left = p.x + i as u32 * ADVANCE * p.scale;
                for row in 0..GLYPH_H {
                    for col in (0..GLYPH_W).filter(|&col| font::is_set(c, col, row)) {
                        fill_square(&mut img, left + col * p.scale, p.y + row * p.scale, p.scale, p.color);
                    }
                }
            }
        }
        img
    }
}

fn fill_square(img: &mut RgbImage, x: u32, y: u32, side: u32, color: [u8; 3]) {
    let x_end = (x + side).min(img.width());
    let y_end = (y + side).min(img.height());
    for py in y..y_end {
        for px in x..x_end {
            img.put_pixel(px, py, Rgb(color));
        }
    }
}

impl Renderer for CanvasRenderer {
    fn render(&self, blob: &str, path: &Path) -> Result<(), RenderError> {
        self.draw(blob).save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }
}

/// Stable colour per word: FNV-1a hash picks the hue of `hsl(h, 80%, 50%)`.
fn term_color(term: &str) -> [u8; 3] {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in term.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hsl_to_rgb((hash % 360) as f64, 0.8, 0.5)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> [u8; 3] {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let to_u8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [to_u8(r), to_u8(g), to_u8(b)]
}
