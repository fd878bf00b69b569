//! Watermark text rendering.
//!
//! The preferred font is a TrueType file read from disk. When it is missing
//! or unreadable the built-in 8x8 bitmap font is used instead.

use std::path::Path;

use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgba, RgbaImage};
use rusttype::{point, Font, Scale};
use tracing::{debug, warn};

/// Top-left corner of the watermark text.
pub const WATERMARK_ORIGIN: (u32, u32) = (20, 20);

/// Semi-transparent white.
pub const WATERMARK_COLOR: Rgba<u8> = Rgba([255, 255, 255, 180]);

/// Font used to render the watermark.
pub enum WatermarkFont {
    /// A TrueType font at a pixel size.
    TrueType {
        /// Parsed font.
        font: Font<'static>,
        /// Pixel height.
        px: f32,
    },
    /// The built-in bitmap font, scaled by an integer factor.
    Builtin {
        /// Pixel multiplier applied to each 8x8 glyph.
        scale: u32,
    },
}

impl WatermarkFont {
    /// Load the preferred font, falling back to the built-in one.
    ///
    /// Fallback is logged at `warn`; it is never an error.
    #[must_use]
    pub fn load(path: &Path, px: f32) -> Self {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("watermark font {} unavailable ({e}), using built-in font", path.display());
                return Self::builtin(px);
            }
        };
        match Font::try_from_vec(bytes) {
            Some(font) => {
                debug!("watermark font loaded from {}", path.display());
                Self::TrueType { font, px }
            }
            None => {
                warn!("watermark font {} is not a usable font, using built-in font", path.display());
                Self::builtin(px)
            }
        }
    }

    /// The built-in font sized as close to `px` as whole multiples of 8 allow.
    #[must_use]
    pub fn builtin(px: f32) -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let scale = (px / 8.0).round().max(1.0) as u32;
        Self::Builtin { scale }
    }
}

/// Draw `text` at [`WATERMARK_ORIGIN`] in [`WATERMARK_COLOR`].
///
/// Empty text leaves the canvas untouched.
pub fn draw_watermark(canvas: &mut RgbaImage, text: &str, font: &WatermarkFont) {
    if text.is_empty() {
        return;
    }
    let (x, y) = WATERMARK_ORIGIN;
    match font {
        WatermarkFont::TrueType { font, px } => draw_truetype(canvas, font, *px, x, y, text),
        WatermarkFont::Builtin { scale } => draw_builtin(canvas, *scale, x, y, text),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn draw_truetype(canvas: &mut RgbaImage, font: &Font<'static>, px: f32, x: u32, y: u32, text: &str) {
    let scale = Scale::uniform(px);
    let v_metrics = font.v_metrics(scale);
    let origin = point(x as f32, y as f32 + v_metrics.ascent);

    for glyph in font.layout(text, scale, origin) {
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, coverage| {
            let cx = gx as i32 + bb.min.x;
            let cy = gy as i32 + bb.min.y;
            if cx < 0 || cy < 0 {
                return;
            }
            blend(canvas, cx as u32, cy as u32, coverage);
        });
    }
}

fn draw_builtin(canvas: &mut RgbaImage, scale: u32, x: u32, y: u32, text: &str) {
    let advance = 8 * scale;
    let mut caret = x;
    for ch in text.chars() {
        let rows = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?')).unwrap_or([0; 8]);
        for (row, bits) in (0u32..).zip(rows) {
            for col in 0..8u32 {
                if bits & (1 << col) == 0 {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        blend(canvas, caret + col * scale + dx, y + row * scale + dy, 1.0);
                    }
                }
            }
        }
        caret += advance;
    }
}

/// Source-over blend of [`WATERMARK_COLOR`] scaled by glyph coverage.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn blend(canvas: &mut RgbaImage, x: u32, y: u32, coverage: f32) {
    if x >= canvas.width() || y >= canvas.height() || coverage <= 0.0 {
        return;
    }
    let src = WATERMARK_COLOR.0;
    let sa = coverage.min(1.0) * f32::from(src[3]) / 255.0;
    let inv = 1.0 - sa;
    let dst = canvas.get_pixel_mut(x, y);
    for c in 0..3 {
        dst.0[c] = (f32::from(src[c]) * sa + f32::from(dst.0[c]) * inv).round() as u8;
    }
    dst.0[3] = (255.0 * sa + f32::from(dst.0[3]) * inv).round() as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 255]))
    }

    #[test]
    fn missing_font_falls_back() {
        let font = WatermarkFont::load(Path::new("/nonexistent/arial.ttf"), 24.0);
        assert!(matches!(font, WatermarkFont::Builtin { scale: 3 }));
    }

    #[test]
    fn corrupt_font_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();
        assert!(matches!(WatermarkFont::load(&path, 24.0), WatermarkFont::Builtin { .. }));
    }

    #[test]
    fn builtin_scale_never_zero() {
        assert!(matches!(WatermarkFont::builtin(1.0), WatermarkFont::Builtin { scale: 1 }));
    }

    #[test]
    fn empty_text_draws_nothing() {
        let mut canvas = black(200, 100);
        draw_watermark(&mut canvas, "", &WatermarkFont::builtin(24.0));
        assert!(canvas.pixels().all(|p| *p == Rgba([0, 0, 0, 255])));
    }

    #[test]
    fn builtin_text_lands_near_origin() {
        let mut canvas = black(200, 100);
        draw_watermark(&mut canvas, "Test", &WatermarkFont::builtin(24.0));

        let touched: Vec<(u32, u32)> = canvas
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0[0] != 0)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!touched.is_empty());
        assert!(touched.iter().all(|&(x, y)| x >= 20 && y >= 20 && y < 20 + 24));
        // 180/255 white over black
        assert!(touched.iter().any(|&(x, y)| canvas.get_pixel(x, y).0[0] == 180));
    }

    /// First TrueType font found in the usual system locations.
    fn system_ttf() -> Option<std::path::PathBuf> {
        [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
            "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
            "/Library/Fonts/Arial.ttf",
            "/System/Library/Fonts/Supplemental/Arial.ttf",
            "C:\\Windows\\Fonts\\arial.ttf",
        ]
        .iter()
        .map(std::path::PathBuf::from)
        .find(|p| p.is_file())
    }

    #[test]
    fn truetype_text_lands_near_origin() {
        let Some(path) = system_ttf() else {
            eprintln!("no system TrueType font found, skipping");
            return;
        };
        let font = WatermarkFont::load(&path, 24.0);
        assert!(matches!(font, WatermarkFont::TrueType { .. }), "{} should parse", path.display());

        let mut canvas = black(200, 100);
        draw_watermark(&mut canvas, "Test", &font);
        let touched: Vec<(u32, u32)> = canvas
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0[0] != 0)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!touched.is_empty());
        assert!(touched.iter().all(|&(x, y)| x >= 19 && y >= 19 && y < 60));
        assert!(touched.iter().any(|&(x, y)| x < 40 && y < 40));
    }

    #[test]
    fn text_past_the_edge_is_clipped() {
        let mut canvas = black(30, 30);
        draw_watermark(&mut canvas, "WWWWWWWW", &WatermarkFont::builtin(24.0));
        assert_eq!(canvas.dimensions(), (30, 30));
    }
}
