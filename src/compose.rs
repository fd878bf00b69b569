//! Mockup composition: template + artwork + watermark.

use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbaImage};
use tracing::info;

use crate::config::MockupConfig;
use crate::error::PosterError;
use crate::watermark::{draw_watermark, WatermarkFont};

/// Side length the artwork is resized to before pasting.
pub const ARTWORK_SIZE: u32 = 500;

/// Offset that centers an `art`-sized image on a `template`-sized one.
///
/// Templates smaller than the artwork pin it to the top-left corner.
#[must_use]
pub fn centered_offset(template: (u32, u32), art: (u32, u32)) -> (u32, u32) {
    (template.0.saturating_sub(art.0) / 2, template.1.saturating_sub(art.1) / 2)
}

/// Load the frame template as RGBA.
///
/// # Errors
///
/// Returns [`PosterError::TemplateNotFound`] if the file is missing or not
/// a decodable image.
pub fn load_template(path: &Path) -> Result<RgbaImage, PosterError> {
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|e| PosterError::TemplateNotFound { path: path.to_path_buf(), reason: e.to_string() })
}

/// Composes generated artwork onto the frame template.
#[derive(Debug, Clone)]
pub struct MockupComposer {
    template: PathBuf,
    font: PathBuf,
    font_size: f32,
}

impl MockupComposer {
    /// Build a composer from the `[mockup]` config section.
    #[must_use]
    pub fn new(config: &MockupConfig) -> Self {
        Self { template: config.template.clone(), font: config.font.clone(), font_size: config.font_size }
    }

    /// Path of the template this composer reads.
    #[must_use]
    pub fn template_path(&self) -> &Path {
        &self.template
    }

    /// Paste `artwork` onto a fresh copy of the template and draw the
    /// watermark, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the template cannot be loaded.
    pub fn render(&self, artwork: &DynamicImage, watermark: &str) -> Result<RgbaImage, PosterError> {
        let template = load_template(&self.template)?;
        let font = if watermark.is_empty() {
            None
        } else {
            Some(WatermarkFont::load(&self.font, self.font_size))
        };
        Ok(compose(&template, artwork, watermark, font.as_ref()))
    }

    /// Render the mockup and write it to a new temporary PNG file.
    ///
    /// The file outlives this call; cleaning it up is left to the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the template cannot be loaded or the file cannot
    /// be written.
    pub fn create_mockup(&self, artwork: &DynamicImage, watermark: &str) -> Result<PathBuf, PosterError> {
        let mockup = self.render(artwork, watermark)?;
        let path = tempfile::Builder::new()
            .prefix("mockup-")
            .suffix(".png")
            .tempfile()?
            .into_temp_path()
            .keep()
            .map_err(|e| e.error)?;
        save_png(&mockup, &path)?;
        info!("mockup saved: {}", path.display());
        Ok(path)
    }
}

/// Composite `artwork` onto a copy of `template`.
///
/// The artwork is resized to [`ARTWORK_SIZE`] square and alpha-blended at
/// the centered offset; its transparent areas leave the template visible.
#[must_use]
pub fn compose(
    template: &RgbaImage,
    artwork: &DynamicImage,
    watermark: &str,
    font: Option<&WatermarkFont>,
) -> RgbaImage {
    let art = imageops::resize(&artwork.to_rgba8(), ARTWORK_SIZE, ARTWORK_SIZE, FilterType::CatmullRom);
    let mut mockup = template.clone();
    let (x, y) = centered_offset(mockup.dimensions(), art.dimensions());
    imageops::overlay(&mut mockup, &art, i64::from(x), i64::from(y));

    if !watermark.is_empty() {
        let builtin;
        let font = match font {
            Some(f) => f,
            None => {
                builtin = WatermarkFont::builtin(24.0);
                &builtin
            }
        };
        draw_watermark(&mut mockup, watermark, font);
    }
    mockup
}

/// Encode `image` as PNG at `path`.
///
/// # Errors
///
/// Returns an error if encoding or writing fails.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), PosterError> {
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| PosterError::Image(format!("Failed to save {}: {e}", path.display())))
}
