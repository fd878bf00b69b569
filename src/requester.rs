//! Turning a prompt into decoded artwork.

use image::DynamicImage;
use tracing::debug;

use crate::error::PosterError;
use crate::ports::{ImageGenerator, ImageRequest};

/// Request one square image for `prompt` and decode it.
///
/// # Errors
///
/// Returns the generator's error unchanged, or an error if the response
/// carried no image or bytes that do not decode as an image.
pub async fn request_artwork(
    generator: &dyn ImageGenerator,
    model: &str,
    prompt: &str,
) -> Result<DynamicImage, PosterError> {
    let request = ImageRequest::square(model, prompt);
    let response = generator.generate(&request).await?;

    let Some(image) = response.images.into_iter().next() else {
        return Err(PosterError::Api {
            status: 200,
            code: None,
            message: "No images in response".into(),
        });
    };
    debug!(bytes = image.data.len(), mime = %image.mime_type, "artwork received");

    image::load_from_memory(&image.data)
        .map_err(|e| PosterError::Image(format!("Failed to decode generated image: {e}")))
}
