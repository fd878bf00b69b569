//! Live adapter for the `OpenAI` image generation API.

use std::time::Duration;

use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::PosterError;
use crate::ports::image_generator::{
    GenerateFuture, GeneratedImage, ImageGenerator, ImageRequest, ImageResponse,
};

/// Default API root; the generations endpoint is appended to it.
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Live `OpenAI` image generator that calls the `OpenAI` Images API.
///
/// Each instance is bound to one credential. The form path builds a fresh
/// generator per call from the key the user typed in.
pub struct OpenAiGenerator {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl OpenAiGenerator {
    /// Create a new `OpenAI` generator for the given key and API root.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: String, api_base: &str, timeout: Duration) -> Result<Self, PosterError> {
        let client = Client::builder().timeout(timeout).build()?;
        let endpoint = format!("{}/images/generations", api_base.trim_end_matches('/'));
        Ok(Self { client, api_key, endpoint })
    }
}

impl ImageGenerator for OpenAiGenerator {
    fn generate(&self, request: &ImageRequest) -> GenerateFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let body = serde_json::json!({
                "model": request.model,
                "prompt": request.prompt,
                "n": request.count,
                "size": request.size,
                "response_format": "b64_json",
            });

            debug!(model = %request.model, size = %request.size, "requesting image");
            let response = self
                .client
                .post(&self.endpoint)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            let response_text = response.text().await?;

            if !status.is_success() {
                return Err(api_error(status.as_u16(), &response_text));
            }

            let parsed: OpenAiResponse = serde_json::from_str(&response_text).map_err(|e| {
                PosterError::Api {
                    status: 200,
                    code: None,
                    message: format!("Failed to parse response: {e}"),
                }
            })?;

            let mut images = Vec::new();
            for item in parsed.data {
                let data = base64::engine::general_purpose::STANDARD
                    .decode(&item.b64_json)
                    .map_err(|e| PosterError::Api {
                        status: 200,
                        code: None,
                        message: format!("Failed to decode base64: {e}"),
                    })?;
                images.push(GeneratedImage { data, mime_type: "image/png".into() });
            }

            if images.is_empty() {
                return Err(PosterError::Api {
                    status: 200,
                    code: None,
                    message: format!("No images in response. Body: {}", truncate_body(&response_text, 500)),
                });
            }

            Ok(ImageResponse { images })
        })
    }
}

/// Build an API error, pulling `code` (or `type` when there is no code) and
/// `message` out of the standard `{"error": {...}}` envelope when the body
/// has one.
fn api_error(status: u16, body: &str) -> PosterError {
    match serde_json::from_str::<OpenAiErrorBody>(body) {
        Ok(parsed) => PosterError::Api {
            status,
            code: parsed.error.code.or(parsed.error.kind),
            message: parsed.error.message.unwrap_or_else(|| body.to_string()),
        },
        Err(_) => PosterError::Api { status, code: None, message: body.to_string() },
    }
}

/// At most `max` bytes of `body`, cut on a char boundary, with `...` when cut.
fn truncate_body(body: &str, max: usize) -> String {
    if body.len() <= max {
        return body.to_string();
    }
    let end = body.char_indices().map(|(i, _)| i).take_while(|&i| i <= max).last().unwrap_or(0);
    format!("{}...", &body[..end])
}

// --- OpenAI API response types ---

#[derive(Deserialize)]
struct OpenAiResponse {
    data: Vec<OpenAiImageData>,
}

#[derive(Deserialize)]
struct OpenAiImageData {
    b64_json: String,
}

#[derive(Deserialize)]
struct OpenAiErrorBody {
    error: OpenAiErrorDetail,
}

#[derive(Deserialize)]
struct OpenAiErrorDetail {
    message: Option<String>,
    code: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}
