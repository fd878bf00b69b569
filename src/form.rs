//! The single-call boundary behind the interactive form.
//!
//! Everything that can go wrong inside one submission is caught here and
//! turned into a [`MockupOutcome`]; callers never see an `Err`.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::compose::MockupComposer;
use crate::config::{Config, OpenAiConfig};
use crate::context::{GeneratorMode, RecordingSession, ServiceContext};
use crate::error::PosterError;
use crate::prompt::{build_prompt, NO_STYLE};
use crate::requester::request_artwork;

/// The four user inputs of one submission.
#[derive(Debug, Clone, Deserialize)]
pub struct MockupForm {
    /// The user's own API key.
    pub api_key: String,
    /// Anatomy term, e.g. `"Heart"`.
    pub subject: String,
    /// Style choice, [`NO_STYLE`] for none.
    #[serde(default = "no_style")]
    pub style: String,
    /// Watermark text; empty draws nothing.
    #[serde(default)]
    pub watermark: String,
}

fn no_style() -> String {
    NO_STYLE.to_string()
}

/// Result of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockupOutcome {
    /// The mockup was written to this path.
    Success(PathBuf),
    /// The image service (or its inputs) failed.
    ServiceError(String),
    /// The frame template could not be loaded.
    TemplateError(String),
    /// Composing or writing the mockup failed.
    ComposeError(String),
}

impl MockupOutcome {
    /// The mockup path, or `None` for any failure.
    #[must_use]
    pub fn into_path(self) -> Option<PathBuf> {
        match self {
            Self::Success(path) => Some(path),
            _ => None,
        }
    }
}

/// Runs prompt → request → compose for one form submission.
pub struct FormAdapter {
    mode: GeneratorMode,
    openai: OpenAiConfig,
    composer: MockupComposer,
}

impl FormAdapter {
    /// Build an adapter from explicit parts.
    #[must_use]
    pub fn new(mode: GeneratorMode, openai: OpenAiConfig, composer: MockupComposer) -> Self {
        Self { mode, openai, composer }
    }

    /// Build an adapter from loaded configuration.
    #[must_use]
    pub fn from_config(mode: GeneratorMode, config: &Config) -> Self {
        Self::new(mode, config.openai.clone(), MockupComposer::new(&config.mockup))
    }

    /// Generate one mockup, or return `None` on any failure.
    pub async fn generate_single_mockup(&self, form: &MockupForm) -> Option<PathBuf> {
        self.submit(form).await.into_path()
    }

    /// Generate one mockup and report what happened.
    ///
    /// A generator bound to `form.api_key` is built for this call only.
    pub async fn submit(&self, form: &MockupForm) -> MockupOutcome {
        let subject = form.subject.trim();
        if subject.is_empty() {
            return service_failure(&PosterError::InvalidArgument("subject term is empty".into()));
        }
        if form.api_key.trim().is_empty() {
            return service_failure(&PosterError::MissingApiKey {
                provider: "OpenAI".into(),
                env_var: "OPENAI_API_KEY".into(),
            });
        }

        let prompt = build_prompt(subject, Some(&form.style));
        info!(subject, style = %form.style, "generating mockup");

        let (ctx, session) = match ServiceContext::for_credential(&self.mode, &form.api_key, &self.openai) {
            Ok(parts) => parts,
            Err(e) => return service_failure(&e),
        };
        let artwork = request_artwork(ctx.generator.as_ref(), &self.openai.model, &prompt).await;
        drop(ctx);
        finish_recording(session);

        let artwork = match artwork {
            Ok(artwork) => artwork,
            Err(e) => return service_failure(&e),
        };

        let composer = self.composer.clone();
        let watermark = form.watermark.clone();
        let composed =
            tokio::task::spawn_blocking(move || composer.create_mockup(&artwork, &watermark)).await;

        match composed {
            Ok(Ok(path)) => MockupOutcome::Success(path),
            Ok(Err(e @ PosterError::TemplateNotFound { .. })) => {
                error!("Error: {e}");
                MockupOutcome::TemplateError(e.to_string())
            }
            Ok(Err(e)) => {
                error!("Error: {e}");
                MockupOutcome::ComposeError(e.to_string())
            }
            Err(e) => {
                error!("composition task failed: {e}");
                MockupOutcome::ComposeError(e.to_string())
            }
        }
    }
}

fn service_failure(e: &PosterError) -> MockupOutcome {
    error!("Error: {e}");
    if e.is_billing_limit() {
        warn!("image service billing limit reached");
    }
    MockupOutcome::ServiceError(e.to_string())
}

fn finish_recording(session: Option<RecordingSession>) {
    if let Some(session) = session {
        match session.finish() {
            Ok(path) => info!("cassette saved: {}", path.display()),
            Err(e) => warn!("failed to save cassette: {e}"),
        }
    }
}
