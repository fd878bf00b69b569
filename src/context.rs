//! Service context that bundles all port trait objects.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::adapters::live::openai::OpenAiGenerator;
use crate::adapters::recording::image_generator::RecordingImageGenerator;
use crate::adapters::replaying::image_generator::ReplayingImageGenerator;
use crate::cassette::config::load_cassette;
use crate::cassette::recorder::{CassetteRecorder, CASSETTE_ROOT};
use crate::config::OpenAiConfig;
use crate::error::PosterError;
use crate::ports::ImageGenerator;

/// Environment variable naming a cassette to replay instead of calling the API.
pub const REPLAY_ENV: &str = "ANATOMY_POSTER_REPLAY";

/// Environment variable that turns on cassette recording.
pub const RECORD_ENV: &str = "ANATOMY_POSTER_REC";

/// How image generators are built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratorMode {
    /// Call the real API.
    Live,
    /// Call the real API and write a cassette per context.
    Recording,
    /// Serve responses from a cassette file.
    Replaying(PathBuf),
}

impl GeneratorMode {
    /// Pick the mode from [`REPLAY_ENV`] and [`RECORD_ENV`]. Replay wins.
    #[must_use]
    pub fn from_env() -> Self {
        if let Ok(path) = std::env::var(REPLAY_ENV) {
            return Self::Replaying(PathBuf::from(path));
        }
        if std::env::var(RECORD_ENV).is_ok_and(|v| v == "true" || v == "1") {
            return Self::Recording;
        }
        Self::Live
    }
}

/// Bundles all port trait objects into a single context.
pub struct ServiceContext {
    /// Image generator port.
    pub generator: Box<dyn ImageGenerator>,
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Finish the recording and write the cassette file to disk.
    ///
    /// The [`ServiceContext`] created alongside this session must be dropped
    /// first.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be written.
    pub fn finish(self) -> Result<PathBuf, String> {
        let recorder = Arc::try_unwrap(self.recorder)
            .map_err(|_| "Recording adapter still has references".to_string())?
            .into_inner()
            .map_err(|e| format!("Recorder lock poisoned: {e}"))?;
        recorder.finish().map_err(|e| format!("Failed to write cassette: {e}"))
    }
}

impl ServiceContext {
    /// Create a live context bound to `api_key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is blank or the HTTP client cannot be built.
    pub fn live(api_key: &str, config: &OpenAiConfig) -> Result<Self, PosterError> {
        let generator = OpenAiGenerator::new(require_key(api_key)?, &config.api_base, config.timeout())?;
        Ok(Self { generator: Box::new(generator) })
    }

    /// Create a recording context that wraps a live adapter with a recorder.
    ///
    /// # Errors
    ///
    /// Returns an error if the live context cannot be created.
    pub fn recording(
        api_key: &str,
        config: &OpenAiConfig,
    ) -> Result<(Self, RecordingSession), PosterError> {
        let live_ctx = Self::live(api_key, config)?;

        let recorder = Arc::new(Mutex::new(CassetteRecorder::timestamped(
            Path::new(CASSETTE_ROOT),
            "image_generator",
            get_commit_hash(),
        )));
        if let Ok(guard) = recorder.lock() {
            debug!("recording image generator calls to {}", guard.path().display());
        }
        let recording_gen = RecordingImageGenerator::new(live_ctx.generator, Arc::clone(&recorder));

        Ok((Self { generator: Box::new(recording_gen) }, RecordingSession { recorder }))
    }

    /// Create a replaying context from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(path: &Path) -> Result<Self, PosterError> {
        let replayer = load_cassette(path)
            .map_err(|e| PosterError::Config(format!("Failed to load cassette: {e}")))?;
        let generator = ReplayingImageGenerator::new(Arc::new(Mutex::new(replayer)));
        Ok(Self { generator: Box::new(generator) })
    }

    /// Create a context for `api_key` in the given mode.
    ///
    /// Replaying ignores the key; the caller decides whether a blank key is
    /// acceptable before getting here.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying constructor fails.
    pub fn for_credential(
        mode: &GeneratorMode,
        api_key: &str,
        config: &OpenAiConfig,
    ) -> Result<(Self, Option<RecordingSession>), PosterError> {
        match mode {
            GeneratorMode::Live => Ok((Self::live(api_key, config)?, None)),
            GeneratorMode::Recording => {
                let (ctx, session) = Self::recording(api_key, config)?;
                Ok((ctx, Some(session)))
            }
            GeneratorMode::Replaying(path) => Ok((Self::replaying(path)?, None)),
        }
    }
}

fn require_key(api_key: &str) -> Result<String, PosterError> {
    let key = api_key.trim();
    if key.is_empty() {
        return Err(PosterError::MissingApiKey {
            provider: "OpenAI".into(),
            env_var: "OPENAI_API_KEY".into(),
        });
    }
    Ok(key.to_string())
}

/// Get the current git commit hash, or "unknown" if unavailable.
fn get_commit_hash() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string())
}
