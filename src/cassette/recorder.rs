//! Records interactions into a cassette file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::format::{Cassette, Interaction};

/// Directory recordings land in, relative to the working directory.
pub const CASSETTE_ROOT: &str = ".anatomy-poster/cassettes";

/// Collects interactions and writes them as a YAML cassette file.
#[derive(Debug)]
pub struct CassetteRecorder {
    path: PathBuf,
    name: String,
    commit: String,
    started_at: DateTime<Utc>,
    interactions: Vec<Interaction>,
}

impl CassetteRecorder {
    /// Create a recorder that will write to the given path.
    pub fn new(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        commit: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            commit: commit.into(),
            started_at: Utc::now(),
            interactions: Vec::new(),
        }
    }

    /// Create a recorder writing to `<root>/<timestamp>/<port>.cassette.yaml`.
    pub fn timestamped(root: &Path, port: &str, commit: impl Into<String>) -> Self {
        let started_at = Utc::now();
        let stamp = started_at.format("%Y-%m-%dT%H-%M-%S%.3f").to_string();
        let path = root.join(&stamp).join(format!("{port}.cassette.yaml"));
        Self { started_at, ..Self::new(path, format!("{stamp}-{port}"), commit) }
    }

    /// Where the cassette will be written.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record an interaction. Sequence numbers follow recording order.
    pub fn record(
        &mut self,
        port: impl Into<String>,
        method: impl Into<String>,
        input: serde_json::Value,
        output: serde_json::Value,
    ) {
        let seq = self.interactions.len() as u64;
        self.interactions.push(Interaction {
            seq,
            port: port.into(),
            method: method.into(),
            input,
            output,
        });
    }

    /// Finish recording and write the cassette YAML file to disk, creating
    /// parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn finish(self) -> Result<PathBuf, std::io::Error> {
        let cassette = Cassette {
            name: self.name,
            recorded_at: self.started_at,
            commit: self.commit,
            interactions: self.interactions,
        };
        let yaml = serde_yaml::to_string(&cassette).map_err(std::io::Error::other)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, yaml)?;
        Ok(self.path)
    }
}
