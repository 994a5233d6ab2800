use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{PoisonError, RwLock},
    time::Duration,
};

pub const API_KEY_ENV: &str = "SCREENWELL_API_KEY";
pub const FALLBACK_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// External classification service. The API key never lives here; see
/// [`api_key_from_env`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OracleSettings {
    pub api_url: String,
    pub vision_model: String,
    pub text_model: String,
    pub request_timeout_secs: u64,
    pub max_attempts: u32,
    pub base_backoff_ms: u64,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com".into(),
            vision_model: "gpt-4o".into(),
            text_model: "gpt-4o-mini".into(),
            request_timeout_secs: 30,
            max_attempts: 3,
            base_backoff_ms: 500,
        }
    }
}

impl OracleSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn base_backoff(&self) -> Duration {
        Duration::from_millis(self.base_backoff_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IngestSettings {
    /// Extracted text in any other language is translated.
    pub reference_language: String,
    /// Write uploaded frames under `frames/<session>/`.
    pub keep_frames: bool,
    /// Max Hamming distance at which a frame reuses the previous analysis.
    /// Zero disables reuse.
    pub duplicate_hash_distance: u32,
    pub max_frames_per_session: u32,
    /// Frames per second the recorder extracts; spaces frame timestamps.
    pub frames_per_second: f64,
    pub max_concurrent_analyses: usize,
    /// Upper bound on one oracle stage of a frame, retries included. On
    /// expiry only that stage takes its fallback.
    pub stage_timeout_secs: u64,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            reference_language: "en".into(),
            keep_frames: true,
            duplicate_hash_distance: 4,
            max_frames_per_session: 300,
            frames_per_second: 2.0,
            max_concurrent_analyses: 4,
            stage_timeout_secs: 120,
        }
    }
}

impl IngestSettings {
    pub fn stage_timeout(&self) -> Duration {
        Duration::from_secs(self.stage_timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub oracle: OracleSettings,
    pub ingest: IngestSettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<Settings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            Settings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn snapshot(&self) -> Settings {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn oracle(&self) -> OracleSettings {
        self.snapshot().oracle
    }

    pub fn ingest(&self) -> IngestSettings {
        self.snapshot().ingest
    }

    pub fn update_oracle(&self, settings: OracleSettings) -> Result<()> {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        guard.oracle = settings;
        self.persist(&guard)
    }

    pub fn update_ingest(&self, settings: IngestSettings) -> Result<()> {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        guard.ingest = settings;
        self.persist(&guard)
    }

    /// Write the current values out, creating the file on first run.
    pub fn save(&self) -> Result<()> {
        let guard = self.data.read().unwrap_or_else(PoisonError::into_inner);
        self.persist(&guard)
    }

    fn persist(&self, data: &Settings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

/// `SCREENWELL_API_KEY`, then `OPENAI_API_KEY`. Blank values count as unset.
pub fn api_key_from_env() -> Option<String> {
    [API_KEY_ENV, FALLBACK_API_KEY_ENV]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}
