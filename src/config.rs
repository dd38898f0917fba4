//! Configuration for myelts.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (MYELTS_HOME, MYELTS_USER_ID, service credentials)
//! 2. Config file (.myelts/config.yaml)
//! 3. Defaults (~/.myelts)
//!
//! Config file discovery:
//! - Searches current directory and parents for .myelts/config.yaml
//! - `paths.home` is relative to the .myelts/ directory
//!
//! Secrets (API keys, service role tokens) are only read from the environment.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub voice: Option<VoiceConfig>,
    #[serde(default)]
    pub vocabulary: Option<VocabularyConfig>,
    #[serde(default)]
    pub storage: Option<StorageConfig>,
    #[serde(default)]
    pub study: Option<StudyConfig>,
    #[serde(default)]
    pub limits: Option<LimitsConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory (relative to the .myelts/ directory)
    pub home: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoiceConfig {
    pub language_code: Option<String>,
    pub name: Option<String>,
    pub gender: Option<String>,
    pub speaking_rate: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VocabularyConfig {
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// "supabase" or "local"
    pub backend: Option<StorageBackend>,
    pub bucket: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StudyConfig {
    pub settle_delay_ms: Option<u64>,
    /// Player command, e.g. "mpv --no-video"
    pub player: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    pub upstream_timeout_seconds: Option<u64>,
    pub max_text_chars: Option<usize>,
}

/// Where synthesized audio is uploaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Supabase,
    #[default]
    Local,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to myelts home (database, local audio)
    pub home: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Identity used when MYELTS_USER_ID is unset
    pub user_id: Option<String>,
    pub voice: VoiceSettings,
    pub vocabulary_model: String,
    pub storage_backend: StorageBackend,
    pub storage_bucket: Option<String>,
    pub study: StudySettings,
    pub limits: LimitSettings,
}

/// Speech synthesis parameters
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSettings {
    pub language_code: String,
    pub name: String,
    pub gender: String,
    /// Below 1.0 slows speech down for learners
    pub speaking_rate: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            language_code: "en-US".to_string(),
            name: "en-US-Wavenet-D".to_string(),
            gender: "MALE".to_string(),
            speaking_rate: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudySettings {
    pub settle_delay_ms: u64,
    pub player: Option<String>,
}

impl Default for StudySettings {
    fn default() -> Self {
        Self {
            settle_delay_ms: 1500,
            player: None,
        }
    }
}

impl StudySettings {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LimitSettings {
    pub upstream_timeout_seconds: u64,
    pub max_text_chars: usize,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            upstream_timeout_seconds: 60,
            max_text_chars: 2000,
        }
    }
}

impl LimitSettings {
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_seconds)
    }
}

pub const DEFAULT_VOCABULARY_MODEL: &str = "gpt-4o-mini-2024-07-18";

impl ResolvedConfig {
    /// Defaults rooted at the given home directory
    pub fn with_home(home: PathBuf) -> Self {
        Self {
            home,
            config_file: None,
            user_id: None,
            voice: VoiceSettings::default(),
            vocabulary_model: DEFAULT_VOCABULARY_MODEL.to_string(),
            storage_backend: StorageBackend::default(),
            storage_bucket: None,
            study: StudySettings::default(),
            limits: LimitSettings::default(),
        }
    }

    /// SQLite database path
    pub fn database_path(&self) -> PathBuf {
        self.home.join("myelts.db")
    }

    /// Root directory of the local object store
    pub fn audio_dir(&self) -> PathBuf {
        self.home.join("audio")
    }

    /// Apply a parsed config file on top of the current values
    fn apply_file(&mut self, config: ConfigFile) {
        if config.user_id.is_some() {
            self.user_id = config.user_id;
        }

        if let Some(voice) = config.voice {
            if let Some(language_code) = voice.language_code {
                self.voice.language_code = language_code;
            }
            if let Some(name) = voice.name {
                self.voice.name = name;
            }
            if let Some(gender) = voice.gender {
                self.voice.gender = gender;
            }
            if let Some(rate) = voice.speaking_rate {
                self.voice.speaking_rate = rate;
            }
        }

        if let Some(model) = config.vocabulary.and_then(|v| v.model) {
            self.vocabulary_model = model;
        }

        if let Some(storage) = config.storage {
            if let Some(backend) = storage.backend {
                self.storage_backend = backend;
            }
            self.storage_bucket = storage.bucket.or(self.storage_bucket.take());
        }

        if let Some(study) = config.study {
            if let Some(delay) = study.settle_delay_ms {
                self.study.settle_delay_ms = delay;
            }
            self.study.player = study.player.or(self.study.player.take());
        }

        if let Some(limits) = config.limits {
            if let Some(timeout) = limits.upstream_timeout_seconds {
                self.limits.upstream_timeout_seconds = timeout;
            }
            if let Some(max_chars) = limits.max_text_chars {
                self.limits.max_text_chars = max_chars;
            }
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".myelts").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".myelts");

    let config_file = find_config_file();

    let mut resolved = if let Some(ref config_path) = config_file {
        let config = load_config_file(config_path)?;

        let home = if let Ok(env_home) = std::env::var("MYELTS_HOME") {
            PathBuf::from(env_home)
        } else if let Some(ref home_path) = config.paths.home {
            let myelts_dir = config_path.parent().unwrap_or(Path::new("."));
            resolve_path(myelts_dir, home_path)
        } else {
            default_home
        };

        let mut resolved = ResolvedConfig::with_home(home);
        resolved.config_file = Some(config_path.clone());
        resolved.apply_file(config);
        resolved
    } else {
        let home = std::env::var("MYELTS_HOME")
            .map(PathBuf::from)
            .unwrap_or(default_home);
        ResolvedConfig::with_home(home)
    };

    if let Ok(bucket) = std::env::var("SUPABASE_BUCKET_NAME") {
        resolved.storage_bucket = Some(bucket);
    }

    Ok(resolved)
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Read a required secret from the environment
pub fn secret(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("{} environment variable required", name))
}
