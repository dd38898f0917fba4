//! Audio playback.
//!
//! `CommandPlayer` hands a complete audio file to an external player
//! process (e.g. `mpv --no-video`). Remote assets are downloaded to a temp
//! file first. The child is killed if the playback future is dropped, which
//! is how the study driver stops audio.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::AudioPlayer;

/// External player process
pub struct CommandPlayer {
    program: String,
    args: Vec<String>,
    client: reqwest::Client,
}

impl CommandPlayer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            client: reqwest::Client::new(),
        }
    }

    /// Parse a command line such as "mpv --no-video"
    pub fn from_command_line(command: &str) -> Result<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .with_context(|| format!("Empty player command: {:?}", command))?;
        Ok(Self::new(program, parts.collect()))
    }

    /// Download a remote asset into a temp file
    async fn download(&self, url: &str) -> Result<tempfile::TempPath> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch audio: {}", url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Audio fetch failed ({}): {}", status, url);
        }

        let bytes = response.bytes().await.context("Failed to read audio body")?;
        let path = tempfile::Builder::new()
            .prefix("myelts-")
            .suffix(".mp3")
            .tempfile()
            .context("Failed to create temp file")?
            .into_temp_path();

        tokio::fs::write(&path, &bytes)
            .await
            .context("Failed to write downloaded audio")?;

        Ok(path)
    }
}

/// Local path for a `file://` URL or plain path
fn local_path(url: &str) -> Option<PathBuf> {
    if let Some(path) = url.strip_prefix("file://") {
        return Some(PathBuf::from(path));
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        return None;
    }
    Some(PathBuf::from(url))
}

#[async_trait]
impl AudioPlayer for CommandPlayer {
    fn name(&self) -> &str {
        &self.program
    }

    async fn play(&self, url: &str) -> Result<()> {
        // Keeps a downloaded temp file alive until playback ends
        let mut _download = None;
        let path = match local_path(url) {
            Some(path) => path,
            None => {
                let temp = self.download(url).await?;
                let path = temp.to_path_buf();
                _download = Some(temp);
                path
            }
        };

        debug!(player = %self.program, path = %path.display(), "Playing audio");

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(&path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .with_context(|| format!("Failed to run player '{}'", self.program))?;

        if !status.success() {
            anyhow::bail!(
                "Player '{}' exited with code {}",
                self.program,
                status.code().unwrap_or(-1)
            );
        }

        Ok(())
    }
}

/// Player that produces no sound; "playback" lasts a fixed duration
#[derive(Debug, Clone, Default)]
pub struct NullPlayer {
    duration: Duration,
}

impl NullPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(duration: Duration) -> Self {
        Self { duration }
    }
}

#[async_trait]
impl AudioPlayer for NullPlayer {
    fn name(&self) -> &str {
        "null"
    }

    async fn play(&self, _url: &str) -> Result<()> {
        if !self.duration.is_zero() {
            tokio::time::sleep(self.duration).await;
        }
        Ok(())
    }
}
