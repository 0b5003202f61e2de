//! Synthesized speech storage and playback.
//!
//! The translation endpoint returns MP3 bytes; they are written under the
//! data directory and played through the platform audio player. Playback sits
//! behind the `AudioPlayer` trait so the session can be tested without audio
//! output.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Speech playback capability.
pub trait AudioPlayer {
    /// Plays the audio file once.
    fn play(&self, path: &Path) -> Result<()>;
}

/// Plays audio through the system player.
///
/// On macOS: `open` hands the file to the default application.
/// On Linux: `xdg-open` first, then common players (mpv, vlc, ffplay, paplay).
pub struct SystemPlayer {
    /// Whether to block until playback finishes (replay command) or leave the
    /// player running detached (autoplay inside the session screen).
    wait: bool,
}

impl SystemPlayer {
    /// Player for autoplay inside the TUI: fire and forget.
    pub fn detached() -> Self {
        Self { wait: false }
    }

    /// Player for the replay command: block until the player exits.
    pub fn blocking() -> Self {
        Self { wait: true }
    }

    fn finish(&self, mut child: std::process::Child) -> Result<()> {
        if self.wait {
            child
                .wait()
                .map_err(|e| anyhow!("audio player error: {e}"))?;
        }
        Ok(())
    }
}

impl AudioPlayer for SystemPlayer {
    fn play(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(anyhow!("audio file not found: {}", path.display()));
        }

        tracing::debug!("Playing {}", path.display());

        #[cfg(target_os = "macos")]
        {
            let child = Command::new("open")
                .arg(path)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
                .map_err(|e| anyhow!("failed to open audio player: {e}"))?;
            return self.finish(child);
        }

        #[cfg(not(target_os = "macos"))]
        {
            if let Ok(child) = Command::new("xdg-open")
                .arg(path)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
            {
                return self.finish(child);
            }

            // Fall back to common audio players if xdg-open is unavailable
            for player in ["mpv", "vlc", "ffplay", "paplay"] {
                if let Ok(child) = Command::new(player)
                    .arg(path)
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .spawn()
                {
                    return self.finish(child);
                }
            }

            Err(anyhow!(
                "no audio player found. Install mpv, vlc, ffplay, or paplay"
            ))
        }
    }
}

/// Writes decoded speech bytes next to the session's recording.
///
/// # Errors
/// - If the speech directory cannot be created or the file cannot be written
pub fn save_speech(data_dir: &Path, session_id: &str, mp3: &[u8]) -> Result<PathBuf> {
    let speech_dir = data_dir.join("speech");
    std::fs::create_dir_all(&speech_dir)?;

    let path = speech_dir.join(format!("{session_id}.mp3"));
    std::fs::write(&path, mp3)?;
    tracing::debug!("Speech saved: {} ({} bytes)", path.display(), mp3.len());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_speech_writes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_speech(dir.path(), "123", b"mp3-bytes").unwrap();
        assert!(path.ends_with("speech/123.mp3"));
        assert_eq!(std::fs::read(&path).unwrap(), b"mp3-bytes");
    }

    #[test]
    fn missing_file_is_an_error() {
        let player = SystemPlayer::detached();
        assert!(player.play(Path::new("/nonexistent/speech.mp3")).is_err());
    }
}
