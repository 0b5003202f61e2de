//! Configuration file management.
//!
//! Configuration lives in `~/.config/ovt/ovt.toml`. The first line is a
//! `config_version` stamp maintained by setup; unknown keys are ignored so a
//! stamped file parses as-is.

use crate::translation::api::DEFAULT_ENDPOINT;
use crate::translation::language;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Audio capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Audio device to use. Options:
    /// - "default" for the system default device
    /// - numeric index (0, 1, 2, etc.) from `ovt list-devices`
    /// - device name from `ovt list-devices`
    #[serde(default = "default_device")]
    pub device: String,
    /// Requested sample rate in Hz (16000 recommended for speech recognition)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

fn default_device() -> String {
    "default".to_string()
}

fn default_sample_rate() -> u32 {
    16000
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            sample_rate: default_sample_rate(),
        }
    }
}

/// Translation endpoint and target settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationSettings {
    /// Endpoint receiving the multipart translate request
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Target language code (see `ovt languages`)
    #[serde(default = "default_target_lang")]
    pub target_lang: String,
    /// Copy the translated text to the clipboard after each session
    #[serde(default)]
    pub copy_to_clipboard: bool,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_target_lang() -> String {
    language::DEFAULT_CODE.to_string()
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            target_lang: default_target_lang(),
            copy_to_clipboard: false,
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OvtConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub translation: TranslationSettings,
}

impl OvtConfig {
    /// Loads and validates the configuration from the config directory.
    ///
    /// # Errors
    /// - If the config file cannot be read
    /// - If the TOML is malformed
    /// - If the configured target language is not supported
    pub fn load() -> Result<Self> {
        let config_path = config_path()?;
        let content = fs::read_to_string(&config_path)
            .map_err(|e| anyhow!("cannot read {}: {e}", config_path.display()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: OvtConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if language::find(&self.translation.target_lang).is_none() {
            return Err(anyhow!(
                "unsupported target language '{}'. Run 'ovt languages' for the supported codes.",
                self.translation.target_lang
            ));
        }
        Ok(())
    }

    /// Serializes the configuration as pretty TOML (without the version stamp;
    /// setup prepends that).
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Path to the configuration file, creating the directory if needed.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the config directory cannot be created
pub fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow!("could not determine home directory"))?;
    let config_dir = home.join(".config").join("ovt");
    fs::create_dir_all(&config_dir)?;
    Ok(config_dir.join("ovt.toml"))
}

/// Data directory for recordings, speech, and history, creating it if needed.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the directory cannot be created
pub fn data_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow!("could not determine home directory"))?;
    let dir = home.join(".local").join("share").join("ovt");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = OvtConfig::from_toml("").unwrap();
        assert_eq!(config.audio.device, "default");
        assert_eq!(config.audio.sample_rate, 16000);
        assert_eq!(config.translation.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.translation.target_lang, "es");
        assert!(!config.translation.copy_to_clipboard);
    }

    #[test]
    fn version_stamp_is_ignored() {
        let content = "config_version = \"0.1.0\"\n\n[audio]\nsample_rate = 44100\n";
        let config = OvtConfig::from_toml(content).unwrap();
        assert_eq!(config.audio.sample_rate, 44100);
    }

    #[test]
    fn unknown_target_language_is_rejected() {
        let content = "[translation]\ntarget_lang = \"xx\"\n";
        let err = OvtConfig::from_toml(content).unwrap_err();
        assert!(err.to_string().contains("unsupported target language"));
    }

    #[test]
    fn default_config_round_trips() {
        let config = OvtConfig::default();
        let reparsed = OvtConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(reparsed.translation.target_lang, "es");
    }
}
