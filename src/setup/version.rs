//! Config version stamping and comparison.
//!
//! The first line of the config file is `config_version = "X.Y.Z"`. Setup
//! compares it against the binary version to decide whether defaults must be
//! written or the stamp refreshed.

use anyhow::{anyhow, Result};
use regex::Regex;
use std::path::Path;

/// Current application version from Cargo.toml
const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// What setup has to do for the config file.
#[derive(Debug, PartialEq, Eq)]
pub enum SetupAction {
    /// No config file: write the defaults
    WriteDefaults,
    /// Config exists but carries an older (or no) version stamp
    Restamp { from: String },
    /// Config is current
    None,
}

/// A semantic version (major.minor.patch).
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd)]
struct SemanticVersion {
    major: u32,
    minor: u32,
    patch: u32,
}

impl SemanticVersion {
    fn parse(version_str: &str) -> Result<Self> {
        let parts: Vec<&str> = version_str.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(anyhow!(
                "invalid version format: '{version_str}'. Expected 'major.minor.patch'"
            ));
        }
        let component = |s: &str| {
            s.parse::<u32>()
                .map_err(|_| anyhow!("invalid version component: '{s}'"))
        };
        Ok(SemanticVersion {
            major: component(parts[0])?,
            minor: component(parts[1])?,
            patch: component(parts[2])?,
        })
    }
}

/// Decides what setup must do, based on the config file's version stamp.
///
/// # Errors
/// - If the file exists but cannot be read
/// - If a present version stamp cannot be parsed
pub fn check(config_path: &Path) -> Result<SetupAction> {
    if !config_path.exists() {
        return Ok(SetupAction::WriteDefaults);
    }

    let stamped = read_stamp(config_path)?;
    match stamped {
        Some(stamp) => {
            let config_version = SemanticVersion::parse(&stamp)?;
            let current_version = SemanticVersion::parse(CURRENT_VERSION)?;
            if config_version < current_version {
                Ok(SetupAction::Restamp { from: stamp })
            } else {
                if config_version > current_version {
                    tracing::warn!(
                        "Config version {} is newer than app version {}",
                        stamp,
                        CURRENT_VERSION
                    );
                }
                Ok(SetupAction::None)
            }
        }
        None => Ok(SetupAction::Restamp {
            from: "unknown (unstamped config)".to_string(),
        }),
    }
}

/// Reads the version stamp from the first line, if present.
fn read_stamp(config_path: &Path) -> Result<Option<String>> {
    let content = std::fs::read_to_string(config_path)?;
    let first_line = content.lines().next().unwrap_or_default();

    let regex = Regex::new(r#"^\s*config_version\s*=\s*"([^"]+)""#)?;
    Ok(regex
        .captures(first_line)
        .map(|caps| caps[1].to_string()))
}

/// Writes config content with the current version stamped as the first line.
pub fn write_stamped(config_path: &Path, body: &str) -> Result<()> {
    let content = format!("config_version = \"{CURRENT_VERSION}\"\n{body}");
    std::fs::write(config_path, content)?;
    Ok(())
}

/// Refreshes the version stamp, preserving the rest of the file.
pub fn restamp(config_path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(config_path)?;
    let body: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim().starts_with("config_version"))
        .collect();
    write_stamped(config_path, &body.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_compare_versions() {
        let v1 = SemanticVersion::parse("0.0.4").unwrap();
        let v2 = SemanticVersion::parse("0.0.5").unwrap();
        let v3 = SemanticVersion::parse("0.1.0").unwrap();
        assert!(v1 < v2);
        assert!(v2 < v3);
    }

    #[test]
    fn invalid_version_formats() {
        assert!(SemanticVersion::parse("0.0").is_err());
        assert!(SemanticVersion::parse("0.0.5.1").is_err());
        assert!(SemanticVersion::parse("invalid").is_err());
    }

    #[test]
    fn missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let action = check(&dir.path().join("ovt.toml")).unwrap();
        assert_eq!(action, SetupAction::WriteDefaults);
    }

    #[test]
    fn current_stamp_needs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ovt.toml");
        write_stamped(&path, "[audio]\n").unwrap();
        assert_eq!(check(&path).unwrap(), SetupAction::None);
    }

    #[test]
    fn old_stamp_is_restamped_preserving_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ovt.toml");
        std::fs::write(
            &path,
            "config_version = \"0.0.1\"\n[audio]\nsample_rate = 44100\n",
        )
        .unwrap();

        match check(&path).unwrap() {
            SetupAction::Restamp { from } => assert_eq!(from, "0.0.1"),
            other => panic!("expected Restamp, got {other:?}"),
        }

        restamp(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(&format!(
            "config_version = \"{}\"",
            env!("CARGO_PKG_VERSION")
        )));
        assert!(content.contains("sample_rate = 44100"));
    }

    #[test]
    fn unstamped_file_is_restamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ovt.toml");
        std::fs::write(&path, "[audio]\n").unwrap();
        assert!(matches!(
            check(&path).unwrap(),
            SetupAction::Restamp { .. }
        ));
    }
}
