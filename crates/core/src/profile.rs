//! Lighting profiles: named modes, one of which is selected.
//!
//! The selected mode's lighting is the "current" state the sync engine drives
//! the device towards. Profiles are stored as JSON.

use crate::error::{Error, Result};
use crate::lighting::LightingState;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding the profile location.
pub const PROFILE_ENV: &str = "HIDLIGHT_PROFILE";

/// One selectable lighting configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mode {
    pub name: String,
    #[serde(default)]
    pub lighting: LightingState,
}

impl Mode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lighting: LightingState::dark(),
        }
    }
}

/// A saved lighting profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Profile display name.
    pub name: String,
    modes: Vec<Mode>,
    /// Index of the selected mode.
    #[serde(default)]
    current: usize,
}

impl Default for Profile {
    fn default() -> Self {
        Self::new("Default")
    }
}

impl Profile {
    /// A profile with a single dark mode.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modes: vec![Mode::new("Mode 1")],
            current: 0,
        }
    }

    pub fn modes(&self) -> &[Mode] {
        &self.modes
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The selected mode.
    pub fn current_mode(&self) -> &Mode {
        &self.modes[self.current]
    }

    pub fn current_mode_mut(&mut self) -> &mut Mode {
        &mut self.modes[self.current]
    }

    /// Append a dark mode and return its index.
    pub fn add_mode(&mut self, name: impl Into<String>) -> usize {
        self.modes.push(Mode::new(name));
        self.modes.len() - 1
    }

    pub fn mode_mut(&mut self, index: usize) -> Result<&mut Mode> {
        let count = self.modes.len();
        self.modes.get_mut(index).ok_or(Error::OutOfRange {
            field: "mode",
            value: index as u32,
            min: 0,
            max: count.saturating_sub(1) as u32,
        })
    }

    /// Switch to another mode. Its lighting is flagged for a full resync.
    pub fn select_mode(&mut self, index: usize) -> Result<()> {
        self.mode_mut(index)?.lighting.request_resync();
        self.current = index;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.modes.is_empty() {
            return Err(Error::Profile(format!(
                "profile '{}' has no modes",
                self.name
            )));
        }
        if self.current >= self.modes.len() {
            return Err(Error::Profile(format!(
                "profile '{}' selects mode {} but has {}",
                self.name,
                self.current,
                self.modes.len()
            )));
        }
        Ok(())
    }

    /// Parse and validate a profile from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let profile: Profile =
            serde_json::from_str(text).map_err(|e| Error::Profile(e.to_string()))?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Profile(e.to_string()))
    }
}

/// Default profile location.
///
/// `$HIDLIGHT_PROFILE`, else `$XDG_CONFIG_HOME/hidlight/profile.json`,
/// else `$HOME/.config/hidlight/profile.json`.
pub fn profile_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(PROFILE_ENV) {
        return Ok(PathBuf::from(path));
    }
    let config_dir = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(dir) => PathBuf::from(dir),
        None => std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".config"))
            .ok_or_else(|| {
                Error::Profile("neither XDG_CONFIG_HOME nor HOME is set".to_string())
            })?,
    };
    Ok(config_dir.join("hidlight").join("profile.json"))
}

/// Load a profile. A missing file yields the default profile.
pub fn load_profile(path: &Path) -> Result<Profile> {
    match std::fs::read_to_string(path) {
        Ok(text) => Profile::from_json(&text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No profile file, using default");
            Ok(Profile::default())
        }
        Err(e) => Err(Error::Profile(format!("read {}: {e}", path.display()))),
    }
}

/// Write a profile, creating parent directories.
pub fn save_profile(profile: &Profile, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::Profile(format!("create {}: {e}", parent.display())))?;
    }
    std::fs::write(path, profile.to_json()?)
        .map_err(|e| Error::Profile(format!("write {}: {e}", path.display())))
}
