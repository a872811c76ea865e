//! Local UI preferences: theme and saved job postings.
//!
//! A small JSON key/value file standing in for browser local storage:
//!
//! ```json
//! { "theme": "dark", "savedJobs": ["uav-pilot", "systems-engineer"] }
//! ```
//!
//! The file is read once when the store opens and rewritten after every
//! change. Keys this store does not know are preserved.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{AerogenError, Result};

/// Site colour theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = AerogenError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(AerogenError::InvalidInput(format!("unknown theme '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Preferences {
    #[serde(default)]
    theme: Theme,
    #[serde(default)]
    saved_jobs: Vec<String>,
    #[serde(flatten)]
    other: BTreeMap<String, serde_json::Value>,
}

/// File-backed preference store.
#[derive(Debug)]
pub struct PreferenceStore {
    path: PathBuf,
    prefs: Preferences,
}

impl PreferenceStore {
    /// Default location: `~/.aerogen/preferences.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".aerogen").join("preferences.json"))
    }

    /// Open the store at `path`.
    ///
    /// A missing file yields defaults; an unreadable or corrupt file is
    /// logged and also yields defaults (it is replaced on the next write).
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let prefs = load(&path).unwrap_or_default();
        Self { path, prefs }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn theme(&self) -> Theme {
        self.prefs.theme
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.prefs.theme = theme;
        self.save()
    }

    /// Flip between light and dark, returning the new theme.
    pub fn toggle_theme(&mut self) -> Result<Theme> {
        let theme = self.prefs.theme.toggled();
        self.set_theme(theme)?;
        Ok(theme)
    }

    /// Saved job identifiers in the order they were saved.
    pub fn saved_jobs(&self) -> &[String] {
        &self.prefs.saved_jobs
    }

    pub fn is_job_saved(&self, id: &str) -> bool {
        self.prefs.saved_jobs.iter().any(|j| j == id)
    }

    /// Save the job if it is not saved, otherwise unsave it.
    ///
    /// Returns whether the job is saved afterwards.
    pub fn toggle_saved_job(&mut self, id: &str) -> Result<bool> {
        let saved = if self.is_job_saved(id) {
            self.prefs.saved_jobs.retain(|j| j != id);
            false
        } else {
            self.prefs.saved_jobs.push(id.to_string());
            true
        };
        self.save()?;
        Ok(saved)
    }

    /// Write the current state (atomic write via tmp + rename).
    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AerogenError::Configuration(format!(
                    "failed to create preferences dir {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(&self.prefs)?;
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

fn load(path: &Path) -> Option<Preferences> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read preferences");
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(prefs) => Some(prefs),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "corrupt preferences file");
            None
        }
    }
}
