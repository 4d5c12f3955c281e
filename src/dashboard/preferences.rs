/// Persisted user preference (theme only)
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::Result;
use crate::types::Theme;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Preferences {
    #[serde(default)]
    theme: Theme,
}

pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        PreferenceStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saved theme, or `Light` when nothing usable is on disk
    pub async fn load_theme(&self) -> Theme {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No preferences at {}, using default theme", self.path.display());
                return Theme::default();
            }
            Err(e) => {
                warn!("Failed to read preferences {}: {}", self.path.display(), e);
                return Theme::default();
            }
        };

        match serde_json::from_str::<Preferences>(&content) {
            Ok(prefs) => prefs.theme,
            Err(e) => {
                warn!("Ignoring malformed preferences {}: {}", self.path.display(), e);
                Theme::default()
            }
        }
    }

    pub async fn save_theme(&self, theme: Theme) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(&Preferences { theme })?;
        tokio::fs::write(&self.path, json).await?;
        debug!("Saved theme '{}' to {}", theme.as_str(), self.path.display());
        Ok(())
    }
}
