//! Local persistence for the home document.
//!
//! The whole document lives in a single file under the storage root:
//!
//! ```text
//! <root>/
//!   home.json        # Full HomeState snapshot, rewritten after every mutation
//! ```
//!
//! Writes go to `home.json.tmp` first and are renamed into place, so a
//! reader never sees a half-written document.

use std::{fs, io, path::PathBuf};

use crate::model::HomeState;

const DOCUMENT: &str = "home.json";
const STAGING: &str = "home.json.tmp";

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// Local file-based storage for the home document.
#[derive(Debug)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Creates a new storage instance rooted at the given directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Returns the default storage root: `~/.nexus/`.
    pub fn default_root() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".nexus"))
    }

    /// Path of the persisted document.
    pub fn document_path(&self) -> PathBuf {
        self.root.join(DOCUMENT)
    }

    /// Loads the persisted document.
    ///
    /// Returns `None` when nothing has been saved yet.
    pub fn load_home(&self) -> Result<Option<HomeState>> {
        let json = match fs::read_to_string(self.document_path()) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&json)?))
    }

    /// Writes the full document, replacing any previous snapshot.
    pub fn save_home(&self, state: &HomeState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)?;
        let staging = self.root.join(STAGING);
        fs::write(&staging, json)?;
        fs::rename(staging, self.document_path())?;
        Ok(())
    }
}
