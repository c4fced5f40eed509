//! File-backed key/value persistence.
//!
//! [`FileKeyValueStore`] keeps one file per key inside a state directory.
//! Writes go through a scratch file and an atomic rename. Combine it with
//! [`rota_core::KeyValueStateStore`] to persist the session state:
//!
//! ```no_run
//! use camino::Utf8Path;
//! use rota_core::{KeyValueStateStore, PersistedStateStore};
//! use rota_data::store::FileKeyValueStore;
//!
//! let files = FileKeyValueStore::open(Utf8Path::new("/var/lib/rota"))?;
//! let store = KeyValueStateStore::new(files);
//! let restored = store.load()?;
//! # let _ = restored;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs_utf8::Dir;
use rota_core::{KeyValueStore, StorageError};
use std::io;

/// Key/value store keeping one file per key.
#[derive(Debug)]
pub struct FileKeyValueStore {
    root: Utf8PathBuf,
    dir: Dir,
}

impl FileKeyValueStore {
    /// Open `root`, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] when the directory cannot be created
    /// or opened.
    pub fn open(root: &Utf8Path) -> Result<Self, StorageError> {
        let dir = rota_fs::open_or_create_dir(root).map_err(|err| StorageError::Read {
            key: root.to_string(),
            message: err.to_string(),
        })?;
        Ok(Self {
            root: root.to_path_buf(),
            dir,
        })
    }

    /// Directory holding the entries.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}

/// Reject keys that would escape the state directory.
fn file_name(key: &str) -> io::Result<&str> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(key)
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("unsupported key {key:?}"),
        ))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        file_name(key)
            .and_then(|name| rota_fs::read_if_exists(&self.dir, name))
            .map_err(|err| StorageError::Read {
                key: key.to_owned(),
                message: err.to_string(),
            })
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        file_name(key)
            .and_then(|name| rota_fs::write_atomic(&self.dir, name, value))
            .map_err(|err| StorageError::Write {
                key: key.to_owned(),
                message: err.to_string(),
            })
    }
}
