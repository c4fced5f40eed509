//! Durable storage of the session state.
//!
//! The `PersistedStateStore` trait loads the [`PersistedState`] once at
//! startup and saves it after every change. Failures are reported as
//! [`StorageError`]; callers log them and carry on with the in-memory state,
//! which stays authoritative.
//!
//! [`KeyValueStateStore`] implements the trait over any [`KeyValueStore`],
//! spreading the state over the `savedWaypoints` and `savedSearchQuery`
//! keys.

mod key_value;

use thiserror::Error;

use crate::PersistedState;

pub use key_value::{KeyValueStateStore, SEARCH_TEXT_KEY, WAYPOINTS_KEY};

/// Errors raised while loading or saving state.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading a key failed.
    #[error("failed to read {key:?}: {message}")]
    Read {
        /// Key being read.
        key: String,
        /// Backend error detail.
        message: String,
    },
    /// Writing a key failed.
    #[error("failed to write {key:?}: {message}")]
    Write {
        /// Key being written.
        key: String,
        /// Backend error detail.
        message: String,
    },
    /// A stored value could not be decoded.
    #[error("stored value under {key:?} is malformed")]
    Decode {
        /// Key holding the malformed value.
        key: String,
        /// Source error from `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// A stored value was not valid UTF-8 text.
    #[error("stored value under {key:?} is not UTF-8 text")]
    InvalidText {
        /// Key holding the malformed value.
        key: String,
    },
    /// The state could not be encoded.
    #[error("failed to encode state")]
    Encode(#[source] serde_json::Error),
}

/// Load and save the persisted session state.
///
/// # Examples
///
/// ```rust
/// use std::sync::Mutex;
/// use rota_core::{PersistedState, PersistedStateStore, StorageError};
///
/// #[derive(Default)]
/// struct Slot(Mutex<Option<PersistedState>>);
///
/// impl PersistedStateStore for Slot {
///     fn load(&self) -> Result<Option<PersistedState>, StorageError> {
///         Ok(self.0.lock().ok().and_then(|slot| slot.clone()))
///     }
///
///     fn save(&self, state: &PersistedState) -> Result<(), StorageError> {
///         if let Ok(mut slot) = self.0.lock() {
///             *slot = Some(state.clone());
///         }
///         Ok(())
///     }
/// }
///
/// let store = Slot::default();
/// assert!(store.load()?.is_none());
/// store.save(&PersistedState::default())?;
/// assert!(store.load()?.is_some());
/// # Ok::<(), StorageError>(())
/// ```
pub trait PersistedStateStore: Send + Sync {
    /// Return the saved state, or `None` when nothing has been saved.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend fails or holds bad data.
    fn load(&self) -> Result<Option<PersistedState>, StorageError>;

    /// Persist `state`, replacing whatever was saved before.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend fails.
    fn save(&self, state: &PersistedState) -> Result<(), StorageError>;
}

/// Durable byte-valued key/value storage.
pub trait KeyValueStore: Send + Sync {
    /// Return the bytes stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] when the backend fails.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] when the backend fails.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;
}

impl<T: PersistedStateStore + ?Sized> PersistedStateStore for std::sync::Arc<T> {
    fn load(&self) -> Result<Option<PersistedState>, StorageError> {
        (**self).load()
    }

    fn save(&self, state: &PersistedState) -> Result<(), StorageError> {
        (**self).save(state)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}
