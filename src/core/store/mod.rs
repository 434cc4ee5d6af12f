//! Document storage.
//!
//! Serializes read-modify-write cycles per document path. Every edit holds
//! the path's lock from load through save, so two edits of the same document
//! never interleave and a concurrent reader through the store never observes
//! a half-applied mutation.
//!
//! ## Example
//!
//! ```ignore
//! let store = DocumentStore::new();
//! store.edit_property_list(&path, IfMissing::Create, |doc| {
//!     doc.insert("branch_key", "key_live_xxx".into());
//!     Ok(())
//! })?;
//! ```

mod fs;

pub use fs::{lock_key, write_atomic};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::core::manifest::Manifest;
use crate::core::property_list::PropertyDocument;
use crate::error::Result;

/// Behaviour when an edited document does not exist yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IfMissing {
    /// Fail with `DocumentError::NotFound`.
    Fail,
    /// Start from an empty document.
    Create,
}

/// Per-path writer serialization for project documents.
#[derive(Debug, Default)]
pub struct DocumentStore {
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        let key = lock_key(path);
        let mut locks = self.locks.lock();
        Arc::clone(locks.entry(key).or_default())
    }

    /// Run `f` while holding the lock for `path`.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `f`.
    pub fn with_lock<R>(&self, path: &Path, f: impl FnOnce() -> Result<R>) -> Result<R> {
        let lock = self.lock_for(path);
        let _guard = lock.lock();
        f()
    }

    /// Read a property list without mutating it.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::NotFound` or `DocumentError::Parse`.
    pub fn read_property_list(&self, path: &Path) -> Result<PropertyDocument> {
        self.with_lock(path, || PropertyDocument::load(path))
    }

    /// Load, mutate and save a property list under its path lock.
    ///
    /// # Errors
    ///
    /// Returns document load/save errors or the error returned by `f`; on
    /// error nothing is written.
    pub fn edit_property_list<R>(
        &self,
        path: &Path,
        if_missing: IfMissing,
        f: impl FnOnce(&mut PropertyDocument) -> Result<R>,
    ) -> Result<R> {
        self.with_lock(path, || {
            let mut doc = match if_missing {
                IfMissing::Create if !path.exists() => {
                    debug!(path = %path.display(), "creating property list");
                    PropertyDocument::empty(path)
                }
                _ => PropertyDocument::load(path)?,
            };
            let result = f(&mut doc)?;
            doc.save()?;
            Ok(result)
        })
    }

    /// Load, mutate and save an Android manifest under its path lock.
    ///
    /// # Errors
    ///
    /// Returns manifest load/save errors or the error returned by `f`; on
    /// error nothing is written.
    pub fn edit_manifest<R>(
        &self,
        path: &Path,
        f: impl FnOnce(&mut Manifest) -> Result<R>,
    ) -> Result<R> {
        self.with_lock(path, || {
            let mut manifest = Manifest::load(path)?;
            let result = f(&mut manifest)?;
            manifest.save(path)?;
            Ok(result)
        })
    }
}
