//! Which take is "the" take of a scope.
//!
//! The registry is a plain key/value store. It never checks that a name
//! refers to an existing take; keeping selection and catalog consistent is
//! the controllers' job.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::take::Scope;

pub trait SelectionRegistry {
    fn get(&self, scope: &Scope) -> Option<String>;

    /// Point `scope` at `name`, or clear it with `None`
    fn set(&mut self, scope: &Scope, name: Option<&str>) -> Result<(), StorageError>;
}

/// Selection kept for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemorySelectionRegistry {
    selected: HashMap<Scope, String>,
}

impl MemorySelectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SelectionRegistry for MemorySelectionRegistry {
    fn get(&self, scope: &Scope) -> Option<String> {
        self.selected.get(scope).cloned()
    }

    fn set(&mut self, scope: &Scope, name: Option<&str>) -> Result<(), StorageError> {
        match name {
            Some(name) => self.selected.insert(scope.clone(), name.to_string()),
            None => self.selected.remove(scope),
        };
        Ok(())
    }
}

/// Selection persisted as a JSON object keyed by `story/slide/category`.
///
/// Every `set` rewrites the file (through a temporary file and a rename).
#[derive(Debug)]
pub struct JsonSelectionRegistry {
    path: PathBuf,
    selected: BTreeMap<String, String>,
}

impl JsonSelectionRegistry {
    /// Load the registry at `path`; a missing file is an empty registry
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let selected = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, selected })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn key(scope: &Scope) -> String {
        scope.to_string()
    }

    fn persist(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&self.selected)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SelectionRegistry for JsonSelectionRegistry {
    fn get(&self, scope: &Scope) -> Option<String> {
        self.selected.get(&Self::key(scope)).cloned()
    }

    fn set(&mut self, scope: &Scope, name: Option<&str>) -> Result<(), StorageError> {
        let key = Self::key(scope);
        let previous = match name {
            Some(name) => self.selected.insert(key.clone(), name.to_string()),
            None => self.selected.remove(&key),
        };

        if let Err(e) = self.persist() {
            // Keep memory and disk in agreement
            match previous {
                Some(old) => self.selected.insert(key, old),
                None => self.selected.remove(&key),
            };
            return Err(e);
        }

        crate::verbose!("Selection for {scope}: {}", name.unwrap_or("<none>"));
        Ok(())
    }
}
