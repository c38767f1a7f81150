//! Take catalog: identities, the repository contract and its stores.
//!
//! ```text
//! TakeRepository (catalog)     ContentStore (audio bytes)
//!   ├── list / create            ├── exists / open
//!   └── rename / delete          └── commit / remove
//!
//! Implementations
//!   ├── FsTakeStore      - <root>/<story>/<category>/<slide>/<name>.wav + catalog.json
//!   └── MemoryTakeStore  - in-process, for hosts without storage and for tests
//! ```

mod fs;
mod memory;
pub mod name;

use std::fmt;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::config::Category;
use crate::error::TakeError;

pub use fs::FsTakeStore;
pub use memory::MemoryTakeStore;
pub use name::{MAX_NAME_LEN, next_default_name, validate_name};

/// The unit of content takes are attached to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    pub story: String,
    pub slide: usize,
    pub category: Category,
}

impl Scope {
    pub fn new(story: impl Into<String>, slide: usize, category: Category) -> Self {
        Self {
            story: story.into(),
            slide,
            category,
        }
    }

    /// Identity of a take named `name` in this scope
    pub fn take(&self, name: impl Into<String>) -> TakeId {
        TakeId {
            scope: self.clone(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.story, self.slide, self.category)
    }
}

/// Identity of one take: its scope plus its user-chosen name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TakeId {
    pub scope: Scope,
    pub name: String,
}

impl fmt::Display for TakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scope, self.name)
    }
}

/// A catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Take {
    pub id: TakeId,
    /// Creation order within the scope; survives renames and content replacement
    pub seq: u64,
}

impl Take {
    pub fn name(&self) -> &str {
        &self.id.name
    }
}

/// Durable catalog of named takes per scope
pub trait TakeRepository {
    /// All takes of `scope`, oldest first
    fn list(&self, scope: &Scope) -> Result<Vec<Take>, TakeError>;

    /// Register a new, empty take
    fn create(&mut self, scope: &Scope, name: &str) -> Result<Take, TakeError>;

    /// Give `take` a new name; on failure the old identity is left intact
    fn rename(&mut self, take: &TakeId, new_name: &str) -> Result<Take, TakeError>;

    /// Remove `take`; removing an absent take is not an error
    fn delete(&mut self, take: &TakeId) -> Result<(), TakeError>;
}

/// Audio content reachable by take identity
pub trait ContentStore {
    fn exists(&self, take: &TakeId) -> bool;

    /// Open the stored audio for reading
    fn open(&self, take: &TakeId) -> Result<Box<dyn Read + Send>, TakeError>;

    /// Store `bytes` under `take`, creating the catalog entry when absent.
    ///
    /// Committing to an existing take replaces its content and keeps its
    /// creation order.
    fn commit(&mut self, take: &TakeId, bytes: &[u8]) -> Result<Take, TakeError>;

    fn remove(&mut self, take: &TakeId) -> Result<(), TakeError>;
}

/// A store that is both the catalog and the content backend
pub trait TakeStore: TakeRepository + ContentStore {}

impl<T: TakeRepository + ContentStore> TakeStore for T {}

/// Read a take's full content into memory
pub fn read_content(store: &dyn TakeStore, take: &TakeId) -> Result<Vec<u8>, TakeError> {
    let mut reader = store.open(take)?;
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(bytes)
}
