//! Directory-backed take store.
//!
//! Layout:
//!
//! ```text
//! <root>/<story>/<category>/<slide>/
//!   ├── catalog.json   - creation order + next sequence number
//!   ├── Draft 1.wav
//!   └── Draft 2.wav
//! ```
//!
//! The index is always rewritten through a temporary file and a rename so a
//! reader never sees a half-written catalog.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::name::{same_name, validate_name};
use super::{ContentStore, Scope, Take, TakeId, TakeRepository};
use crate::error::{StorageError, TakeError};

const INDEX_FILE: &str = "catalog.json";
const CONTENT_EXTENSION: &str = "wav";

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogIndex {
    next_seq: u64,
    takes: Vec<IndexEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    name: String,
    seq: u64,
}

impl CatalogIndex {
    fn position(&self, name: &str) -> Option<usize> {
        self.takes.iter().position(|e| e.name == name)
    }

    fn conflicts(&self, name: &str, except: Option<usize>) -> bool {
        self.takes
            .iter()
            .enumerate()
            .any(|(i, e)| Some(i) != except && same_name(&e.name, name))
    }

    fn push(&mut self, name: String) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.takes.push(IndexEntry { name, seq });
        seq
    }
}

/// Takes stored as WAV files under a root directory
#[derive(Debug, Clone)]
pub struct FsTakeStore {
    root: PathBuf,
}

impl FsTakeStore {
    /// Open (and create if needed) a store rooted at `root`
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        crate::verbose!("Take store at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn scope_dir(&self, scope: &Scope) -> PathBuf {
        self.root
            .join(story_dir_name(&scope.story))
            .join(scope.category.as_str())
            .join(scope.slide.to_string())
    }

    /// Path of the audio file backing `take`
    pub fn content_path(&self, take: &TakeId) -> PathBuf {
        self.scope_dir(&take.scope)
            .join(format!("{}.{CONTENT_EXTENSION}", take.name))
    }

    fn load_index(&self, scope: &Scope) -> Result<CatalogIndex, TakeError> {
        let dir = self.scope_dir(scope);
        let mut index = match fs::read(dir.join(INDEX_FILE)) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => CatalogIndex::default(),
            Err(e) => return Err(e.into()),
        };
        reconcile(&dir, &mut index)?;
        Ok(index)
    }

    fn save_index(&self, scope: &Scope, index: &CatalogIndex) -> Result<(), TakeError> {
        let dir = self.scope_dir(scope);
        fs::create_dir_all(&dir)?;
        write_atomic(&dir.join(INDEX_FILE), &serde_json::to_vec_pretty(index)?)?;
        Ok(())
    }

    /// Append a new entry with `content`, undoing the file write if the index can't be saved
    fn insert(&self, scope: &Scope, name: String, content: &[u8]) -> Result<Take, TakeError> {
        let mut index = self.load_index(scope)?;
        if index.conflicts(&name, None) {
            return Err(TakeError::DuplicateName(name));
        }

        let id = scope.take(name.clone());
        let path = self.content_path(&id);
        fs::create_dir_all(self.scope_dir(scope))?;
        write_atomic(&path, content)?;

        let seq = index.push(name);
        if let Err(e) = self.save_index(scope, &index) {
            let _ = fs::remove_file(&path);
            return Err(e);
        }

        crate::verbose!("Created take {id} (#{seq})");
        Ok(Take { id, seq })
    }
}

impl TakeRepository for FsTakeStore {
    fn list(&self, scope: &Scope) -> Result<Vec<Take>, TakeError> {
        let index = self.load_index(scope)?;
        Ok(index
            .takes
            .into_iter()
            .map(|e| Take {
                id: scope.take(e.name),
                seq: e.seq,
            })
            .collect())
    }

    fn create(&mut self, scope: &Scope, name: &str) -> Result<Take, TakeError> {
        let name = validate_name(name)?;
        self.insert(scope, name, &[])
    }

    fn rename(&mut self, take: &TakeId, new_name: &str) -> Result<Take, TakeError> {
        let new_name = validate_name(new_name)?;
        let scope = &take.scope;
        let mut index = self.load_index(scope)?;
        let position = index
            .position(&take.name)
            .ok_or_else(|| TakeError::NotFound(take.name.clone()))?;
        if index.conflicts(&new_name, Some(position)) {
            return Err(TakeError::DuplicateName(new_name));
        }

        let seq = index.takes[position].seq;
        if index.takes[position].name == new_name {
            return Ok(Take {
                id: take.clone(),
                seq,
            });
        }

        let renamed = scope.take(new_name.clone());
        let from = self.content_path(take);
        let to = self.content_path(&renamed);
        fs::rename(&from, &to)?;

        index.takes[position].name = new_name;
        if let Err(e) = self.save_index(scope, &index) {
            // Put the file back so the old identity stays whole
            let _ = fs::rename(&to, &from);
            return Err(e);
        }

        crate::verbose!("Renamed take {take} -> {}", renamed.name);
        Ok(Take { id: renamed, seq })
    }

    fn delete(&mut self, take: &TakeId) -> Result<(), TakeError> {
        let mut index = self.load_index(&take.scope)?;
        let path = self.content_path(take);

        if let Some(position) = index.position(&take.name) {
            index.takes.remove(position);
            self.save_index(&take.scope, &index)?;
            crate::verbose!("Deleted take {take}");
        }

        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl ContentStore for FsTakeStore {
    fn exists(&self, take: &TakeId) -> bool {
        self.load_index(&take.scope)
            .map(|index| index.position(&take.name).is_some())
            .unwrap_or(false)
    }

    fn open(&self, take: &TakeId) -> Result<Box<dyn Read + Send>, TakeError> {
        if !self.exists(take) {
            return Err(TakeError::NotFound(take.name.clone()));
        }
        let file = File::open(self.content_path(take))?;
        Ok(Box::new(file))
    }

    fn commit(&mut self, take: &TakeId, bytes: &[u8]) -> Result<Take, TakeError> {
        let index = self.load_index(&take.scope)?;
        if let Some(position) = index.position(&take.name) {
            write_atomic(&self.content_path(take), bytes)?;
            crate::verbose!("Replaced content of {take} ({} bytes)", bytes.len());
            return Ok(Take {
                id: take.clone(),
                seq: index.takes[position].seq,
            });
        }

        let name = validate_name(&take.name)?;
        self.insert(&take.scope, name, bytes)
    }

    fn remove(&mut self, take: &TakeId) -> Result<(), TakeError> {
        self.delete(take)
    }
}

/// Drop entries whose audio vanished and adopt audio files the index doesn't know
fn reconcile(dir: &Path, index: &mut CatalogIndex) -> Result<(), TakeError> {
    if !dir.is_dir() {
        index.takes.clear();
        return Ok(());
    }

    index.takes.retain(|e| {
        let present = dir.join(format!("{}.{CONTENT_EXTENSION}", e.name)).is_file();
        if !present {
            crate::verbose!("Dropping catalog entry '{}' (audio file missing)", e.name);
        }
        present
    });

    let mut orphans = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some(CONTENT_EXTENSION) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if index.position(stem).is_some() {
            continue;
        }
        match validate_name(stem) {
            Ok(name) if name == stem && !index.conflicts(&name, None) => orphans.push(name),
            _ => crate::verbose!("Ignoring unrecognised audio file {}", path.display()),
        }
    }

    orphans.sort();
    for name in orphans {
        crate::verbose!("Adopting untracked take '{name}'");
        index.push(name);
    }

    Ok(())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}

/// Story ids become one directory level.
///
/// Letters, digits, `-`, `_` and inner spaces are kept; every other byte is
/// percent-escaped (`%` included), so distinct ids never share a directory.
fn story_dir_name(story: &str) -> String {
    if story.is_empty() {
        return "%".to_string();
    }

    let last = story.chars().count() - 1;
    let mut name = String::with_capacity(story.len());
    for (i, c) in story.chars().enumerate() {
        let edge_space = c == ' ' && (i == 0 || i == last);
        if (c.is_alphanumeric() || matches!(c, '-' | '_' | ' ')) && !edge_space {
            name.push(c);
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                name.push_str(&format!("%{byte:02X}"));
            }
        }
    }
    name
}
