//! In-process take store.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use super::name::{same_name, validate_name};
use super::{ContentStore, Scope, Take, TakeId, TakeRepository};
use crate::error::TakeError;

#[derive(Debug, Default)]
struct ScopeEntries {
    next_seq: u64,
    takes: Vec<Entry>,
}

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    seq: u64,
    content: Vec<u8>,
}

impl ScopeEntries {
    fn position(&self, name: &str) -> Option<usize> {
        self.takes.iter().position(|e| e.name == name)
    }

    fn conflicts(&self, name: &str, except: Option<usize>) -> bool {
        self.takes
            .iter()
            .enumerate()
            .any(|(i, e)| Some(i) != except && same_name(&e.name, name))
    }

    fn push(&mut self, name: String, content: Vec<u8>) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.takes.push(Entry { name, seq, content });
        seq
    }
}

/// Takes held in memory, keyed by scope
#[derive(Debug, Default)]
pub struct MemoryTakeStore {
    scopes: HashMap<Scope, ScopeEntries>,
}

impl MemoryTakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, take: &TakeId) -> Option<&Entry> {
        let entries = self.scopes.get(&take.scope)?;
        entries.position(&take.name).map(|i| &entries.takes[i])
    }
}

impl TakeRepository for MemoryTakeStore {
    fn list(&self, scope: &Scope) -> Result<Vec<Take>, TakeError> {
        let Some(entries) = self.scopes.get(scope) else {
            return Ok(Vec::new());
        };
        Ok(entries
            .takes
            .iter()
            .map(|e| Take {
                id: scope.take(e.name.clone()),
                seq: e.seq,
            })
            .collect())
    }

    fn create(&mut self, scope: &Scope, name: &str) -> Result<Take, TakeError> {
        let name = validate_name(name)?;
        let entries = self.scopes.entry(scope.clone()).or_default();
        if entries.conflicts(&name, None) {
            return Err(TakeError::DuplicateName(name));
        }
        let seq = entries.push(name.clone(), Vec::new());
        Ok(Take {
            id: scope.take(name),
            seq,
        })
    }

    fn rename(&mut self, take: &TakeId, new_name: &str) -> Result<Take, TakeError> {
        let new_name = validate_name(new_name)?;
        let entries = self
            .scopes
            .get_mut(&take.scope)
            .ok_or_else(|| TakeError::NotFound(take.name.clone()))?;
        let index = entries
            .position(&take.name)
            .ok_or_else(|| TakeError::NotFound(take.name.clone()))?;
        if entries.conflicts(&new_name, Some(index)) {
            return Err(TakeError::DuplicateName(new_name));
        }

        let entry = &mut entries.takes[index];
        entry.name = new_name.clone();
        Ok(Take {
            id: take.scope.take(new_name),
            seq: entry.seq,
        })
    }

    fn delete(&mut self, take: &TakeId) -> Result<(), TakeError> {
        if let Some(entries) = self.scopes.get_mut(&take.scope) {
            if let Some(index) = entries.position(&take.name) {
                entries.takes.remove(index);
            }
        }
        Ok(())
    }
}

impl ContentStore for MemoryTakeStore {
    fn exists(&self, take: &TakeId) -> bool {
        self.entry(take).is_some()
    }

    fn open(&self, take: &TakeId) -> Result<Box<dyn Read + Send>, TakeError> {
        let entry = self
            .entry(take)
            .ok_or_else(|| TakeError::NotFound(take.name.clone()))?;
        Ok(Box::new(Cursor::new(entry.content.clone())))
    }

    fn commit(&mut self, take: &TakeId, bytes: &[u8]) -> Result<Take, TakeError> {
        let entries = self.scopes.entry(take.scope.clone()).or_default();
        if let Some(index) = entries.position(&take.name) {
            let entry = &mut entries.takes[index];
            entry.content = bytes.to_vec();
            return Ok(Take {
                id: take.clone(),
                seq: entry.seq,
            });
        }

        let name = validate_name(&take.name)?;
        if entries.conflicts(&name, None) {
            return Err(TakeError::DuplicateName(name));
        }
        let seq = entries.push(name.clone(), bytes.to_vec());
        Ok(Take {
            id: take.scope.take(name),
            seq,
        })
    }

    fn remove(&mut self, take: &TakeId) -> Result<(), TakeError> {
        self.delete(take)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Category;

    fn scope() -> Scope {
        Scope::new("lost-sheep", 3, Category::Draft)
    }

    #[test]
    fn test_list_is_in_creation_order() {
        let mut store = MemoryTakeStore::new();
        for name in ["v1", "v2", "v3"] {
            store.create(&scope(), name).unwrap();
        }
        let names: Vec<_> = store
            .list(&scope())
            .unwrap()
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names, ["v1", "v2", "v3"]);
    }

    #[test]
    fn test_duplicate_names_are_case_insensitive() {
        let mut store = MemoryTakeStore::new();
        store.create(&scope(), "Take").unwrap();
        assert!(matches!(
            store.create(&scope(), "take"),
            Err(TakeError::DuplicateName(_))
        ));
    }

    #[test]
    fn test_same_name_in_other_scope_is_allowed() {
        let mut store = MemoryTakeStore::new();
        store.create(&scope(), "v1").unwrap();
        let other = Scope::new("lost-sheep", 4, Category::Draft);
        assert!(store.create(&other, "v1").is_ok());
    }

    #[test]
    fn test_commit_replaces_content_and_keeps_order() {
        let mut store = MemoryTakeStore::new();
        let first = store.commit(&scope().take("v1"), b"one").unwrap();
        store.commit(&scope().take("v2"), b"two").unwrap();
        let again = store.commit(&scope().take("v1"), b"edited").unwrap();

        assert_eq!(first.seq, again.seq);
        let content = crate::take::read_content(&store, &scope().take("v1")).unwrap();
        assert_eq!(content, b"edited");
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut store = MemoryTakeStore::new();
        store.create(&scope(), "v1").unwrap();
        store.delete(&scope().take("v1")).unwrap();
        store.delete(&scope().take("v1")).unwrap();
        assert!(store.list(&scope()).unwrap().is_empty());
    }

    #[test]
    fn test_rename_to_own_name_with_new_case() {
        let mut store = MemoryTakeStore::new();
        store.create(&scope(), "draft").unwrap();
        let renamed = store.rename(&scope().take("draft"), "Draft").unwrap();
        assert_eq!(renamed.name(), "Draft");
    }
}
