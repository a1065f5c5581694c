//! Generic entity store
//!
//! One `EntityStore` holds one table: the docs of a single entity kind,
//! keyed by id, plus that kind's id allocator.
//!
//! # Conversion
//!
//! Doc→Info is a plain function fixed at construction. Info→Doc needs to
//! look into *other* stores to check foreign keys, so it is passed to
//! [`EntityStore::add`] as a resolver built over borrows of those stores.
//!
//! # Invariants
//!
//! - Ids are allocated from 0 upward and never reused, even when the
//!   conversion of the doc they were allocated for fails
//! - A doc is stored only after its resolver succeeded
//! - `get_info` is always derived from the stored doc

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::model::{EntityId, EntityKind};

use super::errors::{StoreError, StoreResult};

/// One table of docs for a single entity kind.
#[derive(Debug, Clone)]
pub struct EntityStore<Id, Doc, Info> {
    kind: EntityKind,
    next_id: u64,
    docs: BTreeMap<Id, Arc<Doc>>,
    to_info: fn(&Doc) -> Info,
}

impl<Id: EntityId, Doc, Info> EntityStore<Id, Doc, Info> {
    /// Create an empty store
    pub fn new(kind: EntityKind, to_info: fn(&Doc) -> Info) -> Self {
        Self {
            kind,
            next_id: 0,
            docs: BTreeMap::new(),
            to_info,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Reserve and return an id that has never been handed out.
    pub fn next_id(&mut self) -> Id {
        let id = Id::from_raw(self.next_id);
        self.next_id += 1;
        id
    }

    /// Number of ids reserved so far, including ones whose add failed
    pub fn allocated(&self) -> u64 {
        self.next_id
    }

    /// Allocate an id, build the Info for it, and convert it into a stored Doc.
    ///
    /// On conversion failure the id stays consumed and nothing is stored.
    pub fn add<B, R>(&mut self, build: B, resolve: R) -> StoreResult<(Id, Arc<Doc>)>
    where
        B: FnOnce(Id) -> Info,
        R: FnOnce(Info) -> StoreResult<Doc>,
    {
        let id = self.next_id();
        let doc = Arc::new(resolve(build(id))?);

        let previous = self.docs.insert(id, Arc::clone(&doc));
        assert!(
            previous.is_none(),
            "{} id {} allocated twice",
            self.kind,
            id
        );

        Ok((id, doc))
    }

    pub fn get_doc(&self, id: Id) -> Option<Arc<Doc>> {
        self.docs.get(&id).cloned()
    }

    pub fn get_info(&self, id: Id) -> Option<Info> {
        self.docs.get(&id).map(|doc| (self.to_info)(doc))
    }

    pub fn contains(&self, id: Id) -> bool {
        self.docs.contains_key(&id)
    }

    /// Like `get_doc`, but reports a missing id as `NotFound`
    pub fn require(&self, id: Id) -> StoreResult<Arc<Doc>> {
        self.get_doc(id).ok_or(StoreError::NotFound {
            kind: self.kind,
            id: id.raw(),
        })
    }

    /// Replace the whole doc stored under an existing id.
    ///
    /// Returns the doc that was replaced.
    pub fn update(&mut self, id: Id, doc: impl Into<Arc<Doc>>) -> StoreResult<Arc<Doc>> {
        match self.docs.get_mut(&id) {
            Some(slot) => Ok(std::mem::replace(slot, doc.into())),
            None => Err(StoreError::NotFound {
                kind: self.kind,
                id: id.raw(),
            }),
        }
    }

    /// Delete and return the doc, or `None` if absent
    pub fn remove(&mut self, id: Id) -> Option<Arc<Doc>> {
        self.docs.remove(&id)
    }

    /// Snapshot of every doc, in ascending id order
    pub fn all(&self) -> Vec<Arc<Doc>> {
        self.docs.values().cloned().collect()
    }

    /// Iterate docs in ascending id order without copying
    pub fn iter(&self) -> impl Iterator<Item = (Id, &Arc<Doc>)> + '_ {
        self.docs.iter().map(|(id, doc)| (*id, doc))
    }

    /// Info projection of every doc, in ascending id order
    pub fn all_info(&self) -> Vec<Info> {
        self.docs.values().map(|doc| (self.to_info)(doc)).collect()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Project a doc through this store's Doc→Info function
    pub fn info_of(&self, doc: &Doc) -> Info {
        (self.to_info)(doc)
    }
}
