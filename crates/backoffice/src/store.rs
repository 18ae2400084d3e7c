//! Authoritative collection plus its filtered view.
//!
//! The view is a list of indices into the collection and is recomputed after
//! every mutation, so it is always exactly the records matching the current
//! predicate, in collection order.

use api_types::RecordId;

use crate::{
    filter::{Predicate, match_all},
    resource::Resource,
};

pub struct FilteredListStore<R: Resource> {
    collection: Vec<R>,
    predicate: Predicate<R>,
    view: Vec<usize>,
}

impl<R: Resource> Default for FilteredListStore<R> {
    fn default() -> Self {
        Self {
            collection: Vec::new(),
            predicate: match_all(),
            view: Vec::new(),
        }
    }
}

impl<R: Resource> std::fmt::Debug for FilteredListStore<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilteredListStore")
            .field("collection", &self.collection.len())
            .field("view", &self.view.len())
            .finish()
    }
}

impl<R: Resource> FilteredListStore<R> {
    pub fn set_collection(&mut self, records: Vec<R>) {
        self.collection = records;
        self.recompute();
    }

    pub fn set_predicate(&mut self, predicate: Predicate<R>) {
        self.predicate = predicate;
        self.recompute();
    }

    pub fn collection(&self) -> &[R] {
        &self.collection
    }

    pub fn view(&self) -> impl Iterator<Item = &R> {
        self.view.iter().map(|&idx| &self.collection[idx])
    }

    pub fn view_len(&self) -> usize {
        self.view.len()
    }

    /// Record at `position` of the filtered view.
    pub fn view_get(&self, position: usize) -> Option<&R> {
        self.view
            .get(position)
            .and_then(|&idx| self.collection.get(idx))
    }

    pub fn get(&self, id: RecordId) -> Option<&R> {
        self.collection.iter().find(|record| record.id() == id)
    }

    /// Replaces the record with the same id in place. Returns `false` when
    /// no record matched, leaving the collection untouched.
    pub fn apply_update(&mut self, id: RecordId, record: R) -> bool {
        let Some(slot) = self.collection.iter_mut().find(|r| r.id() == id) else {
            tracing::warn!("update for id {id} which is not in the collection");
            return false;
        };
        *slot = record;
        self.recompute();
        true
    }

    pub fn apply_insert(&mut self, record: R) {
        self.collection.push(record);
        self.recompute();
    }

    /// Returns `false` when no record had that id.
    pub fn apply_delete(&mut self, id: RecordId) -> bool {
        let before = self.collection.len();
        self.collection.retain(|record| record.id() != id);
        let removed = self.collection.len() != before;
        if removed {
            self.recompute();
        }
        removed
    }

    fn recompute(&mut self) {
        let predicate = &self.predicate;
        self.view = self
            .collection
            .iter()
            .enumerate()
            .filter(|(_, record)| predicate(*record))
            .map(|(idx, _)| idx)
            .collect();
    }
}
