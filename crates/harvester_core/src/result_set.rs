use std::collections::HashSet;
use std::num::NonZeroUsize;

use crate::{normalize_key, ItemRecord};

/// Outcome of offering a record to the [`ResultSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    Accepted,
    /// Identity key was missing or blank.
    MissingKey,
    Duplicate,
    CapReached,
}

impl Offer {
    pub fn is_accepted(self) -> bool {
        matches!(self, Offer::Accepted)
    }
}

/// Insertion-ordered, identity-keyed accumulator of accepted records.
///
/// `offer` is the only way in: keys are unique after normalization, the length never
/// exceeds the cap, and a key once present is never replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSet {
    cap: NonZeroUsize,
    keys: HashSet<String>,
    records: Vec<ItemRecord>,
}

impl ResultSet {
    pub fn new(cap: NonZeroUsize) -> Self {
        Self {
            cap,
            keys: HashSet::new(),
            records: Vec::new(),
        }
    }

    pub fn offer(&mut self, record: ItemRecord) -> Offer {
        let Some(key) = record.identity_key() else {
            return Offer::MissingKey;
        };
        if self.keys.contains(&key) {
            return Offer::Duplicate;
        }
        if self.is_full() {
            return Offer::CapReached;
        }
        self.keys.insert(key);
        self.records.push(record);
        Offer::Accepted
    }

    /// Whether a record titled `title` would be rejected as a duplicate.
    pub fn contains_title(&self, title: &str) -> bool {
        normalize_key(title).is_some_and(|key| self.keys.contains(&key))
    }

    pub fn cap(&self) -> NonZeroUsize {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.cap.get()
    }

    pub fn records(&self) -> &[ItemRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ItemRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a ItemRecord;
    type IntoIter = std::slice::Iter<'a, ItemRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
