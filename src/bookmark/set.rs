use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::bookmark::key::BookmarkKey;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookmarkError {
    #[error("bookmark {0} is not starred")]
    NotFound(BookmarkKey),
}

/// Starred tables, unique, in the order they were starred.
///
/// Serializes as a plain JSON array of key strings. Duplicates in the input
/// collapse to their first occurrence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BookmarkSet {
    keys: Vec<BookmarkKey>,
}

impl BookmarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &BookmarkKey) -> bool {
        self.keys.contains(key)
    }

    /// Returns false if the key was already present.
    pub fn add(&mut self, key: BookmarkKey) -> bool {
        if self.contains(&key) {
            return false;
        }
        self.keys.push(key);
        true
    }

    pub fn remove(&mut self, key: &BookmarkKey) -> Result<(), BookmarkError> {
        match self.keys.iter().position(|k| k == key) {
            Some(idx) => {
                self.keys.remove(idx);
                Ok(())
            }
            None => Err(BookmarkError::NotFound(key.clone())),
        }
    }

    pub fn keys(&self) -> &[BookmarkKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Order-insensitive comparison.
    pub fn same_members(&self, other: &BookmarkSet) -> bool {
        self.len() == other.len() && self.keys.iter().all(|k| other.contains(k))
    }
}

impl FromIterator<BookmarkKey> for BookmarkSet {
    fn from_iter<I: IntoIterator<Item = BookmarkKey>>(iter: I) -> Self {
        let mut set = BookmarkSet::new();
        for key in iter {
            set.add(key);
        }
        set
    }
}

impl<'de> Deserialize<'de> for BookmarkSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let keys = Vec::<BookmarkKey>::deserialize(deserializer)?;
        Ok(keys.into_iter().collect())
    }
}
