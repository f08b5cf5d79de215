use std::collections::HashSet;

use tracing::warn;

use crate::bookmark::key::{BookmarkKey, Selection};

/// Renders a selection as the short text shown in the starred list.
pub trait LabelSource {
    fn label_for(&self, selection: &Selection) -> String;
}

impl<F> LabelSource for F
where
    F: Fn(&Selection) -> String,
{
    fn label_for(&self, selection: &Selection) -> String {
        self(selection)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayEntry {
    pub label: String,
    pub key: BookmarkKey,
    pub selection: Selection,
}

/// Ordered label -> key mapping for the starred list. Labels are unique.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisplayMap {
    entries: Vec<DisplayEntry>,
}

impl DisplayMap {
    /// Undecodable keys are skipped. When two keys render the same label, every
    /// entry after the first gets the smallest free " (n)" suffix, n >= 2.
    pub fn build<L>(keys: &[BookmarkKey], labels: &L) -> Self
    where
        L: LabelSource + ?Sized,
    {
        let mut entries = Vec::with_capacity(keys.len());
        let mut used_labels: HashSet<String> = HashSet::new();
        let mut seen_keys: HashSet<&BookmarkKey> = HashSet::new();

        for key in keys {
            if !seen_keys.insert(key) {
                continue;
            }
            let selection = match key.decode() {
                Ok(selection) => selection,
                Err(err) => {
                    warn!(%key, %err, "skipping unreadable bookmark");
                    continue;
                }
            };

            let base = labels.label_for(&selection);
            let mut label = base.clone();
            let mut n = 2;
            while used_labels.contains(&label) {
                label = format!("{base} ({n})");
                n += 1;
            }
            used_labels.insert(label.clone());

            entries.push(DisplayEntry {
                label,
                key: key.clone(),
                selection,
            });
        }

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first(&self) -> Option<&DisplayEntry> {
        self.entries.first()
    }

    pub fn get(&self, index: usize) -> Option<&DisplayEntry> {
        self.entries.get(index)
    }

    pub fn find_label(&self, label: &str) -> Option<&DisplayEntry> {
        self.entries.iter().find(|e| e.label == label)
    }

    pub fn position(&self, key: &BookmarkKey) -> Option<usize> {
        self.entries.iter().position(|e| &e.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DisplayEntry> {
        self.entries.iter()
    }
}
