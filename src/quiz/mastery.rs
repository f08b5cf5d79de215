use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::bookmark::key::BookmarkKey;

/// Accuracy at or above which a checked table counts as a correct attempt.
const CORRECT_ACCURACY: f64 = 0.9;
const MASTERY_RATE: f64 = 0.9;
const MASTERY_MIN_CORRECT: u32 = 3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableMastery {
    pub attempts: u32,
    pub correct_attempts: u32,
    pub success_rate: f64,
    pub last_practiced: DateTime<Utc>,
    pub mastered: bool,
    pub mastered_at: Option<DateTime<Utc>>,
}

impl TableMastery {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            attempts: 0,
            correct_attempts: 0,
            success_rate: 0.0,
            last_practiced: now,
            mastered: false,
            mastered_at: None,
        }
    }
}

/// Per-table practice history, keyed by the same key used for bookmarks.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MasteryStore {
    #[serde(default)]
    pub tables: BTreeMap<BookmarkKey, TableMastery>,
}

impl MasteryStore {
    /// `accuracy` is the fraction of cells answered correctly, 0.0..=1.0.
    pub fn record_attempt(
        &mut self,
        key: &BookmarkKey,
        accuracy: f64,
        now: DateTime<Utc>,
    ) -> &TableMastery {
        let entry = self
            .tables
            .entry(key.clone())
            .or_insert_with(|| TableMastery::new(now));

        entry.attempts += 1;
        if accuracy >= CORRECT_ACCURACY {
            entry.correct_attempts += 1;
        }
        entry.success_rate = entry.correct_attempts as f64 / entry.attempts as f64;
        entry.last_practiced = now;

        let mastered =
            entry.success_rate >= MASTERY_RATE && entry.correct_attempts >= MASTERY_MIN_CORRECT;
        if mastered && !entry.mastered {
            entry.mastered_at = Some(now);
        }
        entry.mastered = mastered;
        entry
    }

    pub fn get(&self, key: &BookmarkKey) -> Option<&TableMastery> {
        self.tables.get(key)
    }

    pub fn mastered_count(&self) -> usize {
        self.tables.values().filter(|t| t.mastered).count()
    }

    /// Attempted tables whose success rate is below `threshold`, weakest first.
    pub fn weak_tables(&self, threshold: f64, limit: usize) -> Vec<(&BookmarkKey, &TableMastery)> {
        let mut weak: Vec<_> = self
            .tables
            .iter()
            .filter(|(_, t)| t.success_rate < threshold)
            .collect();
        weak.sort_by(|a, b| a.1.success_rate.total_cmp(&b.1.success_rate));
        weak.truncate(limit);
        weak
    }

    /// Mean success rate over every attempted table; 0.0 before any attempt.
    pub fn average_success_rate(&self) -> f64 {
        if self.tables.is_empty() {
            return 0.0;
        }
        self.tables.values().map(|t| t.success_rate).sum::<f64>() / self.tables.len() as f64
    }

    /// Keys from `all_keys` never attempted, in the given order.
    pub fn untested_tables<'k>(
        &self,
        all_keys: &'k [BookmarkKey],
        limit: usize,
    ) -> Vec<&'k BookmarkKey> {
        all_keys
            .iter()
            .filter(|k| !self.tables.contains_key(*k))
            .take(limit)
            .collect()
    }

    /// Tables last practiced more than `days` ago, oldest first.
    pub fn due_for_review(
        &self,
        now: DateTime<Utc>,
        days: i64,
        limit: usize,
    ) -> Vec<(&BookmarkKey, &TableMastery)> {
        let cutoff = now - Duration::days(days);
        let mut due: Vec<_> = self
            .tables
            .iter()
            .filter(|(_, t)| t.last_practiced < cutoff)
            .collect();
        due.sort_by_key(|(_, t)| t.last_practiced);
        due.truncate(limit);
        due
    }
}

/// Totals for the current run only; never saved.
#[derive(Clone, Debug)]
pub struct SessionStats {
    pub started: DateTime<Utc>,
    pub attempts: u32,
    pub correct_attempts: u32,
    tables: BTreeSet<BookmarkKey>,
}

impl SessionStats {
    pub fn new(started: DateTime<Utc>) -> Self {
        Self {
            started,
            attempts: 0,
            correct_attempts: 0,
            tables: BTreeSet::new(),
        }
    }

    pub fn record(&mut self, key: &BookmarkKey, accuracy: f64) {
        self.attempts += 1;
        if accuracy >= CORRECT_ACCURACY {
            self.correct_attempts += 1;
        }
        self.tables.insert(key.clone());
    }

    pub fn tables_practiced(&self) -> usize {
        self.tables.len()
    }

    pub fn accuracy(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        self.correct_attempts as f64 / self.attempts as f64
    }

    pub fn duration(&self, now: DateTime<Utc>) -> Duration {
        (now - self.started).max(Duration::zero())
    }
}
