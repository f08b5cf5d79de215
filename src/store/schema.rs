use serde::{Deserialize, Serialize};

use crate::quiz::mastery::MasteryStore;

const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MasteryData {
    pub schema_version: u32,
    pub stats: MasteryStore,
}

impl Default for MasteryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            stats: MasteryStore::default(),
        }
    }
}

impl MasteryData {
    pub fn new(stats: MasteryStore) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            stats,
        }
    }

    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}
