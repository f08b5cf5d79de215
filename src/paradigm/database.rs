use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use rust_embed::Embed;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::bookmark::key::{Category, SEPARATOR, Selection, VerbSlice};
use crate::bookmark::label::LabelSource;
use crate::paradigm::grid::Grid;

#[derive(Embed)]
#[folder = "assets/paradigms/"]
struct ParadigmAssets;

const EMBEDDED_FILE: &str = "paradigms.json";

const MOOD_ORDER: &[&str] = &[
    "Indicative",
    "Subjunctive",
    "Optative",
    "Imperative",
    "Infinitive",
    "Participle",
];
const TENSE_ORDER: &[&str] = &[
    "Present",
    "Imperfect",
    "Future",
    "Aorist",
    "Perfect",
    "Pluperfect",
];
const VOICE_ORDER: &[&str] = &["Active", "Middle", "Passive"];

#[derive(Debug, Error)]
pub enum ParadigmError {
    #[error("bundled paradigm data is missing")]
    MissingEmbedded,
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing paradigm data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{what} {value:?} contains the bookmark key separator")]
    SeparatorInLabel { what: &'static str, value: String },
    #[error("{category} mode {mode:?} is listed twice")]
    DuplicateMode { category: Category, mode: String },
    #[error("verb {mode:?} lists {voice} {tense} {mood} twice")]
    DuplicateSlice {
        mode: String,
        voice: String,
        tense: String,
        mood: String,
    },
    #[error("{mode:?} row {row:?} has {found} forms for {expected} columns")]
    RaggedRow {
        mode: String,
        row: String,
        expected: usize,
        found: usize,
    },
    #[error("verb {0:?} has no voice/tense/mood tables")]
    EmptyVerb(String),
    #[error("{0:?} is listed under tables but verbs belong under \"verbs\"")]
    VerbInTables(String),
    #[error("paradigm data has no noun, adjective or pronoun tables")]
    NoTables,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TableEntry {
    pub category: Category,
    pub mode: String,
    pub lemma: String,
    #[serde(flatten)]
    pub grid: Grid,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SliceEntry {
    #[serde(flatten)]
    pub slice: VerbSlice,
    #[serde(flatten)]
    pub grid: Grid,
}

#[derive(Clone, Debug, Deserialize)]
pub struct VerbEntry {
    pub mode: String,
    pub lemma: String,
    pub slices: Vec<SliceEntry>,
}

#[derive(Deserialize)]
struct ParadigmFile {
    #[serde(default)]
    tables: Vec<TableEntry>,
    #[serde(default)]
    verbs: Vec<VerbEntry>,
}

/// Reference forms for every quizzable table, in file order.
#[derive(Clone, Debug)]
pub struct ParadigmDb {
    tables: Vec<TableEntry>,
    verbs: Vec<VerbEntry>,
}

fn order_of(order: &[&str], value: &str) -> usize {
    order.iter().position(|v| *v == value).unwrap_or(order.len())
}

fn check_label(what: &'static str, value: &str) -> Result<(), ParadigmError> {
    if value.contains(SEPARATOR) {
        return Err(ParadigmError::SeparatorInLabel {
            what,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn check_grid(mode: &str, grid: &Grid) -> Result<(), ParadigmError> {
    for row in &grid.rows {
        if row.forms.len() != grid.columns.len() {
            return Err(ParadigmError::RaggedRow {
                mode: mode.to_string(),
                row: row.label.clone(),
                expected: grid.columns.len(),
                found: row.forms.len(),
            });
        }
    }
    Ok(())
}

impl ParadigmDb {
    pub fn embedded() -> Result<Self, ParadigmError> {
        let file = ParadigmAssets::get(EMBEDDED_FILE).ok_or(ParadigmError::MissingEmbedded)?;
        let json = std::str::from_utf8(file.data.as_ref())
            .map_err(|_| ParadigmError::MissingEmbedded)?;
        Self::from_json(json)
    }

    pub fn from_path(path: &Path) -> Result<Self, ParadigmError> {
        let json = fs::read_to_string(path).map_err(|source| ParadigmError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self::from_json(&json)?;
        info!(path = %path.display(), "loaded paradigm file");
        Ok(db)
    }

    pub fn from_json(json: &str) -> Result<Self, ParadigmError> {
        let file: ParadigmFile = serde_json::from_str(json)?;
        let db = Self {
            tables: file.tables,
            verbs: file.verbs,
        };
        db.validate()?;
        Ok(db)
    }

    fn validate(&self) -> Result<(), ParadigmError> {
        let mut modes: HashSet<(Category, &str)> = HashSet::new();

        for table in &self.tables {
            if table.category.is_verb() {
                return Err(ParadigmError::VerbInTables(table.mode.clone()));
            }
            check_label("mode", &table.mode)?;
            if !modes.insert((table.category, table.mode.as_str())) {
                return Err(ParadigmError::DuplicateMode {
                    category: table.category,
                    mode: table.mode.clone(),
                });
            }
            check_grid(&table.mode, &table.grid)?;
        }
        if self.tables.is_empty() {
            return Err(ParadigmError::NoTables);
        }

        for verb in &self.verbs {
            check_label("mode", &verb.mode)?;
            if !modes.insert((Category::Verb, verb.mode.as_str())) {
                return Err(ParadigmError::DuplicateMode {
                    category: Category::Verb,
                    mode: verb.mode.clone(),
                });
            }
            if verb.slices.is_empty() {
                return Err(ParadigmError::EmptyVerb(verb.mode.clone()));
            }
            let mut slices: HashSet<&VerbSlice> = HashSet::new();
            for entry in &verb.slices {
                let VerbSlice { voice, tense, mood } = &entry.slice;
                check_label("voice", voice)?;
                check_label("tense", tense)?;
                check_label("mood", mood)?;
                if !slices.insert(&entry.slice) {
                    return Err(ParadigmError::DuplicateSlice {
                        mode: verb.mode.clone(),
                        voice: voice.clone(),
                        tense: tense.clone(),
                        mood: mood.clone(),
                    });
                }
                check_grid(&verb.mode, &entry.grid)?;
            }
        }
        Ok(())
    }

    /// Categories that have at least one mode, in display order.
    pub fn categories(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| !self.modes(*c).is_empty())
            .collect()
    }

    pub fn modes(&self, category: Category) -> Vec<&str> {
        if category.is_verb() {
            self.verbs.iter().map(|v| v.mode.as_str()).collect()
        } else {
            self.tables
                .iter()
                .filter(|t| t.category == category)
                .map(|t| t.mode.as_str())
                .collect()
        }
    }

    /// Every voice/tense/mood the verb has a table for, by mood, then tense, then voice.
    pub fn verb_slices(&self, mode: &str) -> Vec<VerbSlice> {
        let Some(verb) = self.verb(mode) else {
            return Vec::new();
        };
        let mut slices: Vec<VerbSlice> = verb.slices.iter().map(|s| s.slice.clone()).collect();
        slices.sort_by(|a, b| {
            (
                order_of(MOOD_ORDER, &a.mood),
                order_of(TENSE_ORDER, &a.tense),
                order_of(VOICE_ORDER, &a.voice),
            )
                .cmp(&(
                    order_of(MOOD_ORDER, &b.mood),
                    order_of(TENSE_ORDER, &b.tense),
                    order_of(VOICE_ORDER, &b.voice),
                ))
        });
        slices
    }

    fn verb(&self, mode: &str) -> Option<&VerbEntry> {
        self.verbs.iter().find(|v| v.mode == mode)
    }

    fn table(&self, category: Category, mode: &str) -> Option<&TableEntry> {
        self.tables
            .iter()
            .find(|t| t.category == category && t.mode == mode)
    }

    pub fn lemma(&self, selection: &Selection) -> Option<&str> {
        if selection.category.is_verb() {
            self.verb(&selection.mode).map(|v| v.lemma.as_str())
        } else {
            self.table(selection.category, &selection.mode)
                .map(|t| t.lemma.as_str())
        }
    }

    pub fn grid(&self, selection: &Selection) -> Option<&Grid> {
        if selection.category.is_verb() {
            let slice = selection.verb_slice()?;
            self.verb(&selection.mode)?
                .slices
                .iter()
                .find(|s| s.slice == slice)
                .map(|s| &s.grid)
        } else {
            self.table(selection.category, &selection.mode)
                .map(|t| &t.grid)
        }
    }

    /// First mode of the first non-verb category. Validation guarantees one exists.
    pub fn default_selection(&self) -> Selection {
        Category::ALL
            .into_iter()
            .filter(|c| !c.is_verb())
            .find_map(|c| self.first_selection(c))
            .unwrap_or_else(|| Selection::table(Category::Noun, ""))
    }

    pub fn first_selection(&self, category: Category) -> Option<Selection> {
        let mode = *self.modes(category).first()?;
        if category.is_verb() {
            let slice = self.verb_slices(mode).into_iter().next()?;
            Some(Selection::verb(mode, &slice))
        } else {
            Some(Selection::table(category, mode))
        }
    }

    /// Every quizzable table in display order, verb tables slice by slice.
    pub fn all_selections(&self) -> Vec<Selection> {
        let mut out = Vec::new();
        for category in self.categories() {
            for mode in self.modes(category) {
                if category.is_verb() {
                    out.extend(
                        self.verb_slices(mode)
                            .iter()
                            .map(|slice| Selection::verb(mode, slice)),
                    );
                } else {
                    out.push(Selection::table(category, mode));
                }
            }
        }
        out
    }
}

impl LabelSource for ParadigmDb {
    fn label_for(&self, selection: &Selection) -> String {
        match (selection.verb_slice(), self.lemma(selection)) {
            (Some(slice), Some(lemma)) if selection.category.is_verb() => format!(
                "{lemma} - {} {} {}",
                slice.tense, slice.voice, slice.mood
            ),
            (Some(slice), None) => format!(
                "{} - {} {} {}",
                selection.mode, slice.tense, slice.voice, slice.mood
            ),
            _ => selection.mode.clone(),
        }
    }
}
