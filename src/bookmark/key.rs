use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Field separator inside a bookmark key. Never escaped: labels containing it
/// are rejected by `encode` and by the paradigm loader.
pub const SEPARATOR: char = ':';

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Noun,
    Adjective,
    Pronoun,
    Verb,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Noun,
        Category::Adjective,
        Category::Pronoun,
        Category::Verb,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Noun => "Noun",
            Category::Adjective => "Adjective",
            Category::Pronoun => "Pronoun",
            Category::Verb => "Verb",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }

    pub fn is_verb(self) -> bool {
        self == Category::Verb
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One voice/tense/mood combination of a verb.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerbSlice {
    pub voice: String,
    pub tense: String,
    pub mood: String,
}

impl VerbSlice {
    pub fn new(voice: &str, tense: &str, mood: &str) -> Self {
        Self {
            voice: voice.to_string(),
            tense: tense.to_string(),
            mood: mood.to_string(),
        }
    }
}

/// Exactly one displayable paradigm table.
///
/// The verb fields are `Some` only for `Category::Verb`. Use [`Selection::table`]
/// and [`Selection::verb`] to build values that always encode; the fields stay
/// public so the UI can hand over whatever it has and let `encode` reject it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Selection {
    pub category: Category,
    pub mode: String,
    pub voice: Option<String>,
    pub tense: Option<String>,
    pub mood: Option<String>,
}

impl Selection {
    pub fn table(category: Category, mode: &str) -> Self {
        Self {
            category,
            mode: mode.to_string(),
            voice: None,
            tense: None,
            mood: None,
        }
    }

    pub fn verb(mode: &str, slice: &VerbSlice) -> Self {
        Self {
            category: Category::Verb,
            mode: mode.to_string(),
            voice: Some(slice.voice.clone()),
            tense: Some(slice.tense.clone()),
            mood: Some(slice.mood.clone()),
        }
    }

    /// The verb slice, when all three verb fields are present.
    pub fn verb_slice(&self) -> Option<VerbSlice> {
        match (&self.voice, &self.tense, &self.mood) {
            (Some(voice), Some(tense), Some(mood)) => Some(VerbSlice {
                voice: voice.clone(),
                tense: tense.clone(),
                mood: mood.clone(),
            }),
            _ => None,
        }
    }
}

/// Canonical string form of a [`Selection`]. Serializes as a bare JSON string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookmarkKey(String);

impl BookmarkKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode back into the selection this key names.
    pub fn decode(&self) -> Result<Selection, KeyError> {
        decode(&self.0)
    }
}

impl fmt::Display for BookmarkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid selection: {0}")]
    InvalidSelection(String),
    #[error("malformed bookmark key {0:?}")]
    MalformedKey(String),
}

fn check_field(name: &str, value: &str) -> Result<(), KeyError> {
    if value.contains(SEPARATOR) {
        return Err(KeyError::InvalidSelection(format!(
            "{name} {value:?} contains the key separator '{SEPARATOR}'"
        )));
    }
    Ok(())
}

pub fn encode(selection: &Selection) -> Result<BookmarkKey, KeyError> {
    check_field("mode", &selection.mode)?;
    let category = selection.category;

    if category.is_verb() {
        let (Some(voice), Some(tense), Some(mood)) =
            (&selection.voice, &selection.tense, &selection.mood)
        else {
            return Err(KeyError::InvalidSelection(format!(
                "verb selection {:?} needs voice, tense and mood",
                selection.mode
            )));
        };
        check_field("voice", voice)?;
        check_field("tense", tense)?;
        check_field("mood", mood)?;
        Ok(BookmarkKey(format!(
            "{category}{SEPARATOR}{mode}{SEPARATOR}{voice}{SEPARATOR}{tense}{SEPARATOR}{mood}",
            mode = selection.mode
        )))
    } else {
        if selection.voice.is_some() || selection.tense.is_some() || selection.mood.is_some() {
            return Err(KeyError::InvalidSelection(format!(
                "{category} selection {:?} cannot carry voice, tense or mood",
                selection.mode
            )));
        }
        Ok(BookmarkKey(format!(
            "{category}{SEPARATOR}{mode}",
            mode = selection.mode
        )))
    }
}

pub fn decode(key: &str) -> Result<Selection, KeyError> {
    let malformed = || KeyError::MalformedKey(key.to_string());
    let fields: Vec<&str> = key.split(SEPARATOR).collect();

    match fields.as_slice() {
        [category, mode] => {
            let category = Category::from_name(category).ok_or_else(malformed)?;
            if category.is_verb() {
                return Err(malformed());
            }
            Ok(Selection::table(category, mode))
        }
        [category, mode, voice, tense, mood] if *category == Category::Verb.as_str() => {
            Ok(Selection::verb(mode, &VerbSlice::new(voice, tense, mood)))
        }
        _ => Err(malformed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lyo_present() -> Selection {
        Selection::verb(
            "Release (λύω)",
            &VerbSlice::new("Active", "Present", "Indicative"),
        )
    }

    #[test]
    fn test_encode_verb_selection() {
        let key = encode(&lyo_present()).unwrap();
        assert_eq!(key.as_str(), "Verb:Release (λύω):Active:Present:Indicative");
        assert_eq!(key.decode().unwrap(), lyo_present());
    }

    #[test]
    fn test_encode_table_selection() {
        let sel = Selection::table(Category::Noun, "First Declension (μουσα)");
        let key = encode(&sel).unwrap();
        assert_eq!(key.as_str(), "Noun:First Declension (μουσα)");
        assert_eq!(decode(key.as_str()).unwrap(), sel);
    }

    #[test]
    fn test_round_trip_every_category() {
        for category in [Category::Noun, Category::Adjective, Category::Pronoun] {
            let sel = Selection::table(category, "Article (ὁ, ἡ, τό)");
            assert_eq!(decode(encode(&sel).unwrap().as_str()).unwrap(), sel);
        }
        let sel = Selection::verb("To Be (εἰμί)", &VerbSlice::new("Active", "Imperfect", "Indicative"));
        assert_eq!(decode(encode(&sel).unwrap().as_str()).unwrap(), sel);
    }

    #[test]
    fn test_encode_verb_missing_fields_fails() {
        let mut sel = lyo_present();
        sel.mood = None;
        assert!(matches!(encode(&sel), Err(KeyError::InvalidSelection(_))));

        let mut sel = lyo_present();
        sel.voice = None;
        sel.tense = None;
        assert!(matches!(encode(&sel), Err(KeyError::InvalidSelection(_))));
    }

    #[test]
    fn test_encode_table_with_verb_fields_fails() {
        let mut sel = Selection::table(Category::Pronoun, "Intensive (αὐτός)");
        sel.tense = Some("Present".to_string());
        assert!(matches!(encode(&sel), Err(KeyError::InvalidSelection(_))));
    }

    #[test]
    fn test_encode_rejects_separator_in_fields() {
        let sel = Selection::table(Category::Noun, "Bad: label");
        assert!(matches!(encode(&sel), Err(KeyError::InvalidSelection(_))));

        let sel = Selection::verb("Release (λύω)", &VerbSlice::new("Active", "Pre:sent", "Indicative"));
        assert!(matches!(encode(&sel), Err(KeyError::InvalidSelection(_))));
    }

    #[test]
    fn test_decode_rejects_wrong_shapes() {
        for bad in [
            "",
            "Noun",
            "Noun:a:b",
            "Verb:Release (λύω)",
            "Noun:a:Active:Present:Indicative",
            "Verb:a:b:c:d:e",
            "Adverb:quickly",
        ] {
            assert_eq!(
                decode(bad),
                Err(KeyError::MalformedKey(bad.to_string())),
                "{bad:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_category_names_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_name(category.as_str()), Some(category));
        }
        assert_eq!(Category::from_name("noun"), None);
    }
}
