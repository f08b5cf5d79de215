use rand::Rng;
use rand::seq::SliceRandom;

use crate::bookmark::key::Selection;
use crate::paradigm::database::ParadigmDb;

/// The table after `current`: the next mode of a declension category, or for
/// verbs the next voice/tense/mood and then the next verb. Wraps around.
pub fn next_selection(db: &ParadigmDb, current: &Selection) -> Option<Selection> {
    if current.category.is_verb() {
        if let Some(next) = step_verb_slice(db, current, true)
            .filter(|_| !is_last_slice(db, current))
        {
            return Some(next);
        }
        let modes = db.modes(current.category);
        let next_mode = next_in(&modes, current.mode.as_str())?;
        let slice = db.verb_slices(next_mode).into_iter().next()?;
        return Some(Selection::verb(next_mode, &slice));
    }

    let modes = db.modes(current.category);
    let next_mode = next_in(&modes, current.mode.as_str())?;
    Some(Selection::table(current.category, next_mode))
}

fn next_in<'a>(items: &[&'a str], current: &str) -> Option<&'a str> {
    if items.is_empty() {
        return None;
    }
    let next = items
        .iter()
        .position(|m| *m == current)
        .map_or(0, |idx| (idx + 1) % items.len());
    Some(items[next])
}

fn is_last_slice(db: &ParadigmDb, current: &Selection) -> bool {
    let slices = db.verb_slices(&current.mode);
    current
        .verb_slice()
        .is_some_and(|slice| slices.last() == Some(&slice))
}

/// Cycle through the voice/tense/mood tables of the current verb.
pub fn step_verb_slice(db: &ParadigmDb, current: &Selection, forward: bool) -> Option<Selection> {
    if !current.category.is_verb() {
        return None;
    }
    let slices = db.verb_slices(&current.mode);
    if slices.is_empty() {
        return None;
    }
    let len = slices.len();
    let idx = current
        .verb_slice()
        .and_then(|slice| slices.iter().position(|s| *s == slice));
    let next = match (idx, forward) {
        (Some(i), true) => (i + 1) % len,
        (Some(i), false) => (i + len - 1) % len,
        (None, _) => 0,
    };
    Some(Selection::verb(&current.mode, &slices[next]))
}

/// A uniformly random category, then mode, then (for verbs) slice.
pub fn random_selection<R: Rng + ?Sized>(db: &ParadigmDb, rng: &mut R) -> Option<Selection> {
    let category = *db.categories().choose(rng)?;
    let modes = db.modes(category);
    let mode = *modes.choose(rng)?;
    if category.is_verb() {
        let slices = db.verb_slices(mode);
        let slice = slices.choose(rng)?;
        Some(Selection::verb(mode, slice))
    } else {
        Some(Selection::table(category, mode))
    }
}
