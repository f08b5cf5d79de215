use criterion::{Criterion, black_box, criterion_group, criterion_main};

use klisis::bookmark::key::{BookmarkKey, Category, Selection, VerbSlice, decode, encode};
use klisis::bookmark::label::DisplayMap;
use klisis::paradigm::database::ParadigmDb;
use klisis::quiz::answer::answers_match;

const VOICES: [&str; 3] = ["Active", "Middle", "Passive"];
const TENSES: [&str; 6] = ["Present", "Imperfect", "Future", "Aorist", "Perfect", "Pluperfect"];
const MOODS: [&str; 4] = ["Indicative", "Subjunctive", "Optative", "Imperative"];

/// Every slice of `verbs` made-up verbs plus as many noun tables.
fn make_selections(verbs: usize) -> Vec<Selection> {
    let mut out = Vec::new();
    for v in 0..verbs {
        let mode = format!("Verb {v} (λύω)");
        for voice in VOICES {
            for tense in TENSES {
                for mood in MOODS {
                    out.push(Selection::verb(&mode, &VerbSlice::new(voice, tense, mood)));
                }
            }
        }
        out.push(Selection::table(Category::Noun, &format!("Declension {v} (λογος)")));
    }
    out
}

fn bench_codec(c: &mut Criterion) {
    let selections = make_selections(10);
    let keys: Vec<BookmarkKey> = selections.iter().map(|s| encode(s).unwrap()).collect();

    c.bench_function(&format!("encode ({} selections)", selections.len()), |b| {
        b.iter(|| {
            for s in &selections {
                black_box(encode(black_box(s)).unwrap());
            }
        })
    });

    c.bench_function(&format!("decode ({} keys)", keys.len()), |b| {
        b.iter(|| {
            for k in &keys {
                black_box(decode(black_box(k.as_str())).unwrap());
            }
        })
    });
}

fn bench_display_map(c: &mut Criterion) {
    let keys: Vec<BookmarkKey> = make_selections(10)
        .iter()
        .map(|s| encode(s).unwrap())
        .collect();
    let db = ParadigmDb::embedded().unwrap();

    c.bench_function(&format!("DisplayMap::build ({} keys)", keys.len()), |b| {
        b.iter(|| DisplayMap::build(black_box(&keys), &db))
    });

    // Every key renders the same label: worst case for suffix probing.
    let same = |_: &Selection| "Release (λύω)".to_string();
    let few: Vec<BookmarkKey> = keys.iter().take(200).cloned().collect();
    c.bench_function("DisplayMap::build (200 colliding labels)", |b| {
        b.iter(|| DisplayMap::build(black_box(&few), &same))
    });
}

fn bench_answers(c: &mut Criterion) {
    let pairs = [
        ("λυομεθα", "λυόμεθα"),
        ("ἐλυσαμεν", "ἐλύσαμεν"),
        ("τιμῃ", "τιμῇ"),
        ("ΛΟΓΟΣ", "λόγος"),
    ];
    c.bench_function("answers_match (accent-insensitive)", |b| {
        b.iter(|| {
            for (input, expected) in &pairs {
                black_box(answers_match(black_box(input), black_box(expected), false));
            }
        })
    });
}

criterion_group!(benches, bench_codec, bench_display_map, bench_answers);
criterion_main!(benches);
