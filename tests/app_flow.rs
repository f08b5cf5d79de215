use std::fs;
use std::sync::Arc;

use klisis::app::{App, Focus, Tab};
use klisis::bookmark::key::{Category, Selection, VerbSlice, encode};
use klisis::config::{Config, Overrides};
use klisis::paradigm::database::ParadigmDb;
use klisis::store::json_store::JsonStore;
use klisis::ui::theme::Theme;
use tempfile::TempDir;

fn make_app(dir: &TempDir) -> App {
    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let theme: &'static Theme = Box::leak(Box::new(Theme::default()));
    App::new(
        ParadigmDb::embedded().unwrap(),
        Config::default(),
        theme,
        Some(Arc::new(store)),
    )
}

fn shown(app: &App) -> Option<Selection> {
    app.quiz.as_ref().map(|q| q.selection.clone())
}

fn lyo(voice: &str, tense: &str) -> Selection {
    Selection::verb("Release (λύω)", &VerbSlice::new(voice, tense, "Indicative"))
}

#[test]
fn starts_on_the_first_noun() {
    let dir = TempDir::new().unwrap();
    let app = make_app(&dir);
    assert_eq!(app.tab, Tab::Category(Category::Noun));
    assert_eq!(
        shown(&app),
        Some(Selection::table(Category::Noun, "First Declension (μουσα)"))
    );
    assert_eq!(app.tabs.last(), Some(&Tab::Starred));
}

#[test]
fn unstarring_the_last_starred_table_returns_to_the_regular_lists() {
    let dir = TempDir::new().unwrap();
    let mut app = make_app(&dir);

    app.select_tab(Tab::Category(Category::Verb));
    assert_eq!(shown(&app), Some(lyo("Active", "Present")));
    app.toggle_star().unwrap();
    assert_eq!(app.list_star_marks(), vec![true, false]);

    app.select_tab(Tab::Starred);
    assert!(app.stars.in_bookmark_mode());
    assert_eq!(app.list_items(), vec!["λύω - Present Active Indicative"]);
    assert_eq!(shown(&app), Some(lyo("Active", "Present")));

    app.toggle_star().unwrap();
    assert!(!app.stars.in_bookmark_mode());
    assert_eq!(app.tab, Tab::Category(Category::Noun));
    assert_eq!(app.list_selected, 0);
    assert_eq!(
        shown(&app),
        Some(Selection::table(Category::Noun, "First Declension (μουσα)"))
    );
}

#[test]
fn unstarring_one_of_several_moves_to_the_first_remaining() {
    let dir = TempDir::new().unwrap();
    let mut app = make_app(&dir);

    app.toggle_star().unwrap();
    app.next_table();
    app.toggle_star().unwrap();

    app.select_tab(Tab::Starred);
    app.list_move(true);
    app.list_activate();
    assert_eq!(app.focus, Focus::Table);
    assert_eq!(
        shown(&app),
        Some(Selection::table(Category::Noun, "First Declension (τιμη)"))
    );

    app.toggle_star().unwrap();
    assert!(app.stars.in_bookmark_mode());
    assert_eq!(app.tab, Tab::Starred);
    assert_eq!(app.list_items(), vec!["First Declension (μουσα)"]);
    assert_eq!(
        shown(&app),
        Some(Selection::table(Category::Noun, "First Declension (μουσα)"))
    );
}

#[test]
fn next_table_walks_modes_and_verb_tenses() {
    let dir = TempDir::new().unwrap();
    let mut app = make_app(&dir);

    app.next_table();
    assert_eq!(app.list_selected, 1);
    assert_eq!(
        shown(&app),
        Some(Selection::table(Category::Noun, "First Declension (τιμη)"))
    );

    app.select_tab(Tab::Category(Category::Verb));
    app.next_table();
    assert_eq!(shown(&app), Some(lyo("Middle", "Present")));
    app.cycle_verb_slice(false);
    assert_eq!(shown(&app), Some(lyo("Active", "Present")));
}

#[test]
fn checking_a_table_records_progress_on_disk() {
    let dir = TempDir::new().unwrap();
    let mut app = make_app(&dir);
    app.list_activate();
    fill_correctly(&mut app);
    app.check_all().unwrap();
    assert_eq!(app.last_score, Some(1.0));

    let key = encode(&Selection::table(Category::Noun, "First Declension (μουσα)")).unwrap();
    let saved = JsonStore::with_base_dir(dir.path().to_path_buf())
        .unwrap()
        .load_mastery();
    let stats = saved.stats.get(&key).unwrap();
    assert_eq!(stats.attempts, 1);
    assert_eq!(stats.correct_attempts, 1);
    assert!(!stats.mastered);
}

fn fill_correctly(app: &mut App) {
    let quiz = app.quiz.as_mut().unwrap();
    for _ in 0..quiz.len() {
        let expected = quiz.cursor().unwrap().expected.clone();
        for ch in expected.chars() {
            quiz.type_char(ch);
        }
        quiz.next_cell();
    }
}

#[test]
fn checking_the_same_table_again_counts_once() {
    let dir = TempDir::new().unwrap();
    let mut app = make_app(&dir);
    fill_correctly(&mut app);
    for _ in 0..3 {
        app.check_all().unwrap();
    }
    let key = encode(&Selection::table(Category::Noun, "First Declension (μουσα)")).unwrap();
    let stats = app.mastery.get(&key).unwrap();
    assert_eq!(stats.attempts, 1);
    assert!(!stats.mastered);
    assert_eq!(app.session.attempts, 1);
    assert_eq!(app.last_score, Some(1.0));

    // A cleared table is a fresh attempt.
    app.reset_table();
    fill_correctly(&mut app);
    app.check_all().unwrap();
    assert_eq!(app.mastery.get(&key).unwrap().attempts, 2);
    assert_eq!(app.session.tables_practiced(), 1);
}

#[test]
fn command_line_overrides_are_not_saved_with_settings() {
    let dir = TempDir::new().unwrap();
    let config_file = dir.path().join("config").join("config.toml");
    let overrides = Overrides {
        data_dir: Some("/tmp/one-off-session-dir".to_string()),
        randomize_next: true,
        ..Overrides::default()
    };
    let mut app = make_app(&dir)
        .with_config_file(config_file.clone())
        .with_overrides(&overrides);
    assert!(app.config.randomize_next);

    app.go_to_settings();
    app.settings_selected = 1;
    app.settings_cycle(true);
    app.leave_settings();

    let saved = Config::load_from(&config_file).unwrap();
    assert!(saved.strict_accents);
    assert!(!saved.randomize_next);
    assert_eq!(saved.data_dir, Config::default().data_dir);
    assert_eq!(app.config.data_dir, "/tmp/one-off-session-dir");
    assert!(app.config.randomize_next);
}

#[test]
fn starred_table_missing_from_the_paradigms_shows_nothing() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("bookmarks.json"),
        r#"["Noun:Fourth Declension (ἰχθυς)"]"#,
    )
    .unwrap();
    let mut app = make_app(&dir);

    app.select_tab(Tab::Starred);
    assert_eq!(app.list_items(), vec!["Fourth Declension (ἰχθυς)"]);
    assert!(app.quiz.is_none());
    assert!(app.notice().is_some());
}

#[test]
fn runs_without_a_data_directory() {
    let theme: &'static Theme = Box::leak(Box::new(Theme::default()));
    let mut app = App::new(ParadigmDb::embedded().unwrap(), Config::default(), theme, None);
    app.toggle_star().unwrap();
    assert!(app.stars.current_is_starred());
    app.check_all().unwrap();
    app.quit();
    assert!(app.should_quit);
}
