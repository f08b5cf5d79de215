use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info, warn};

use crate::bookmark::controller::StarController;
use crate::bookmark::key::{Category, KeyError, Selection, encode};
use crate::bookmark::set::BookmarkSet;
use crate::config::{Config, Overrides};
use crate::paradigm::database::ParadigmDb;
use crate::quiz::mastery::{MasteryStore, SessionStats};
use crate::quiz::navigation::{next_selection, random_selection, step_verb_slice};
use crate::quiz::table::QuizTable;
use crate::store::json_store::JsonStore;
use crate::store::schema::MasteryData;
use crate::ui::theme::Theme;

const NOTICE_TTL: Duration = Duration::from_secs(4);
pub const SETTINGS_COUNT: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Quiz,
    Mastery,
    Settings,
    Help,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    List,
    Table,
}

/// One tab of the left-hand list: a paradigm category or the starred tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    Category(Category),
    Starred,
}

impl Tab {
    pub fn title(self) -> &'static str {
        match self {
            Tab::Category(Category::Noun) => "Nouns",
            Tab::Category(Category::Adjective) => "Adjectives",
            Tab::Category(Category::Pronoun) => "Pronouns",
            Tab::Category(Category::Verb) => "Verbs",
            Tab::Starred => "Starred",
        }
    }
}

pub struct App {
    pub screen: AppScreen,
    pub focus: Focus,
    pub tab: Tab,
    pub tabs: Vec<Tab>,
    pub list_selected: usize,
    pub quiz: Option<QuizTable>,
    pub last_score: Option<f64>,
    pub db: ParadigmDb,
    pub stars: StarController,
    pub mastery: MasteryStore,
    pub session: SessionStats,
    /// Settings in effect, including command-line overrides.
    pub config: Config,
    pub theme: &'static Theme,
    pub settings_selected: usize,
    pub should_quit: bool,
    store: Option<Arc<JsonStore>>,
    /// Settings as read from the config file; only this is written back.
    saved_config: Config,
    config_file: PathBuf,
    notice: Option<(String, Instant)>,
    rng: SmallRng,
}

impl App {
    /// Without a store the session runs in memory and nothing is saved.
    pub fn new(
        db: ParadigmDb,
        config: Config,
        theme: &'static Theme,
        store: Option<Arc<JsonStore>>,
    ) -> Self {
        let (bookmarks, mastery) = match &store {
            Some(s) => (s.load_bookmarks(), s.load_mastery().stats),
            None => (BookmarkSet::new(), MasteryStore::default()),
        };
        info!(
            starred = bookmarks.len(),
            practiced = mastery.tables.len(),
            "loaded saved data"
        );

        let fallback = db.default_selection();
        let stars = StarController::new(bookmarks, store.clone(), fallback.clone());

        let mut tabs: Vec<Tab> = db.categories().into_iter().map(Tab::Category).collect();
        tabs.push(Tab::Starred);

        let mut app = Self {
            screen: AppScreen::Quiz,
            focus: Focus::List,
            tab: Tab::Category(fallback.category),
            tabs,
            list_selected: 0,
            quiz: None,
            last_score: None,
            db,
            stars,
            mastery,
            session: SessionStats::new(Utc::now()),
            saved_config: config.clone(),
            config,
            config_file: Config::config_path(),
            theme,
            settings_selected: 0,
            should_quit: false,
            store,
            notice: None,
            rng: SmallRng::from_entropy(),
        };
        app.open(fallback);
        app
    }

    /// Apply command-line settings for this run without saving them.
    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        self.config = self.saved_config.with_overrides(overrides);
        self
    }

    pub fn with_config_file(mut self, path: PathBuf) -> Self {
        self.config_file = path;
        self
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_ref().map(|(text, _)| text.as_str())
    }

    pub fn set_notice(&mut self, text: impl Into<String>) {
        self.notice = Some((text.into(), Instant::now()));
    }

    pub fn tick(&mut self) {
        if let Some(text) = self.stars.take_notice() {
            self.set_notice(text);
        }
        if self
            .notice
            .as_ref()
            .is_some_and(|(_, at)| at.elapsed() > NOTICE_TTL)
        {
            self.notice = None;
        }
    }

    /// Labels of the entries in the current tab.
    pub fn list_items(&self) -> Vec<String> {
        match self.tab {
            Tab::Starred => self
                .stars
                .display_map()
                .iter()
                .map(|e| e.label.clone())
                .collect(),
            Tab::Category(category) => self
                .db
                .modes(category)
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    /// Whether each entry of the current tab is starred, parallel to `list_items`.
    pub fn list_star_marks(&self) -> Vec<bool> {
        match self.tab {
            Tab::Starred => vec![true; self.stars.display_map().len()],
            Tab::Category(category) if category.is_verb() => self
                .db
                .modes(category)
                .into_iter()
                .map(|mode| {
                    self.db
                        .verb_slices(mode)
                        .iter()
                        .any(|slice| self.stars.is_starred(&Selection::verb(mode, slice)))
                })
                .collect(),
            Tab::Category(category) => self
                .db
                .modes(category)
                .into_iter()
                .map(|mode| self.stars.is_starred(&Selection::table(category, mode)))
                .collect(),
        }
    }

    /// Show a table reached through the regular lists.
    pub fn open(&mut self, selection: Selection) {
        self.stars.show(selection.clone());
        self.load_quiz(selection);
    }

    fn load_quiz(&mut self, selection: Selection) {
        self.last_score = None;
        match self.db.grid(&selection) {
            Some(grid) => {
                debug!(?selection, "opening table");
                self.quiz = Some(QuizTable::new(selection, grid, self.config.strict_accents));
            }
            None => {
                // A starred table the current paradigm file no longer has.
                warn!(?selection, "no table for selection");
                self.quiz = None;
                self.set_notice(format!("No table for {}", selection.mode));
            }
        }
    }

    fn sync_list_to(&mut self, selection: &Selection) {
        if self.tab == Tab::Starred {
            self.list_selected = self.stars.current_index().unwrap_or(0);
            return;
        }
        self.tab = Tab::Category(selection.category);
        self.list_selected = self
            .db
            .modes(selection.category)
            .iter()
            .position(|m| *m == selection.mode)
            .unwrap_or(0);
    }

    pub fn switch_tab(&mut self, forward: bool) {
        let len = self.tabs.len();
        let idx = self.tabs.iter().position(|t| *t == self.tab).unwrap_or(0);
        let next = if forward {
            (idx + 1) % len
        } else {
            (idx + len - 1) % len
        };
        self.select_tab(self.tabs[next]);
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.list_selected = 0;
        match tab {
            Tab::Starred => match self.stars.enter_bookmarks(&self.db) {
                Some(selection) => self.load_quiz(selection),
                None => {
                    self.quiz = None;
                    self.last_score = None;
                }
            },
            Tab::Category(category) => {
                if let Some(selection) = self.db.first_selection(category) {
                    self.open(selection);
                }
            }
        }
    }

    pub fn list_move(&mut self, down: bool) {
        let len = self.list_items().len();
        if len == 0 {
            return;
        }
        self.list_selected = if down {
            (self.list_selected + 1) % len
        } else {
            (self.list_selected + len - 1) % len
        };
    }

    /// Open the highlighted entry and move focus to the table.
    pub fn list_activate(&mut self) {
        match self.tab {
            Tab::Starred => {
                if let Some(selection) = self.stars.pick_index(self.list_selected) {
                    self.load_quiz(selection);
                }
            }
            Tab::Category(category) => {
                let modes = self.db.modes(category);
                let Some(mode) = modes.get(self.list_selected).map(|m| m.to_string()) else {
                    return;
                };
                let selection = if category.is_verb() {
                    match self.db.verb_slices(&mode).into_iter().next() {
                        Some(slice) => Selection::verb(&mode, &slice),
                        None => return,
                    }
                } else {
                    Selection::table(category, &mode)
                };
                self.open(selection);
            }
        }
        if self.quiz.is_some() {
            self.focus = Focus::Table;
        }
    }

    /// Step through the voice/tense/mood tables of the verb on screen.
    pub fn cycle_verb_slice(&mut self, forward: bool) {
        if self.stars.in_bookmark_mode() {
            return;
        }
        let Some(current) = self.stars.current_selection() else {
            return;
        };
        if let Some(selection) = step_verb_slice(&self.db, &current, forward) {
            self.open(selection);
        }
    }

    pub fn next_table(&mut self) {
        if self.stars.in_bookmark_mode() {
            if let Some(selection) = self.stars.next_bookmark() {
                self.load_quiz(selection);
                self.list_selected = self.stars.current_index().unwrap_or(0);
            }
            return;
        }

        let next = if self.config.randomize_next {
            random_selection(&self.db, &mut self.rng)
        } else {
            self.stars
                .current_selection()
                .and_then(|current| next_selection(&self.db, &current))
        };
        if let Some(selection) = next {
            self.sync_list_to(&selection);
            self.open(selection);
        }
    }

    /// Star the table on screen, or unstar it when it already is.
    pub fn toggle_star(&mut self) -> Result<(), KeyError> {
        if !self.stars.current_is_starred() {
            if self.stars.star()? {
                self.set_notice("Starred");
            }
        } else if let Some(selection) = self.stars.unstar(&self.db)? {
            if !self.stars.in_bookmark_mode() {
                // The last starred table is gone; back to the regular lists.
                self.tab = Tab::Category(selection.category);
            }
            self.sync_list_to(&selection);
            self.load_quiz(selection);
        } else {
            self.set_notice("Unstarred");
        }

        if let Some(text) = self.stars.take_notice() {
            self.set_notice(text);
        }
        Ok(())
    }

    /// Grade every cell. Only the first check of a loaded table goes into
    /// the practice history; checking again shows the score without counting.
    pub fn check_all(&mut self) -> Result<(), KeyError> {
        let Some(quiz) = self.quiz.as_mut() else {
            return Ok(());
        };
        let accuracy = quiz.check_all();
        let key = encode(&quiz.selection)?;
        let first_check = quiz.mark_recorded();
        self.last_score = Some(accuracy);

        if !first_check {
            debug!(%key, accuracy, "table already recorded");
            self.set_notice(format!("{:.0}% correct", accuracy * 100.0));
            return Ok(());
        }

        let now = Utc::now();
        self.session.record(&key, accuracy);
        let stats = self.mastery.record_attempt(&key, accuracy, now);
        let newly_mastered = stats.mastered_at == Some(now);
        info!(%key, accuracy, mastered = stats.mastered, "table checked");
        if newly_mastered {
            self.set_notice(format!("{:.0}% correct, table mastered", accuracy * 100.0));
        } else {
            self.set_notice(format!("{:.0}% correct", accuracy * 100.0));
        }
        self.save_mastery();
        Ok(())
    }

    pub fn check_current(&mut self) {
        if let Some(quiz) = self.quiz.as_mut()
            && quiz.check_current() == Some(false)
        {
            self.set_notice("Not quite");
        }
    }

    pub fn reveal(&mut self) {
        if let Some(quiz) = self.quiz.as_mut() {
            quiz.reveal();
        }
    }

    pub fn reset_table(&mut self) {
        if let Some(quiz) = self.quiz.as_mut() {
            quiz.reset();
        }
        self.last_score = None;
    }

    pub fn type_char(&mut self, ch: char) {
        if let Some(quiz) = self.quiz.as_mut() {
            quiz.type_char(ch);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(quiz) = self.quiz.as_mut() {
            quiz.backspace();
        }
    }

    fn save_mastery(&mut self) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(err) = store.save_mastery(&MasteryData::new(self.mastery.clone())) {
            warn!(error = %format!("{err:#}"), "failed to save mastery");
            self.set_notice("Could not save progress");
        }
    }

    pub fn go_to_settings(&mut self) {
        self.settings_selected = 0;
        self.screen = AppScreen::Settings;
    }

    pub fn leave_settings(&mut self) {
        if let Err(err) = self.saved_config.save_to(&self.config_file) {
            warn!(error = %format!("{err:#}"), "failed to save config");
            self.set_notice("Could not save settings");
        }
        self.screen = AppScreen::Quiz;
    }

    pub fn settings_cycle(&mut self, forward: bool) {
        match self.settings_selected {
            0 => {
                let themes = Theme::available_themes();
                if themes.is_empty() {
                    return;
                }
                let len = themes.len();
                let next = match themes.iter().position(|t| *t == self.config.theme) {
                    Some(idx) if forward => (idx + 1) % len,
                    Some(idx) => (idx + len - 1) % len,
                    None => 0,
                };
                self.config.theme = themes[next].clone();
                self.saved_config.theme = self.config.theme.clone();
                if let Some(theme) = Theme::load(&self.config.theme) {
                    self.theme = Box::leak(Box::new(theme));
                }
            }
            // Applies from the next table opened.
            1 => {
                self.config.strict_accents = !self.config.strict_accents;
                self.saved_config.strict_accents = self.config.strict_accents;
            }
            2 => {
                self.config.randomize_next = !self.config.randomize_next;
                self.saved_config.randomize_next = self.config.randomize_next;
            }
            _ => {}
        }
    }

    /// Retry any unsaved bookmark change and stop the event loop.
    pub fn quit(&mut self) {
        self.stars.flush();
        if self.stars.is_dirty() {
            warn!("exiting with unsaved starred tables");
        }
        self.should_quit = true;
    }
}
