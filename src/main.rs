mod app;
mod bookmark;
mod config;
mod event;
mod logging;
mod paradigm;
mod quiz;
mod store;
mod ui;

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget};
use tracing::{error, info, warn};

use app::{App, AppScreen, Focus, SETTINGS_COUNT, Tab};
use bookmark::key::encode;
use bookmark::label::LabelSource;
use config::{Config, Overrides};
use event::{AppEvent, EventHandler};
use paradigm::database::ParadigmDb;
use store::json_store::JsonStore;
use ui::components::mastery_view::MasteryView;
use ui::components::paradigm_table::ParadigmTable;
use ui::components::selector::Selector;
use ui::layout::{AppLayout, pack_hint_lines};
use ui::theme::Theme;

#[derive(Parser)]
#[command(name = "klisis", version, about = "Terminal quiz for Ancient Greek inflection tables")]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Paradigm JSON file to use instead of the bundled one")]
    paradigms: Option<String>,

    #[arg(short, long, help = "Directory for starred tables, progress and logs")]
    data_dir: Option<String>,

    #[arg(short, long, help = "Pick the next table at random")]
    randomize: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (file_config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(err)),
    };
    let overrides = Overrides {
        theme: cli.theme,
        paradigms_path: cli.paradigms,
        data_dir: cli.data_dir,
        randomize_next: cli.randomize,
    };
    let config = file_config.with_overrides(&overrides);

    let _log_guard = logging::init_file_logging(&config.log_dir(), &config.log_level);
    info!(version = env!("CARGO_PKG_VERSION"), "starting klisis");
    if let Some(err) = config_error {
        warn!(error = %format!("{err:#}"), "invalid config file, using defaults");
    }

    let db = match &config.paradigms_path {
        Some(path) => ParadigmDb::from_path(Path::new(path))
            .with_context(|| format!("loading paradigms from {path}"))?,
        None => ParadigmDb::embedded().context("loading bundled paradigms")?,
    };

    let store = match JsonStore::with_base_dir(config.data_path()) {
        Ok(store) => Some(Arc::new(store)),
        Err(err) => {
            warn!(error = %format!("{err:#}"), "running without saved data");
            None
        }
    };
    let in_memory = store.is_none();

    let theme: &'static Theme = Box::leak(Box::new(Theme::load(&config.theme).unwrap_or_default()));
    let mut app = App::new(db, file_config, theme, store).with_overrides(&overrides);
    if in_memory {
        app.set_notice("Data directory unavailable; progress will not be saved");
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(250));
    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        error!(error = %format!("{err:#}"), "exiting on error");
    }
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => {
                if let Err(err) = handle_key(app, key) {
                    app.quit();
                    return Err(err);
                }
            }
            AppEvent::Tick => app.tick(),
            AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) -> Result<()> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return Ok(());
    }

    match app.screen {
        AppScreen::Quiz => match app.focus {
            Focus::List => handle_list_key(app, key)?,
            Focus::Table => handle_table_key(app, key)?,
        },
        AppScreen::Mastery | AppScreen::Help => match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('p') | KeyCode::Char('?') => {
                app.screen = AppScreen::Quiz
            }
            _ => {}
        },
        AppScreen::Settings => handle_settings_key(app, key),
    }
    Ok(())
}

fn handle_list_key(app: &mut App, key: KeyEvent) -> Result<()> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Up | KeyCode::Char('k') => app.list_move(false),
        KeyCode::Down | KeyCode::Char('j') => app.list_move(true),
        KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => app.switch_tab(true),
        KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => app.switch_tab(false),
        KeyCode::Enter => app.list_activate(),
        KeyCode::Char('t') => {
            if app.quiz.is_some() {
                app.focus = Focus::Table;
            }
        }
        KeyCode::Char('s') | KeyCode::Char('*') => app.toggle_star()?,
        KeyCode::Char('n') => app.next_table(),
        KeyCode::Char(']') => app.cycle_verb_slice(true),
        KeyCode::Char('[') => app.cycle_verb_slice(false),
        KeyCode::Char('p') => app.screen = AppScreen::Mastery,
        KeyCode::Char('c') => app.go_to_settings(),
        KeyCode::Char('?') => app.screen = AppScreen::Help,
        _ => {}
    }
    Ok(())
}

/// Letters are answers here, so commands go through Ctrl and the navigation keys.
fn handle_table_key(app: &mut App, key: KeyEvent) -> Result<()> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('s') => app.toggle_star()?,
            KeyCode::Char('n') => app.next_table(),
            KeyCode::Char('g') => app.check_all()?,
            KeyCode::Char('r') => app.reveal(),
            KeyCode::Char('x') => app.reset_table(),
            _ => {}
        }
        return Ok(());
    }

    match key.code {
        KeyCode::Esc => app.focus = Focus::List,
        KeyCode::Enter => app.check_current(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::PageDown => app.cycle_verb_slice(true),
        KeyCode::PageUp => app.cycle_verb_slice(false),
        KeyCode::Char(ch) => app.type_char(ch),
        _ => {
            if let Some(quiz) = app.quiz.as_mut() {
                match key.code {
                    KeyCode::Tab => quiz.next_cell(),
                    KeyCode::BackTab => quiz.prev_cell(),
                    KeyCode::Up => quiz.move_vertical(false),
                    KeyCode::Down => quiz.move_vertical(true),
                    KeyCode::Left => quiz.move_horizontal(false),
                    KeyCode::Right => quiz.move_horizontal(true),
                    _ => {}
                }
            }
        }
    }
    Ok(())
}

fn handle_settings_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.leave_settings(),
        KeyCode::Up | KeyCode::Char('k') => {
            app.settings_selected = app.settings_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if app.settings_selected + 1 < SETTINGS_COUNT {
                app.settings_selected += 1;
            }
        }
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => app.settings_cycle(true),
        KeyCode::Left | KeyCode::Char('h') => app.settings_cycle(false),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    render_quiz(frame, app);
    match app.screen {
        AppScreen::Quiz => {}
        AppScreen::Mastery => render_mastery(frame, app),
        AppScreen::Settings => render_settings(frame, app),
        AppScreen::Help => render_help(frame, app),
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let colors = &app.theme.colors;
    let base = Style::default().fg(colors.header_fg()).bg(colors.header_bg());

    let mut spans = vec![Span::styled(" klisis ", base.add_modifier(Modifier::BOLD))];
    for tab in &app.tabs {
        let style = if *tab == app.tab {
            base.fg(colors.accent()).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            base.fg(colors.muted())
        };
        spans.push(Span::styled(" ", base));
        if *tab == Tab::Starred {
            spans.push(Span::styled("\u{2605} ", base.fg(colors.star())));
        }
        spans.push(Span::styled(tab.title(), style));
    }
    if let Some(score) = app.last_score {
        spans.push(Span::styled(format!("  | {:.0}%", score * 100.0), base));
    }
    if let Some(notice) = app.notice() {
        spans.push(Span::styled(format!("  | {notice}"), base.fg(colors.accent())));
    }

    let header = Paragraph::new(Line::from(spans)).style(base);
    frame.render_widget(header, area);
}

fn render_quiz(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let hints: &[&str] = match app.focus {
        Focus::List => &[
            "[\u{2191}\u{2193}] Move",
            "[Tab/\u{2190}\u{2192}] Category",
            "[Enter] Open",
            "[s] Star",
            "[n] Next",
            "[[ ]] Tense",
            "[p] Progress",
            "[c] Settings",
            "[?] Help",
            "[q] Quit",
        ],
        Focus::Table => &[
            "[Enter] Check cell",
            "[Tab/arrows] Move",
            "[^G] Check all",
            "[^R] Reveal",
            "[^X] Reset",
            "[^S] Star",
            "[^N] Next",
            "[PgUp/PgDn] Tense",
            "[Esc] List",
        ],
    };
    let hint_lines = pack_hint_lines(hints, area.width as usize);
    let layout = AppLayout::new(area, app.focus, hint_lines.len() as u16);

    render_header(frame, app, layout.header);

    if let Some(list_area) = layout.list {
        let items = app.list_items();
        let marks = app.list_star_marks();
        let selector = Selector::new(app.tab.title(), &items, &marks, app.theme)
            .selected(app.list_selected)
            .focused(app.focus == Focus::List)
            .empty_hint("Nothing starred yet. Press s on a table to star it.");
        frame.render_widget(selector, list_area);
    }

    if let Some(table_area) = layout.table {
        match &app.quiz {
            Some(quiz) => {
                let title = app.db.label_for(&quiz.selection);
                let table = ParadigmTable::new(quiz, title, app.theme)
                    .starred(app.stars.current_is_starred())
                    .focused(app.focus == Focus::Table);
                frame.render_widget(table, table_area);
            }
            None => {
                let empty = Paragraph::new(Line::from(Span::styled(
                    " No table selected",
                    Style::default().fg(colors.muted()),
                )))
                .block(
                    Block::bordered()
                        .border_style(Style::default().fg(colors.border()))
                        .style(Style::default().bg(colors.bg())),
                );
                frame.render_widget(empty, table_area);
            }
        }
    }

    let footer_lines: Vec<Line> = hint_lines
        .into_iter()
        .map(|line| Line::from(Span::styled(line, Style::default().fg(colors.muted()))))
        .collect();
    frame.render_widget(Paragraph::new(footer_lines), layout.footer);
}

fn render_mastery(frame: &mut ratatui::Frame, app: &App) {
    let area = ui::layout::centered_rect(70, 70, frame.area());
    let current = app.quiz.as_ref().and_then(|q| encode(&q.selection).ok());
    frame.render_widget(Clear, area);
    let view = MasteryView::new(
        &app.mastery,
        &app.session,
        &app.db,
        current.as_ref(),
        app.theme,
        chrono::Utc::now(),
    );
    frame.render_widget(view, area);
}

fn render_help(frame: &mut ratatui::Frame, app: &App) {
    let area = ui::layout::centered_rect(60, 70, frame.area());
    let colors = &app.theme.colors;
    frame.render_widget(Clear, area);

    let rows = [
        ("List", ""),
        ("  Tab / \u{2190} \u{2192}", "switch category or the starred list"),
        ("  Enter", "open the highlighted table and start typing"),
        ("  s", "star or unstar the table on screen"),
        ("  n", "next table (or next starred table)"),
        ("  [ ]", "previous / next tense of a verb"),
        ("Table", ""),
        ("  Enter", "check the cell under the cursor"),
        ("  Ctrl-G", "check the whole table and record progress"),
        ("  Ctrl-R", "reveal the answers"),
        ("  Ctrl-X", "clear the table"),
        ("  Esc", "back to the list"),
    ];
    let lines: Vec<Line> = rows
        .iter()
        .map(|(keys, what)| {
            if what.is_empty() {
                Line::from(Span::styled(
                    *keys,
                    Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(vec![
                    Span::styled(format!("{keys:<16}"), Style::default().fg(colors.fg())),
                    Span::styled(*what, Style::default().fg(colors.muted())),
                ])
            }
        })
        .collect();

    let help = Paragraph::new(lines).block(
        Block::bordered()
            .title(" Keys ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg())),
    );
    frame.render_widget(help, area);
}

fn render_settings(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let centered = ui::layout::centered_rect(60, 60, area);
    frame.render_widget(Clear, centered);

    let block = Block::bordered()
        .title(" Settings ")
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(centered);
    block.render(centered, frame.buffer_mut());

    let on_off = |flag: bool| String::from(if flag { "on" } else { "off" });
    let fields: [(&str, String); SETTINGS_COUNT] = [
        ("Theme", app.config.theme.clone()),
        ("Strict accents", on_off(app.config.strict_accents)),
        ("Random next table", on_off(app.config.randomize_next)),
    ];

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(fields.len() as u16 * 3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

    let header = Paragraph::new(Line::from(Span::styled(
        "  Arrows to navigate, Enter/Right to change",
        Style::default().fg(colors.muted()),
    )));
    header.render(layout[0], frame.buffer_mut());

    let field_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(fields.iter().map(|_| Constraint::Length(3)).collect::<Vec<_>>())
        .split(layout[1]);

    for (i, (label, value)) in fields.iter().enumerate() {
        let is_selected = i == app.settings_selected;
        let indicator = if is_selected { " > " } else { "   " };

        let label_style = Style::default()
            .fg(if is_selected { colors.accent() } else { colors.fg() })
            .add_modifier(if is_selected { Modifier::BOLD } else { Modifier::empty() });
        let value_style = Style::default().fg(if is_selected {
            colors.star()
        } else {
            colors.muted()
        });

        let lines = vec![
            Line::from(Span::styled(format!("{indicator}{label}:"), label_style)),
            Line::from(Span::styled(format!("    < {value} >"), value_style)),
        ];
        Paragraph::new(lines).render(field_layout[i], frame.buffer_mut());
    }

    let footer = Paragraph::new(Line::from(Span::styled(
        "  [Esc] Save & back",
        Style::default().fg(colors.accent()),
    )));
    footer.render(layout[3], frame.buffer_mut());
}
