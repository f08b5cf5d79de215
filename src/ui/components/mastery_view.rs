use chrono::{DateTime, Utc};
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::bookmark::key::{BookmarkKey, encode};
use crate::bookmark::label::LabelSource;
use crate::paradigm::database::ParadigmDb;
use crate::quiz::mastery::{MasteryStore, SessionStats, TableMastery};
use crate::ui::theme::Theme;

const WEAK_THRESHOLD: f64 = 0.9;
const REVIEW_AFTER_DAYS: i64 = 2;

/// Practice summary: totals, this run, the table on screen, and what to practice next.
pub struct MasteryView<'a> {
    mastery: &'a MasteryStore,
    session: &'a SessionStats,
    db: &'a ParadigmDb,
    current: Option<&'a BookmarkKey>,
    theme: &'a Theme,
    now: DateTime<Utc>,
}

impl<'a> MasteryView<'a> {
    pub fn new(
        mastery: &'a MasteryStore,
        session: &'a SessionStats,
        db: &'a ParadigmDb,
        current: Option<&'a BookmarkKey>,
        theme: &'a Theme,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            mastery,
            session,
            db,
            current,
            theme,
            now,
        }
    }

    fn label(&self, key: &BookmarkKey) -> String {
        key.decode()
            .map(|selection| self.db.label_for(&selection))
            .unwrap_or_else(|_| key.to_string())
    }
}

fn stats_line(stats: &TableMastery) -> String {
    format!(
        "{:>3.0}%  {}/{} good attempts  last {}",
        stats.success_rate * 100.0,
        stats.correct_attempts,
        stats.attempts,
        stats.last_practiced.format("%Y-%m-%d"),
    )
}

fn summary_line(mastery: &MasteryStore) -> String {
    format!(
        "{} tables practiced, {} mastered, {:.0}% average",
        mastery.tables.len(),
        mastery.mastered_count(),
        mastery.average_success_rate() * 100.0
    )
}

fn session_line(session: &SessionStats, now: DateTime<Utc>) -> String {
    let secs = session.duration(now).num_seconds();
    format!(
        "This session: {} checks, {:.0}% good, {} tables, {}:{:02}",
        session.attempts,
        session.accuracy() * 100.0,
        session.tables_practiced(),
        secs / 60,
        secs % 60
    )
}

impl Widget for MasteryView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Progress ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        Paragraph::new(vec![
            Line::from(Span::styled(
                summary_line(self.mastery),
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                session_line(self.session, self.now),
                Style::default().fg(colors.muted()),
            )),
        ])
        .alignment(Alignment::Center)
        .render(layout[0], buf);

        let mut current_lines = Vec::new();
        if let Some(key) = self.current {
            current_lines.push(Line::from(vec![
                Span::styled("  This table: ", Style::default().fg(colors.fg())),
                Span::styled(self.label(key), Style::default().fg(colors.accent())),
            ]));
            let detail = match self.mastery.get(key) {
                Some(stats) if stats.mastered => Span::styled(
                    format!("  {}  mastered", stats_line(stats)),
                    Style::default().fg(colors.success()),
                ),
                Some(stats) => Span::styled(
                    format!("  {}", stats_line(stats)),
                    Style::default().fg(colors.fg()),
                ),
                None => Span::styled("  not practiced yet", Style::default().fg(colors.muted())),
            };
            current_lines.push(Line::from(detail));
        }
        Paragraph::new(current_lines).render(layout[1], buf);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(layout[2]);

        let limit = columns[0].height.saturating_sub(1) as usize;
        let weak = self.mastery.weak_tables(WEAK_THRESHOLD, limit);
        let mut weak_lines = vec![Line::from(Span::styled(
            "  Needs work",
            Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
        ))];
        if weak.is_empty() {
            weak_lines.push(Line::from(Span::styled(
                "    nothing below 90% yet",
                Style::default().fg(colors.muted()),
            )));
        }
        for (key, stats) in weak {
            let rate_color = if stats.success_rate >= 0.5 {
                colors.fg()
            } else {
                colors.error()
            };
            weak_lines.push(Line::from(vec![
                Span::styled(
                    format!("    {:>3.0}%  ", stats.success_rate * 100.0),
                    Style::default().fg(rate_color),
                ),
                Span::styled(self.label(key), Style::default().fg(colors.fg())),
            ]));
        }
        Paragraph::new(weak_lines).render(columns[0], buf);

        // Due tables first, then never-tried ones in display order.
        let limit = columns[1].height.saturating_sub(1) as usize;
        let mut next_lines = vec![Line::from(Span::styled(
            "  Practice next",
            Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
        ))];
        let due = self
            .mastery
            .due_for_review(self.now, REVIEW_AFTER_DAYS, limit);
        for (key, stats) in &due {
            next_lines.push(Line::from(vec![
                Span::styled(
                    format!("    {}  ", stats.last_practiced.format("%m-%d")),
                    Style::default().fg(colors.muted()),
                ),
                Span::styled(self.label(key), Style::default().fg(colors.fg())),
            ]));
        }
        let all_keys: Vec<BookmarkKey> = self
            .db
            .all_selections()
            .iter()
            .filter_map(|s| encode(s).ok())
            .collect();
        for key in self
            .mastery
            .untested_tables(&all_keys, limit.saturating_sub(due.len()))
        {
            next_lines.push(Line::from(vec![
                Span::styled("    new    ", Style::default().fg(colors.accent())),
                Span::styled(self.label(key), Style::default().fg(colors.fg())),
            ]));
        }
        if next_lines.len() == 1 {
            next_lines.push(Line::from(Span::styled(
                "    all caught up",
                Style::default().fg(colors.muted()),
            )));
        }
        Paragraph::new(next_lines).render(columns[1], buf);

        Paragraph::new(Line::from(Span::styled(
            "  [Esc/p] Back",
            Style::default().fg(colors.accent()),
        )))
        .render(layout[3], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_stats_line() {
        let stats = TableMastery {
            attempts: 4,
            correct_attempts: 3,
            success_rate: 0.75,
            last_practiced: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            mastered: false,
            mastered_at: None,
        };
        assert_eq!(stats_line(&stats), " 75%  3/4 good attempts  last 2026-03-01");
    }

    #[test]
    fn test_summary_and_session_lines() {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let key = encode(&crate::bookmark::key::Selection::table(
            crate::bookmark::key::Category::Noun,
            "First Declension (μουσα)",
        ))
        .unwrap();

        let mut mastery = MasteryStore::default();
        mastery.record_attempt(&key, 1.0, start);
        mastery.record_attempt(&key, 0.5, start);
        assert_eq!(summary_line(&mastery), "1 tables practiced, 0 mastered, 50% average");

        let mut session = SessionStats::new(start);
        session.record(&key, 1.0);
        session.record(&key, 0.5);
        assert_eq!(
            session_line(&session, start + chrono::Duration::seconds(125)),
            "This session: 2 checks, 50% good, 1 tables, 2:05"
        );
    }
}
