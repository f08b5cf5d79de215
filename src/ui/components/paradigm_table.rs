use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use unicode_width::UnicodeWidthStr;

use crate::quiz::table::{Cell, CellStatus, QuizTable};
use crate::ui::theme::Theme;

const MIN_COLUMN_WIDTH: usize = 8;
const ABSENT_CELL: &str = "\u{2014}";
const EMPTY_CELL: &str = "\u{00b7}";

/// Renders a quiz table: row labels down the left, one column per number.
pub struct ParadigmTable<'a> {
    quiz: &'a QuizTable,
    title: String,
    starred: bool,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> ParadigmTable<'a> {
    pub fn new(quiz: &'a QuizTable, title: String, theme: &'a Theme) -> Self {
        Self {
            quiz,
            title,
            starred: false,
            focused: false,
            theme,
        }
    }

    pub fn starred(mut self, starred: bool) -> Self {
        self.starred = starred;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

/// What a cell shows: the answer once revealed, otherwise what was typed.
fn cell_text(cell: Option<&Cell>, is_cursor: bool) -> String {
    match cell {
        None => ABSENT_CELL.to_string(),
        Some(cell) if cell.status == CellStatus::Revealed => cell.expected.clone(),
        Some(cell) if cell.input.is_empty() => {
            if is_cursor { "_".to_string() } else { EMPTY_CELL.to_string() }
        }
        Some(cell) if is_cursor => format!("{}_", cell.input),
        Some(cell) => cell.input.clone(),
    }
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{text}{}", " ".repeat(fill))
}

fn column_widths(quiz: &QuizTable) -> (usize, Vec<usize>) {
    let label_width = quiz
        .grid
        .rows
        .iter()
        .map(|r| r.label.width())
        .max()
        .unwrap_or(0)
        + 2;

    let widths = quiz
        .grid
        .columns
        .iter()
        .enumerate()
        .map(|(col, name)| {
            let widest_cell = quiz
                .cells()
                .iter()
                .filter(|c| c.col == col)
                .map(|c| c.expected.width().max(c.input.width() + 1))
                .max()
                .unwrap_or(0);
            name.width().max(widest_cell).max(MIN_COLUMN_WIDTH) + 2
        })
        .collect();
    (label_width, widths)
}

impl Widget for ParadigmTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let quiz = self.quiz;

        let star = if self.starred { "\u{2605} " } else { "" };
        let border = if self.focused {
            colors.border_focused()
        } else {
            colors.border()
        };
        let block = Block::bordered()
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled(star, Style::default().fg(colors.star())),
                Span::styled(
                    format!("{} ", self.title),
                    Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
                ),
            ]))
            .title_bottom(format!(
                " {}/{} correct ",
                quiz.correct_count(),
                quiz.len()
            ))
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let (label_width, widths) = column_widths(quiz);

        let mut lines: Vec<Line> = Vec::with_capacity(quiz.grid.rows.len() + 2);
        let mut header = vec![Span::raw(pad("", label_width))];
        for (name, width) in quiz.grid.columns.iter().zip(&widths) {
            header.push(Span::styled(
                pad(name, *width),
                Style::default().fg(colors.muted()).add_modifier(Modifier::BOLD),
            ));
        }
        lines.push(Line::from(header));
        lines.push(Line::from(""));

        for (row, form_row) in quiz.grid.rows.iter().enumerate() {
            let mut spans = vec![Span::styled(
                pad(&form_row.label, label_width),
                Style::default().fg(colors.muted()),
            )];
            for (col, width) in widths.iter().enumerate() {
                let cell = quiz.cell_at(row, col);
                let is_cursor = self.focused && quiz.is_cursor(row, col);
                let text = cell_text(cell, is_cursor);

                let mut style = match cell.map(|c| c.status) {
                    None => Style::default().fg(colors.muted()),
                    Some(CellStatus::Pending) => Style::default().fg(colors.cell_pending()),
                    Some(CellStatus::Correct) => Style::default().fg(colors.cell_correct()),
                    Some(CellStatus::Wrong) => Style::default()
                        .fg(colors.cell_wrong())
                        .bg(colors.cell_wrong_bg())
                        .add_modifier(Modifier::UNDERLINED),
                    Some(CellStatus::Revealed) => Style::default()
                        .fg(colors.cell_revealed())
                        .add_modifier(Modifier::ITALIC),
                };
                if is_cursor {
                    style = style.fg(colors.cursor_fg()).bg(colors.cursor_bg());
                }

                spans.push(Span::styled(text.clone(), style));
                spans.push(Span::raw(" ".repeat(width.saturating_sub(text.width()))));
            }
            lines.push(Line::from(spans));
        }

        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookmark::key::{Category, Selection};
    use crate::paradigm::grid::{FormRow, Grid};

    fn quiz() -> QuizTable {
        let grid = Grid {
            columns: vec!["Singular".to_string(), "Plural".to_string()],
            rows: vec![
                FormRow {
                    label: "Nominative".to_string(),
                    forms: vec!["λόγος".to_string(), "λόγοι".to_string()],
                },
                FormRow {
                    label: "Vocative".to_string(),
                    forms: vec!["λόγε".to_string(), String::new()],
                },
            ],
        };
        QuizTable::new(Selection::table(Category::Noun, "Second Declension"), &grid, false)
    }

    #[test]
    fn test_cell_text_by_status() {
        let mut quiz = quiz();
        assert_eq!(cell_text(quiz.cell_at(1, 1), false), ABSENT_CELL);
        assert_eq!(cell_text(quiz.cell_at(0, 0), false), EMPTY_CELL);
        assert_eq!(cell_text(quiz.cell_at(0, 0), true), "_");

        quiz.type_char('λ');
        assert_eq!(cell_text(quiz.cell_at(0, 0), true), "λ_");
        assert_eq!(cell_text(quiz.cell_at(0, 0), false), "λ");

        quiz.reveal();
        assert_eq!(cell_text(quiz.cell_at(0, 1), false), "λόγοι");
    }

    #[test]
    fn test_column_widths_fit_greek_forms() {
        let quiz = quiz();
        let (label_width, widths) = column_widths(&quiz);
        assert_eq!(label_width, "Nominative".len() + 2);
        assert_eq!(widths, vec![MIN_COLUMN_WIDTH + 2, MIN_COLUMN_WIDTH + 2]);
    }
}
