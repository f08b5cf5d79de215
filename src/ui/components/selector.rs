use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;

/// The left-hand list of modes, verbs or starred tables.
pub struct Selector<'a> {
    title: &'a str,
    items: &'a [String],
    starred: &'a [bool],
    selected: usize,
    focused: bool,
    empty_hint: &'a str,
    theme: &'a Theme,
}

impl<'a> Selector<'a> {
    pub fn new(title: &'a str, items: &'a [String], starred: &'a [bool], theme: &'a Theme) -> Self {
        Self {
            title,
            items,
            starred,
            selected: 0,
            focused: false,
            empty_hint: "",
            theme,
        }
    }

    pub fn selected(mut self, selected: usize) -> Self {
        self.selected = selected;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn empty_hint(mut self, hint: &'a str) -> Self {
        self.empty_hint = hint;
        self
    }
}

/// First visible row so that `selected` stays on screen.
fn scroll_offset(selected: usize, height: usize, len: usize) -> usize {
    if height == 0 || len <= height {
        return 0;
    }
    selected
        .saturating_sub(height - 1)
        .min(len - height)
}

impl Widget for Selector<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let border = if self.focused {
            colors.border_focused()
        } else {
            colors.border()
        };
        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.items.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                format!(" {}", self.empty_hint),
                Style::default().fg(colors.muted()),
            )))
            .render(inner, buf);
            return;
        }

        let height = inner.height as usize;
        let offset = scroll_offset(self.selected, height, self.items.len());

        let lines: Vec<Line> = self
            .items
            .iter()
            .enumerate()
            .skip(offset)
            .take(height)
            .map(|(i, item)| {
                let is_selected = i == self.selected;
                let indicator = if is_selected { ">" } else { " " };
                let star = if self.starred.get(i).copied().unwrap_or(false) {
                    "\u{2605}"
                } else {
                    " "
                };
                let label_style = Style::default()
                    .fg(if is_selected { colors.accent() } else { colors.fg() })
                    .add_modifier(if is_selected && self.focused {
                        Modifier::BOLD
                    } else {
                        Modifier::empty()
                    });
                Line::from(vec![
                    Span::styled(indicator, Style::default().fg(colors.accent())),
                    Span::styled(star, Style::default().fg(colors.star())),
                    Span::styled(format!(" {item}"), label_style),
                ])
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}
