use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

use crate::Theme;
use crate::ui::Keybinding;

/// Overlay listing every keybinding available on the current page.
#[derive(Debug, Default)]
pub struct HelpOverlay {
    visible: bool,
}

impl HelpOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub const fn hide(&mut self) {
        self.visible = false;
    }

    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        sections: &[(&str, Vec<Keybinding>)],
    ) {
        if !self.visible {
            return;
        }

        let rows: usize = sections.iter().map(|(_, keys)| keys.len() + 2).sum();
        let height = u16::try_from(rows + 2).unwrap_or(u16::MAX);
        let popup_area = area.centered(Constraint::Percentage(50), Constraint::Length(height));
        frame.render_widget(Clear, popup_area);

        let heading = Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD);
        let key_style = Style::default().fg(theme.peach()).add_modifier(Modifier::BOLD);
        let desc_style = Style::default().fg(theme.text());

        let key_width = sections
            .iter()
            .flat_map(|(_, keys)| keys.iter().map(|k| k.key.chars().count()))
            .max()
            .unwrap_or(0);

        let mut lines = Vec::with_capacity(rows);
        for (title, keys) in sections {
            lines.push(Line::from(Span::styled(*title, heading)));
            for binding in keys {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {:>key_width$}", binding.key), key_style),
                    Span::raw("  "),
                    Span::styled(binding.description, desc_style),
                ]));
            }
            lines.push(Line::from(""));
        }

        let block = Block::default()
            .title(" Help ")
            .title_style(heading)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border_focused()))
            .style(Style::default().bg(theme.base()));

        frame.render_widget(Paragraph::new(lines).block(block), popup_area);
    }
}
