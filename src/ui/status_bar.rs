use chrono::{DateTime, Local};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Tabs};

use crate::Theme;
use crate::backend::Account;
use crate::page::PageId;
use crate::ui::Keybinding;

/// Header with the page tabs and account summary, plus the key hint line.
pub struct StatusBar {
    backend_url: String,
    username: Option<String>,
    server: Option<String>,
    refreshed_at: Option<DateTime<Local>>,
    loading: bool,
}

impl StatusBar {
    pub fn new(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
            username: None,
            server: None,
            refreshed_at: None,
            loading: false,
        }
    }

    pub fn set_account(&mut self, account: &Account) {
        self.username = Some(account.username.clone());
        self.server.clone_from(&account.owned_server);
        self.refreshed_at = Some(Local::now());
        self.loading = false;
    }

    pub const fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme, active: PageId) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border()))
            .title(Span::styled(
                " authdash ",
                Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD),
            ));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [tabs_area, info_area] =
            Layout::horizontal([Constraint::Min(36), Constraint::Min(30)]).areas(inner);

        let titles = PageId::ALL
            .iter()
            .enumerate()
            .map(|(i, page)| format!("{} {}", i + 1, page.title()));
        let selected = PageId::ALL.iter().position(|p| *p == active);
        let tabs = Tabs::new(titles)
            .select(selected)
            .style(Style::default().fg(theme.subtext0()))
            .highlight_style(
                Style::default()
                    .fg(theme.lavender())
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            );
        frame.render_widget(tabs, tabs_area);

        let label = Style::default().fg(theme.overlay1());
        let value = Style::default().fg(theme.text());
        let mut spans = vec![
            Span::styled("user ", label),
            Span::styled(self.username.as_deref().unwrap_or("-"), value),
            Span::styled("  server ", label),
            Span::styled(self.server.as_deref().unwrap_or("-"), value),
            Span::styled("  @ ", label),
            Span::styled(self.backend_url.as_str(), Style::default().fg(theme.sky())),
        ];
        if self.loading {
            spans.push(Span::styled("  refreshing…", Style::default().fg(theme.yellow())));
        } else if let Some(at) = self.refreshed_at {
            spans.push(Span::styled(
                format!("  {}", at.format("%H:%M:%S")),
                Style::default().fg(theme.teal()),
            ));
        }

        frame.render_widget(
            Paragraph::new(Line::from(spans)).alignment(Alignment::Right),
            info_area,
        );
    }

    pub fn render_hints(&self, frame: &mut Frame, area: Rect, theme: &Theme, hints: &[Keybinding]) {
        let key_style = Style::default().fg(theme.peach()).add_modifier(Modifier::BOLD);
        let desc_style = Style::default().fg(theme.subtext0());

        let spans: Vec<Span> = hints
            .iter()
            .flat_map(|hint| {
                [
                    Span::styled(format!(" {} ", hint.key), key_style),
                    Span::styled(format!("{} ", hint.description), desc_style),
                ]
            })
            .collect();

        frame.render_widget(
            Paragraph::new(Line::from(spans)).style(Style::default().bg(theme.mantle())),
            area,
        );
    }
}
