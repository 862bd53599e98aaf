use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};

use crate::Theme;
use crate::backend::Account;
use crate::config::{DashboardAction, KeyResolver};
use crate::page::{Page, PageEvent};
use crate::ui::{EventResult, Keybinding, Result};
use crate::workflow::FlowKind;

/// Landing page: account summary and the owned server.
pub struct DashboardPage {
    account: Option<Account>,
    resolver: Arc<KeyResolver>,
}

impl DashboardPage {
    pub const fn new(resolver: Arc<KeyResolver>) -> Self {
        Self {
            account: None,
            resolver,
        }
    }

    /// Until the account is known both actions are offered and the backend decides.
    fn can_create(&self) -> bool {
        self.account.as_ref().is_none_or(|a| a.owned_server.is_none())
    }

    fn can_remove(&self) -> bool {
        self.account.as_ref().is_none_or(|a| a.owned_server.is_some())
    }

    fn server_lines(&self, theme: &Theme) -> Vec<Line<'static>> {
        let key = |action| {
            Span::styled(
                format!("[{}]", self.resolver.display_dashboard(action)),
                Style::default().fg(theme.peach()).add_modifier(Modifier::BOLD),
            )
        };
        let muted = Style::default().fg(theme.subtext0());

        match self.account.as_ref().and_then(|a| a.owned_server.clone()) {
            Some(server) => vec![
                Line::from(vec![
                    Span::styled("Server  ", muted),
                    Span::styled(
                        server,
                        Style::default()
                            .fg(theme.green())
                            .add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(""),
                Line::from(vec![key(DashboardAction::Remove), Span::raw(" Remove server")]),
            ],
            None if self.account.is_some() => vec![
                Line::from(Span::styled("You don't have a server yet.", muted)),
                Line::from(""),
                Line::from(vec![key(DashboardAction::Create), Span::raw(" Create a server")]),
            ],
            None => vec![
                Line::from(Span::styled("Loading account…", muted)),
                Line::from(""),
                Line::from(vec![key(DashboardAction::Create), Span::raw(" Create a server  ")]),
                Line::from(vec![key(DashboardAction::Remove), Span::raw(" Remove server")]),
            ],
        }
    }
}

impl Page for DashboardPage {
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<PageEvent>> {
        if self.resolver.matches_dashboard(&key, DashboardAction::Create) {
            if self.can_create() {
                return Ok(PageEvent::Trigger(FlowKind::CreateServer).into());
            }
            return Ok(EventResult::Consumed);
        }
        if self.resolver.matches_dashboard(&key, DashboardAction::Remove) {
            if self.can_remove() {
                return Ok(PageEvent::Trigger(FlowKind::RemoveServer).into());
            }
            return Ok(EventResult::Consumed);
        }
        Ok(EventResult::Ignored)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let [welcome_area, server_area] =
            Layout::vertical([Constraint::Length(5), Constraint::Min(6)]).areas(area);

        let panel = |title: &'static str| {
            Block::default()
                .title(format!(" {title} "))
                .title_style(Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(theme.border()))
        };

        let (name, plan) = self.account.as_ref().map_or(("…", "…"), |a| {
            (
                a.username.as_str(),
                if a.premium_user { "Premium" } else { "Free" },
            )
        });
        let welcome = vec![
            Line::from(vec![
                Span::styled("Welcome, ", Style::default().fg(theme.text())),
                Span::styled(
                    name.to_string(),
                    Style::default()
                        .fg(theme.lavender())
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled("Plan  ", Style::default().fg(theme.subtext0())),
                Span::styled(plan, Style::default().fg(theme.yellow())),
            ]),
        ];
        frame.render_widget(Paragraph::new(welcome).block(panel("Account")), welcome_area);

        frame.render_widget(
            Paragraph::new(self.server_lines(theme))
                .wrap(Wrap { trim: false })
                .block(panel("Your Server")),
            server_area,
        );
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        let mut keys = Vec::new();
        if self.can_create() {
            keys.push(Keybinding::new(
                self.resolver.display_dashboard(DashboardAction::Create),
                "Create server",
            ));
        }
        if self.can_remove() {
            keys.push(Keybinding::new(
                self.resolver.display_dashboard(DashboardAction::Remove),
                "Remove server",
            ));
        }
        keys
    }

    fn set_account(&mut self, account: &Account) {
        self.account = Some(account.clone());
    }
}
