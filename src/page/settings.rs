use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};

use crate::Theme;
use crate::backend::Account;
use crate::config::{KeyResolver, SettingsAction};
use crate::page::{Page, PageEvent};
use crate::ui::{EventResult, Keybinding, Result};
use crate::workflow::{FlowKind, InlineStatus};

/// Access code management.
///
/// The dashboard access code is rotated in place: the new code is written to
/// an inline region instead of a dialog, and the trigger is disabled for the
/// rest of the session once a rotation succeeds.
pub struct SettingsPage {
    server: Option<String>,
    inline: Option<InlineStatus>,
    access_code_locked: bool,
    resolver: Arc<KeyResolver>,
}

impl SettingsPage {
    pub const fn new(resolver: Arc<KeyResolver>) -> Self {
        Self {
            server: None,
            inline: None,
            access_code_locked: false,
            resolver,
        }
    }

    pub fn set_inline(&mut self, status: InlineStatus) {
        self.inline = Some(status);
    }

    pub const fn lock_access_code(&mut self) {
        self.access_code_locked = true;
    }

    fn inline_line(&self, theme: &Theme) -> Line<'static> {
        match &self.inline {
            None => Line::from(""),
            Some(InlineStatus::Pending) => Line::from(Span::styled(
                "Resetting access code…",
                Style::default().fg(theme.yellow()),
            )),
            Some(InlineStatus::NewCode(code)) => Line::from(vec![
                Span::styled(
                    "✅ Your new access code (will only be shown once): ",
                    Style::default().fg(theme.green()),
                ),
                Span::styled(
                    code.clone(),
                    Style::default()
                        .fg(theme.text())
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Some(InlineStatus::Failed) => Line::from(Span::styled(
                "❌ Error resetting code.",
                Style::default().fg(theme.red()),
            )),
        }
    }
}

impl Page for SettingsPage {
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<PageEvent>> {
        if self.resolver.matches_settings(&key, SettingsAction::ResetServerCode) {
            return Ok(PageEvent::Trigger(FlowKind::ResetServerCode).into());
        }
        if self.resolver.matches_settings(&key, SettingsAction::ResetAccessCode) {
            if self.access_code_locked {
                return Ok(EventResult::Consumed);
            }
            return Ok(PageEvent::Trigger(FlowKind::ResetAccessCode).into());
        }
        Ok(EventResult::Ignored)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let [server_area, access_area] =
            Layout::vertical([Constraint::Length(6), Constraint::Min(6)]).areas(area);

        let panel = |title: &'static str| {
            Block::default()
                .title(format!(" {title} "))
                .title_style(Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(theme.border()))
        };
        let key_style = Style::default().fg(theme.peach()).add_modifier(Modifier::BOLD);
        let muted = Style::default().fg(theme.subtext0());

        let server_lines = vec![
            Line::from(Span::styled(
                "Game servers authenticate with this code. Resetting it invalidates the old one.",
                muted,
            )),
            Line::from(vec![
                Span::styled("Server  ", muted),
                Span::styled(
                    self.server.clone().unwrap_or_else(|| "-".to_string()),
                    Style::default().fg(theme.text()),
                ),
            ]),
            Line::from(vec![
                Span::styled(
                    format!(
                        "[{}]",
                        self.resolver
                            .display_settings(SettingsAction::ResetServerCode)
                    ),
                    key_style,
                ),
                Span::raw(" Reset server code"),
            ]),
        ];
        frame.render_widget(
            Paragraph::new(server_lines)
                .wrap(Wrap { trim: false })
                .block(panel("Server Access Code")),
            server_area,
        );

        let trigger = if self.access_code_locked {
            Line::from(Span::styled(
                format!(
                    "[{}] Reset access code (disabled)",
                    self.resolver.display_settings(SettingsAction::ResetAccessCode)
                ),
                Style::default().fg(theme.overlay0()).add_modifier(Modifier::CROSSED_OUT),
            ))
        } else {
            Line::from(vec![
                Span::styled(
                    format!(
                        "[{}]",
                        self.resolver
                            .display_settings(SettingsAction::ResetAccessCode)
                    ),
                    key_style,
                ),
                Span::raw(" Reset access code"),
            ])
        };
        let access_lines = vec![
            Line::from(Span::styled(
                "The access code signs you in to this dashboard.",
                muted,
            )),
            trigger,
            Line::from(""),
            self.inline_line(theme),
        ];
        frame.render_widget(
            Paragraph::new(access_lines)
                .wrap(Wrap { trim: false })
                .block(panel("Dashboard Access Code")),
            access_area,
        );
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        let mut keys = vec![Keybinding::new(
            self.resolver.display_settings(SettingsAction::ResetServerCode),
            "Reset server code",
        )];
        if !self.access_code_locked {
            keys.push(Keybinding::new(
                self.resolver.display_settings(SettingsAction::ResetAccessCode),
                "Reset access code",
            ));
        }
        keys
    }

    fn set_account(&mut self, account: &Account) {
        self.server.clone_from(&account.owned_server);
    }

    fn on_leave(&mut self) {
        // The new code is shown once; leaving the page discards it.
        if !matches!(self.inline, Some(InlineStatus::Pending)) {
            self.inline = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;

    fn page() -> SettingsPage {
        SettingsPage::new(Arc::new(KeyResolver::default()))
    }

    fn press(page: &mut SettingsPage, c: char) -> EventResult<PageEvent> {
        page.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
            .unwrap()
    }

    fn screen(page: &mut SettingsPage) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 16)).unwrap();
        terminal
            .draw(|frame| page.render(frame, frame.area(), &Theme::default()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_triggers() {
        let mut page = page();
        assert_eq!(
            press(&mut page, 's'),
            EventResult::Event(PageEvent::Trigger(FlowKind::ResetServerCode))
        );
        assert_eq!(
            press(&mut page, 'a'),
            EventResult::Event(PageEvent::Trigger(FlowKind::ResetAccessCode))
        );
    }

    #[test]
    fn test_locked_trigger_emits_nothing() {
        let mut page = page();
        page.set_inline(InlineStatus::NewCode("k-123".into()));
        page.lock_access_code();

        assert_eq!(press(&mut page, 'a'), EventResult::Consumed);
        assert!(page.keybindings().iter().all(|k| k.description != "Reset access code"));
        assert!(screen(&mut page).contains("(disabled)"));
    }

    #[test]
    fn test_new_code_shown_once() {
        let mut page = page();
        page.set_inline(InlineStatus::NewCode("k-123".into()));
        let text = screen(&mut page);
        assert_eq!(text.matches("k-123").count(), 1);

        page.on_leave();
        assert!(!screen(&mut page).contains("k-123"));
    }

    #[test]
    fn test_failure_keeps_trigger() {
        let mut page = page();
        page.set_inline(InlineStatus::Failed);
        assert!(screen(&mut page).contains("Error resetting code."));
        assert!(!page.access_code_locked);
    }
}
