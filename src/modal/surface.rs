use std::sync::Arc;

use crossterm::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph, Wrap};

use crate::Theme;
use crate::config::{DialogAction, KeyResolver};
use crate::modal::command::FormValues;
use crate::modal::spec::{ButtonStyle, Content, ModalSpec};
use crate::ui::{Component, EventResult, Result, Spinner, TextInput};

const CLOSE_LABEL: &str = " [x] ";
const MIN_WIDTH: u16 = 40;
const BUTTON_GAP: u16 = 2;

/// What the surface reports back to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalEvent<M> {
    /// A button was activated; the surface stays open.
    Activated(M),
    /// The surface was closed by the user and is now hidden.
    Dismissed,
}

/// Screen regions recorded on the last render, used for mouse hit-testing.
#[derive(Debug, Default)]
struct HitAreas {
    dialog: Rect,
    close: Rect,
    buttons: Vec<Rect>,
}

/// The single dialog region of the application.
///
/// Holds at most one [`ModalSpec`]. While a spec is shown the surface captures
/// all keyboard and mouse input. It never hides itself on button activation;
/// the owner decides what an activation means.
pub struct ModalSurface<M> {
    current: Option<ModalSpec<M>>,
    focus: usize,
    input: TextInput,
    spinner: Spinner,
    /// Bumped on every `show`, so owners can tell whether their dialog is
    /// still the one on screen.
    generation: u64,
    areas: HitAreas,
    resolver: Arc<KeyResolver>,
}

impl<M> ModalSurface<M> {
    pub fn new(resolver: Arc<KeyResolver>) -> Self {
        Self {
            current: None,
            focus: 0,
            input: TextInput::new(),
            spinner: Spinner::new(),
            generation: 0,
            areas: HitAreas::default(),
            resolver,
        }
    }

    /// Replace whatever is on screen with `spec` and make the surface visible.
    pub fn show(&mut self, spec: ModalSpec<M>) {
        self.input = match spec.input_placeholder() {
            Some(placeholder) if !placeholder.is_empty() => {
                TextInput::new().with_placeholder(placeholder)
            }
            _ => TextInput::new(),
        };
        if let Some(label) = spec.body.iter().find_map(|b| match b {
            Content::Progress(label) => Some(label.clone()),
            _ => None,
        }) {
            self.spinner.set_label(label);
        }
        // Destructive buttons never start focused.
        self.focus = spec
            .actions
            .iter()
            .position(|a| a.style != ButtonStyle::Danger)
            .unwrap_or(0);
        self.areas = HitAreas::default();
        self.generation = self.generation.wrapping_add(1);
        self.current = Some(spec);
    }

    /// Hide the surface. Hiding an already hidden surface does nothing.
    pub fn hide(&mut self) {
        // Dropping the spec releases any one-time values it displayed.
        self.current = None;
        self.input = TextInput::new();
        self.areas = HitAreas::default();
    }

    pub const fn is_visible(&self) -> bool {
        self.current.is_some()
    }

    #[cfg(test)]
    pub const fn spec(&self) -> Option<&ModalSpec<M>> {
        self.current.as_ref()
    }

    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[cfg(test)]
    pub const fn focus(&self) -> usize {
        self.focus
    }

    pub fn form_values(&self) -> FormValues {
        let has_input = self
            .current
            .as_ref()
            .is_some_and(|spec| spec.input_placeholder().is_some());
        FormValues::new(has_input.then(|| self.input.value().to_string()))
    }

    fn activate(&self, index: usize) -> EventResult<ModalEvent<M>> {
        let Some(button) = self.current.as_ref().and_then(|spec| spec.actions.get(index)) else {
            return EventResult::Consumed;
        };
        ModalEvent::Activated(button.activate(&self.form_values())).into()
    }

    fn dismiss(&mut self) -> EventResult<ModalEvent<M>> {
        self.hide();
        ModalEvent::Dismissed.into()
    }

    fn button_count(&self) -> usize {
        self.current.as_ref().map_or(0, |spec| spec.actions.len())
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<ModalEvent<M>>> {
        let Some(spec) = &self.current else {
            return Ok(EventResult::Ignored);
        };
        let has_input = spec.input_placeholder().is_some();

        if self.resolver.matches_dialog(&key, DialogAction::Close) {
            return Ok(self.dismiss());
        }
        if self.resolver.matches_dialog(&key, DialogAction::Activate) {
            return Ok(self.activate(self.focus));
        }
        if has_input && self.input.handle_key(key)?.is_consumed() {
            return Ok(EventResult::Consumed);
        }

        let count = self.button_count();
        if count > 0 {
            if self.resolver.matches_dialog(&key, DialogAction::NextButton) {
                self.focus = (self.focus + 1) % count;
            } else if self.resolver.matches_dialog(&key, DialogAction::PrevButton) {
                self.focus = (self.focus + count - 1) % count;
            }
        }

        // Nothing below a visible dialog sees the key.
        Ok(EventResult::Consumed)
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> EventResult<ModalEvent<M>> {
        if self.current.is_none() {
            return EventResult::Ignored;
        }
        if !matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left))
            || self.areas.dialog.is_empty()
        {
            return EventResult::Consumed;
        }

        let position = Position::new(mouse.column, mouse.row);
        if self.areas.close.contains(position) {
            return self.dismiss();
        }
        if let Some(index) = self.areas.buttons.iter().position(|r| r.contains(position)) {
            self.focus = index;
            return self.activate(index);
        }
        if self.areas.dialog.contains(position) {
            EventResult::Consumed
        } else {
            self.dismiss()
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        if self.current.as_ref().is_some_and(|s| s.input_placeholder().is_some()) {
            self.input.paste(text);
        }
    }

    pub fn handle_tick(&mut self) {
        if self.current.as_ref().is_some_and(ModalSpec::has_progress) {
            self.spinner.handle_tick();
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let Some(spec) = &self.current else {
            return;
        };

        frame
            .buffer_mut()
            .set_style(area, Style::default().add_modifier(Modifier::DIM));

        let width = (area.width / 5 * 3).max(MIN_WIDTH).min(area.width);
        // Borders plus one column of padding on each side.
        let text_width = width.saturating_sub(4).max(1);

        let mut rows: Vec<Constraint> = spec
            .body
            .iter()
            .map(|block| Constraint::Length(content_height(block, text_width, theme)))
            .collect();
        rows.push(Constraint::Length(1));

        let body_height: u16 = rows
            .iter()
            .map(|c| match c {
                Constraint::Length(n) => *n,
                _ => 0,
            })
            .sum();
        let spacing = u16::try_from(spec.body.len()).unwrap_or(u16::MAX);
        // Borders, top padding, content, gaps between rows.
        let height = body_height
            .saturating_add(spacing)
            .saturating_add(3)
            .min(area.height);

        let popup = area.centered(Constraint::Length(width), Constraint::Length(height));
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(format!(" {} ", spec.title))
            .title_style(Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD))
            .title_top(
                Line::from(Span::styled(CLOSE_LABEL, Style::default().fg(theme.overlay1())))
                    .right_aligned(),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border_focused()))
            .padding(Padding::new(1, 1, 1, 0))
            .style(Style::default().bg(theme.base()));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let close_width = u16::try_from(CLOSE_LABEL.len()).unwrap_or(0);
        self.areas.dialog = popup;
        self.areas.close = Rect::new(
            popup.right().saturating_sub(close_width + 1),
            popup.y,
            close_width,
            1,
        )
        .intersection(popup);

        let areas = Layout::vertical(rows).spacing(1).split(inner);
        for (block, row) in spec.body.iter().zip(areas.iter()) {
            match block {
                Content::Text(_) | Content::Strong(_) => {
                    if let Some(paragraph) = text_paragraph(block, theme) {
                        frame.render_widget(paragraph, *row);
                    }
                }
                Content::Secret(value) => {
                    let field = Block::default()
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded)
                        .border_style(Style::default().fg(theme.overlay0()))
                        .title(" read-only ")
                        .title_style(Style::default().fg(theme.overlay1()));
                    frame.render_widget(
                        Paragraph::new(value.as_str())
                            .style(Style::default().fg(theme.yellow()).add_modifier(Modifier::BOLD))
                            .block(field),
                        *row,
                    );
                }
                Content::Input { .. } => self.input.render(frame, *row, theme),
                Content::Progress(_) => self.spinner.render(frame, *row, theme),
            }
        }

        if let Some(button_row) = areas.last() {
            self.areas.buttons = render_buttons(frame, *button_row, theme, spec, self.focus);
        }
    }
}

/// Word-wrapped paragraph for a text row. Used both to measure and to draw it.
fn text_paragraph<'a>(block: &'a Content, theme: &Theme) -> Option<Paragraph<'a>> {
    let (text, style) = match block {
        Content::Text(text) => (text, Style::default().fg(theme.text())),
        Content::Strong(text) => (
            text,
            Style::default()
                .fg(theme.lavender())
                .add_modifier(Modifier::BOLD),
        ),
        _ => return None,
    };
    Some(
        Paragraph::new(text.as_str())
            .style(style)
            .wrap(Wrap { trim: true }),
    )
}

fn content_height(block: &Content, width: u16, theme: &Theme) -> u16 {
    if let Some(paragraph) = text_paragraph(block, theme) {
        return u16::try_from(paragraph.line_count(width))
            .unwrap_or(u16::MAX)
            .max(1);
    }
    match block {
        Content::Secret(_) | Content::Input { .. } => 3,
        Content::Text(_) | Content::Strong(_) | Content::Progress(_) => 1,
    }
}

fn render_buttons<M>(
    frame: &mut Frame,
    row: Rect,
    theme: &Theme,
    spec: &ModalSpec<M>,
    focus: usize,
) -> Vec<Rect> {
    let labels: Vec<String> = spec.actions.iter().map(|a| format!("[ {} ]", a.label)).collect();
    let widths: Vec<u16> = labels
        .iter()
        .map(|l| u16::try_from(l.chars().count()).unwrap_or(u16::MAX))
        .collect();
    let gaps =
        BUTTON_GAP.saturating_mul(u16::try_from(labels.len().saturating_sub(1)).unwrap_or(0));
    let total = widths.iter().fold(gaps, |acc, w| acc.saturating_add(*w));

    let mut x = row.x + row.width.saturating_sub(total) / 2;
    let mut rects = Vec::with_capacity(labels.len());
    for (index, (label, width)) in labels.into_iter().zip(widths).enumerate() {
        let rect = Rect::new(x, row.y, width, 1).intersection(row);
        let button = &spec.actions[index];
        let mut style = match button.style {
            ButtonStyle::Default => Style::default().fg(theme.text()),
            ButtonStyle::Primary => Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD),
            ButtonStyle::Danger => Style::default().fg(theme.red()).add_modifier(Modifier::BOLD),
        };
        if index == focus {
            style = style.add_modifier(Modifier::REVERSED);
        }
        frame.render_widget(Paragraph::new(label).style(style).alignment(Alignment::Left), rect);
        rects.push(rect);
        x = x.saturating_add(width).saturating_add(BUTTON_GAP);
    }
    rects
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::modal::command::SubmitInput;
    use crate::modal::spec::ActionButton;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Msg {
        Copy,
        Close,
        Confirm,
        Cancel,
        Submit(String),
    }

    fn surface() -> ModalSurface<Msg> {
        ModalSurface::new(Arc::new(KeyResolver::default()))
    }

    fn created() -> ModalSpec<Msg> {
        ModalSpec::new("Server Created")
            .strong("test-box has been created.")
            .secret("abc123")
            .action(ActionButton::emit("Copy Key", Msg::Copy).primary())
            .action(ActionButton::emit("Close", Msg::Close))
    }

    fn confirm() -> ModalSpec<Msg> {
        ModalSpec::new("Confirm Removal")
            .text("Are you sure you want to remove your server?")
            .action(ActionButton::emit("Yes, Remove", Msg::Confirm).danger())
            .action(ActionButton::emit("Cancel", Msg::Cancel))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn draw(surface: &mut ModalSurface<Msg>) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal
            .draw(|frame| surface.render(frame, frame.area(), &Theme::default()))
            .unwrap();
        terminal
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_starts_hidden() {
        let mut surface = surface();
        assert!(!surface.is_visible());
        assert_eq!(surface.handle_key(key(KeyCode::Enter)).unwrap(), EventResult::Ignored);
    }

    #[test]
    fn test_hide_is_idempotent() {
        let mut surface = surface();
        surface.show(created());
        surface.hide();
        let generation = surface.generation();
        surface.hide();
        assert!(!surface.is_visible());
        assert!(surface.spec().is_none());
        assert_eq!(surface.generation(), generation);
    }

    #[test]
    fn test_show_replaces_previous_spec() {
        let mut surface = surface();
        surface.show(
            ModalSpec::new("Create Server")
                .input("my-server")
                .action(ActionButton::new("Create", SubmitInput::new(Msg::Submit))),
        );
        surface.handle_key(key(KeyCode::Char('x'))).unwrap();
        surface.show(confirm());

        let spec = surface.spec().unwrap();
        assert_eq!(spec.title, "Confirm Removal");
        assert_eq!(spec.labels(), vec!["Yes, Remove", "Cancel"]);
        assert_eq!(spec.body.len(), 1);
        assert_eq!(surface.form_values(), FormValues::default());
    }

    #[test]
    fn test_danger_button_not_focused_first() {
        let mut surface = surface();
        surface.show(confirm());
        assert_eq!(surface.focus(), 1);
        assert_eq!(
            surface.handle_key(key(KeyCode::Enter)).unwrap(),
            EventResult::Event(ModalEvent::Activated(Msg::Cancel))
        );
    }

    #[test]
    fn test_focus_cycles_and_activation_keeps_surface() {
        let mut surface = surface();
        surface.show(created());
        assert_eq!(surface.focus(), 0);
        surface.handle_key(key(KeyCode::Tab)).unwrap();
        assert_eq!(surface.focus(), 1);
        surface.handle_key(key(KeyCode::Tab)).unwrap();
        assert_eq!(surface.focus(), 0);
        surface.handle_key(key(KeyCode::BackTab)).unwrap();
        assert_eq!(surface.focus(), 1);

        surface.handle_key(key(KeyCode::Left)).unwrap();
        let result = surface.handle_key(key(KeyCode::Enter)).unwrap();
        assert_eq!(result, EventResult::Event(ModalEvent::Activated(Msg::Copy)));
        assert!(surface.is_visible());
    }

    #[test]
    fn test_escape_dismisses() {
        let mut surface = surface();
        surface.show(created());
        assert_eq!(
            surface.handle_key(key(KeyCode::Esc)).unwrap(),
            EventResult::Event(ModalEvent::Dismissed)
        );
        assert!(!surface.is_visible());
    }

    #[test]
    fn test_input_value_reaches_command() {
        let mut surface = surface();
        surface.show(
            ModalSpec::new("Create Server")
                .input("my-server")
                .action(ActionButton::new("Create", SubmitInput::new(Msg::Submit))),
        );
        for c in "Test Box".chars() {
            surface.handle_key(key(KeyCode::Char(c))).unwrap();
        }
        surface.handle_paste("!\n");
        assert_eq!(
            surface.handle_key(key(KeyCode::Enter)).unwrap(),
            EventResult::Event(ModalEvent::Activated(Msg::Submit("Test Box!".into())))
        );
    }

    #[test]
    fn test_keys_never_leak_while_visible() {
        let mut surface = surface();
        surface.show(created());
        assert_eq!(surface.handle_key(key(KeyCode::Char('q'))).unwrap(), EventResult::Consumed);
    }

    #[test]
    fn test_render_shows_content() {
        let mut surface = surface();
        surface.show(created());
        let terminal = draw(&mut surface);
        let text = screen_text(&terminal);
        assert!(text.contains("Server Created"));
        assert!(text.contains("abc123"));
        assert!(text.contains("[ Copy Key ]"));
        assert!(text.contains("[x]"));
    }

    #[test]
    fn test_long_message_wraps_without_clipping() {
        let words = [
            "alphaalphaalphaalphaAAA",
            "bravobravobravobravoBBB",
            "charliecharliecharlieCC",
            "deltadeltadeltadeltaDDD",
        ];
        let mut surface = surface();
        surface.show(
            ModalSpec::new("Error")
                .text(words.join(" "))
                .action(ActionButton::emit("Close", Msg::Close)),
        );
        let text = screen_text(&draw(&mut surface));
        for word in words {
            assert!(text.contains(word), "{word} was clipped");
        }
        assert!(text.contains("[ Close ]"));
    }

    #[test]
    fn test_click_inside_does_not_dismiss() {
        let mut surface = surface();
        surface.show(created());
        draw(&mut surface);

        let dialog = surface.areas.dialog;
        let inside = click(dialog.x + 2, dialog.y + 2);
        assert_eq!(surface.handle_mouse(inside), EventResult::Consumed);
        assert!(surface.is_visible());
    }

    #[test]
    fn test_backdrop_click_dismisses() {
        let mut surface = surface();
        surface.show(created());
        draw(&mut surface);

        assert_eq!(
            surface.handle_mouse(click(0, 0)),
            EventResult::Event(ModalEvent::Dismissed)
        );
        assert!(!surface.is_visible());
    }

    #[test]
    fn test_close_control_dismisses() {
        let mut surface = surface();
        surface.show(created());
        draw(&mut surface);

        let close = surface.areas.close;
        assert_eq!(
            surface.handle_mouse(click(close.x + 1, close.y)),
            EventResult::Event(ModalEvent::Dismissed)
        );
    }

    #[test]
    fn test_button_click_activates() {
        let mut surface = surface();
        surface.show(created());
        draw(&mut surface);

        let close_button = surface.areas.buttons[1];
        assert_eq!(
            surface.handle_mouse(click(close_button.x, close_button.y)),
            EventResult::Event(ModalEvent::Activated(Msg::Close))
        );
        assert_eq!(surface.focus(), 1);
    }
}
