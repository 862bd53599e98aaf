use std::sync::Arc;

use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::Block;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, error, info, warn};

use crate::Theme;
use crate::backend::{Account, AnalyticsSeries, Backend, BackendResult};
use crate::commands::{
    BackendCallCmd, Command, CommandEnv, CopyToClipboardCmd, LoadAccountCmd, LoadSeriesCmd,
};
use crate::config::{DialogAction, GlobalAction, KeyResolver};
use crate::modal::{ModalEvent, ModalSurface};
use crate::page::{AnalyticsPage, DashboardPage, Page, PageEvent, PageId, SettingsPage};
use crate::tui::{Event, Tui};
use crate::ui::{
    Component, EventResult, HelpOverlay, Keybinding, Result, StatusBar, Toast, ToastManager,
    ToastType,
};
use crate::workflow::{Effect, FlowKind, WorkflowMsg, WorkflowState, Workflows};

const FRAME_RATE: f64 = 30.0;
const TICK_RATE: f64 = 8.0;

/// Messages sent back to the App by spawned commands.
#[derive(Debug)]
pub enum AppMessage {
    ShowToast {
        message: String,
        toast_type: ToastType,
    },
    /// A workflow's backend call finished.
    WorkflowResolved {
        kind: FlowKind,
        result: BackendResult,
    },
    AccountLoaded(Account),
    AccountFailed(String),
    SeriesLoaded(Option<AnalyticsSeries>),
}

enum Step {
    Event(Option<Event>),
    Message(AppMessage),
}

pub struct App {
    resolver: Arc<KeyResolver>,
    theme: Theme,
    env: CommandEnv,
    msg_rx: UnboundedReceiver<AppMessage>,

    surface: ModalSurface<WorkflowMsg>,
    workflows: Workflows,

    active: PageId,
    dashboard: DashboardPage,
    analytics: AnalyticsPage,
    settings: SettingsPage,

    status_bar: StatusBar,
    toasts: ToastManager,
    help: HelpOverlay,
    account_loading: bool,

    should_quit: bool,
    should_suspend: bool,
}

impl App {
    pub fn new(
        backend: Arc<dyn Backend>,
        backend_url: &str,
        resolver: Arc<KeyResolver>,
        theme: Theme,
        start_page: PageId,
    ) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Self {
            env: CommandEnv::new(backend, msg_tx),
            msg_rx,
            surface: ModalSurface::new(resolver.clone()),
            workflows: Workflows::new(),
            active: start_page,
            dashboard: DashboardPage::new(resolver.clone()),
            analytics: AnalyticsPage::new(),
            settings: SettingsPage::new(resolver.clone()),
            status_bar: StatusBar::new(backend_url),
            toasts: ToastManager::new(),
            help: HelpOverlay::new(),
            account_loading: false,
            resolver,
            theme,
            should_quit: false,
            should_suspend: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new(FRAME_RATE, TICK_RATE)?;
        tui.enter()?;
        self.start();

        loop {
            let step = tokio::select! {
                event = tui.next_event() => Step::Event(event),
                Some(message) = self.msg_rx.recv() => Step::Message(message),
            };
            match step {
                Step::Event(Some(event)) => self.handle_event(event, &mut tui)?,
                Step::Event(None) => break,
                Step::Message(message) => self.handle_message(message),
            }

            if self.should_suspend {
                tui.suspend()?;
                self.should_suspend = false;
                tui.enter()?;
                tui.clear()?;
            } else if self.should_quit {
                break;
            }
        }

        tui.exit()?;
        info!("Shutting down");
        Ok(())
    }

    /// Initial account load and the start page's entry hook.
    fn start(&mut self) {
        self.reload();
        if let Some(event) = self.page_mut().on_enter() {
            self.handle_page_event(event);
        }
    }

    fn handle_event(&mut self, event: Event, tui: &mut Tui) -> Result<()> {
        match event {
            Event::Init => debug!("Terminal ready"),
            Event::Quit => self.should_quit = true,
            Event::Suspend => self.should_suspend = true,
            Event::Error(e) => warn!(error = %e, "Terminal event error"),
            Event::Tick => self.handle_tick(),
            Event::Render => self.draw(tui)?,
            Event::Resize(width, height) => {
                tui.resize(Rect::new(0, 0, width, height))?;
                self.draw(tui)?;
            }
            Event::Key(key) => self.handle_key(key)?,
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Paste(text) => self.surface.handle_paste(&text),
        }
        Ok(())
    }

    fn handle_tick(&mut self) {
        self.toasts.handle_tick();
        self.surface.handle_tick();
        self.page_mut().handle_tick();
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // The dialog is modal: nothing below it sees the key.
        if self.surface.is_visible() {
            let result = self.surface.handle_key(key)?;
            self.handle_modal_result(result);
            return Ok(());
        }

        if self.help.is_visible() {
            if self.resolver.matches_global(&key, GlobalAction::Quit) {
                self.should_quit = true;
            } else if self.resolver.matches_global(&key, GlobalAction::Help)
                || self.resolver.matches_dialog(&key, DialogAction::Close)
            {
                self.help.hide();
            }
            return Ok(());
        }

        if self.handle_global_key(&key) {
            return Ok(());
        }

        if let EventResult::Event(event) = self.page_mut().handle_key(key)? {
            self.handle_page_event(event);
        }
        Ok(())
    }

    fn handle_global_key(&mut self, key: &KeyEvent) -> bool {
        let resolver = self.resolver.clone();
        let matches = |action| resolver.matches_global(key, action);

        if matches(GlobalAction::Quit) {
            self.should_quit = true;
        } else if matches(GlobalAction::Help) {
            self.help.toggle();
        } else if matches(GlobalAction::Reload) {
            self.reload();
        } else if matches(GlobalAction::NextPage) {
            self.switch_page(self.active.next());
        } else if matches(GlobalAction::PrevPage) {
            self.switch_page(self.active.prev());
        } else if matches(GlobalAction::Dashboard) {
            self.switch_page(PageId::Dashboard);
        } else if matches(GlobalAction::Analytics) {
            self.switch_page(PageId::Analytics);
        } else if matches(GlobalAction::Settings) {
            self.switch_page(PageId::Settings);
        } else {
            return false;
        }
        true
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let result = self.surface.handle_mouse(mouse);
        self.handle_modal_result(result);
    }

    fn handle_modal_result(&mut self, result: EventResult<ModalEvent<WorkflowMsg>>) {
        let effects = match result {
            EventResult::Event(ModalEvent::Activated(msg)) => {
                self.workflows.handle(msg, &mut self.surface)
            }
            EventResult::Event(ModalEvent::Dismissed) => self.workflows.dismissed(&self.surface),
            EventResult::Ignored | EventResult::Consumed => return,
        };
        self.apply_effects(effects);
    }

    fn handle_page_event(&mut self, event: PageEvent) {
        match event {
            PageEvent::Trigger(kind) => match self.workflows.trigger(kind, &mut self.surface) {
                Ok(effects) => {
                    info!(flow = ?kind, "Workflow started");
                    self.apply_effects(effects);
                }
                Err(err) => {
                    warn!(flow = ?kind, error = %err, "Trigger rejected");
                    self.toasts.show(Toast::new(
                        format!("{} is already in progress", kind.title()),
                        ToastType::Info,
                    ));
                }
            },
            PageEvent::LoadSeries => self.spawn(LoadSeriesCmd::new(self.env.clone())),
        }
    }

    fn handle_message(&mut self, message: AppMessage) {
        match message {
            AppMessage::ShowToast {
                message,
                toast_type,
            } => self.toasts.show(Toast::new(message, toast_type)),
            AppMessage::WorkflowResolved { kind, result } => {
                let effects = self.workflows.resolve(kind, result, &mut self.surface);
                self.apply_effects(effects);
            }
            AppMessage::AccountLoaded(account) => {
                self.account_loading = false;
                self.status_bar.set_account(&account);
                self.dashboard.set_account(&account);
                self.analytics.set_account(&account);
                self.settings.set_account(&account);
            }
            AppMessage::AccountFailed(reason) => {
                self.account_loading = false;
                debug!(reason = %reason, "Account unavailable");
                self.toasts
                    .show(Toast::new("Could not load account", ToastType::Error));
            }
            AppMessage::SeriesLoaded(series) => self.analytics.set_series(series),
        }
    }

    fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Call { kind, request } => {
                    info!(flow = ?kind, request = request.describe(), "Calling backend");
                    self.spawn(BackendCallCmd::new(kind, request, self.env.clone()));
                }
                Effect::Reload => self.reload(),
                Effect::NavigateHome => {
                    self.switch_page(PageId::Dashboard);
                    self.reload();
                }
                Effect::ShowInline(status) => self.settings.set_inline(status),
                Effect::DisableAccessCodeReset => self.settings.lock_access_code(),
                Effect::Copy { value, what } => {
                    self.spawn(CopyToClipboardCmd::new(value, what, self.env.clone()));
                }
            }
        }
    }

    fn reload(&mut self) {
        self.account_loading = true;
        self.spawn(LoadAccountCmd::new(self.env.clone()));
    }

    fn spawn(&self, command: impl Command) {
        let name = command.name();
        let env = self.env.clone();
        debug!(command = %name, "Spawning command");
        tokio::spawn(async move {
            if let Err(e) = Box::new(command).execute().await {
                error!(command = %name, error = %e, "Command failed");
                env.show_toast(format!("{name} failed"), ToastType::Error);
            }
        });
    }

    fn switch_page(&mut self, page: PageId) {
        if page == self.active {
            return;
        }
        self.page_mut().on_leave();
        self.active = page;
        if let Some(event) = self.page_mut().on_enter() {
            self.handle_page_event(event);
        }
    }

    fn page_mut(&mut self) -> &mut dyn Page {
        match self.active {
            PageId::Dashboard => &mut self.dashboard,
            PageId::Analytics => &mut self.analytics,
            PageId::Settings => &mut self.settings,
        }
    }

    fn page(&self) -> &dyn Page {
        match self.active {
            PageId::Dashboard => &self.dashboard,
            PageId::Analytics => &self.analytics,
            PageId::Settings => &self.settings,
        }
    }

    fn busy(&self) -> bool {
        FlowKind::ALL
            .into_iter()
            .any(|kind| self.workflows.state(kind) == WorkflowState::AwaitingBackend)
    }

    fn global_keybindings(&self) -> Vec<Keybinding> {
        let key = |action| self.resolver.display_global(action);
        vec![
            Keybinding::new(key(GlobalAction::NextPage), "Next page"),
            Keybinding::new(key(GlobalAction::PrevPage), "Previous page"),
            Keybinding::new(key(GlobalAction::Reload), "Reload account"),
            Keybinding::new(key(GlobalAction::Help), "Toggle help"),
            Keybinding::new(key(GlobalAction::Quit), "Quit"),
        ]
    }

    fn dialog_keybindings(&self) -> Vec<Keybinding> {
        let key = |action| self.resolver.display_dialog(action);
        vec![
            Keybinding::new(key(DialogAction::Activate), "Press focused button"),
            Keybinding::new(key(DialogAction::NextButton), "Next button"),
            Keybinding::new(key(DialogAction::PrevButton), "Previous button"),
            Keybinding::new(key(DialogAction::Close), "Close dialog"),
        ]
    }

    fn draw(&mut self, tui: &mut Tui) -> Result<()> {
        tui.draw(|frame| self.render(frame))?;
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let theme = self.theme;
        frame.render_widget(Block::default().style(Style::default().bg(theme.base())), area);

        let [header_area, page_area, hints_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(area);

        self.status_bar.set_loading(self.account_loading || self.busy());
        self.status_bar.render(frame, header_area, &theme, self.active);
        self.page_mut().render(frame, page_area, &theme);

        let mut hints = self.page().keybindings();
        hints.push(Keybinding::new(
            self.resolver.display_global(GlobalAction::Help),
            "Help",
        ));
        hints.push(Keybinding::new(
            self.resolver.display_global(GlobalAction::Quit),
            "Quit",
        ));
        self.status_bar.render_hints(frame, hints_area, &theme, &hints);

        self.toasts.render(frame, page_area, &theme);

        if self.help.is_visible() {
            let sections = [
                ("Global", self.global_keybindings()),
                (self.active.title(), self.page().keybindings()),
                ("Dialog", self.dialog_keybindings()),
            ];
            self.help.render(frame, area, &theme, &sections);
        }

        // The dialog is always on top.
        self.surface.render(frame, area, &theme);
    }
}
