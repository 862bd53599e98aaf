use std::sync::Arc;

use crossterm::event::KeyEvent;

use crate::config::actions::{DashboardAction, DialogAction, GlobalAction, SettingsAction};
use crate::config::key::KeyBinding;
use crate::config::keybindings::KeybindingsConfig;

/// Maps key events to actions using the configured bindings.
pub struct KeyResolver {
    pub keybindings: Arc<KeybindingsConfig>,
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self::new(Arc::new(KeybindingsConfig::default()))
    }
}

impl KeyResolver {
    pub const fn new(keybindings: Arc<KeybindingsConfig>) -> Self {
        Self { keybindings }
    }

    fn global(&self, action: GlobalAction) -> &KeyBinding {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => &kb.quit,
            GlobalAction::Help => &kb.help,
            GlobalAction::Reload => &kb.reload,
            GlobalAction::NextPage => &kb.next_page,
            GlobalAction::PrevPage => &kb.prev_page,
            GlobalAction::Dashboard => &kb.dashboard,
            GlobalAction::Analytics => &kb.analytics,
            GlobalAction::Settings => &kb.settings,
        }
    }

    fn dialog(&self, action: DialogAction) -> &KeyBinding {
        let kb = &self.keybindings.dialog;
        match action {
            DialogAction::Activate => &kb.activate,
            DialogAction::Close => &kb.close,
            DialogAction::NextButton => &kb.next_button,
            DialogAction::PrevButton => &kb.prev_button,
        }
    }

    fn dashboard(&self, action: DashboardAction) -> &KeyBinding {
        let kb = &self.keybindings.dashboard;
        match action {
            DashboardAction::Create => &kb.create,
            DashboardAction::Remove => &kb.remove,
        }
    }

    fn settings(&self, action: SettingsAction) -> &KeyBinding {
        let kb = &self.keybindings.settings;
        match action {
            SettingsAction::ResetServerCode => &kb.reset_server_code,
            SettingsAction::ResetAccessCode => &kb.reset_access_code,
        }
    }

    // Global actions
    pub fn matches_global(&self, event: &KeyEvent, action: GlobalAction) -> bool {
        self.global(action).matches(event)
    }

    pub fn display_global(&self, action: GlobalAction) -> String {
        self.global(action).display()
    }

    // Dialog actions
    pub fn matches_dialog(&self, event: &KeyEvent, action: DialogAction) -> bool {
        self.dialog(action).matches(event)
    }

    pub fn display_dialog(&self, action: DialogAction) -> String {
        self.dialog(action).display()
    }

    // Dashboard actions
    pub fn matches_dashboard(&self, event: &KeyEvent, action: DashboardAction) -> bool {
        self.dashboard(action).matches(event)
    }

    pub fn display_dashboard(&self, action: DashboardAction) -> String {
        self.dashboard(action).display()
    }

    // Settings actions
    pub fn matches_settings(&self, event: &KeyEvent, action: SettingsAction) -> bool {
        self.settings(action).matches(event)
    }

    pub fn display_settings(&self, action: SettingsAction) -> String {
        self.settings(action).display()
    }
}
