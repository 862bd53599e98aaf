use crossterm::event::KeyCode;

use crate::config::key::{Key, KeyBinding};
use crate::config::keybindings::{
    DashboardKeybindings, DialogKeybindings, GlobalKeybindings, SettingsKeybindings,
};

impl Default for GlobalKeybindings {
    fn default() -> Self {
        Self {
            quit: Key::new(KeyCode::Char('q')).into(),
            help: Key::new(KeyCode::Char('?')).into(),
            reload: KeyBinding::multiple(vec![
                Key::new(KeyCode::Char('r')),
                Key::new(KeyCode::F(5)),
            ]),
            next_page: Key::new(KeyCode::Tab).into(),
            prev_page: Key::new(KeyCode::BackTab).into(),
            dashboard: Key::new(KeyCode::Char('1')).into(),
            analytics: Key::new(KeyCode::Char('2')).into(),
            settings: Key::new(KeyCode::Char('3')).into(),
        }
    }
}

impl Default for DialogKeybindings {
    fn default() -> Self {
        Self {
            activate: Key::new(KeyCode::Enter).into(),
            close: Key::new(KeyCode::Esc).into(),
            next_button: KeyBinding::multiple(vec![
                Key::new(KeyCode::Tab),
                Key::new(KeyCode::Right),
            ]),
            prev_button: KeyBinding::multiple(vec![
                Key::new(KeyCode::BackTab),
                Key::new(KeyCode::Left),
            ]),
        }
    }
}

impl Default for DashboardKeybindings {
    fn default() -> Self {
        Self {
            create: Key::new(KeyCode::Char('n')).into(),
            remove: KeyBinding::multiple(vec![
                Key::new(KeyCode::Char('d')),
                Key::new(KeyCode::Delete),
            ]),
        }
    }
}

impl Default for SettingsKeybindings {
    fn default() -> Self {
        Self {
            reset_server_code: Key::new(KeyCode::Char('s')).into(),
            reset_access_code: Key::new(KeyCode::Char('a')).into(),
        }
    }
}
