use serde::{Deserialize, Serialize};

use crate::config::key::KeyBinding;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalKeybindings {
    pub quit: KeyBinding,
    pub help: KeyBinding,
    pub reload: KeyBinding,
    pub next_page: KeyBinding,
    pub prev_page: KeyBinding,
    pub dashboard: KeyBinding,
    pub analytics: KeyBinding,
    pub settings: KeyBinding,
}

/// Keys understood by the modal surface while a dialog is open.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogKeybindings {
    pub activate: KeyBinding,
    pub close: KeyBinding,
    pub next_button: KeyBinding,
    pub prev_button: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardKeybindings {
    pub create: KeyBinding,
    pub remove: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsKeybindings {
    pub reset_server_code: KeyBinding,
    pub reset_access_code: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KeybindingsConfig {
    pub global: GlobalKeybindings,
    pub dialog: DialogKeybindings,
    pub dashboard: DashboardKeybindings,
    pub settings: SettingsKeybindings,
}
