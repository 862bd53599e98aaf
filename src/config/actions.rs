#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalAction {
    Quit,
    Help,
    Reload,
    NextPage,
    PrevPage,
    Dashboard,
    Analytics,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    Activate,
    Close,
    NextButton,
    PrevButton,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardAction {
    Create,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsAction {
    ResetServerCode,
    ResetAccessCode,
}
