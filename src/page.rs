//! Full-page views.
//!
//! Pages own the trigger controls for the workflows and translate key presses
//! into [`PageEvent`]s. They never talk to the backend or the modal surface.

mod analytics;
mod dashboard;
mod settings;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::Theme;
use crate::backend::Account;
use crate::ui::{EventResult, Keybinding, Result};
use crate::workflow::FlowKind;

pub use analytics::AnalyticsPage;
pub use dashboard::DashboardPage;
pub use settings::SettingsPage;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum PageId {
    #[default]
    Dashboard,
    Analytics,
    Settings,
}

impl PageId {
    pub const ALL: [Self; 3] = [Self::Dashboard, Self::Analytics, Self::Settings];

    pub const fn title(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Analytics => "Analytics",
            Self::Settings => "Settings",
        }
    }

    pub const fn next(self) -> Self {
        match self {
            Self::Dashboard => Self::Analytics,
            Self::Analytics => Self::Settings,
            Self::Settings => Self::Dashboard,
        }
    }

    pub const fn prev(self) -> Self {
        match self {
            Self::Dashboard => Self::Settings,
            Self::Analytics => Self::Dashboard,
            Self::Settings => Self::Analytics,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    /// Start a workflow.
    Trigger(FlowKind),
    /// Fetch the analytics series.
    LoadSeries,
}

pub trait Page {
    /// Handle a key event, possibly emitting a page event.
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<PageEvent>> {
        _ = key;
        Ok(EventResult::Ignored)
    }

    fn handle_tick(&mut self) {}

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);

    /// Key hints for this page.
    fn keybindings(&self) -> Vec<Keybinding> {
        vec![]
    }

    fn set_account(&mut self, account: &Account) {
        _ = account;
    }

    /// Called when the page becomes the active one.
    fn on_enter(&mut self) -> Option<PageEvent> {
        None
    }

    /// Called when another page becomes active.
    fn on_leave(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_and_prev_cycle() {
        for page in PageId::ALL {
            assert_eq!(page.next().prev(), page);
        }
        assert_eq!(PageId::Settings.next(), PageId::Dashboard);
    }
}
