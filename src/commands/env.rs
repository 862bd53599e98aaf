use std::sync::{Arc, Mutex};

use arboard::Clipboard;
use tokio::sync::mpsc::UnboundedSender;

use crate::app::AppMessage;
use crate::backend::Backend;
use crate::ui::ToastType;

/// Shared resources handed to every command.
///
/// Cloning is cheap; everything is behind an `Arc` or a channel sender.
#[derive(Clone)]
pub struct CommandEnv {
    backend: Arc<dyn Backend>,
    clipboard: Arc<Mutex<Option<Clipboard>>>,
    app_tx: UnboundedSender<AppMessage>,
}

impl CommandEnv {
    pub fn new(backend: Arc<dyn Backend>, app_tx: UnboundedSender<AppMessage>) -> Self {
        Self {
            backend,
            clipboard: Arc::new(Mutex::new(None)),
            app_tx,
        }
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    /// Copy text to the system clipboard.
    ///
    /// On Linux the clipboard is served by the owning process, so the handle
    /// is kept for the lifetime of the application.
    pub fn set_clipboard(&self, text: &str) -> color_eyre::Result<()> {
        let mut guard = self
            .clipboard
            .lock()
            .map_err(|e| color_eyre::eyre::eyre!("Failed to lock clipboard: {e}"))?;

        if guard.is_none() {
            *guard = Some(Clipboard::new()?);
        }
        if let Some(clipboard) = guard.as_mut() {
            clipboard.set_text(text)?;
        }
        Ok(())
    }

    pub fn send(&self, message: AppMessage) {
        // The receiver only goes away during shutdown.
        let _ = self.app_tx.send(message);
    }

    pub fn show_toast(&self, message: impl Into<String>, toast_type: ToastType) {
        self.send(AppMessage::ShowToast {
            message: message.into(),
            toast_type,
        });
    }
}
