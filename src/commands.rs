//! Async side effects.
//!
//! Backend calls and clipboard access run outside the event loop. The App
//! spawns a [`Command`] and the command reports back with an
//! [`AppMessage`](crate::app::AppMessage) through its [`CommandEnv`].

mod backend;
mod clipboard;
mod env;

use async_trait::async_trait;

pub use backend::{BackendCallCmd, LoadAccountCmd, LoadSeriesCmd};
pub use clipboard::CopyToClipboardCmd;
pub use env::CommandEnv;

/// Async command that performs a side effect.
#[async_trait]
pub trait Command: Send + 'static {
    /// Human-readable name used in logs and failure toasts.
    fn name(&self) -> String;

    async fn execute(self: Box<Self>) -> color_eyre::Result<()>;
}
