use async_trait::async_trait;

use crate::commands::{Command, CommandEnv};
use crate::ui::ToastType;

/// Copies a one-time value to the clipboard and confirms with a toast.
pub struct CopyToClipboardCmd {
    value: String,
    what: &'static str,
    env: CommandEnv,
}

impl CopyToClipboardCmd {
    pub fn new(value: impl Into<String>, what: &'static str, env: CommandEnv) -> Self {
        Self {
            value: value.into(),
            what,
            env,
        }
    }
}

#[async_trait]
impl Command for CopyToClipboardCmd {
    fn name(&self) -> String {
        format!("Copy {}", self.what)
    }

    async fn execute(self: Box<Self>) -> color_eyre::Result<()> {
        // Never log the value itself.
        self.env.set_clipboard(&self.value)?;
        self.env
            .show_toast(format!("Copied {}", self.what), ToastType::Success);
        Ok(())
    }
}
