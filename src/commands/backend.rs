use async_trait::async_trait;
use tracing::{info, warn};

use crate::app::AppMessage;
use crate::backend::BackendRequest;
use crate::commands::{Command, CommandEnv};
use crate::workflow::FlowKind;

/// Makes one workflow call and hands the classified result back.
pub struct BackendCallCmd {
    kind: FlowKind,
    request: BackendRequest,
    env: CommandEnv,
}

impl BackendCallCmd {
    pub const fn new(kind: FlowKind, request: BackendRequest, env: CommandEnv) -> Self {
        Self { kind, request, env }
    }
}

#[async_trait]
impl Command for BackendCallCmd {
    fn name(&self) -> String {
        self.kind.title().to_string()
    }

    async fn execute(self: Box<Self>) -> color_eyre::Result<()> {
        let result = self.env.backend().call(&self.request).await;
        info!(flow = ?self.kind, success = result.is_success(), "Backend call finished");
        self.env.send(AppMessage::WorkflowResolved {
            kind: self.kind,
            result,
        });
        Ok(())
    }
}

/// Fetches the account summary shown in the header and on the pages.
pub struct LoadAccountCmd {
    env: CommandEnv,
}

impl LoadAccountCmd {
    pub const fn new(env: CommandEnv) -> Self {
        Self { env }
    }
}

#[async_trait]
impl Command for LoadAccountCmd {
    fn name(&self) -> String {
        "Load account".to_string()
    }

    async fn execute(self: Box<Self>) -> color_eyre::Result<()> {
        match self.env.backend().account().await {
            Ok(account) => self.env.send(AppMessage::AccountLoaded(account)),
            Err(err) => {
                warn!(error = %err, "Failed to load account");
                self.env.send(AppMessage::AccountFailed(err.to_string()));
            }
        }
        Ok(())
    }
}

/// Fetches the analytics series. Failures are only logged.
pub struct LoadSeriesCmd {
    env: CommandEnv,
}

impl LoadSeriesCmd {
    pub const fn new(env: CommandEnv) -> Self {
        Self { env }
    }
}

#[async_trait]
impl Command for LoadSeriesCmd {
    fn name(&self) -> String {
        "Load analytics".to_string()
    }

    async fn execute(self: Box<Self>) -> color_eyre::Result<()> {
        let series = match self.env.backend().analytics().await {
            Ok(series) => Some(series),
            Err(err) => {
                warn!(error = %err, "Failed to load analytics series");
                None
            }
        };
        self.env.send(AppMessage::SeriesLoaded(series));
        Ok(())
    }
}
