use tracing::warn;

use crate::backend::{BackendRequest, BackendResult};
use crate::workflow::{Effect, Flow, FlowKind, InlineStatus, Outcome};

/// Rotates the dashboard access code. Everything is shown inline on the
/// settings page; no dialog is involved.
#[derive(Debug, Default)]
pub struct ResetAccessCode;

impl Flow for ResetAccessCode {
    fn kind(&self) -> FlowKind {
        FlowKind::ResetAccessCode
    }

    fn in_flight(&self) -> Outcome {
        Outcome::effects([Effect::ShowInline(InlineStatus::Pending)])
    }

    fn request(&mut self, _input: Option<String>) -> BackendRequest {
        BackendRequest::ResetAccessCode
    }

    fn resolve(&mut self, result: BackendResult) -> Outcome {
        match result {
            BackendResult::Success(payload) => match payload.secret("api_key") {
                Some(key) => Outcome::effects([
                    Effect::ShowInline(InlineStatus::NewCode(key.to_string())),
                    Effect::DisableAccessCodeReset,
                ]),
                None => {
                    warn!("Success response without an access code");
                    Outcome::effects([Effect::ShowInline(InlineStatus::Failed)])
                }
            },
            BackendResult::Failure(_) => {
                Outcome::effects([Effect::ShowInline(InlineStatus::Failed)])
            }
        }
    }
}
