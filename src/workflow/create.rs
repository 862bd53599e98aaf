use tracing::warn;

use crate::backend::{BackendRequest, BackendResult, MALFORMED};
use crate::modal::{ActionButton, ModalSpec, SubmitInput};
use crate::workflow::{Effect, Flow, FlowKind, Outcome, WorkflowMsg, error_modal};

const KIND: FlowKind = FlowKind::CreateServer;

/// Trim, lowercase and join whitespace-separated words with `-`.
///
/// Applying it twice gives the same identifier as applying it once.
pub fn normalize_server_id(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

#[derive(Debug, Default)]
pub struct CreateServer {
    requested: String,
}

impl Flow for CreateServer {
    fn kind(&self) -> FlowKind {
        KIND
    }

    fn prompt(&self) -> Option<ModalSpec<WorkflowMsg>> {
        Some(
            ModalSpec::new("Create Server")
                .text("Choose a name for your server. Spaces become dashes.")
                .input("my-server")
                .action(
                    ActionButton::new(
                        "Create",
                        SubmitInput::new(|name| WorkflowMsg::Submit(KIND, name)),
                    )
                    .primary(),
                )
                .action(ActionButton::emit("Cancel", WorkflowMsg::Cancel(KIND))),
        )
    }

    fn request(&mut self, input: Option<String>) -> BackendRequest {
        self.requested = normalize_server_id(input.as_deref().unwrap_or_default());
        BackendRequest::CreateServer {
            server_id: self.requested.clone(),
        }
    }

    fn resolve(&mut self, result: BackendResult) -> Outcome {
        let requested = std::mem::take(&mut self.requested);
        match result {
            BackendResult::Success(payload) => {
                let Some(secret) = payload.secret("secret_key") else {
                    warn!(flow = ?KIND, "Success response without a secret key");
                    return Outcome::modal(error_modal(
                        "Error Creating Server",
                        MALFORMED.to_string(),
                        KIND,
                    ));
                };
                let secret = secret.to_string();
                let name = payload.str("owned_server").unwrap_or(requested.as_str());
                Outcome::modal(
                    ModalSpec::new("Server Created")
                        .strong(format!("{name} has been created."))
                        .text("Secret key (save this, you won't see it again):")
                        .secret(secret.clone())
                        .action(
                            ActionButton::emit(
                                "Copy Key",
                                WorkflowMsg::Copy {
                                    value: secret,
                                    what: "secret key",
                                },
                            )
                            .primary(),
                        )
                        .action(ActionButton::emit("Close", WorkflowMsg::Close(KIND))),
                )
                .on_dismiss(Effect::Reload)
            }
            BackendResult::Failure(message) => {
                Outcome::modal(error_modal("Error Creating Server", message, KIND))
            }
        }
    }
}
