use tracing::warn;

use crate::backend::{BackendRequest, BackendResult, MALFORMED};
use crate::modal::{ActionButton, ModalSpec};
use crate::workflow::{Flow, FlowKind, Outcome, WorkflowMsg, error_modal};

const KIND: FlowKind = FlowKind::ResetServerCode;

#[derive(Debug, Default)]
pub struct ResetServerCode;

impl Flow for ResetServerCode {
    fn kind(&self) -> FlowKind {
        KIND
    }

    fn request(&mut self, _input: Option<String>) -> BackendRequest {
        BackendRequest::ResetServerCode
    }

    fn resolve(&mut self, result: BackendResult) -> Outcome {
        match result {
            BackendResult::Success(payload) => {
                let Some(code) = payload.secret("new_code") else {
                    warn!(flow = ?KIND, "Success response without a new code");
                    return Outcome::modal(error_modal("Error", MALFORMED.to_string(), KIND));
                };
                let code = code.to_string();
                Outcome::modal(
                    ModalSpec::new("New Server Key")
                        .text("Here is your new server access code:")
                        .secret(code.clone())
                        .action(
                            ActionButton::emit(
                                "Copy Code",
                                WorkflowMsg::Copy {
                                    value: code,
                                    what: "server code",
                                },
                            )
                            .primary(),
                        )
                        .action(ActionButton::emit("Close", WorkflowMsg::Close(KIND))),
                )
            }
            BackendResult::Failure(message) => Outcome::modal(error_modal("Error", message, KIND)),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::backend::Payload;

    #[test]
    fn test_starts_without_prompt() {
        assert!(ResetServerCode.prompt().is_none());
        assert!(ResetServerCode.in_flight().modal.unwrap().has_progress());
    }

    #[test]
    fn test_success_shows_code_without_follow_up() {
        let payload = json!({"status": "success", "new_code": "xyz789"});
        let outcome = ResetServerCode.resolve(BackendResult::Success(Payload::new(
            payload.as_object().cloned().unwrap(),
        )));
        assert!(outcome.on_dismiss.is_empty());
        let modal = outcome.modal.unwrap();
        assert_eq!(modal.title, "New Server Key");
        assert_eq!(modal.secrets().collect::<Vec<_>>(), vec!["xyz789"]);
        assert_eq!(modal.labels(), vec!["Copy Code", "Close"]);
    }

    #[test]
    fn test_success_without_code_is_an_error() {
        let payload = json!({"status": "success"});
        let outcome = ResetServerCode.resolve(BackendResult::Success(Payload::new(
            payload.as_object().cloned().unwrap(),
        )));
        let modal = outcome.modal.unwrap();
        assert_eq!(modal.title, "Error");
        assert_eq!(modal.secrets().count(), 0);
        assert_eq!(modal.labels(), vec!["Close"]);
    }
}
