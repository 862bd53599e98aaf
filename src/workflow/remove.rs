use crate::backend::{BackendRequest, BackendResult};
use crate::modal::{ActionButton, ModalSpec};
use crate::workflow::{Effect, Flow, FlowKind, Outcome, WorkflowMsg, error_modal};

const KIND: FlowKind = FlowKind::RemoveServer;

/// Removes the owned server after a confirmation. Success shows no dialog.
#[derive(Debug, Default)]
pub struct RemoveServer;

impl Flow for RemoveServer {
    fn kind(&self) -> FlowKind {
        KIND
    }

    fn prompt(&self) -> Option<ModalSpec<WorkflowMsg>> {
        Some(
            ModalSpec::new("Confirm Removal")
                .text("Are you sure you want to remove your server?")
                .action(ActionButton::emit("Yes, Remove", WorkflowMsg::Confirm(KIND)).danger())
                .action(ActionButton::emit("Cancel", WorkflowMsg::Cancel(KIND))),
        )
    }

    fn request(&mut self, _input: Option<String>) -> BackendRequest {
        BackendRequest::DeleteServer
    }

    fn resolve(&mut self, result: BackendResult) -> Outcome {
        match result {
            BackendResult::Success(_) => Outcome::effects([Effect::NavigateHome]),
            BackendResult::Failure(message) => Outcome::modal(error_modal("Error", message, KIND)),
        }
    }
}
