//! Action workflows.
//!
//! Every mutating action follows the same shape: trigger, optionally collect
//! input or a confirmation, make one backend call, then present the outcome.
//! [`Flow`] describes what a single action shows and sends; the runner drives
//! the shared state machine and the modal surface around it.

mod create;
mod remove;
mod reset_access_code;
mod reset_server_code;
mod runner;
mod state;

use crate::backend::{BackendRequest, BackendResult};
use crate::modal::{ActionButton, ModalSpec};

pub use runner::Workflows;
pub use state::{InvalidTransition, WorkflowState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowKind {
    CreateServer,
    RemoveServer,
    ResetServerCode,
    ResetAccessCode,
}

impl FlowKind {
    pub const ALL: [Self; 4] = [
        Self::CreateServer,
        Self::RemoveServer,
        Self::ResetServerCode,
        Self::ResetAccessCode,
    ];

    pub const fn title(self) -> &'static str {
        match self {
            Self::CreateServer => "Create server",
            Self::RemoveServer => "Remove server",
            Self::ResetServerCode => "Reset server code",
            Self::ResetAccessCode => "Reset access code",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Messages carried by workflow dialog buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowMsg {
    Submit(FlowKind, String),
    Confirm(FlowKind),
    Cancel(FlowKind),
    Close(FlowKind),
    Copy { value: String, what: &'static str },
}

/// Access-code status shown inline on the settings page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineStatus {
    Pending,
    NewCode(String),
    Failed,
}

/// Side effect a workflow asks the application to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Call { kind: FlowKind, request: BackendRequest },
    Reload,
    NavigateHome,
    ShowInline(InlineStatus),
    DisableAccessCodeReset,
    Copy { value: String, what: &'static str },
}

/// What a flow presents at one step.
#[derive(Debug, Default)]
pub struct Outcome {
    pub modal: Option<ModalSpec<WorkflowMsg>>,
    /// Run as soon as the step is presented.
    pub effects: Vec<Effect>,
    /// Run when the user dismisses the presented modal.
    pub on_dismiss: Vec<Effect>,
}

impl Outcome {
    pub fn modal(spec: ModalSpec<WorkflowMsg>) -> Self {
        Self {
            modal: Some(spec),
            ..Self::default()
        }
    }

    pub fn effects(effects: impl IntoIterator<Item = Effect>) -> Self {
        Self {
            effects: effects.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn on_dismiss(mut self, effect: Effect) -> Self {
        self.on_dismiss.push(effect);
        self
    }
}

/// One concrete action.
pub trait Flow {
    fn kind(&self) -> FlowKind;

    /// Dialog shown before the call. `None` calls the backend straight away.
    fn prompt(&self) -> Option<ModalSpec<WorkflowMsg>> {
        None
    }

    /// Presentation while the call is in flight.
    fn in_flight(&self) -> Outcome {
        Outcome::modal(
            ModalSpec::new(self.kind().title()).progress("Waiting for the server…"),
        )
    }

    /// Build the request from the collected input.
    fn request(&mut self, input: Option<String>) -> BackendRequest;

    fn resolve(&mut self, result: BackendResult) -> Outcome;
}

fn error_modal(title: &str, message: String, kind: FlowKind) -> ModalSpec<WorkflowMsg> {
    ModalSpec::new(title)
        .text(message)
        .action(ActionButton::emit("Close", WorkflowMsg::Close(kind)))
}
