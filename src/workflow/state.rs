/// Where an action workflow is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WorkflowState {
    #[default]
    Idle,
    /// A prompt or confirmation dialog is on screen.
    AwaitingInput,
    /// Exactly one backend call is in flight.
    AwaitingBackend,
    /// The outcome is being presented.
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowEvent {
    Trigger { needs_input: bool },
    Confirm,
    Cancel,
    Respond,
    Dismiss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{event:?} is not allowed while {state:?}")]
pub struct InvalidTransition {
    pub state: WorkflowState,
    pub event: WorkflowEvent,
}

/// Apply `event` to `state`.
///
/// A trigger restarts a flow from any state except `AwaitingBackend`, so a
/// second call can never race the first.
pub const fn transition(
    state: WorkflowState,
    event: WorkflowEvent,
) -> Result<WorkflowState, InvalidTransition> {
    use WorkflowEvent as E;
    use WorkflowState as S;

    match (state, event) {
        (S::Idle | S::AwaitingInput | S::Resolved, E::Trigger { needs_input: true }) => {
            Ok(S::AwaitingInput)
        }
        (S::Idle | S::AwaitingInput | S::Resolved, E::Trigger { needs_input: false })
        | (S::AwaitingInput, E::Confirm) => Ok(S::AwaitingBackend),
        (S::AwaitingInput, E::Cancel) | (S::Resolved, E::Dismiss) => Ok(S::Idle),
        (S::AwaitingBackend, E::Respond) => Ok(S::Resolved),
        _ => Err(InvalidTransition { state, event }),
    }
}
