use tracing::{debug, warn};

use crate::backend::BackendResult;
use crate::modal::{ModalSpec, ModalSurface};
use crate::workflow::create::CreateServer;
use crate::workflow::remove::RemoveServer;
use crate::workflow::reset_access_code::ResetAccessCode;
use crate::workflow::reset_server_code::ResetServerCode;
use crate::workflow::state::{InvalidTransition, WorkflowEvent, WorkflowState, transition};
use crate::workflow::{Effect, Flow, FlowKind, Outcome, WorkflowMsg};

type Surface = ModalSurface<WorkflowMsg>;

/// Drives one [`Flow`] through the shared state machine.
struct ActionWorkflow {
    flow: Box<dyn Flow>,
    state: WorkflowState,
    on_dismiss: Vec<Effect>,
    /// Surface generation of the last dialog this workflow showed.
    shown: Option<u64>,
}

impl ActionWorkflow {
    fn new(flow: Box<dyn Flow>) -> Self {
        Self {
            flow,
            state: WorkflowState::Idle,
            on_dismiss: Vec::new(),
            shown: None,
        }
    }

    fn step(&mut self, event: WorkflowEvent) -> Result<(), InvalidTransition> {
        self.state = transition(self.state, event)?;
        debug!(flow = ?self.flow.kind(), state = ?self.state, "Workflow moved on {event:?}");
        Ok(())
    }

    /// Like [`Self::step`], for events that may legitimately arrive late.
    fn try_step(&mut self, event: WorkflowEvent) -> bool {
        match self.step(event) {
            Ok(()) => true,
            Err(err) => {
                debug!(flow = ?self.flow.kind(), "Ignoring event: {err}");
                false
            }
        }
    }

    fn show(&mut self, surface: &mut Surface, spec: ModalSpec<WorkflowMsg>) {
        surface.show(spec);
        self.shown = Some(surface.generation());
    }

    fn owns(&self, surface: &Surface) -> bool {
        surface.is_visible() && self.shown == Some(surface.generation())
    }

    fn present(&mut self, surface: &mut Surface, outcome: Outcome) -> Vec<Effect> {
        self.on_dismiss = outcome.on_dismiss;
        match outcome.modal {
            Some(spec) => self.show(surface, spec),
            None if self.owns(surface) => surface.hide(),
            None => {}
        }
        outcome.effects
    }

    fn trigger(&mut self, surface: &mut Surface) -> Result<Vec<Effect>, InvalidTransition> {
        let prompt = self.flow.prompt();
        self.step(WorkflowEvent::Trigger {
            needs_input: prompt.is_some(),
        })?;
        self.on_dismiss.clear();

        Ok(match prompt {
            Some(spec) => {
                self.show(surface, spec);
                Vec::new()
            }
            None => self.call(surface, None),
        })
    }

    fn confirm(&mut self, surface: &mut Surface, input: Option<String>) -> Vec<Effect> {
        if !self.try_step(WorkflowEvent::Confirm) {
            return Vec::new();
        }
        self.call(surface, input)
    }

    fn call(&mut self, surface: &mut Surface, input: Option<String>) -> Vec<Effect> {
        let request = self.flow.request(input);
        let in_flight = self.flow.in_flight();
        let mut effects = vec![Effect::Call {
            kind: self.flow.kind(),
            request,
        }];
        effects.extend(self.present(surface, in_flight));
        effects
    }

    fn cancel(&mut self, surface: &mut Surface) {
        if self.owns(surface) {
            surface.hide();
        }
        self.try_step(WorkflowEvent::Cancel);
    }

    fn resolve(&mut self, surface: &mut Surface, result: BackendResult) -> Vec<Effect> {
        if !self.try_step(WorkflowEvent::Respond) {
            warn!(flow = ?self.flow.kind(), "Dropping unexpected backend result");
            return Vec::new();
        }
        let outcome = self.flow.resolve(result);
        let mut effects = self.present(surface, outcome);

        // Nothing to dismiss, so the flow is finished.
        if !self.owns(surface) {
            effects.extend(self.release());
        }
        effects
    }

    /// The user closed this workflow's dialog.
    fn dismissed(&mut self) -> Vec<Effect> {
        match self.state {
            WorkflowState::AwaitingInput => {
                self.try_step(WorkflowEvent::Cancel);
                Vec::new()
            }
            WorkflowState::Resolved => self.release(),
            // The progress dialog is gone but the call is still running.
            WorkflowState::AwaitingBackend | WorkflowState::Idle => Vec::new(),
        }
    }

    /// Return to idle once the dialog is no longer ours to wait on.
    fn release(&mut self) -> Vec<Effect> {
        self.shown = None;
        match self.state {
            WorkflowState::AwaitingInput => {
                self.try_step(WorkflowEvent::Cancel);
                Vec::new()
            }
            WorkflowState::Resolved => {
                self.try_step(WorkflowEvent::Dismiss);
                std::mem::take(&mut self.on_dismiss)
            }
            WorkflowState::Idle | WorkflowState::AwaitingBackend => Vec::new(),
        }
    }
}

/// The four account workflows, sharing one modal surface.
pub struct Workflows {
    flows: Vec<ActionWorkflow>,
}

impl Default for Workflows {
    fn default() -> Self {
        Self::new()
    }
}

impl Workflows {
    pub fn new() -> Self {
        let flows = FlowKind::ALL
            .into_iter()
            .map(|kind| {
                let flow: Box<dyn Flow> = match kind {
                    FlowKind::CreateServer => Box::new(CreateServer::default()),
                    FlowKind::RemoveServer => Box::new(RemoveServer),
                    FlowKind::ResetServerCode => Box::new(ResetServerCode),
                    FlowKind::ResetAccessCode => Box::new(ResetAccessCode),
                };
                ActionWorkflow::new(flow)
            })
            .collect();
        Self { flows }
    }

    fn get_mut(&mut self, kind: FlowKind) -> &mut ActionWorkflow {
        &mut self.flows[kind.index()]
    }

    pub fn state(&self, kind: FlowKind) -> WorkflowState {
        self.flows[kind.index()].state
    }

    /// Start `kind`. Rejected while that workflow's call is still in flight.
    pub fn trigger(
        &mut self,
        kind: FlowKind,
        surface: &mut Surface,
    ) -> Result<Vec<Effect>, InvalidTransition> {
        let mut effects = self.get_mut(kind).trigger(surface)?;
        effects.extend(self.settle(surface));
        Ok(effects)
    }

    /// Act on a message produced by a dialog button.
    pub fn handle(&mut self, msg: WorkflowMsg, surface: &mut Surface) -> Vec<Effect> {
        let mut effects = match msg {
            WorkflowMsg::Submit(kind, input) => self.get_mut(kind).confirm(surface, Some(input)),
            WorkflowMsg::Confirm(kind) => self.get_mut(kind).confirm(surface, None),
            WorkflowMsg::Cancel(kind) => {
                self.get_mut(kind).cancel(surface);
                Vec::new()
            }
            WorkflowMsg::Close(kind) => {
                let workflow = self.get_mut(kind);
                if workflow.owns(surface) {
                    surface.hide();
                }
                workflow.dismissed()
            }
            WorkflowMsg::Copy { value, what } => vec![Effect::Copy { value, what }],
        };
        effects.extend(self.settle(surface));
        effects
    }

    /// The surface was closed from outside (Esc, backdrop or close control).
    pub fn dismissed(&mut self, surface: &Surface) -> Vec<Effect> {
        let generation = surface.generation();
        let mut effects = Vec::new();
        if let Some(owner) = self.flows.iter_mut().find(|w| w.shown == Some(generation)) {
            effects = owner.dismissed();
        }
        effects.extend(self.settle(surface));
        effects
    }

    pub fn resolve(
        &mut self,
        kind: FlowKind,
        result: BackendResult,
        surface: &mut Surface,
    ) -> Vec<Effect> {
        let mut effects = self.get_mut(kind).resolve(surface, result);
        effects.extend(self.settle(surface));
        effects
    }

    /// Release workflows whose dialog has been replaced or hidden.
    fn settle(&mut self, surface: &Surface) -> Vec<Effect> {
        self.flows
            .iter_mut()
            .filter(|w| {
                matches!(w.state, WorkflowState::AwaitingInput | WorkflowState::Resolved)
                    && !w.owns(surface)
            })
            .flat_map(ActionWorkflow::release)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use serde_json::{Value, json};

    use super::*;
    use crate::backend::{BackendRequest, Payload};
    use crate::config::KeyResolver;
    use crate::modal::{Content, ModalEvent};
    use crate::ui::EventResult;
    use crate::workflow::InlineStatus;

    fn surface() -> Surface {
        ModalSurface::new(Arc::new(KeyResolver::default()))
    }

    fn success(body: Value) -> BackendResult {
        BackendResult::Success(Payload::new(body.as_object().cloned().unwrap()))
    }

    fn press(surface: &mut Surface, code: KeyCode) -> EventResult<ModalEvent<WorkflowMsg>> {
        surface
            .handle_key(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    fn activated(result: EventResult<ModalEvent<WorkflowMsg>>) -> WorkflowMsg {
        match result {
            EventResult::Event(ModalEvent::Activated(msg)) => msg,
            other => panic!("expected activation, got {other:?}"),
        }
    }

    #[test]
    fn test_create_success_reloads_on_dismiss() {
        let mut surface = surface();
        let mut workflows = Workflows::new();

        let effects = workflows.trigger(FlowKind::CreateServer, &mut surface).unwrap();
        assert!(effects.is_empty());
        assert_eq!(workflows.state(FlowKind::CreateServer), WorkflowState::AwaitingInput);

        for c in "  Test Box  ".chars() {
            press(&mut surface, KeyCode::Char(c));
        }
        let msg = activated(press(&mut surface, KeyCode::Enter));
        let effects = workflows.handle(msg, &mut surface);
        assert_eq!(
            effects,
            vec![Effect::Call {
                kind: FlowKind::CreateServer,
                request: BackendRequest::CreateServer {
                    server_id: "test-box".into()
                },
            }]
        );
        assert!(surface.spec().unwrap().has_progress());

        let effects = workflows.resolve(
            FlowKind::CreateServer,
            success(json!({
                "status": "success",
                "owned_server": "test-box",
                "secret_key": "abc123",
            })),
            &mut surface,
        );
        assert!(effects.is_empty());
        let spec = surface.spec().unwrap();
        assert_eq!(spec.title, "Server Created");
        assert!(spec.body.contains(&Content::Strong("test-box has been created.".into())));
        assert_eq!(spec.secrets().collect::<Vec<_>>(), vec!["abc123"]);

        assert_eq!(
            press(&mut surface, KeyCode::Esc),
            EventResult::Event(ModalEvent::Dismissed)
        );
        assert_eq!(workflows.dismissed(&surface), vec![Effect::Reload]);
        assert_eq!(workflows.state(FlowKind::CreateServer), WorkflowState::Idle);
    }

    #[test]
    fn test_create_close_button_reloads() {
        let mut surface = surface();
        let mut workflows = Workflows::new();
        workflows.trigger(FlowKind::CreateServer, &mut surface).unwrap();
        workflows.handle(WorkflowMsg::Submit(FlowKind::CreateServer, "box".into()), &mut surface);
        workflows.resolve(
            FlowKind::CreateServer,
            success(json!({"status": "success", "owned_server": "box", "secret_key": "s"})),
            &mut surface,
        );

        let effects = workflows.handle(WorkflowMsg::Close(FlowKind::CreateServer), &mut surface);
        assert_eq!(effects, vec![Effect::Reload]);
        assert!(!surface.is_visible());
    }

    #[test]
    fn test_create_failure_shows_message_without_reload() {
        let mut surface = surface();
        let mut workflows = Workflows::new();
        workflows.trigger(FlowKind::CreateServer, &mut surface).unwrap();
        workflows.handle(WorkflowMsg::Submit(FlowKind::CreateServer, "box".into()), &mut surface);

        workflows.resolve(
            FlowKind::CreateServer,
            BackendResult::Failure("id taken".into()),
            &mut surface,
        );
        let spec = surface.spec().unwrap();
        assert_eq!(spec.title, "Error Creating Server");
        assert_eq!(spec.body, vec![Content::Text("id taken".into())]);

        let effects = workflows.handle(WorkflowMsg::Close(FlowKind::CreateServer), &mut surface);
        assert!(effects.is_empty());
        assert!(!surface.is_visible());
    }

    #[test]
    fn test_remove_cancel_makes_no_call() {
        let mut surface = surface();
        let mut workflows = Workflows::new();
        workflows.trigger(FlowKind::RemoveServer, &mut surface).unwrap();
        assert_eq!(surface.spec().unwrap().title, "Confirm Removal");

        // Focus starts on Cancel.
        let msg = activated(press(&mut surface, KeyCode::Enter));
        assert_eq!(msg, WorkflowMsg::Cancel(FlowKind::RemoveServer));
        let effects = workflows.handle(msg, &mut surface);

        assert!(effects.is_empty());
        assert!(!surface.is_visible());
        assert_eq!(workflows.state(FlowKind::RemoveServer), WorkflowState::Idle);
    }

    #[test]
    fn test_remove_backdrop_dismiss_cancels() {
        let mut surface = surface();
        let mut workflows = Workflows::new();
        workflows.trigger(FlowKind::RemoveServer, &mut surface).unwrap();
        surface.hide();

        assert!(workflows.dismissed(&surface).is_empty());
        assert_eq!(workflows.state(FlowKind::RemoveServer), WorkflowState::Idle);
    }

    #[test]
    fn test_remove_success_navigates_without_modal() {
        let mut surface = surface();
        let mut workflows = Workflows::new();
        workflows.trigger(FlowKind::RemoveServer, &mut surface).unwrap();

        let effects = workflows.handle(WorkflowMsg::Confirm(FlowKind::RemoveServer), &mut surface);
        assert_eq!(
            effects,
            vec![Effect::Call {
                kind: FlowKind::RemoveServer,
                request: BackendRequest::DeleteServer,
            }]
        );

        let effects = workflows.resolve(
            FlowKind::RemoveServer,
            success(json!({"status": "success"})),
            &mut surface,
        );
        assert_eq!(effects, vec![Effect::NavigateHome]);
        assert!(!surface.is_visible());
        assert_eq!(workflows.state(FlowKind::RemoveServer), WorkflowState::Idle);
    }

    #[test]
    fn test_remove_failure_shows_error() {
        let mut surface = surface();
        let mut workflows = Workflows::new();
        workflows.trigger(FlowKind::RemoveServer, &mut surface).unwrap();
        workflows.handle(WorkflowMsg::Confirm(FlowKind::RemoveServer), &mut surface);

        let effects = workflows.resolve(
            FlowKind::RemoveServer,
            BackendResult::Failure("Unknown error".into()),
            &mut surface,
        );
        assert!(effects.is_empty());
        assert_eq!(surface.spec().unwrap().title, "Error");
    }

    #[test]
    fn test_reset_access_code_inline_and_locked() {
        let mut surface = surface();
        let mut workflows = Workflows::new();

        let effects = workflows.trigger(FlowKind::ResetAccessCode, &mut surface).unwrap();
        assert_eq!(
            effects,
            vec![
                Effect::Call {
                    kind: FlowKind::ResetAccessCode,
                    request: BackendRequest::ResetAccessCode,
                },
                Effect::ShowInline(InlineStatus::Pending),
            ]
        );
        assert!(!surface.is_visible());

        let effects = workflows.resolve(
            FlowKind::ResetAccessCode,
            success(json!({"status": "success", "api_key": "k-123"})),
            &mut surface,
        );
        assert_eq!(
            effects,
            vec![
                Effect::ShowInline(InlineStatus::NewCode("k-123".into())),
                Effect::DisableAccessCodeReset,
            ]
        );
        assert!(!surface.is_visible());
        assert_eq!(workflows.state(FlowKind::ResetAccessCode), WorkflowState::Idle);
    }

    #[test]
    fn test_reset_server_code_copy_keeps_modal() {
        let mut surface = surface();
        let mut workflows = Workflows::new();
        workflows.trigger(FlowKind::ResetServerCode, &mut surface).unwrap();
        workflows.resolve(
            FlowKind::ResetServerCode,
            success(json!({"status": "success", "new_code": "xyz789"})),
            &mut surface,
        );

        let msg = activated(press(&mut surface, KeyCode::Enter));
        let effects = workflows.handle(msg, &mut surface);
        assert_eq!(
            effects,
            vec![Effect::Copy {
                value: "xyz789".into(),
                what: "server code"
            }]
        );
        assert!(surface.is_visible());

        let effects = workflows.handle(WorkflowMsg::Close(FlowKind::ResetServerCode), &mut surface);
        assert!(effects.is_empty());
        assert!(surface.spec().is_none());
    }

    #[test]
    fn test_second_trigger_ignored_while_awaiting_backend() {
        let mut surface = surface();
        let mut workflows = Workflows::new();
        workflows.trigger(FlowKind::ResetServerCode, &mut surface).unwrap();
        surface.hide();
        assert!(workflows.dismissed(&surface).is_empty());
        assert_eq!(workflows.state(FlowKind::ResetServerCode), WorkflowState::AwaitingBackend);

        let err = workflows.trigger(FlowKind::ResetServerCode, &mut surface).unwrap_err();
        assert_eq!(err.state, WorkflowState::AwaitingBackend);
        assert!(!surface.is_visible());
    }

    #[test]
    fn test_late_result_replaces_other_dialog() {
        let mut surface = surface();
        let mut workflows = Workflows::new();
        workflows.trigger(FlowKind::ResetServerCode, &mut surface).unwrap();
        surface.hide();
        workflows.dismissed(&surface);

        workflows.trigger(FlowKind::CreateServer, &mut surface).unwrap();
        workflows.resolve(
            FlowKind::ResetServerCode,
            BackendResult::Failure("Failed to reset".into()),
            &mut surface,
        );

        assert_eq!(surface.spec().unwrap().title, "Error");
        assert_eq!(workflows.state(FlowKind::CreateServer), WorkflowState::Idle);
        assert_eq!(workflows.state(FlowKind::ResetServerCode), WorkflowState::Resolved);
    }

    #[test]
    fn test_unexpected_result_is_dropped() {
        let mut surface = surface();
        let mut workflows = Workflows::new();
        let effects = workflows.resolve(
            FlowKind::RemoveServer,
            success(json!({"status": "success"})),
            &mut surface,
        );
        assert!(effects.is_empty());
        assert_eq!(workflows.state(FlowKind::RemoveServer), WorkflowState::Idle);
    }
}
