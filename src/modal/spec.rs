use crate::modal::command::{Emit, FormValues, ModalCommand};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonStyle {
    #[default]
    Default,
    Primary,
    /// Destructive action, drawn in red.
    Danger,
}

/// One block of dialog body content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Strong(String),
    /// Read-only field holding a one-time value.
    Secret(String),
    /// Editable field; its value is passed to button commands.
    Input { placeholder: String },
    /// Spinner with a label.
    Progress(String),
}

pub struct ActionButton<M> {
    pub label: String,
    pub style: ButtonStyle,
    command: Box<dyn ModalCommand<M>>,
}

impl<M> ActionButton<M> {
    pub fn new(label: impl Into<String>, command: impl ModalCommand<M> + 'static) -> Self {
        Self {
            label: label.into(),
            style: ButtonStyle::Default,
            command: Box::new(command),
        }
    }

    pub const fn primary(mut self) -> Self {
        self.style = ButtonStyle::Primary;
        self
    }

    pub const fn danger(mut self) -> Self {
        self.style = ButtonStyle::Danger;
        self
    }

    pub fn activate(&self, form: &FormValues) -> M {
        self.command.execute(form)
    }
}

impl<M: Clone + 'static> ActionButton<M> {
    /// Button that emits a fixed message.
    pub fn emit(label: impl Into<String>, message: M) -> Self {
        Self::new(label, Emit(message))
    }
}

impl<M> std::fmt::Debug for ActionButton<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionButton")
            .field("label", &self.label)
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}

/// Everything a dialog shows: title, body and buttons.
#[derive(Debug)]
pub struct ModalSpec<M> {
    pub title: String,
    pub body: Vec<Content>,
    pub actions: Vec<ActionButton<M>>,
}

impl<M> ModalSpec<M> {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.body.push(Content::Text(text.into()));
        self
    }

    pub fn strong(mut self, text: impl Into<String>) -> Self {
        self.body.push(Content::Strong(text.into()));
        self
    }

    pub fn secret(mut self, value: impl Into<String>) -> Self {
        self.body.push(Content::Secret(value.into()));
        self
    }

    pub fn input(mut self, placeholder: impl Into<String>) -> Self {
        self.body.push(Content::Input {
            placeholder: placeholder.into(),
        });
        self
    }

    pub fn progress(mut self, label: impl Into<String>) -> Self {
        self.body.push(Content::Progress(label.into()));
        self
    }

    pub fn action(mut self, button: ActionButton<M>) -> Self {
        self.actions.push(button);
        self
    }

    pub fn input_placeholder(&self) -> Option<&str> {
        self.body.iter().find_map(|block| match block {
            Content::Input { placeholder } => Some(placeholder.as_str()),
            _ => None,
        })
    }

    pub fn has_progress(&self) -> bool {
        self.body.iter().any(|b| matches!(b, Content::Progress(_)))
    }

    /// Values of every secret field, in body order.
    pub fn secrets(&self) -> impl Iterator<Item = &str> {
        self.body.iter().filter_map(|block| match block {
            Content::Secret(value) => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn labels(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.label.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_order() {
        let spec: ModalSpec<u8> = ModalSpec::new("Server Created")
            .strong("test-box has been created.")
            .secret("abc123")
            .action(ActionButton::emit("Copy Key", 1).primary())
            .action(ActionButton::emit("Close", 2));

        assert_eq!(spec.body.len(), 2);
        assert_eq!(spec.secrets().collect::<Vec<_>>(), vec!["abc123"]);
        assert_eq!(spec.labels(), vec!["Copy Key", "Close"]);
        assert_eq!(spec.actions[0].style, ButtonStyle::Primary);
        assert_eq!(spec.actions[1].style, ButtonStyle::Default);
    }

    #[test]
    fn test_buttons_activate_without_surface() {
        let spec: ModalSpec<&str> = ModalSpec::new("Confirm Removal")
            .action(ActionButton::emit("Yes, Remove", "confirm").danger())
            .action(ActionButton::emit("Cancel", "cancel"));

        let form = FormValues::default();
        let fired: Vec<_> = spec.actions.iter().map(|a| a.activate(&form)).collect();
        assert_eq!(fired, vec!["confirm", "cancel"]);
    }

    #[test]
    fn test_input_placeholder() {
        let spec: ModalSpec<()> = ModalSpec::new("Create Server").text("Name").input("my-server");
        assert_eq!(spec.input_placeholder(), Some("my-server"));
        assert!(!spec.has_progress());
    }
}
