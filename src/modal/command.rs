/// Values collected from the dialog's form fields at activation time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    input: Option<String>,
}

impl FormValues {
    pub const fn new(input: Option<String>) -> Self {
        Self { input }
    }

    pub fn input(&self) -> Option<&str> {
        self.input.as_deref()
    }
}

/// Action bound to a dialog button.
///
/// Executing a command never touches the surface; it only produces the
/// message the owner should act on.
pub trait ModalCommand<M> {
    fn execute(&self, form: &FormValues) -> M;
}

/// Emits a fixed message.
pub struct Emit<M>(pub M);

impl<M: Clone> ModalCommand<M> for Emit<M> {
    fn execute(&self, _form: &FormValues) -> M {
        self.0.clone()
    }
}

/// Builds a message from the dialog's input field.
pub struct SubmitInput<M> {
    build: fn(String) -> M,
}

impl<M> SubmitInput<M> {
    pub const fn new(build: fn(String) -> M) -> Self {
        Self { build }
    }
}

impl<M> ModalCommand<M> for SubmitInput<M> {
    fn execute(&self, form: &FormValues) -> M {
        (self.build)(form.input().unwrap_or_default().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_ignores_form() {
        let cmd = Emit("close");
        assert_eq!(cmd.execute(&FormValues::new(Some("x".into()))), "close");
        assert_eq!(cmd.execute(&FormValues::default()), "close");
    }

    #[test]
    fn test_submit_input_reads_field() {
        let cmd = SubmitInput::new(|value| format!("submit:{value}"));
        assert_eq!(
            cmd.execute(&FormValues::new(Some("My Server".into()))),
            "submit:My Server"
        );
        assert_eq!(cmd.execute(&FormValues::default()), "submit:");
    }
}
