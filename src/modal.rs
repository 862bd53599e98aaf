//! Modal dialog engine.
//!
//! A [`ModalSurface`] shows one [`ModalSpec`] at a time. Buttons carry
//! [`ModalCommand`] objects instead of callbacks, so a dialog's button list
//! can be built and exercised without a terminal.

mod command;
mod spec;
mod surface;

pub use command::{Emit, FormValues, ModalCommand, SubmitInput};
pub use spec::{ActionButton, ButtonStyle, Content, ModalSpec};
pub use surface::{ModalEvent, ModalSurface};
