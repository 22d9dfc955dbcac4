//! Payload definitions and the priority-ordered registry that owns them.

mod field_editor;
#[allow(clippy::module_inception)]
mod payload;
mod payload_field;
mod payload_registry;


pub use field_editor::FieldEdit;
pub use payload::{Payload, PayloadDescriptor};
pub use payload_field::PayloadField;
pub use payload_registry::PayloadRegistry;
