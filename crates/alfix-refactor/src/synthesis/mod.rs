//! Text edit synthesis.
//!
//! Each function inspects the tree and returns edits against the original
//! text. A missing anchor yields no edit rather than a guessed one.

mod overload;
mod parameters;
mod publisher_call;
mod variables;

pub use overload::{create_overload, default_value};
pub use parameters::{add_return_value_name, append_parameters, parameter_list_text};
pub use publisher_call::{insert_publisher_call, PublisherPosition};
pub use variables::{insert_variable, remove_variable, remove_variables, type_priority};
