mod boolean;
mod common;
mod constraint;
mod dot;
mod errors;

pub use boolean::parse_boolean_constraint;
pub use constraint::{parse_constraint, parse_guard, parse_resets};
pub use dot::parse_automaton;
pub use errors::ParseError;
