//! Read the inputs of qtpm from strings.
//!
//! # Reading automata
//!
//! Timed automata are written in a subset of the Graphviz DOT language and read with
//! [`parse_automaton`]. Locations carry the `init`, `match` and `label` attributes, transitions
//! carry the `guard` and `reset` attributes:
//!
//! ```text
//! digraph G {
//!     0 [init=1][match=0][label="{x0 > 100, x1 < 30}"];
//!     1 [init=0][match=1][label="{}"];
//!     0 -> 1 [guard="{x0 < 4}"][reset="{0}"];
//! }
//! ```
//!
//! # Reading constraints
//!
//! - **Clock and signal comparisons** (e.g. `x0 <= 5`): use [`parse_constraint`], or
//!   [`parse_guard`] for a braced conjunction such as `{x0 > 1, x2 < 10}`.
//! - **Reset sets** (e.g. `{0, 1}` or `{x0, x1}`): use [`parse_resets`].
//! - **Boolean labels** (e.g. `x0 < 100 && x0 * x1 > x0 + x1`): use [`parse_boolean_constraint`].

mod parser;

pub use qtpm_core::automaton::TimedAutomaton;
pub use qtpm_core::constraint::{Constraint, Guard};
pub use qtpm_core::expression::BooleanConstraint;

pub use parser::{
    parse_automaton, parse_boolean_constraint, parse_constraint, parse_guard, parse_resets, ParseError,
};
