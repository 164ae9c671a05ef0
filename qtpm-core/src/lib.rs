//! Quantitative timed pattern matching.
//!
//! Patterns are [`TimedAutomaton`]s whose locations are labelled with constraints on the signal.
//! A [`Matcher`] explores the zone graph of the automaton one piece of a piecewise-constant
//! signal at a time, and scores every run with a [`Semiring`] weight computed from the
//! robustness of the signal against the location labels.

pub mod automaton;
pub mod bound;
pub mod constraint;
pub mod expression;
pub mod matcher;
pub mod robustness;
pub mod semiring;
pub mod shortest_path;
pub mod signal;
pub mod zone;
pub mod zone_graph;

pub use crate::automaton::{Location, LocationId, TimedAutomaton, Transition};
pub use crate::bound::Bound;
pub use crate::constraint::{Constraint, Guard, Order};
pub use crate::matcher::{Endpoint, FeedError, Interval, MatchBounds, Matcher};
pub use crate::robustness::{CostFunction, SpaceRobustness};
pub use crate::semiring::{Boolean, MaxMin, MaxPlus, MinPlus, Semiring, StarSemiring};
pub use crate::signal::Valuation;
pub use crate::zone::{Clock, Zone};
