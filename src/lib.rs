#![deny(clippy::all)]

//! Quantitative timed pattern matching of piecewise-constant signals.
//!
//! A pattern is a [`TimedAutomaton`] whose locations are labelled with constraints on the values
//! of the signal and whose transitions carry clock guards and resets. Given a signal, pattern
//! matching finds every window `[t, t')` such that the restriction of the signal to the window is
//! accepted by the automaton. Quantitative matching additionally scores each window with a weight
//! from a [`Semiring`]: the robustness of the signal against the labels along an accepting run,
//! with the best run kept for every window.
//!
//! Signals are consumed one constant piece at a time by a [`Matcher`], so matching can run online.
//! After each call to [`Matcher::feed`] the result holds the windows that ended inside the pieces
//! seen so far, grouped into [`MatchBounds`] that bound the start, the end and the duration of the
//! windows.
//!
//! # Examples
//!
//! ```rust
//! use qtpm::{MaxMin, Matcher, SpaceRobustness, parse_automaton};
//!
//! // x0 stays below 70 for less than 5 time units
//! let automaton = parse_automaton(r#"
//!     digraph G {
//!         0 [init=1][match=0][label="{x0 < 70}"];
//!         1 [init=0][match=1];
//!         0 -> 1 [guard="{x0 < 5}"];
//!     }
//! "#).unwrap();
//!
//! let mut matcher = Matcher::<MaxMin, _>::new(automaton, SpaceRobustness);
//!
//! matcher.feed(&[50.0], 1.0).unwrap();
//! matcher.feed(&[60.0], 1.0).unwrap();
//!
//! for (bounds, weight) in matcher.result() {
//!     println!("{} / {}: {weight}", bounds.start(), bounds.end());
//! }
//!
//! assert!(matcher.result().values().all(|w| *w == MaxMin(20.0) || *w == MaxMin(10.0)));
//! ```

#[doc(inline)]
pub use qtpm_core::{
    automaton, bound, constraint, expression, matcher, robustness, semiring, shortest_path, signal, zone,
    zone_graph,
};

#[doc(inline)]
pub use qtpm_core::{
    Boolean, Bound, Clock, Constraint, CostFunction, Endpoint, FeedError, Guard, Interval, Location,
    LocationId, MatchBounds, Matcher, MaxMin, MaxPlus, MinPlus, Order, Semiring, SpaceRobustness,
    StarSemiring, TimedAutomaton, Transition, Valuation, Zone,
};

#[cfg(feature = "parser")]
#[doc(inline)]
pub use qtpm_parser::{
    parse_automaton, parse_boolean_constraint, parse_constraint, parse_guard, parse_resets, ParseError,
};
