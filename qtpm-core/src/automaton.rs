//! Timed automata describing the pattern to match.
//!
//! A [`TimedAutomaton`] is a directed graph of [`Location`]s connected by [`Transition`]s. A
//! location carries a label that constrains the signal while the automaton stays in it, and a
//! transition carries a guard over the clocks and the set of clocks it resets.
//!
//! ```rust
//! use qtpm_core::automaton::{Location, TimedAutomaton, Transition};
//! use qtpm_core::constraint::{Constraint, Guard};
//!
//! let mut automaton = TimedAutomaton::new();
//! let high = automaton.add_location(Location::initial(Guard::from([Constraint::gt(0, 100)])));
//! let done = automaton.add_location(Location::accepting(Guard::new()));
//! automaton.add_transition(high, done, Transition::new(Guard::from([Constraint::lt(0, 5)]), vec![]));
//!
//! assert_eq!(automaton.num_clocks(), 1);
//! assert_eq!(automaton.num_signals(), 1);
//! assert_eq!(automaton.max_constant(), 5);
//! ```

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::constraint::Guard;

/// Identifier of a location inside of its automaton.
pub type LocationId = NodeIndex;

/// State of a timed automaton.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Location {
    /// Matching may start in this location.
    pub initial: bool,
    /// Reaching this location completes a match.
    pub accepting: bool,
    /// Constraint on the signal while staying in this location.
    pub label: Guard,
}

impl Location {
    pub fn new(initial: bool, accepting: bool, label: Guard) -> Self {
        Self {
            initial,
            accepting,
            label,
        }
    }

    pub fn initial(label: Guard) -> Self {
        Self::new(true, false, label)
    }

    pub fn accepting(label: Guard) -> Self {
        Self::new(false, true, label)
    }

    pub fn intermediate(label: Guard) -> Self {
        Self::new(false, false, label)
    }
}

/// Discrete move between two locations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transition {
    /// Constraint on the clocks that enables the transition.
    pub guard: Guard,
    /// Clocks set to zero when the transition is taken.
    pub resets: Vec<usize>,
}

impl Transition {
    pub fn new(guard: Guard, resets: Vec<usize>) -> Self {
        Self { guard, resets }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TimedAutomaton {
    graph: DiGraph<Location, Transition>,
}

impl TimedAutomaton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_location(&mut self, location: Location) -> LocationId {
        self.graph.add_node(location)
    }

    pub fn add_transition(&mut self, from: LocationId, to: LocationId, transition: Transition) {
        self.graph.add_edge(from, to, transition);
    }

    /// # Panics
    ///
    /// Panics if the location does not belong to this automaton.
    pub fn location(&self, id: LocationId) -> &Location {
        &self.graph[id]
    }

    pub fn locations(&self) -> impl Iterator<Item = (LocationId, &Location)> + '_ {
        self.graph.node_indices().map(|id| (id, &self.graph[id]))
    }

    pub fn initial_locations(&self) -> impl Iterator<Item = LocationId> + '_ {
        self.locations().filter(|(_, l)| l.initial).map(|(id, _)| id)
    }

    /// Transitions leaving `from`, with their target locations.
    pub fn transitions(&self, from: LocationId) -> impl Iterator<Item = (LocationId, &Transition)> + '_ {
        self.graph
            .edges_directed(from, Direction::Outgoing)
            .map(|edge| (edge.target(), edge.weight()))
    }

    /// The transition between two locations, if there is one.
    pub fn find_transition(&self, from: LocationId, to: LocationId) -> Option<&Transition> {
        self.graph.find_edge(from, to).map(|edge| &self.graph[edge])
    }

    pub fn num_locations(&self) -> usize {
        self.graph.node_count()
    }

    pub fn num_transitions(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of clocks referenced by the guards and resets of the transitions.
    pub fn num_clocks(&self) -> usize {
        self.graph
            .edge_weights()
            .flat_map(|t| t.guard.max_var().into_iter().chain(t.resets.iter().copied()))
            .max()
            .map_or(0, |var| var + 1)
    }

    /// Number of signal variables referenced by the location labels.
    pub fn num_signals(&self) -> usize {
        self.graph
            .node_weights()
            .filter_map(|l| l.label.max_var())
            .max()
            .map_or(0, |var| var + 1)
    }

    /// Largest constant appearing in a transition guard.
    pub fn max_constant(&self) -> i64 {
        self.graph
            .edge_weights()
            .filter_map(|t| t.guard.max_constant())
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::{Location, TimedAutomaton, Transition};
    use crate::constraint::{Constraint, Guard};

    #[test]
    fn properties() {
        let mut automaton = TimedAutomaton::new();
        let l0 = automaton.add_location(Location::initial(Guard::from([
            Constraint::gt(0, 100),
            Constraint::lt(1, 30),
        ])));
        let l1 = automaton.add_location(Location::intermediate(Guard::from([Constraint::gt(0, 100)])));
        let l2 = automaton.add_location(Location::accepting(Guard::new()));

        automaton.add_transition(l0, l1, Transition::new(Guard::new(), vec![0]));
        automaton.add_transition(l1, l2, Transition::new(Guard::from([Constraint::lt(0, 4)]), vec![]));
        automaton.add_transition(l1, l0, Transition::new(Guard::from([Constraint::ge(2, 1)]), vec![]));

        assert_eq!(automaton.num_locations(), 3);
        assert_eq!(automaton.num_transitions(), 3);
        assert_eq!(automaton.num_clocks(), 3);
        assert_eq!(automaton.num_signals(), 2);
        assert_eq!(automaton.max_constant(), 4);
        assert_eq!(automaton.initial_locations().collect::<Vec<_>>(), vec![l0]);
        assert_eq!(automaton.transitions(l1).count(), 2);
        assert_eq!(automaton.find_transition(l0, l1).map(|t| t.resets.clone()), Some(vec![0]));
        assert!(automaton.find_transition(l2, l0).is_none());
        assert!(automaton.location(l2).accepting);
    }

    #[test]
    fn empty_automaton() {
        let automaton = TimedAutomaton::new();

        assert_eq!(automaton.num_clocks(), 0);
        assert_eq!(automaton.num_signals(), 0);
        assert_eq!(automaton.max_constant(), 0);
    }
}
