//! Incremental quantitative timed pattern matching.
//!
//! A [`Matcher`] consumes a piecewise-constant signal one piece at a time. After every call to
//! [`Matcher::feed`] its result map holds, for every set of matching windows found so far, the
//! semiring sum of the scores of the runs of the automaton over those windows.
//!
//! ```rust
//! use qtpm_core::automaton::{Location, TimedAutomaton, Transition};
//! use qtpm_core::constraint::{Constraint, Guard};
//! use qtpm_core::robustness::SpaceRobustness;
//! use qtpm_core::semiring::MaxMin;
//! use qtpm_core::Matcher;
//!
//! let mut automaton = TimedAutomaton::new();
//! let low = automaton.add_location(Location::initial(Guard::from([Constraint::lt(0, 70)])));
//! let done = automaton.add_location(Location::accepting(Guard::new()));
//! automaton.add_transition(low, done, Transition::default());
//!
//! let mut matcher = Matcher::<MaxMin, _>::new(automaton, SpaceRobustness);
//! matcher.feed(&[150.0], 0.1).unwrap();
//!
//! let weights: Vec<_> = matcher.result().values().collect();
//! assert_eq!(weights, vec![&MaxMin(-80.0)]);
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::{Display, Formatter};
use std::hash::Hash;

use log::{debug, trace};
use thiserror::Error;

use crate::automaton::{LocationId, TimedAutomaton};
use crate::bound::Bound;
use crate::robustness::CostFunction;
use crate::semiring::Semiring;
use crate::signal::Valuation;
use crate::zone::{Clock, Zone};
use crate::zone_graph::{ZoneGraph, ZoneGraphState};

/// Errors raised when a piece of the signal cannot be matched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeedError {
    #[error("Invalid duration {0}, expected a non-negative number")]
    InvalidDuration(f64),

    #[error("Signal value {index} is not a number")]
    NanValue { index: usize },

    #[error("Expected at least {expected} signal values, found {actual}")]
    MissingValues { expected: usize, actual: usize },
}

/// Side of an [`Interval`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Endpoint {
    Open(f64),
    Closed(f64),
}

impl Endpoint {
    fn new(value: f64, closed: bool) -> Self {
        if closed && value.is_finite() {
            Endpoint::Closed(value)
        } else {
            Endpoint::Open(value)
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            Endpoint::Open(value) | Endpoint::Closed(value) => *value,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Endpoint::Closed(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub lower: Endpoint,
    pub upper: Endpoint,
}

impl Interval {
    /// Interval described by a bound on `-t` and a bound on `t`.
    fn from_bounds(negated_lower: Bound, upper: Bound) -> Self {
        Self {
            lower: Endpoint::new(0.0 - negated_lower.value, negated_lower.closed),
            upper: Endpoint::new(upper.value, upper.closed),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        let above = match self.lower {
            Endpoint::Open(lower) => value > lower,
            Endpoint::Closed(lower) => value >= lower,
        };

        let below = match self.upper {
            Endpoint::Open(upper) => value < upper,
            Endpoint::Closed(upper) => value <= upper,
        };

        above && below
    }
}

/// Formats the interval as `0 <= t < 1.5`.
impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let op = |e: &Endpoint| if e.is_closed() { "<=" } else { "<" };
        write!(f, "{} {} t {} {}", self.lower.value(), op(&self.lower), op(&self.upper), self.upper.value())
    }
}

/// Set of matching windows `[t, t')` described by bounds on the start `t`, the end `t'` and the
/// duration `t' - t` of the windows.
///
/// The bounds are stored as difference bounds: the first bound of each pair constrains the
/// negated quantity and the second constrains the quantity itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MatchBounds([Bound; 6]);

impl MatchBounds {
    /// Read the bounds of a zone of the matcher at the given absolute time.
    ///
    /// `elapsed` is the clock measuring the time since the match started and `dwell` the clock
    /// measuring the time since the current piece started at `absolute_time`.
    fn from_zone(zone: &Zone, elapsed: Clock, dwell: Clock, absolute_time: f64) -> Self {
        let (a, b) = (elapsed.index(), dwell.index());

        Self([
            zone[(a, b)] - absolute_time,
            zone[(b, a)] + absolute_time,
            zone[(0, b)] - absolute_time,
            zone[(b, 0)] + absolute_time,
            zone[(0, a)],
            zone[(a, 0)],
        ])
    }

    pub fn bounds(&self) -> &[Bound; 6] {
        &self.0
    }

    /// Possible starting times `t` of the windows.
    pub fn start(&self) -> Interval {
        Interval::from_bounds(self.0[0], self.0[1])
    }

    /// Possible ending times `t'` of the windows.
    pub fn end(&self) -> Interval {
        Interval::from_bounds(self.0[2], self.0[3])
    }

    /// Possible durations `t' - t` of the windows.
    pub fn duration(&self) -> Interval {
        Interval::from_bounds(self.0[4], self.0[5])
    }
}

type BucketKey<W> = (LocationId, bool, Vec<Valuation>, W);

/// Zones of the next configuration grouped by everything but the zone.
///
/// Buckets are kept in insertion order so that matching is deterministic.
struct Buckets<W> {
    index: HashMap<BucketKey<W>, usize>,
    buckets: Vec<(BucketKey<W>, Vec<Zone>)>,
}

impl<W> Buckets<W>
where
    W: Semiring + Eq + Hash,
{
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            buckets: Vec::new(),
        }
    }

    fn insert(&mut self, key: BucketKey<W>, zone: Zone) {
        match self.index.get(&key) {
            Some(&i) => self.buckets[i].1.push(zone),
            None => {
                self.index.insert(key.clone(), self.buckets.len());
                self.buckets.push((key, vec![zone]));
            }
        }
    }

    fn into_configuration(self) -> Vec<(ZoneGraphState, W)> {
        let mut configuration = Vec::new();

        for ((location, jumpable, history, weight), zones) in self.buckets {
            for zone in merge_all(zones) {
                let state = ZoneGraphState::new(location, jumpable, zone, history.clone());
                configuration.push((state, weight.clone()));
            }
        }

        configuration
    }
}

/// Merge pairs of zones until no pair has a convex union.
fn merge_all(mut zones: Vec<Zone>) -> Vec<Zone> {
    let mut merged = true;

    while merged {
        merged = false;

        'scan: for j in 1..zones.len() {
            for i in 0..j {
                let (head, tail) = zones.split_at_mut(j);

                if head[i].merge(&tail[0]) {
                    trace!("merged configuration zones {} and {}", i, j);
                    zones.remove(j);
                    merged = true;
                    break 'scan;
                }
            }
        }
    }

    zones
}

/// Incremental matcher of a timed automaton against a piecewise-constant signal.
///
/// The clocks of the zones handled by the matcher are the clocks of the automaton, followed by a
/// clock measuring the time since the match started and a clock measuring the time since the
/// current piece of the signal started.
pub struct Matcher<W, C> {
    automaton: TimedAutomaton,
    cost: C,
    num_clocks: usize,
    num_signals: usize,
    configuration: Vec<(ZoneGraphState, W)>,
    result: BTreeMap<MatchBounds, W>,
    absolute_time: f64,
}

impl<W, C> Matcher<W, C>
where
    W: Semiring + Eq + Hash,
    C: CostFunction<W>,
{
    pub fn new(automaton: TimedAutomaton, cost: C) -> Self {
        let num_clocks = automaton.num_clocks();
        let num_signals = automaton.num_signals();

        Self {
            automaton,
            cost,
            num_clocks,
            num_signals,
            configuration: Vec::new(),
            result: BTreeMap::new(),
            absolute_time: 0.0,
        }
    }

    fn elapsed_clock(&self) -> Clock {
        Clock::Var(self.num_clocks)
    }

    fn dwell_clock(&self) -> Clock {
        Clock::Var(self.num_clocks + 1)
    }

    /// Zone of a match starting at some point of the next piece.
    fn initial_zone(&self) -> Zone {
        let mut zone = Zone::zero(self.num_clocks + 2);
        zone.release(self.num_clocks + 1);
        zone.tighten(Clock::Zero, self.dwell_clock(), Bound::ZERO);
        zone
    }

    fn validate(&self, valuation: &[f64], duration: f64) -> Result<(), FeedError> {
        if duration.is_nan() || duration < 0.0 {
            return Err(FeedError::InvalidDuration(duration));
        }

        if let Some(index) = valuation.iter().position(|v| v.is_nan()) {
            return Err(FeedError::NanValue { index });
        }

        if valuation.len() < self.num_signals {
            return Err(FeedError::MissingValues {
                expected: self.num_signals,
                actual: valuation.len(),
            });
        }

        Ok(())
    }

    /// Match the automaton against the next piece of the signal, which holds the values of
    /// `valuation` for `duration` time units.
    ///
    /// Matches ending in this piece are added to the result map. The matcher is left unchanged if
    /// an error is returned.
    pub fn feed(&mut self, valuation: &[f64], duration: f64) -> Result<(), FeedError> {
        self.validate(valuation, duration)?;

        let valuation = Valuation::from(valuation);
        let dwell = self.num_clocks + 1;
        let mut configuration = std::mem::take(&mut self.configuration);

        for (state, _) in configuration.iter_mut() {
            state.zone.reset(dwell);

            if state.jumpable {
                state.history.push(valuation.clone());
                state.zone.elapse();
            }
        }

        let initial_locations: Vec<_> = self.automaton.initial_locations().collect();

        for location in initial_locations {
            let state = ZoneGraphState::new(location, false, self.initial_zone(), Vec::new());
            configuration.push((state, W::one()));
        }

        let graph = ZoneGraph::construct(&self.automaton, configuration, &self.cost, &valuation, duration);
        let distances = graph.distances();
        let mut buckets = Buckets::new();
        let mut found = HashSet::new();

        for (node, state) in graph.nodes() {
            let weight = match distances.get(&node) {
                Some(weight) if !weight.is_zero() => weight,
                _ => continue,
            };

            if state.zone.num_vars() == 0 {
                continue;
            }

            if !self.automaton.location(state.location).accepting {
                let mut zone = state.zone.clone();
                zone.tighten(self.dwell_clock(), Clock::Zero, Bound::closed(duration));
                zone.tighten(Clock::Zero, self.dwell_clock(), Bound::closed(-duration));

                if zone.is_satisfiable() {
                    let key = (state.location, state.jumpable, state.history.clone(), weight.clone());
                    buckets.insert(key, zone);
                }
            } else if !state.jumpable {
                let bounds =
                    MatchBounds::from_zone(&state.zone, self.elapsed_clock(), self.dwell_clock(), self.absolute_time);

                found.insert(bounds);
                self.result
                    .entry(bounds)
                    .and_modify(|w| *w = w.plus(weight))
                    .or_insert_with(|| weight.clone());
            }
        }

        self.configuration = buckets.into_configuration();
        self.absolute_time += duration;

        debug!(
            "fed piece of duration {}: {} zone graph nodes, {} configurations, {} match bounds",
            duration,
            graph.node_count(),
            self.configuration.len(),
            found.len()
        );

        Ok(())
    }
}

impl<W, C> Matcher<W, C> {
    /// Accumulated weights of the matches found so far.
    pub fn result(&self) -> &BTreeMap<MatchBounds, W> {
        &self.result
    }

    /// Mutable access to the result map, for example to clear it between calls to
    /// [`Matcher::feed`].
    pub fn result_mut(&mut self) -> &mut BTreeMap<MatchBounds, W> {
        &mut self.result
    }

    /// Remove and return the matches found so far.
    pub fn take_result(&mut self) -> BTreeMap<MatchBounds, W> {
        std::mem::take(&mut self.result)
    }

    /// Total duration of the pieces fed so far.
    pub fn absolute_time(&self) -> f64 {
        self.absolute_time
    }

    /// Number of partial matches carried over to the next piece.
    pub fn configuration_len(&self) -> usize {
        self.configuration.len()
    }

    pub fn automaton(&self) -> &TimedAutomaton {
        &self.automaton
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use approx::assert_relative_eq;

    use super::{merge_all, Endpoint, FeedError, Interval, Matcher};
    use crate::automaton::{Location, TimedAutomaton, Transition};
    use crate::bound::Bound;
    use crate::constraint::{Constraint, Guard};
    use crate::robustness::SpaceRobustness;
    use crate::semiring::{Boolean, MaxMin};
    use crate::zone::{Clock, Zone};

    fn low_then_accept() -> TimedAutomaton {
        let mut automaton = TimedAutomaton::new();
        let low = automaton.add_location(Location::initial(Guard::from([Constraint::lt(0, 70)])));
        let done = automaton.add_location(Location::accepting(Guard::new()));
        automaton.add_transition(low, done, Transition::default());
        automaton
    }

    fn interval(lower: f64, upper: f64) -> Zone {
        let mut zone = Zone::zero(1);
        zone.elapse();
        zone.tighten(Clock::Var(0), Clock::Zero, Bound::closed(upper));
        zone.tighten(Clock::Zero, Clock::Var(0), Bound::closed(-lower));
        zone
    }

    #[test]
    fn invalid_input() {
        let mut matcher = Matcher::<MaxMin, _>::new(low_then_accept(), SpaceRobustness);

        assert_eq!(matcher.feed(&[1.0], -1.0), Err(FeedError::InvalidDuration(-1.0)));
        assert_eq!(matcher.feed(&[f64::NAN], 1.0), Err(FeedError::NanValue { index: 0 }));
        assert_eq!(
            matcher.feed(&[], 1.0),
            Err(FeedError::MissingValues { expected: 1, actual: 0 })
        );
        assert_eq!(matcher.absolute_time(), 0.0);
        assert_eq!(matcher.configuration_len(), 0);
    }

    #[test]
    fn single_piece() -> Result<(), Box<dyn Error>> {
        let mut matcher = Matcher::<MaxMin, _>::new(low_then_accept(), SpaceRobustness);
        matcher.feed(&[150.0], 0.1)?;

        assert_eq!(matcher.result().len(), 1);
        assert_relative_eq!(matcher.absolute_time(), 0.1);

        let (bounds, weight) = matcher.result().iter().next().ok_or("missing result")?;
        assert_eq!(*weight, MaxMin(-80.0));

        // The match starts and ends inside the piece.
        assert!(bounds.start().contains(0.05));
        assert!(bounds.end().contains(0.1));
        assert!(!bounds.end().contains(0.2));
        assert!(bounds.duration().contains(0.05));
        assert!(!bounds.duration().contains(0.0));

        Ok(())
    }

    #[test]
    fn take_result_clears() -> Result<(), Box<dyn Error>> {
        let mut matcher = Matcher::<Boolean, _>::new(low_then_accept(), SpaceRobustness);
        matcher.feed(&[10.0], 1.0)?;

        let taken = matcher.take_result();

        assert_eq!(taken.values().collect::<Vec<_>>(), vec![&Boolean(true)]);
        assert!(matcher.result().is_empty());

        matcher.result_mut().insert(*taken.keys().next().ok_or("missing result")?, Boolean(false));
        assert_eq!(matcher.result().len(), 1);

        Ok(())
    }

    #[test]
    fn partial_matches_are_carried_over() -> Result<(), Box<dyn Error>> {
        let mut matcher = Matcher::<MaxMin, _>::new(low_then_accept(), SpaceRobustness);
        matcher.feed(&[150.0], 0.1)?;

        assert!(matcher.configuration_len() > 0);

        Ok(())
    }

    #[test]
    fn merge_adjacent_zones() {
        let merged = merge_all(vec![interval(0.0, 1.0), interval(3.0, 4.0), interval(1.0, 3.0)]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0], interval(0.0, 4.0));
    }

    #[test]
    fn keep_disjoint_zones() {
        let merged = merge_all(vec![interval(0.0, 1.0), interval(3.0, 4.0)]);

        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn intervals() {
        let interval = Interval::from_bounds(Bound::closed(-1.0), Bound::open(2.0));

        assert_eq!(interval.lower, Endpoint::Closed(1.0));
        assert_eq!(interval.upper, Endpoint::Open(2.0));
        assert!(interval.contains(1.0));
        assert!(!interval.contains(2.0));
        assert_eq!(interval.to_string(), "1 <= t < 2");

        let unbounded = Interval::from_bounds(Bound::ZERO, Bound::INFINITY);
        assert_eq!(unbounded.upper, Endpoint::Open(f64::INFINITY));
    }
}
