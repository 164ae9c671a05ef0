//! Symbolic state spaces of a timed automaton.
//!
//! A node of a zone graph pairs a location of the automaton with a [`Zone`] of clock valuations.
//! Two kinds of zone graphs are built here:
//!
//! - [`ReachabilityGraph`] explores every zone reachable from the initial locations, using the
//!   maximum constant of the automaton to keep the number of zones finite.
//! - [`ZoneGraph`] explores the moves possible during one constant piece of a signal. Its edges
//!   carry semiring weights: a discrete transition costs the score of the signal values observed
//!   in the source location, and letting time pass costs [`Semiring::one`].
//!
//! Both graphs are stored in a [`StableDiGraph`] so that node indices remain valid while dead
//! nodes are pruned.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::{debug, trace};
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;

use crate::automaton::{LocationId, TimedAutomaton};
use crate::bound::Bound;
use crate::robustness::CostFunction;
use crate::semiring::Semiring;
use crate::shortest_path::bellman_ford;
use crate::signal::Valuation;
use crate::zone::{Clock, Zone, ZoneKey};

/// Node of a [`ZoneGraph`].
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneGraphState {
    pub location: LocationId,
    /// A discrete transition may be taken next. Otherwise time must pass first.
    pub jumpable: bool,
    pub zone: Zone,
    /// Signal values observed since the location was entered.
    pub history: Vec<Valuation>,
}

/// Identity of a [`ZoneGraphState`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateKey {
    location: LocationId,
    jumpable: bool,
    zone: ZoneKey,
    history: Vec<Valuation>,
}

impl ZoneGraphState {
    pub fn new(location: LocationId, jumpable: bool, zone: Zone, history: Vec<Valuation>) -> Self {
        Self {
            location,
            jumpable,
            zone,
            history,
        }
    }

    pub fn key(&self) -> StateKey {
        StateKey {
            location: self.location,
            jumpable: self.jumpable,
            zone: self.zone.to_key(),
            history: self.history.clone(),
        }
    }
}

/// Zones reachable from `zone` in `location` by taking one transition immediately.
fn discrete_successors(automaton: &TimedAutomaton, location: LocationId, zone: &Zone) -> Vec<(LocationId, Zone)> {
    let mut successors = Vec::new();

    for (target, transition) in automaton.transitions(location) {
        let mut next = zone.clone();
        transition.guard.restrict(&mut next);

        if !next.is_satisfiable() {
            continue;
        }

        for clock in &transition.resets {
            next.reset(*clock);
        }

        successors.push((target, next));
    }

    successors
}

/// Weighted zone graph of one piece of the signal.
#[derive(Debug, Clone)]
pub struct ZoneGraph<W> {
    graph: StableDiGraph<ZoneGraphState, W>,
    initial: BTreeMap<NodeIndex, W>,
}

impl<W> ZoneGraph<W>
where
    W: Semiring,
{
    /// Explore the moves of the automaton during a piece of the signal.
    ///
    /// Every entry of `configuration` is a starting node with its weight. The zones of the entries
    /// must contain a dwell-time clock as their last clock, which measures the time elapsed since
    /// the beginning of the piece and is bounded here by `duration`. Entries that lead to the same
    /// node are combined, and their weights are added.
    ///
    /// Nodes from which no transition can ever be taken, and which are not accepting, are removed
    /// from the graph.
    pub fn construct<C>(
        automaton: &TimedAutomaton,
        configuration: Vec<(ZoneGraphState, W)>,
        cost: &C,
        valuation: &Valuation,
        duration: f64,
    ) -> Self
    where
        C: CostFunction<W> + ?Sized,
    {
        let dwell = match configuration.first().and_then(|(state, _)| state.zone.num_vars().checked_sub(1)) {
            Some(var) => Clock::Var(var),
            None => {
                return Self {
                    graph: StableDiGraph::default(),
                    initial: BTreeMap::new(),
                }
            }
        };

        let mut builder = Builder {
            automaton,
            cost,
            dwell,
            duration,
            graph: StableDiGraph::default(),
            initial: BTreeMap::new(),
            index: HashMap::new(),
            dead: HashSet::new(),
            worklist: Vec::new(),
        };

        for (state, weight) in configuration {
            builder.seed(state, weight);
        }

        while !builder.worklist.is_empty() {
            let current = std::mem::take(&mut builder.worklist);

            for node in current {
                if builder.dead.contains(&node) {
                    continue;
                }

                if builder.graph[node].jumpable {
                    builder.expand_jumpable(node);
                } else {
                    builder.expand_elapsing(node, valuation);
                }
            }

            let dead = &builder.dead;
            builder.worklist.retain(|node| !dead.contains(node));
        }

        builder.finish()
    }

    /// Total weight of the paths from the initial nodes to every node.
    pub fn distances(&self) -> HashMap<NodeIndex, W> {
        bellman_ford(&self.graph, self.initial.iter().map(|(node, w)| (*node, w.clone())))
    }
}

impl<W> ZoneGraph<W> {
    pub fn node(&self, node: NodeIndex) -> Option<&ZoneGraphState> {
        self.graph.node_weight(node)
    }

    /// Nodes of the graph in index order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &ZoneGraphState)> + '_ {
        self.graph.node_indices().map(|node| (node, &self.graph[node]))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Starting nodes and their weights.
    pub fn initial(&self) -> &BTreeMap<NodeIndex, W> {
        &self.initial
    }

    pub fn graph(&self) -> &StableDiGraph<ZoneGraphState, W> {
        &self.graph
    }
}

struct Builder<'a, W, C: ?Sized> {
    automaton: &'a TimedAutomaton,
    cost: &'a C,
    dwell: Clock,
    duration: f64,
    graph: StableDiGraph<ZoneGraphState, W>,
    initial: BTreeMap<NodeIndex, W>,
    index: HashMap<StateKey, NodeIndex>,
    dead: HashSet<NodeIndex>,
    worklist: Vec<NodeIndex>,
}

impl<'a, W, C> Builder<'a, W, C>
where
    W: Semiring,
    C: CostFunction<W> + ?Sized,
{
    fn bound_dwell_time(&self, zone: &mut Zone) {
        zone.tighten(self.dwell, Clock::Zero, Bound::closed(self.duration));
    }

    fn seed(&mut self, mut state: ZoneGraphState, weight: W) {
        self.bound_dwell_time(&mut state.zone);

        let key = state.key();

        if let Some(&node) = self.index.get(&key) {
            let w = self.initial.entry(node).or_insert_with(W::zero);
            *w = w.plus(&weight);
            return;
        }

        let node = self.graph.add_node(state);
        self.index.insert(key, node);
        self.initial.insert(node, weight);
        self.worklist.push(node);
    }

    /// Connect `from` to the node with the given contents, creating it if needed.
    ///
    /// Returns the target node and whether it was created.
    fn connect(
        &mut self,
        from: NodeIndex,
        location: LocationId,
        jumpable: bool,
        zone: Zone,
        history: Vec<Valuation>,
    ) -> (NodeIndex, bool) {
        let weight = if jumpable {
            W::one()
        } else {
            let source = &self.graph[from];
            let label = &self.automaton.location(source.location).label;
            self.cost.cost(label, &source.history)
        };

        let state = ZoneGraphState::new(location, jumpable, zone, history);
        let key = state.key();

        let (target, created) = match self.index.get(&key) {
            Some(&target) => (target, false),
            None => {
                let target = self.graph.add_node(state);
                self.index.insert(key, target);

                if !jumpable {
                    self.worklist.push(target);
                }

                (target, true)
            }
        };

        self.graph.add_edge(from, target, weight);
        (target, created)
    }

    /// Mark a node as dead. Dead nodes are removed from the graph once exploration is complete.
    fn kill(&mut self, node: NodeIndex) {
        trace!("removing dead zone graph node {:?}", node);

        self.index.remove(&self.graph[node].key());
        self.initial.remove(&node);
        self.dead.insert(node);
    }

    fn has_future_transition(&self, location: LocationId, zone: &Zone) -> bool {
        let mut future = zone.clone();
        future.elapse();

        !discrete_successors(self.automaton, location, &future).is_empty()
    }

    fn expand_jumpable(&mut self, node: NodeIndex) {
        let location = self.graph[node].location;
        let mut zone = self.graph[node].zone.clone();
        self.bound_dwell_time(&mut zone);

        let successors = discrete_successors(self.automaton, location, &zone);

        if successors.is_empty() {
            if !self.has_future_transition(location, &zone) {
                self.kill(node);
            }

            return;
        }

        for (target, next) in successors {
            self.connect(node, target, false, next, Vec::new());
        }
    }

    fn expand_elapsing(&mut self, node: NodeIndex, valuation: &Valuation) {
        let location = self.graph[node].location;
        let mut zone = self.graph[node].zone.clone();
        self.bound_dwell_time(&mut zone);

        let mut history = self.graph[node].history.clone();
        history.push(valuation.clone());

        zone.elapse();
        self.bound_dwell_time(&mut zone);

        if !zone.is_satisfiable_without_canonize() {
            return;
        }

        let successors = discrete_successors(self.automaton, location, &zone);

        if !successors.is_empty() {
            let (twin, created) = self.connect(node, location, true, zone, history);

            if created {
                for (target, next) in successors {
                    self.connect(twin, target, false, next, Vec::new());
                }
            }
        } else if !self.automaton.location(location).accepting && !self.has_future_transition(location, &zone) {
            self.kill(node);
        }
    }

    fn finish(mut self) -> ZoneGraph<W> {
        for node in self.dead.drain() {
            self.graph.remove_node(node);
        }

        debug!(
            "zone graph has {} nodes, {} edges and {} initial nodes",
            self.graph.node_count(),
            self.graph.edge_count(),
            self.initial.len()
        );

        ZoneGraph {
            graph: self.graph,
            initial: self.initial,
        }
    }
}

/// Unweighted graph of every zone reachable from the initial locations of an automaton.
#[derive(Debug, Clone)]
pub struct ReachabilityGraph {
    graph: StableDiGraph<(LocationId, Zone), ()>,
    initial: Vec<NodeIndex>,
}

impl ReachabilityGraph {
    /// Explore the zones of the automaton.
    ///
    /// Bounds that are not tighter than the largest guard constant are dropped, so the exploration
    /// terminates.
    pub fn construct(automaton: &TimedAutomaton) -> Self {
        let mut origin = Zone::zero(automaton.num_clocks());
        origin.set_max_constant(Bound::closed(automaton.max_constant() as f64));

        let mut graph = StableDiGraph::default();
        let mut index: HashMap<(LocationId, ZoneKey), NodeIndex> = HashMap::new();
        let mut initial = Vec::new();

        for location in automaton.initial_locations() {
            let node = graph.add_node((location, origin.clone()));
            index.insert((location, origin.to_key()), node);
            initial.push(node);
        }

        let mut worklist = initial.clone();

        while let Some(node) = worklist.pop() {
            let (location, zone): &(LocationId, Zone) = &graph[node];
            let location = *location;
            let mut elapsed = zone.clone();
            elapsed.elapse();

            for (target, mut next) in discrete_successors(automaton, location, &elapsed) {
                next.abstractize();
                next.canonize();

                let key = (target, next.to_key());
                let successor = match index.get(&key) {
                    Some(&successor) => successor,
                    None => {
                        let successor = graph.add_node((target, next));
                        index.insert(key, successor);
                        worklist.push(successor);
                        successor
                    }
                };

                graph.add_edge(node, successor, ());
            }
        }

        debug!("reachability graph has {} nodes and {} edges", graph.node_count(), graph.edge_count());

        Self { graph, initial }
    }

    pub fn initial(&self) -> &[NodeIndex] {
        &self.initial
    }

    pub fn node(&self, node: NodeIndex) -> Option<&(LocationId, Zone)> {
        self.graph.node_weight(node)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn graph(&self) -> &StableDiGraph<(LocationId, Zone), ()> {
        &self.graph
    }
}
