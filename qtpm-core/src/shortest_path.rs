//! Path problems over graphs weighted by a [`Semiring`].
//!
//! Both algorithms accept any graph implementing the [`petgraph`] visitor traits, so they can be
//! applied to a `&Graph`, a `&StableGraph` or a `&GraphMap` alike.
//!
//! ```rust
//! use petgraph::graph::DiGraph;
//! use qtpm_core::semiring::{MinPlus, Semiring};
//! use qtpm_core::shortest_path::bellman_ford;
//!
//! let mut graph = DiGraph::new();
//! let a = graph.add_node(());
//! let b = graph.add_node(());
//! graph.add_edge(a, b, MinPlus(3.0));
//!
//! let distance = bellman_ford(&graph, [(a, MinPlus::one())]);
//! assert_eq!(distance[&b], MinPlus(3.0));
//! ```

use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::Hash;

use petgraph::visit::{Data, EdgeRef, IntoEdgeReferences, IntoEdges, IntoNodeIdentifiers};

use crate::semiring::{Semiring, StarSemiring};

/// Sum of the weights of all paths from the sources to every node.
///
/// Every source starts with its own weight, and every node that is not a source starts with
/// [`Semiring::zero`]. Pending increments are propagated in FIFO order until no accumulated weight
/// changes, so the algorithm terminates only for semirings in which no cycle can improve a weight
/// forever (for example min-plus graphs without negative cycles, or any idempotent semiring whose
/// `times` does not increase weights).
///
/// Sources appearing more than once have their weights combined with [`Semiring::plus`].
pub fn bellman_ford<G, W, I>(graph: G, initial: I) -> HashMap<G::NodeId, W>
where
    G: IntoEdges + IntoNodeIdentifiers + Data<EdgeWeight = W>,
    G::NodeId: Eq + Hash,
    W: Semiring,
    I: IntoIterator<Item = (G::NodeId, W)>,
{
    let mut distance: HashMap<G::NodeId, W> = graph.node_identifiers().map(|v| (v, W::zero())).collect();
    let mut pending_weight: HashMap<G::NodeId, W> = distance.clone();
    let mut queue = VecDeque::new();
    let mut queued = HashSet::new();

    for (source, weight) in initial {
        let d = distance.entry(source).or_insert_with(W::zero);
        *d = d.plus(&weight);

        let r = pending_weight.entry(source).or_insert_with(W::zero);
        *r = r.plus(&weight);

        if queued.insert(source) {
            queue.push_back(source);
        }
    }

    while let Some(q) = queue.pop_front() {
        queued.remove(&q);

        let delta = match pending_weight.get_mut(&q) {
            Some(r) => std::mem::replace(r, W::zero()),
            None => continue,
        };

        for edge in graph.edges(q) {
            let target = edge.target();
            let contribution = delta.times(edge.weight());
            let current = distance.entry(target).or_insert_with(W::zero);
            let updated = current.plus(&contribution);

            if updated == *current {
                continue;
            }

            *current = updated;

            let r = pending_weight.entry(target).or_insert_with(W::zero);
            *r = r.plus(&contribution);

            if queued.insert(target) {
                queue.push_back(target);
            }
        }
    }

    distance
}

/// Sum of the weights of all paths between every pair of nodes.
///
/// Cycles through a node are summarized with [`StarSemiring::star`]. Parallel edges are combined
/// with [`Semiring::plus`].
pub fn warshall_floyd<G, W>(graph: G) -> HashMap<(G::NodeId, G::NodeId), W>
where
    G: IntoEdgeReferences + IntoNodeIdentifiers + Data<EdgeWeight = W>,
    G::NodeId: Eq + Hash,
    W: StarSemiring,
{
    let nodes: Vec<G::NodeId> = graph.node_identifiers().collect();
    let index: HashMap<G::NodeId, usize> = nodes.iter().enumerate().map(|(i, v)| (*v, i)).collect();
    let n = nodes.len();
    let mut d = vec![vec![W::zero(); n]; n];

    for edge in graph.edge_references() {
        let (s, t) = (index[&edge.source()], index[&edge.target()]);
        d[s][t] = d[s][t].plus(edge.weight());
    }

    for k in 0..n {
        let star = d[k][k].star();

        for i in (0..n).filter(|&i| i != k) {
            let through = d[i][k].times(&star);

            for j in (0..n).filter(|&j| j != k) {
                d[i][j] = d[i][j].plus(&through.times(&d[k][j]));
            }
        }

        for i in (0..n).filter(|&i| i != k) {
            d[k][i] = star.times(&d[k][i]);
            d[i][k] = d[i][k].times(&star);
        }

        d[k][k] = star;
    }

    let mut distance = HashMap::with_capacity(n * n);

    for (i, row) in d.into_iter().enumerate() {
        for (j, weight) in row.into_iter().enumerate() {
            distance.insert((nodes[i], nodes[j]), weight);
        }
    }

    distance
}
