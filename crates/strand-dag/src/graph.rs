//! Commit graph reconstructed from a history reply.
//!
//! The graph is built once from a vertex list and an edge list and is then
//! read-only. Adjacency is kept in ordered maps, so every enumeration is
//! sorted and two graphs built from permutations of the same input compare
//! equal.

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

/// Directed graph over commit hashes with parent→child edges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryGraph<H: Ord> {
    vertices: BTreeSet<H>,
    parents: BTreeMap<H, BTreeSet<H>>,
    children: BTreeMap<H, BTreeSet<H>>,
}

impl<H: Ord + Clone + std::hash::Hash> HistoryGraph<H> {
    pub fn new() -> Self {
        Self {
            vertices: BTreeSet::new(),
            parents: BTreeMap::new(),
            children: BTreeMap::new(),
        }
    }

    /// Add every vertex, then every `(parent, child)` edge.
    ///
    /// An edge endpoint missing from `vertices` becomes a vertex. Cycles
    /// are not checked for.
    pub fn from_parts<V, E>(vertices: V, edges: E) -> Self
    where
        V: IntoIterator<Item = H>,
        E: IntoIterator<Item = (H, H)>,
    {
        let mut graph = Self::new();
        for v in vertices {
            graph.add_vertex(v);
        }
        for (parent, child) in edges {
            graph.add_edge(parent, child);
        }
        graph
    }

    fn add_vertex(&mut self, v: H) {
        self.vertices.insert(v);
    }

    fn add_edge(&mut self, parent: H, child: H) {
        self.add_vertex(parent.clone());
        self.add_vertex(child.clone());
        self.children.entry(parent.clone()).or_default().insert(child.clone());
        self.parents.entry(child).or_default().insert(parent);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.children.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn contains(&self, v: &H) -> bool {
        self.vertices.contains(v)
    }

    /// Vertices in ascending order.
    pub fn vertices(&self) -> impl Iterator<Item = &H> {
        self.vertices.iter()
    }

    /// `(parent, child)` edges in ascending order.
    pub fn edges(&self) -> impl Iterator<Item = (&H, &H)> {
        self.children
            .iter()
            .flat_map(|(parent, kids)| kids.iter().map(move |child| (parent, child)))
    }

    pub fn parents(&self, v: &H) -> Vec<&H> {
        self.parents.get(v).map(|ps| ps.iter().collect()).unwrap_or_default()
    }

    pub fn children(&self, v: &H) -> Vec<&H> {
        self.children.get(v).map(|cs| cs.iter().collect()).unwrap_or_default()
    }

    /// Vertices without parents inside the graph.
    pub fn roots(&self) -> Vec<&H> {
        self.vertices
            .iter()
            .filter(|v| self.parents.get(*v).map_or(true, BTreeSet::is_empty))
            .collect()
    }

    /// Vertices without children inside the graph.
    pub fn heads(&self) -> Vec<&H> {
        self.vertices
            .iter()
            .filter(|v| self.children.get(*v).map_or(true, BTreeSet::is_empty))
            .collect()
    }

    /// Ancestors of `v` up to `max_depth` levels (BFS upward), nearest
    /// first. `None` walks the whole graph. `v` itself is not included.
    pub fn ancestors(&self, v: &H, max_depth: Option<usize>) -> Vec<&H> {
        self.walk(v, max_depth, &self.parents)
    }

    /// Descendants of `v` up to `max_depth` levels (BFS downward).
    pub fn descendants(&self, v: &H, max_depth: Option<usize>) -> Vec<&H> {
        self.walk(v, max_depth, &self.children)
    }

    fn walk<'a>(
        &'a self,
        start: &H,
        max_depth: Option<usize>,
        adjacency: &'a BTreeMap<H, BTreeSet<H>>,
    ) -> Vec<&'a H> {
        if !self.vertices.contains(start) {
            return Vec::new();
        }
        let within = |depth: usize| max_depth.map_or(true, |max| depth <= max);

        let mut visited: HashSet<&H> = HashSet::new();
        let mut result = Vec::new();
        let mut queue: VecDeque<(&H, usize)> = VecDeque::new();

        if let Some(next) = adjacency.get(start) {
            for n in next {
                if visited.insert(n) {
                    queue.push_back((n, 1));
                }
            }
        }

        while let Some((current, depth)) = queue.pop_front() {
            if !within(depth) || current == start {
                continue;
            }
            result.push(current);
            if within(depth + 1) {
                if let Some(next) = adjacency.get(current) {
                    for n in next {
                        if visited.insert(n) {
                            queue.push_back((n, depth + 1));
                        }
                    }
                }
            }
        }

        result
    }
}

impl<H: Ord + Clone + std::hash::Hash> Default for HistoryGraph<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Diamond history:
    ///   1
    ///  / \
    /// 2   3
    ///  \ /
    ///   4
    fn diamond() -> HistoryGraph<u8> {
        HistoryGraph::from_parts([1, 2, 3, 4], [(1, 2), (1, 3), (2, 4), (3, 4)])
    }

    #[test]
    fn empty_graph() {
        let g = HistoryGraph::<u8>::new();
        assert!(g.is_empty());
        assert!(g.roots().is_empty());
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn diamond_structure() {
        let g = diamond();
        assert_eq!(g.vertex_count(), 4);
        assert_eq!(g.edge_count(), 4);
        assert_eq!(g.roots(), vec![&1]);
        assert_eq!(g.heads(), vec![&4]);
        assert_eq!(g.parents(&4), vec![&2, &3]);
        assert_eq!(g.children(&1), vec![&2, &3]);
        assert!(g.parents(&1).is_empty());
    }

    #[test]
    fn edges_are_sorted() {
        let g = HistoryGraph::from_parts([], [(3, 4), (1, 3), (2, 4), (1, 2)]);
        let edges: Vec<(u8, u8)> = g.edges().map(|(p, c)| (*p, *c)).collect();
        assert_eq!(edges, vec![(1, 2), (1, 3), (2, 4), (3, 4)]);
    }

    #[test]
    fn edge_endpoints_become_vertices() {
        let g = HistoryGraph::from_parts([1], [(1, 2), (7, 1)]);
        assert!(g.contains(&2));
        assert!(g.contains(&7));
        assert_eq!(g.roots(), vec![&7]);
    }

    #[test]
    fn duplicate_input_is_collapsed() {
        let g = HistoryGraph::from_parts([1, 1, 2], [(1, 2), (1, 2)]);
        assert_eq!(g.vertex_count(), 2);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn bounded_ancestors() {
        let g = diamond();
        assert_eq!(g.ancestors(&4, Some(1)), vec![&2, &3]);
        assert_eq!(g.ancestors(&4, None), vec![&2, &3, &1]);
        assert!(g.ancestors(&4, Some(0)).is_empty());
        assert!(g.ancestors(&1, None).is_empty());
        assert!(g.ancestors(&9, None).is_empty());
    }

    #[test]
    fn bounded_descendants() {
        let g = diamond();
        assert_eq!(g.descendants(&1, Some(1)), vec![&2, &3]);
        assert_eq!(g.descendants(&1, None), vec![&2, &3, &4]);
        assert_eq!(g.descendants(&2, Some(5)), vec![&4]);
    }

    #[test]
    fn walks_terminate_on_cycles() {
        let g = HistoryGraph::from_parts([], [(1, 2), (2, 1)]);
        assert_eq!(g.ancestors(&1, None), vec![&2]);
    }

    fn history_input() -> impl Strategy<Value = (Vec<u8>, Vec<(u8, u8)>)> {
        (
            prop::collection::vec(0u8..32, 0..24),
            prop::collection::vec((0u8..32, 0u8..32), 0..48),
        )
    }

    type HistoryInput = (Vec<u8>, Vec<(u8, u8)>);

    fn shuffled_history_input() -> impl Strategy<Value = (HistoryInput, HistoryInput)> {
        history_input().prop_flat_map(|(vs, es)| {
            let original = Just((vs.clone(), es.clone()));
            let shuffled = (Just(vs).prop_shuffle(), Just(es).prop_shuffle());
            (original, shuffled)
        })
    }

    proptest! {
        #[test]
        fn reconstruction_ignores_input_order(
            ((vertices, edges), (shuffled_vertices, shuffled_edges)) in shuffled_history_input(),
        ) {
            let built = HistoryGraph::from_parts(vertices, edges);
            let permuted = HistoryGraph::from_parts(shuffled_vertices, shuffled_edges);

            prop_assert_eq!(&built, &permuted);
            prop_assert_eq!(
                built.edges().collect::<Vec<_>>(),
                permuted.edges().collect::<Vec<_>>()
            );
        }

        #[test]
        fn every_edge_endpoint_is_a_vertex((vertices, edges) in history_input()) {
            let g = HistoryGraph::from_parts(vertices, edges.clone());
            for (p, c) in edges {
                prop_assert!(g.contains(&p));
                prop_assert!(g.contains(&c));
                prop_assert!(g.children(&p).contains(&&c));
            }
        }
    }
}
