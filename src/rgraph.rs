//! Resolution graph for bond-pair matching.
//!
//! Each node pairs a bond of graph 1 with a compatible bond of graph 2. Two
//! nodes are *forbidden* together when they reuse a bond or disagree on
//! adjacency, and they *extend* each other when their bonds share an atom. A
//! search grows node sets along extensions while avoiding forbidden pairs;
//! every maximal set found is one common substructure, read back as a list of
//! [`RMap`] bond pairs.

use std::time::{Duration, Instant};

use fixedbitset::FixedBitSet;
use tracing::{debug, trace};

use crate::error::MatchError;

/// Correspondence between index `id1` in graph 1 and `id2` in graph 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RMap {
    pub id1: usize,
    pub id2: usize,
}

impl RMap {
    pub fn new(id1: usize, id2: usize) -> Self {
        Self { id1, id2 }
    }
}

#[derive(Debug, Clone)]
pub struct RNode {
    rmap: RMap,
    extension: FixedBitSet,
    forbidden: FixedBitSet,
}

impl RNode {
    pub fn rmap(&self) -> RMap {
        self.rmap
    }

    pub fn extension(&self) -> &FixedBitSet {
        &self.extension
    }

    pub fn forbidden(&self) -> &FixedBitSet {
        &self.forbidden
    }
}

/// Limits applied to one [`RGraph::parse`] run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchLimits {
    /// Start of the search and the time it may take.
    pub deadline: Option<(Instant, Duration)>,
    pub max_iterations: Option<usize>,
}

impl SearchLimits {
    pub(crate) fn check(&self) -> Result<(), MatchError> {
        match self.deadline {
            Some((start, limit)) if start.elapsed() >= limit => {
                debug!(?limit, "resolution graph search timed out");
                Err(MatchError::Timeout { limit })
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RGraph {
    nodes: Vec<RNode>,
    first_graph_size: usize,
    second_graph_size: usize,
}

impl RGraph {
    /// A graph over the given bond pairs with no relations yet, apart from
    /// every node being incompatible with itself.
    pub fn new(rmaps: Vec<RMap>, first_graph_size: usize, second_graph_size: usize) -> Self {
        let n = rmaps.len();
        let nodes = rmaps
            .into_iter()
            .enumerate()
            .map(|(i, rmap)| {
                let mut forbidden = FixedBitSet::with_capacity(n);
                forbidden.insert(i);
                RNode {
                    rmap,
                    extension: FixedBitSet::with_capacity(n),
                    forbidden,
                }
            })
            .collect();
        Self {
            nodes,
            first_graph_size,
            second_graph_size,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[RNode] {
        &self.nodes
    }

    pub fn first_graph_size(&self) -> usize {
        self.first_graph_size
    }

    pub fn second_graph_size(&self) -> usize {
        self.second_graph_size
    }

    pub fn forbid(&mut self, i: usize, j: usize) {
        self.nodes[i].forbidden.insert(j);
        self.nodes[j].forbidden.insert(i);
    }

    pub fn extend(&mut self, i: usize, j: usize) {
        self.nodes[i].extension.insert(j);
        self.nodes[j].extension.insert(i);
    }

    /// Nodes allowed to start a search constrained to `c1` and `c2`; an empty
    /// constraint allows everything on its side.
    pub fn build_b(&self, c1: &FixedBitSet, c2: &FixedBitSet) -> FixedBitSet {
        let mut b = FixedBitSet::with_capacity(self.len());
        for (i, node) in self.nodes.iter().enumerate() {
            let first = c1.is_clear() || c1.contains(node.rmap.id1);
            let second = c2.is_clear() || c2.contains(node.rmap.id2);
            if first && second {
                b.insert(i);
            }
        }
        b
    }

    /// Bonds of graph 1 used by a node set.
    pub fn project_g1(&self, set: &FixedBitSet) -> FixedBitSet {
        let mut bs = FixedBitSet::with_capacity(self.first_graph_size);
        for x in set.ones() {
            bs.insert(self.nodes[x].rmap.id1);
        }
        bs
    }

    /// Bonds of graph 2 used by a node set.
    pub fn project_g2(&self, set: &FixedBitSet) -> FixedBitSet {
        let mut bs = FixedBitSet::with_capacity(self.second_graph_size);
        for x in set.ones() {
            bs.insert(self.nodes[x].rmap.id2);
        }
        bs
    }

    pub fn bitset_to_rmaps(&self, set: &FixedBitSet) -> Vec<RMap> {
        set.ones().map(|x| self.nodes[x].rmap).collect()
    }

    /// Collects the node sets covering `c1` and `c2` that no other solution
    /// contains.
    ///
    /// Without `find_all_structure` the search stops at the first solution.
    /// With `find_all_map`, solutions realising the same bonds through
    /// different pairings are all kept.
    pub fn parse(
        &self,
        c1: &FixedBitSet,
        c2: &FixedBitSet,
        find_all_structure: bool,
        find_all_map: bool,
        limits: SearchLimits,
    ) -> Result<Vec<FixedBitSet>, MatchError> {
        let n = self.len();
        let mut all = FixedBitSet::with_capacity(n);
        all.insert_range(..);

        let extension = if c1.is_clear() && c2.is_clear() {
            all.clone()
        } else {
            self.build_b(c1, c2)
        };

        let mut search = Search {
            graph: self,
            c1,
            c2,
            all,
            find_all_structure,
            find_all_map,
            limits,
            solutions: Vec::new(),
            stop: false,
            iterations: 0,
        };
        search.parse_rec(
            &FixedBitSet::with_capacity(n),
            &extension,
            &FixedBitSet::with_capacity(n),
        )?;
        trace!(
            solutions = search.solutions.len(),
            iterations = search.iterations,
            "resolution graph parsed"
        );
        Ok(search.solutions)
    }
}

struct Search<'g> {
    graph: &'g RGraph,
    c1: &'g FixedBitSet,
    c2: &'g FixedBitSet,
    all: FixedBitSet,
    find_all_structure: bool,
    find_all_map: bool,
    limits: SearchLimits,
    solutions: Vec<FixedBitSet>,
    stop: bool,
    iterations: usize,
}

impl Search<'_> {
    fn parse_rec(
        &mut self,
        traversed: &FixedBitSet,
        extension: &FixedBitSet,
        forbidden: &FixedBitSet,
    ) -> Result<(), MatchError> {
        self.limits.check()?;

        if extension.is_clear() {
            return self.solution(traversed);
        }

        let mut potential = self.all.clone();
        potential.difference_with(forbidden);
        potential.union_with(traversed);
        if !self.must_continue(&potential) {
            return Ok(());
        }
        self.iterations += 1;

        let graph = self.graph;
        let mut forbidden = forbidden.clone();
        for x in extension.ones() {
            if self.stop {
                break;
            }
            let node = &graph.nodes[x];

            let mut new_forbidden = forbidden.clone();
            new_forbidden.union_with(&node.forbidden);

            let mut new_extension = if traversed.is_clear() {
                node.extension.clone()
            } else {
                let mut e = extension.clone();
                e.union_with(&node.extension);
                e
            };
            new_extension.difference_with(&new_forbidden);

            let mut new_traversed = traversed.clone();
            new_traversed.insert(x);
            forbidden.insert(x);

            self.parse_rec(&new_traversed, &new_extension, &new_forbidden)?;
        }
        Ok(())
    }

    fn solution(&mut self, traversed: &FixedBitSet) -> Result<(), MatchError> {
        let proj1 = self.graph.project_g1(traversed);
        let proj2 = self.graph.project_g2(traversed);
        if !(self.c1.is_subset(&proj1) && self.c2.is_subset(&proj2)) {
            return Ok(());
        }

        let mut included = false;
        let mut i = 0;
        while i < self.solutions.len() && !included {
            self.limits.check()?;
            let sol = &self.solutions[i];
            if sol == traversed {
                included = true;
                continue;
            }
            let sol1 = self.graph.project_g1(sol);
            let sol2 = self.graph.project_g2(sol);
            if self.find_all_map && (proj1 == sol1 || proj2 == sol2) {
                i += 1;
            } else if proj1.is_subset(&sol1) || proj2.is_subset(&sol2) {
                included = true;
            } else if sol1.is_subset(&proj1) || sol2.is_subset(&proj2) {
                self.solutions.remove(i);
            } else {
                i += 1;
            }
        }

        if !included {
            self.solutions.push(traversed.clone());
        }
        if !self.find_all_structure {
            self.stop = true;
        }
        Ok(())
    }

    fn must_continue(&self, potential: &FixedBitSet) -> bool {
        if let Some(max) = self.limits.max_iterations {
            if self.iterations >= max {
                debug!(max, "resolution graph iteration limit reached");
                return false;
            }
        }

        let proj1 = self.graph.project_g1(potential);
        let proj2 = self.graph.project_g2(potential);
        if !(self.c1.is_subset(&proj1) && self.c2.is_subset(&proj2)) {
            return false;
        }

        // nothing reachable from here can beat a solution we already hold
        for sol in &self.solutions {
            let sol1 = self.graph.project_g1(sol);
            let sol2 = self.graph.project_g2(sol);
            if self.find_all_map && (proj1 == sol1 || proj2 == sol2) {
                continue;
            }
            if proj1.is_subset(&sol1) || proj2.is_subset(&sol2) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(len: usize, ones: &[usize]) -> FixedBitSet {
        let mut bs = FixedBitSet::with_capacity(len);
        for &i in ones {
            bs.insert(i);
        }
        bs
    }

    /// Graph 1: bonds e0 e1 e2 of C-C-C-O. Graph 2: bonds f0 f1 of C-C-O.
    fn propanol_vs_ethanol() -> RGraph {
        let mut g = RGraph::new(
            vec![RMap::new(0, 0), RMap::new(1, 0), RMap::new(2, 1)],
            3,
            2,
        );
        g.forbid(0, 1);
        g.forbid(0, 2);
        g.extend(1, 2);
        g
    }

    #[test]
    fn nodes_forbid_themselves() {
        let g = propanol_vs_ethanol();
        assert!(g.nodes()[0].forbidden().contains(0));
        assert!(g.nodes()[1].forbidden().contains(0));
        assert!(g.nodes()[2].extension().contains(1));
        assert_eq!(g.nodes()[2].rmap(), RMap::new(2, 1));
    }

    #[test]
    fn maximal_solution_replaces_smaller_one() {
        let g = propanol_vs_ethanol();
        let none = FixedBitSet::new();
        let solutions = g
            .parse(&none, &none, true, false, SearchLimits::default())
            .unwrap();
        assert_eq!(solutions, vec![bits(3, &[1, 2])]);
        assert_eq!(
            g.bitset_to_rmaps(&solutions[0]),
            vec![RMap::new(1, 0), RMap::new(2, 1)]
        );
    }

    #[test]
    fn constraints_restrict_start_nodes() {
        let g = propanol_vs_ethanol();
        let b = g.build_b(&bits(3, &[0]), &FixedBitSet::new());
        assert_eq!(b, bits(3, &[0]));

        // every bond of graph 2 must be covered
        let c2 = bits(2, &[0, 1]);
        let solutions = g
            .parse(&FixedBitSet::new(), &c2, false, false, SearchLimits::default())
            .unwrap();
        assert_eq!(solutions.len(), 1);
        assert_eq!(g.project_g2(&solutions[0]), bits(2, &[0, 1]));
        assert_eq!(g.project_g1(&solutions[0]), bits(3, &[1, 2]));
    }

    #[test]
    fn iteration_limit_keeps_search_bounded() {
        let g = propanol_vs_ethanol();
        let limits = SearchLimits {
            deadline: None,
            max_iterations: Some(0),
        };
        let none = FixedBitSet::new();
        assert!(g.parse(&none, &none, true, false, limits).unwrap().is_empty());
    }

    #[test]
    fn expired_deadline_is_an_error() {
        let g = propanol_vs_ethanol();
        let limits = SearchLimits {
            deadline: Some((Instant::now(), Duration::ZERO)),
            max_iterations: None,
        };
        let none = FixedBitSet::new();
        assert_eq!(
            g.parse(&none, &none, true, false, limits),
            Err(MatchError::Timeout {
                limit: Duration::ZERO
            })
        );
    }

    #[test]
    fn empty_graph_has_the_empty_solution() {
        let g = RGraph::new(Vec::new(), 0, 0);
        let none = FixedBitSet::new();
        let solutions = g
            .parse(&none, &none, false, false, SearchLimits::default())
            .unwrap();
        assert_eq!(solutions.len(), 1);
        assert!(solutions[0].is_clear());
    }
}
