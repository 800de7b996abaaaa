//! Vertex-at-a-time (Vento-Foggia) matching state over adjacency lists.
//!
//! Besides the forward and backward maps, the state keeps the "terminal
//! generation" of every vertex: the mapping depth at which it was first mapped
//! or became adjacent to a mapped vertex, `0` if neither. Unmapped vertices
//! with a non-zero generation form the search frontier. They drive the
//! candidate order and a counting lookahead that prunes pairs whose
//! neighbourhoods cannot be extended consistently.

use std::rc::Rc;

use crate::graph::Adjacency;
use crate::matcher::Compatibility;
use crate::state::{State, UNMAPPED};

/// Which correspondence a [`VfState`] enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    /// Every query edge maps onto a target edge; the target may have more.
    Substructure,
    /// Exact isomorphism: vertex counts and edge sets correspond both ways.
    Identical,
}

pub struct VfState<C> {
    g1: Rc<Adjacency>,
    g2: Rc<Adjacency>,
    compat: C,
    kind: MatchKind,
    m1: Vec<usize>,
    m2: Vec<usize>,
    t1: Vec<usize>,
    t2: Vec<usize>,
    order: Vec<usize>,
    size: usize,
}

impl<C: Compatibility> VfState<C> {
    /// `g1` is the query, `g2` the target.
    pub fn new(g1: Rc<Adjacency>, g2: Rc<Adjacency>, compat: C, kind: MatchKind) -> Self {
        let (n, m) = (g1.len(), g2.len());
        Self {
            g1,
            g2,
            compat,
            kind,
            m1: vec![UNMAPPED; n],
            m2: vec![UNMAPPED; m],
            t1: vec![0; n],
            t2: vec![0; m],
            order: Vec::with_capacity(n),
            size: 0,
        }
    }

    fn on_frontier(&self, v: usize) -> bool {
        self.m1[v] == UNMAPPED && self.t1[v] > 0
    }

    /// Counts of unmapped neighbours on the frontier and off it.
    fn lookahead(adj: &Adjacency, map: &[usize], terminal: &[usize], v: usize) -> (usize, usize) {
        let mut term = 0;
        let mut new = 0;
        for &w in adj.neighbors(v) {
            if map[w] != UNMAPPED {
                continue;
            }
            if terminal[w] > 0 {
                term += 1;
            } else {
                new += 1;
            }
        }
        (term, new)
    }

    fn feasible(&self, n: usize, m: usize) -> bool {
        let (deg1, deg2) = (self.g1.degree(n), self.g2.degree(m));
        match self.kind {
            MatchKind::Substructure if deg1 > deg2 => return false,
            MatchKind::Identical if deg1 != deg2 || self.g1.len() != self.g2.len() => return false,
            _ => {}
        }

        if !self.compat.atoms(n, m) {
            return false;
        }

        let mut mapped_neighbors = 0;
        let neighbors = self.g1.neighbors(n);
        for &nb in neighbors {
            let image = self.m1[nb];
            if image == UNMAPPED {
                continue;
            }
            mapped_neighbors += 1;
            let Some(target_bond) = self.g2.bond(m, image) else {
                return false;
            };
            let query_bond = self.g1.bond(n, nb).expect("neighbour lists carry their bonds");
            if !self.compat.bonds(query_bond, target_bond) {
                return false;
            }
        }

        if self.kind == MatchKind::Identical {
            // every mapped neighbour of m must be the image of a neighbour of n
            let target_mapped = self
                .g2
                .neighbors(m)
                .iter()
                .filter(|&&w| self.m2[w] != UNMAPPED)
                .count();
            if target_mapped != mapped_neighbors {
                return false;
            }
        }

        let (term1, new1) = Self::lookahead(&self.g1, &self.m1, &self.t1, n);
        let (term2, new2) = Self::lookahead(&self.g2, &self.m2, &self.t2, m);
        match self.kind {
            MatchKind::Substructure => term1 <= term2 && term1 + new1 <= term2 + new2,
            MatchKind::Identical => term1 == term2 && new1 == new2,
        }
    }

    fn mark(adj: &Adjacency, terminal: &mut [usize], v: usize, depth: usize) {
        if terminal[v] == 0 {
            terminal[v] = depth;
        }
        for &w in adj.neighbors(v) {
            if terminal[w] == 0 {
                terminal[w] = depth;
            }
        }
    }

    fn unmark(adj: &Adjacency, terminal: &mut [usize], v: usize, depth: usize) {
        if terminal[v] == depth {
            terminal[v] = 0;
        }
        for &w in adj.neighbors(v) {
            if terminal[w] == depth {
                terminal[w] = 0;
            }
        }
    }
}

impl<C: Compatibility> State for VfState<C> {
    fn n_max(&self) -> usize {
        self.g1.len()
    }

    fn m_max(&self) -> usize {
        self.g2.len()
    }

    fn next_n(&self, prev: Option<usize>) -> Option<usize> {
        if self.size == self.n_max() {
            return None;
        }
        let after = |v: usize| prev.is_none_or(|p| v > p);

        if let Some(&last) = self.order.last() {
            let mut near = self
                .g1
                .neighbors(last)
                .iter()
                .copied()
                .filter(|&v| self.m1[v] == UNMAPPED)
                .peekable();
            if near.peek().is_some() {
                return near.find(|&v| after(v));
            }
        }

        let mut frontier = (0..self.n_max()).filter(|&v| self.on_frontier(v)).peekable();
        if frontier.peek().is_some() {
            return frontier.find(|&v| after(v));
        }

        (0..self.n_max()).find(|&v| self.m1[v] == UNMAPPED && after(v))
    }

    fn next_m(&self, n: usize, prev: Option<usize>) -> Option<usize> {
        let after = |w: usize| prev.is_none_or(|p| w > p);
        let anchor = self
            .g1
            .neighbors(n)
            .iter()
            .copied()
            .find(|&nb| self.m1[nb] != UNMAPPED);

        match anchor {
            Some(nb) => self
                .g2
                .neighbors(self.m1[nb])
                .iter()
                .copied()
                .find(|&w| after(w) && self.m2[w] == UNMAPPED),
            None => (0..self.m_max()).find(|&w| after(w) && self.m2[w] == UNMAPPED),
        }
    }

    fn add(&mut self, n: usize, m: usize) -> bool {
        if self.m1[n] != UNMAPPED || self.m2[m] != UNMAPPED {
            return false;
        }
        if !self.feasible(n, m) {
            return false;
        }

        self.m1[n] = m;
        self.m2[m] = n;
        self.size += 1;
        self.order.push(n);
        Self::mark(&self.g1, &mut self.t1, n, self.size);
        Self::mark(&self.g2, &mut self.t2, m, self.size);
        true
    }

    fn remove(&mut self, n: usize, m: usize) {
        assert_eq!(self.m1[n], m, "removing a pair that was never added");
        debug_assert_eq!(self.order.last(), Some(&n));

        Self::unmark(&self.g1, &mut self.t1, n, self.size);
        Self::unmark(&self.g2, &mut self.t2, m, self.size);
        self.m1[n] = UNMAPPED;
        self.m2[m] = UNMAPPED;
        self.order.pop();
        self.size -= 1;
    }

    fn mapping(&self) -> Vec<usize> {
        self.m1.clone()
    }

    fn size(&self) -> usize {
        self.size
    }
}
