use petgraph::graph::EdgeIndex;
use petgraph::unionfind::UnionFind;

use crate::mol::Mol;

/// Index-based adjacency view of a molecule, built once per match call.
///
/// Neighbour lists are sorted ascending so candidate generation walks them in
/// a reproducible order, and `bonds[v][k]` is the bond joining `v` to
/// `neighbors[v][k]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjacency {
    neighbors: Vec<Vec<usize>>,
    bonds: Vec<Vec<EdgeIndex>>,
}

impl Adjacency {
    pub fn from_mol<A, B>(mol: &Mol<A, B>) -> Self {
        let n = mol.atom_count();
        let mut rows: Vec<Vec<(usize, EdgeIndex)>> = vec![Vec::new(); n];
        for edge in mol.bonds() {
            let Some((a, b)) = mol.bond_endpoints(edge) else {
                continue;
            };
            rows[a.index()].push((b.index(), edge));
            rows[b.index()].push((a.index(), edge));
        }

        let mut neighbors = Vec::with_capacity(n);
        let mut bonds = Vec::with_capacity(n);
        for mut row in rows {
            row.sort_unstable_by_key(|&(nb, _)| nb);
            let (ns, bs): (Vec<_>, Vec<_>) = row.into_iter().unzip();
            neighbors.push(ns);
            bonds.push(bs);
        }
        Self { neighbors, bonds }
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    pub fn degree(&self, v: usize) -> usize {
        self.neighbors[v].len()
    }

    pub fn neighbors(&self, v: usize) -> &[usize] {
        &self.neighbors[v]
    }

    /// The bond between `u` and `v`, if they are adjacent.
    pub fn bond(&self, u: usize, v: usize) -> Option<EdgeIndex> {
        self.neighbors[u]
            .binary_search(&v)
            .ok()
            .map(|k| self.bonds[u][k])
    }

    pub fn bond_count(&self) -> usize {
        self.neighbors.iter().map(Vec::len).sum::<usize>() / 2
    }
}

/// Adjacency lists of a molecule, vertex `i` being `NodeIndex::new(i)`.
pub fn adjacency_list<A, B>(mol: &Mol<A, B>) -> Vec<Vec<usize>> {
    Adjacency::from_mol(mol).neighbors
}

/// Connected components in the `|V| + 1` layout.
///
/// Entry `i` is the component of vertex `i`, labelled `1..=k` in order of
/// first appearance; the last entry is `k`.
pub fn connected_components(adj: &Adjacency) -> Vec<usize> {
    let n = adj.len();
    let mut sets = UnionFind::<usize>::new(n);
    for u in 0..n {
        for &v in adj.neighbors(u) {
            if u < v {
                sets.union(u, v);
            }
        }
    }

    let mut labels = vec![0usize; n + 1];
    let mut by_root = vec![0usize; n];
    let mut next = 0usize;
    for v in 0..n {
        let root = sets.find_mut(v);
        if by_root[root] == 0 {
            next += 1;
            by_root[root] = next;
        }
        labels[v] = by_root[root];
    }
    labels[n] = next;
    labels
}
