//! Lazy, re-iterable result sets of (sub)graph matches.
//!
//! A [`Mappings`] stores how to produce its sequence rather than the sequence
//! itself. Every adaptor wraps that recipe, and every traversal runs the
//! search again from the start, so `count()` followed by `to_array()` searches
//! twice. Nothing is evaluated until a terminal method pulls results.

use std::collections::HashSet;
use std::rc::Rc;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::Mol;
use crate::query::QueryAtom;
use crate::state::UNMAPPED;
use crate::stereo::{StereoFilter, StereoMode};
use crate::substruct::AtomMapping;

/// One traversal of a [`Mappings`].
pub type MappingIter<'a> = Box<dyn Iterator<Item = Vec<usize>> + 'a>;
pub(crate) type Source<'a> = Rc<dyn Fn() -> MappingIter<'a> + 'a>;

/// Query-to-target bond correspondence of one match.
pub type BondMapping = Vec<(EdgeIndex, EdgeIndex)>;

/// Atom and bond correspondence of one match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomBondMapping {
    pub atoms: AtomMapping,
    pub bonds: BondMapping,
}

/// A target atom or bond touched by a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChemObject {
    Atom(NodeIndex),
    Bond(EdgeIndex),
}

/// `(query, target)` index pairs of a mapping, skipping unassigned slots.
pub fn pairs(mapping: &[usize]) -> Vec<(usize, usize)> {
    mapping
        .iter()
        .enumerate()
        .filter(|&(_, &m)| m != UNMAPPED)
        .map(|(n, &m)| (n, m))
        .collect()
}

pub struct Mappings<'a, A, B> {
    query: &'a Mol<A, B>,
    target: &'a Mol<Atom, Bond>,
    source: Source<'a>,
}

impl<A, B> Clone for Mappings<'_, A, B> {
    fn clone(&self) -> Self {
        Self {
            query: self.query,
            target: self.target,
            source: Rc::clone(&self.source),
        }
    }
}

impl<'a, A, B> Mappings<'a, A, B> {
    /// Wraps a restartable producer of raw mappings.
    pub fn new<I, F>(query: &'a Mol<A, B>, target: &'a Mol<Atom, Bond>, source: F) -> Self
    where
        F: Fn() -> I + 'a,
        I: Iterator<Item = Vec<usize>> + 'a,
    {
        Self {
            query,
            target,
            source: Rc::new(move || Box::new(source()) as MappingIter<'a>),
        }
    }

    pub fn empty(query: &'a Mol<A, B>, target: &'a Mol<Atom, Bond>) -> Self {
        Self::new(query, target, std::iter::empty::<Vec<usize>>)
    }

    pub fn query(&self) -> &'a Mol<A, B> {
        self.query
    }

    pub fn target(&self) -> &'a Mol<Atom, Bond> {
        self.target
    }

    fn wrap<F>(self, adapt: F) -> Self
    where
        F: Fn(MappingIter<'a>) -> MappingIter<'a> + 'a,
    {
        let prev = self.source;
        Self {
            query: self.query,
            target: self.target,
            source: Rc::new(move || adapt(prev())),
        }
    }

    /// Keeps the mappings `predicate` accepts.
    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: Fn(&[usize]) -> bool + 'a,
    {
        let predicate = Rc::new(predicate);
        self.wrap(move |it| {
            let predicate = Rc::clone(&predicate);
            Box::new(it.filter(move |m| predicate(m.as_slice())))
        })
    }

    /// Drops mappings that touch the same set of target atoms as an earlier one.
    pub fn unique_atoms(self) -> Self {
        self.wrap(|it| {
            let mut seen = HashSet::new();
            Box::new(it.filter(move |m| {
                let mut key = m.clone();
                key.sort_unstable();
                seen.insert(key)
            }))
        })
    }

    /// Drops mappings that touch the same set of target bonds as an earlier one.
    pub fn unique_bonds(self) -> Self {
        let query_bonds: Rc<Vec<(usize, usize)>> = Rc::new(
            self.query
                .bonds()
                .filter_map(|e| self.query.bond_endpoints(e))
                .map(|(a, b)| (a.index(), b.index()))
                .collect(),
        );
        let target = self.target;
        self.wrap(move |it| {
            let query_bonds = Rc::clone(&query_bonds);
            let mut seen = HashSet::new();
            Box::new(it.filter(move |m| {
                let mut key: Vec<usize> = query_bonds
                    .iter()
                    .filter_map(|&(a, b)| {
                        target.bond_between(NodeIndex::new(m[a]), NodeIndex::new(m[b]))
                    })
                    .map(|e| e.index())
                    .collect();
                key.sort_unstable();
                seen.insert(key)
            }))
        })
    }

    /// At most `n` mappings.
    pub fn limit(self, n: usize) -> Self {
        self.wrap(move |it| Box::new(it.take(n)))
    }

    /// Starts a fresh traversal.
    pub fn iter(&self) -> MappingIter<'a> {
        (self.source)()
    }

    pub fn to_array(&self) -> Vec<Vec<usize>> {
        self.iter().collect()
    }

    /// The first mapping, or an empty vector when there is none.
    pub fn first(&self) -> Vec<usize> {
        self.iter().next().unwrap_or_default()
    }

    /// Whether at least `n` mappings exist; stops after the `n`-th.
    pub fn at_least(&self, n: usize) -> bool {
        self.iter().take(n).count() == n
    }

    pub fn count(&self) -> usize {
        self.iter().count()
    }

    /// Number of mappings with distinct target atom sets.
    pub fn count_unique(&self) -> usize {
        self.clone().unique_atoms().count()
    }

    pub fn to_atom_map(&self) -> impl Iterator<Item = AtomMapping> + use<'a, A, B> {
        self.iter().map(|m| {
            pairs(&m)
                .into_iter()
                .map(|(q, t)| (NodeIndex::new(q), NodeIndex::new(t)))
                .collect()
        })
    }

    pub fn to_bond_map(&self) -> impl Iterator<Item = BondMapping> + use<'a, A, B> {
        let (query, target) = (self.query, self.target);
        self.iter().map(move |m| bond_pairs(query, target, &m))
    }

    pub fn to_atom_bond_map(&self) -> impl Iterator<Item = AtomBondMapping> + use<'a, A, B> {
        let (query, target) = (self.query, self.target);
        self.iter().map(move |m| AtomBondMapping {
            atoms: pairs(&m)
                .into_iter()
                .map(|(q, t)| (NodeIndex::new(q), NodeIndex::new(t)))
                .collect(),
            bonds: bond_pairs(query, target, &m),
        })
    }

    /// The matched part of the target, one fragment per mapping.
    pub fn to_substructures(&self) -> impl Iterator<Item = Mol<Atom, Bond>> + use<'a, A, B> {
        let (query, target) = (self.query, self.target);
        self.iter().map(move |m| {
            let atoms: Vec<NodeIndex> = m.iter().map(|&t| NodeIndex::new(t)).collect();
            let bonds: Vec<EdgeIndex> = bond_pairs(query, target, &m)
                .into_iter()
                .map(|(_, t)| t)
                .collect();
            target.extract(&atoms, &bonds)
        })
    }

    /// Target atoms then target bonds touched by each mapping.
    pub fn to_chem_objects(&self) -> impl Iterator<Item = Vec<ChemObject>> + use<'a, A, B> {
        let (query, target) = (self.query, self.target);
        self.iter().map(move |m| {
            m.iter()
                .map(|&t| ChemObject::Atom(NodeIndex::new(t)))
                .chain(
                    bond_pairs(query, target, &m)
                        .into_iter()
                        .map(|(_, t)| ChemObject::Bond(t)),
                )
                .collect()
        })
    }
}

impl<'a, A: QueryAtom, B> Mappings<'a, A, B> {
    /// Keeps mappings that preserve the query's stereochemistry.
    ///
    /// Query graphs check their stereo while matching, so for them this is a
    /// no-op.
    pub fn stereochemistry(self) -> Self {
        if A::IS_QUERY {
            return self;
        }
        let filter = StereoFilter::new(self.query, self.target, StereoMode::Strict);
        self.filter(move |m| filter.apply(m))
    }
}

fn bond_pairs<A, B>(query: &Mol<A, B>, target: &Mol<Atom, Bond>, mapping: &[usize]) -> BondMapping {
    query
        .bonds()
        .filter_map(|e| {
            let (a, b) = query.bond_endpoints(e)?;
            let (ta, tb) = (mapping[a.index()], mapping[b.index()]);
            if ta == UNMAPPED || tb == UNMAPPED {
                return None;
            }
            let t = target.bond_between(NodeIndex::new(ta), NodeIndex::new(tb))?;
            Some((e, t))
        })
        .collect()
}

impl<'a, A, B> IntoIterator for &Mappings<'a, A, B> {
    type Item = Vec<usize>;
    type IntoIter = MappingIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, A, B> IntoIterator for Mappings<'a, A, B> {
    type Item = Vec<usize>;
    type IntoIter = MappingIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
