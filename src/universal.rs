//! Bond-based isomorphism, substructure and common-substructure search over
//! the resolution graph.
//!
//! Every function takes the searched molecule first (`g1`) and the structure
//! looked for second (`g2`). The second argument may be a query graph; the
//! first may not. Results pair bond indices (`id1` in `g1`, `id2` in `g2`)
//! unless the function name says atoms.

use std::cell::Cell;
use std::time::Instant;

use fixedbitset::FixedBitSet;
use petgraph::graph::{EdgeIndex, NodeIndex};
use tracing::debug;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::config::ResolutionConfig;
use crate::error::MatchError;
use crate::mol::Mol;
use crate::query::QueryMol;
use crate::rgraph::{RGraph, RMap, SearchLimits};
use crate::traits::{HasAromaticity, HasAtomicNum, HasBondOrder};

/// One side of a resolution-graph search.
#[derive(Debug, Clone, Copy)]
pub enum Structure<'a> {
    Molecule(&'a Mol<Atom, Bond>),
    Query(&'a QueryMol),
}

impl<'a> From<&'a Mol<Atom, Bond>> for Structure<'a> {
    fn from(mol: &'a Mol<Atom, Bond>) -> Self {
        Structure::Molecule(mol)
    }
}

impl<'a> From<&'a QueryMol> for Structure<'a> {
    fn from(query: &'a QueryMol) -> Self {
        Structure::Query(query)
    }
}

impl<'a> Structure<'a> {
    pub fn is_query(&self) -> bool {
        matches!(self, Structure::Query(_))
    }

    pub fn atom_count(&self) -> usize {
        match self {
            Structure::Molecule(m) => m.atom_count(),
            Structure::Query(q) => q.atom_count(),
        }
    }

    pub fn bond_count(&self) -> usize {
        match self {
            Structure::Molecule(m) => m.bond_count(),
            Structure::Query(q) => q.bond_count(),
        }
    }

    fn molecule(self) -> Result<&'a Mol<Atom, Bond>, MatchError> {
        match self {
            Structure::Molecule(m) => Ok(m),
            Structure::Query(_) => Err(MatchError::QueryAsTarget),
        }
    }

    fn endpoints(&self, bond: usize) -> (NodeIndex, NodeIndex) {
        let idx = EdgeIndex::new(bond);
        let ends = match self {
            Structure::Molecule(m) => m.bond_endpoints(idx),
            Structure::Query(q) => q.bond_endpoints(idx),
        };
        ends.expect("bond index within graph")
    }

    /// Element of an atom; `None` for query atoms that do not pin one.
    fn element(&self, atom: NodeIndex) -> Option<u8> {
        match self {
            Structure::Molecule(m) => Some(m.atom(atom).atomic_num()),
            Structure::Query(q) => q.atom(atom).atomic_num(),
        }
    }

    /// Whether atom `atom` of this structure accepts atom `other` of `mol`.
    /// Plain molecules compare elements.
    fn accepts(&self, atom: NodeIndex, mol: &Mol<Atom, Bond>, other: NodeIndex) -> bool {
        match self {
            Structure::Molecule(m) => m.atom(atom).atomic_num() == mol.atom(other).atomic_num(),
            Structure::Query(q) => q.atom(atom).matches(mol, other),
        }
    }
}

fn all_bonds(s: Structure<'_>) -> FixedBitSet {
    let mut bs = FixedBitSet::with_capacity(s.bond_count());
    bs.insert_range(..);
    bs
}

/// Whether every atom of `g2` can go to its own atom of `g1`.
fn atoms_assignable(g1: &Mol<Atom, Bond>, g2: Structure<'_>) -> bool {
    fn assign(g1: &Mol<Atom, Bond>, g2: Structure<'_>, next: usize, used: &mut [bool]) -> bool {
        if next == g2.atom_count() {
            return true;
        }
        let atom = NodeIndex::new(next);
        for n in g1.atoms() {
            if used[n.index()] || !g2.accepts(atom, g1, n) {
                continue;
            }
            used[n.index()] = true;
            if assign(g1, g2, next + 1, used) {
                return true;
            }
            used[n.index()] = false;
        }
        false
    }
    let mut used = vec![false; g1.atom_count()];
    assign(g1, g2, 0, &mut used)
}

/// The atom two bonds share, taken from `b`'s ends.
fn common_atom(a: (NodeIndex, NodeIndex), b: (NodeIndex, NodeIndex)) -> Option<NodeIndex> {
    let has = |x: NodeIndex| a.0 == x || a.1 == x;
    if has(b.0) {
        Some(b.0)
    } else if has(b.1) {
        Some(b.1)
    } else {
        None
    }
}

fn other_end(bond: (NodeIndex, NodeIndex), atom: NodeIndex) -> NodeIndex {
    if bond.0 == atom { bond.1 } else { bond.0 }
}

/// Per-type counts used to reject impossible subgraph queries early.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Census {
    single: usize,
    double: usize,
    triple: usize,
    aromatic: usize,
    elements: [usize; 8],
}

/// S, O, N, F, Cl, Br, I, C
const CENSUS_ELEMENTS: [u8; 8] = [16, 8, 7, 9, 17, 35, 53, 6];

impl Census {
    fn of(s: Structure<'_>) -> Self {
        let mut census = Census::default();
        // query atoms and bonds carry no concrete type
        let Structure::Molecule(mol) = s else {
            return census;
        };
        for e in mol.bonds() {
            let bond = mol.bond(e);
            if HasAromaticity::is_aromatic(bond) {
                census.aromatic += 1;
                continue;
            }
            match bond.bond_order() {
                BondOrder::Single => census.single += 1,
                BondOrder::Double => census.double += 1,
                BondOrder::Triple => census.triple += 1,
            }
        }
        for n in mol.atoms() {
            let z = mol.atom(n).atomic_num();
            if let Some(slot) = CENSUS_ELEMENTS.iter().position(|&e| e == z) {
                census.elements[slot] += 1;
            }
        }
        census
    }

    fn bonds(&self) -> usize {
        self.single + self.double + self.triple + self.aromatic
    }

    /// With `by_type` unset only the total bond count is compared.
    fn covers(&self, other: &Census, by_type: bool) -> bool {
        let bonds_ok = if by_type {
            self.single >= other.single
                && self.double >= other.double
                && self.triple >= other.triple
                && self.aromatic >= other.aromatic
        } else {
            self.bonds() >= other.bonds()
        };
        bonds_ok
            && self
                .elements
                .iter()
                .zip(&other.elements)
                .all(|(mine, theirs)| mine >= theirs)
    }
}

/// Resolution-graph searcher carrying its configuration.
///
/// ```
/// use crabmatch::{Atom, Bond, IsomorphismTester, Mol};
///
/// let mut ethanol = Mol::<Atom, Bond>::new();
/// let c1 = ethanol.add_atom(Atom::element(6));
/// let c2 = ethanol.add_atom(Atom::element(6));
/// let o = ethanol.add_atom(Atom::element(8));
/// ethanol.add_bond(c1, c2, Bond::default());
/// ethanol.add_bond(c2, o, Bond::default());
///
/// let mut co = Mol::<Atom, Bond>::new();
/// let c = co.add_atom(Atom::element(6));
/// let o = co.add_atom(Atom::element(8));
/// co.add_bond(c, o, Bond::default());
///
/// let tester = IsomorphismTester::new();
/// assert!(tester.is_subgraph(&ethanol, &co).unwrap());
/// assert!(!tester.is_isomorph(&ethanol, &co).unwrap());
/// ```
#[derive(Debug, Default)]
pub struct IsomorphismTester {
    config: ResolutionConfig,
    searches: Cell<usize>,
}

impl IsomorphismTester {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ResolutionConfig) -> Self {
        Self {
            config,
            searches: Cell::new(0),
        }
    }

    pub fn config(&self) -> &ResolutionConfig {
        &self.config
    }

    /// Resolution graphs built so far by this tester.
    pub fn searches(&self) -> usize {
        self.searches.get()
    }

    pub fn is_isomorph<'a, 'b>(
        &self,
        g1: impl Into<Structure<'a>>,
        g2: impl Into<Structure<'b>>,
    ) -> Result<bool, MatchError> {
        let (g1, g2) = (g1.into(), g2.into());
        let m1 = g1.molecule()?;
        if g1.atom_count() != g2.atom_count() || g1.bond_count() != g2.bond_count() {
            return Ok(false);
        }
        if g2.bond_count() == 0 {
            return Ok(atoms_assignable(m1, g2));
        }
        Ok(self.get_isomorph_map(g1, g2)?.is_some())
    }

    /// One bond mapping covering every bond of both graphs.
    pub fn get_isomorph_map<'a, 'b>(
        &self,
        g1: impl Into<Structure<'a>>,
        g2: impl Into<Structure<'b>>,
    ) -> Result<Option<Vec<RMap>>, MatchError> {
        let (g1, g2) = (g1.into(), g2.into());
        g1.molecule()?;
        let maps = self.search(g1, g2, &all_bonds(g1), &all_bonds(g2), false, false)?;
        Ok(maps.into_iter().next())
    }

    pub fn get_isomorph_maps<'a, 'b>(
        &self,
        g1: impl Into<Structure<'a>>,
        g2: impl Into<Structure<'b>>,
    ) -> Result<Vec<Vec<RMap>>, MatchError> {
        let (g1, g2) = (g1.into(), g2.into());
        self.search(g1, g2, &all_bonds(g1), &all_bonds(g2), true, true)
    }

    pub fn get_isomorph_atoms_map<'a, 'b>(
        &self,
        g1: impl Into<Structure<'a>>,
        g2: impl Into<Structure<'b>>,
    ) -> Result<Option<Vec<RMap>>, MatchError> {
        let (g1, g2) = (g1.into(), g2.into());
        let m1 = g1.molecule()?;
        match self.single_atom_matches(g1, g2) {
            Some(list) if list.is_empty() => Ok(None),
            Some(list) => Ok(Some(list)),
            None => Ok(self
                .get_isomorph_map(g1, g2)?
                .map(|bonds| self.atoms_map_of_bonds_map(&bonds, m1, g2))),
        }
    }

    pub fn is_subgraph<'a, 'b>(
        &self,
        g1: impl Into<Structure<'a>>,
        g2: impl Into<Structure<'b>>,
    ) -> Result<bool, MatchError> {
        let (g1, g2) = (g1.into(), g2.into());
        let m1 = g1.molecule()?;
        if g2.atom_count() > g1.atom_count() {
            return Ok(false);
        }
        if g2.atom_count() == 1 {
            let atom = NodeIndex::new(0);
            return Ok(m1.atoms().any(|n| g2.accepts(atom, m1, n)));
        }
        if g2.bond_count() == 0 {
            return Ok(atoms_assignable(m1, g2));
        }
        if !self.test_subgraph_heuristics(g1, g2)? {
            debug!("subgraph rejected by type counts");
            return Ok(false);
        }
        Ok(self.get_subgraph_map(g1, g2)?.is_some())
    }

    /// One bond mapping covering every bond of `g2`.
    pub fn get_subgraph_map<'a, 'b>(
        &self,
        g1: impl Into<Structure<'a>>,
        g2: impl Into<Structure<'b>>,
    ) -> Result<Option<Vec<RMap>>, MatchError> {
        let (g1, g2) = (g1.into(), g2.into());
        let maps = self.search(g1, g2, &FixedBitSet::new(), &all_bonds(g2), false, false)?;
        Ok(maps.into_iter().next())
    }

    pub fn get_subgraph_maps<'a, 'b>(
        &self,
        g1: impl Into<Structure<'a>>,
        g2: impl Into<Structure<'b>>,
    ) -> Result<Vec<Vec<RMap>>, MatchError> {
        let (g1, g2) = (g1.into(), g2.into());
        self.search(g1, g2, &FixedBitSet::new(), &all_bonds(g2), true, true)
    }

    pub fn get_subgraph_atoms_map<'a, 'b>(
        &self,
        g1: impl Into<Structure<'a>>,
        g2: impl Into<Structure<'b>>,
    ) -> Result<Option<Vec<RMap>>, MatchError> {
        let (g1, g2) = (g1.into(), g2.into());
        let m1 = g1.molecule()?;
        match self.single_atom_matches(g1, g2) {
            Some(list) if list.is_empty() => Ok(None),
            Some(list) => Ok(Some(list)),
            None => Ok(self
                .get_subgraph_map(g1, g2)?
                .map(|bonds| self.atoms_map_of_bonds_map(&bonds, m1, g2))),
        }
    }

    pub fn get_subgraph_atoms_maps<'a, 'b>(
        &self,
        g1: impl Into<Structure<'a>>,
        g2: impl Into<Structure<'b>>,
    ) -> Result<Vec<Vec<RMap>>, MatchError> {
        let (g1, g2) = (g1.into(), g2.into());
        let m1 = g1.molecule()?;
        match self.single_atom_matches(g1, g2) {
            Some(list) => Ok(vec![list]),
            None => Ok(self
                .get_subgraph_maps(g1, g2)?
                .iter()
                .map(|bonds| self.atoms_map_of_bonds_map(bonds, m1, g2))
                .collect()),
        }
    }

    /// Maximal common substructures of two molecules, as fragments of `g1`.
    ///
    /// When either side is a single atom the fragments are single atoms of
    /// `g1`.
    pub fn get_overlaps<'a, 'b>(
        &self,
        g1: impl Into<Structure<'a>>,
        g2: impl Into<Structure<'b>>,
    ) -> Result<Vec<Mol<Atom, Bond>>, MatchError> {
        let (g1, g2) = (g1.into(), g2.into());
        let m1 = g1.molecule()?;
        if let Some(pairs) = self.single_atom_matches(g1, g2) {
            let fragments = pairs
                .iter()
                .map(|r| m1.extract(&[NodeIndex::new(r.id1)], &[]))
                .collect();
            return self.get_maximum(fragments);
        }
        let none = FixedBitSet::new();
        let maps = self.search(g1, g2, &none, &none, true, false)?;
        let fragments = maps
            .iter()
            .map(|bonds| {
                let ids: Vec<EdgeIndex> = bonds.iter().map(|r| EdgeIndex::new(r.id1)).collect();
                m1.extract(&[], &ids)
            })
            .collect();
        self.get_maximum(fragments)
    }

    /// Drops every graph that is a subgraph of another one in the list.
    pub fn get_maximum(
        &self,
        graphs: Vec<Mol<Atom, Bond>>,
    ) -> Result<Vec<Mol<Atom, Bond>>, MatchError> {
        let mut keep = vec![true; graphs.len()];
        for i in 0..graphs.len() {
            for j in i + 1..graphs.len() {
                if self.is_subgraph(&graphs[j], &graphs[i])? {
                    keep[i] = false;
                } else if self.is_subgraph(&graphs[i], &graphs[j])? {
                    keep[j] = false;
                }
            }
        }
        Ok(graphs
            .into_iter()
            .zip(keep)
            .filter_map(|(g, k)| k.then_some(g))
            .collect())
    }

    /// Runs the resolution graph of `g1` and `g2`.
    ///
    /// `c1` and `c2` list bonds each solution has to cover. A `g2` with a
    /// single atom is answered directly from atom compatibility, with
    /// `id2 = 0` atom pairs.
    pub fn search<'a, 'b>(
        &self,
        g1: impl Into<Structure<'a>>,
        g2: impl Into<Structure<'b>>,
        c1: &FixedBitSet,
        c2: &FixedBitSet,
        find_all_structure: bool,
        find_all_map: bool,
    ) -> Result<Vec<Vec<RMap>>, MatchError> {
        let (g1, g2) = (g1.into(), g2.into());
        let m1 = g1.molecule()?;
        let limits = SearchLimits {
            deadline: self.config.timeout().map(|limit| (Instant::now(), limit)),
            max_iterations: self.config.max_iterations,
        };

        if g2.atom_count() == 1 {
            let atom = NodeIndex::new(0);
            return Ok(m1
                .atoms()
                .filter(|&n| g2.accepts(atom, m1, n))
                .map(|n| vec![RMap::new(n.index(), 0)])
                .collect());
        }

        self.searches.set(self.searches.get() + 1);
        let rgraph = self.build_rgraph(m1, g2, &limits)?;
        debug!(
            nodes = rgraph.len(),
            g1_bonds = m1.bond_count(),
            g2_bonds = g2.bond_count(),
            "resolution graph built"
        );
        let solutions = rgraph.parse(c1, c2, find_all_structure, find_all_map, limits)?;
        Ok(solutions
            .iter()
            .map(|set| rgraph.bitset_to_rmaps(set))
            .collect())
    }

    /// Atom pairs when either graph is a single atom, `None` otherwise.
    pub fn single_atom_matches<'a, 'b>(
        &self,
        g1: impl Into<Structure<'a>>,
        g2: impl Into<Structure<'b>>,
    ) -> Option<Vec<RMap>> {
        let (g1, g2) = (g1.into(), g2.into());
        let m1 = g1.molecule().ok()?;
        if g2.atom_count() == 1 {
            let atom = NodeIndex::new(0);
            Some(
                m1.atoms()
                    .filter(|&n| g2.accepts(atom, m1, n))
                    .map(|n| RMap::new(n.index(), 0))
                    .collect(),
            )
        } else if m1.atom_count() == 1 {
            let atom = NodeIndex::new(0);
            Some(
                (0..g2.atom_count())
                    .map(NodeIndex::new)
                    .filter(|&n| g2.accepts(n, m1, atom))
                    .map(|n| RMap::new(0, n.index()))
                    .collect(),
            )
        } else {
            None
        }
    }

    /// Converts a bond mapping into the atom mapping it implies, sorted by
    /// `id1`.
    ///
    /// A bond is oriented by a mapped neighbouring bond: the atom the two
    /// bonds share in `g1` goes to the atom they share in `g2`. An isolated
    /// bond is oriented by atom compatibility.
    pub fn atoms_map_of_bonds_map<'b>(
        &self,
        bonds: &[RMap],
        g1: &Mol<Atom, Bond>,
        g2: impl Into<Structure<'b>>,
    ) -> Vec<RMap> {
        let g2 = g2.into();
        let g1s = Structure::Molecule(g1);
        let mut atoms: Vec<RMap> = Vec::new();
        for pair in bonds {
            let (a1, b1) = g1s.endpoints(pair.id1);
            let (a2, b2) = g2.endpoints(pair.id2);

            let oriented = bonds
                .iter()
                .filter(|other| other.id1 != pair.id1)
                .find_map(|other| {
                    let shared1 = common_atom((a1, b1), g1s.endpoints(other.id1))?;
                    let shared2 = common_atom((a2, b2), g2.endpoints(other.id2))?;
                    Some((shared1 == a1) == (shared2 == a2))
                });
            let straight = oriented
                .unwrap_or_else(|| g2.accepts(a2, g1, a1) && g2.accepts(b2, g1, b1));

            let ends = if straight {
                [(a1, a2), (b1, b2)]
            } else {
                [(a1, b2), (b1, a2)]
            };
            for (x, y) in ends {
                let rmap = RMap::new(x.index(), y.index());
                if !atoms.contains(&rmap) {
                    atoms.push(rmap);
                }
            }
        }
        atoms.sort();
        atoms
    }

    /// Cheap necessary condition for `g2` being a subgraph of `g1`: per bond
    /// type and per common element, `g1` has at least as many as `g2`.
    pub fn test_subgraph_heuristics<'a, 'b>(
        &self,
        g1: impl Into<Structure<'a>>,
        g2: impl Into<Structure<'b>>,
    ) -> Result<bool, MatchError> {
        let g1 = g1.into();
        g1.molecule()?;
        Ok(Census::of(g1).covers(&Census::of(g2.into()), self.config.match_bonds))
    }

    fn build_rgraph(
        &self,
        g1: &Mol<Atom, Bond>,
        g2: Structure<'_>,
        limits: &SearchLimits,
    ) -> Result<RGraph, MatchError> {
        let g1s = Structure::Molecule(g1);

        let mut rmaps = Vec::new();
        for i in 0..g1.bond_count() {
            for j in 0..g2.bond_count() {
                limits.check()?;
                if self.bonds_compatible(g1, i, g2, j) {
                    rmaps.push(RMap::new(i, j));
                }
            }
        }

        let mut rgraph = RGraph::new(rmaps, g1.bond_count(), g2.bond_count());
        let n = rgraph.len();
        for i in 0..n {
            for j in i + 1..n {
                limits.check()?;
                let x = rgraph.nodes()[i].rmap();
                let y = rgraph.nodes()[j].rmap();
                let (a1, b1) = (g1s.endpoints(x.id1), g1s.endpoints(y.id1));
                let (a2, b2) = (g2.endpoints(x.id2), g2.endpoints(y.id2));

                let consistent = x.id1 != y.id1
                    && x.id2 != y.id2
                    && match g2 {
                        Structure::Query(_) => query_adjacency(g1, a1, b1, g2, a2, b2),
                        Structure::Molecule(_) => {
                            common_atom(a1, b1).map(|c| g1s.element(c))
                                == common_atom(a2, b2).map(|c| g2.element(c))
                        }
                    };
                if !consistent {
                    rgraph.forbid(i, j);
                } else if common_atom(a1, b1).is_some() {
                    rgraph.extend(i, j);
                }
            }
        }
        Ok(rgraph)
    }

    fn bonds_compatible(&self, g1: &Mol<Atom, Bond>, i: usize, g2: Structure<'_>, j: usize) -> bool {
        let e1 = EdgeIndex::new(i);
        let (a1, b1) = Structure::Molecule(g1).endpoints(i);
        let (a2, b2) = g2.endpoints(j);
        match g2 {
            Structure::Query(q) => {
                q.bond(EdgeIndex::new(j)).matches(g1, e1)
                    && ((g2.accepts(a2, g1, a1) && g2.accepts(b2, g1, b1))
                        || (g2.accepts(a2, g1, b1) && g2.accepts(b2, g1, a1)))
            }
            Structure::Molecule(m2) => {
                let (x, y) = (g1.bond(e1), m2.bond(EdgeIndex::new(j)));
                let bonds_ok = !self.config.match_bonds
                    || (x.order == y.order && x.is_aromatic == y.is_aromatic)
                    || (x.is_aromatic && y.is_aromatic);
                let z = |m: &Mol<Atom, Bond>, n: NodeIndex| m.atom(n).atomic_num();
                let atoms_ok = (z(g1, a1) == z(m2, a2) && z(g1, b1) == z(m2, b2))
                    || (z(g1, a1) == z(m2, b2) && z(g1, b1) == z(m2, a2));
                bonds_ok && atoms_ok
            }
        }
    }
}

/// Adjacency check between two molecule bonds and two query bonds: they must
/// either both be disjoint, or share an atom the query accepts with the outer
/// atoms accepted in some order.
fn query_adjacency(
    g1: &Mol<Atom, Bond>,
    bond1: (NodeIndex, NodeIndex),
    bond2: (NodeIndex, NodeIndex),
    g2: Structure<'_>,
    qbond1: (NodeIndex, NodeIndex),
    qbond2: (NodeIndex, NodeIndex),
) -> bool {
    match (common_atom(bond1, bond2), common_atom(qbond1, qbond2)) {
        (None, None) => true,
        (Some(center), Some(qcenter)) if g2.accepts(qcenter, g1, center) => {
            let (q1, q2) = (other_end(qbond1, qcenter), other_end(qbond2, qcenter));
            let (t1, t2) = (other_end(bond1, center), other_end(bond2, center));
            (g2.accepts(q1, g1, t1) && g2.accepts(q2, g1, t2))
                || (g2.accepts(q1, g1, t2) && g2.accepts(q2, g1, t1))
        }
        _ => false,
    }
}
