use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::atom::Chirality;

/// A ligand of a stereo element: either an atom of the graph or the k-th
/// implicit hydrogen carried by an atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomId {
    Node(NodeIndex),
    VirtualH(NodeIndex, u8),
}

/// A tetrahedral stereocenter.
///
/// Looking from `ligands[0]`, the remaining ligands run in the direction given
/// by `chirality`. A three-coordinate center with a lone pair lists the center
/// itself in place of the missing ligand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TetrahedralStereo {
    pub center: NodeIndex,
    pub ligands: [AtomId; 4],
    pub chirality: Chirality,
}

/// Relative placement of the two reference substituents of a double bond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Geometry {
    /// Cis / Z: the references are on the same side.
    Together,
    /// Trans / E: the references are on opposite sides.
    Opposite,
}

impl Geometry {
    pub fn sign(self) -> i8 {
        match self {
            Geometry::Together => 1,
            Geometry::Opposite => -1,
        }
    }
}

/// Double-bond (cis/trans) stereo. `refs[0]` hangs off `bond.0` and
/// `refs[1]` off `bond.1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EZStereo {
    pub bond: (NodeIndex, NodeIndex),
    pub refs: [AtomId; 2],
    pub geometry: Geometry,
}

/// Component-grouping constraint attached to a query.
///
/// Stored in the `|V| + 1` layout: entry `i` is the group of atom `i` (`0`
/// leaves the atom unconstrained) and the final entry holds the largest group
/// id in use.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentGrouping(Vec<usize>);

impl ComponentGrouping {
    /// Builds the grouping from one group id per atom.
    pub fn new(mut groups: Vec<usize>) -> Self {
        let max = groups.iter().copied().max().unwrap_or(0);
        groups.push(max);
        Self(groups)
    }

    pub fn group(&self, atom: usize) -> usize {
        self.0[atom]
    }

    pub fn max_group(&self) -> usize {
        self.0[self.0.len() - 1]
    }

    pub fn atom_count(&self) -> usize {
        self.0.len() - 1
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

pub struct Mol<A, B> {
    graph: UnGraph<A, B>,
    tetrahedral_stereo: Vec<TetrahedralStereo>,
    ez_stereo: Vec<EZStereo>,
    component_groups: Option<ComponentGrouping>,
}

impl<A, B> Mol<A, B> {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::default(),
            tetrahedral_stereo: Vec::new(),
            ez_stereo: Vec::new(),
            component_groups: None,
        }
    }

    pub fn graph(&self) -> &UnGraph<A, B> {
        &self.graph
    }

    pub fn atom(&self, idx: NodeIndex) -> &A {
        &self.graph[idx]
    }

    pub fn atom_mut(&mut self, idx: NodeIndex) -> &mut A {
        &mut self.graph[idx]
    }

    pub fn bond(&self, idx: EdgeIndex) -> &B {
        &self.graph[idx]
    }

    pub fn bond_mut(&mut self, idx: EdgeIndex) -> &mut B {
        &mut self.graph[idx]
    }

    pub fn add_atom(&mut self, atom: A) -> NodeIndex {
        self.graph.add_node(atom)
    }

    pub fn add_bond(&mut self, a: NodeIndex, b: NodeIndex, bond: B) -> EdgeIndex {
        self.graph.add_edge(a, b, bond)
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(idx)
    }

    pub fn bonds_of(&self, idx: NodeIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edges(idx).map(|e| e.id())
    }

    pub fn atoms(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn bonds(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edge_indices()
    }

    pub fn bond_between(&self, a: NodeIndex, b: NodeIndex) -> Option<EdgeIndex> {
        self.graph.find_edge(a, b)
    }

    /// Endpoints of a bond, in the order they were given to [`Mol::add_bond`].
    pub fn bond_endpoints(&self, idx: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(idx)
    }

    pub fn tetrahedral_stereo(&self) -> &[TetrahedralStereo] {
        &self.tetrahedral_stereo
    }

    pub fn set_tetrahedral_stereo(&mut self, stereo: Vec<TetrahedralStereo>) {
        self.tetrahedral_stereo = stereo;
    }

    pub fn add_tetrahedral_stereo(&mut self, stereo: TetrahedralStereo) {
        self.tetrahedral_stereo.push(stereo);
    }

    pub fn ez_stereo(&self) -> &[EZStereo] {
        &self.ez_stereo
    }

    /// Finds the double-bond stereo on `a`-`b` regardless of the stored direction.
    pub fn ez_stereo_for(&self, a: NodeIndex, b: NodeIndex) -> Option<&EZStereo> {
        self.ez_stereo
            .iter()
            .find(|s| s.bond == (a, b) || s.bond == (b, a))
    }

    pub fn add_ez_stereo(&mut self, stereo: EZStereo) {
        self.ez_stereo.push(stereo);
    }

    pub fn remove_ez_stereo(&mut self, a: NodeIndex, b: NodeIndex) {
        self.ez_stereo
            .retain(|s| s.bond != (a, b) && s.bond != (b, a));
    }

    /// Number of stereo elements (tetrahedral plus double bond).
    pub fn stereo_count(&self) -> usize {
        self.tetrahedral_stereo.len() + self.ez_stereo.len()
    }

    pub fn component_groups(&self) -> Option<&ComponentGrouping> {
        self.component_groups.as_ref()
    }

    /// Attaches a grouping, one group id per atom.
    ///
    /// # Panics
    ///
    /// Panics if `groups` does not have one entry per atom.
    pub fn set_component_groups(&mut self, groups: Vec<usize>) {
        assert_eq!(
            groups.len(),
            self.atom_count(),
            "component grouping needs one entry per atom"
        );
        self.component_groups = Some(ComponentGrouping::new(groups));
    }
}

impl<A: Clone, B: Clone> Mol<A, B> {
    /// Copies the given atoms and bonds into a new molecule.
    ///
    /// Atoms are renumbered in the order given; endpoints of `bonds` that are
    /// missing from `atoms` are added after them. Stereo elements whose atoms
    /// all survive are carried over.
    pub fn extract(&self, atoms: &[NodeIndex], bonds: &[EdgeIndex]) -> Mol<A, B> {
        let mut fragment = Mol::new();
        let mut remap: Vec<Option<NodeIndex>> = vec![None; self.atom_count()];

        let mut place = |fragment: &mut Mol<A, B>, idx: NodeIndex| -> NodeIndex {
            *remap[idx.index()].get_or_insert_with(|| fragment.add_atom(self.atom(idx).clone()))
        };

        for &idx in atoms {
            place(&mut fragment, idx);
        }
        for &bond in bonds {
            let Some((a, b)) = self.bond_endpoints(bond) else {
                continue;
            };
            let a = place(&mut fragment, a);
            let b = place(&mut fragment, b);
            fragment.add_bond(a, b, self.bond(bond).clone());
        }

        let map_id = |id: AtomId| -> Option<AtomId> {
            match id {
                AtomId::Node(n) => remap[n.index()].map(AtomId::Node),
                AtomId::VirtualH(n, k) => remap[n.index()].map(|n| AtomId::VirtualH(n, k)),
            }
        };

        for stereo in &self.tetrahedral_stereo {
            let Some(center) = remap[stereo.center.index()] else {
                continue;
            };
            let ligands = stereo.ligands.map(map_id);
            if ligands.iter().all(Option::is_some) {
                fragment.add_tetrahedral_stereo(TetrahedralStereo {
                    center,
                    ligands: ligands.map(|l| l.expect("checked above")),
                    chirality: stereo.chirality,
                });
            }
        }
        for stereo in &self.ez_stereo {
            let (Some(a), Some(b)) = (remap[stereo.bond.0.index()], remap[stereo.bond.1.index()])
            else {
                continue;
            };
            if let [Some(ra), Some(rb)] = stereo.refs.map(map_id) {
                fragment.add_ez_stereo(EZStereo {
                    bond: (a, b),
                    refs: [ra, rb],
                    geometry: stereo.geometry,
                });
            }
        }

        fragment
    }
}

impl<A: Clone, B: Clone> Clone for Mol<A, B> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
            tetrahedral_stereo: self.tetrahedral_stereo.clone(),
            ez_stereo: self.ez_stereo.clone(),
            component_groups: self.component_groups.clone(),
        }
    }
}

impl<A, B> Default for Mol<A, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: PartialEq, B: PartialEq> PartialEq for Mol<A, B> {
    fn eq(&self, other: &Self) -> bool {
        if self.atom_count() != other.atom_count() || self.bond_count() != other.bond_count() {
            return false;
        }
        for idx in self.atoms() {
            if self.atom(idx) != other.atom(idx) {
                return false;
            }
        }
        for idx in self.bonds() {
            if self.bond(idx) != other.bond(idx) {
                return false;
            }
            if self.bond_endpoints(idx) != other.bond_endpoints(idx) {
                return false;
            }
        }
        self.tetrahedral_stereo == other.tetrahedral_stereo
            && self.ez_stereo == other.ez_stereo
            && self.component_groups == other.component_groups
    }
}

impl<A: std::fmt::Debug, B: std::fmt::Debug> std::fmt::Debug for Mol<A, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mol")
            .field("atom_count", &self.atom_count())
            .field("bond_count", &self.bond_count())
            .field("tetrahedral_stereo", &self.tetrahedral_stereo)
            .field("ez_stereo", &self.ez_stereo)
            .field("component_groups", &self.component_groups)
            .finish()
    }
}

/// Parity of the permutation taking `from` to `to`, counted as pairwise
/// inversions. `true` when even.
///
/// Elements of `from` that do not occur in `to` are ignored.
pub(crate) fn permutation_parity<T: Eq>(from: &[T], to: &[T]) -> bool {
    let positions: Vec<usize> = from
        .iter()
        .filter_map(|f| to.iter().position(|t| t == f))
        .collect();
    let mut inversions = 0usize;
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            if positions[i] > positions[j] {
                inversions += 1;
            }
        }
    }
    inversions.is_multiple_of(2)
}
