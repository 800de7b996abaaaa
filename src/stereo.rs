//! Validates complete mappings against tetrahedral and double-bond stereo.
//!
//! Stereo elements of both molecules are indexed by atom once, when the
//! filter is built; [`StereoFilter::apply`] then checks each query element
//! against the target element found at the mapped atom(s).

use petgraph::graph::NodeIndex;
use tracing::trace;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::{permutation_parity, AtomId, EZStereo, Mol, TetrahedralStereo};
use crate::traits::HasAtomicNum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StereoKind {
    Unset,
    Tetrahedral,
    Geometric,
}

/// How an unconfigured target stereocenter is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StereoMode {
    /// Every query stereo element needs a configured counterpart.
    Strict,
    /// Unset target configuration matches anything, as query patterns expect.
    Query,
}

/// Per-atom stereo lookup: the kind of element at each atom and its index in
/// the molecule's tetrahedral or double-bond list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StereoIndex {
    kinds: Vec<StereoKind>,
    elements: Vec<usize>,
}

impl StereoIndex {
    pub fn new<A, B>(mol: &Mol<A, B>) -> Self {
        let n = mol.atom_count();
        let mut kinds = vec![StereoKind::Unset; n];
        let mut elements = vec![0; n];
        for (i, stereo) in mol.tetrahedral_stereo().iter().enumerate() {
            let c = stereo.center.index();
            kinds[c] = StereoKind::Tetrahedral;
            elements[c] = i;
        }
        for (i, stereo) in mol.ez_stereo().iter().enumerate() {
            for end in [stereo.bond.0, stereo.bond.1] {
                let e = end.index();
                if kinds[e] == StereoKind::Unset {
                    kinds[e] = StereoKind::Geometric;
                    elements[e] = i;
                }
            }
        }
        Self { kinds, elements }
    }

    pub fn kind(&self, atom: usize) -> StereoKind {
        self.kinds[atom]
    }

    pub fn element(&self, atom: usize) -> Option<usize> {
        (self.kinds[atom] != StereoKind::Unset).then_some(self.elements[atom])
    }
}

pub struct StereoFilter<'a, A, B> {
    query: &'a Mol<A, B>,
    target: &'a Mol<Atom, Bond>,
    query_index: StereoIndex,
    target_index: StereoIndex,
    mode: StereoMode,
}

impl<'a, A, B> StereoFilter<'a, A, B> {
    pub fn new(query: &'a Mol<A, B>, target: &'a Mol<Atom, Bond>, mode: StereoMode) -> Self {
        Self {
            query,
            target,
            query_index: StereoIndex::new(query),
            target_index: StereoIndex::new(target),
            mode,
        }
    }

    pub fn mode(&self) -> StereoMode {
        self.mode
    }

    /// Whether `mapping` preserves every stereo element of the query.
    pub fn apply(&self, mapping: &[usize]) -> bool {
        if self.mode == StereoMode::Strict
            && self.query.stereo_count() > self.target.stereo_count()
        {
            return false;
        }
        for u in 0..mapping.len() {
            let ok = match self.query_index.kind(u) {
                StereoKind::Unset => true,
                StereoKind::Tetrahedral => {
                    let q = &self.query.tetrahedral_stereo()[self.query_index.elements[u]];
                    self.tetrahedral_preserved(q, mapping)
                }
                StereoKind::Geometric => {
                    let q = &self.query.ez_stereo()[self.query_index.elements[u]];
                    self.geometry_preserved(q, u, mapping)
                }
            };
            if !ok {
                trace!(atom = u, "stereo mismatch");
                return false;
            }
        }
        true
    }

    fn is_hydrogen(&self, atom: NodeIndex) -> bool {
        self.target.atom(atom).atomic_num() == 1
    }

    fn tetrahedral_preserved(&self, q: &TetrahedralStereo, mapping: &[usize]) -> bool {
        let center = mapping[q.center.index()];
        let Some(element) = self.target_index.element(center) else {
            return self.mode == StereoMode::Query;
        };
        if self.target_index.kind(center) != StereoKind::Tetrahedral {
            return self.mode == StereoMode::Query;
        }
        let t = &self.target.tetrahedral_stereo()[element];

        let mut mapped = [AtomId::Node(t.center); 4];
        for (slot, ligand) in mapped.iter_mut().zip(q.ligands) {
            *slot = match ligand {
                AtomId::Node(x) if x == q.center => AtomId::Node(t.center),
                AtomId::Node(x) => AtomId::Node(NodeIndex::new(mapping[x.index()])),
                AtomId::VirtualH(..) => AtomId::VirtualH(t.center, 0),
            };
        }

        // an implicit query H takes whatever stands for H at the target center
        for k in 0..4 {
            if !matches!(mapped[k], AtomId::VirtualH(..)) {
                continue;
            }
            let virtual_h = t
                .ligands
                .iter()
                .copied()
                .find(|l| matches!(l, AtomId::VirtualH(..)));
            let explicit_h = || {
                self.target
                    .neighbors(t.center)
                    .filter(|&h| self.is_hydrogen(h))
                    .map(AtomId::Node)
                    .find(|h| !mapped.contains(h))
            };
            match virtual_h.or_else(explicit_h) {
                Some(h) => mapped[k] = h,
                None => return false,
            }
        }

        if !mapped.iter().all(|l| t.ligands.contains(l)) {
            return false;
        }
        let parity = if permutation_parity(&mapped, &t.ligands) {
            1
        } else {
            -1
        };
        q.chirality.sign() * parity == t.chirality.sign()
    }

    fn refs_agree(&self, mapped: AtomId, reference: AtomId) -> bool {
        match (mapped, reference) {
            (a, b) if a == b => true,
            (AtomId::VirtualH(..), AtomId::VirtualH(..)) => true,
            (AtomId::VirtualH(..), AtomId::Node(h)) | (AtomId::Node(h), AtomId::VirtualH(..)) => {
                self.is_hydrogen(h)
            }
            _ => false,
        }
    }

    fn geometry_preserved(&self, q: &EZStereo, u: usize, mapping: &[usize]) -> bool {
        let (qa, qb, qra, qrb) = if q.bond.0.index() == u {
            (q.bond.0, q.bond.1, q.refs[0], q.refs[1])
        } else {
            (q.bond.1, q.bond.0, q.refs[1], q.refs[0])
        };
        let ta = NodeIndex::new(mapping[qa.index()]);
        let tb = NodeIndex::new(mapping[qb.index()]);

        let Some(t) = self.target.ez_stereo_for(ta, tb) else {
            return self.mode == StereoMode::Query;
        };
        let (tra, trb) = if t.bond.0 == ta {
            (t.refs[0], t.refs[1])
        } else {
            (t.refs[1], t.refs[0])
        };

        let image = |r: AtomId, end: NodeIndex| match r {
            AtomId::Node(x) => AtomId::Node(NodeIndex::new(mapping[x.index()])),
            AtomId::VirtualH(_, k) => AtomId::VirtualH(end, k),
        };
        let pa = if self.refs_agree(image(qra, ta), tra) { 1 } else { -1 };
        let pb = if self.refs_agree(image(qrb, tb), trb) { 1 } else { -1 };
        q.geometry.sign() == t.geometry.sign() * pa * pb
    }
}
