use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::Atom;
use crate::bond::Bond;
use crate::config::{AtomMatching, BondMatching, MatchConfig};
use crate::mol::Mol;
use crate::query::{QueryAtom, QueryBond};
use crate::traits::{HasAromaticity, HasAtomicNum, HasBondOrder};

/// Atom and bond predicates consulted by a matching state.
///
/// `n` is a query vertex and `m` a target vertex; bonds are passed by their
/// edge index in the respective graph.
pub trait Compatibility {
    fn atoms(&self, n: usize, m: usize) -> bool;
    fn bonds(&self, query_bond: EdgeIndex, target_bond: EdgeIndex) -> bool;
}

impl<FA, FB> Compatibility for (FA, FB)
where
    FA: Fn(usize, usize) -> bool,
    FB: Fn(EdgeIndex, EdgeIndex) -> bool,
{
    fn atoms(&self, n: usize, m: usize) -> bool {
        (self.0)(n, m)
    }

    fn bonds(&self, query_bond: EdgeIndex, target_bond: EdgeIndex) -> bool {
        (self.1)(query_bond, target_bond)
    }
}

/// Compares a query molecule against a concrete target with the strategies
/// selected in a [`MatchConfig`].
pub struct MolMatcher<'a, A, B> {
    query: &'a Mol<A, B>,
    target: &'a Mol<Atom, Bond>,
    config: MatchConfig,
}

impl<A, B> Clone for MolMatcher<'_, A, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A, B> Copy for MolMatcher<'_, A, B> {}

impl<'a, A, B> MolMatcher<'a, A, B> {
    pub fn new(query: &'a Mol<A, B>, target: &'a Mol<Atom, Bond>, config: MatchConfig) -> Self {
        Self {
            query,
            target,
            config,
        }
    }

    pub fn config(&self) -> MatchConfig {
        self.config
    }
}

impl<A: QueryAtom, B: QueryBond> Compatibility for MolMatcher<'_, A, B> {
    fn atoms(&self, n: usize, m: usize) -> bool {
        let q = self.query.atom(NodeIndex::new(n));
        let idx = NodeIndex::new(m);
        match self.config.atom_matching {
            AtomMatching::Element if A::IS_QUERY => q
                .element()
                .is_none_or(|z| z == self.target.atom(idx).atomic_num()),
            AtomMatching::Element | AtomMatching::Expression => q.matches(self.target, idx),
        }
    }

    fn bonds(&self, query_bond: EdgeIndex, target_bond: EdgeIndex) -> bool {
        let q = self.query.bond(query_bond);
        let t = self.target.bond(target_bond);
        match self.config.bond_matching {
            BondMatching::Order => q.order().is_none_or(|o| o == t.bond_order()),
            BondMatching::Aromatic => {
                let target_aromatic = HasAromaticity::is_aromatic(t);
                if q.is_aromatic() {
                    target_aromatic
                } else {
                    !target_aromatic && q.order().is_none_or(|o| o == t.bond_order())
                }
            }
            BondMatching::Expression => q.matches(self.target, target_bond),
        }
    }
}
