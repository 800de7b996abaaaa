use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;
use crate::traits::{HasAromaticity, HasAtomicNum, HasFormalCharge, HasHydrogenCount, HasIsotope};

/// A molecule whose atoms and bonds are query predicates.
pub type QueryMol = Mol<AtomExpr, BondExpr>;

/// AST node for an atom query expression.
///
/// Each variant represents a primitive test or a logical combination of tests.
/// During matching, [`AtomExpr::matches`] evaluates the expression tree
/// against an atom of a concrete molecule.
#[derive(Debug, Clone, PartialEq)]
pub enum AtomExpr {
    /// Matches any atom (wildcard `*`).
    True,
    /// Matches by element. `aromatic` is `None` for `#n` (either), `Some(true)`
    /// for lowercase (`c`), `Some(false)` for uppercase (`C`).
    Element {
        atomic_num: u8,
        aromatic: Option<bool>,
    },
    /// Matches any aromatic atom (`a`).
    Aromatic,
    /// Matches any aliphatic atom (`A`).
    Aliphatic,
    /// Matches a specific isotope number.
    Isotope(u16),
    /// Matches explicit degree, the number of graph neighbors (`D`).
    Degree(u8),
    /// Matches total valence: sum of bond orders plus implicit H count (`v`).
    Valence(u8),
    /// Matches total connectivity: degree plus implicit H count (`X`).
    Connectivity(u8),
    /// Matches total hydrogen count including explicit H neighbors (`H`).
    TotalHCount(u8),
    /// Matches implicit (virtual) hydrogen count (`h`).
    ImplicitHCount(u8),
    /// Matches formal charge.
    Charge(i8),
    /// Matches the count of non-C, non-H neighbors (`z`).
    HeteroNeighborCount(u8),
    /// Logical AND of sub-expressions.
    And(Vec<AtomExpr>),
    /// Logical OR of sub-expressions.
    Or(Vec<AtomExpr>),
    /// Logical NOT of a sub-expression.
    Not(Box<AtomExpr>),
}

/// AST node for a bond query expression.
#[derive(Debug, Clone, PartialEq)]
pub enum BondExpr {
    /// Matches any bond (`~`).
    True,
    /// Matches a non-aromatic single bond (`-`).
    Single,
    /// Matches a non-aromatic double bond (`=`).
    Double,
    /// Matches a triple bond (`#`).
    Triple,
    /// Matches an aromatic bond (`:`).
    Aromatic,
    /// Default SMARTS bond: matches single or aromatic.
    SingleOrAromatic,
    /// Logical AND of sub-expressions.
    And(Vec<BondExpr>),
    /// Logical OR of sub-expressions.
    Or(Vec<BondExpr>),
    /// Logical NOT of a sub-expression.
    Not(Box<BondExpr>),
}

fn explicit_h_count(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> usize {
    mol.neighbors(idx)
        .filter(|&nb| mol.atom(nb).atomic_num() == 1)
        .count()
}

fn hetero_neighbor_count(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> usize {
    mol.neighbors(idx)
        .filter(|&nb| {
            let a = mol.atom(nb).atomic_num();
            a != 6 && a != 1
        })
        .count()
}

fn bond_order_sum(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> usize {
    mol.bonds_of(idx)
        .map(|ei| match mol.bond(ei).order {
            BondOrder::Single => 1usize,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
        })
        .sum()
}

impl AtomExpr {
    pub fn element(atomic_num: u8) -> Self {
        AtomExpr::Element {
            atomic_num,
            aromatic: None,
        }
    }

    pub fn matches(&self, mol: &Mol<Atom, Bond>, idx: NodeIndex) -> bool {
        let atom = mol.atom(idx);
        let implicit_h = usize::from(atom.hydrogen_count());
        match self {
            AtomExpr::True => true,
            AtomExpr::Element {
                atomic_num,
                aromatic,
            } => {
                atom.atomic_num() == *atomic_num
                    && aromatic.is_none_or(|a| atom.is_aromatic() == a)
            }
            AtomExpr::Aromatic => atom.is_aromatic(),
            AtomExpr::Aliphatic => !atom.is_aromatic(),
            AtomExpr::Isotope(iso) => atom.isotope() == *iso,
            AtomExpr::Degree(d) => mol.neighbors(idx).count() == usize::from(*d),
            AtomExpr::Valence(v) => bond_order_sum(mol, idx) + implicit_h == usize::from(*v),
            AtomExpr::Connectivity(x) => {
                mol.neighbors(idx).count() + implicit_h == usize::from(*x)
            }
            AtomExpr::TotalHCount(h) => implicit_h + explicit_h_count(mol, idx) == usize::from(*h),
            AtomExpr::ImplicitHCount(h) => atom.hydrogen_count() == *h,
            AtomExpr::Charge(c) => atom.formal_charge() == *c,
            AtomExpr::HeteroNeighborCount(n) => hetero_neighbor_count(mol, idx) == usize::from(*n),
            AtomExpr::And(exprs) => exprs.iter().all(|e| e.matches(mol, idx)),
            AtomExpr::Or(exprs) => exprs.iter().any(|e| e.matches(mol, idx)),
            AtomExpr::Not(expr) => !expr.matches(mol, idx),
        }
    }

    /// The element this expression pins down, if any.
    ///
    /// Conjunctions report the first element they contain; every other
    /// composite is treated as a wildcard.
    pub fn atomic_num(&self) -> Option<u8> {
        match self {
            AtomExpr::Element { atomic_num, .. } => Some(*atomic_num),
            AtomExpr::And(exprs) => exprs.iter().find_map(AtomExpr::atomic_num),
            _ => None,
        }
    }
}

impl BondExpr {
    pub fn matches(&self, mol: &Mol<Atom, Bond>, idx: EdgeIndex) -> bool {
        let bond = mol.bond(idx);
        match self {
            BondExpr::True => true,
            BondExpr::Single => bond.order == BondOrder::Single && !bond.is_aromatic,
            BondExpr::Double => bond.order == BondOrder::Double && !bond.is_aromatic,
            BondExpr::Triple => bond.order == BondOrder::Triple,
            BondExpr::Aromatic => bond.is_aromatic,
            BondExpr::SingleOrAromatic => bond.order == BondOrder::Single || bond.is_aromatic,
            BondExpr::And(exprs) => exprs.iter().all(|e| e.matches(mol, idx)),
            BondExpr::Or(exprs) => exprs.iter().any(|e| e.matches(mol, idx)),
            BondExpr::Not(expr) => !expr.matches(mol, idx),
        }
    }

    pub fn order(&self) -> Option<BondOrder> {
        match self {
            BondExpr::Single => Some(BondOrder::Single),
            BondExpr::Double => Some(BondOrder::Double),
            BondExpr::Triple => Some(BondOrder::Triple),
            BondExpr::And(exprs) => exprs.iter().find_map(BondExpr::order),
            _ => None,
        }
    }
}

/// An atom type that can stand on the query side of a match against a
/// concrete `Mol<Atom, Bond>`.
pub trait QueryAtom {
    /// Whether atoms of this type are query predicates rather than concrete atoms.
    const IS_QUERY: bool;

    /// The element required by this atom, `None` for a wildcard.
    fn element(&self) -> Option<u8>;

    /// Full predicate evaluation against a target atom.
    fn matches(&self, target: &Mol<Atom, Bond>, idx: NodeIndex) -> bool;
}

/// Bond counterpart of [`QueryAtom`].
pub trait QueryBond {
    /// The order required by this bond, `None` for a wildcard.
    fn order(&self) -> Option<BondOrder>;

    /// Whether this bond asks for an aromatic target bond.
    fn is_aromatic(&self) -> bool;

    fn matches(&self, target: &Mol<Atom, Bond>, idx: EdgeIndex) -> bool;
}

impl QueryAtom for Atom {
    const IS_QUERY: bool = false;

    fn element(&self) -> Option<u8> {
        Some(self.atomic_num)
    }

    fn matches(&self, target: &Mol<Atom, Bond>, idx: NodeIndex) -> bool {
        let t = target.atom(idx);
        if t.atomic_num() != self.atomic_num {
            return false;
        }
        if self.is_aromatic && !t.is_aromatic() {
            return false;
        }
        true
    }
}

impl QueryBond for Bond {
    fn order(&self) -> Option<BondOrder> {
        Some(self.order)
    }

    fn is_aromatic(&self) -> bool {
        self.is_aromatic
    }

    fn matches(&self, target: &Mol<Atom, Bond>, idx: EdgeIndex) -> bool {
        let t = target.bond(idx);
        if self.is_aromatic && t.is_aromatic {
            return true;
        }
        self.order == t.order && self.is_aromatic == t.is_aromatic
    }
}

impl QueryAtom for AtomExpr {
    const IS_QUERY: bool = true;

    fn element(&self) -> Option<u8> {
        self.atomic_num()
    }

    fn matches(&self, target: &Mol<Atom, Bond>, idx: NodeIndex) -> bool {
        AtomExpr::matches(self, target, idx)
    }
}

impl QueryBond for BondExpr {
    fn order(&self) -> Option<BondOrder> {
        BondExpr::order(self)
    }

    fn is_aromatic(&self) -> bool {
        matches!(self, BondExpr::Aromatic)
    }

    fn matches(&self, target: &Mol<Atom, Bond>, idx: EdgeIndex) -> bool {
        BondExpr::matches(self, target, idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ethanol() -> Mol<Atom, Bond> {
        let mut mol = Mol::new();
        let c1 = mol.add_atom(Atom {
            hydrogen_count: 3,
            ..Atom::element(6)
        });
        let c2 = mol.add_atom(Atom {
            hydrogen_count: 2,
            ..Atom::element(6)
        });
        let o = mol.add_atom(Atom {
            hydrogen_count: 1,
            ..Atom::element(8)
        });
        mol.add_bond(c1, c2, Bond::default());
        mol.add_bond(c2, o, Bond::default());
        mol
    }

    #[test]
    fn element_and_wildcard() {
        let mol = ethanol();
        let o = NodeIndex::new(2);
        assert!(AtomExpr::element(8).matches(&mol, o));
        assert!(!AtomExpr::element(6).matches(&mol, o));
        assert!(AtomExpr::True.matches(&mol, o));
        let aromatic_o = AtomExpr::Element {
            atomic_num: 8,
            aromatic: Some(true),
        };
        assert!(!aromatic_o.matches(&mol, o));
    }

    #[test]
    fn counting_primitives() {
        let mol = ethanol();
        let c2 = NodeIndex::new(1);
        assert!(AtomExpr::Degree(2).matches(&mol, c2));
        assert!(AtomExpr::Valence(4).matches(&mol, c2));
        assert!(AtomExpr::Connectivity(4).matches(&mol, c2));
        assert!(AtomExpr::TotalHCount(2).matches(&mol, c2));
        assert!(AtomExpr::HeteroNeighborCount(1).matches(&mol, c2));
        assert!(!AtomExpr::HeteroNeighborCount(0).matches(&mol, c2));
    }

    #[test]
    fn logical_combinations() {
        let mol = ethanol();
        let c1 = NodeIndex::new(0);
        let carbon_or_nitrogen = AtomExpr::Or(vec![AtomExpr::element(6), AtomExpr::element(7)]);
        assert!(carbon_or_nitrogen.matches(&mol, c1));
        let not_carbon = AtomExpr::Not(Box::new(AtomExpr::element(6)));
        assert!(!not_carbon.matches(&mol, c1));
        let methyl = AtomExpr::And(vec![AtomExpr::element(6), AtomExpr::ImplicitHCount(3)]);
        assert!(methyl.matches(&mol, c1));
        assert_eq!(methyl.atomic_num(), Some(6));
        assert_eq!(carbon_or_nitrogen.atomic_num(), None);
    }

    #[test]
    fn bond_expressions() {
        let mut mol = Mol::<Atom, Bond>::new();
        let a = mol.add_atom(Atom::aromatic(6));
        let b = mol.add_atom(Atom::aromatic(6));
        let c = mol.add_atom(Atom::element(8));
        let ar = mol.add_bond(a, b, Bond::aromatic(BondOrder::Double));
        let db = mol.add_bond(b, c, Bond::new(BondOrder::Double));

        assert!(BondExpr::Aromatic.matches(&mol, ar));
        assert!(!BondExpr::Double.matches(&mol, ar));
        assert!(BondExpr::SingleOrAromatic.matches(&mol, ar));
        assert!(BondExpr::Double.matches(&mol, db));
        assert!(!BondExpr::SingleOrAromatic.matches(&mol, db));
        assert!(BondExpr::True.matches(&mol, db));
    }

    #[test]
    fn concrete_atoms_as_queries() {
        let mol = ethanol();
        let query = Atom::element(6);
        assert!(QueryAtom::matches(&query, &mol, NodeIndex::new(0)));
        assert!(!QueryAtom::matches(&Atom::aromatic(6), &mol, NodeIndex::new(0)));
        let single = Bond::default();
        assert!(QueryBond::matches(&single, &mol, EdgeIndex::new(0)));
        assert!(!QueryBond::matches(
            &Bond::new(BondOrder::Double),
            &mol,
            EdgeIndex::new(0)
        ));
    }

    #[test]
    fn large_counts_do_not_wrap() {
        let mut mol = Mol::<Atom, Bond>::new();
        let center = mol.add_atom(Atom {
            hydrogen_count: 255,
            ..Atom::element(6)
        });
        for _ in 0..300 {
            let h = mol.add_atom(Atom::element(1));
            mol.add_bond(center, h, Bond::default());
        }

        // 300 wraps to 44 in a u8; 555 wraps to 43
        assert!(!AtomExpr::Degree(44).matches(&mol, center));
        assert!(!AtomExpr::Connectivity(43).matches(&mol, center));
        assert!(!AtomExpr::Valence(43).matches(&mol, center));
        assert!(!AtomExpr::TotalHCount(43).matches(&mol, center));
        assert!(AtomExpr::ImplicitHCount(255).matches(&mol, center));
    }
}
