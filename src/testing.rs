//! Small molecule builders for unit tests.

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;
use crate::query::{AtomExpr, BondExpr, QueryMol};

/// Builds a molecule from atomic numbers and `(a, b, order)` bonds.
pub(crate) fn build(atoms: &[u8], bonds: &[(usize, usize, BondOrder)]) -> Mol<Atom, Bond> {
    let mut mol = Mol::new();
    let ids: Vec<_> = atoms
        .iter()
        .map(|&z| mol.add_atom(Atom::element(z)))
        .collect();
    for &(a, b, order) in bonds {
        mol.add_bond(ids[a], ids[b], Bond::new(order));
    }
    mol
}

/// Unbranched chain of single bonds.
pub(crate) fn chain(atoms: &[u8]) -> Mol<Atom, Bond> {
    let bonds: Vec<_> = (1..atoms.len())
        .map(|i| (i - 1, i, BondOrder::Single))
        .collect();
    build(atoms, &bonds)
}

/// Saturated ring of `size` atoms of element `z`.
pub(crate) fn ring(z: u8, size: usize) -> Mol<Atom, Bond> {
    let bonds: Vec<_> = (0..size)
        .map(|i| (i, (i + 1) % size, BondOrder::Single))
        .collect();
    build(&vec![z; size], &bonds)
}

/// Atom 0 bonded to `leaves` further atoms, all of element `z`.
pub(crate) fn star(z: u8, leaves: usize) -> Mol<Atom, Bond> {
    let bonds: Vec<_> = (1..=leaves).map(|i| (0, i, BondOrder::Single)).collect();
    build(&vec![z; leaves + 1], &bonds)
}

/// Benzene with aromatic atoms and alternating aromatic bonds.
pub(crate) fn benzene() -> Mol<Atom, Bond> {
    let mut mol = Mol::new();
    let ids: Vec<_> = (0..6).map(|_| mol.add_atom(Atom::aromatic(6))).collect();
    for i in 0..6 {
        let order = if i % 2 == 0 {
            BondOrder::Double
        } else {
            BondOrder::Single
        };
        mol.add_bond(ids[i], ids[(i + 1) % 6], Bond::aromatic(order));
    }
    mol
}

/// Query graph of element-only atoms joined by `bond`.
pub(crate) fn query_chain(atoms: &[u8], bond: BondExpr) -> QueryMol {
    let mut mol = QueryMol::new();
    let ids: Vec<_> = atoms
        .iter()
        .map(|&z| mol.add_atom(AtomExpr::element(z)))
        .collect();
    for pair in ids.windows(2) {
        mol.add_bond(pair[0], pair[1], bond.clone());
    }
    mol
}
