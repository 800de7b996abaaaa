#![allow(dead_code)]

use crabmatch::{Atom, Bond, BondOrder, Mol};

pub fn build(atoms: &[u8], bonds: &[(usize, usize, BondOrder)]) -> Mol<Atom, Bond> {
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

pub fn chain(atoms: &[u8]) -> Mol<Atom, Bond> {
    let bonds: Vec<_> = (1..atoms.len())
        .map(|i| (i - 1, i, BondOrder::Single))
        .collect();
    build(atoms, &bonds)
}

pub fn ring(z: u8, size: usize) -> Mol<Atom, Bond> {
    let bonds: Vec<_> = (0..size)
        .map(|i| (i, (i + 1) % size, BondOrder::Single))
        .collect();
    build(&vec![z; size], &bonds)
}

/// Center atom 0 with `leaves` neighbours.
pub fn star(z: u8, leaves: usize) -> Mol<Atom, Bond> {
    let bonds: Vec<_> = (1..=leaves).map(|i| (0, i, BondOrder::Single)).collect();
    build(&vec![z; leaves + 1], &bonds)
}

/// Every atom bonded to every other.
pub fn complete(z: u8, size: usize) -> Mol<Atom, Bond> {
    let mut bonds = Vec::new();
    for i in 0..size {
        for j in i + 1..size {
            bonds.push((i, j, BondOrder::Single));
        }
    }
    build(&vec![z; size], &bonds)
}

pub fn benzene() -> Mol<Atom, Bond> {
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
