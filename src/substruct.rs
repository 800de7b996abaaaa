use std::rc::Rc;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::Atom;
use crate::bond::Bond;
use crate::graph::Adjacency;
use crate::mappings::pairs;
use crate::mol::Mol;
use crate::pattern::Pattern;
use crate::query::{QueryAtom, QueryBond};
use crate::stream::StateStream;
use crate::vento::{MatchKind, VfState};

pub type AtomMapping = Vec<(NodeIndex, NodeIndex)>;

fn to_atom_mapping(mapping: &[usize]) -> AtomMapping {
    pairs(mapping)
        .into_iter()
        .map(|(q, t)| (NodeIndex::new(q), NodeIndex::new(t)))
        .collect()
}

pub fn has_substruct_match<A, B>(target: &Mol<Atom, Bond>, query: &Mol<A, B>) -> bool
where
    A: QueryAtom,
    B: QueryBond,
{
    Pattern::substructure(query).matches(target)
}

pub fn get_substruct_match<A, B>(target: &Mol<Atom, Bond>, query: &Mol<A, B>) -> Option<AtomMapping>
where
    A: QueryAtom,
    B: QueryBond,
{
    Pattern::substructure(query)
        .match_all(target)
        .iter()
        .next()
        .map(|m| to_atom_mapping(&m))
}

pub fn get_substruct_matches<A, B>(target: &Mol<Atom, Bond>, query: &Mol<A, B>) -> Vec<AtomMapping>
where
    A: QueryAtom,
    B: QueryBond,
{
    Pattern::substructure(query).match_all(target).to_atom_map().collect()
}

pub fn has_substruct_match_with<A1, B1, A2, B2>(
    target: &Mol<A1, B1>,
    query: &Mol<A2, B2>,
    atom_match: impl Fn(&A1, &A2) -> bool,
    bond_match: impl Fn(&B1, &B2) -> bool,
) -> bool {
    get_substruct_match_with(target, query, atom_match, bond_match).is_some()
}

pub fn get_substruct_match_with<A1, B1, A2, B2>(
    target: &Mol<A1, B1>,
    query: &Mol<A2, B2>,
    atom_match: impl Fn(&A1, &A2) -> bool,
    bond_match: impl Fn(&B1, &B2) -> bool,
) -> Option<AtomMapping> {
    stream_with(target, query, atom_match, bond_match)
        .next()
        .map(|m| to_atom_mapping(&m))
}

pub fn get_substruct_matches_with<A1, B1, A2, B2>(
    target: &Mol<A1, B1>,
    query: &Mol<A2, B2>,
    atom_match: impl Fn(&A1, &A2) -> bool,
    bond_match: impl Fn(&B1, &B2) -> bool,
) -> Vec<AtomMapping> {
    stream_with(target, query, atom_match, bond_match)
        .map(|m| to_atom_mapping(&m))
        .collect()
}

/// Substructure search over arbitrary atom and bond types, the predicates
/// being called as `(target, query)`.
fn stream_with<'a, A1, B1, A2, B2>(
    target: &'a Mol<A1, B1>,
    query: &'a Mol<A2, B2>,
    atom_match: impl Fn(&A1, &A2) -> bool + 'a,
    bond_match: impl Fn(&B1, &B2) -> bool + 'a,
) -> impl Iterator<Item = Vec<usize>> + 'a {
    let compat = (
        move |n: usize, m: usize| {
            atom_match(target.atom(NodeIndex::new(m)), query.atom(NodeIndex::new(n)))
        },
        move |qe: EdgeIndex, te: EdgeIndex| bond_match(target.bond(te), query.bond(qe)),
    );
    StateStream::new(VfState::new(
        Rc::new(Adjacency::from_mol(query)),
        Rc::new(Adjacency::from_mol(target)),
        compat,
        MatchKind::Substructure,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bond::BondOrder;
    use crate::testing::{benzene, build, chain, ring};
    use crate::traits::HasAtomicNum;

    fn cyclohexane() -> Mol<Atom, Bond> {
        ring(6, 6)
    }

    fn naphthalene() -> Mol<Atom, Bond> {
        let mut mol = Mol::new();
        let ids: Vec<_> = (0..10).map(|_| mol.add_atom(Atom::aromatic(6))).collect();
        let edges = [
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 4),
            (4, 5),
            (5, 0),
            (4, 6),
            (6, 7),
            (7, 8),
            (8, 9),
            (9, 3),
        ];
        for (a, b) in edges {
            mol.add_bond(ids[a], ids[b], Bond::aromatic(BondOrder::Single));
        }
        mol
    }

    #[test]
    fn ethanol_contains_cc() {
        let target = chain(&[6, 6, 8]);
        let query = chain(&[6, 6]);
        assert!(has_substruct_match(&target, &query));
        let m = get_substruct_match(&target, &query).unwrap();
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn methane_does_not_contain_cc() {
        let target = chain(&[6]);
        let query = chain(&[6, 6]);
        assert!(!has_substruct_match(&target, &query));
        assert_eq!(get_substruct_match(&target, &query), None);
        assert!(get_substruct_matches(&target, &query).is_empty());
    }

    #[test]
    fn propane_cc_matches() {
        let matches = get_substruct_matches(&chain(&[6, 6, 6]), &chain(&[6, 6]));
        assert_eq!(matches.len(), 4);
    }

    #[test]
    fn cyclohexane_cc_single_bond_matches() {
        let matches = get_substruct_matches(&cyclohexane(), &chain(&[6, 6]));
        assert_eq!(matches.len(), 12);
    }

    #[test]
    fn benzene_automorphisms() {
        let matches = get_substruct_matches(&benzene(), &benzene());
        assert_eq!(matches.len(), 12);
    }

    #[test]
    fn empty_query_matches_anything() {
        let target = chain(&[6, 6, 8]);
        let query = Mol::<Atom, Bond>::new();
        assert!(has_substruct_match(&target, &query));
        let m = get_substruct_match(&target, &query).unwrap();
        assert!(m.is_empty());
        let all = get_substruct_matches(&target, &query);
        assert_eq!(all.len(), 1);
        assert!(all[0].is_empty());
    }

    #[test]
    fn single_atom_query() {
        let target = chain(&[6, 6, 8]);
        let query = chain(&[8]);
        let matches = get_substruct_matches(&target, &query);
        assert_eq!(matches.len(), 1);
        let (q, t) = matches[0][0];
        assert_eq!(q, NodeIndex::new(0));
        assert_eq!(target.atom(t).atomic_num(), 8);
    }

    #[test]
    fn query_larger_than_target_no_match() {
        assert!(!has_substruct_match(&chain(&[6]), &ring(6, 6)));
    }

    #[test]
    fn self_match() {
        let target = chain(&[6, 6, 8]);
        assert!(has_substruct_match(&target, &target));
        let m = get_substruct_match(&target, &target).unwrap();
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn bond_orders() {
        let single = chain(&[6, 6]);
        let double = build(&[6, 6], &[(0, 1, BondOrder::Double)]);
        let triple = build(&[6, 7], &[(0, 1, BondOrder::Triple)]);
        assert!(has_substruct_match(&double, &double));
        assert!(!has_substruct_match(&single, &double));
        assert!(!has_substruct_match(&double, &single));
        assert!(has_substruct_match(&triple, &triple));
        assert!(!has_substruct_match(&chain(&[6, 7]), &triple));
    }

    #[test]
    fn aromatic_query_does_not_match_non_aromatic() {
        assert!(!has_substruct_match(&cyclohexane(), &benzene()));
    }

    #[test]
    fn aromatic_ring_in_naphthalene() {
        let target = naphthalene();
        let query = benzene();
        assert!(has_substruct_match(&target, &query));
        // two rings, twelve automorphisms each
        assert_eq!(get_substruct_matches(&target, &query).len(), 24);
    }

    #[test]
    fn phenol_oh_on_aromatic_ring() {
        let mut target = benzene();
        let o = target.add_atom(Atom::element(8));
        target.add_bond(NodeIndex::new(3), o, Bond::default());
        let query = chain(&[8, 6]);
        let matches = get_substruct_matches_with(
            &target,
            &query,
            |t: &Atom, q: &Atom| t.atomic_num == q.atomic_num,
            |t: &Bond, _q: &Bond| t.order == BondOrder::Single && !t.is_aromatic,
        );
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn custom_matchers_ignore_bond_order() {
        let target = build(&[6, 6], &[(0, 1, BondOrder::Double)]);
        let query = chain(&[6, 6]);
        let matches = get_substruct_matches_with(
            &target,
            &query,
            |t: &Atom, q: &Atom| t.atomic_num == q.atomic_num,
            |_t: &Bond, _q: &Bond| true,
        );
        assert_eq!(matches.len(), 2);
        assert!(has_substruct_match_with(
            &target,
            &query,
            |_: &Atom, _: &Atom| true,
            |_: &Bond, _: &Bond| true
        ));
    }

    #[test]
    fn disconnected_target() {
        let mut target = build(&[11, 17], &[]);
        target.atom_mut(NodeIndex::new(0)).formal_charge = 1;
        target.atom_mut(NodeIndex::new(1)).formal_charge = -1;
        let query = build(&[11], &[]);
        let matches = get_substruct_matches_with(
            &target,
            &query,
            |t: &Atom, q: &Atom| t.atomic_num == q.atomic_num,
            |_t: &Bond, _q: &Bond| true,
        );
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn empty_target_no_match_nonempty_query() {
        let target = Mol::<Atom, Bond>::new();
        assert!(!has_substruct_match(&target, &chain(&[6])));
    }

    #[test]
    fn both_empty() {
        let target = Mol::<Atom, Bond>::new();
        let query = Mol::<Atom, Bond>::new();
        assert!(has_substruct_match(&target, &query));
    }

    #[test]
    fn mapping_correctness() {
        let target = chain(&[6, 6, 8]);
        let query = chain(&[6, 8]);
        let m = get_substruct_match(&target, &query).unwrap();
        assert_eq!(m.len(), 2);
        for &(q, t) in &m {
            assert_eq!(query.atom(q).atomic_num(), target.atom(t).atomic_num());
        }
    }

    #[test]
    fn all_mappings_are_valid() {
        let target = benzene();
        let query = benzene();
        for mapping in get_substruct_matches(&target, &query) {
            assert_eq!(mapping.len(), query.atom_count());
            for &(q, t) in &mapping {
                for q_neighbor in query.neighbors(q) {
                    let t_mapped = mapping
                        .iter()
                        .find(|&&(qn, _)| qn == q_neighbor)
                        .map(|&(_, tn)| tn)
                        .unwrap();
                    assert!(
                        target.bond_between(t, t_mapped).is_some(),
                        "mapped neighbors must be connected in target"
                    );
                }
            }
        }
    }

    #[test]
    fn no_duplicate_mappings() {
        let matches = get_substruct_matches(&benzene(), &benzene());
        for (i, a) in matches.iter().enumerate() {
            for b in matches.iter().skip(i + 1) {
                assert_ne!(a, b, "duplicate mapping found");
            }
        }
    }
}
