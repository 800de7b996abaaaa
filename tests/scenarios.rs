mod common;

use common::{benzene, build, chain, complete, star};
use crabmatch::{
    Atom, AtomExpr, AtomId, Bond, BondExpr, BondOrder, Chirality, ChemObject, ComponentFilter,
    IsomorphismTester, MatchError, Mol, Pattern, QueryMol, RMap, ResolutionConfig, StereoFilter,
    StereoMode, TetrahedralStereo,
};
use petgraph::graph::{EdgeIndex, NodeIndex};

fn bromochlorofluoroiodomethane(chirality: Option<Chirality>) -> Mol<Atom, Bond> {
    let bonds: Vec<_> = (1..5).map(|i| (0, i, BondOrder::Single)).collect();
    let mut mol = build(&[6, 9, 17, 35, 53], &bonds);
    if let Some(chirality) = chirality {
        mol.add_tetrahedral_stereo(TetrahedralStereo {
            center: NodeIndex::new(0),
            ligands: [1, 2, 3, 4].map(|i| AtomId::Node(NodeIndex::new(i))),
            chirality,
        });
    }
    mol
}

#[test]
fn branch_breaks_identical_match() {
    let path = chain(&[6, 6, 6]);
    let isobutane = star(6, 3);

    assert!(Pattern::substructure(&path).match_all(&isobutane).at_least(1));
    assert_eq!(Pattern::identical(&path).match_all(&isobutane).count(), 0);
}

#[test]
fn first_mapping_does_not_enumerate_everything() {
    // 10! automorphisms
    let k10 = complete(6, 10);
    let pattern = Pattern::identical(&k10);
    let first = pattern.match_all(&k10).first();
    assert_eq!(first.len(), 10);
    assert_eq!(pattern.match_all(&k10).limit(5).count(), 5);
    assert!(pattern.match_all(&k10).at_least(100));
}

#[test]
fn mirrored_center_fails_stereo() {
    let query = bromochlorofluoroiodomethane(Some(Chirality::Cw));
    let same = bromochlorofluoroiodomethane(Some(Chirality::Cw));
    let mirror = bromochlorofluoroiodomethane(Some(Chirality::Ccw));
    let identity = [0, 1, 2, 3, 4];

    assert!(StereoFilter::new(&query, &same, StereoMode::Strict).apply(&identity));
    assert!(!StereoFilter::new(&query, &mirror, StereoMode::Strict).apply(&identity));

    let pattern = Pattern::identical(&query);
    assert_eq!(pattern.match_all(&same).stereochemistry().count(), 1);
    assert_eq!(pattern.match_all(&mirror).stereochemistry().count(), 0);
}

#[test]
fn grouped_fragments_need_separate_components() {
    let mut query = build(&[6, 8, 7], &[(0, 1, BondOrder::Single)]);
    query.set_component_groups(vec![1, 1, 2]);

    // C-O-N: the nitrogen sits in the same molecule as C-O
    let joined = chain(&[6, 8, 7]);
    let joined_filter = ComponentFilter::new(&query, &joined);
    assert!(!joined_filter.apply(&[0, 1, 2]));

    // C-O . N
    let split = build(&[6, 8, 7], &[(0, 1, BondOrder::Single)]);
    assert!(ComponentFilter::new(&query, &split).apply(&[0, 1, 2]));
}

#[test]
fn query_patterns_apply_grouping_automatically() {
    let mut query = QueryMol::new();
    let c = query.add_atom(AtomExpr::element(6));
    let o = query.add_atom(AtomExpr::element(8));
    query.add_atom(AtomExpr::element(7));
    query.add_bond(c, o, BondExpr::True);
    query.set_component_groups(vec![1, 1, 2]);

    let pattern = Pattern::substructure(&query);
    assert!(!pattern.matches(&chain(&[6, 8, 7])));
    assert!(pattern.matches(&build(&[6, 8, 7], &[(0, 1, BondOrder::Single)])));
}

#[test]
fn heuristic_rejection_skips_the_search() {
    let tester = IsomorphismTester::new();
    let target = build(
        &[7, 6, 6, 6, 8],
        &[
            (0, 1, BondOrder::Single),
            (1, 2, BondOrder::Single),
            (2, 3, BondOrder::Single),
            (3, 4, BondOrder::Single),
        ],
    );
    let two_nitrogens = chain(&[7, 6, 7]);
    assert_eq!(tester.is_subgraph(&target, &two_nitrogens), Ok(false));
    assert_eq!(tester.searches(), 0);
}

#[test]
fn common_substructure_keeps_the_larger_candidate() {
    let tester = IsomorphismTester::new();
    let small = chain(&[6, 6]);
    let large = chain(&[6, 6, 8]);
    let kept = tester.get_maximum(vec![small, large.clone()]).unwrap();
    assert_eq!(kept, vec![large]);
}

#[test]
fn overlaps_of_butanol_and_propylamine() {
    let tester = IsomorphismTester::new();
    let butanol = chain(&[6, 6, 6, 6, 8]);
    let propylamine = chain(&[6, 6, 6, 7]);
    let overlaps = tester.get_overlaps(&butanol, &propylamine).unwrap();
    assert_eq!(overlaps.len(), 1);
    assert_eq!(overlaps[0].atom_count(), 3);
    assert_eq!(overlaps[0].bond_count(), 2);
}

#[test]
fn resolution_and_vertex_engines_agree_on_rings() {
    let tester = IsomorphismTester::new();
    let aromatic = benzene();
    assert!(tester.is_isomorph(&aromatic, &aromatic).unwrap());
    assert_eq!(
        tester.get_isomorph_maps(&aromatic, &aromatic).unwrap().len(),
        Pattern::identical(&aromatic).match_all(&aromatic).count()
    );
}

#[test]
fn query_graph_cannot_be_the_target() {
    let tester = IsomorphismTester::new();
    let mut query = QueryMol::new();
    query.add_atom(AtomExpr::True);
    assert_eq!(
        tester.is_isomorph(&query, &chain(&[6])),
        Err(MatchError::QueryAsTarget)
    );
}

#[test]
fn timeout_is_reported() {
    let tester = IsomorphismTester::with_config(
        ResolutionConfig::default().with_timeout(std::time::Duration::ZERO),
    );
    let err = tester
        .get_subgraph_maps(&benzene(), &benzene())
        .unwrap_err();
    assert!(matches!(err, MatchError::Timeout { .. }));
    assert!(err.to_string().contains("timed out"));
}

#[test]
fn atom_map_from_resolution_search() {
    let tester = IsomorphismTester::new();
    let target = chain(&[8, 6, 6, 7]);
    let query = chain(&[6, 7]);
    assert_eq!(
        tester.get_subgraph_atoms_map(&target, &query).unwrap(),
        Some(vec![RMap::new(2, 0), RMap::new(3, 1)])
    );
}

#[test]
fn exports_follow_the_mapping() {
    let query = chain(&[6, 8]);
    let target = chain(&[6, 6, 8]);
    let mappings = Pattern::substructure(&query).match_all(&target);

    assert_eq!(mappings.to_array(), vec![vec![1, 2]]);
    let atom_bond = mappings.to_atom_bond_map().next().unwrap();
    assert_eq!(
        atom_bond.atoms,
        vec![
            (NodeIndex::new(0), NodeIndex::new(1)),
            (NodeIndex::new(1), NodeIndex::new(2))
        ]
    );
    assert_eq!(atom_bond.bonds, vec![(EdgeIndex::new(0), EdgeIndex::new(1))]);

    let objects = mappings.to_chem_objects().next().unwrap();
    assert_eq!(
        objects,
        vec![
            ChemObject::Atom(NodeIndex::new(1)),
            ChemObject::Atom(NodeIndex::new(2)),
            ChemObject::Bond(EdgeIndex::new(1)),
        ]
    );

    let fragment = mappings.to_substructures().next().unwrap();
    assert_eq!(fragment.atom_count(), 2);
    assert_eq!(fragment.bond_count(), 1);
}

#[test]
fn single_atom_overlap_is_an_atom_of_the_first_graph() {
    let tester = IsomorphismTester::new();
    let ethanol = chain(&[6, 6, 8]);
    let overlaps = tester.get_overlaps(&ethanol, &chain(&[6])).unwrap();
    assert_eq!(overlaps.len(), 1);
    assert_eq!(overlaps[0].atom_count(), 1);
    assert_eq!(overlaps[0].bond_count(), 0);
    assert_eq!(overlaps[0].atom(NodeIndex::new(0)).atomic_num, 6);

    let kept = tester
        .get_maximum(vec![chain(&[8]), ethanol.clone()])
        .unwrap();
    assert_eq!(kept, vec![ethanol]);
}

#[test]
fn ignoring_bond_types_keeps_subgraph_answers_consistent() {
    let tester =
        IsomorphismTester::with_config(ResolutionConfig::default().with_match_bonds(false));
    let propane = chain(&[6, 6, 6]);
    let ethene = build(&[6, 6], &[(0, 1, BondOrder::Double)]);
    let found = tester.get_subgraph_map(&propane, &ethene).unwrap();
    assert!(found.is_some());
    assert_eq!(tester.is_subgraph(&propane, &ethene), Ok(true));
}
