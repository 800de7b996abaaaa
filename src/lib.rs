pub mod atom;
pub mod bond;
pub mod component;
pub mod config;
pub mod error;
pub mod graph;
pub mod mappings;
pub mod matcher;
pub mod mol;
pub mod pattern;
pub mod query;
pub mod rgraph;
pub mod state;
pub mod stereo;
pub mod stream;
pub mod substruct;
pub mod traits;
pub mod universal;
pub mod vento;

#[cfg(test)]
mod testing;

pub use atom::{Atom, Chirality};
pub use bond::{Bond, BondOrder};
pub use component::ComponentFilter;
pub use config::{AtomMatching, BondMatching, MatchConfig, ResolutionConfig};
pub use error::MatchError;
pub use graph::Adjacency;
pub use mappings::{AtomBondMapping, BondMapping, ChemObject, Mappings};
pub use matcher::{Compatibility, MolMatcher};
pub use mol::{AtomId, ComponentGrouping, EZStereo, Geometry, Mol, TetrahedralStereo};
pub use pattern::Pattern;
pub use query::{AtomExpr, BondExpr, QueryAtom, QueryBond, QueryMol};
pub use rgraph::{RGraph, RMap};
pub use state::State;
pub use stereo::{StereoFilter, StereoMode};
pub use stream::StateStream;
pub use substruct::{
    get_substruct_match, get_substruct_match_with, get_substruct_matches,
    get_substruct_matches_with, has_substruct_match, has_substruct_match_with, AtomMapping,
};
pub use traits::{
    HasAromaticity, HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount, HasIsotope,
};
pub use universal::{IsomorphismTester, Structure};
pub use vento::{MatchKind, VfState};
