//! Tunables for the two matching engines.
//!
//! Both structs deserialize with every field optional, so a host application
//! can keep them in a JSON or TOML file and only spell out what it changes:
//!
//! ```
//! use crabmatch::{AtomMatching, BondMatching, MatchConfig};
//!
//! let cfg = MatchConfig::default().with_bond_matching(BondMatching::Order);
//! assert_eq!(cfg.atom_matching, AtomMatching::Element);
//! ```

use std::time::Duration;

use serde::Deserialize;

/// How query atoms are compared with target atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtomMatching {
    /// Same element; an aromatic query atom also needs an aromatic target atom.
    #[default]
    Element,
    /// Evaluate the query atom as a predicate over the target atom.
    Expression,
}

/// How query bonds are compared with target bonds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BondMatching {
    /// Bond orders must be equal, aromaticity is ignored.
    Order,
    /// Aromatic bonds match each other regardless of their Kekulé order;
    /// otherwise order and aromaticity must agree.
    #[default]
    Aromatic,
    /// Evaluate the query bond as a predicate over the target bond.
    Expression,
}

/// Matcher selection for the vertex-matching engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub atom_matching: AtomMatching,
    pub bond_matching: BondMatching,
}

impl MatchConfig {
    /// Expression matching for both atoms and bonds, the natural choice for query graphs.
    pub fn expressions() -> Self {
        Self {
            atom_matching: AtomMatching::Expression,
            bond_matching: BondMatching::Expression,
        }
    }

    pub fn with_atom_matching(mut self, atom_matching: AtomMatching) -> Self {
        self.atom_matching = atom_matching;
        self
    }

    pub fn with_bond_matching(mut self, bond_matching: BondMatching) -> Self {
        self.bond_matching = bond_matching;
        self
    }
}

/// Settings for the resolution-graph engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// When false, bond order and aromaticity are ignored while pairing bonds.
    pub match_bonds: bool,
    /// Wall-clock budget for one search, in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Upper bound on recursion steps; the search keeps what it found so far.
    pub max_iterations: Option<usize>,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            match_bonds: true,
            timeout_ms: None,
            max_iterations: None,
        }
    }
}

impl ResolutionConfig {
    pub fn with_match_bonds(mut self, match_bonds: bool) -> Self {
        self.match_bonds = match_bonds;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}
