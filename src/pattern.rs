use std::rc::Rc;

use tracing::debug;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::component::ComponentFilter;
use crate::config::MatchConfig;
use crate::graph::Adjacency;
use crate::mappings::Mappings;
use crate::matcher::MolMatcher;
use crate::mol::Mol;
use crate::query::{QueryAtom, QueryBond};
use crate::stereo::{StereoFilter, StereoMode};
use crate::stream::StateStream;
use crate::vento::{MatchKind, VfState};

/// A query prepared for repeated matching against many targets.
///
/// The query's adjacency is built once here; each target gets its own
/// adjacency per [`Pattern::match_all`] call.
///
/// ```
/// use crabmatch::{Atom, Bond, Mol, Pattern};
///
/// let mut ethane = Mol::<Atom, Bond>::new();
/// let a = ethane.add_atom(Atom::element(6));
/// let b = ethane.add_atom(Atom::element(6));
/// ethane.add_bond(a, b, Bond::default());
///
/// let pattern = Pattern::substructure(&ethane);
/// assert_eq!(pattern.match_all(&ethane).count(), 2);
/// assert_eq!(pattern.match_all(&ethane).unique_atoms().count(), 1);
/// ```
pub struct Pattern<'q, A, B> {
    query: &'q Mol<A, B>,
    adjacency: Rc<Adjacency>,
    kind: MatchKind,
    config: MatchConfig,
}

impl<A, B> Clone for Pattern<'_, A, B> {
    fn clone(&self) -> Self {
        Self {
            query: self.query,
            adjacency: Rc::clone(&self.adjacency),
            kind: self.kind,
            config: self.config,
        }
    }
}

impl<'q, A: QueryAtom, B: QueryBond> Pattern<'q, A, B> {
    fn new(query: &'q Mol<A, B>, kind: MatchKind) -> Self {
        let config = if A::IS_QUERY {
            MatchConfig::expressions()
        } else {
            MatchConfig::default()
        };
        Self {
            query,
            adjacency: Rc::new(Adjacency::from_mol(query)),
            kind,
            config,
        }
    }

    /// Finds the query inside larger targets.
    pub fn substructure(query: &'q Mol<A, B>) -> Self {
        Self::new(query, MatchKind::Substructure)
    }

    /// Finds exact isomorphisms between the query and a target.
    pub fn identical(query: &'q Mol<A, B>) -> Self {
        Self::new(query, MatchKind::Identical)
    }

    pub fn with_config(mut self, config: MatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn query(&self) -> &'q Mol<A, B> {
        self.query
    }

    pub fn kind(&self) -> MatchKind {
        self.kind
    }

    pub fn config(&self) -> MatchConfig {
        self.config
    }

    /// Every mapping of the query onto `target`, evaluated lazily.
    ///
    /// For query graphs the result already honours the query's stereo
    /// elements (unset target stereo matches) and its component grouping.
    pub fn match_all<'a>(&self, target: &'a Mol<Atom, Bond>) -> Mappings<'a, A, B>
    where
        'q: 'a,
    {
        let query = self.query;
        debug!(
            query_atoms = query.atom_count(),
            target_atoms = target.atom_count(),
            kind = ?self.kind,
            "matching pattern"
        );
        if self.kind == MatchKind::Identical && query.atom_count() != target.atom_count() {
            return Mappings::empty(query, target);
        }

        let query_adj = Rc::clone(&self.adjacency);
        let target_adj = Rc::new(Adjacency::from_mol(target));
        let (kind, config) = (self.kind, self.config);
        let groups_adj = Rc::clone(&target_adj);

        let mut mappings = Mappings::new(query, target, move || {
            StateStream::new(VfState::new(
                Rc::clone(&query_adj),
                Rc::clone(&target_adj),
                MolMatcher::new(query, target, config),
                kind,
            ))
        });

        if A::IS_QUERY {
            if query.stereo_count() > 0 {
                let stereo = StereoFilter::new(query, target, StereoMode::Query);
                mappings = mappings.filter(move |m| stereo.apply(m));
            }
            if let Some(grouping) = query.component_groups() {
                let components = ComponentFilter::from_grouping(grouping, &groups_adj);
                mappings = mappings.filter(move |m| components.apply(m));
            }
        }
        mappings
    }

    /// The first mapping, empty when there is none.
    pub fn find_first(&self, target: &Mol<Atom, Bond>) -> Vec<usize> {
        self.match_all(target).first()
    }

    pub fn matches(&self, target: &Mol<Atom, Bond>) -> bool {
        self.match_all(target).at_least(1)
    }
}
