use crate::graph::{connected_components, Adjacency};
use crate::mol::{ComponentGrouping, Mol};

/// Checks that grouped query atoms land in matching target components.
///
/// Atoms sharing a non-zero group must map into one connected component of
/// the target, and different groups must map into different components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentFilter {
    query_groups: Vec<usize>,
    target_components: Vec<usize>,
}

impl ComponentFilter {
    pub fn new<A, B, C, D>(query: &Mol<A, B>, target: &Mol<C, D>) -> Self {
        let query_groups = match query.component_groups() {
            Some(groups) => groups.as_slice().to_vec(),
            None => vec![0; query.atom_count() + 1],
        };
        Self::from_parts(query_groups, &Adjacency::from_mol(target))
    }

    /// `query_groups` in the `|V| + 1` layout of [`ComponentGrouping`].
    pub fn from_parts(query_groups: Vec<usize>, target: &Adjacency) -> Self {
        Self {
            query_groups,
            target_components: connected_components(target),
        }
    }

    pub fn from_grouping(grouping: &ComponentGrouping, target: &Adjacency) -> Self {
        Self::from_parts(grouping.as_slice().to_vec(), target)
    }

    pub fn apply(&self, mapping: &[usize]) -> bool {
        let max_group = self.query_groups[self.query_groups.len() - 1];
        if max_group == 0 {
            return true;
        }
        let max_component = self.target_components[self.target_components.len() - 1];

        // group -> component it landed in, and back
        let mut used_by = vec![0usize; max_group + 1];
        let mut used_in = vec![0usize; max_component + 1];

        for (u, &v) in mapping.iter().enumerate() {
            let group = self.query_groups[u];
            if group == 0 {
                continue;
            }
            let component = self.target_components[v];
            if used_by[group] == 0 && used_in[component] == 0 {
                used_by[group] = component;
                used_in[component] = group;
            } else if used_by[group] != component || used_in[component] != group {
                return false;
            }
        }
        true
    }
}
