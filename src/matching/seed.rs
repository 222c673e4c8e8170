use std::collections::HashMap;

use thiserror::Error;

use super::MatchError;
use crate::{AtomId, ChemGraph, Label, LabelTable};

/// Ways a seed can be malformed before any search starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeedError {
    #[error("atom {0:?} is not part of the graph")]
    MissingGraphAtom(AtomId),
    #[error("atom {0:?} is not part of the pattern")]
    MissingPatternAtom(AtomId),
    #[error("graph atom {graph:?} is seeded onto both {first:?} and {second:?}")]
    ConflictingPatternAtoms { graph: AtomId, first: AtomId, second: AtomId },
    #[error("pattern atom {pattern:?} is claimed by both {first:?} and {second:?}")]
    ConflictingGraphAtoms { pattern: AtomId, first: AtomId, second: AtomId },
}

/// A partial mapping from graph atoms to pattern atoms that is fixed
/// before the search begins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Seed {
    pairs: Vec<(AtomId, AtomId)>,
}

impl Seed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchor `graph_atom` onto `pattern_atom`.
    pub fn pair(mut self, graph_atom: AtomId, pattern_atom: AtomId) -> Self {
        self.insert(graph_atom, pattern_atom);
        self
    }

    pub fn insert(&mut self, graph_atom: AtomId, pattern_atom: AtomId) {
        self.pairs.push((graph_atom, pattern_atom));
    }

    /// Pair up the atoms that bear each of `labels` on both sides.
    pub fn from_labels<'a>(
        graph: &LabelTable,
        pattern: &LabelTable,
        labels: impl IntoIterator<Item = &'a Label>,
    ) -> Result<Self, MatchError> {
        let mut seed = Seed::new();
        for label in labels {
            let graph_atom = graph.get(label).ok_or_else(|| MatchError::UnknownLabel(label.clone()))?;
            let pattern_atom = pattern.get(label).ok_or_else(|| MatchError::UnknownLabel(label.clone()))?;
            seed.insert(graph_atom, pattern_atom);
        }
        Ok(seed)
    }

    /// Pair up every label that occurs on both sides, in label order.
    pub fn from_shared_labels(graph: &LabelTable, pattern: &LabelTable) -> Self {
        graph
            .iter()
            .filter_map(|(label, graph_atom)| pattern.get(label).map(|pattern_atom| (graph_atom, pattern_atom)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AtomId, AtomId)> + '_ {
        self.pairs.iter().copied()
    }

    /// Check that every seeded atom exists and the pairs are injective in
    /// both directions. Returns the pairs with exact repeats removed, in
    /// their original order.
    pub(crate) fn validate(&self, graph: &ChemGraph, pattern: &ChemGraph) -> Result<Vec<(AtomId, AtomId)>, SeedError> {
        let mut forward: HashMap<AtomId, AtomId> = HashMap::new();
        let mut backward: HashMap<AtomId, AtomId> = HashMap::new();
        let mut pairs = Vec::with_capacity(self.pairs.len());

        for &(graph_atom, pattern_atom) in &self.pairs {
            if !graph.contains_atom(graph_atom) {
                return Err(SeedError::MissingGraphAtom(graph_atom));
            }
            if !pattern.contains_atom(pattern_atom) {
                return Err(SeedError::MissingPatternAtom(pattern_atom));
            }
            match (forward.get(&graph_atom), backward.get(&pattern_atom)) {
                (Some(&p), _) if p != pattern_atom => {
                    return Err(SeedError::ConflictingPatternAtoms {
                        graph: graph_atom,
                        first: p,
                        second: pattern_atom,
                    });
                }
                (_, Some(&g)) if g != graph_atom => {
                    return Err(SeedError::ConflictingGraphAtoms {
                        pattern: pattern_atom,
                        first: g,
                        second: graph_atom,
                    });
                }
                (Some(_), Some(_)) => continue,
                _ => {}
            }
            forward.insert(graph_atom, pattern_atom);
            backward.insert(pattern_atom, graph_atom);
            pairs.push((graph_atom, pattern_atom));
        }
        Ok(pairs)
    }
}

impl FromIterator<(AtomId, AtomId)> for Seed {
    fn from_iter<T: IntoIterator<Item = (AtomId, AtomId)>>(iter: T) -> Self {
        Seed {
            pairs: iter.into_iter().collect(),
        }
    }
}
