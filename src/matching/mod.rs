//! Graph isomorphism and subgraph isomorphism between chemical graphs.
//!
//! The search is a VF2-style backtracking over a stack of (graph, pattern)
//! atom pairs. Its order is fully deterministic: the next pattern atom is
//! the lowest-identity unmapped atom bordering the mapped region (or the
//! lowest unmapped atom if none borders it), and candidate graph atoms are
//! tried in ascending identity. Enumeration reports every embedding; two
//! embeddings related by a symmetry of the graph are both reported.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::*;

use crate::{AtomId, ChemGraph, Label};

mod search;
mod seed;
mod state;

use search::{MatchMode, Search};
pub use seed::*;

/// A complete match, from graph atom to pattern atom.
pub type Mapping = BTreeMap<AtomId, AtomId>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("invalid seed: {0}")]
    InvalidSeed(#[from] SeedError),
    #[error("label {0} does not appear on both sides")]
    UnknownLabel(Label),
    #[error("search truncated after {steps} steps")]
    SearchTruncated { steps: u64 },
}

/// Limits applied to a single search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    /// The most candidate extensions to try before giving up. `None` searches
    /// until the answer is known.
    pub max_steps: Option<u64>,
}

/// A configured match of a pattern against a graph.
///
/// ```ignore
/// let mappings = Matcher::new(&molecule, &pattern)
///     .seed(seed)
///     .budget(10_000)
///     .find_subgraph_isomorphisms()?;
/// ```
#[derive(Debug, Clone)]
pub struct Matcher<'a> {
    graph: &'a ChemGraph,
    pattern: &'a ChemGraph,
    seed: Seed,
    options: MatchOptions,
}

impl<'a> Matcher<'a> {
    pub fn new(graph: &'a ChemGraph, pattern: &'a ChemGraph) -> Self {
        Matcher {
            graph,
            pattern,
            seed: Seed::new(),
            options: MatchOptions::default(),
        }
    }

    pub fn seed(mut self, seed: Seed) -> Self {
        self.seed = seed;
        self
    }

    /// Stop with [`MatchError::SearchTruncated`] after `max_steps` candidate
    /// extensions.
    pub fn budget(mut self, max_steps: u64) -> Self {
        self.options.max_steps = Some(max_steps);
        self
    }

    pub fn options(mut self, options: MatchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn is_isomorphic(&self) -> Result<bool, MatchError> {
        Ok(!self.run(MatchMode::Isomorphism, false)?.is_empty())
    }

    pub fn find_isomorphisms(&self) -> Result<Vec<Mapping>, MatchError> {
        self.run(MatchMode::Isomorphism, true)
    }

    pub fn is_subgraph_isomorphic(&self) -> Result<bool, MatchError> {
        Ok(!self.run(MatchMode::Subgraph, false)?.is_empty())
    }

    pub fn find_subgraph_isomorphisms(&self) -> Result<Vec<Mapping>, MatchError> {
        self.run(MatchMode::Subgraph, true)
    }

    fn run(&self, mode: MatchMode, find_all: bool) -> Result<Vec<Mapping>, MatchError> {
        let pairs = self.seed.validate(self.graph, self.pattern)?;

        let sizes_fit = match mode {
            MatchMode::Isomorphism => {
                self.graph.atom_count() == self.pattern.atom_count()
                    && self.graph.bond_count() == self.pattern.bond_count()
            }
            MatchMode::Subgraph => {
                self.graph.atom_count() >= self.pattern.atom_count()
                    && self.graph.bond_count() >= self.pattern.bond_count()
            }
        };
        if !sizes_fit {
            trace!(
                "{:?} ruled out by size: {} atoms / {} bonds against {} atoms / {} bonds",
                mode,
                self.pattern.atom_count(),
                self.pattern.bond_count(),
                self.graph.atom_count(),
                self.graph.bond_count()
            );
            return Ok(Vec::new());
        }

        let mut search = Search::new(self.graph, self.pattern, mode, find_all, self.options.max_steps);
        if !search.apply_seed(&pairs) {
            return Ok(Vec::new());
        }
        search.run()
    }
}

impl ChemGraph {
    /// Is there a bijection between the atoms of the two graphs that
    /// preserves atom types, bonds and bond orders?
    pub fn is_isomorphic(&self, other: &ChemGraph) -> bool {
        // Unseeded and unbounded, so the search always completes.
        Matcher::new(self, other).is_isomorphic().unwrap_or(false)
    }

    /// Every isomorphism from this graph onto `other`.
    pub fn find_isomorphisms(&self, other: &ChemGraph) -> Vec<Mapping> {
        Matcher::new(self, other).find_isomorphisms().unwrap_or_default()
    }

    /// Does `pattern` embed into this graph in a way consistent with `seed`?
    ///
    /// A pattern with no atoms embeds into every graph.
    pub fn is_subgraph_isomorphic(&self, pattern: &ChemGraph, seed: &Seed) -> Result<bool, MatchError> {
        Matcher::new(self, pattern).seed(seed.clone()).is_subgraph_isomorphic()
    }

    /// Every embedding of `pattern` into this graph consistent with `seed`,
    /// along with whether there was at least one.
    ///
    /// A pattern with no atoms yields exactly one, empty, mapping.
    pub fn find_subgraph_isomorphisms(&self, pattern: &ChemGraph, seed: &Seed) -> Result<(bool, Vec<Mapping>), MatchError> {
        let mappings = Matcher::new(self, pattern).seed(seed.clone()).find_subgraph_isomorphisms()?;
        Ok((!mappings.is_empty(), mappings))
    }
}
