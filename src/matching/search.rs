use tracing::*;

use super::state::MappingStack;
use super::{MatchError, Mapping};
use crate::{Atom, AtomId, Bond, ChemGraph};

/// Whether the pattern must cover the whole graph or may embed into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MatchMode {
    Isomorphism,
    Subgraph,
}

impl MatchMode {
    fn atoms_compatible(&self, graph_atom: &Atom, pattern_atom: &Atom) -> bool {
        match self {
            MatchMode::Isomorphism => graph_atom.equivalent(pattern_atom),
            MatchMode::Subgraph => graph_atom.is_specific_case_of(pattern_atom),
        }
    }

    fn bonds_compatible(&self, graph_bond: &Bond, pattern_bond: &Bond) -> bool {
        match self {
            MatchMode::Isomorphism => graph_bond.equivalent(pattern_bond),
            MatchMode::Subgraph => graph_bond.is_specific_case_of(pattern_bond),
        }
    }

    fn degrees_compatible(&self, graph_degree: usize, pattern_degree: usize) -> bool {
        match self {
            MatchMode::Isomorphism => graph_degree == pattern_degree,
            MatchMode::Subgraph => graph_degree >= pattern_degree,
        }
    }
}

type Adjacency = Vec<Vec<(AtomId, Bond)>>;

/// A pattern atom with the graph atoms left to try for it.
struct Frame {
    pattern_atom: AtomId,
    candidates: Vec<AtomId>,
    next: usize,
}

fn adjacency(graph: &ChemGraph) -> Adjacency {
    graph
        .atoms()
        .map(|atom| graph.neighbors(atom).into_iter().map(|(n, b)| (n, *b)).collect())
        .collect()
}

/// One backtracking search of `pattern` against `graph`.
///
/// The search owns all of its state, so any number of searches may run
/// over the same graphs at once.
pub(crate) struct Search<'a> {
    graph: &'a ChemGraph,
    pattern: &'a ChemGraph,
    graph_adjacency: Adjacency,
    pattern_adjacency: Adjacency,
    mode: MatchMode,
    state: MappingStack,
    find_all: bool,
    max_steps: Option<u64>,
    steps: u64,
    found: Vec<Mapping>,
}

impl<'a> Search<'a> {
    pub fn new(graph: &'a ChemGraph, pattern: &'a ChemGraph, mode: MatchMode, find_all: bool, max_steps: Option<u64>) -> Self {
        Search {
            graph,
            pattern,
            graph_adjacency: adjacency(graph),
            pattern_adjacency: adjacency(pattern),
            mode,
            state: MappingStack::new(graph.atom_count(), pattern.atom_count()),
            find_all,
            max_steps,
            steps: 0,
            found: Vec::new(),
        }
    }

    /// Fix the seed pairs in place. Returns false if any pair could never
    /// be part of a match, in which case nothing is searched.
    pub fn apply_seed(&mut self, pairs: &[(AtomId, AtomId)]) -> bool {
        for &(graph_atom, pattern_atom) in pairs {
            if !self.is_feasible(graph_atom, pattern_atom) {
                debug!(
                    "Seed pair {:?} -> {:?} is incompatible ({:?} vs {:?})",
                    graph_atom, pattern_atom, self.graph[graph_atom], self.pattern[pattern_atom]
                );
                return false;
            }
            self.state.push(graph_atom, pattern_atom);
        }
        true
    }

    pub fn run(mut self) -> Result<Vec<Mapping>, MatchError> {
        trace!(
            "Searching {:?} pattern of {} atoms in graph of {} atoms (seeded with {})",
            self.mode,
            self.pattern.atom_count(),
            self.graph.atom_count(),
            self.state.depth()
        );
        self.extend()?;
        debug!("Search finished after {} steps with {} mappings", self.steps, self.found.len());
        Ok(self.found)
    }

    /// Walk the search tree depth first. Each frame holds one pattern atom
    /// and the graph atoms still to try for it; every frame above the
    /// bottom one sits on top of exactly one pushed pair.
    fn extend(&mut self) -> Result<(), MatchError> {
        if self.state.is_complete() {
            self.found.push(self.state.snapshot());
            return Ok(());
        }
        let Some(first) = self.frame() else {
            return Ok(());
        };

        let mut frames = vec![first];
        while let Some(frame) = frames.last_mut() {
            let Some(&graph_atom) = frame.candidates.get(frame.next) else {
                frames.pop();
                if !frames.is_empty() {
                    self.state.pop();
                }
                continue;
            };
            frame.next += 1;
            let pattern_atom = frame.pattern_atom;

            self.spend_step()?;
            if !self.is_feasible(graph_atom, pattern_atom) {
                continue;
            }
            self.state.push(graph_atom, pattern_atom);

            if self.state.is_complete() {
                self.found.push(self.state.snapshot());
                if !self.find_all {
                    return Ok(());
                }
                self.state.pop();
            } else if let Some(frame) = self.frame() {
                frames.push(frame);
            } else {
                self.state.pop();
            }
        }
        Ok(())
    }

    fn frame(&self) -> Option<Frame> {
        let pattern_atom = self.next_pattern_atom()?;
        Some(Frame {
            pattern_atom,
            candidates: self.candidates(pattern_atom),
            next: 0,
        })
    }

    fn spend_step(&mut self) -> Result<(), MatchError> {
        self.steps += 1;
        match self.max_steps {
            Some(max_steps) if self.steps > max_steps => {
                warn!("Search truncated after {} steps with {} mappings found", max_steps, self.found.len());
                Err(MatchError::SearchTruncated { steps: max_steps })
            }
            _ => Ok(()),
        }
    }

    /// The lowest unmapped pattern atom next to the mapped region, or the
    /// lowest unmapped pattern atom when nothing borders it.
    fn next_pattern_atom(&self) -> Option<AtomId> {
        let mut first_unmapped = None;
        for atom in self.pattern.atoms() {
            if self.state.is_pattern_mapped(atom) {
                continue;
            }
            if self.pattern_adjacency[atom.index()]
                .iter()
                .any(|(neighbor, _)| self.state.is_pattern_mapped(*neighbor))
            {
                return Some(atom);
            }
            first_unmapped.get_or_insert(atom);
        }
        first_unmapped
    }

    /// Unmapped graph atoms worth trying for `pattern_atom`, in ascending
    /// identity. When the pattern atom borders the mapped region only the
    /// neighbors of one mapped image can qualify.
    fn candidates(&self, pattern_atom: AtomId) -> Vec<AtomId> {
        let anchor = self.pattern_adjacency[pattern_atom.index()]
            .iter()
            .find_map(|(neighbor, _)| self.state.image(*neighbor));

        match anchor {
            Some(anchor) => self.graph_adjacency[anchor.index()]
                .iter()
                .map(|(neighbor, _)| *neighbor)
                .filter(|neighbor| !self.state.is_graph_mapped(*neighbor))
                .collect(),
            None => self
                .graph
                .atoms()
                .filter(|atom| !self.state.is_graph_mapped(*atom))
                .collect(),
        }
    }

    fn is_feasible(&self, graph_atom: AtomId, pattern_atom: AtomId) -> bool {
        if !self.mode.atoms_compatible(&self.graph[graph_atom], &self.pattern[pattern_atom]) {
            return false;
        }

        let graph_neighbors = &self.graph_adjacency[graph_atom.index()];
        let pattern_neighbors = &self.pattern_adjacency[pattern_atom.index()];
        if !self.mode.degrees_compatible(graph_neighbors.len(), pattern_neighbors.len()) {
            return false;
        }

        // Every bond to an already mapped pattern neighbor must exist in the graph.
        let mut mapped_pattern_neighbors = 0;
        for (pattern_neighbor, pattern_bond) in pattern_neighbors {
            let Some(image) = self.state.image(*pattern_neighbor) else {
                continue;
            };
            mapped_pattern_neighbors += 1;
            let compatible = graph_neighbors
                .iter()
                .find(|(neighbor, _)| *neighbor == image)
                .is_some_and(|(_, graph_bond)| self.mode.bonds_compatible(graph_bond, pattern_bond));
            if !compatible {
                return false;
            }
        }

        // An isomorphism may not add bonds between mapped atoms either.
        if self.mode == MatchMode::Isomorphism {
            let mapped_graph_neighbors = graph_neighbors
                .iter()
                .filter(|(neighbor, _)| self.state.is_graph_mapped(*neighbor))
                .count();
            if mapped_graph_neighbors != mapped_pattern_neighbors {
                return false;
            }
        }
        true
    }
}
