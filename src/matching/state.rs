use super::Mapping;
use crate::AtomId;

/// The partial mapping of a search, kept as a stack of (graph, pattern)
/// frames with both directions indexed for constant-time lookups.
///
/// Frames are only ever pushed on top and popped from the top, so popping
/// restores the mapping exactly as it was before the matching push.
#[derive(Debug, Clone)]
pub(crate) struct MappingStack {
    pattern_to_graph: Vec<Option<AtomId>>,
    graph_to_pattern: Vec<Option<AtomId>>,
    frames: Vec<(AtomId, AtomId)>,
}

impl MappingStack {
    pub fn new(graph_size: usize, pattern_size: usize) -> Self {
        MappingStack {
            pattern_to_graph: vec![None; pattern_size],
            graph_to_pattern: vec![None; graph_size],
            frames: Vec::with_capacity(pattern_size),
        }
    }

    pub fn push(&mut self, graph_atom: AtomId, pattern_atom: AtomId) {
        debug_assert!(self.graph_to_pattern[graph_atom.index()].is_none());
        debug_assert!(self.pattern_to_graph[pattern_atom.index()].is_none());
        self.graph_to_pattern[graph_atom.index()] = Some(pattern_atom);
        self.pattern_to_graph[pattern_atom.index()] = Some(graph_atom);
        self.frames.push((graph_atom, pattern_atom));
    }

    pub fn pop(&mut self) -> Option<(AtomId, AtomId)> {
        let (graph_atom, pattern_atom) = self.frames.pop()?;
        self.graph_to_pattern[graph_atom.index()] = None;
        self.pattern_to_graph[pattern_atom.index()] = None;
        Some((graph_atom, pattern_atom))
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// The graph atom a pattern atom is mapped onto.
    pub fn image(&self, pattern_atom: AtomId) -> Option<AtomId> {
        self.pattern_to_graph[pattern_atom.index()]
    }

    /// The pattern atom a graph atom stands in for.
    pub fn preimage(&self, graph_atom: AtomId) -> Option<AtomId> {
        self.graph_to_pattern[graph_atom.index()]
    }

    pub fn is_pattern_mapped(&self, pattern_atom: AtomId) -> bool {
        self.image(pattern_atom).is_some()
    }

    pub fn is_graph_mapped(&self, graph_atom: AtomId) -> bool {
        self.preimage(graph_atom).is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.frames.len() == self.pattern_to_graph.len()
    }

    pub fn snapshot(&self) -> Mapping {
        self.frames.iter().copied().collect()
    }
}
