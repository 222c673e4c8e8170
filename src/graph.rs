use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::{Debug, Formatter, Result as FmtResult};

use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use thiserror::Error;
use tracing::*;

use crate::{Atom, Bond, Label};

/// Identity of an atom within its graph.
pub type AtomId = NodeIndex;

/// Identity of a bond within its graph.
pub type BondId = EdgeIndex;

pub type MoleculeGraph = UnGraph<Atom, Bond>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("atom {0:?} is not part of this graph")]
    MissingAtom(AtomId),
    #[error("atom {0:?} cannot be bonded to itself")]
    SelfLoop(AtomId),
    #[error("atoms {0:?} and {1:?} are already bonded")]
    DuplicateBond(AtomId, AtomId),
}

/// A molecule, or a pattern of one, as atoms joined by bonds.
///
/// The graph upholds the usual chemical-graph invariants: every bond joins
/// two distinct atoms of the graph and no two atoms share more than one
/// bond. Queries never mutate it.
#[derive(Clone, Default)]
pub struct ChemGraph {
    graph: MoleculeGraph,
}

impl ChemGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_atom(&mut self, atom: impl Into<Atom>) -> AtomId {
        self.graph.add_node(atom.into())
    }

    pub fn add_bond(&mut self, a: AtomId, b: AtomId, bond: impl Into<Bond>) -> Result<BondId, GraphError> {
        for atom in [a, b] {
            if !self.contains_atom(atom) {
                return Err(GraphError::MissingAtom(atom));
            }
        }
        if a == b {
            return Err(GraphError::SelfLoop(a));
        }
        if self.graph.find_edge(a, b).is_some() {
            return Err(GraphError::DuplicateBond(a, b));
        }
        Ok(self.graph.add_edge(a, b, bond.into()))
    }

    pub fn contains_atom(&self, atom: AtomId) -> bool {
        atom.index() < self.graph.node_count()
    }

    pub fn atom(&self, atom: AtomId) -> Option<&Atom> {
        self.graph.node_weight(atom)
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// All atoms in ascending identity.
    pub fn atoms(&self) -> impl Iterator<Item = AtomId> + '_ {
        self.graph.node_indices()
    }

    /// All bonds in ascending identity, with their endpoints.
    pub fn bonds(&self) -> impl Iterator<Item = (BondId, AtomId, AtomId, &Bond)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (e.id(), e.source(), e.target(), e.weight()))
    }

    /// The atom's (neighbor, bond) pairs in ascending neighbor identity.
    pub fn neighbors(&self, atom: AtomId) -> Vec<(AtomId, &Bond)> {
        let mut neighbors: Vec<(AtomId, &Bond)> = self
            .graph
            .edges(atom)
            .map(|e| (other_end(e.source(), e.target(), atom), e.weight()))
            .collect();
        neighbors.sort_by_key(|(neighbor, _)| *neighbor);
        neighbors
    }

    pub fn degree(&self, atom: AtomId) -> usize {
        self.graph.edges(atom).count()
    }

    pub fn bond_between(&self, a: AtomId, b: AtomId) -> Option<&Bond> {
        self.graph.find_edge(a, b).map(|edge| &self.graph[edge])
    }

    pub fn bond_id(&self, a: AtomId, b: AtomId) -> Option<BondId> {
        self.graph.find_edge(a, b)
    }

    pub fn has_bond(&self, a: AtomId, b: AtomId) -> bool {
        self.graph.find_edge(a, b).is_some()
    }

    pub fn endpoints(&self, bond: BondId) -> Option<(AtomId, AtomId)> {
        self.graph.edge_endpoints(bond)
    }

    /// Does any atom or bond carry a set of admissible types?
    pub fn is_pattern(&self) -> bool {
        self.graph.node_weights().any(|atom| atom.kind.is_pattern())
            || self.graph.edge_weights().any(|bond| matches!(bond, Bond::Pattern(_)))
    }

    /// The mapping from each label to the atom that bears it.
    pub fn labeled_atoms(&self) -> BTreeMap<Label, AtomId> {
        self.label_table().into_inner()
    }

    pub fn label_table(&self) -> LabelTable {
        LabelTable::build(self)
    }

    /// The connected components, each listed in ascending atom identity.
    /// Components are ordered by their lowest atom.
    pub fn components(&self) -> Vec<Vec<AtomId>> {
        let mut components: Vec<Vec<AtomId>> = Vec::new();
        let mut visited: HashSet<AtomId> = HashSet::new();

        for atom in self.atoms() {
            if visited.contains(&atom) {
                continue;
            }
            let mut stack = vec![atom];
            let mut component = Vec::new();
            while let Some(current) = stack.pop() {
                if visited.insert(current) {
                    component.push(current);
                    for neighbor in self.graph.neighbors(current) {
                        if !visited.contains(&neighbor) {
                            stack.push(neighbor);
                        }
                    }
                }
            }
            component.sort();
            components.push(component);
        }
        components
    }

    pub fn component_count(&self) -> usize {
        petgraph::algo::connected_components(&self.graph)
    }

    /// Split into one graph per connected component. Atom identities are
    /// renumbered within each piece, preserving relative order.
    pub fn split(&self) -> Vec<ChemGraph> {
        self.components()
            .iter()
            .map(|component| self.subgraph(component))
            .collect()
    }

    fn subgraph(&self, component: &[AtomId]) -> ChemGraph {
        let mut subgraph = MoleculeGraph::default();
        let mut node_map: HashMap<AtomId, AtomId> = HashMap::new();

        for &atom in component {
            node_map.insert(atom, subgraph.add_node(self.graph[atom].clone()));
        }
        for edge in self.graph.edge_references() {
            if let (Some(&source), Some(&target)) = (node_map.get(&edge.source()), node_map.get(&edge.target())) {
                subgraph.add_edge(source, target, *edge.weight());
            }
        }
        ChemGraph { graph: subgraph }
    }

    pub fn as_petgraph(&self) -> &MoleculeGraph {
        &self.graph
    }
}

pub(crate) fn other_end(source: AtomId, target: AtomId, from: AtomId) -> AtomId {
    if source == from {
        target
    } else {
        source
    }
}

impl std::ops::Index<AtomId> for ChemGraph {
    type Output = Atom;

    fn index(&self, atom: AtomId) -> &Atom {
        &self.graph[atom]
    }
}

impl Debug for ChemGraph {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        for atom in self.atoms() {
            write!(f, "{} {:?}", atom.index() + 1, self.graph[atom])?;
            for (neighbor, bond) in self.neighbors(atom) {
                write!(f, " {{{},{:?}}}", neighbor.index() + 1, bond)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A side-table from label to the atom bearing it.
///
/// When a label is carried by more than one atom, the lowest atom identity
/// is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
    labels: BTreeMap<Label, AtomId>,
}

impl LabelTable {
    pub fn build(graph: &ChemGraph) -> Self {
        let mut labels = BTreeMap::new();
        for atom in graph.atoms() {
            if let Some(label) = &graph[atom].label {
                if let Some(first) = labels.get(label) {
                    debug!("Label {} appears on {:?} and {:?}; keeping {:?}", label, first, atom, first);
                    continue;
                }
                labels.insert(label.clone(), atom);
            }
        }
        LabelTable { labels }
    }

    pub fn get(&self, label: &Label) -> Option<AtomId> {
        self.labels.get(label).copied()
    }

    pub fn contains(&self, label: &Label) -> bool {
        self.labels.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Label, AtomId)> + '_ {
        self.labels.iter().map(|(label, atom)| (label, *atom))
    }

    pub fn into_inner(self) -> BTreeMap<Label, AtomId> {
        self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Element;

    fn ethanol() -> ChemGraph {
        let mut graph = ChemGraph::new();
        let c1 = graph.add_atom(Element::C);
        let c2 = graph.add_atom(Element::C);
        let o = graph.add_atom(Atom::new(Element::O).labeled("*1"));
        graph.add_bond(c1, c2, Bond::single()).unwrap();
        graph.add_bond(c2, o, Bond::single()).unwrap();
        graph
    }

    #[test]
    fn test_invariants_enforced() {
        let mut graph = ethanol();
        let a = NodeIndex::new(0);
        let b = NodeIndex::new(1);
        assert_eq!(graph.add_bond(a, a, Bond::single()), Err(GraphError::SelfLoop(a)));
        assert_eq!(graph.add_bond(b, a, Bond::double()), Err(GraphError::DuplicateBond(b, a)));
        let missing = NodeIndex::new(9);
        assert_eq!(graph.add_bond(a, missing, Bond::single()), Err(GraphError::MissingAtom(missing)));
        assert_eq!(graph.bond_count(), 2);
    }

    #[test]
    fn test_adjacency_is_symmetric_and_ordered() {
        let mut graph = ChemGraph::new();
        let center = graph.add_atom(Element::C);
        let ids: Vec<AtomId> = (0..4).map(|_| graph.add_atom(Element::H)).collect();
        // Insert out of order to make sure neighbors come back sorted.
        for &h in ids.iter().rev() {
            graph.add_bond(center, h, Bond::single()).unwrap();
        }
        let neighbors: Vec<AtomId> = graph.neighbors(center).into_iter().map(|(n, _)| n).collect();
        assert_eq!(neighbors, ids);
        for h in ids {
            assert_eq!(graph.neighbors(h).len(), 1);
            assert_eq!(graph.bond_between(h, center), graph.bond_between(center, h));
        }
        assert_eq!(graph.degree(center), 4);
    }

    #[test]
    fn test_bond_endpoints_and_petgraph_view() {
        let graph = ethanol();
        let (c2, o) = (NodeIndex::new(1), NodeIndex::new(2));
        let bond = graph.bond_id(c2, o).unwrap();
        assert_eq!(graph.endpoints(bond), Some((c2, o)));
        assert_eq!(graph.endpoints(EdgeIndex::new(7)), None);

        let view = graph.as_petgraph();
        assert_eq!(view.node_count(), graph.atom_count());
        assert!(!petgraph::algo::is_cyclic_undirected(view));
    }

    #[test]
    fn test_is_pattern() {
        let mut graph = ethanol();
        assert!(!graph.is_pattern());

        let mut with_pattern_bond = graph.clone();
        let extra = with_pattern_bond.add_atom(Element::C);
        with_pattern_bond
            .add_bond(NodeIndex::new(0), extra, Bond::pattern([crate::BondOrder::Single]))
            .unwrap();
        assert!(with_pattern_bond.is_pattern());

        graph.add_atom(Atom::any());
        assert!(graph.is_pattern());
    }

    #[test]
    fn test_label_table() {
        let graph = ethanol();
        let labels = graph.labeled_atoms();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels.get(&Label::new("*1")), Some(&NodeIndex::new(2)));
    }

    #[test]
    fn test_duplicate_labels_keep_lowest_atom() {
        let mut graph = ChemGraph::new();
        let first = graph.add_atom(Atom::new(Element::C).labeled("*"));
        let second = graph.add_atom(Atom::new(Element::C).labeled("*"));
        graph.add_bond(first, second, Bond::single()).unwrap();
        assert_eq!(graph.label_table().get(&Label::new("*")), Some(first));
    }

    #[test]
    fn test_split_disconnected() {
        let mut graph = ethanol();
        let na = graph.add_atom(Element::N);
        let cl = graph.add_atom(Element::Cl);
        graph.add_bond(na, cl, Bond::single()).unwrap();
        let lone = graph.add_atom(Element::O);

        assert_eq!(graph.component_count(), 3);
        let components = graph.components();
        assert_eq!(components, vec![
            vec![NodeIndex::new(0), NodeIndex::new(1), NodeIndex::new(2)],
            vec![na, cl],
            vec![lone],
        ]);
        let pieces = graph.split();
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[0].atom_count(), 3);
        assert_eq!(pieces[0].bond_count(), 2);
        assert_eq!(pieces[1].bond_count(), 1);
        assert_eq!(pieces[2].atom_count(), 1);
        assert_eq!(pieces[1][NodeIndex::new(0)].element(), Some(Element::N));
    }
}
