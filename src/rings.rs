//! Ring perception: which atoms and bonds lie on cycles, and the smallest
//! set of smallest rings.
//!
//! The smallest set of smallest rings is a minimum cycle basis. When a
//! graph has several minimum bases (cubane, for instance) the one returned
//! is the first found in ascending atom and bond order. That choice is
//! deterministic but not necessarily the chemically conventional one.

use std::collections::{HashSet, VecDeque};

use petgraph::graph::NodeIndex;
use tracing::*;

use crate::{AtomId, BondId, ChemGraph};

/// A ring as a cyclic sequence of atoms: each atom is bonded to the next
/// and the last is bonded to the first.
pub type Ring = Vec<AtomId>;

const UNVISITED: usize = usize::MAX;

/// Neighbor lists of (neighbor, bond) by plain indices, ascending.
fn index_adjacency(graph: &ChemGraph) -> Vec<Vec<(usize, usize)>> {
    let mut adjacency = vec![Vec::new(); graph.atom_count()];
    for (bond, a, b, _) in graph.bonds() {
        adjacency[a.index()].push((b.index(), bond.index()));
        adjacency[b.index()].push((a.index(), bond.index()));
    }
    for neighbors in adjacency.iter_mut() {
        neighbors.sort();
    }
    adjacency
}

/// Which atoms and bonds of a graph lie on at least one cycle.
///
/// Built from a single depth-first traversal that tracks discovery order
/// and low-link values: a bond is on a cycle exactly when it is not a
/// bridge, and an atom is on a cycle exactly when it touches such a bond.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleMembership {
    bridges: Vec<bool>,
    atoms: Vec<bool>,
    ring_bonds: HashSet<(AtomId, AtomId)>,
}

struct Frame {
    node: usize,
    parent_bond: Option<usize>,
    next: usize,
}

impl CycleMembership {
    pub fn new(graph: &ChemGraph) -> Self {
        let adjacency = index_adjacency(graph);
        let bridges = find_bridges(&adjacency, graph.bond_count());

        let mut atoms = vec![false; graph.atom_count()];
        let mut ring_bonds = HashSet::new();
        for (bond, a, b, _) in graph.bonds() {
            if !bridges[bond.index()] {
                atoms[a.index()] = true;
                atoms[b.index()] = true;
                ring_bonds.insert(ordered(a, b));
            }
        }
        CycleMembership {
            bridges,
            atoms,
            ring_bonds,
        }
    }

    pub fn is_bridge(&self, bond: BondId) -> bool {
        self.bridges.get(bond.index()).copied().unwrap_or(false)
    }

    pub fn atom_in_cycle(&self, atom: AtomId) -> bool {
        self.atoms.get(atom.index()).copied().unwrap_or(false)
    }

    /// False when the atoms are not bonded at all.
    pub fn bond_in_cycle(&self, a: AtomId, b: AtomId) -> bool {
        self.ring_bonds.contains(&ordered(a, b))
    }

    pub fn ring_bond_count(&self) -> usize {
        self.ring_bonds.len()
    }
}

fn ordered(a: AtomId, b: AtomId) -> (AtomId, AtomId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn find_bridges(adjacency: &[Vec<(usize, usize)>], bond_count: usize) -> Vec<bool> {
    let n = adjacency.len();
    let mut discovered = vec![UNVISITED; n];
    let mut low = vec![0; n];
    let mut bridges = vec![false; bond_count];
    let mut time = 0;

    for root in 0..n {
        if discovered[root] != UNVISITED {
            continue;
        }
        discovered[root] = time;
        low[root] = time;
        time += 1;

        let mut stack = vec![Frame {
            node: root,
            parent_bond: None,
            next: 0,
        }];
        while let Some(frame) = stack.last_mut() {
            let node = frame.node;
            let parent_bond = frame.parent_bond;

            if let Some(&(neighbor, bond)) = adjacency[node].get(frame.next) {
                frame.next += 1;
                if Some(bond) == parent_bond {
                    continue;
                }
                if discovered[neighbor] == UNVISITED {
                    discovered[neighbor] = time;
                    low[neighbor] = time;
                    time += 1;
                    stack.push(Frame {
                        node: neighbor,
                        parent_bond: Some(bond),
                        next: 0,
                    });
                } else {
                    low[node] = low[node].min(discovered[neighbor]);
                }
            } else {
                stack.pop();
                if let (Some(parent), Some(bond)) = (stack.last(), parent_bond) {
                    let parent = parent.node;
                    low[parent] = low[parent].min(low[node]);
                    if low[node] > discovered[parent] {
                        bridges[bond] = true;
                    }
                }
            }
        }
    }
    bridges
}

impl ChemGraph {
    pub fn cycle_membership(&self) -> CycleMembership {
        CycleMembership::new(self)
    }

    /// Does `atom` lie on at least one cycle?
    pub fn is_atom_in_cycle(&self, atom: AtomId) -> bool {
        self.cycle_membership().atom_in_cycle(atom)
    }

    /// Is there a bond between `a` and `b` that lies on a cycle?
    pub fn is_bond_in_cycle(&self, a: AtomId, b: AtomId) -> bool {
        self.cycle_membership().bond_in_cycle(a, b)
    }

    pub fn is_cyclic(&self) -> bool {
        self.cycle_rank() > 0
    }

    /// The number of independent cycles, `|E| - |V| + C`.
    pub fn cycle_rank(&self) -> usize {
        (self.bond_count() + self.component_count()).saturating_sub(self.atom_count())
    }

    /// A minimum cycle basis: `cycle_rank()` rings of smallest total size
    /// that together generate every cycle of the graph.
    pub fn smallest_set_of_smallest_rings(&self) -> Vec<Ring> {
        let expected = self.cycle_rank();
        if expected == 0 {
            return Vec::new();
        }

        let adjacency = index_adjacency(self);
        let membership = CycleMembership::new(self);
        let candidates = ring_candidates(self, &adjacency, &membership);
        trace!("{} ring candidates for {} rings", candidates.len(), expected);

        let mut basis = CycleBasis::new(self.bond_count());
        let mut rings = Vec::with_capacity(expected);
        for ring in candidates {
            if rings.len() == expected {
                break;
            }
            if basis.try_add(&edge_vector(self, &ring)) {
                trace!("Accepted ring {:?}", ring);
                rings.push(ring);
            }
        }
        if rings.len() < expected {
            warn!("Found only {} of {} independent rings", rings.len(), expected);
        }
        rings
    }

    /// Every simple cycle through `atom`, each listed once. Rings are
    /// ordered by size, then by their atoms.
    pub fn all_cycles_through(&self, atom: AtomId) -> Vec<Ring> {
        if !self.contains_atom(atom) {
            return Vec::new();
        }
        let adjacency = index_adjacency(self);
        let start = atom.index();
        let mut path = vec![start];
        let mut on_path = vec![false; adjacency.len()];
        on_path[start] = true;

        let mut seen = HashSet::new();
        let mut cycles = Vec::new();
        walk_cycles(&adjacency, start, &mut path, &mut on_path, &mut seen, &mut cycles);

        cycles.sort_by(|a: &Ring, b: &Ring| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        cycles
    }
}

fn walk_cycles(
    adjacency: &[Vec<(usize, usize)>],
    start: usize,
    path: &mut Vec<usize>,
    on_path: &mut [bool],
    seen: &mut HashSet<Ring>,
    cycles: &mut Vec<Ring>,
) {
    let Some(&current) = path.last() else {
        return;
    };
    for &(neighbor, _) in &adjacency[current] {
        if neighbor == start && path.len() >= 3 {
            let ring = normalize_ring(&to_atoms(path));
            if seen.insert(ring.clone()) {
                cycles.push(ring);
            }
        } else if !on_path[neighbor] {
            on_path[neighbor] = true;
            path.push(neighbor);
            walk_cycles(adjacency, start, path, on_path, seen, cycles);
            path.pop();
            on_path[neighbor] = false;
        }
    }
}

fn to_atoms(indices: &[usize]) -> Ring {
    indices.iter().map(|&i| NodeIndex::new(i)).collect()
}

/// Candidate rings in the order they are offered to the basis: shortest
/// first, and among equals, in the order they were found.
///
/// The shortest ring through each ring bond comes first, in ascending bond
/// order. Horton's candidates follow: for every atom and every ring bond,
/// the ring closed by that bond over the atom's shortest-path tree. These
/// always contain a minimum cycle basis.
fn ring_candidates(graph: &ChemGraph, adjacency: &[Vec<(usize, usize)>], membership: &CycleMembership) -> Vec<Ring> {
    let ring_bonds: Vec<(usize, usize, usize)> = graph
        .bonds()
        .filter(|(bond, ..)| !membership.is_bridge(*bond))
        .map(|(bond, a, b, _)| (bond.index(), a.index(), b.index()))
        .collect();

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    let mut offer = |ring: Vec<usize>| {
        let ring = normalize_ring(&to_atoms(&ring));
        if seen.insert(ring.clone()) {
            candidates.push(ring);
        }
    };

    for &(bond, a, b) in &ring_bonds {
        if let Some(path) = shortest_path_avoiding(adjacency, a, b, bond) {
            offer(path);
        }
    }

    for root in 0..adjacency.len() {
        if !membership.atom_in_cycle(NodeIndex::new(root)) {
            continue;
        }
        let parents = shortest_path_tree(adjacency, root);
        for &(_, a, b) in &ring_bonds {
            // Skip bonds that belong to the tree itself.
            if parents[a] == Some(b) || parents[b] == Some(a) {
                continue;
            }
            let (Some(to_a), Some(to_b)) = (tree_path(&parents, root, a), tree_path(&parents, root, b)) else {
                continue;
            };
            if to_a[1..].iter().any(|atom| to_b[1..].contains(atom)) {
                continue;
            }
            let mut ring = to_a;
            ring.extend(to_b[1..].iter().rev());
            if ring.len() >= 3 {
                offer(ring);
            }
        }
    }

    candidates.sort_by_key(|ring| ring.len());
    candidates
}

/// Breadth-first search from `from` to `to` that never crosses `skip`.
fn shortest_path_avoiding(adjacency: &[Vec<(usize, usize)>], from: usize, to: usize, skip: usize) -> Option<Vec<usize>> {
    let mut parents = vec![None; adjacency.len()];
    let mut visited = vec![false; adjacency.len()];
    let mut queue = VecDeque::new();
    visited[from] = true;
    queue.push_back(from);

    while let Some(current) = queue.pop_front() {
        if current == to {
            break;
        }
        for &(neighbor, bond) in &adjacency[current] {
            if bond == skip || visited[neighbor] {
                continue;
            }
            visited[neighbor] = true;
            parents[neighbor] = Some(current);
            queue.push_back(neighbor);
        }
    }
    if !visited[to] {
        return None;
    }

    let mut path = vec![to];
    let mut current = to;
    while let Some(parent) = parents[current] {
        path.push(parent);
        current = parent;
    }
    path.reverse();
    Some(path)
}

fn shortest_path_tree(adjacency: &[Vec<(usize, usize)>], root: usize) -> Vec<Option<usize>> {
    let mut parents = vec![None; adjacency.len()];
    let mut visited = vec![false; adjacency.len()];
    let mut queue = VecDeque::new();
    visited[root] = true;
    queue.push_back(root);

    while let Some(current) = queue.pop_front() {
        for &(neighbor, _) in &adjacency[current] {
            if !visited[neighbor] {
                visited[neighbor] = true;
                parents[neighbor] = Some(current);
                queue.push_back(neighbor);
            }
        }
    }
    parents
}

/// The tree path from `root` down to `target`, or `None` if unreachable.
fn tree_path(parents: &[Option<usize>], root: usize, target: usize) -> Option<Vec<usize>> {
    let mut path = vec![target];
    let mut current = target;
    while current != root {
        current = parents[current]?;
        path.push(current);
    }
    path.reverse();
    Some(path)
}

/// Rotate a ring to start at its lowest atom, heading towards the lower of
/// that atom's two ring neighbors.
fn normalize_ring(ring: &[AtomId]) -> Ring {
    let Some(start) = ring.iter().enumerate().min_by_key(|&(_, atom)| atom).map(|(i, _)| i) else {
        return Vec::new();
    };
    let len = ring.len();
    let mut normalized: Ring = (0..len).map(|i| ring[(start + i) % len]).collect();
    if len > 2 && normalized[1] > normalized[len - 1] {
        normalized[1..].reverse();
    }
    normalized
}

/// The ring as a bit vector over bond identities.
fn edge_vector(graph: &ChemGraph, ring: &[AtomId]) -> Vec<u64> {
    let mut bits = vec![0u64; graph.bond_count().div_ceil(64)];
    for i in 0..ring.len() {
        if let Some(bond) = graph.bond_id(ring[i], ring[(i + 1) % ring.len()]) {
            let index = bond.index();
            bits[index / 64] |= 1 << (index % 64);
        }
    }
    bits
}

/// Rows of a GF(2) echelon form over the cycle space.
struct CycleBasis {
    rows: Vec<(usize, Vec<u64>)>,
    words: usize,
}

impl CycleBasis {
    fn new(bond_count: usize) -> Self {
        CycleBasis {
            rows: Vec::new(),
            words: bond_count.div_ceil(64),
        }
    }

    /// Add `vector` if it is independent of the rows so far.
    fn try_add(&mut self, vector: &[u64]) -> bool {
        debug_assert_eq!(vector.len(), self.words);
        let mut reduced = vector.to_vec();
        for (pivot, row) in &self.rows {
            if reduced[pivot / 64] & (1 << (pivot % 64)) != 0 {
                for (word, bits) in reduced.iter_mut().zip(row) {
                    *word ^= bits;
                }
            }
        }
        match leading_bit(&reduced) {
            Some(pivot) => {
                self.rows.push((pivot, reduced));
                true
            }
            None => false,
        }
    }
}

fn leading_bit(bits: &[u64]) -> Option<usize> {
    bits.iter()
        .enumerate()
        .find(|(_, word)| **word != 0)
        .map(|(i, word)| i * 64 + word.trailing_zeros() as usize)
}
