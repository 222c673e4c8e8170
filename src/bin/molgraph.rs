use anyhow::{Context, Result};
use molgraph::*;
use tracing::*;

/// Benzene with one substituent carbon, atoms 0-5 in the ring.
fn toluene() -> Result<ChemGraph> {
    let mut graph = ChemGraph::new();
    let ring: Vec<AtomId> = (0..6).map(|_| graph.add_atom(Element::C)).collect();
    for i in 0..6 {
        graph.add_bond(ring[i], ring[(i + 1) % 6], Bond::aromatic())?;
    }
    let methyl = graph.add_atom(Atom::new(Element::C).labeled("*1"));
    graph.add_bond(ring[0], methyl, Bond::single())?;
    Ok(graph)
}

/// A labeled heavy atom attached to an aromatic carbon.
fn aryl_substituent() -> Result<ChemGraph> {
    let mut pattern = ChemGraph::new();
    let substituent = pattern.add_atom(Atom::any_heavy().labeled("*1"));
    let aromatic = pattern.add_atom(Atom::pattern(ElementSet::single(Element::C)));
    pattern.add_bond(substituent, aromatic, Bond::single())?;
    let neighbor = pattern.add_atom(Atom::pattern(ElementSet::single(Element::C)));
    pattern.add_bond(aromatic, neighbor, Bond::pattern([BondOrder::Aromatic, BondOrder::Double]))?;
    Ok(pattern)
}

fn main() -> Result<()> {
    let level = std::env::args().nth(1).unwrap_or_else(|| "info".to_string());
    init_logging(&level);

    let toluene = toluene()?;
    info!("Toluene: {:?}", toluene);

    let mut cresol = toluene.clone();
    let hydroxyl = cresol.add_atom(Element::O);
    let anchor = cresol.atoms().next().context("toluene has atoms")?;
    cresol.add_bond(anchor, hydroxyl, Bond::single())?;
    info!("Toluene is isomorphic to itself: {}", toluene.is_isomorphic(&toluene));
    info!("Toluene is isomorphic to cresol: {}", toluene.is_isomorphic(&cresol));
    info!("Toluene has {} automorphisms", toluene.find_isomorphisms(&toluene).len());

    let pattern = aryl_substituent()?;
    let seed = Seed::from_shared_labels(&toluene.label_table(), &pattern.label_table());
    let (found, mappings) = toluene.find_subgraph_isomorphisms(&pattern, &seed)?;
    info!("Aryl substituent found: {} ({} mappings)", found, mappings.len());
    for mapping in &mappings {
        debug!("  {:?}", mapping);
    }

    match Matcher::new(&toluene, &pattern).budget(2).find_subgraph_isomorphisms() {
        Ok(mappings) => info!("Budgeted search found {} mappings", mappings.len()),
        Err(err) => warn!("Budgeted search gave up: {}", err),
    }

    for (i, ring) in toluene.smallest_set_of_smallest_rings().iter().enumerate() {
        info!("Ring {}: {:?}", i, ring);
    }
    let membership = toluene.cycle_membership();
    for atom in toluene.atoms() {
        info!("{:?} {} in a ring", toluene[atom], if membership.atom_in_cycle(atom) { "is" } else { "is not" });
    }

    let split = toluene.split();
    info!("Toluene has {} component(s)", split.len());
    Ok(())
}
