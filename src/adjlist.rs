//! A reader for numbered adjacency lists, used to write test fixtures.
//!
//! ```text
//! 1 *1 C 1 {2,S} {3,S}
//! 2 *2 R!H 0 {1,S}
//! 3 *3 {C,O} 0 {1,{S,D}}
//! ```
//!
//! Each line holds an atom index, an optional `*` label, an atom type or a
//! braced set of types, the number of radical electrons, and the bonds to
//! other atoms. Bonds may be separated by commas. A bond listed on both of
//! its atoms is added once.

use std::collections::HashMap;

use anyhow::{anyhow, bail, Context, Result};
use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, digit0, digit1, one_of, space0, space1},
    combinator::{all_consuming, map, map_res, opt, recognize},
    error::{convert_error, VerboseError},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, separated_pair, terminated, tuple},
    IResult,
};

use crate::{Atom, Bond, BondOrder, ChemGraph, Element, ElementSet};

type Res<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

/// Lowercase atom subtype suffixes (`Cd`, `Cs`, `Ot`, `Cb`, ...), which
/// only narrow the bonding context and are read as the bare element.
const SUBTYPE_SUFFIXES: &str = "sdtbaoq";

#[derive(Debug, Clone, PartialEq, Eq)]
struct AtomLine<'a> {
    index: usize,
    label: Option<&'a str>,
    types: Vec<&'a str>,
    radicals: u8,
    bonds: Vec<(usize, Vec<char>)>,
}

fn comma(input: &str) -> Res<char> {
    delimited(space0, char(','), space0)(input)
}

fn index(input: &str) -> Res<usize> {
    map_res(digit1, str::parse::<usize>)(input)
}

fn label(input: &str) -> Res<&str> {
    recognize(pair(char('*'), digit0))(input)
}

fn type_token(input: &str) -> Res<&str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '!')(input)
}

fn types(input: &str) -> Res<Vec<&str>> {
    alt((
        delimited(char('{'), separated_list1(comma, type_token), char('}')),
        map(type_token, |token| vec![token]),
    ))(input)
}

fn radicals(input: &str) -> Res<u8> {
    map_res(digit1, str::parse::<u8>)(input)
}

fn bond_codes(input: &str) -> Res<Vec<char>> {
    alt((
        delimited(char('{'), separated_list1(comma, one_of("SDTB")), char('}')),
        map(one_of("SDTB"), |code| vec![code]),
    ))(input)
}

fn bond(input: &str) -> Res<(usize, Vec<char>)> {
    delimited(char('{'), separated_pair(index, comma, bond_codes), char('}'))(input)
}

fn atom_line(input: &str) -> Res<AtomLine> {
    let (input, (index, label, types, radicals, bonds)) = terminated(
        tuple((
            preceded(space0, index),
            opt(preceded(space1, label)),
            preceded(space1, types),
            preceded(space1, radicals),
            many0(preceded(tuple((space0, opt(char(',')), space0)), bond)),
        )),
        space0,
    )(input)?;
    Ok((
        input,
        AtomLine {
            index,
            label,
            types,
            radicals,
            bonds,
        },
    ))
}

fn parse_line(line: &str) -> Result<AtomLine<'_>> {
    match all_consuming(atom_line)(line) {
        Ok((_, parsed)) => Ok(parsed),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(anyhow!("{}", convert_error(line, e))),
        Err(nom::Err::Incomplete(_)) => bail!("incomplete line {:?}", line),
    }
}

fn element_of(token: &str) -> Option<Element> {
    let mut symbol = token;
    loop {
        if let Some(element) = Element::from_symbol(symbol) {
            return Some(element);
        }
        let last = symbol.chars().last()?;
        if !SUBTYPE_SUFFIXES.contains(last) {
            return None;
        }
        symbol = &symbol[..symbol.len() - last.len_utf8()];
    }
}

fn molecule_atom(types: &[&str]) -> Result<Atom> {
    match types {
        [token] => element_of(token)
            .map(Atom::new)
            .with_context(|| format!("{:?} is not an element", token)),
        _ => bail!("a molecule atom needs exactly one element, not {:?}", types),
    }
}

fn pattern_atom(types: &[&str]) -> Result<Atom> {
    match types {
        ["R"] => return Ok(Atom::any()),
        ["R!H"] => return Ok(Atom::any_heavy()),
        _ => {}
    }
    let mut elements = ElementSet::empty();
    for token in types {
        match *token {
            "R" => elements = ElementSet::all(),
            "R!H" => ElementSet::heavy().iter().for_each(|element| elements.insert(element)),
            _ => elements.insert(element_of(token).with_context(|| format!("{:?} is not an atom type", token))?),
        }
    }
    Ok(Atom::pattern(elements))
}

fn read(text: &str, as_pattern: bool) -> Result<ChemGraph> {
    let lines = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(parse_line)
        .collect::<Result<Vec<_>>>()?;

    let mut graph = ChemGraph::new();
    let mut ids = HashMap::new();
    for line in &lines {
        let mut atom = if as_pattern {
            pattern_atom(&line.types)?
        } else {
            molecule_atom(&line.types)?
        };
        atom = atom.radicals(line.radicals);
        if let Some(label) = line.label {
            atom = atom.labeled(label);
        }
        if ids.insert(line.index, graph.add_atom(atom)).is_some() {
            bail!("atom {} is listed twice", line.index);
        }
    }

    for line in &lines {
        let a = ids[&line.index];
        for (other, codes) in &line.bonds {
            let b = *ids
                .get(other)
                .with_context(|| format!("atom {} is bonded to unknown atom {}", line.index, other))?;
            let orders = codes
                .iter()
                .map(|&code| BondOrder::from_code(code).with_context(|| format!("unknown bond order {:?}", code)))
                .collect::<Result<Vec<_>>>()?;
            let bond = match (as_pattern, orders.as_slice()) {
                (true, _) => Bond::pattern(orders.iter().copied()),
                (false, [order]) => Bond::from(*order),
                (false, _) => bail!("bond {}-{} in a molecule needs exactly one order", line.index, other),
            };
            match graph.bond_between(a, b) {
                Some(existing) if *existing != bond => {
                    bail!("bond {}-{} is listed with two different orders", line.index, other)
                }
                Some(_) => {}
                None => {
                    graph.add_bond(a, b, bond)?;
                }
            }
        }
    }
    Ok(graph)
}

/// Read a molecule: every atom and bond must be concrete.
pub fn molecule(text: &str) -> Result<ChemGraph> {
    read(text, false)
}

/// Read a pattern: every atom and bond becomes a pattern type.
pub fn pattern(text: &str) -> Result<ChemGraph> {
    read(text, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AtomType, BondOrderSet, Label};
    use petgraph::graph::NodeIndex;

    #[test]
    fn test_parse_line() -> Result<()> {
        let line = parse_line("1 *1 C 1 {2,S}, {3,{S,D}}")?;
        assert_eq!(line, AtomLine {
            index: 1,
            label: Some("*1"),
            types: vec!["C"],
            radicals: 1,
            bonds: vec![(2, vec!['S']), (3, vec!['S', 'D'])],
        });

        let line = parse_line("4 {C, O} 0")?;
        assert_eq!(line.label, None);
        assert_eq!(line.types, vec!["C", "O"]);
        assert!(line.bonds.is_empty());
        Ok(())
    }

    #[test]
    fn test_subtypes() {
        assert_eq!(element_of("Cd"), Some(Element::C));
        assert_eq!(element_of("Cl"), Some(Element::Cl));
        assert_eq!(element_of("Sis"), Some(Element::Si));
        assert_eq!(element_of("Ss"), Some(Element::S));
        assert_eq!(element_of("X"), None);
    }

    #[test]
    fn test_read_pattern() -> Result<()> {
        let graph = pattern("1 * R!H 0 {2,{S,D}}\n2 {N,O} 2 {1,{S,D}}")?;
        assert_eq!(graph.atom_count(), 2);
        assert_eq!(graph.bond_count(), 1);
        let (a, b) = (NodeIndex::new(0), NodeIndex::new(1));
        assert_eq!(graph[a].label, Some(Label::new("*")));
        assert_eq!(graph[a].kind.admissible(), ElementSet::heavy());
        assert_eq!(graph[b].kind, AtomType::Pattern {
            elements: [Element::N, Element::O].into_iter().collect(),
            wildcard: false,
        });
        assert_eq!(graph[b].radical_electrons, 2);
        let expected: BondOrderSet = [BondOrder::Single, BondOrder::Double].into_iter().collect();
        assert_eq!(graph.bond_between(a, b), Some(&Bond::Pattern(expected)));
        Ok(())
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(molecule("1 R 0").is_err());
        assert!(molecule("1 C 0 {2,{S,D}}\n2 C 0").is_err());
        assert!(molecule("1 C 0 {3,S}").is_err());
        assert!(molecule("1 C 0 {2,S}\n2 C 0 {1,D}").is_err());
        assert!(molecule("1 C 0\n1 C 0").is_err());
        assert!(molecule("1 C {2,S}").is_err());
    }
}
