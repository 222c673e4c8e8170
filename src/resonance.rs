use tracing::*;

use crate::{ChemGraph, MatchError, Mapping, Seed};

/// A molecule given as one or more resonance forms.
///
/// The forms are supplied by the caller, never generated here. A query
/// holds for the molecule when it holds for any of its forms.
#[derive(Debug, Clone)]
pub struct Molecule {
    forms: Vec<ChemGraph>,
}

impl Molecule {
    pub fn new(form: ChemGraph) -> Self {
        Molecule { forms: vec![form] }
    }

    pub fn with_resonance_form(mut self, form: ChemGraph) -> Self {
        self.add_resonance_form(form);
        self
    }

    pub fn add_resonance_form(&mut self, form: ChemGraph) {
        self.forms.push(form);
    }

    pub fn resonance_forms(&self) -> &[ChemGraph] {
        &self.forms
    }

    /// The form the molecule was created with.
    pub fn primary(&self) -> &ChemGraph {
        &self.forms[0]
    }

    /// Is any form of `self` isomorphic to any form of `other`?
    pub fn is_isomorphic(&self, other: &Molecule) -> bool {
        self.forms
            .iter()
            .any(|form| other.forms.iter().any(|other_form| form.is_isomorphic(other_form)))
    }

    pub fn is_subgraph_isomorphic(&self, pattern: &ChemGraph, seed: &Seed) -> Result<bool, MatchError> {
        self.across_forms(|form| form.is_subgraph_isomorphic(pattern, seed))
    }

    /// The mappings of the first form that matches `pattern` at all.
    pub fn find_subgraph_isomorphisms(&self, pattern: &ChemGraph, seed: &Seed) -> Result<(bool, Vec<Mapping>), MatchError> {
        let mut truncated = None;
        for (i, form) in self.forms.iter().enumerate() {
            match form.find_subgraph_isomorphisms(pattern, seed) {
                Ok((true, mappings)) => {
                    debug!("Resonance form {} matched with {} mappings", i, mappings.len());
                    return Ok((true, mappings));
                }
                Ok((false, _)) => {}
                Err(err @ MatchError::SearchTruncated { .. }) => {
                    truncated.get_or_insert(err);
                }
                Err(err) => return Err(err),
            }
        }
        match truncated {
            Some(err) => Err(err),
            None => Ok((false, Vec::new())),
        }
    }

    /// True as soon as one form answers true. A truncated search only
    /// becomes the answer when no other form matched.
    fn across_forms(&self, query: impl Fn(&ChemGraph) -> Result<bool, MatchError>) -> Result<bool, MatchError> {
        let mut truncated = None;
        for (i, form) in self.forms.iter().enumerate() {
            match query(form) {
                Ok(true) => {
                    trace!("Resonance form {} matched", i);
                    return Ok(true);
                }
                Ok(false) => {}
                Err(err @ MatchError::SearchTruncated { .. }) => {
                    truncated.get_or_insert(err);
                }
                Err(err) => return Err(err),
            }
        }
        match truncated {
            Some(err) => Err(err),
            None => Ok(false),
        }
    }
}

impl From<ChemGraph> for Molecule {
    fn from(form: ChemGraph) -> Self {
        Molecule::new(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjlist::{molecule, pattern};
    use crate::Matcher;
    use anyhow::Result;
    use petgraph::graph::NodeIndex;

    /// The allyl radical, with the radical on either end.
    fn allyl() -> Result<Molecule> {
        let left = molecule("1 C 1 {2,S}\n2 C 0 {1,S} {3,D}\n3 C 0 {2,D}")?;
        let right = molecule("1 C 0 {2,D}\n2 C 0 {1,D} {3,S}\n3 C 1 {2,S}")?;
        Ok(Molecule::new(left).with_resonance_form(right))
    }

    #[test]
    fn test_any_form_matches() -> Result<()> {
        let allyl = allyl()?;
        assert_eq!(allyl.resonance_forms().len(), 2);

        // Only the second form carries the radical on the last carbon.
        let radical_end = pattern("1 C 1 {2,S}\n2 C 0 {1,S} {3,D}\n3 C 0 {2,D}")?;
        let seed = Seed::new().pair(NodeIndex::new(2), NodeIndex::new(0));
        assert!(!allyl.primary().is_subgraph_isomorphic(&radical_end, &seed)?);
        assert!(allyl.is_subgraph_isomorphic(&radical_end, &seed)?);

        let (found, mappings) = allyl.find_subgraph_isomorphisms(&radical_end, &seed)?;
        assert!(found);
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].get(&NodeIndex::new(2)), Some(&NodeIndex::new(0)));
        Ok(())
    }

    #[test]
    fn test_no_form_matches() -> Result<()> {
        let allyl = allyl()?;
        let triple = pattern("1 C 0 {2,T}\n2 C 0 {1,T}")?;
        assert!(!allyl.is_subgraph_isomorphic(&triple, &Seed::new())?);
        assert_eq!(allyl.find_subgraph_isomorphisms(&triple, &Seed::new())?, (false, Vec::new()));
        Ok(())
    }

    #[test]
    fn test_isomorphic_through_resonance() -> Result<()> {
        let allyl = allyl()?;
        let right_only = Molecule::from(molecule("1 C 1 {2,S}\n2 C 0 {1,S} {3,D}\n3 C 0 {2,D}")?);
        assert!(allyl.is_isomorphic(&right_only));
        assert!(right_only.is_isomorphic(&allyl));

        let propene = Molecule::from(molecule("1 C 0 {2,S}\n2 C 0 {1,S} {3,D}\n3 C 0 {2,D}")?);
        assert!(!allyl.is_isomorphic(&propene));
        Ok(())
    }

    #[test]
    fn test_invalid_seed_is_an_error() -> Result<()> {
        let allyl = allyl()?;
        let single = pattern("1 C 0 {2,S}\n2 C 0 {1,S}")?;
        let seed = Seed::new().pair(NodeIndex::new(9), NodeIndex::new(0));
        assert!(matches!(
            allyl.is_subgraph_isomorphic(&single, &seed),
            Err(MatchError::InvalidSeed(_))
        ));
        Ok(())
    }

    #[test]
    fn test_truncation_without_match() -> Result<()> {
        let allyl = allyl()?;
        let triple = pattern("1 C 0 {2,T}\n2 C 0 {1,T}")?;
        let result = allyl.across_forms(|form| Matcher::new(form, &triple).budget(1).is_subgraph_isomorphic());
        assert_eq!(result, Err(MatchError::SearchTruncated { steps: 1 }));
        Ok(())
    }
}
