use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::{BondOrder, BondOrderSet, Element, ElementSet, Label};

/// What an atom may be: one element, or a set of admissible elements.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomType {
    Concrete(Element),
    Pattern { elements: ElementSet, wildcard: bool },
}

impl AtomType {
    /// The elements this type admits.
    pub fn admissible(&self) -> ElementSet {
        match self {
            AtomType::Concrete(element) => ElementSet::single(*element),
            AtomType::Pattern { wildcard: true, .. } => ElementSet::all(),
            AtomType::Pattern { elements, .. } => *elements,
        }
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, AtomType::Pattern { .. })
    }

    fn equivalent(&self, other: &AtomType) -> bool {
        match (self, other) {
            (AtomType::Concrete(a), AtomType::Concrete(b)) => a == b,
            (AtomType::Concrete(element), pattern) | (pattern, AtomType::Concrete(element)) => {
                pattern.admissible().contains(*element)
            }
            _ => self.admissible() == other.admissible(),
        }
    }
}

impl Debug for AtomType {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            AtomType::Concrete(element) => write!(f, "{}", element),
            AtomType::Pattern { wildcard: true, .. } => write!(f, "R"),
            AtomType::Pattern { elements, .. } if *elements == ElementSet::heavy() => write!(f, "R!H"),
            AtomType::Pattern { elements, .. } => write!(f, "{:?}", elements),
        }
    }
}

/// A vertex of a chemical graph.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    pub kind: AtomType,
    pub radical_electrons: u8,
    pub charge: i8,
    pub label: Option<Label>,
}

impl Atom {
    pub fn new(element: Element) -> Self {
        Self::with_kind(AtomType::Concrete(element))
    }

    /// A pattern atom admitting any element of `elements`, which must not
    /// be empty.
    pub fn pattern(elements: ElementSet) -> Self {
        debug_assert!(!elements.is_empty(), "a pattern atom must admit at least one element");
        Self::with_kind(AtomType::Pattern { elements, wildcard: false })
    }

    /// The `R` wildcard: any atom at all.
    pub fn any() -> Self {
        Self::with_kind(AtomType::Pattern { elements: ElementSet::all(), wildcard: true })
    }

    /// The `R!H` wildcard: any atom except hydrogen.
    pub fn any_heavy() -> Self {
        Self::pattern(ElementSet::heavy())
    }

    fn with_kind(kind: AtomType) -> Self {
        Atom {
            kind,
            radical_electrons: 0,
            charge: 0,
            label: None,
        }
    }

    pub fn radicals(mut self, radical_electrons: u8) -> Self {
        self.radical_electrons = radical_electrons;
        self
    }

    pub fn charged(mut self, charge: i8) -> Self {
        self.charge = charge;
        self
    }

    pub fn labeled(mut self, label: impl Into<Label>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn element(&self) -> Option<Element> {
        match self.kind {
            AtomType::Concrete(element) => Some(element),
            AtomType::Pattern { .. } => None,
        }
    }

    pub fn is_hydrogen(&self) -> bool {
        self.element() == Some(Element::H)
    }

    pub fn is_carbon(&self) -> bool {
        self.element() == Some(Element::C)
    }

    /// Do these two atoms describe the same thing?
    ///
    /// Radical count and charge must agree. Two concrete atoms need the same
    /// element and two pattern atoms the same admissible set. A concrete
    /// atom is equivalent to a pattern atom that admits its element.
    pub fn equivalent(&self, other: &Atom) -> bool {
        self.radical_electrons == other.radical_electrons
            && self.charge == other.charge
            && self.kind.equivalent(&other.kind)
    }

    /// Is every atom described by `self` also described by `general`?
    pub fn is_specific_case_of(&self, general: &Atom) -> bool {
        self.radical_electrons == general.radical_electrons
            && self.charge == general.charge
            && self.kind.admissible().is_subset(&general.kind.admissible())
    }
}

impl From<Element> for Atom {
    fn from(element: Element) -> Self {
        Atom::new(element)
    }
}

impl Debug for Atom {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        if let Some(label) = &self.label {
            write!(f, "{} ", label)?;
        }
        write!(f, "{:?}", self.kind)?;
        if self.radical_electrons > 0 {
            write!(f, "{}", ".".repeat(self.radical_electrons as usize))?;
        }
        match self.charge {
            0 => Ok(()),
            c if c > 0 => write!(f, "+{}", c),
            c => write!(f, "{}", c),
        }
    }
}

/// An edge of a chemical graph.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bond {
    Concrete(BondOrder),
    Pattern(BondOrderSet),
}

impl Bond {
    pub fn single() -> Self {
        Bond::Concrete(BondOrder::Single)
    }

    pub fn double() -> Self {
        Bond::Concrete(BondOrder::Double)
    }

    pub fn triple() -> Self {
        Bond::Concrete(BondOrder::Triple)
    }

    pub fn aromatic() -> Self {
        Bond::Concrete(BondOrder::Aromatic)
    }

    /// A pattern bond admitting any of `orders`, which must not be empty.
    pub fn pattern(orders: impl IntoIterator<Item = BondOrder>) -> Self {
        let orders: BondOrderSet = orders.into_iter().collect();
        debug_assert!(!orders.is_empty(), "a pattern bond must admit at least one order");
        Bond::Pattern(orders)
    }

    pub fn order(&self) -> Option<BondOrder> {
        match self {
            Bond::Concrete(order) => Some(*order),
            Bond::Pattern(_) => None,
        }
    }

    pub fn admissible(&self) -> BondOrderSet {
        match self {
            Bond::Concrete(order) => BondOrderSet::single(*order),
            Bond::Pattern(orders) => *orders,
        }
    }

    /// Same rule as [`Atom::equivalent`]: equal orders, equal sets, or a
    /// pattern admitting the concrete order.
    pub fn equivalent(&self, other: &Bond) -> bool {
        match (self, other) {
            (Bond::Concrete(a), Bond::Concrete(b)) => a == b,
            (Bond::Concrete(order), Bond::Pattern(orders)) | (Bond::Pattern(orders), Bond::Concrete(order)) => {
                orders.contains(*order)
            }
            (Bond::Pattern(a), Bond::Pattern(b)) => a == b,
        }
    }

    pub fn is_specific_case_of(&self, general: &Bond) -> bool {
        self.admissible().is_subset(&general.admissible())
    }
}

impl From<BondOrder> for Bond {
    fn from(order: BondOrder) -> Self {
        Bond::Concrete(order)
    }
}

impl Debug for Bond {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Bond::Concrete(order) => write!(f, "{}", order.code()),
            Bond::Pattern(orders) => {
                let codes: String = orders.iter().map(|o| o.code()).collect();
                write!(f, "{{{}}}", codes)
            }
        }
    }
}
