use std::fmt::{Debug, Display, Formatter, Result as FmtResult};

/// The elements a chemical graph can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Element {
    H,
    B,
    C,
    N,
    O,
    F,
    Si,
    P,
    S,
    Cl,
    As,
    Br,
    I,
}

impl Element {
    pub const ALL: [Element; 13] = [
        Element::H,
        Element::B,
        Element::C,
        Element::N,
        Element::O,
        Element::F,
        Element::Si,
        Element::P,
        Element::S,
        Element::Cl,
        Element::As,
        Element::Br,
        Element::I,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Element::H => "H",
            Element::B => "B",
            Element::C => "C",
            Element::N => "N",
            Element::O => "O",
            Element::F => "F",
            Element::Si => "Si",
            Element::P => "P",
            Element::S => "S",
            Element::Cl => "Cl",
            Element::As => "As",
            Element::Br => "Br",
            Element::I => "I",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|e| e.symbol() == symbol)
    }

    pub fn is_hydrogen(&self) -> bool {
        *self == Element::H
    }

    fn bit(&self) -> u32 {
        1 << (*self as u32)
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.symbol())
    }
}

/// A set of admissible elements, stored as a bit set.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ElementSet(u32);

impl ElementSet {
    pub const fn empty() -> Self {
        ElementSet(0)
    }

    /// Every element.
    pub fn all() -> Self {
        Element::ALL.iter().copied().collect()
    }

    /// Every element except hydrogen.
    pub fn heavy() -> Self {
        Element::ALL.iter().copied().filter(|e| !e.is_hydrogen()).collect()
    }

    pub fn single(element: Element) -> Self {
        ElementSet(element.bit())
    }

    pub fn insert(&mut self, element: Element) {
        self.0 |= element.bit();
    }

    pub fn contains(&self, element: Element) -> bool {
        self.0 & element.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn intersects(&self, other: &ElementSet) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_subset(&self, other: &ElementSet) -> bool {
        self.0 & !other.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Element> + '_ {
        Element::ALL.iter().copied().filter(move |e| self.contains(*e))
    }
}

impl FromIterator<Element> for ElementSet {
    fn from_iter<T: IntoIterator<Item = Element>>(iter: T) -> Self {
        let mut set = ElementSet::empty();
        for element in iter {
            set.insert(element);
        }
        set
    }
}

impl Debug for ElementSet {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    pub const ALL: [BondOrder; 4] = [
        BondOrder::Single,
        BondOrder::Double,
        BondOrder::Triple,
        BondOrder::Aromatic,
    ];

    /// The one-letter code used in adjacency lists.
    pub fn code(&self) -> char {
        match self {
            BondOrder::Single => 'S',
            BondOrder::Double => 'D',
            BondOrder::Triple => 'T',
            BondOrder::Aromatic => 'B',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        Self::ALL.iter().copied().find(|order| order.code() == code)
    }

    fn bit(&self) -> u8 {
        1 << (*self as u8)
    }
}

/// A set of admissible bond orders.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BondOrderSet(u8);

impl BondOrderSet {
    pub const fn empty() -> Self {
        BondOrderSet(0)
    }

    pub fn all() -> Self {
        BondOrder::ALL.iter().copied().collect()
    }

    pub fn single(order: BondOrder) -> Self {
        BondOrderSet(order.bit())
    }

    pub fn insert(&mut self, order: BondOrder) {
        self.0 |= order.bit();
    }

    pub fn contains(&self, order: BondOrder) -> bool {
        self.0 & order.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn intersects(&self, other: &BondOrderSet) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_subset(&self, other: &BondOrderSet) -> bool {
        self.0 & !other.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = BondOrder> + '_ {
        BondOrder::ALL.iter().copied().filter(move |o| self.contains(*o))
    }
}

impl FromIterator<BondOrder> for BondOrderSet {
    fn from_iter<T: IntoIterator<Item = BondOrder>>(iter: T) -> Self {
        let mut set = BondOrderSet::empty();
        for order in iter {
            set.insert(order);
        }
        set
    }
}

impl Debug for BondOrderSet {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.debug_set().entries(self.iter()).finish()
    }
}
