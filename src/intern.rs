use std::{
    cmp::Ordering,
    collections::HashMap,
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    hash::{Hash, Hasher},
    sync::{Arc, RwLock},
};

use lazy_static::lazy_static;

lazy_static! {
    static ref INTERNED_LABELS: RwLock<HashMap<String, Label>> = RwLock::new(HashMap::new());
}

/// An atom label such as `*` or `*1`, interned so that the same text is
/// shared by every graph that uses it.
#[derive(Clone)]
pub struct Label(Arc<str>);

impl Label {
    pub fn new(text: &str) -> Self {
        if let Ok(labels) = INTERNED_LABELS.read() {
            if let Some(label) = labels.get(text) {
                return label.clone();
            }
        }

        let label = Label(Arc::from(text));
        match INTERNED_LABELS.write() {
            Ok(mut labels) => labels.entry(text.to_string()).or_insert(label).clone(),
            // A poisoned table still hands out a usable, uninterned label.
            Err(_) => label,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label::new(s)
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Label::new(&s)
    }
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for Label {}

impl Hash for Label {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl PartialOrd for Label {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Label {
    fn cmp(&self, other: &Self) -> Ordering {
        if Arc::ptr_eq(&self.0, &other.0) {
            return Ordering::Equal;
        }
        self.0.cmp(&other.0)
    }
}

impl Debug for Label {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Label {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
