use std::fmt;
use std::ops::BitOr;

use serde::Serialize;

/// Independent boolean flags carried by a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Attribute {
    /// Moved to index 0 by a user commit rather than by ranking.
    Reranked,
    /// The candidate's key covers only a prefix of the segment key;
    /// `consumed_key_size` holds the covered length.
    PartiallyKeyConsumed,
    /// Learning collaborators must not record this candidate.
    NoLearning,
}

impl Attribute {
    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Set of [`Attribute`]s.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Attributes(u8);

impl Attributes {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn contains(self, attr: Attribute) -> bool {
        self.0 & attr.bit() != 0
    }

    /// Add `attr`. Returns `true` if it was not already present.
    pub fn insert(&mut self, attr: Attribute) -> bool {
        let absent = !self.contains(attr);
        self.0 |= attr.bit();
        absent
    }

    pub fn remove(&mut self, attr: Attribute) {
        self.0 &= !attr.bit();
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Attribute> {
        [
            Attribute::Reranked,
            Attribute::PartiallyKeyConsumed,
            Attribute::NoLearning,
        ]
        .into_iter()
        .filter(move |a| self.contains(*a))
    }
}

impl From<Attribute> for Attributes {
    fn from(attr: Attribute) -> Self {
        Self(attr.bit())
    }
}

impl BitOr<Attribute> for Attributes {
    type Output = Attributes;

    fn bitor(mut self, rhs: Attribute) -> Attributes {
        self.insert(rhs);
        self
    }
}

impl BitOr for Attribute {
    type Output = Attributes;

    fn bitor(self, rhs: Attribute) -> Attributes {
        Attributes::from(self) | rhs
    }
}

impl fmt::Debug for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Serialize for Attributes {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// One proposed value for a segment.
///
/// Costs are opaque ranking scores (lower is better). POS id `0` means the
/// grammar class has not been resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub key: String,
    pub value: String,
    pub content_key: String,
    pub content_value: String,
    pub cost: i32,
    pub word_cost: i32,
    pub structure_cost: i32,
    pub left_id: u16,
    pub right_id: u16,
    pub attributes: Attributes,
    /// Characters of the segment key consumed by this candidate. Meaningful
    /// only with [`Attribute::PartiallyKeyConsumed`].
    pub consumed_key_size: usize,
}

impl Candidate {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        Self {
            content_key: key.clone(),
            content_value: value.clone(),
            key,
            value,
            ..Self::default()
        }
    }

    /// Both grammar-class ids are resolved.
    pub fn has_pos_ids(&self) -> bool {
        self.left_id != 0 && self.right_id != 0
    }

    /// Mark the candidate as partially consuming the segment key, unless a
    /// previous step already did. The first recorded size wins.
    pub fn maybe_set_consumed_key_size(&mut self, consumed_key_size: usize) {
        if self.attributes.insert(Attribute::PartiallyKeyConsumed) {
            self.consumed_key_size = consumed_key_size;
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}) cost={} lid={} rid={}",
            self.value, self.key, self.cost, self.left_id, self.right_id
        )
    }
}
