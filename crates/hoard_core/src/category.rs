//! Treasure categories and the set of categories enabled for a run.
//!
//! Categories are the nine treasure-type codes `a`..`i`. On the wire a
//! category is its lowercase letter and a selection is the concatenation of
//! its letters in ascending order (`"abde"`).

use alloc::collections::BTreeSet;
use alloc::string::String;
use core::fmt;
use core::str::FromStr;

use crate::errors::CoreError;

/// One treasure-type code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
}

impl Category {
    /// Every category in canonical order.
    pub const ALL: [Category; 9] = [
        Category::A,
        Category::B,
        Category::C,
        Category::D,
        Category::E,
        Category::F,
        Category::G,
        Category::H,
        Category::I,
    ];

    /// Lowercase wire letter.
    pub const fn code(self) -> char {
        match self {
            Category::A => 'a',
            Category::B => 'b',
            Category::C => 'c',
            Category::D => 'd',
            Category::E => 'e',
            Category::F => 'f',
            Category::G => 'g',
            Category::H => 'h',
            Category::I => 'i',
        }
    }

    /// Parse a single letter; upper case is accepted.
    pub fn from_code(c: char) -> Result<Self, CoreError> {
        match c.to_ascii_lowercase() {
            'a' => Ok(Category::A),
            'b' => Ok(Category::B),
            'c' => Ok(Category::C),
            'd' => Ok(Category::D),
            'e' => Ok(Category::E),
            'f' => Ok(Category::F),
            'g' => Ok(Category::G),
            'h' => Ok(Category::H),
            'i' => Ok(Category::I),
            _ => Err(CoreError::InvalidCategory),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Category {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Category::from_code(c),
            _ => Err(CoreError::InvalidCategory),
        }
    }
}

/// Categories enabled by the user. Only lots in these categories are eligible.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SelectionSet(BTreeSet<Category>);

impl SelectionSet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// All nine categories.
    pub fn all() -> Self {
        Category::ALL.iter().copied().collect()
    }

    pub fn insert(&mut self, c: Category) -> bool {
        self.0.insert(c)
    }

    pub fn remove(&mut self, c: Category) -> bool {
        self.0.remove(&c)
    }

    pub fn contains(&self, c: Category) -> bool {
        self.0.contains(&c)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Categories in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        self.0.iter().copied()
    }

    /// Wire form: letters in canonical order, e.g. `"abde"`.
    pub fn codes(&self) -> String {
        self.0.iter().map(|c| c.code()).collect()
    }
}

impl FromIterator<Category> for SelectionSet {
    fn from_iter<T: IntoIterator<Item = Category>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for SelectionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.codes())
    }
}

/// Parse a code string. Whitespace and commas are ignored, duplicates collapse,
/// anything else outside `a..i` is rejected. The empty string is the empty set.
impl FromStr for SelectionSet {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut out = SelectionSet::new();
        for ch in s.chars() {
            if ch.is_whitespace() || ch == ',' {
                continue;
            }
            out.insert(Category::from_code(ch)?);
        }
        Ok(out)
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::*;
    use serde::de::{self, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for Category {
        fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
            let mut buf = [0u8; 4];
            s.serialize_str(self.code().encode_utf8(&mut buf))
        }
    }

    struct CategoryVisitor;

    impl<'de> Visitor<'de> for CategoryVisitor {
        type Value = Category;
        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a treasure category letter a..i")
        }
        fn visit_str<E: de::Error>(self, v: &str) -> Result<Category, E> {
            v.parse().map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }
    }

    impl<'de> Deserialize<'de> for Category {
        fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
            d.deserialize_str(CategoryVisitor)
        }
    }

    impl Serialize for SelectionSet {
        fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
            s.serialize_str(&self.codes())
        }
    }

    struct SelectionVisitor;

    impl<'de> Visitor<'de> for SelectionVisitor {
        type Value = SelectionSet;
        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string of treasure category letters, e.g. \"abde\"")
        }
        fn visit_str<E: de::Error>(self, v: &str) -> Result<SelectionSet, E> {
            v.parse().map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }
    }

    impl<'de> Deserialize<'de> for SelectionSet {
        fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
            d.deserialize_str(SelectionVisitor)
        }
    }
}
