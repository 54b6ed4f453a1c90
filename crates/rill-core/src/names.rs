//! Identifier interning.
//!
//! Every identifier the compiler keeps around long-term (global symbols,
//! scope-frame keys, type names, aggregate members) is interned into a
//! [`NameTable`] and handled as a [`Name`]. Comparing two `Name`s is an O(1)
//! integer comparison, which is what the symbol table and scope frames key on.

use std::collections::HashMap;

/// A lightweight handle to an interned identifier.
///
/// Ordered by insertion order, not lexicographically; resolve through the
/// table if string ordering is needed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, serde::Serialize)]
pub struct Name(u32);

impl Name {
    /// Raw index, for debugging output.
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Identifier interner. Deduplicates strings and hands out cheap [`Name`]s.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    map: HashMap<String, Name>,
    strings: Vec<String>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning its `Name`. Idempotent.
    pub fn intern(&mut self, s: &str) -> Name {
        if let Some(&name) = self.map.get(s) {
            return name;
        }

        let name = Name(self.strings.len() as u32);
        self.strings.push(s.to_owned());
        self.map.insert(s.to_owned(), name);
        name
    }

    /// Look up a string without interning it.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.map.get(s).copied()
    }

    /// Resolve a `Name` back to its string.
    ///
    /// # Panics
    /// Panics if the name was not created by this table.
    #[inline]
    pub fn resolve(&self, name: Name) -> &str {
        &self.strings[name.0 as usize]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// All interned names with their strings, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Name, &str)> {
        self.strings
            .iter()
            .enumerate()
            .map(|(i, s)| (Name(i as u32), s.as_str()))
    }
}
