//! Directory entries.
//!
//! An [`Entry`] is the flat multi-valued attribute set exchanged with the
//! directory, addressed by its distinguished name in wire form.

use std::collections::HashMap;

use ldap3::SearchEntry;

/// One directory entry: a wire DN plus its attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    /// Distinguished name, wire form.
    pub dn: String,

    /// Attributes; every value is multi-valued on the wire.
    pub attributes: HashMap<String, Vec<String>>,
}

impl Entry {
    /// Creates an empty entry addressed by `dn`.
    #[must_use]
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attributes: HashMap::new(),
        }
    }

    /// Converts an `ldap3` search result entry.
    #[must_use]
    pub fn from_search_entry(entry: SearchEntry) -> Self {
        Self {
            dn: entry.dn,
            attributes: entry.attrs,
        }
    }

    /// The first value of an attribute.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values of an attribute, empty when absent.
    #[must_use]
    pub fn attrs(&self, name: &str) -> &[String] {
        self.attributes.get(name).map_or(&[], Vec::as_slice)
    }

    /// Whether the entry carries an attribute.
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Sets an attribute, dropping it entirely when `values` is empty.
    pub fn set_attr(&mut self, name: impl Into<String>, values: Vec<String>) {
        let name = name.into();
        if values.is_empty() {
            self.attributes.remove(&name);
        } else {
            self.attributes.insert(name, values);
        }
    }
}
