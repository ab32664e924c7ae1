//! Distinguished names.
//!
//! A [`Dn`] addresses one entry in the directory tree as an ordered list of
//! typed components, root first. Directory servers compare names without
//! regard to case, so component equality, hashing, and ordering are all
//! case-insensitive.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::group::Group;

/// One `type=value` pair within a distinguished name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnComponent {
    /// Attribute type (e.g. `ou`, `cn`).
    pub attr_type: String,
    /// Attribute value.
    pub value: String,
}

impl DnComponent {
    /// Creates a new component.
    #[must_use]
    pub fn new(attr_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attr_type: attr_type.into(),
            value: value.into(),
        }
    }
}

impl PartialEq for DnComponent {
    fn eq(&self, other: &Self) -> bool {
        self.attr_type.eq_ignore_ascii_case(&other.attr_type)
            && self.value.eq_ignore_ascii_case(&other.value)
    }
}

impl Eq for DnComponent {}

impl Hash for DnComponent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.attr_type.to_ascii_lowercase().hash(state);
        self.value.to_ascii_lowercase().hash(state);
    }
}

impl Ord for DnComponent {
    fn cmp(&self, other: &Self) -> Ordering {
        let value = self
            .value
            .to_ascii_lowercase()
            .cmp(&other.value.to_ascii_lowercase());
        match value {
            Ordering::Equal => self
                .attr_type
                .to_ascii_lowercase()
                .cmp(&other.attr_type.to_ascii_lowercase()),
            ordering => ordering,
        }
    }
}

impl PartialOrd for DnComponent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A distinguished name: the hierarchical identifier of a directory entry.
///
/// Immutable once constructed; every derivation ([`Dn::descendant`],
/// [`Dn::child`], [`Dn::parent`]) returns a new value. The empty name is the
/// directory root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dn {
    components: Vec<DnComponent>,
}

impl Dn {
    /// The directory root (no components).
    pub const ROOT: Self = Self {
        components: Vec::new(),
    };

    /// Creates a name from a root-to-leaf component sequence.
    #[must_use]
    pub fn new(components: Vec<DnComponent>) -> Self {
        Self { components }
    }

    /// The root-to-leaf component sequence.
    #[must_use]
    pub fn components(&self) -> &[DnComponent] {
        &self.components
    }

    /// The value of the leaf component, or `None` for the root.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.components.last().map(|c| c.value.as_str())
    }

    /// Whether this name sits strictly below `ancestor` in the tree.
    #[must_use]
    pub fn is_descendant_of(&self, ancestor: &Self) -> bool {
        ancestor.components.len() < self.components.len()
            && self.is_descendant_of_or_equal_to(ancestor)
    }

    /// Whether this name sits below `ancestor`, or is `ancestor` itself.
    #[must_use]
    pub fn is_descendant_of_or_equal_to(&self, ancestor: &Self) -> bool {
        ancestor.components.len() <= self.components.len()
            && ancestor.components == self.components[..ancestor.components.len()]
    }

    /// Whether `descendant` sits strictly below this name.
    #[must_use]
    pub fn is_ancestor_of(&self, descendant: &Self) -> bool {
        descendant.is_descendant_of(self)
    }

    /// Whether `descendant` sits below this name, or is this name itself.
    #[must_use]
    pub fn is_ancestor_of_or_equal_to(&self, descendant: &Self) -> bool {
        descendant.is_descendant_of_or_equal_to(self)
    }

    /// Returns a new name extending this one with the given components.
    #[must_use]
    pub fn descendant(&self, components: impl IntoIterator<Item = DnComponent>) -> Self {
        let mut extended = self.components.clone();
        extended.extend(components);
        Self::new(extended)
    }

    /// Returns the single-component descendant `type=value`.
    #[must_use]
    pub fn child(&self, attr_type: impl Into<String>, value: impl Into<String>) -> Self {
        self.descendant([DnComponent::new(attr_type, value)])
    }

    /// Returns the name with the leaf component removed, or `None` for the
    /// root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        match self.components.split_last() {
            Some((_, parents)) => Some(Self::new(parents.to_vec())),
            None => None,
        }
    }

    /// Reinterprets this name as a group identity.
    #[must_use]
    pub fn as_group(&self) -> Group {
        Group::new(self.clone())
    }
}

impl Ord for Dn {
    fn cmp(&self, other: &Self) -> Ordering {
        // component-wise, with a shorter prefix sorting before its extensions
        self.components
            .iter()
            .zip(&other.components)
            .map(|(a, b)| a.cmp(b))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or_else(|| self.components.len().cmp(&other.components.len()))
    }
}

impl PartialOrd for Dn {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromIterator<DnComponent> for Dn {
    fn from_iter<I: IntoIterator<Item = DnComponent>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
