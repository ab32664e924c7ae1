//! Group identities.
//!
//! A group has no state of its own in the directory model: its distinguished
//! name *is* its durable key. [`Group`] is the typed view of a [`Dn`] used
//! wherever the domain talks about membership.

use serde::{Deserialize, Serialize};

use crate::dn::Dn;

/// A group identity backed by a distinguished name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Group {
    dn: Dn,
}

impl Group {
    /// Creates a group view of the given name.
    #[must_use]
    pub const fn new(dn: Dn) -> Self {
        Self { dn }
    }

    /// The underlying distinguished name.
    #[must_use]
    pub const fn dn(&self) -> &Dn {
        &self.dn
    }

    /// The group's display name: the value of the leaf component.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.dn.name()
    }
}

impl From<Dn> for Group {
    fn from(dn: Dn) -> Self {
        Self::new(dn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_is_a_view_of_its_dn() {
        let dn = Dn::ROOT.child("ou", "Groups").child("cn", "Admins");
        let group = dn.as_group();

        assert_eq!(group.dn(), &dn);
        assert_eq!(group.name(), Some("Admins"));
        assert_eq!(group, Group::from(dn));
    }

    #[test]
    fn group_equality_ignores_case() {
        let a = Dn::ROOT.child("ou", "groups").child("cn", "admins").as_group();
        let b = Dn::ROOT.child("OU", "Groups").child("CN", "Admins").as_group();
        assert_eq!(a, b);
    }
}
