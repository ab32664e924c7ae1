//! Repository configuration.

use idm_core::query::Expression;
use idm_core::Dn;
use serde::{Deserialize, Serialize};

use crate::error::{LdapDaoError, LdapDaoResult};
use crate::filter::to_ldap_filter;

/// LDAP search scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchScope {
    /// Search only the base DN.
    Base,
    /// Search one level below the base DN.
    OneLevel,
    /// Search the entire subtree.
    #[default]
    Subtree,
}

impl SearchScope {
    /// Converts to the ldap3 scope.
    #[must_use]
    pub const fn to_ldap3(self) -> ldap3::Scope {
        match self {
            Self::Base => ldap3::Scope::Base,
            Self::OneLevel => ldap3::Scope::OneLevel,
            Self::Subtree => ldap3::Scope::Subtree,
        }
    }
}

/// Configuration of the LDAP user repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LdapDaoConfig {
    /// Directory server URL.
    pub connection_url: String,

    /// Bind DN for the service account.
    pub bind_dn: String,

    /// Bind credential.
    #[serde(skip_serializing)]
    pub bind_credential: String,

    /// Base DN user entries live under.
    pub users_base_dn: Dn,

    /// Scope of user searches below the base DN.
    pub search_scope: SearchScope,

    /// Entries fetched per paged-search round trip.
    pub page_size: i32,

    /// Hard cap on the number of results a bounded search may yield;
    /// `0` means unlimited.
    pub max_search_results: usize,

    /// Whether the repository rejects mutations.
    pub read_only: bool,
}

impl LdapDaoConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> LdapDaoConfigBuilder {
        LdapDaoConfigBuilder::new()
    }

    /// The filter matching every user entry.
    #[must_use]
    pub fn user_base_filter(&self) -> String {
        "(objectClass=inetOrgPerson)".to_string()
    }

    /// The filter matching user entries that satisfy `query` (`None` matches
    /// every user).
    #[must_use]
    pub fn user_filter(&self, query: Option<&Expression>) -> String {
        let base = self.user_base_filter();
        match query {
            Some(expression) => format!("(&{base}{})", to_ldap_filter(expression)),
            None => base,
        }
    }
}

/// Builder for [`LdapDaoConfig`].
#[derive(Debug, Default)]
pub struct LdapDaoConfigBuilder {
    connection_url: Option<String>,
    bind_dn: Option<String>,
    bind_credential: Option<String>,
    users_base_dn: Option<Dn>,
    search_scope: SearchScope,
    page_size: i32,
    max_search_results: usize,
    read_only: bool,
}

impl LdapDaoConfigBuilder {
    /// Creates a builder with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            page_size: 100,
            ..Default::default()
        }
    }

    /// Sets the directory server URL.
    #[must_use]
    pub fn connection_url(mut self, url: impl Into<String>) -> Self {
        self.connection_url = Some(url.into());
        self
    }

    /// Sets the bind DN.
    #[must_use]
    pub fn bind_dn(mut self, dn: impl Into<String>) -> Self {
        self.bind_dn = Some(dn.into());
        self
    }

    /// Sets the bind credential.
    #[must_use]
    pub fn bind_credential(mut self, credential: impl Into<String>) -> Self {
        self.bind_credential = Some(credential.into());
        self
    }

    /// Sets the base DN user entries live under.
    #[must_use]
    pub fn users_base_dn(mut self, dn: Dn) -> Self {
        self.users_base_dn = Some(dn);
        self
    }

    /// Sets the search scope.
    #[must_use]
    pub const fn search_scope(mut self, scope: SearchScope) -> Self {
        self.search_scope = scope;
        self
    }

    /// Sets the paged-search page size.
    #[must_use]
    pub const fn page_size(mut self, size: i32) -> Self {
        self.page_size = size;
        self
    }

    /// Sets the bounded-search result cap (`0` = unlimited).
    #[must_use]
    pub const fn max_search_results(mut self, max: usize) -> Self {
        self.max_search_results = max;
        self
    }

    /// Marks the repository read-only.
    #[must_use]
    pub const fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Validates and builds the configuration.
    ///
    /// ## Errors
    ///
    /// Returns a configuration error when the URL is missing or not an LDAP
    /// scheme, when the users base DN is missing or the directory root, or
    /// when the page size is not positive.
    pub fn build(self) -> LdapDaoResult<LdapDaoConfig> {
        let connection_url = self
            .connection_url
            .ok_or_else(|| LdapDaoError::config("connection_url is required"))?;
        let lower = connection_url.to_lowercase();
        if !lower.starts_with("ldap://") && !lower.starts_with("ldaps://") {
            return Err(LdapDaoError::config(
                "connection_url must use the ldap:// or ldaps:// scheme",
            ));
        }

        let users_base_dn = self
            .users_base_dn
            .ok_or_else(|| LdapDaoError::config("users_base_dn is required"))?;
        if users_base_dn.components().is_empty() {
            return Err(LdapDaoError::config(
                "users_base_dn must not be the directory root",
            ));
        }

        if self.page_size <= 0 {
            return Err(LdapDaoError::config("page_size must be positive"));
        }

        Ok(LdapDaoConfig {
            connection_url,
            bind_dn: self.bind_dn.unwrap_or_default(),
            bind_credential: self.bind_credential.unwrap_or_default(),
            users_base_dn,
            search_scope: self.search_scope,
            page_size: self.page_size,
            max_search_results: self.max_search_results,
            read_only: self.read_only,
        })
    }
}

#[cfg(test)]
mod tests {
    use idm_core::query::SearchAttribute;

    use super::*;

    fn base_dn() -> Dn {
        Dn::ROOT.child("dc", "example").child("ou", "People")
    }

    #[test]
    fn builder_applies_defaults() {
        let config = LdapDaoConfig::builder()
            .connection_url("ldaps://ds.example.org:636")
            .users_base_dn(base_dn())
            .build()
            .unwrap();

        assert_eq!(config.page_size, 100);
        assert_eq!(config.max_search_results, 0);
        assert_eq!(config.search_scope, SearchScope::Subtree);
        assert!(!config.read_only);
    }

    #[test]
    fn rejects_non_ldap_scheme() {
        let result = LdapDaoConfig::builder()
            .connection_url("https://ds.example.org")
            .users_base_dn(base_dn())
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn rejects_root_base_dn() {
        let result = LdapDaoConfig::builder()
            .connection_url("ldaps://ds.example.org:636")
            .users_base_dn(Dn::ROOT)
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn user_filter_composes_the_query() {
        let config = LdapDaoConfig::builder()
            .connection_url("ldaps://ds.example.org:636")
            .users_base_dn(base_dn())
            .build()
            .unwrap();

        assert_eq!(config.user_filter(None), "(objectClass=inetOrgPerson)");

        let query = Expression::eq(SearchAttribute::Email, "jane@example.com");
        assert_eq!(
            config.user_filter(Some(&query)),
            "(&(objectClass=inetOrgPerson)(uid=jane@example.com))"
        );
    }
}
