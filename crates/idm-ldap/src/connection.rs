//! Directory connection abstraction.
//!
//! The repository consumes the directory through [`DirectoryConnection`]:
//! one paged-search execution plus the write operations the repository
//! needs. [`LdapDirectory`] adapts a blocking `ldap3` connection to the
//! trait; tests substitute an in-memory fake.

use std::collections::HashSet;

use ldap3::controls::{Control, ControlType, PagedResults};
use ldap3::{LdapConn, SearchEntry};

use crate::config::{LdapDaoConfig, SearchScope};
use crate::entry::Entry;
use crate::error::{LdapDaoError, LdapDaoResult};

/// One search execution, minus the paging control.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Base DN of the search, wire form.
    pub base_dn: String,
    /// Search scope below the base.
    pub scope: SearchScope,
    /// Wire filter string.
    pub filter: String,
    /// Attributes to return; empty requests all user attributes.
    pub attributes: Vec<String>,
}

impl SearchRequest {
    /// Creates a request returning all user attributes.
    #[must_use]
    pub fn new(base_dn: impl Into<String>, scope: SearchScope, filter: impl Into<String>) -> Self {
        Self {
            base_dn: base_dn.into(),
            scope,
            filter: filter.into(),
            attributes: Vec::new(),
        }
    }
}

/// One page of search results plus the continuation token for the next.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Entries of this page.
    pub entries: Vec<Entry>,
    /// Continuation token; absent or empty when this page is the last.
    pub cookie: Option<Vec<u8>>,
}

/// A modification of one attribute of one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeChange {
    /// Replace all values of the attribute.
    Replace(String, Vec<String>),
    /// Add values to the attribute.
    Add(String, Vec<String>),
    /// Delete the given values, or the whole attribute when empty.
    Delete(String, Vec<String>),
}

/// The directory operations the repository requires.
pub trait DirectoryConnection {
    /// Whether the connection is established and usable.
    fn is_open(&self) -> bool;

    /// Executes one paged search carrying the given continuation token
    /// (absent on the first page) and returns the page plus the next token.
    fn search_page(
        &mut self,
        request: &SearchRequest,
        page_size: i32,
        cookie: Option<&[u8]>,
    ) -> LdapDaoResult<Page>;

    /// Adds a new entry.
    fn add(&mut self, dn: &str, attributes: Vec<(String, Vec<String>)>) -> LdapDaoResult<()>;

    /// Applies attribute modifications to an entry.
    fn modify(&mut self, dn: &str, changes: Vec<AttributeChange>) -> LdapDaoResult<()>;

    /// Renames an entry in place, replacing its leaf RDN.
    fn rename(&mut self, dn: &str, new_rdn: &str) -> LdapDaoResult<()>;
}

/// Blocking `ldap3`-backed directory connection.
pub struct LdapDirectory {
    conn: LdapConn,
    open: bool,
}

impl LdapDirectory {
    /// Connects and binds with the configured service account.
    pub fn connect(config: &LdapDaoConfig) -> LdapDaoResult<Self> {
        let mut conn = LdapConn::new(&config.connection_url).map_err(LdapDaoError::from_ldap)?;
        conn.simple_bind(&config.bind_dn, &config.bind_credential)
            .map_err(LdapDaoError::from_ldap)?
            .success()
            .map_err(LdapDaoError::from_ldap)?;
        Ok(Self { conn, open: true })
    }

    /// Unbinds and closes the connection.
    pub fn close(mut self) -> LdapDaoResult<()> {
        self.open = false;
        self.conn.unbind().map_err(LdapDaoError::from_ldap)
    }
}

impl DirectoryConnection for LdapDirectory {
    fn is_open(&self) -> bool {
        self.open
    }

    fn search_page(
        &mut self,
        request: &SearchRequest,
        page_size: i32,
        cookie: Option<&[u8]>,
    ) -> LdapDaoResult<Page> {
        let control = PagedResults {
            size: page_size,
            cookie: cookie.unwrap_or_default().to_vec(),
        };

        let (entries, result) = self
            .conn
            .with_controls(control)
            .search(
                &request.base_dn,
                request.scope.to_ldap3(),
                &request.filter,
                request.attributes.clone(),
            )
            .map_err(LdapDaoError::from_ldap)?
            .success()
            .map_err(LdapDaoError::from_ldap)?;

        let entries = entries
            .into_iter()
            .map(SearchEntry::construct)
            .map(Entry::from_search_entry)
            .collect();

        let mut next_cookie = None;
        for control in result.ctrls {
            if let Control(Some(ControlType::PagedResults), ref raw) = control {
                let paged: PagedResults = raw.parse();
                if !paged.cookie.is_empty() {
                    next_cookie = Some(paged.cookie);
                }
            }
        }

        Ok(Page {
            entries,
            cookie: next_cookie,
        })
    }

    fn add(&mut self, dn: &str, attributes: Vec<(String, Vec<String>)>) -> LdapDaoResult<()> {
        let attrs: Vec<(String, HashSet<String>)> = attributes
            .into_iter()
            .map(|(name, values)| (name, values.into_iter().collect()))
            .collect();

        self.conn
            .add(dn, attrs)
            .map_err(LdapDaoError::from_ldap)?
            .success()
            .map_err(LdapDaoError::from_ldap)?;
        Ok(())
    }

    fn modify(&mut self, dn: &str, changes: Vec<AttributeChange>) -> LdapDaoResult<()> {
        let mods: Vec<ldap3::Mod<String>> = changes
            .into_iter()
            .map(|change| match change {
                AttributeChange::Replace(name, values) => {
                    ldap3::Mod::Replace(name, values.into_iter().collect())
                }
                AttributeChange::Add(name, values) => {
                    ldap3::Mod::Add(name, values.into_iter().collect())
                }
                AttributeChange::Delete(name, values) => {
                    ldap3::Mod::Delete(name, values.into_iter().collect())
                }
            })
            .collect();

        self.conn
            .modify(dn, mods)
            .map_err(LdapDaoError::from_ldap)?
            .success()
            .map_err(LdapDaoError::from_ldap)?;
        Ok(())
    }

    fn rename(&mut self, dn: &str, new_rdn: &str) -> LdapDaoResult<()> {
        self.conn
            .modifydn(dn, new_rdn, true, None)
            .map_err(LdapDaoError::from_ldap)?
            .success()
            .map_err(LdapDaoError::from_ldap)?;
        Ok(())
    }
}
