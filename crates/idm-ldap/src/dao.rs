//! LDAP user repository.
//!
//! [`LdapUserDao`] orchestrates the mapper, the filter translator, the
//! attribute mask, and the paginated search cursor over one directory
//! connection. Searches run one cursor per request; updates are masked so a
//! stale in-memory snapshot can only touch the wire attributes its intents
//! cover.

use std::sync::mpsc::SyncSender;

use idm_core::query::{Expression, SearchAttribute};
use idm_core::{DaoResult, Dn, Group, User, UserAttr, UserDao};
use tracing::debug;

use crate::attributes;
use crate::config::LdapDaoConfig;
use crate::connection::{AttributeChange, DirectoryConnection, SearchRequest};
use crate::dn_format::dn_to_wire;
use crate::entry::Entry;
use crate::error::{LdapDaoError, LdapDaoResult};
use crate::mapper::UserEntryMapper;
use crate::mask::attribute_mask;
use crate::search::PagedSearchIterator;

/// LDAP-backed implementation of the [`UserDao`] contract.
pub struct LdapUserDao<C: DirectoryConnection> {
    config: LdapDaoConfig,
    mapper: UserEntryMapper,
    conn: C,
}

impl<C: DirectoryConnection> LdapUserDao<C> {
    /// Creates a repository over an established connection.
    #[must_use]
    pub fn new(config: LdapDaoConfig, conn: C) -> Self {
        let mapper = UserEntryMapper::new(config.users_base_dn.clone());
        Self {
            config,
            mapper,
            conn,
        }
    }

    /// The repository configuration.
    #[must_use]
    pub fn config(&self) -> &LdapDaoConfig {
        &self.config
    }

    /// Consumes the repository, handing back the underlying connection.
    #[must_use]
    pub fn into_connection(self) -> C {
        self.conn
    }

    fn assert_writable(&self) -> LdapDaoResult<()> {
        if self.config.read_only {
            return Err(LdapDaoError::ReadOnly);
        }
        Ok(())
    }

    fn search_request(&self, query: Option<&Expression>) -> SearchRequest {
        SearchRequest::new(
            dn_to_wire(&self.config.users_base_dn),
            self.config.search_scope,
            self.config.user_filter(query),
        )
    }

    /// Opens a cursor over the users matching `query`, mapping each entry
    /// into a domain entity.
    fn user_stream<'s>(
        &'s mut self,
        query: Option<&Expression>,
    ) -> impl Iterator<Item = LdapDaoResult<User>> + 's {
        let request = self.search_request(query);
        let page_size = self.config.page_size;
        let mapper = &self.mapper;
        PagedSearchIterator::with_page_size(&mut self.conn, request, page_size, move |entry| {
            let mut user = User::new();
            mapper.from_entry(&entry, &mut user);
            user
        })
    }

    fn find_first(
        &mut self,
        query: Expression,
        include_deactivated: bool,
    ) -> LdapDaoResult<Option<User>> {
        for result in self.user_stream(Some(&query)) {
            let user = result?;
            if user.deactivated && !include_deactivated {
                continue;
            }
            return Ok(Some(user));
        }
        Ok(None)
    }

    /// Fetches the raw entry of a user by durable guid, regardless of
    /// lifecycle state.
    fn raw_entry_by_guid(&mut self, guid: &str) -> LdapDaoResult<Option<Entry>> {
        let query = Expression::eq(SearchAttribute::Guid, guid);
        let request = self.search_request(Some(&query));
        let page_size = self.config.page_size;
        let mut cursor =
            PagedSearchIterator::with_page_size(&mut self.conn, request, page_size, |entry| entry);
        cursor.next().transpose()
    }

    /// Applies the masked difference between the desired entry and the
    /// current one: replace populated attributes, delete cleared ones.
    fn masked_changes(
        attrs: &[UserAttr],
        current: &Entry,
        desired: &Entry,
    ) -> Vec<AttributeChange> {
        let mut masked: Vec<&str> = attribute_mask(attrs).into_iter().collect();
        masked.sort_unstable();

        masked
            .into_iter()
            .filter_map(|name| {
                let values = desired.attrs(name);
                if !values.is_empty() {
                    Some(AttributeChange::Replace(name.to_string(), values.to_vec()))
                } else if current.has_attr(name) {
                    Some(AttributeChange::Delete(name.to_string(), Vec::new()))
                } else {
                    None
                }
            })
            .collect()
    }

    fn modify_group(
        &mut self,
        group: &Group,
        change: AttributeChange,
    ) -> LdapDaoResult<()> {
        let group_dn = dn_to_wire(group.dn());
        self.conn
            .modify(&group_dn, vec![change])
            .map_err(|err| match err {
                LdapDaoError::Protocol(ldap3::LdapError::LdapResult { ref result })
                    if result.rc == 32 =>
                {
                    LdapDaoError::GroupNotFound(group_dn.clone())
                }
                other => other,
            })
    }
}

impl<C: DirectoryConnection> UserDao for LdapUserDao<C> {
    fn find_by_guid(&mut self, guid: &str, include_deactivated: bool) -> DaoResult<Option<User>> {
        let query = Expression::eq(SearchAttribute::Guid, guid);
        Ok(self.find_first(query, include_deactivated)?)
    }

    fn find_by_email(&mut self, email: &str, include_deactivated: bool) -> DaoResult<Option<User>> {
        let query = Expression::eq(SearchAttribute::Email, email);
        Ok(self.find_first(query, include_deactivated)?)
    }

    fn find_by_sso_guid(
        &mut self,
        guid: &str,
        include_deactivated: bool,
    ) -> DaoResult<Option<User>> {
        let query = Expression::eq(SearchAttribute::SsoGuid, guid);
        Ok(self.find_first(query, include_deactivated)?)
    }

    fn find_by_partner_guid(
        &mut self,
        guid: &str,
        include_deactivated: bool,
    ) -> DaoResult<Option<User>> {
        let query = Expression::eq(SearchAttribute::PartnerGuid, guid);
        Ok(self.find_first(query, include_deactivated)?)
    }

    fn find_by_employee_id(
        &mut self,
        employee_id: &str,
        include_deactivated: bool,
    ) -> DaoResult<Option<User>> {
        let query = Expression::eq(SearchAttribute::EmployeeId, employee_id);
        Ok(self.find_first(query, include_deactivated)?)
    }

    fn find_all_by_query(
        &mut self,
        query: Option<&Expression>,
        include_deactivated: bool,
    ) -> DaoResult<Vec<User>> {
        let cap = match self.config.max_search_results {
            0 => None,
            cap => Some(cap),
        };

        let mut users = Vec::new();
        for result in self.user_stream(query) {
            let user = result?;
            if user.deactivated && !include_deactivated {
                continue;
            }
            // abort the whole iteration the moment the cap is exceeded; a
            // truncated result must never escape
            if let Some(cap) = cap {
                if users.len() >= cap {
                    return Err(LdapDaoError::ExceededMaximumResults(cap).into());
                }
            }
            users.push(user);
        }
        Ok(users)
    }

    fn save(&mut self, user: &mut User) -> DaoResult<()> {
        self.assert_writable()?;

        let Entry { dn, attributes: attrs } = self.mapper.to_entry(user)?;
        self.conn.add(&dn, attrs.into_iter().collect())?;
        debug!(guid = %user.guid, %dn, "user entry created");
        Ok(())
    }

    fn update(&mut self, user: &mut User, attrs: &[UserAttr]) -> DaoResult<()> {
        self.assert_writable()?;

        let current = self
            .raw_entry_by_guid(&user.guid)?
            .ok_or_else(|| LdapDaoError::UserNotFound(user.guid.clone()))?;
        let desired = self.mapper.to_entry(user)?;

        // an identity change (deactivation, reactivation, new email) moves
        // the entry before its attributes are touched
        if !current.dn.eq_ignore_ascii_case(&desired.dn) {
            let identity = self.mapper.map_identity(user)?;
            let new_rdn = dn_to_wire(&Dn::ROOT.child(attributes::CN, identity));
            self.conn.rename(&current.dn, &new_rdn)?;
        }

        let changes = Self::masked_changes(attrs, &current, &desired);
        if !changes.is_empty() {
            self.conn.modify(&desired.dn, changes)?;
        }
        debug!(guid = %user.guid, "user entry updated");
        Ok(())
    }

    fn deactivate(&mut self, user: &mut User) -> DaoResult<()> {
        user.deactivated = true;
        self.update(user, &[UserAttr::Email, UserAttr::Flags])
    }

    fn reactivate(&mut self, user: &mut User) -> DaoResult<()> {
        user.deactivated = false;
        user.deactivated_uid = None;
        self.update(user, &[UserAttr::Email, UserAttr::Flags])
    }

    fn add_to_group(&mut self, user: &mut User, group: &Group) -> DaoResult<()> {
        self.assert_writable()?;

        let user_dn = dn_to_wire(&self.mapper.map_dn(user)?);
        let group_dn = dn_to_wire(group.dn());

        self.modify_group(
            group,
            AttributeChange::Add(attributes::GROUP_MEMBER.to_string(), vec![user_dn.clone()]),
        )?;
        self.conn.modify(
            &user_dn,
            vec![AttributeChange::Add(
                attributes::GROUP_MEMBERSHIP.to_string(),
                vec![group_dn],
            )],
        )?;

        if !user.groups.contains(group) {
            user.groups.push(group.clone());
        }
        Ok(())
    }

    fn remove_from_group(&mut self, user: &mut User, group: &Group) -> DaoResult<()> {
        self.assert_writable()?;

        let user_dn = dn_to_wire(&self.mapper.map_dn(user)?);
        let group_dn = dn_to_wire(group.dn());

        self.modify_group(
            group,
            AttributeChange::Delete(attributes::GROUP_MEMBER.to_string(), vec![user_dn.clone()]),
        )?;
        self.conn.modify(
            &user_dn,
            vec![AttributeChange::Delete(
                attributes::GROUP_MEMBERSHIP.to_string(),
                vec![group_dn],
            )],
        )?;

        user.groups.retain(|g| g != group);
        Ok(())
    }

    fn enqueue_all(
        &mut self,
        sink: &SyncSender<User>,
        include_deactivated: bool,
    ) -> DaoResult<usize> {
        let mut sent = 0;
        for result in self.user_stream(None) {
            let user = result?;
            if user.deactivated && !include_deactivated {
                continue;
            }
            // a dropped receiver ends the drain; that is the consumer's way
            // of asking the producer to stop
            if sink.send(user).is_err() {
                break;
            }
            sent += 1;
        }
        Ok(sent)
    }
}
