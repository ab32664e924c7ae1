//! User repository contract.

use std::sync::mpsc::SyncSender;

use crate::error::DaoResult;
use crate::group::Group;
use crate::query::Expression;
use crate::user::{User, UserAttr};

/// Contract for a user repository backed by a directory service.
///
/// Lookups take an `include_deactivated` flag; a deactivated account is
/// invisible to callers that do not ask for it. Mutating operations return
/// [`crate::DaoError::ReadOnly`] on a read-only repository.
pub trait UserDao {
    /// Finds a user by durable guid.
    fn find_by_guid(&mut self, guid: &str, include_deactivated: bool) -> DaoResult<Option<User>>;

    /// Finds a user by email address.
    fn find_by_email(&mut self, email: &str, include_deactivated: bool) -> DaoResult<Option<User>>;

    /// Finds a user by single-sign-on guid.
    fn find_by_sso_guid(&mut self, guid: &str, include_deactivated: bool)
        -> DaoResult<Option<User>>;

    /// Finds a user by partner-system guid.
    fn find_by_partner_guid(
        &mut self,
        guid: &str,
        include_deactivated: bool,
    ) -> DaoResult<Option<User>>;

    /// Finds a user by employee number.
    fn find_by_employee_id(
        &mut self,
        employee_id: &str,
        include_deactivated: bool,
    ) -> DaoResult<Option<User>>;

    /// Finds all users matching a query expression (`None` matches every
    /// user).
    ///
    /// ## Errors
    ///
    /// Returns [`crate::DaoError::ExceededMaximumResults`] when the match set
    /// exceeds the repository's configured cap; no partial result is
    /// returned.
    fn find_all_by_query(
        &mut self,
        query: Option<&Expression>,
        include_deactivated: bool,
    ) -> DaoResult<Vec<User>>;

    /// Creates a new directory entry for the user.
    fn save(&mut self, user: &mut User) -> DaoResult<()>;

    /// Writes the wire attributes selected by `attrs` back to the directory,
    /// leaving all other attributes untouched. With no intents, the default
    /// mask applies.
    fn update(&mut self, user: &mut User, attrs: &[UserAttr]) -> DaoResult<()>;

    /// Deactivates the user, moving the entry to its stable deactivated key.
    fn deactivate(&mut self, user: &mut User) -> DaoResult<()>;

    /// Reactivates the user under its email-based key.
    fn reactivate(&mut self, user: &mut User) -> DaoResult<()>;

    /// Adds the user to a group.
    fn add_to_group(&mut self, user: &mut User, group: &Group) -> DaoResult<()>;

    /// Removes the user from a group.
    fn remove_from_group(&mut self, user: &mut User, group: &Group) -> DaoResult<()>;

    /// Drains every user into a bounded channel, blocking while the channel
    /// is full. Returns the number of users sent. Dropping the receiver stops
    /// the drain; consumers treat channel disconnect as end-of-stream.
    fn enqueue_all(&mut self, sink: &SyncSender<User>, include_deactivated: bool)
        -> DaoResult<usize>;
}
