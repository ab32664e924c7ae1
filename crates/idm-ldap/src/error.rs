//! LDAP-specific error types.

use idm_core::DaoError;
use thiserror::Error;

/// Result type for LDAP repository operations.
pub type LdapDaoResult<T> = std::result::Result<T, LdapDaoError>;

/// Errors raised by the LDAP rendition of the repository.
#[derive(Debug, Error)]
pub enum LdapDaoError {
    /// The entity fails the identity shape check required to compute its
    /// directory key.
    #[error("malformed identity: {0}")]
    MalformedIdentity(String),

    /// The directory reported a transport or protocol failure.
    #[error("LDAP operation failed")]
    Protocol(#[source] ldap3::LdapError),

    /// The wait on a directory round trip was interrupted.
    #[error("LDAP operation interrupted")]
    Interrupted(#[source] ldap3::LdapError),

    /// A search produced more results than the configured cap.
    #[error("search exceeded the maximum of {0} results")]
    ExceededMaximumResults(usize),

    /// The addressed user does not exist in the directory.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// The addressed group does not exist in the directory.
    #[error("group not found: {0}")]
    GroupNotFound(String),

    /// The repository is configured read-only and rejects mutations.
    #[error("repository is read-only")]
    ReadOnly,

    /// Invalid repository configuration.
    #[error("LDAP configuration error: {0}")]
    Configuration(String),
}

impl LdapDaoError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a malformed-identity error.
    #[must_use]
    pub fn malformed_identity(msg: impl Into<String>) -> Self {
        Self::MalformedIdentity(msg.into())
    }

    /// Wraps an `ldap3` failure, classifying an interrupted wait as the
    /// distinct cancellation kind.
    #[must_use]
    pub fn from_ldap(err: ldap3::LdapError) -> Self {
        let interrupted = matches!(
            &err,
            ldap3::LdapError::Io { source } if source.kind() == std::io::ErrorKind::Interrupted
        );
        if interrupted {
            Self::Interrupted(err)
        } else {
            Self::Protocol(err)
        }
    }

    /// Whether this error means "asked to stop" rather than "directory is
    /// broken".
    #[must_use]
    pub const fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted(_))
    }
}

impl From<LdapDaoError> for DaoError {
    fn from(err: LdapDaoError) -> Self {
        match err {
            LdapDaoError::MalformedIdentity(msg) => Self::MalformedIdentity(msg),
            LdapDaoError::Protocol(source) => Self::Directory(source.to_string()),
            LdapDaoError::Interrupted(source) => Self::Interrupted(source.to_string()),
            LdapDaoError::ExceededMaximumResults(limit) => Self::ExceededMaximumResults(limit),
            LdapDaoError::UserNotFound(who) => Self::NotFound(who),
            LdapDaoError::GroupNotFound(which) => Self::GroupNotFound(which),
            LdapDaoError::ReadOnly => Self::ReadOnly,
            LdapDaoError::Configuration(msg) => Self::Directory(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupted_io_maps_to_the_cancellation_kind() {
        let io = std::io::Error::from(std::io::ErrorKind::Interrupted);
        let err = LdapDaoError::from_ldap(ldap3::LdapError::Io { source: io });
        assert!(err.is_interrupted());
    }

    #[test]
    fn other_io_maps_to_protocol() {
        let io = std::io::Error::from(std::io::ErrorKind::ConnectionReset);
        let err = LdapDaoError::from_ldap(ldap3::LdapError::Io { source: io });
        assert!(!err.is_interrupted());
        assert!(matches!(err, LdapDaoError::Protocol(_)));
    }

    #[test]
    fn conversion_into_dao_error_preserves_the_kind() {
        let err: DaoError = LdapDaoError::ExceededMaximumResults(10).into();
        assert!(matches!(err, DaoError::ExceededMaximumResults(10)));

        let err: DaoError = LdapDaoError::ReadOnly.into();
        assert!(matches!(err, DaoError::ReadOnly));
    }
}
