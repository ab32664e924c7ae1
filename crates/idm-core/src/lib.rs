//! # idm-core
//!
//! Domain model and repository contracts for the directory-backed identity
//! store: distinguished names, groups, the user entity, the search-expression
//! algebra, and the [`UserDao`] contract.
//!
//! Everything here is protocol-independent; the LDAP rendition lives in the
//! `idm-ldap` crate.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod dao;
pub mod dn;
pub mod error;
pub mod group;
pub mod query;
pub mod user;

pub use dao::UserDao;
pub use dn::{Dn, DnComponent};
pub use error::{DaoError, DaoResult};
pub use group::Group;
pub use query::{BooleanExpression, BooleanOp, Comparison, ComparisonKind, Expression, SearchAttribute};
pub use user::{User, UserAttr};
