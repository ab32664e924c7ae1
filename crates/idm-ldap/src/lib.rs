//! # idm-ldap
//!
//! LDAP rendition of the directory-backed identity store: wire attribute
//! catalog, DN rendering, filter translation, the attribute mask registry,
//! the user entry mapper, the paginated search cursor, and the
//! [`LdapUserDao`] repository.
//!
//! All directory calls are synchronous and blocking; the crate spawns no
//! threads of its own. A caller that wants concurrent fan-out uses one
//! cursor (and one connection) per worker. For bulk export, pair
//! [`idm_core::UserDao::enqueue_all`] with a bounded channel: the producer
//! thread drains the cursor and blocks once the channel is full, consumer
//! threads drain the channel and treat disconnect as end-of-stream.
//!
//! ```no_run
//! use std::sync::mpsc;
//!
//! use idm_core::{Dn, UserDao};
//! use idm_ldap::{LdapDaoConfig, LdapDirectory, LdapUserDao};
//!
//! # fn main() -> Result<(), idm_core::DaoError> {
//! let config = LdapDaoConfig::builder()
//!     .connection_url("ldaps://ds.example.org:636")
//!     .bind_dn("cn=admin,dc=example")
//!     .bind_credential("secret")
//!     .users_base_dn(Dn::ROOT.child("dc", "example").child("ou", "People"))
//!     .build()?;
//! let conn = LdapDirectory::connect(&config)?;
//! let mut dao = LdapUserDao::new(config, conn);
//!
//! let (tx, rx) = mpsc::sync_channel(64);
//! let consumer = std::thread::spawn(move || rx.into_iter().count());
//! dao.enqueue_all(&tx, false)?;
//! drop(tx);
//! let drained = consumer.join().expect("consumer panicked");
//! # let _ = drained;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod attributes;
pub mod config;
pub mod connection;
pub mod dao;
pub mod dn_format;
pub mod entry;
pub mod error;
pub mod filter;
pub mod mapper;
pub mod mask;
pub mod search;

pub use config::{LdapDaoConfig, LdapDaoConfigBuilder, SearchScope};
pub use connection::{AttributeChange, DirectoryConnection, LdapDirectory, Page, SearchRequest};
pub use dao::LdapUserDao;
pub use entry::Entry;
pub use error::{LdapDaoError, LdapDaoResult};
pub use mapper::UserEntryMapper;
pub use mask::attribute_mask;
pub use search::PagedSearchIterator;
