//! Cursor and repository behavior against a scripted in-memory directory.

use std::collections::HashSet;
use std::sync::mpsc;

use idm_core::query::{Expression, SearchAttribute};
use idm_core::{DaoError, Dn, User, UserAttr, UserDao};
use idm_ldap::{
    attributes, AttributeChange, DirectoryConnection, Entry, LdapDaoConfig, LdapDaoError,
    LdapUserDao, Page, PagedSearchIterator, SearchRequest, UserEntryMapper,
};

/// In-memory directory scripted for one test: conjunctive filter matching,
/// offset-cookie paging, and a journal of every write.
#[derive(Default)]
struct FakeDirectory {
    entries: Vec<Entry>,
    open: bool,
    page_fetches: usize,
    adds: Vec<String>,
    modifies: Vec<(String, Vec<AttributeChange>)>,
    renames: Vec<(String, String)>,
}

impl FakeDirectory {
    fn with_entries(entries: Vec<Entry>) -> Self {
        Self {
            entries,
            open: true,
            ..Default::default()
        }
    }

    fn entry_index(&self, dn: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.dn.eq_ignore_ascii_case(dn))
    }
}

/// Conjunctive match over every `(attr=value)` leaf in the filter; a value
/// of `*` only asserts presence.
fn matches_filter(entry: &Entry, filter: &str) -> bool {
    filter
        .split(['(', ')'])
        .filter_map(|segment| segment.split_once('='))
        .all(|(name, value)| {
            if value == "*" {
                entry.has_attr(name)
            } else {
                entry.attrs(name).iter().any(|v| v == value)
            }
        })
}

fn no_such_object() -> LdapDaoError {
    LdapDaoError::from_ldap(ldap3::LdapError::LdapResult {
        result: ldap3::LdapResult {
            rc: 32,
            matched: String::new(),
            text: "no such object".to_string(),
            refs: Vec::new(),
            ctrls: Vec::new(),
        },
    })
}

impl DirectoryConnection for FakeDirectory {
    fn is_open(&self) -> bool {
        self.open
    }

    fn search_page(
        &mut self,
        request: &SearchRequest,
        page_size: i32,
        cookie: Option<&[u8]>,
    ) -> Result<Page, LdapDaoError> {
        self.page_fetches += 1;

        let matches: Vec<Entry> = self
            .entries
            .iter()
            .filter(|entry| matches_filter(entry, &request.filter))
            .cloned()
            .collect();

        let offset: usize = cookie
            .map(|c| String::from_utf8_lossy(c).parse().unwrap_or(0))
            .unwrap_or(0);
        let end = matches.len().min(offset + page_size as usize);
        let cookie = (end < matches.len()).then(|| end.to_string().into_bytes());

        Ok(Page {
            entries: matches[offset..end].to_vec(),
            cookie,
        })
    }

    fn add(&mut self, dn: &str, attrs: Vec<(String, Vec<String>)>) -> Result<(), LdapDaoError> {
        let mut entry = Entry::new(dn);
        for (name, values) in attrs {
            entry.set_attr(name, values);
        }
        self.adds.push(dn.to_string());
        self.entries.push(entry);
        Ok(())
    }

    fn modify(&mut self, dn: &str, changes: Vec<AttributeChange>) -> Result<(), LdapDaoError> {
        let Some(index) = self.entry_index(dn) else {
            return Err(no_such_object());
        };

        for change in &changes {
            let entry = &mut self.entries[index];
            match change {
                AttributeChange::Replace(name, values) => {
                    entry.set_attr(name.clone(), values.clone());
                }
                AttributeChange::Add(name, values) => {
                    let mut merged = entry.attrs(name).to_vec();
                    merged.extend(values.iter().cloned());
                    entry.set_attr(name.clone(), merged);
                }
                AttributeChange::Delete(name, values) => {
                    if values.is_empty() {
                        entry.attributes.remove(name);
                    } else {
                        let remaining: Vec<String> = entry
                            .attrs(name)
                            .iter()
                            .filter(|v| !values.contains(v))
                            .cloned()
                            .collect();
                        entry.set_attr(name.clone(), remaining);
                    }
                }
            }
        }
        self.modifies.push((dn.to_string(), changes));
        Ok(())
    }

    fn rename(&mut self, dn: &str, new_rdn: &str) -> Result<(), LdapDaoError> {
        let Some(index) = self.entry_index(dn) else {
            return Err(no_such_object());
        };

        let parent = dn.split_once(',').map(|(_, rest)| rest).unwrap_or("");
        let new_dn = format!("{new_rdn},{parent}");
        let entry = &mut self.entries[index];
        entry.dn = new_dn.clone();
        if let Some((attr, value)) = new_rdn.split_once('=') {
            entry.set_attr(attr.to_string(), vec![value.to_string()]);
        }

        self.renames.push((dn.to_string(), new_dn));
        Ok(())
    }
}

fn base_dn() -> Dn {
    Dn::ROOT.child("dc", "example").child("ou", "People")
}

fn config() -> LdapDaoConfig {
    LdapDaoConfig::builder()
        .connection_url("ldaps://ds.example.org:636")
        .users_base_dn(base_dn())
        .build()
        .unwrap()
}

fn mapper() -> UserEntryMapper {
    UserEntryMapper::new(base_dn())
}

fn user_entry(email: &str, first_name: &str) -> Entry {
    let mut user = User::new().with_email(email).with_first_name(first_name);
    mapper().to_entry(&mut user).unwrap()
}

fn seeded_users(count: usize) -> Vec<Entry> {
    (0..count)
        .map(|i| user_entry(&format!("user{i}@example.com"), &format!("User{i}")))
        .collect()
}

fn match_all_request() -> SearchRequest {
    SearchRequest::new(
        "ou=People,dc=example",
        idm_ldap::SearchScope::Subtree,
        "(objectClass=inetOrgPerson)",
    )
}

#[test]
fn cursor_yields_every_entry_exactly_once_across_pages() {
    let mut conn = FakeDirectory::with_entries(seeded_users(25));

    let emails: Vec<String> = {
        let cursor = PagedSearchIterator::with_page_size(&mut conn, match_all_request(), 10, |e| {
            e.attr(attributes::UID).unwrap().to_string()
        });
        cursor.map(Result::unwrap).collect()
    };

    assert_eq!(emails.len(), 25);
    let unique: HashSet<&String> = emails.iter().collect();
    assert_eq!(unique.len(), 25);
    assert_eq!(conn.page_fetches, 3);
}

#[test]
fn cursor_stays_exhausted_after_the_last_page() {
    let mut conn = FakeDirectory::with_entries(seeded_users(3));

    let mut cursor = PagedSearchIterator::with_page_size(&mut conn, match_all_request(), 10, |e| e);
    assert_eq!(cursor.by_ref().filter(Result::is_ok).count(), 3);
    assert!(cursor.next().is_none());
    assert!(cursor.next().is_none());
}

#[test]
fn cursor_over_an_empty_result_fetches_once() {
    let mut conn = FakeDirectory::with_entries(Vec::new());

    let yielded = {
        let cursor = PagedSearchIterator::with_page_size(&mut conn, match_all_request(), 10, |e| e);
        cursor.count()
    };

    assert_eq!(yielded, 0);
    assert_eq!(conn.page_fetches, 1);
}

#[test]
#[should_panic(expected = "already be open")]
fn cursor_rejects_a_closed_connection() {
    let mut conn = FakeDirectory::with_entries(Vec::new());
    conn.open = false;

    let _ = PagedSearchIterator::with_page_size(&mut conn, match_all_request(), 10, |e| e);
}

#[test]
fn find_by_email_maps_the_entry() {
    let conn = FakeDirectory::with_entries(seeded_users(3));
    let mut dao = LdapUserDao::new(config(), conn);

    let user = dao.find_by_email("user1@example.com", false).unwrap();

    let user = user.expect("user should be found");
    assert_eq!(user.email.as_deref(), Some("user1@example.com"));
    assert_eq!(user.first_name.as_deref(), Some("User1"));
    assert!(!user.deactivated);

    assert!(dao.find_by_email("nobody@example.com", false).unwrap().is_none());
}

#[test]
fn deactivated_users_are_hidden_unless_requested() {
    let mut deactivated = User::new().with_email("gone@example.com").with_deactivated(true);
    let entry = mapper().to_entry(&mut deactivated).unwrap();
    let conn = FakeDirectory::with_entries(vec![entry]);
    let mut dao = LdapUserDao::new(config(), conn);

    assert!(dao.find_by_email("gone@example.com", false).unwrap().is_none());

    let found = dao.find_by_email("gone@example.com", true).unwrap();
    let found = found.expect("deactivated user should be visible on request");
    assert!(found.deactivated);
    assert_eq!(found.email.as_deref(), Some("gone@example.com"));
}

#[test]
fn result_cap_aborts_with_no_partial_result() {
    let conn = FakeDirectory::with_entries(seeded_users(2));
    let config = LdapDaoConfig::builder()
        .connection_url("ldaps://ds.example.org:636")
        .users_base_dn(base_dn())
        .max_search_results(1)
        .build()
        .unwrap();
    let mut dao = LdapUserDao::new(config, conn);

    let result = dao.find_all_by_query(None, false);

    assert!(matches!(result, Err(DaoError::ExceededMaximumResults(1))));
}

#[test]
fn unlimited_query_returns_every_match() {
    let conn = FakeDirectory::with_entries(seeded_users(7));
    let mut dao = LdapUserDao::new(config(), conn);

    let users = dao.find_all_by_query(None, false).unwrap();
    assert_eq!(users.len(), 7);

    let query = Expression::eq(SearchAttribute::FirstName, "User3");
    let users = dao.find_all_by_query(Some(&query), false).unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].email.as_deref(), Some("user3@example.com"));
}

#[test]
fn masked_update_touches_only_the_masked_attributes() {
    let conn = FakeDirectory::with_entries(seeded_users(1));
    let mut dao = LdapUserDao::new(config(), conn);

    let mut user = dao.find_by_email("user0@example.com", false).unwrap().unwrap();
    user.telephone_number = Some("+1 555 0100".to_string());
    user.first_name = Some("Renamed".to_string());

    dao.update(&mut user, &[UserAttr::Telephone]).unwrap();

    let conn = dao.into_connection();
    assert!(conn.renames.is_empty());
    assert_eq!(conn.modifies.len(), 1);
    let (_, changes) = &conn.modifies[0];
    assert_eq!(
        changes,
        &vec![AttributeChange::Replace(
            attributes::TELEPHONE.to_string(),
            vec!["+1 555 0100".to_string()],
        )]
    );
}

#[test]
fn masked_update_deletes_cleared_attributes() {
    let mut seeded = User::new().with_email("user0@example.com");
    seeded.telephone_number = Some("+1 555 0100".to_string());
    let entry = mapper().to_entry(&mut seeded).unwrap();
    let conn = FakeDirectory::with_entries(vec![entry]);
    let mut dao = LdapUserDao::new(config(), conn);

    let mut user = dao.find_by_email("user0@example.com", false).unwrap().unwrap();
    user.telephone_number = None;

    dao.update(&mut user, &[UserAttr::Telephone]).unwrap();

    let conn = dao.into_connection();
    let (_, changes) = &conn.modifies[0];
    assert_eq!(
        changes,
        &vec![AttributeChange::Delete(
            attributes::TELEPHONE.to_string(),
            Vec::new(),
        )]
    );
}

#[test]
fn deactivation_moves_the_entry_to_a_stable_key() {
    let conn = FakeDirectory::with_entries(seeded_users(1));
    let mut dao = LdapUserDao::new(config(), conn);

    let mut user = dao.find_by_email("user0@example.com", false).unwrap().unwrap();
    let guid = user.guid.clone();

    dao.deactivate(&mut user).unwrap();

    let expected_uid = format!("deactivated-{guid}");
    assert!(user.deactivated);
    assert_eq!(user.deactivated_uid.as_deref(), Some(expected_uid.as_str()));

    // deactivating again must not move the entry a second time
    let relocated = dao.find_by_email("user0@example.com", true).unwrap().unwrap();
    assert_eq!(relocated.deactivated_uid.as_deref(), Some(expected_uid.as_str()));

    let conn = dao.into_connection();
    assert_eq!(conn.renames.len(), 1);
    assert_eq!(
        conn.renames[0].1,
        format!("cn={expected_uid},ou=People,dc=example")
    );
}

#[test]
fn reactivation_restores_the_email_key() {
    let mut deactivated = User::new().with_email("back@example.com").with_deactivated(true);
    let entry = mapper().to_entry(&mut deactivated).unwrap();
    let conn = FakeDirectory::with_entries(vec![entry]);
    let mut dao = LdapUserDao::new(config(), conn);

    let mut user = dao.find_by_email("back@example.com", true).unwrap().unwrap();
    dao.reactivate(&mut user).unwrap();

    assert!(!user.deactivated);
    assert_eq!(user.deactivated_uid, None);

    let conn = dao.into_connection();
    assert_eq!(conn.renames.len(), 1);
    assert!(conn.renames[0].1.starts_with("cn=back@example.com,"));
}

#[test]
fn read_only_repository_rejects_mutations() {
    let conn = FakeDirectory::with_entries(Vec::new());
    let config = LdapDaoConfig::builder()
        .connection_url("ldaps://ds.example.org:636")
        .users_base_dn(base_dn())
        .read_only(true)
        .build()
        .unwrap();
    let mut dao = LdapUserDao::new(config, conn);

    let mut user = User::new().with_email("new@example.com");
    assert!(matches!(dao.save(&mut user), Err(DaoError::ReadOnly)));
    assert!(matches!(dao.update(&mut user, &[]), Err(DaoError::ReadOnly)));
}

#[test]
fn save_adds_the_mapped_entry() {
    let conn = FakeDirectory::with_entries(Vec::new());
    let mut dao = LdapUserDao::new(config(), conn);

    let mut user = User::new().with_email("new@example.com").with_last_name("Doe");
    dao.save(&mut user).unwrap();

    let found = dao.find_by_email("new@example.com", false).unwrap();
    assert_eq!(found.unwrap().last_name.as_deref(), Some("Doe"));

    let conn = dao.into_connection();
    assert_eq!(conn.adds, vec!["cn=new@example.com,ou=People,dc=example"]);
}

#[test]
fn group_membership_is_written_to_both_entries() {
    let group_dn = Dn::ROOT.child("dc", "example").child("ou", "Groups").child("cn", "Staff");
    let mut group_entry = Entry::new("cn=Staff,ou=Groups,dc=example");
    group_entry.set_attr("objectClass", vec!["groupOfNames".to_string()]);

    let mut entries = seeded_users(1);
    entries.push(group_entry);
    let conn = FakeDirectory::with_entries(entries);
    let mut dao = LdapUserDao::new(config(), conn);

    let mut user = dao.find_by_email("user0@example.com", false).unwrap().unwrap();
    let group = group_dn.as_group();

    dao.add_to_group(&mut user, &group).unwrap();
    assert!(user.groups.contains(&group));

    dao.remove_from_group(&mut user, &group).unwrap();
    assert!(user.groups.is_empty());

    let conn = dao.into_connection();
    let touched: Vec<&str> = conn.modifies.iter().map(|(dn, _)| dn.as_str()).collect();
    assert_eq!(
        touched,
        vec![
            "cn=Staff,ou=Groups,dc=example",
            "cn=user0@example.com,ou=People,dc=example",
            "cn=Staff,ou=Groups,dc=example",
            "cn=user0@example.com,ou=People,dc=example",
        ]
    );
}

#[test]
fn adding_to_a_missing_group_reports_group_not_found() {
    let conn = FakeDirectory::with_entries(seeded_users(1));
    let mut dao = LdapUserDao::new(config(), conn);

    let mut user = dao.find_by_email("user0@example.com", false).unwrap().unwrap();
    let group = Dn::ROOT.child("ou", "Groups").child("cn", "Missing").as_group();

    let result = dao.add_to_group(&mut user, &group);
    assert!(matches!(result, Err(DaoError::GroupNotFound(_))));
}

#[test]
fn enqueue_all_drains_into_a_bounded_channel() {
    let conn = FakeDirectory::with_entries(seeded_users(20));
    let mut dao = LdapUserDao::new(config(), conn);

    let (tx, rx) = mpsc::sync_channel::<User>(4);
    let consumer = std::thread::spawn(move || rx.into_iter().count());

    let sent = dao.enqueue_all(&tx, false).unwrap();
    drop(tx);

    assert_eq!(sent, 20);
    assert_eq!(consumer.join().unwrap(), 20);
}
