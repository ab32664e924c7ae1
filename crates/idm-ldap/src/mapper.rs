//! User entry mapping.
//!
//! [`UserEntryMapper`] translates between the [`User`] domain entity and the
//! flat wire attribute set of a directory entry, deriving the entry's
//! structural classes and its primary key.
//!
//! The primary key of an active account is its email address; a deactivated
//! account keys on a stable `deactivated-<guid>` identifier assigned exactly
//! once. Assigning that identifier (and persisting it onto the entity) is the
//! single mutation any mapping operation performs.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use idm_core::{Dn, User};
use tracing::{debug, warn};

use crate::attributes;
use crate::dn_format::{dn_from_wire, dn_to_wire};
use crate::entry::Entry;
use crate::error::{LdapDaoError, LdapDaoResult};

/// Wire format of instant attributes (generalized time, second precision).
const INSTANT_FORMAT: &str = "%Y%m%d%H%M%SZ";

/// Maps users to and from directory entries below a fixed base DN.
#[derive(Debug, Clone)]
pub struct UserEntryMapper {
    base_dn: Dn,
}

impl UserEntryMapper {
    /// Creates a mapper for entries below `base_dn`.
    #[must_use]
    pub const fn new(base_dn: Dn) -> Self {
        Self { base_dn }
    }

    /// Computes the primary-key value of the user's entry.
    ///
    /// Active users key on their email address. A deactivated user keeps its
    /// previously assigned identifier; when none is stored yet, one is
    /// synthesized from the durable guid and persisted onto the entity, so
    /// repeated calls return the identical value.
    ///
    /// ## Errors
    ///
    /// Returns [`LdapDaoError::MalformedIdentity`] for an active user whose
    /// email is missing or not email-shaped.
    pub fn map_identity(&self, user: &mut User) -> LdapDaoResult<String> {
        if !user.deactivated {
            return match user.email.as_deref() {
                Some(email) if email.contains('@') => Ok(email.to_string()),
                _ => Err(LdapDaoError::malformed_identity(format!(
                    "active user {} has no usable email address",
                    user.guid
                ))),
            };
        }

        if let Some(uid) = &user.deactivated_uid {
            return Ok(uid.clone());
        }

        let uid = format!("{}{}", attributes::DEACTIVATED_PREFIX, user.guid);
        user.deactivated_uid = Some(uid.clone());
        Ok(uid)
    }

    /// Computes the distinguished name of the user's entry.
    pub fn map_dn(&self, user: &mut User) -> LdapDaoResult<Dn> {
        let identity = self.map_identity(user)?;
        Ok(self.base_dn.child(attributes::CN, identity))
    }

    /// Renders the user as a directory entry: one attribute per populated
    /// field, plus the structural classes derived from current field
    /// population.
    pub fn to_entry(&self, user: &mut User) -> LdapDaoResult<Entry> {
        let identity = self.map_identity(user)?;
        let mut entry = Entry::new(dn_to_wire(&self.base_dn.child(attributes::CN, &identity)));

        entry.set_attr(attributes::OBJECT_CLASS, self.object_classes(user));
        entry.set_attr(attributes::CN, vec![identity]);
        set_scalar(&mut entry, attributes::UID, user.email.as_deref());

        set_scalar(&mut entry, attributes::GUID, Some(user.guid.as_str()));
        set_scalar(&mut entry, attributes::PARTNER_GUID, user.raw_partner_guid.as_deref());
        set_scalar(&mut entry, attributes::SSO_GUID, user.raw_sso_guid.as_deref());
        set_scalar(&mut entry, attributes::FIRST_NAME, user.first_name.as_deref());
        set_scalar(&mut entry, attributes::LAST_NAME, user.last_name.as_deref());

        entry.set_attr(
            attributes::FLAG_ALLOW_PASSWORD_CHANGE,
            vec![flag_to_wire(user.allow_password_change)],
        );
        entry.set_attr(
            attributes::FLAG_LOGIN_DISABLED,
            vec![flag_to_wire(user.login_disabled)],
        );
        entry.set_attr(
            attributes::FLAG_FORCE_PASSWORD_CHANGE,
            vec![flag_to_wire(user.force_password_change)],
        );
        entry.set_attr(
            attributes::FLAG_EMAIL_VERIFIED,
            vec![flag_to_wire(user.email_verified)],
        );

        entry.set_attr(attributes::DOMAINS_VISITED, user.domains_visited.clone());

        set_scalar(&mut entry, attributes::SIGNUP_KEY, user.signup_key.as_deref());
        set_scalar(&mut entry, attributes::CHANGE_EMAIL_KEY, user.change_email_key.as_deref());
        set_scalar(&mut entry, attributes::PROPOSED_EMAIL, user.proposed_email.as_deref());
        set_scalar(&mut entry, attributes::RESET_PASSWORD_KEY, user.reset_password_key.as_deref());

        if let Some(password) = user.password.as_deref().filter(|p| !p.is_empty()) {
            entry.set_attr(attributes::PASSWORD, vec![password.to_string()]);
        }
        if let Some(login_time) = user.login_time {
            entry.set_attr(attributes::LOGIN_TIME, vec![instant_to_wire(login_time)]);
        }

        if let Some(social_id) = user.social_id() {
            let strength = user.social_id_strength_for(social_id);
            entry.set_attr(attributes::SOCIAL_ID, vec![social_id.to_string()]);
            entry.set_attr(
                attributes::SOCIAL_ID_STRENGTH,
                vec![encode_strength(social_id, strength)],
            );
        }

        set_scalar(&mut entry, attributes::DESIGNATION, user.designation.as_deref());
        set_scalar(&mut entry, attributes::EMPLOYEE_STATUS, user.employee_status.as_deref());
        set_scalar(&mut entry, attributes::GENDER, user.gender.as_deref());
        set_scalar(&mut entry, attributes::HR_STATUS_CODE, user.hr_status_code.as_deref());
        set_scalar(&mut entry, attributes::JOB_CODE, user.job_code.as_deref());
        set_scalar(&mut entry, attributes::MANAGER_ID, user.manager_id.as_deref());
        set_scalar(&mut entry, attributes::ORG_CODE, user.org_code.as_deref());
        set_scalar(&mut entry, attributes::SUB_ORG_CODE, user.sub_org_code.as_deref());
        set_scalar(&mut entry, attributes::PAY_GROUP, user.pay_group.as_deref());
        set_scalar(&mut entry, attributes::PREFERRED_NAME, user.preferred_name.as_deref());
        entry.set_attr(attributes::PROXY_ADDRESSES, user.proxy_addresses.clone());

        set_scalar(&mut entry, attributes::EMPLOYEE_NUMBER, user.employee_id.as_deref());
        set_scalar(&mut entry, attributes::DEPARTMENT_NUMBER, user.department_number.as_deref());
        set_scalar(&mut entry, attributes::TELEPHONE, user.telephone_number.as_deref());

        set_scalar(&mut entry, attributes::CITY, user.city.as_deref());
        set_scalar(&mut entry, attributes::STATE, user.state.as_deref());
        set_scalar(&mut entry, attributes::POSTAL_CODE, user.postal_code.as_deref());
        set_scalar(&mut entry, attributes::COUNTRY, user.country.as_deref());

        Ok(entry)
    }

    /// Populates a user from a directory entry, overwriting mapped fields.
    pub fn from_entry(&self, entry: &Entry, user: &mut User) {
        // primary key decides active vs deactivated
        let cn = entry.attr(attributes::CN).unwrap_or_default();
        if !cn.starts_with(attributes::DEACTIVATED_PREFIX) && cn.contains('@') {
            user.email = Some(cn.to_string());
            user.deactivated = false;
            user.deactivated_uid = None;
        } else {
            user.email = entry.attr(attributes::UID).map(String::from);
            user.deactivated = true;
            user.deactivated_uid = (!cn.is_empty()).then(|| cn.to_string());
        }

        if let Some(guid) = entry.attr(attributes::GUID) {
            user.guid = guid.to_string();
        }
        user.raw_partner_guid = entry.attr(attributes::PARTNER_GUID).map(String::from);
        user.raw_sso_guid = entry.attr(attributes::SSO_GUID).map(String::from);
        user.first_name = entry.attr(attributes::FIRST_NAME).map(String::from);
        user.last_name = entry.attr(attributes::LAST_NAME).map(String::from);

        user.login_time = entry
            .attr(attributes::LOGIN_TIME)
            .and_then(instant_from_wire);

        let strengths = decode_strengths(entry.attrs(attributes::SOCIAL_ID_STRENGTH));
        for social_id in entry.attrs(attributes::SOCIAL_ID).to_vec() {
            let strength = strengths.get(&social_id).copied();
            user.set_social_id(social_id, strength);
        }

        user.groups = entry
            .attrs(attributes::GROUP_MEMBERSHIP)
            .iter()
            .filter_map(|wire| dn_from_wire(wire))
            .map(|dn| dn.as_group())
            .collect();
        user.domains_visited = entry.attrs(attributes::DOMAINS_VISITED).to_vec();

        // every flag decodes with an explicit default; the directory may
        // omit an attribute holding its default value
        user.allow_password_change =
            flag_from_wire(entry.attr(attributes::FLAG_ALLOW_PASSWORD_CHANGE), true);
        user.login_disabled = flag_from_wire(entry.attr(attributes::FLAG_LOGIN_DISABLED), false);
        user.locked = flag_from_wire(entry.attr(attributes::FLAG_LOCKED), false);
        user.force_password_change =
            flag_from_wire(entry.attr(attributes::FLAG_FORCE_PASSWORD_CHANGE), false);
        user.email_verified = flag_from_wire(entry.attr(attributes::FLAG_EMAIL_VERIFIED), false);

        user.signup_key = entry.attr(attributes::SIGNUP_KEY).map(String::from);
        user.change_email_key = entry.attr(attributes::CHANGE_EMAIL_KEY).map(String::from);
        user.proposed_email = entry.attr(attributes::PROPOSED_EMAIL).map(String::from);
        user.reset_password_key = entry.attr(attributes::RESET_PASSWORD_KEY).map(String::from);

        user.designation = entry.attr(attributes::DESIGNATION).map(String::from);
        user.employee_status = entry.attr(attributes::EMPLOYEE_STATUS).map(String::from);
        user.gender = entry.attr(attributes::GENDER).map(String::from);
        user.hr_status_code = entry.attr(attributes::HR_STATUS_CODE).map(String::from);
        user.job_code = entry.attr(attributes::JOB_CODE).map(String::from);
        user.manager_id = entry.attr(attributes::MANAGER_ID).map(String::from);
        user.org_code = entry.attr(attributes::ORG_CODE).map(String::from);
        user.sub_org_code = entry.attr(attributes::SUB_ORG_CODE).map(String::from);
        user.pay_group = entry.attr(attributes::PAY_GROUP).map(String::from);
        user.preferred_name = entry.attr(attributes::PREFERRED_NAME).map(String::from);
        user.proxy_addresses = entry.attrs(attributes::PROXY_ADDRESSES).to_vec();

        user.employee_id = entry.attr(attributes::EMPLOYEE_NUMBER).map(String::from);
        user.department_number = entry.attr(attributes::DEPARTMENT_NUMBER).map(String::from);
        user.telephone_number = entry.attr(attributes::TELEPHONE).map(String::from);

        user.city = entry.attr(attributes::CITY).map(String::from);
        user.state = entry.attr(attributes::STATE).map(String::from);
        user.postal_code = entry.attr(attributes::POSTAL_CODE).map(String::from);
        user.country = entry.attr(attributes::COUNTRY).map(String::from);

        debug!(guid = %user.guid, "user loaded from directory entry");
    }

    /// Structural classes, derived from current field population on every
    /// call.
    fn object_classes(&self, user: &User) -> Vec<String> {
        let mut classes: Vec<String> = attributes::USER_OBJECT_CLASSES
            .iter()
            .map(ToString::to_string)
            .collect();
        if user.has_hr_attributes() {
            classes.push(attributes::HR_PERSON_CLASS.to_string());
        }
        if user.has_federated_attributes() {
            classes.push(attributes::FEDERATED_PERSON_CLASS.to_string());
        }
        classes
    }
}

fn set_scalar(entry: &mut Entry, name: &'static str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        entry.set_attr(name, vec![value.to_string()]);
    }
}

fn flag_to_wire(value: bool) -> String {
    if value { "TRUE" } else { "FALSE" }.to_string()
}

fn flag_from_wire(value: Option<&str>, default: bool) -> bool {
    match value {
        Some(v) if v.eq_ignore_ascii_case("TRUE") => true,
        Some(v) if v.eq_ignore_ascii_case("FALSE") => false,
        _ => default,
    }
}

fn instant_to_wire(instant: DateTime<Utc>) -> String {
    instant.format(INSTANT_FORMAT).to_string()
}

fn instant_from_wire(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, INSTANT_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Encodes a federated identity strength as `id$strength`; an absent
/// strength encodes as a trailing separator.
fn encode_strength(id: &str, strength: Option<f64>) -> String {
    match strength {
        Some(strength) => format!("{id}${strength}"),
        None => format!("{id}$"),
    }
}

/// Decodes `id$strength` pairs, dropping malformed values. A corrupt
/// auxiliary encoding must not block loading the rest of the entity.
fn decode_strengths(values: &[String]) -> HashMap<String, f64> {
    let mut strengths = HashMap::new();
    for value in values {
        let Some((id, raw)) = value.split_once('$') else {
            warn!(%value, "dropping strength encoding without separator");
            continue;
        };
        match raw.parse::<f64>() {
            Ok(strength) => {
                strengths.insert(id.to_string(), strength);
            }
            Err(_) => warn!(%value, "dropping unparseable strength encoding"),
        }
    }
    strengths
}
