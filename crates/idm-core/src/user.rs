//! User domain model.
//!
//! A [`User`] is the aggregate the repository reads from and writes to the
//! directory. Most fields are optional scalars; the directory omits what is
//! unset rather than storing empty values.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::group::Group;

/// Logical update-intents for selective (masked) updates.
///
/// Each intent names a group of domain attributes; the directory layer maps
/// it onto the wire attributes a masked update is permitted to touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserAttr {
    /// Email address and its verification flag.
    Email,
    /// First and last name.
    Name,
    /// Credential material.
    Password,
    /// Last login timestamp.
    LoginTime,
    /// Account lifecycle flags.
    Flags,
    /// Visited-domain audit trail.
    DomainsVisited,
    /// Self-service keys (signup, change-email, reset-password).
    SelfServiceKeys,
    /// Social federated identity (id + strength).
    SocialIdentity,
    /// Partner-system federated guid.
    PartnerGuid,
    /// Employee number.
    EmployeeNumber,
    /// Department number.
    DepartmentNumber,
    /// Telephone number.
    Telephone,
    /// City.
    City,
    /// State or province.
    State,
    /// Postal code.
    PostalCode,
    /// Country.
    Country,
    /// Staff designation.
    Designation,
    /// Employment status.
    EmployeeStatus,
    /// Gender.
    Gender,
    /// HR status code.
    HrStatusCode,
    /// Job code.
    JobCode,
    /// Manager id.
    ManagerId,
    /// Organization code.
    OrgCode,
    /// Sub-organization code.
    SubOrgCode,
    /// Payroll group.
    PayGroup,
    /// Preferred (display) name.
    PreferredName,
    /// Proxy email addresses.
    ProxyAddresses,
}

/// A user of the identity store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    // === Identity ===
    /// Durable unique id; never changes once assigned.
    pub guid: String,
    /// Email address, the primary key of an active account.
    pub email: Option<String>,
    /// Credential material, write-only towards the directory.
    pub password: Option<String>,
    /// Whether the account has been deactivated.
    pub deactivated: bool,
    /// Stable alternate key assigned when the account was deactivated.
    pub deactivated_uid: Option<String>,

    // === Name ===
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// Preferred (display) name.
    pub preferred_name: Option<String>,

    // === Lifecycle flags ===
    /// Whether the user may change their own password.
    pub allow_password_change: bool,
    /// Whether login is disabled.
    pub login_disabled: bool,
    /// Whether the account is locked by intruder detection.
    pub locked: bool,
    /// Whether a password change is forced at next login.
    pub force_password_change: bool,
    /// Whether the email address has been verified.
    pub email_verified: bool,

    // === Metadata ===
    /// Time of the most recent login.
    pub login_time: Option<DateTime<Utc>>,

    // === Self-service keys ===
    /// Signup confirmation key.
    pub signup_key: Option<String>,
    /// Change-email confirmation key.
    pub change_email_key: Option<String>,
    /// Proposed (not yet confirmed) email address.
    pub proposed_email: Option<String>,
    /// Password-reset key.
    pub reset_password_key: Option<String>,

    // === Multi-valued ===
    /// Domains the user has visited.
    pub domains_visited: Vec<String>,
    /// Group memberships, by distinguished name.
    pub groups: Vec<Group>,

    // === Federated identities ===
    /// Linked social identity ids, in link order.
    pub social_ids: Vec<String>,
    /// Strength of each social identity link, keyed by id.
    pub social_id_strengths: HashMap<String, f64>,
    /// Partner-system guid as stored; `None` falls back to [`User::guid`].
    pub raw_partner_guid: Option<String>,
    /// Single-sign-on guid as stored; `None` falls back to [`User::guid`].
    pub raw_sso_guid: Option<String>,

    // === Contact & location ===
    /// Telephone number.
    pub telephone_number: Option<String>,
    /// City.
    pub city: Option<String>,
    /// State or province.
    pub state: Option<String>,
    /// Postal code.
    pub postal_code: Option<String>,
    /// Country.
    pub country: Option<String>,

    // === Business / HR ===
    /// Employee number.
    pub employee_id: Option<String>,
    /// Department number.
    pub department_number: Option<String>,
    /// Staff designation.
    pub designation: Option<String>,
    /// Employment status.
    pub employee_status: Option<String>,
    /// Gender.
    pub gender: Option<String>,
    /// HR status code.
    pub hr_status_code: Option<String>,
    /// Job code.
    pub job_code: Option<String>,
    /// Manager id.
    pub manager_id: Option<String>,
    /// Organization code.
    pub org_code: Option<String>,
    /// Sub-organization code.
    pub sub_org_code: Option<String>,
    /// Payroll group.
    pub pay_group: Option<String>,
    /// Proxy email addresses.
    pub proxy_addresses: Vec<String>,
}

impl User {
    /// Creates a new active user with a freshly generated guid.
    #[must_use]
    pub fn new() -> Self {
        Self {
            guid: Uuid::new_v4().to_string(),
            email: None,
            password: None,
            deactivated: false,
            deactivated_uid: None,
            first_name: None,
            last_name: None,
            preferred_name: None,
            allow_password_change: true,
            login_disabled: false,
            locked: false,
            force_password_change: false,
            email_verified: false,
            login_time: None,
            signup_key: None,
            change_email_key: None,
            proposed_email: None,
            reset_password_key: None,
            domains_visited: Vec::new(),
            groups: Vec::new(),
            social_ids: Vec::new(),
            social_id_strengths: HashMap::new(),
            raw_partner_guid: None,
            raw_sso_guid: None,
            telephone_number: None,
            city: None,
            state: None,
            postal_code: None,
            country: None,
            employee_id: None,
            department_number: None,
            designation: None,
            employee_status: None,
            gender: None,
            hr_status_code: None,
            job_code: None,
            manager_id: None,
            org_code: None,
            sub_org_code: None,
            pay_group: None,
            proxy_addresses: Vec::new(),
        }
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the first name.
    #[must_use]
    pub fn with_first_name(mut self, name: impl Into<String>) -> Self {
        self.first_name = Some(name.into());
        self
    }

    /// Sets the last name.
    #[must_use]
    pub fn with_last_name(mut self, name: impl Into<String>) -> Self {
        self.last_name = Some(name.into());
        self
    }

    /// Sets whether the account is deactivated.
    #[must_use]
    pub const fn with_deactivated(mut self, deactivated: bool) -> Self {
        self.deactivated = deactivated;
        self
    }

    /// The partner-system guid, falling back to the durable guid when no
    /// explicit link is stored.
    #[must_use]
    pub fn partner_guid(&self) -> &str {
        self.raw_partner_guid.as_deref().unwrap_or(&self.guid)
    }

    /// The single-sign-on guid, falling back to the durable guid when no
    /// explicit link is stored.
    #[must_use]
    pub fn sso_guid(&self) -> &str {
        self.raw_sso_guid.as_deref().unwrap_or(&self.guid)
    }

    /// The primary social identity id, if any is linked.
    #[must_use]
    pub fn social_id(&self) -> Option<&str> {
        self.social_ids.first().map(String::as_str)
    }

    /// Links a social identity, replacing any stored strength for that id.
    pub fn set_social_id(&mut self, id: impl Into<String>, strength: Option<f64>) {
        let id = id.into();
        if let Some(strength) = strength {
            self.social_id_strengths.insert(id.clone(), strength);
        } else {
            self.social_id_strengths.remove(&id);
        }
        if !self.social_ids.contains(&id) {
            self.social_ids.push(id);
        }
    }

    /// The stored strength of a social identity link.
    #[must_use]
    pub fn social_id_strength_for(&self, id: &str) -> Option<f64> {
        self.social_id_strengths.get(id).copied()
    }

    /// Whether any business/HR field is populated.
    #[must_use]
    pub fn has_hr_attributes(&self) -> bool {
        self.designation.is_some()
            || self.employee_status.is_some()
            || self.gender.is_some()
            || self.hr_status_code.is_some()
            || self.job_code.is_some()
            || self.manager_id.is_some()
            || self.org_code.is_some()
            || self.sub_org_code.is_some()
            || self.pay_group.is_some()
            || self.preferred_name.is_some()
            || !self.proxy_addresses.is_empty()
    }

    /// Whether any federation/contact field triggering the federated
    /// structural class is populated.
    #[must_use]
    pub fn has_federated_attributes(&self) -> bool {
        self.raw_partner_guid.is_some() || self.country.is_some()
    }
}

impl Default for User {
    fn default() -> Self {
        Self::new()
    }
}
