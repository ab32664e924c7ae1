//! Attribute mask registry.
//!
//! Maps logical update-intents onto the wire attributes they are permitted
//! to touch. The repository applies the mask to scope partial updates so a
//! save driven by a stale in-memory snapshot cannot clobber unrelated
//! fields.

use std::collections::HashSet;

use idm_core::UserAttr;

use crate::attributes;

/// The wire attributes one update-intent touches.
///
/// The intent space is closed; the mapping is total and every set is
/// non-empty.
#[must_use]
pub fn wire_attributes(attr: UserAttr) -> &'static [&'static str] {
    match attr {
        UserAttr::Email => &[attributes::UID, attributes::FLAG_EMAIL_VERIFIED],
        UserAttr::Name => &[attributes::FIRST_NAME, attributes::LAST_NAME],
        UserAttr::Password => &[attributes::PASSWORD],
        UserAttr::LoginTime => &[attributes::LOGIN_TIME],
        UserAttr::Flags => &[
            attributes::FLAG_ALLOW_PASSWORD_CHANGE,
            attributes::FLAG_EMAIL_VERIFIED,
            attributes::FLAG_LOGIN_DISABLED,
            attributes::FLAG_FORCE_PASSWORD_CHANGE,
            attributes::FLAG_LOCKED,
        ],
        UserAttr::DomainsVisited => &[attributes::DOMAINS_VISITED],
        UserAttr::SelfServiceKeys => &[
            attributes::CHANGE_EMAIL_KEY,
            attributes::PROPOSED_EMAIL,
            attributes::RESET_PASSWORD_KEY,
            attributes::SIGNUP_KEY,
        ],
        UserAttr::SocialIdentity => &[attributes::SOCIAL_ID, attributes::SOCIAL_ID_STRENGTH],
        UserAttr::PartnerGuid => &[attributes::PARTNER_GUID],
        UserAttr::EmployeeNumber => &[attributes::EMPLOYEE_NUMBER],
        UserAttr::DepartmentNumber => &[attributes::DEPARTMENT_NUMBER],
        UserAttr::Telephone => &[attributes::TELEPHONE],
        UserAttr::City => &[attributes::CITY],
        UserAttr::State => &[attributes::STATE],
        UserAttr::PostalCode => &[attributes::POSTAL_CODE],
        UserAttr::Country => &[attributes::COUNTRY],
        UserAttr::Designation => &[attributes::DESIGNATION],
        UserAttr::EmployeeStatus => &[attributes::EMPLOYEE_STATUS],
        UserAttr::Gender => &[attributes::GENDER],
        UserAttr::HrStatusCode => &[attributes::HR_STATUS_CODE],
        UserAttr::JobCode => &[attributes::JOB_CODE],
        UserAttr::ManagerId => &[attributes::MANAGER_ID],
        UserAttr::OrgCode => &[attributes::ORG_CODE],
        UserAttr::SubOrgCode => &[attributes::SUB_ORG_CODE],
        UserAttr::PayGroup => &[attributes::PAY_GROUP],
        UserAttr::PreferredName => &[attributes::PREFERRED_NAME],
        UserAttr::ProxyAddresses => &[attributes::PROXY_ADDRESSES],
    }
}

/// Intents covered by the default mask.
const DEFAULT_INTENTS: [UserAttr; 3] = [UserAttr::Email, UserAttr::Name, UserAttr::Flags];

/// Builds the set of wire attributes an update with the given intents may
/// touch. Zero intents yields the default mask (email, name, flags).
#[must_use]
pub fn attribute_mask(attrs: &[UserAttr]) -> HashSet<&'static str> {
    let intents = if attrs.is_empty() {
        &DEFAULT_INTENTS[..]
    } else {
        attrs
    };
    intents
        .iter()
        .flat_map(|attr| wire_attributes(*attr))
        .copied()
        .collect()
}
