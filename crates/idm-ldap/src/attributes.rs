//! Wire attribute catalog.
//!
//! Names of the LDAP attributes and structural classes the user schema is
//! stored under. The mapper and the attribute mask are the only consumers;
//! nothing else should spell these strings out.

/// Entry object class attribute.
pub const OBJECT_CLASS: &str = "objectClass";

/// Primary key attribute (RDN): the email of an active account or the
/// deactivated identifier of an inactive one.
pub const CN: &str = "cn";

/// Secondary identity attribute; always carries the email address.
pub const UID: &str = "uid";

/// Durable unique id.
pub const GUID: &str = "idmGuid";

/// Partner-system federated guid.
pub const PARTNER_GUID: &str = "partnerGuid";

/// Single-sign-on federated guid.
pub const SSO_GUID: &str = "ssoGuid";

/// First name.
pub const FIRST_NAME: &str = "givenName";

/// Last name.
pub const LAST_NAME: &str = "sn";

/// Credential material.
pub const PASSWORD: &str = "userPassword";

/// Last login timestamp, generalized-time syntax.
pub const LOGIN_TIME: &str = "loginTime";

/// Visited-domain audit trail.
pub const DOMAINS_VISITED: &str = "idmDomainsVisited";

/// Group membership DNs.
pub const GROUP_MEMBERSHIP: &str = "groupMembership";

/// Reverse membership attribute on group entries.
pub const GROUP_MEMBER: &str = "member";

/// Signup confirmation key.
pub const SIGNUP_KEY: &str = "idmSignupKey";

/// Change-email confirmation key.
pub const CHANGE_EMAIL_KEY: &str = "idmChangeEmailKey";

/// Proposed email address.
pub const PROPOSED_EMAIL: &str = "idmProposedEmail";

/// Password-reset key.
pub const RESET_PASSWORD_KEY: &str = "idmResetPasswordKey";

/// Social federated identity id.
pub const SOCIAL_ID: &str = "socialId";

/// Social federated identity `id$strength` encoding.
pub const SOCIAL_ID_STRENGTH: &str = "socialIdStrength";

/// Telephone number.
pub const TELEPHONE: &str = "telephoneNumber";

/// City.
pub const CITY: &str = "city";

/// State or province.
pub const STATE: &str = "st";

/// Postal code.
pub const POSTAL_CODE: &str = "postalCode";

/// Country.
pub const COUNTRY: &str = "country";

/// Employee number.
pub const EMPLOYEE_NUMBER: &str = "employeeNumber";

/// Department number.
pub const DEPARTMENT_NUMBER: &str = "departmentNumber";

/// Staff designation.
pub const DESIGNATION: &str = "idmDesignation";

/// Employment status.
pub const EMPLOYEE_STATUS: &str = "idmEmployeeStatus";

/// Gender.
pub const GENDER: &str = "idmGender";

/// HR status code.
pub const HR_STATUS_CODE: &str = "idmHrStatusCode";

/// Job code.
pub const JOB_CODE: &str = "idmJobCode";

/// Manager id.
pub const MANAGER_ID: &str = "idmManagerId";

/// Organization code.
pub const ORG_CODE: &str = "idmOrgCode";

/// Sub-organization code.
pub const SUB_ORG_CODE: &str = "idmSubOrgCode";

/// Payroll group.
pub const PAY_GROUP: &str = "idmPayGroup";

/// Preferred (display) name.
pub const PREFERRED_NAME: &str = "idmPreferredName";

/// Proxy email addresses.
pub const PROXY_ADDRESSES: &str = "idmProxyAddresses";

/// Whether the user may change their own password.
pub const FLAG_ALLOW_PASSWORD_CHANGE: &str = "allowPasswordChange";

/// Whether login is disabled.
pub const FLAG_LOGIN_DISABLED: &str = "loginDisabled";

/// Whether the account is locked by intruder detection.
pub const FLAG_LOCKED: &str = "lockedByIntruder";

/// Whether a password change is forced at next login.
pub const FLAG_FORCE_PASSWORD_CHANGE: &str = "forcePasswordChange";

/// Whether the email address has been verified.
pub const FLAG_EMAIL_VERIFIED: &str = "emailVerified";

/// Structural classes every user entry carries.
pub const USER_OBJECT_CLASSES: [&str; 4] = ["top", "person", "organizationalPerson", "inetOrgPerson"];

/// Optional structural class gained when any business/HR field is populated.
pub const HR_PERSON_CLASS: &str = "idmHrPerson";

/// Optional structural class gained when any federation/contact field is
/// populated.
pub const FEDERATED_PERSON_CLASS: &str = "idmFederatedPerson";

/// Prefix of the stable primary key assigned to a deactivated account.
pub const DEACTIVATED_PREFIX: &str = "deactivated-";
