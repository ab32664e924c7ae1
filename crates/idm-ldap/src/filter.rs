//! Search filter translation.
//!
//! Renders the core query algebra into an RFC 4515 filter string. The
//! translation is structure-directed: leaves become attribute assertions,
//! boolean nodes become `(&...)` / `(|...)` wrappers around their children.

use idm_core::query::{BooleanOp, Comparison, ComparisonKind, Expression, SearchAttribute};

use crate::attributes;
use crate::dn_format::dn_to_wire;

/// Renders an expression tree as a wire filter string.
#[must_use]
pub fn to_ldap_filter(expression: &Expression) -> String {
    match expression {
        Expression::Comparison(comparison) => render_comparison(comparison),
        Expression::Membership(group) => format!(
            "({}={})",
            attributes::GROUP_MEMBERSHIP,
            ldap_escape(&dn_to_wire(group.dn()))
        ),
        Expression::Boolean(node) => {
            let op = match node.op() {
                BooleanOp::And => '&',
                BooleanOp::Or => '|',
            };
            let children: String = node.components().iter().map(|c| to_ldap_filter(c)).collect();
            format!("({op}{children})")
        }
    }
}

fn render_comparison(comparison: &Comparison) -> String {
    let attr = wire_name(comparison.attribute);
    match comparison.kind {
        ComparisonKind::Eq => format!("({attr}={})", ldap_escape(&comparison.value)),
        ComparisonKind::StartsWith => format!("({attr}={}*)", ldap_escape(&comparison.value)),
        // wildcards in the value are part of the pattern; everything between
        // them still needs escaping
        ComparisonKind::Like => {
            let pattern: Vec<String> = comparison.value.split('*').map(|s| ldap_escape(s)).collect();
            format!("({attr}={})", pattern.join("*"))
        }
    }
}

/// The wire attribute a searchable attribute matches against.
#[must_use]
pub fn wire_name(attribute: SearchAttribute) -> &'static str {
    match attribute {
        SearchAttribute::Guid => attributes::GUID,
        SearchAttribute::SsoGuid => attributes::SSO_GUID,
        SearchAttribute::PartnerGuid => attributes::PARTNER_GUID,
        SearchAttribute::Email => attributes::UID,
        SearchAttribute::ProxyAddress => attributes::PROXY_ADDRESSES,
        SearchAttribute::FirstName => attributes::FIRST_NAME,
        SearchAttribute::LastName => attributes::LAST_NAME,
        SearchAttribute::EmployeeId => attributes::EMPLOYEE_NUMBER,
        SearchAttribute::Designation => attributes::DESIGNATION,
    }
}

/// Escapes special characters in a filter assertion value per RFC 4515.
fn ldap_escape(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => result.push_str("\\5c"),
            '*' => result.push_str("\\2a"),
            '(' => result.push_str("\\28"),
            ')' => result.push_str("\\29"),
            '\0' => result.push_str("\\00"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use idm_core::Dn;

    use super::*;

    #[test]
    fn renders_equality_leaf() {
        let expr = Expression::eq(SearchAttribute::Email, "jane@example.com");
        assert_eq!(to_ldap_filter(&expr), "(uid=jane@example.com)");
    }

    #[test]
    fn escapes_assertion_values() {
        let expr = Expression::eq(SearchAttribute::LastName, "O(range)*");
        assert_eq!(to_ldap_filter(&expr), "(sn=O\\28range\\29\\2a)");
    }

    #[test]
    fn starts_with_appends_a_wildcard() {
        let expr = Expression::starts_with(SearchAttribute::FirstName, "Ja");
        assert_eq!(to_ldap_filter(&expr), "(givenName=Ja*)");
    }

    #[test]
    fn like_keeps_pattern_wildcards_but_escapes_segments() {
        let expr = Expression::like(SearchAttribute::LastName, "Sm*th(e)");
        assert_eq!(to_ldap_filter(&expr), "(sn=Sm*th\\28e\\29)");
    }

    #[test]
    fn renders_nested_boolean_nodes() {
        let expr = Expression::eq(SearchAttribute::FirstName, "Jane")
            .and(Expression::eq(SearchAttribute::LastName, "Doe"))
            .or(Expression::eq(SearchAttribute::Email, "jdoe@example.com"));

        assert_eq!(
            to_ldap_filter(&expr),
            "(|(&(givenName=Jane)(sn=Doe))(uid=jdoe@example.com))"
        );
    }

    #[test]
    fn renders_membership_against_the_group_dn() {
        let group = Dn::ROOT
            .child("dc", "org")
            .child("ou", "Groups")
            .child("cn", "Staff")
            .as_group();
        let expr = Expression::member_of(group);

        assert_eq!(
            to_ldap_filter(&expr),
            "(groupMembership=cn=Staff,ou=Groups,dc=org)"
        );
    }
}
