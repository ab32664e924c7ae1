//! Wire rendering of distinguished names.
//!
//! The name algebra keeps components root-to-leaf; the wire form lists them
//! leaf-first, comma-separated, with RFC 4514 escaping of component values.

use idm_core::Dn;

/// Renders a [`Dn`] in wire form (`cn=leaf,ou=People,dc=example,dc=org`).
///
/// The root renders as the empty string.
#[must_use]
pub fn dn_to_wire(dn: &Dn) -> String {
    let rdns: Vec<String> = dn
        .components()
        .iter()
        .rev()
        .map(|c| format!("{}={}", c.attr_type, dn_escape(&c.value)))
        .collect();
    rdns.join(",")
}

/// Parses a wire-form DN back into the name algebra.
///
/// Returns `None` for values that are not a sequence of `type=value` RDNs.
/// The empty string parses as the directory root.
#[must_use]
pub fn dn_from_wire(wire: &str) -> Option<Dn> {
    if wire.is_empty() {
        return Some(Dn::ROOT);
    }

    let mut components = Vec::new();
    for rdn in split_unescaped(wire, ',') {
        let mut parts = split_unescaped(&rdn, '=');
        let attr_type = parts.next()?;
        let value = parts.next()?;
        if parts.next().is_some() || attr_type.is_empty() {
            return None;
        }
        components.push(idm_core::DnComponent::new(
            attr_type.trim(),
            dn_unescape(value.trim_start()),
        ));
    }

    components.reverse();
    Some(Dn::new(components))
}

/// Splits on a separator, honoring backslash escapes.
fn split_unescaped(value: &str, separator: char) -> impl Iterator<Item = String> + '_ {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    for c in value.chars() {
        if escaped {
            current.push('\\');
            current.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == separator {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    parts.push(current);
    parts.into_iter()
}

/// Reverses [`dn_escape`], resolving both `\x` and `\NN` hex escapes.
fn dn_unescape(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some(first) if first.is_ascii_hexdigit() => match chars.peek() {
                Some(second) if second.is_ascii_hexdigit() => {
                    let high = first.to_digit(16).unwrap_or(0);
                    let low = chars.next().and_then(|c| c.to_digit(16)).unwrap_or(0);
                    if let Some(decoded) = char::from_u32(high * 16 + low) {
                        result.push(decoded);
                    }
                }
                _ => result.push(first),
            },
            Some(escaped) => result.push(escaped),
            None => {}
        }
    }
    result
}

/// Escapes special characters in a DN attribute value per RFC 4514.
fn dn_escape(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for (i, c) in value.chars().enumerate() {
        match c {
            '"' | '+' | ',' | ';' | '<' | '>' | '\\' | '=' => {
                result.push('\\');
                result.push(c);
            }
            '#' | ' ' if i == 0 => {
                result.push('\\');
                result.push(c);
            }
            '\0' => result.push_str("\\00"),
            _ => result.push(c),
        }
    }
    if result.ends_with(' ') {
        result.insert(result.len() - 1, '\\');
    }
    result
}
