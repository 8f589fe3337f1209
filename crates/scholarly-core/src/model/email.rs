// ── Email address validation ──

use crate::error::CoreError;

/// Accept `local@domain.tld` shapes: one `@`, no whitespace, a dot in
/// the domain that is neither its first nor last character.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    let invalid = || CoreError::InvalidEmail {
        email: email.to_owned(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(invalid());
    };
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    match domain.rfind('.') {
        Some(dot) if dot > 0 && dot + 1 < domain.len() && !domain.starts_with('.') => Ok(()),
        _ => Err(invalid()),
    }
}

/// Canonical form used for lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        for email in ["parent@example.com", "a.b+c@school.edu", "x@y.co.uk"] {
            assert!(validate_email(email).is_ok(), "{email}");
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for email in ["", "parent", "@example.com", "a@b", "a@.com", "a@b.", "a b@c.com", "a@b@c.com"] {
            assert!(
                matches!(validate_email(email), Err(CoreError::InvalidEmail { .. })),
                "{email:?}"
            );
        }
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_email("  Parent@Example.COM "), "parent@example.com");
    }
}
