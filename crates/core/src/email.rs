//! Email-domain derivation.
//!
//! A user's tenant is bound opportunistically from the suffix of their email
//! address; there is no domain-ownership verification.

use crate::error::{CoreError, CoreResult};

/// Extract the domain part of an email address (`alice@acme.com` → `acme.com`).
pub fn email_domain(email: &str) -> CoreResult<&str> {
    match email.rsplit_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(domain),
        _ => Err(CoreError::validation(format!(
            "email has no usable domain: {email}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_suffix_after_at() {
        assert_eq!(email_domain("alice@acme.com").unwrap(), "acme.com");
    }

    #[test]
    fn rejects_missing_at() {
        assert!(email_domain("no-at-sign").is_err());
    }

    #[test]
    fn rejects_empty_domain() {
        assert!(email_domain("alice@").is_err());
        assert!(email_domain("@acme.com").is_err());
    }
}
