//! Authentication validator
//!
//! Checks the bearer credential sent with write requests against the single
//! configured secret. There are no user accounts.

use crate::error::AuthError;

const BEARER_SCHEME: &str = "Bearer";

/// Performs basic input sanitation on a presented token.
fn is_valid_input(input: &str) -> bool {
    !input.is_empty() && !input.contains(['\r', '\n', '\0'])
}

/// Compares every byte of equal-length inputs before answering.
fn tokens_match(presented: &[u8], expected: &[u8]) -> bool {
    if presented.len() != expected.len() {
        return false;
    }
    presented
        .iter()
        .zip(expected)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Validates the raw bytes of an `Authorization: Bearer <token>` header.
///
/// Header values may carry any octet, so a value that is not UTF-8 is a
/// malformed credential rather than a transport error.
pub fn validate_bearer(authorization: Option<&[u8]>, auth_key: &str) -> Result<(), AuthError> {
    let header = authorization.ok_or(AuthError::MissingCredentials)?;
    let header = std::str::from_utf8(header).map_err(|_| AuthError::MalformedHeader)?;

    let (scheme, token) = header
        .trim()
        .split_once(' ')
        .ok_or(AuthError::MalformedHeader)?;

    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(AuthError::MalformedHeader);
    }

    let token = token.trim();
    if !is_valid_input(token) {
        return Err(AuthError::MalformedHeader);
    }

    if !auth_key.is_empty() && tokens_match(token.as_bytes(), auth_key.as_bytes()) {
        Ok(())
    } else {
        Err(AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "s3cret-key";

    #[test]
    fn test_valid_bearer() {
        assert!(validate_bearer(Some(&b"Bearer s3cret-key"[..]), KEY).is_ok());
        assert!(validate_bearer(Some(&b"bearer s3cret-key"[..]), KEY).is_ok());
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(
            validate_bearer(None, KEY),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn test_malformed_header() {
        for header in ["s3cret-key", "Basic s3cret-key", "Bearer ", "Bearer"] {
            assert!(
                matches!(validate_bearer(Some(header.as_bytes()), KEY), Err(AuthError::MalformedHeader)),
                "{header}"
            );
        }
    }

    #[test]
    fn test_wrong_token() {
        for token in ["Bearer s3cret-kez", "Bearer s3cret", "Bearer s3cret-key-longer"] {
            assert!(
                matches!(validate_bearer(Some(token.as_bytes()), KEY), Err(AuthError::InvalidToken)),
                "{token}"
            );
        }
    }

    #[test]
    fn test_non_ascii_header_is_rejected() {
        assert!(matches!(
            validate_bearer(Some("Bearer s\u{e9}cret-key".as_bytes()), KEY),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            validate_bearer(Some(&b"Bearer s\xe9cret-key"[..]), KEY),
            Err(AuthError::MalformedHeader)
        ));
    }

    #[test]
    fn test_empty_secret_never_matches() {
        assert!(matches!(
            validate_bearer(Some(&b"Bearer anything"[..]), ""),
            Err(AuthError::InvalidToken)
        ));
    }
}
