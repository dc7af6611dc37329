//! Reservation tokens embedded in restock purchase links.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{RngCore, rngs::OsRng};

const TOKEN_BYTES: usize = 32;

/// A random, URL-safe reservation token (256 bits, 43 characters).
#[must_use]
pub fn reservation_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];

    OsRng.fill_bytes(&mut bytes);

    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_url_safe() {
        let token = reservation_token();

        assert_eq!(token.len(), 43);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn tokens_differ() {
        assert_ne!(reservation_token(), reservation_token());
    }
}
