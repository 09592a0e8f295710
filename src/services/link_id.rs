use crate::api::error::AppError;
use base64::Engine;
use rand::RngCore;
use rand::rngs::OsRng;

/// External link identifiers are always this long.
pub const LINK_ID_LEN: usize = 12;

// 9 random bytes encode to exactly 12 url-safe base64 characters.
const LINK_ID_BYTES: usize = 9;

/// Generate a fixed-length, URL-safe, cryptographically random link
/// identifier. Carries no embedded structure (no timestamps, owner ids or
/// counters), so identifiers cannot be enumerated or correlated.
///
/// Fails loudly if the OS entropy source is unavailable rather than
/// degrading to a weaker source.
pub fn generate_link_id() -> Result<String, AppError> {
    let mut bytes = [0u8; LINK_ID_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AppError::Internal(format!("entropy source unavailable: {}", e)))?;

    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_fixed_length() {
        for _ in 0..100 {
            assert_eq!(generate_link_id().unwrap().len(), LINK_ID_LEN);
        }
    }

    #[test]
    fn test_url_safe_alphabet() {
        for _ in 0..100 {
            let id = generate_link_id().unwrap();
            assert!(
                id.chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
                "unexpected character in {}",
                id
            );
        }
    }

    #[test]
    fn test_no_observable_collisions() {
        let ids: HashSet<String> = (0..10_000).map(|_| generate_link_id().unwrap()).collect();
        assert_eq!(ids.len(), 10_000);
    }
}
