//! Identifiers for rows and sessions.
//!
//! Row IDs are lowercase ULIDs: they sort by creation time, so `id DESC`
//! breaks ties between posts published within the same timestamp. Session
//! tokens are random and carry no time component.

use ulid::Ulid;
use uuid::Uuid;

/// Generates row IDs and session tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdGenerator;

impl IdGenerator {
    /// Create a generator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// A new row ID.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// A new session token.
    #[must_use]
    pub fn generate_token(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_ids_are_lowercase_and_ordered() {
        let ids = IdGenerator::new();
        let first = ids.generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = ids.generate();

        assert_eq!(first.len(), 26);
        assert_eq!(first, first.to_lowercase());
        assert!(second > first);
    }

    #[test]
    fn test_tokens_are_unique_hex() {
        let ids = IdGenerator::new();
        let token = ids.generate_token();

        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, ids.generate_token());
    }
}
