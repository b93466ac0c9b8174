//! # Order and Tracking IDs
//!
//! Order IDs are random UUIDs. Tracking IDs are a simulation convenience: they
//! are derived from a SHA-256 digest of the normalized shipping address, so the
//! same address always yields the same tracking ID. Nothing about them is meant
//! to be secret or unguessable.

use crate::error::IdError;
use crate::order::Address;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Source of order IDs
pub trait IdGenerator: Send + Sync {
    /// A new globally unique order ID
    fn order_id(&self) -> Result<String, IdError>;
}

/// Random v4 UUIDs
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn order_id(&self) -> Result<String, IdError> {
        Ok(Uuid::new_v4().to_string())
    }
}

/// Deterministic tracking ID for a shipping address.
///
/// Format: two letters, a dash, then 12 digits, e.g. `"QJ-004891265320"`.
pub fn tracking_id(address: &Address) -> String {
    tracking_id_for(&address.normalized())
}

/// Tracking ID for an already-normalized address string
pub fn tracking_id_for(normalized_address: &str) -> String {
    let digest = Sha256::digest(normalized_address.as_bytes());
    let letters: String = digest[..2]
        .iter()
        .map(|b| char::from(b'A' + b % 26))
        .collect();
    let mut number = [0u8; 8];
    number.copy_from_slice(&digest[2..10]);
    let number = u64::from_be_bytes(number) % 1_000_000_000_000;
    format!("{letters}-{number:012}")
}

/// Short hex fingerprint of a normalized address, for logs
pub fn address_fingerprint(address: &Address) -> String {
    let digest = Sha256::digest(address.normalized().as_bytes());
    hex::encode(&digest[..6])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn address(street: &str) -> Address {
        Address {
            street_address: street.to_string(),
            city: "Mountain View".to_string(),
            state: "CA".to_string(),
            country: "US".to_string(),
            zip_code: 94043,
        }
    }

    #[test]
    fn test_tracking_id_deterministic() {
        let a = address("1600 Amphitheatre Parkway");
        assert_eq!(tracking_id(&a), tracking_id(&a));
        assert_eq!(
            tracking_id(&a),
            tracking_id(&address("  1600  amphitheatre parkway"))
        );
        assert_eq!(tracking_id(&a), tracking_id_for(&a.normalized()));
    }

    #[test]
    fn test_tracking_id_format() {
        let id = tracking_id(&address("1 Main St"));
        assert_eq!(id.len(), 15);
        let (letters, digits) = id.split_at(2);
        assert!(letters.chars().all(|c| c.is_ascii_uppercase()));
        assert!(digits.starts_with('-'));
        assert!(digits[1..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_tracking_id_differs_by_address() {
        assert_ne!(
            tracking_id(&address("1 Main St")),
            tracking_id(&address("2 Main St"))
        );
    }

    #[test]
    fn test_order_ids_unique() {
        let ids = UuidGenerator;
        let sample: HashSet<String> = (0..10_000).map(|_| ids.order_id().unwrap()).collect();
        assert_eq!(sample.len(), 10_000);
    }

    #[test]
    fn test_address_fingerprint() {
        let fp = address_fingerprint(&address("1 Main St"));
        assert_eq!(fp.len(), 12);
    }
}
