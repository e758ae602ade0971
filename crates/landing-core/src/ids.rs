//! # Identifier Generation
//!
//! ## Dual-Key Identity Pattern
//! Every product has two identifiers:
//! - `id`: UUID v4, 36 characters, immutable, used for relations
//! - `product_id`: short random 3-digit public id, used in public URLs
//!   together with the slug (`/product/{slug}/{product_id}`)
//!
//! Only 900 public ids exist, so collisions are expected as the catalog
//! grows. Uniqueness is enforced by the database, and the product
//! repository regenerates a candidate when the insert is rejected.

use rand::Rng;
use uuid::Uuid;

use crate::{PUBLIC_ID_MAX, PUBLIC_ID_MIN};

/// Generates a new record id (UUID v4, hyphenated, 36 characters).
pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a random 3-digit public product id in `100..=999`.
///
/// ## Example
/// ```rust
/// use landing_core::ids::generate_public_id;
///
/// let id = generate_public_id();
/// assert_eq!(id.len(), 3);
/// ```
pub fn generate_public_id() -> String {
    generate_public_id_with(&mut rand::thread_rng())
}

/// Same as [`generate_public_id`] with a caller-supplied RNG.
pub fn generate_public_id_with<R: Rng>(rng: &mut R) -> String {
    rng.gen_range(PUBLIC_ID_MIN..=PUBLIC_ID_MAX).to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_record_id_shape() {
        let id = new_record_id();
        assert_eq!(id.len(), 36);
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_public_id_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2_000 {
            let id = generate_public_id_with(&mut rng);
            let value: u32 = id.parse().unwrap();
            assert!((PUBLIC_ID_MIN..=PUBLIC_ID_MAX).contains(&value));
            assert_eq!(id.len(), 3);
        }
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let a = generate_public_id_with(&mut StdRng::seed_from_u64(42));
        let b = generate_public_id_with(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
