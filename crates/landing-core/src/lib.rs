//! # landing-core: Pure Domain Logic for the Landing Catalog
//!
//! Record types, slug and public-id generation, and input validation for
//! the supplement landing page and its admin dashboard. No I/O happens in
//! this crate.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Landing Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          Landing page + admin dashboard (React)                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    HTTP handlers (external)                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ landing-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   slug    │  │    ids    │  │ validation│  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  landing-db (Database Layer)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Records, inputs, changesets, listing and aggregate types
//! - [`slug`] - URL-safe slug generation
//! - [`ids`] - UUID record ids and random 3-digit public ids
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use landing_core::slug::generate_slug;
//! use landing_core::validation::validate_new_product;
//! use landing_core::NewProduct;
//!
//! assert_eq!(generate_slug("Green Tea & Citrus!!"), "green-tea-and-citrus");
//!
//! let product = NewProduct::new("Keto Burn", "Daily fat burner", "https://shop.example/keto");
//! assert!(validate_new_product(&product).is_ok());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ids;
pub mod slug;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::ValidationError;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Money-back guarantee length used when none (or a non-numeric value) is
/// supplied at creation.
pub const DEFAULT_MONEY_BACK_DAYS: i64 = 60;

/// Upper bound accepted for the money-back guarantee (ten years).
pub const MAX_MONEY_BACK_DAYS: i64 = 3650;

/// Smallest public product id.
pub const PUBLIC_ID_MIN: u32 = 100;

/// Largest public product id.
pub const PUBLIC_ID_MAX: u32 = 999;

/// Page size used when the listing query does not specify one.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Largest page size the listing will return.
pub const MAX_PAGE_LIMIT: u32 = 100;
