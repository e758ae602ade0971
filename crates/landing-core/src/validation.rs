//! # Validation Module
//!
//! Input validation for catalog records.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Dashboard form (TypeScript)                                  │
//! │  └── Required fields, immediate feedback                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler                                                 │
//! │  └── THIS MODULE: parse_money_back_days, validate_new_product, ...     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Repository (landing-db)                                      │
//! │  └── Re-runs the record checks before writing                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE (slug, product_id)                                         │
//! │  └── Foreign keys with ON DELETE CASCADE                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{
    IngredientChanges, NewIngredient, NewProduct, NewWhyChoose, ProductChanges, WhyChooseChanges,
};
use crate::{DEFAULT_MONEY_BACK_DAYS, MAX_MONEY_BACK_DAYS, PUBLIC_ID_MAX, PUBLIC_ID_MIN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of names, titles and slugs (VARCHAR(255) columns).
pub const MAX_SHORT_TEXT: usize = 255;

/// Maximum length of a search term.
pub const MAX_SEARCH_QUERY: usize = 100;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a required short text field (name, title, redirect link).
///
/// ## Rules
/// - Must not be blank
/// - At most [`MAX_SHORT_TEXT`] characters
pub fn validate_short_text(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > MAX_SHORT_TEXT {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_SHORT_TEXT,
        });
    }

    Ok(())
}

/// Validates a required free-text field (description).
pub fn validate_required_text(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

/// Validates a slug produced by [`crate::slug::generate_slug`] or supplied
/// explicitly.
pub fn validate_slug(slug: &str) -> ValidationResult<()> {
    if slug.is_empty() {
        return Err(ValidationError::invalid_format(
            "slug",
            "name must contain at least one letter or digit",
        ));
    }

    if slug.chars().count() > MAX_SHORT_TEXT {
        return Err(ValidationError::TooLong {
            field: "slug".to_string(),
            max: MAX_SHORT_TEXT,
        });
    }

    if !slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::invalid_format(
            "slug",
            "must contain only letters, digits, hyphens and underscores",
        ));
    }

    Ok(())
}

/// Validates a money-back guarantee length.
pub fn validate_money_back_days(days: i64) -> ValidationResult<()> {
    if !(0..=MAX_MONEY_BACK_DAYS).contains(&days) {
        return Err(ValidationError::OutOfRange {
            field: "money_back_days".to_string(),
            min: 0,
            max: MAX_MONEY_BACK_DAYS,
        });
    }
    Ok(())
}

/// Parses a money-back days form value leniently.
///
/// Reads the leading integer of the input, ignoring trailing garbage
/// (`"45 days"` → 45). Missing, non-numeric and zero values fall back to
/// [`DEFAULT_MONEY_BACK_DAYS`].
///
/// ## Example
/// ```rust
/// use landing_core::validation::parse_money_back_days;
///
/// assert_eq!(parse_money_back_days(Some("90")), 90);
/// assert_eq!(parse_money_back_days(Some("abc")), 60);
/// assert_eq!(parse_money_back_days(None), 60);
/// ```
pub fn parse_money_back_days(raw: Option<&str>) -> i64 {
    let Some(raw) = raw else {
        return DEFAULT_MONEY_BACK_DAYS;
    };

    let raw = raw.trim_start();
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    match digits[..end].parse::<i64>() {
        Ok(0) | Err(_) => DEFAULT_MONEY_BACK_DAYS,
        Ok(value) if negative => -value,
        Ok(value) => value,
    }
}

/// Validates a search term.
///
/// ## Returns
/// The trimmed term, or `None` when it is blank.
pub fn validate_search_query(query: &str) -> ValidationResult<Option<String>> {
    let query = query.trim();

    if query.chars().count() > MAX_SEARCH_QUERY {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: MAX_SEARCH_QUERY,
        });
    }

    if query.is_empty() {
        Ok(None)
    } else {
        Ok(Some(query.to_string()))
    }
}

/// Validates a UUID record id.
///
/// ## Example
/// ```rust
/// use landing_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::required("id"));
    }

    uuid::Uuid::parse_str(id).map_err(|_| {
        ValidationError::invalid_format("id", "must be a valid UUID")
    })?;

    Ok(())
}

/// Validates a 3-digit public product id.
pub fn validate_public_id(product_id: &str) -> ValidationResult<()> {
    let value: u32 = product_id
        .parse()
        .map_err(|_| ValidationError::invalid_format("product_id", "must be numeric"))?;

    if !(PUBLIC_ID_MIN..=PUBLIC_ID_MAX).contains(&value) || product_id.len() != 3 {
        return Err(ValidationError::OutOfRange {
            field: "product_id".to_string(),
            min: i64::from(PUBLIC_ID_MIN),
            max: i64::from(PUBLIC_ID_MAX),
        });
    }

    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates a product before insert.
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_short_text("name", &product.name)?;
    validate_required_text("description", &product.description)?;
    validate_short_text("redirect_link", &product.redirect_link)?;
    validate_slug(&product.resolved_slug())?;
    validate_money_back_days(product.resolved_money_back_days())?;
    Ok(())
}

/// Validates the supplied fields of a product changeset.
pub fn validate_product_changes(changes: &ProductChanges) -> ValidationResult<()> {
    if let Some(name) = &changes.name {
        validate_short_text("name", name)?;
    }
    if let Some(slug) = changes.derived_slug() {
        validate_slug(&slug)?;
    }
    if let Some(description) = &changes.description {
        validate_required_text("description", description)?;
    }
    if let Some(link) = &changes.redirect_link {
        validate_short_text("redirect_link", link)?;
    }
    if let Some(days) = changes.money_back_days {
        validate_money_back_days(days)?;
    }
    Ok(())
}

pub fn validate_new_ingredient(ingredient: &NewIngredient) -> ValidationResult<()> {
    validate_short_text("title", &ingredient.title)?;
    validate_required_text("description", &ingredient.description)
}

pub fn validate_ingredient_changes(changes: &IngredientChanges) -> ValidationResult<()> {
    if let Some(title) = &changes.title {
        validate_short_text("title", title)?;
    }
    if let Some(description) = &changes.description {
        validate_required_text("description", description)?;
    }
    Ok(())
}

pub fn validate_new_why_choose(item: &NewWhyChoose) -> ValidationResult<()> {
    validate_short_text("title", &item.title)?;
    validate_required_text("description", &item.description)
}

pub fn validate_why_choose_changes(changes: &WhyChooseChanges) -> ValidationResult<()> {
    if let Some(title) = &changes.title {
        validate_short_text("title", title)?;
    }
    if let Some(description) = &changes.description {
        validate_required_text("description", description)?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_short_text() {
        assert!(validate_short_text("name", "Keto Burn").is_ok());
        assert_eq!(
            validate_short_text("name", "   "),
            Err(ValidationError::required("name"))
        );
        assert!(validate_short_text("name", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("green-tea-and-citrus").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("has space").is_err());
        assert!(validate_slug("UPPER_and-lower").is_ok());
    }

    #[test]
    fn test_parse_money_back_days() {
        assert_eq!(parse_money_back_days(Some("30")), 30);
        assert_eq!(parse_money_back_days(Some(" 45 days")), 45);
        assert_eq!(parse_money_back_days(Some("+14")), 14);
        assert_eq!(parse_money_back_days(Some("-5")), -5);
        assert_eq!(parse_money_back_days(Some("0")), DEFAULT_MONEY_BACK_DAYS);
        assert_eq!(parse_money_back_days(Some("")), DEFAULT_MONEY_BACK_DAYS);
        assert_eq!(parse_money_back_days(Some("sixty")), DEFAULT_MONEY_BACK_DAYS);
        assert_eq!(parse_money_back_days(None), DEFAULT_MONEY_BACK_DAYS);
    }

    #[test]
    fn test_validate_money_back_days() {
        assert!(validate_money_back_days(0).is_ok());
        assert!(validate_money_back_days(60).is_ok());
        assert!(validate_money_back_days(-1).is_err());
        assert!(validate_money_back_days(MAX_MONEY_BACK_DAYS + 1).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  burn "), Ok(Some("burn".to_string())));
        assert_eq!(validate_search_query("   "), Ok(None));
        assert!(validate_search_query(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("123").is_err());
    }

    #[test]
    fn test_validate_public_id() {
        assert!(validate_public_id("100").is_ok());
        assert!(validate_public_id("999").is_ok());
        assert!(validate_public_id("099").is_err());
        assert!(validate_public_id("1000").is_err());
        assert!(validate_public_id("abc").is_err());
    }

    #[test]
    fn test_validate_new_product() {
        let product = NewProduct::new("Keto Burn", "Fat burner", "https://shop.test/keto");
        assert!(validate_new_product(&product).is_ok());

        let missing_link = NewProduct::new("Keto Burn", "Fat burner", "");
        assert_eq!(
            validate_new_product(&missing_link),
            Err(ValidationError::required("redirect_link"))
        );

        let no_slug = NewProduct::new("!!!", "Fat burner", "https://shop.test");
        assert_eq!(validate_new_product(&no_slug).unwrap_err().field(), "slug");
    }

    #[test]
    fn test_validate_changes() {
        assert!(validate_product_changes(&ProductChanges::new()).is_ok());
        assert!(validate_product_changes(&ProductChanges::new().name("")).is_err());
        assert!(validate_product_changes(&ProductChanges::new().money_back_days(-3)).is_err());
        assert!(validate_ingredient_changes(&IngredientChanges::new().title("Green tea")).is_ok());
        assert!(validate_why_choose_changes(&WhyChooseChanges::new().description(" ")).is_err());
    }

    #[test]
    fn test_validate_children() {
        assert!(validate_new_ingredient(&NewIngredient::new("Green tea", "Antioxidant")).is_ok());
        assert!(validate_new_ingredient(&NewIngredient::new("", "Antioxidant")).is_err());
        assert!(validate_new_why_choose(&NewWhyChoose::new("Natural", "")).is_err());
    }
}
