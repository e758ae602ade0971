//! # Slug Generation
//!
//! URL-safe identifiers derived from product names.
//!
//! ## Transformation Pipeline
//! ```text
//! "Green Tea & Citrus!!"
//!      │  lowercase + trim
//!      ▼
//! "green tea & citrus!!"
//!      │  whitespace runs → "-"
//!      ▼
//! "green-tea-&-citrus!!"
//!      │  "&" → "-and-"
//!      ▼
//! "green-tea---and--citrus!!"
//!      │  drop everything except [A-Za-z0-9_-]
//!      ▼
//! "green-tea---and--citrus"
//!      │  collapse "-" runs, trim "-" at both ends
//!      ▼
//! "green-tea-and-citrus"
//! ```
//!
//! Only ASCII word characters survive, so accented letters are dropped
//! rather than transliterated.

/// Generates a slug from arbitrary text.
///
/// ## Example
/// ```rust
/// use landing_core::slug::generate_slug;
///
/// assert_eq!(generate_slug("Green Tea & Citrus!!"), "green-tea-and-citrus");
/// assert_eq!(generate_slug("  Keto   Burn  "), "keto-burn");
/// ```
pub fn generate_slug(text: &str) -> String {
    let lowered = text.trim().to_lowercase();

    let mut expanded = String::with_capacity(lowered.len() + 8);
    let mut in_whitespace = false;
    for c in lowered.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                expanded.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;

        match c {
            '&' => expanded.push_str("-and-"),
            c if c.is_ascii_alphanumeric() || c == '_' || c == '-' => expanded.push(c),
            _ => {}
        }
    }

    let mut slug = String::with_capacity(expanded.len());
    for c in expanded.chars() {
        if c == '-' && (slug.is_empty() || slug.ends_with('-')) {
            continue;
        }
        slug.push(c);
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ampersand_and_punctuation() {
        assert_eq!(generate_slug("Green Tea & Citrus!!"), "green-tea-and-citrus");
    }

    #[test]
    fn test_whitespace_is_collapsed() {
        assert_eq!(generate_slug("Keto\t Burn   Max"), "keto-burn-max");
        assert_eq!(generate_slug("   padded   "), "padded");
    }

    #[test]
    fn test_hyphens_are_normalized() {
        assert_eq!(generate_slug("--Night--Time--"), "night-time");
        assert_eq!(generate_slug("a - b"), "a-b");
    }

    #[test]
    fn test_underscores_and_digits_survive() {
        assert_eq!(generate_slug("Formula_7 Plus 2"), "formula_7-plus-2");
    }

    #[test]
    fn test_non_ascii_is_dropped() {
        assert_eq!(generate_slug("Café Crème"), "caf-crme");
    }

    #[test]
    fn test_nothing_usable() {
        assert_eq!(generate_slug("!!!"), "");
        assert_eq!(generate_slug(""), "");
        assert_eq!(generate_slug("&"), "and");
    }
}
