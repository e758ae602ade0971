//! # Domain Types
//!
//! Records, inputs and query types shared by the repositories and the
//! handlers that call them.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   Ingredient    │   │   WhyChoose     │       │
//! │  │  ─────────────  │◄──│  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  product_id(FK) │──►│  product_id(FK) │       │
//! │  │  slug (unique)  │   │  title          │   │  title          │       │
//! │  │  product_id     │   │  description    │   │  description    │       │
//! │  │  (3 digits)     │   │  image_path?    │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  Inputs:      NewProduct, NewIngredient, NewWhyChoose                   │
//! │  Changesets:  ProductChanges, IngredientChanges, WhyChooseChanges       │
//! │  Queries:     ProductQuery + ProductSort → ProductPage                  │
//! │  Aggregates:  ProductDetails, DashboardStats, MonthlyCount              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Changesets
//! A changeset carries one `Option` per mutable column. `None` means
//! "leave as is"; `Some(v)` means "write v". Identity columns (`id`,
//! `product_id`, parent references, timestamps) are not part of any
//! changeset and cannot be changed through one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::slug::generate_slug;
use crate::{DEFAULT_MONEY_BACK_DAYS, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

// =============================================================================
// Product
// =============================================================================

/// A sellable product with its public landing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// URL-safe name, unique across products.
    pub slug: String,

    pub description: String,

    /// External checkout URL the landing page sends buyers to.
    pub redirect_link: String,

    /// Relative path of the product image, owned by the image pipeline.
    pub image_path: Option<String>,

    /// Relative path of the badge image, owned by the image pipeline.
    pub badge_path: Option<String>,

    /// Length of the money-back guarantee in days.
    pub money_back_days: i64,

    /// Short public id (3 digits), unique across products.
    pub product_id: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Public URL path of the landing page for this product.
    pub fn public_path(&self) -> String {
        format!("/product/{}/{}", self.slug, self.product_id)
    }
}

/// Input for creating a product.
///
/// ## Example
/// ```rust
/// use landing_core::NewProduct;
///
/// let product = NewProduct::new("Keto Burn", "Daily fat burner", "https://shop.example/keto")
///     .money_back_days(90);
/// assert_eq!(product.resolved_slug(), "keto-burn");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,

    /// Explicit slug; derived from `name` when absent.
    #[serde(default)]
    pub slug: Option<String>,

    pub description: String,
    pub redirect_link: String,

    #[serde(default)]
    pub image_path: Option<String>,

    #[serde(default)]
    pub badge_path: Option<String>,

    /// Defaults to [`DEFAULT_MONEY_BACK_DAYS`] when absent.
    #[serde(default)]
    pub money_back_days: Option<i64>,
}

impl NewProduct {
    /// Creates an input with the required fields set.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        redirect_link: impl Into<String>,
    ) -> Self {
        NewProduct {
            name: name.into(),
            slug: None,
            description: description.into(),
            redirect_link: redirect_link.into(),
            image_path: None,
            badge_path: None,
            money_back_days: None,
        }
    }

    /// Sets an explicit slug.
    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Sets the product image path.
    pub fn image_path(mut self, path: impl Into<String>) -> Self {
        self.image_path = Some(path.into());
        self
    }

    /// Sets the badge image path.
    pub fn badge_path(mut self, path: impl Into<String>) -> Self {
        self.badge_path = Some(path.into());
        self
    }

    /// Sets the money-back guarantee length.
    pub fn money_back_days(mut self, days: i64) -> Self {
        self.money_back_days = Some(days);
        self
    }

    /// The slug that will be stored: the explicit one if non-blank,
    /// otherwise one generated from `name`.
    pub fn resolved_slug(&self) -> String {
        match self.slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => slug.to_string(),
            _ => generate_slug(&self.name),
        }
    }

    /// The money-back days that will be stored.
    pub fn resolved_money_back_days(&self) -> i64 {
        self.money_back_days.unwrap_or(DEFAULT_MONEY_BACK_DAYS)
    }
}

/// Partial update for a product.
///
/// Supplying `name` also rewrites `slug`. `product_id` never changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub redirect_link: Option<String>,
    pub image_path: Option<String>,
    pub badge_path: Option<String>,
    pub money_back_days: Option<i64>,
}

impl ProductChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn redirect_link(mut self, link: impl Into<String>) -> Self {
        self.redirect_link = Some(link.into());
        self
    }

    pub fn image_path(mut self, path: impl Into<String>) -> Self {
        self.image_path = Some(path.into());
        self
    }

    pub fn badge_path(mut self, path: impl Into<String>) -> Self {
        self.badge_path = Some(path.into());
        self
    }

    pub fn money_back_days(mut self, days: i64) -> Self {
        self.money_back_days = Some(days);
        self
    }

    /// True when no field is supplied.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.redirect_link.is_none()
            && self.image_path.is_none()
            && self.badge_path.is_none()
            && self.money_back_days.is_none()
    }

    /// Slug to store alongside a renamed product.
    pub fn derived_slug(&self) -> Option<String> {
        self.name.as_deref().map(generate_slug)
    }
}

// =============================================================================
// Ingredient
// =============================================================================

/// An ingredient shown on a product's landing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Ingredient {
    pub id: String,
    /// Owning product (`products.id`).
    pub product_id: String,
    pub title: String,
    pub description: String,
    pub image_path: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an ingredient. The parent product is passed
/// separately to the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewIngredient {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image_path: Option<String>,
}

impl NewIngredient {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        NewIngredient {
            title: title.into(),
            description: description.into(),
            image_path: None,
        }
    }

    pub fn image_path(mut self, path: impl Into<String>) -> Self {
        self.image_path = Some(path.into());
        self
    }
}

/// Partial update for an ingredient. The parent product cannot change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct IngredientChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_path: Option<String>,
}

impl IngredientChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn image_path(mut self, path: impl Into<String>) -> Self {
        self.image_path = Some(path.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.image_path.is_none()
    }
}

// =============================================================================
// Why Choose
// =============================================================================

/// A "why choose this product" selling point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct WhyChoose {
    pub id: String,
    pub product_id: String,
    pub title: String,
    pub description: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewWhyChoose {
    pub title: String,
    pub description: String,
}

impl NewWhyChoose {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        NewWhyChoose {
            title: title.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct WhyChooseChanges {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl WhyChooseChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

// =============================================================================
// Listing
// =============================================================================

/// Sort order for the product listing.
///
/// ## Lenient Parsing
/// ```text
/// "newest"    → Newest     (created_at DESC)
/// "oldest"    → Oldest     (created_at ASC)
/// "name_asc"  → NameAsc    (name ASC)
/// "name_desc" → NameDesc   (name DESC)
/// anything    → Insertion  (storage insertion order)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Newest,
    Oldest,
    NameAsc,
    NameDesc,
    /// Fallback for unrecognized sort keys.
    Insertion,
}

impl ProductSort {
    /// Parses a sort key; unknown keys fall back to [`ProductSort::Insertion`].
    pub fn parse_lenient(key: &str) -> Self {
        match key.trim() {
            "newest" => ProductSort::Newest,
            "oldest" => ProductSort::Oldest,
            "name_asc" => ProductSort::NameAsc,
            "name_desc" => ProductSort::NameDesc,
            _ => ProductSort::Insertion,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductSort::Newest => "newest",
            ProductSort::Oldest => "oldest",
            ProductSort::NameAsc => "name_asc",
            ProductSort::NameDesc => "name_desc",
            ProductSort::Insertion => "insertion",
        }
    }
}

// Query strings carry arbitrary keys; they go through `parse_lenient`.
impl<'de> Deserialize<'de> for ProductSort {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let key = String::deserialize(deserializer)?;
        Ok(ProductSort::parse_lenient(&key))
    }
}

impl std::fmt::Display for ProductSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Search, sort and pagination options for the product listing.
///
/// ## Usage
/// ```rust
/// use landing_core::{ProductQuery, ProductSort};
///
/// let query = ProductQuery::new()
///     .search("burn")
///     .sort(ProductSort::NameAsc)
///     .paginate(2, 5);
/// assert_eq!(query.offset(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct ProductQuery {
    /// Case-insensitive substring matched against name or description.
    pub search: Option<String>,
    pub sort: ProductSort,
    /// 1-based page number.
    pub page: u32,
    /// Page size.
    pub limit: u32,
}

impl Default for ProductQuery {
    fn default() -> Self {
        ProductQuery {
            search: None,
            sort: ProductSort::default(),
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl ProductQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters to products whose name or description contains `term`.
    /// A blank term disables the filter.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search = if term.trim().is_empty() {
            None
        } else {
            Some(term)
        };
        self
    }

    pub fn sort(mut self, sort: ProductSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn paginate(mut self, page: u32, limit: u32) -> Self {
        self.page = page;
        self.limit = limit;
        self
    }

    /// Clamps `page` to at least 1 and `limit` to `1..=MAX_PAGE_LIMIT`.
    pub fn normalized(mut self) -> Self {
        self.page = self.page.max(1);
        self.limit = self.limit.clamp(1, MAX_PAGE_LIMIT);
        self
    }

    /// Row offset of the first record on the requested page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

/// One page of the product listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductPage {
    pub products: Vec<Product>,
    /// Number of products matching the search, ignoring pagination.
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}

impl ProductPage {
    /// Number of pages needed to show `total` records.
    pub fn total_pages(&self) -> u32 {
        if self.limit == 0 || self.total <= 0 {
            return 0;
        }
        let limit = i64::from(self.limit);
        u32::try_from((self.total + limit - 1) / limit).unwrap_or(u32::MAX)
    }
}

// =============================================================================
// Aggregates
// =============================================================================

/// Number of products created in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct MonthlyCount {
    /// Month as `YYYY-MM`.
    pub month: String,
    pub count: i64,
}

/// Everything the public landing page renders for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductDetails {
    pub product: Product,
    pub ingredients: Vec<Ingredient>,
    #[serde(rename = "whyChooseItems")]
    pub why_choose: Vec<WhyChoose>,
}

/// Row counts per table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EntityCounts {
    pub products: i64,
    pub ingredients: i64,
    pub why_choose: i64,
}

/// Admin dashboard summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DashboardStats {
    pub counts: EntityCounts,
    pub recent_products: Vec<Product>,
    pub products_by_month: Vec<MonthlyCount>,
}

// =============================================================================
// Unit Tests
// =============================================================================
