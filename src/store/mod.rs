//! The relationship store contract.
//!
//! Everything the engine knows about the outside world goes through the
//! [`RelationshipStore`] trait: candidate products, explicit relation
//! records, asset lists, and relation writes. The trait is transport-agnostic
//! so the engine can run against the catalog database directly ([`DbStore`])
//! or against an in-memory double in tests; every implementation reports
//! failures through the closed [`StoreError`] condition set.

mod db;

pub use db::DbStore;

use crate::errors::StoreError;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Result type for store-adapter calls.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// One entry in a product's ordered image gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductImage {
    /// Public URL of the image
    pub url: String,
    /// Position within the gallery ordering
    pub position: i32,
}

/// Read-model snapshot of a catalog product.
///
/// The engine treats products as read-only input owned by the catalog CRUD
/// subsystem; it never writes them back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Stable product identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// Stock keeping unit
    pub sku: String,
    /// Unit price in dollars
    pub price: f64,
    /// Category slug, the basis for implicit relatedness
    pub category: String,
    /// Primary thumbnail URL, if one is assigned
    pub primary_thumbnail_url: Option<String>,
    /// Ordered image gallery descriptors
    pub images: Vec<ProductImage>,
}

impl Product {
    /// Whether the product already has any imagery to display.
    /// Products answering `false` are candidates for asset backfill.
    #[must_use]
    pub fn has_imagery(&self) -> bool {
        self.primary_thumbnail_url.is_some() || !self.images.is_empty()
    }
}

/// The closed set of relationship types an explicit relation can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    /// An add-on or companion product
    Accessory,
    /// A different variant of the same product line
    Variant,
    /// Commonly purchased together
    FrequentlyBoughtTogether,
    /// A successor or substitute product
    Replacement,
    /// A comparable alternative
    Similar,
    /// Unclassified relatedness
    #[default]
    General,
}

impl RelationshipType {
    /// Wire string for this type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accessory => "accessory",
            Self::Variant => "variant",
            Self::FrequentlyBoughtTogether => "frequently_bought_together",
            Self::Replacement => "replacement",
            Self::Similar => "similar",
            Self::General => "general",
        }
    }

    /// Parses a wire string, returning `None` for unrecognized input.
    /// Adapters default unrecognized strings to [`Self::General`].
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "accessory" => Some(Self::Accessory),
            "variant" => Some(Self::Variant),
            "frequently_bought_together" => Some(Self::FrequentlyBoughtTogether),
            "replacement" => Some(Self::Replacement),
            "similar" => Some(Self::Similar),
            "general" => Some(Self::General),
            _ => None,
        }
    }
}

impl std::fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where an explicit relation came from.
///
/// Both sources count as "explicit" for ordering purposes; the distinction
/// only ranks manual curation ahead of upstream suggestions among non-pinned
/// entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationSource {
    /// Curated by a human operator
    #[default]
    Manual,
    /// Suggested by the upstream recommendation signal
    Algorithm,
}

impl RelationSource {
    /// Wire string for this source.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Algorithm => "algorithm",
        }
    }

    /// Parses a wire string, returning `None` for unrecognized input.
    /// Adapters default unrecognized strings to [`Self::Manual`].
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "manual" => Some(Self::Manual),
            "algorithm" => Some(Self::Algorithm),
            _ => None,
        }
    }
}

impl std::fmt::Display for RelationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An explicit, persisted edge between two products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationRecord {
    /// Server-assigned identifier; `0` marks a not-yet-confirmed optimistic record
    pub id: i64,
    /// Anchor product id
    pub product_id: i64,
    /// Related product id
    pub related_product_id: i64,
    /// Relationship classification
    pub relationship_type: RelationshipType,
    /// Pin flag; pinned relations sort ahead of everything else
    pub is_pinned: bool,
    /// Whether the edge was curated or suggested
    pub source: RelationSource,
    /// Free-text operator annotation
    pub notes: Option<String>,
    /// Creation time; most-recent-first tiebreaker within the pinned group
    pub created_at: NaiveDateTime,
}

impl RelationRecord {
    /// Whether this record has been confirmed by the store.
    /// Optimistic records synthesized locally carry `id == 0` until
    /// reconciliation replaces them with the server's version.
    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        self.id != 0
    }
}

/// Kind classification of an uploaded asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// A displayable image
    Image,
    /// A video file
    Video,
    /// A document (manual, spec sheet, ...)
    Document,
    /// Anything the store could not classify
    Other,
}

impl AssetKind {
    /// Parses a wire string leniently; anything unrecognized is [`Self::Other`].
    #[must_use]
    pub fn from_wire(value: &str) -> Self {
        match value {
            "image" => Self::Image,
            "video" => Self::Video,
            "document" => Self::Document,
            _ => Self::Other,
        }
    }
}

/// One entry of a product's asset list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    /// Stable asset identifier
    pub id: i64,
    /// Public URL of the stored file
    pub url: String,
    /// Whether the operator marked this asset as primary
    pub is_primary: bool,
    /// Kind classification
    pub kind: AssetKind,
}

/// Fields for creating a new explicit relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRelation {
    /// Relationship classification
    pub relationship_type: RelationshipType,
    /// Whether the new relation starts pinned
    pub is_pinned: bool,
    /// Free-text annotation
    pub notes: Option<String>,
}

/// Partial update of an existing relation; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationPatch {
    /// New relationship classification, if changing
    pub relationship_type: Option<RelationshipType>,
    /// New pin state, if changing
    pub is_pinned: Option<bool>,
    /// New annotation text, if changing
    pub notes: Option<String>,
}

impl RelationPatch {
    /// A patch that only changes the pin state.
    #[must_use]
    pub const fn pin(pinned: bool) -> Self {
        Self {
            relationship_type: None,
            is_pinned: Some(pinned),
            notes: None,
        }
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.relationship_type.is_none() && self.is_pinned.is_none() && self.notes.is_none()
    }
}

/// Trait for relationship store backends.
///
/// This abstraction is the engine's only window onto product and relation
/// data. Implementations own all transport concerns (timeouts, retries,
/// wire-format validation) and report failures through [`StoreError`]; the
/// engine's merge and mutation logic is written purely against this trait.
#[async_trait]
pub trait RelationshipStore: Send + Sync {
    /// Fetches the raw candidate set for an anchor product: the union of
    /// explicitly related products and same-category implicit matches. The
    /// two sources may overlap; callers dedup after joining.
    async fn fetch_candidates(&self, anchor_id: i64) -> StoreResult<Vec<Product>>;

    /// Fetches all explicit relation records anchored at the given product.
    async fn fetch_explicit_relations(&self, anchor_id: i64) -> StoreResult<Vec<RelationRecord>>;

    /// Fetches the asset list for one product, gallery-ordered.
    async fn fetch_assets(&self, product_id: i64) -> StoreResult<Vec<AssetDescriptor>>;

    /// Creates an explicit relation between anchor and related product.
    /// Fails with [`StoreError::Conflict`] if the directed pair already
    /// exists; callers fall back to [`Self::update_relation`].
    async fn create_relation(
        &self,
        anchor_id: i64,
        related_id: i64,
        params: &NewRelation,
    ) -> StoreResult<RelationRecord>;

    /// Applies a partial update to an existing relation and returns the
    /// stored record. Fails with [`StoreError::NotFound`] if no relation
    /// exists for the directed pair.
    async fn update_relation(
        &self,
        anchor_id: i64,
        related_id: i64,
        patch: &RelationPatch,
    ) -> StoreResult<RelationRecord>;

    /// Deletes the relation for the directed pair. Fails with
    /// [`StoreError::NotFound`] if there is nothing to delete; callers
    /// treat that as success when reconciling a removal.
    async fn delete_relation(&self, anchor_id: i64, related_id: i64) -> StoreResult<()>;
}
