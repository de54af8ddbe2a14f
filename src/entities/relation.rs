//! Relation entity - A persisted explicit edge between two products.
//!
//! Each row links an anchor product to one related product, directed; the
//! pair `(product_id, related_product_id)` is unique per direction. The
//! `relationship_type` and `source` columns store wire strings; they are
//! validated and defaulted into closed enums at the store-adapter boundary,
//! never inside the core.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Relation record database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_relations")]
pub struct Model {
    /// Unique identifier for the relation record
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Anchor product this relation belongs to
    pub product_id: i64,
    /// The product shown as related to the anchor
    pub related_product_id: i64,
    /// Relationship type wire string (e.g., "accessory", "variant")
    pub relationship_type: String,
    /// Pin flag - pinned relations sort ahead of everything else
    pub is_pinned: bool,
    /// Origin wire string: "manual" (curated) or "algorithm" (upstream suggestion)
    pub source: String,
    /// Free-text operator annotation
    pub notes: Option<String>,
    /// When the relation was created; pin-group ordering tiebreaker
    pub created_at: DateTime,
    /// When the relation was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Relation and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The anchor product this record hangs off
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
    /// The target product the record points at
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::RelatedProductId",
        to = "super::product::Column::Id"
    )]
    RelatedProduct,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
