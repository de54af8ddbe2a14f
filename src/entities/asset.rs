//! Asset entity - Uploaded files attached to a product.
//!
//! The engine never writes assets (uploads belong to the asset pipeline); it
//! only reads them to backfill thumbnails for related products that lack
//! imagery. The `kind` column stores a wire string ("image", "video",
//! "document") parsed leniently at the store-adapter boundary.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product asset database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_assets")]
pub struct Model {
    /// Unique identifier for the asset
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Product this asset belongs to
    pub product_id: i64,
    /// Public URL of the stored file
    pub url: String,
    /// Whether the operator marked this asset as the product's primary image
    pub is_primary: bool,
    /// Asset kind wire string (e.g., "image", "document")
    pub kind: String,
    /// Position within the product's gallery ordering
    pub position: i32,
    /// When the asset was uploaded
    pub created_at: DateTime,
}

/// Defines relationships between Asset and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each asset belongs to one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
