//! Product entity - Represents catalog products managed by the console.
//!
//! The relationship engine treats products as read-only input: rows are
//! created and edited by the catalog CRUD subsystem, while this crate only
//! reads them to build candidate sets and related lists. The thumbnail column
//! is nullable; products without one are backfilled from their asset list at
//! display time.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name of the product (e.g., "Trail Jacket")
    pub name: String,
    /// Stock keeping unit, unique per catalog
    pub sku: String,
    /// Unit price in dollars
    pub price: f64,
    /// Category slug used for implicit relatedness matching
    pub category: String,
    /// URL of the primary thumbnail, if one has been assigned
    pub primary_thumbnail_url: Option<String>,
    /// Soft delete flag - if true, product is hidden but data is preserved
    pub is_deleted: bool,
    /// When the product was created
    pub created_at: DateTime,
    /// When the product was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each product owns any number of uploaded assets
    #[sea_orm(has_many = "super::asset::Entity")]
    Asset,
}

impl Related<super::asset::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Asset.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
