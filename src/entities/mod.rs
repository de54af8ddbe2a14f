//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod asset;
pub mod product;
pub mod relation;

// Re-export specific types to avoid conflicts
pub use asset::{Column as AssetColumn, Entity as Asset, Model as AssetModel};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use relation::{Column as RelationColumn, Entity as RelationRecord, Model as RelationModel};
