//! Database configuration module for the catalog store.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! It provides functions for establishing database connections and creating all necessary tables
//! based on the entity definitions. The module uses `SeaORM`'s `Schema::create_table_from_entity`
//! method to automatically generate SQL statements from the entity models, ensuring that the
//! database schema matches the Rust struct definitions without requiring manual SQL.

use crate::entities::{Asset, Product, RelationColumn, RelationRecord};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// This function looks for `DATABASE_URL` in the environment and falls back to
/// a default local `SQLite` file if not found.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/catalog.sqlite".to_string())
}

/// Establishes a connection to the `SQLite` database using the `DATABASE_URL` environment variable.
///
/// Falls back to a default local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(get_database_url()).await.map_err(Into::into)
}

/// Creates all necessary database tables using `SeaORM`'s schema generation from entity definitions.
///
/// This function uses the `DeriveEntityModel` macros to automatically generate proper SQL
/// statements for table creation, ensuring the database schema matches the Rust struct
/// definitions. It creates tables for products, relation records, and product assets, plus
/// the unique index enforcing one relation row per directed product pair.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let product_table = schema.create_table_from_entity(Product);
    let relation_table = schema.create_table_from_entity(RelationRecord);
    let asset_table = schema.create_table_from_entity(Asset);

    db.execute(builder.build(&product_table)).await?;
    db.execute(builder.build(&relation_table)).await?;
    db.execute(builder.build(&asset_table)).await?;

    // One relation row per directed pair; the store adapter maps violations
    // of this index to its conflict condition.
    let relation_pair_index = Index::create()
        .name("idx_product_relations_pair")
        .table(RelationRecord)
        .col(RelationColumn::ProductId)
        .col(RelationColumn::RelatedProductId)
        .unique()
        .to_owned();
    db.execute(builder.build(&relation_pair_index)).await?;

    Ok(())
}
