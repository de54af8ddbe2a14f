//! Database-backed relationship store.
//!
//! `DbStore` implements [`RelationshipStore`] directly over the catalog
//! database. It is the boundary where loose wire data becomes strict: unknown
//! relationship-type and source strings are defaulted here with a warning,
//! asset kinds are parsed leniently, and every `DbErr` is folded into the
//! closed [`StoreError`] condition set so the engine never sees a
//! database-specific failure.

use super::{
    AssetDescriptor, AssetKind, NewRelation, Product, RelationPatch, RelationRecord,
    RelationSource, RelationshipStore, RelationshipType, StoreResult,
};
use crate::{
    config::engine::DEFAULT_CANDIDATE_LIMIT,
    entities::{asset, product, relation},
    errors::StoreError,
};
use async_trait::async_trait;
use sea_orm::{Condition, DatabaseConnection, QueryOrder, QuerySelect, Set, SqlErr, prelude::*};
use tracing::warn;

/// [`RelationshipStore`] implementation over a SeaORM database connection.
#[derive(Debug, Clone)]
pub struct DbStore {
    db: DatabaseConnection,
    candidate_limit: u64,
}

impl DbStore {
    /// Creates a store over the given connection with the default candidate cap.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            candidate_limit: DEFAULT_CANDIDATE_LIMIT,
        }
    }

    /// Creates a store with a custom cap on fetched candidates.
    #[must_use]
    pub const fn with_candidate_limit(db: DatabaseConnection, candidate_limit: u64) -> Self {
        Self { db, candidate_limit }
    }

    /// Finds the relation row for a directed pair, if present.
    async fn find_pair(
        &self,
        anchor_id: i64,
        related_id: i64,
    ) -> StoreResult<Option<relation::Model>> {
        relation::Entity::find()
            .filter(relation::Column::ProductId.eq(anchor_id))
            .filter(relation::Column::RelatedProductId.eq(related_id))
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    /// Loads a live (non-deleted) product row, mapping absence to `NotFound`.
    async fn live_product(&self, product_id: i64) -> StoreResult<product::Model> {
        product::Entity::find_by_id(product_id)
            .filter(product::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl RelationshipStore for DbStore {
    async fn fetch_candidates(&self, anchor_id: i64) -> StoreResult<Vec<Product>> {
        let anchor = self.live_product(anchor_id).await?;

        let related_ids: Vec<i64> = relation::Entity::find()
            .filter(relation::Column::ProductId.eq(anchor_id))
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|record| record.related_product_id)
            .collect();

        // Union of the two relatedness sources: explicitly linked products
        // and products sharing the anchor's category.
        let candidates = product::Entity::find()
            .filter(
                Condition::any()
                    .add(product::Column::Id.is_in(related_ids))
                    .add(product::Column::Category.eq(anchor.category.clone())),
            )
            .filter(product::Column::Id.ne(anchor_id))
            .filter(product::Column::IsDeleted.eq(false))
            .order_by_asc(product::Column::Name)
            .limit(self.candidate_limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(candidates.into_iter().map(to_product).collect())
    }

    async fn fetch_explicit_relations(&self, anchor_id: i64) -> StoreResult<Vec<RelationRecord>> {
        relation::Entity::find()
            .filter(relation::Column::ProductId.eq(anchor_id))
            .order_by_desc(relation::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)
            .map(|models| models.into_iter().map(to_record).collect())
    }

    async fn fetch_assets(&self, product_id: i64) -> StoreResult<Vec<AssetDescriptor>> {
        asset::Entity::find()
            .filter(asset::Column::ProductId.eq(product_id))
            .order_by_asc(asset::Column::Position)
            .all(&self.db)
            .await
            .map_err(db_err)
            .map(|models| {
                models
                    .into_iter()
                    .map(|model| AssetDescriptor {
                        id: model.id,
                        url: model.url,
                        is_primary: model.is_primary,
                        kind: AssetKind::from_wire(&model.kind),
                    })
                    .collect()
            })
    }

    async fn create_relation(
        &self,
        anchor_id: i64,
        related_id: i64,
        params: &NewRelation,
    ) -> StoreResult<RelationRecord> {
        // The directed pair is unique. The pre-check answers the common case;
        // a concurrent create that slips past it hits the unique index on
        // insert and maps to the same conflict condition.
        if self.find_pair(anchor_id, related_id).await?.is_some() {
            return Err(StoreError::Conflict);
        }

        // Both endpoints must be live products.
        self.live_product(anchor_id).await?;
        self.live_product(related_id).await?;

        let now = chrono::Utc::now().naive_utc();
        let record = relation::ActiveModel {
            product_id: Set(anchor_id),
            related_product_id: Set(related_id),
            relationship_type: Set(params.relationship_type.as_str().to_string()),
            is_pinned: Set(params.is_pinned),
            source: Set(RelationSource::Manual.as_str().to_string()),
            notes: Set(params.notes.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        record.insert(&self.db).await.map_err(db_err).map(to_record)
    }

    async fn update_relation(
        &self,
        anchor_id: i64,
        related_id: i64,
        patch: &RelationPatch,
    ) -> StoreResult<RelationRecord> {
        let existing = self
            .find_pair(anchor_id, related_id)
            .await?
            .ok_or(StoreError::NotFound)?;

        let mut record: relation::ActiveModel = existing.into();
        if let Some(relationship_type) = patch.relationship_type {
            record.relationship_type = Set(relationship_type.as_str().to_string());
        }
        if let Some(is_pinned) = patch.is_pinned {
            record.is_pinned = Set(is_pinned);
        }
        if let Some(notes) = &patch.notes {
            record.notes = Set(Some(notes.clone()));
        }
        record.updated_at = Set(chrono::Utc::now().naive_utc());

        record.update(&self.db).await.map_err(db_err).map(to_record)
    }

    async fn delete_relation(&self, anchor_id: i64, related_id: i64) -> StoreResult<()> {
        let outcome = relation::Entity::delete_many()
            .filter(relation::Column::ProductId.eq(anchor_id))
            .filter(relation::Column::RelatedProductId.eq(related_id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if outcome.rows_affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

/// Folds a database error into the transport condition the contract allows.
/// A unique-index violation is the relation-pair conflict; everything else
/// is a transport failure.
fn db_err(err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => StoreError::Conflict,
        _ => StoreError::Network {
            message: err.to_string(),
        },
    }
}

/// Maps a product row into the read-model snapshot. The gallery is left
/// empty; imagery beyond the assigned thumbnail is attached by asset
/// backfill when a displayed product needs it.
fn to_product(model: product::Model) -> Product {
    Product {
        id: model.id,
        name: model.name,
        sku: model.sku,
        price: model.price,
        category: model.category,
        primary_thumbnail_url: model.primary_thumbnail_url,
        images: Vec::new(),
    }
}

/// Maps a relation row into the contract record, defaulting unknown wire
/// strings rather than failing the fetch.
fn to_record(model: relation::Model) -> RelationRecord {
    let relationship_type = RelationshipType::parse(&model.relationship_type).unwrap_or_else(|| {
        warn!(
            relation_id = model.id,
            value = %model.relationship_type,
            "Unknown relationship type on stored record, defaulting to general"
        );
        RelationshipType::General
    });

    let source = RelationSource::parse(&model.source).unwrap_or_else(|| {
        warn!(
            relation_id = model.id,
            value = %model.source,
            "Unknown relation source on stored record, defaulting to manual"
        );
        RelationSource::Manual
    });

    RelationRecord {
        id: model.id,
        product_id: model.product_id,
        related_product_id: model.related_product_id,
        relationship_type,
        is_pinned: model.is_pinned,
        source,
        notes: model.notes,
        created_at: model.created_at,
    }
}
