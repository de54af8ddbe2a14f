//! Shared test utilities for `catalog-relations`.
//!
//! This module provides common helper functions for setting up test
//! databases, seeding catalog rows, and building in-memory fixtures for the
//! core engine. `ScriptedStore` is a fully in-memory
//! [`RelationshipStore`] with per-call failure scripting and call recording,
//! used wherever a test needs to inject store failures or assert that an
//! operation issued no network call.

#![allow(clippy::unwrap_used)]

use crate::{
    entities::{asset, product, relation},
    errors::{Result, StoreError},
    store::{
        AssetDescriptor, NewRelation, Product, RelationPatch, RelationRecord, RelationSource,
        RelationshipStore, RelationshipType, StoreResult,
    },
};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::{DatabaseConnection, Set, prelude::*};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Initializes a test-writer tracing subscriber, once per process.
/// Safe to call from every test; later calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all store-adapter integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Inserts a live product row with sensible defaults.
///
/// # Defaults
/// * `sku`: derived from the name
/// * `price`: 10.0
/// * no thumbnail
pub async fn seed_product(
    db: &DatabaseConnection,
    name: &str,
    category: &str,
) -> Result<product::Model> {
    insert_product(db, name, category, false).await
}

/// Inserts a soft-deleted product row; must never surface as a candidate.
pub async fn seed_deleted_product(
    db: &DatabaseConnection,
    name: &str,
    category: &str,
) -> Result<product::Model> {
    insert_product(db, name, category, true).await
}

async fn insert_product(
    db: &DatabaseConnection,
    name: &str,
    category: &str,
    is_deleted: bool,
) -> Result<product::Model> {
    let now = chrono::Utc::now().naive_utc();
    let row = product::ActiveModel {
        name: Set(name.to_string()),
        sku: Set(format!("SKU-{}", name.to_uppercase().replace(' ', "-"))),
        price: Set(10.0),
        category: Set(category.to_string()),
        primary_thumbnail_url: Set(None),
        is_deleted: Set(is_deleted),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    row.insert(db).await.map_err(Into::into)
}

/// Inserts a relation row with raw wire strings, bypassing the adapter's
/// validation. Used to simulate rows written by other console builds.
pub async fn seed_relation(
    db: &DatabaseConnection,
    anchor_id: i64,
    related_id: i64,
    relationship_type: &str,
    is_pinned: bool,
    source: &str,
) -> Result<relation::Model> {
    let now = chrono::Utc::now().naive_utc();
    let row = relation::ActiveModel {
        product_id: Set(anchor_id),
        related_product_id: Set(related_id),
        relationship_type: Set(relationship_type.to_string()),
        is_pinned: Set(is_pinned),
        source: Set(source.to_string()),
        notes: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    row.insert(db).await.map_err(Into::into)
}

/// Inserts an asset row with a raw wire kind string.
pub async fn seed_asset(
    db: &DatabaseConnection,
    product_id: i64,
    url: &str,
    is_primary: bool,
    kind: &str,
    position: i32,
) -> Result<asset::Model> {
    let row = asset::ActiveModel {
        product_id: Set(product_id),
        url: Set(url.to_string()),
        is_primary: Set(is_primary),
        kind: Set(kind.to_string()),
        position: Set(position),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    };
    row.insert(db).await.map_err(Into::into)
}

/// Builds a bare read-model product with no imagery.
#[must_use]
pub fn make_product(id: i64, name: &str, category: &str) -> Product {
    Product {
        id,
        name: name.to_string(),
        sku: format!("SKU-{id}"),
        price: 25.0,
        category: category.to_string(),
        primary_thumbnail_url: None,
        images: Vec::new(),
    }
}

/// Builds a confirmed relation record with a deterministic id.
#[must_use]
pub fn make_relation(
    anchor_id: i64,
    related_id: i64,
    is_pinned: bool,
    source: RelationSource,
    created_at: NaiveDateTime,
) -> RelationRecord {
    RelationRecord {
        id: anchor_id * 1000 + related_id,
        product_id: anchor_id,
        related_product_id: related_id,
        relationship_type: RelationshipType::General,
        is_pinned,
        source,
        notes: None,
        created_at,
    }
}

/// A fixed timestamp `minutes` minutes into a reference morning, for
/// deterministic created-at ordering in tests.
#[must_use]
pub fn ts(minutes: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 1)
        .unwrap()
        .and_hms_opt(8, minutes, 0)
        .unwrap()
}

#[derive(Default)]
struct ScriptedState {
    products: HashMap<i64, Product>,
    implicit_ids: Vec<i64>,
    relations: Vec<RelationRecord>,
    assets: HashMap<i64, Vec<AssetDescriptor>>,
    failures: HashMap<&'static str, VecDeque<StoreError>>,
    calls: Vec<String>,
    next_relation_id: i64,
}

impl ScriptedState {
    fn take_failure(&mut self, method: &'static str) -> Option<StoreError> {
        self.failures.get_mut(method).and_then(VecDeque::pop_front)
    }
}

/// In-memory [`RelationshipStore`] double with failure scripting.
///
/// Candidates are whatever was pushed via [`Self::push_candidate`] (the
/// implicit pool, duplicates and all) plus the products targeted by stored
/// relations - mirroring the overlapping union a real adapter returns.
/// [`Self::fail_next`] queues an error for the next call to a named method;
/// every call is recorded as `"method(args)"` for assertions about what did
/// or did not go over the wire.
pub struct ScriptedStore {
    state: Mutex<ScriptedState>,
}

impl Default for ScriptedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedStore {
    /// An empty store: no products, no relations, no scripted failures.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ScriptedState {
                next_relation_id: 100,
                ..Default::default()
            }),
        }
    }

    /// Registers a product without making it an implicit candidate.
    /// Relations pointing at it will still surface it in the candidate union.
    pub fn register_product(&self, product: Product) {
        let mut state = self.state.lock().unwrap();
        state.products.insert(product.id, product);
    }

    /// Registers a product and appends it to the implicit candidate pool.
    /// Pushing the same product twice produces a duplicate candidate.
    pub fn push_candidate(&self, product: Product) {
        let mut state = self.state.lock().unwrap();
        state.implicit_ids.push(product.id);
        state.products.insert(product.id, product);
    }

    /// Stores a relation record directly, as if created earlier.
    pub fn insert_relation(&self, record: RelationRecord) {
        let mut state = self.state.lock().unwrap();
        state.relations.push(record);
    }

    /// Sets the asset list returned for one product.
    pub fn set_assets(&self, product_id: i64, assets: Vec<AssetDescriptor>) {
        let mut state = self.state.lock().unwrap();
        state.assets.insert(product_id, assets);
    }

    /// Queues `error` for the next call to `method`.
    pub fn fail_next(&self, method: &'static str, error: StoreError) {
        let mut state = self.state.lock().unwrap();
        state.failures.entry(method).or_default().push_back(error);
    }

    /// Every store call recorded so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Forgets recorded calls; use between a setup refresh and the
    /// operation under test.
    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// The stored relation for a directed pair, if any.
    #[must_use]
    pub fn relation_for(&self, anchor_id: i64, related_id: i64) -> Option<RelationRecord> {
        self.state
            .lock()
            .unwrap()
            .relations
            .iter()
            .find(|r| r.product_id == anchor_id && r.related_product_id == related_id)
            .cloned()
    }
}

#[async_trait]
impl RelationshipStore for ScriptedStore {
    async fn fetch_candidates(&self, anchor_id: i64) -> StoreResult<Vec<Product>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("fetch_candidates({anchor_id})"));
        if let Some(err) = state.take_failure("fetch_candidates") {
            return Err(err);
        }

        let mut result: Vec<Product> = state
            .implicit_ids
            .iter()
            .filter_map(|id| state.products.get(id).cloned())
            .collect();
        for record in &state.relations {
            if record.product_id != anchor_id {
                continue;
            }
            if let Some(product) = state.products.get(&record.related_product_id) {
                result.push(product.clone());
            }
        }
        Ok(result)
    }

    async fn fetch_explicit_relations(&self, anchor_id: i64) -> StoreResult<Vec<RelationRecord>> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(format!("fetch_explicit_relations({anchor_id})"));
        if let Some(err) = state.take_failure("fetch_explicit_relations") {
            return Err(err);
        }
        Ok(state
            .relations
            .iter()
            .filter(|r| r.product_id == anchor_id)
            .cloned()
            .collect())
    }

    async fn fetch_assets(&self, product_id: i64) -> StoreResult<Vec<AssetDescriptor>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("fetch_assets({product_id})"));
        if let Some(err) = state.take_failure("fetch_assets") {
            return Err(err);
        }
        Ok(state.assets.get(&product_id).cloned().unwrap_or_default())
    }

    async fn create_relation(
        &self,
        anchor_id: i64,
        related_id: i64,
        params: &NewRelation,
    ) -> StoreResult<RelationRecord> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(format!("create_relation({anchor_id},{related_id})"));
        if let Some(err) = state.take_failure("create_relation") {
            return Err(err);
        }
        if state
            .relations
            .iter()
            .any(|r| r.product_id == anchor_id && r.related_product_id == related_id)
        {
            return Err(StoreError::Conflict);
        }
        if !state.products.contains_key(&related_id) {
            return Err(StoreError::NotFound);
        }

        let id = state.next_relation_id;
        state.next_relation_id += 1;
        let record = RelationRecord {
            id,
            product_id: anchor_id,
            related_product_id: related_id,
            relationship_type: params.relationship_type,
            is_pinned: params.is_pinned,
            source: RelationSource::Manual,
            notes: params.notes.clone(),
            created_at: chrono::Utc::now().naive_utc(),
        };
        state.relations.push(record.clone());
        Ok(record)
    }

    async fn update_relation(
        &self,
        anchor_id: i64,
        related_id: i64,
        patch: &RelationPatch,
    ) -> StoreResult<RelationRecord> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(format!("update_relation({anchor_id},{related_id})"));
        if let Some(err) = state.take_failure("update_relation") {
            return Err(err);
        }

        let record = state
            .relations
            .iter_mut()
            .find(|r| r.product_id == anchor_id && r.related_product_id == related_id)
            .ok_or(StoreError::NotFound)?;
        if let Some(relationship_type) = patch.relationship_type {
            record.relationship_type = relationship_type;
        }
        if let Some(is_pinned) = patch.is_pinned {
            record.is_pinned = is_pinned;
        }
        if let Some(notes) = &patch.notes {
            record.notes = Some(notes.clone());
        }
        Ok(record.clone())
    }

    async fn delete_relation(&self, anchor_id: i64, related_id: i64) -> StoreResult<()> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(format!("delete_relation({anchor_id},{related_id})"));
        if let Some(err) = state.take_failure("delete_relation") {
            return Err(err);
        }

        let before = state.relations.len();
        state
            .relations
            .retain(|r| !(r.product_id == anchor_id && r.related_product_id == related_id));
        if state.relations.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
