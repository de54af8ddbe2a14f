//! Optimistic mutation controller - owns the displayed related list for one
//! anchor product.
//!
//! Every write to relation state goes through [`RelatedListController`]. The
//! controller applies each operation to its local list synchronously, before
//! the first suspension point, so the displayed state reflects the operation
//! instantly; the store call then confirms it, and the per-operation contract
//! decides what happens on failure (roll back, re-fetch, or let the patch
//! stand). Methods take `&mut self`, which makes one operation's local
//! critical section naturally atomic on the single-threaded event loop and
//! rules out two in-flight mutations racing on the same list.
//!
//! Reconciliation is authoritative: a successful add sleeps a short settle
//! delay and re-fetches the whole list, because the server attaches derived
//! fields (real id, canonical ordering) the optimistic record cannot know.

use crate::{
    config::engine::DEFAULT_SETTLE_DELAY_MS,
    core::{EnrichedProduct, merge},
    errors::{Error, Result, StoreError},
    store::{
        NewRelation, Product, RelationPatch, RelationRecord, RelationSource, RelationshipStore,
        RelationshipType, StoreResult,
    },
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Owns and mutates the displayed related list for one anchor product.
pub struct RelatedListController {
    store: Arc<dyn RelationshipStore>,
    anchor_id: i64,
    settle_delay: Duration,
    items: Vec<EnrichedProduct>,
}

impl RelatedListController {
    /// Creates a controller with the default settle delay. The list starts
    /// empty; call [`Self::refresh`] to populate it.
    #[must_use]
    pub fn new(store: Arc<dyn RelationshipStore>, anchor_id: i64) -> Self {
        Self::with_settle_delay(
            store,
            anchor_id,
            Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
        )
    }

    /// Creates a controller with an explicit settle delay (from
    /// [`EngineConfig`](crate::config::engine::EngineConfig), or zero in tests).
    #[must_use]
    pub fn with_settle_delay(
        store: Arc<dyn RelationshipStore>,
        anchor_id: i64,
        settle_delay: Duration,
    ) -> Self {
        Self {
            store,
            anchor_id,
            settle_delay,
            items: Vec::new(),
        }
    }

    /// The anchor product this controller manages relations for.
    #[must_use]
    pub const fn anchor_id(&self) -> i64 {
        self.anchor_id
    }

    /// The currently displayed related list.
    #[must_use]
    pub fn items(&self) -> &[EnrichedProduct] {
        &self.items
    }

    /// Rebuilds the displayed list from a fresh merge. This is the
    /// authoritative reconciliation path; it discards any optimistic state.
    pub async fn refresh(&mut self) -> Result<()> {
        self.items = merge::build_related_list(self.store.as_ref(), self.anchor_id).await?;
        Ok(())
    }

    /// Adds an explicit relation to `product`.
    ///
    /// The entry appears at the head of the list immediately with a
    /// provisional record (`id = 0`). A product already present as an
    /// implicit match is promoted: its implicit entry is replaced by the
    /// optimistic explicit one. On confirmation the whole list is reconciled
    /// after the settle delay; on failure the optimistic entry is rolled
    /// back - the promoted entry returns to its implicit spot - and the
    /// error surfaced, with no silent retry.
    ///
    /// # Errors
    /// [`Error::AlreadyRelated`] if the product is already explicitly
    /// related (checked locally, no store call); any store failure after
    /// rollback.
    pub async fn add(
        &mut self,
        product: Product,
        relationship_type: RelationshipType,
        notes: Option<String>,
    ) -> Result<()> {
        let related_id = product.id;

        // An implicit entry is promoted rather than duplicated; an explicit
        // one rejects the add outright.
        let displaced = match self
            .items
            .iter()
            .position(|item| item.product.id == related_id)
        {
            Some(index) if self.items[index].is_explicit() => {
                return Err(Error::AlreadyRelated {
                    product_id: related_id,
                });
            }
            Some(index) => Some((index, self.items.remove(index))),
            None => None,
        };

        // Optimistic prepend, synchronously, before any suspension point
        let provisional = RelationRecord {
            id: 0,
            product_id: self.anchor_id,
            related_product_id: related_id,
            relationship_type,
            is_pinned: false,
            source: RelationSource::Manual,
            notes: notes.clone(),
            created_at: chrono::Utc::now().naive_utc(),
        };
        self.items
            .insert(0, EnrichedProduct::explicit(product, provisional));

        let params = NewRelation {
            relationship_type,
            is_pinned: false,
            notes,
        };
        match create_or_update(self.store.as_ref(), self.anchor_id, related_id, &params).await {
            Ok(record) => {
                info!(
                    anchor_id = self.anchor_id,
                    related_id,
                    relation_id = record.id,
                    "Relation created, reconciling"
                );
                self.settle_and_refresh().await;
                Ok(())
            }
            Err(err) => {
                // Roll back to the pre-operation list; retrying is the
                // operator's call
                self.items.retain(|item| item.product.id != related_id);
                if let Some((index, entry)) = displaced {
                    let index = index.min(self.items.len());
                    self.items.insert(index, entry);
                }
                error!(
                    anchor_id = self.anchor_id,
                    related_id,
                    error = %err,
                    "Relation create failed, optimistic entry rolled back"
                );
                Err(err.into())
            }
        }
    }

    /// Removes the explicit relation to `product_id`.
    ///
    /// The entry disappears from the list immediately. A store-side
    /// `NotFound` counts as success (the record was already gone). Any other
    /// failure triggers a full re-fetch to restore server truth - there is
    /// no local undo - and the error is surfaced.
    ///
    /// # Errors
    /// [`Error::ImplicitMatch`] if the entry has no relation record to
    /// delete (checked locally, no store call); any non-`NotFound` store
    /// failure.
    pub async fn remove(&mut self, product_id: i64) -> Result<()> {
        let Some(index) = self
            .items
            .iter()
            .position(|item| item.product.id == product_id)
        else {
            // Already absent: removal is idempotent from the caller's view
            debug!(
                anchor_id = self.anchor_id,
                product_id, "Remove of absent product is a no-op"
            );
            return Ok(());
        };

        if !self.items[index].is_explicit() {
            return Err(Error::ImplicitMatch { product_id });
        }

        // Optimistic removal before the delete call
        self.items.remove(index);

        match self.store.delete_relation(self.anchor_id, product_id).await {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound) => {
                // Already deleted server-side; the optimistic removal stands
                debug!(
                    anchor_id = self.anchor_id,
                    product_id, "Relation was already gone on the store"
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    anchor_id = self.anchor_id,
                    product_id,
                    error = %err,
                    "Relation delete failed, re-fetching server truth"
                );
                if let Err(refresh_err) = self.refresh().await {
                    warn!(
                        anchor_id = self.anchor_id,
                        error = %refresh_err,
                        "Restore fetch failed, list may be stale until next refresh"
                    );
                }
                Err(err.into())
            }
        }
    }

    /// Applies a partial edit to the relation for `related_id`.
    ///
    /// The local entry is patched immediately. On store failure the patch
    /// deliberately stands - type and notes edits are low-risk compared to
    /// list membership, so the operator retries or refreshes instead of
    /// watching the edit snap back.
    ///
    /// # Errors
    /// [`Error::RelationNotFound`] if the product is not listed,
    /// [`Error::ImplicitMatch`] if it carries no relation record (both
    /// checked locally, no store call); any store failure.
    pub async fn update_relationship(
        &mut self,
        related_id: i64,
        patch: RelationPatch,
    ) -> Result<()> {
        {
            let Some(item) = self
                .items
                .iter_mut()
                .find(|item| item.product.id == related_id)
            else {
                return Err(Error::RelationNotFound {
                    product_id: related_id,
                });
            };
            let Some(relation) = item.relation.as_mut() else {
                return Err(Error::ImplicitMatch {
                    product_id: related_id,
                });
            };

            // Patch locally first for instant feedback
            if let Some(relationship_type) = patch.relationship_type {
                relation.relationship_type = relationship_type;
            }
            if let Some(is_pinned) = patch.is_pinned {
                relation.is_pinned = is_pinned;
            }
            if let Some(notes) = &patch.notes {
                relation.notes = Some(notes.clone());
            }
        }

        match self
            .store
            .update_relation(self.anchor_id, related_id, &patch)
            .await
        {
            Ok(record) => {
                // Adopt the stored record so derived fields match the server
                if let Some(item) = self
                    .items
                    .iter_mut()
                    .find(|item| item.product.id == related_id)
                {
                    item.relation = Some(record);
                }
                Ok(())
            }
            Err(err) => {
                warn!(
                    anchor_id = self.anchor_id,
                    related_id,
                    error = %err,
                    "Relation update failed, local patch left standing"
                );
                Err(err.into())
            }
        }
    }

    /// Pins or unpins the relation for `related_id`, then re-ranks the list
    /// locally with the canonical comparator - no re-fetch, so the visual
    /// reorder is immediate.
    ///
    /// # Errors
    /// Same contract as [`Self::update_relationship`] restricted to the pin
    /// field.
    pub async fn toggle_pin(&mut self, related_id: i64, pinned: bool) -> Result<()> {
        self.update_relationship(related_id, RelationPatch::pin(pinned))
            .await?;
        self.items.sort_by(merge::compare_related);
        Ok(())
    }

    /// Sleeps out the settle window, then reconciles. A failed reconcile
    /// fetch keeps the optimistic list; the next successful refresh
    /// supersedes it.
    async fn settle_and_refresh(&mut self) {
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
        if let Err(err) = self.refresh().await {
            warn!(
                anchor_id = self.anchor_id,
                error = %err,
                "Reconciliation fetch failed, keeping optimistic list"
            );
        }
    }
}

/// The shared create path: create the relation, falling back to an update
/// when the pair already exists. The conflict is absorbed, not surfaced -
/// the operation is a success from the caller's perspective. The fallback
/// patches type and notes only; the existing row's pin state stands.
pub(crate) async fn create_or_update(
    store: &dyn RelationshipStore,
    anchor_id: i64,
    related_id: i64,
    params: &NewRelation,
) -> StoreResult<RelationRecord> {
    match store.create_relation(anchor_id, related_id, params).await {
        Err(StoreError::Conflict) => {
            debug!(
                anchor_id,
                related_id, "Relation already exists, updating instead"
            );
            // The existing row may have been pinned by someone else; an add
            // carries no pin intent, so the fallback leaves that field alone.
            let patch = RelationPatch {
                relationship_type: Some(params.relationship_type),
                is_pinned: None,
                notes: params.notes.clone(),
            };
            store.update_relation(anchor_id, related_id, &patch).await
        }
        result => result,
    }
}
