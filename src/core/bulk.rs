//! Bulk add orchestration - relate many products to one anchor in a single
//! operator action.
//!
//! Items are processed strictly one at a time: relation creation for the
//! same anchor is subject to a store-side uniqueness constraint, and firing
//! the writes in parallel would race on it. A failing item is tallied and
//! skipped, never aborting the batch, and already-created records are not
//! rolled back - forward progress beats batch atomicity here. Callers are
//! expected to run a full reconciliation afterwards instead of trusting
//! incremental optimistic state, since a partially failed batch makes local
//! bookkeeping unreliable.

use crate::{
    core::mutate,
    store::{NewRelation, RelationshipStore, RelationshipType},
};
use tracing::{info, warn};

/// Tally of a completed bulk add.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkAddOutcome {
    /// Whether at least one item was related
    pub success: bool,
    /// Items created or updated
    pub processed: usize,
    /// Items that failed and were skipped
    pub failed: usize,
}

/// Relates every product in `related_ids` to the anchor with one shared
/// relationship type and note, tallying per-item outcomes.
///
/// Each item goes through the same create path as a single add, including
/// the conflict-to-update fallback, so ids that are already related count
/// as processed rather than failed.
pub async fn bulk_add(
    store: &dyn RelationshipStore,
    anchor_id: i64,
    related_ids: &[i64],
    relationship_type: RelationshipType,
    notes: Option<String>,
) -> BulkAddOutcome {
    let params = NewRelation {
        relationship_type,
        is_pinned: false,
        notes,
    };

    let mut processed = 0;
    let mut failed = 0;
    for &related_id in related_ids {
        match mutate::create_or_update(store, anchor_id, related_id, &params).await {
            Ok(_) => processed += 1,
            Err(err) => {
                warn!(
                    anchor_id,
                    related_id,
                    error = %err,
                    "Bulk add item failed, continuing with remaining items"
                );
                failed += 1;
            }
        }
    }

    info!(anchor_id, processed, failed, "Bulk add finished");
    BulkAddOutcome {
        success: processed > 0,
        processed,
        failed,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::store::RelationSource;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_partial_failure_tallies_and_continues() {
        let store = ScriptedStore::new();
        // Five targets; the third is unknown to the store and will fail
        for id in [11, 12, 14, 15] {
            store.register_product(make_product(id, &format!("Part {id}"), "parts"));
        }

        let outcome = bulk_add(
            &store,
            1,
            &[11, 12, 13, 14, 15],
            RelationshipType::Accessory,
            None,
        )
        .await;

        assert_eq!(
            outcome,
            BulkAddOutcome {
                success: true,
                processed: 4,
                failed: 1,
            }
        );
        // The failed item created nothing; the rest are all there
        assert!(store.relation_for(1, 13).is_none());
        for id in [11, 12, 14, 15] {
            assert!(store.relation_for(1, id).is_some());
        }
    }

    #[tokio::test]
    async fn test_all_failures_is_not_a_success() {
        let store = ScriptedStore::new();

        let outcome =
            bulk_add(&store, 1, &[21, 22, 23], RelationshipType::General, None).await;

        assert_eq!(
            outcome,
            BulkAddOutcome {
                success: false,
                processed: 0,
                failed: 3,
            }
        );
    }

    #[tokio::test]
    async fn test_existing_relation_counts_as_processed() {
        let store = ScriptedStore::new();
        store.register_product(make_product(11, "Part 11", "parts"));
        store.register_product(make_product(12, "Part 12", "parts"));
        // 12 is already related and pinned; the conflict fallback updates
        // type and notes in place without touching the pin
        store.insert_relation(make_relation(1, 12, true, RelationSource::Algorithm, ts(1)));

        let outcome = bulk_add(
            &store,
            1,
            &[11, 12],
            RelationshipType::FrequentlyBoughtTogether,
            Some("kit".to_string()),
        )
        .await;

        assert_eq!(
            outcome,
            BulkAddOutcome {
                success: true,
                processed: 2,
                failed: 0,
            }
        );
        let updated = store.relation_for(1, 12).unwrap();
        assert_eq!(
            updated.relationship_type,
            RelationshipType::FrequentlyBoughtTogether
        );
        assert!(updated.is_pinned);
    }

    #[tokio::test]
    async fn test_items_are_processed_sequentially_in_order() {
        let store = ScriptedStore::new();
        for id in [31, 32, 33] {
            store.register_product(make_product(id, &format!("Part {id}"), "parts"));
        }

        bulk_add(&store, 1, &[31, 32, 33], RelationshipType::General, None).await;

        let creates: Vec<String> = store
            .calls()
            .into_iter()
            .filter(|call| call.starts_with("create_relation"))
            .collect();
        assert_eq!(
            creates,
            vec![
                "create_relation(1,31)".to_string(),
                "create_relation(1,32)".to_string(),
                "create_relation(1,33)".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_batch_is_a_failure_with_no_calls() {
        let store = ScriptedStore::new();

        let outcome = bulk_add(&store, 1, &[], RelationshipType::General, None).await;

        assert_eq!(
            outcome,
            BulkAddOutcome {
                success: false,
                processed: 0,
                failed: 0,
            }
        );
        assert!(store.calls().is_empty());
    }
}
