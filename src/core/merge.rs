//! Merge & ranking engine - builds the ordered related list for one anchor.
//!
//! The engine is a pure transform over two fetched collections: the raw
//! candidate set (explicit ∪ same-category products, possibly overlapping)
//! and the explicit relation records. Candidates are joined with their
//! records, the anchor and duplicates are dropped, missing imagery is
//! backfilled from asset lists, and the result is sorted with the one
//! canonical ordering every caller shares.
//!
//! Failure policy: a failed candidate fetch fails the whole build (the caller
//! retries); a failed relation fetch only degrades the list to all-implicit,
//! because partial information beats an empty error screen.

use crate::{
    core::{EnrichedProduct, enrich},
    errors::Result,
    store::{RelationRecord, RelationSource, RelationshipStore},
};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Builds the ordered [`EnrichedProduct`] list for an anchor product.
///
/// # Errors
/// Returns an error only when the candidate fetch itself fails; every other
/// retrieval problem degrades rather than failing the build.
pub async fn build_related_list(
    store: &dyn RelationshipStore,
    anchor_id: i64,
) -> Result<Vec<EnrichedProduct>> {
    let candidates = store.fetch_candidates(anchor_id).await?;

    let relations = match store.fetch_explicit_relations(anchor_id).await {
        Ok(relations) => relations,
        Err(err) => {
            // Degraded merge: show every candidate as implicit rather than
            // failing the whole list over missing annotations.
            warn!(
                anchor_id,
                error = %err,
                "Explicit relation fetch failed, degrading to implicit-only list"
            );
            Vec::new()
        }
    };

    let mut by_related_id: HashMap<i64, RelationRecord> = relations
        .into_iter()
        .map(|record| (record.related_product_id, record))
        .collect();

    let mut seen = HashSet::new();
    let mut items: Vec<EnrichedProduct> = Vec::with_capacity(candidates.len());
    for product in candidates {
        // The anchor never relates to itself
        if product.id == anchor_id {
            continue;
        }
        // The two candidate sources may overlap; first occurrence wins
        if !seen.insert(product.id) {
            continue;
        }
        let relation = by_related_id.remove(&product.id);
        items.push(EnrichedProduct { product, relation });
    }

    enrich::backfill_images(store, &mut items).await;

    items.sort_by(compare_related);
    debug!(anchor_id, count = items.len(), "Built related list");
    Ok(items)
}

/// The canonical related-list ordering.
///
/// Pinned explicit entries come first (most recently created first), then
/// the remaining explicit entries (manual curation ahead of algorithmic
/// suggestions), then implicit matches. Every tie falls through to a
/// case-insensitive name comparison. The local re-sort after a pin toggle
/// uses this same comparator, so optimistic ordering matches what the next
/// full merge would produce.
#[must_use]
pub fn compare_related(a: &EnrichedProduct, b: &EnrichedProduct) -> Ordering {
    ordering_group(a)
        .cmp(&ordering_group(b))
        .then_with(|| match (a.relation.as_ref(), b.relation.as_ref()) {
            (Some(ra), Some(rb)) if ra.is_pinned && rb.is_pinned => {
                // Most recently pinned work first within the pin group
                rb.created_at.cmp(&ra.created_at)
            }
            (Some(ra), Some(rb)) => source_rank(ra.source).cmp(&source_rank(rb.source)),
            _ => Ordering::Equal,
        })
        .then_with(|| compare_names(a, b))
}

/// Coarse ordering bucket: pinned explicit, explicit, implicit.
const fn ordering_group(item: &EnrichedProduct) -> u8 {
    match &item.relation {
        Some(record) if record.is_pinned => 0,
        Some(_) => 1,
        None => 2,
    }
}

const fn source_rank(source: RelationSource) -> u8 {
    match source {
        RelationSource::Manual => 0,
        RelationSource::Algorithm => 1,
    }
}

fn compare_names(a: &EnrichedProduct, b: &EnrichedProduct) -> Ordering {
    a.product
        .name
        .to_lowercase()
        .cmp(&b.product.name.to_lowercase())
}
