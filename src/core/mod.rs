//! Core relationship logic - framework-agnostic merge, mutation, bulk add,
//! and asset backfill operations over the store contract.
//!
//! Everything in here is written purely against
//! [`RelationshipStore`](crate::store::RelationshipStore); nothing below this
//! module knows about databases, HTTP, or the console UI.

/// Bulk add orchestration with per-item failure tallying
pub mod bulk;
/// Asset backfill enrichment for products lacking imagery
pub mod enrich;
/// Merge & ranking engine producing the ordered related list
pub mod merge;
/// Optimistic mutation controller owning the displayed list
pub mod mutate;

use crate::store::{Product, RelationRecord};
use serde::{Deserialize, Serialize};

/// A candidate product joined with its explicit relation record, if any.
///
/// This is the engine's central working type: the displayed related list is a
/// `Vec<EnrichedProduct>`. An entry without a relation is an **implicit
/// match** - shown because it shares the anchor's category, but not editable,
/// pinnable, or removable. The join is rebuilt on every merge and never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedProduct {
    /// The related product itself
    pub product: Product,
    /// The explicit relation record, absent for implicit matches
    pub relation: Option<RelationRecord>,
}

impl EnrichedProduct {
    /// An implicit match: displayable, not editable.
    #[must_use]
    pub const fn implicit(product: Product) -> Self {
        Self {
            product,
            relation: None,
        }
    }

    /// An explicit entry backed by a relation record.
    #[must_use]
    pub const fn explicit(product: Product, relation: RelationRecord) -> Self {
        Self {
            product,
            relation: Some(relation),
        }
    }

    /// Whether an explicit relation record backs this entry.
    #[must_use]
    pub const fn is_explicit(&self) -> bool {
        self.relation.is_some()
    }

    /// Whether this entry is pinned. Always `false` for implicit matches;
    /// pinning is only meaningful on a relation record.
    #[must_use]
    pub fn is_pinned(&self) -> bool {
        self.relation.as_ref().is_some_and(|r| r.is_pinned)
    }
}
