//! Unified error types for the relationship engine.
//!
//! `StoreError` is the closed set of conditions the relationship store can
//! report across its network boundary. `Error` is the crate-level error type;
//! the precondition variants (`AlreadyRelated`, `ImplicitMatch`,
//! `RelationNotFound`) are raised locally before any store call is issued and
//! are informational rejections, not data-loss conditions.

use thiserror::Error;

/// Failure conditions reported by a [`RelationshipStore`](crate::store::RelationshipStore).
///
/// Every adapter implementation must map its transport's failures into this
/// closed set; the core's failure handling is defined against it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Transport-level failure: the store was unreachable or answered abnormally.
    #[error("Store request failed: {message}")]
    Network {
        /// Human-readable description of the transport failure
        message: String,
    },

    /// The addressed record does not exist on the store.
    #[error("Record not found on store")]
    NotFound,

    /// A relation for this directed product pair already exists.
    #[error("Relation already exists")]
    Conflict,

    /// The store rejected the call as unauthorized.
    #[error("Store rejected the request as unauthorized")]
    Unauthorized,
}

/// Crate-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration loading or validation failed.
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Database-level failure from the SeaORM-backed store adapter.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O failure (configuration file access).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// A store call failed with one of the closed transport conditions.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Add was rejected locally: the product is already explicitly related.
    /// Implicit matches are not rejected; an add promotes them.
    #[error("Product {product_id} is already related")]
    AlreadyRelated {
        /// The product that was already present
        product_id: i64,
    },

    /// Remove/pin was rejected locally: the entry is an implicit match with
    /// no relation record to mutate.
    #[error("Product {product_id} is an implicit match with no relation record")]
    ImplicitMatch {
        /// The implicit-match product
        product_id: i64,
    },

    /// An update targeted a product id with no relation in the displayed list.
    #[error("No relation found for product {product_id}")]
    RelationNotFound {
        /// The product that had no relation
        product_id: i64,
    },
}

impl Error {
    /// Whether this error is a local precondition rejection that involved no
    /// store call and destroyed no state. Callers typically surface these as
    /// informational notices rather than error notifications.
    #[must_use]
    pub const fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::AlreadyRelated { .. } | Self::ImplicitMatch { .. } | Self::RelationNotFound { .. }
        )
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
