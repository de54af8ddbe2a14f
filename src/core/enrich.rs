//! Asset backfill enrichment - resolves thumbnails for products without imagery.
//!
//! Candidate products frequently arrive without an assigned thumbnail or
//! gallery (imagery is managed by the asset pipeline, not the catalog rows).
//! For those, this module looks up the product's asset list and promotes a
//! suitable image: the operator-flagged primary image if one exists,
//! otherwise the first image asset, otherwise nothing. Lookups fan out
//! concurrently across all items needing them, and a failed lookup only
//! leaves that one product without a thumbnail - it never disturbs siblings
//! or the list build itself.

use crate::{
    core::EnrichedProduct,
    store::{AssetDescriptor, AssetKind, ProductImage, RelationshipStore},
};
use tracing::{debug, warn};

/// Backfills thumbnails and gallery descriptors for every item that lacks
/// both, in place. Items that already carry imagery are not touched and
/// cost no asset lookup.
pub async fn backfill_images(store: &dyn RelationshipStore, items: &mut [EnrichedProduct]) {
    let lookups = items
        .iter_mut()
        .filter(|item| !item.product.has_imagery())
        .map(|item| async move {
            match store.fetch_assets(item.product.id).await {
                Ok(assets) => apply_assets(item, &assets),
                Err(err) => {
                    // Isolated failure: the product renders without a thumbnail
                    warn!(
                        product_id = item.product.id,
                        error = %err,
                        "Asset lookup failed, leaving product unenriched"
                    );
                }
            }
        });

    futures::future::join_all(lookups).await;
}

/// Attaches the selected image and a normalized gallery to one product.
fn apply_assets(item: &mut EnrichedProduct, assets: &[AssetDescriptor]) {
    let Some(selected) = select_image(assets) else {
        debug!(
            product_id = item.product.id,
            "No usable image asset, product stays without thumbnail"
        );
        return;
    };

    item.product.primary_thumbnail_url = Some(selected.url.clone());
    item.product.images = assets
        .iter()
        .filter(|asset| asset.kind == AssetKind::Image)
        .enumerate()
        .map(|(position, asset)| {
            // Cast safety: gallery sizes are tiny, far below i32::MAX.
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let position = position as i32;
            ProductImage {
                url: asset.url.clone(),
                position,
            }
        })
        .collect();
}

/// Selection order: the primary image asset, else the first image asset.
fn select_image(assets: &[AssetDescriptor]) -> Option<&AssetDescriptor> {
    assets
        .iter()
        .find(|asset| asset.is_primary && asset.kind == AssetKind::Image)
        .or_else(|| assets.iter().find(|asset| asset.kind == AssetKind::Image))
}
