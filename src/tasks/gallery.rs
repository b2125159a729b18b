//! One-time gallery build: the first catalog entry as the feature, the rest
//! as a grid.

use tracing::{debug, info, instrument};

use crate::catalog::{ImageCatalog, Images};
use crate::dom::{Document, NodeId, SharedDocument};
use crate::error::FetchError;
use crate::items;
use crate::markup::{GALLERY_FEATURE_ID, GALLERY_GRID_ID};
use crate::tasks::reveal::RevealController;

#[derive(Debug, Clone, Copy, Default)]
pub struct GalleryTargets {
    pub feature: Option<NodeId>,
    pub grid: Option<NodeId>,
}

impl GalleryTargets {
    pub fn locate(doc: &Document) -> Self {
        Self {
            feature: doc.find_by_id(GALLERY_FEATURE_ID),
            grid: doc.find_by_id(GALLERY_GRID_ID),
        }
    }
}

/// Populate the feature and grid slots from the catalog.
///
/// Returns the full catalog, feature included, so the lightbox can navigate
/// across every entry. `Ok(None)` when a slot is missing or the catalog is
/// empty.
#[instrument(skip_all)]
pub async fn assemble(
    doc: &SharedDocument,
    catalog: &ImageCatalog,
    targets: GalleryTargets,
    reveal: &RevealController,
) -> Result<Option<Images>, FetchError> {
    let GalleryTargets {
        feature: Some(feature),
        grid: Some(grid),
    } = targets
    else {
        debug!(?targets, "gallery slots missing; gallery disabled");
        return Ok(None);
    };

    let images = catalog.load().await?;
    let Some((first, rest)) = images.split_first() else {
        debug!("empty catalog; gallery disabled");
        return Ok(None);
    };

    let mut doc = doc.lock();
    doc.clear_children(feature);
    doc.clear_children(grid);

    let feature_item = items::feature_item(&mut doc, first);
    doc.append_child(feature, feature_item);
    reveal.observe(Some(feature_item));

    for descriptor in rest {
        let item = items::gallery_item(&mut doc, descriptor);
        doc.append_child(grid, item);
        reveal.observe(Some(item));
    }
    info!(grid = rest.len(), feature = %first.src, "gallery assembled");
    drop(doc);

    Ok(Some(images))
}
