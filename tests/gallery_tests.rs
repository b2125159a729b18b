use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use photo_stream::catalog::{ImageCatalog, ImageDescriptor, ImageSource};
use photo_stream::dom::{Document, NodeId, SharedDocument};
use photo_stream::error::FetchError;
use photo_stream::markup::{
    self, FEATURE_ITEM_CLASS, GALLERY_FEATURE_ID, GALLERY_GRID_ID, LIGHTBOX_TRIGGER_CLASS,
    NAV_KEY_ATTR,
};
use photo_stream::tasks::gallery::{self, GalleryTargets};
use photo_stream::tasks::reveal::RevealController;

struct CountingSource {
    images: Result<Vec<ImageDescriptor>, FetchError>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ImageSource for CountingSource {
    async fn fetch(&self) -> Result<Vec<ImageDescriptor>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.images.clone()
    }
}

fn catalog_with(images: Result<Vec<ImageDescriptor>, FetchError>) -> (ImageCatalog, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let catalog = ImageCatalog::new(CountingSource {
        images,
        calls: calls.clone(),
    });
    (catalog, calls)
}

fn named(srcs: &[&str]) -> Vec<ImageDescriptor> {
    srcs.iter().map(|s| ImageDescriptor::new(*s)).collect()
}

/// Navigation keys of the triggers under `slot`, in document order.
fn keys_under(doc: &Document, slot: NodeId) -> Vec<String> {
    doc.descendants(slot)
        .into_iter()
        .filter(|n| doc.has_class(*n, LIGHTBOX_TRIGGER_CLASS))
        .filter_map(|n| doc.attr(n, NAV_KEY_ATTR).map(str::to_owned))
        .collect()
}

fn stale_child(doc: &mut Document, parent: NodeId) -> NodeId {
    let node = doc.create_element("p");
    doc.set_attr(node, "class", "stale");
    doc.append_child(parent, node);
    node
}

#[tokio::test]
async fn replaces_prior_content_of_both_slots() {
    let mut document = markup::skeleton();
    let targets = GalleryTargets::locate(&document);
    let (feature, grid) = (targets.feature.unwrap(), targets.grid.unwrap());
    let old_feature = stale_child(&mut document, feature);
    let old_grid = stale_child(&mut document, grid);
    stale_child(&mut document, grid);

    let doc = SharedDocument::new(document);
    let (catalog, _) = catalog_with(Ok(named(&["a.jpg", "b.jpg", "c.jpg"])));
    let (reveal, _entries) = RevealController::new();
    gallery::assemble(&doc, &catalog, targets, &reveal)
        .await
        .unwrap()
        .expect("gallery built");

    let d = doc.lock();
    assert!(d.find_by_class("stale").is_empty());
    assert!(!d.is_attached(old_feature));
    assert!(!d.is_attached(old_grid));
    assert_eq!(d.children(feature).len(), 1);
    assert!(d.has_class(d.children(feature)[0], FEATURE_ITEM_CLASS));
    assert_eq!(d.children(grid).len(), 2);
    assert_eq!(keys_under(&d, feature), vec!["a.jpg"]);
    assert_eq!(keys_under(&d, grid), vec!["b.jpg", "c.jpg"]);
    assert_eq!(reveal.observer().observed_count(), 3);
}

#[tokio::test]
async fn missing_slot_disables_gallery_without_fetching() {
    for missing in [GALLERY_FEATURE_ID, GALLERY_GRID_ID] {
        let mut document = markup::skeleton();
        let slot = document.find_by_id(missing).unwrap();
        document.remove_attr(slot, "id");
        let targets = GalleryTargets::locate(&document);

        let doc = SharedDocument::new(document);
        let (catalog, calls) = catalog_with(Ok(named(&["a.jpg", "b.jpg"])));
        let (reveal, _entries) = RevealController::new();
        let built = gallery::assemble(&doc, &catalog, targets, &reveal)
            .await
            .unwrap();

        assert!(built.is_none(), "#{missing} absent");
        assert_eq!(calls.load(Ordering::SeqCst), 0, "#{missing} absent");
        assert!(doc.lock().find_by_class(LIGHTBOX_TRIGGER_CLASS).is_empty());
    }
}

#[tokio::test]
async fn returns_full_catalog_with_feature_first() {
    let images = vec![
        ImageDescriptor::new("hero.jpg").with_alt("Hero"),
        ImageDescriptor::new("one.jpg"),
        ImageDescriptor::new("two.jpg").with_alt("Two"),
    ];
    let doc = SharedDocument::new(markup::skeleton());
    let targets = GalleryTargets::locate(&doc.lock());
    let (catalog, calls) = catalog_with(Ok(images.clone()));
    let (reveal, _entries) = RevealController::new();

    let built = gallery::assemble(&doc, &catalog, targets, &reveal)
        .await
        .unwrap()
        .expect("gallery built");
    assert_eq!(built.as_ref(), images.as_slice());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let d = doc.lock();
    let mut keys = keys_under(&d, targets.feature.unwrap());
    keys.extend(keys_under(&d, targets.grid.unwrap()));
    assert_eq!(keys, vec!["hero.jpg", "one.jpg", "two.jpg"]);
}

#[tokio::test]
async fn single_image_fills_only_the_feature() {
    let doc = SharedDocument::new(markup::skeleton());
    let targets = GalleryTargets::locate(&doc.lock());
    let (catalog, _) = catalog_with(Ok(named(&["only.jpg"])));
    let (reveal, _entries) = RevealController::new();

    let built = gallery::assemble(&doc, &catalog, targets, &reveal)
        .await
        .unwrap()
        .expect("gallery built");
    assert_eq!(built.len(), 1);
    let d = doc.lock();
    assert_eq!(d.children(targets.feature.unwrap()).len(), 1);
    assert!(d.children(targets.grid.unwrap()).is_empty());
}

#[tokio::test]
async fn empty_catalog_and_failure_leave_slots_untouched() {
    let (reveal, _entries) = RevealController::new();

    let doc = SharedDocument::new(markup::skeleton());
    let targets = GalleryTargets::locate(&doc.lock());
    let (empty, _) = catalog_with(Ok(Vec::new()));
    assert!(gallery::assemble(&doc, &empty, targets, &reveal)
        .await
        .unwrap()
        .is_none());

    let (failing, _) = catalog_with(Err(FetchError::Status(500)));
    let err = gallery::assemble(&doc, &failing, targets, &reveal)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Failed to load image data");
    assert!(doc.lock().children(targets.feature.unwrap()).is_empty());
}
