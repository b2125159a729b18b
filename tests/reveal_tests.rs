use std::time::Duration;

use photo_stream::dom::{Document, NodeId, Rect, SharedDocument};
use photo_stream::markup::{REVEAL_ATTR, VISIBLE_CLASS};
use photo_stream::observer::IntersectionEntry;
use photo_stream::tasks::reveal::{self, RevealController};
use tokio_util::sync::CancellationToken;

fn tagged_box(doc: &mut Document, rect: Rect) -> NodeId {
    let node = doc.create_element("section");
    doc.set_attr(node, REVEAL_ATTR, "");
    let body = doc.body();
    doc.append_child(body, node);
    doc.set_rect(node, rect);
    node
}

fn entry(target: NodeId, is_intersecting: bool) -> IntersectionEntry {
    IntersectionEntry {
        target,
        ratio: if is_intersecting { 1.0 } else { 0.0 },
        is_intersecting,
    }
}

#[test]
fn toggling_intersection_reveals_once() {
    let mut doc = Document::new();
    let node = tagged_box(&mut doc, Rect::new(0.0, 0.0, 100.0, 100.0));
    let (reveal, _entries) = RevealController::new();
    reveal.observe(Some(node));

    assert!(!reveal.handle(&mut doc, entry(node, false)));
    assert!(!doc.has_class(node, VISIBLE_CLASS));
    assert!(reveal.handle(&mut doc, entry(node, true)));
    assert!(!reveal.observer().is_observing(node));
    assert!(!reveal.handle(&mut doc, entry(node, false)));
    assert!(!reveal.handle(&mut doc, entry(node, true)));
    assert!(doc.has_class(node, VISIBLE_CLASS));
}

#[test]
fn reveal_waits_for_threshold() {
    let mut doc = Document::new();
    // 100px tall, starting 85px into a 100px viewport: 15% visible.
    let node = tagged_box(&mut doc, Rect::new(0.0, 85.0, 100.0, 100.0));
    let (reveal, mut entries) = RevealController::new();
    assert_eq!(reveal.observer().options().threshold, reveal::REVEAL_THRESHOLD);
    reveal.observe(Some(node));

    reveal.observer().evaluate(&doc, Rect::new(0.0, 0.0, 100.0, 100.0));
    let first = entries.try_recv().unwrap();
    assert!(!first.is_intersecting);
    assert!(!reveal.handle(&mut doc, first));

    // Scroll 5px: exactly 20% visible.
    reveal.observer().evaluate(&doc, Rect::new(0.0, 5.0, 100.0, 100.0));
    let second = entries.try_recv().unwrap();
    assert!(second.is_intersecting);
    assert!(reveal.handle(&mut doc, second));

    // Deregistered: further scrolling produces nothing.
    reveal.observer().evaluate(&doc, Rect::new(0.0, 5000.0, 100.0, 100.0));
    reveal.observer().evaluate(&doc, Rect::new(0.0, 5.0, 100.0, 100.0));
    assert!(entries.try_recv().is_err());
}

#[test]
fn observe_marked_skips_already_visible() {
    let mut doc = Document::new();
    let a = tagged_box(&mut doc, Rect::new(0.0, 0.0, 10.0, 10.0));
    let b = tagged_box(&mut doc, Rect::new(0.0, 10.0, 10.0, 10.0));
    doc.add_class(b, VISIBLE_CLASS);
    let (reveal, _entries) = RevealController::new();

    assert_eq!(reveal.observe_marked(&doc), 1);
    assert!(reveal.observer().is_observing(a));
    assert!(!reveal.observer().is_observing(b));
    reveal.observe(None);
    assert_eq!(reveal.observer().observed_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn reveal_task_marks_elements_in_view() {
    let mut doc = Document::new();
    let near = tagged_box(&mut doc, Rect::new(0.0, 100.0, 100.0, 100.0));
    let far = tagged_box(&mut doc, Rect::new(0.0, 2000.0, 100.0, 100.0));
    let doc = SharedDocument::new(doc);

    let (controller, entries) = RevealController::new();
    controller.observe_marked(&doc.lock());
    let observer = controller.observer().clone();
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(reveal::run(controller, doc.clone(), entries, cancel.clone()));

    observer.evaluate(&doc.lock(), Rect::new(0.0, 0.0, 100.0, 800.0));
    tokio::time::timeout(Duration::from_secs(2), async {
        while !doc.lock().has_class(near, VISIBLE_CLASS) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("near element revealed");
    assert!(!doc.lock().has_class(far, VISIBLE_CLASS));
    assert_eq!(observer.observed_count(), 1);

    cancel.cancel();
    handle.await.unwrap().unwrap();
}
