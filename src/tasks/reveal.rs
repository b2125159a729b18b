//! One-shot reveal of elements as they scroll into view.

use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::dom::{Document, NodeId, SharedDocument};
use crate::markup::{REVEAL_ATTR, VISIBLE_CLASS};
use crate::observer::{IntersectionEntry, IntersectionObserver, ObserverOptions};

/// Fraction of an element that must be on screen before it is revealed.
pub const REVEAL_THRESHOLD: f64 = 0.2;

/// Marks observed elements `visible` the first time they cross the reveal
/// threshold, then stops watching them.
#[derive(Debug, Clone)]
pub struct RevealController {
    observer: IntersectionObserver,
}

impl RevealController {
    pub fn new() -> (Self, UnboundedReceiver<IntersectionEntry>) {
        let (observer, entries) = IntersectionObserver::new(ObserverOptions {
            threshold: REVEAL_THRESHOLD,
            root_margin: 0.0,
        });
        (Self { observer }, entries)
    }

    pub fn observer(&self) -> &IntersectionObserver {
        &self.observer
    }

    pub fn observe(&self, element: Option<NodeId>) {
        self.observer.observe(element);
    }

    /// Observe every `[data-reveal]` element that is not visible yet.
    pub fn observe_marked(&self, doc: &Document) -> usize {
        let pending: Vec<NodeId> = doc
            .find_by_attr(REVEAL_ATTR)
            .into_iter()
            .filter(|id| !doc.has_class(*id, VISIBLE_CLASS))
            .collect();
        for id in &pending {
            self.observer.observe(Some(*id));
        }
        pending.len()
    }

    /// Apply one intersection entry. Returns whether the element was revealed
    /// by this call.
    pub fn handle(&self, doc: &mut Document, entry: IntersectionEntry) -> bool {
        if !entry.is_intersecting {
            return false;
        }
        self.observer.unobserve(entry.target);
        if doc.has_class(entry.target, VISIBLE_CLASS) {
            return false;
        }
        doc.add_class(entry.target, VISIBLE_CLASS);
        true
    }
}

pub async fn run(
    controller: RevealController,
    doc: SharedDocument,
    mut entries: UnboundedReceiver<IntersectionEntry>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut revealed = 0usize;
    loop {
        select! {
            _ = cancel.cancelled() => break,
            maybe_entry = entries.recv() => {
                let Some(entry) = maybe_entry else {
                    debug!("reveal observer dropped");
                    break;
                };
                if controller.handle(&mut doc.lock(), entry) {
                    revealed += 1;
                    debug!(target = ?entry.target, "revealed");
                }
            }
        }
    }
    info!(revealed, "reveal task exiting");
    Ok(())
}
