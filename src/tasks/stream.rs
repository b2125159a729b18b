//! Infinite home stream: batches of items appended whenever the sentinel at
//! the end of the stream comes within reach of the viewport.

use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{Duration, Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::catalog::{ImageCatalog, Images};
use crate::dom::{Document, NodeId, SharedDocument};
use crate::error::FetchError;
use crate::items;
use crate::markup::{STREAM_ID, STREAM_LOADING_ID, STREAM_SENTINEL_ID};
use crate::observer::{IntersectionEntry, IntersectionObserver, ObserverOptions};
use crate::tasks::reveal::RevealController;

pub const BATCH_SIZE: usize = 12;
/// How long the loading indicator stays up after the latest batch.
pub const LOADING_HIDE_DELAY: Duration = Duration::from_millis(200);
/// Distance ahead of the viewport at which the sentinel fires.
pub const SENTINEL_MARGIN: f64 = 300.0;

/// Position of the next catalog entry to append. Wraps at the catalog
/// length, so the stream never runs out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamCursor {
    next_index: usize,
}

impl StreamCursor {
    #[must_use]
    pub const fn next_index(&self) -> usize {
        self.next_index
    }

    /// Return the current index and move past it, wrapping at `len`.
    /// `None` for an empty catalog.
    pub fn advance(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let out = self.next_index % len;
        self.next_index = (out + 1) % len;
        Some(out)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StreamTargets {
    pub stream: Option<NodeId>,
    pub loading: Option<NodeId>,
    pub sentinel: Option<NodeId>,
}

impl StreamTargets {
    pub fn locate(doc: &Document) -> Self {
        Self {
            stream: doc.find_by_id(STREAM_ID),
            loading: doc.find_by_id(STREAM_LOADING_ID),
            sentinel: doc.find_by_id(STREAM_SENTINEL_ID),
        }
    }
}

#[derive(Debug)]
pub struct StreamPaginator {
    images: Images,
    cursor: StreamCursor,
    stream: NodeId,
    loading: NodeId,
    sentinel: NodeId,
    reveal: RevealController,
    batches: usize,
}

impl StreamPaginator {
    /// Load the catalog and bind to the stream elements.
    ///
    /// Returns `Ok(None)` when any element is missing or the catalog is
    /// empty; there is nothing to paginate in either case.
    #[instrument(skip_all)]
    pub async fn init(
        catalog: &ImageCatalog,
        targets: StreamTargets,
        reveal: RevealController,
    ) -> Result<Option<Self>, FetchError> {
        let StreamTargets {
            stream: Some(stream),
            loading: Some(loading),
            sentinel: Some(sentinel),
        } = targets
        else {
            debug!(?targets, "stream elements missing; stream disabled");
            return Ok(None);
        };

        let images = catalog.load().await?;
        if images.is_empty() {
            debug!("empty catalog; stream disabled");
            return Ok(None);
        }

        Ok(Some(Self {
            images,
            cursor: StreamCursor::default(),
            stream,
            loading,
            sentinel,
            reveal,
            batches: 0,
        }))
    }

    /// Observer watching the sentinel with the look-ahead margin.
    pub fn sentinel_observer(&self) -> (IntersectionObserver, UnboundedReceiver<IntersectionEntry>) {
        let (observer, entries) = IntersectionObserver::new(ObserverOptions {
            threshold: 0.0,
            root_margin: SENTINEL_MARGIN,
        });
        observer.observe(Some(self.sentinel));
        (observer, entries)
    }

    pub fn cursor(&self) -> StreamCursor {
        self.cursor
    }

    pub fn batches(&self) -> usize {
        self.batches
    }

    /// Show the loading indicator and append one batch of items, each
    /// registered for reveal. Returns the new items in order.
    pub fn append_batch(&mut self, doc: &mut Document) -> Vec<NodeId> {
        doc.remove_attr(self.loading, "hidden");
        doc.set_attr(self.loading, "aria-busy", "true");

        let mut added = Vec::with_capacity(BATCH_SIZE);
        for _ in 0..BATCH_SIZE {
            let Some(index) = self.cursor.advance(self.images.len()) else {
                break;
            };
            let item = items::stream_item(doc, &self.images[index]);
            doc.append_child(self.stream, item);
            self.reveal.observe(Some(item));
            added.push(item);
        }
        self.batches += 1;
        debug!(
            batch = self.batches,
            appended = added.len(),
            next_index = self.cursor.next_index(),
            "stream batch appended"
        );
        added
    }

    pub fn hide_loading(&self, doc: &mut Document) {
        doc.set_attr(self.loading, "hidden", "");
        doc.remove_attr(self.loading, "aria-busy");
    }
}

/// Append a batch every time the sentinel starts intersecting, hiding the
/// loading indicator once no batch has landed for [`LOADING_HIDE_DELAY`].
pub async fn run(
    mut paginator: StreamPaginator,
    doc: SharedDocument,
    mut sentinel: UnboundedReceiver<IntersectionEntry>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut hide_at: Option<Instant> = None;
    loop {
        let deadline = hide_at.unwrap_or_else(Instant::now);
        select! {
            _ = cancel.cancelled() => break,
            _ = sleep_until(deadline), if hide_at.is_some() => {
                paginator.hide_loading(&mut doc.lock());
                hide_at = None;
            }
            maybe_entry = sentinel.recv() => match maybe_entry {
                Some(entry) if entry.is_intersecting => {
                    paginator.append_batch(&mut doc.lock());
                    hide_at = Some(Instant::now() + LOADING_HIDE_DELAY);
                }
                Some(_) => {}
                None => {
                    debug!("sentinel observer dropped");
                    break;
                }
            }
        }
    }
    info!(batches = paginator.batches(), "stream task exiting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_wraps_over_catalog_length() {
        let mut cursor = StreamCursor::default();
        let order: Vec<usize> = (0..12).filter_map(|_| cursor.advance(5)).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4, 0, 1, 2, 3, 4, 0, 1]);
        assert_eq!(cursor.next_index(), 2);
    }

    #[test]
    fn cursor_is_inert_for_empty_catalog() {
        let mut cursor = StreamCursor::default();
        assert_eq!(cursor.advance(0), None);
        assert_eq!(cursor.next_index(), 0);
    }
}
