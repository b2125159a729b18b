//! Intersection observation over the headless document.
//!
//! An [`IntersectionObserver`] tracks a set of targets and delivers an
//! [`IntersectionEntry`] to its subscriber channel whenever a target's
//! intersecting state flips, plus once on the first evaluation after the
//! target is observed. The [`Viewport`] owns the scroll position and drives
//! evaluation of every attached observer.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, trace};

use crate::dom::{Document, NodeId, Rect, SharedDocument};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverOptions {
    /// Fraction of the target's area that must be inside the root.
    pub threshold: f64,
    /// Pixels added above and below the viewport before testing.
    pub root_margin: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub target: NodeId,
    pub ratio: f64,
    pub is_intersecting: bool,
}

#[derive(Debug)]
struct Target {
    node: NodeId,
    /// `None` until the first evaluation after `observe`.
    last: Option<bool>,
}

#[derive(Debug)]
struct ObserverState {
    options: ObserverOptions,
    targets: Vec<Target>,
    subscriber: UnboundedSender<IntersectionEntry>,
}

#[derive(Debug, Clone)]
pub struct IntersectionObserver {
    state: Arc<Mutex<ObserverState>>,
}

impl IntersectionObserver {
    /// Create an observer and the channel its entries are delivered on.
    pub fn new(options: ObserverOptions) -> (Self, UnboundedReceiver<IntersectionEntry>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let observer = Self {
            state: Arc::new(Mutex::new(ObserverState {
                options,
                targets: Vec::new(),
                subscriber: tx,
            })),
        };
        (observer, rx)
    }

    fn lock(&self) -> MutexGuard<'_, ObserverState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn options(&self) -> ObserverOptions {
        self.lock().options
    }

    /// Start tracking `target`. Absent targets and repeated registrations are
    /// ignored.
    pub fn observe(&self, target: Option<NodeId>) {
        let Some(node) = target else {
            return;
        };
        let mut state = self.lock();
        if state.targets.iter().any(|t| t.node == node) {
            return;
        }
        state.targets.push(Target { node, last: None });
    }

    pub fn unobserve(&self, target: NodeId) {
        self.lock().targets.retain(|t| t.node != target);
    }

    pub fn is_observing(&self, target: NodeId) -> bool {
        self.lock().targets.iter().any(|t| t.node == target)
    }

    pub fn observed_count(&self) -> usize {
        self.lock().targets.len()
    }

    /// Test every target against `viewport` and deliver entries for the ones
    /// whose state changed. Returns the number of entries delivered.
    pub fn evaluate(&self, doc: &Document, viewport: Rect) -> usize {
        let mut state = self.lock();
        let ObserverOptions {
            threshold,
            root_margin,
        } = state.options;
        let root = Rect::new(
            viewport.x,
            viewport.y - root_margin,
            viewport.width,
            viewport.height + 2.0 * root_margin,
        );

        let mut entries = Vec::new();
        for target in &mut state.targets {
            let (ratio, overlapping) = match doc.rect(target.node) {
                Some(rect) if doc.is_attached(target.node) => intersection_ratio(&rect, &root),
                _ => (0.0, false),
            };
            let is_intersecting = overlapping && ratio >= threshold;
            if target.last == Some(is_intersecting) {
                continue;
            }
            target.last = Some(is_intersecting);
            entries.push(IntersectionEntry {
                target: target.node,
                ratio,
                is_intersecting,
            });
        }

        let mut delivered = 0;
        for entry in entries {
            trace!(target = ?entry.target, ratio = entry.ratio, intersecting = entry.is_intersecting, "intersection entry");
            if state.subscriber.send(entry).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }
}

/// Visible fraction of `target` inside `root`, and whether they touch at
/// all. Zero-area targets count as fully visible when touching.
pub fn intersection_ratio(target: &Rect, root: &Rect) -> (f64, bool) {
    match target.intersection(root) {
        None => (0.0, false),
        Some(_) if target.area() == 0.0 => (1.0, true),
        Some(overlap) => (overlap.area() / target.area(), true),
    }
}

#[derive(Debug)]
struct ViewportState {
    scroll_y: f64,
    width: f64,
    height: f64,
    observers: Vec<IntersectionObserver>,
}

/// Scrollable window onto the document.
#[derive(Debug, Clone)]
pub struct Viewport {
    state: Arc<Mutex<ViewportState>>,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            state: Arc::new(Mutex::new(ViewportState {
                scroll_y: 0.0,
                width,
                height,
                observers: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ViewportState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn attach(&self, observer: IntersectionObserver) {
        self.lock().observers.push(observer);
    }

    pub fn rect(&self) -> Rect {
        let state = self.lock();
        Rect::new(0.0, state.scroll_y, state.width, state.height)
    }

    pub fn scroll_y(&self) -> f64 {
        self.lock().scroll_y
    }

    pub fn scroll_to(&self, doc: &SharedDocument, y: f64) -> usize {
        self.lock().scroll_y = y.max(0.0);
        self.refresh(doc)
    }

    pub fn scroll_by(&self, doc: &SharedDocument, dy: f64) -> usize {
        let y = self.scroll_y() + dy;
        self.scroll_to(doc, y)
    }

    pub fn resize(&self, doc: &SharedDocument, width: f64, height: f64) -> usize {
        {
            let mut state = self.lock();
            state.width = width;
            state.height = height;
        }
        self.refresh(doc)
    }

    /// Re-evaluate every observer against the current layout, e.g. after
    /// content was appended. Returns the number of entries delivered.
    pub fn refresh(&self, doc: &SharedDocument) -> usize {
        let (observers, rect) = {
            let state = self.lock();
            (
                state.observers.clone(),
                Rect::new(0.0, state.scroll_y, state.width, state.height),
            )
        };
        let doc = doc.lock();
        let delivered: usize = observers.iter().map(|o| o.evaluate(&doc, rect)).sum();
        debug!(scroll_y = rect.y, delivered, "viewport evaluated");
        delivered
    }
}
