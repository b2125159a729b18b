//! Modal image viewer.
//!
//! `Closed -> Open` on activation of a registered trigger, `Open -> Open` on
//! prev/next (click, arrow keys, touch), `Open -> Closed` on the close
//! control, a click on the backdrop itself, or Escape.

use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::catalog::{DEFAULT_ALT, ImageDescriptor};
use crate::dom::{Document, NodeId, SharedDocument};
use crate::events::{Key, TouchPhase, UiEvent};
use crate::gesture::{Gesture, Point, Step};
use crate::markup::{
    LIGHTBOX_CLASS, LIGHTBOX_CLOSE_CLASS, LIGHTBOX_IMAGE_CLASS, LIGHTBOX_NAV_CLASS,
    LIGHTBOX_TRIGGER_CLASS, NAV_KEY_ATTR, OPEN_CLASS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightboxElements {
    pub root: NodeId,
    pub image: NodeId,
    pub close: NodeId,
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,
}

impl LightboxElements {
    /// Find the lightbox in `doc`. The root, image slot and close control
    /// are required; prev/next are only used when both exist.
    pub fn locate(doc: &Document) -> Option<Self> {
        let root = doc.find_first_by_class(LIGHTBOX_CLASS)?;
        let image = doc.find_first_by_class(LIGHTBOX_IMAGE_CLASS)?;
        let close = doc.find_first_by_class(LIGHTBOX_CLOSE_CLASS)?;
        let prev = doc.find_first_by_classes(&[LIGHTBOX_NAV_CLASS, "prev"]);
        let next = doc.find_first_by_classes(&[LIGHTBOX_NAV_CLASS, "next"]);
        let (prev, next) = match (prev, next) {
            (Some(prev), Some(next)) => (Some(prev), Some(next)),
            _ => (None, None),
        };
        Some(Self {
            root,
            image,
            close,
            prev,
            next,
        })
    }

    fn is_control(&self, node: NodeId) -> bool {
        node == self.close || Some(node) == self.prev || Some(node) == self.next
    }
}

/// Image list for a lightbox driven by hand-authored triggers: the key of
/// every `.lightbox-trigger` that has a non-empty one, in document order.
pub fn trigger_images(doc: &Document) -> Vec<ImageDescriptor> {
    doc.find_by_class(LIGHTBOX_TRIGGER_CLASS)
        .into_iter()
        .filter_map(|trigger| doc.attr(trigger, NAV_KEY_ATTR))
        .filter(|key| !key.is_empty())
        .map(ImageDescriptor::new)
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LightboxState {
    #[default]
    Closed,
    Open,
}

#[derive(Debug)]
pub struct LightboxController {
    elements: LightboxElements,
    images: Vec<ImageDescriptor>,
    triggers: Vec<NodeId>,
    state: LightboxState,
    current_index: usize,
    gesture: Option<Gesture>,
}

impl LightboxController {
    pub fn new(elements: LightboxElements, images: &[ImageDescriptor]) -> Self {
        Self {
            elements,
            images: images.to_vec(),
            triggers: Vec::new(),
            state: LightboxState::Closed,
            current_index: 0,
            gesture: None,
        }
    }

    /// Register every `.lightbox-trigger` currently in the document.
    pub fn register_triggers(&mut self, doc: &Document) -> usize {
        for trigger in doc.find_by_class(LIGHTBOX_TRIGGER_CLASS) {
            if !self.triggers.contains(&trigger) {
                self.triggers.push(trigger);
            }
        }
        self.triggers.len()
    }

    pub fn state(&self) -> LightboxState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == LightboxState::Open
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn elements(&self) -> LightboxElements {
        self.elements
    }

    /// Open on the image whose `src` equals `key`. The first match wins for
    /// duplicate sources; an unknown key opens at index 0.
    pub fn open(&mut self, doc: &mut Document, key: &str) {
        let found = self.images.iter().position(|img| img.src == key);
        self.current_index = found.unwrap_or(0);
        doc.set_attr(self.elements.image, "src", key);
        let alt = found.map_or(DEFAULT_ALT, |index| self.images[index].alt_or_default());
        doc.set_attr(self.elements.image, "alt", alt);
        doc.add_class(self.elements.root, OPEN_CLASS);
        doc.set_attr(self.elements.root, "aria-hidden", "false");
        self.state = LightboxState::Open;
        debug!(key, index = self.current_index, "lightbox opened");
    }

    /// Hide the lightbox and release the displayed image.
    pub fn close(&mut self, doc: &mut Document) {
        doc.remove_class(self.elements.root, OPEN_CLASS);
        doc.set_attr(self.elements.root, "aria-hidden", "true");
        doc.set_attr(self.elements.image, "src", "");
        self.gesture = None;
        if self.state == LightboxState::Open {
            debug!("lightbox closed");
        }
        self.state = LightboxState::Closed;
    }

    /// Move one image back or forward, wrapping at either end. No-op while
    /// closed or with nothing to show.
    pub fn step(&mut self, doc: &mut Document, step: Step) {
        if !self.is_open() || self.images.is_empty() {
            return;
        }
        let len = self.images.len();
        self.current_index = match step {
            Step::Next => (self.current_index + 1) % len,
            Step::Prev => (self.current_index + len - 1) % len,
        };
        let shown = &self.images[self.current_index];
        doc.set_attr(self.elements.image, "src", shown.src.as_str());
        doc.set_attr(self.elements.image, "alt", shown.alt_or_default());
        debug!(?step, index = self.current_index, "lightbox navigated");
    }

    pub fn handle(&mut self, doc: &mut Document, event: &UiEvent) {
        match event {
            UiEvent::Click { target } => self.on_click(doc, *target),
            UiEvent::Key(key) => self.on_key(doc, key),
            UiEvent::Touch {
                phase,
                target,
                point,
            } => self.on_touch(doc, *phase, *target, *point),
        }
    }

    fn on_click(&mut self, doc: &mut Document, target: NodeId) {
        let path = doc.self_and_ancestors(target);
        if let Some(trigger) = path.iter().find(|n| self.triggers.contains(*n)) {
            let key = doc.attr(*trigger, NAV_KEY_ATTR).map(str::to_owned);
            match key {
                Some(key) if !key.is_empty() => self.open(doc, &key),
                _ => debug!(?trigger, "trigger without navigation key"),
            }
            return;
        }
        if target == self.elements.root || path.contains(&self.elements.close) {
            self.close(doc);
        } else if self.elements.prev.is_some_and(|prev| path.contains(&prev)) {
            self.step(doc, Step::Prev);
        } else if self.elements.next.is_some_and(|next| path.contains(&next)) {
            self.step(doc, Step::Next);
        }
    }

    fn on_key(&mut self, doc: &mut Document, key: &Key) {
        match key {
            Key::Escape if self.is_open() => self.close(doc),
            Key::ArrowLeft => self.step(doc, Step::Prev),
            Key::ArrowRight => self.step(doc, Step::Next),
            _ => {}
        }
    }

    fn on_touch(&mut self, doc: &mut Document, phase: TouchPhase, target: NodeId, point: Point) {
        if !self.is_open() {
            return;
        }
        let path = doc.self_and_ancestors(target);
        if !path.contains(&self.elements.root) {
            return;
        }
        match phase {
            TouchPhase::Start => {
                let on_control = path.iter().any(|n| self.elements.is_control(*n));
                self.gesture = Some(Gesture::begin(point, on_control));
            }
            TouchPhase::Move => {
                if let Some(gesture) = self.gesture.as_mut() {
                    gesture.track(point);
                }
            }
            TouchPhase::End => {
                if let Some(step) = self.gesture.take().and_then(|g| g.finish()) {
                    self.step(doc, step);
                }
            }
        }
    }
}

pub async fn run(
    mut controller: LightboxController,
    doc: SharedDocument,
    mut events: Receiver<UiEvent>,
    cancel: CancellationToken,
) -> Result<()> {
    loop {
        select! {
            _ = cancel.cancelled() => break,
            maybe_event = events.recv() => {
                let Some(event) = maybe_event else {
                    debug!("ui event channel closed");
                    break;
                };
                controller.handle(&mut doc.lock(), &event);
            }
        }
    }
    info!(open = controller.is_open(), "lightbox task exiting");
    Ok(())
}
