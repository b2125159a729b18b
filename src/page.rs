//! Page bootstrap: binds every component to the document and starts their
//! event loops.

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::catalog::ImageCatalog;
use crate::dom::SharedDocument;
use crate::events::UiEvent;
use crate::markup::{LIGHTBOX_TRIGGER_CLASS, STREAM_ITEM_CLASS, VISIBLE_CLASS};
use crate::observer::Viewport;
use crate::tasks::gallery::{self, GalleryTargets};
use crate::tasks::lightbox::{self, LightboxController, LightboxElements};
use crate::tasks::reveal::{self, RevealController};
use crate::tasks::stream::{self, StreamPaginator, StreamTargets};

const UI_EVENT_CAPACITY: usize = 64;

/// Outcome of bringing up one page section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SectionStatus {
    Ready,
    /// Markup missing or catalog empty.
    #[default]
    Skipped,
    /// The catalog could not be loaded.
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootReport {
    pub stream: SectionStatus,
    pub gallery: SectionStatus,
    pub lightbox: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSummary {
    pub stream_items: usize,
    pub revealed: usize,
    pub lightbox_triggers: usize,
}

#[derive(Debug)]
pub struct Page {
    doc: SharedDocument,
    viewport: Viewport,
    catalog: ImageCatalog,
    ui_events: Option<mpsc::Sender<UiEvent>>,
    report: BootReport,
    tasks: JoinSet<Result<()>>,
    cancel: CancellationToken,
}

impl Page {
    /// Wire the reveal controller, the home stream, the gallery and the
    /// lightbox. Stream and gallery load the catalog concurrently; a failed
    /// load is logged and leaves that section empty. The lightbox is wired
    /// whenever its markup exists, navigating the gallery's catalog or, when
    /// there is none, the page's own triggers.
    pub async fn boot(
        doc: SharedDocument,
        catalog: ImageCatalog,
        viewport: Viewport,
        cancel: CancellationToken,
    ) -> Self {
        let mut tasks = JoinSet::new();
        let mut report = BootReport::default();

        let (reveal, reveal_entries) = RevealController::new();
        viewport.attach(reveal.observer().clone());
        let (stream_targets, gallery_targets, lightbox_elements) = {
            let doc = doc.lock();
            let marked = reveal.observe_marked(&doc);
            info!(marked, "observing static reveal targets");
            (
                StreamTargets::locate(&doc),
                GalleryTargets::locate(&doc),
                LightboxElements::locate(&doc),
            )
        };

        let (stream_init, gallery_init) = tokio::join!(
            StreamPaginator::init(&catalog, stream_targets, reveal.clone()),
            gallery::assemble(&doc, &catalog, gallery_targets, &reveal),
        );

        match stream_init {
            Ok(Some(paginator)) => {
                let (observer, sentinel_entries) = paginator.sentinel_observer();
                viewport.attach(observer);
                tasks.spawn(stream::run(
                    paginator,
                    doc.clone(),
                    sentinel_entries,
                    cancel.clone(),
                ));
                report.stream = SectionStatus::Ready;
            }
            Ok(None) => {}
            Err(err) => {
                error!(error = %err, "home stream failed to initialize");
                report.stream = SectionStatus::Failed;
            }
        }

        let mut gallery_images = None;
        match gallery_init {
            Ok(Some(images)) => {
                report.gallery = SectionStatus::Ready;
                gallery_images = Some(images);
            }
            Ok(None) => {}
            Err(err) => {
                error!(error = %err, "gallery failed to initialize");
                report.gallery = SectionStatus::Failed;
            }
        }

        // Without a built gallery the lightbox runs off whatever triggers the
        // page already carries.
        let mut ui_events = None;
        if let Some(elements) = lightbox_elements {
            let controller = {
                let doc = doc.lock();
                let mut controller = match &gallery_images {
                    Some(images) => LightboxController::new(elements, images),
                    None => LightboxController::new(elements, &lightbox::trigger_images(&doc)),
                };
                let triggers = controller.register_triggers(&doc);
                info!(
                    triggers,
                    from_gallery = gallery_images.is_some(),
                    "lightbox ready"
                );
                controller
            };
            let (tx, rx) = mpsc::channel(UI_EVENT_CAPACITY);
            tasks.spawn(lightbox::run(controller, doc.clone(), rx, cancel.clone()));
            ui_events = Some(tx);
            report.lightbox = true;
        }

        tasks.spawn(reveal::run(reveal, doc.clone(), reveal_entries, cancel.clone()));
        viewport.refresh(&doc);

        Self {
            doc,
            viewport,
            catalog,
            ui_events,
            report,
            tasks,
            cancel,
        }
    }

    pub fn document(&self) -> &SharedDocument {
        &self.doc
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn catalog(&self) -> &ImageCatalog {
        &self.catalog
    }

    pub fn report(&self) -> BootReport {
        self.report
    }

    /// Forward an input event to the lightbox. Returns `false` when no
    /// lightbox is wired or its task has stopped.
    pub async fn dispatch(&self, event: UiEvent) -> bool {
        let Some(tx) = self.ui_events.as_ref() else {
            return false;
        };
        match tx.send(event).await {
            Ok(()) => true,
            Err(_) => {
                warn!("lightbox task is gone; dropping ui event");
                false
            }
        }
    }

    pub fn summary(&self) -> PageSummary {
        let doc = self.doc.lock();
        PageSummary {
            stream_items: doc.find_by_class(STREAM_ITEM_CLASS).len(),
            revealed: doc.find_by_class(VISIBLE_CLASS).len(),
            lightbox_triggers: doc.find_by_class(LIGHTBOX_TRIGGER_CLASS).len(),
        }
    }

    /// Cancel every task and wait for them to finish.
    pub async fn shutdown(mut self) -> Result<()> {
        self.cancel.cancel();
        self.ui_events = None;
        while let Some(joined) = self.tasks.join_next().await {
            joined.context("page task panicked")??;
        }
        Ok(())
    }
}
