//! The image catalog: descriptors fetched once from the data endpoint and
//! memoized for the lifetime of the page.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::error::FetchError;

/// Resource path of the catalog, relative to the site root.
pub const IMAGE_DATA_PATH: &str = "data/images.json";

/// Label used when a descriptor carries no usable `alt`.
pub const DEFAULT_ALT: &str = "Gallery image";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

impl ImageDescriptor {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            alt: None,
        }
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }

    /// The descriptor's alt text, or [`DEFAULT_ALT`] when missing or blank.
    pub fn alt_or_default(&self) -> &str {
        match self.alt.as_deref() {
            Some(alt) if !alt.trim().is_empty() => alt,
            _ => DEFAULT_ALT,
        }
    }
}

/// Ordered, immutable catalog contents.
pub type Images = Arc<[ImageDescriptor]>;

pub fn parse_catalog(body: &[u8]) -> Result<Vec<ImageDescriptor>, FetchError> {
    Ok(serde_json::from_slice(body)?)
}

/// Where catalog data comes from.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<ImageDescriptor>, FetchError>;
}

/// Fetches the catalog over HTTP from `{base_url}/data/images.json`.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        let url = format!("{}/{}", base_url.trim_end_matches('/'), IMAGE_DATA_PATH);
        Self { client, url }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ImageSource for HttpSource {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<Vec<ImageDescriptor>, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "catalog endpoint rejected request");
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = response
            .bytes()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        parse_catalog(&body)
    }
}

/// Reads the catalog from `{site_root}/data/images.json` on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(site_root: impl AsRef<Path>) -> Self {
        Self {
            path: site_root.as_ref().join(IMAGE_DATA_PATH),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ImageSource for FileSource {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn fetch(&self) -> Result<Vec<ImageDescriptor>, FetchError> {
        let body = tokio::fs::read(&self.path)
            .await
            .map_err(|err| FetchError::Transport(format!("{}: {err}", self.path.display())))?;
        parse_catalog(&body)
    }
}

type Outcome = Option<Result<Images, FetchError>>;

#[derive(Default)]
struct CatalogState {
    data: Option<Images>,
    pending: Option<watch::Receiver<Outcome>>,
}

fn lock_state(state: &Mutex<CatalogState>) -> MutexGuard<'_, CatalogState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Memoizing front for an [`ImageSource`].
///
/// At most one fetch is in flight: callers arriving while it runs wait on
/// the same outcome. Success is cached for the lifetime of the catalog;
/// failure is not, so the next `load` starts a fresh fetch.
#[derive(Clone)]
pub struct ImageCatalog {
    source: Arc<dyn ImageSource>,
    state: Arc<Mutex<CatalogState>>,
}

impl fmt::Debug for ImageCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock_state(&self.state);
        f.debug_struct("ImageCatalog")
            .field("cached", &state.data.as_ref().map(|d| d.len()))
            .field("in_flight", &state.pending.is_some())
            .finish()
    }
}

impl ImageCatalog {
    pub fn new(source: impl ImageSource + 'static) -> Self {
        Self::from_source(Arc::new(source))
    }

    pub fn from_source(source: Arc<dyn ImageSource>) -> Self {
        Self {
            source,
            state: Arc::new(Mutex::new(CatalogState::default())),
        }
    }

    /// Cached contents, if a fetch has already succeeded.
    pub fn cached(&self) -> Option<Images> {
        lock_state(&self.state).data.clone()
    }

    pub fn is_loading(&self) -> bool {
        lock_state(&self.state).pending.is_some()
    }

    /// Return the catalog, fetching it if nothing is cached yet.
    ///
    /// A fetch that ends without reporting (its task panicked) is restarted
    /// once before [`FetchError::Abandoned`] is returned.
    pub async fn load(&self) -> Result<Images, FetchError> {
        let mut restarted = false;
        loop {
            let mut pending = {
                let mut state = lock_state(&self.state);
                if let Some(images) = &state.data {
                    return Ok(Arc::clone(images));
                }
                let in_flight = state.pending.clone();
                match in_flight {
                    Some(rx) => {
                        debug!("joining in-flight catalog fetch");
                        rx
                    }
                    None => self.start_fetch(&mut state),
                }
            };

            let waited = pending
                .wait_for(Option::is_some)
                .await
                .map(|outcome| (*outcome).clone());
            if let Ok(Some(outcome)) = waited {
                return outcome;
            }

            {
                let mut state = lock_state(&self.state);
                if state
                    .pending
                    .as_ref()
                    .is_some_and(|rx| rx.same_channel(&pending))
                {
                    state.pending = None;
                }
            }
            if restarted {
                return Err(FetchError::Abandoned);
            }
            warn!("catalog fetch ended without a result; restarting");
            restarted = true;
        }
    }

    fn start_fetch(&self, state: &mut CatalogState) -> watch::Receiver<Outcome> {
        let (tx, rx) = watch::channel(None);
        state.pending = Some(rx.clone());
        debug!("starting catalog fetch");

        let source = Arc::clone(&self.source);
        let shared = Arc::clone(&self.state);
        tokio::spawn(async move {
            let result = source.fetch().await.map(Images::from);
            {
                let mut state = lock_state(&shared);
                state.pending = None;
                match &result {
                    Ok(images) => {
                        info!(count = images.len(), "image catalog loaded");
                        state.data = Some(Arc::clone(images));
                    }
                    Err(err) => debug!(error = %err, "catalog fetch failed; not caching"),
                }
            }
            let _ = tx.send(Some(result));
        });
        rx
    }
}
