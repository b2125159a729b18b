use std::path::{Path, PathBuf};

use anyhow::{Result, ensure};
use serde::Deserialize;

use crate::catalog::{FileSource, HttpSource, ImageCatalog};

/// Where the image catalog is read from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(
    tag = "kind",
    rename_all = "kebab-case",
    rename_all_fields = "kebab-case"
)]
pub enum SourceConfig {
    /// `GET {base-url}/data/images.json`.
    Http { base_url: String },
    /// `{site-root}/data/images.json` on the local filesystem.
    File { site_root: PathBuf },
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::File {
            site_root: PathBuf::from("."),
        }
    }
}

impl SourceConfig {
    pub fn catalog(&self) -> ImageCatalog {
        match self {
            Self::Http { base_url } => ImageCatalog::new(HttpSource::new(base_url)),
            Self::File { site_root } => ImageCatalog::new(FileSource::new(site_root)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ViewportConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}

/// How the headless preview walks the page.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct PreviewOptions {
    /// Number of scroll steps before the page is written out.
    pub scroll_steps: usize,
    /// Pixels scrolled per step.
    pub scroll_step: f64,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            scroll_steps: 4,
            scroll_step: 800.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Configuration {
    pub source: SourceConfig,
    pub viewport: ViewportConfig,
    pub preview: PreviewOptions,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(
            self.viewport.width > 0.0 && self.viewport.height > 0.0,
            "viewport width and height must be positive"
        );
        ensure!(
            self.preview.scroll_step > 0.0,
            "preview.scroll-step must be positive"
        );
        if let SourceConfig::Http { base_url } = &self.source {
            ensure!(
                base_url.starts_with("http://") || base_url.starts_with("https://"),
                "source.base-url must be an http(s) URL, got {base_url:?}"
            );
        }
        Ok(self)
    }
}
