//! `blog.toml` configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use quire_static::{BuildConfig, ManifestConfig, SiteMetadata};

/// Configuration file structure (blog.toml).
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub site: SiteMetadata,
    pub content: ContentSettings,
    pub build: BuildSettings,
    pub analytics: AnalyticsSettings,
    pub manifest: ManifestConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ContentSettings {
    pub dir: PathBuf,
    pub output: PathBuf,
    pub query_limit: usize,
}

impl Default for ContentSettings {
    fn default() -> Self {
        let build = BuildConfig::default();
        Self {
            dir: build.content_dir,
            output: build.output_dir,
            query_limit: build.query_limit,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    pub minify: bool,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self { minify: true }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    pub google_tracking_id: Option<String>,
}

impl ConfigFile {
    /// Load configuration from `path` if it exists.
    ///
    /// Returns an error if the file exists but is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No {} found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Resolve into builder settings.
    pub fn into_build_config(self) -> BuildConfig {
        let analytics_id = self
            .analytics
            .google_tracking_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());

        BuildConfig {
            content_dir: self.content.dir,
            output_dir: self.content.output,
            minify: self.build.minify,
            query_limit: self.content.query_limit,
            site: self.site,
            manifest: self.manifest,
            analytics_id,
            live_reload: None,
        }
    }
}
