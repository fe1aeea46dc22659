//! Content discovery.
//!
//! Walks the content root, parses every Markdown file and attaches its slug.
//! Any failure aborts ingestion so a build never continues with a partial
//! set of posts.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::document::ContentDocument;
use crate::markdown::ParseError;
use crate::slug::{assign_slug, SlugError};

/// File extensions treated as Markdown posts.
const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Errors raised while ingesting content. All of them are fatal to a build.
#[derive(Debug, thiserror::Error)]
pub enum ContentIngestionError {
    #[error("Content directory not found: {0}")]
    MissingRoot(PathBuf),

    #[error("Failed to walk content directory: {0}")]
    Walk(String),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Failed to derive slug for {path}: {source}")]
    Slug {
        path: PathBuf,
        #[source]
        source: SlugError,
    },
}

/// A non-Markdown file living next to the posts (images, attachments).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentAsset {
    pub source_path: PathBuf,
    pub relative_path: PathBuf,
}

/// Markdown content rooted at a directory.
#[derive(Debug, Clone)]
pub struct ContentSource {
    root: PathBuf,
}

impl ContentSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load every Markdown document under the root, in file-name order,
    /// with slugs attached.
    pub fn load(&self) -> Result<Vec<ContentDocument>, ContentIngestionError> {
        let mut documents = Vec::new();

        for path in self.files()? {
            if !is_markdown(&path) {
                continue;
            }

            let source = fs::read_to_string(&path).map_err(|source| {
                ContentIngestionError::Read {
                    path: path.clone(),
                    source,
                }
            })?;

            let relative_path = self.relative(&path);
            let mut document = ContentDocument::parse(path.clone(), relative_path, &source)
                .map_err(|source| ContentIngestionError::Parse {
                    path: path.clone(),
                    source,
                })?;

            let slug = assign_slug(&mut document).map_err(|source| ContentIngestionError::Slug {
                path: path.clone(),
                source,
            })?;

            tracing::debug!("Loaded {} as {}", path.display(), slug);
            documents.push(document);
        }

        tracing::info!(
            "Loaded {} posts from {}",
            documents.len(),
            self.root.display()
        );

        Ok(documents)
    }

    /// List non-Markdown files under the root.
    pub fn assets(&self) -> Result<Vec<ContentAsset>, ContentIngestionError> {
        Ok(self
            .files()?
            .into_iter()
            .filter(|path| !is_markdown(path))
            .map(|path| ContentAsset {
                relative_path: self.relative(&path),
                source_path: path,
            })
            .collect())
    }

    fn files(&self) -> Result<Vec<PathBuf>, ContentIngestionError> {
        if !self.root.is_dir() {
            return Err(ContentIngestionError::MissingRoot(self.root.clone()));
        }

        let mut files = Vec::new();

        // Hidden directories such as `.drafts` are pruned with everything
        // below them; the root itself is always walked.
        let walker = WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.path()));

        for entry in walker {
            let entry = entry.map_err(|e| ContentIngestionError::Walk(e.to_string()))?;
            let path = entry.path();

            if !entry.file_type().is_file() {
                continue;
            }

            files.push(path.to_path_buf());
        }

        Ok(files)
    }

    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root).unwrap_or(path).to_path_buf()
    }
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| MARKDOWN_EXTENSIONS.contains(&ext))
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}
