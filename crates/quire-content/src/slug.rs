//! Slug derivation for content documents.
//!
//! Every post is published under `/blog/<relative-path>/`, where the
//! relative path is the document's location inside the content root with
//! its extension removed. A trailing `index` file name collapses into its
//! directory, so `hello-world/index.md` and `hello-world.md` both resolve
//! to `/blog/hello-world/`.

use std::fmt;
use std::path::{Component, Path};

use serde::Serialize;

use crate::document::ContentDocument;

/// URL prefix under which every post is published.
pub const BLOG_PREFIX: &str = "/blog";

/// Canonical URL path of a post, always with leading and trailing `/`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// The slug as a URL path.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The slug without its surrounding slashes, usable as a relative
    /// output directory (`blog/hello-world`).
    pub fn trimmed(&self) -> &str {
        self.0.trim_matches('/')
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors raised while resolving a document to a slug.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("Cannot derive a slug from an empty path")]
    EmptyPath,

    #[error("Path must be relative to the content root: {0}")]
    NotRelative(String),

    #[error("Path escapes the content root: {0}")]
    ParentTraversal(String),

    #[error("Path is not valid UTF-8: {0}")]
    InvalidEncoding(String),

    #[error("Slug already assigned to {0}")]
    AlreadyAssigned(String),
}

/// Derive the slug for a document at `relative_path` inside the content root.
pub fn derive_slug(relative_path: &Path) -> Result<Slug, SlugError> {
    let display = relative_path.display().to_string();
    let mut segments: Vec<&str> = Vec::new();

    for component in relative_path.components() {
        match component {
            Component::Normal(part) => {
                let part = part
                    .to_str()
                    .ok_or_else(|| SlugError::InvalidEncoding(display.clone()))?;
                segments.push(part);
            }
            Component::CurDir => {}
            Component::ParentDir => return Err(SlugError::ParentTraversal(display)),
            Component::RootDir | Component::Prefix(_) => {
                return Err(SlugError::NotRelative(display))
            }
        }
    }

    let Some(file_name) = segments.pop() else {
        return Err(SlugError::EmptyPath);
    };

    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);

    if stem != "index" {
        segments.push(stem);
    }

    let mut slug = String::from(BLOG_PREFIX);
    slug.push('/');
    for segment in segments {
        slug.push_str(segment);
        slug.push('/');
    }

    Ok(Slug(slug))
}

/// Derive the slug of `document` from its relative path and attach it.
pub fn assign_slug(document: &mut ContentDocument) -> Result<&Slug, SlugError> {
    let slug = derive_slug(&document.relative_path)?;
    document.attach_slug(slug)
}

/// URL directory of the files living next to a document.
///
/// `2020/post.md` and `2020/index.md` both give `/blog/2020/`; a file at
/// the content root gives `/blog/`. Co-located assets are published here.
pub fn asset_base(relative_path: &Path) -> String {
    let mut base = String::from(BLOG_PREFIX);
    base.push('/');

    if let Some(parent) = relative_path.parent() {
        for component in parent.components() {
            if let Component::Normal(part) = component {
                base.push_str(&part.to_string_lossy());
                base.push('/');
            }
        }
    }

    base
}

/// Resolve a link written inside a document against its asset base.
///
/// Root-relative paths, fragments and URLs with a scheme are returned
/// unchanged. `./` and `../` segments are applied to the base.
pub fn resolve_asset_url(base: &str, url: &str) -> String {
    if url.is_empty() || url.starts_with('/') || url.starts_with('#') || has_scheme(url) {
        return url.to_string();
    }

    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for part in url.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    format!("/{}", segments.join("/"))
}

fn has_scheme(url: &str) -> bool {
    url.split_once(':').is_some_and(|(scheme, _)| {
        !scheme.is_empty()
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}
