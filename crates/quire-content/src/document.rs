//! In-memory representation of one Markdown post.

use std::path::PathBuf;

use crate::date::PublishDate;
use crate::frontmatter::Frontmatter;
use crate::markdown::{parse_markdown_at, reading_time, ParseError};
use crate::slug::{asset_base, Slug, SlugError};

/// One parsed Markdown source file.
///
/// Everything except the slug is fixed at parse time. The slug is attached
/// exactly once during ingestion, see [`crate::slug::assign_slug`].
#[derive(Debug, Clone)]
pub struct ContentDocument {
    /// Path the file was read from
    pub source_path: PathBuf,

    /// Path relative to the content root
    pub relative_path: PathBuf,

    /// Parsed front matter
    pub frontmatter: Frontmatter,

    /// Raw Markdown body
    pub body: String,

    /// Rendered HTML body
    pub html: String,

    /// Plain-text excerpt
    pub excerpt: String,

    /// Words in the body
    pub word_count: usize,

    slug: Option<Slug>,
}

impl ContentDocument {
    /// Parse a document from its Markdown source.
    pub fn parse(
        source_path: PathBuf,
        relative_path: PathBuf,
        source: &str,
    ) -> Result<Self, ParseError> {
        let parsed = parse_markdown_at(source, Some(&asset_base(&relative_path)))?;
        let mut frontmatter = parsed.frontmatter.unwrap_or_default();

        if frontmatter.title.trim().is_empty() {
            frontmatter.title = fallback_title(&relative_path);
        }

        Ok(Self {
            source_path,
            relative_path,
            frontmatter,
            body: parsed.content,
            html: parsed.html,
            excerpt: parsed.excerpt,
            word_count: parsed.word_count,
            slug: None,
        })
    }

    /// Attach the derived slug. A document's slug never changes once set.
    pub fn attach_slug(&mut self, slug: Slug) -> Result<&Slug, SlugError> {
        if let Some(existing) = &self.slug {
            return Err(SlugError::AlreadyAssigned(existing.to_string()));
        }
        let slug = self.slug.insert(slug);
        Ok(&*slug)
    }

    pub fn slug(&self) -> Option<&Slug> {
        self.slug.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.frontmatter.title
    }

    pub fn date(&self) -> Option<PublishDate> {
        self.frontmatter.date
    }

    pub fn tags(&self) -> &[String] {
        &self.frontmatter.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.frontmatter.tags.iter().any(|t| t == tag)
    }

    /// Description for SEO and listings, falling back to the excerpt.
    pub fn summary(&self) -> &str {
        self.frontmatter
            .description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(&self.excerpt)
    }

    /// Estimated minutes to read.
    pub fn time_to_read(&self) -> usize {
        reading_time(self.word_count)
    }
}

/// Title used when front matter has none: the file stem, or the parent
/// directory name for `index` files.
fn fallback_title(relative_path: &std::path::Path) -> String {
    let stem = relative_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Untitled");

    if stem == "index" {
        relative_path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|s| s.to_str())
            .unwrap_or("Untitled")
            .to_string()
    } else {
        stem.to_string()
    }
}
