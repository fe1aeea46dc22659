//! Markdown content source for quire blogs.
//!
//! This crate reads Markdown posts, splits off their YAML front matter,
//! renders the body, and derives the canonical `/blog/.../` slug of every
//! document before any page planning happens.

pub mod date;
pub mod document;
pub mod frontmatter;
pub mod markdown;
pub mod slug;
pub mod source;

pub use date::{DateError, PublishDate};
pub use document::ContentDocument;
pub use frontmatter::{Frontmatter, FrontmatterError};
pub use markdown::{parse_markdown, parse_markdown_at, ParseError, ParsedDoc};
pub use slug::{asset_base, assign_slug, derive_slug, resolve_asset_url, Slug, SlugError};
pub use source::{ContentAsset, ContentIngestionError, ContentSource};
