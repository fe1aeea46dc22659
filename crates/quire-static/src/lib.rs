//! Static site builder for quire blogs.
//!
//! Loads posts, plans pages, and renders every page instruction to HTML
//! together with the feed, sitemap, manifest and theme assets.

pub mod assets;
pub mod builder;
pub mod feed;
pub mod site;
pub mod templates;

pub use builder::{BuildConfig, BuildError, BuildResult, StaticBuilder};
pub use site::{ManifestConfig, SiteMetadata, Social};
