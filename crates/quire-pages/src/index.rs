//! In-memory query layer over the ingested posts.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use quire_content::{ContentDocument, Slug};
use serde::Serialize;

use crate::tags::{kebab_case, tag_path};

/// Upper bound on the number of posts a query returns.
///
/// Posts beyond the cap are left out of every listing and get no page.
pub const DEFAULT_QUERY_LIMIT: usize = 2000;

/// Errors raised by content queries. All of them abort the build.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Document has no slug: {0}")]
    MissingSlug(PathBuf),

    #[error("Slug {slug} is produced by both {first} and {second}")]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// A distinct tag and the posts carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagGroup {
    /// Tag as written in front matter
    pub value: String,

    /// Kebab-case URL segment
    pub slug: String,

    /// Listing page path
    pub path: String,

    /// Every raw spelling that normalises to `slug`
    pub variants: Vec<String>,

    /// Number of posts carrying any variant
    pub total_count: usize,
}

/// The full set of posts for one build.
#[derive(Debug)]
pub struct ContentIndex {
    documents: Vec<ContentDocument>,
    by_slug: HashMap<Slug, usize>,
    limit: usize,
}

impl ContentIndex {
    /// Index `documents`, which must all carry unique slugs.
    pub fn new(documents: Vec<ContentDocument>, limit: usize) -> Result<Self, QueryError> {
        let mut by_slug: HashMap<Slug, usize> = HashMap::with_capacity(documents.len());

        for (i, doc) in documents.iter().enumerate() {
            let slug = doc
                .slug()
                .ok_or_else(|| QueryError::MissingSlug(doc.source_path.clone()))?;

            if let Some(&first) = by_slug.get(slug) {
                return Err(QueryError::DuplicateSlug {
                    slug: slug.to_string(),
                    first: documents[first].source_path.clone(),
                    second: doc.source_path.clone(),
                });
            }
            by_slug.insert(slug.clone(), i);
        }

        Ok(Self {
            documents,
            by_slug,
            limit,
        })
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Look a post up by its slug.
    pub fn by_slug(&self, slug: &Slug) -> Option<&ContentDocument> {
        self.by_slug.get(slug).map(|&i| &self.documents[i])
    }

    /// Posts sorted newest first, capped at the query limit.
    ///
    /// The sort is stable: posts sharing a date keep discovery order, and
    /// undated posts come after every dated one.
    pub fn posts_by_date(&self) -> Vec<&ContentDocument> {
        let mut posts: Vec<&ContentDocument> = self.documents.iter().collect();
        posts.sort_by(|a, b| b.date().cmp(&a.date()));

        if posts.len() > self.limit {
            tracing::debug!(
                "Query limit {} reached, leaving out {} posts",
                self.limit,
                posts.len() - self.limit
            );
            posts.truncate(self.limit);
        }

        posts
    }

    /// Distinct tags across the queried posts, ordered by slug.
    ///
    /// Spellings that normalise to the same slug ("Go", "go") are merged
    /// into a single group.
    pub fn tag_groups(&self) -> Vec<TagGroup> {
        let mut groups: BTreeMap<String, TagGroup> = BTreeMap::new();

        for doc in self.posts_by_date() {
            let mut counted: Vec<String> = Vec::new();

            for tag in doc.tags() {
                let slug = kebab_case(tag);
                if slug.is_empty() {
                    tracing::warn!(
                        "Tag '{}' in {} has no URL-safe characters, skipping",
                        tag,
                        doc.source_path.display()
                    );
                    continue;
                }

                let group = groups.entry(slug.clone()).or_insert_with(|| TagGroup {
                    value: tag.clone(),
                    path: tag_path(&slug),
                    slug: slug.clone(),
                    variants: Vec::new(),
                    total_count: 0,
                });

                if !group.variants.contains(tag) {
                    if let Some(first) = group.variants.first() {
                        tracing::warn!(
                            "Tags '{}' and '{}' both normalise to '{}', merging their pages",
                            first,
                            tag,
                            slug
                        );
                    }
                    group.variants.push(tag.clone());
                }

                if !counted.contains(&slug) {
                    group.total_count += 1;
                    counted.push(slug);
                }
            }
        }

        groups.into_values().collect()
    }

    /// Posts carrying any of `variants`, newest first, capped.
    pub fn tagged(&self, variants: &[String]) -> Vec<&ContentDocument> {
        self.posts_by_date()
            .into_iter()
            .filter(|doc| variants.iter().any(|v| doc.has_tag(v)))
            .collect()
    }
}
