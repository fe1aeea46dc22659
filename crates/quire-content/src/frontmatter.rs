//! Front matter extraction and parsing.

use serde::Deserialize;

use crate::date::PublishDate;

/// Parsed front matter of a post.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Frontmatter {
    /// Post title
    #[serde(default)]
    pub title: String,

    /// Publication date
    #[serde(default)]
    pub date: Option<PublishDate>,

    /// Summary for SEO; the excerpt is used when absent
    #[serde(default)]
    pub description: Option<String>,

    /// Cover image used for Open Graph cards, relative to the post
    #[serde(default, rename = "ogImage", alias = "og_image")]
    pub og_image: Option<String>,

    /// Tags in author order
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Frontmatter {
    /// Drop blank and repeated tags, keeping the first occurrence.
    pub(crate) fn normalize_tags(&mut self) {
        let mut seen: Vec<String> = Vec::with_capacity(self.tags.len());
        for tag in self.tags.drain(..) {
            let tag = tag.trim().to_string();
            if !tag.is_empty() && !seen.contains(&tag) {
                seen.push(tag);
            }
        }
        self.tags = seen;
    }
}

/// Extract front matter from a Markdown source.
///
/// Returns the parsed front matter and the remaining content after the block.
pub fn extract_frontmatter(source: &str) -> Result<(Option<Frontmatter>, &str), FrontmatterError> {
    let trimmed = source.trim_start();

    if !trimmed.starts_with("---") {
        return Ok((None, source));
    }

    let after_open = &trimmed[3..];
    let Some(close_pos) = after_open.find("\n---") else {
        return Err(FrontmatterError::Unclosed);
    };

    let yaml_content = after_open[..close_pos].trim();
    let remaining = &after_open[close_pos + 4..];

    if yaml_content.is_empty() {
        return Ok((Some(Frontmatter::default()), remaining.trim_start()));
    }

    let mut frontmatter: Frontmatter = serde_yaml::from_str(yaml_content)
        .map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?;
    frontmatter.normalize_tags();

    Ok((Some(frontmatter), remaining.trim_start()))
}

/// Errors that can occur when parsing front matter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Unclosed front matter block - missing closing ---")]
    Unclosed,

    #[error("Invalid YAML in front matter: {0}")]
    InvalidYaml(String),
}
