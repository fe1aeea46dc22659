//! Markdown document parser.

use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd};

use crate::frontmatter::{extract_frontmatter, Frontmatter, FrontmatterError};
use crate::slug::resolve_asset_url;

/// Maximum excerpt length in characters.
pub const EXCERPT_LENGTH: usize = 160;

/// Average reading speed used for time-to-read estimates.
pub const WORDS_PER_MINUTE: usize = 265;

/// A parsed Markdown document.
#[derive(Debug, Clone)]
pub struct ParsedDoc {
    /// Parsed front matter (if present)
    pub frontmatter: Option<Frontmatter>,

    /// Markdown content (without front matter)
    pub content: String,

    /// Rendered HTML body
    pub html: String,

    /// Plain-text excerpt
    pub excerpt: String,

    /// Number of words in the body
    pub word_count: usize,
}

/// Errors that can occur when parsing Markdown.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Front matter error: {0}")]
    Frontmatter(#[from] FrontmatterError),
}

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_SMART_PUNCTUATION
}

/// Parse a Markdown document.
///
/// Extracts front matter, renders the body to HTML, and computes the
/// excerpt and word count.
pub fn parse_markdown(source: &str) -> Result<ParsedDoc, ParseError> {
    parse_markdown_at(source, None)
}

/// Parse a Markdown document published under `asset_base`.
///
/// Relative image sources are rewritten against the base so they point at
/// the copied files whatever the page URL is.
pub fn parse_markdown_at(source: &str, asset_base: Option<&str>) -> Result<ParsedDoc, ParseError> {
    let (frontmatter, content) = extract_frontmatter(source)?;

    let events = Parser::new_ext(content, options()).map(|event| match (event, asset_base) {
        (
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }),
            Some(base),
        ) => Event::Start(Tag::Image {
            link_type,
            dest_url: resolve_asset_url(base, &dest_url).into(),
            title,
            id,
        }),
        (event, _) => event,
    });

    let mut html_output = String::new();
    html::push_html(&mut html_output, events);

    let (prose, all_text) = collect_text(content);
    let word_count = all_text.split_whitespace().count();

    Ok(ParsedDoc {
        frontmatter,
        content: content.to_string(),
        html: html_output,
        excerpt: prune(&prose, EXCERPT_LENGTH),
        word_count,
    })
}

/// Collect the plain text of a document.
///
/// Returns `(prose, all_text)` where prose leaves out code blocks.
fn collect_text(content: &str) -> (String, String) {
    let mut prose = String::new();
    let mut all_text = String::new();
    let mut in_code_block = false;

    for event in Parser::new_ext(content, options()) {
        match event {
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                all_text.push(' ');
            }
            Event::Text(text) | Event::Code(text) => {
                all_text.push_str(&text);
                if !in_code_block {
                    prose.push_str(&text);
                }
            }
            Event::SoftBreak
            | Event::HardBreak
            | Event::End(TagEnd::Paragraph)
            | Event::End(TagEnd::Heading(_))
            | Event::End(TagEnd::Item)
            | Event::End(TagEnd::TableCell) => {
                prose.push(' ');
                all_text.push(' ');
            }
            _ => {}
        }
    }

    (collapse_whitespace(&prose), all_text)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut text to at most `limit` characters on a word boundary, adding `…`.
pub fn prune(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let cut: String = text.chars().take(limit).collect();
    let at_boundary = text.chars().nth(limit).is_some_and(char::is_whitespace);

    let kept = if at_boundary {
        cut.as_str()
    } else {
        match cut.rfind(char::is_whitespace) {
            Some(pos) => &cut[..pos],
            None => cut.as_str(),
        }
    };

    let kept = kept.trim_end_matches(|c: char| c.is_whitespace() || c.is_ascii_punctuation());
    format!("{}…", kept)
}

/// Estimated reading time in whole minutes, never less than one.
pub fn reading_time(word_count: usize) -> usize {
    let minutes = (word_count as f64 / WORDS_PER_MINUTE as f64).round() as usize;
    minutes.max(1)
}
