//! RSS feed generation.

use quire_content::ContentDocument;
use rss::validation::{Validate, ValidationError};
use rss::{ChannelBuilder, GuidBuilder, ItemBuilder};

use crate::site::SiteMetadata;

/// Render the RSS feed for `posts`, which are expected newest first.
pub fn build_feed(site: &SiteMetadata, posts: &[&ContentDocument]) -> Result<String, ValidationError> {
    let items: Vec<_> = posts
        .iter()
        .filter_map(|doc| {
            let link = site.absolute_url(doc.slug()?.as_str());
            Some(
                ItemBuilder::default()
                    .title(doc.title().to_string())
                    .link(link.clone())
                    .guid(GuidBuilder::default().permalink(true).value(link).build())
                    .description(doc.summary().to_string())
                    .pub_date(doc.date().map(|d| d.to_rfc2822()))
                    .content(doc.html.clone())
                    .build(),
            )
        })
        .collect();

    let channel = ChannelBuilder::default()
        .title(site.title.clone())
        .link(site.absolute_url("/"))
        .description(site.description.clone())
        .language(site.language.clone())
        .generator("quire".to_string())
        .items(items)
        .build();

    channel.validate()?;

    Ok(channel.to_string())
}
