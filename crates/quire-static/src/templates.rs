//! Template engine for rendering blog pages.

use minijinja::{context, Environment};
use quire_pages::{PostLink, TagGroup, Template};
use serde::Serialize;

use crate::site::{SiteMetadata, Social};

/// SEO and social-card metadata for the page `<head>`.
#[derive(Debug, Clone, Serialize)]
pub struct Seo {
    /// Full `<title>` text
    pub document_title: String,
    /// Title for social cards
    pub title: String,
    pub description: String,
    /// Canonical absolute URL
    pub url: String,
    /// Absolute Open Graph image URL
    pub image: Option<String>,
    /// Open Graph type, `article` or `website`
    pub kind: &'static str,
    /// RFC 3339 publication time for articles
    pub published: Option<String>,
}

/// A post as it appears in listings.
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub title: String,
    pub path: String,
    pub date: Option<String>,
    pub time_to_read: usize,
    pub summary: String,
}

/// Data for the blog post template.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub title: String,
    pub date: Option<String>,
    pub time_to_read: usize,
    pub html: String,
    /// Every tag group of the site, shown below the post
    pub tags: Vec<TagGroup>,
    pub previous: Option<PostLink>,
    pub next: Option<PostLink>,
}

/// Data for the tag listing template.
#[derive(Debug, Clone, Serialize)]
pub struct TagView {
    pub tag: String,
    pub header: String,
    pub total_count: usize,
    pub posts: Vec<PostSummary>,
}

/// Data for the home page template.
#[derive(Debug, Clone, Serialize)]
pub struct HomeView {
    pub posts: Vec<PostSummary>,
}

/// A social profile link.
#[derive(Debug, Clone, Serialize)]
pub struct SocialLink {
    pub name: &'static str,
    pub url: String,
}

/// Collect configured social links in display order.
pub fn social_links(social: &Social) -> Vec<SocialLink> {
    let entries = [
        ("GitHub", &social.github),
        ("LinkedIn", &social.linkedin),
        ("Stack Overflow", &social.stackoverflow),
        ("Twitter", &social.twitter),
        ("Instagram", &social.instagram),
        ("Facebook", &social.facebook),
        ("Email", &social.email),
    ];

    entries
        .into_iter()
        .filter_map(|(name, url)| {
            let url = url.as_deref()?.trim();
            if url.is_empty() {
                return None;
            }
            let url = if name == "Email" && !url.starts_with("mailto:") {
                format!("mailto:{}", url)
            } else {
                url.to_string()
            };
            Some(SocialLink { name, url })
        })
        .collect()
}

/// Header line of a tag page, e.g. `2 posts tagged with "Go"`.
pub fn tag_header(total_count: usize, tag: &str) -> String {
    format!(
        "{} post{} tagged with \"{}\"",
        total_count,
        if total_count == 1 { "" } else { "s" },
        tag
    )
}

/// Layout data shared by every page of a build.
#[derive(Debug, Clone)]
pub struct Layout<'a> {
    pub site: &'a SiteMetadata,
    pub tags: &'a [TagGroup],
    pub social: &'a [SocialLink],
    pub analytics_id: Option<&'a str>,
    pub theme_color: &'a str,
    /// Extra script injected before `</body>`, used by the dev server
    pub live_reload: Option<&'a str>,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with the built-in templates.
    pub fn new() -> Self {
        let mut env = Environment::new();

        let templates = [
            ("base.html", BASE_TEMPLATE),
            ("sidebar.html", SIDEBAR_TEMPLATE),
            ("bio.html", BIO_TEMPLATE),
            ("post.html", POST_TEMPLATE),
            ("tags.html", TAGS_TEMPLATE),
            ("home.html", HOME_TEMPLATE),
        ];

        for (name, source) in templates {
            env.add_template_owned(name.to_string(), source.to_string())
                .expect("built-in templates are valid");
        }

        Self { env }
    }

    /// Render a page with its template.
    pub fn render<T: Serialize>(
        &self,
        template: Template,
        layout: &Layout<'_>,
        seo: &Seo,
        page: &T,
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(template.file_name())?;

        tmpl.render(context! {
            site => layout.site,
            sidebar_tags => layout.tags,
            social => layout.social,
            analytics_id => layout.analytics_id,
            theme_color => layout.theme_color,
            live_reload => layout.live_reload,
            seo => seo,
            page => page,
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="{{ site.language }}">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ seo.document_title }}</title>
  <meta name="description" content="{{ seo.description }}">
  <link rel="canonical" href="{{ seo.url }}">
  <meta property="og:title" content="{{ seo.title }}">
  <meta property="og:description" content="{{ seo.description }}">
  <meta property="og:type" content="{{ seo.kind }}">
  <meta property="og:url" content="{{ seo.url }}">
  {% if seo.image %}<meta property="og:image" content="{{ seo.image }}">
  {% endif %}{% if seo.published %}<meta property="article:published_time" content="{{ seo.published }}">
  {% endif %}<meta name="twitter:card" content="{% if seo.image %}summary_large_image{% else %}summary{% endif %}">
  <meta name="twitter:creator" content="{{ site.author }}">
  <meta name="twitter:title" content="{{ seo.title }}">
  <meta name="twitter:description" content="{{ seo.description }}">
  <meta name="theme-color" content="{{ theme_color }}">
  <link rel="manifest" href="/manifest.webmanifest">
  <link rel="alternate" type="application/rss+xml" title="{{ site.title }}" href="/rss.xml">
  <link rel="stylesheet" href="/assets/main.css">
  <script>document.documentElement.dataset.theme = localStorage.getItem('theme') || 'light';</script>
  {% if analytics_id %}<script async src="https://www.googletagmanager.com/gtag/js?id={{ analytics_id }}"></script>
  <script>
    window.dataLayer = window.dataLayer || [];
    function gtag() { dataLayer.push(arguments); }
    gtag('js', new Date());
    gtag('config', {{ analytics_id|tojson }});
  </script>
  {% endif %}
</head>
<body>
  <div class="layout">
    <aside class="sidebar">
      {% include "sidebar.html" %}
    </aside>
    <main class="main">
      <header class="site-header">
        <a href="/" class="site-title">{{ site.title }}</a>
        <button class="theme-toggle" type="button" aria-label="Toggle theme">&#9680;</button>
      </header>
      {% block content %}{% endblock %}
    </main>
  </div>
  {% if site.footer %}<footer class="footer">{{ site.footer }}</footer>
  {% endif %}<script src="/assets/main.js"></script>
  {% if live_reload %}<script src="{{ live_reload }}"></script>
  {% endif %}
</body>
</html>"##;

const SIDEBAR_TEMPLATE: &str = r##"<div class="sidebar-author">
  <a href="/" class="author-name">{{ site.author }}</a>
  {% if site.bio %}<p class="bio">{{ site.bio }}</p>{% endif %}
</div>
{% if social %}
<ul class="social">
{% for link in social %}
  <li><a href="{{ link.url }}" rel="noopener noreferrer">{{ link.name }}</a></li>
{% endfor %}
</ul>
{% endif %}
{% if sidebar_tags %}
<nav class="tag-cloud">
  <h3>Tags</h3>
  <ul>
  {% for tag in sidebar_tags %}
    <li><a class="tag-button" href="{{ tag.path }}" aria-label="{{ tag.value }} ({{ tag.total_count }})">{{ tag.value }} <span class="count">{{ tag.total_count }}</span></a></li>
  {% endfor %}
  </ul>
</nav>
{% endif %}"##;

const BIO_TEMPLATE: &str = r##"<div class="bio-block">
  {% if site.long_description %}<p>{{ site.long_description }}</p>{% endif %}
  {% if social %}
  <p>If you'd like to chat, drop me a line:</p>
  <p class="bio-links">
  {% for link in social %}<a href="{{ link.url }}">{{ link.name }}</a>{% if not loop.last %} &middot; {% endif %}{% endfor %}
  </p>
  {% endif %}
</div>"##;

const POST_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<article class="post">
  <p class="post-info">{% if page.date %}{{ page.date }} &middot; {% endif %}{{ page.time_to_read }} min read</p>
  <h1 class="post-title">{{ page.title }}</h1>
  <div class="post-body">
    {{ page.html | safe }}
  </div>

  {% if page.tags %}
  <div class="post-tags">
  {% for tag in page.tags %}
    <a class="tag-button" href="{{ tag.path }}" aria-label="{{ tag.value }} ({{ tag.total_count }})">{{ tag.value }} <span class="count">{{ tag.total_count }}</span></a>
  {% endfor %}
  </div>
  {% endif %}

  <hr>

  {% include "bio.html" %}

  <ul class="post-nav">
    <li>{% if page.previous %}<h4><a href="{{ page.previous.slug }}" rel="prev">&larr; {{ page.previous.title }}</a></h4>{% endif %}</li>
    <li>{% if page.next %}<h4><a href="{{ page.next.slug }}" rel="next">{{ page.next.title }} &rarr;</a></h4>{% endif %}</li>
  </ul>
</article>
{% endblock %}"##;

const TAGS_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<section class="tag-page">
  <h1>{{ page.header }}</h1>
  <ul class="tag-posts">
  {% for post in page.posts %}
    <li><a href="{{ post.path }}">{{ post.title }}</a>{% if post.date %} <small>{{ post.date }}</small>{% endif %}</li>
  {% endfor %}
  </ul>
</section>
{% endblock %}"##;

const HOME_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<section class="post-list">
{% for post in page.posts %}
  <article class="post-preview">
    <h2><a href="{{ post.path }}">{{ post.title }}</a></h2>
    <p class="post-info">{% if post.date %}{{ post.date }} &middot; {% endif %}{{ post.time_to_read }} min read</p>
    <p>{{ post.summary }}</p>
  </article>
{% else %}
  <p>No posts yet.</p>
{% endfor %}
</section>
{% endblock %}"##;

#[cfg(test)]
mod tests {
    use super::*;

    fn seo(title: &str) -> Seo {
        Seo {
            document_title: format!("{} | Blog", title),
            title: title.to_string(),
            description: "About things".to_string(),
            url: "https://example.com/".to_string(),
            image: None,
            kind: "website",
            published: None,
        }
    }

    fn render<T: Serialize>(template: Template, page: &T, tags: &[TagGroup]) -> String {
        let site = SiteMetadata {
            title: "Blog".to_string(),
            author: "Jane".to_string(),
            footer: "All rights reserved.".to_string(),
            ..Default::default()
        };
        let layout = Layout {
            site: &site,
            tags,
            social: &[],
            analytics_id: Some("UA-1234-1"),
            theme_color: "#fa8072",
            live_reload: None,
        };
        TemplateEngine::new()
            .render(template, &layout, &seo("Hello"), page)
            .unwrap()
    }

    #[test]
    fn renders_post_with_neighbours() {
        let page = PostView {
            title: "Hello".to_string(),
            date: Some("January 03, 2020".to_string()),
            time_to_read: 3,
            html: "<p>Body text</p>".to_string(),
            tags: vec![TagGroup {
                value: "Open Source".to_string(),
                slug: "open-source".to_string(),
                path: "/tags/open-source/".to_string(),
                variants: vec!["Open Source".to_string()],
                total_count: 7,
            }],
            previous: None,
            next: None,
        };

        let html = render(Template::BlogPost, &page, &[]);

        assert!(html.contains("<title>Hello | Blog</title>"));
        assert!(html.contains("<p>Body text</p>"));
        assert!(html.contains("January 03, 2020 &middot; 3 min read"));
        assert!(html.contains("open-source"));
        assert!(html.contains("Open Source <span class=\"count\">7</span>"));
        assert!(!html.contains("rel=\"prev\""));
        assert!(!html.contains("rel=\"next\""));
        assert!(html.contains("All rights reserved."));
        assert!(html.contains("gtag('config', \"UA-1234-1\")"));
    }

    #[test]
    fn renders_tag_page() {
        let page = TagView {
            tag: "Go".to_string(),
            header: tag_header(2, "Go"),
            total_count: 2,
            posts: vec![
                PostSummary {
                    title: "Newer".to_string(),
                    path: "/blog/newer/".to_string(),
                    date: None,
                    time_to_read: 1,
                    summary: String::new(),
                },
                PostSummary {
                    title: "Older".to_string(),
                    path: "/blog/older/".to_string(),
                    date: None,
                    time_to_read: 1,
                    summary: String::new(),
                },
            ],
        };

        let html = render(Template::Tags, &page, &[]);

        assert!(html.contains("2 posts tagged with &quot;Go&quot;"));
        let newer = html.find("Newer").unwrap();
        let older = html.find("Older").unwrap();
        assert!(newer < older);
    }

    #[test]
    fn renders_sidebar_tag_counts() {
        let tags = vec![TagGroup {
            value: "Rust".to_string(),
            slug: "rust".to_string(),
            path: "/tags/rust/".to_string(),
            variants: vec!["Rust".to_string()],
            total_count: 4,
        }];

        let html = render(Template::Home, &HomeView { posts: vec![] }, &tags);

        assert!(html.contains("class=\"tag-button\""));
        assert!(html.contains("<span class=\"count\">4</span>"));
        assert!(html.contains("No posts yet."));
    }

    #[test]
    fn builds_tag_headers() {
        assert_eq!(tag_header(1, "Go"), "1 post tagged with \"Go\"");
        assert_eq!(tag_header(3, "Go"), "3 posts tagged with \"Go\"");
    }

    #[test]
    fn collects_social_links() {
        let social = Social {
            github: Some("https://github.com/jane".to_string()),
            email: Some("jane@example.com".to_string()),
            twitter: Some("  ".to_string()),
            ..Default::default()
        };

        let links = social_links(&social);

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].name, "GitHub");
        assert_eq!(links[1].url, "mailto:jane@example.com");
    }
}
