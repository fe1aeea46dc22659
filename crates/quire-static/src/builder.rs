//! Static site builder.
//!
//! Drives one build: ingest content, plan pages, render every page
//! instruction, then write the feed, sitemap, manifest and theme assets.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;

use quire_content::slug::BLOG_PREFIX;
use quire_content::{
    asset_base, resolve_asset_url, ContentDocument, ContentIngestionError, ContentSource,
};
use quire_pages::{
    plan_pages, ContentIndex, PageInstruction, PagePlan, PostPage, QueryError, TagPage,
    Template, DEFAULT_QUERY_LIMIT,
};

use crate::assets::AssetPipeline;
use crate::feed::build_feed;
use crate::site::{ManifestConfig, SiteMetadata};
use crate::templates::{
    social_links, tag_header, HomeView, Layout, PostSummary, PostView, Seo, TagView,
    TemplateEngine,
};

/// Configuration for building a static site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Markdown content directory
    pub content_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Minify CSS output
    pub minify: bool,

    /// Maximum number of posts queried per build
    pub query_limit: usize,

    /// Site metadata
    pub site: SiteMetadata,

    /// Web manifest settings
    pub manifest: ManifestConfig,

    /// Google Analytics tracking ID
    pub analytics_id: Option<String>,

    /// Live reload script URL, set by the dev server
    pub live_reload: Option<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("content/blog"),
            output_dir: PathBuf::from("public"),
            minify: true,
            query_limit: DEFAULT_QUERY_LIMIT,
            site: SiteMetadata::default(),
            manifest: ManifestConfig::default(),
            analytics_id: None,
            live_reload: None,
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of pages generated
    pub pages: usize,

    /// Number of post pages
    pub posts: usize,

    /// Number of tag pages
    pub tags: usize,

    /// Number of content assets copied
    pub assets: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Content(#[from] ContentIngestionError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Planned page has no post: {0}")]
    MissingPost(String),

    #[error("Failed to render template: {0}")]
    TemplateError(String),

    #[error("Failed to generate feed: {0}")]
    FeedError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

/// Static site builder.
pub struct StaticBuilder {
    config: BuildConfig,
    templates: TemplateEngine,
}

impl StaticBuilder {
    /// Create a new static builder.
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            templates: TemplateEngine::new(),
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build the static site.
    ///
    /// The site is written to a staging directory next to the output
    /// directory and swapped in only once every file is written, so the
    /// output always holds exactly one complete build.
    pub async fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        // Ingest and plan before touching the file system
        let source = ContentSource::new(&self.config.content_dir);
        let documents = source.load()?;
        let index = ContentIndex::new(documents, self.config.query_limit)?;
        let plan = plan_pages(&index)?;

        let staging = self.staging_dir()?;
        if staging.exists() {
            remove_dir(&staging)?;
        }

        let assets = match self.write_site(&staging, &source, &index, &plan) {
            Ok(assets) => assets,
            Err(e) => {
                if let Err(cleanup) = fs::remove_dir_all(&staging) {
                    tracing::warn!("Failed to remove {}: {}", staging.display(), cleanup);
                }
                return Err(e);
            }
        };

        self.publish(&staging)?;

        let duration = start.elapsed();

        Ok(BuildResult {
            pages: plan.len(),
            posts: plan.posts().count(),
            tags: plan.tags().count(),
            assets,
            duration_ms: duration.as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    /// Sibling of the output directory the next build is written to.
    fn staging_dir(&self) -> Result<PathBuf, BuildError> {
        let output = &self.config.output_dir;
        let name = output.file_name().ok_or_else(|| {
            BuildError::WriteError(format!("Output directory needs a name: {}", output.display()))
        })?;

        Ok(output.with_file_name(format!(".{}.staging", name.to_string_lossy())))
    }

    /// Replace the output directory with the finished staging directory.
    fn publish(&self, staging: &Path) -> Result<(), BuildError> {
        let output = &self.config.output_dir;
        if output.exists() {
            remove_dir(output)?;
        }

        fs::rename(staging, output).map_err(|e| {
            BuildError::WriteError(format!(
                "{} -> {}: {}",
                staging.display(),
                output.display(),
                e
            ))
        })
    }

    /// Write every page and site file under `out`.
    fn write_site(
        &self,
        out: &Path,
        source: &ContentSource,
        index: &ContentIndex,
        plan: &PagePlan,
    ) -> Result<usize, BuildError> {
        fs::create_dir_all(out).map_err(|e| BuildError::WriteError(e.to_string()))?;

        let tags = index.tag_groups();
        let social = social_links(&self.config.site.social);
        let layout = Layout {
            site: &self.config.site,
            tags: &tags,
            social: &social,
            analytics_id: self.config.analytics_id.as_deref(),
            theme_color: &self.config.manifest.theme_color,
            live_reload: self.config.live_reload.as_deref(),
        };

        // Render pages in parallel
        let results: Vec<Result<(), BuildError>> = plan
            .pages
            .par_iter()
            .map(|page| self.build_page(out, page, index, &layout))
            .collect();

        for result in results {
            result?;
        }

        let assets = self.copy_content_assets(out, source)?;

        self.generate_assets(out)?;
        self.generate_feed(out, index)?;
        self.generate_sitemap(out, plan, index)?;
        self.generate_manifest(out)?;

        Ok(assets)
    }

    /// Render and write a single page.
    fn build_page(
        &self,
        out: &Path,
        page: &PageInstruction,
        index: &ContentIndex,
        layout: &Layout<'_>,
    ) -> Result<(), BuildError> {
        let html = match page {
            PageInstruction::Post(post) => self.render_post(post, index, layout)?,
            PageInstruction::Tag(tag) => self.render_tag(tag, index, layout)?,
            PageInstruction::Home(_) => self.render_home(index, layout)?,
        };

        write_file(&output_path(out, page.path()), html)?;

        tracing::debug!("Rendered {}", page.path());
        Ok(())
    }

    fn render_post(
        &self,
        page: &PostPage,
        index: &ContentIndex,
        layout: &Layout<'_>,
    ) -> Result<String, BuildError> {
        let doc = index
            .by_slug(&page.slug)
            .ok_or_else(|| BuildError::MissingPost(page.slug.to_string()))?;
        let site = &self.config.site;

        let view = PostView {
            title: doc.title().to_string(),
            date: doc.date().map(|d| d.display()),
            time_to_read: doc.time_to_read(),
            html: doc.html.clone(),
            tags: layout.tags.to_vec(),
            previous: page.previous.clone(),
            next: page.next.clone(),
        };

        let seo = Seo {
            document_title: format!("{} | {}", doc.title(), site.title),
            title: doc.title().to_string(),
            description: doc.summary().to_string(),
            url: site.absolute_url(&page.path),
            image: self.og_image(doc),
            kind: "article",
            published: doc.date().map(|d| d.to_rfc3339()),
        };

        self.templates
            .render(Template::BlogPost, layout, &seo, &view)
            .map_err(|e| BuildError::TemplateError(format!("{}: {}", page.path, e)))
    }

    fn render_tag(
        &self,
        page: &TagPage,
        index: &ContentIndex,
        layout: &Layout<'_>,
    ) -> Result<String, BuildError> {
        let site = &self.config.site;
        let posts: Vec<PostSummary> = index
            .tagged(&page.variants)
            .into_iter()
            .map(summarize)
            .collect();
        let header = tag_header(posts.len(), &page.tag);

        let seo = Seo {
            document_title: format!("{} | {}", header, site.title),
            title: header.clone(),
            description: header.clone(),
            url: site.absolute_url(&page.path),
            image: site.default_image.as_deref().map(|i| site.absolute_url(i)),
            kind: "website",
            published: None,
        };

        let view = TagView {
            tag: page.tag.clone(),
            header,
            total_count: posts.len(),
            posts,
        };

        self.templates
            .render(Template::Tags, layout, &seo, &view)
            .map_err(|e| BuildError::TemplateError(format!("{}: {}", page.path, e)))
    }

    fn render_home(&self, index: &ContentIndex, layout: &Layout<'_>) -> Result<String, BuildError> {
        let site = &self.config.site;
        let view = HomeView {
            posts: index.posts_by_date().into_iter().map(summarize).collect(),
        };

        let seo = Seo {
            document_title: site.title.clone(),
            title: site.title.clone(),
            description: site.description.clone(),
            url: site.absolute_url("/"),
            image: site.default_image.as_deref().map(|i| site.absolute_url(i)),
            kind: "website",
            published: None,
        };

        self.templates
            .render(Template::Home, layout, &seo, &view)
            .map_err(|e| BuildError::TemplateError(format!("/: {}", e)))
    }

    /// Absolute Open Graph image for a post.
    ///
    /// Relative paths resolve against the directory of the Markdown file,
    /// which is where its co-located files are copied.
    fn og_image(&self, doc: &ContentDocument) -> Option<String> {
        let site = &self.config.site;
        match doc.frontmatter.og_image.as_deref() {
            Some(image) => Some(site.absolute_url(&resolve_asset_url(
                &asset_base(&doc.relative_path),
                image,
            ))),
            None => site.default_image.as_deref().map(|i| site.absolute_url(i)),
        }
    }

    /// Copy images and other files living next to posts into the blog tree.
    fn copy_content_assets(&self, out: &Path, source: &ContentSource) -> Result<usize, BuildError> {
        let assets = source.assets()?;
        let blog_dir = out.join(BLOG_PREFIX.trim_start_matches('/'));

        for asset in &assets {
            let dest = blog_dir.join(&asset.relative_path);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
            }
            fs::copy(&asset.source_path, &dest).map_err(|e| {
                BuildError::WriteError(format!("{}: {}", asset.source_path.display(), e))
            })?;
        }

        if !assets.is_empty() {
            tracing::info!("Copied {} content assets", assets.len());
        }

        Ok(assets.len())
    }

    /// Generate theme assets.
    fn generate_assets(&self, out: &Path) -> Result<(), BuildError> {
        let assets_dir = out.join("assets");

        let css = AssetPipeline::generate_css(&self.config.manifest.theme_color);
        let css = if self.config.minify {
            AssetPipeline::minify_css(&css).unwrap_or_else(|e| {
                tracing::warn!("Skipping CSS minification: {}", e);
                css
            })
        } else {
            css
        };
        write_file(&assets_dir.join("main.css"), css)?;

        write_file(&assets_dir.join("main.js"), AssetPipeline::generate_js())?;

        Ok(())
    }

    /// Generate the RSS feed.
    fn generate_feed(&self, out: &Path, index: &ContentIndex) -> Result<(), BuildError> {
        let xml = build_feed(&self.config.site, &index.posts_by_date())
            .map_err(|e| BuildError::FeedError(e.to_string()))?;

        write_file(&out.join("rss.xml"), xml)
    }

    /// Generate sitemap and robots.txt.
    fn generate_sitemap(
        &self,
        out: &Path,
        plan: &PagePlan,
        index: &ContentIndex,
    ) -> Result<(), BuildError> {
        let site = &self.config.site;

        let urls: Vec<String> = plan
            .pages
            .iter()
            .map(|page| {
                let lastmod = match page {
                    PageInstruction::Post(post) => index
                        .by_slug(&post.slug)
                        .and_then(|doc| doc.date())
                        .map(|d| format!("\n    <lastmod>{}</lastmod>", d.to_rfc3339()))
                        .unwrap_or_default(),
                    _ => String::new(),
                };
                format!(
                    "  <url>\n    <loc>{}</loc>{}\n  </url>",
                    xml_escape(&site.absolute_url(page.path())),
                    lastmod
                )
            })
            .collect();

        let sitemap = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
{}
</urlset>"#,
            urls.join("\n")
        );

        write_file(&out.join("sitemap.xml"), sitemap)?;

        let robots = format!(
            "User-agent: *\nAllow: /\nSitemap: {}",
            site.absolute_url("sitemap.xml")
        );
        write_file(&out.join("robots.txt"), robots)
    }

    /// Generate the web app manifest.
    fn generate_manifest(&self, out: &Path) -> Result<(), BuildError> {
        let json = self
            .config
            .manifest
            .to_json()
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        write_file(&out.join("manifest.webmanifest"), json)
    }
}

/// Listing entry for a post.
fn summarize(doc: &ContentDocument) -> PostSummary {
    PostSummary {
        title: doc.title().to_string(),
        path: doc.slug().map(|s| s.to_string()).unwrap_or_default(),
        date: doc.date().map(|d| d.display()),
        time_to_read: doc.time_to_read(),
        summary: doc.summary().to_string(),
    }
}

/// Output file for a URL path: `/blog/a/` becomes `<out>/blog/a/index.html`.
fn output_path(out: &Path, url_path: &str) -> PathBuf {
    let relative = url_path.trim_matches('/');
    if relative.is_empty() {
        out.join("index.html")
    } else {
        out.join(relative).join("index.html")
    }
}

fn remove_dir(path: &Path) -> Result<(), BuildError> {
    fs::remove_dir_all(path)
        .map_err(|e| BuildError::WriteError(format!("{}: {}", path.display(), e)))
}

fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
    }
    fs::write(path, contents)
        .map_err(|e| BuildError::WriteError(format!("{}: {}", path.display(), e)))
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    fn write_post(content: &Path, relative: &str, source: &str) {
        let path = content.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, source).unwrap();
    }

    fn site_fixture() -> (TempDir, BuildConfig) {
        let temp = tempdir().unwrap();
        let content = temp.path().join("content");
        let out = temp.path().join("public");

        write_post(
            &content,
            "a.md",
            "---\ntitle: Post A\ndate: 2020-01-01\ntags: [Go]\n---\nOldest post.",
        );
        write_post(
            &content,
            "b/index.md",
            "---\ntitle: Post B\ndate: 2020-01-02\ntags: [\"Open Source\"]\nogImage: ./cover.png\n---\nMiddle post.",
        );
        fs::write(content.join("b/cover.png"), [1u8, 2, 3]).unwrap();
        write_post(
            &content,
            "c.md",
            "---\ntitle: Post C\ndate: 2020-01-03\ntags: [Go, Systems]\n---\nNewest post.",
        );

        let config = BuildConfig {
            content_dir: content,
            output_dir: out,
            site: SiteMetadata {
                title: "Test Blog".to_string(),
                site_url: "https://example.com".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };

        (temp, config)
    }

    #[tokio::test]
    async fn builds_posts_tags_and_home() {
        let (_temp, config) = site_fixture();
        let out = config.output_dir.clone();

        let result = StaticBuilder::new(config).build().await.unwrap();

        assert_eq!(result.posts, 3);
        assert_eq!(result.tags, 3);
        assert_eq!(result.pages, 7);
        assert_eq!(result.assets, 1);

        for page in [
            "blog/a/index.html",
            "blog/b/index.html",
            "blog/c/index.html",
            "tags/go/index.html",
            "tags/open-source/index.html",
            "tags/systems/index.html",
            "index.html",
            "blog/b/cover.png",
            "assets/main.css",
            "assets/main.js",
            "rss.xml",
            "sitemap.xml",
            "robots.txt",
            "manifest.webmanifest",
        ] {
            assert!(out.join(page).exists(), "missing {}", page);
        }
    }

    #[tokio::test]
    async fn links_neighbours_on_post_pages() {
        let (_temp, config) = site_fixture();
        let out = config.output_dir.clone();

        StaticBuilder::new(config).build().await.unwrap();

        let newest = fs::read_to_string(out.join("blog/c/index.html")).unwrap();
        assert!(newest.contains("&larr; Post B"));
        assert!(!newest.contains("rel=\"next\""));

        let middle = fs::read_to_string(out.join("blog/b/index.html")).unwrap();
        assert!(middle.contains("&larr; Post A"));
        assert!(middle.contains("Post C &rarr;"));
        assert!(middle.contains("cover.png"));

        let oldest = fs::read_to_string(out.join("blog/a/index.html")).unwrap();
        assert!(!oldest.contains("rel=\"prev\""));
        assert!(oldest.contains("Post B &rarr;"));
    }

    #[tokio::test]
    async fn tag_pages_list_matching_posts_newest_first() {
        let (_temp, config) = site_fixture();
        let out = config.output_dir.clone();

        StaticBuilder::new(config).build().await.unwrap();

        let go = fs::read_to_string(out.join("tags/go/index.html")).unwrap();
        assert!(go.contains("2 posts tagged with &quot;Go&quot;"));
        let section = &go[go.find("tag-posts").unwrap()..];
        assert!(section.find("Post C").unwrap() < section.find("Post A").unwrap());
        assert!(!section.contains("Post B"));

        let systems = fs::read_to_string(out.join("tags/systems/index.html")).unwrap();
        assert!(systems.contains("1 post tagged with &quot;Systems&quot;"));
    }

    #[tokio::test]
    async fn writes_feed_and_sitemap() {
        let (_temp, config) = site_fixture();
        let out = config.output_dir.clone();

        StaticBuilder::new(config).build().await.unwrap();

        let feed = fs::read_to_string(out.join("rss.xml")).unwrap();
        assert!(feed.find("Post C").unwrap() < feed.find("Post A").unwrap());

        let sitemap = fs::read_to_string(out.join("sitemap.xml")).unwrap();
        assert!(sitemap.contains("<loc>https://example.com/tags/open-source/</loc>"));
        assert!(sitemap.contains("<lastmod>2020-01-03T00:00:00+00:00</lastmod>"));
    }

    #[tokio::test]
    async fn invalid_content_aborts_before_writing() {
        let temp = tempdir().unwrap();
        let content = temp.path().join("content");
        let out = temp.path().join("public");
        write_post(&content, "broken.md", "---\ntitle: Broken\n");

        let builder = StaticBuilder::new(BuildConfig {
            content_dir: content,
            output_dir: out.clone(),
            ..Default::default()
        });

        let result = builder.build().await;

        assert!(matches!(result, Err(BuildError::Content(_))));
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn slug_collisions_abort() {
        let temp = tempdir().unwrap();
        let content = temp.path().join("content");
        write_post(&content, "same.md", "---\ntitle: One\n---\n");
        write_post(&content, "same/index.md", "---\ntitle: Two\n---\n");

        let builder = StaticBuilder::new(BuildConfig {
            content_dir: content,
            output_dir: temp.path().join("public"),
            ..Default::default()
        });

        assert!(matches!(
            builder.build().await,
            Err(BuildError::Query(QueryError::DuplicateSlug { .. }))
        ));
    }

    #[tokio::test]
    async fn post_pages_list_every_tag_with_counts() {
        let (_temp, config) = site_fixture();
        let out = config.output_dir.clone();

        StaticBuilder::new(config).build().await.unwrap();

        let oldest = fs::read_to_string(out.join("blog/a/index.html")).unwrap();
        let start = oldest.find("post-tags").unwrap();
        let end = start + oldest[start..].find("<hr>").unwrap();
        let tags = &oldest[start..end];

        assert!(tags.contains("Go <span class=\"count\">2</span>"));
        assert!(tags.contains("Open Source <span class=\"count\">1</span>"));
        assert!(tags.contains("Systems <span class=\"count\">1</span>"));
    }

    #[tokio::test]
    async fn renders_analytics_snippet() {
        let (_temp, mut config) = site_fixture();
        config.analytics_id = Some("UA-1234-1".to_string());
        let out = config.output_dir.clone();

        StaticBuilder::new(config).build().await.unwrap();

        let home = fs::read_to_string(out.join("index.html")).unwrap();
        assert!(home.contains("gtag('config', \"UA-1234-1\")"));
    }

    #[tokio::test]
    async fn rebuild_drops_removed_posts_and_tags() {
        let (_temp, config) = site_fixture();
        let out = config.output_dir.clone();
        let content = config.content_dir.clone();
        let builder = StaticBuilder::new(config);

        builder.build().await.unwrap();
        assert!(out.join("tags/systems/index.html").exists());

        fs::remove_file(content.join("c.md")).unwrap();
        let result = builder.build().await.unwrap();

        assert_eq!(result.posts, 2);
        assert!(!out.join("blog/c").exists());
        assert!(!out.join("tags/systems").exists());
        assert!(out.join("tags/go/index.html").exists());
        assert!(!out.with_file_name(".public.staging").exists());
    }

    #[tokio::test]
    async fn failed_rebuild_keeps_previous_output() {
        let (_temp, config) = site_fixture();
        let out = config.output_dir.clone();
        let content = config.content_dir.clone();
        let builder = StaticBuilder::new(config);

        builder.build().await.unwrap();
        write_post(&content, "broken.md", "---\ntitle: Broken\n");

        assert!(builder.build().await.is_err());
        assert!(out.join("blog/a/index.html").exists());
        assert!(!out.with_file_name(".public.staging").exists());
    }

    #[tokio::test]
    async fn flat_post_assets_resolve_against_source_directory() {
        let temp = tempdir().unwrap();
        let content = temp.path().join("content");
        let out = temp.path().join("public");
        write_post(
            &content,
            "2020/post.md",
            "---\ntitle: Flat\nogImage: ./cover.png\n---\n![Cover](./cover.png)",
        );
        fs::write(content.join("2020/cover.png"), [1u8, 2, 3]).unwrap();

        StaticBuilder::new(BuildConfig {
            content_dir: content,
            output_dir: out.clone(),
            site: SiteMetadata {
                site_url: "https://example.com".to_string(),
                ..Default::default()
            },
            ..Default::default()
        })
        .build()
        .await
        .unwrap();

        assert!(out.join("blog/2020/cover.png").exists());

        let page = fs::read_to_string(out.join("blog/2020/post/index.html")).unwrap();
        assert!(page.contains("src=\"/blog/2020/cover.png\""));
        let og = page.replace("&#x2f;", "/");
        assert!(og.contains("content=\"https://example.com/blog/2020/cover.png\""));
        assert!(!og.contains("2020/post/cover.png"));
    }
}
