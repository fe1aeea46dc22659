//! Page planning.
//!
//! A plan is a flat list of [`PageInstruction`]s, each naming the output
//! path, the template that renders it, and the data the template needs.
//! The planner holds no state, so planning an unchanged index twice yields
//! equal plans.

use quire_content::{ContentDocument, Slug};
use serde::Serialize;

use crate::index::{ContentIndex, QueryError};

/// Template used to render a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Template {
    BlogPost,
    Tags,
    Home,
}

impl Template {
    /// Name of the template in the template engine.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::BlogPost => "post.html",
            Self::Tags => "tags.html",
            Self::Home => "home.html",
        }
    }
}

/// Link to a neighbouring post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostLink {
    pub slug: Slug,
    pub title: String,
}

impl PostLink {
    fn from_document(doc: &ContentDocument) -> Result<Self, QueryError> {
        Ok(Self {
            slug: slug_of(doc)?.clone(),
            title: doc.title().to_string(),
        })
    }
}

/// Page for a single post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostPage {
    pub path: String,
    pub slug: Slug,
    /// Chronologically older neighbour
    pub previous: Option<PostLink>,
    /// Chronologically newer neighbour
    pub next: Option<PostLink>,
}

/// Listing page for one tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagPage {
    pub path: String,
    pub slug: String,
    /// Tag as displayed
    pub tag: String,
    /// Raw spellings whose posts belong on this page
    pub variants: Vec<String>,
}

/// The site's front page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomePage {
    pub path: String,
}

/// Directive to render one output page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageInstruction {
    Post(PostPage),
    Tag(TagPage),
    Home(HomePage),
}

impl PageInstruction {
    /// URL path of the page.
    pub fn path(&self) -> &str {
        match self {
            Self::Post(page) => &page.path,
            Self::Tag(page) => &page.path,
            Self::Home(page) => &page.path,
        }
    }

    pub fn template(&self) -> Template {
        match self {
            Self::Post(_) => Template::BlogPost,
            Self::Tag(_) => Template::Tags,
            Self::Home(_) => Template::Home,
        }
    }
}

/// Every page of one build, posts first, then tags, then home.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PagePlan {
    pub pages: Vec<PageInstruction>,
}

impl PagePlan {
    pub fn posts(&self) -> impl Iterator<Item = &PostPage> {
        self.pages.iter().filter_map(|p| match p {
            PageInstruction::Post(post) => Some(post),
            _ => None,
        })
    }

    pub fn tags(&self) -> impl Iterator<Item = &TagPage> {
        self.pages.iter().filter_map(|p| match p {
            PageInstruction::Tag(tag) => Some(tag),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

fn slug_of(doc: &ContentDocument) -> Result<&Slug, QueryError> {
    doc.slug()
        .ok_or_else(|| QueryError::MissingSlug(doc.source_path.clone()))
}

/// Plan every page of the site.
pub fn plan_pages(index: &ContentIndex) -> Result<PagePlan, QueryError> {
    let posts = index.posts_by_date();
    let tags = index.tag_groups();
    let mut pages = Vec::with_capacity(posts.len() + tags.len() + 1);

    for (i, doc) in posts.iter().enumerate() {
        let slug = slug_of(doc)?.clone();

        let previous = posts
            .get(i + 1)
            .map(|older| PostLink::from_document(older))
            .transpose()?;
        let next = match i.checked_sub(1) {
            Some(newer) => Some(PostLink::from_document(posts[newer])?),
            None => None,
        };

        pages.push(PageInstruction::Post(PostPage {
            path: slug.to_string(),
            slug,
            previous,
            next,
        }));
    }

    for group in tags {
        pages.push(PageInstruction::Tag(TagPage {
            path: group.path,
            slug: group.slug,
            tag: group.value,
            variants: group.variants,
        }));
    }

    pages.push(PageInstruction::Home(HomePage {
        path: "/".to_string(),
    }));

    tracing::debug!(
        "Planned {} pages ({} posts)",
        pages.len(),
        posts.len()
    );

    Ok(PagePlan { pages })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::tests::post;
    use crate::index::DEFAULT_QUERY_LIMIT;
    use crate::tags::kebab_case;
    use pretty_assertions::assert_eq;

    fn index(docs: Vec<ContentDocument>) -> ContentIndex {
        ContentIndex::new(docs, DEFAULT_QUERY_LIMIT).unwrap()
    }

    fn link_title(link: &Option<PostLink>) -> Option<&str> {
        link.as_ref().map(|l| l.title.as_str())
    }

    #[test]
    fn links_chronological_neighbours() {
        let idx = index(vec![
            post("A.md", Some("2020-01-01"), &[]),
            post("C.md", Some("2020-01-03"), &[]),
            post("B.md", Some("2020-01-02"), &[]),
        ]);

        let plan = plan_pages(&idx).unwrap();
        let posts: Vec<&PostPage> = plan.posts().collect();

        assert_eq!(posts.len(), 3);

        assert_eq!(posts[0].path, "/blog/C/");
        assert_eq!(link_title(&posts[0].previous), Some("B"));
        assert_eq!(link_title(&posts[0].next), None);

        assert_eq!(posts[1].path, "/blog/B/");
        assert_eq!(link_title(&posts[1].previous), Some("A"));
        assert_eq!(link_title(&posts[1].next), Some("C"));

        assert_eq!(posts[2].path, "/blog/A/");
        assert_eq!(link_title(&posts[2].previous), None);
        assert_eq!(link_title(&posts[2].next), Some("B"));
    }

    #[test]
    fn single_post_has_no_neighbours() {
        let plan = plan_pages(&index(vec![post("only.md", None, &[])])).unwrap();
        let only = plan.posts().next().unwrap();

        assert!(only.previous.is_none());
        assert!(only.next.is_none());
    }

    #[test]
    fn one_post_page_per_document() {
        let docs: Vec<ContentDocument> = (1..=12)
            .map(|d| {
                let date = format!("2020-02-{d:02}");
                post(&format!("p{d}.md"), Some(date.as_str()), &[])
            })
            .collect();
        let idx = index(docs);

        let plan = plan_pages(&idx).unwrap();
        let posts: Vec<&PostPage> = plan.posts().collect();

        assert_eq!(posts.len(), idx.len());
        for (i, page) in posts.iter().enumerate() {
            let expected_prev = posts.get(i + 1).map(|p| p.slug.clone());
            let expected_next = i.checked_sub(1).map(|j| posts[j].slug.clone());
            assert_eq!(page.previous.as_ref().map(|l| l.slug.clone()), expected_prev);
            assert_eq!(page.next.as_ref().map(|l| l.slug.clone()), expected_next);
        }
    }

    #[test]
    fn one_tag_page_per_distinct_tag() {
        let idx = index(vec![
            post("first.md", Some("2020-01-02"), &["Go", "Systems"]),
            post("second.md", Some("2020-01-01"), &["Go"]),
        ]);

        let plan = plan_pages(&idx).unwrap();
        let tags: Vec<&TagPage> = plan.tags().collect();

        let slugs: Vec<&str> = tags.iter().map(|t| t.slug.as_str()).collect();
        assert_eq!(slugs, vec!["go", "systems"]);

        let go = tags[0];
        assert_eq!(go.path, "/tags/go/");
        let go_posts: Vec<&str> = idx.tagged(&go.variants).iter().map(|d| d.title()).collect();
        assert_eq!(go_posts, vec!["first", "second"]);

        let systems = tags[1];
        let systems_posts: Vec<&str> = idx
            .tagged(&systems.variants)
            .iter()
            .map(|d| d.title())
            .collect();
        assert_eq!(systems_posts, vec!["first"]);

        for page in &tags {
            assert_eq!(page.slug, kebab_case(&page.tag));
        }
    }

    #[test]
    fn normalises_tag_paths() {
        let idx = index(vec![post("oss.md", None, &["Open Source"])]);

        let plan = plan_pages(&idx).unwrap();
        let tag = plan.tags().next().unwrap();

        assert_eq!(tag.slug, "open-source");
        assert_eq!(tag.path, "/tags/open-source/");
        assert_eq!(tag.tag, "Open Source");
    }

    #[test]
    fn planning_is_deterministic() {
        let docs = || {
            vec![
                post("x.md", Some("2020-03-01"), &["Rust", "Web"]),
                post("y.md", Some("2020-03-01"), &["Rust"]),
                post("z.md", None, &["Go"]),
            ]
        };

        let first = plan_pages(&index(docs())).unwrap();
        let second = plan_pages(&index(docs())).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn empty_index_plans_only_home() {
        let plan = plan_pages(&index(vec![])).unwrap();

        assert_eq!(plan.len(), 1);
        assert_eq!(plan.pages[0].template(), Template::Home);
        assert_eq!(plan.pages[0].path(), "/");
    }
}
