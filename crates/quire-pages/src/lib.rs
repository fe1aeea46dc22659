//! Page planning for quire blogs.
//!
//! Takes the ingested posts, orders them by publication date, and decides
//! which pages the site consists of: one page per post linked to its
//! chronological neighbours, one page per distinct tag, and the home page.

pub mod index;
pub mod planner;
pub mod tags;

pub use index::{ContentIndex, QueryError, TagGroup, DEFAULT_QUERY_LIMIT};
pub use planner::{
    plan_pages, HomePage, PageInstruction, PagePlan, PostLink, PostPage, TagPage, Template,
};
pub use tags::{kebab_case, tag_path};
