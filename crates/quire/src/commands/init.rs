//! Scaffold a new blog.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command in `root`.
pub async fn run(root: &Path, config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing quire blog...");

    let config_path = root.join(config_path);
    if config_path.exists() && !yes {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
        return Ok(());
    }

    fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    tracing::info!("Created {}", config_path.display());

    let post_dir = root.join("content/blog/hello-world");
    fs::create_dir_all(&post_dir).context("Failed to create content directory")?;

    let post_path = post_dir.join("index.md");
    if !post_path.exists() || yes {
        fs::write(&post_path, DEFAULT_POST).context("Failed to write hello-world post")?;
        tracing::info!("Created content/blog/hello-world/index.md");
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'quire dev' to start the development server.");

    Ok(())
}

const DEFAULT_CONFIG: &str = r##"# quire configuration

[site]
title = "My Blog"
author = "Your Name"
description = "Thoughts, notes and longer write-ups."
long_description = "A few words about who you are and what you write about."
bio = "Writing about software."
site_url = "http://localhost:8000"
footer = ""

[site.social]
# github = "https://github.com/you"
# email = "you@example.com"

[content]
# Markdown posts, one file or one folder with index.md per post
dir = "content/blog"

# Output directory for the built site
output = "public"

# Maximum number of posts read per build
query_limit = 2000

[build]
# Minify CSS
minify = true

[analytics]
# google_tracking_id = "UA-XXXXXXX-X"

[manifest]
name = "My Blog"
short_name = "Blog"
start_url = "/"
background_color = "#000000"
theme_color = "#fa8072"
display = "minimal-ui"
"##;

const DEFAULT_POST: &str = r#"---
title: Hello World
date: 2020-01-01
description: The first post on this blog.
tags:
  - Meta
---

Welcome to your new blog. Edit this file in `content/blog/hello-world/index.md`,
or add another folder next to it to start a new post.

Tags in the front matter get their own page under `/tags/`.
"#;
