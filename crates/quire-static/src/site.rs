//! Site-wide metadata shared by every page.

use serde::{Deserialize, Serialize};

/// Author and site information shown in layouts, feeds and SEO tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteMetadata {
    pub title: String,
    pub author: String,
    pub description: String,
    /// Longer author blurb for the bio block under posts
    pub long_description: String,
    /// One-line bio for the sidebar
    pub bio: String,
    /// Absolute site URL without trailing slash
    pub site_url: String,
    pub footer: String,
    pub language: String,
    /// Fallback Open Graph image, relative to the site root
    pub default_image: Option<String>,
    pub social: Social,
}

impl Default for SiteMetadata {
    fn default() -> Self {
        Self {
            title: "My Blog".to_string(),
            author: String::new(),
            description: String::new(),
            long_description: String::new(),
            bio: String::new(),
            site_url: "http://localhost:8000".to_string(),
            footer: String::new(),
            language: "en".to_string(),
            default_image: None,
            social: Social::default(),
        }
    }
}

impl SiteMetadata {
    /// Join a root-relative path onto the site URL.
    pub fn absolute_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.site_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Social profile links. Empty entries are not rendered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Social {
    pub github: Option<String>,
    pub instagram: Option<String>,
    pub stackoverflow: Option<String>,
    pub linkedin: Option<String>,
    pub email: Option<String>,
    pub twitter: Option<String>,
    pub facebook: Option<String>,
}

/// Web app manifest settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    pub name: String,
    pub short_name: String,
    pub start_url: String,
    pub background_color: String,
    pub theme_color: String,
    pub display: String,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            name: "My Blog".to_string(),
            short_name: "Blog".to_string(),
            start_url: "/".to_string(),
            background_color: "#000000".to_string(),
            theme_color: "#fa8072".to_string(),
            display: "minimal-ui".to_string(),
        }
    }
}

impl ManifestConfig {
    /// Render `manifest.webmanifest`.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&serde_json::json!({
            "name": self.name,
            "short_name": self.short_name,
            "start_url": self.start_url,
            "background_color": self.background_color,
            "theme_color": self.theme_color,
            "display": self.display,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_absolute_urls() {
        let site = SiteMetadata {
            site_url: "https://example.com/".to_string(),
            ..Default::default()
        };

        assert_eq!(site.absolute_url("/blog/a/"), "https://example.com/blog/a/");
        assert_eq!(site.absolute_url("rss.xml"), "https://example.com/rss.xml");
        assert_eq!(
            site.absolute_url("https://cdn.example.com/x.png"),
            "https://cdn.example.com/x.png"
        );
    }

    #[test]
    fn renders_manifest() {
        let json = ManifestConfig::default().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["theme_color"], "#fa8072");
        assert_eq!(value["display"], "minimal-ui");
    }
}
