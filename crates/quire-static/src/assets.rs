//! Theme stylesheet and runtime script.

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Generate the main CSS file with `accent` as the link and tag colour.
    pub fn generate_css(accent: &str) -> String {
        format!(":root {{\n  --accent: {};\n}}\n\n{}", accent, THEME_CSS)
    }

    /// Generate the main JavaScript file.
    pub fn generate_js() -> String {
        THEME_JS.to_string()
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }
}

// Light theme by default, dark theme when <html data-theme="dark">
const THEME_CSS: &str = r#"/* quire blog theme */

:root {
  --sidebar-width: 300px;
  --content-max-width: 680px;
  --background: #ffffff;
  --foreground: rgba(0, 0, 0, 0.87);
  --secondary: rgba(0, 0, 0, 0.6);
  --muted: rgba(0, 0, 0, 0.4);
  --border: hsla(0, 0%, 0%, 0.1);
  --code-background: #f5f2f0;
}

[data-theme="dark"] {
  --background: #121212;
  --foreground: rgba(255, 255, 255, 0.87);
  --secondary: rgba(255, 255, 255, 0.6);
  --muted: rgba(255, 255, 255, 0.4);
  --border: hsla(0, 0%, 100%, 0.1);
  --code-background: #1e1e1e;
}

* {
  box-sizing: border-box;
}

body {
  margin: 0;
  font-family: Georgia, "Times New Roman", serif;
  font-size: 18px;
  line-height: 1.75;
  background: var(--background);
  color: var(--foreground);
  transition: background 0.2s, color 0.2s;
}

a {
  color: inherit;
  text-decoration: none;
  border-bottom: 1px dashed var(--accent);
}

a:hover,
a:focus {
  border-bottom-style: solid;
}

.layout {
  display: grid;
  grid-template-columns: var(--sidebar-width) 1fr;
  max-width: 1200px;
  margin: 0 auto;
  min-height: 100vh;
}

/* Sidebar */
.sidebar {
  margin: 24px 0;
  padding: 16px 48px;
  border-right: 1px solid var(--border);
  align-self: start;
}

.author-name {
  font-size: 1.5rem;
  font-weight: 700;
  border-bottom: none;
}

.bio {
  color: var(--secondary);
  font-size: 0.9rem;
}

.social,
.tag-cloud ul {
  list-style: none;
  padding: 0;
}

.social li {
  display: inline-block;
  margin-right: 0.75rem;
  font-size: 0.85rem;
}

.tag-cloud h3 {
  font-size: 0.8rem;
  text-transform: uppercase;
  letter-spacing: 0.05em;
  color: var(--muted);
}

.tag-cloud li {
  display: inline-block;
  margin: 0 0.5rem 0.5rem 0;
}

.tag-button {
  display: inline-block;
  padding: 0.1rem 0.75rem;
  font-size: 0.8rem;
  border: 1px solid var(--accent);
  border-radius: 999px;
}

.tag-button .count {
  color: var(--muted);
}

/* Main column */
.main {
  padding: 24px 32px;
  max-width: calc(var(--content-max-width) + 64px);
}

.site-header {
  display: flex;
  justify-content: space-between;
  align-items: center;
  margin-bottom: 2rem;
}

.site-title {
  font-size: 1.25rem;
  font-weight: 700;
  border-bottom: none;
}

.theme-toggle {
  background: none;
  border: 1px solid var(--border);
  border-radius: 999px;
  color: var(--foreground);
  font-size: 1rem;
  padding: 0.25rem 0.6rem;
  cursor: pointer;
}

.post-info {
  color: var(--secondary);
  font-size: 0.85rem;
  margin-bottom: 0;
}

.post-title {
  margin-top: 0.5rem;
}

.post-body img {
  max-width: 100%;
}

.post-body pre {
  position: relative;
  background: var(--code-background);
  padding: 1rem;
  border-radius: 6px;
  overflow-x: auto;
  font-size: 0.85rem;
}

.post-body code {
  font-family: "SFMono-Regular", Consolas, Menlo, monospace;
}

.post-tags {
  display: flex;
  flex-wrap: wrap;
  gap: 0.5rem;
  margin: 2rem 0 1rem;
}

hr {
  border: none;
  border-bottom: 1px solid var(--border);
  margin: 2rem 0;
}

.bio-block {
  color: var(--secondary);
  font-size: 0.95rem;
}

.post-nav {
  display: flex;
  flex-wrap: wrap;
  justify-content: space-between;
  list-style: none;
  padding: 0;
}

.post-preview h2 {
  margin-bottom: 0;
}

.footer {
  max-width: 1200px;
  margin: 0 auto;
  padding: 1rem 48px 2rem;
  font-size: 12px;
  color: var(--muted);
}

/* Copy button */
.copy-btn {
  position: absolute;
  top: 0.5rem;
  right: 0.5rem;
  padding: 0.2rem 0.6rem;
  font-size: 0.7rem;
  background: var(--background);
  color: var(--foreground);
  border: 1px solid var(--border);
  border-radius: 4px;
  cursor: pointer;
}

/* Responsive */
@media (max-width: 1024px) {
  .layout {
    grid-template-columns: 1fr;
  }

  .sidebar {
    border-right: none;
    border-bottom: 1px solid var(--border);
    margin: 24px 32px;
    padding: 16px 0;
  }
}
"#;

const THEME_JS: &str = r#"// quire - runtime JavaScript
(function() {
  'use strict';

  const root = document.documentElement;

  // Light/dark toggle, remembered across visits
  const toggle = document.querySelector('.theme-toggle');
  if (toggle) {
    toggle.addEventListener('click', () => {
      const next = root.dataset.theme === 'dark' ? 'light' : 'dark';
      root.dataset.theme = next;
      try {
        localStorage.setItem('theme', next);
      } catch (err) {
        // storage unavailable, keep the choice for this page only
      }
    });
  }

  // Copy code button for pre blocks
  document.querySelectorAll('.post-body pre').forEach(pre => {
    if (pre.querySelector('.copy-btn')) return;

    const btn = document.createElement('button');
    btn.className = 'copy-btn';
    btn.textContent = 'Copy';
    btn.setAttribute('type', 'button');

    btn.addEventListener('click', async () => {
      const code = pre.querySelector('code');
      const text = code ? code.textContent : pre.textContent;

      try {
        await navigator.clipboard.writeText(text || '');
        btn.textContent = 'Copied!';
      } catch (err) {
        btn.textContent = 'Error';
      }
      setTimeout(() => { btn.textContent = 'Copy'; }, 2000);
    });

    pre.appendChild(btn);
  });
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_css_with_accent() {
        let css = AssetPipeline::generate_css("#fa8072");
        assert!(css.contains("--accent: #fa8072;"));
        assert!(css.contains("[data-theme=\"dark\"]"));
    }

    #[test]
    fn generates_js() {
        let js = AssetPipeline::generate_js();
        assert!(js.contains("localStorage.setItem('theme'"));
        assert!(js.contains("clipboard"));
    }

    #[test]
    fn minifies_css() {
        let css = AssetPipeline::generate_css("salmon");

        let minified = AssetPipeline::minify_css(&css).unwrap();

        assert!(!minified.contains('\n'));
        assert!(minified.contains(".tag-button"));
    }
}
