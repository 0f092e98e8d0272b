//! Markdown articles under `content/articles`.
//!
//! Each file starts with a TOML header between `+++` lines:
//!
//! ```text
//! +++
//! title = "Five beaches near the villa"
//! date = "2024-05-02"
//! summary = "Our favourite spots within a short drive."
//! +++
//! Body in markdown...
//! ```

use anyhow::{Context, Result};
use chrono::NaiveDate;
use pulldown_cmark::{Options, Parser, html};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct ArticleHeader {
    title: String,
    date: NaiveDate,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    cover: Option<String>,
    #[serde(default)]
    draft: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    /// File stem; also the URL segment under `/articles/`
    pub slug: String,
    pub title: String,
    pub date: NaiveDate,
    pub summary: Option<String>,
    pub cover: Option<String>,
    pub draft: bool,
    /// Rendered body
    pub html: String,
}

/// Split a document into its TOML header and markdown body
fn split_header(text: &str) -> Option<(&str, &str)> {
    let trimmed = text.trim_start();
    let rest = trimmed.strip_prefix("+++")?;
    let end = rest.find("\n+++")?;
    let header = rest[..end].trim();
    let body = rest[end + 4..].trim_start_matches(['\r', '\n']);
    Some((header, body))
}

pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

pub fn parse_article(slug: &str, text: &str) -> Result<Article> {
    let (header, body) =
        split_header(text).with_context(|| format!("{}: missing +++ header block", slug))?;
    let header: ArticleHeader =
        toml::from_str(header).with_context(|| format!("{}: invalid article header", slug))?;

    if header.title.trim().is_empty() {
        anyhow::bail!("{}: article title is empty", slug);
    }

    Ok(Article {
        slug: slug.to_string(),
        title: header.title,
        date: header.date,
        summary: header.summary.filter(|s| !s.trim().is_empty()),
        cover: header.cover.filter(|s| !s.trim().is_empty()),
        draft: header.draft,
        html: render_markdown(body),
    })
}

/// Load every published article, newest first.
///
/// A missing directory means no articles. Files that fail to parse are
/// logged and skipped so one bad article never takes the site down.
pub fn load_articles(dir: &Path) -> Vec<Article> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut articles: Vec<Article> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "md"))
        .filter_map(|path| {
            let slug = path.file_stem()?.to_str()?.to_string();
            let text = match fs::read_to_string(&path) {
                Ok(text) => text,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to read article");
                    return None;
                }
            };
            match parse_article(&slug, &text) {
                Ok(article) => Some(article),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping article");
                    None
                }
            }
        })
        .filter(|article| !article.draft)
        .collect();

    articles.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));
    articles
}

/// Whether a slug is safe to use as a path segment
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
