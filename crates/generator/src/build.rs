//! Static export of the public site.

use crate::accessor::ContentAccessor;
use crate::articles::load_articles;
use crate::template::{render_article_index, render_article_page, render_landing_page, render_not_found};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;
use villa_site_gallery::GalleryListing;
use walkdir::WalkDir;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub pages: usize,
    pub articles: usize,
    pub assets: usize,
}

/// Render every public page into `output` and copy the public tree beside it.
///
/// The gallery listing is passed in so the caller decides where it comes
/// from. It is also written to `api/gallery.json` for client-side use.
pub fn build_static_site(
    accessor: &ContentAccessor,
    gallery: &GalleryListing,
    output: &Path,
) -> Result<BuildSummary> {
    let root = accessor.root();
    let layout = accessor.layout();
    let global = accessor.get_global_data();
    let page = accessor.get_page_data();
    let articles = load_articles(&root.join(layout.articles_dir()));

    let mut summary = BuildSummary::default();
    fs::create_dir_all(output).context("Failed to create output directory")?;

    let landing = render_landing_page(global.as_ref(), page.as_ref(), gallery, &articles);
    write_page(output, "index.html", &landing, &mut summary)?;
    write_page(output, "404.html", &render_not_found(global.as_ref()), &mut summary)?;
    write_page(
        output,
        "articles/index.html",
        &render_article_index(global.as_ref(), &articles),
        &mut summary,
    )?;
    for article in &articles {
        let html = render_article_page(global.as_ref(), article);
        write_page(output, &format!("articles/{}/index.html", article.slug), &html, &mut summary)?;
        summary.articles += 1;
    }

    let gallery_json = serde_json::to_string_pretty(gallery)?;
    let api_dir = output.join("api");
    fs::create_dir_all(&api_dir).context("Failed to create api directory")?;
    fs::write(api_dir.join("gallery.json"), gallery_json).context("Failed to write gallery.json")?;

    let public = root.join(&layout.public_root);
    if public.is_dir() {
        summary.assets = copy_tree(&public, output)?;
    }

    Ok(summary)
}

fn write_page(output: &Path, rel: &str, html: &str, summary: &mut BuildSummary) -> Result<()> {
    let path = output.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&path, html).with_context(|| format!("Failed to write {}", path.display()))?;
    debug!(page = rel, "Rendered page");
    summary.pages += 1;
    Ok(())
}

/// Copy every non-hidden file under `src` into `dst`, keeping relative paths
fn copy_tree(src: &Path, dst: &Path) -> Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(src)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path().strip_prefix(src)?;
        let target = dst.join(rel);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &target)
            .with_context(|| format!("Failed to copy {}", entry.path().display()))?;
        copied += 1;
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use villa_site_core::ContentLayout;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_build_site() {
        let site = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write(
            site.path(),
            "content/global.json",
            r#"{"seo": {"siteName": "Villa Azul"}, "header": {"brandName": "Azul"}}"#,
        );
        write(
            site.path(),
            "content/articles/beaches.md",
            "+++\ntitle = \"Beaches\"\ndate = \"2024-05-02\"\n+++\nSand.",
        );
        write(site.path(), "public/images/gallery/pool.jpg", "jpeg");
        write(site.path(), "public/.hidden", "x");

        let accessor = ContentAccessor::new(site.path(), ContentLayout::default());
        let summary = build_static_site(&accessor, &GalleryListing::default(), out.path()).unwrap();

        assert_eq!(summary.pages, 4);
        assert_eq!(summary.articles, 1);
        assert_eq!(summary.assets, 1);
        let index = fs::read_to_string(out.path().join("index.html")).unwrap();
        assert!(index.contains("Villa Azul"));
        assert!(out.path().join("articles/beaches/index.html").exists());
        assert!(out.path().join("images/gallery/pool.jpg").exists());
        assert!(out.path().join("api/gallery.json").exists());
        assert!(!out.path().join(".hidden").exists());
    }

    #[test]
    fn test_build_empty_site() {
        let site = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let accessor = ContentAccessor::new(site.path(), ContentLayout::default());
        let summary = build_static_site(&accessor, &GalleryListing::default(), out.path()).unwrap();
        assert_eq!(summary.pages, 3);
        assert_eq!(summary.assets, 0);
    }
}
