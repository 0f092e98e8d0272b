// Content validation: documents, image references and image files

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use villa_site_core::{ContentLayout, DocumentKind, GlobalContent, PageContent};
use villa_site_gallery::{GalleryMeta, is_image_file};
use walkdir::WalkDir;

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn info(&mut self, msg: impl Into<String>) {
        self.info.push(msg.into());
    }
}

/// Validate the site rooted at `root`.
///
/// Only a missing site directory is an `Err`; everything found inside it is
/// reported in the returned report.
pub fn validate_site(root: &Path, layout: &ContentLayout) -> Result<ValidationReport> {
    if !root.is_dir() {
        anyhow::bail!("Site directory does not exist: {}", root.display());
    }

    let mut report = ValidationReport::default();
    let mut references = BTreeSet::new();

    if let Some(value) = load_document(root, layout, DocumentKind::Global, &mut report) {
        collect_image_refs(&value, &mut references);
        match serde_json::from_value::<GlobalContent>(value) {
            Ok(global) => check_global(&global, &mut report),
            Err(e) => report.error(format!("global: does not match the settings schema: {}", e)),
        }
    }

    if let Some(value) = load_document(root, layout, DocumentKind::Page, &mut report) {
        collect_image_refs(&value, &mut references);
        match serde_json::from_value::<PageContent>(value) {
            Ok(page) => check_page(&page, &mut report),
            Err(e) => report.error(format!("page: does not match the page schema: {}", e)),
        }
    }

    check_references(root, layout, &references, &mut report);
    check_image_files(root, layout, &mut report);
    check_gallery_meta(root, layout, &mut report)?;

    Ok(report)
}

fn load_document(
    root: &Path,
    layout: &ContentLayout,
    kind: DocumentKind,
    report: &mut ValidationReport,
) -> Option<Value> {
    let path = root.join(layout.document_path(kind));
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(_) => {
            report.warn(format!(
                "{}: {} not found, the site renders built-in defaults",
                kind,
                layout.document_path(kind)
            ));
            return None;
        }
    };
    match serde_json::from_str::<Value>(&text) {
        Ok(value) => {
            report.info(format!("{}: {} parsed", kind, layout.document_path(kind)));
            Some(value)
        }
        Err(e) => {
            report.error(format!(
                "{}: {} is not valid JSON: {}",
                kind,
                layout.document_path(kind),
                e
            ));
            None
        }
    }
}

fn check_global(global: &GlobalContent, report: &mut ValidationReport) {
    if global.seo.site_name.trim().is_empty() {
        report.error("global: seo.siteName is required");
    }
    if global.header.brand_name.trim().is_empty() {
        report.error("global: header.brandName is required");
    }
    match &global.header.nav_links {
        Some(links) if links.is_empty() => report.warn("global: header.navLinks is empty"),
        Some(links) => {
            for (i, link) in links.iter().enumerate() {
                if link.href.trim().is_empty() || link.label.trim().is_empty() {
                    report.warn(format!("global: header.navLinks[{}] is incomplete", i));
                }
            }
        }
        None => {}
    }
}

fn check_page(page: &PageContent, report: &mut ValidationReport) {
    let mut empty = Vec::new();

    if let Some(marquee) = &page.marquee
        && marquee.items.is_empty()
    {
        empty.push("marquee.items");
    }
    if let Some(intro) = &page.villa_intro {
        if intro.stats.is_empty() {
            empty.push("villaIntro.stats");
        }
        if intro.body_paragraphs.is_empty() {
            empty.push("villaIntro.bodyParagraphs");
        }
    }
    if let Some(amenities) = &page.amenities {
        if amenities.items.is_empty() {
            empty.push("amenities.items");
        }
        for (i, item) in amenities.items.iter().enumerate() {
            if item.image.trim().is_empty() {
                report.warn(format!("page: amenities.items[{}] has no image", i));
            }
        }
    }
    if let Some(concierge) = &page.concierge
        && concierge.services.is_empty()
    {
        empty.push("concierge.services");
    }
    if let Some(map) = &page.map
        && map.distances.is_empty()
    {
        empty.push("map.distances");
    }

    for field in empty {
        report.warn(format!("page: {} is empty", field));
    }

    let sections = [
        page.hero.is_some(),
        page.marquee.is_some(),
        page.villa_intro.is_some(),
        page.amenities.is_some(),
        page.concierge.is_some(),
        page.gallery.is_some(),
        page.map.is_some(),
        page.contact.is_some(),
    ];
    let present = sections.iter().filter(|s| **s).count();
    report.info(format!("page: {} of {} sections filled", present, sections.len()));
}

/// Gather every string that looks like a local image URL
fn collect_image_refs(value: &Value, out: &mut BTreeSet<String>) {
    match value {
        Value::String(s) if s.starts_with('/') && !s.starts_with("//") && is_image_file(s) => {
            out.insert(s.clone());
        }
        Value::Array(items) => items.iter().for_each(|v| collect_image_refs(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_image_refs(v, out)),
        _ => {}
    }
}

fn check_references(
    root: &Path,
    layout: &ContentLayout,
    references: &BTreeSet<String>,
    report: &mut ValidationReport,
) {
    let mut broken = 0;
    for reference in references {
        let relative = reference.trim_start_matches('/');
        if relative.split('/').any(|part| part == "..") {
            report.error(format!("Image reference escapes the public root: {}", reference));
            broken += 1;
            continue;
        }
        let file = root.join(layout.public_path(relative));
        if !file.is_file() {
            report.error(format!("Broken image reference: {}", reference));
            broken += 1;
        }
    }
    report.info(format!(
        "{} image references checked, {} broken",
        references.len(),
        broken
    ));
}

fn check_image_files(root: &Path, layout: &ContentLayout, report: &mut ValidationReport) {
    let images_root = root.join(&layout.public_root);
    if !images_root.is_dir() {
        report.warn(format!("{} directory not found", layout.public_root));
        return;
    }

    let mut checked = 0;
    for entry in WalkDir::new(&images_root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') || !is_image_file(&name) {
            continue;
        }
        checked += 1;
        // SVG is text; only raster formats are decoded
        if name.to_lowercase().ends_with(".svg") {
            continue;
        }
        if let Err(e) = image::image_dimensions(entry.path()) {
            let shown = entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .display()
                .to_string();
            report.error(format!("Unreadable image {}: {}", shown, e));
        }
    }
    report.info(format!("{} image files checked", checked));
}

fn check_gallery_meta(
    root: &Path,
    layout: &ContentLayout,
    report: &mut ValidationReport,
) -> Result<()> {
    let meta_path = root.join(layout.gallery_meta_path());
    if !meta_path.exists() {
        return Ok(());
    }
    let text = fs::read_to_string(&meta_path)
        .with_context(|| format!("Failed to read {}", meta_path.display()))?;
    let value: Value = match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(e) => {
            report.error(format!("{} is not valid JSON: {}", layout.gallery_meta_path(), e));
            return Ok(());
        }
    };
    if !value.is_object() {
        report.error(format!("{} must be a JSON object", layout.gallery_meta_path()));
        return Ok(());
    }

    let meta = GalleryMeta::from_value(&value);
    let gallery_dir = root.join(layout.public_path(&layout.gallery_folder));
    if let Some(map) = value.as_object() {
        for name in map.keys() {
            if meta.get(name).is_none() {
                report.warn(format!("gallery metadata for {} has an unexpected shape", name));
            } else if !gallery_dir.join(name).is_file() {
                report.warn(format!("gallery metadata for {} matches no gallery image", name));
            }
        }
    }
    report.info(format!("{} gallery metadata entries", meta.len()));
    Ok(())
}
