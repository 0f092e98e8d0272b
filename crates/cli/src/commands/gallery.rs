use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use villa_site_core::load_settings;
use villa_site_gallery::{GalleryMeta, build_listing};
use villa_site_store::{AdminAuth, ContentService, LocalFilesystemBackend};

/// Print each gallery image with its category and title
pub async fn run(path: PathBuf, folder: Option<String>) -> Result<()> {
    let settings = load_settings(&path).context("Failed to load site settings")?;
    let service = ContentService::new(
        Arc::new(LocalFilesystemBackend::new(&settings.root)),
        AdminAuth::default(),
        settings.content.clone(),
    );

    let records = service
        .list_images(folder.as_deref())
        .await
        .context("Failed to list gallery folder")?;
    let meta = GalleryMeta::from_value(&service.get_gallery_meta().await);
    let listing = build_listing(&records, &meta);

    if listing.items.is_empty() {
        println!("No images found");
        return Ok(());
    }

    for item in &listing.items {
        println!("{:<10} {:<28} {}", item.category.id(), item.title, item.src);
    }
    println!();
    let categories: Vec<_> = listing.categories.iter().map(|c| c.label.as_str()).collect();
    println!("{} images; filters: {}", listing.items.len(), categories.join(", "));
    if !meta.is_empty() {
        println!("{} metadata overrides loaded", meta.len());
    }

    Ok(())
}
