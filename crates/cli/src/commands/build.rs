use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use villa_site_core::load_settings;
use villa_site_gallery::{GalleryListing, GalleryMeta, build_listing};
use villa_site_generator::{ContentAccessor, build_static_site};
use villa_site_store::{AdminAuth, ContentService, LocalFilesystemBackend};

/// Build static site for deployment
pub async fn run(path: PathBuf, output: PathBuf) -> Result<()> {
    println!("🔨 Building static site...");
    println!("   Source: {}", path.display());
    println!("   Output: {}", output.display());
    println!();

    if !path.is_dir() {
        anyhow::bail!("Site directory does not exist: {}", path.display());
    }

    let settings = load_settings(&path).context("Failed to load site settings")?;

    // The export always reads the local tree, whatever backend serve uses
    let service = ContentService::new(
        Arc::new(LocalFilesystemBackend::new(&settings.root)),
        AdminAuth::default(),
        settings.content.clone(),
    );
    let gallery = match service.list_images(None).await {
        Ok(records) => build_listing(
            &records,
            &GalleryMeta::from_value(&service.get_gallery_meta().await),
        ),
        Err(e) => {
            eprintln!("   ⚠ Warning: gallery not built: {}", e);
            GalleryListing::default()
        }
    };
    println!("🖼  Gallery: {} images", gallery.items.len());

    let accessor = ContentAccessor::new(&settings.root, settings.content.clone());
    if accessor.get_global_data().is_none() {
        eprintln!("   ⚠ Warning: global settings missing, using defaults");
    }
    if accessor.get_page_data().is_none() {
        eprintln!("   ⚠ Warning: page content missing, using defaults");
    }

    let summary = build_static_site(&accessor, &gallery, &output).context("Build failed")?;

    println!("📄 Pages: {}", summary.pages);
    println!("📝 Articles: {}", summary.articles);
    println!("📁 Assets copied: {}", summary.assets);
    println!();
    println!("✅ Build complete!");
    println!("   Output: {}", output.display());
    println!();

    Ok(())
}
