use crate::categorize::{Category, categorize, describe, display_title};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use villa_site_core::GalleryImageRecord;

/// Public gallery payload served to the landing page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GalleryListing {
    pub items: Vec<GalleryItem>,
    pub categories: Vec<CategoryOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub id: String,
    pub src: String,
    pub alt: String,
    pub category: Category,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOption {
    pub id: String,
    pub label: String,
}

/// Optional per-image overrides from the gallery metadata document, keyed by
/// filename
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GalleryMeta {
    entries: BTreeMap<String, ImageMeta>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageMeta {
    pub title: Option<String>,
    pub description: Option<String>,
    pub alt: Option<String>,
    pub category: Option<Category>,
}

impl GalleryMeta {
    /// Read overrides from the raw metadata document. Entries that do not
    /// match the expected shape are skipped rather than failing the gallery.
    pub fn from_value(value: &serde_json::Value) -> Self {
        let entries = value
            .as_object()
            .map(|map| {
                map.iter()
                    .filter_map(|(name, entry)| {
                        serde_json::from_value::<ImageMeta>(entry.clone())
                            .ok()
                            .map(|meta| (name.clone(), meta))
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { entries }
    }

    pub fn get(&self, filename: &str) -> Option<&ImageMeta> {
        self.entries.get(filename)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Whether a filename looks like a displayable image
pub fn is_image_file(filename: &str) -> bool {
    mime_guess::from_path(filename)
        .first()
        .is_some_and(|mime| mime.type_() == mime_guess::mime::IMAGE)
}

/// Assemble the public gallery from a folder listing.
///
/// Directories and non-image files are skipped. Listing order is kept. The
/// category list starts with `all` followed by every category that has at
/// least one image, in display order.
pub fn build_listing(records: &[GalleryImageRecord], meta: &GalleryMeta) -> GalleryListing {
    let items: Vec<GalleryItem> = records
        .iter()
        .filter(|r| r.is_file() && is_image_file(&r.name))
        .map(|record| gallery_item(record, meta.get(&record.name)))
        .collect();

    let mut categories = vec![CategoryOption {
        id: "all".to_string(),
        label: "All".to_string(),
    }];
    categories.extend(
        Category::ALL
            .into_iter()
            .filter(|c| items.iter().any(|item| item.category == *c))
            .map(|c| CategoryOption {
                id: c.id().to_string(),
                label: c.label().to_string(),
            }),
    );

    GalleryListing { items, categories }
}

fn gallery_item(record: &GalleryImageRecord, meta: Option<&ImageMeta>) -> GalleryItem {
    let category = meta
        .and_then(|m| m.category)
        .unwrap_or_else(|| categorize(&record.name));
    let title = meta
        .and_then(|m| m.title.clone())
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| display_title(&record.name, category));
    let description = meta
        .and_then(|m| m.description.clone())
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| describe(category).to_string());
    let alt = meta
        .and_then(|m| m.alt.clone())
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| title.clone());

    GalleryItem {
        id: record.sha.clone(),
        src: record.path.clone(),
        alt,
        category,
        title,
        description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use villa_site_core::EntryType;

    fn record(name: &str) -> GalleryImageRecord {
        GalleryImageRecord {
            name: name.to_string(),
            path: format!("/images/gallery/{}", name),
            sha: format!("sha-{}", name),
            size: 10,
            entry_type: EntryType::File,
        }
    }

    #[test]
    fn test_build_listing_categorizes() {
        let records = vec![record("Exterior & Pool (3).jpg"), record("Bedroom2.jpg")];
        let listing = build_listing(&records, &GalleryMeta::default());

        assert_eq!(listing.items.len(), 2);
        assert_eq!(listing.items[0].category, Category::Pool);
        assert_eq!(listing.items[0].title, "Exterior & Pool");
        assert_eq!(listing.items[0].alt, "Exterior & Pool");
        assert_eq!(listing.items[0].src, "/images/gallery/Exterior & Pool (3).jpg");
        assert_eq!(listing.items[1].category, Category::Rooms);

        let ids: Vec<_> = listing.categories.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["all", "pool", "rooms"]);
    }

    #[test]
    fn test_build_listing_skips_dirs_and_non_images() {
        let mut dir = record("drone");
        dir.entry_type = EntryType::Dir;
        let records = vec![dir, record("notes.txt"), record("view.webp")];
        let listing = build_listing(&records, &GalleryMeta::default());
        assert_eq!(listing.items.len(), 1);
        assert_eq!(listing.items[0].id, "sha-view.webp");
    }

    #[test]
    fn test_build_listing_empty() {
        let listing = build_listing(&[], &GalleryMeta::default());
        assert!(listing.items.is_empty());
        assert_eq!(listing.categories.len(), 1);
    }

    #[test]
    fn test_meta_overrides() {
        let meta = GalleryMeta::from_value(&json!({
            "img_04.png": {
                "title": "Sunset Terrace",
                "description": "Golden hour on the west terrace.",
                "category": "exterior"
            },
            "Bedroom2.jpg": { "category": "wellness", "alt": "Bed by the window" },
            "broken.jpg": { "category": "garden" },
            "not-an-object.jpg": 3
        }));
        assert_eq!(meta.len(), 2);

        let listing = build_listing(&[record("img_04.png"), record("Bedroom2.jpg")], &meta);
        assert_eq!(listing.items[0].title, "Sunset Terrace");
        assert_eq!(listing.items[0].description, "Golden hour on the west terrace.");
        assert_eq!(listing.items[1].category, Category::Wellness);
        assert_eq!(listing.items[1].alt, "Bed by the window");
        assert_eq!(listing.items[1].description, describe(Category::Wellness));
    }

    #[test]
    fn test_meta_from_non_object() {
        assert!(GalleryMeta::from_value(&json!([1, 2])).is_empty());
        assert!(GalleryMeta::from_value(&json!(null)).is_empty());
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file("a.jpg"));
        assert!(is_image_file("a.JPEG"));
        assert!(is_image_file("a.webp"));
        assert!(!is_image_file("a.json"));
        assert!(!is_image_file("README"));
    }

    #[test]
    fn test_listing_serializes_category_ids() {
        let listing = build_listing(&[record("spa.jpg")], &GalleryMeta::default());
        let value = serde_json::to_value(&listing).unwrap();
        assert_eq!(value["items"][0]["category"], "wellness");
        assert_eq!(value["categories"][1]["label"], "Wellness");
    }
}
