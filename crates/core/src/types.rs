use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two singleton content documents the admin editor can change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Global,
    Page,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 2] = [DocumentKind::Global, DocumentKind::Page];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Global => "global",
            DocumentKind::Page => "page",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a document kind outside `{global, page}` is requested
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDocumentKind(pub String);

impl fmt::Display for UnknownDocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown document '{}', expected 'global' or 'page'",
            self.0
        )
    }
}

impl std::error::Error for UnknownDocumentKind {}

impl FromStr for DocumentKind {
    type Err = UnknownDocumentKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "global" => Ok(DocumentKind::Global),
            "page" => Ok(DocumentKind::Page),
            other => Err(UnknownDocumentKind(other.to_string())),
        }
    }
}

// ============================================================================
// Global settings document
// ============================================================================

/// Site-wide settings (`content/global.json`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalContent {
    pub seo: SeoSettings,
    pub header: HeaderSettings,
    #[serde(default)]
    pub footer: FooterSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoSettings {
    pub site_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slogan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderSettings {
    pub brand_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nav_links: Option<Vec<NavLink>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavLink {
    pub href: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_by_url: Option<String>,
}

// ============================================================================
// Home page document
// ============================================================================

/// Home page section content (`content/home.json`)
///
/// Every section is optional so a partially filled document still renders;
/// missing sections fall back to the defaults in the page renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero: Option<HeroSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marquee: Option<MarqueeSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub villa_intro: Option<VillaIntroSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amenities: Option<AmenitiesSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concierge: Option<ConciergeSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gallery: Option<GallerySection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map: Option<MapSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeroSection {
    pub eyebrow: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub cta_label: Option<String>,
    pub cta_url: Option<String>,
    pub background_image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarqueeSection {
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VillaIntroSection {
    pub eyebrow: Option<String>,
    pub title: Option<String>,
    pub stats: Vec<Stat>,
    pub body_paragraphs: Vec<String>,
    pub space_paragraphs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gallery_images: Option<Vec<ImageRef>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub src: String,
    #[serde(default)]
    pub alt: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmenitiesSection {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub items: Vec<Amenity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Amenity {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConciergeSection {
    pub title: Option<String>,
    pub paragraphs: Vec<String>,
    pub services: Vec<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GallerySection {
    pub title: Option<String>,
    pub subtitle: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MapSection {
    pub title: Option<String>,
    pub address: Option<String>,
    pub embed_url: Option<String>,
    pub distances: Vec<Distance>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    pub name: String,
    pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactSection {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
}

// ============================================================================
// Image listing
// ============================================================================

/// Directory entry kind as reported by a content backend listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Dir,
}

/// One entry of an image folder listing.
///
/// `sha` is the backend's version token for the listed revision of the file.
/// It changes whenever the bytes change, so a record must be re-listed before
/// its token is used for a delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryImageRecord {
    pub name: String,
    /// Public URL path, e.g. `/images/gallery/pool.jpg`
    pub path: String,
    pub sha: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
}

impl GalleryImageRecord {
    pub fn is_file(&self) -> bool {
        self.entry_type == EntryType::File
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_kind_from_str() {
        assert_eq!("global".parse::<DocumentKind>(), Ok(DocumentKind::Global));
        assert_eq!("page".parse::<DocumentKind>(), Ok(DocumentKind::Page));
        assert!("Global".parse::<DocumentKind>().is_err());
        assert!("settings".parse::<DocumentKind>().is_err());
        assert!("".parse::<DocumentKind>().is_err());
    }

    #[test]
    fn test_unknown_kind_message_names_input() {
        let err = "secrets".parse::<DocumentKind>().unwrap_err();
        assert!(err.to_string().contains("'secrets'"));
    }

    #[test]
    fn test_global_content_camel_case() {
        let json = r##"{
            "seo": { "siteName": "Villa Aurora", "keywords": ["villa", "pool"] },
            "header": { "brandName": "Aurora", "navLinks": [{ "href": "#gallery", "label": "Gallery" }] }
        }"##;
        let global: GlobalContent = serde_json::from_str(json).unwrap();
        assert_eq!(global.seo.site_name, "Villa Aurora");
        assert_eq!(global.header.brand_name, "Aurora");
        assert_eq!(global.header.nav_links.as_ref().unwrap()[0].label, "Gallery");
        assert_eq!(global.footer, FooterSettings::default());
    }

    #[test]
    fn test_page_content_preserves_list_order() {
        let json = r#"{
            "map": { "distances": [
                { "name": "Beach", "detail": "5 min" },
                { "name": "Airport", "detail": "40 min" },
                { "name": "Old Town", "detail": "15 min" }
            ] }
        }"#;
        let page: PageContent = serde_json::from_str(json).unwrap();
        let names: Vec<_> = page
            .map
            .unwrap()
            .distances
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["Beach", "Airport", "Old Town"]);
    }

    #[test]
    fn test_page_content_empty_object() {
        let page: PageContent = serde_json::from_str("{}").unwrap();
        assert!(page.hero.is_none());
        assert_eq!(serde_json::to_string(&page).unwrap(), "{}");
    }

    #[test]
    fn test_image_record_serializes_type_field() {
        let record = GalleryImageRecord {
            name: "pool.jpg".into(),
            path: "/images/gallery/pool.jpg".into(),
            sha: "abc".into(),
            size: 42,
            entry_type: EntryType::File,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "file");
        assert!(record.is_file());
    }
}
