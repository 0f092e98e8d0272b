//! Read-only access to the content documents for public rendering.
//!
//! Rendering must keep working with no content at all, so every failure here
//! is logged and turned into `None`.

use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use villa_site_core::{ContentLayout, DocumentKind, GlobalContent, PageContent};

#[derive(Debug, Clone)]
pub struct ContentAccessor {
    root: PathBuf,
    layout: ContentLayout,
}

impl ContentAccessor {
    pub fn new<P: AsRef<Path>>(root: P, layout: ContentLayout) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            layout,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layout(&self) -> &ContentLayout {
        &self.layout
    }

    pub fn get_global_data(&self) -> Option<GlobalContent> {
        self.load(DocumentKind::Global)
    }

    pub fn get_page_data(&self) -> Option<PageContent> {
        self.load(DocumentKind::Page)
    }

    fn load<T: DeserializeOwned>(&self, kind: DocumentKind) -> Option<T> {
        let path = self.root.join(self.layout.document_path(kind));
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Content document unavailable");
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Content document could not be parsed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn accessor(dir: &TempDir) -> ContentAccessor {
        ContentAccessor::new(dir.path(), ContentLayout::default())
    }

    #[test]
    fn test_missing_files_are_none() {
        let dir = TempDir::new().unwrap();
        let accessor = accessor(&dir);
        assert!(accessor.get_global_data().is_none());
        assert!(accessor.get_page_data().is_none());
    }

    #[test]
    fn test_corrupt_files_are_none() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("content")).unwrap();
        fs::write(dir.path().join("content/global.json"), "{ nope").unwrap();
        // Valid JSON, wrong shape
        fs::write(dir.path().join("content/home.json"), "[1, 2]").unwrap();

        let accessor = accessor(&dir);
        assert!(accessor.get_global_data().is_none());
        assert!(accessor.get_page_data().is_none());
    }

    #[test]
    fn test_reads_documents() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("content")).unwrap();
        fs::write(
            dir.path().join("content/global.json"),
            r#"{"seo": {"siteName": "Villa Azul"}, "header": {"brandName": "Azul"}}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("content/home.json"),
            r#"{"hero": {"title": "Welcome"}}"#,
        )
        .unwrap();

        let accessor = accessor(&dir);
        let global = accessor.get_global_data().unwrap();
        assert_eq!(global.seo.site_name, "Villa Azul");
        assert_eq!(global.header.brand_name, "Azul");
        let page = accessor.get_page_data().unwrap();
        assert_eq!(page.hero.unwrap().title.as_deref(), Some("Welcome"));
        assert!(page.map.is_none());
    }
}
