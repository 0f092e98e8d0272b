//! Image manager state: the last folder listing.
//!
//! Entries are addressed by public path. Files with identical bytes share a
//! sha, so the sha only pins the revision a delete applies to.

use villa_site_core::GalleryImageRecord;

#[derive(Debug, Clone, Default)]
pub struct ImageManager {
    folder: Option<String>,
    images: Vec<GalleryImageRecord>,
}

impl ImageManager {
    pub fn folder(&self) -> Option<&str> {
        self.folder.as_deref()
    }

    /// Replace the listing after a (re)load
    pub fn replace(&mut self, folder: Option<&str>, records: Vec<GalleryImageRecord>) {
        self.folder = folder.map(str::to_string);
        self.images = records;
    }

    /// Files only; subfolders are not shown in the manager
    pub fn files(&self) -> impl Iterator<Item = &GalleryImageRecord> {
        self.images.iter().filter(|r| r.is_file())
    }

    pub fn find(&self, path: &str) -> Option<&GalleryImageRecord> {
        self.images.iter().find(|r| r.path == path)
    }

    /// Drop the entry at `path` from the local listing
    pub fn remove(&mut self, path: &str) -> Option<GalleryImageRecord> {
        let index = self.images.iter().position(|r| r.path == path)?;
        Some(self.images.remove(index))
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use villa_site_core::EntryType;

    fn record(name: &str, sha: &str, entry_type: EntryType) -> GalleryImageRecord {
        GalleryImageRecord {
            name: name.to_string(),
            path: format!("/images/gallery/{}", name),
            sha: sha.to_string(),
            size: 1,
            entry_type,
        }
    }

    #[test]
    fn test_remove_by_path() {
        let mut manager = ImageManager::default();
        manager.replace(
            Some("images/gallery"),
            vec![
                record("a.jpg", "s1", EntryType::File),
                record("b.jpg", "s2", EntryType::File),
                record("old", "s3", EntryType::Dir),
            ],
        );
        assert_eq!(manager.files().count(), 2);
        assert_eq!(manager.folder(), Some("images/gallery"));

        let removed = manager.remove("/images/gallery/a.jpg").unwrap();
        assert_eq!(removed.name, "a.jpg");
        assert!(manager.find("/images/gallery/a.jpg").is_none());
        assert!(manager.remove("/images/gallery/a.jpg").is_none());
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_identical_bytes_stay_distinct() {
        let mut manager = ImageManager::default();
        manager.replace(
            None,
            vec![
                record("Pool (2).jpg", "same", EntryType::File),
                record("Pool.jpg", "same", EntryType::File),
            ],
        );
        let removed = manager.remove("/images/gallery/Pool.jpg").unwrap();
        assert_eq!(removed.name, "Pool.jpg");
        assert_eq!(
            manager.find("/images/gallery/Pool (2).jpg").map(|r| r.name.as_str()),
            Some("Pool (2).jpg")
        );
    }
}
