// Gallery auto-categorization: filename keywords to category, title and
// description, plus assembly of the public gallery listing

pub mod categorize;
pub mod listing;

pub use categorize::{Category, categorize, clean_title, describe, display_title};
pub use listing::{
    CategoryOption, GalleryItem, GalleryListing, GalleryMeta, ImageMeta, build_listing,
    is_image_file,
};
