pub mod build;
pub mod content;
pub mod gallery;
pub mod serve;
pub mod validate;
