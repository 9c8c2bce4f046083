//! Content module - records, stores and renderers

pub mod body;
mod frontmatter;
pub mod loader;
mod markdown;
mod record;
mod store;

pub use frontmatter::FrontMatter;
pub use markdown::PageRenderer;
pub use record::{GalleryItem, Page, Post, PostKind, Project, Record};
pub use store::{is_valid_slug, ContentStore, StoreError};
