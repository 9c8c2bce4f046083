//! Content records

use chrono::NaiveDate;
use indexmap::IndexSet;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Anything a [`ContentStore`](super::ContentStore) can index
pub trait Record {
    /// Unique URL-safe identifier
    fn slug(&self) -> &str;

    /// File the record was loaded from, for diagnostics
    fn source(&self) -> &str;
}

/// Which collection a post belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Blog,
    Journal,
}

impl PostKind {
    /// Directory under the source dir holding this kind
    pub fn source_dir(self) -> &'static str {
        match self {
            PostKind::Blog => "_posts",
            PostKind::Journal => "_journal",
        }
    }

    /// URL segment of the listing
    pub fn route_dir(self) -> &'static str {
        match self {
            PostKind::Blog => "blog",
            PostKind::Journal => "journal",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PostKind::Blog => "Blog",
            PostKind::Journal => "Journal",
        }
    }
}

impl fmt::Display for PostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.route_dir())
    }
}

/// A blog post or journal entry
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    /// 1-based position in load order
    pub id: usize,
    pub title: String,
    pub slug: String,
    pub date: NaiveDate,
    pub excerpt: String,
    /// Raw body in the post dialect
    pub body: String,
    pub author: Option<String>,
    pub tags: IndexSet<String>,
    pub kind: PostKind,
    /// Source file path (relative to the source dir)
    pub source: String,
}

impl Post {
    /// Site path of the detail page
    pub fn path(&self) -> String {
        format!("/{}/{}/", self.kind.route_dir(), self.slug)
    }
}

impl Record for Post {
    fn slug(&self) -> &str {
        &self.slug
    }

    fn source(&self) -> &str {
        &self.source
    }
}

/// A portfolio project
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: usize,
    pub title: String,
    pub slug: String,
    pub date: NaiveDate,
    pub summary: String,
    pub body: String,
    pub tech: IndexSet<String>,
    pub link: Option<String>,
    pub repo: Option<String>,
    /// Cover image path
    pub image: Option<String>,
    pub source: String,
}

impl Project {
    pub fn path(&self) -> String {
        format!("/projects/{}/", self.slug)
    }
}

impl Record for Project {
    fn slug(&self) -> &str {
        &self.slug
    }

    fn source(&self) -> &str {
        &self.source
    }
}

/// A photo shown on the gallery page
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GalleryItem {
    /// Site path of the image
    pub path: String,
    pub caption: String,
}

/// A standalone CommonMark page (about, contact)
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub title: String,
    /// Rendered HTML content
    pub content: String,
    pub source: String,
    #[serde(skip)]
    pub full_source: PathBuf,
}
