//! Content loader - loads posts, projects, pages and gallery images

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use indexmap::{IndexMap, IndexSet};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use super::body::{parse_inline, plain_text};
use super::{FrontMatter, GalleryItem, Page, PageRenderer, Post, PostKind, Project};
use crate::helpers::truncate;
use crate::Folio;

/// Length of excerpts derived from the body
const EXCERPT_CHARS: usize = 160;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "avif", "svg"];

/// Loads content from the source directory
pub struct ContentLoader<'a> {
    folio: &'a Folio,
    pages: PageRenderer,
}

impl<'a> ContentLoader<'a> {
    pub fn new(folio: &'a Folio) -> Self {
        let pages = PageRenderer::new(&folio.config.highlight);
        Self { folio, pages }
    }

    /// Load blog posts or journal entries, newest first
    pub fn load_posts(&self, kind: PostKind) -> Result<Vec<Post>> {
        let mut posts = Vec::new();

        for path in self.markdown_files(kind.source_dir()) {
            match self.load_post(&path, kind, posts.len() + 1) {
                Ok(Some(post)) => posts.push(post),
                Ok(None) => tracing::debug!("Skipping draft {:?}", path),
                Err(e) => tracing::warn!("Failed to load {} entry {:?}: {:#}", kind, path, e),
            }
        }

        posts.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(posts)
    }

    fn load_post(&self, path: &Path, kind: PostKind, id: usize) -> Result<Option<Post>> {
        let content = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&content)?;
        if fm.draft {
            return Ok(None);
        }

        let date = fm.parse_date().unwrap_or_else(|| file_date(path));
        let title = fm.title.clone().unwrap_or_else(|| file_stem(path));
        let excerpt = fm.excerpt.clone().unwrap_or_else(|| derive_excerpt(body));

        Ok(Some(Post {
            id,
            title,
            slug: record_slug(&fm, path),
            date,
            excerpt,
            body: body.to_string(),
            author: fm.author,
            tags: fm
                .tags
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect::<IndexSet<_>>(),
            kind,
            source: self.relative_source(path),
        }))
    }

    /// Load projects, newest first
    pub fn load_projects(&self) -> Result<Vec<Project>> {
        let mut projects = Vec::new();

        for path in self.markdown_files("_projects") {
            match self.load_project(&path, projects.len() + 1) {
                Ok(Some(project)) => projects.push(project),
                Ok(None) => tracing::debug!("Skipping draft {:?}", path),
                Err(e) => tracing::warn!("Failed to load project {:?}: {:#}", path, e),
            }
        }

        projects.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(projects)
    }

    fn load_project(&self, path: &Path, id: usize) -> Result<Option<Project>> {
        let content = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&content)?;
        if fm.draft {
            return Ok(None);
        }

        Ok(Some(Project {
            id,
            title: fm.title.clone().unwrap_or_else(|| file_stem(path)),
            slug: record_slug(&fm, path),
            date: fm.parse_date().unwrap_or_else(|| file_date(path)),
            summary: fm
                .summary
                .clone()
                .or(fm.excerpt.clone())
                .unwrap_or_else(|| derive_excerpt(body)),
            body: body.to_string(),
            tech: fm.tech.into_iter().collect(),
            link: fm.link,
            repo: fm.repo,
            image: fm.image,
            source: self.relative_source(path),
        }))
    }

    /// Load top-level markdown pages keyed by file stem (`about`, `contact`)
    pub fn load_pages(&self) -> Result<IndexMap<String, Page>> {
        let mut pages = IndexMap::new();
        let source_dir = &self.folio.source_dir;
        if !source_dir.exists() {
            return Ok(pages);
        }

        for entry in WalkDir::new(source_dir)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !is_markdown_file(path) {
                continue;
            }

            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read page {:?}", path))?;
            let (fm, body) = FrontMatter::parse(&content)?;
            let key = file_stem(path);

            let page = Page {
                title: fm.title.unwrap_or_else(|| title_case(&key)),
                content: self.pages.render(body)?,
                source: self.relative_source(path),
                full_source: path.to_path_buf(),
            };
            pages.insert(key, page);
        }

        Ok(pages)
    }

    /// Images under source/gallery, sorted by file name
    pub fn load_gallery(&self) -> Vec<GalleryItem> {
        let gallery_dir = self.folio.source_dir.join("gallery");
        if !gallery_dir.exists() {
            return Vec::new();
        }

        WalkDir::new(&gallery_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file() && is_image_file(e.path()))
            .map(|e| {
                let relative = self.relative_source(e.path()).replace('\\', "/");
                GalleryItem {
                    path: format!("/{}", relative),
                    caption: title_case(&file_stem(e.path())),
                }
            })
            .collect()
    }

    /// Markdown files in a source subdirectory, in file name order
    fn markdown_files(&self, dir: &str) -> Vec<std::path::PathBuf> {
        let dir = self.folio.source_dir.join(dir);
        if !dir.exists() {
            return Vec::new();
        }

        WalkDir::new(&dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.is_file() && is_markdown_file(p))
            .collect()
    }

    fn relative_source(&self, path: &Path) -> String {
        path.strip_prefix(&self.folio.source_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string()
    }
}

/// Explicit slug from front-matter, otherwise the slugified file name
fn record_slug(fm: &FrontMatter, path: &Path) -> String {
    fm.slug
        .clone()
        .unwrap_or_else(|| slug::slugify(file_stem(path)))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled")
        .to_string()
}

/// Last modification date, today when unavailable
fn file_date(path: &Path) -> NaiveDate {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .map(|t| chrono::DateTime::<Local>::from(t).date_naive())
        .unwrap_or_else(|_| Local::now().date_naive())
}

/// Plain text of the first paragraph-like line
fn derive_excerpt(body: &str) -> String {
    body.lines()
        .map(str::trim)
        .find(|line| {
            !line.is_empty() && !line.starts_with('#') && !line.starts_with("![IMAGE:")
        })
        .map(|line| {
            let line = line.strip_prefix("- ").unwrap_or(line);
            truncate(&plain_text(&parse_inline(line)), EXCERPT_CHARS, None)
        })
        .unwrap_or_default()
}

/// "my-first_trip" -> "My First Trip"
fn title_case(stem: &str) -> String {
    stem.split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
