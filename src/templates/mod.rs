//! Built-in folio templates using the Tera template engine
//!
//! All templates and static assets are embedded in the binary.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::{Post, PostKind, Project};
use crate::helpers::{full_date, iso_date, reading_minutes, root_join};
use crate::theme::Theme;

/// Stylesheet shipped with every site
pub const STYLE_CSS: &str = include_str!("folio/assets/style.css");

/// Client runtime shipped with every site
pub const CLIENT_JS: &str = include_str!("folio/assets/folio.js");

/// Template renderer with the embedded folio templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a renderer; `root` is prepended by the `url` filter
    pub fn new(root: &str) -> Result<Self> {
        let mut tera = Tera::default();

        // Pages carry pre-rendered HTML, so escaping is explicit in templates
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("folio/layout.html")),
            ("home.html", include_str!("folio/home.html")),
            ("page.html", include_str!("folio/page.html")),
            ("projects.html", include_str!("folio/projects.html")),
            ("project.html", include_str!("folio/project.html")),
            ("gallery.html", include_str!("folio/gallery.html")),
            ("listing.html", include_str!("folio/listing.html")),
            ("post.html", include_str!("folio/post.html")),
            ("not_found.html", include_str!("folio/not_found.html")),
            // Partials
            (
                "partials/head.html",
                include_str!("folio/partials/head.html"),
            ),
            ("partials/nav.html", include_str!("folio/partials/nav.html")),
            (
                "partials/footer.html",
                include_str!("folio/partials/footer.html"),
            ),
            (
                "partials/pager.html",
                include_str!("folio/partials/pager.html"),
            ),
            (
                "partials/post_card.html",
                include_str!("folio/partials/post_card.html"),
            ),
            (
                "partials/project_card.html",
                include_str!("folio/partials/project_card.html"),
            ),
        ])?;

        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.register_filter("date_format", date_format_filter);

        let root = root.to_string();
        tera.register_filter(
            "url",
            move |value: &tera::Value, _args: &HashMap<String, tera::Value>| {
                let path = tera::try_get_value!("url", "value", String, value);
                Ok(tera::Value::String(root_join(&root, &path)))
            },
        );

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    Ok(tera::Value::String(crate::helpers::strip_html(&s)))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    Ok(tera::Value::String(crate::helpers::truncate(
        &s,
        length,
        Some(&omission),
    )))
}

/// Tera filter: reformat an ISO date; `format="full"` gives "January 5, 2024"
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "iso".to_string(),
    };

    if format == "full" {
        if let Some(date) = crate::helpers::parse_iso_date(&s) {
            return Ok(tera::Value::String(full_date(&date)));
        }
    }

    Ok(tera::Value::String(s))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub email: String,
    pub language: String,
    pub url: String,
    pub root: String,
    pub year: String,
    /// Theme the page is rendered with
    pub theme: Theme,
    pub social: Vec<SocialData>,
    /// Stylesheet and script tags
    pub head_assets: String,
    pub meta_generator: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SocialData {
    pub name: String,
    pub url: String,
    /// Ready-made anchor tag
    pub html: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavLink {
    pub name: String,
    pub path: String,
    pub active: bool,
}

/// Navigation links with the one matching `current_path` marked active
pub fn nav_links(config: &SiteConfig, current_path: &str) -> Vec<NavLink> {
    config
        .nav
        .iter()
        .map(|item| NavLink {
            name: item.name.clone(),
            path: item.path.clone(),
            active: item.path == current_path
                || (item.path != "/" && current_path.starts_with(&item.path)),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct TagLink {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub title: String,
    pub slug: String,
    pub date: String,
    pub path: String,
    pub excerpt: String,
    pub author: Option<String>,
    pub tags: Vec<TagLink>,
    pub reading_minutes: usize,
    /// Rendered body, empty in listings
    pub content: String,
}

impl PostData {
    pub fn new(post: &Post, content: String) -> Self {
        Self {
            title: post.title.clone(),
            slug: post.slug.clone(),
            date: iso_date(&post.date),
            path: post.path(),
            excerpt: post.excerpt.clone(),
            author: post.author.clone(),
            tags: post
                .tags
                .iter()
                .filter(|_| post.kind == PostKind::Blog)
                .filter_map(|tag| {
                    let slug = slug::slugify(tag);
                    (!slug.is_empty()).then(|| TagLink {
                        name: tag.clone(),
                        path: format!("/blog/tags/{}/", slug),
                    })
                })
                .collect(),
            reading_minutes: reading_minutes(&post.body),
            content,
        }
    }

    pub fn summary(post: &Post) -> Self {
        Self::new(post, String::new())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectData {
    pub title: String,
    pub slug: String,
    pub date: String,
    pub path: String,
    pub summary: String,
    pub tech: Vec<String>,
    pub link: Option<String>,
    pub repo: Option<String>,
    pub image: Option<String>,
    pub content: String,
}

impl ProjectData {
    pub fn new(project: &Project, content: String) -> Self {
        Self {
            title: project.title.clone(),
            slug: project.slug.clone(),
            date: iso_date(&project.date),
            path: project.path(),
            summary: project.summary.clone(),
            tech: project.tech.iter().cloned().collect(),
            link: project.link.clone(),
            repo: project.repo.clone(),
            image: project.image.clone(),
            content,
        }
    }

    pub fn summary(project: &Project) -> Self {
        Self::new(project, String::new())
    }
}

/// Previous/next link on detail pages
#[derive(Debug, Clone, Serialize)]
pub struct NavPost {
    pub title: String,
    pub path: String,
}

impl NavPost {
    pub fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            path: post.path(),
        }
    }

    pub fn from_project(project: &Project) -> Self {
        Self {
            title: project.title.clone(),
            path: project.path(),
        }
    }
}

/// Settings handed to the client runtime as `window.FOLIO`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub storage_key: String,
    /// Theme the pages were rendered with, used when nothing else decides
    pub baked_theme: Theme,
    pub min_display_ms: u64,
    pub settle_delay_ms: u64,
    pub fade_duration_ms: u64,
    /// Whether the dev server drives transitions
    pub live: bool,
}

impl ClientConfig {
    pub fn new(config: &SiteConfig, baked_theme: Theme, live: bool) -> Self {
        Self {
            storage_key: config.theme.storage_key.clone(),
            baked_theme,
            min_display_ms: config.transition.min_display_ms,
            settle_delay_ms: config.transition.settle_delay_ms,
            fade_duration_ms: config.transition.fade_duration_ms,
            live,
        }
    }

    /// The client script with this configuration prepended
    pub fn script(&self) -> Result<String> {
        Ok(format!(
            "window.FOLIO = {};\n{}",
            serde_json::to_string(self)?,
            CLIENT_JS
        ))
    }
}
