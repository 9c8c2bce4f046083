//! Generator module - writes the static site using the built-in Tera templates

use anyhow::{Context as _, Result};
use chrono::Datelike;
use std::fs;
use std::path::Path;
use tera::Context;
use walkdir::WalkDir;

use crate::content::body::{render_body, StyleContext};
use crate::content::{Post, PostKind};
use crate::helpers::{
    css, escape_xml, full_url_for, html_escape, iso_date, js, link_to, meta_generator, rfc3339,
    strip_html,
};
use crate::routes::{Listing, Pagination, Route, RouteView, Site};
use crate::templates::{
    nav_links, ClientConfig, NavPost, PostData, ProjectData, SiteData, SocialData,
    TemplateRenderer, STYLE_CSS,
};
use crate::theme::palette_css;
use crate::Folio;

/// Number of entries in the Atom feed
const FEED_ENTRIES: usize = 20;

/// Static site generator
pub struct Generator {
    folio: Folio,
    renderer: TemplateRenderer,
    /// Whether the client runtime talks to the dev server
    live: bool,
}

impl Generator {
    /// Create a new generator
    pub fn new(folio: &Folio) -> Result<Self> {
        Ok(Self {
            folio: folio.clone(),
            renderer: TemplateRenderer::new(&folio.config.root)?,
            live: false,
        })
    }

    /// Emit a client runtime that follows the dev server's transitions
    pub fn live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }

    /// Generate the entire site
    pub fn generate(&self, site: &Site) -> Result<()> {
        let public_dir = &self.folio.public_dir;
        fs::create_dir_all(public_dir)
            .with_context(|| format!("Failed to create {:?}", public_dir))?;

        self.copy_source_assets()?;
        self.generate_assets()?;

        let routes = site.routes();
        for route in &routes {
            let html = self.render_route(site, route)?;
            self.write_page(&route.path(), &html)?;
        }
        tracing::info!("Generated {} pages", routes.len());

        self.generate_not_found_pages()?;
        self.generate_atom_feed(site)?;
        self.generate_search_index(site)?;

        Ok(())
    }

    /// Render one route to a full HTML document
    pub fn render_route(&self, site: &Site, route: &Route) -> Result<String> {
        let view = site.resolve(route);
        self.render_view(route, view)
            .with_context(|| format!("Failed to render {}", route.path()))
    }

    /// Render the not-found page, linking back to `listing` when given
    pub fn render_not_found(&self, listing: Option<Listing>) -> Result<String> {
        let current_path = listing.map(Listing::path).unwrap_or_else(|| "/".to_string());
        let mut context = self.base_context(&current_path);
        context.insert("page_title", "Not found");
        context.insert("listing_path", &listing.map(Listing::path));
        context.insert("listing_title", &listing.map(Listing::label));
        self.renderer.render("not_found.html", &context)
    }

    fn render_view(&self, route: &Route, view: RouteView<'_>) -> Result<String> {
        let path = route.path();
        let mut context = self.base_context(&path);
        let style = self.style();

        let template = match view {
            RouteView::Home { posts, projects } => {
                let posts: Vec<_> = posts.into_iter().map(PostData::summary).collect();
                let projects: Vec<_> = projects.into_iter().map(ProjectData::summary).collect();
                context.insert("posts", &posts);
                context.insert("projects", &projects);
                "home.html"
            }
            RouteView::About(page) => {
                let (title, content) = match page {
                    Some(page) => (page.title.clone(), page.content.clone()),
                    None => (
                        "About".to_string(),
                        format!("<p>{}</p>", html_escape(&self.folio.config.description)),
                    ),
                };
                context.insert("page_title", &title);
                context.insert("page_description", &content);
                context.insert("page_content", &content);
                "page.html"
            }
            RouteView::Contact(page) => {
                let (title, content) = match page {
                    Some(page) => (page.title.clone(), page.content.clone()),
                    None => ("Contact".to_string(), String::new()),
                };
                context.insert("page_title", &title);
                context.insert("page_content", &content);
                context.insert("show_contact", &true);
                "page.html"
            }
            RouteView::Projects(projects) => {
                let projects: Vec<_> = projects.into_iter().map(ProjectData::summary).collect();
                context.insert("page_title", "Projects");
                context.insert("projects", &projects);
                "projects.html"
            }
            RouteView::Project {
                project,
                prev,
                next,
            } => {
                let content = render_body(&project.body, &style);
                context.insert("page_title", &project.title);
                context.insert("page_description", &project.summary);
                context.insert("project", &ProjectData::new(project, content));
                context.insert("prev", &prev.map(NavPost::from_project));
                context.insert("next", &next.map(NavPost::from_project));
                "project.html"
            }
            RouteView::Gallery(photos) => {
                context.insert("page_title", "Gallery");
                context.insert("photos", photos);
                "gallery.html"
            }
            RouteView::Posts {
                kind,
                posts,
                pagination,
            } => {
                let posts: Vec<_> = posts.into_iter().map(PostData::summary).collect();
                context.insert("page_title", kind.label());
                context.insert("listing_title", kind.label());
                context.insert("posts", &posts);
                context.insert("pagination", &pagination);
                "listing.html"
            }
            RouteView::Tag { name, posts } => {
                let posts: Vec<_> = posts.into_iter().map(PostData::summary).collect();
                context.insert("page_title", &format!("#{}", name));
                context.insert("listing_title", PostKind::Blog.label());
                context.insert("tag_name", &name);
                context.insert("posts", &posts);
                "listing.html"
            }
            RouteView::Post { post, prev, next } => {
                let content = render_body(&post.body, &style);
                context.insert("page_title", &post.title);
                context.insert("page_description", &post.excerpt);
                context.insert("listing_path", &format!("/{}/", post.kind.route_dir()));
                context.insert("listing_title", post.kind.label());
                context.insert("post", &PostData::new(post, content));
                context.insert("prev", &prev.map(NavPost::from_post));
                context.insert("next", &next.map(NavPost::from_post));
                "post.html"
            }
            RouteView::NotFound { listing } => return self.render_not_found(listing),
        };

        self.renderer.render(template, &context)
    }

    /// Body styling for the current theme
    fn style(&self) -> StyleContext<'_> {
        StyleContext {
            palette: self.folio.theme.palette(),
            renderer: &self.folio.config.renderer,
            root: &self.folio.config.root,
        }
    }

    /// Create a base context with common variables
    fn base_context(&self, current_path: &str) -> Context {
        let config = &self.folio.config;
        let site = SiteData {
            title: config.title.clone(),
            subtitle: config.subtitle.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            email: config.email.clone(),
            language: config.language.clone(),
            url: config.url.clone(),
            root: config.root.clone(),
            year: chrono::Local::now().year().to_string(),
            theme: self.folio.theme.current(),
            social: config
                .social
                .iter()
                .map(|link| SocialData {
                    name: link.name.clone(),
                    url: link.url.clone(),
                    html: link_to(config, &link.url, &link.name),
                })
                .collect(),
            head_assets: [css(config, "palette"), css(config, "style"), js(config, "folio")]
                .join("\n  "),
            meta_generator: meta_generator(),
        };

        let mut context = Context::new();
        context.insert("site", &site);
        context.insert("nav", &nav_links(config, current_path));
        context.insert("current_path", current_path);
        context.insert("page_title", &None::<String>);
        context.insert("page_description", &None::<String>);
        context.insert("listing_path", &None::<String>);
        context.insert("tag_name", &None::<String>);
        context.insert("pagination", &None::<Pagination>);
        context.insert("show_contact", &false);
        context.insert("prev", &None::<NavPost>);
        context.insert("next", &None::<NavPost>);
        context
    }

    /// Write `html` to `<public>/<path>/index.html`
    fn write_page(&self, path: &str, html: &str) -> Result<()> {
        let clean_path = path.trim_matches('/');
        let output_path = self.folio.public_dir.join(clean_path).join("index.html");
        write_file(&output_path, html)?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }

    /// `404.html` at the root and one per listing that has detail pages
    fn generate_not_found_pages(&self) -> Result<()> {
        write_file(
            &self.folio.public_dir.join("404.html"),
            &self.render_not_found(None)?,
        )?;

        for listing in [
            Listing::Projects,
            Listing::Posts(PostKind::Blog),
            Listing::Posts(PostKind::Journal),
        ] {
            let output_path = self.folio.public_dir.join(listing.dir()).join("404.html");
            write_file(&output_path, &self.render_not_found(Some(listing))?)?;
        }

        Ok(())
    }

    /// Palette stylesheet, base stylesheet and client runtime
    fn generate_assets(&self) -> Result<()> {
        let public_dir = &self.folio.public_dir;
        let theme = self.folio.theme.current();

        write_file(
            &public_dir.join("css/palette.css"),
            &palette_css(self.folio.config.theme.default),
        )?;
        write_file(&public_dir.join("css/style.css"), STYLE_CSS)?;

        let client = ClientConfig::new(&self.folio.config, theme, self.live);
        write_file(&public_dir.join("js/folio.js"), &client.script()?)?;

        tracing::debug!("Generated palette and client assets ({} theme)", theme);
        Ok(())
    }

    /// Generate the Atom feed of blog posts
    fn generate_atom_feed(&self, site: &Site) -> Result<()> {
        let config = &self.folio.config;
        let base_url = config.url.trim_end_matches('/');
        let style = self.style();

        let updated = site
            .blog
            .iter()
            .map(|p| p.date)
            .max()
            .map(|d| rfc3339(&d))
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());

        let mut feed = String::new();
        feed.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
        feed.push_str("<feed xmlns=\"http://www.w3.org/2005/Atom\">\n");
        feed.push_str(&format!("  <title>{}</title>\n", escape_xml(&config.title)));
        feed.push_str(&format!(
            "  <link href=\"{}\" rel=\"self\"/>\n",
            full_url_for(config, "/atom.xml")
        ));
        feed.push_str(&format!("  <link href=\"{}\"/>\n", full_url_for(config, "/")));
        feed.push_str(&format!("  <updated>{}</updated>\n", updated));
        feed.push_str(&format!("  <id>{}</id>\n", full_url_for(config, "/")));
        feed.push_str(&format!(
            "  <author><name>{}</name></author>\n",
            escape_xml(&config.author)
        ));

        for post in site.blog.iter().take(FEED_ENTRIES) {
            let url = full_url_for(config, &post.path());
            let content = absolute_urls(&render_body(&post.body, &style), base_url);

            feed.push_str("  <entry>\n");
            feed.push_str(&format!("    <title>{}</title>\n", escape_xml(&post.title)));
            feed.push_str(&format!("    <link href=\"{}\"/>\n", url));
            feed.push_str(&format!("    <id>{}</id>\n", url));
            feed.push_str(&format!("    <published>{}</published>\n", rfc3339(&post.date)));
            feed.push_str(&format!("    <updated>{}</updated>\n", rfc3339(&post.date)));
            if !post.excerpt.is_empty() {
                feed.push_str(&format!(
                    "    <summary>{}</summary>\n",
                    escape_xml(&post.excerpt)
                ));
            }
            feed.push_str(&format!(
                "    <content type=\"html\"><![CDATA[{}]]></content>\n",
                strip_invalid_xml_chars(&content).replace("]]>", "]]]]><![CDATA[>")
            ));
            feed.push_str("  </entry>\n");
        }

        feed.push_str("</feed>\n");

        write_file(&self.folio.public_dir.join("atom.xml"), &feed)?;
        tracing::info!("Generated atom.xml");
        Ok(())
    }

    /// Generate the client-side search index
    fn generate_search_index(&self, site: &Site) -> Result<()> {
        let style = self.style();
        let post_entry = |post: &Post| {
            serde_json::json!({
                "title": post.title,
                "url": post.path(),
                "kind": post.kind,
                "date": iso_date(&post.date),
                "content": strip_html(&render_body(&post.body, &style)),
            })
        };

        let mut entries: Vec<serde_json::Value> = site.blog.iter().map(post_entry).collect();
        entries.extend(site.journal.iter().map(post_entry));
        entries.extend(site.projects.iter().map(|project| {
            serde_json::json!({
                "title": project.title,
                "url": project.path(),
                "kind": "project",
                "date": iso_date(&project.date),
                "content": project.summary,
            })
        }));

        let json = serde_json::to_string_pretty(&entries)?;
        write_file(&self.folio.public_dir.join("search.json"), &json)?;
        tracing::info!("Generated search.json ({} entries)", entries.len());
        Ok(())
    }

    /// Copy source assets (images, etc.) to the public directory
    fn copy_source_assets(&self) -> Result<()> {
        let source_dir = &self.folio.source_dir;
        if !source_dir.exists() {
            return Ok(());
        }

        let excludes: Vec<glob::Pattern> = self
            .folio
            .config
            .exclude
            .iter()
            .filter_map(|pattern| match glob::Pattern::new(pattern) {
                Ok(p) => Some(p),
                Err(e) => {
                    tracing::warn!("Ignoring invalid exclude pattern {:?}: {}", pattern, e);
                    None
                }
            })
            .collect();

        let mut copied = 0;
        for entry in WalkDir::new(source_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            // Markdown is rendered, never copied
            if matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("md") | Some("markdown")
            ) {
                continue;
            }

            let relative = path.strip_prefix(source_dir)?;

            // Content collections (`_posts`, `_journal`, ...) and dotfiles stay private
            if relative.components().any(|c| {
                let name = c.as_os_str().to_string_lossy();
                name.starts_with('_') || name.starts_with('.')
            }) {
                continue;
            }

            let relative_str = relative.to_string_lossy().replace('\\', "/");
            if excludes.iter().any(|p| p.matches(&relative_str)) {
                tracing::debug!("Excluded: {}", relative_str);
                continue;
            }

            let dest = self.folio.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)
                .with_context(|| format!("Failed to copy {:?} to {:?}", path, dest))?;
            copied += 1;
        }

        tracing::debug!("Copied {} source assets", copied);
        Ok(())
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create dir {:?}", parent))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))
}

/// Point root-relative `href`/`src` attributes at `base_url`
fn absolute_urls(content: &str, base_url: &str) -> String {
    content
        .replace("href=\"/", &format!("href=\"{}/", base_url))
        .replace("src=\"/", &format!("src=\"{}/", base_url))
}

/// Drop characters XML 1.0 does not allow
fn strip_invalid_xml_chars(s: &str) -> String {
    s.chars()
        .filter(|&c| {
            matches!(c, '\t' | '\n' | '\r')
                || ('\u{0020}'..='\u{D7FF}').contains(&c)
                || ('\u{E000}'..='\u{FFFD}').contains(&c)
                || c >= '\u{10000}'
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, path: &str, content: &str) {
        let full = dir.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    fn sample_site() -> (TempDir, Folio) {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        write(
            base,
            "_config.yml",
            "title: Jane Doe\nauthor: Jane\nurl: https://jane.example\nper_page: 1\nexclude:\n  - \"drafts/**\"\n",
        );
        write(
            base,
            "source/_posts/hello.md",
            "---\ntitle: Hello\ndate: 2024-03-01\ntags: [Rust Lang]\n---\n# Intro\nSome **bold** text\n![IMAGE:/images/team-logo.png]",
        );
        write(
            base,
            "source/_posts/second.md",
            "---\ntitle: Second\ndate: 2024-02-01\n---\nAnother post",
        );
        write(
            base,
            "source/_journal/day-one.md",
            "---\ntitle: Day One\ndate: 2024-01-01\n---\n- walked\n- wrote",
        );
        write(
            base,
            "source/_projects/folio.md",
            "---\ntitle: Folio\ndate: 2024-01-01\nsummary: This site\nimage: /images/cover.png\n---\nBuilt with `tera`",
        );
        write(base, "source/about.md", "---\ntitle: About Me\n---\nHello there.");
        write(base, "source/images/cover.png", "png");
        write(base, "source/gallery/lake.jpg", "jpg");
        write(base, "source/drafts/secret.png", "png");
        let folio = Folio::new(base).unwrap();
        (dir, folio)
    }

    fn generate(folio: &Folio) {
        let site = Site::load(folio).unwrap();
        Generator::new(folio).unwrap().generate(&site).unwrap();
    }

    fn read(folio: &Folio, path: &str) -> String {
        fs::read_to_string(folio.public_dir.join(path)).unwrap()
    }

    #[test]
    fn test_generate_writes_every_route() {
        let (_dir, folio) = sample_site();
        generate(&folio);

        for path in [
            "index.html",
            "about/index.html",
            "contact/index.html",
            "gallery/index.html",
            "projects/index.html",
            "projects/folio/index.html",
            "blog/index.html",
            "blog/page/2/index.html",
            "blog/hello/index.html",
            "blog/second/index.html",
            "blog/tags/rust-lang/index.html",
            "journal/index.html",
            "journal/day-one/index.html",
            "404.html",
            "blog/404.html",
            "journal/404.html",
            "projects/404.html",
            "css/palette.css",
            "css/style.css",
            "js/folio.js",
            "atom.xml",
            "search.json",
        ] {
            assert!(folio.public_dir.join(path).exists(), "missing {}", path);
        }
    }

    #[test]
    fn test_post_body_uses_dialect_renderer() {
        let (_dir, folio) = sample_site();
        generate(&folio);

        let html = read(&folio, "blog/hello/index.html");
        assert!(html.contains(r#"<h2 class="post-heading""#));
        assert!(html.contains("<strong style=\"font-weight:600;color:inherit\">bold</strong>"));
        assert!(html.contains("logo-card"));
        assert!(html.contains(r#"href="/blog/tags/rust-lang/""#));
        // Newer neighbor link from the older post
        assert!(read(&folio, "blog/second/index.html").contains(r#"href="/blog/hello/""#));
    }

    #[test]
    fn test_body_colors_follow_theme() {
        let (_dir, folio) = sample_site();
        generate(&folio);
        let light = read(&folio, "journal/day-one/index.html");

        folio.theme.toggle();
        generate(&folio);
        let dark = read(&folio, "journal/day-one/index.html");

        assert_ne!(light, dark);
        assert!(dark.contains(r#"data-theme="dark""#));
        assert!(read(&folio, "js/folio.js").contains(r#""bakedTheme":"dark""#));
    }

    #[test]
    fn test_not_found_pages_link_listing() {
        let (_dir, folio) = sample_site();
        generate(&folio);

        assert!(read(&folio, "projects/404.html").contains("Back to Projects"));
        assert!(read(&folio, "journal/404.html").contains(r#"href="/journal/""#));
        assert!(read(&folio, "404.html").contains("Back home"));
    }

    #[test]
    fn test_assets_copied_with_excludes() {
        let (_dir, folio) = sample_site();
        generate(&folio);

        assert!(folio.public_dir.join("images/cover.png").exists());
        assert!(folio.public_dir.join("gallery/lake.jpg").exists());
        assert!(!folio.public_dir.join("drafts/secret.png").exists());
        assert!(!folio.public_dir.join("_posts").exists());
        assert!(!folio.public_dir.join("about.md").exists());
    }

    #[test]
    fn test_feed_and_search_index() {
        let (_dir, folio) = sample_site();
        generate(&folio);

        let feed = read(&folio, "atom.xml");
        assert!(feed.contains("<title>Jane Doe</title>"));
        assert!(feed.contains("<link href=\"https://jane.example/blog/hello/\"/>"));
        assert!(feed.contains("src=\"https://jane.example/images/team-logo.png\""));

        let index: serde_json::Value = serde_json::from_str(&read(&folio, "search.json")).unwrap();
        let entries = index.as_array().unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0]["url"], "/blog/hello/");
        assert_eq!(entries[3]["kind"], "project");
    }

    #[test]
    fn test_about_falls_back_to_description() {
        let (_dir, folio) = sample_site();
        fs::remove_file(folio.source_dir.join("about.md")).unwrap();
        let site = Site::load(&folio).unwrap();
        let html = Generator::new(&folio)
            .unwrap()
            .render_route(&site, &Route::About)
            .unwrap();
        assert!(html.contains("<h1 class=\"page-title\">About</h1>"));
    }

    #[test]
    fn test_strip_invalid_xml_chars() {
        assert_eq!(strip_invalid_xml_chars("a\u{0}b\u{1F600}"), "ab\u{1F600}");
    }
}
