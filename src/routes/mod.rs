//! Site routes and what each one shows

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Serialize;

use crate::content::body::image_paths;
use crate::content::loader::ContentLoader;
use crate::content::{ContentStore, GalleryItem, Page, Post, PostKind, Project};
use crate::transition::RouteAssets;
use crate::Folio;

/// Number of recent posts and projects featured on the home page
const HOME_FEATURED: usize = 3;

/// A site route
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    About,
    Projects,
    Project(String),
    Gallery,
    /// Listing page, 1-based
    Posts { kind: PostKind, page: usize },
    Post { kind: PostKind, slug: String },
    BlogTag(String),
    Contact,
}

impl Route {
    /// Parse a request path (without the site root)
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.last() == Some(&"index.html") {
            segments.pop();
        }

        let route = match segments.as_slice() {
            [] => Route::Home,
            ["about"] => Route::About,
            ["contact"] => Route::Contact,
            ["gallery"] => Route::Gallery,
            ["projects"] => Route::Projects,
            ["projects", slug] => Route::Project(slug.to_string()),
            ["blog", "tags", tag] => Route::BlogTag(tag.to_string()),
            [section, rest @ ..] => {
                let kind = match *section {
                    "blog" => PostKind::Blog,
                    "journal" => PostKind::Journal,
                    _ => return None,
                };
                match rest {
                    [] => Route::Posts { kind, page: 1 },
                    ["page", n] => Route::Posts {
                        kind,
                        page: n.parse().ok()?,
                    },
                    [slug] => Route::Post {
                        kind,
                        slug: slug.to_string(),
                    },
                    _ => return None,
                }
            }
        };
        Some(route)
    }

    /// Site path of the route, with trailing slash
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::About => "/about/".to_string(),
            Route::Projects => "/projects/".to_string(),
            Route::Project(slug) => format!("/projects/{}/", slug),
            Route::Gallery => "/gallery/".to_string(),
            Route::Posts { kind, page } if *page <= 1 => format!("/{}/", kind.route_dir()),
            Route::Posts { kind, page } => format!("/{}/page/{}/", kind.route_dir(), page),
            Route::Post { kind, slug } => format!("/{}/{}/", kind.route_dir(), slug),
            Route::BlogTag(tag) => format!("/blog/tags/{}/", tag),
            Route::Contact => "/contact/".to_string(),
        }
    }

    /// The listing a detail route belongs to, used for not-found links
    pub fn listing(&self) -> Option<Listing> {
        match self {
            Route::Project(_) => Some(Listing::Projects),
            Route::Post { kind, .. } | Route::Posts { kind, .. } => Some(Listing::Posts(*kind)),
            Route::BlogTag(_) => Some(Listing::Posts(PostKind::Blog)),
            _ => None,
        }
    }
}

/// A listing page that not-found states link back to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Listing {
    Projects,
    Posts(PostKind),
}

impl Listing {
    pub fn path(self) -> String {
        match self {
            Listing::Projects => "/projects/".to_string(),
            Listing::Posts(kind) => format!("/{}/", kind.route_dir()),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Listing::Projects => "Projects",
            Listing::Posts(kind) => kind.label(),
        }
    }

    /// Directory (under public/) holding this listing's not-found page
    pub fn dir(self) -> &'static str {
        match self {
            Listing::Projects => "projects",
            Listing::Posts(kind) => kind.route_dir(),
        }
    }
}

/// Page links for a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current: usize,
    pub total: usize,
    pub prev_link: Option<String>,
    pub next_link: Option<String>,
}

/// What a route resolves to
#[derive(Debug)]
pub enum RouteView<'a> {
    Home {
        posts: Vec<&'a Post>,
        projects: Vec<&'a Project>,
    },
    About(Option<&'a Page>),
    Contact(Option<&'a Page>),
    Projects(Vec<&'a Project>),
    Project {
        project: &'a Project,
        prev: Option<&'a Project>,
        next: Option<&'a Project>,
    },
    Gallery(&'a [GalleryItem]),
    Posts {
        kind: PostKind,
        posts: Vec<&'a Post>,
        pagination: Pagination,
    },
    Tag {
        name: String,
        posts: Vec<&'a Post>,
    },
    Post {
        post: &'a Post,
        /// Newer entry
        prev: Option<&'a Post>,
        /// Older entry
        next: Option<&'a Post>,
    },
    NotFound {
        listing: Option<Listing>,
    },
}

/// All loaded content
#[derive(Debug, Default)]
pub struct Site {
    pub blog: ContentStore<Post>,
    pub journal: ContentStore<Post>,
    pub projects: ContentStore<Project>,
    pub pages: IndexMap<String, Page>,
    pub gallery: Vec<GalleryItem>,
    pub per_page: usize,
}

impl Site {
    /// Load everything under the source directory.
    ///
    /// Fails when two records of one collection share a slug.
    pub fn load(folio: &Folio) -> Result<Self> {
        let loader = ContentLoader::new(folio);

        let blog = ContentStore::from_records(loader.load_posts(PostKind::Blog)?)
            .context("Invalid blog posts")?;
        let journal = ContentStore::from_records(loader.load_posts(PostKind::Journal)?)
            .context("Invalid journal entries")?;
        let projects =
            ContentStore::from_records(loader.load_projects()?).context("Invalid projects")?;

        let site = Self {
            blog,
            journal,
            projects,
            pages: loader.load_pages()?,
            gallery: loader.load_gallery(),
            per_page: folio.config.per_page.max(1),
        };

        tracing::info!(
            "Loaded {} posts, {} journal entries, {} projects, {} pages, {} photos",
            site.blog.len(),
            site.journal.len(),
            site.projects.len(),
            site.pages.len(),
            site.gallery.len()
        );

        Ok(site)
    }

    pub fn posts(&self, kind: PostKind) -> &ContentStore<Post> {
        match kind {
            PostKind::Blog => &self.blog,
            PostKind::Journal => &self.journal,
        }
    }

    fn page_count(&self, kind: PostKind) -> usize {
        self.posts(kind).len().div_ceil(self.per_page.max(1)).max(1)
    }

    /// Blog tags in first-seen order
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = Vec::new();
        for tag in self.blog.iter().flat_map(|p| p.tags.iter()) {
            if !tags.contains(&tag.as_str()) {
                tags.push(tag);
            }
        }
        tags
    }

    /// Every route the generator writes
    pub fn routes(&self) -> Vec<Route> {
        let mut routes = vec![
            Route::Home,
            Route::About,
            Route::Projects,
            Route::Gallery,
            Route::Contact,
        ];

        routes.extend(self.projects.iter().map(|p| Route::Project(p.slug.clone())));

        for kind in [PostKind::Blog, PostKind::Journal] {
            routes.extend((1..=self.page_count(kind)).map(|page| Route::Posts { kind, page }));
            routes.extend(self.posts(kind).iter().map(|p| Route::Post {
                kind,
                slug: p.slug.clone(),
            }));
        }

        for tag in self.tags() {
            let tag_slug = slug::slugify(tag);
            if tag_slug.is_empty() {
                continue;
            }
            let route = Route::BlogTag(tag_slug);
            if !routes.contains(&route) {
                routes.push(route);
            }
        }

        routes
    }

    /// Resolve a route; unknown slugs and pages give `NotFound`
    pub fn resolve(&self, route: &Route) -> RouteView<'_> {
        let not_found = RouteView::NotFound {
            listing: route.listing(),
        };

        match route {
            Route::Home => RouteView::Home {
                posts: self.blog.iter().take(HOME_FEATURED).collect(),
                projects: self.projects.iter().take(HOME_FEATURED).collect(),
            },
            Route::About => RouteView::About(self.pages.get("about")),
            Route::Contact => RouteView::Contact(self.pages.get("contact")),
            Route::Gallery => RouteView::Gallery(&self.gallery),
            Route::Projects => RouteView::Projects(self.projects.iter().collect()),
            Route::Project(slug) => match self.projects.get(slug) {
                Some(project) => {
                    let (prev, next) = self.projects.neighbors(slug);
                    RouteView::Project {
                        project,
                        prev,
                        next,
                    }
                }
                None => not_found,
            },
            Route::Posts { kind, page } => {
                let total = self.page_count(*kind);
                if *page == 0 || *page > total {
                    return not_found;
                }
                let per_page = self.per_page.max(1);
                let posts = self
                    .posts(*kind)
                    .iter()
                    .skip((page - 1) * per_page)
                    .take(per_page)
                    .collect();
                let link = |n: usize| Route::Posts { kind: *kind, page: n }.path();
                RouteView::Posts {
                    kind: *kind,
                    posts,
                    pagination: Pagination {
                        current: *page,
                        total,
                        prev_link: (*page > 1).then(|| link(page - 1)),
                        next_link: (*page < total).then(|| link(page + 1)),
                    },
                }
            }
            Route::Post { kind, slug } => {
                let store = self.posts(*kind);
                match store.get(slug) {
                    Some(post) => {
                        let (prev, next) = store.neighbors(slug);
                        RouteView::Post { post, prev, next }
                    }
                    None => not_found,
                }
            }
            Route::BlogTag(tag_slug) => {
                let Some(name) = self
                    .tags()
                    .into_iter()
                    .find(|tag| slug::slugify(tag) == *tag_slug)
                else {
                    return not_found;
                };
                RouteView::Tag {
                    name: name.to_string(),
                    posts: self
                        .blog
                        .iter()
                        .filter(|p| p.tags.contains(name))
                        .collect(),
                }
            }
        }
    }

    /// Fonts and images to preload before revealing a route
    pub fn route_assets(&self, route: &Route, fonts: &[String]) -> RouteAssets {
        let images = match self.resolve(route) {
            RouteView::Post { post, .. } => image_paths(&post.body),
            RouteView::Project { project, .. } => project
                .image
                .iter()
                .cloned()
                .chain(image_paths(&project.body))
                .collect(),
            RouteView::Projects(projects) => {
                projects.iter().filter_map(|p| p.image.clone()).collect()
            }
            RouteView::Home { projects, .. } => {
                projects.iter().filter_map(|p| p.image.clone()).collect()
            }
            RouteView::Gallery(items) => items.iter().map(|item| item.path.clone()).collect(),
            _ => Vec::new(),
        };

        RouteAssets {
            fonts: fonts.to_vec(),
            images,
        }
    }
}
