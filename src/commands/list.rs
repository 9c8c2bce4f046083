//! List site content

use anyhow::Result;
use std::fmt::Write;

use crate::content::{Post, PostKind};
use crate::helpers::iso_date;
use crate::routes::Site;
use crate::Folio;

/// Print site content of one type
pub fn run(folio: &Folio, content_type: &str) -> Result<()> {
    let site = Site::load(folio)?;
    print!("{}", render(&site, content_type)?);
    Ok(())
}

/// Listing text for `content_type`
pub fn render(site: &Site, content_type: &str) -> Result<String> {
    let mut out = String::new();

    match content_type {
        "post" | "posts" | "blog" => list_posts(&mut out, site, PostKind::Blog)?,
        "journal" => list_posts(&mut out, site, PostKind::Journal)?,
        "project" | "projects" => {
            writeln!(out, "Projects ({}):", site.projects.len())?;
            for project in site.projects.iter() {
                writeln!(
                    out,
                    "  {} - {} ({}) [{}]",
                    iso_date(&project.date),
                    project.title,
                    project.slug,
                    project.source
                )?;
            }
        }
        "tag" | "tags" => {
            let tags = site.tags();
            writeln!(out, "Tags ({}):", tags.len())?;
            let mut counted: Vec<(&str, usize)> = tags
                .into_iter()
                .map(|tag| (tag, site.blog.iter().filter(|p| p.tags.contains(tag)).count()))
                .collect();
            counted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
            for (tag, count) in counted {
                writeln!(out, "  {} ({})", tag, count)?;
            }
        }
        "route" | "routes" => {
            let routes = site.routes();
            writeln!(out, "Routes ({}):", routes.len())?;
            for route in routes {
                writeln!(out, "  {}", route.path())?;
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, journal, project, tag, route",
                content_type
            );
        }
    }

    Ok(out)
}

fn list_posts(out: &mut String, site: &Site, kind: PostKind) -> Result<()> {
    let posts: Vec<&Post> = site.posts(kind).iter().collect();
    writeln!(out, "{} ({}):", kind.label(), posts.len())?;
    for post in posts {
        writeln!(
            out,
            "  {} - {} ({}) [{}]",
            iso_date(&post.date),
            post.title,
            post.slug,
            post.source
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn site() -> (tempfile::TempDir, Site) {
        let dir = tempfile::tempdir().unwrap();
        let posts = dir.path().join("source/_posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(
            posts.join("a.md"),
            "---\ntitle: A\ndate: 2024-01-02\ntags: [rust, web]\n---\nA",
        )
        .unwrap();
        fs::write(
            posts.join("b.md"),
            "---\ntitle: B\ndate: 2024-01-01\ntags: [rust]\n---\nB",
        )
        .unwrap();
        let folio = Folio::new(dir.path()).unwrap();
        let site = Site::load(&folio).unwrap();
        (dir, site)
    }

    #[test]
    fn test_list_posts_and_tags() {
        let (_dir, site) = site();

        let posts = render(&site, "posts").unwrap();
        assert!(posts.starts_with("Blog (2):\n"));
        assert!(posts.contains("2024-01-02 - A (a) [_posts/a.md]"));

        let tags = render(&site, "tags").unwrap();
        assert_eq!(tags, "Tags (2):\n  rust (2)\n  web (1)\n");
    }

    #[test]
    fn test_list_routes() {
        let (_dir, site) = site();
        let routes = render(&site, "routes").unwrap();
        assert!(routes.contains("  /blog/a/\n"));
        assert!(routes.contains("  /blog/tags/web/\n"));
        assert!(routes.contains("  /contact/\n"));
    }

    #[test]
    fn test_unknown_type() {
        let (_dir, site) = site();
        assert!(render(&site, "categories").is_err());
    }
}
