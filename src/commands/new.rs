//! Create a new blog post, journal entry or project

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::content::PostKind;
use crate::Folio;

/// Create a new entry of `kind` (`post`, `journal` or `project`).
///
/// The file name is the slugified title unless `path` is given.
pub fn create_entry(folio: &Folio, title: &str, kind: &str, path: Option<&str>) -> Result<PathBuf> {
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    // JSON strings are valid YAML scalars, so titles with `:` survive
    let title_yaml = serde_json::to_string(title)?;

    let (dir, front_matter) = match kind {
        "post" | "blog" => (
            PostKind::Blog.source_dir(),
            format!("---\ntitle: {}\ndate: {}\ntags: []\n---\n", title_yaml, today),
        ),
        "journal" => (
            PostKind::Journal.source_dir(),
            format!("---\ntitle: {}\ndate: {}\n---\n", title_yaml, today),
        ),
        "project" => (
            "_projects",
            format!(
                "---\ntitle: {}\ndate: {}\nsummary:\ntech: []\nlink:\nrepo:\n---\n",
                title_yaml, today
            ),
        ),
        other => anyhow::bail!(
            "Unknown kind: {}. Available: post, journal, project",
            other
        ),
    };

    let name = match path {
        Some(p) => p.trim_end_matches(".md").to_string(),
        None => slug::slugify(title),
    };
    if name.is_empty() {
        anyhow::bail!("Cannot derive a file name from title {:?}", title);
    }

    let target_dir = folio.source_dir.join(dir);
    fs::create_dir_all(&target_dir)?;

    let file_path = target_dir.join(format!("{}.md", name));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    fs::write(&file_path, front_matter)?;
    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::loader::ContentLoader;

    #[test]
    fn test_create_entries() {
        let dir = tempfile::tempdir().unwrap();
        let folio = Folio::new(dir.path()).unwrap();

        let post = create_entry(&folio, "Hello, World!", "post", None).unwrap();
        assert_eq!(post, folio.source_dir.join("_posts/hello-world.md"));

        let entry = create_entry(&folio, "Rainy day", "journal", None).unwrap();
        assert!(entry.ends_with("_journal/rainy-day.md"));

        let project = create_entry(&folio, "Robot", "project", Some("robot-arm")).unwrap();
        assert!(project.ends_with("_projects/robot-arm.md"));

        let loader = ContentLoader::new(&folio);
        let posts = loader.load_posts(PostKind::Blog).unwrap();
        assert_eq!(posts[0].title, "Hello, World!");
        assert_eq!(loader.load_projects().unwrap()[0].slug, "robot-arm");
    }

    #[test]
    fn test_create_entry_errors() {
        let dir = tempfile::tempdir().unwrap();
        let folio = Folio::new(dir.path()).unwrap();

        create_entry(&folio, "Twice", "post", None).unwrap();
        assert!(create_entry(&folio, "Twice", "post", None).is_err());
        assert!(create_entry(&folio, "Nope", "page", None).is_err());
        assert!(create_entry(&folio, "!!!", "post", None).is_err());
    }
}
