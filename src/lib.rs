//! folio: a personal portfolio site generator
//!
//! Builds a static portfolio (home, about, projects, gallery, blog,
//! journal and contact pages) from markdown sources, with a light/dark
//! palette and a dev server that drives page transitions.

pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod routes;
pub mod server;
pub mod templates;
pub mod theme;
pub mod transition;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use theme::{ambient_from_env, FilePreferenceStore, ThemeProvider};

/// The main folio application
#[derive(Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Source directory
    pub source_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Active color theme, shared by everything rendering pages
    pub theme: ThemeProvider,
}

impl Folio {
    /// Create a folio from a site directory.
    ///
    /// The theme starts from the configured default, then the saved
    /// preference or the ambient color scheme wins.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config = config::SiteConfig::discover(&base_dir)?;

        let store = FilePreferenceStore::new(base_dir.join(&config.theme.preference_file));
        let theme = ThemeProvider::new(config.theme.default, Arc::new(store));
        theme.reconcile(ambient_from_env());

        let source_dir = base_dir.join(&config.source_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Ok(Self {
            config,
            base_dir,
            source_dir,
            public_dir,
            theme,
        })
    }

    /// Initialize a new site
    pub fn init(&self) -> Result<()> {
        commands::init::run(self)
    }

    /// Generate the static site
    pub fn generate(&self) -> Result<()> {
        commands::generate::run(self)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Create a new blog post, journal entry or project
    pub fn new_entry(&self, title: &str, kind: &str) -> Result<PathBuf> {
        commands::new::create_entry(self, title, kind, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;
    use std::fs;

    #[test]
    fn test_new_uses_config_dirs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("_config.yml"),
            "title: Jane\nsource_dir: content\npublic_dir: dist\n",
        )
        .unwrap();

        let folio = Folio::new(dir.path()).unwrap();
        assert_eq!(folio.config.title, "Jane");
        assert_eq!(folio.source_dir, dir.path().join("content"));
        assert_eq!(folio.public_dir, dir.path().join("dist"));
    }

    #[test]
    fn test_saved_preference_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".folio")).unwrap();
        fs::write(
            dir.path().join(".folio/preferences.json"),
            r#"{"theme": "dark"}"#,
        )
        .unwrap();

        let folio = Folio::new(dir.path()).unwrap();
        assert_eq!(folio.theme.current(), Theme::Dark);
    }
}
