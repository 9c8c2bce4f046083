//! Site configuration (_config.yml or _config.toml)

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::theme::Theme;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub email: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub source_dir: String,
    pub public_dir: String,
    /// Glob patterns (relative to the source dir) that are never copied to public
    #[serde(default)]
    pub exclude: Vec<String>,

    // Listing
    pub per_page: usize,

    // Navigation and footer
    #[serde(default = "default_nav")]
    pub nav: Vec<NavItem>,
    #[serde(default)]
    pub social: Vec<SocialLink>,

    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub renderer: RendererConfig,
    #[serde(default)]
    pub transition: TransitionConfig,
    #[serde(default)]
    pub highlight: HighlightConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Folio".to_string(),
            subtitle: String::new(),
            description: String::new(),
            author: "John Doe".to_string(),
            email: String::new(),
            language: "en".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            source_dir: "source".to_string(),
            public_dir: "public".to_string(),
            exclude: Vec::new(),

            per_page: 10,

            nav: default_nav(),
            social: Vec::new(),

            theme: ThemeConfig::default(),
            renderer: RendererConfig::default(),
            transition: TransitionConfig::default(),
            highlight: HighlightConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file, picking the format by extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&content)
                .map_err(|e| anyhow!("Failed to parse {:?}: {}", path, e))?,
            _ => serde_yaml::from_str(&content)
                .map_err(|e| anyhow!("Failed to parse {:?}: {}", path, e))?,
        };
        Ok(config)
    }

    /// Locate and load the config in a site directory, falling back to defaults
    pub fn discover<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        for name in ["_config.yml", "_config.yaml", "_config.toml"] {
            let candidate = base_dir.join(name);
            if candidate.exists() {
                tracing::debug!("Loading config from {:?}", candidate);
                return Self::load(&candidate);
            }
        }
        tracing::debug!("No config file in {:?}, using defaults", base_dir);
        Ok(Self::default())
    }
}

/// A top navigation entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NavItem {
    pub name: String,
    pub path: String,
}

fn default_nav() -> Vec<NavItem> {
    [
        ("Home", "/"),
        ("About", "/about/"),
        ("Projects", "/projects/"),
        ("Gallery", "/gallery/"),
        ("Journal", "/journal/"),
        ("Blog", "/blog/"),
        ("Contact", "/contact/"),
    ]
    .into_iter()
    .map(|(name, path)| NavItem {
        name: name.to_string(),
        path: path.to_string(),
    })
    .collect()
}

/// A footer/contact social link
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SocialLink {
    pub name: String,
    pub url: String,
}

/// Theme settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Theme used for the first rendered output
    pub default: Theme,
    /// Where the CLI persists the preference, relative to the site directory
    pub preference_file: String,
    /// localStorage key used by the generated client script
    pub storage_key: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            default: Theme::Light,
            preference_file: ".folio/preferences.json".to_string(),
            storage_key: "folio-theme".to_string(),
        }
    }
}

/// Post-body renderer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Filename substrings that mark an embedded image as a logo
    pub logo_markers: Vec<String>,
    /// Caption appended below photographs
    pub photo_caption: String,
    /// Width of the white card around logos, in pixels
    pub logo_card_width: u32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            logo_markers: vec!["logo".to_string(), "badge".to_string()],
            photo_caption: "Photo taken by the author".to_string(),
            logo_card_width: 320,
        }
    }
}

/// Page-transition timings (milliseconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Minimum time the loading surface stays visible
    pub min_display_ms: u64,
    /// Delay between removing the loading surface and revealing content
    pub settle_delay_ms: u64,
    /// Duration of the reveal animation
    pub fade_duration_ms: u64,
    /// Fonts probed before a route is revealed, relative to public/
    #[serde(default)]
    pub fonts: Vec<String>,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            min_display_ms: 800,
            settle_delay_ms: 100,
            fade_duration_ms: 600,
            fonts: Vec::new(),
        }
    }
}

impl TransitionConfig {
    pub fn min_display(&self) -> Duration {
        Duration::from_millis(self.min_display_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.fade_duration_ms)
    }
}

/// Code highlighting for standalone pages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub line_number: bool,
    /// syntect theme name
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            line_number: true,
            theme: "base16-ocean.dark".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "Folio");
        assert_eq!(config.theme.default, Theme::Light);
        assert_eq!(config.per_page, 10);
        assert_eq!(config.nav.len(), 7);
        assert_eq!(config.renderer.logo_markers, vec!["logo", "badge"]);
    }

    #[test]
    fn test_parse_yaml_config() {
        let yaml = r#"
title: Jane's Portfolio
author: Jane
per_page: 5
theme:
  default: dark
transition:
  min_display_ms: 1200
  fonts:
    - fonts/inter.woff2
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "Jane's Portfolio");
        assert_eq!(config.per_page, 5);
        assert_eq!(config.theme.default, Theme::Dark);
        assert_eq!(config.theme.storage_key, "folio-theme");
        assert_eq!(config.transition.min_display(), Duration::from_millis(1200));
        assert_eq!(config.transition.settle_delay_ms, 100);
        assert_eq!(config.transition.fonts, vec!["fonts/inter.woff2"]);
    }

    #[test]
    fn test_discover_toml_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("_config.toml"),
            "title = \"Toml Site\"\n[renderer]\nphoto_caption = \"Shot on film\"\n",
        )
        .unwrap();

        let config = SiteConfig::discover(dir.path()).unwrap();
        assert_eq!(config.title, "Toml Site");
        assert_eq!(config.renderer.photo_caption, "Shot on film");
    }

    #[test]
    fn test_discover_without_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = SiteConfig::discover(dir.path()).unwrap();
        assert_eq!(config.title, "Folio");
    }
}
