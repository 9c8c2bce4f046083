//! Light/dark palettes and their color tokens

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The binary theme selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// The other theme
    pub fn flipped(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(anyhow::anyhow!("Unknown theme: {}", other)),
        }
    }
}

/// Named color tokens resolved from a theme
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub background: &'static str,
    pub surface: &'static str,
    pub primary: &'static str,
    pub secondary: &'static str,
    pub accent: &'static str,
    pub text: &'static str,
    pub text_secondary: &'static str,
    pub border: &'static str,
}

const LIGHT: Palette = Palette {
    background: "#fafaf9",
    surface: "#ffffff",
    primary: "#1d4ed8",
    secondary: "#64748b",
    accent: "#f59e0b",
    text: "#1c1917",
    text_secondary: "#57534e",
    border: "#e7e5e4",
};

const DARK: Palette = Palette {
    background: "#0c0a09",
    surface: "#1c1917",
    primary: "#60a5fa",
    secondary: "#94a3b8",
    accent: "#fbbf24",
    text: "#f5f5f4",
    text_secondary: "#a8a29e",
    border: "#292524",
};

impl Palette {
    pub fn for_theme(theme: Theme) -> &'static Palette {
        match theme {
            Theme::Light => &LIGHT,
            Theme::Dark => &DARK,
        }
    }

    /// Token name/value pairs in a stable order
    pub fn tokens(&self) -> [(&'static str, &'static str); 8] {
        [
            ("background", self.background),
            ("surface", self.surface),
            ("primary", self.primary),
            ("secondary", self.secondary),
            ("accent", self.accent),
            ("text", self.text),
            ("text-secondary", self.text_secondary),
            ("border", self.border),
        ]
    }

    fn css_block(&self, selector: &str) -> String {
        let mut css = format!("{} {{\n", selector);
        for (name, value) in self.tokens() {
            css.push_str(&format!("  --color-{}: {};\n", name, value));
        }
        css.push_str("}\n");
        css
    }
}

/// CSS custom properties for both palettes.
///
/// `default` decides which palette applies before the client script has set
/// `data-theme` on the root element.
pub fn palette_css(default: Theme) -> String {
    let mut css = String::new();
    css.push_str(&Palette::for_theme(default).css_block(":root"));
    css.push_str(&Palette::for_theme(Theme::Light).css_block(":root[data-theme=\"light\"]"));
    css.push_str(&Palette::for_theme(Theme::Dark).css_block(":root[data-theme=\"dark\"]"));
    css
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_theme() {
        assert_eq!(Theme::Light.flipped(), Theme::Dark);
        assert_eq!(Theme::Dark.flipped().flipped(), Theme::Dark);
    }

    #[test]
    fn test_parse_theme() {
        assert_eq!("Dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!(" light ".parse::<Theme>().unwrap(), Theme::Light);
        assert!("sepia".parse::<Theme>().is_err());
    }

    #[test]
    fn test_palettes_differ() {
        let light = Palette::for_theme(Theme::Light);
        let dark = Palette::for_theme(Theme::Dark);
        assert_ne!(light.background, dark.background);
        assert_eq!(light.tokens().len(), 8);
    }

    #[test]
    fn test_palette_css_contains_both_themes() {
        let css = palette_css(Theme::Dark);
        assert!(css.starts_with(":root {\n  --color-background: #0c0a09;"));
        assert!(css.contains(":root[data-theme=\"light\"]"));
        assert!(css.contains("--color-text-secondary: #a8a29e;"));
    }
}
