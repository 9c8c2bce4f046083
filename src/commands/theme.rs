//! Show or toggle the persisted color theme

use anyhow::Result;

use crate::theme::{Palette, Theme};
use crate::Folio;

/// Run `theme show` or `theme toggle`, returning the resulting theme
pub fn run(folio: &Folio, action: &str) -> Result<Theme> {
    let theme = match action {
        "show" => folio.theme.current(),
        "toggle" => {
            let theme = folio.theme.toggle();
            tracing::info!("Theme set to {}. Regenerate to apply it.", theme);
            theme
        }
        other => anyhow::bail!("Unknown action: {}. Available: show, toggle", other),
    };

    println!("{}", describe(theme));
    Ok(theme)
}

/// Theme name followed by its palette tokens
fn describe(theme: Theme) -> String {
    let mut lines = vec![format!("Theme: {}", theme)];
    lines.extend(
        Palette::for_theme(theme)
            .tokens()
            .iter()
            .map(|(name, value)| format!("  {:<15} {}", name, value)),
    );
    lines.join("\n")
}
