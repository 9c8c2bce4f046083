//! Post body renderer
//!
//! Post, journal and project bodies use a small line-oriented dialect rather
//! than full CommonMark:
//!
//! - `![IMAGE:<path>]` embeds an image
//! - `# `, `## `, `### ` start headings (rendered as `h2`..`h4`)
//! - `- ` starts a list item; consecutive items form one list
//! - a blank line separates blocks and renders as a line break
//! - anything else is a paragraph
//!
//! Any text line may contain `**bold**` and `` `code` `` spans.
//!
//! [`parse_body`] turns a body into [`Block`]s and [`render_html`] turns
//! blocks into markup. Both are pure.

mod html;
mod inline;

pub use html::{render_body, render_html};
pub use inline::{parse_inline, plain_text, Inline};

use serde::Serialize;

use crate::config::RendererConfig;
use crate::theme::Palette;

const IMAGE_PREFIX: &str = "![IMAGE:";

/// Styling inputs for rendering a body
#[derive(Debug, Clone, Copy)]
pub struct StyleContext<'a> {
    pub palette: &'a Palette,
    pub renderer: &'a RendererConfig,
    /// Site root prepended to absolute image paths
    pub root: &'a str,
}

/// How an embedded image is emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    /// Plain `<img>` tag, hidden when it fails to load
    Raw,
    /// Fixed 800x600 intrinsic size, scaled to the column width
    Optimized,
}

/// An image directive after classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageBlock {
    pub path: String,
    pub kind: ImageKind,
    pub is_logo: bool,
    pub is_photo: bool,
}

impl ImageBlock {
    /// Classify an image path.
    ///
    /// `.svg` files (any case) use the raw path. A filename containing one of
    /// the logo markers is a logo. Everything that is neither a logo nor an
    /// svg is a photo, so an svg never gets a caption.
    pub fn classify(path: &str, logo_markers: &[String]) -> Self {
        let is_svg = path.to_ascii_lowercase().ends_with(".svg");
        let filename = path.rsplit('/').next().unwrap_or(path);
        let is_logo = logo_markers
            .iter()
            .any(|marker| !marker.is_empty() && filename.contains(marker.as_str()));

        Self {
            path: path.to_string(),
            kind: if is_svg {
                ImageKind::Raw
            } else {
                ImageKind::Optimized
            },
            is_logo,
            is_photo: !is_logo && !is_svg,
        }
    }
}

/// One renderable unit of a body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    Heading { level: u8, content: Vec<Inline> },
    Paragraph { content: Vec<Inline> },
    List { items: Vec<Vec<Inline>> },
    Image(ImageBlock),
    Break,
}

/// Parse a body into blocks
pub fn parse_body(body: &str, style: &StyleContext<'_>) -> Vec<Block> {
    if body.is_empty() {
        return Vec::new();
    }

    let mut blocks = Vec::new();
    let mut pending_items: Vec<String> = Vec::new();

    for line in body.split('\n') {
        let trimmed = line.trim();

        if trimmed.starts_with(IMAGE_PREFIX) {
            flush_list(&mut blocks, &mut pending_items);
            match image_path(trimmed) {
                Some(path) => blocks.push(Block::Image(ImageBlock::classify(
                    path,
                    &style.renderer.logo_markers,
                ))),
                None => tracing::trace!("Dropping malformed image directive: {}", trimmed),
            }
        } else if let Some(rest) = trimmed.strip_prefix("# ") {
            flush_list(&mut blocks, &mut pending_items);
            blocks.push(heading(2, rest));
        } else if let Some(rest) = trimmed.strip_prefix("## ") {
            flush_list(&mut blocks, &mut pending_items);
            blocks.push(heading(3, rest));
        } else if let Some(rest) = trimmed.strip_prefix("### ") {
            flush_list(&mut blocks, &mut pending_items);
            blocks.push(heading(4, rest));
        } else if let Some(rest) = trimmed.strip_prefix("- ") {
            pending_items.push(rest.to_string());
        } else if trimmed.is_empty() {
            flush_list(&mut blocks, &mut pending_items);
            // Leading blank lines produce nothing
            if !blocks.is_empty() {
                blocks.push(Block::Break);
            }
        } else {
            flush_list(&mut blocks, &mut pending_items);
            blocks.push(Block::Paragraph {
                content: parse_inline(trimmed),
            });
        }
    }

    flush_list(&mut blocks, &mut pending_items);
    blocks
}

fn heading(level: u8, text: &str) -> Block {
    Block::Heading {
        level,
        content: parse_inline(text),
    }
}

fn flush_list(blocks: &mut Vec<Block>, pending_items: &mut Vec<String>) {
    if pending_items.is_empty() {
        return;
    }
    let items = pending_items.drain(..).map(|item| parse_inline(&item)).collect();
    blocks.push(Block::List { items });
}

/// Path between `IMAGE:` and the first `]`, if the directive has one
fn image_path(directive: &str) -> Option<&str> {
    let rest = &directive[IMAGE_PREFIX.len()..];
    let end = rest.find(']')?;
    let path = rest[..end].trim();
    if path.is_empty() {
        None
    } else {
        Some(path)
    }
}

/// Every image path referenced by a body, in order
pub fn image_paths(body: &str) -> Vec<String> {
    body.split('\n')
        .map(str::trim)
        .filter(|line| line.starts_with(IMAGE_PREFIX))
        .filter_map(image_path)
        .map(str::to_string)
        .collect()
}
