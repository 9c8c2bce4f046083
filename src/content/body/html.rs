//! Markup for parsed body blocks

use super::{parse_body, Block, ImageBlock, ImageKind, Inline, StyleContext};
use crate::helpers::{encode_path, html_escape, root_join};

const IMAGE_WIDTH: u32 = 800;
const IMAGE_HEIGHT: u32 = 600;

/// Parse and render a body in one step
pub fn render_body(body: &str, style: &StyleContext<'_>) -> String {
    render_html(&parse_body(body, style), style)
}

/// Render blocks to HTML
pub fn render_html(blocks: &[Block], style: &StyleContext<'_>) -> String {
    let mut html = String::new();
    for block in blocks {
        render_block(&mut html, block, style);
        html.push('\n');
    }
    html
}

/// A palette color as a CSS variable, with the rendered palette's value as
/// fallback. The page's `data-theme` picks the variable's value.
fn token(name: &str, value: &str) -> String {
    format!("var(--color-{},{})", name, value)
}

fn render_block(out: &mut String, block: &Block, style: &StyleContext<'_>) {
    let palette = style.palette;
    let text = token("text", palette.text);
    match block {
        Block::Heading { level, content } => {
            out.push_str(&format!(
                r#"<h{level} class="post-heading" style="color:{}">"#,
                text
            ));
            render_inline(out, content, style);
            out.push_str(&format!("</h{level}>"));
        }
        Block::Paragraph { content } => {
            out.push_str(&format!(
                r#"<p class="post-paragraph" style="color:{};line-height:1.75">"#,
                text
            ));
            render_inline(out, content, style);
            out.push_str("</p>");
        }
        Block::List { items } => {
            out.push_str(&format!(
                r#"<ul class="post-list" style="color:{}">"#,
                text
            ));
            for item in items {
                out.push_str("<li>");
                render_inline(out, item, style);
                out.push_str("</li>");
            }
            out.push_str("</ul>");
        }
        Block::Image(image) => render_image(out, image, style),
        Block::Break => out.push_str("<br>"),
    }
}

fn render_inline(out: &mut String, nodes: &[Inline], style: &StyleContext<'_>) {
    let palette = style.palette;
    for node in nodes {
        match node {
            Inline::Text(text) => out.push_str(&html_escape(text)),
            Inline::Bold(text) => out.push_str(&format!(
                r#"<strong style="font-weight:600;color:inherit">{}</strong>"#,
                html_escape(text)
            )),
            Inline::Code(text) => out.push_str(&format!(
                concat!(
                    r#"<code style="font-family:ui-monospace,SFMono-Regular,Menlo,monospace;"#,
                    r#"padding:0.125rem 0.375rem;border-radius:4px;color:{};background:{}">{}</code>"#
                ),
                token("primary", palette.primary),
                token("border", palette.border),
                html_escape(text)
            )),
        }
    }
}

fn render_image(out: &mut String, image: &ImageBlock, style: &StyleContext<'_>) {
    let src = html_escape(&encode_path(&root_join(style.root, &image.path)));
    let alt = html_escape(&alt_text(&image.path));

    let tag = match image.kind {
        ImageKind::Raw => format!(
            concat!(
                r#"<img class="post-image post-image-raw" src="{}" alt="{}" "#,
                r#"style="max-width:100%;height:auto" "#,
                r#"onerror="console.error('Failed to load image:', this.src);this.style.display='none'">"#
            ),
            src, alt
        ),
        ImageKind::Optimized => format!(
            concat!(
                r#"<img class="post-image" src="{}" alt="{}" width="{}" height="{}" "#,
                r#"loading="lazy" decoding="async" style="width:100%;height:auto" "#,
                r#"onerror="console.error('Failed to load image:', this.src)">"#
            ),
            src, alt, IMAGE_WIDTH, IMAGE_HEIGHT
        ),
    };

    if image.kind == ImageKind::Raw {
        out.push_str(&format!(r#"<div class="post-image-wrap">{}</div>"#, tag));
    } else if image.is_logo {
        out.push_str(&format!(
            concat!(
                r#"<div class="logo-card" style="width:{}px;max-width:100%;margin:2rem auto;"#,
                r#"padding:1.5rem;background:#ffffff;border:1px solid {};border-radius:12px;"#,
                r#"box-shadow:0 4px 14px rgba(0,0,0,0.08)">{}</div>"#
            ),
            style.renderer.logo_card_width,
            token("border", style.palette.border),
            tag
        ));
    } else if image.is_photo {
        out.push_str(&format!(
            concat!(
                r#"<figure class="post-figure">{}"#,
                r#"<figcaption style="color:{};font-size:0.875rem;text-align:center">{}</figcaption></figure>"#
            ),
            tag,
            token("text-secondary", style.palette.text_secondary),
            html_escape(&style.renderer.photo_caption)
        ));
    } else {
        out.push_str(&format!(r#"<div class="post-image-wrap">{}</div>"#, tag));
    }
}

/// Readable alt text from the file stem
fn alt_text(path: &str) -> String {
    let filename = path.rsplit('/').next().unwrap_or(path);
    let stem = filename.rsplit_once('.').map_or(filename, |(stem, _)| stem);
    stem.replace(['-', '_'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RendererConfig;
    use crate::theme::{Palette, Theme};

    fn render(body: &str) -> String {
        let renderer = RendererConfig::default();
        let style = StyleContext {
            palette: Palette::for_theme(Theme::Light),
            renderer: &renderer,
            root: "/",
        };
        render_body(body, &style)
    }

    #[test]
    fn test_render_blocks() {
        let html = render("# Title\nHello **world**\n- one\n- two");
        assert!(html.contains("<h2 class=\"post-heading\""));
        assert!(html.contains(">Title</h2>"));
        assert!(html.contains("Hello <strong style=\"font-weight:600;color:inherit\">world</strong></p>"));
        assert!(html.contains("<li>one</li><li>two</li></ul>"));
    }

    #[test]
    fn test_code_uses_primary_and_border_tokens() {
        let palette = Palette::for_theme(Theme::Light);
        let html = render("run `make`");
        assert!(html.contains(&format!(
            "color:var(--color-primary,{});background:var(--color-border,{})",
            palette.primary, palette.border
        )));
        assert!(html.contains(">make</code>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let html = render("<script>alert(1)</script> & `<b>`");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&amp;"));
        assert!(html.contains(">&lt;b&gt;</code>"));
    }

    #[test]
    fn test_svg_renders_raw_tag_that_hides_on_error() {
        let html = render("![IMAGE:/x/y.svg]");
        assert!(html.contains("post-image-raw"));
        assert!(html.contains("this.style.display='none'"));
        assert!(!html.contains("width=\"800\""));
        assert!(!html.contains("<figcaption"));
    }

    #[test]
    fn test_photo_gets_caption() {
        let html = render("![IMAGE:/images/sunset-beach.jpg]");
        assert!(html.contains("width=\"800\" height=\"600\""));
        assert!(html.contains("alt=\"sunset beach\""));
        assert!(html.contains("<figcaption"));
        assert!(html.contains("Photo taken by the author"));
        assert!(!html.contains("display='none'"));
    }

    #[test]
    fn test_logo_is_wrapped_in_card() {
        let html = render("![IMAGE:/images/acme-logo.png]");
        assert!(html.contains("class=\"logo-card\""));
        assert!(html.contains("width:320px"));
        assert!(!html.contains("<figcaption"));
    }

    #[test]
    fn test_logo_card_stays_white_in_both_themes() {
        let renderer = RendererConfig::default();
        for theme in [Theme::Light, Theme::Dark] {
            let style = StyleContext {
                palette: Palette::for_theme(theme),
                renderer: &renderer,
                root: "/",
            };
            let html = render_body("![IMAGE:/images/acme-logo.png]", &style);
            assert!(html.contains("background:#ffffff;"), "{}", html);
        }
    }

    #[test]
    fn test_body_colors_follow_theme_variables() {
        let palette = Palette::for_theme(Theme::Light);
        let html = render("# Title\ntext\n- item\n![IMAGE:/images/acme-logo.png]\n![IMAGE:/p.jpg]");

        // Every palette color is behind a variable, so switching `data-theme`
        // recolors the body without touching inline styles. The logo card's
        // white is fixed.
        let html = html.replace("background:#ffffff", "");
        for (name, value) in palette.tokens() {
            let bare = html.matches(value).count();
            let wrapped = html.matches(&format!("var(--color-{},{})", name, value)).count();
            assert_eq!(bare, wrapped, "{} is used outside its variable", name);
        }
        assert!(html.contains("color:var(--color-text,"));
        assert!(html.contains("color:var(--color-text-secondary,"));
    }

    #[test]
    fn test_image_paths_are_encoded_and_rooted() {
        let renderer = RendererConfig::default();
        let style = StyleContext {
            palette: Palette::for_theme(Theme::Dark),
            renderer: &renderer,
            root: "/site/",
        };
        let html = render_body("![IMAGE:/images/my photo.jpg]", &style);
        assert!(html.contains("src=\"/site/images/my%20photo.jpg\""));
    }

    #[test]
    fn test_breaks() {
        assert_eq!(render("a\n\nb").matches("<br>").count(), 1);
    }

    #[test]
    fn test_alt_text() {
        assert_eq!(alt_text("/a/b/my_cool-pic.jpeg"), "my cool pic");
        assert_eq!(alt_text("noext"), "noext");
    }
}
