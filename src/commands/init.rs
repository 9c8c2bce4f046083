//! Initialize a new folio site

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::Folio;

const CONFIG_TEMPLATE: &str = r#"# Site
title: My Portfolio
subtitle: Developer, writer, photographer
description: Things I have built, written and seen.
author: Your Name
email: you@example.com
language: en

# URL
url: http://example.com
root: /

# Directory
source_dir: source
public_dir: public
exclude: []

# Listings
per_page: 10

social:
  - name: GitHub
    url: https://github.com/your-name

# Theme
theme:
  default: light
  preference_file: .folio/preferences.json
  storage_key: folio-theme

# Post bodies
renderer:
  logo_markers: [logo, badge]
  photo_caption: Photo taken by the author
  logo_card_width: 320

# Page transitions (milliseconds)
transition:
  min_display_ms: 800
  settle_delay_ms: 100
  fade_duration_ms: 600
  fonts: []

# Code blocks in standalone pages
highlight:
  enable: true
  line_number: false
  theme: InspiredGitHub
"#;

const ABOUT_PAGE: &str = r#"---
title: About
---

Hi, I'm **Your Name**. This page is plain markdown, so links, lists and
code blocks all work:

```rust
fn main() {
    println!("hello");
}
```
"#;

const CONTACT_PAGE: &str = r#"---
title: Contact
---

The fastest way to reach me is email.
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    if target_dir.join("_config.yml").exists() {
        anyhow::bail!("{:?} already contains a site", target_dir);
    }

    for dir in ["_posts", "_journal", "_projects", "gallery", "images"] {
        fs::create_dir_all(target_dir.join("source").join(dir))?;
    }

    fs::write(target_dir.join("_config.yml"), CONFIG_TEMPLATE)?;
    fs::write(target_dir.join("source/about.md"), ABOUT_PAGE)?;
    fs::write(target_dir.join("source/contact.md"), CONTACT_PAGE)?;

    let today = chrono::Local::now().format("%Y-%m-%d");

    let sample_post = format!(
        r#"---
title: Hello World
date: {today}
tags: [meta]
excerpt: The first post on this site.
---
# Welcome
This is your first post. Bodies support a small set of markup:
- lines starting with `- ` become lists
- **bold** and `code` spans work inside any line

## Images
![IMAGE:/images/example.jpg]
"#
    );
    fs::write(target_dir.join("source/_posts/hello-world.md"), sample_post)?;

    let sample_entry = format!(
        r#"---
title: Day One
date: {today}
---
Started a journal. Entries use the same markup as blog posts.
"#
    );
    fs::write(target_dir.join("source/_journal/day-one.md"), sample_entry)?;

    let sample_project = format!(
        r#"---
title: This Site
date: {today}
summary: A portfolio generated with folio.
tech: [Rust]
---
Describe the project here.
"#
    );
    fs::write(
        target_dir.join("source/_projects/this-site.md"),
        sample_project,
    )?;

    Ok(())
}

/// Run the init command with an existing folio instance
pub fn run(folio: &Folio) -> Result<()> {
    init_site(&folio.base_dir)
}
