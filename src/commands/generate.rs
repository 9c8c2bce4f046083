//! Generate static files

use anyhow::Result;
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use crate::generator::Generator;
use crate::routes::Site;
use crate::Folio;

/// Quiet period before a batch of file changes triggers a rebuild
const DEBOUNCE: Duration = Duration::from_millis(500);

/// Generate the static site
pub fn run(folio: &Folio) -> Result<()> {
    build(folio, false).map(|_| ())
}

/// Load content and write the site, returning what was loaded.
///
/// `live` makes the client runtime follow the dev server's transitions.
pub fn build(folio: &Folio, live: bool) -> Result<Site> {
    let start = Instant::now();

    let site = Site::load(folio)?;
    Generator::new(folio)?.live(live).generate(&site)?;

    tracing::info!(
        "Generated in {:.2}s ({} theme)",
        start.elapsed().as_secs_f64(),
        folio.theme.current()
    );
    Ok(site)
}

/// Watch for file changes and regenerate. Blocks until the watcher stops.
pub fn watch(folio: &Folio) -> Result<()> {
    tracing::info!("Watching for changes. Press Ctrl+C to stop.");
    watch_changes(folio, || run(folio))
}

/// Paths that trigger a rebuild: the source tree and any config file
fn watch_targets(folio: &Folio) -> Vec<(PathBuf, RecursiveMode)> {
    let mut targets = Vec::new();
    if folio.source_dir.exists() {
        targets.push((folio.source_dir.clone(), RecursiveMode::Recursive));
    }
    for name in ["_config.yml", "_config.yaml", "_config.toml"] {
        let config_path = folio.base_dir.join(name);
        if config_path.exists() {
            targets.push((config_path, RecursiveMode::NonRecursive));
        }
    }
    targets
}

/// Call `on_change` after each debounced batch of relevant changes.
///
/// Blocks the calling thread until the watcher's channel closes. A failing
/// `on_change` is logged and watching continues.
pub fn watch_changes<F>(folio: &Folio, mut on_change: F) -> Result<()>
where
    F: FnMut() -> Result<()>,
{
    let (tx, rx) = channel();

    // Create debouncer to avoid multiple rapid rebuilds
    let mut debouncer = new_debouncer(DEBOUNCE, tx)?;
    for (path, mode) in watch_targets(folio) {
        debouncer.watcher().watch(&path, mode)?;
        tracing::debug!("Watching: {:?}", path);
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant: Vec<_> = events
                    .iter()
                    .filter(|e| is_relevant_change(&e.path))
                    .collect();

                if relevant.is_empty() {
                    continue;
                }

                for event in &relevant {
                    tracing::info!("File changed: {}", event.path.display());
                }

                match on_change() {
                    Ok(()) => tracing::info!("Regenerated successfully"),
                    Err(e) => tracing::error!("Generation failed: {:#}", e),
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Editor droppings and VCS noise do not trigger a rebuild
fn is_relevant_change(path: &Path) -> bool {
    let path_str = path.to_string_lossy();
    !path_str.contains(".git")
        && !path_str.contains(".DS_Store")
        && !path_str.ends_with('~')
        && !path_str.ends_with(".swp")
}
