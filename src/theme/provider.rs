//! Theme provider - the owned light/dark state cell
//!
//! The provider is built once per application and handed to whatever needs
//! the theme. Readers either take a snapshot with [`ThemeProvider::current`]
//! or follow changes through [`ThemeProvider::subscribe`]. The only writes
//! are [`ThemeProvider::toggle`] and [`ThemeProvider::reconcile`].

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

use super::palette::{Palette, Theme};

/// Preference key inside the persisted document
const THEME_KEY: &str = "theme";

/// Environment variable read as the ambient light/dark signal
pub const AMBIENT_ENV: &str = "FOLIO_COLOR_SCHEME";

/// Persistent storage for the theme preference
pub trait PreferenceStore: Send + Sync {
    /// Read the saved preference, `None` when nothing was saved
    fn load(&self) -> Result<Option<Theme>>;

    /// Save the preference
    fn save(&self, theme: Theme) -> Result<()>;
}

/// Stores the preference in a small JSON document on disk
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read_document(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        if !self.path.exists() {
            return Ok(serde_json::Map::new());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load(&self) -> Result<Option<Theme>> {
        let document = self.read_document()?;
        match document.get(THEME_KEY) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    fn save(&self, theme: Theme) -> Result<()> {
        // Keep unrelated keys intact
        let mut document = self.read_document().unwrap_or_default();
        document.insert(THEME_KEY.to_string(), serde_json::to_value(theme)?);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&document)?)?;
        Ok(())
    }
}

/// Session-only storage
#[derive(Default)]
pub struct MemoryPreferenceStore {
    value: Mutex<Option<Theme>>,
}

impl MemoryPreferenceStore {
    pub fn with_value(theme: Theme) -> Self {
        Self {
            value: Mutex::new(Some(theme)),
        }
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self) -> Result<Option<Theme>> {
        let value = self
            .value
            .lock()
            .map_err(|_| anyhow::anyhow!("preference lock poisoned"))?;
        Ok(*value)
    }

    fn save(&self, theme: Theme) -> Result<()> {
        let mut value = self
            .value
            .lock()
            .map_err(|_| anyhow::anyhow!("preference lock poisoned"))?;
        *value = Some(theme);
        Ok(())
    }
}

/// Owned, injectable light/dark state
#[derive(Clone)]
pub struct ThemeProvider {
    tx: Arc<watch::Sender<Theme>>,
    store: Arc<dyn PreferenceStore>,
}

impl ThemeProvider {
    /// Create a provider starting at `initial`
    pub fn new(initial: Theme, store: Arc<dyn PreferenceStore>) -> Self {
        let (tx, _) = watch::channel(initial);
        Self {
            tx: Arc::new(tx),
            store,
        }
    }

    /// Provider that never touches disk
    pub fn in_memory(initial: Theme) -> Self {
        Self::new(initial, Arc::new(MemoryPreferenceStore::default()))
    }

    pub fn current(&self) -> Theme {
        *self.tx.borrow()
    }

    pub fn palette(&self) -> &'static Palette {
        Palette::for_theme(self.current())
    }

    /// Follow theme changes
    pub fn subscribe(&self) -> watch::Receiver<Theme> {
        self.tx.subscribe()
    }

    /// Flip the theme and persist it.
    ///
    /// A failed save is logged and the new value stays in memory.
    pub fn toggle(&self) -> Theme {
        let next = self.current().flipped();
        self.tx.send_replace(next);
        if let Err(e) = self.store.save(next) {
            tracing::warn!("Failed to persist theme preference: {}", e);
        }
        tracing::debug!("Theme toggled to {}", next);
        next
    }

    /// Replace the initial value with the persisted preference, or with the
    /// ambient signal when nothing was saved. Keeps the current value when
    /// neither is available.
    pub fn reconcile(&self, ambient: Option<Theme>) -> Theme {
        let saved = match self.store.load() {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!("Failed to read theme preference: {}", e);
                None
            }
        };

        if let Some(theme) = saved.or(ambient) {
            self.tx.send_if_modified(|current| {
                let changed = *current != theme;
                *current = theme;
                changed
            });
        }
        self.current()
    }
}

/// Read the ambient light/dark signal from the environment
pub fn ambient_from_env() -> Option<Theme> {
    std::env::var(AMBIENT_ENV).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenStore;

    impl PreferenceStore for BrokenStore {
        fn load(&self) -> Result<Option<Theme>> {
            anyhow::bail!("storage unavailable")
        }

        fn save(&self, _theme: Theme) -> Result<()> {
            anyhow::bail!("storage unavailable")
        }
    }

    #[test]
    fn test_toggle_flips_and_persists() {
        let store = Arc::new(MemoryPreferenceStore::default());
        let provider = ThemeProvider::new(Theme::Light, store.clone());

        assert_eq!(provider.toggle(), Theme::Dark);
        assert_eq!(provider.current(), Theme::Dark);
        assert_eq!(store.load().unwrap(), Some(Theme::Dark));

        assert_eq!(provider.toggle(), Theme::Light);
        assert_eq!(store.load().unwrap(), Some(Theme::Light));
    }

    #[test]
    fn test_reconcile_prefers_saved_value() {
        let store = Arc::new(MemoryPreferenceStore::with_value(Theme::Dark));
        let provider = ThemeProvider::new(Theme::Light, store);
        assert_eq!(provider.reconcile(Some(Theme::Light)), Theme::Dark);
    }

    #[test]
    fn test_reconcile_falls_back_to_ambient() {
        let provider = ThemeProvider::in_memory(Theme::Light);
        assert_eq!(provider.reconcile(Some(Theme::Dark)), Theme::Dark);
    }

    #[test]
    fn test_reconcile_keeps_default_without_signals() {
        let provider = ThemeProvider::in_memory(Theme::Light);
        assert_eq!(provider.reconcile(None), Theme::Light);
    }

    #[test]
    fn test_broken_store_is_not_fatal() {
        let provider = ThemeProvider::new(Theme::Light, Arc::new(BrokenStore));
        assert_eq!(provider.reconcile(Some(Theme::Dark)), Theme::Dark);
        assert_eq!(provider.toggle(), Theme::Light);
        assert_eq!(provider.current(), Theme::Light);
    }

    #[test]
    fn test_subscribers_see_toggles() {
        let provider = ThemeProvider::in_memory(Theme::Light);
        let mut rx = provider.subscribe();
        assert!(!rx.has_changed().unwrap());

        provider.toggle();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Theme::Dark);
    }

    #[test]
    fn test_palette_follows_theme() {
        let provider = ThemeProvider::in_memory(Theme::Dark);
        assert_eq!(provider.palette(), Palette::for_theme(Theme::Dark));
    }

    #[test]
    fn test_file_store_round_trip_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".folio/preferences.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{"layout": "wide"}"#).unwrap();

        let store = FilePreferenceStore::new(&path);
        assert_eq!(store.load().unwrap(), None);

        store.save(Theme::Dark).unwrap();
        assert_eq!(store.load().unwrap(), Some(Theme::Dark));

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"layout\": \"wide\""));
        assert!(raw.contains("\"theme\": \"dark\""));
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePreferenceStore::new(dir.path().join("nope.json"));
        assert_eq!(store.load().unwrap(), None);
    }
}
