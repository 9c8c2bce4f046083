//! Theme module - palettes and the light/dark provider

mod palette;
mod provider;

pub use palette::{palette_css, Palette, Theme};
pub use provider::{
    ambient_from_env, FilePreferenceStore, MemoryPreferenceStore, PreferenceStore, ThemeProvider,
    AMBIENT_ENV,
};
