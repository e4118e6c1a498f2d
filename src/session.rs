//! Session State - Single Source of Truth (SSOT) for one user session
//!
//! Holds the committed settings (last values written to the store) and the
//! live values bound to the interactive controls. Handlers receive this
//! context explicitly; nothing here is global.

use crate::error::StoreError;
use crate::settings::{normalize, DisplayPrefs, SavedFilters, YearRange};
use crate::store::SettingsStore;

/// Values last committed to the settings store
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Committed {
    pub prefs: DisplayPrefs,
    pub filters: SavedFilters,
}

/// Live values bound to the controls
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UiState {
    pub prefs: DisplayPrefs,
    pub countries: Vec<String>,
    pub year_range: Option<YearRange>,
    /// Set once the filter controls were seeded this session
    pub filters_seeded: bool,
    /// Bumped whenever controls must be rebuilt from state
    pub generation: u64,
}

/// Whether a handler changed state behind the controls' backs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rerender {
    /// Controls already show the new values
    None,
    /// Controls must be rebuilt from state
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    pub committed: Committed,
    pub ui: UiState,
    initialized: bool,
}

impl SessionState {
    /// Fresh, not yet seeded session
    pub fn new() -> Self {
        Self::default()
    }

    /// New session seeded from the store
    pub fn seeded(store: &SettingsStore) -> Result<Self, StoreError> {
        let mut session = Self::new();
        session.init(store)?;
        Ok(session)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Invalidate the rendered controls after a programmatic state change
    pub fn request_rerender(&mut self) -> Rerender {
        self.ui.generation += 1;
        Rerender::Full
    }

    /// Seed from the store once per session. Later calls are no-ops, so
    /// values changed during the session are never overwritten.
    ///
    /// Stored values that normalization had to coerce are written back.
    pub fn init(&mut self, store: &SettingsStore) -> Result<(), StoreError> {
        if self.initialized {
            tracing::debug!("Session already initialized, skipping seed");
            return Ok(());
        }

        let doc = store.load()?;
        let normalized = normalize(&doc);
        if !normalized.patch.is_empty() {
            tracing::info!(
                "Healing {} stored settings in {:?}",
                normalized.patch.len(),
                store.path()
            );
            store.save(&normalized.patch)?;
        }

        let settings = normalized.settings;
        self.ui.prefs = settings.prefs.clone();
        self.committed = Committed {
            prefs: settings.prefs,
            filters: settings.filters,
        };
        self.initialized = true;
        tracing::debug!(committed = ?self.committed, "Session initialized");
        Ok(())
    }
}
