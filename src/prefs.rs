//! Display preference handlers for the settings page
//!
//! Any control change commits all four control values together, after
//! passing them through the same normalization used at load time.

use crate::error::StoreError;
use crate::session::{Rerender, SessionState};
use crate::settings::{normalize, ChartTemplate, DisplayPrefs, PaletteMode, Theme};
use crate::store::SettingsStore;

/// A settings page control reporting a new value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefChange {
    Theme(Theme),
    LineTemplate(ChartTemplate),
    MapTemplate(ChartTemplate),
    PaletteMode(PaletteMode),
}

/// Apply a control change and commit
pub fn on_change(
    session: &mut SessionState,
    store: &SettingsStore,
    change: PrefChange,
) -> Result<Rerender, StoreError> {
    let ui = &mut session.ui.prefs;
    match change {
        PrefChange::Theme(theme) => ui.theme = theme,
        PrefChange::LineTemplate(template) => ui.line_template = template,
        PrefChange::MapTemplate(template) => ui.map_template = template,
        PrefChange::PaletteMode(mode) => ui.palette_mode = mode,
    }
    commit(session, store)
}

/// Copy the four control values to the committed preferences and persist them
pub fn commit(session: &mut SessionState, store: &SettingsStore) -> Result<Rerender, StoreError> {
    let normalized = normalize(&session.ui.prefs.controls_patch());
    let coerced = !normalized.patch.is_empty();

    copy_controls(&mut session.ui.prefs, &normalized.settings.prefs);
    copy_controls(&mut session.committed.prefs, &normalized.settings.prefs);
    store.save(&session.committed.prefs.controls_patch())?;
    tracing::debug!(prefs = ?session.committed.prefs, "Committed display preferences");

    // A coerced value is not what the control shows
    Ok(if coerced {
        session.request_rerender()
    } else {
        Rerender::None
    })
}

fn copy_controls(target: &mut DisplayPrefs, source: &DisplayPrefs) {
    target.theme = source.theme;
    target.line_template = source.line_template;
    target.map_template = source.map_template;
    target.palette_mode = source.palette_mode;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::keys;
    use serde_json::json;

    fn setup() -> (tempfile::TempDir, SettingsStore, SessionState) {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::in_dir(dir.path());
        let session = SessionState::seeded(&store).unwrap();
        (dir, store, session)
    }

    #[test]
    fn test_change_writes_all_four_controls() {
        let (_dir, store, mut session) = setup();
        session.ui.prefs.map_template = ChartTemplate::Seaborn;

        let rerender = on_change(
            &mut session,
            &store,
            PrefChange::LineTemplate(ChartTemplate::Ggplot2),
        )
        .unwrap();

        assert_eq!(rerender, Rerender::None);
        assert_eq!(session.committed.prefs.line_template, ChartTemplate::Ggplot2);
        assert_eq!(session.committed.prefs.map_template, ChartTemplate::Seaborn);
        let doc = store.load().unwrap();
        assert_eq!(doc.get(keys::LINE_TEMPLATE), Some(&json!("ggplot2")));
        assert_eq!(doc.get(keys::MAP_TEMPLATE), Some(&json!("seaborn")));
        assert_eq!(doc.get(keys::THEME), Some(&json!("Dark Blue")));
        assert_eq!(doc.get(keys::PALETTE_MODE), Some(&json!("Fixed")));
    }

    #[test]
    fn test_legacy_theme_is_coerced_and_persisted() {
        let (_dir, store, mut session) = setup();

        let rerender = on_change(&mut session, &store, PrefChange::Theme(Theme::Light)).unwrap();

        assert_eq!(rerender, Rerender::Full);
        assert_eq!(session.committed.prefs.theme, Theme::DarkBlue);
        assert_eq!(session.ui.prefs.theme, Theme::DarkBlue);
        assert_eq!(store.load().unwrap().get(keys::THEME), Some(&json!("Dark Blue")));
    }

    #[test]
    fn test_change_keeps_filters_and_unknown_keys() {
        let (_dir, store, mut session) = setup();
        std::fs::write(
            store.path(),
            r#"{"filter_countries": ["Chile"], "filter_year_range": [2001, 2003], "layout": "wide"}"#,
        )
        .unwrap();

        on_change(&mut session, &store, PrefChange::PaletteMode(PaletteMode::Random)).unwrap();

        let doc = store.load().unwrap();
        assert_eq!(doc.get(keys::PALETTE_MODE), Some(&json!("Random")));
        assert_eq!(doc.get(keys::FILTER_COUNTRIES), Some(&json!(["Chile"])));
        assert_eq!(doc.get(keys::FILTER_YEAR_RANGE), Some(&json!([2001, 2003])));
        assert_eq!(doc.get("layout"), Some(&json!("wide")));
    }
}
