//! Filter controller - country and year range selection
//!
//! Reconciles the saved filters with the live controls. Saved values are
//! checked against the data source before they reach a control: unknown
//! countries are dropped and year ranges are intersected with the data's
//! bounds. Every change is committed straight to the settings store.

use crate::data::DataSource;
use crate::error::StoreError;
use crate::session::{Rerender, SessionState};
use crate::settings::{SavedFilters, YearRange, MAX_COUNTRIES};
use crate::store::SettingsStore;

/// Fallbacks used when no usable saved filter exists
#[derive(Debug, Clone)]
pub struct FilterDefaults {
    /// Preferred initial country; the first available one is used if absent from the data
    pub country: Option<String>,
    /// Lower end of the initial year range
    pub start_year: i32,
}

impl Default for FilterDefaults {
    fn default() -> Self {
        Self {
            country: Some("Indonesia".to_string()),
            start_year: 2000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterController {
    categories: Vec<String>,
    bounds: Option<YearRange>,
    defaults: FilterDefaults,
}

impl FilterController {
    pub fn new<D: DataSource + ?Sized>(source: &D, defaults: FilterDefaults) -> Self {
        Self {
            categories: source.categories(),
            bounds: source.year_bounds(),
            defaults,
        }
    }

    /// Countries offered by the selector
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Year bounds of the data source
    pub fn bounds(&self) -> Option<YearRange> {
        self.bounds
    }

    pub fn default_countries(&self) -> Vec<String> {
        let preferred = self
            .defaults
            .country
            .as_ref()
            .filter(|c| self.categories.contains(c));
        preferred
            .or_else(|| self.categories.first())
            .map(|c| vec![c.clone()])
            .unwrap_or_default()
    }

    /// Full data span narrowed to the default start year
    pub fn default_range(&self) -> Option<YearRange> {
        let bounds = self.bounds?;
        let narrowed = YearRange::new(self.defaults.start_year, bounds.end).clamp_to(bounds);
        Some(if narrowed.is_empty() { bounds } else { narrowed })
    }

    /// Intersect `range` with the data bounds; `None` when nothing overlaps
    pub fn clamp(&self, range: YearRange) -> Option<YearRange> {
        let clamped = range.clamp_to(self.bounds?);
        if clamped != range {
            tracing::info!("Clamped year range {} to {}", range, clamped);
        }
        (!clamped.is_empty()).then_some(clamped)
    }

    /// Seed the controls on the first visit of the session
    pub fn seed(&self, session: &mut SessionState) {
        if session.ui.filters_seeded {
            return;
        }

        let saved = &session.committed.filters;
        let mut countries = saved
            .countries
            .as_deref()
            .map(|c| self.known_countries(c))
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| self.default_countries());
        if countries.len() > MAX_COUNTRIES {
            tracing::warn!(
                "{} saved countries, seeding the first {}",
                countries.len(),
                MAX_COUNTRIES
            );
            countries.truncate(MAX_COUNTRIES);
        }
        let year_range = saved
            .year_range
            .and_then(|r| self.clamp(r))
            .or_else(|| self.default_range());

        tracing::debug!(?countries, ?year_range, "Seeded filter controls");
        session.ui.countries = countries;
        session.ui.year_range = year_range;
        session.ui.filters_seeded = true;
    }

    /// Apply new control values and commit them
    pub fn on_change(
        &self,
        session: &mut SessionState,
        store: &SettingsStore,
        countries: Vec<String>,
        year_range: YearRange,
    ) -> Result<Rerender, StoreError> {
        self.seed(session);

        let mut selected = self.known_countries(&countries);
        if selected.len() > MAX_COUNTRIES {
            tracing::warn!(
                "{} countries selected, keeping the first {}",
                selected.len(),
                MAX_COUNTRIES
            );
            selected.truncate(MAX_COUNTRIES);
        }
        let countries_changed = selected.len() != countries.len();

        session.ui.countries = selected;
        match self.clamp(year_range) {
            Some(range) => session.ui.year_range = Some(range),
            None => tracing::warn!(
                "Ignoring year range {}: inverted or outside the data, keeping {:?}",
                year_range,
                session.ui.year_range
            ),
        }
        // The controls must not keep showing a value the state does not hold
        let range_changed = session.ui.year_range != Some(year_range);
        let rerender = if countries_changed || range_changed {
            Rerender::Full
        } else {
            Rerender::None
        };
        self.commit(session, store)?;

        Ok(match rerender {
            Rerender::Full => session.request_rerender(),
            Rerender::None => Rerender::None,
        })
    }

    /// Restore the default filters, commit them and rebuild the controls
    pub fn reset(
        &self,
        session: &mut SessionState,
        store: &SettingsStore,
    ) -> Result<Rerender, StoreError> {
        session.ui.countries = self.default_countries();
        session.ui.year_range = self.default_range();
        session.ui.filters_seeded = true;
        self.commit(session, store)?;
        tracing::info!("Filters reset to defaults");
        Ok(session.request_rerender())
    }

    /// Copy the live filter values to the committed ones and persist exactly those keys
    pub fn commit(&self, session: &mut SessionState, store: &SettingsStore) -> Result<(), StoreError> {
        let filters = SavedFilters {
            countries: Some(session.ui.countries.clone()),
            year_range: session.ui.year_range,
        };
        store.save(&filters.to_patch())?;
        tracing::debug!(?filters, "Committed filters");
        session.committed.filters = filters;
        Ok(())
    }

    fn known_countries(&self, countries: &[String]) -> Vec<String> {
        let mut known: Vec<String> = Vec::with_capacity(countries.len());
        for country in countries {
            if !self.categories.contains(country) {
                tracing::warn!("Ignoring unknown country '{}'", country);
            } else if !known.contains(country) {
                known.push(country.clone());
            }
        }
        known
    }
}
