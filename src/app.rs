//! Dashboard - one session's store, state and data, driven by events
//!
//! Each user action is one [`Event`] handled synchronously through
//! `&mut self`, so handlers never overlap within a session.

use crate::data::{latest_summary, map_groups, DataSource, InflationTable, LatestValue, MapEntry, Observation};
use crate::error::StoreError;
use crate::filter::{FilterController, FilterDefaults};
use crate::palette::{self, ColorMap};
use crate::prefs::{self, PrefChange};
use crate::session::{Rerender, SessionState};
use crate::settings::{ChartTemplate, Theme, YearRange};
use crate::store::SettingsStore;

/// A user action on one of the pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    FilterChanged {
        countries: Vec<String>,
        year_range: YearRange,
    },
    FilterReset,
    PreferenceChanged(PrefChange),
}

/// Everything a renderer needs for the filtering page
#[derive(Debug, Clone)]
pub struct View {
    pub theme: Theme,
    pub line_template: ChartTemplate,
    pub map_template: ChartTemplate,
    pub countries: Vec<String>,
    pub year_range: Option<YearRange>,
    pub rows: Vec<Observation>,
    pub colors: ColorMap,
    pub summary: Vec<LatestValue>,
    /// Year shown on the map: the upper end of the range
    pub map_year: Option<i32>,
    pub map: Vec<MapEntry>,
    /// Widget generation the view was built for
    pub generation: u64,
}

impl View {
    /// No country selected: nothing to plot
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

pub struct Dashboard {
    store: SettingsStore,
    session: SessionState,
    table: InflationTable,
    filters: FilterController,
}

impl Dashboard {
    /// Start a session: seed state from the store
    pub fn open(
        store: SettingsStore,
        table: InflationTable,
        defaults: FilterDefaults,
    ) -> Result<Self, StoreError> {
        let session = SessionState::seeded(&store)?;
        let filters = FilterController::new(&table, defaults);
        tracing::info!(
            "Dashboard session opened: {} countries, bounds {:?}",
            filters.categories().len(),
            filters.bounds()
        );
        Ok(Self {
            store,
            session,
            table,
            filters,
        })
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn filters(&self) -> &FilterController {
        &self.filters
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    /// Run the handler for one user action
    pub fn handle(&mut self, event: Event) -> Result<Rerender, StoreError> {
        tracing::debug!(?event, "Handling event");
        match event {
            Event::FilterChanged {
                countries,
                year_range,
            } => self
                .filters
                .on_change(&mut self.session, &self.store, countries, year_range),
            Event::FilterReset => self.filters.reset(&mut self.session, &self.store),
            Event::PreferenceChanged(change) => {
                prefs::on_change(&mut self.session, &self.store, change)
            }
        }
    }

    /// Build the filtering page, seeding its controls on first visit
    pub fn view(&mut self) -> View {
        self.filters.seed(&mut self.session);

        let ui = &self.session.ui;
        let prefs = &self.session.committed.prefs;
        let countries = ui.countries.clone();

        let rows = match ui.year_range {
            Some(range) => self.table.filter(&countries, range),
            None => Vec::new(),
        };
        let colors = palette::resolve(&countries, prefs.palette_mode, &prefs.palette_colors);
        let summary = latest_summary(&rows, &countries);
        let map_year = ui.year_range.map(|r| r.end);
        let map = map_year
            .map(|year| map_groups(&self.table, year, &colors))
            .unwrap_or_default();

        View {
            theme: prefs.theme,
            line_template: prefs.line_template,
            map_template: prefs.map_template,
            countries,
            year_range: ui.year_range,
            rows,
            colors,
            summary,
            map_year,
            map,
            generation: ui.generation,
        }
    }
}
