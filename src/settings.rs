//! Settings document model and normalization
//!
//! The persisted document is a flat JSON object. Typed values are derived from
//! it through [`normalize`], which is the only place stored values are parsed
//! and coerced. Coerced values are reported back as a patch so the caller can
//! write the healed values through to the store.

use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;

/// Raw settings document: a flat JSON mapping
pub type Document = Map<String, Value>;

/// Maximum number of countries a filter may select
pub const MAX_COUNTRIES: usize = 5;

/// Minimum number of palette colors (one per selectable country)
pub const MIN_PALETTE_COLORS: usize = MAX_COUNTRIES;

/// Default fixed palette, one color per selectable country
pub const DEFAULT_PALETTE: [&str; 5] = ["#e41a1c", "#ff7f00", "#377eb8", "#4daf4a", "#984ea3"];

/// Document keys
pub mod keys {
    pub const THEME: &str = "theme";
    pub const LINE_TEMPLATE: &str = "line_chart_template";
    pub const MAP_TEMPLATE: &str = "map_chart_template";
    pub const PALETTE_MODE: &str = "palette_mode";
    pub const PALETTE_COLORS: &str = "palette_colors";
    pub const FILTER_COUNTRIES: &str = "filter_countries";
    pub const FILTER_YEAR_RANGE: &str = "filter_year_range";

    /// The display-preference keys always present after a write
    pub const DISPLAY: [&str; 5] = [THEME, LINE_TEMPLATE, MAP_TEMPLATE, PALETTE_MODE, PALETTE_COLORS];
}

/// Key names written by the older wholesale-save scheme
mod legacy_keys {
    pub const THEME: &str = "app_theme";
    pub const LINE_TEMPLATE: &str = "line_template";
    pub const MAP_TEMPLATE: &str = "map_template";
    pub const PALETTE_COLORS: &str = "palette_fixed";
}

/// Application color scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Theme {
    #[default]
    DarkBlue,
    DarkGreen,
    /// Legacy, coerced to [`Theme::DarkBlue`]
    Light,
    /// Legacy, coerced to [`Theme::DarkBlue`]
    Dark,
}

impl Theme {
    /// Schemes offered by the settings page
    pub const CURRENT: [Theme; 2] = [Theme::DarkBlue, Theme::DarkGreen];

    pub fn name(self) -> &'static str {
        match self {
            Theme::DarkBlue => "Dark Blue",
            Theme::DarkGreen => "Dark Green",
            Theme::Light => "Light",
            Theme::Dark => "Dark",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Dark Blue" => Some(Theme::DarkBlue),
            "Dark Green" => Some(Theme::DarkGreen),
            "Light" => Some(Theme::Light),
            "Dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn is_current(self) -> bool {
        Self::CURRENT.contains(&self)
    }

    /// Map legacy schemes onto the primary default
    pub fn normalized(self) -> Self {
        if self.is_current() {
            self
        } else {
            Theme::default()
        }
    }
}

/// Rendering template for a chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChartTemplate {
    #[default]
    Plotly,
    PlotlyDark,
    Ggplot2,
    Seaborn,
    SimpleWhite,
    Presentation,
}

impl ChartTemplate {
    pub const ALL: [ChartTemplate; 6] = [
        ChartTemplate::Plotly,
        ChartTemplate::PlotlyDark,
        ChartTemplate::Ggplot2,
        ChartTemplate::Seaborn,
        ChartTemplate::SimpleWhite,
        ChartTemplate::Presentation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ChartTemplate::Plotly => "plotly",
            ChartTemplate::PlotlyDark => "plotly_dark",
            ChartTemplate::Ggplot2 => "ggplot2",
            ChartTemplate::Seaborn => "seaborn",
            ChartTemplate::SimpleWhite => "simple_white",
            ChartTemplate::Presentation => "presentation",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

/// Color assignment strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PaletteMode {
    #[default]
    Fixed,
    Random,
}

impl PaletteMode {
    pub fn name(self) -> &'static str {
        match self {
            PaletteMode::Fixed => "Fixed",
            PaletteMode::Random => "Random",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Fixed" => Some(PaletteMode::Fixed),
            "Random" => Some(PaletteMode::Random),
            _ => None,
        }
    }
}

macro_rules! named_enum_impls {
    ($($ty:ident),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.name())
                }
            }

            impl FromStr for $ty {
                type Err = String;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    $ty::from_name(s).ok_or_else(|| format!("unknown {}: '{}'", stringify!($ty), s))
                }
            }
        )*
    };
}

named_enum_impls!(Theme, ChartTemplate, PaletteMode);

/// Inclusive year range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// Intersect with `bounds`. The result is empty when the ranges do not overlap.
    pub fn clamp_to(self, bounds: YearRange) -> YearRange {
        YearRange {
            start: self.start.max(bounds.start),
            end: self.end.min(bounds.end),
        }
    }

    pub fn is_empty(self) -> bool {
        self.start > self.end
    }

    pub fn contains(self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }

    fn to_value(self) -> Value {
        json!([self.start, self.end])
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value.as_array()?.as_slice() {
            [start, end] => Some(YearRange {
                start: i32::try_from(start.as_i64()?).ok()?,
                end: i32::try_from(end.as_i64()?).ok()?,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Display preferences edited on the settings page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayPrefs {
    pub theme: Theme,
    pub line_template: ChartTemplate,
    pub map_template: ChartTemplate,
    pub palette_mode: PaletteMode,
    pub palette_colors: Vec<String>,
}

impl Default for DisplayPrefs {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            line_template: ChartTemplate::default(),
            map_template: ChartTemplate::default(),
            palette_mode: PaletteMode::default(),
            palette_colors: default_palette(),
        }
    }
}

impl DisplayPrefs {
    /// Patch holding the four controls of the settings page
    pub fn controls_patch(&self) -> Document {
        let mut patch = Document::new();
        patch.insert(keys::THEME.into(), self.theme.name().into());
        patch.insert(keys::LINE_TEMPLATE.into(), self.line_template.name().into());
        patch.insert(keys::MAP_TEMPLATE.into(), self.map_template.name().into());
        patch.insert(keys::PALETTE_MODE.into(), self.palette_mode.name().into());
        patch
    }

    /// Patch holding every display-preference key
    pub fn to_patch(&self) -> Document {
        let mut patch = self.controls_patch();
        patch.insert(keys::PALETTE_COLORS.into(), json!(self.palette_colors));
        patch
    }
}

/// Last committed filter selection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SavedFilters {
    pub countries: Option<Vec<String>>,
    pub year_range: Option<YearRange>,
}

impl SavedFilters {
    /// Patch holding exactly the two filter keys
    pub fn to_patch(&self) -> Document {
        let mut patch = Document::new();
        if let Some(countries) = &self.countries {
            patch.insert(keys::FILTER_COUNTRIES.into(), json!(countries));
        }
        if let Some(range) = self.year_range {
            patch.insert(keys::FILTER_YEAR_RANGE.into(), range.to_value());
        }
        patch
    }
}

/// Typed view of a settings document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Settings {
    pub prefs: DisplayPrefs,
    pub filters: SavedFilters,
}

/// Result of [`normalize`]
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub settings: Settings,
    /// Keys whose stored value was coerced or migrated, with the healed value
    pub patch: Document,
}

pub fn default_palette() -> Vec<String> {
    DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
}

/// Display-preference defaults as a document
pub fn display_defaults() -> Document {
    DisplayPrefs::default().to_patch()
}

/// Check for a `#rrggbb` color
pub fn is_valid_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Derive typed settings from a raw document.
///
/// Absent keys take their defaults and are not reported. Present values that
/// are unrecognized or legacy are coerced and reported in the patch.
pub fn normalize(doc: &Document) -> Normalized {
    let mut patch = Document::new();

    let theme = resolve_key(
        doc,
        &mut patch,
        keys::THEME,
        Some(legacy_keys::THEME),
        |v| v.as_str().and_then(Theme::from_name).map(Theme::normalized),
        |t| t.name().into(),
        Theme::default(),
    );
    let line_template = resolve_key(
        doc,
        &mut patch,
        keys::LINE_TEMPLATE,
        Some(legacy_keys::LINE_TEMPLATE),
        |v| v.as_str().and_then(ChartTemplate::from_name),
        |t| t.name().into(),
        ChartTemplate::default(),
    );
    let map_template = resolve_key(
        doc,
        &mut patch,
        keys::MAP_TEMPLATE,
        Some(legacy_keys::MAP_TEMPLATE),
        |v| v.as_str().and_then(ChartTemplate::from_name),
        |t| t.name().into(),
        ChartTemplate::default(),
    );
    let palette_mode = resolve_key(
        doc,
        &mut patch,
        keys::PALETTE_MODE,
        None,
        |v| v.as_str().and_then(PaletteMode::from_name),
        |m| m.name().into(),
        PaletteMode::default(),
    );
    let palette_colors = resolve_key(
        doc,
        &mut patch,
        keys::PALETTE_COLORS,
        Some(legacy_keys::PALETTE_COLORS),
        read_palette,
        |colors| json!(colors),
        default_palette(),
    );

    let filters = SavedFilters {
        countries: doc.get(keys::FILTER_COUNTRIES).and_then(read_countries),
        year_range: doc.get(keys::FILTER_YEAR_RANGE).and_then(YearRange::from_value),
    };

    Normalized {
        settings: Settings {
            prefs: DisplayPrefs {
                theme,
                line_template,
                map_template,
                palette_mode,
                palette_colors,
            },
            filters,
        },
        patch,
    }
}

fn lookup<'a>(doc: &'a Document, key: &str, legacy_key: Option<&str>) -> Option<(&'a Value, bool)> {
    match doc.get(key) {
        Some(value) => Some((value, false)),
        None => legacy_key.and_then(|k| doc.get(k)).map(|value| (value, true)),
    }
}

fn resolve_key<T>(
    doc: &Document,
    patch: &mut Document,
    key: &str,
    legacy_key: Option<&str>,
    read: impl Fn(&Value) -> Option<T>,
    write: impl Fn(&T) -> Value,
    fallback: T,
) -> T {
    let Some((stored, from_legacy)) = lookup(doc, key, legacy_key) else {
        return fallback;
    };

    let resolved = read(stored).unwrap_or(fallback);
    let canonical = write(&resolved);
    if from_legacy || &canonical != stored {
        tracing::info!(key, stored = %stored, healed = %canonical, "Coerced stored setting");
        patch.insert(key.to_string(), canonical);
    }
    resolved
}

fn read_palette(value: &Value) -> Option<Vec<String>> {
    let colors: Vec<String> = value
        .as_array()?
        .iter()
        .map(|c| c.as_str().filter(|s| is_valid_hex_color(s)).map(str::to_string))
        .collect::<Option<_>>()?;
    (colors.len() >= MIN_PALETTE_COLORS).then_some(colors)
}

fn read_countries(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|c| c.as_str().map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_empty_document_yields_defaults_without_patch() {
        let normalized = normalize(&Document::new());
        assert_eq!(normalized.settings, Settings::default());
        assert!(normalized.patch.is_empty());
    }

    #[test]
    fn test_legacy_theme_is_coerced_and_reported() {
        let normalized = normalize(&doc(json!({ "theme": "Light" })));
        assert_eq!(normalized.settings.prefs.theme, Theme::DarkBlue);
        assert_eq!(normalized.patch.get("theme"), Some(&json!("Dark Blue")));
    }

    #[test]
    fn test_current_values_produce_no_patch() {
        let normalized = normalize(&doc(json!({
            "theme": "Dark Green",
            "line_chart_template": "seaborn",
            "map_chart_template": "plotly_dark",
            "palette_mode": "Random",
            "palette_colors": DEFAULT_PALETTE,
        })));
        let prefs = &normalized.settings.prefs;
        assert_eq!(prefs.theme, Theme::DarkGreen);
        assert_eq!(prefs.line_template, ChartTemplate::Seaborn);
        assert_eq!(prefs.map_template, ChartTemplate::PlotlyDark);
        assert_eq!(prefs.palette_mode, PaletteMode::Random);
        assert!(normalized.patch.is_empty());
    }

    #[test]
    fn test_unknown_enum_values_fall_back() {
        let normalized = normalize(&doc(json!({
            "line_chart_template": "neon",
            "palette_mode": 3,
        })));
        assert_eq!(normalized.settings.prefs.line_template, ChartTemplate::Plotly);
        assert_eq!(normalized.settings.prefs.palette_mode, PaletteMode::Fixed);
        assert_eq!(normalized.patch.get("line_chart_template"), Some(&json!("plotly")));
        assert_eq!(normalized.patch.get("palette_mode"), Some(&json!("Fixed")));
    }

    #[test]
    fn test_short_or_invalid_palette_is_replaced() {
        let normalized = normalize(&doc(json!({ "palette_colors": ["#000000", "red"] })));
        assert_eq!(normalized.settings.prefs.palette_colors, default_palette());
        assert!(normalized.patch.contains_key("palette_colors"));
    }

    #[test]
    fn test_legacy_keys_are_migrated() {
        let normalized = normalize(&doc(json!({
            "app_theme": "Dark Green",
            "line_template": "ggplot2",
        })));
        assert_eq!(normalized.settings.prefs.theme, Theme::DarkGreen);
        assert_eq!(normalized.settings.prefs.line_template, ChartTemplate::Ggplot2);
        assert_eq!(normalized.patch.get("theme"), Some(&json!("Dark Green")));
        assert_eq!(normalized.patch.get("line_chart_template"), Some(&json!("ggplot2")));
    }

    #[test]
    fn test_filters_are_read_and_malformed_ones_ignored() {
        let normalized = normalize(&doc(json!({
            "filter_countries": ["Japan", "Chile"],
            "filter_year_range": [1990, 2010],
        })));
        let filters = &normalized.settings.filters;
        assert_eq!(filters.countries, Some(vec!["Japan".to_string(), "Chile".to_string()]));
        assert_eq!(filters.year_range, Some(YearRange::new(1990, 2010)));

        let malformed = normalize(&doc(json!({
            "filter_countries": null,
            "filter_year_range": [1990],
        })));
        assert_eq!(malformed.settings.filters, SavedFilters::default());
        assert!(malformed.patch.is_empty());
    }

    #[test]
    fn test_clamp_intersects_bounds() {
        let bounds = YearRange::new(1960, 2023);
        assert_eq!(YearRange::new(1950, 2030).clamp_to(bounds), YearRange::new(1960, 2023));
        assert_eq!(YearRange::new(1990, 2000).clamp_to(bounds), YearRange::new(1990, 2000));
        assert!(YearRange::new(1900, 1950).clamp_to(bounds).is_empty());
    }

    #[test]
    fn test_filter_patch_only_contains_filter_keys() {
        let filters = SavedFilters {
            countries: Some(vec!["Japan".to_string()]),
            year_range: Some(YearRange::new(2000, 2020)),
        };
        let patch = filters.to_patch();
        assert_eq!(patch.len(), 2);
        assert_eq!(patch.get("filter_year_range"), Some(&json!([2000, 2020])));
    }
}
