//! Inflation table - wide World Bank CSV reshaped to long rows
//!
//! The source file has one row per country and one column per year. Rows are
//! reshaped to `(country, year, inflation)` on load; empty or non-numeric
//! cells are dropped.

use serde::Serialize;
use std::collections::BTreeSet;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::DataError;
use crate::palette::ColorMap;
use crate::settings::YearRange;

pub const COUNTRY_COLUMN: &str = "Country Name";

/// Map group for countries outside the selection
pub const OTHER_GROUP: &str = "Other";
pub const OTHER_COLOR: &str = "#DDDDDD";

/// One (country, year) observation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    #[serde(rename = "Country Name")]
    pub country: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Inflation")]
    pub inflation: f64,
}

/// What the filter controller needs from a tabular source
pub trait DataSource {
    /// Distinct categories, sorted
    fn categories(&self) -> Vec<String>;

    /// Smallest and largest year present
    fn year_bounds(&self) -> Option<YearRange>;

    /// Rows for `categories` within `range`, sorted by category then year
    fn filter(&self, categories: &[String], range: YearRange) -> Vec<Observation>;
}

#[derive(Debug, Clone, Default)]
pub struct InflationTable {
    rows: Vec<Observation>,
}

impl InflationTable {
    pub fn from_rows(rows: Vec<Observation>) -> Self {
        Self { rows }
    }

    /// Load a wide CSV file
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let file = std::fs::File::open(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_wide_csv(file)?;
        tracing::info!(
            "Loaded {} observations for {} countries from {:?}",
            table.rows.len(),
            table.categories().len(),
            path
        );
        Ok(table)
    }

    /// Reshape a wide CSV (country column + one column per year) into rows
    pub fn from_wide_csv<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = rdr.headers()?.clone();

        let country_idx = headers
            .iter()
            .position(|h| h.trim() == COUNTRY_COLUMN)
            .ok_or_else(|| DataError::MissingColumn(COUNTRY_COLUMN.to_string()))?;

        let year_columns: Vec<(usize, i32)> = headers
            .iter()
            .enumerate()
            .filter_map(|(idx, header)| {
                let header = header.trim();
                if header.is_empty() || !header.chars().all(|c| c.is_ascii_digit()) {
                    return None;
                }
                header.parse().ok().map(|year| (idx, year))
            })
            .collect();
        tracing::debug!("Found {} year columns", year_columns.len());

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let Some(country) = record.get(country_idx).map(str::trim).filter(|c| !c.is_empty())
            else {
                continue;
            };

            for &(idx, year) in &year_columns {
                let value = record
                    .get(idx)
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .and_then(|v| v.parse::<f64>().ok());
                if let Some(inflation) = value {
                    rows.push(Observation {
                        country: country.to_string(),
                        year,
                        inflation,
                    });
                }
            }
        }

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    /// All rows for a single year
    pub fn rows_in_year(&self, year: i32) -> Vec<&Observation> {
        self.rows.iter().filter(|r| r.year == year).collect()
    }
}

impl DataSource for InflationTable {
    fn categories(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| r.country.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn year_bounds(&self) -> Option<YearRange> {
        let min = self.rows.iter().map(|r| r.year).min()?;
        let max = self.rows.iter().map(|r| r.year).max()?;
        Some(YearRange::new(min, max))
    }

    fn filter(&self, categories: &[String], range: YearRange) -> Vec<Observation> {
        let mut out: Vec<Observation> = self
            .rows
            .iter()
            .filter(|r| categories.contains(&r.country) && range.contains(r.year))
            .cloned()
            .collect();
        out.sort_by(|a, b| a.country.cmp(&b.country).then(a.year.cmp(&b.year)));
        out
    }
}

/// Latest value for one selected country
#[derive(Debug, Clone, PartialEq)]
pub struct LatestValue {
    pub country: String,
    /// `(year, inflation)` of the most recent row in range
    pub latest: Option<(i32, f64)>,
    /// Change from the previous row in range, in percentage points
    pub delta: Option<f64>,
}

/// Per-country latest value and change, in selection order
pub fn latest_summary(rows: &[Observation], countries: &[String]) -> Vec<LatestValue> {
    countries
        .iter()
        .map(|country| {
            let mut series: Vec<&Observation> =
                rows.iter().filter(|r| &r.country == country).collect();
            series.sort_by_key(|r| r.year);

            let latest = series.last().map(|r| (r.year, r.inflation));
            let delta = match series.as_slice() {
                [.., prev, last] => Some(last.inflation - prev.inflation),
                _ => None,
            };
            LatestValue {
                country: country.clone(),
                latest,
                delta,
            }
        })
        .collect()
}

/// Highlight group for one country on the map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEntry {
    pub country: String,
    pub group: String,
    pub color: String,
}

/// Label every country in `year` with its own group if selected, `Other` otherwise
pub fn map_groups(table: &InflationTable, year: i32, colors: &ColorMap) -> Vec<MapEntry> {
    table
        .rows_in_year(year)
        .into_iter()
        .map(|row| match colors.get(&row.country) {
            Some(color) => MapEntry {
                country: row.country.clone(),
                group: row.country.clone(),
                color: color.clone(),
            },
            None => MapEntry {
                country: row.country.clone(),
                group: OTHER_GROUP.to_string(),
                color: OTHER_COLOR.to_string(),
            },
        })
        .collect()
}

/// Write rows as CSV with a header line
pub fn write_csv<W: Write>(rows: &[Observation], writer: W) -> Result<(), DataError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Country Name,Country Code,1999,2000,2001,2002
Japan,JPN,-0.3,-0.7,-0.8,
\"Korea, Rep.\",KOR,0.8,2.3,4.1,2.8
Chile,CHL,3.3,3.8,n/a,2.5
";

    fn table() -> InflationTable {
        InflationTable::from_wide_csv(SAMPLE.as_bytes()).unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_reshape_drops_missing_values() {
        let table = table();
        assert_eq!(table.rows().len(), 3 + 4 + 3);
        assert_eq!(
            table.categories(),
            names(&["Chile", "Japan", "Korea, Rep."])
        );
        assert_eq!(table.year_bounds(), Some(YearRange::new(1999, 2002)));
    }

    #[test]
    fn test_missing_country_column() {
        let result = InflationTable::from_wide_csv("Name,2000\nJapan,1.0\n".as_bytes());
        assert!(matches!(result, Err(DataError::MissingColumn(_))));
    }

    #[test]
    fn test_filter_is_sorted_and_bounded() {
        let rows = table().filter(&names(&["Japan", "Chile"]), YearRange::new(2000, 2002));
        let keys: Vec<_> = rows.iter().map(|r| (r.country.as_str(), r.year)).collect();
        assert_eq!(
            keys,
            vec![("Chile", 2000), ("Chile", 2002), ("Japan", 2000), ("Japan", 2001)]
        );
    }

    #[test]
    fn test_empty_selection_filters_nothing() {
        assert!(table().filter(&[], YearRange::new(1999, 2002)).is_empty());
    }

    #[test]
    fn test_latest_summary_uses_last_two_rows() {
        let table = table();
        let selection = names(&["Korea, Rep.", "Japan"]);
        let rows = table.filter(&selection, YearRange::new(1999, 2002));

        let summary = latest_summary(&rows, &selection);

        assert_eq!(summary[0].country, "Korea, Rep.");
        assert_eq!(summary[0].latest, Some((2002, 2.8)));
        assert!((summary[0].delta.unwrap() - (2.8 - 4.1)).abs() < 1e-9);
        assert_eq!(summary[1].latest, Some((2001, -0.8)));
    }

    #[test]
    fn test_latest_summary_single_row_has_no_delta() {
        let table = table();
        let selection = names(&["Japan"]);
        let rows = table.filter(&selection, YearRange::new(2001, 2001));

        let summary = latest_summary(&rows, &selection);

        assert_eq!(summary[0].latest, Some((2001, -0.8)));
        assert_eq!(summary[0].delta, None);
    }

    #[test]
    fn test_map_groups_highlight_selection() {
        let mut colors = ColorMap::new();
        colors.insert("Japan".to_string(), "#e41a1c".to_string());

        let entries = map_groups(&table(), 2000, &colors);

        assert_eq!(entries.len(), 3);
        let japan = entries.iter().find(|e| e.country == "Japan").unwrap();
        assert_eq!(japan.group, "Japan");
        assert_eq!(japan.color, "#e41a1c");
        let chile = entries.iter().find(|e| e.country == "Chile").unwrap();
        assert_eq!(chile.group, OTHER_GROUP);
        assert_eq!(chile.color, OTHER_COLOR);
    }

    #[test]
    fn test_write_csv_has_header() {
        let rows = table().filter(&names(&["Japan"]), YearRange::new(1999, 1999));
        let mut out = Vec::new();
        write_csv(&rows, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Country Name,Year,Inflation\nJapan,1999,-0.3\n"
        );
    }
}
