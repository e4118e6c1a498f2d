//! Inflation Dashboard - command line front end
//!
//! CLI commands:
//! - show: Print the committed settings and filters
//! - view: Print the filtered data, colors and latest values
//! - filter / reset-filters: Change or reset the saved filters
//! - theme / template / palette: Change display preferences
//! - export: Write the filtered rows to CSV

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use inflation_dash::app::{Dashboard, Event, View};
use inflation_dash::config::{Config, Overrides};
use inflation_dash::data::{write_csv, InflationTable};
use inflation_dash::logging;
use inflation_dash::prefs::PrefChange;
use inflation_dash::settings::{ChartTemplate, PaletteMode, Theme, YearRange};

#[derive(Parser)]
#[command(name = "inflation_dash")]
#[command(about = "World inflation (CPI) dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to dashboard.yaml config
    #[arg(short, long, default_value = "dashboard.yaml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the committed settings and filters
    Show,

    /// Print the filtered data summary
    View,

    /// Select countries and a year range
    Filter {
        /// Country to include (repeat up to 5 times)
        #[arg(long = "country")]
        countries: Vec<String>,

        /// First year of the range
        #[arg(long)]
        from: Option<i32>,

        /// Last year of the range
        #[arg(long)]
        to: Option<i32>,
    },

    /// Restore the default filters
    ResetFilters,

    /// Set the application theme ("Dark Blue" or "Dark Green")
    Theme { theme: Theme },

    /// Set chart rendering templates
    Template {
        #[arg(long)]
        line: Option<ChartTemplate>,

        #[arg(long)]
        map: Option<ChartTemplate>,
    },

    /// Set the palette mode (Fixed or Random)
    Palette { mode: PaletteMode },

    /// Export the filtered rows as CSV
    Export {
        #[arg(short, long, default_value = "inflasi_terfilter.csv")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load_or_default(&cli.config)?.with_overrides(Overrides::load());
    logging::init_logging(&config.log_dir)?;
    tracing::info!("Inflation dashboard starting up");
    tracing::debug!(?config, "Config loaded");

    let table = InflationTable::load(&config.data_path)?;
    // The application root is the directory holding the config file
    let root = match cli.config.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let store = config.settings_store(root);
    let mut dashboard = Dashboard::open(store, table, config.filter_defaults())?;

    match cli.command {
        Commands::Show => show(&dashboard),

        Commands::View => print_view(&dashboard.view()),

        Commands::Filter { countries, from, to } => {
            let current = dashboard.view();
            let countries = if countries.is_empty() { current.countries } else { countries };
            let Some(range) = current.year_range.or(dashboard.filters().bounds()) else {
                anyhow::bail!("Data file contains no observations");
            };
            let year_range = YearRange::new(from.unwrap_or(range.start), to.unwrap_or(range.end));
            dashboard.handle(Event::FilterChanged { countries, year_range })?;
            print_view(&dashboard.view());
        }

        Commands::ResetFilters => {
            dashboard.handle(Event::FilterReset)?;
            print_view(&dashboard.view());
        }

        Commands::Theme { theme } => {
            dashboard.handle(Event::PreferenceChanged(PrefChange::Theme(theme)))?;
            show(&dashboard);
        }

        Commands::Template { line, map } => {
            if line.is_none() && map.is_none() {
                println!("Specify --line and/or --map");
                return Ok(());
            }
            if let Some(template) = line {
                dashboard.handle(Event::PreferenceChanged(PrefChange::LineTemplate(template)))?;
            }
            if let Some(template) = map {
                dashboard.handle(Event::PreferenceChanged(PrefChange::MapTemplate(template)))?;
            }
            show(&dashboard);
        }

        Commands::Palette { mode } => {
            dashboard.handle(Event::PreferenceChanged(PrefChange::PaletteMode(mode)))?;
            show(&dashboard);
        }

        Commands::Export { out } => {
            let view = dashboard.view();
            let file = std::fs::File::create(&out)?;
            write_csv(&view.rows, file)?;
            println!("Wrote {} rows to {:?}", view.rows.len(), out);
        }
    }

    Ok(())
}

/// Print the committed settings
fn show(dashboard: &Dashboard) {
    let committed = &dashboard.session().committed;
    let prefs = &committed.prefs;

    println!("Settings file: {:?}", dashboard.store().path());
    println!("  theme:               {}", prefs.theme);
    println!("  line chart template: {}", prefs.line_template);
    println!("  map chart template:  {}", prefs.map_template);
    println!("  palette mode:        {}", prefs.palette_mode);
    println!("  palette colors:      {}", prefs.palette_colors.join(", "));
    match &committed.filters.countries {
        Some(countries) => println!("  filter countries:    {}", countries.join(", ")),
        None => println!("  filter countries:    (none saved)"),
    }
    match committed.filters.year_range {
        Some(range) => println!("  filter year range:   {}", range),
        None => println!("  filter year range:   (none saved)"),
    }
}

/// Print what the dashboard page would render
fn print_view(view: &View) {
    if view.is_empty() {
        println!("No countries selected. Select at least one country.");
        return;
    }
    if let Some(range) = view.year_range {
        println!("Inflation {} ({} rows)", range, view.rows.len());
    }

    for latest in &view.summary {
        let color = view.colors.get(&latest.country).map(String::as_str).unwrap_or("-");
        let value = match latest.latest {
            Some((year, value)) => format!("{:.2}% ({})", value, year),
            None => "-".to_string(),
        };
        let delta = latest
            .delta
            .map(|d| format!("{:+.2} p.p.", d))
            .unwrap_or_default();
        println!("  {:<30} {:<8} {:<16} {}", latest.country, color, value, delta);
    }

    if let Some(year) = view.map_year {
        let highlighted = view.map.iter().filter(|e| view.colors.contains_key(&e.country)).count();
        println!(
            "Map {}: {} of {} countries highlighted (templates: line={}, map={}, theme={})",
            year,
            highlighted,
            view.map.len(),
            view.line_template,
            view.map_template,
            view.theme
        );
    }
}
