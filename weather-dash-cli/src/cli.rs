use anyhow::{Result, anyhow};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use weather_dash_core::{
    AppState, Config, Dashboard, DashboardError, GeoPoint, TemperatureUnit, Theme, Zone,
    capitals,
    device::{DeviceLocator, FixedPosition},
    render,
};

use crate::prompt::{self, SearchChoice};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dash", version, about = "Terminal weather dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Temperature unit for this run; defaults to the configured one.
    #[arg(long, global = true)]
    pub unit: Option<TemperatureUnit>,

    /// Also print the detail panel for this hourly entry (0 = first hour).
    #[arg(long, global = true, value_name = "INDEX")]
    pub hour: Option<usize>,

    /// Print without ANSI colours.
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the OpenWeatherMap API key, unit and device position.
    Configure,

    /// Show weather for a searched location.
    Show {
        /// City or place name.
        query: String,
    },

    /// Detect where you are and show the weather there.
    Here {
        /// Use the device position instead of the IP address.
        #[arg(long)]
        gps: bool,

        /// Use this position as the device fix (implies --gps).
        #[arg(long, value_name = "LAT,LON", value_parser = prompt::parse_point)]
        at: Option<GeoPoint>,
    },

    /// Show weather for an Iranian provincial capital; prompts when no name is given.
    Capital {
        name: Option<String>,
    },

    /// Search interactively with suggestions as you type.
    Search {
        /// Text to start the search with.
        query: Option<String>,
    },

    /// Show or change the colour theme.
    Theme {
        mode: Option<ThemeMode>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeMode {
    Dark,
    Light,
    Toggle,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let Cli {
            command,
            unit,
            hour,
            no_color,
        } = self;
        let mut config = Config::load()?;
        let dashboard = Dashboard::from_config(&config);

        if !matches!(command, Command::Configure | Command::Theme { .. })
            && !dashboard.is_weather_configured()
        {
            eprintln!(
                "⚙️  No OpenWeatherMap API key configured; showing sample data. Run `weather-dash configure` to add one."
            );
        }

        let mut state = AppState::from_config(&config);
        if let Some(unit) = unit {
            state.unit = unit;
        }
        let ticket = state.issue();

        let result = match command {
            Command::Configure => return configure(&mut config),
            Command::Theme { mode } => return set_theme(&mut config, mode),
            Command::Show { query } => dashboard.search(&query).await,
            Command::Here { gps, at } => match (gps, at) {
                (_, Some(point)) => {
                    let locator = DeviceLocator::new(FixedPosition {
                        point,
                        accuracy_m: 0.0,
                    });
                    dashboard.locate_by_device(&locator).await
                }
                (true, None) => {
                    let locator = DeviceLocator::from_config(config.device);
                    dashboard.locate_by_device(&locator).await
                }
                (false, None) => dashboard.locate_by_ip().await,
            },
            Command::Capital { name } => {
                let capital = match name {
                    Some(name) => capitals::find(&name).ok_or_else(|| {
                        anyhow!("Unknown capital '{name}'. Run `weather-dash capital` to pick from the list.")
                    })?,
                    None => prompt::capital()?,
                };
                Ok(dashboard.select_capital(capital).await)
            }
            Command::Search { query } => {
                match prompt::search(dashboard.geocoder(), query.as_deref())? {
                    SearchChoice::Place(place) => Ok(dashboard.select_place(&place).await),
                    SearchChoice::Text(text) => dashboard.search(&text).await,
                }
            }
        };

        match result {
            Ok(update) => {
                let summary = update.summary();
                debug!("Applying update for {}", update.snapshot.location_name);
                if state.apply(ticket, update) {
                    println!("{summary}\n");
                    print_dashboard(&state, hour, !no_color);
                }
                Ok(())
            }
            Err(e @ (DashboardError::NotFound(_) | DashboardError::EmptyQuery)) => Err(anyhow!(e)),
            Err(e) => {
                debug!("Request failed: {e:?}");
                let now = Utc::now();
                state.fail(ticket, &e, now);
                for notice in state.notices(now) {
                    eprintln!("⚠️  {}", notice.message);
                    if let Some(suggestion) = &notice.suggestion {
                        eprintln!("   {suggestion}");
                    }
                }
                Ok(())
            }
        }
    }
}

fn configure(config: &mut Config) -> Result<()> {
    prompt::configure(config)?;
    config.save()?;
    println!(
        "Configuration saved to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}

fn set_theme(config: &mut Config, mode: Option<ThemeMode>) -> Result<()> {
    let theme = match mode {
        None => config.theme,
        Some(ThemeMode::Toggle) => config.toggle_theme(),
        Some(ThemeMode::Dark) => Theme::Dark,
        Some(ThemeMode::Light) => Theme::Light,
    };
    if mode.is_some() {
        config.theme = theme;
        config.save()?;
    }
    println!("Theme: {}", theme.as_str());
    Ok(())
}

fn print_dashboard(state: &AppState, hour: Option<usize>, color: bool) {
    let zone = Zone::local();
    let theme = color.then_some(state.theme);

    if let Some(view) = state.view(zone.clone()) {
        print!("{}", view.to_text(theme));
    }

    let (Some(index), Some(snapshot)) = (hour, state.snapshot()) else {
        return;
    };
    let options = render::ViewOptions {
        unit: state.unit,
        viewer_zone: zone,
    };
    match render::hourly_detail(snapshot, index, &options) {
        Some(detail) => print!("\n{}", detail.to_text()),
        None => eprintln!("No hourly entry #{index}"),
    }
}
