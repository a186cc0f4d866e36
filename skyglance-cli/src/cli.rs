use std::process::ExitCode;

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Select, Text};
use skyglance_core::{
    Config, Coordinates, DisplayModel, DisplayPreferences, FixedPosition, OpenWeatherProvider,
    Outcome, TemperatureUnit, WeatherError, WeatherSession, provider_from_config,
};

use crate::terminal::TerminalCard;

type Session = WeatherSession<OpenWeatherProvider, TerminalCard>;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skyglance", version, about = "Weather at a glance")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key, default city and unit.
    Configure,

    /// Show weather for a city.
    Show {
        /// City name; the configured default if absent.
        city: Option<String>,

        /// celsius or fahrenheit; overrides the configured unit.
        #[arg(long, value_parser = parse_unit)]
        units: Option<TemperatureUnit>,
    },

    /// List cities matching a prefix.
    Suggest {
        prefix: String,
    },

    /// Show weather for a position, resolved to the nearest city.
    Locate {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        #[arg(long, value_parser = parse_unit)]
        units: Option<TemperatureUnit>,
    },

    /// Search repeatedly with suggestions and a unit toggle.
    Interactive {
        #[arg(long, value_parser = parse_unit)]
        units: Option<TemperatureUnit>,
    },
}

fn parse_unit(s: &str) -> Result<TemperatureUnit, String> {
    TemperatureUnit::try_from(s).map_err(|e| e.to_string())
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, units } => {
                let config = Config::load()?;
                let session = open_session(&config, units)?;
                let city = city.unwrap_or_else(|| config.default_city().to_string());

                let result = session.submit(&city).await;
                Ok(print_result(&session, result))
            }
            Command::Suggest { prefix } => {
                let config = Config::load()?;
                let session = open_session(&config, None)?;

                let list = session.suggest(&prefix).await.applied().unwrap_or_default();
                if list.is_empty() {
                    println!("No matching cities.");
                }
                for candidate in &list.items {
                    println!("{candidate}");
                }
                Ok(ExitCode::SUCCESS)
            }
            Command::Locate { lat, lon, units } => {
                let config = Config::load()?;
                let session = open_session(&config, units)?;

                let result = session.locate(&FixedPosition(Coordinates::new(lat, lon))).await;
                Ok(print_result(&session, result))
            }
            Command::Interactive { units } => {
                let config = Config::load()?;
                let session = open_session(&config, units)?;
                interactive(&session, config.default_city()).await
            }
        }
    }
}

fn open_session(config: &Config, units: Option<TemperatureUnit>) -> anyhow::Result<Session> {
    let provider = provider_from_config(config)?;
    let prefs = DisplayPreferences { unit: units.unwrap_or(config.units) };
    Ok(WeatherSession::new(provider, TerminalCard::default(), prefs))
}

/// Print the card after a lookup. Errors were already alerted.
fn print_result(
    session: &Session,
    result: Result<Outcome<DisplayModel>, WeatherError>,
) -> ExitCode {
    match result {
        Ok(_) => {
            session.tick_clock(&Local::now());
            print!("{}", session.target().card());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!(error = %e, "lookup failed");
            ExitCode::FAILURE
        }
    }
}

fn configure() -> anyhow::Result<ExitCode> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let default_city = Text::new("Default city:")
        .with_default(config.default_city())
        .prompt()
        .context("Failed to read default city")?;

    let cursor = TemperatureUnit::all().iter().position(|u| *u == config.units).unwrap_or(0);
    let units = Select::new("Temperature unit:", TemperatureUnit::all().to_vec())
        .with_starting_cursor(cursor)
        .prompt()
        .context("Failed to read temperature unit")?;

    config.api_key = Some(api_key.trim().to_string());
    config.default_city = Some(default_city.trim().to_string());
    config.units = units;

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(ExitCode::SUCCESS)
}

const SEARCH_AS_TYPED: &str = "(search as typed)";

async fn interactive(session: &Session, default_city: &str) -> anyhow::Result<ExitCode> {
    print_result(session, session.search(default_city).await);

    loop {
        let input = match Text::new("City:")
            .with_help_message(":u toggles °C/°F, :q quits")
            .prompt()
        {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        let result = match input.trim() {
            ":q" => break,
            "" => continue,
            ":u" => {
                let unit = session.toggle_units();
                println!("Showing temperatures in {}", unit.symbol());
                if session.target().has_weather() {
                    print!("{}", session.target().card());
                }
                continue;
            }
            text => {
                let list = session.suggest(text).await.applied().unwrap_or_default();
                if list.is_empty() {
                    session.submit(text).await
                } else {
                    let mut options: Vec<String> =
                        list.items.iter().map(ToString::to_string).collect();
                    options.push(SEARCH_AS_TYPED.to_string());

                    match Select::new("Did you mean:", options).raw_prompt() {
                        Ok(choice) if choice.index < list.len() => {
                            session.select_suggestion(&list.items[choice.index]).await
                        }
                        Ok(_) => session.submit(text).await,
                        Err(InquireError::OperationCanceled) => continue,
                        Err(e) => return Err(e.into()),
                    }
                }
            }
        };

        print_result(session, result);
    }

    Ok(ExitCode::SUCCESS)
}
