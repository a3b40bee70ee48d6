use anyhow::{Context, bail};
use clap::{ArgAction, Parser, Subcommand};
use std::sync::Arc;

use inquire::{InquireError, Select, Text};
use skycast_core::{
    Config, Debouncer, LookupOutcome, OpenWeatherProvider, Suggester, SuggestionRecord, Units,
    WeatherSession, WeatherView, WidgetError, provider::provider_from_config,
};
use tokio::runtime::Handle;

use crate::{
    complete::{CityAutocomplete, Pick, resolve_pick},
    render,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "City weather lookup with autocomplete")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the OpenWeather API key, units and language.
    Configure,

    /// Show current conditions with hourly and weekly forecast.
    Show {
        /// City name; omit when passing coordinates.
        city: Option<String>,

        #[arg(long, requires = "lon", conflicts_with = "city", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", conflicts_with = "city", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Print the view as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// List autocomplete candidates for a partial city name.
    Suggest {
        query: String,
    },

    /// Interactive search: suggestions appear while typing; pick one or submit a name.
    Search,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show {
                city,
                lat,
                lon,
                json,
            } => {
                let config = Config::load()?;
                let session = WeatherSession::new(provider_from_config(&config)?);

                let outcome = match (city, lat, lon) {
                    (Some(city), _, _) => session.search_by_name(&city).await,
                    (None, Some(lat), Some(lon)) => {
                        let pick = SuggestionRecord {
                            display: format!("{lat}, {lon}"),
                            lat,
                            lon,
                        };
                        session.select_suggestion(&pick).await
                    }
                    _ => bail!("Pass a city name or both --lat and --lon."),
                };

                print_outcome(&session, &config, outcome, json)
            }
            Command::Suggest { query } => {
                let config = Config::load()?;
                let suggester =
                    Suggester::from_config(provider_from_config(&config)?, &config.suggest);
                let records = suggester.lookup(&query).await;
                if records.is_empty() {
                    println!("No matches.");
                } else {
                    print!("{}", render::suggestions(&records));
                }
                Ok(())
            }
            Command::Search => search().await,
        }
    }
}

fn print_outcome(
    session: &WeatherSession<OpenWeatherProvider>,
    config: &Config,
    outcome: Result<LookupOutcome, WidgetError>,
    json: bool,
) -> anyhow::Result<()> {
    let print = |view: &WeatherView| -> anyhow::Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(view)?);
        } else {
            print!("{}", render::view(view, config.units, config.locale()));
        }
        Ok(())
    };

    match outcome {
        Ok(LookupOutcome::Applied(view)) => print(&view),
        Ok(LookupOutcome::Superseded | LookupOutcome::Skipped) => Ok(()),
        // The snapshot is still worth showing without the forecast strips.
        Err(err @ WidgetError::Forecast(_)) => {
            if let Some(view) = session.state().view {
                print(&view)?;
            }
            eprintln!("{err}");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let current_key = config.api_key.clone().unwrap_or_default();
    let key = Text::new("OpenWeather API key:")
        .with_initial_value(&current_key)
        .prompt()
        .context("API key prompt aborted")?;
    if !key.trim().is_empty() {
        config.api_key = Some(key.trim().to_string());
    }

    let start = Units::all()
        .iter()
        .position(|u| *u == config.units)
        .unwrap_or_default();
    config.units = Select::new("Units:", Units::all().to_vec())
        .with_starting_cursor(start)
        .prompt()
        .context("Units prompt aborted")?;

    let lang = Text::new("Language code (en, ru, ...):")
        .with_initial_value(&config.lang)
        .prompt()
        .context("Language prompt aborted")?;
    if !lang.trim().is_empty() {
        config.lang = lang.trim().to_lowercase();
    }

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

async fn search() -> anyhow::Result<()> {
    let config = Config::load()?;
    let provider = provider_from_config(&config)?;
    let suggester = Arc::new(Suggester::from_config(provider.clone(), &config.suggest));
    let debouncer = Arc::new(Debouncer::from_config(suggester, &config.suggest));
    let session = WeatherSession::new(provider);

    loop {
        let completer = CityAutocomplete::new(Arc::clone(&debouncer), Handle::current());
        let prompt_completer = completer.clone();
        let answer = tokio::task::spawn_blocking(move || {
            Text::new("City (empty to quit):")
                .with_autocomplete(prompt_completer)
                .prompt()
        })
        .await?;

        let input = match answer {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err.into()),
        };

        let records = completer.records();
        debouncer.clear();
        tracing::debug!(input = %input, listed = records.len(), "search submitted");

        let outcome = match resolve_pick(&records, &input) {
            Some(Pick::Place(record)) => session.select_suggestion(record).await,
            Some(Pick::Name(name)) => session.search_by_name(name).await,
            None => break,
        };

        if let Err(err) = print_outcome(&session, &config, outcome, false) {
            eprintln!("{err}");
        }
        println!();
    }

    Ok(())
}
