use anyhow::Context;
use clap::{Parser, Subcommand};
use forecast_core::{AddressQuery, Config, ForecastService};
use inquire::{InquireError, Text};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Weather forecast for a postal address")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the contact sent to upstream services in the User-Agent.
    Configure,

    /// Show the forecast for an address.
    Show {
        /// Address or location name, e.g. "123 Main St, Springfield, IL 62704".
        address: String,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Prompt for addresses repeatedly, reusing cached forecasts within the session.
    Interactive {
        /// Print each result as JSON.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { address, json } => {
                let query = AddressQuery::parse(&address)?;
                let service = build_service()?;
                let result = service.get_forecast(&query).await?;
                output::print_result(&result, json)
            }
            Command::Interactive { json } => interactive(build_service()?, json).await,
        }
    }
}

fn build_service() -> anyhow::Result<ForecastService> {
    let config = Config::load()?;
    ForecastService::from_config(&config)
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;
    let current = config.contact.clone().unwrap_or_default();

    let contact = Text::new("Contact for the User-Agent (email or URL):")
        .with_initial_value(&current)
        .with_help_message("Nominatim and api.weather.gov ask clients to identify themselves")
        .prompt()
        .context("Configuration cancelled")?;

    config.set_contact(contact);
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn interactive(service: ForecastService, json: bool) -> anyhow::Result<()> {
    loop {
        let input = match Text::new("Address:")
            .with_help_message("Leave empty to quit")
            .prompt()
        {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        if input.trim().is_empty() {
            break;
        }

        let result = match AddressQuery::parse(&input) {
            Ok(query) => service.get_forecast(&query).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(result) => output::print_result(&result, json)?,
            Err(e) => {
                tracing::warn!(error = %e, "Forecast lookup failed");
                eprintln!("Error: {e}");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_parses_address_and_json_flag() {
        let cli = Cli::try_parse_from(["forecast", "show", "Springfield, IL", "--json"]).unwrap();

        match cli.command {
            Command::Show { address, json } => {
                assert_eq!(address, "Springfield, IL");
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn show_requires_address() {
        assert!(Cli::try_parse_from(["forecast", "show"]).is_err());
    }

    #[test]
    fn interactive_defaults_to_text_output() {
        let cli = Cli::try_parse_from(["forecast", "interactive"]).unwrap();
        assert!(matches!(cli.command, Command::Interactive { json: false }));
    }

    #[tokio::test]
    async fn blank_address_fails_before_any_lookup() {
        let cli = Cli::try_parse_from(["forecast", "show", "   "]).unwrap();
        let err = cli.run().await.unwrap_err();
        assert!(err.to_string().contains("Address cannot be empty"));
    }
}
