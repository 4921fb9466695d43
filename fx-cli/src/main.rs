//! FX CLI
//!
//! Command-line interface for the exchange-rate API.

use anyhow::Result;
use clap::{Parser, Subcommand};

use fx_client::FxClient;
use fx_types::{FormatQuery, Locale};

#[derive(Parser)]
#[command(name = "fx")]
#[command(author, version, about = "Exchange-rate API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the exchange-rate API
    #[arg(long, env = "FX_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API health
    Health,
    /// List supported currencies
    Currencies,
    /// Show one currency
    Currency {
        /// ISO 4217 code
        code: String,
    },
    /// Show the current rate snapshot
    Rates,
    /// Show loading, error and staleness flags
    Status,
    /// Refresh rates from the providers now
    Refresh,
    /// Convert an amount
    Convert {
        #[arg(allow_negative_numbers = true)]
        amount: f64,
        /// Source currency (defaults to the base currency)
        #[arg(long)]
        from: Option<String>,
        /// Target currency (defaults to the preferred currency)
        #[arg(long)]
        to: Option<String>,
    },
    /// Format an amount for display
    Format {
        #[arg(allow_negative_numbers = true)]
        amount: f64,
        /// Currency (defaults to the preferred currency)
        #[arg(long)]
        currency: Option<String>,
        /// Append the ISO code
        #[arg(long)]
        code: bool,
        /// Leave out the currency symbol
        #[arg(long)]
        no_symbol: bool,
        #[arg(long)]
        min_digits: Option<u8>,
        #[arg(long)]
        max_digits: Option<u8>,
        /// en-US, de-DE, fr-FR or ja-JP
        #[arg(long)]
        locale: Option<Locale>,
    },
    /// Guess the currency from IP geolocation
    Detect,
    /// Show or change the preferred currency
    Prefer {
        /// New preferred currency; omit to show the current one
        code: Option<String>,
    },
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = FxClient::new(&cli.api_url);

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }
        Commands::Currencies => print_json(&client.currencies().await?)?,
        Commands::Currency { code } => print_json(&client.currency(&code).await?)?,
        Commands::Rates => print_json(&client.rates().await?)?,
        Commands::Status => print_json(&client.status().await?)?,
        Commands::Refresh => {
            let response = client.refresh().await?;
            if !response.refreshed {
                eprintln!("All providers failed; serving the previous rates");
            }
            print_json(&response)?;
        }
        Commands::Convert { amount, from, to } => {
            print_json(&client.convert(amount, from, to).await?)?
        }
        Commands::Format {
            amount,
            currency,
            code,
            no_symbol,
            min_digits,
            max_digits,
            locale,
        } => {
            let query = FormatQuery {
                amount,
                currency,
                show_symbol: Some(!no_symbol),
                show_code: Some(code),
                min_fraction_digits: min_digits,
                max_fraction_digits: max_digits,
                locale,
            };
            println!("{}", client.format(&query).await?.formatted);
        }
        Commands::Detect => print_json(&client.detect().await?)?,
        Commands::Prefer { code } => match code {
            Some(code) => print_json(&client.set_preference(&code).await?)?,
            None => print_json(&client.preference().await?)?,
        },
    }

    Ok(())
}
