// fraudcheck command-line entry point
use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use engine::amount_format::{format_amount, format_vnd, parse_amount};
use engine::config::settings::EngineSettings;
use engine::data::province_lookup::{fold_diacritics, ReferenceLookup};
use engine::services::fraud_check::build_request::handle_build_request;
use engine::services::fraud_check::helpers::transaction_hour_from_time;
use engine::services::FraudCheckService;
use serde::de::DeserializeOwned;
use shared::models::{FraudRequest, FraudResponse, TransactionGuess};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fraudcheck", version, about = "Receipt amount parsing, province lookup and fraud-check history")]
struct Cli {
    /// JSON settings file; defaults are used when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize a monetary string such as "1.234.567,89"
    ParseAmount { raw: String },
    /// Look up the population of a province or city
    Population { city: String },
    /// Build a scoring request from an OCR transaction guess (JSON file)
    BuildRequest { guess: PathBuf },
    /// Store a scoring response for the request that produced it (JSON files)
    Record {
        request: PathBuf,
        response: PathBuf,
        /// Receipt time of day, "HH:MM:SS", kept with the history record
        #[arg(long)]
        time: Option<String>,
    },
    /// List recorded checks, newest first
    History,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = EngineSettings::load_or_default(cli.config.as_deref())?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!(command = ?cli.command, "Starting fraudcheck");

    match cli.command {
        Command::ParseAmount { raw } => match parse_amount(&raw) {
            Some(value) => print_json(&serde_json::json!({
                "amount": value,
                "formatted": format_amount(value),
                "display": format_vnd(value),
            })),
            None => bail!("Unparseable amount: {:?}", raw),
        },
        Command::Population { city } => {
            let lookup = ReferenceLookup::bundled()?;
            let key = fold_diacritics(&city);
            match lookup.population_of(&key) {
                Some(population) => print_json(&serde_json::json!({
                    "city": key.trim().to_lowercase(),
                    "population": population,
                })),
                None => bail!("Invalid city: {:?}", city),
            }
        }
        Command::BuildRequest { guess } => {
            let guess: TransactionGuess = read_json(&guess)?;
            let lookup = ReferenceLookup::bundled()?;
            let request = handle_build_request(&guess, &lookup, settings.default_transaction_hour)?;
            print_json(&request)
        }
        Command::Record { request, response, time } => {
            if let Some(t) = time.as_deref() {
                if transaction_hour_from_time(t).is_none() {
                    bail!("Invalid transaction time: {:?}. Expected HH:MM:SS", t);
                }
            }
            let request: FraudRequest = read_json(&request)?;
            let response: FraudResponse = read_json(&response)?;
            let service = FraudCheckService::from_settings(&settings)?;
            let item = service.record_result(&request, &response, time, Utc::now())?;
            print_json(&item)
        }
        Command::History => {
            let service = FraudCheckService::from_settings(&settings)?;
            let items = service.history()?;
            info!(count = items.len(), "Loaded history");
            print_json(&items)
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
