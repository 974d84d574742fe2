//! Thai partner CLI
//!
//! Operator tool for checking identification numbers against the Revenue
//! Department services outside the host application.
//!
//! # Usage
//!
//! ```bash
//! # Is the TIN registered?
//! th_partner verify 0105536112014
//!
//! # Raw registration record for a branch
//! th_partner lookup 0105536112014 --branch 1
//!
//! # What the partner form would receive
//! th_partner onchange 0105536112014 --format json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use l10n_th_partner::{
    compose, on_vat_change, BranchCode, RdClient, RdServiceConfig, Tin, VatChange,
};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "th_partner")]
#[command(version = "0.1.0")]
#[command(about = "Verify Thai TIN/PIN values and fetch registered addresses")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, short = 'o', global = true, default_value = "pretty", value_enum)]
    format: OutputFormat,

    /// Fail when the registry reports an error instead of returning no data
    #[arg(long, global = true)]
    strict: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a TIN/PIN is registered
    Verify {
        /// 13-digit identification number
        tin: String,
    },

    /// Fetch the registration record and composed address
    Lookup {
        /// 13-digit identification number
        tin: String,

        /// Branch number (0 = head office)
        #[arg(short, long, default_value_t = 0)]
        branch: u32,
    },

    /// Run the full VAT change cycle as the partner form would
    Onchange {
        /// VAT field value as typed by the user
        vat: String,

        /// Branch number (0 = head office)
        #[arg(short, long, default_value_t = 0)]
        branch: u32,
    },
}

// =============================================================================
// MAIN
// =============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = RdServiceConfig::from_env().context("Failed to load RD_* configuration")?;
    if cli.strict {
        config = config.with_strict_remote_errors(true);
    }
    let client = RdClient::new(config);

    match cli.command {
        Commands::Verify { tin } => {
            let tin = Tin::parse(&tin)?;
            let exists = client.verify_tin(&tin).await?;
            match cli.format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "tin": tin,
                    "exists": exists,
                }))?,
                OutputFormat::Pretty => println!(
                    "{} {}",
                    tin,
                    if exists { "is registered" } else { "is NOT registered" }
                ),
            }
        }
        Commands::Lookup { tin, branch } => {
            let tin = Tin::parse(&tin)?;
            let record = client
                .fetch_registration(&tin, BranchCode::new(branch))
                .await?;
            let address = compose(&record);
            match cli.format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "tin": tin,
                    "branch": branch,
                    "record": record,
                    "address": address,
                }))?,
                OutputFormat::Pretty => {
                    for (name, value) in record.iter() {
                        println!("{:<18} {}", name, value);
                    }
                    println!();
                    println!("street   {}", address.street);
                    println!("street2  {}", address.street2);
                    println!("city     {}", address.city);
                    println!("zip      {}", address.zip);
                }
            }
        }
        Commands::Onchange { vat, branch } => {
            let change = on_vat_change(&client, Some(vat.as_str()), BranchCode::new(branch)).await?;
            match cli.format {
                OutputFormat::Json => print_json(&change)?,
                OutputFormat::Pretty => match change {
                    VatChange::NoOp => println!("no change ('{}' is not a 13-digit TIN)", vat),
                    VatChange::Warning(w) => println!("warning: {}\n  {}", w.title, w.message),
                    VatChange::Updates(u) => {
                        println!("name_company  {}", u.name_company);
                        println!("street        {}", u.street);
                        println!("street2       {}", u.street2);
                        println!("city          {}", u.city);
                        println!("zip           {}", u.zip);
                    }
                },
            }
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
