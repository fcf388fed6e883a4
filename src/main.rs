use std::fs::File;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use fxconv::core::Converter;
use fxconv::core::config;
use fxconv::currency::{CurrencyDataSource, CurrencyError};
use fxconv::environment::AppInfo;
use fxconv::networking::{HttpHeader, Network, header_name};
use simplelog::{ConfigBuilder, WriteLogger};

#[derive(Parser)]
#[command(name = "fxconv", about = "Convert amounts to USD using live exchange rates")]
struct Args {
    /// Rate API base URL (overrides env and config file)
    #[arg(short, long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every live quote against USD
    Rates,
    /// Print supported currency codes with their names
    Currencies,
    /// Convert AMOUNT of CODE into USD
    Convert { amount: f64, code: String },
    /// Print the application version
    Version,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let resolved = config::resolve(&file_config, args.base_url.as_deref());

    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create(&resolved.log_file) {
        let _ = WriteLogger::init(resolved.log_level, log_config, log_file);
    }

    let app = match AppInfo::current() {
        Ok(app) => app,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    log::info!("{} starting up against {}", app.user_agent(), resolved.base_url);

    if let Command::Version = args.command {
        println!("{} {}", app.name, app.version.description());
        return ExitCode::SUCCESS;
    }

    match run(args.command, &resolved, &app).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Command failed: {e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(
    command: Command,
    resolved: &config::ResolvedConfig,
    app: &AppInfo,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = Network::builder()
        .header(header_name::USER_AGENT, HttpHeader::new(app.user_agent()));
    for (name, header) in &resolved.headers {
        builder = builder.header(name, header.clone());
    }
    let network = Arc::new(builder.build()?);
    log::debug!("Sending {} global header(s)", network.global_headers().len());

    let access_key = resolved.access_key.clone().ok_or_else(|| {
        CurrencyError::Config("set FXCONV_ACCESS_KEY or api.access_key in the config".to_string())
    })?;
    let source = CurrencyDataSource::new(network, resolved.base_url.clone(), access_key)
        .with_request_timeout(resolved.request_timeout);
    let mut converter = Converter::new(source);

    match command {
        Command::Rates => {
            converter.refresh_rates().await?;
            for entry in converter.book().entries() {
                let rate = entry.rate.map(|r| r.to_string()).unwrap_or_default();
                println!("{:<4} {rate}", entry.code);
            }
        }
        Command::Currencies => {
            converter.ensure_names().await?;
            for entry in converter.book().entries() {
                println!("{:<4} {}", entry.code, entry.name.as_deref().unwrap_or(""));
            }
        }
        Command::Convert { amount, code } => match converter.convert(amount, &code).await? {
            Some(usd) => println!("{usd} USD"),
            None => return Err(format!("no quote for currency {code:?}").into()),
        },
        Command::Version => {}
    }
    Ok(())
}
