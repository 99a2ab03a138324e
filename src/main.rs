use anyhow::Context;
use clap::{Parser, Subcommand};
use floodrisk::assessment::Assessor;
use floodrisk::config::Config;
use floodrisk::location::{LocationError, LocationResolver};
use std::path::PathBuf;
use std::process::ExitCode;

/// Flood risk demo for Singapore postal codes.
///
/// Looks an address up through OneMap (or a local address table) and pairs
/// it with simulated flood depths. The numbers are random by design.
///
/// Examples:
///   floodrisk serve --port 8080
///   floodrisk assess 018956
///   floodrisk assess 018956 --json
///   floodrisk --database database.json.gz assess 238801
#[derive(Parser)]
#[command(name = "floodrisk", version, about, long_about = None)]
struct Cli {
    /// Config file (default: ~/.floodrisk/config.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Local address table (JSON, optionally .gz) instead of OneMap.
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// OneMap search endpoint override.
    #[arg(long, global = true)]
    onemap_url: Option<String>,

    /// Lookup timeout in seconds.
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Debug logging.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the web server.
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long, short = 'p')]
        port: Option<u16>,
    },
    /// Assess a single postal code and print the result.
    Assess {
        /// 6-digit postal code, e.g. 018956.
        postal: String,
        /// Print JSON instead of the text report.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    floodrisk::logging::init(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(path) = cli.database {
        config.geocoder.database = Some(path);
    }
    if let Some(url) = cli.onemap_url {
        config.geocoder.onemap_url = url;
    }
    if let Some(secs) = cli.timeout_secs {
        config.geocoder.timeout_secs = secs;
    }
    config.validate()?;

    let provider = config.provider().context("setting up address lookup")?;
    let assessor = Assessor::new(
        LocationResolver::new(provider),
        config.sampler()?,
        config.risk.scenarios.clone(),
    );

    match cli.command {
        Command::Serve { host, port } => {
            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);
            let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
            runtime
                .block_on(floodrisk::server::start(&host, port, assessor))
                .with_context(|| format!("serving on {}:{}", host, port))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Assess { postal, json } => match assessor.assess(&postal) {
            Ok(assessment) => {
                if json {
                    println!("{}", serde_json::to_string_pretty(&assessment)?);
                } else {
                    eprintln!("  {}", assessment.location.display_line());
                    print!("{}", assessment.render_text(&assessor.sampler().bands()));
                }
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                Ok(ExitCode::from(exit_status(&e)))
            }
        },
    }
}

/// Exit status for a failed assessment: 2 for bad input, 1 otherwise.
fn exit_status(err: &LocationError) -> u8 {
    match err {
        LocationError::InvalidInput(_) => 2,
        LocationError::NotFound(_) | LocationError::Lookup(_) => 1,
    }
}
