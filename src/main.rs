//! Insurance charge prediction service entry point.

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use insurance_predict::api::create_router;
use insurance_predict::bootstrap::{bootstrap, init_schema};
use insurance_predict::config::{Config, VERBOSE_FILTER};
use insurance_predict::Result;
use insurance_predict::metrics;
use insurance_predict::model::{self, Regressor};
use insurance_predict::pipeline::round_charge;
use insurance_predict::schema::{PredictionRequest, Region, Sex, Smoker};
use insurance_predict::store::{ConnectTarget, TABLE_NAME};
use insurance_predict::utils::shutdown_signal;

/// Insurance charge prediction service.
#[derive(Parser, Debug)]
#[command(name = "insurance-predict")]
#[command(about = "Predicts insurance charges and records every prediction in PostgreSQL")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service (default).
    Serve {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Load the model artifact and run a sample prediction.
    CheckModel,

    /// Create the prediction table if it does not exist.
    InitDb,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Configuration drives the log filter, so it is read before logging starts
    let config = Config::load();

    // Initialize logging
    let filter = match &config {
        _ if args.verbose => EnvFilter::new(VERBOSE_FILTER),
        Ok(c) => EnvFilter::try_new(c.log_filter()).unwrap_or_else(|_| EnvFilter::new("info")),
        Err(_) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match args.command {
        Some(Command::Serve { port }) => cmd_serve(config, port.or(args.port)).await,
        Some(Command::CheckConfig) => cmd_check_config(config),
        Some(Command::CheckModel) => cmd_check_model(config),
        Some(Command::InitDb) => cmd_init_db(config).await,
        None => cmd_serve(config, args.port).await,
    }
}

fn checked(config: Result<Config>) -> Result<Config> {
    let config = config.inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    config
        .validate()
        .inspect_err(|e| error!("Invalid configuration: {}", e))?;
    Ok(config)
}

/// Run the HTTP service.
async fn cmd_serve(config: Result<Config>, port_override: Option<u16>) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let mut config = checked(config)?;
    if let Some(port) = port_override {
        config.port = port;
    }

    let state = bootstrap(&config).await?;
    let state = match metrics::init_metrics() {
        Ok(handle) => state.with_metrics(handle),
        Err(e) => {
            warn!("Metrics recorder unavailable: {}", e);
            state
        }
    };

    let router = create_router(state);
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Check configuration validity.
fn cmd_check_config(config: Result<Config>) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("INSURANCE PREDICT - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match config {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    print!("Resolving database target... ");
    match ConnectTarget::resolve(&config.database()) {
        Ok(target) => println!("OK ({})", target),
        Err(e) => println!("MISSING ({})", e),
    }

    println!("Model path: {}", config.model_path()?.display());
    println!("Listen address: {}", config.bind_addr());
    println!("Log filter: {}", config.log_filter());
    Ok(())
}

/// Load the model and print a sample prediction.
fn cmd_check_model(config: Result<Config>) -> anyhow::Result<()> {
    let config = checked(config)?;
    let loaded = model::load(&config.model_path()?)?;
    println!("Model loaded with {} strategy", loaded.strategy);

    let sample = PredictionRequest {
        age: 35,
        sex: Sex::Male,
        bmi: 28.5,
        children: 2,
        smoker: Smoker::No,
        region: Region::Southeast,
    };
    let frame = model::FeatureFrame::from_request(&sample);
    let raw = loaded.model.predict(&frame)?.first(model::LABEL_COLUMN)?;
    println!("Sample {:?} -> {}", sample, round_charge(raw)?);
    Ok(())
}

/// Create the prediction table.
async fn cmd_init_db(config: Result<Config>) -> anyhow::Result<()> {
    let config = checked(config)?;
    init_schema(&config).await?;
    println!("Table {} is ready", TABLE_NAME);
    Ok(())
}
