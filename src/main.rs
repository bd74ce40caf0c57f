//! Gemini generation gateway entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use genai_gateway::api::{create_router, AppState};
use genai_gateway::config::Config;
use genai_gateway::generation::{self, GenerationResult};
use genai_gateway::metrics;
use genai_gateway::provider::GeminiClient;
use genai_gateway::runtime::ProcSampler;
use genai_gateway::status::{health, HealthState};
use genai_gateway::utils::shutdown_signal;
use genai_gateway::ServiceError;

/// Gemini text generation gateway.
#[derive(Parser, Debug)]
#[command(name = "genai-gateway")]
#[command(about = "HTTP gateway for Gemini text generation with health and metrics endpoints")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Print the current health status and exit non-zero when unhealthy.
    Health,

    /// Run a single generation and print the result.
    Generate {
        /// Prompt text.
        #[arg(long)]
        prompt: String,

        /// Model identifier (defaults to GEMINI_MODEL).
        #[arg(long)]
        model: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("genai_gateway=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    if args.json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    // Initialize metrics
    metrics::init_metrics();

    // Handle subcommands
    match args.command {
        Some(Command::Serve { port }) => cmd_serve(port.or(args.port)).await,
        Some(Command::CheckConfig) => cmd_check_config(),
        Some(Command::Health) => cmd_health(),
        Some(Command::Generate { prompt, model }) => cmd_generate(prompt, model).await,
        None => cmd_serve(args.port).await,
    }
}

/// Load and validate configuration.
fn load_config() -> genai_gateway::Result<Config> {
    let config = Config::load()?;
    config.validate().map_err(ServiceError::InvalidConfig)?;
    Ok(config)
}

/// Build the Gemini client from configuration.
fn build_generator(config: &Config) -> genai_gateway::Result<GeminiClient> {
    Ok(GeminiClient::new(config)?)
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("GENAI GATEWAY - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
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

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!(
        "  Gemini API Key: {}",
        if config.api_configured() { "present" } else { "MISSING (health will report unhealthy)" }
    );
    println!("  API Base: {}", config.gemini_api_base);
    println!("  Default Model: {}", config.gemini_model);
    println!("  HTTP Timeout: {}ms", config.http_timeout_ms);
    println!("  Environment: {}", config.app_env);
    println!("  Version: {}", config.app_version);
    println!("  Port: {}", config.port);
    println!(
        "  Prometheus Exporter: {}",
        if config.metrics_enabled {
            format!("Enabled on port {}", config.metrics_port)
        } else {
            "Disabled".to_string()
        }
    );
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Print the current health status.
fn cmd_health() -> anyhow::Result<()> {
    let config = load_config()?;
    let sampler = ProcSampler::new();

    let (_, report) = health::handle(&config, &sampler);
    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.state() == HealthState::Unhealthy {
        return Err(anyhow::anyhow!("Service is unhealthy"));
    }
    Ok(())
}

/// Run a single generation through the same validation path as the API.
async fn cmd_generate(prompt: String, model: Option<String>) -> anyhow::Result<()> {
    let config = load_config()?;
    let client = build_generator(&config)?;

    let body = serde_json::json!({ "prompt": prompt, "model": model });
    let body = serde_json::to_vec(&body)?;

    let (status, result) = generation::handle(&client, &body, &config.gemini_model).await;
    match result {
        GenerationResult::Success { text, model } => {
            info!(model = %model, "Generation complete");
            println!("{}", text);
            Ok(())
        }
        GenerationResult::Failure { error_message } => {
            Err(anyhow::anyhow!("{} ({})", error_message, status))
        }
    }
}

/// Run the HTTP server until a shutdown signal arrives.
async fn cmd_serve(port_override: Option<u16>) -> anyhow::Result<()> {
    // Load configuration
    info!("Loading configuration...");
    let mut config = load_config().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    // Override with CLI args if provided
    if let Some(port) = port_override {
        config.port = port;
    }

    if !config.api_configured() {
        warn!("GEMINI_API_KEY is not set; generation will fail and health will report unhealthy");
    }

    info!("Configuration loaded successfully");
    info!("Environment: {}", config.app_env);
    info!("Default model: {}", config.gemini_model);

    if config.metrics_enabled {
        let metrics_addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
        metrics::install_exporter(metrics_addr).map_err(ServiceError::from)?;
    }

    let generator = Arc::new(build_generator(&config)?);
    let sampler = Arc::new(ProcSampler::new());
    let port = config.port;
    let app_state = AppState::new(config, generator, sampler);

    // Start HTTP server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    let router = create_router(app_state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
