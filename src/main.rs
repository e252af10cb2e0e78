use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use vision_client::{app, cli::Cli, config};

/// Validates that a log level string is valid
fn validate_log_level(level: &str) -> Result<()> {
    level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .map_err(|_| {
            anyhow::anyhow!(
                "Invalid log level: '{}'. Valid levels: error, warn, info, debug, trace",
                level
            )
        })?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration first (before logging setup)
    let mut config = match config::load(cli.config.as_deref()).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    cli.apply(&mut config);

    if let Err(e) = validate_log_level(&config.logs.level) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    // RUST_LOG overrides the configured level; stdout stays reserved for results
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logs.level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.logs.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!(
        "Starting vision client against {} ({} mode)",
        config.socket_path.display(),
        if config.is_camera_mode() { "camera" } else { "file" }
    );

    match app::run(config).await {
        Ok(summary) => {
            info!("Finished after {} cycle(s)", summary.cycles);
            ExitCode::SUCCESS
        }
        Err(e) => {
            debug!("Run failed: {:?}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
