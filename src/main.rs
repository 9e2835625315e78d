use anyhow::Context;
use clap::Parser;
use playlist_scraper::{setup_logging, validate_config, Cli, CliRunner, Config};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    setup_logging(args.verbose).map_err(|e| anyhow::anyhow!("{e}"))?;

    info!("Starting playlist-scraper v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args).await?;
    let runner = CliRunner::new(config)?;

    if let Err(e) = runner.run(&args.url).await {
        error!("Application error: {}", e);
        std::process::exit(1);
    }

    info!("Playlist-scraper stopped");
    Ok(())
}

async fn load_config(args: &Cli) -> anyhow::Result<Config> {
    let mut config = if let Some(config_path) = &args.config {
        let config_content = tokio::fs::read_to_string(config_path)
            .await
            .with_context(|| format!("reading config file {}", config_path.display()))?;
        serde_json::from_str(&config_content)
            .with_context(|| format!("parsing config file {}", config_path.display()))?
    } else {
        Config::default()
    };

    // Override with CLI arguments
    args.apply_overrides(&mut config);

    validate_config(&config)?;

    info!("Configuration loaded successfully");
    info!("Output file: {}", config.output.tracks_file.display());
    info!(
        "Scroll policy: {} iterations, {:?} settle interval",
        config.scroll.max_iterations, config.scroll.settle_interval
    );

    Ok(config)
}
