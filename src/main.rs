use anyhow::{Context, Result};
use appium_service::{
    cli::{Cli, Commands, ServerArgs},
    config::Config,
    AppiumService, AppiumServiceBuilder, ProcessServiceBuilder,
};
use clap::Parser;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Start { server } => {
            let mut service = build_service(cli.config.as_deref(), &server)?;
            service
                .start()
                .await
                .context("Failed to start the Appium server")?;

            // Print only the URL to stdout
            println!("{}", service.url());
            if let Some(started_at) = service.started_at() {
                info!("Server started at {}", started_at.to_rfc3339());
            }

            info!("Press Ctrl-C to stop the server");
            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for Ctrl-C")?;

            service.stop().await?;
            info!("Server stopped");
        }
        Commands::Args { server } => {
            let service = build_service(cli.config.as_deref(), &server)?;
            for token in service.command_line() {
                println!("{}", token);
            }
        }
        Commands::Version => {
            println!("appium-service {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn build_service(config_path: Option<&Path>, server: &ServerArgs) -> Result<AppiumService> {
    let config = Config::load(config_path)?;
    let builder = config.apply(AppiumServiceBuilder::new())?;
    let builder = server.apply(builder)?;
    let service = builder
        .build()
        .context("Invalid Appium server configuration")?;
    Ok(service)
}
