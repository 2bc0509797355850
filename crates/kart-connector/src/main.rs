use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;

use kart_connector::config::KartConfig;
use kart_connector::console::run_console;
use kart_connector::logging::{init_tracing, LogTarget};
use kart_connector::Controller;

/// Show the kart seating grid and follow live name updates.
#[derive(Parser, Debug)]
#[command(name = "kart-connector", version, about)]
struct Cli {
    /// TOML config file. Defaults to ./kart.toml when present.
    #[arg(long, env = "KART_CONFIG")]
    config: Option<PathBuf>,

    /// Layout source: file path or http(s) URL.
    #[arg(long)]
    layout: Option<String>,

    /// Full name-server endpoint, e.g. ws://10.0.0.5:9003.
    #[arg(long)]
    url: Option<String>,

    /// Name-server host (used with --port when --url is not given).
    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,

    /// JSON file holding cached names.
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Print the grid to stdout instead of opening the console.
    #[arg(long)]
    headless: bool,
}

impl Cli {
    fn apply_overrides(&self, config: &mut KartConfig) {
        if let Some(layout) = &self.layout {
            config.layout.source = layout.clone();
        }
        if let Some(url) = &self.url {
            config.sync.url = Some(url.clone());
        }
        if let Some(host) = &self.host {
            config.sync.host = host.clone();
        }
        if let Some(port) = self.port {
            config.sync.port = port;
        }
        if let Some(cache) = &self.cache {
            config.names.cache_path = Some(cache.clone());
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = KartConfig::resolve(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    let headless = cli.headless || !std::io::stdout().is_terminal();
    let target = if headless {
        LogTarget::Stderr
    } else {
        LogTarget::File
    };
    init_tracing(&config.log, target)?;

    tracing::info!(
        layout = %config.layout.source,
        headless,
        "Starting kart connector"
    );

    let controller = match Controller::start(&config).await {
        Ok(controller) => controller,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Startup failed");
            return Err(e);
        }
    };

    if headless {
        controller.run_headless().await
    } else {
        run_console(controller).await
    }
}
