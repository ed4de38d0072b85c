use anyhow::Result;
use browserd_core::{BrowserKind, SessionConfig};
use browserd_server::McpServer;
use browserd_tools::{BrowserSession, Dispatcher, ToolRegistry};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// MCP server exposing browser automation tools over stdio.
#[derive(Parser, Debug)]
#[command(name = "browserd", version, about)]
struct Cli {
    /// Browser to use
    #[arg(long, default_value = "chromium", value_parser = ["chromium", "chrome", "edge"])]
    browser: String,

    /// Run the browser in headless mode
    #[arg(long)]
    headless: bool,

    /// Browser viewport width
    #[arg(long, default_value_t = 1280)]
    viewport_width: u32,

    /// Browser viewport height
    #[arg(long, default_value_t = 720)]
    viewport_height: u32,

    /// Default timeout in milliseconds
    #[arg(long, default_value_t = 30_000)]
    timeout: u64,

    /// Verbose logging (stderr)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries the protocol, so all logging goes to stderr.
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = SessionConfig {
        browser: cli.browser.parse::<BrowserKind>()?,
        headless: cli.headless,
        viewport_width: cli.viewport_width,
        viewport_height: cli.viewport_height,
        timeout_ms: cli.timeout,
    };
    info!(
        browser = %config.browser,
        headless = config.headless,
        timeout_ms = config.timeout_ms,
        "starting browserd"
    );

    let registry = ToolRegistry::with_defaults();
    info!(tools = registry.len(), "tool catalog ready");
    let session = BrowserSession::new(config);
    let server = McpServer::new(Dispatcher::new(registry, session));

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("interrupt received, shutting down");
            server.shutdown().await?;
        }
    }
    Ok(())
}
