//! Fediverse crawl browser entry point.

use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use time::format_description::well_known::Rfc3339;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fedi_browser::client::{ApiResponse, FediClient, PageParams};
use fedi_browser::config::Config;
use fedi_browser::error::AppError;
use fedi_browser::metrics;
use fedi_browser::models::{DEFAULT_PAGE, DEFAULT_PER_PAGE};
use fedi_browser::utils::{shutdown_signal, truncate};
use fedi_browser::web::{create_router, AppState};

/// Browse fediverse instances and their crawl history.
#[derive(Parser, Debug)]
#[command(name = "fedi-browser")]
#[command(about = "Browse fediverse instance crawl data from the command line or a web page")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Crawl service base URL (overrides API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the page server.
    Serve {
        /// HTTP port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List instances.
    Instances {
        /// Filter by software name.
        #[arg(long)]
        software: Option<String>,

        #[arg(long, default_value_t = DEFAULT_PAGE)]
        page: u32,

        #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
        per_page: u32,
    },

    /// Show one instance.
    Instance {
        /// Instance identifier.
        id: String,
    },

    /// List the crawl history of one instance.
    Crawls {
        /// Instance identifier.
        id: String,

        #[arg(long, default_value_t = DEFAULT_PAGE)]
        page: u32,

        #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
        per_page: u32,
    },

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("fedi_browser=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match args.command {
        Command::Serve { port } => cmd_serve(args.api_url, port).await,
        Command::Instances {
            software,
            page,
            per_page,
        } => cmd_instances(args.api_url, software, PageParams::new(page, per_page)).await,
        Command::Instance { id } => cmd_instance(args.api_url, &id).await,
        Command::Crawls { id, page, per_page } => {
            cmd_crawls(args.api_url, &id, PageParams::new(page, per_page)).await
        }
        Command::CheckConfig => cmd_check_config(args.api_url),
    }
}

/// Load and validate configuration, letting the CLI flag stand in for or override API_URL.
fn load_config(api_url: Option<String>) -> anyhow::Result<Config> {
    let config = Config::load_with_api_url(api_url).map_err(AppError::Config)?;
    config.validate().map_err(AppError::InvalidConfig)?;
    Ok(config)
}

fn client_for(api_url: Option<String>) -> anyhow::Result<FediClient> {
    let config = load_config(api_url)?;
    Ok(FediClient::new(&config).map_err(AppError::Client)?)
}

/// Check configuration validity.
fn cmd_check_config(api_url: Option<String>) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("FEDI BROWSER - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match load_config(api_url) {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration check failed"));
        }
    };

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  API URL: {}", config.api_url);
    println!("  Port: {}", config.port);
    println!("  Log Level: {}", config.rust_log);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Run the page server until a shutdown signal arrives.
async fn cmd_serve(api_url: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let config = load_config(api_url).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    let client = FediClient::new(&config).map_err(AppError::Client)?;
    let mut state = AppState::new(client);

    match metrics::install_prometheus() {
        Ok(handle) => state = state.with_prometheus(handle),
        Err(e) => error!("Metrics disabled: {}", e),
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], port.unwrap_or(config.port)));
    let listener = TcpListener::bind(addr).await.map_err(AppError::Io)?;
    info!(api_url = %config.api_url, "Page server listening on {}", addr);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Io)?;

    info!("Page server stopped");
    Ok(())
}

/// Print a page of instances.
async fn cmd_instances(
    api_url: Option<String>,
    software: Option<String>,
    paging: PageParams,
) -> anyhow::Result<()> {
    let client = client_for(api_url)?;

    let page = match client.list_instances(software.as_deref(), paging).await? {
        ApiResponse::Success(page) => page,
        ApiResponse::Failure(e) => anyhow::bail!(e),
    };

    println!(
        "{:<40} {:<10} {:<24} {:>10} {:>10}",
        "DOMAIN", "STATUS", "SOFTWARE", "USERS", "POSTS"
    );
    for instance in &page.results {
        println!(
            "{:<40} {:<10} {:<24} {:>10} {:>10}",
            truncate(&instance.domain, 40),
            instance.status,
            truncate(&instance.software_label().unwrap_or_default(), 24),
            instance.total_users.map_or("-".to_string(), |v| v.to_string()),
            instance.local_posts.map_or("-".to_string(), |v| v.to_string()),
        );
    }
    println!(
        "\nPage {} of {} ({} total)",
        page.page,
        page.page_count().max(1),
        page.total
    );

    Ok(())
}

/// Print one instance.
async fn cmd_instance(api_url: Option<String>, id: &str) -> anyhow::Result<()> {
    let client = client_for(api_url)?;

    let instance = match client.get_instance_by_id(id).await? {
        ApiResponse::Success(instance) => instance,
        ApiResponse::Failure(e) => anyhow::bail!(e),
    };

    println!("======================================================================");
    println!("{}", instance.domain);
    println!("======================================================================");
    println!("  ID: {}", instance.id);
    println!("  Status: {}", instance.status);
    if let Some(software) = instance.software_label() {
        println!("  Software: {}", software);
    }
    if let Some(description) = &instance.description {
        println!("  Description: {}", description);
    }
    if let Some(open) = instance.open_registrations {
        println!("  Registrations: {}", if open { "open" } else { "closed" });
    }
    for (label, value) in [
        ("Peers", instance.number_of_peers),
        ("Users", instance.total_users),
        ("Active (half year)", instance.active_users_half_year),
        ("Active (month)", instance.active_users_month),
        ("Posts", instance.local_posts),
        ("Comments", instance.local_comments),
    ] {
        if let Some(value) = value {
            println!("  {}: {}", label, value);
        }
    }

    Ok(())
}

/// Print the crawl history of one instance.
async fn cmd_crawls(api_url: Option<String>, id: &str, paging: PageParams) -> anyhow::Result<()> {
    let client = client_for(api_url)?;

    let page = match client.list_crawls_for_instance(id, paging).await? {
        ApiResponse::Success(page) => page,
        ApiResponse::Failure(e) => anyhow::bail!(e),
    };

    println!(
        "{:<22} {:<16} {:>10} {:>10}  {}",
        "STARTED", "STATUS", "DURATION", "USERS", "ERROR"
    );
    for crawl in &page.results {
        let started = crawl
            .started_at
            .format(&Rfc3339)
            .unwrap_or_else(|_| "-".to_string());
        println!(
            "{:<22} {:<16} {:>9.2}s {:>10}  {}",
            started,
            crawl.status,
            crawl.elapsed_seconds(),
            crawl.total_users.map_or("-".to_string(), |v| v.to_string()),
            crawl.error_text().unwrap_or(""),
        );
    }
    println!(
        "\nPage {} of {} ({} total)",
        page.page,
        page.page_count().max(1),
        page.total
    );

    Ok(())
}
