//! Vantage Binary Entry Point
//!
//! `vantage serve` runs the dashboard with scheduled re-runs.
//! `vantage check` runs a single sweep and prints the report.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vantage::{
    AppConfig, Coordinator, FanoutSink, HttpProber, SiteRegistry, SnapshotSink, TracingSink,
    config::parse_duration,
    report::{RunReport, render_text},
    scheduler::RunScheduler,
    server::{AppState, create_router},
};

/// Vantage - Network Connectivity Tester
#[derive(Parser, Debug)]
#[command(name = "vantage", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "configs/config.yaml",
        env = "VANTAGE_CONFIG"
    )]
    config: String,

    /// Path to the site registry (overrides config file)
    #[arg(short, long, env = "VANTAGE_SITES")]
    sites: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the dashboard and JSON API
    Serve {
        /// Server bind address (overrides config file)
        #[arg(long, env = "VANTAGE_SERVER_BIND")]
        bind: Option<String>,

        /// Server port (overrides config file)
        #[arg(long, env = "VANTAGE_SERVER_PORT")]
        port: Option<u16>,
    },

    /// Run a single sweep and print the results
    Check {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Probes in flight at once (overrides config file)
        #[arg(long)]
        concurrency: Option<usize>,

        /// Per-probe timeout, e.g. "5s" (overrides config file)
        #[arg(long, value_parser = parse_duration)]
        timeout: Option<Duration>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so `check` output stays clean on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,vantage=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    tracing::info!("Loading configuration from: {}", cli.config);
    let mut config = AppConfig::load_or_default(&cli.config)?;

    // CLI > ENV > config file
    if let Some(sites) = cli.sites {
        config.sites_path = sites;
    }

    match cli.command {
        Command::Serve { bind, port } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;
            serve(config).await
        }
        Command::Check {
            json,
            concurrency,
            timeout,
        } => {
            if let Some(concurrency) = concurrency {
                config.concurrency = concurrency;
            }
            if let Some(timeout) = timeout {
                config.probe.timeout = timeout;
            }
            config.validate()?;
            check(config, json).await
        }
    }
}

fn load_registry(config: &AppConfig) -> Result<SiteRegistry, Box<dyn std::error::Error>> {
    tracing::info!("Loading sites from: {}", config.sites_path);
    let registry = SiteRegistry::load(&config.sites_path)?;
    tracing::info!("Loaded {} sites", registry.len());
    Ok(registry)
}

async fn serve(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let registry = load_registry(&config)?;
    let prober = HttpProber::new(config.probe.clone())?;

    let snapshot = Arc::new(SnapshotSink::new());
    let sink = FanoutSink::default()
        .with(snapshot.clone())
        .with(Arc::new(TracingSink));

    let coordinator = Arc::new(
        Coordinator::new(registry, Arc::new(prober), Arc::new(sink))
            .with_concurrency(config.concurrency),
    );

    // First run starts right away; the page shows pending sites until it lands
    coordinator.trigger();

    let scheduler = match config.refresh.schedule()? {
        Some(schedule) => {
            let mut scheduler = RunScheduler::new().await?;
            scheduler.schedule(&schedule, Arc::clone(&coordinator)).await?;
            scheduler.start().await?;
            Some(scheduler)
        }
        None => {
            tracing::info!("No refresh schedule configured, runs start on demand");
            None
        }
    };

    let app = create_router(AppState {
        coordinator,
        snapshot,
    });

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;

    tracing::info!("Web server listening on: http://{}", addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(scheduler))
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn check(config: AppConfig, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let registry = load_registry(&config)?;
    let prober = HttpProber::new(config.probe.clone())?;

    let coordinator = Coordinator::new(registry, Arc::new(prober), Arc::new(TracingSink))
        .with_concurrency(config.concurrency);
    let run = coordinator.run().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&RunReport::new(&run))?);
    } else {
        print!("{}", render_text(&run));
    }
    Ok(())
}

/// Setup graceful shutdown signal handler.
async fn shutdown_signal(scheduler: Option<RunScheduler>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal");
        }
    }

    if let Some(scheduler) = scheduler {
        tracing::info!("Shutting down scheduler...");
        if let Err(e) = scheduler.shutdown().await {
            tracing::error!("Failed to shutdown scheduler: {}", e);
        }
    }
}
