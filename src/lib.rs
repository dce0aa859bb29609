pub mod api;
pub mod cli;
pub mod clients;
pub mod config;
pub mod constants;
pub mod db;
pub mod entities;
pub mod services;
pub mod state;

use anyhow::Context;
use clap::Parser;
use tokio::signal;

use cli::{Cli, Commands, HistoryView};
pub use config::Config;
use db::Store;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?;
    config.validate()?;

    init_tracing(&config);

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Serve => {
            let prometheus_handle = if config.observability.metrics_enabled {
                use metrics_exporter_prometheus::PrometheusBuilder;
                let handle = PrometheusBuilder::new()
                    .install_recorder()
                    .context("Failed to install Prometheus recorder")?;
                info!("Prometheus metrics recorder initialized");
                Some(handle)
            } else {
                None
            };
            run_server(config, prometheus_handle).await
        }

        Commands::Migrate => {
            let store = Store::with_pool_options(
                &config.general.database_path,
                config.general.max_db_connections,
                config.general.min_db_connections,
            )
            .await?;
            store.migrate().await?;
            println!("✓ Database is up to date: {}", config.general.database_path);
            Ok(())
        }

        Commands::Init => {
            if Config::create_default_if_missing()? {
                println!("✓ Config file created. Edit config.toml and run again.");
            } else {
                println!("config.toml already exists, leaving it untouched.");
            }
            Ok(())
        }

        Commands::Search {
            query,
            radius,
            categories,
            username,
        } => {
            cli::cmd_search(
                &config,
                &query.join(" "),
                radius,
                categories,
                username.as_deref(),
            )
            .await
        }

        Commands::Register { username } => cli::cmd_register(&config, &username).await,

        Commands::History {
            username,
            popular,
            limit,
            keyword,
        } => {
            let view = match (popular, keyword) {
                (true, _) => HistoryView::Popular { limit },
                (false, Some(keyword)) => HistoryView::Keyword(keyword),
                (false, None) => HistoryView::All,
            };
            cli::cmd_history(&config, &username, view).await
        }

        Commands::DeleteUser { username } => cli::cmd_delete_user(&config, &username).await,
    }
}

fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let json = config.general.log_format.eq_ignore_ascii_case("json");
    let (json_layer, pretty_layer) = if json {
        (Some(tracing_subscriber::fmt::layer().json()), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer()))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .init();
}

async fn run_server(
    config: Config,
    prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
) -> anyhow::Result<()> {
    info!(
        "Destination Finder v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    if !config.server.enabled {
        warn!("server.enabled is false in config; nothing to serve");
        return Ok(());
    }

    if config.geocoding.api_key.is_empty() || config.places.api_key.is_empty() {
        warn!("GEOCODING_API_KEY or PLACES_API_KEY is not set; searches will fail upstream");
    }

    let port = config.server.port;
    let api_state = api::create_app_state_from_config(config, prometheus_handle).await?;
    api_state.store().migrate().await?;

    let app = api::router(api_state);
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("🌐 Web Server running at http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {}", e),
    }
}
