mod args;
mod config;
mod dirs;

use std::io;
use std::net::SocketAddr;

use app_api::AppContext;
use http_api::HttpState;
use pruner_app::{AppPaths, AppState, MaintenanceScheduler, ensure_app_data_dir};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::args::{CliArgs, Command};
use crate::config::CliConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = args::parse_args().map_err(|err| {
        eprintln!("{err}");
        args::print_help();
        io::Error::new(io::ErrorKind::InvalidInput, "invalid arguments")
    })?;

    let loaded = config::load_or_create().map_err(io::Error::other)?;
    init_tracing(&loaded.config.log_level);
    if loaded.created {
        info!(path = %loaded.paths.file.display(), "created default config");
    }

    let data_dir = dirs::resolve_data_dir(args.data_dir.as_deref(), loaded.config.data_dir.as_deref())
        .map_err(io::Error::other)?;
    let paths = AppPaths::new(data_dir);
    ensure_app_data_dir(&paths).map_err(|err| io::Error::other(err.to_string()))?;
    info!(data_dir = %paths.app_data_dir.display(), "using data dir");

    let app_state = AppState::new(paths.db_path);
    app_state
        .setup_db()
        .map_err(|err| io::Error::other(format!("failed to initialize database: {}", err)))?;

    match args.command.clone() {
        Command::Serve => serve(app_state, &args, loaded.config).await,
        Command::ProjectAdd { name, plan } => {
            let created = app_state
                .services
                .projects
                .create(&name, plan)
                .map_err(|err| io::Error::other(err.to_string()))?;
            println!("Project: {}", created.project.id);
            println!("Plan:    {}", created.project.plan);
            println!("API key: {}", created.api_key);
            println!("Store the key now; it cannot be shown again.");
            Ok(())
        }
        Command::ProjectPlan { id, plan } => {
            let project = app_state
                .services
                .projects
                .set_plan(&id, plan)
                .map_err(|err| io::Error::other(err.to_string()))?;
            println!("Project {} is now on the {} plan.", project.id, project.plan);
            Ok(())
        }
        Command::RunMaintenance => {
            let scheduler = MaintenanceScheduler::new(
                app_state.services.maintenance.clone(),
                loaded.config.maintenance,
            );
            let report = scheduler
                .run_now()
                .await
                .map_err(|err| io::Error::other(err.to_string()))?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}

async fn serve(
    app_state: AppState,
    args: &CliArgs,
    config: CliConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let (context, writer_handle) =
        AppContext::start(app_state, config.maintenance, config.ingest.queue_capacity);

    let scheduler_handle = if config.maintenance.enabled && !args.no_scheduler {
        Some(context.scheduler.clone().spawn())
    } else {
        info!("daily maintenance disabled");
        None
    };
    if config.admin_token.is_none() {
        info!("admin token not set, /maintenance/run-now disabled");
    }

    let state = HttpState::new(context, config.admin_token.clone());
    let router = http_api::router(state);

    let host = args.host.clone().unwrap_or(config.host);
    let port = args.port.unwrap_or(config.port);
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, format!("bind address: {err}")))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "codepruner listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = scheduler_handle {
        handle.abort();
    }
    info!("draining event writer");
    if let Err(err) = writer_handle.await {
        error!(error = %err, "event writer did not shut down cleanly");
    }
    Ok(())
}

/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "codepruner={level},pruner_app={level},ingest={level},http_api={level},tower_http={level},warn"
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
    }
}
