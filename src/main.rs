//! thunder-dispatch server binary.
//!
//! Routing modules under `api/` and hook modules under `hooks/` are compiled
//! in below; their files on disk are what the resolver and hook loader walk.

#[path = "../api/index.rs"]
mod api_index;
#[path = "../api/users.rs"]
mod api_users;
#[path = "../api/v1/status.rs"]
mod api_v1_status;
#[path = "../hooks/auth.rs"]
mod hook_auth;
#[path = "../hooks/timing.rs"]
mod hook_timing;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::json;
use tokio::net::TcpListener;

use thunder_dispatch::config::{load_or_default, DispatchConfig};
use thunder_dispatch::dispatch::Dispatcher;
use thunder_dispatch::hooks::{HookCatalog, HookLoader};
use thunder_dispatch::http::HttpServer;
use thunder_dispatch::lifecycle::{spawn_signal_listener, Shutdown};
use thunder_dispatch::modules::{ModuleCatalog, ModuleRegistry, ModuleWatcher};
use thunder_dispatch::observability::{init_logging, metrics};

#[derive(Parser)]
#[command(name = "thunder-dispatch")]
#[command(about = "Filesystem-convention HTTP dispatcher", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve requests
    Serve {
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print discovered modules, routes and hooks as JSON
    Routes {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn module_catalog() -> ModuleCatalog {
    let mut catalog = ModuleCatalog::new();
    catalog
        .register("index", api_index::router)
        .register("users", api_users::router)
        .register("v1/status", api_v1_status::router);
    catalog
}

fn hook_catalog() -> HookCatalog {
    let mut catalog = HookCatalog::new();
    catalog
        .register("auth", hook_auth::hook())
        .register("timing", hook_timing::hook());
    catalog
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve { config } => serve(config).await,
        Commands::Routes { config } => routes(config).await,
    }
}

async fn serve(path: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let config = load_or_default(path.as_deref())?;
    init_logging(&config.observability.log_level);

    tracing::info!("thunder-dispatch v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        api_root = %config.routes.api_root.display(),
        hooks_root = %config.hooks.root.display(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let registry = ModuleRegistry::discover(
        &module_catalog(),
        &config.routes.api_root,
        &config.routes.module_extension,
    )
    .await?;
    let dispatcher = Arc::new(Dispatcher::from_config(&config, Arc::new(registry), hook_catalog()));

    // Held for the lifetime of the server.
    let _watcher = if config.routes.watch {
        let watcher = ModuleWatcher::new(
            dispatcher.resolver().cache().clone(),
            Arc::clone(dispatcher.hooks().cache()),
        )
        .watch_root(&config.routes.api_root)
        .watch_root(&config.hooks.root);
        Some(watcher.run()?)
    } else {
        None
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let stop = shutdown.subscribe();
    spawn_signal_listener(shutdown);

    HttpServer::new(config, dispatcher).run(listener, stop).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn routes(path: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let config: DispatchConfig = load_or_default(path.as_deref())?;
    init_logging("warn");

    let registry = ModuleRegistry::discover(
        &module_catalog(),
        &config.routes.api_root,
        &config.routes.module_extension,
    )
    .await?;

    let hooks = HookLoader::new(&config.hooks.root, config.hooks.extension.as_str(), hook_catalog())
        .load()
        .await?;
    let hooks: Vec<_> = hooks
        .iter()
        .map(|hook| {
            json!({
                "name": hook.name(),
                "priority": hook.priority(),
                "pre": hook.pre().is_some(),
                "post": hook.post().is_some(),
            })
        })
        .collect();

    let table = json!({
        "mount": format!("/{}/", config.routes.mount.trim_matches('/')),
        "modules": registry.report(),
        "hooks": hooks,
    });
    println!("{}", serde_json::to_string_pretty(&table)?);
    Ok(())
}
