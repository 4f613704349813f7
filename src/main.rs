use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use farm_timers::application::{AuditLog, Clock, ExpiryScheduler, Notifier, TimerRepository, TimerStore};
use farm_timers::infrastructure::{
    broadcast_notifier::BroadcastNotifier,
    clock::SystemClock,
    console_notifier::ConsoleNotifier,
    event_bus::EventBus,
    memory_store::{InMemoryAuditLog, InMemoryTimerRepository},
    multi_notifier::MultiNotifier,
    sqlite_store::SqliteStore,
    webhook_notifier::WebhookNotifier,
};
use farm_timers::interfaces::config::Config;
use farm_timers::interfaces::http_api::{ApiState, build_router};

#[derive(Parser, Debug)]
#[command(name = "farm-timers")]
struct Args {
    /// Path to config.yaml; built-in defaults when absent
    #[arg(long)]
    config: Option<String>,

    /// Do not send external notifications (console and stream only)
    #[arg(long)]
    dry_run: bool,

    /// Keep all state in memory (nothing survives a restart)
    #[arg(long)]
    ephemeral: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("farm_timers=info".parse()?),
        )
        .init();
    if dotenvy::dotenv().is_err() {
        let _ = dotenvy::from_path(std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env"));
    }
    let args = Args::parse();

    // 1) load config
    let mut cfg = match &args.config {
        Some(path) => match Config::load_from_file(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!("Failed to load config {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };
    cfg.apply_env();
    cfg.validate()?;

    // 2) storage
    let (repo, audit): (Arc<dyn TimerRepository>, Arc<dyn AuditLog>) = if args.ephemeral {
        tracing::warn!("--ephemeral enabled: timers are not persisted");
        let repo: Arc<dyn TimerRepository> = Arc::new(InMemoryTimerRepository::new());
        let audit: Arc<dyn AuditLog> = Arc::new(InMemoryAuditLog::new());
        (repo, audit)
    } else {
        let sqlite = Arc::new(SqliteStore::new(&cfg.database_url).await?);
        let repo: Arc<dyn TimerRepository> = sqlite.clone();
        let audit: Arc<dyn AuditLog> = sqlite;
        (repo, audit)
    };

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let store = Arc::new(TimerStore::new(cfg.catalog(), repo, audit, clock.clone()));
    store.initialize().await?;
    store.load_all(clock.now()).await?;

    // 3) notifiers fanout
    let bus = EventBus::new(256);
    let mut notifiers: Vec<Box<dyn Notifier>> = vec![];
    notifiers.push(Box::new(ConsoleNotifier::new()));
    notifiers.push(Box::new(BroadcastNotifier::new(bus.clone())));

    if !args.dry_run {
        if let Some(url) = cfg.webhook_url.clone() {
            notifiers.push(Box::new(WebhookNotifier::new(url)));
        } else {
            tracing::warn!("webhook_url not set, WebhookNotifier disabled");
        }
    } else {
        tracing::warn!("--dry-run enabled: only console output");
    }
    let notifier: Arc<dyn Notifier> = Arc::new(MultiNotifier::new(notifiers));

    // 4) scheduler
    let scheduler = ExpiryScheduler::new(store.clone(), notifier, clock.clone())
        .with_interval(cfg.scan_interval())
        .with_delivery_timeout(cfg.delivery_timeout())
        .spawn();

    // 5) http
    let app = build_router(ApiState {
        store,
        clock,
        api_token: cfg.api_token.clone(),
        event_bus: Some(bus),
    });
    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr).await?;
    tracing::info!(addr = %cfg.listen_addr, "http api listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
        })
        .await?;

    scheduler.abort();
    Ok(())
}
