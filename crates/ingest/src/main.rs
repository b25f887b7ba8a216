use std::sync::Arc;

use aquaalert_ingest::config::IngestConfig;
use aquaalert_ingest::pipeline::IngestionPipeline;
use aquaalert_ingest::state::AppState;
use aquaalert_ingest::store::PgUplinkStore;
use aquaalert_mqtt::{ConnectionManager, MqttConnector, ReconnectConfig, StopOutcome};
use aquaalert_notify::TelegramNotifier;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    init_tracing();

    // --- Configuration ---
    let config = match IngestConfig::from_env() {
        Ok(config) => config,
        Err(e) => fail("Invalid configuration", &e),
    };
    let addr = match config.bind_addr() {
        Ok(addr) => addr,
        Err(e) => fail("Invalid configuration", &e),
    };
    tracing::info!(
        broker = %config.mqtt.host,
        port = config.mqtt.port,
        telegram = config.telegram.is_configured(),
        "Loaded configuration",
    );

    // --- Database ---
    let pool = match aquaalert_db::create_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => fail("Failed to connect to database", &e),
    };
    tracing::info!("Database connection pool created");

    if let Err(e) = aquaalert_db::health_check(&pool).await {
        fail("Database health check failed", &e);
    }
    if let Err(e) = aquaalert_db::run_migrations(&pool).await {
        fail("Failed to run database migrations", &e);
    }
    tracing::info!("Database migrations applied");

    // --- Pipeline ---
    let notifier = match TelegramNotifier::new(config.telegram.clone()) {
        Ok(notifier) => notifier,
        Err(e) => fail("Failed to build Telegram client", &e),
    };
    if !config.telegram.is_configured() {
        tracing::warn!("TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID not set, alerts will not be sent");
    }
    let pipeline = Arc::new(IngestionPipeline::new(
        PgUplinkStore::new(pool.clone()),
        notifier,
    ));

    // --- Uplink listener ---
    let reconnect = ReconnectConfig::with_delay(config.mqtt.retry_delay);
    let listener = ConnectionManager::start(
        MqttConnector::new(config.mqtt.clone()),
        pipeline,
        reconnect,
    );
    tracing::info!("Uplink listener started");

    // --- HTTP ---
    let state = AppState {
        pool,
        device_defaults: config.device_defaults,
        listener: Arc::clone(&listener),
    };
    let app = aquaalert_ingest::app(state).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    let tcp = match tokio::net::TcpListener::bind(addr).await {
        Ok(tcp) => tcp,
        Err(e) => fail("Failed to bind HTTP address", &e),
    };
    tracing::info!(%addr, "Starting HTTP server");

    if let Err(e) = axum::serve(tcp, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "HTTP server error");
    }

    // --- Post-shutdown cleanup ---
    tracing::info!("HTTP server stopped, stopping uplink listener");
    match listener.shutdown().await {
        StopOutcome::Stopped => tracing::info!("Uplink listener stopped cleanly"),
        StopOutcome::TimedOut => tracing::warn!("Uplink listener aborted after timeout"),
    }

    tracing::info!("Graceful shutdown complete");
}

/// Registry with an `EnvFilter` and a human or JSON formatter.
///
/// `LOG_FORMAT=json` switches to one JSON object per line.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "aquaalert_ingest=debug,aquaalert_mqtt=info,aquaalert_notify=info,tower_http=info".into()
    });

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Log a startup failure and exit with status 1.
fn fail(context: &str, error: &dyn std::fmt::Display) -> ! {
    tracing::error!(error = %error, "{context}");
    std::process::exit(1);
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
