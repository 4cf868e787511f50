use std::env;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use database::Database;
use openai_brain::{load_prompt_file, OpenAiModel, DEFAULT_PROMPT_FILE};
use orchestrator::{EngineConfig, Orchestrator};
use scheduler::{Scheduler, SchedulerConfig, SchedulerHandles};
use telegram::{BotClient, TelegramGate, Update};

#[derive(Clone)]
struct AppState {
    engine: Arc<Orchestrator>,
    handles: Arc<SchedulerHandles>,
    webhook_secret: Arc<String>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let token = match env::var("TELEGRAM_BOT_TOKEN") {
        Ok(token) if !token.is_empty() => token,
        _ => {
            error!("TELEGRAM_BOT_TOKEN must be set");
            std::process::exit(1);
        }
    };
    let webhook_secret = env::var("WEBHOOK_SECRET").unwrap_or_else(|_| token.clone());
    let database_url = env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:drinking_buddy.db?mode=rwc".to_string());
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let db = match Database::connect(&database_url).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to {}: {}", database_url, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = db.migrate().await {
        error!("Migration failed: {}", e);
        std::process::exit(1);
    }

    let model = match OpenAiModel::from_env() {
        Ok(model) => Arc::new(model),
        Err(e) => {
            error!("Failed to initialize model backend: {}", e);
            std::process::exit(1);
        }
    };

    let client = match BotClient::new(&token) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build Telegram client: {}", e);
            std::process::exit(1);
        }
    };
    match client.get_me().await {
        Ok(me) => info!("Running as @{}", me.username.unwrap_or_else(|| me.id.to_string())),
        Err(e) => warn!("getMe failed (continuing anyway): {}", e),
    }
    if let Ok(public_url) = env::var("WEBHOOK_PUBLIC_URL") {
        if !public_url.is_empty() {
            let url = format!("{}/webhook/{}", public_url.trim_end_matches('/'), webhook_secret);
            match client.set_webhook(&url).await {
                Ok(()) => info!("Webhook registered at {}", public_url),
                Err(e) => error!("Failed to register webhook: {}", e),
            }
        }
    }
    let gate = Arc::new(TelegramGate::new(client));

    let persona_file =
        env::var("PERSONA_FILE").unwrap_or_else(|_| DEFAULT_PROMPT_FILE.to_string());
    let mut engine_config = EngineConfig::from_env();
    if let Some(persona) = load_prompt_file(&persona_file) {
        info!("Loaded persona from {}", persona_file);
        engine_config = engine_config.with_persona(persona);
    }

    let engine = Arc::new(Orchestrator::new(
        db.clone(),
        model.clone(),
        gate.clone(),
        engine_config,
    ));

    let sched = Arc::new(Scheduler::new(
        db.clone(),
        model,
        gate,
        SchedulerConfig::from_env(),
    ));
    let handles = Arc::new(sched.spawn());

    let state = AppState {
        engine,
        handles,
        webhook_secret: Arc::new(webhook_secret),
    };

    let app = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/webhook/:secret", post(receive_update))
        .with_state(state);

    info!("Listening on {}", bind_addr);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await.unwrap();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    db.close().await;
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}

/// Liveness: healthy only while both re-engagement loops are running.
async fn health(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.handles.is_alive() {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "schedulers stopped")
    }
}

/// Webhook ingress. A wrong secret is rejected; everything else is
/// acknowledged with 200 so the platform never retries storms at us, and
/// handling failures stay in the logs.
async fn receive_update(
    Path(secret): Path<String>,
    State(state): State<AppState>,
    Json(update): Json<Update>,
) -> StatusCode {
    if secret != *state.webhook_secret {
        warn!("Rejected webhook call with bad secret");
        return StatusCode::FORBIDDEN;
    }
    if !state.handles.is_alive() {
        return StatusCode::SERVICE_UNAVAILABLE;
    }

    let update_id = update.update_id;
    if let Some(event) = update.into_event() {
        if let Err(e) = state.engine.handle_event(event).await {
            error!("Failed to handle update {}: {}", update_id, e);
        }
    }

    StatusCode::OK
}
