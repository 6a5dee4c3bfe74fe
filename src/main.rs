use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quizbeam::config::{self, ServerConfig};
use quizbeam::content::QuestionSet;
use quizbeam::state::{AppState, LocalFiles};
use quizbeam::store::{DisabledVoteStore, PgVoteStore, VoteStore};
use quizbeam::ws;

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quizbeam=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting quiz server...");

    let server_config = ServerConfig::from_env();

    // A missing or unreachable database degrades vote persistence but never
    // prevents the show from running.
    let store: Arc<dyn VoteStore> = match &server_config.database_url {
        Some(url) => match PgVoteStore::connect(url).await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                tracing::warn!("Database unavailable, votes will not be persisted: {}", e);
                Arc::new(DisabledVoteStore)
            }
        },
        None => Arc::new(DisabledVoteStore),
    };

    let questions = QuestionSet::load(server_config.questions_path.as_deref());
    tracing::info!("Loaded {} questions", questions.len());

    let timers = config::load_timer_config(&server_config.timers_path);

    let state = Arc::new(AppState::new(
        questions,
        store,
        timers,
        LocalFiles {
            snapshot: Some(server_config.snapshot_path.clone()),
            timers: Some(server_config.timers_path.clone()),
        },
    ));

    // Resume a session interrupted by a crash or redeploy.
    if state.restore_from_snapshot().await {
        tracing::info!("Resumed interrupted game session");
    }

    let app = Router::new()
        .route("/ws", get(ws::ws_handler))
        .fallback_service(ServeDir::new("static"))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], server_config.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
