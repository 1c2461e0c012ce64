//! Feedback interview service binary.
//!
//! Wiring order: config → tracing → storage → generator → rate limiter and
//! janitor → orchestrator → HTTP server with graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{header::CONTENT_TYPE, HeaderName, HeaderValue, Method};
use sqlx::postgres::PgPoolOptions;
use tokio::sync::watch;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use feedback_interviews::adapters::ai::{MockTurnGenerator, OpenAIConfig, OpenAITurnGenerator};
use feedback_interviews::adapters::http::api_router;
use feedback_interviews::adapters::memory::{
    InMemoryMessageLog, InMemorySessionRepository, InMemoryTemplateReader,
};
use feedback_interviews::adapters::postgres::{
    PostgresMessageLog, PostgresSessionRepository, PostgresTemplateReader, MIGRATOR,
};
use feedback_interviews::adapters::rate_limiter::{
    RateLimiterJanitor, RateLimiterJanitorConfig, SlidingWindowRateLimiter,
};
use feedback_interviews::adapters::summary::LoggingSummaryScheduler;
use feedback_interviews::application::{InterviewOrchestrator, OrchestratorDeps};
use feedback_interviews::config::{AiConfig, AiProvider, AppConfig, ServerConfig, StoreBackend};
use feedback_interviews::domain::foundation::{
    QuestionId, RelationshipId, SessionId, SessionToken, TemplateId,
};
use feedback_interviews::domain::interview::{
    Question, RatingScale, RelationshipOption, Template,
};
use feedback_interviews::domain::session::{Session, Subject};
use feedback_interviews::ports::{
    MessageLog, SessionRepository, TemplateReader, TurnGenerator,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // --- Configuration ---
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        environment = ?config.server.environment,
        "Loaded configuration"
    );

    // --- Storage ---
    let (sessions, messages, templates) = build_storage(&config).await?;

    // --- Turn generator ---
    let generator = build_generator(&config.ai)?;
    let info = generator.generator_info();
    tracing::info!(generator = %info.name, model = %info.model, "Turn generator ready");

    // --- Rate limiter + janitor ---
    let limiter = Arc::new(SlidingWindowRateLimiter::new());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let janitor = RateLimiterJanitor::new(
        limiter.clone(),
        RateLimiterJanitorConfig::default().with_interval(config.rate_limiter.gc_interval()),
    );
    let janitor_handle = tokio::spawn(async move { janitor.run(shutdown_rx).await });

    // --- Orchestrator ---
    let orchestrator = Arc::new(InterviewOrchestrator::new(
        OrchestratorDeps {
            sessions,
            messages,
            templates,
            generator,
            rate_limiter: limiter,
            summaries: Arc::new(LoggingSummaryScheduler::new()),
        },
        config.orchestrator.pipeline_settings(),
    ));

    // --- Router ---
    let request_id_header = HeaderName::from_static("x-request-id");
    let app = api_router(orchestrator)
        .layer(CompressionLayer::new())
        .layer(DefaultBodyLimit::max(config.server.body_limit_bytes))
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(build_cors_layer(&config.server));

    // --- Serve ---
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Starting server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // --- Shutdown ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    let _ = shutdown_tx.send(true);
    if tokio::time::timeout(Duration::from_secs(5), janitor_handle)
        .await
        .is_err()
    {
        tracing::warn!("Rate limiter janitor did not stop in time");
    }
    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// JSON logs in production, human-readable output elsewhere.
fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(server.log_level.clone()));
    let registry = tracing_subscriber::registry().with(filter);

    if server.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().pretty()).init();
    }
}

type Storage = (
    Arc<dyn SessionRepository>,
    Arc<dyn MessageLog>,
    Arc<dyn TemplateReader>,
);

async fn build_storage(config: &AppConfig) -> Result<Storage, BoxError> {
    let StoreBackend::Postgres { url } = config.database.backend() else {
        tracing::warn!("No database configured; sessions are kept in memory");
        let sessions = Arc::new(InMemorySessionRepository::new());
        let templates = Arc::new(InMemoryTemplateReader::new());
        if config.server.seeds_demo_interview() {
            seed_demo_interview(sessions.as_ref(), templates.as_ref()).await?;
        }
        return Ok((sessions, Arc::new(InMemoryMessageLog::new()), templates));
    };

    let db = &config.database;
    let pool = PgPoolOptions::new()
        .min_connections(db.min_connections)
        .max_connections(db.max_connections)
        .acquire_timeout(db.acquire_timeout())
        .connect(url)
        .await?;
    tracing::info!("Database connection pool created");

    if db.run_migrations {
        MIGRATOR.run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    Ok((
        Arc::new(PostgresSessionRepository::new(pool.clone())),
        Arc::new(PostgresMessageLog::new(pool.clone())),
        Arc::new(PostgresTemplateReader::new(pool)),
    ))
}

fn build_generator(config: &AiConfig) -> Result<Arc<dyn TurnGenerator>, BoxError> {
    match config.provider {
        AiProvider::Mock => {
            tracing::warn!("Using canned interviewer replies");
            Ok(Arc::new(MockTurnGenerator::new()))
        }
        AiProvider::OpenAI => {
            let key = config
                .openai_api_key
                .clone()
                .ok_or("OPENAI_API_KEY is not configured")?;
            let openai = OpenAIConfig::new(key)
                .with_model(config.model.clone())
                .with_base_url(config.base_url.clone())
                .with_timeout(config.timeout())
                .with_temperature(Some(config.temperature))
                .with_max_tokens(Some(config.max_tokens));
            Ok(Arc::new(OpenAITurnGenerator::new(openai)?))
        }
    }
}

fn build_cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
}

/// Creates one template and one invitation so a local run can be exercised
/// without a database.
async fn seed_demo_interview(
    sessions: &InMemorySessionRepository,
    templates: &InMemoryTemplateReader,
) -> Result<(), BoxError> {
    let template = Template::new(
        TemplateId::new(),
        "Peer feedback",
        Some("Friendly and concise.".to_string()),
        vec![
            RelationshipOption::new(RelationshipId::new("peer")?, "Peer"),
            RelationshipOption::new(RelationshipId::new("manager")?, "Manager"),
            RelationshipOption::new(RelationshipId::new("report")?, "Direct report"),
        ],
        vec![
            Question::text(
                QuestionId::new("strengths")?,
                "What does {{subjectName}} do especially well?",
            )
            .collecting_multiple(),
            Question::text(
                QuestionId::new("growth")?,
                "Where could {{subjectName}} grow?",
            ),
            Question::rating(
                QuestionId::new("overall")?,
                "How would you rate working with {{subjectName}}?",
                RatingScale::new(1.0, 10.0)?,
            ),
        ],
    )?;
    let session = Session::new(
        SessionId::new(),
        SessionToken::generate(),
        *template.id(),
        Subject::new("Alex Morgan", Some("Engineering Manager".to_string()))?,
    );

    templates.put(template).await;
    sessions.insert(&session).await?;
    tracing::info!(token = %session.token(), "Seeded demo interview");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
