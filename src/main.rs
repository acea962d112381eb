//! Parlance Service API - server entry point.

use std::sync::Arc;
use std::time::Duration;

use http::HeaderValue;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parlance::adapters::ai::{
    OpenAiSpeechClient, OpenAiSpeechConfig, OpenAiSuggestionConfig, OpenAiSuggestionGenerator,
};
use parlance::adapters::auth::PostgresTokenValidator;
use parlance::adapters::http::middleware::ServiceAuthState;
use parlance::adapters::http::service_api::{service_api_router, ServiceApiState};
use parlance::adapters::postgres::{
    PostgresConversationReader, PostgresEndUserStore, PostgresFeedbackRepository,
    PostgresMessageReader,
};
use parlance::adapters::rate_limiter::{InMemoryRateLimiter, RateLimitSettings, RedisRateLimiter};
use parlance::adapters::signing::HmacFileUrlSigner;
use parlance::application::handlers::audio::{SynthesizeSpeechHandler, TranscribeAudioHandler};
use parlance::application::handlers::message::{
    ListAppFeedbacksHandler, ListMessagesHandler, SubmitFeedbackHandler, SuggestedQuestionsHandler,
};
use parlance::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.server.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .idle_timeout(config.database.idle_timeout())
        .max_lifetime(config.database.max_lifetime())
        .connect(&config.database.url)
        .await?;

    tracing::info!("Connected to database");

    // Persistence adapters
    let conversations = Arc::new(PostgresConversationReader::new(pool.clone()));
    let messages = Arc::new(PostgresMessageReader::new(pool.clone()));
    let feedbacks = Arc::new(PostgresFeedbackRepository::new(pool.clone()));
    let end_users = Arc::new(PostgresEndUserStore::new(pool.clone()));
    let validator: ServiceAuthState = Arc::new(PostgresTokenValidator::new(pool.clone()));

    // Signed file URLs
    let signer = Arc::new(HmacFileUrlSigner::from_config(&config.files));

    // AI providers
    let api_key = config.ai.api_key.clone().unwrap_or_default();
    let generator = Arc::new(OpenAiSuggestionGenerator::new(
        OpenAiSuggestionConfig::new(api_key.clone())
            .with_model(config.ai.suggestion_model.clone())
            .with_base_url(config.ai.base_url.clone())
            .with_timeout(config.ai.timeout())
            .with_max_retries(config.ai.max_retries),
    ));
    let speech = Arc::new(OpenAiSpeechClient::new(
        OpenAiSpeechConfig::new(api_key)
            .with_transcription_model(config.ai.transcription_model.clone())
            .with_speech_model(config.ai.speech_model.clone())
            .with_base_url(config.ai.base_url.clone())
            .with_timeout(config.ai.timeout()),
    ));

    // Operation handlers
    let state = ServiceApiState::new(
        end_users,
        Arc::new(ListMessagesHandler::new(
            conversations,
            messages.clone(),
            signer,
        )),
        Arc::new(SubmitFeedbackHandler::new(
            messages.clone(),
            feedbacks.clone(),
        )),
        Arc::new(ListAppFeedbacksHandler::new(feedbacks)),
        Arc::new(SuggestedQuestionsHandler::new(messages.clone(), generator)),
        Arc::new(TranscribeAudioHandler::new(speech.clone())),
        Arc::new(SynthesizeSpeechHandler::new(messages, speech)),
    );

    // Rate limiting: Redis when configured, in-process otherwise
    let state = match &config.redis {
        Some(redis_config) => {
            let client = redis::Client::open(redis_config.url.as_str())?;
            let conn = client.get_multiplexed_tokio_connection().await?;
            tracing::info!("Connected to Redis");
            state.with_rate_limiter(Arc::new(RedisRateLimiter::new(
                conn,
                RateLimitSettings::default(),
            )))
        }
        None => state.with_rate_limiter(Arc::new(InMemoryRateLimiter::with_defaults())),
    };

    let mut app = service_api_router(validator)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(CompressionLayer::new())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    let origins = config.server.cors_origins_list();
    if !origins.is_empty() {
        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        app = app.layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    let addr = config.server.socket_addr();
    tracing::info!(%addr, "Service API listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
