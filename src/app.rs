use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::database::{DatabaseManager, MemoryProfileRepository, PgProfileRepository, ProfileRepository};
use crate::handlers;
use crate::middleware::jwt_auth_middleware;
use crate::upload::{CloudinaryUploader, DisabledUploader, ImageUploader};

/// Shared handler dependencies
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub uploader: Arc<dyn ImageUploader>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        profiles: Arc<dyn ProfileRepository>,
        uploader: Arc<dyn ImageUploader>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            profiles,
            uploader,
        }
    }

    /// Wire the configured repository and uploader; runs migrations when enabled
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let profiles: Arc<dyn ProfileRepository> = if config.database.in_memory {
            tracing::warn!("Using in-memory profile storage; data is lost on restart");
            let repo = MemoryProfileRepository::new();
            for seed in &config.database.seed_users {
                let user = repo.add_user(seed.name.clone(), seed.email.clone()).await;
                tracing::info!("Seeded user {} <{}> as id {}", user.name, user.email, user.id);
            }
            Arc::new(repo)
        } else {
            let pool = DatabaseManager::connect(&config.database)?;
            if config.database.run_migrations {
                if let Err(e) = DatabaseManager::migrate(&pool).await {
                    tracing::error!("Skipping migrations: {}", e);
                }
            }
            Arc::new(PgProfileRepository::new(pool))
        };

        let uploader: Arc<dyn ImageUploader> = match CloudinaryUploader::from_config(&config.upload)? {
            Some(cloudinary) => Arc::new(cloudinary),
            None => {
                tracing::warn!("Cloudinary credentials not set; profile image uploads are disabled");
                Arc::new(DisabledUploader)
            }
        };

        Ok(Self::new(config, profiles, uploader))
    }
}

pub fn app(state: AppState) -> Router {
    let cors = build_cors(&state.config);
    let body_limit = state.config.api.max_request_size_bytes;

    let mut router = Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .nest("/api/v1", profile_routes(state.clone()))
        .with_state(state.clone())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors);

    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn profile_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/profiles", get(handlers::find_profiles))
        .route(
            "/profile",
            post(handlers::create_profile).patch(handlers::update_profile),
        )
        .route(
            "/profile/:id",
            get(handlers::get_profile).delete(handlers::delete_profile),
        )
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn build_cors(config: &AppConfig) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::PATCH, Method::DELETE];
    let has_wildcard = config.security.cors_origins.iter().any(|s| s == "*");

    if has_wildcard {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers([CONTENT_TYPE, AUTHORIZATION]);
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|s| {
            s.parse::<HeaderValue>()
                .map_err(|e| tracing::warn!("Failed to parse origin '{}': {}", s, e))
                .ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}
