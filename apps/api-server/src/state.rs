//! Application state - shared across all handlers.

use std::sync::Arc;

use quire_core::ports::PostRepository;
use quire_core::{PostService, PutMode};
use quire_editor::HtmlSanitizer;
use quire_infra::InMemoryPostRepository;

#[cfg(feature = "postgres")]
use quire_infra::SeaOrmPostRepository;

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    /// Sanitizer applied to post bodies before they are rendered.
    pub sanitizer: Arc<HtmlSanitizer>,
    pub character_limit: usize,
}

impl AppState {
    /// Build the application state with the configured post store.
    pub async fn new(config: &AppConfig) -> Self {
        let repo = Self::post_repository(config).await;
        let state = Self::with_repository(repo, config.put_mode, config.character_limit);

        tracing::info!(put_mode = ?config.put_mode, "Application state initialized");
        state
    }

    /// State over a fresh in-memory store.
    pub fn in_memory(put_mode: PutMode, character_limit: usize) -> Self {
        Self::with_repository(
            Arc::new(InMemoryPostRepository::new()),
            put_mode,
            character_limit,
        )
    }

    pub fn with_repository(
        repo: Arc<dyn PostRepository>,
        put_mode: PutMode,
        character_limit: usize,
    ) -> Self {
        let sanitizer = Arc::new(HtmlSanitizer::new());
        let posts = PostService::new(repo, sanitizer.clone()).with_put_mode(put_mode);

        Self {
            posts,
            sanitizer,
            character_limit,
        }
    }

    #[cfg(feature = "postgres")]
    async fn post_repository(config: &AppConfig) -> Arc<dyn PostRepository> {
        let Some(db_config) = config.database.as_ref() else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Arc::new(InMemoryPostRepository::new());
        };

        match quire_infra::database::connect(db_config).await {
            Ok(conn) => Arc::new(SeaOrmPostRepository::new(conn)),
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                Arc::new(InMemoryPostRepository::new())
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn post_repository(_config: &AppConfig) -> Arc<dyn PostRepository> {
        tracing::info!("Running without postgres feature - using in-memory repository");
        Arc::new(InMemoryPostRepository::new())
    }
}
