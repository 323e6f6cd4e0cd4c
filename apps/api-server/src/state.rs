//! Application state - shared across all handlers.

use std::sync::Arc;

use blog_core::BlogPostService;
use blog_core::ports::{BlogPostRepository, PasswordService, TokenService, UserRepository};
use blog_infra::{
    Argon2PasswordService, DatabaseConfig, InMemoryBlogPostRepository, InMemoryUserRepository,
    JwtConfig, JwtTokenService,
};

#[cfg(feature = "postgres")]
use blog_infra::{PostgresBlogPostRepository, PostgresUserRepository};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: BlogPostService,
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
}

type Repositories = (Arc<dyn BlogPostRepository>, Arc<dyn UserRepository>);

fn in_memory() -> Repositories {
    (
        Arc::new(InMemoryBlogPostRepository::new()),
        Arc::new(InMemoryUserRepository::new()),
    )
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(db_config: Option<&DatabaseConfig>, jwt: JwtConfig) -> Self {
        let (post_repo, user_repo) = Self::repositories(db_config).await;

        tracing::info!("Application state initialized");

        Self::from_parts(post_repo, user_repo, Arc::new(JwtTokenService::new(jwt)))
    }

    pub fn from_parts(
        post_repo: Arc<dyn BlogPostRepository>,
        user_repo: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            posts: BlogPostService::new(post_repo, user_repo.clone()),
            users: user_repo,
            tokens,
            passwords: Arc::new(Argon2PasswordService::new()),
        }
    }

    #[cfg(feature = "postgres")]
    async fn repositories(db_config: Option<&DatabaseConfig>) -> Repositories {
        let Some(config) = db_config else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return in_memory();
        };

        match blog_infra::database::connect(config).await {
            Ok(conn) => (
                Arc::new(PostgresBlogPostRepository::new(conn.clone())),
                Arc::new(PostgresUserRepository::new(conn)),
            ),
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                in_memory()
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn repositories(_db_config: Option<&DatabaseConfig>) -> Repositories {
        tracing::info!("Running without postgres feature - using in-memory repository");
        in_memory()
    }
}
