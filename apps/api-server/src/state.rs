//! Application state - shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use digihub_core::ports::{Cache, ImageResizer};
use digihub_core::services::{
    AffiliateService, EngagementService, NewsletterService, PageViewRecorder, PostService,
    Repositories, TaxonomyService,
};
use digihub_infra::{FsImageResizer, InMemoryCache, InMemoryDatabase};

use crate::config::{AppConfig, CacheBackend};

#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<dyn Cache>,
    pub cache_ttl: Duration,
    pub repos: Repositories,
    pub posts: Arc<PostService>,
    pub taxonomy: Arc<TaxonomyService>,
    pub engagement: Arc<EngagementService>,
    pub newsletter: Arc<NewsletterService>,
    pub affiliate: Arc<AffiliateService>,
    pub page_views: Arc<PageViewRecorder>,
}

impl AppState {
    /// Build the state with the backends `config` asks for, falling back to
    /// in-memory implementations when a backend is unavailable.
    pub async fn new(config: &AppConfig) -> Self {
        let cache = build_cache(config.cache_backend).await;
        let repos = build_repositories(config).await;
        let images: Arc<dyn ImageResizer> = Arc::new(FsImageResizer::new(&config.media_root));

        tracing::info!(media_root = %config.media_root.display(), "Application state initialized");

        Self::assemble(repos, cache, images, config.cache_timeout)
    }

    /// Wire services over already-built ports.
    pub fn assemble(
        repos: Repositories,
        cache: Arc<dyn Cache>,
        images: Arc<dyn ImageResizer>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            posts: Arc::new(PostService::new(repos.clone(), images)),
            taxonomy: Arc::new(TaxonomyService::new(
                repos.categories.clone(),
                repos.tags.clone(),
            )),
            engagement: Arc::new(EngagementService::new(repos.clone())),
            newsletter: Arc::new(NewsletterService::new(
                repos.newsletter.clone(),
                repos.categories.clone(),
            )),
            affiliate: Arc::new(AffiliateService::new(repos.affiliate.clone())),
            page_views: Arc::new(PageViewRecorder::new(
                repos.posts.clone(),
                repos.page_views.clone(),
            )),
            cache,
            cache_ttl,
            repos,
        }
    }
}

#[cfg(feature = "redis")]
async fn build_cache(backend: CacheBackend) -> Arc<dyn Cache> {
    use digihub_infra::{RedisCache, RedisConfig};

    if backend == CacheBackend::Memory {
        return Arc::new(InMemoryCache::new());
    }

    match RedisCache::new(RedisConfig::from_env()).await {
        Ok(cache) => Arc::new(cache),
        Err(e) => {
            tracing::error!(error = %e, "Redis unavailable. Using in-memory cache.");
            Arc::new(InMemoryCache::new())
        }
    }
}

#[cfg(not(feature = "redis"))]
async fn build_cache(backend: CacheBackend) -> Arc<dyn Cache> {
    if backend == CacheBackend::Redis {
        tracing::warn!("Built without the redis feature. Using in-memory cache.");
    }
    Arc::new(InMemoryCache::new())
}

fn in_memory_repositories() -> Repositories {
    Arc::new(InMemoryDatabase::new()).repositories()
}

#[cfg(feature = "postgres")]
async fn build_repositories(config: &AppConfig) -> Repositories {
    use digihub_infra::database::{
        DatabaseConfig, DatabaseConnections, PostgresAffiliateRepository,
        PostgresCategoryRepository, PostgresCommentRepository, PostgresEngagementRepository,
        PostgresNewsletterRepository, PostgresPageViewRepository, PostgresPostRepository,
        PostgresTagRepository, PostgresUserRepository,
    };

    let Some(settings) = config.database.as_ref() else {
        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        return in_memory_repositories();
    };

    let db_config = DatabaseConfig {
        url: settings.url.clone(),
        max_connections: settings.max_connections,
        min_connections: settings.min_connections,
        sqlx_logging: config.debug,
    };

    match DatabaseConnections::init(&db_config).await {
        Ok(connections) => {
            let db = connections.main;
            Repositories {
                users: Arc::new(PostgresUserRepository::new(db.clone())),
                posts: Arc::new(PostgresPostRepository::new(db.clone())),
                categories: Arc::new(PostgresCategoryRepository::new(db.clone())),
                tags: Arc::new(PostgresTagRepository::new(db.clone())),
                comments: Arc::new(PostgresCommentRepository::new(db.clone())),
                engagement: Arc::new(PostgresEngagementRepository::new(db.clone())),
                newsletter: Arc::new(PostgresNewsletterRepository::new(db.clone())),
                page_views: Arc::new(PostgresPageViewRepository::new(db.clone())),
                affiliate: Arc::new(PostgresAffiliateRepository::new(db)),
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database. Using in-memory fallback.");
            in_memory_repositories()
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn build_repositories(config: &AppConfig) -> Repositories {
    if config.database.is_some() {
        tracing::warn!("Built without the postgres feature. DATABASE_URL is ignored.");
    }
    in_memory_repositories()
}
