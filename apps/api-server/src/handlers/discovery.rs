//! Search and popular posts.

use actix_web::{HttpResponse, web};
use digihub_core::ports::{get_json, set_json};
use digihub_shared::ApiResponse;
use digihub_shared::dto::{PopularPostsResponse, SearchResponse};
use serde::Deserialize;

use super::parse_page;
use super::present::{self, CategorySlugs};
use crate::middleware::AppResult;
use crate::state::AppState;

pub const POPULAR_POSTS_CACHE_KEY: &str = "popular_posts";
const POPULAR_POSTS_LIMIT: u64 = 10;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub page: Option<String>,
}

/// GET /api/search/?q=&page=
pub async fn search(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> AppResult<HttpResponse> {
    let term = query.q.trim().to_string();
    let results = state
        .posts
        .search(&term, parse_page(query.page.as_deref()))
        .await?;
    let slugs = CategorySlugs::new(&state.taxonomy.categories().await?);

    Ok(HttpResponse::Ok().json(ApiResponse::ok(SearchResponse {
        query: term,
        total_results: results.total,
        posts: present::paginated(results, &slugs),
    })))
}

/// GET /api/popular-posts/
///
/// Served from the cache for `cache_ttl` after the first computation.
pub async fn popular_posts(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    if let Some(cached) =
        get_json::<PopularPostsResponse>(state.cache.as_ref(), POPULAR_POSTS_CACHE_KEY).await
    {
        return Ok(HttpResponse::Ok().json(cached));
    }

    let posts = state.posts.popular(POPULAR_POSTS_LIMIT).await?;
    let slugs = CategorySlugs::new(&state.taxonomy.categories().await?);
    let posts = present::summaries(&posts, &slugs);
    let response = PopularPostsResponse {
        success: true,
        count: posts.len(),
        posts,
    };

    if let Err(e) = set_json(
        state.cache.as_ref(),
        POPULAR_POSTS_CACHE_KEY,
        &response,
        Some(state.cache_ttl),
    )
    .await
    {
        tracing::warn!(error = %e, "Failed to cache popular posts");
    }

    Ok(HttpResponse::Ok().json(response))
}
