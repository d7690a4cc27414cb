//! Category and tag listings.

use actix_web::{HttpResponse, web};
use digihub_core::ports::{EDITOR_ROLE, PostSort};
use digihub_core::services::{ListingFilter, NewCategory, ensure_user};
use digihub_shared::ApiResponse;
use digihub_shared::dto::{
    CategoryPostsResponse, CategoryResponse, CreateCategoryRequest, CreateTagRequest,
    TagPostsResponse,
};
use serde::Deserialize;

use super::present::{self, CategorySlugs};
use super::{PageQuery, parse_page};
use crate::middleware::{AppResult, Identity};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub search: Option<String>,
    pub tag: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
}

/// GET /category/{slug}/?search=&tag=&sort=&page=
pub async fn category_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<CategoryQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let filter = ListingFilter {
        search: query.search,
        tag: query.tag,
        sort: query
            .sort
            .as_deref()
            .map(PostSort::parse)
            .unwrap_or_default(),
        page: parse_page(query.page.as_deref()),
    };

    let listing = state.posts.by_category(&path.into_inner(), filter).await?;
    let slugs = CategorySlugs::new(std::slice::from_ref(&listing.category));

    Ok(HttpResponse::Ok().json(ApiResponse::ok(CategoryPostsResponse {
        category: present::category(&listing.category),
        posts: present::paginated(listing.posts, &slugs),
        total_articles: listing.totals.articles,
        total_views: listing.totals.views,
        related_categories: listing
            .related_categories
            .iter()
            .map(present::category)
            .collect(),
    })))
}

/// GET /tag/{slug}/
pub async fn tag_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let (tag, posts) = state.posts.by_tag(&path.into_inner(), query.number()).await?;
    let slugs = CategorySlugs::new(&state.taxonomy.categories().await?);

    Ok(HttpResponse::Ok().json(ApiResponse::ok(TagPostsResponse {
        tag: present::tag(&tag),
        posts: present::paginated(posts, &slugs),
    })))
}

/// GET /api/categories/
pub async fn list_categories(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let categories: Vec<CategoryResponse> = state
        .taxonomy
        .categories()
        .await?
        .iter()
        .map(present::category)
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(categories)))
}

/// POST /api/categories/ (editors only)
pub async fn create_category(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateCategoryRequest>,
) -> AppResult<HttpResponse> {
    identity.require_role(EDITOR_ROLE)?;
    ensure_user(state.repos.users.as_ref(), identity.user_id, &identity.email).await?;

    let req = body.into_inner();
    let category = state
        .taxonomy
        .create_category(NewCategory {
            name: req.name,
            slug: req.slug,
            description: req.description,
            icon: req.icon,
        })
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(present::category(&category))))
}

/// POST /api/tags/ (editors only)
pub async fn create_tag(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateTagRequest>,
) -> AppResult<HttpResponse> {
    identity.require_role(EDITOR_ROLE)?;
    ensure_user(state.repos.users.as_ref(), identity.user_id, &identity.email).await?;

    let tag = state.taxonomy.create_tag(&body.name).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(present::tag(&tag))))
}
