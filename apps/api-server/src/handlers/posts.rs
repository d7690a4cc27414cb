//! Home page, post pages and authoring.

use actix_web::{HttpResponse, web};
use digihub_core::domain::PostStatus;
use digihub_core::ports::BaseRepository;
use digihub_core::services::{NewPost, ensure_user};
use digihub_shared::ApiResponse;
use digihub_shared::dto::{CommentRequest, CreatePostRequest, HomeResponse, PostDetailResponse};

use super::PageQuery;
use super::present::{self, CategorySlugs};
use crate::middleware::{AppResult, Identity};
use crate::state::AppState;

const HOME_CATEGORIES: usize = 6;

/// GET /
pub async fn home(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let categories = state.taxonomy.categories().await?;
    let slugs = CategorySlugs::new(&categories);
    let latest = state.posts.latest(query.number()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(HomeResponse {
        latest_posts: present::paginated(latest, &slugs),
        categories: categories
            .iter()
            .take(HOME_CATEGORIES)
            .map(present::category)
            .collect(),
    })))
}

/// GET /post/{category_slug}/{slug}/
pub async fn post_detail(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> AppResult<HttpResponse> {
    let (category_slug, slug) = path.into_inner();
    let detail = state.posts.detail(&category_slug, &slug).await?;

    let slugs = CategorySlugs::new(&state.taxonomy.categories().await?);
    let post = detail.post;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostDetailResponse {
        id: post.id,
        title: post.title,
        slug: post.slug,
        excerpt: post.excerpt,
        content: post.content,
        status: post.status.as_str().to_string(),
        featured_image: post.featured_image,
        views: post.views,
        meta_description: post.meta_description,
        meta_keywords: post.meta_keywords,
        author_id: post.author_id,
        created_at: post.created_at,
        updated_at: post.updated_at,
        published_at: post.published_at,
        category: present::category(&detail.category),
        tags: detail.tags.iter().map(present::tag).collect(),
        like_count: detail.like_count,
        comment_count: detail.comments.len(),
        comments: detail.comments.iter().map(present::comment).collect(),
        related_posts: present::summaries(&detail.related, &slugs),
        popular_posts: present::summaries(&detail.popular, &slugs),
    })))
}

/// POST /post/create/
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let author = ensure_user(state.repos.users.as_ref(), identity.user_id, &identity.email).await?;

    let status = req
        .status
        .as_deref()
        .map(str::parse::<PostStatus>)
        .transpose()?;

    let post = state
        .posts
        .create(
            author.id,
            NewPost {
                title: req.title,
                content: req.content,
                category_id: req.category_id,
                slug: req.slug,
                excerpt: req.excerpt,
                status,
                featured_image: req.featured_image,
                is_featured: req.is_featured,
                meta_description: req.meta_description,
                meta_keywords: req.meta_keywords,
                tag_ids: req.tags,
            },
        )
        .await?;

    let category_slug = state
        .repos
        .categories
        .find_by_id(post.category_id)
        .await?
        .map(|c| c.slug)
        .unwrap_or_default();

    tracing::info!(post_id = %post.id, slug = %post.slug, "Post created");

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        present::post_summary(&post, &category_slug),
        "Post created successfully!",
    )))
}

/// POST /post/{slug}/comment/
pub async fn post_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let author = ensure_user(state.repos.users.as_ref(), identity.user_id, &identity.email).await?;
    let (_, comment) = state
        .engagement
        .add_comment(&path.into_inner(), author.id, &body.content)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        present::comment(&comment),
        "Your comment has been posted.",
    )))
}
