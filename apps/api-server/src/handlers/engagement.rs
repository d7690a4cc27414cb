//! Likes and bookmarks.

use actix_web::{HttpResponse, web};
use digihub_core::services::ensure_user;
use digihub_shared::dto::{BookmarkResponse, LikeResponse};
use uuid::Uuid;

use crate::middleware::{AppResult, Identity};
use crate::state::AppState;

/// POST /api/posts/{post_id}/like/
pub async fn like(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let user = ensure_user(state.repos.users.as_ref(), identity.user_id, &identity.email).await?;
    let like = state.engagement.toggle_like(path.into_inner(), user.id).await?;

    Ok(HttpResponse::Ok().json(LikeResponse {
        success: true,
        liked: like.liked,
        likes_count: like.likes_count,
    }))
}

/// POST /api/posts/{post_id}/bookmark/
pub async fn bookmark(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let user = ensure_user(state.repos.users.as_ref(), identity.user_id, &identity.email).await?;
    let bookmarked = state
        .engagement
        .toggle_bookmark(path.into_inner(), user.id)
        .await?;

    Ok(HttpResponse::Ok().json(BookmarkResponse {
        success: true,
        bookmarked,
    }))
}
