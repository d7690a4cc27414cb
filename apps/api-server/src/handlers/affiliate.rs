//! Tracked affiliate redirects.

use actix_web::{HttpRequest, HttpResponse, http::header, web};
use digihub_shared::ApiResponse;
use digihub_shared::dto::AffiliateLinkResponse;
use uuid::Uuid;

use super::present;
use crate::middleware::{AppResult, caller_context};
use crate::state::AppState;

/// GET /affiliate/go/{link_id}/
///
/// Counts the click and sends the visitor on with a 302.
pub async fn redirect(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let link = state
        .affiliate
        .follow(path.into_inner(), caller_context(&req))
        .await?;

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, link.url))
        .finish())
}

/// GET /affiliate/links/
pub async fn links(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let links: Vec<AffiliateLinkResponse> = state
        .affiliate
        .active_links()
        .await?
        .iter()
        .map(present::affiliate_link)
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(links)))
}
