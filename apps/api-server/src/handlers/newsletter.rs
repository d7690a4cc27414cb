//! Newsletter signup.

use actix_web::{HttpResponse, web};
use digihub_shared::ApiResponse;
use digihub_shared::dto::SubscribeRequest;

use crate::middleware::AppResult;
use crate::state::AppState;

/// POST /newsletter/subscribe/
pub async fn subscribe(
    state: web::Data<AppState>,
    body: web::Json<SubscribeRequest>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .newsletter
        .subscribe(&body.email, body.category.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message(outcome.message())))
}
