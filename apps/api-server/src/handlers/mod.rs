//! HTTP handlers and route configuration.
//!
//! Route names follow `namespace:name`. Page views on `blog:` routes that
//! carry a `slug` are attributed to that post.

mod affiliate;
mod discovery;
mod engagement;
mod health;
mod newsletter;
mod posts;
mod present;
mod taxonomy;

#[cfg(test)]
mod tests;

use actix_web::{guard, web};
use serde::Deserialize;

/// `?page=` as sent by pagers. Anything unparsable is the first page.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<String>,
}

impl PageQuery {
    pub fn number(&self) -> u64 {
        parse_page(self.page.as_deref())
    }
}

pub(crate) fn parse_page(raw: Option<&str>) -> u64 {
    raw.and_then(|p| p.trim().parse::<u64>().ok())
        .filter(|p| *p > 0)
        .unwrap_or(1)
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/")
            .name("blog:home")
            .route(web::get().to(posts::home)),
    )
    .service(
        web::resource("/post/create/")
            .name("blog:create_post")
            .route(web::post().to(posts::create_post)),
    )
    .service(
        web::resource("/post/{category_slug}/{slug}/")
            .name("blog:post_detail")
            .guard(guard::Get())
            .to(posts::post_detail),
    )
    .service(
        web::resource("/post/{slug}/comment/")
            .name("blog:post_comment")
            .guard(guard::Post())
            .to(posts::post_comment),
    )
    .service(
        web::resource("/category/{slug}/")
            .name("blog:category_posts")
            .route(web::get().to(taxonomy::category_posts)),
    )
    .service(
        web::resource("/tag/{slug}/")
            .name("blog:tag_posts")
            .route(web::get().to(taxonomy::tag_posts)),
    )
    .service(
        web::resource("/newsletter/subscribe/")
            .name("blog:newsletter_subscribe")
            .route(web::post().to(newsletter::subscribe)),
    )
    .service(
        web::scope("/affiliate")
            .service(
                web::resource("/go/{link_id}/")
                    .name("affiliate:redirect")
                    .route(web::get().to(affiliate::redirect)),
            )
            .service(
                web::resource("/links/")
                    .name("affiliate:links")
                    .route(web::get().to(affiliate::links)),
            ),
    )
    .service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::resource("/search/")
                    .name("blog:search")
                    .route(web::get().to(discovery::search)),
            )
            .service(
                web::resource("/popular-posts/")
                    .name("blog:popular_posts")
                    .route(web::get().to(discovery::popular_posts)),
            )
            .service(
                web::resource("/categories/")
                    .name("blog:categories")
                    .route(web::get().to(taxonomy::list_categories))
                    .route(web::post().to(taxonomy::create_category)),
            )
            .service(
                web::resource("/tags/")
                    .name("blog:create_tag")
                    .route(web::post().to(taxonomy::create_tag)),
            )
            .service(
                web::resource("/posts/{post_id}/like/")
                    .name("blog:like_post")
                    .route(web::post().to(engagement::like)),
            )
            .service(
                web::resource("/posts/{post_id}/bookmark/")
                    .name("blog:bookmark_post")
                    .route(web::post().to(engagement::bookmark)),
            ),
    );
}
