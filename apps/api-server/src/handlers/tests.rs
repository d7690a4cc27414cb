use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, http::StatusCode, http::header, test, web};
use async_trait::async_trait;
use digihub_core::RepoError;
use digihub_core::domain::{AffiliateLink, AffiliateProgram, LinkClick, Post};
use digihub_core::ports::{AffiliateRepository, Cache, TokenService};
use digihub_core::services::{NewCategory, NewPost, Repositories, ensure_user};
use digihub_infra::{FsImageResizer, InMemoryCache, InMemoryDatabase, JwtConfig, JwtTokenService};
use serde_json::{Value, json};
use uuid::Uuid;

use super::configure_routes;
use super::discovery::POPULAR_POSTS_CACHE_KEY;
use crate::middleware::PageViewMiddleware;
use crate::state::AppState;

struct Harness {
    db: Arc<InMemoryDatabase>,
    state: AppState,
    tokens: Arc<dyn TokenService>,
}

impl Harness {
    fn new() -> Self {
        let db = Arc::new(InMemoryDatabase::new());
        let repos = db.repositories();
        Self::with_repos(db, repos)
    }

    fn with_repos(db: Arc<InMemoryDatabase>, repos: Repositories) -> Self {
        let state = AppState::assemble(
            repos,
            Arc::new(InMemoryCache::new()),
            Arc::new(FsImageResizer::new(std::env::temp_dir())),
            Duration::from_secs(60),
        );
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig {
            secret: "handler-test-secret".to_string(),
            expiration_hours: 1,
            issuer: "digihub".to_string(),
        }));
        Self { db, state, tokens }
    }

    fn bearer(&self, user_id: Uuid) -> String {
        self.bearer_with_roles(user_id, vec![])
    }

    fn bearer_with_roles(&self, user_id: Uuid, roles: Vec<String>) -> String {
        let token = self
            .tokens
            .generate_token(user_id, "reader@example.com", roles)
            .unwrap();
        format!("Bearer {}", token)
    }

    /// Category `web-hosting` with one published post.
    async fn published_post(&self) -> Post {
        let author = ensure_user(
            self.state.repos.users.as_ref(),
            Uuid::new_v4(),
            "author@example.com",
        )
        .await
        .unwrap();
        let category = self
            .state
            .taxonomy
            .create_category(NewCategory {
                name: "Web Hosting".to_string(),
                slug: None,
                description: None,
                icon: None,
            })
            .await
            .unwrap();

        self.state
            .posts
            .create(
                author.id,
                NewPost {
                    title: "Best Budget Hosts".to_string(),
                    content: "Shared hosting compared.".to_string(),
                    category_id: category.id,
                    ..Default::default()
                },
            )
            .await
            .unwrap()
    }
}

macro_rules! app {
    ($h:expr) => {
        test::init_service(
            App::new()
                .wrap(PageViewMiddleware::new($h.state.page_views.clone()))
                .app_data(web::Data::new($h.state.clone()))
                .app_data(web::Data::new($h.tokens.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

/// Resolves links from the in-memory store; click logging always fails.
struct ClickLogDown {
    links: Arc<InMemoryDatabase>,
}

#[async_trait]
impl AffiliateRepository for ClickLogDown {
    async fn find_active_link(&self, id: Uuid) -> Result<Option<AffiliateLink>, RepoError> {
        self.links.find_active_link(id).await
    }

    async fn list_active_links(&self) -> Result<Vec<AffiliateLink>, RepoError> {
        self.links.list_active_links().await
    }

    async fn record_click(&self, _click: LinkClick) -> Result<(), RepoError> {
        Err(RepoError::Connection("click log unavailable".to_string()))
    }

    async fn click_count(&self, link_id: Uuid) -> Result<u64, RepoError> {
        self.links.click_count(link_id).await
    }
}

fn affiliate_link(is_active: bool) -> (AffiliateProgram, AffiliateLink) {
    let program = AffiliateProgram {
        id: Uuid::new_v4(),
        name: "Partner Program".to_string(),
        company: "Example Hosting".to_string(),
        commission_rate: Some(30.0),
        is_active: true,
    };
    let link = AffiliateLink {
        id: Uuid::new_v4(),
        program_id: program.id,
        url: "https://hosting.example.com/?ref=digihub".to_string(),
        title: "Example Hosting".to_string(),
        category: "hosting".to_string(),
        is_active,
        click_count: 0,
        last_clicked_at: None,
    };
    (program, link)
}

#[actix_web::test]
async fn test_health() {
    let h = Harness::new();
    let app = app!(h);

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_post_detail_records_attributed_view() {
    let h = Harness::new();
    let post = h.published_post().await;
    let app = app!(h);

    let req = test::TestRequest::get()
        .uri("/post/web-hosting/best-budget-hosts/")
        .insert_header((header::USER_AGENT, "Mozilla/5.0"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["data"]["slug"], "best-budget-hosts");
    assert_eq!(body["data"]["views"], 1);

    let views = h.db.page_views().await;
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].post_id, Some(post.id));
    assert_eq!(views[0].user_agent, "Mozilla/5.0");
}

#[actix_web::test]
async fn test_post_in_wrong_category_not_found() {
    let h = Harness::new();
    h.published_post().await;
    let app = app!(h);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/post/reviews/best-budget-hosts/")
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_admin_path_not_recorded() {
    let h = Harness::new();
    let app = app!(h);

    test::call_service(&app, test::TestRequest::get().uri("/admin/").to_request()).await;

    assert_eq!(h.db.page_view_count().await, 0);
}

#[actix_web::test]
async fn test_affiliate_redirect_counts_click() {
    let h = Harness::new();
    let (program, link) = affiliate_link(true);
    h.db.add_affiliate_program(program).await;
    h.db.add_affiliate_link(link.clone()).await;
    let app = app!(h);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/affiliate/go/{}/", link.id))
            .insert_header((header::REFERER, "https://digihub.example.com/post/x/y/"))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(
        res.headers().get(header::LOCATION).unwrap(),
        "https://hosting.example.com/?ref=digihub"
    );

    let stored = h.db.affiliate_link(link.id).await.unwrap();
    assert_eq!(stored.click_count, 1);
    assert!(stored.last_clicked_at.is_some());
}

#[actix_web::test]
async fn test_affiliate_redirect_when_click_log_fails() {
    let db = Arc::new(InMemoryDatabase::new());
    let mut repos = db.repositories();
    repos.affiliate = Arc::new(ClickLogDown { links: db.clone() });
    let h = Harness::with_repos(db, repos);
    let (program, link) = affiliate_link(true);
    h.db.add_affiliate_program(program).await;
    h.db.add_affiliate_link(link.clone()).await;
    let app = app!(h);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/affiliate/go/{}/", link.id))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(
        res.headers().get(header::LOCATION).unwrap(),
        "https://hosting.example.com/?ref=digihub"
    );
    assert_eq!(h.db.affiliate_link(link.id).await.unwrap().click_count, 0);
}

#[actix_web::test]
async fn test_inactive_affiliate_link_not_found() {
    let h = Harness::new();
    let (program, link) = affiliate_link(false);
    h.db.add_affiliate_program(program).await;
    h.db.add_affiliate_link(link.clone()).await;
    let app = app!(h);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/affiliate/go/{}/", link.id))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(h.db.affiliate_link(link.id).await.unwrap().click_count, 0);
}

#[actix_web::test]
async fn test_popular_posts_cached() {
    let h = Harness::new();
    h.published_post().await;
    let app = app!(h);

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/popular-posts/").to_request(),
    )
    .await;

    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 1);
    assert_eq!(body["posts"][0]["url"], "/post/web-hosting/best-budget-hosts/");
    assert!(h.state.cache.exists(POPULAR_POSTS_CACHE_KEY).await);
}

#[actix_web::test]
async fn test_search_short_term_empty() {
    let h = Harness::new();
    h.published_post().await;
    let app = app!(h);

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/search/?q=b").to_request(),
    )
    .await;

    assert_eq!(body["data"]["total_results"], 0);
}

#[actix_web::test]
async fn test_search_matches_title() {
    let h = Harness::new();
    h.published_post().await;
    let app = app!(h);

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/search/?q=budget").to_request(),
    )
    .await;

    assert_eq!(body["data"]["total_results"], 1);
    assert_eq!(body["data"]["posts"]["items"][0]["slug"], "best-budget-hosts");
}

#[actix_web::test]
async fn test_like_requires_token() {
    let h = Harness::new();
    let post = h.published_post().await;
    let app = app!(h);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/posts/{}/like/", post.id))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_like_toggles_for_caller() {
    let h = Harness::new();
    let post = h.published_post().await;
    let app = app!(h);
    let auth = h.bearer(Uuid::new_v4());

    let like = || {
        test::TestRequest::post()
            .uri(&format!("/api/posts/{}/like/", post.id))
            .insert_header((header::AUTHORIZATION, auth.clone()))
            .to_request()
    };

    let first: Value = test::call_and_read_body_json(&app, like()).await;
    assert_eq!(first["liked"], true);
    assert_eq!(first["likes_count"], 1);

    let second: Value = test::call_and_read_body_json(&app, like()).await;
    assert_eq!(second["liked"], false);
    assert_eq!(second["likes_count"], 0);
}

#[actix_web::test]
async fn test_comment_posted() {
    let h = Harness::new();
    h.published_post().await;
    let app = app!(h);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/post/best-budget-hosts/comment/")
            .insert_header((header::AUTHORIZATION, h.bearer(Uuid::new_v4())))
            .set_json(json!({ "content": "Very helpful." }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CREATED);
}

#[actix_web::test]
async fn test_newsletter_subscribe_then_repeat() {
    let h = Harness::new();
    let app = app!(h);

    let subscribe = || {
        test::TestRequest::post()
            .uri("/newsletter/subscribe/")
            .set_json(json!({ "email": "reader@example.com" }))
            .to_request()
    };

    let first: Value = test::call_and_read_body_json(&app, subscribe()).await;
    assert_eq!(first["message"], "Successfully subscribed to our newsletter!");

    let second: Value = test::call_and_read_body_json(&app, subscribe()).await;
    assert_eq!(
        second["message"],
        "This email is already subscribed to our newsletter."
    );
}

#[actix_web::test]
async fn test_newsletter_rejects_invalid_email() {
    let h = Harness::new();
    let app = app!(h);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/newsletter/subscribe/")
            .set_json(json!({ "email": "not-an-email" }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_category_listing_totals() {
    let h = Harness::new();
    h.published_post().await;
    let app = app!(h);

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/category/web-hosting/?sort=popular&page=abc")
            .to_request(),
    )
    .await;

    assert_eq!(body["data"]["total_articles"], 1);
    assert_eq!(body["data"]["posts"]["page"], 1);
}

#[actix_web::test]
async fn test_create_post_requires_token() {
    let h = Harness::new();
    let app = app!(h);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/post/create/")
            .set_json(json!({
                "title": "Untitled",
                "content": "Body",
                "category_id": Uuid::new_v4(),
            }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_category_creation_needs_editor_role() {
    let h = Harness::new();
    let app = app!(h);

    let create = |auth: String| {
        test::TestRequest::post()
            .uri("/api/categories/")
            .insert_header((header::AUTHORIZATION, auth))
            .set_json(json!({ "name": "SEO Tips" }))
            .to_request()
    };

    let res = test::call_service(&app, create(h.bearer(Uuid::new_v4()))).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let editor = h.bearer_with_roles(Uuid::new_v4(), vec!["editor".to_string()]);
    let res = test::call_service(&app, create(editor)).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["slug"], "seo-tips");
}

#[actix_web::test]
async fn test_page_past_end_serves_last_page() {
    let h = Harness::new();
    h.published_post().await;
    let app = app!(h);

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/?page={}", u64::MAX))
            .to_request(),
    )
    .await;

    assert_eq!(body["data"]["latest_posts"]["page"], 1);
    assert_eq!(body["data"]["latest_posts"]["items"][0]["slug"], "best-budget-hosts");
}

#[::core::prelude::v1::test]
fn test_page_numbers() {
    assert_eq!(super::parse_page(None), 1);
    assert_eq!(super::parse_page(Some("3")), 3);
    assert_eq!(super::parse_page(Some("0")), 1);
    assert_eq!(super::parse_page(Some("abc")), 1);
    assert_eq!(super::parse_page(Some("18446744073709551615")), u64::MAX);
}
