use chrono::Utc;
use sea_orm::{
    DatabaseBackend, DbErr, EntityTrait, MockDatabase, MockExecResult, QueryFilter, QueryTrait,
    Value,
};
use uuid::Uuid;

use digihub_core::domain::{Category, LinkClick, Post, PostStatus};
use digihub_core::error::RepoError;
use digihub_core::ports::{
    AffiliateRepository, BaseRepository, CategoryRepository, EngagementRepository,
    PostRepository,
};

use super::entity::{category, link_click, post, post_like};
use super::postgres_base::db_err;
use super::postgres_repo::{
    PostgresAffiliateRepository, PostgresCategoryRepository, PostgresEngagementRepository,
    PostgresPostRepository, like_pattern, text_match,
};

fn post_model(id: Uuid, status: &str) -> post::Model {
    let now = Utc::now();
    post::Model {
        id,
        author_id: Uuid::new_v4(),
        category_id: Uuid::new_v4(),
        title: "Test Post".to_owned(),
        slug: "test-post".to_owned(),
        excerpt: "Content".to_owned(),
        content: "<p>Content</p>".to_owned(),
        featured_image: None,
        status: status.to_owned(),
        is_featured: false,
        views: 7,
        meta_description: String::new(),
        meta_keywords: String::new(),
        created_at: now.into(),
        updated_at: now.into(),
        published_at: Some(now.into()),
    }
}

fn exec(rows_affected: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected,
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let post_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(post_id, "published")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.id, post_id);
    assert_eq!(post.status, PostStatus::Published);
    assert_eq!(post.views, 7);
}

#[tokio::test]
async fn test_unknown_status_reads_as_draft() {
    let post_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(post_id, "scheduled")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let post = repo.find_by_slug("test-post").await.unwrap().unwrap();

    assert_eq!(post.status, PostStatus::Draft);
}

#[tokio::test]
async fn test_find_category_by_slug() {
    let now = Utc::now();
    let id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![category::Model {
            id,
            name: "SEO".to_owned(),
            slug: "seo".to_owned(),
            description: None,
            icon: "fa-search".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }]])
        .into_connection();

    let repo = PostgresCategoryRepository::new(db);
    let found: Category = repo.find_by_slug("seo").await.unwrap().unwrap();

    assert_eq!(found.id, id);
    assert_eq!(found.icon, "fa-search");
}

#[tokio::test]
async fn test_increment_views_missing_post() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![exec(1), exec(0)])
        .into_connection();
    let repo = PostgresPostRepository::new(db);

    assert!(repo.increment_views(Uuid::new_v4()).await.is_ok());
    assert!(matches!(
        repo.increment_views(Uuid::new_v4()).await,
        Err(RepoError::NotFound)
    ));
}

#[tokio::test]
async fn test_toggle_like_removes_existing() {
    let post_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_like::Model {
            id: Uuid::new_v4(),
            post_id,
            user_id,
            created_at: Utc::now().into(),
        }]])
        .append_exec_results(vec![exec(1)])
        .into_connection();
    let repo = PostgresEngagementRepository::new(db);

    let liked = repo.toggle_like(post_id, user_id).await.unwrap();

    assert!(!liked);
}

#[tokio::test]
async fn test_record_click_unknown_link() {
    let click = LinkClick::new(Uuid::new_v4(), Default::default());
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![link_click::Model {
            id: click.id,
            link_id: click.link_id,
            ip_address: None,
            user_agent: String::new(),
            referrer: String::new(),
            clicked_at: click.clicked_at.into(),
        }]])
        .append_exec_results(vec![exec(0)])
        .into_connection();
    let repo = PostgresAffiliateRepository::new(db);

    let result = repo.record_click(click).await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[test]
fn test_db_err_mapping() {
    assert!(matches!(db_err(DbErr::RecordNotUpdated), RepoError::NotFound));
    assert!(matches!(
        db_err(DbErr::Custom("boom".to_string())),
        RepoError::Query(_)
    ));
}

#[test]
fn test_like_pattern_escapes_wildcards() {
    assert_eq!(like_pattern("VPS"), "%vps%");
    assert_eq!(like_pattern("50%_Off"), "%50\\%\\_off%");
    assert_eq!(like_pattern("C:\\Temp"), "%c:\\\\temp%");
}

#[test]
fn test_search_sql_matches_wildcards_literally() {
    let stmt = post::Entity::find()
        .filter(text_match("50%_off"))
        .build(DatabaseBackend::Postgres);

    assert!(stmt.sql.contains("ESCAPE"), "{}", stmt.sql);
    let values = stmt.values.unwrap().0;
    let escaped = Value::String(Some(Box::new("%50\\%\\_off%".to_owned())));
    // title, excerpt, content and tag name
    assert_eq!(values.iter().filter(|v| **v == escaped).count(), 4);
}
