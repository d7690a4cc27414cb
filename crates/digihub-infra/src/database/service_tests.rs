//! Service behaviour against the in-memory repositories.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use digihub_core::domain::{
    AffiliateLink, Category, ClickContext, LinkClick, Post, PostStatus, Tag, User,
};
use digihub_core::ports::{
    AffiliateRepository, BaseRepository, CategoryTotals, ImageBounds, ImageError, ImageResizer,
    Page, PageViewRepository, PostQuery, PostRepository, ResizeOutcome, UserRepository,
};
use digihub_core::{DomainError, RepoError};
use digihub_core::services::{
    AffiliateService, EngagementService, NewPost, NewsletterService, PageHit, PageViewRecorder,
    PostService, RouteMatch, SubscribeOutcome, ensure_user,
};

use super::InMemoryDatabase;

/// Records requested paths; optionally fails every call.
#[derive(Default)]
struct StubResizer {
    calls: Mutex<Vec<(String, ImageBounds)>>,
    fail: bool,
}

#[async_trait]
impl ImageResizer for StubResizer {
    async fn fit_within(
        &self,
        path: &str,
        bounds: ImageBounds,
    ) -> Result<ResizeOutcome, ImageError> {
        self.calls.lock().unwrap().push((path.to_string(), bounds));
        if self.fail {
            return Err(ImageError::NotFound(path.to_string()));
        }
        Ok(ResizeOutcome::Unchanged)
    }
}

/// Serves links from the in-memory store but cannot log clicks.
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

/// Every post query fails.
struct PostsDown;

fn posts_down<T>() -> Result<T, RepoError> {
    Err(RepoError::Connection("posts table unavailable".to_string()))
}

#[async_trait]
impl BaseRepository<Post, Uuid> for PostsDown {
    async fn find_by_id(&self, _id: Uuid) -> Result<Option<Post>, RepoError> {
        posts_down()
    }

    async fn insert(&self, _entity: Post) -> Result<Post, RepoError> {
        posts_down()
    }

    async fn update(&self, _entity: Post) -> Result<Post, RepoError> {
        posts_down()
    }

    async fn delete(&self, _id: Uuid) -> Result<(), RepoError> {
        posts_down()
    }
}

#[async_trait]
impl PostRepository for PostsDown {
    async fn find_by_slug(&self, _slug: &str) -> Result<Option<Post>, RepoError> {
        posts_down()
    }

    async fn find_published_by_slug(&self, _slug: &str) -> Result<Option<Post>, RepoError> {
        posts_down()
    }

    async fn list_published(&self, _query: &PostQuery) -> Result<Page<Post>, RepoError> {
        posts_down()
    }

    async fn search(
        &self,
        _term: &str,
        _page: u64,
        _per_page: u64,
    ) -> Result<Page<Post>, RepoError> {
        posts_down()
    }

    async fn popular(&self, _limit: u64) -> Result<Vec<Post>, RepoError> {
        posts_down()
    }

    async fn related(&self, _post: &Post, _limit: u64) -> Result<Vec<Post>, RepoError> {
        posts_down()
    }

    async fn category_totals(&self, _category_id: Uuid) -> Result<CategoryTotals, RepoError> {
        posts_down()
    }

    async fn increment_views(&self, _id: Uuid) -> Result<(), RepoError> {
        posts_down()
    }

    async fn set_tags(&self, _post_id: Uuid, _tag_ids: &[Uuid]) -> Result<(), RepoError> {
        posts_down()
    }

    async fn tag_ids(&self, _post_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        posts_down()
    }
}

/// Loses the insert race: the first lookup misses, the insert hits the
/// primary key written by another request, later lookups find that row.
struct RacedUsers {
    existing: User,
    lookups: AtomicUsize,
}

#[async_trait]
impl BaseRepository<User, Uuid> for RacedUsers {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let seen = self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok((seen > 0 && id == self.existing.id).then(|| self.existing.clone()))
    }

    async fn insert(&self, _entity: User) -> Result<User, RepoError> {
        Err(RepoError::Constraint("users_pkey".to_string()))
    }

    async fn update(&self, entity: User) -> Result<User, RepoError> {
        Ok(entity)
    }

    async fn delete(&self, _id: Uuid) -> Result<(), RepoError> {
        Ok(())
    }
}

#[async_trait]
impl UserRepository for RacedUsers {}

struct Fixture {
    db: Arc<InMemoryDatabase>,
    posts: PostService,
    resizer: Arc<StubResizer>,
    category: Category,
}

async fn fixture_with(resizer: StubResizer) -> Fixture {
    let db = Arc::new(InMemoryDatabase::new());
    let resizer = Arc::new(resizer);
    let posts = PostService::new(db.repositories(), resizer.clone());

    let mut category = Category::new("Web Hosting".to_string());
    category.prepare_for_save(chrono::Utc::now());
    let category = db.insert(category).await.unwrap();

    Fixture {
        db,
        posts,
        resizer,
        category,
    }
}

async fn fixture() -> Fixture {
    fixture_with(StubResizer::default()).await
}

fn new_post(category_id: Uuid, title: &str) -> NewPost {
    NewPost {
        title: title.to_string(),
        content: "<p>Compare plans before you buy.</p>".to_string(),
        category_id,
        ..Default::default()
    }
}

fn link(is_active: bool) -> AffiliateLink {
    AffiliateLink {
        id: Uuid::new_v4(),
        program_id: Uuid::new_v4(),
        url: "https://hosting.example.com/?ref=digihub".to_string(),
        title: "Example Hosting".to_string(),
        category: "hosting".to_string(),
        is_active,
        click_count: 0,
        last_clicked_at: None,
    }
}

#[tokio::test]
async fn test_create_derives_slug_and_excerpt() {
    let f = fixture().await;

    let post = f
        .posts
        .create(Uuid::new_v4(), new_post(f.category.id, "Best Hosting of 2024"))
        .await
        .unwrap();

    assert_eq!(post.slug, "best-hosting-of-2024");
    assert_eq!(post.excerpt, "Compare plans before you buy.");
    assert_eq!(post.status, PostStatus::Published);
    assert!(post.published_at.is_some());
}

#[tokio::test]
async fn test_slug_survives_title_change() {
    let f = fixture().await;
    let mut post = f
        .posts
        .create(Uuid::new_v4(), new_post(f.category.id, "Original Title"))
        .await
        .unwrap();

    post.title = "Completely Different".to_string();
    let saved = f.posts.save(post).await.unwrap();

    assert_eq!(saved.slug, "original-title");
}

#[tokio::test]
async fn test_publish_time_set_once() {
    let f = fixture().await;
    let mut draft = new_post(f.category.id, "Draft First");
    draft.status = Some(PostStatus::Draft);
    let mut post = f.posts.create(Uuid::new_v4(), draft).await.unwrap();
    assert!(post.published_at.is_none());

    post.status = PostStatus::Published;
    let first = f.posts.save(post).await.unwrap();
    let stamped = first.published_at.unwrap();

    let second = f.posts.save(first).await.unwrap();
    assert_eq!(second.published_at, Some(stamped));
}

#[tokio::test]
async fn test_derived_slug_collision_gets_suffix() {
    let f = fixture().await;
    let author = Uuid::new_v4();

    let first = f
        .posts
        .create(author, new_post(f.category.id, "Same Name"))
        .await
        .unwrap();
    let second = f
        .posts
        .create(author, new_post(f.category.id, "Same Name"))
        .await
        .unwrap();
    let third = f
        .posts
        .create(author, new_post(f.category.id, "Same Name"))
        .await
        .unwrap();

    assert_eq!(first.slug, "same-name");
    assert_eq!(second.slug, "same-name-2");
    assert_eq!(third.slug, "same-name-3");
}

#[tokio::test]
async fn test_explicit_slug_collision_rejected() {
    let f = fixture().await;
    let author = Uuid::new_v4();
    f.posts
        .create(author, new_post(f.category.id, "Taken"))
        .await
        .unwrap();

    let mut clash = new_post(f.category.id, "Another");
    clash.slug = Some("taken".to_string());
    let result = f.posts.create(author, clash).await;

    assert!(matches!(result, Err(DomainError::Duplicate(_))));
}

#[tokio::test]
async fn test_create_rejects_unknown_category() {
    let f = fixture().await;

    let result = f
        .posts
        .create(Uuid::new_v4(), new_post(Uuid::new_v4(), "Orphan"))
        .await;

    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_featured_image_resized_after_save() {
    let f = fixture().await;
    let mut input = new_post(f.category.id, "With Cover");
    input.featured_image = Some("posts/cover.jpg".to_string());

    f.posts.create(Uuid::new_v4(), input).await.unwrap();

    let calls = f.resizer.calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "posts/cover.jpg");
    assert_eq!((calls[0].1.max_width, calls[0].1.max_height), (800, 600));
}

#[tokio::test]
async fn test_resize_failure_does_not_fail_save() {
    let f = fixture_with(StubResizer {
        fail: true,
        ..Default::default()
    })
    .await;
    let mut input = new_post(f.category.id, "Broken Cover");
    input.featured_image = Some("posts/missing.jpg".to_string());

    let post = f.posts.create(Uuid::new_v4(), input).await.unwrap();

    let stored: Option<Post> = f.db.find_by_id(post.id).await.unwrap();
    assert!(stored.is_some());
}

#[tokio::test]
async fn test_detail_counts_one_view() {
    let f = fixture().await;
    let post = f
        .posts
        .create(Uuid::new_v4(), new_post(f.category.id, "Counted"))
        .await
        .unwrap();

    let detail = f.posts.detail("web-hosting", &post.slug).await.unwrap();
    assert_eq!(detail.post.views, 1);

    let stored: Post = f.db.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.views, 1);
}

#[tokio::test]
async fn test_detail_hides_drafts() {
    let f = fixture().await;
    let mut input = new_post(f.category.id, "Hidden");
    input.status = Some(PostStatus::Draft);
    let post = f.posts.create(Uuid::new_v4(), input).await.unwrap();

    let result = f.posts.detail("web-hosting", &post.slug).await;

    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_short_search_term_matches_nothing() {
    let f = fixture().await;
    f.posts
        .create(Uuid::new_v4(), new_post(f.category.id, "A post"))
        .await
        .unwrap();

    let page = f.posts.search("a", 1).await.unwrap();
    assert_eq!(page.total, 0);

    let page = f.posts.search("POST", 1).await.unwrap();
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn test_follow_active_link_counts_one_click() {
    let db = Arc::new(InMemoryDatabase::new());
    let active = link(true);
    db.add_affiliate_link(active.clone()).await;
    let service = AffiliateService::new(db.clone());

    let followed = service
        .follow(
            active.id,
            ClickContext {
                ip_address: Some("203.0.113.9".to_string()),
                user_agent: "curl/8".to_string(),
                referrer: String::new(),
            },
        )
        .await
        .unwrap();

    assert_eq!(followed.url, active.url);
    assert_eq!(db.affiliate_link(active.id).await.unwrap().click_count, 1);
}

#[tokio::test]
async fn test_follow_inactive_link_is_not_found() {
    let db = Arc::new(InMemoryDatabase::new());
    let inactive = link(false);
    db.add_affiliate_link(inactive.clone()).await;
    let service = AffiliateService::new(db.clone());

    let result = service.follow(inactive.id, ClickContext::default()).await;
    assert!(matches!(result, Err(DomainError::NotFound { .. })));

    let result = service.follow(Uuid::new_v4(), ClickContext::default()).await;
    assert!(matches!(result, Err(DomainError::NotFound { .. })));

    assert_eq!(db.affiliate_link(inactive.id).await.unwrap().click_count, 0);
}

#[tokio::test]
async fn test_page_view_attributed_to_post() {
    let f = fixture().await;
    let post = f
        .posts
        .create(Uuid::new_v4(), new_post(f.category.id, "Tracked"))
        .await
        .unwrap();
    let recorder = PageViewRecorder::new(f.db.clone(), f.db.clone());

    let view = recorder
        .record(PageHit {
            path: format!("/post/web-hosting/{}/", post.slug),
            url: format!("http://localhost/post/web-hosting/{}/", post.slug),
            route: Some(RouteMatch::from_route_name(
                "blog:post_detail",
                Some(post.slug.clone()),
            )),
            caller: ClickContext::default(),
        })
        .await
        .unwrap()
        .unwrap();

    assert_eq!(view.post_id, Some(post.id));
    assert_eq!(f.db.count_for_post(post.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_page_view_unknown_slug_unattributed() {
    let db = Arc::new(InMemoryDatabase::new());
    let recorder = PageViewRecorder::new(db.clone(), db.clone());

    let view = recorder
        .record(PageHit {
            path: "/post/misc/nope/".to_string(),
            url: "http://localhost/post/misc/nope/".to_string(),
            route: Some(RouteMatch::from_route_name(
                "blog:post_detail",
                Some("nope".to_string()),
            )),
            caller: ClickContext::default(),
        })
        .await
        .unwrap()
        .unwrap();

    assert_eq!(view.post_id, None);
}

#[tokio::test]
async fn test_excluded_path_not_recorded() {
    let db = Arc::new(InMemoryDatabase::new());
    let recorder = PageViewRecorder::new(db.clone(), db.clone());

    let view = recorder
        .record(PageHit {
            path: "/admin/".to_string(),
            url: "http://localhost/admin/".to_string(),
            route: None,
            caller: ClickContext::default(),
        })
        .await
        .unwrap();

    assert!(view.is_none());
    assert_eq!(db.page_view_count().await, 0);
}

#[tokio::test]
async fn test_newsletter_outcomes() {
    let f = fixture().await;
    let service = NewsletterService::new(f.db.clone(), f.db.clone());

    let first = service
        .subscribe("reader@example.com", Some("web-hosting"))
        .await
        .unwrap();
    assert_eq!(first, SubscribeOutcome::Created);

    let again = service.subscribe("reader@example.com", None).await.unwrap();
    assert_eq!(again, SubscribeOutcome::AlreadyActive);

    let mut lapsed = digihub_core::ports::NewsletterRepository::find_by_email(
        f.db.as_ref(),
        "reader@example.com",
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(lapsed.category_ids, vec![f.category.id]);
    lapsed.is_active = false;
    f.db.update(lapsed).await.unwrap();

    let back = service.subscribe("reader@example.com", None).await.unwrap();
    assert_eq!(back, SubscribeOutcome::Reactivated);
}

#[tokio::test]
async fn test_newsletter_rejects_bad_email() {
    let f = fixture().await;
    let service = NewsletterService::new(f.db.clone(), f.db.clone());

    let err = service.subscribe("   ", None).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(ref m) if m == "Email is required."));

    let err = service.subscribe("not-an-email", None).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(ref m) if m == "Please enter a valid email address."));
}

#[tokio::test]
async fn test_like_toggles() {
    let f = fixture().await;
    let post = f
        .posts
        .create(Uuid::new_v4(), new_post(f.category.id, "Likeable"))
        .await
        .unwrap();
    let engagement = EngagementService::new(f.db.repositories());
    let reader = Uuid::new_v4();

    let liked = engagement.toggle_like(post.id, reader).await.unwrap();
    assert!(liked.liked);
    assert_eq!(liked.likes_count, 1);

    let unliked = engagement.toggle_like(post.id, reader).await.unwrap();
    assert!(!unliked.liked);
    assert_eq!(unliked.likes_count, 0);

    assert!(engagement.toggle_bookmark(post.id, reader).await.unwrap());
    assert!(!engagement.toggle_bookmark(post.id, reader).await.unwrap());
}

#[tokio::test]
async fn test_comment_requires_content() {
    let f = fixture().await;
    let post = f
        .posts
        .create(Uuid::new_v4(), new_post(f.category.id, "Discuss"))
        .await
        .unwrap();
    let engagement = EngagementService::new(f.db.repositories());

    let result = engagement.add_comment(&post.slug, Uuid::new_v4(), "  ").await;
    assert!(matches!(result, Err(DomainError::Validation(_))));

    let (_, comment) = engagement
        .add_comment(&post.slug, Uuid::new_v4(), "Great read")
        .await
        .unwrap();
    assert_eq!(comment.post_id, post.id);
    assert!(comment.is_approved);
}

#[tokio::test]
async fn test_ensure_user_provisions_once() {
    let db = Arc::new(InMemoryDatabase::new());
    let id = Uuid::new_v4();

    let first = ensure_user(db.as_ref(), id, "writer@example.com").await.unwrap();
    let second = ensure_user(db.as_ref(), id, "writer@example.com").await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.username, "writer");
}

#[tokio::test]
async fn test_popular_excludes_drafts() {
    let f = fixture().await;
    let author = Uuid::new_v4();
    let mut draft = new_post(f.category.id, "Secret");
    draft.status = Some(PostStatus::Draft);
    f.posts.create(author, draft).await.unwrap();
    f.posts
        .create(author, new_post(f.category.id, "Public"))
        .await
        .unwrap();

    let popular = f.db.popular(10).await.unwrap();

    assert_eq!(popular.len(), 1);
    assert_eq!(popular[0].title, "Public");
}

#[tokio::test]
async fn test_page_beyond_last_is_clamped() {
    let f = fixture().await;
    for n in 0..7 {
        f.posts
            .create(Uuid::new_v4(), new_post(f.category.id, &format!("Host review {}", n)))
            .await
            .unwrap();
    }

    let page = f.posts.latest(u64::MAX).await.unwrap();
    assert_eq!(page.page, 2);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.total, 7);

    let page = f.posts.search("host", u64::MAX).await.unwrap();
    assert_eq!(page.page, 2);
    assert_eq!(page.items.len(), 1);
}

#[tokio::test]
async fn test_repeated_tag_ids_attach_once() {
    let f = fixture().await;
    let mut tag = Tag::new("Hosting".to_string());
    tag.prepare_for_save();
    let tag = f.db.insert(tag).await.unwrap();

    let post = f
        .posts
        .create(
            Uuid::new_v4(),
            NewPost {
                tag_ids: vec![tag.id, tag.id],
                ..new_post(f.category.id, "Tagged twice")
            },
        )
        .await
        .unwrap();

    assert_eq!(f.db.tag_ids(post.id).await.unwrap(), vec![tag.id]);
}

#[tokio::test]
async fn test_follow_survives_click_log_failure() {
    let db = Arc::new(InMemoryDatabase::new());
    let active = link(true);
    db.add_affiliate_link(active.clone()).await;
    let service = AffiliateService::new(Arc::new(ClickLogDown { links: db.clone() }));

    let followed = service
        .follow(active.id, ClickContext::default())
        .await
        .unwrap();

    assert_eq!(followed.url, active.url);
    assert_eq!(db.affiliate_link(active.id).await.unwrap().click_count, 0);
}

#[tokio::test]
async fn test_page_view_kept_when_post_lookup_fails() {
    let db = Arc::new(InMemoryDatabase::new());
    let recorder = PageViewRecorder::new(Arc::new(PostsDown), db.clone());

    let view = recorder
        .record(PageHit {
            path: "/post/web-hosting/best-hosts/".to_string(),
            url: "http://localhost/post/web-hosting/best-hosts/".to_string(),
            route: Some(RouteMatch::from_route_name(
                "blog:post_detail",
                Some("best-hosts".to_string()),
            )),
            caller: ClickContext::default(),
        })
        .await
        .unwrap()
        .unwrap();

    assert_eq!(view.post_id, None);
    assert_eq!(db.page_view_count().await, 1);
}

#[tokio::test]
async fn test_ensure_user_after_lost_insert_race() {
    let existing = User::new(Uuid::new_v4(), "writer@example.com".to_string());
    let users = RacedUsers {
        existing: existing.clone(),
        lookups: AtomicUsize::new(0),
    };

    let user = ensure_user(&users, existing.id, "writer@example.com")
        .await
        .unwrap();

    assert_eq!(user.id, existing.id);
    assert_eq!(users.lookups.load(Ordering::SeqCst), 2);
}
