//! In-memory repositories - used when no database is configured, and in tests.
//!
//! Everything lives in one set of tables behind an async `RwLock`, so every
//! repository trait is implemented by the same `InMemoryDatabase`. Data is
//! lost on process restart.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use digihub_core::domain::{
    AffiliateLink, AffiliateProgram, Bookmark, Category, Comment, LinkClick,
    NewsletterSubscription, PageView, Post, PostLike, PostStatus, Tag, User,
};
use digihub_core::error::RepoError;
use digihub_core::ports::{
    AffiliateRepository, BaseRepository, CategoryRepository, CategoryTotals, CommentRepository,
    EngagementRepository, NewsletterRepository, Page, PageViewRepository, PostQuery,
    PostRepository, PostSort, TagRepository, UserRepository, clamp_page,
};
use digihub_core::services::Repositories;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    categories: HashMap<Uuid, Category>,
    tags: HashMap<Uuid, Tag>,
    posts: HashMap<Uuid, Post>,
    post_tags: Vec<(Uuid, Uuid)>,
    comments: HashMap<Uuid, Comment>,
    likes: Vec<PostLike>,
    bookmarks: Vec<Bookmark>,
    subscriptions: HashMap<Uuid, NewsletterSubscription>,
    page_views: Vec<PageView>,
    programs: HashMap<Uuid, AffiliateProgram>,
    links: HashMap<Uuid, AffiliateLink>,
    clicks: Vec<LinkClick>,
}

impl Tables {
    fn tag_names(&self, post_id: Uuid) -> impl Iterator<Item = &str> {
        self.post_tags
            .iter()
            .filter(move |(p, _)| *p == post_id)
            .filter_map(|(_, t)| self.tags.get(t))
            .map(|t| t.name.as_str())
    }

    fn matches_text(&self, post: &Post, term: &str) -> bool {
        let term = term.to_lowercase();
        post.title.to_lowercase().contains(&term)
            || post.excerpt.to_lowercase().contains(&term)
            || post.content.to_lowercase().contains(&term)
            || self
                .tag_names(post.id)
                .any(|name| name.to_lowercase().contains(&term))
    }

    fn published(&self) -> impl Iterator<Item = &Post> {
        self.posts.values().filter(|p| p.status == PostStatus::Published)
    }
}

/// Process-local stand-in for the PostgreSQL repositories.
#[derive(Default)]
pub struct InMemoryDatabase {
    tables: RwLock<Tables>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out this store as every repository port.
    pub fn repositories(self: &Arc<Self>) -> Repositories {
        Repositories {
            users: self.clone(),
            posts: self.clone(),
            categories: self.clone(),
            tags: self.clone(),
            comments: self.clone(),
            engagement: self.clone(),
            newsletter: self.clone(),
            page_views: self.clone(),
            affiliate: self.clone(),
        }
    }

    /// Affiliate programs and links are managed out of band; this seeds them.
    pub async fn add_affiliate_program(&self, program: AffiliateProgram) {
        self.tables.write().await.programs.insert(program.id, program);
    }

    pub async fn add_affiliate_link(&self, link: AffiliateLink) {
        self.tables.write().await.links.insert(link.id, link);
    }

    /// Current state of a link, active or not.
    pub async fn affiliate_link(&self, id: Uuid) -> Option<AffiliateLink> {
        self.tables.read().await.links.get(&id).cloned()
    }

    pub async fn page_view_count(&self) -> usize {
        self.tables.read().await.page_views.len()
    }

    pub async fn page_views(&self) -> Vec<PageView> {
        self.tables.read().await.page_views.clone()
    }
}

/// `BaseRepository` over one table. `$key` names the column that must stay
/// unique across rows.
macro_rules! table_repository {
    ($entity:ty, $table:ident, $key:expr) => {
        #[async_trait]
        impl BaseRepository<$entity, Uuid> for InMemoryDatabase {
            async fn find_by_id(&self, id: Uuid) -> Result<Option<$entity>, RepoError> {
                Ok(self.tables.read().await.$table.get(&id).cloned())
            }

            async fn insert(&self, entity: $entity) -> Result<$entity, RepoError> {
                let mut tables = self.tables.write().await;
                let key = $key;
                if tables.$table.contains_key(&entity.id)
                    || tables.$table.values().any(|row| key(row) == key(&entity))
                {
                    return Err(RepoError::Constraint(format!(
                        "duplicate key in {}",
                        stringify!($table)
                    )));
                }
                tables.$table.insert(entity.id, entity.clone());
                Ok(entity)
            }

            async fn update(&self, entity: $entity) -> Result<$entity, RepoError> {
                let mut tables = self.tables.write().await;
                let key = $key;
                if !tables.$table.contains_key(&entity.id) {
                    return Err(RepoError::NotFound);
                }
                if tables
                    .$table
                    .values()
                    .any(|row| row.id != entity.id && key(row) == key(&entity))
                {
                    return Err(RepoError::Constraint(format!(
                        "duplicate key in {}",
                        stringify!($table)
                    )));
                }
                tables.$table.insert(entity.id, entity.clone());
                Ok(entity)
            }

            async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
                match self.tables.write().await.$table.remove(&id) {
                    Some(_) => Ok(()),
                    None => Err(RepoError::NotFound),
                }
            }
        }
    };
}

table_repository!(User, users, |u: &User| u.email.clone());
table_repository!(Category, categories, |c: &Category| c.slug.clone());
table_repository!(Tag, tags, |t: &Tag| t.slug.clone());
table_repository!(Post, posts, |p: &Post| p.slug.clone());
table_repository!(Comment, comments, |c: &Comment| c.id);
table_repository!(NewsletterSubscription, subscriptions, |s: &NewsletterSubscription| s
    .email
    .clone());

fn paginate(mut posts: Vec<Post>, sort: PostSort, page: u64, per_page: u64) -> Page<Post> {
    match sort {
        PostSort::Latest => posts.sort_by_key(|p| Reverse((p.published_at, p.created_at))),
        PostSort::Oldest => posts.sort_by_key(|p| (p.published_at, p.created_at)),
        PostSort::Title => posts.sort_by(|a, b| a.title.cmp(&b.title)),
        PostSort::Popular => posts.sort_by_key(|p| Reverse((p.views, p.published_at))),
    }

    let per_page = per_page.max(1);
    let total = posts.len() as u64;
    let page = clamp_page(page, total, per_page);
    let items = posts
        .into_iter()
        .skip(((page - 1) * per_page) as usize)
        .take(per_page as usize)
        .collect();

    Page {
        items,
        page,
        per_page,
        total,
    }
}

#[async_trait]
impl UserRepository for InMemoryDatabase {}

#[async_trait]
impl CategoryRepository for InMemoryDatabase {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.categories.values().find(|c| c.slug == slug).cloned())
    }

    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let mut categories: Vec<Category> =
            self.tables.read().await.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }
}

#[async_trait]
impl TagRepository for InMemoryDatabase {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.tags.values().find(|t| t.slug == slug).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Tag>, RepoError> {
        let tables = self.tables.read().await;
        let mut tags: Vec<Tag> = ids.iter().filter_map(|id| tables.tags.get(id)).cloned().collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        tags.dedup_by_key(|t| t.id);
        Ok(tags)
    }
}

#[async_trait]
impl PostRepository for InMemoryDatabase {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.values().find(|p| p.slug == slug).cloned())
    }

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.published().find(|p| p.slug == slug).cloned())
    }

    async fn list_published(&self, query: &PostQuery) -> Result<Page<Post>, RepoError> {
        let tables = self.tables.read().await;

        let tag_id = match query.tag_slug.as_deref() {
            Some(slug) => match tables.tags.values().find(|t| t.slug == slug) {
                Some(tag) => Some(tag.id),
                None => return Ok(Page::empty(query.page.max(1), query.per_page)),
            },
            None => None,
        };
        let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());

        let posts = tables
            .published()
            .filter(|p| query.category_id.is_none_or(|c| p.category_id == c))
            .filter(|p| tag_id.is_none_or(|t| tables.post_tags.contains(&(p.id, t))))
            .filter(|p| search.is_none_or(|term| tables.matches_text(p, term)))
            .cloned()
            .collect();

        Ok(paginate(posts, query.sort, query.page, query.per_page))
    }

    async fn search(&self, term: &str, page: u64, per_page: u64) -> Result<Page<Post>, RepoError> {
        let tables = self.tables.read().await;
        let posts = tables
            .published()
            .filter(|p| tables.matches_text(p, term))
            .cloned()
            .collect();
        Ok(paginate(posts, PostSort::Latest, page, per_page))
    }

    async fn popular(&self, limit: u64) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        let posts = tables.published().cloned().collect();
        Ok(paginate(posts, PostSort::Popular, 1, limit).items)
    }

    async fn related(&self, post: &Post, limit: u64) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        let posts = tables
            .published()
            .filter(|p| p.category_id == post.category_id && p.id != post.id)
            .cloned()
            .collect();
        Ok(paginate(posts, PostSort::Latest, 1, limit).items)
    }

    async fn category_totals(&self, category_id: Uuid) -> Result<CategoryTotals, RepoError> {
        let tables = self.tables.read().await;
        let (articles, views) = tables
            .published()
            .filter(|p| p.category_id == category_id)
            .fold((0u64, 0i64), |(n, v), p| (n + 1, v + p.views));
        Ok(CategoryTotals { articles, views })
    }

    async fn increment_views(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        let post = tables.posts.get_mut(&id).ok_or(RepoError::NotFound)?;
        post.views += 1;
        Ok(())
    }

    async fn set_tags(&self, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.post_tags.retain(|(p, _)| *p != post_id);
        for tag_id in tag_ids {
            if !tables.post_tags.contains(&(post_id, *tag_id)) {
                tables.post_tags.push((post_id, *tag_id));
            }
        }
        Ok(())
    }

    async fn tag_ids(&self, post_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .post_tags
            .iter()
            .filter(|(p, _)| *p == post_id)
            .map(|(_, t)| *t)
            .collect())
    }
}

#[async_trait]
impl CommentRepository for InMemoryDatabase {
    async fn approved_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id && c.is_approved)
            .cloned()
            .collect();
        comments.sort_by_key(|c| Reverse(c.created_at));
        Ok(comments)
    }
}

#[async_trait]
impl EngagementRepository for InMemoryDatabase {
    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        let mut tables = self.tables.write().await;
        let before = tables.likes.len();
        tables
            .likes
            .retain(|l| !(l.post_id == post_id && l.user_id == user_id));
        if tables.likes.len() < before {
            return Ok(false);
        }
        tables.likes.push(PostLike::new(post_id, user_id));
        Ok(true)
    }

    async fn like_count(&self, post_id: Uuid) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.likes.iter().filter(|l| l.post_id == post_id).count() as u64)
    }

    async fn toggle_bookmark(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        let mut tables = self.tables.write().await;
        let before = tables.bookmarks.len();
        tables
            .bookmarks
            .retain(|b| !(b.post_id == post_id && b.user_id == user_id));
        if tables.bookmarks.len() < before {
            return Ok(false);
        }
        tables.bookmarks.push(Bookmark::new(post_id, user_id));
        Ok(true)
    }
}

#[async_trait]
impl NewsletterRepository for InMemoryDatabase {
    async fn find_by_email(&self, email: &str) -> Result<Option<NewsletterSubscription>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.subscriptions.values().find(|s| s.email == email).cloned())
    }

    async fn add_category(&self, subscription_id: Uuid, category_id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        let subscription = tables
            .subscriptions
            .get_mut(&subscription_id)
            .ok_or(RepoError::NotFound)?;
        if !subscription.category_ids.contains(&category_id) {
            subscription.category_ids.push(category_id);
        }
        Ok(())
    }
}

#[async_trait]
impl PageViewRepository for InMemoryDatabase {
    async fn record(&self, view: PageView) -> Result<PageView, RepoError> {
        self.tables.write().await.page_views.push(view.clone());
        Ok(view)
    }

    async fn count_for_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .page_views
            .iter()
            .filter(|v| v.post_id == Some(post_id))
            .count() as u64)
    }
}

#[async_trait]
impl AffiliateRepository for InMemoryDatabase {
    async fn find_active_link(&self, id: Uuid) -> Result<Option<AffiliateLink>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.links.get(&id).filter(|l| l.is_active).cloned())
    }

    async fn list_active_links(&self) -> Result<Vec<AffiliateLink>, RepoError> {
        let tables = self.tables.read().await;
        let mut links: Vec<AffiliateLink> =
            tables.links.values().filter(|l| l.is_active).cloned().collect();
        links.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(links)
    }

    async fn record_click(&self, click: LinkClick) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        let link = tables
            .links
            .get_mut(&click.link_id)
            .ok_or(RepoError::NotFound)?;
        link.click_count += 1;
        link.last_clicked_at = Some(click.clicked_at);
        tables.clicks.push(click);
        Ok(())
    }

    async fn click_count(&self, link_id: Uuid) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.clicks.iter().filter(|c| c.link_id == link_id).count() as u64)
    }
}
