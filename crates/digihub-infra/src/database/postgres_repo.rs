//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Alias, Expr, Func, LikeExpr, Query, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use uuid::Uuid;

use digihub_core::domain::{
    AffiliateLink, Category, Comment, LinkClick, NewsletterSubscription, PageView, Post,
    PostStatus, Tag,
};
use digihub_core::error::RepoError;
use digihub_core::ports::{
    AffiliateRepository, CategoryRepository, CategoryTotals, CommentRepository,
    EngagementRepository, NewsletterRepository, Page, PageViewRepository, PostQuery,
    PostRepository, PostSort, TagRepository, UserRepository, clamp_page,
};

use super::entity::affiliate_link::{self, Entity as AffiliateLinkEntity};
use super::entity::bookmark::{self, Entity as BookmarkEntity};
use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::link_click::{self, Entity as LinkClickEntity};
use super::entity::newsletter_category::{self, Entity as NewsletterCategoryEntity};
use super::entity::newsletter_subscription::{self, Entity as NewsletterEntity};
use super::entity::page_view::{self, Entity as PageViewEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_like::{self, Entity as PostLikeEntity};
use super::entity::post_tag::{self, Entity as PostTagEntity};
use super::entity::tag::{self, Entity as TagEntity};
use super::entity::user::Entity as UserEntity;
use super::postgres_base::{PostgresBaseRepository, db_err};

pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;
pub type PostgresTagRepository = PostgresBaseRepository<TagEntity>;
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;
/// Likes and bookmarks. Keyed on the likes table; bookmarks share the connection.
pub type PostgresEngagementRepository = PostgresBaseRepository<PostLikeEntity>;
pub type PostgresNewsletterRepository = PostgresBaseRepository<NewsletterEntity>;
pub type PostgresPageViewRepository = PostgresBaseRepository<PageViewEntity>;
pub type PostgresAffiliateRepository = PostgresBaseRepository<AffiliateLinkEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let result = CategoryEntity::find()
            .order_by_asc(category::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        let result = TagEntity::find()
            .filter(tag::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Tag>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = TagEntity::find()
            .filter(tag::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(tag::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

fn published() -> Select<PostEntity> {
    PostEntity::find().filter(post::Column::Status.eq(PostStatus::Published.as_str()))
}

fn newest_first(select: Select<PostEntity>) -> Select<PostEntity> {
    select
        .order_by_desc(post::Column::PublishedAt)
        .order_by_desc(post::Column::CreatedAt)
}

fn sorted(select: Select<PostEntity>, sort: PostSort) -> Select<PostEntity> {
    match sort {
        PostSort::Latest => newest_first(select),
        PostSort::Oldest => select
            .order_by_asc(post::Column::PublishedAt)
            .order_by_asc(post::Column::CreatedAt),
        PostSort::Title => select.order_by_asc(post::Column::Title),
        PostSort::Popular => select
            .order_by_desc(post::Column::Views)
            .order_by_desc(post::Column::PublishedAt),
    }
}

/// Lowercased `%term%` with the term's own `\`, `%` and `_` escaped so they
/// match literally.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// `lower(column) LIKE pattern ESCAPE '\'`, with `pattern` built by
/// [`like_pattern`].
fn lower_like(column: impl Into<SimpleExpr>, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(column)).like(LikeExpr::new(pattern).escape('\\'))
}

/// Case-insensitive match on title, excerpt, content or any attached tag name.
pub(crate) fn text_match(term: &str) -> Condition {
    let pattern = like_pattern(term);

    let tagged = Query::select()
        .column((PostTagEntity, post_tag::Column::PostId))
        .from(PostTagEntity)
        .inner_join(
            TagEntity,
            Expr::col((TagEntity, tag::Column::Id)).equals((PostTagEntity, post_tag::Column::TagId)),
        )
        .and_where(lower_like(Expr::col((TagEntity, tag::Column::Name)), &pattern))
        .to_owned();

    Condition::any()
        .add(lower_like(Expr::col((PostEntity, post::Column::Title)), &pattern))
        .add(lower_like(Expr::col((PostEntity, post::Column::Excerpt)), &pattern))
        .add(lower_like(Expr::col((PostEntity, post::Column::Content)), &pattern))
        .add(post::Column::Id.in_subquery(tagged))
}

impl PostgresPostRepository {
    async fn paginate(
        &self,
        select: Select<PostEntity>,
        page: u64,
        per_page: u64,
    ) -> Result<Page<Post>, RepoError> {
        let per_page = per_page.max(1);
        let paginator = select.paginate(&self.db, per_page);
        let total = paginator.num_items().await.map_err(db_err)?;
        let page = clamp_page(page, total, per_page);
        let items = paginator.fetch_page(page - 1).await.map_err(db_err)?;

        Ok(Page {
            items: items.into_iter().map(Into::into).collect(),
            page,
            per_page,
            total,
        })
    }

    async fn tag_id_by_slug(&self, slug: &str) -> Result<Option<Uuid>, RepoError> {
        let found = TagEntity::find()
            .filter(tag::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(found.map(|t| t.id))
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let result = published()
            .filter(post::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_published(&self, query: &PostQuery) -> Result<Page<Post>, RepoError> {
        let mut select = published();

        if let Some(category_id) = query.category_id {
            select = select.filter(post::Column::CategoryId.eq(category_id));
        }
        if let Some(tag_slug) = query.tag_slug.as_deref() {
            let Some(tag_id) = self.tag_id_by_slug(tag_slug).await? else {
                return Ok(Page::empty(query.page.max(1), query.per_page));
            };
            let tagged = Query::select()
                .column(post_tag::Column::PostId)
                .from(PostTagEntity)
                .and_where(post_tag::Column::TagId.eq(tag_id))
                .to_owned();
            select = select.filter(post::Column::Id.in_subquery(tagged));
        }
        if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            select = select.filter(text_match(term));
        }

        self.paginate(sorted(select, query.sort), query.page, query.per_page)
            .await
    }

    async fn search(&self, term: &str, page: u64, per_page: u64) -> Result<Page<Post>, RepoError> {
        tracing::debug!(term = %term, page, "Searching posts");
        let select = newest_first(published().filter(text_match(term)));
        self.paginate(select, page, per_page).await
    }

    async fn popular(&self, limit: u64) -> Result<Vec<Post>, RepoError> {
        let result = published()
            .order_by_desc(post::Column::Views)
            .order_by_desc(post::Column::PublishedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn related(&self, post: &Post, limit: u64) -> Result<Vec<Post>, RepoError> {
        let result = newest_first(
            published()
                .filter(post::Column::CategoryId.eq(post.category_id))
                .filter(post::Column::Id.ne(post.id)),
        )
        .limit(limit)
        .all(&self.db)
        .await
        .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn category_totals(&self, category_id: Uuid) -> Result<CategoryTotals, RepoError> {
        let in_category = published().filter(post::Column::CategoryId.eq(category_id));

        let articles = in_category.clone().count(&self.db).await.map_err(db_err)?;

        // SUM(bigint) is numeric in Postgres; cast back so it decodes as i64.
        let total_views = SimpleExpr::from(Func::cast_as(
            Func::coalesce([Expr::col(post::Column::Views).sum(), Expr::val(0i64).into()]),
            Alias::new("bigint"),
        ));
        let views = in_category
            .select_only()
            .column_as(total_views, "views")
            .into_tuple::<i64>()
            .one(&self.db)
            .await
            .map_err(db_err)?
            .unwrap_or(0);

        Ok(CategoryTotals { articles, views })
    }

    async fn increment_views(&self, id: Uuid) -> Result<(), RepoError> {
        let result = PostEntity::update_many()
            .col_expr(post::Column::Views, Expr::col(post::Column::Views).add(1))
            .filter(post::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn set_tags(&self, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), RepoError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        PostTagEntity::delete_many()
            .filter(post_tag::Column::PostId.eq(post_id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        if !tag_ids.is_empty() {
            let rows = tag_ids.iter().map(|tag_id| post_tag::ActiveModel {
                post_id: Set(post_id),
                tag_id: Set(*tag_id),
            });
            PostTagEntity::insert_many(rows)
                .exec(&txn)
                .await
                .map_err(db_err)?;
        }

        txn.commit().await.map_err(db_err)
    }

    async fn tag_ids(&self, post_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        let rows = PostTagEntity::find()
            .filter(post_tag::Column::PostId.eq(post_id))
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(rows.into_iter().map(|r| r.tag_id).collect())
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn approved_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .filter(comment::Column::IsApproved.eq(true))
            .order_by_desc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl EngagementRepository for PostgresEngagementRepository {
    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        let existing = PostLikeEntity::find()
            .filter(post_like::Column::PostId.eq(post_id))
            .filter(post_like::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        if let Some(like) = existing {
            PostLikeEntity::delete_by_id(like.id)
                .exec(&self.db)
                .await
                .map_err(db_err)?;
            return Ok(false);
        }

        let like = post_like::ActiveModel {
            id: Set(Uuid::new_v4()),
            post_id: Set(post_id),
            user_id: Set(user_id),
            created_at: Set(Utc::now().into()),
        };
        match like.insert(&self.db).await.map_err(db_err) {
            Ok(_) => Ok(true),
            // A concurrent request liked first; the pair is liked either way.
            Err(RepoError::Constraint(_)) => Ok(true),
            Err(e) => Err(e),
        }
    }

    async fn like_count(&self, post_id: Uuid) -> Result<u64, RepoError> {
        PostLikeEntity::find()
            .filter(post_like::Column::PostId.eq(post_id))
            .count(&self.db)
            .await
            .map_err(db_err)
    }

    async fn toggle_bookmark(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        let existing = BookmarkEntity::find()
            .filter(bookmark::Column::PostId.eq(post_id))
            .filter(bookmark::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        if let Some(mark) = existing {
            BookmarkEntity::delete_by_id(mark.id)
                .exec(&self.db)
                .await
                .map_err(db_err)?;
            return Ok(false);
        }

        let mark = bookmark::ActiveModel {
            id: Set(Uuid::new_v4()),
            post_id: Set(post_id),
            user_id: Set(user_id),
            created_at: Set(Utc::now().into()),
        };
        match mark.insert(&self.db).await.map_err(db_err) {
            Ok(_) | Err(RepoError::Constraint(_)) => Ok(true),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl NewsletterRepository for PostgresNewsletterRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<NewsletterSubscription>, RepoError> {
        let Some(model) = NewsletterEntity::find()
            .filter(newsletter_subscription::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let category_ids = NewsletterCategoryEntity::find()
            .filter(newsletter_category::Column::SubscriptionId.eq(model.id))
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|row| row.category_id)
            .collect();

        let mut subscription: NewsletterSubscription = model.into();
        subscription.category_ids = category_ids;
        Ok(Some(subscription))
    }

    async fn add_category(&self, subscription_id: Uuid, category_id: Uuid) -> Result<(), RepoError> {
        let existing = NewsletterCategoryEntity::find_by_id((subscription_id, category_id))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        if existing.is_some() {
            return Ok(());
        }

        let row = newsletter_category::ActiveModel {
            subscription_id: Set(subscription_id),
            category_id: Set(category_id),
        };
        NewsletterCategoryEntity::insert(row)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

#[async_trait]
impl PageViewRepository for PostgresPageViewRepository {
    async fn record(&self, view: PageView) -> Result<PageView, RepoError> {
        let model = page_view::ActiveModel::from(view)
            .insert(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.into())
    }

    async fn count_for_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        PageViewEntity::find()
            .filter(page_view::Column::PostId.eq(post_id))
            .count(&self.db)
            .await
            .map_err(db_err)
    }
}

#[async_trait]
impl AffiliateRepository for PostgresAffiliateRepository {
    async fn find_active_link(&self, id: Uuid) -> Result<Option<AffiliateLink>, RepoError> {
        let result = AffiliateLinkEntity::find_by_id(id)
            .filter(affiliate_link::Column::IsActive.eq(true))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_active_links(&self) -> Result<Vec<AffiliateLink>, RepoError> {
        let result = AffiliateLinkEntity::find()
            .filter(affiliate_link::Column::IsActive.eq(true))
            .order_by_asc(affiliate_link::Column::Title)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    /// Insert the click and bump the link counter in one transaction.
    ///
    /// The counter is incremented in SQL so concurrent clicks never lose an
    /// update.
    async fn record_click(&self, click: LinkClick) -> Result<(), RepoError> {
        let link_id = click.link_id;
        let clicked_at = click.clicked_at;
        let txn = self.db.begin().await.map_err(db_err)?;

        LinkClickEntity::insert(link_click::ActiveModel::from(click))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        let result = AffiliateLinkEntity::update_many()
            .col_expr(
                affiliate_link::Column::ClickCount,
                Expr::col(affiliate_link::Column::ClickCount).add(1),
            )
            .col_expr(
                affiliate_link::Column::LastClickedAt,
                Expr::value(clicked_at.fixed_offset()),
            )
            .filter(affiliate_link::Column::Id.eq(link_id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            txn.rollback().await.map_err(db_err)?;
            return Err(RepoError::NotFound);
        }

        txn.commit().await.map_err(db_err)
    }

    async fn click_count(&self, link_id: Uuid) -> Result<u64, RepoError> {
        LinkClickEntity::find()
            .filter(link_click::Column::LinkId.eq(link_id))
            .count(&self.db)
            .await
            .map_err(db_err)
    }
}
