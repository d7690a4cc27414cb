//! Domain services - the operations handlers call.
//!
//! Services hold no state of their own; every dependency is a port from
//! [`crate::ports`], bundled in [`Repositories`].

mod affiliate;
mod analytics;
mod engagement;
mod newsletter;
mod posts;
mod taxonomy;
mod users;

use std::sync::Arc;

use crate::ports::{
    AffiliateRepository, CategoryRepository, CommentRepository, EngagementRepository,
    NewsletterRepository, PageViewRepository, PostRepository, TagRepository, UserRepository,
};

pub use affiliate::AffiliateService;
pub use analytics::{
    BLOG_NAMESPACE, EXCLUDED_PREFIXES, PageHit, PageViewRecorder, RouteMatch, is_tracked,
};
pub use engagement::{EngagementService, LikeState};
pub use newsletter::{NewsletterService, SubscribeOutcome};
pub use posts::{
    CategoryListing, ListingFilter, NewPost, POSTS_PER_PAGE, PostDetail, PostService,
};
pub use taxonomy::{NewCategory, TaxonomyService};
pub use users::ensure_user;

/// Every repository the services need, behind trait objects.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub engagement: Arc<dyn EngagementRepository>,
    pub newsletter: Arc<dyn NewsletterRepository>,
    pub page_views: Arc<dyn PageViewRepository>,
    pub affiliate: Arc<dyn AffiliateRepository>,
}
