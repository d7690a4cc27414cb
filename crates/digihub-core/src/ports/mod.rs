//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod cache;
mod image;
mod repository;

pub use auth::{AuthError, EDITOR_ROLE, TokenClaims, TokenService};
pub use cache::{Cache, CacheError, get_json, set_json};
pub use image::{FEATURED_IMAGE_BOUNDS, ImageBounds, ImageError, ImageResizer, ResizeOutcome};
pub use repository::{
    AffiliateRepository, BaseRepository, CategoryRepository, CategoryTotals, CommentRepository,
    EngagementRepository, NewsletterRepository, Page, PageViewRepository, PostQuery,
    PostRepository, PostSort, TagRepository, UserRepository, clamp_page,
};
