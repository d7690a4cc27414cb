//! Domain entities - the core business objects.

mod affiliate;
mod category;
mod comment;
mod engagement;
mod newsletter;
mod page_view;
mod post;
mod tag;
mod user;

pub use affiliate::{AffiliateLink, AffiliateProgram, ClickContext, LinkClick};
pub use category::Category;
pub use comment::Comment;
pub use engagement::{Bookmark, PostLike};
pub use newsletter::NewsletterSubscription;
pub use page_view::PageView;
pub use post::{Post, PostStatus};
pub use tag::Tag;
pub use user::User;
