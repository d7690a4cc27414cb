//! SeaORM entities, one module per table.

pub mod affiliate_link;
pub mod affiliate_program;
pub mod bookmark;
pub mod category;
pub mod comment;
pub mod link_click;
pub mod newsletter_category;
pub mod newsletter_subscription;
pub mod page_view;
pub mod post;
pub mod post_like;
pub mod post_tag;
pub mod tag;
pub mod user;
