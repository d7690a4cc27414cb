//! Middleware, extractors and the handler error type.

pub mod auth;
pub mod error;
pub mod page_view;

pub use auth::Identity;
pub use error::{AppError, AppResult};
pub use page_view::{PageViewMiddleware, caller_context};
