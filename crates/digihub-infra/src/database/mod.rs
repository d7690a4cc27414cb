//! Persistence: PostgreSQL via SeaORM, plus an in-memory fallback.

mod memory;

#[cfg(feature = "postgres")]
mod connections;
#[cfg(feature = "postgres")]
pub mod entity;
#[cfg(feature = "postgres")]
mod postgres_base;
#[cfg(feature = "postgres")]
pub mod postgres_repo;

pub use memory::InMemoryDatabase;

#[cfg(feature = "postgres")]
pub use connections::{DatabaseConfig, DatabaseConnections};

#[cfg(feature = "postgres")]
pub use postgres_repo::{
    PostgresAffiliateRepository, PostgresCategoryRepository, PostgresCommentRepository,
    PostgresEngagementRepository, PostgresNewsletterRepository, PostgresPageViewRepository,
    PostgresPostRepository, PostgresTagRepository, PostgresUserRepository,
};

#[cfg(feature = "postgres")]
#[cfg(test)]
mod tests;

#[cfg(test)]
mod service_tests;
