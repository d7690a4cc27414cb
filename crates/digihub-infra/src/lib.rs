//! # DigiHub Infrastructure
//!
//! Concrete implementations of the ports defined in `digihub-core`:
//! persistence, caching, token validation and image processing.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory only
//! - `postgres` - PostgreSQL persistence via SeaORM
//! - `auth` - JWT bearer-token validation
//! - `redis` - Redis cache backend

pub mod cache;
pub mod database;
pub mod media;

#[cfg(feature = "auth")]
pub mod auth;

pub use cache::InMemoryCache;
pub use database::InMemoryDatabase;
pub use media::FsImageResizer;

#[cfg(feature = "auth")]
pub use auth::{JwtConfig, JwtTokenService};

#[cfg(feature = "postgres")]
pub use database::{DatabaseConfig, DatabaseConnections};

#[cfg(feature = "redis")]
pub use cache::{RedisCache, RedisConfig};
