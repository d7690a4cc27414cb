//! # DigiHub Core
//!
//! The domain layer of the DigiHub blog backend.
//! Entities, text helpers and domain services live here; storage, caching and
//! image processing are reached only through the traits in [`ports`].

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod text;

pub use error::{DomainError, RepoError};
