//! Bearer-token validation. Accounts are managed by an external identity
//! provider; this service only checks the tokens it signs.

mod jwt;

pub use jwt::{JwtConfig, JwtTokenService};
