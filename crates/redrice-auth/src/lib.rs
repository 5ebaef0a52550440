//! RedRice Authentication and Authorization
//!
//! This crate provides Argon2 password hashing, JWT session tokens, the
//! bearer-token middleware and capability-based access checks.

pub mod capability;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use capability::Capability;
pub use error::AuthError;
pub use jwt::{Claims, JwtManager};
pub use middleware::{AuthUser, auth_middleware, extract_bearer_token};
pub use password::{hash_password, verify_password};
