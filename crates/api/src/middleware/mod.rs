//! Request extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the owner from a JWT Bearer token.

pub mod auth;
