//! `skyportal-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP routing and storage.

pub mod claims;
pub mod password;
pub mod policy;
pub mod roles;
pub mod token;
pub mod user;

pub use claims::{validate_claims, Claims, TokenValidationError};
pub use password::{BcryptHasher, PasswordError, PasswordHasher};
pub use policy::{
    Decision, DenyReason, MethodMatch, PathPattern, PatternError, Policy, PolicyBuilder,
    RequestContext, Requirement, Rule,
};
pub use roles::Role;
pub use token::{Hs256TokenCodec, TokenDecoder, TokenError};
pub use user::UserAccount;
