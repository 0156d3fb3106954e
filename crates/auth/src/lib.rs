//! `huddle-auth` — authentication/authorization primitives and services.
//!
//! Policy decisions, token issuance/verification, and credential hashing are
//! pure; the identity services are generic over the store traits so this
//! crate carries no database dependency.

pub mod claims;
pub mod error;
pub mod password;
pub mod policy;
pub mod reset;
pub mod service;

pub use claims::{Claims, TOKEN_TTL_SECS, issue_token, verify_token};
pub use error::AuthError;
pub use password::{hash_password, verify_password};
pub use policy::{
    UserCreationDenial, can_create_organization, can_create_user, can_list_organizations,
};
pub use service::{IdentityService, PendingReset, ProvisionUser};
