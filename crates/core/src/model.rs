//! Persisted records for the two core entities.
//!
//! The store owns both entities exclusively; these structs are row snapshots,
//! never authoritative in-memory copies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{OrgId, UserId};
use crate::role::Role;

/// A tenant, keyed by its globally unique email domain.
///
/// Created lazily on first encounter of a domain; never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrgId,
    pub name: String,
    pub domain: String,
}

/// Fields required to create an organization explicitly.
#[derive(Debug, Clone)]
pub struct NewOrganization {
    pub name: String,
    pub domain: String,
}

/// An identity, bound to exactly one organization.
///
/// `password_hash` is `None` for OAuth-only accounts — they can never pass
/// password authentication. The reset-token pair is populated only while a
/// password reset is pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub organization_id: OrgId,
    pub role: Role,
    pub reset_token: Option<String>,
    pub reset_token_expires: Option<DateTime<Utc>>,
}

/// Fields required to insert a user row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub organization_id: OrgId,
    pub role: Role,
}
