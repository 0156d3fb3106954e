//! Infrastructure layer: Postgres stores, Redis rate limiting, mail delivery.
//!
//! Everything here is an explicitly constructed, injected resource handle —
//! built once at process start and passed into the API wiring, never
//! referenced as ambient global state.

pub mod db;
pub mod mailer;
pub mod ratelimit;
pub mod store;

pub use mailer::{LogMailer, Mailer};
pub use ratelimit::{InMemoryRateLimitStore, RateLimitStore, RedisRateLimitStore};
pub use store::memory::{InMemoryOrganizationStore, InMemoryUserStore};
pub use store::postgres::{PostgresOrganizationStore, PostgresUserStore};
