//! Outbound mail seam.
//!
//! Delivery transport is out of scope; the trait is the injection point and
//! the log-backed implementation serves development and tests.

use async_trait::async_trait;
use tracing::info;

use huddle_core::CoreResult;

/// Out-of-band message delivery (password-reset links).
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> CoreResult<()>;
}

/// Writes the message to the log instead of delivering it.
#[derive(Debug, Default)]
pub struct LogMailer;

impl LogMailer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> CoreResult<()> {
        info!(to, subject, body, "outbound email (log transport)");
        Ok(())
    }
}
