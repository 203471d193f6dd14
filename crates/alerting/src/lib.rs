//! Fire alerting.
//!
//! Decides when fire detections become outbound alerts and delivers them
//! without blocking frame processing:
//!
//! - [`CooldownState`] limits dispatches to one per cooldown window
//! - [`AlertDispatcher`] owns the gate and queues accepted alerts for a
//!   background delivery task
//! - [`TelegramTransport`] carries alerts to the Telegram Bot API
//!
//! Delivery is fire-and-forget: transport failures are logged, never
//! propagated back to the caller.

mod cooldown;
mod dispatcher;
mod message;
mod transport;

pub use cooldown::CooldownState;
pub use dispatcher::AlertDispatcher;
pub use message::{AlertMessage, AlertSource};
pub use transport::{AlertTransport, TelegramConfig, TelegramTransport};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Alert delivery errors.
#[derive(Error, Debug)]
pub enum AlertError {
    #[error("alert transport is not configured")]
    NotConfigured,

    #[error("alert delivery failed: {0}")]
    Delivery(String),

    #[error("alert rejected by remote service: {0}")]
    Rejected(String),
}

/// Alerting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Minimum seconds between dispatched alerts.
    pub cooldown_seconds: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cooldown_seconds: 30,
        }
    }
}
