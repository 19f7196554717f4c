//! Chat configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default delay before an outgoing message is shown as delivered.
pub const DEFAULT_DELIVERY_DELAY_MS: u64 = 1000;

/// Default delay before an outgoing message is shown as read.
pub const DEFAULT_READ_DELAY_MS: u64 = 2000;

/// Default display name of the local user.
pub const DEFAULT_LOCAL_SENDER: &str = "You";

/// Default capacity of the re-render event channel.
const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Configuration for a conversation's lifecycle manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Milliseconds after send at which the message becomes delivered
    pub delivery_delay_ms: u64,
    /// Milliseconds after send at which the message becomes read
    pub read_delay_ms: u64,
    /// Sender name stamped on locally authored messages
    pub local_sender: String,
    /// Buffered events per subscriber before it starts lagging
    pub event_capacity: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            delivery_delay_ms: DEFAULT_DELIVERY_DELAY_MS,
            read_delay_ms: DEFAULT_READ_DELAY_MS,
            local_sender: DEFAULT_LOCAL_SENDER.to_string(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl ChatConfig {
    /// Delivery delay as a `Duration`
    pub fn delivery_delay(&self) -> Duration {
        Duration::from_millis(self.delivery_delay_ms)
    }

    /// Read delay as a `Duration`
    pub fn read_delay(&self) -> Duration {
        Duration::from_millis(self.read_delay_ms)
    }

    /// Reject configurations the lifecycle can't honour.
    ///
    /// Both timers are measured from send time, so the read delay must be
    /// strictly longer than the delivery delay for the two transitions to
    /// land in order.
    pub fn validate(&self) -> Result<()> {
        if self.delivery_delay_ms == 0 || self.read_delay_ms == 0 {
            return Err(Error::InvalidConfig(
                "status delays must be greater than zero".into(),
            ));
        }
        if self.read_delay_ms <= self.delivery_delay_ms {
            return Err(Error::InvalidConfig(format!(
                "read delay ({}ms) must be longer than delivery delay ({}ms)",
                self.read_delay_ms, self.delivery_delay_ms
            )));
        }
        if self.local_sender.trim().is_empty() {
            return Err(Error::InvalidConfig("local sender name is empty".into()));
        }
        if self.event_capacity == 0 {
            return Err(Error::InvalidConfig("event capacity must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ChatConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.delivery_delay(), Duration::from_millis(1000));
        assert_eq!(config.read_delay(), Duration::from_millis(2000));
        assert_eq!(config.local_sender, "You");
    }

    #[test]
    fn test_rejects_zero_delay() {
        let config = ChatConfig {
            delivery_delay_ms: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_read_before_delivery() {
        let config = ChatConfig {
            delivery_delay_ms: 2000,
            read_delay_ms: 2000,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("read delay"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ChatConfig = serde_json::from_str(r#"{"read_delay_ms": 5000}"#).unwrap();
        assert_eq!(config.delivery_delay_ms, 1000);
        assert_eq!(config.read_delay_ms, 5000);
        assert_eq!(config.event_capacity, 256);
    }
}
