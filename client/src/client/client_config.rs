use std::default::Default;

use tickstream_shared::{ChannelType, EventBusConfig};

/// Contains Config properties which will be used by the EventClient
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Used to configure the event bus and its frame history
    pub event_bus: EventBusConfig,
    /// Channel frame acks are sent on. A lost ack only means a frame is
    /// resent once more.
    pub ack_channel: ChannelType,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            event_bus: EventBusConfig::default(),
            ack_channel: ChannelType::Unreliable,
        }
    }
}
