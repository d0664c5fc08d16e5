use std::default::Default;

use tickstream_shared::{ChannelType, EventBusConfig};

/// Contains Config properties which will be used by the EventServer
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Used to configure the event bus and its frame history
    pub event_bus: EventBusConfig,
    /// Channel event frames are sent on. Unacked frames are resent every tick,
    /// so an unreliable channel is enough.
    pub channel: ChannelType,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            event_bus: EventBusConfig::default(),
            channel: ChannelType::Unreliable,
        }
    }
}
