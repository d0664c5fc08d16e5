use std::default::Default;

use crate::constants::{DEFAULT_OVERFLOW_LIMIT, EVENT_STREAM_INITIAL_SIZE, LARGE_TRIM_WARNING};

/// Contains Config properties which will be used by an EventHistory
#[derive(Clone, Debug)]
pub struct EventHistoryConfig {
    /// Maximum number of frames kept, even if some peer has not acked them.
    /// A peer that falls further behind than this is considered unrecoverable.
    /// Frames more than `FrameDelta::MAX` behind the packet's base frame cannot
    /// be written, so values above `FrameDelta::MAX + 1` keep frames that are
    /// never sent.
    pub overflow_limit: usize,
    /// Single trims that drop more frames than this are logged as a warning
    pub large_trim_warning: usize,
}

impl Default for EventHistoryConfig {
    fn default() -> Self {
        Self {
            overflow_limit: DEFAULT_OVERFLOW_LIMIT,
            large_trim_warning: LARGE_TRIM_WARNING,
        }
    }
}

/// Contains Config properties which will be used by a NetEventBus
#[derive(Clone, Debug)]
pub struct EventBusConfig {
    /// Used to configure the frame history
    pub history: EventHistoryConfig,
    /// Initial byte capacity of each tick's event stream
    pub stream_initial_capacity: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            history: EventHistoryConfig::default(),
            stream_initial_capacity: EVENT_STREAM_INITIAL_SIZE,
        }
    }
}
