mod event_ids;
mod event_types;
mod registry;

pub mod error;
pub use error::ProtocolError;

pub use event_ids::{
    describe_event_ids, resolve_event_ids, validate_event_ids, NetEventIds, NoOverrides,
    ResolvedEventId,
};
pub use event_types::EventTypes;
pub use registry::{EventsMessage, FrameAckMessage, ProtocolMessage, ProtocolRegistry};
