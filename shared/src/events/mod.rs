mod bus;
mod history;
mod serializer;

pub mod error;
pub use error::EventBusError;

pub use bus::{ListenerId, NetEventBus};
pub use history::EventHistory;
pub use serializer::{EventSerializer, SerdeSerializer};
