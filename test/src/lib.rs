pub mod helpers;
pub mod test_protocol;

pub use helpers::*;
pub use local_link::{local_link, LinkConfig, LocalPeer, LocalReceiver};
pub use test_protocol::{event_types, protocol, ChatMessage, Damage, RoundStarted, SpawnUnit};
