
pub use packet_exchange::{tick_and_exchange, tick_and_exchange_n_times};
pub use test_client::{ReplayLog, ReplayedEvent, TestClient};
pub use test_server::TestServer;
