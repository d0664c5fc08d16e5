mod client_config;
pub use client_config::ClientConfig;

mod event_client;
pub use event_client::EventClient;
