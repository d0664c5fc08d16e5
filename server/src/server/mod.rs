mod event_server;
pub use event_server::EventServer;

mod server_config;
pub use server_config::ServerConfig;
