//! Server Module
//!
//! Line-oriented TCP front end: configuration, the per-connection session
//! and the accept loop.

pub mod config;
pub mod server;
pub mod session;

pub use self::config::ServerConfig;
pub use self::server::{Server, handle_connection};
pub use self::session::Session;
