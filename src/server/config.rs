// Server Configuration

use std::net::SocketAddr;
use std::path::PathBuf;

/// Default listening port
pub const DEFAULT_PORT: u16 = 4444;

/// Default cap on simultaneously served connections
pub const DEFAULT_MAX_CONNECTIONS: usize = 100;

/// Configuration for the PQL server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on
    pub addr: SocketAddr,

    /// Root directory of the stored keyspaces
    pub data_dir: PathBuf,

    /// Connections beyond this are refused
    pub max_connections: usize,

    /// Whether to flush storage after every successful mutation
    pub flush_after_each_statement: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            data_dir: std::env::temp_dir().join("pql-store"),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            flush_after_each_statement: true,
        }
    }
}
