use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use pqlstore::Database;
use pqlstore::server::config::{DEFAULT_MAX_CONNECTIONS, DEFAULT_PORT};
use pqlstore::server::{Server, ServerConfig};

#[derive(Parser)]
#[command(author, version, about = "PQL server - a column-family store speaking PQL over TCP")]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value_t = SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)))]
    addr: SocketAddr,

    /// Data directory (defaults to pql-store under the system temp directory)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Maximum number of simultaneous connections
    #[arg(short, long, default_value_t = DEFAULT_MAX_CONNECTIONS)]
    max_connections: usize,

    /// Do not flush to disk after every mutating statement
    #[arg(long)]
    no_flush: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let defaults = ServerConfig::default();

    let config = ServerConfig {
        addr: args.addr,
        data_dir: args.data_dir.unwrap_or(defaults.data_dir),
        max_connections: args.max_connections,
        flush_after_each_statement: !args.no_flush,
    };

    let database = Database::open(&config.data_dir)
        .with_context(|| format!("Failed to load data from {}", config.data_dir.display()))?;
    println!(
        "Loaded {} keyspaces from {}",
        database.registry().len(),
        config.data_dir.display()
    );

    let server = Server::bind(config.clone(), database.clone())
        .with_context(|| format!("Failed to listen on {}", config.addr))?;
    println!("Listening on {}", server.local_addr()?);

    server.serve().context("Server stopped")?;
    database.flush().context("Final flush failed")?;
    Ok(())
}
