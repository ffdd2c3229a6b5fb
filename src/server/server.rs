// PQL Server
//
// Accepts TCP connections and serves each one on its own thread. A
// connection is a sequence of statement lines; every statement is answered
// with its response lines, the last of which is always OK.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use log::{error, info, warn};

use crate::database::Database;

use super::config::ServerConfig;
use super::session::{ERROR_PREFIX, Session};

/// Line that ends a session
pub const QUIT_COMMAND: &str = "quit";

/// Counts a served connection for as long as it is alive
struct ConnectionGuard {
    active: Arc<AtomicUsize>,
}

impl ConnectionGuard {
    fn acquire(active: &Arc<AtomicUsize>, limit: usize) -> Option<Self> {
        active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| (n < limit).then_some(n + 1))
            .ok()
            .map(|_| ConnectionGuard {
                active: Arc::clone(active),
            })
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::AcqRel);
    }
}

pub struct Server {
    listener: TcpListener,
    database: Database,
    config: ServerConfig,
    active: Arc<AtomicUsize>,
}

impl Server {
    /// Listen on `config.addr`
    pub fn bind(config: ServerConfig, database: Database) -> io::Result<Self> {
        let listener = TcpListener::bind(config.addr)?;
        info!("PQL server listening on {}", listener.local_addr()?);
        Ok(Server {
            listener,
            database,
            config,
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Number of connections currently being served
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Accept connections until the listener fails
    pub fn serve(&self) -> io::Result<()> {
        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => self.dispatch(stream),
                Err(e) => error!("Failed to accept connection: {}", e),
            }
        }
        Ok(())
    }

    fn dispatch(&self, mut stream: TcpStream) {
        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown peer".to_string());

        let Some(guard) = ConnectionGuard::acquire(&self.active, self.config.max_connections) else {
            warn!("Refusing connection from {}: limit of {} reached", peer, self.config.max_connections);
            let _ = writeln!(stream, "{}too many connections", ERROR_PREFIX);
            return;
        };

        let session = self.database.session(self.config.flush_after_each_statement);
        let spawned = thread::Builder::new()
            .name(format!("pql-conn-{}", peer))
            .spawn(move || {
                let _guard = guard;
                info!("Connection opened: {}", peer);
                if let Err(e) = serve_stream(stream, session) {
                    error!("Connection {} failed: {}", peer, e);
                }
                info!("Connection closed: {}", peer);
            });

        if let Err(e) = spawned {
            error!("Failed to spawn connection worker: {}", e);
        }
    }
}

fn serve_stream(stream: TcpStream, session: Session) -> io::Result<()> {
    let reader = BufReader::new(stream.try_clone()?);
    handle_connection(reader, stream, session)
}

/// Serve one connection: read statement lines until `quit` or end of input
/// and write the response to each.
pub fn handle_connection<R: BufRead, W: Write>(reader: R, mut writer: W, mut session: Session) -> io::Result<()> {
    for line in reader.lines() {
        let line = line?;
        let statement = line.trim();
        if statement.eq_ignore_ascii_case(QUIT_COMMAND) {
            break;
        }

        for response in session.execute_line(statement) {
            writeln!(writer, "{}", response)?;
        }
        writer.flush()?;
    }
    Ok(())
}
