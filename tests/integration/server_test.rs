use anyhow::Result;
use pqlstore::server::handle_connection;
use pqlstore::{Database, Server, ServerConfig};
use std::io::{BufRead, BufReader, Cursor, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[path = "../common/mod.rs"]
mod common;
use common::create_test_database;

struct TestClient {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl TestClient {
    fn connect(addr: SocketAddr) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_read_timeout(Some(Duration::from_secs(5)))?;
        Ok(TestClient {
            reader: BufReader::new(stream.try_clone()?),
            writer: stream,
        })
    }

    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        self.reader.read_line(&mut line)?;
        Ok(line.trim_end().to_string())
    }

    /// Send a statement and return the response lines up to and including OK
    fn send(&mut self, statement: &str) -> Result<Vec<String>> {
        writeln!(self.writer, "{}", statement)?;
        self.writer.flush()?;
        let mut lines = Vec::new();
        loop {
            let line = self.read_line()?;
            let done = line == "OK" || line.is_empty();
            lines.push(line);
            if done {
                return Ok(lines);
            }
        }
    }
}

fn start_server(db: &Database, max_connections: usize) -> Result<(Arc<Server>, SocketAddr)> {
    let config = ServerConfig {
        addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        data_dir: db.data_dir().to_path_buf(),
        max_connections,
        flush_after_each_statement: true,
    };
    let server = Arc::new(Server::bind(config, db.clone())?);
    let addr = server.local_addr()?;
    let serving = Arc::clone(&server);
    thread::spawn(move || serving.serve());
    Ok((server, addr))
}

fn wait_for_active(server: &Server, expected: usize) {
    for _ in 0..200 {
        if server.active_connections() == expected {
            return;
        }
        thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn test_session_over_tcp() -> Result<()> {
    let (db, _dir) = create_test_database()?;
    let (_server, addr) = start_server(&db, 10)?;
    let mut client = TestClient::connect(addr)?;

    assert_eq!(client.send("KEYSPACE Test")?, vec!["OK"]);
    assert_eq!(client.send("USE Test")?, vec!["OK"]);
    assert_eq!(client.send("CREATE COLUMNFAMILY Users")?, vec!["OK"]);
    assert_eq!(client.send("INSERT INTO Users(KEY=pepe,name=Piotr)")?, vec!["OK"]);
    assert_eq!(
        client.send("SELECT FROM Users WHERE KEY=pepe")?,
        vec![r#"{"pepe":{"name":"Piotr"}}"#, "OK"]
    );
    assert_eq!(client.send("DELETE FROM Users WHERE KEY=pepe")?, vec!["OK"]);

    let response = client.send("DELETE FROM Users WHERE KEY=pepe")?;
    assert_eq!(response.len(), 2);
    assert!(response[0].starts_with("ERROR: Data not found"));

    // The connection stays usable after an error
    let response = client.send("SELEKT")?;
    assert!(response[0].starts_with("ERROR: Parse error"));
    assert_eq!(client.send("SELECT FROM Users WHERE KEY=pepe")?, vec!["OK"]);

    // Mutations were flushed as they happened
    let reloaded = Database::open(db.data_dir())?;
    assert!(reloaded.registry().get_key_space("Test").is_some());
    Ok(())
}

#[test]
fn test_connections_have_separate_contexts() -> Result<()> {
    let (db, _dir) = create_test_database()?;
    let (_server, addr) = start_server(&db, 10)?;

    let mut first = TestClient::connect(addr)?;
    let mut second = TestClient::connect(addr)?;

    first.send("KEYSPACE A")?;
    first.send("KEYSPACE B")?;
    first.send("USE A")?;
    second.send("USE B")?;
    first.send("CREATE COLUMNFAMILY Items")?;
    second.send("CREATE COLUMNFAMILY Items")?;
    first.send("INSERT INTO Items(KEY=k,owner=first)")?;
    second.send("INSERT INTO Items(KEY=k,owner=second)")?;

    assert_eq!(
        first.send("SELECT FROM Items WHERE KEY=k")?[0],
        r#"{"k":{"owner":"first"}}"#
    );
    assert_eq!(
        second.send("SELECT FROM Items WHERE KEY=k")?[0],
        r#"{"k":{"owner":"second"}}"#
    );
    Ok(())
}

#[test]
fn test_connection_limit() -> Result<()> {
    let (db, _dir) = create_test_database()?;
    let (server, addr) = start_server(&db, 1)?;

    let mut first = TestClient::connect(addr)?;
    assert_eq!(first.send("KEYSPACE Test")?, vec!["OK"]);
    wait_for_active(&server, 1);

    let mut refused = TestClient::connect(addr)?;
    let line = refused.read_line()?;
    assert!(line.starts_with("ERROR:"), "{}", line);

    // Quitting frees the slot
    writeln!(first.writer, "quit")?;
    first.writer.flush()?;
    wait_for_active(&server, 0);

    let mut next = TestClient::connect(addr)?;
    assert_eq!(next.send("USE Test")?, vec!["OK"]);
    Ok(())
}

#[test]
fn test_handle_connection_without_socket() -> Result<()> {
    let (db, _dir) = create_test_database()?;
    let input = Cursor::new(
        "KEYSPACE Test\nUSE Test\nCREATE COLUMNFAMILY Users\nINSERT INTO Users(KEY=a,x=y)\nSELECT FROM Users WHERE KEY=a\n\nQUIT\n",
    );
    let mut output = Vec::new();
    handle_connection(input, &mut output, db.session(false))?;

    let text = String::from_utf8(output)?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[..5], ["OK", "OK", "OK", "OK", r#"{"a":{"x":"y"}}"#]);
    assert_eq!(lines[5], "OK");
    assert!(lines[6].starts_with("ERROR: Invalid arguments"));
    assert_eq!(lines[7], "OK");
    assert_eq!(lines.len(), 8);
    Ok(())
}
