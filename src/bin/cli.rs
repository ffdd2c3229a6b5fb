use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;

use pqlstore::server::config::DEFAULT_PORT;
use pqlstore::server::server::QUIT_COMMAND;
use pqlstore::server::session::OK_LINE;

const HISTORY_FILE: &str = ".pql_history";

#[derive(Parser)]
#[command(author, version, about = "PQL CLI - A tool for talking to a PQL server")]
struct Cli {
    /// Server host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Command to execute
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive shell
    Shell,

    /// Execute a single PQL statement
    Query {
        /// PQL statement to execute
        statement: String,
    },
}

/// Connection to a PQL server
struct Client {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl Client {
    fn connect(host: &str, port: u16) -> Result<Self> {
        let stream = TcpStream::connect((host, port)).with_context(|| format!("Failed to connect to {}:{}", host, port))?;
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Client { reader, writer: stream })
    }

    /// Send one statement and collect the response lines before OK
    fn send(&mut self, statement: &str) -> Result<Vec<String>> {
        writeln!(self.writer, "{}", statement)?;
        self.writer.flush()?;

        let mut lines = Vec::new();
        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                if lines.is_empty() {
                    bail!("Server closed the connection");
                }
                return Ok(lines);
            }
            let line = line.trim_end_matches(['\r', '\n']);
            if line == OK_LINE {
                return Ok(lines);
            }
            lines.push(line.to_string());
        }
    }

    fn quit(mut self) -> Result<()> {
        writeln!(self.writer, "{}", QUIT_COMMAND)?;
        self.writer.flush()?;
        Ok(())
    }
}

fn run_shell(client: &mut Client) -> Result<()> {
    println!("Welcome to the PQL CLI. Type 'help' for assistance or 'exit' to quit.");

    let mut rl = Editor::<(), DefaultHistory>::new()?;
    if let Err(err) = rl.load_history(HISTORY_FILE) {
        if !err.to_string().contains("No such file or directory") {
            println!("Error loading history: {}", err);
        }
    }

    loop {
        match rl.readline("pql> ") {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);

                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                match line.to_lowercase().as_str() {
                    "exit" | "quit" => {
                        println!("Goodbye!");
                        break;
                    }
                    "help" => print_help(),
                    _ => match client.send(line) {
                        Ok(response) => response.iter().for_each(|l| println!("{}", l)),
                        Err(err) => {
                            println!("Error: {}", err);
                            break;
                        }
                    },
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {}", err);
                break;
            }
        }
    }

    if let Err(err) = rl.save_history(HISTORY_FILE) {
        println!("Error saving history: {}", err);
    }
    Ok(())
}

fn print_help() {
    println!("Available statements:");
    println!("  KEYSPACE <name>                           - Create a keyspace");
    println!("  KILL <name>                               - Drop a keyspace");
    println!("  USE <name>                                - Select a keyspace");
    println!("  CREATE COLUMNFAMILY <name>                - Create a column family");
    println!("  DROP COLUMNFAMILY <name>                  - Drop a column family");
    println!("  INSERT INTO <cf>(KEY=<v>[,<col>=<v>]*)    - Insert or overwrite columns");
    println!("  UPDATE <cf> SET KEY=<v>[,<col>=<v>]*      - Update columns of a row");
    println!("  SELECT FROM <cf> WHERE KEY=<v>            - Show a row");
    println!("  DELETE FROM <cf> WHERE KEY=<v>            - Delete a row");
    println!();
    println!("Values are letters only, or double-quoted text.");
    println!();
    println!("Other commands:");
    println!("  help                                      - Display this help message");
    println!("  exit                                      - Exit the CLI");
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut client = Client::connect(&cli.host, cli.port)?;

    match cli.command {
        Some(Commands::Query { statement }) => {
            for line in client.send(&statement)? {
                println!("{}", line);
            }
        }
        Some(Commands::Shell) | None => run_shell(&mut client)?,
    }

    client.quit()
}
