#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! TCP transport that carries one player's session as newline-delimited JSON.
//!
//! The server accepts a single client whose socket is split into an [`Inbox`]
//! of commands and an [`Outbox`] of events. Inbound lines hold a client id and
//! a command; the first well-formed frame fixes the id and frames carrying any
//! other id are dropped. Outbound lines hold one event each.

mod wire;

use std::{
    io::{self, BufRead, BufReader, Write},
    net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs},
    time::Duration,
};

use pirate_maze_core::{Command, Event};
use pirate_maze_scheduler::{CommandSource, EventSink, ReceiveError};
use thiserror::Error;

use wire::{Inbound, Outbound};

/// Configuration parameters for the transport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Config {
    /// How long to wait for a command; `None` waits forever.
    pub timeout: Option<Duration>,
}

impl Config {
    /// Creates a configuration from a timeout in milliseconds, where 0 waits
    /// forever.
    #[must_use]
    pub const fn from_millis(timeout_ms: u64) -> Self {
        let timeout = if timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(timeout_ms))
        };
        Self { timeout }
    }
}

/// Failures while setting up the transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The listening socket could not be opened.
    #[error("failed to listen on {addr}")]
    Bind {
        /// Requested address.
        addr: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// Accepting the client failed.
    #[error("failed to accept a client")]
    Accept(#[source] io::Error),
    /// The accepted socket could not be configured.
    #[error("failed to configure the client socket")]
    Configure(#[source] io::Error),
}

/// Listening socket awaiting the player.
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    config: Config,
}

impl Server {
    /// Opens a listening socket on `addr`.
    pub fn bind<A>(addr: A, config: Config) -> Result<Self, TransportError>
    where
        A: ToSocketAddrs + std::fmt::Debug,
    {
        let listener = TcpListener::bind(&addr).map_err(|source| TransportError::Bind {
            addr: format!("{addr:?}"),
            source,
        })?;
        Ok(Self { listener, config })
    }

    /// Address the server is listening on.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Blocks until a client connects and splits the socket into its
    /// receiving and sending halves.
    pub fn accept(&self) -> Result<(Inbox, Outbox), TransportError> {
        let (stream, peer) = self.listener.accept().map_err(TransportError::Accept)?;
        log::info!("client connected from {peer}");
        stream
            .set_read_timeout(self.config.timeout)
            .map_err(TransportError::Configure)?;
        stream.set_nodelay(true).map_err(TransportError::Configure)?;
        let writer = stream.try_clone().map_err(TransportError::Configure)?;

        let inbox = Inbox {
            reader: BufReader::new(stream),
            peer,
            client: None,
            line: Vec::new(),
        };
        Ok((inbox, Outbox { writer, peer }))
    }
}

/// Receiving half of a client connection.
#[derive(Debug)]
pub struct Inbox {
    reader: BufReader<TcpStream>,
    peer: SocketAddr,
    client: Option<i64>,
    line: Vec<u8>,
}

impl Inbox {
    /// Address of the connected client.
    #[must_use]
    pub const fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Accepts `frame` if it belongs to this session's client.
    fn admit(&mut self, frame: Inbound) -> Option<Command> {
        match self.client {
            None => {
                log::debug!("session bound to client {}", frame.client);
                self.client = Some(frame.client);
                Some(frame.command)
            }
            Some(owner) if owner == frame.client => Some(frame.command),
            Some(owner) => {
                log::warn!(
                    "discarding frame from client {} in the session of client {owner}",
                    frame.client
                );
                None
            }
        }
    }
}

impl CommandSource for Inbox {
    fn next_command(&mut self) -> Result<Command, ReceiveError> {
        loop {
            self.line.clear();
            match self.reader.read_until(b'\n', &mut self.line) {
                Ok(0) => return Err(ReceiveError::Disconnected),
                Ok(_) => {}
                Err(error) => {
                    return Err(match error.kind() {
                        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => {
                            ReceiveError::TimedOut
                        }
                        io::ErrorKind::ConnectionReset
                        | io::ErrorKind::ConnectionAborted
                        | io::ErrorKind::UnexpectedEof => ReceiveError::Disconnected,
                        _ => ReceiveError::Transport(error),
                    })
                }
            }

            let text = match std::str::from_utf8(&self.line) {
                Ok(text) => text.trim(),
                Err(error) => {
                    log::warn!("skipping non-UTF-8 frame from {}: {error}", self.peer);
                    continue;
                }
            };
            if text.is_empty() {
                continue;
            }
            let frame = match serde_json::from_str::<Inbound>(text) {
                Ok(frame) => frame,
                Err(error) => {
                    log::warn!("skipping malformed frame from {}: {error}", self.peer);
                    continue;
                }
            };
            if let Some(command) = self.admit(frame) {
                log::trace!("<- {command:?}");
                return Ok(command);
            }
        }
    }
}

/// Sending half of a client connection.
#[derive(Debug)]
pub struct Outbox {
    writer: TcpStream,
    peer: SocketAddr,
}

impl EventSink for Outbox {
    fn deliver(&mut self, event: &Event) -> io::Result<()> {
        let mut frame = serde_json::to_vec(&Outbound::from(event))?;
        frame.push(b'\n');
        self.writer.write_all(&frame)?;
        self.writer.flush()
    }

    fn close(&mut self) {
        if let Err(error) = self.writer.shutdown(Shutdown::Both) {
            log::debug!("closing the connection to {} failed: {error}", self.peer);
        }
        log::info!("connection to {} closed", self.peer);
    }
}
