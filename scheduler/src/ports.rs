//! Boundaries between the scheduler and whatever carries the player's traffic.

use std::io;

use pirate_maze_core::{Command, Event};
use thiserror::Error;

/// Supplies player commands, blocking until one arrives.
pub trait CommandSource {
    /// Waits for the next command from the registered player.
    fn next_command(&mut self) -> Result<Command, ReceiveError>;
}

/// Receives the events produced for the player.
pub trait EventSink {
    /// Delivers a single event to the player.
    fn deliver(&mut self, event: &Event) -> io::Result<()>;

    /// Releases the connection once the session ended.
    fn close(&mut self);
}

/// Reasons a command could not be received.
#[derive(Debug, Error)]
pub enum ReceiveError {
    /// No command arrived within the configured timeout.
    #[error("timed out waiting for a command")]
    TimedOut,
    /// The player went away.
    #[error("client disconnected")]
    Disconnected,
    /// The underlying transport failed.
    #[error("transport failure while receiving")]
    Transport(#[from] io::Error),
}

/// Fatal failures that abort a session.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Reading from the command source failed.
    #[error("failed to receive a command")]
    Receive(#[source] io::Error),
    /// Writing to the event sink failed.
    #[error("failed to deliver {event}")]
    Deliver {
        /// Name of the event that could not be delivered.
        event: &'static str,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}
