use pirate_maze_core::{Event, LOST_SCORE};

use crate::{EventSink, SchedulerError};

/// Whether the session keeps going after a batch of events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Terminate,
}

/// Forwards events to the sink in emission order and stops at the first
/// terminal one.
#[derive(Debug)]
pub(crate) struct Pipeline<'a, S: EventSink> {
    sink: &'a mut S,
    delivered: u64,
    final_score: Option<i32>,
}

impl<'a, S: EventSink> Pipeline<'a, S> {
    pub(crate) fn new(sink: &'a mut S) -> Self {
        Self {
            sink,
            delivered: 0,
            final_score: None,
        }
    }

    /// Delivers `events` until one of them ends the session.
    ///
    /// Events following a terminal event are dropped.
    pub(crate) fn forward(&mut self, events: &[Event]) -> Result<Flow, SchedulerError> {
        for event in events {
            log::trace!("-> {event:?}");
            self.sink
                .deliver(event)
                .map_err(|source| SchedulerError::Deliver {
                    event: event_name(event),
                    source,
                })?;
            self.delivered += 1;

            if event.should_terminate() {
                if let Event::GameEnd { score } = event {
                    self.final_score = Some(*score);
                }
                return Ok(Flow::Terminate);
            }
        }
        Ok(Flow::Continue)
    }

    /// Reports the loss to a player that stopped answering.
    ///
    /// The player is most likely gone, so a failed delivery is only logged.
    pub(crate) fn forfeit(&mut self) {
        if let Err(error) = self.forward(&[Event::GameEnd { score: LOST_SCORE }]) {
            log::warn!("could not report the forfeit: {error}");
        }
    }

    pub(crate) fn close(&mut self) {
        self.sink.close();
    }

    pub(crate) const fn delivered(&self) -> u64 {
        self.delivered
    }

    pub(crate) const fn final_score(&self) -> Option<i32> {
        self.final_score
    }
}

fn event_name(event: &Event) -> &'static str {
    match event {
        Event::RegistrationAborted => "registration abort",
        Event::GameStarted { .. } => "game start",
        Event::Moved { .. } => "move",
        Event::MapUpdate { .. } => "map update",
        Event::ActNow { .. } => "act prompt",
        Event::GameEnd { .. } => "game end",
        Event::NextCycle { .. } => "cycle notice",
        Event::Damaged { .. } => "damage",
        Event::Robbed => "robbery",
        Event::Repaired { .. } => "repair",
        Event::PickedUp { .. } => "pick up",
        Event::Hit => "hit",
        Event::Sold { .. } => "sale",
        Event::Dropped { .. } => "drop",
        Event::Reloaded => "reload",
        Event::Restocked { .. } => "restock",
        Event::SwirlEffect { .. } => "swirl",
        Event::StormEffect => "storm",
        Event::CommandFailed { .. } => "command failure",
    }
}
