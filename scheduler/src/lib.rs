#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn scheduler that drives a single pirate maze session.
//!
//! The scheduler owns the world, the hostile systems and the random stream.
//! It waits for the player's registration, then runs cycles until the game
//! ends, forwarding every event through a pipeline that stops at the first
//! terminal event.

mod pipeline;
mod ports;

use pirate_maze_core::{Directive, Event, LOST_SCORE};
use pirate_maze_system_hazards::{Config as HazardsConfig, Hazards, DEFAULT_INTERVAL};
use pirate_maze_system_pirates::Pirates;
use pirate_maze_world::{self as world, query, Layout, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use pipeline::{Flow, Pipeline};
pub use ports::{CommandSource, EventSink, ReceiveError, SchedulerError};

/// Action budget granted to the registration command.
const REGISTRATION_BUDGET: i32 = 3;

/// Configuration parameters required to construct the scheduler.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    seed: u64,
    hazards: HazardsConfig,
}

impl Config {
    /// Creates a configuration whose random stream starts from `seed`.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            seed,
            hazards: HazardsConfig::new(DEFAULT_INTERVAL),
        }
    }

    /// Overrides the number of cycles between hazard waves.
    #[must_use]
    pub const fn with_hazard_interval(mut self, interval: u32) -> Self {
        self.hazards = HazardsConfig::new(interval);
        self
    }

    /// Seed of the session's random stream.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

/// Why a session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndReason {
    /// No registration arrived before the client timed out or disconnected.
    NoRegistration,
    /// The first command was not a registration.
    RegistrationAborted,
    /// The player stopped answering during the game.
    ClientLost,
    /// A game-ending event was delivered.
    GameOver,
    /// Every cycle of the budget was played.
    CyclesExhausted,
}

/// Summary of a finished session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionReport {
    /// Why the session ended.
    pub reason: EndReason,
    /// Score carried by the delivered game end, if any.
    pub score: Option<i32>,
    /// Cycle counter when the session ended.
    pub cycles: u32,
    /// Number of events delivered to the player.
    pub events_delivered: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    AwaitingRegistration,
    Running,
    Ended(EndReason),
}

/// Owns a session's state and advances it one command at a time.
#[derive(Debug)]
pub struct Scheduler {
    world: World,
    pirates: Pirates,
    hazards: Hazards,
    rng: ChaCha8Rng,
}

impl Scheduler {
    /// Creates a scheduler for a fresh world built from `layout`.
    #[must_use]
    pub fn new(config: Config, layout: Layout) -> Self {
        Self {
            world: World::new(layout),
            pirates: Pirates::default(),
            hazards: Hazards::new(config.hazards),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
        }
    }

    /// Plays the session to its end and closes the sink exactly once.
    pub fn run<C, S>(
        mut self,
        source: &mut C,
        sink: &mut S,
    ) -> Result<SessionReport, SchedulerError>
    where
        C: CommandSource,
        S: EventSink,
    {
        let mut pipeline = Pipeline::new(sink);
        let outcome = self.drive(source, &mut pipeline);
        pipeline.close();
        let reason = outcome?;

        let report = SessionReport {
            reason,
            score: pipeline.final_score(),
            cycles: query::cycle(&self.world),
            events_delivered: pipeline.delivered(),
        };
        log::info!(
            "session ended ({:?}) after {} cycles with score {:?}",
            report.reason,
            report.cycles,
            report.score
        );
        Ok(report)
    }

    fn drive<C, S>(
        &mut self,
        source: &mut C,
        pipeline: &mut Pipeline<'_, S>,
    ) -> Result<EndReason, SchedulerError>
    where
        C: CommandSource,
        S: EventSink,
    {
        let mut phase = Phase::AwaitingRegistration;
        loop {
            phase = match phase {
                Phase::AwaitingRegistration => self.await_registration(source, pipeline)?,
                Phase::Running => self.play(source, pipeline)?,
                Phase::Ended(reason) => return Ok(reason),
            };
        }
    }

    fn await_registration<C, S>(
        &mut self,
        source: &mut C,
        pipeline: &mut Pipeline<'_, S>,
    ) -> Result<Phase, SchedulerError>
    where
        C: CommandSource,
        S: EventSink,
    {
        let command = match source.next_command() {
            Ok(command) => command,
            Err(ReceiveError::TimedOut | ReceiveError::Disconnected) => {
                log::info!("no registration received");
                return Ok(Phase::Ended(EndReason::NoRegistration));
            }
            Err(ReceiveError::Transport(error)) => return Err(SchedulerError::Receive(error)),
        };

        log::debug!("registration attempt: {}", command.kind());
        let mut events = Vec::new();
        let _ = world::apply(
            &mut self.world,
            command,
            &mut self.rng,
            REGISTRATION_BUDGET,
            &mut events,
        );

        match pipeline.forward(&events)? {
            Flow::Continue if query::is_started(&self.world) => {
                log::info!("game started");
                Ok(Phase::Running)
            }
            _ => Ok(Phase::Ended(EndReason::RegistrationAborted)),
        }
    }

    fn play<C, S>(
        &mut self,
        source: &mut C,
        pipeline: &mut Pipeline<'_, S>,
    ) -> Result<Phase, SchedulerError>
    where
        C: CommandSource,
        S: EventSink,
    {
        const GAME_OVER: Phase = Phase::Ended(EndReason::GameOver);

        let mut budget = query::max_cycles(&self.world);
        while query::cycle(&self.world) <= budget {
            let cycle = query::cycle(&self.world);
            log::debug!("cycle {cycle} of {budget}");
            let cycles_left = budget.saturating_sub(cycle).saturating_add(1);
            if pipeline.forward(&[Event::NextCycle { cycles_left }])? == Flow::Terminate {
                return Ok(GAME_OVER);
            }

            let health = query::ship(&self.world).map_or(0, |ship| ship.health);
            let available = i32::try_from(health).unwrap_or(i32::MAX);
            let mut actions = world::draw_action_budget(&mut self.world, available);
            while actions > 0 {
                if pipeline.forward(&[Event::ActNow {
                    actions_left: actions,
                }])? == Flow::Terminate
                {
                    return Ok(GAME_OVER);
                }

                let command = match source.next_command() {
                    Ok(command) => command,
                    Err(ReceiveError::TimedOut | ReceiveError::Disconnected) => {
                        log::info!("player stopped answering in cycle {cycle}");
                        pipeline.forfeit();
                        return Ok(Phase::Ended(EndReason::ClientLost));
                    }
                    Err(ReceiveError::Transport(error)) => {
                        return Err(SchedulerError::Receive(error))
                    }
                };

                log::debug!("{} with {actions} actions left", command.kind());
                let mut events = Vec::new();
                let cost =
                    world::apply(&mut self.world, command, &mut self.rng, actions, &mut events);
                if pipeline.forward(&events)? == Flow::Terminate {
                    return Ok(GAME_OVER);
                }
                let remaining = actions.saturating_sub(cost);
                actions = world::draw_action_budget(&mut self.world, remaining);
            }

            if self.run_pirates(pipeline)? == Flow::Terminate {
                return Ok(GAME_OVER);
            }
            self.run_hazards(cycle);
            world::advance_cycle(&mut self.world);
            budget = query::max_cycles(&self.world);
        }

        log::info!("cycle budget exhausted after {budget} cycles");
        let _ = pipeline.forward(&[Event::GameEnd { score: LOST_SCORE }])?;
        Ok(Phase::Ended(EndReason::CyclesExhausted))
    }

    fn run_pirates<S: EventSink>(
        &mut self,
        pipeline: &mut Pipeline<'_, S>,
    ) -> Result<Flow, SchedulerError> {
        let Some(ship) = query::ship(&self.world).map(|ship| ship.position) else {
            return Ok(Flow::Continue);
        };

        let mut directives = Vec::new();
        self.pirates.handle(
            &query::pirate_view(&self.world),
            query::tile_view(&self.world),
            ship,
            &mut self.rng,
            &mut directives,
        );
        log::debug!("pirates planned {} moves", directives.len());

        for directive in directives {
            if self.enact(directive, pipeline)? == Flow::Terminate {
                return Ok(Flow::Terminate);
            }
        }
        Ok(Flow::Continue)
    }

    fn run_hazards(&mut self, cycle: u32) {
        let visible = query::visible_coordinates(&self.world);
        let mut directives = Vec::new();
        self.hazards.handle(
            cycle,
            query::tile_view(&self.world),
            &visible,
            &mut self.rng,
            &mut directives,
        );

        for directive in directives {
            let mut events = Vec::new();
            world::enact(&mut self.world, directive, &mut events);
            debug_assert!(events.is_empty(), "hazards form silently");
        }
    }

    fn enact<S: EventSink>(
        &mut self,
        directive: Directive,
        pipeline: &mut Pipeline<'_, S>,
    ) -> Result<Flow, SchedulerError> {
        let mut events = Vec::new();
        world::enact(&mut self.world, directive, &mut events);
        pipeline.forward(&events)
    }
}
