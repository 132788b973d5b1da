use pirate_maze_core::{
    ActorType, Command, CommandKind, Connections, Coordinate, Direction, Event, FieldEffect,
    FieldType, LOST_SCORE,
};
use pirate_maze_world::{self as world, query, Layout, Tile, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Fully connected grid with a harbor start at the origin and the exit at
/// the far corner.
fn open_layout(width: u32, height: u32) -> Layout {
    let mut tiles = Vec::new();
    for y in 0..height {
        for x in 0..width {
            let connections = Connections::new(y > 0, x + 1 < width, y + 1 < height, x > 0);
            tiles.push(Tile::new(connections, FieldType::Normal));
        }
    }
    let mut layout = Layout {
        width,
        height,
        tiles,
        start: Coordinate::new(0, 0),
        exit: Coordinate::new(
            i32::try_from(width - 1).expect("width fits"),
            i32::try_from(height - 1).expect("height fits"),
        ),
        pirates: Vec::new(),
    };
    edit(&mut layout, Coordinate::new(0, 0), |tile| {
        Tile::new(tile.connections(), FieldType::Harbor)
    });
    let exit = layout.exit;
    edit(&mut layout, exit, |tile| {
        Tile::new(tile.connections(), FieldType::Exit)
    });
    layout
}

fn edit(layout: &mut Layout, position: Coordinate, change: impl FnOnce(&Tile) -> Tile) {
    let index = usize::try_from(position.y()).expect("row") * layout.width as usize
        + usize::try_from(position.x()).expect("column");
    let updated = change(&layout.tiles[index]);
    layout.tiles[index] = updated;
}

struct Session {
    world: World,
    rng: ChaCha8Rng,
}

impl Session {
    fn new(layout: Layout, actor: ActorType) -> Self {
        let mut session = Self {
            world: World::new(layout),
            rng: ChaCha8Rng::seed_from_u64(7),
        };
        let events = session.run(Command::Register {
            name: "Anne".to_owned(),
            actor,
        });
        assert!(
            matches!(events.first(), Some(Event::GameStarted { .. })),
            "registration must succeed: {events:?}"
        );
        session
    }

    fn run(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        let _ = world::apply(&mut self.world, command, &mut self.rng, 3, &mut events);
        events
    }

    fn ship(&self) -> query::ShipSnapshot {
        query::ship(&self.world).expect("ship registered")
    }
}

fn failed(command: CommandKind) -> Event {
    Event::CommandFailed { command }
}

fn go(direction: Direction) -> Command {
    Command::Move { direction }
}

#[test]
fn registration_announces_start_and_vision() {
    let mut layout = open_layout(5, 5);
    edit(&mut layout, Coordinate::new(3, 3), |tile| tile.clone().with_treasure(4));
    layout.pirates.push(Coordinate::new(4, 1));

    let mut world = World::new(layout);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut events = Vec::new();
    let cost = world::apply(
        &mut world,
        Command::Register {
            name: "Anne".to_owned(),
            actor: ActorType::Barque,
        },
        &mut rng,
        3,
        &mut events,
    );

    assert_eq!(cost, 1);
    assert_eq!(
        events[0],
        Event::GameStarted {
            start: Coordinate::new(0, 0),
            max_cycles: 50,
            treasures: 1,
            pirates: 1,
            harbors: 1,
        }
    );
    let updated: Vec<Coordinate> = events[1..]
        .iter()
        .map(|event| match event {
            Event::MapUpdate { position, .. } => *position,
            other => panic!("unexpected event {other:?}"),
        })
        .collect();
    assert_eq!(
        updated,
        vec![
            Coordinate::new(0, 0),
            Coordinate::new(1, 0),
            Coordinate::new(2, 0),
            Coordinate::new(0, 1),
            Coordinate::new(1, 1),
            Coordinate::new(0, 2),
        ]
    );
    assert_eq!(query::cycle(&world), 1, "registration starts the first cycle");
    assert!(query::is_started(&world));
}

#[test]
fn second_registration_fails() {
    let mut session = Session::new(open_layout(3, 3), ActorType::Barque);
    let events = session.run(Command::Register {
        name: "Bonny".to_owned(),
        actor: ActorType::Cutter,
    });
    assert_eq!(events, vec![failed(CommandKind::Register)]);
    assert_eq!(session.ship().name, "Anne");
}

#[test]
fn commands_before_registration_abort() {
    let mut world = World::new(open_layout(3, 3));
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut events = Vec::new();
    let cost = world::apply(&mut world, go(Direction::East), &mut rng, 3, &mut events);

    assert_eq!(events, vec![Event::RegistrationAborted]);
    assert_eq!(cost, 0);
    assert!(!query::is_started(&world));
}

#[test]
fn invalid_moves_hurt_and_can_sink_the_ship() {
    let mut session = Session::new(open_layout(3, 3), ActorType::Barque);

    let events = session.run(go(Direction::North));
    assert_eq!(
        events,
        vec![failed(CommandKind::Move), Event::Damaged { amount: 2 }]
    );
    assert_eq!(session.ship().health, 1);

    let events = session.run(go(Direction::West));
    assert_eq!(
        events,
        vec![
            failed(CommandKind::Move),
            Event::Damaged { amount: 2 },
            Event::GameEnd { score: LOST_SCORE },
        ]
    );
    assert_eq!(session.ship().health, 0, "health saturates at zero");
}

#[test]
fn staying_here_is_always_legal() {
    let mut session = Session::new(open_layout(3, 3), ActorType::Cutter);
    let events = session.run(go(Direction::Here));
    assert_eq!(
        events.first(),
        Some(&Event::Moved {
            position: Coordinate::new(0, 0)
        })
    );
    assert_eq!(session.ship().health, 1);
}

#[test]
fn storm_sets_penalty_and_clears_the_tile() {
    let mut layout = open_layout(4, 3);
    edit(&mut layout, Coordinate::new(1, 0), |tile| {
        tile.clone().with_effect(FieldEffect::Storm)
    });
    let mut session = Session::new(layout, ActorType::Barque);

    let events = session.run(go(Direction::East));
    let tail = &events[events.len() - 2..];
    assert_eq!(tail[0], Event::StormEffect);
    let Event::MapUpdate { position, tile } = &tail[1] else {
        panic!("expected a map update, got {:?}", tail[1]);
    };
    assert_eq!(*position, Coordinate::new(1, 0));
    assert_eq!(tile.effect, FieldEffect::None, "the storm is spent");
    assert_eq!(session.ship().storm_penalty, 2);
}

#[test]
fn swirl_chain_resolves_a_storm_and_stops() {
    let mut layout = open_layout(5, 3);
    // One-way swirl so the random draw has a single candidate.
    edit(&mut layout, Coordinate::new(1, 0), |_| {
        Tile::new(Connections::new(false, true, false, false), FieldType::Normal)
            .with_effect(FieldEffect::Swirl)
    });
    edit(&mut layout, Coordinate::new(2, 0), |_| {
        Tile::new(Connections::new(false, true, false, false), FieldType::Normal)
            .with_effect(FieldEffect::Swirl)
    });
    edit(&mut layout, Coordinate::new(3, 0), |tile| {
        tile.clone().with_effect(FieldEffect::Storm)
    });
    let mut session = Session::new(layout, ActorType::Barque);

    let events = session.run(go(Direction::East));

    let swirls: Vec<&Event> = events
        .iter()
        .filter(|event| matches!(event, Event::SwirlEffect { .. }))
        .collect();
    assert_eq!(
        swirls,
        vec![
            &Event::SwirlEffect {
                position: Coordinate::new(2, 0)
            },
            &Event::SwirlEffect {
                position: Coordinate::new(3, 0)
            },
        ]
    );
    let damage = events
        .iter()
        .filter(|event| matches!(event, Event::Damaged { amount: 1 }))
        .count();
    assert_eq!(damage, 2, "one damage per hop");
    assert_eq!(
        events
            .iter()
            .filter(|event| **event == Event::StormEffect)
            .count(),
        1
    );

    let ship = session.ship();
    assert_eq!(ship.position, Coordinate::new(3, 0));
    assert_eq!(ship.health, 1);
    assert_eq!(ship.storm_penalty, 2);
    for x in 1..=3 {
        let tile = query::tile(&session.world, Coordinate::new(x, 0)).expect("tile");
        assert_eq!(tile.effect, FieldEffect::None, "hazard at x={x} consumed");
    }
}

#[test]
fn swirl_sinking_the_ship_ends_the_move_early() {
    let mut layout = open_layout(5, 3);
    edit(&mut layout, Coordinate::new(1, 0), |_| {
        Tile::new(Connections::new(false, true, false, false), FieldType::Normal)
            .with_effect(FieldEffect::Swirl)
    });
    edit(&mut layout, Coordinate::new(2, 0), |tile| {
        tile.clone().with_effect(FieldEffect::Swirl)
    });
    let mut session = Session::new(layout, ActorType::Cutter);

    let events = session.run(go(Direction::East));

    assert_eq!(
        events.last(),
        Some(&Event::GameEnd { score: LOST_SCORE })
    );
    let swirl_index = events
        .iter()
        .position(|event| matches!(event, Event::SwirlEffect { .. }))
        .expect("swirl fired");
    assert_eq!(events[swirl_index + 1], Event::Damaged { amount: 1 });
    assert_eq!(
        query::tile(&session.world, Coordinate::new(2, 0))
            .expect("tile")
            .effect,
        FieldEffect::Swirl,
        "the loop stops before resolving the second swirl"
    );
}

#[test]
fn barque_fire_cycle() {
    let mut layout = open_layout(4, 3);
    layout.pirates.push(Coordinate::new(1, 0));
    let mut session = Session::new(layout, ActorType::Barque);

    let events = session.run(Command::Fire {
        direction: Direction::East,
    });
    assert_eq!(events, vec![Event::Hit]);

    let events = session.run(Command::Fire {
        direction: Direction::East,
    });
    assert_eq!(
        events,
        vec![failed(CommandKind::Fire), Event::Damaged { amount: 2 }],
        "firing an empty barque cannon backfires"
    );

    assert_eq!(session.run(Command::Reload), vec![Event::Reloaded]);
    let events = session.run(Command::Fire {
        direction: Direction::East,
    });
    assert_eq!(events[0], Event::Hit);
    assert!(matches!(
        events[1],
        Event::MapUpdate { position, tile } if position == Coordinate::new(1, 0) && !tile.pirate
    ));

    let pirates = query::pirate_view(&session.world).into_vec();
    assert!(!pirates[0].alive);
    assert_eq!(session.ship().ammunition, 4);
}

#[test]
fn backfire_can_sink_a_damaged_barque() {
    let mut session = Session::new(open_layout(3, 3), ActorType::Barque);
    let fire = Command::Fire {
        direction: Direction::East,
    };

    let _ = session.run(Command::Fire {
        direction: Direction::North,
    });
    let _ = session.run(go(Direction::North));
    assert_eq!(session.ship().health, 1);
    assert!(!session.ship().loaded);

    let events = session.run(fire.clone());
    assert_eq!(
        events,
        vec![
            failed(CommandKind::Fire),
            Event::Damaged { amount: 2 },
            Event::GameEnd { score: LOST_SCORE },
        ],
        "a backfire that sinks the ship ends the game"
    );
    assert_eq!(session.ship().health, 0);

    let mut events = Vec::new();
    let cost = world::apply(&mut session.world, fire, &mut session.rng, 3, &mut events);
    assert_eq!(cost, 0);
    assert!(events.is_empty(), "a sunk ship ignores further commands");
    assert!(session.run(go(Direction::East)).is_empty());
}

#[test]
fn shots_without_a_line_of_fire_miss() {
    let mut layout = open_layout(4, 3);
    layout.pirates.push(Coordinate::new(1, 0));
    let mut session = Session::new(layout, ActorType::Barque);

    let events = session.run(Command::Fire {
        direction: Direction::North,
    });
    assert_eq!(events, vec![failed(CommandKind::Fire)]);
    assert!(!session.ship().loaded, "a missed shot still spends the round");
}

#[test]
fn cutter_fire_fails_silently() {
    let mut session = Session::new(open_layout(3, 3), ActorType::Cutter);
    let events = session.run(Command::Fire {
        direction: Direction::East,
    });
    assert_eq!(events, vec![failed(CommandKind::Fire)]);
    assert_eq!(session.ship().health, 1);
    assert_eq!(session.run(Command::Reload), vec![failed(CommandKind::Reload)]);
}

#[test]
fn reloading_a_loaded_cannon_wastes_a_round() {
    let mut session = Session::new(open_layout(3, 3), ActorType::Barque);
    assert_eq!(session.run(Command::Reload), vec![failed(CommandKind::Reload)]);
    assert_eq!(session.ship().ammunition, 4);
    assert!(session.ship().loaded);
}

#[test]
fn treasure_slots_stay_stable_across_drops() {
    let mut layout = open_layout(4, 3);
    edit(&mut layout, Coordinate::new(0, 0), |tile| tile.clone().with_treasure(2));
    edit(&mut layout, Coordinate::new(1, 0), |tile| tile.clone().with_treasure(7));
    edit(&mut layout, Coordinate::new(2, 0), |tile| tile.clone().with_treasure(4));
    let mut session = Session::new(layout, ActorType::Barque);

    let events = session.run(Command::PickUp);
    assert_eq!(events[0], Event::PickedUp { value: 2 });
    assert!(matches!(
        events[1],
        Event::MapUpdate { tile, .. } if tile.treasure.is_none()
    ));
    assert_eq!(session.run(Command::PickUp), vec![failed(CommandKind::PickUp)]);

    let _ = session.run(go(Direction::East));
    let _ = session.run(Command::PickUp);
    let _ = session.run(go(Direction::East));
    let _ = session.run(Command::PickUp);
    assert_eq!(session.ship().cargo, Some(vec![Some(2), Some(7), Some(4)]));

    let events = session.run(Command::Drop { slot: 1 });
    assert_eq!(events[0], Event::Dropped { value: 7 });
    let Event::MapUpdate { position, tile } = &events[1] else {
        panic!("expected a map update, got {:?}", events[1]);
    };
    assert_eq!(*position, Coordinate::new(2, 0));
    assert_eq!(tile.treasure, Some(7));
    assert_eq!(session.ship().cargo, Some(vec![Some(2), None, Some(4)]));

    let events = session.run(Command::Drop { slot: 2 });
    assert_eq!(
        events,
        vec![Event::Dropped { value: 4 }],
        "an occupied tile swallows the dropped treasure"
    );
    assert_eq!(session.ship().cargo, Some(vec![Some(2), None, None]));

    assert_eq!(
        session.run(Command::Drop { slot: 1 }),
        vec![failed(CommandKind::Drop)]
    );
    assert_eq!(
        session.run(Command::Drop { slot: 5 }),
        vec![failed(CommandKind::Drop)]
    );
}

#[test]
fn selling_at_a_harbor_triples_the_value() {
    let mut layout = open_layout(5, 3);
    edit(&mut layout, Coordinate::new(0, 0), |tile| tile.clone().with_treasure(4));
    edit(&mut layout, Coordinate::new(1, 0), |tile| tile.clone().with_treasure(5));
    let mut session = Session::new(layout, ActorType::Barque);

    let _ = session.run(Command::PickUp);
    assert_eq!(session.run(Command::Sell), vec![Event::Sold { gold: 12 }]);

    let _ = session.run(go(Direction::East));
    let _ = session.run(Command::PickUp);
    let _ = session.run(go(Direction::West));
    assert_eq!(session.run(Command::Sell), vec![Event::Sold { gold: 27 }]);
    assert_eq!(session.ship().gold, Some(27));
    assert_eq!(session.ship().cargo, Some(vec![None, None, None]));

    assert_eq!(session.run(Command::Sell), vec![failed(CommandKind::Sell)]);
}

#[test]
fn selling_at_sea_forfeits_the_cargo() {
    let mut layout = open_layout(4, 3);
    edit(&mut layout, Coordinate::new(1, 0), |tile| tile.clone().with_treasure(6));
    let mut session = Session::new(layout, ActorType::Barque);

    let _ = session.run(go(Direction::East));
    let _ = session.run(Command::PickUp);
    assert_eq!(session.run(Command::Sell), vec![failed(CommandKind::Sell)]);
    assert_eq!(session.ship().cargo, Some(vec![None, None, None]));
    assert_eq!(session.ship().gold, Some(0));
}

#[test]
fn repairs_cost_less_in_harbor() {
    let mut layout = open_layout(4, 3);
    edit(&mut layout, Coordinate::new(0, 0), |tile| tile.clone().with_treasure(4));
    let mut session = Session::new(layout, ActorType::Barque);
    let _ = session.run(Command::PickUp);
    let _ = session.run(Command::Sell);
    let _ = session.run(go(Direction::North));

    assert_eq!(session.run(Command::Repair), vec![Event::Repaired { cost: 5 }]);
    let ship = session.ship();
    assert_eq!(ship.health, 3);
    assert_eq!(ship.gold, Some(7));

    let _ = session.run(go(Direction::East));
    let events = session.run(Command::Repair);
    assert_eq!(
        events,
        vec![failed(CommandKind::Repair), Event::Damaged { amount: 1 }],
        "seven gold does not pay for a repair at sea"
    );
}

#[test]
fn cutters_cannot_afford_repairs() {
    let mut session = Session::new(open_layout(3, 3), ActorType::Cutter);
    assert_eq!(
        session.run(Command::Repair),
        vec![
            failed(CommandKind::Repair),
            Event::Damaged { amount: 1 },
            Event::GameEnd { score: LOST_SCORE },
        ]
    );
}

#[test]
fn restock_rules() {
    let mut layout = open_layout(4, 3);
    edit(&mut layout, Coordinate::new(0, 0), |tile| tile.clone().with_treasure(4));
    let mut session = Session::new(layout, ActorType::Barque);
    let _ = session.run(Command::PickUp);
    let _ = session.run(Command::Sell);
    let _ = session.run(Command::Reload);

    assert_eq!(
        session.run(Command::Restock { amount: 0 }),
        vec![Event::Restocked { amount: 0 }]
    );

    assert_eq!(
        session.run(Command::Restock { amount: 3 }),
        vec![Event::Restocked { amount: 1 }],
        "only one round fits, the rest is paid for anyway"
    );
    assert_eq!(session.ship().gold, Some(6));
    assert_eq!(session.ship().ammunition, 5);

    assert_eq!(
        session.run(Command::Restock { amount: -1 }),
        vec![failed(CommandKind::Restock)]
    );
    assert_eq!(session.ship().ammunition, 0);

    assert_eq!(
        session.run(Command::Restock { amount: 4 }),
        vec![failed(CommandKind::Restock)],
        "eight gold needed, six held"
    );
    assert_eq!(session.ship().gold, Some(0));
}

#[test]
fn oversized_restock_confiscates_gold() {
    let mut layout = open_layout(4, 3);
    edit(&mut layout, Coordinate::new(0, 0), |tile| tile.clone().with_treasure(9));
    let mut session = Session::new(layout, ActorType::Barque);
    let _ = session.run(Command::PickUp);
    let _ = session.run(Command::Sell);
    let _ = session.run(Command::Reload);

    assert_eq!(
        session.run(Command::Restock {
            amount: 1_000_000_000
        }),
        vec![failed(CommandKind::Restock)]
    );
    let ship = session.ship();
    assert_eq!(ship.gold, Some(0));
    assert_eq!(ship.ammunition, 4, "no ammunition is added");
}

#[test]
fn restocking_at_sea_fails() {
    let mut session = Session::new(open_layout(4, 3), ActorType::Barque);
    let _ = session.run(go(Direction::East));
    assert_eq!(
        session.run(Command::Restock { amount: 0 }),
        vec![failed(CommandKind::Restock)]
    );
}

#[test]
fn leaving_away_from_the_exit_burns_the_cycle_budget() {
    let mut session = Session::new(open_layout(5, 3), ActorType::Barque);
    assert_eq!(query::max_cycles(&session.world), 30);

    for attempt in 1..10 {
        assert_eq!(
            session.run(Command::Leave),
            vec![failed(CommandKind::Leave)],
            "attempt {attempt} keeps the game alive"
        );
    }
    assert_eq!(query::max_cycles(&session.world), 3);

    assert_eq!(
        session.run(Command::Leave),
        vec![
            failed(CommandKind::Leave),
            Event::GameEnd { score: LOST_SCORE },
        ]
    );
    assert_eq!(query::max_cycles(&session.world), 0);
}

#[test]
fn leaving_through_the_exit_reports_the_score() {
    let mut layout = open_layout(3, 3);
    layout.exit = Coordinate::new(1, 0);
    edit(&mut layout, Coordinate::new(2, 2), |tile| {
        Tile::new(tile.connections(), FieldType::Normal)
    });
    edit(&mut layout, Coordinate::new(1, 0), |tile| {
        Tile::new(tile.connections(), FieldType::Exit).with_treasure(3)
    });
    let mut session = Session::new(layout, ActorType::Barque);

    let _ = session.run(go(Direction::East));
    let _ = session.run(Command::PickUp);
    // 18 cycles budget, cycle 1: floor(17 / 10) + 9 for the held treasure.
    assert_eq!(session.run(Command::Leave), vec![Event::GameEnd { score: 10 }]);
}

#[test]
fn end_turn_consumes_the_remaining_budget() {
    let mut session = Session::new(open_layout(3, 3), ActorType::Barque);
    let mut events = Vec::new();
    let cost = world::apply(
        &mut session.world,
        Command::EndTurn,
        &mut session.rng,
        2,
        &mut events,
    );
    assert_eq!(cost, 2);
    assert!(events.is_empty(), "ending the turn is silent");
}

#[test]
fn sailing_into_a_pirate_gets_the_ship_robbed() {
    let mut layout = open_layout(4, 3);
    edit(&mut layout, Coordinate::new(0, 0), |tile| tile.clone().with_treasure(5));
    layout.pirates.push(Coordinate::new(1, 0));
    let mut session = Session::new(layout, ActorType::Barque);
    let _ = session.run(Command::PickUp);

    let events = session.run(go(Direction::East));
    let tail = &events[events.len() - 2..];
    assert_eq!(tail, [Event::Robbed, Event::Damaged { amount: 1 }]);
    assert_eq!(session.ship().cargo, Some(vec![None, None, None]));
    assert_eq!(session.ship().health, 2);
}

#[test]
fn robbery_is_skipped_once_the_game_ended() {
    let mut layout = open_layout(4, 3);
    layout.pirates.push(Coordinate::new(1, 0));
    let mut session = Session::new(layout, ActorType::Cutter);

    let events = session.run(go(Direction::East));
    let tail = &events[events.len() - 3..];
    assert_eq!(
        tail,
        [
            Event::Robbed,
            Event::Damaged { amount: 1 },
            Event::GameEnd { score: LOST_SCORE },
        ]
    );

    let events = session.run(go(Direction::North));
    assert_eq!(
        events,
        vec![
            failed(CommandKind::Move),
            Event::Damaged { amount: 2 },
            Event::GameEnd { score: LOST_SCORE },
        ],
        "a handler that ended the game is not followed by a robbery"
    );
}
