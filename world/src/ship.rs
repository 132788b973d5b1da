//! Player vessel state.

use pirate_maze_core::{ActorType, Coordinate};

use crate::storage::{AmmunitionStore, TreasureStore};

const BARQUE_MAX_HEALTH: u32 = 3;
const CUTTER_MAX_HEALTH: u32 = 1;

/// Variant-specific equipment of a ship.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Vessel {
    Barque {
        gold: u32,
        loaded: bool,
        cargo: TreasureStore,
    },
    Cutter,
}

/// Ship piloted by the registered player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Ship {
    name: String,
    position: Coordinate,
    health: u32,
    storm_penalty: u32,
    ammunition: AmmunitionStore,
    vessel: Vessel,
}

impl Ship {
    /// Builds a fresh ship of the requested variant.
    pub(crate) fn new(name: String, actor: ActorType, position: Coordinate) -> Self {
        match actor {
            ActorType::Barque => Self {
                name,
                position,
                health: BARQUE_MAX_HEALTH,
                storm_penalty: 0,
                ammunition: AmmunitionStore::full(),
                vessel: Vessel::Barque {
                    gold: 0,
                    loaded: true,
                    cargo: TreasureStore::default(),
                },
            },
            ActorType::Cutter => Self {
                name,
                position,
                health: CUTTER_MAX_HEALTH,
                storm_penalty: 0,
                ammunition: AmmunitionStore::empty(),
                vessel: Vessel::Cutter,
            },
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) const fn actor(&self) -> ActorType {
        match self.vessel {
            Vessel::Barque { .. } => ActorType::Barque,
            Vessel::Cutter => ActorType::Cutter,
        }
    }

    pub(crate) const fn position(&self) -> Coordinate {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Coordinate) {
        self.position = position;
    }

    pub(crate) const fn health(&self) -> u32 {
        self.health
    }

    pub(crate) const fn max_health(&self) -> u32 {
        match self.vessel {
            Vessel::Barque { .. } => BARQUE_MAX_HEALTH,
            Vessel::Cutter => CUTTER_MAX_HEALTH,
        }
    }

    pub(crate) const fn is_sunk(&self) -> bool {
        self.health == 0
    }

    /// Removes hit points; health saturates at zero.
    pub(crate) fn take_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    pub(crate) fn repair(&mut self) {
        self.health = self.max_health();
    }

    pub(crate) const fn storm_penalty(&self) -> u32 {
        self.storm_penalty
    }

    pub(crate) fn set_storm_penalty(&mut self, penalty: u32) {
        self.storm_penalty = penalty;
    }

    /// Gold held by the ship; cutters carry none.
    pub(crate) const fn gold(&self) -> Option<u32> {
        match self.vessel {
            Vessel::Barque { gold, .. } => Some(gold),
            Vessel::Cutter => None,
        }
    }

    /// Overwrites the held gold. Ignored by cutters.
    pub(crate) fn set_gold(&mut self, amount: u32) {
        if let Vessel::Barque { gold, .. } = &mut self.vessel {
            *gold = amount;
        }
    }

    pub(crate) fn earn_gold(&mut self, amount: u32) {
        if let Vessel::Barque { gold, .. } = &mut self.vessel {
            *gold = gold.saturating_add(amount);
        }
    }

    pub(crate) fn spend_gold(&mut self, amount: u32) {
        if let Vessel::Barque { gold, .. } = &mut self.vessel {
            *gold = gold.saturating_sub(amount);
        }
    }

    /// Whether a round sits in the cannon. Cutters are never loaded.
    pub(crate) const fn is_loaded(&self) -> bool {
        match self.vessel {
            Vessel::Barque { loaded, .. } => loaded,
            Vessel::Cutter => false,
        }
    }

    pub(crate) fn set_loaded(&mut self, value: bool) {
        if let Vessel::Barque { loaded, .. } = &mut self.vessel {
            *loaded = value;
        }
    }

    /// Whether firing an empty cannon backfires on the crew.
    pub(crate) const fn penalises_unloaded_fire(&self) -> bool {
        matches!(self.vessel, Vessel::Barque { .. })
    }

    pub(crate) const fn ammunition(&self) -> &AmmunitionStore {
        &self.ammunition
    }

    pub(crate) fn ammunition_mut(&mut self) -> &mut AmmunitionStore {
        &mut self.ammunition
    }

    pub(crate) const fn cargo(&self) -> Option<&TreasureStore> {
        match &self.vessel {
            Vessel::Barque { cargo, .. } => Some(cargo),
            Vessel::Cutter => None,
        }
    }

    pub(crate) fn cargo_mut(&mut self) -> Option<&mut TreasureStore> {
        match &mut self.vessel {
            Vessel::Barque { cargo, .. } => Some(cargo),
            Vessel::Cutter => None,
        }
    }

    /// Empties the treasure hold, if there is one.
    pub(crate) fn forfeit_cargo(&mut self) {
        if let Some(cargo) = self.cargo_mut() {
            cargo.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn barque_starts_armed_with_an_empty_hold() {
        let ship = Ship::new("Grace".to_owned(), ActorType::Barque, Coordinate::new(1, 1));
        assert_eq!(ship.health(), 3);
        assert_eq!(ship.gold(), Some(0));
        assert!(ship.is_loaded());
        assert_eq!(ship.ammunition().rounds(), 5);
        assert!(ship.cargo().is_some_and(TreasureStore::is_empty));
    }

    #[test]
    fn cutter_ignores_gold_and_loading() {
        let mut ship = Ship::new("Jack".to_owned(), ActorType::Cutter, Coordinate::new(0, 0));
        ship.set_gold(40);
        ship.earn_gold(3);
        ship.set_loaded(true);

        assert_eq!(ship.gold(), None);
        assert!(!ship.is_loaded(), "cutters never hold a loaded round");
        assert!(ship.cargo().is_none());
        assert!(!ship.penalises_unloaded_fire());
        assert_eq!(ship.max_health(), 1);
    }

    #[test]
    fn damage_saturates_at_zero() {
        let mut ship = Ship::new("Mary".to_owned(), ActorType::Barque, Coordinate::new(0, 0));
        ship.take_damage(2);
        assert_eq!(ship.health(), 1);
        ship.take_damage(2);
        assert_eq!(ship.health(), 0);
        assert!(ship.is_sunk());
        ship.repair();
        assert_eq!(ship.health(), 3);
    }
}
