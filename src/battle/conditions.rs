use schema::PokemonType;
use serde::{Deserialize, Serialize};
use strum::EnumDiscriminants;

use crate::battle::state::SlotRef;

/// Battle-only conditions attached to a slot. They are cleared when the
/// occupant leaves the field.
///
/// A slot holds at most one condition of each kind; the payload of a newer
/// condition replaces the older one.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, EnumDiscriminants)]
#[strum_discriminants(name(VolatileKind), derive(Hash, Serialize, Deserialize))]
pub enum VolatileCondition {
    /// Fully blocks foe-directed moves for the rest of the turn.
    Protected,
    /// Draws single-target moves from the opposing side.
    Decoy,
    /// Loses its next action. `turn` is the turn the flinch applies to.
    Flinched { turn: u32 },
    /// Drained every end of turn; the HP goes to whoever occupies `by`.
    Seeded { by: SlotRef },
    /// Overrides the combatant's own types while active.
    TypeChange { pokemon_type: PokemonType },
}

impl VolatileCondition {
    pub fn kind(&self) -> VolatileKind {
        VolatileKind::from(self)
    }

    /// Conditions that only last for the turn they were set in.
    pub fn is_single_turn(&self) -> bool {
        matches!(self, VolatileCondition::Protected | VolatileCondition::Decoy)
    }
}
