// Shared catalog vocabulary for the turn engine.
// Everything here is read-only data: identifiers and their static
// definitions. The engine crate owns all battle behavior.

pub use battle_data::*;
pub use move_types::*;
pub use pokemon_types::*;

pub mod battle_data;
pub mod move_types;
pub mod pokemon_types;
