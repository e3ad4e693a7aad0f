pub mod action;
pub mod action_queue;
pub mod ai;
pub mod calculators;
pub mod conditions;
pub mod decision;
pub mod end_of_turn;
pub mod engine;
pub mod messages;
pub mod pipeline;
pub mod presentation;
pub mod reactions;
pub mod registry;
pub mod state;
pub mod stats;
pub mod targeting;
pub mod turn_order;

mod move_effects;
mod triggers;

#[cfg(test)]
mod tests;
