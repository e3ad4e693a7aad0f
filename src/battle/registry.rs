//! Dispatch table from (effect kind, trigger kind) to handler functions.
//!
//! Handlers read the state and return actions; they never mutate anything
//! themselves. All mutation happens later, when the returned actions resolve
//! through the action queue.

use schema::{Ability, Hazard, Item, Move, MoveData, MoveEffect, MoveEffectKind};
use std::collections::HashMap;
use tracing::trace;

use crate::battle::action::BattleAction;
use crate::battle::state::{BattleState, SlotRef};
use crate::battle::{move_effects, triggers};
use crate::random::RandomSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Move(MoveEffectKind),
    Ability(Ability),
    Item(Item),
    Hazard(Hazard),
}

/// Named moments at which handlers may fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    /// A move's non-damage effect, processed after its damage landed.
    MoveEffect,
    BeforeMove,
    AfterMove,
    DamageTaken,
    ContactReceived,
    SwitchIn,
    TurnEnd,
    WeatherChange,
}

/// What a handler gets to look at.
pub struct HandlerContext<'a> {
    pub state: &'a BattleState,
    /// The slot owning the effect: the move's user, or the ability/item holder.
    pub source: SlotRef,
    /// The move's target, or the opposing slot for reactive triggers (the
    /// attacker for damage-taken and contact-received).
    pub target: Option<SlotRef>,
    pub move_: Option<Move>,
    pub move_data: Option<&'a MoveData>,
    pub effect: Option<&'a MoveEffect>,
    /// Damage the triggering hit dealt, where there is one.
    pub damage: u16,
}

impl<'a> HandlerContext<'a> {
    pub fn new(state: &'a BattleState, source: SlotRef) -> Self {
        Self {
            state,
            source,
            target: None,
            move_: None,
            move_data: None,
            effect: None,
            damage: 0,
        }
    }

    pub fn with_target(mut self, target: Option<SlotRef>) -> Self {
        self.target = target;
        self
    }

    pub fn with_move(mut self, move_: Move, move_data: &'a MoveData) -> Self {
        self.move_ = Some(move_);
        self.move_data = Some(move_data);
        self
    }

    pub fn with_effect(mut self, effect: &'a MoveEffect) -> Self {
        self.effect = Some(effect);
        self
    }

    pub fn with_damage(mut self, damage: u16) -> Self {
        self.damage = damage;
        self
    }
}

pub type EffectHandler = fn(&HandlerContext<'_>, &mut dyn RandomSource) -> Vec<BattleAction>;

#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<(EffectKind, TriggerKind), EffectHandler>,
}

impl HandlerRegistry {
    /// An empty registry. Every dispatch is a no-op until handlers are registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry populated with every built-in move effect, ability, item
    /// and hazard handler.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        move_effects::register(&mut registry);
        triggers::register(&mut registry);
        registry
    }

    pub fn register(&mut self, kind: EffectKind, trigger: TriggerKind, handler: EffectHandler) {
        self.handlers.insert((kind, trigger), handler);
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Runs the handler for a key, or returns nothing if none is registered.
    pub fn dispatch(
        &self,
        kind: EffectKind,
        trigger: TriggerKind,
        ctx: &HandlerContext<'_>,
        rng: &mut dyn RandomSource,
    ) -> Vec<BattleAction> {
        match self.handlers.get(&(kind, trigger)) {
            Some(handler) => {
                let actions = handler(ctx, rng);
                trace!(?kind, ?trigger, source = %ctx.source, produced = actions.len(), "handler fired");
                actions
            }
            None => Vec::new(),
        }
    }

    /// Processes every non-damage effect of a move against one target.
    /// Each effect rolls its own chance gate.
    pub fn process_move_effects(
        &self,
        state: &BattleState,
        user: SlotRef,
        target: SlotRef,
        move_: Move,
        move_data: &MoveData,
        damage: u16,
        rng: &mut dyn RandomSource,
    ) -> Vec<BattleAction> {
        let mut actions = Vec::new();
        for effect in &move_data.effects {
            let ctx = HandlerContext::new(state, user)
                .with_target(Some(target))
                .with_move(move_, move_data)
                .with_effect(effect)
                .with_damage(damage);
            actions.extend(self.dispatch(
                EffectKind::Move(MoveEffectKind::from(effect)),
                TriggerKind::MoveEffect,
                &ctx,
                rng,
            ));
        }
        actions
    }

    /// Fires the ability and then the held item of the combatant in `ctx.source`.
    pub fn process_trigger(
        &self,
        trigger: TriggerKind,
        ctx: &HandlerContext<'_>,
        rng: &mut dyn RandomSource,
    ) -> Vec<BattleAction> {
        let Some(combatant) = ctx.state.active(ctx.source) else {
            return Vec::new();
        };

        let mut actions = Vec::new();
        if let Some(ability) = combatant.ability {
            actions.extend(self.dispatch(EffectKind::Ability(ability), trigger, ctx, rng));
        }
        if let Some(item) = combatant.item {
            actions.extend(self.dispatch(EffectKind::Item(item), trigger, ctx, rng));
        }
        actions
    }

    /// Entry hazards on the holder's side, then its switch-in ability and item.
    pub fn process_switch_in(
        &self,
        state: &BattleState,
        holder: SlotRef,
        rng: &mut dyn RandomSource,
    ) -> Vec<BattleAction> {
        let mut actions = Vec::new();
        let ctx = HandlerContext::new(state, holder);
        let mut hazards: Vec<Hazard> = state.side(holder.side).hazards.keys().copied().collect();
        hazards.sort_by_key(|hazard| *hazard as u8);
        for hazard in hazards {
            actions.extend(self.dispatch(EffectKind::Hazard(hazard), TriggerKind::SwitchIn, &ctx, rng));
        }
        actions.extend(self.process_trigger(TriggerKind::SwitchIn, &ctx, rng));
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::messages::BattleMessage;
    use crate::battle::tests::common::{create_test_battle, predictable_rng, TestCombatantBuilder, P1, P2};
    use crate::catalog::Catalog;
    use pretty_assertions::assert_eq;
    use schema::{Move, PokemonType};

    fn shout(_ctx: &HandlerContext<'_>, _rng: &mut dyn RandomSource) -> Vec<BattleAction> {
        vec![BattleAction::message(BattleMessage::Failed)]
    }

    #[test]
    fn missing_entries_dispatch_to_nothing() {
        let state = create_test_battle(
            vec![TestCombatantBuilder::new("A", PokemonType::Normal)
                .with_ability(Ability::RoughSkin)
                .build()],
            vec![TestCombatantBuilder::new("B", PokemonType::Normal).build()],
        );
        let registry = HandlerRegistry::new();
        let ctx = HandlerContext::new(&state, P1).with_target(Some(P2)).with_damage(10);
        let actions = registry.process_trigger(TriggerKind::ContactReceived, &ctx, &mut predictable_rng());
        assert!(actions.is_empty());
    }

    #[test]
    fn registered_handlers_fire_for_their_key_only() {
        let state = create_test_battle(
            vec![TestCombatantBuilder::new("A", PokemonType::Normal)
                .with_ability(Ability::Static)
                .build()],
            vec![TestCombatantBuilder::new("B", PokemonType::Normal).build()],
        );
        let mut registry = HandlerRegistry::new();
        registry.register(
            EffectKind::Ability(Ability::Static),
            TriggerKind::TurnEnd,
            shout,
        );

        let ctx = HandlerContext::new(&state, P1);
        let fired = registry.process_trigger(TriggerKind::TurnEnd, &ctx, &mut predictable_rng());
        assert_eq!(fired, vec![BattleAction::message(BattleMessage::Failed)]);

        let silent = registry.process_trigger(TriggerKind::SwitchIn, &ctx, &mut predictable_rng());
        assert!(silent.is_empty());
    }

    #[test]
    fn move_effect_processors_ignore_mismatched_effects() {
        let state = create_test_battle(
            vec![TestCombatantBuilder::new("A", PokemonType::Normal).build()],
            vec![TestCombatantBuilder::new("B", PokemonType::Normal).build()],
        );
        let registry = HandlerRegistry::standard();
        let catalog = Catalog::standard();
        let growl = catalog.move_data(Move::Growl).expect("growl");

        // Hand the burn processor a stat-change effect: no actions, no panic.
        let ctx = HandlerContext::new(&state, P1)
            .with_target(Some(P2))
            .with_move(Move::Growl, growl)
            .with_effect(&growl.effects[0]);
        let actions = registry.dispatch(
            EffectKind::Move(MoveEffectKind::Burn),
            TriggerKind::MoveEffect,
            &ctx,
            &mut predictable_rng(),
        );
        assert!(actions.is_empty());
    }
}
