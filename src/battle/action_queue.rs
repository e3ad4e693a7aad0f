use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{debug, error};

use crate::battle::action::BattleAction;
use crate::battle::presentation::PresentationSink;
use crate::battle::state::BattleState;
use crate::errors::{BattleEngineError, BattleResult};

/// The two-phase contract every queued action fulfils.
///
/// `resolve` mutates the state and returns the reactions it caused.
/// `present` drives the presentation sink and must not change the state.
#[async_trait]
pub trait Resolvable: fmt::Debug + Send + Sync + Sized {
    fn resolve(&self, state: &mut BattleState) -> Vec<Self>;

    async fn present(&self, view: &dyn PresentationSink, state: &BattleState);
}

/// An observer notified after every resolution, before presentation.
///
/// Listeners see the action, the post-resolution state and the reactions the
/// action produced. They have no handle on the queue.
pub trait ActionListener<A = BattleAction>: Send {
    fn on_resolved(&mut self, action: &A, state: &BattleState, reactions: &[A]);
}

/// Pending actions for the current turn.
///
/// Ordinary enqueues append at the back. Reactions produced by the action
/// just resolved are inserted at the front as one batch that keeps its own
/// order, so they run before anything that was already waiting.
pub struct ActionQueue<A: Resolvable = BattleAction> {
    pending: VecDeque<A>,
    listeners: Vec<Box<dyn ActionListener<A>>>,
    ceiling: usize,
    iterations: usize,
}

impl<A: Resolvable> ActionQueue<A> {
    pub fn new(ceiling: usize) -> Self {
        Self {
            pending: VecDeque::new(),
            listeners: Vec::new(),
            ceiling,
            iterations: 0,
        }
    }

    /// Appends one action. `None` is ignored.
    pub fn enqueue(&mut self, action: impl Into<Option<A>>) {
        if let Some(action) = action.into() {
            self.pending.push_back(action);
        }
    }

    /// Appends a batch in order, skipping empty entries.
    pub fn enqueue_range<I, T>(&mut self, actions: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<A>>,
    {
        for action in actions {
            self.enqueue(action);
        }
    }

    /// Inserts a batch ahead of the current head; `actions[0]` runs first.
    pub fn insert_front(&mut self, actions: Vec<A>) {
        for action in actions.into_iter().rev() {
            self.pending.push_front(action);
        }
    }

    pub fn add_listener(&mut self, listener: Box<dyn ActionListener<A>>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Dequeues performed since the last budget reset.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Starts a fresh per-turn iteration budget.
    pub fn reset_budget(&mut self) {
        self.iterations = 0;
    }

    /// Resolves actions until the queue is empty and returns them in the order
    /// they ran.
    ///
    /// Exceeding the iteration ceiling clears the queue and fails with
    /// [`BattleEngineError::RunawayReactionLoop`].
    pub async fn drain(
        &mut self,
        state: &mut BattleState,
        view: &dyn PresentationSink,
    ) -> BattleResult<Vec<A>> {
        let mut resolved = Vec::new();

        while let Some(action) = self.pending.pop_front() {
            if self.iterations >= self.ceiling {
                error!(
                    ceiling = self.ceiling,
                    pending = self.pending.len() + 1,
                    last = ?action,
                    "action queue exceeded its iteration ceiling"
                );
                self.pending.clear();
                return Err(BattleEngineError::RunawayReactionLoop {
                    ceiling: self.ceiling,
                });
            }
            self.iterations += 1;

            let reactions = action.resolve(state);
            for listener in self.listeners.iter_mut() {
                listener.on_resolved(&action, state, &reactions);
            }
            action.present(view, state).await;

            self.insert_front(reactions);
            resolved.push(action);
        }

        debug!(resolved = resolved.len(), total = self.iterations, "queue drained");
        Ok(resolved)
    }
}

/// Records every resolved action. Clones share the same log.
#[derive(Clone, Default)]
pub struct ActionLog {
    entries: Arc<Mutex<Vec<BattleAction>>>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<BattleAction> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ActionListener for ActionLog {
    fn on_resolved(&mut self, action: &BattleAction, _state: &BattleState, _reactions: &[BattleAction]) {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.push(action.clone());
    }
}

/// Counts resolutions per action kind. Clones share the same counters.
#[derive(Clone, Default)]
pub struct ActionStatistics {
    counts: Arc<Mutex<HashMap<&'static str, usize>>>,
}

impl ActionStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.counts().get(kind).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> HashMap<&'static str, usize> {
        match self.counts.lock() {
            Ok(counts) => counts.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ActionListener for ActionStatistics {
    fn on_resolved(&mut self, action: &BattleAction, _state: &BattleState, _reactions: &[BattleAction]) {
        let mut counts = match self.counts.lock() {
            Ok(counts) => counts,
            Err(poisoned) => poisoned.into_inner(),
        };
        *counts.entry(action.kind()).or_insert(0) += 1;
    }
}

/// Logs each resolution at trace level.
pub struct TracingListener;

impl ActionListener for TracingListener {
    fn on_resolved(&mut self, action: &BattleAction, state: &BattleState, reactions: &[BattleAction]) {
        tracing::trace!(
            turn = state.turn_number,
            kind = action.kind(),
            reactions = reactions.len(),
            "resolved action"
        );
    }
}
