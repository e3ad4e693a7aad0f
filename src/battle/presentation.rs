use async_trait::async_trait;
use std::time::Duration;

use crate::battle::action::BattleAction;
use crate::battle::state::BattleState;

/// The visualization side of the engine.
///
/// `present` is awaited once per resolved action and may take as long as the
/// visualization needs. It only ever sees the state read-only.
#[async_trait]
pub trait PresentationSink: Send + Sync {
    async fn present(&self, action: &BattleAction, state: &BattleState);
}

/// Presents nothing. Valid for headless runs and tests.
pub struct NoopPresenter;

#[async_trait]
impl PresentationSink for NoopPresenter {
    async fn present(&self, _action: &BattleAction, _state: &BattleState) {}
}

/// Prints each narrated action to stdout, optionally pausing after every line.
pub struct TextPresenter {
    pause: Option<Duration>,
}

impl TextPresenter {
    pub fn new() -> Self {
        Self { pause: None }
    }

    pub fn with_pause(pause: Duration) -> Self {
        Self { pause: Some(pause) }
    }
}

impl Default for TextPresenter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PresentationSink for TextPresenter {
    async fn present(&self, action: &BattleAction, _state: &BattleState) {
        let Some(line) = action.describe() else {
            return;
        };
        println!("  {}", line);
        if let Some(pause) = self.pause {
            tokio::time::sleep(pause).await;
        }
    }
}
