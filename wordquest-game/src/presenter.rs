//! Notifications the engine hands to whatever renders the game.
//!
//! The engine never waits on these; it queues [`EngineEvent`]s while it
//! mutates state and the adapter drains them with
//! [`crate::SessionEngine::dispatch`] or [`crate::SessionEngine::drain_events`].
use serde::{Deserialize, Serialize};

use crate::bank::ThemeToken;
use crate::session::Achievement;

/// Audio cue after an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cue {
    Correct,
    Wrong,
}

/// A side effect for the presentation layer to materialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineEvent {
    ThemeApplied { theme: ThemeToken },
    Cue { cue: Cue },
    Achievement { achievement: Achievement },
    RewardPopup { amount: u32 },
    CoinHud { coins: u32 },
}

/// Presentation callbacks. Every method defaults to a no-op so adapters only
/// implement what they render.
pub trait Presenter {
    fn apply_theme(&mut self, _theme: &ThemeToken) {}
    fn play_cue(&mut self, _cue: Cue) {}
    fn show_achievement(&mut self, _achievement: Achievement) {}
    fn show_reward_popup(&mut self, _amount: u32) {}
    fn update_coin_hud(&mut self, _coins: u32) {}

    /// Route one event to its callback.
    fn handle(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::ThemeApplied { theme } => self.apply_theme(theme),
            EngineEvent::Cue { cue } => self.play_cue(*cue),
            EngineEvent::Achievement { achievement } => self.show_achievement(*achievement),
            EngineEvent::RewardPopup { amount } => self.show_reward_popup(*amount),
            EngineEvent::CoinHud { coins } => self.update_coin_hud(*coins),
        }
    }
}

/// Presenter that renders nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {}

/// Presenter that records every event, for tests and replays.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    pub events: Vec<EngineEvent>,
}

impl Presenter for RecordingPresenter {
    fn handle(&mut self, event: &EngineEvent) {
        self.events.push(event.clone());
    }
}
