//! Behavior state carried by every character.
//!
//! Each variant holds only the data its state needs. The transition logic
//! lives in [`crate::systems::behavior`].

use std::collections::VecDeque;

use tavern_logic::geometry::Vec2;

#[derive(Debug, Clone, PartialEq)]
pub enum BehaviorState {
    /// Standing still; guests count down to looking for a chair.
    Idle { timer: f32 },
    Walk,
    FindingChair { elapsed: f32 },
    /// Following waypoints to the target chair.
    MovingToTarget { path: VecDeque<Vec2> },
    Sitting { timer: f32 },
    Ordering { timer: f32 },
    WaitingForFood,
    Eating { timer: f32 },
    Leaving,
}

impl Default for BehaviorState {
    fn default() -> Self {
        BehaviorState::Idle { timer: 0.0 }
    }
}

/// Variant tag of a [`BehaviorState`], used to request transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    Idle,
    Walk,
    FindingChair,
    MovingToTarget,
    Sitting,
    Ordering,
    WaitingForFood,
    Eating,
    Leaving,
}

impl StateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateKind::Idle => "idle",
            StateKind::Walk => "walk",
            StateKind::FindingChair => "finding_chair",
            StateKind::MovingToTarget => "moving_to_target",
            StateKind::Sitting => "sitting",
            StateKind::Ordering => "ordering",
            StateKind::WaitingForFood => "waiting_for_food",
            StateKind::Eating => "eating",
            StateKind::Leaving => "leaving",
        }
    }

    /// States in which the character is on a chair.
    pub fn is_seated(&self) -> bool {
        matches!(
            self,
            StateKind::Sitting | StateKind::Ordering | StateKind::WaitingForFood | StateKind::Eating
        )
    }

    /// States that show the walking animation.
    pub fn is_moving(&self) -> bool {
        matches!(self, StateKind::Walk | StateKind::MovingToTarget)
    }
}

impl BehaviorState {
    pub fn kind(&self) -> StateKind {
        match self {
            BehaviorState::Idle { .. } => StateKind::Idle,
            BehaviorState::Walk => StateKind::Walk,
            BehaviorState::FindingChair { .. } => StateKind::FindingChair,
            BehaviorState::MovingToTarget { .. } => StateKind::MovingToTarget,
            BehaviorState::Sitting { .. } => StateKind::Sitting,
            BehaviorState::Ordering { .. } => StateKind::Ordering,
            BehaviorState::WaitingForFood => StateKind::WaitingForFood,
            BehaviorState::Eating { .. } => StateKind::Eating,
            BehaviorState::Leaving => StateKind::Leaving,
        }
    }

    /// Remaining time on the state's timer, if it has one.
    pub fn timer(&self) -> Option<f32> {
        match self {
            BehaviorState::Idle { timer }
            | BehaviorState::Sitting { timer }
            | BehaviorState::Ordering { timer }
            | BehaviorState::Eating { timer } => Some(*timer),
            _ => None,
        }
    }
}

/// State machine component plus the input flags that drive the player.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Behavior {
    pub state: BehaviorState,
    pub sit_requested: bool,
    pub stand_requested: bool,
    /// Last animation cue sent, so cues fire only on change.
    pub last_cue: Option<String>,
}

impl Behavior {
    pub fn kind(&self) -> StateKind {
        self.state.kind()
    }
}
