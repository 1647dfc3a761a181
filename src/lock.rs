//! Per-turn animation flags and the user-input debounce.

use std::fmt;
use std::time::{Duration, Instant};

use crate::faces::Turn;

/// Why a move request was turned away. None of these are failures; the
/// request is simply dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Interactive input while any turn is animating.
    AnyFaceAnimating,
    /// Interactive input inside the debounce window.
    Debounced,
    /// The requested turn is already animating.
    FaceAnimating,
    /// A different turn's rotation has not finished yet.
    RotationInFlight,
    /// Interactive input while an auto-solve is running.
    AutoSolveActive,
    /// Undo requested with an empty undo list.
    NothingToUndo,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Rejection::AnyFaceAnimating => "another face is animating",
            Rejection::Debounced => "input debounced",
            Rejection::FaceAnimating => "face already animating",
            Rejection::RotationInFlight => "a rotation is in flight",
            Rejection::AutoSolveActive => "auto-solve in progress",
            Rejection::NothingToUndo => "nothing to undo",
        };
        f.write_str(reason)
    }
}

/// Animating flag per turn, indexed by `Turn::index`.
#[derive(Debug, Clone, Default)]
pub struct AnimationLock {
    animating: [bool; Turn::COUNT],
}

impl AnimationLock {
    pub fn is_animating(&self, turn: Turn) -> bool {
        self.animating[turn.index()]
    }

    pub fn any_animating(&self) -> bool {
        self.animating.iter().any(|&flag| flag)
    }

    pub fn animating_count(&self) -> usize {
        self.animating.iter().filter(|&&flag| flag).count()
    }

    /// Idle -> Animating. Returns false if the turn was already animating.
    pub(crate) fn acquire(&mut self, turn: Turn) -> bool {
        let flag = &mut self.animating[turn.index()];
        if *flag {
            return false;
        }
        *flag = true;
        true
    }

    /// Animating -> Idle.
    pub(crate) fn release(&mut self, turn: Turn) {
        self.animating[turn.index()] = false;
    }
}

/// Rejects requests that arrive within `interval` of the last accepted one.
#[derive(Debug, Clone)]
pub struct Debounce {
    interval: Duration,
    last_accepted: Option<Instant>,
}

impl Debounce {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_accepted: None,
        }
    }

    /// Accepts and records `now` if the interval has elapsed.
    pub fn try_accept(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_accepted {
            if now.saturating_duration_since(last) < self.interval {
                return false;
            }
        }
        self.last_accepted = Some(now);
        true
    }
}
