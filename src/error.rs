//! Crate-level error type.

use thiserror::Error;

use crate::faces::Turn;
use crate::grid::Slot;

/// Errors produced by cube operations and the surfaces around them.
#[derive(Debug, Error)]
pub enum CubeError {
    /// The selector found no cubelets on the requested layer.
    #[error("no cubelets found for {turn}")]
    SelectionEmpty { turn: Turn },

    /// The selector found some, but not all, of the layer's cubelets.
    #[error("{turn} selected {found} cubelets, expected {expected}")]
    SelectionIncomplete {
        turn: Turn,
        expected: usize,
        found: usize,
    },

    /// The turn needs more layers than this cube has.
    #[error("{turn} is not available on a {size}x{size}x{size} cube")]
    UnsupportedTurn { turn: Turn, size: usize },

    /// A cubelet ended a rotation away from every slot centre.
    #[error("cubelet {id} at ({x:.3}, {y:.3}, {z:.3}) is not aligned to a slot")]
    SlotMisaligned { id: usize, x: f32, y: f32, z: f32 },

    /// Two cubelets resolved to the same slot.
    #[error("slot {slot:?} claimed by cubelets {first} and {second}")]
    SlotCollision {
        slot: Slot,
        first: usize,
        second: usize,
    },

    /// A committed rotation moved a cubelet somewhere the quarter turn does not.
    #[error("cubelet {id} settled in {found:?}, expected {expected:?}")]
    PermutationMismatch {
        id: usize,
        expected: Slot,
        found: Slot,
    },

    /// Only pocket (2) and revenge (4) cubes are built.
    #[error("unsupported cube size {0}, expected 2 or 4")]
    UnsupportedSize(usize),

    /// A config value outside the range the engine can work with.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid move notation `{0}`")]
    Notation(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),
}
