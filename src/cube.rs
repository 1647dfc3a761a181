//! Cube definitions and cubelet types.
//!
//! A cube is an N x N x N block of unit cubelets. Each cubelet keeps its
//! identity for life; only its transform and the slot it occupies change.

use glam::Vec3;

use crate::geometry::Transform;
use crate::grid::{idx_to_slot, Slot};

/// Stable cubelet identity, equal to the linear index of its home slot.
pub type CubeletId = usize;

/// Marker for an unfilled index entry while rebuilding.
pub(crate) const NO_CUBELET: CubeletId = CubeletId::MAX;

/// One unit cube of the puzzle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cubelet {
    pub id: CubeletId,
    /// Slot the cubelet starts in and returns to on reset.
    pub home: Slot,
    pub transform: Transform,
}

/// Cube with compile-time dimensions.
///
/// - `DIM`: cubelets per edge (2 for the pocket cube, 4 for the revenge cube)
/// - `SLOTS`: total slot count (must equal DIM^3)
///
/// `index[slot]` holds the cubelet currently in that slot; the cubelets'
/// transforms say where they are in space. The two agree after every
/// committed move.
#[derive(Debug, Clone)]
pub struct Cube<const DIM: usize, const SLOTS: usize> {
    pub(crate) cubelets: [Cubelet; SLOTS],
    pub(crate) index: [CubeletId; SLOTS],
    /// Distance between neighbouring slot centres.
    pub(crate) spacing: f32,
    /// Tolerance for matching a coordinate against a slot or layer.
    pub(crate) epsilon: f32,
}

impl<const DIM: usize, const SLOTS: usize> Cube<DIM, SLOTS> {
    /// Rotation centre of every layer turn.
    pub const CENTER: Vec3 = Vec3::ZERO;

    /// Creates a solved cube.
    pub fn new(spacing: f32, epsilon: f32) -> Self {
        const {
            assert!(DIM * DIM * DIM == SLOTS, "SLOTS must equal DIM^3");
            assert!(DIM % 2 == 0, "only even cube sizes have a slot-free centre");
        }
        let mut cube = Self {
            cubelets: std::array::from_fn(|id| Cubelet {
                id,
                home: idx_to_slot::<DIM>(id),
                transform: Transform::at(Vec3::ZERO),
            }),
            index: std::array::from_fn(|slot| slot),
            spacing,
            epsilon,
        };
        cube.reset();
        cube
    }

    /// Puts every cubelet back in its home slot with no rotation.
    pub fn reset(&mut self) {
        for id in 0..SLOTS {
            let home = self.cubelets[id].home;
            self.cubelets[id].transform = Transform::at(self.slot_position(home));
            self.index[id] = id;
        }
    }

    pub fn cubelets(&self) -> &[Cubelet] {
        &self.cubelets
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }
}

/// Pocket cube constants.
pub const POCKET_DIM: usize = 2;
pub const POCKET_SLOTS: usize = 8;

/// 2x2x2 cube.
pub type PocketCube = Cube<POCKET_DIM, POCKET_SLOTS>;

/// Revenge cube constants.
pub const REVENGE_DIM: usize = 4;
pub const REVENGE_SLOTS: usize = 64;

/// 4x4x4 cube.
pub type RevengeCube = Cube<REVENGE_DIM, REVENGE_SLOTS>;
