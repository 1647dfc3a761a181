//! Cube Turning Library
//!
//! Tracks the state of 2x2x2 and 4x4x4 twisty cubes: selects the cubelets of
//! a face or layer, animates them through a quarter turn, commits the result
//! into a position index and keeps the move history needed to undo it all.

pub mod config;
pub mod cube;
pub mod dispatcher;
pub mod easing;
pub mod error;
pub mod faces;
pub mod geometry;
pub mod grid;
pub mod ledger;
pub mod lock;
pub mod persistence;
pub mod rotation;
mod selector;

use glam::Vec3;

use cube::{Cube, Cubelet, CubeletId, PocketCube, RevengeCube, POCKET_DIM, REVENGE_DIM};
use error::CubeError;
use faces::Turn;
use geometry::{Axis, Transform};
use grid::Slot;

/// Trait that erases the compile-time cube size for dynamic dispatch.
///
/// `DIM` and `SLOTS` are hidden behind the vtable, so the controller and the
/// CLI can drive either cube without turbofish.
pub trait CubeOps {
    fn dim(&self) -> usize;
    fn spacing(&self) -> f32;
    fn center(&self) -> Vec3;
    fn cubelets(&self) -> &[Cubelet];
    fn set_transform(&mut self, id: CubeletId, transform: Transform);
    fn select(&self, turn: Turn) -> Result<Vec<CubeletId>, CubeError>;
    fn cubelets_near(&self, axis: Axis, value: f32, epsilon: f32) -> Vec<CubeletId>;
    fn index(&self) -> &[CubeletId];
    /// `None` when `slot` lies outside the cube.
    fn occupant(&self, slot: Slot) -> Option<CubeletId>;
    fn slot_of(&self, id: CubeletId) -> Option<Slot>;
    /// Where a quarter turn about `axis` sends `slot`, computed exactly.
    fn rotated_slot(&self, axis: Axis, positive: bool, slot: Slot) -> Option<Slot>;
    fn settle(&mut self, id: CubeletId) -> Result<Slot, CubeError>;
    fn rebuild_index(&mut self) -> Result<(), CubeError>;
    fn is_bijection(&self) -> bool;
    fn is_solved(&self) -> bool;
    fn reset(&mut self);
    fn format_index(&self) -> String;
}

impl<const DIM: usize, const SLOTS: usize> CubeOps for Cube<DIM, SLOTS> {
    fn dim(&self) -> usize {
        DIM
    }

    fn spacing(&self) -> f32 {
        Cube::spacing(self)
    }

    fn center(&self) -> Vec3 {
        Self::CENTER
    }

    fn cubelets(&self) -> &[Cubelet] {
        Cube::cubelets(self)
    }

    fn set_transform(&mut self, id: CubeletId, transform: Transform) {
        self.cubelets[id].transform = transform;
    }

    fn select(&self, turn: Turn) -> Result<Vec<CubeletId>, CubeError> {
        Cube::select(self, turn)
    }

    fn cubelets_near(&self, axis: Axis, value: f32, epsilon: f32) -> Vec<CubeletId> {
        Cube::cubelets_near(self, axis, value, epsilon)
    }

    fn index(&self) -> &[CubeletId] {
        Cube::index(self)
    }

    fn occupant(&self, slot: Slot) -> Option<CubeletId> {
        Cube::occupant(self, slot)
    }

    fn slot_of(&self, id: CubeletId) -> Option<Slot> {
        Cube::slot_of(self, id)
    }

    fn rotated_slot(&self, axis: Axis, positive: bool, slot: Slot) -> Option<Slot> {
        grid::rotate_slot::<DIM>(axis, positive, slot)
    }

    fn settle(&mut self, id: CubeletId) -> Result<Slot, CubeError> {
        Cube::settle(self, id)
    }

    fn rebuild_index(&mut self) -> Result<(), CubeError> {
        Cube::rebuild_index(self)
    }

    fn is_bijection(&self) -> bool {
        Cube::is_bijection(self)
    }

    fn is_solved(&self) -> bool {
        Cube::is_solved(self)
    }

    fn reset(&mut self) {
        Cube::reset(self)
    }

    fn format_index(&self) -> String {
        grid::format_index(self)
    }
}

/// Builds a solved cube of the given edge size (2 or 4).
pub fn build_cube(size: usize, spacing: f32, epsilon: f32) -> Result<Box<dyn CubeOps>, CubeError> {
    match size {
        POCKET_DIM => Ok(Box::new(PocketCube::new(spacing, epsilon))),
        REVENGE_DIM => Ok(Box::new(RevengeCube::new(spacing, epsilon))),
        other => Err(CubeError::UnsupportedSize(other)),
    }
}
