//! Layer selection: which cubelets a turn moves.
//!
//! Selection reads the candidate slots straight from the position index and
//! then confirms each occupant's coordinate against the layer value within
//! `epsilon`. A stale or drifted cubelet fails the check instead of silently
//! joining or leaving the turn.

use crate::cube::{Cube, CubeletId};
use crate::error::CubeError;
use crate::faces::Turn;
use crate::geometry::Axis;
use crate::grid::{layer_slots, slot_to_idx};

impl<const DIM: usize, const SLOTS: usize> Cube<DIM, SLOTS> {
    /// Returns the cubelets on the layer(s) of `turn`.
    ///
    /// Yields exactly DIM^2 cubelets per band, or an error.
    pub fn select(&self, turn: Turn) -> Result<Vec<CubeletId>, CubeError> {
        if !turn.supported_by(DIM) {
            return Err(CubeError::UnsupportedTurn { turn, size: DIM });
        }

        let descriptor = turn.descriptor(DIM, self.spacing);
        let expected = DIM * DIM * descriptor.bands.len();
        let mut selected = Vec::with_capacity(expected);

        for band in &descriptor.bands {
            for slot in layer_slots::<DIM>(descriptor.axis, band.index) {
                let id = self.index[slot_to_idx::<DIM>(slot)];
                let along = descriptor.axis.component(self.cubelets[id].transform.position);
                if (along - band.value).abs() < self.epsilon {
                    selected.push(id);
                }
            }
        }

        log::debug!("{turn}: selected {} of {expected} cubelets", selected.len());

        match selected.len() {
            0 => Err(CubeError::SelectionEmpty { turn }),
            found if found != expected => Err(CubeError::SelectionIncomplete {
                turn,
                expected,
                found,
            }),
            _ => Ok(selected),
        }
    }

    /// Scans every cubelet for those whose `axis` coordinate is within
    /// `epsilon` of `value`, independent of the index.
    pub fn cubelets_near(&self, axis: Axis, value: f32, epsilon: f32) -> Vec<CubeletId> {
        self.cubelets
            .iter()
            .filter(|cubelet| (axis.component(cubelet.transform.position) - value).abs() < epsilon)
            .map(|cubelet| cubelet.id)
            .collect()
    }
}
