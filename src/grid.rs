//! Slot addressing and the position index.
//!
//! Generic over cube dimension (`DIM`) and slot count (`SLOTS = DIM^3`).
//! The index is a flat array where each entry holds the id of the cubelet
//! occupying that slot.

use glam::{Quat, Vec3};
use rustc_hash::FxHashSet;

use crate::cube::{Cube, CubeletId, NO_CUBELET};
use crate::error::CubeError;
use crate::geometry::{quarter_turn, same_rotation, snap_orientation, Axis, Coord};

/// Grid slot `(i, j, k)` with each index in `0..DIM`.
pub type Slot = (usize, usize, usize);

/// Converts a slot to a linear index.
///
/// Index order is x-major: `idx = x * DIM * DIM + y * DIM + z`.
#[inline(always)]
pub const fn slot_to_idx<const DIM: usize>((x, y, z): Slot) -> usize {
    x * DIM * DIM + y * DIM + z
}

/// Converts a linear index to a slot.
#[inline(always)]
pub const fn idx_to_slot<const DIM: usize>(slot_index: usize) -> Slot {
    (
        slot_index / (DIM * DIM),
        (slot_index / DIM) % DIM,
        slot_index % DIM,
    )
}

/// Converts a slot to doubled centred coordinates.
#[inline]
pub const fn slot_to_coord<const DIM: usize>((x, y, z): Slot) -> Coord {
    let offset = DIM as i32 - 1;
    (
        2 * x as i32 - offset,
        2 * y as i32 - offset,
        2 * z as i32 - offset,
    )
}

/// Converts doubled centred coordinates back to a slot, if inside the grid.
pub fn coord_to_slot<const DIM: usize>((x, y, z): Coord) -> Option<Slot> {
    let offset = DIM as i32 - 1;
    let axis = |c: i32| {
        let doubled = c + offset;
        (doubled >= 0 && doubled % 2 == 0 && doubled / 2 < DIM as i32).then_some((doubled / 2) as usize)
    };
    Some((axis(x)?, axis(y)?, axis(z)?))
}

/// Applies a quarter turn about the cube centre to a slot.
#[inline]
pub fn rotate_slot<const DIM: usize>(axis: Axis, positive: bool, slot: Slot) -> Option<Slot> {
    coord_to_slot::<DIM>(quarter_turn(axis, positive, slot_to_coord::<DIM>(slot)))
}

/// All slots whose index along `axis` equals `layer`, in index order.
pub fn layer_slots<const DIM: usize>(axis: Axis, layer: usize) -> impl Iterator<Item = Slot> {
    (0..DIM).flat_map(move |a| {
        (0..DIM).map(move |b| match axis {
            Axis::X => (layer, a, b),
            Axis::Y => (a, layer, b),
            Axis::Z => (a, b, layer),
        })
    })
}

impl<const DIM: usize, const SLOTS: usize> Cube<DIM, SLOTS> {
    /// World-space centre of a slot.
    pub fn slot_position(&self, slot: Slot) -> Vec3 {
        let (x, y, z) = slot_to_coord::<DIM>(slot);
        Vec3::new(x as f32, y as f32, z as f32) * (self.spacing / 2.0)
    }

    /// Finds the slot whose centre lies within `epsilon` of `position` on
    /// every axis.
    pub fn slot_near(&self, position: Vec3) -> Option<Slot> {
        let half_extent = (DIM as f32 - 1.0) / 2.0;
        let axis = |value: f32| {
            let nearest = (value / self.spacing + half_extent).round();
            (nearest >= 0.0 && nearest < DIM as f32).then_some(nearest as usize)
        };
        let slot = (axis(position.x)?, axis(position.y)?, axis(position.z)?);
        let error = (self.slot_position(slot) - position).abs().max_element();
        (error < self.epsilon).then_some(slot)
    }

    /// Cubelet currently occupying `slot`, or `None` when `slot` lies
    /// outside the cube.
    #[inline]
    pub fn occupant(&self, slot: Slot) -> Option<CubeletId> {
        let (x, y, z) = slot;
        (x < DIM && y < DIM && z < DIM).then(|| self.index[slot_to_idx::<DIM>(slot)])
    }

    /// Slot currently holding cubelet `id`.
    pub fn slot_of(&self, id: CubeletId) -> Option<Slot> {
        self.index
            .iter()
            .position(|&occupant| occupant == id)
            .map(idx_to_slot::<DIM>)
    }

    pub fn index(&self) -> &[CubeletId] {
        &self.index
    }

    /// Snaps a cubelet onto the nearest slot centre and the nearest exact
    /// cube orientation.
    pub fn settle(&mut self, id: CubeletId) -> Result<Slot, CubeError> {
        let transform = self.cubelets[id].transform;
        let position = transform.position;
        let slot = self.slot_near(position).ok_or(CubeError::SlotMisaligned {
            id,
            x: position.x,
            y: position.y,
            z: position.z,
        })?;
        let center = self.slot_position(slot);
        let settled = &mut self.cubelets[id].transform;
        settled.position = center;
        settled.orientation = snap_orientation(transform.orientation);
        Ok(slot)
    }

    /// Rebuilds the index from cubelet positions.
    ///
    /// Fails without touching the index if a cubelet is off-grid or two
    /// cubelets claim the same slot. With N^3 cubelets and no collisions
    /// every slot ends up filled, so success means a bijection.
    pub fn rebuild_index(&mut self) -> Result<(), CubeError> {
        let mut rebuilt = [NO_CUBELET; SLOTS];
        for cubelet in &self.cubelets {
            let position = cubelet.transform.position;
            let slot = self.slot_near(position).ok_or(CubeError::SlotMisaligned {
                id: cubelet.id,
                x: position.x,
                y: position.y,
                z: position.z,
            })?;
            let entry = &mut rebuilt[slot_to_idx::<DIM>(slot)];
            if *entry != NO_CUBELET {
                return Err(CubeError::SlotCollision {
                    slot,
                    first: *entry,
                    second: cubelet.id,
                });
            }
            *entry = cubelet.id;
        }
        self.index = rebuilt;
        Ok(())
    }

    /// Whether the index maps the N^3 slots one-to-one onto the N^3 cubelets.
    pub fn is_bijection(&self) -> bool {
        let distinct: FxHashSet<CubeletId> = self.index.iter().copied().collect();
        distinct.len() == SLOTS && distinct.iter().all(|&id| id < SLOTS)
    }

    /// Whether every cubelet is home with its starting orientation.
    pub fn is_solved(&self) -> bool {
        self.cubelets.iter().all(|cubelet| {
            self.index[slot_to_idx::<DIM>(cubelet.home)] == cubelet.id
                && same_rotation(
                    cubelet.transform.orientation,
                    Quat::IDENTITY,
                    self.epsilon,
                )
        })
    }
}

/// Formats the index as a human-readable string.
///
/// Displays DIM z-slices side by side; each cell is the two-digit id of the
/// cubelet in that slot. Rows run from top (y = DIM - 1) to bottom.
pub fn format_index<const DIM: usize, const SLOTS: usize>(cube: &Cube<DIM, SLOTS>) -> String {
    // each cell is two digits plus a separating space
    let slice_width = 3 * DIM - 1;
    let mut lines = Vec::with_capacity(DIM + 1);

    let header: Vec<String> = (0..DIM)
        .map(|z| format!("{:<slice_width$}", format!("z={z}")))
        .collect();
    lines.push(header.join("  "));

    for y in (0..DIM).rev() {
        let row: Vec<String> = (0..DIM)
            .map(|z| {
                (0..DIM)
                    .map(|x| format!("{:02}", cube.index[slot_to_idx::<DIM>((x, y, z))]))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();
        lines.push(row.join("  "));
    }

    let mut output = String::new();
    for line in lines {
        output.push_str(line.trim_end());
        output.push('\n');
    }
    output
}
