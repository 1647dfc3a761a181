//! Animated quarter turns.
//!
//! A rotation snapshots the transforms of the cubelets it moves, then on
//! every frame recomputes them from that snapshot plus the eased partial
//! angle. Nothing accumulates between frames, so float error cannot creep.
//! The final frame writes exact slot centres and group orientations and
//! rebuilds the position index.

use std::time::{Duration, Instant};

use glam::{Quat, Vec3};

use crate::cube::CubeletId;
use crate::easing::Easing;
use crate::error::CubeError;
use crate::faces::Move;
use crate::geometry::{Axis, Transform};
use crate::grid::Slot;
use crate::ledger::Source;
use crate::lock::{AnimationLock, Rejection};
use crate::CubeOps;

/// Pre-rotation state of one moving cubelet.
#[derive(Debug, Clone, Copy)]
struct Snapshot {
    id: CubeletId,
    slot: Slot,
    transform: Transform,
}

/// A turn in progress.
#[derive(Debug, Clone)]
struct Rotation {
    mv: Move,
    source: Source,
    axis: Axis,
    /// Signed target angle in radians.
    angle: f32,
    center: Vec3,
    snapshot: Vec<Snapshot>,
    started: Instant,
    duration: Duration,
    easing: Easing,
}

impl Rotation {
    /// Linear progress in [0, 1].
    fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    /// Writes the snapshot rotated by `fraction` of the target angle.
    fn pose(&self, cube: &mut dyn CubeOps, fraction: f32) {
        let rotation = Quat::from_axis_angle(self.axis.unit(), self.angle * fraction);
        for snap in &self.snapshot {
            cube.set_transform(snap.id, snap.transform.rotated_about(self.center, rotation));
        }
    }

    /// Lands on the exact target and commits it to the index.
    fn finish(&self, cube: &mut dyn CubeOps) -> Result<(), CubeError> {
        self.pose(cube, 1.0);
        let positive = self.angle > 0.0;
        for snap in &self.snapshot {
            let found = cube.settle(snap.id)?;
            let expected = cube
                .rotated_slot(self.axis, positive, snap.slot)
                .unwrap_or(snap.slot);
            if found != expected {
                return Err(CubeError::PermutationMismatch {
                    id: snap.id,
                    expected,
                    found,
                });
            }
        }
        cube.rebuild_index()
    }
}

/// Outcome of asking the engine to start a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Start {
    Started,
    Ignored(Rejection),
}

/// A rotation that ran to completion and was committed to the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub mv: Move,
    pub source: Source,
}

/// Runs at most one rotation at a time and owns the animation flags.
#[derive(Debug, Clone)]
pub struct RotationEngine {
    lock: AnimationLock,
    active: Option<Rotation>,
    duration: Duration,
    easing: Easing,
}

impl RotationEngine {
    pub fn new(duration: Duration, easing: Easing) -> Self {
        Self {
            lock: AnimationLock::default(),
            active: None,
            duration,
            easing,
        }
    }

    /// Begins animating `mv`.
    ///
    /// The turn's flag is set before selection. A selection failure clears
    /// it again and is returned as an error; the cube is left untouched.
    pub fn rotate(
        &mut self,
        cube: &mut dyn CubeOps,
        mv: Move,
        source: Source,
        now: Instant,
    ) -> Result<Start, CubeError> {
        if self.lock.is_animating(mv.turn) {
            log::debug!("{mv} ignored: {}", Rejection::FaceAnimating);
            return Ok(Start::Ignored(Rejection::FaceAnimating));
        }
        if let Some(active) = &self.active {
            log::debug!("{mv} ignored: {} ({})", Rejection::RotationInFlight, active.mv);
            return Ok(Start::Ignored(Rejection::RotationInFlight));
        }
        self.lock.acquire(mv.turn);

        let snapshot = match self.snapshot(cube, mv) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                self.lock.release(mv.turn);
                log::error!("{mv} aborted: {err}");
                return Err(err);
            }
        };

        let descriptor = mv.turn.descriptor(cube.dim(), cube.spacing());
        log::info!("{mv} ({source}) started, {} cubelets", snapshot.len());
        self.active = Some(Rotation {
            mv,
            source,
            axis: descriptor.axis,
            angle: mv.angle(),
            center: cube.center(),
            snapshot,
            started: now,
            duration: self.duration,
            easing: self.easing,
        });
        Ok(Start::Started)
    }

    fn snapshot(&self, cube: &dyn CubeOps, mv: Move) -> Result<Vec<Snapshot>, CubeError> {
        let selected = cube.select(mv.turn)?;
        let cubelets = cube.cubelets();
        selected
            .into_iter()
            .map(|id| {
                let transform = cubelets[id].transform;
                let slot = cube.slot_of(id).ok_or(CubeError::SlotMisaligned {
                    id,
                    x: transform.position.x,
                    y: transform.position.y,
                    z: transform.position.z,
                })?;
                Ok(Snapshot { id, slot, transform })
            })
            .collect()
    }

    /// Moves the in-flight rotation to `now`.
    ///
    /// Returns `None` while nothing finished this frame. When the rotation
    /// ends its flag is cleared whether or not committing succeeded; a failed
    /// commit puts the moved cubelets back where they started.
    pub fn advance(
        &mut self,
        cube: &mut dyn CubeOps,
        now: Instant,
    ) -> Option<Result<Completion, CubeError>> {
        let rotation = self.active.as_ref()?;
        let progress = rotation.progress(now);
        if progress < 1.0 {
            rotation.pose(cube, rotation.easing.evaluate(progress));
            return None;
        }

        let rotation = self.active.take()?;
        self.lock.release(rotation.mv.turn);
        match rotation.finish(cube) {
            Ok(()) => {
                log::debug!("{} committed", rotation.mv);
                Some(Ok(Completion {
                    mv: rotation.mv,
                    source: rotation.source,
                }))
            }
            Err(err) => {
                // back to the pre-turn pose, which the untouched index still describes
                rotation.pose(cube, 0.0);
                log::error!("{} failed to commit, rolled back: {err}", rotation.mv);
                Some(Err(err))
            }
        }
    }

    pub fn lock(&self) -> &AnimationLock {
        &self.lock
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    pub fn active_move(&self) -> Option<Move> {
        self.active.as_ref().map(|rotation| rotation.mv)
    }
}
