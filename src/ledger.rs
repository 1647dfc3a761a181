//! Move bookkeeping: the undo list that auto-solve replays backwards and a
//! bounded analytical history of everything the player and scrambler did.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::cube::CubeletId;
use crate::faces::{Direction, Move, Turn};
use crate::CubeOps;

/// Records kept in the stats summary's `recent` list.
const RECENT_LEN: usize = 10;

/// Who asked for a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    User,
    Scramble,
    /// A step of auto-solve.
    Solve,
    /// A single interactive undo.
    Undo,
}

impl Source {
    /// Interactive sources pass through the debounce and the global gate.
    pub const fn is_interactive(self) -> bool {
        matches!(self, Source::User | Source::Undo)
    }

    /// Whether completed moves from this source are kept for reversal and
    /// analysis. Solve and undo moves reverse moves already logged.
    pub const fn is_logged(self) -> bool {
        matches!(self, Source::User | Source::Scramble)
    }

    /// Whether completing a move from this source consumes an undo entry.
    pub const fn consumes_undo(self) -> bool {
        matches!(self, Source::Solve | Source::Undo)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Source::User => "user",
            Source::Scramble => "scramble",
            Source::Solve => "solve",
            Source::Undo => "undo",
        })
    }
}

/// One completed move in the analytical history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub turn: Turn,
    pub direction: Direction,
    pub source: Source,
    /// Milliseconds since the Unix epoch at completion.
    pub timestamp_ms: u64,
    /// Monotonic per-ledger counter, starting at 1.
    pub sequence: u64,
}

impl MoveRecord {
    pub fn as_move(&self) -> Move {
        Move::new(self.turn, self.direction)
    }
}

/// Summary counts over the analytical history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total: usize,
    pub by_source: BTreeMap<Source, usize>,
    pub by_turn: BTreeMap<Turn, usize>,
    pub recent: Vec<MoveRecord>,
    /// Average over the span from first to last record; `None` until the
    /// span is non-zero.
    pub moves_per_minute: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub start_ms: Option<u64>,
    pub end_ms: Option<u64>,
    pub duration_ms: u64,
}

/// Serialisable snapshot of the analytical history.
///
/// `size` and `final_index` describe the cube at export time, so a replay
/// can tell whether the history alone reproduces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryExport {
    pub exported_at_ms: u64,
    pub size: usize,
    pub final_index: Vec<CubeletId>,
    pub total_moves: usize,
    pub history: Vec<MoveRecord>,
    pub stats: HistoryStats,
    pub session: SessionInfo,
}

/// Undo list plus bounded analytical history.
#[derive(Debug, Clone)]
pub struct Ledger {
    undo: Vec<Move>,
    history: VecDeque<MoveRecord>,
    capacity: usize,
    next_sequence: u64,
}

impl Ledger {
    pub fn new(capacity: usize) -> Self {
        Self {
            undo: Vec::new(),
            history: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            next_sequence: 1,
        }
    }

    /// Records a completed move stamped with the current wall-clock time.
    pub fn record(&mut self, mv: Move, source: Source) {
        self.record_at(mv, source, now_ms());
    }

    /// Records a completed move with an explicit timestamp.
    pub fn record_at(&mut self, mv: Move, source: Source, timestamp_ms: u64) {
        if !source.is_logged() {
            return;
        }
        self.undo.push(mv);

        if self.capacity == 0 {
            return;
        }
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(MoveRecord {
            turn: mv.turn,
            direction: mv.direction,
            source,
            timestamp_ms,
            sequence: self.next_sequence,
        });
        self.next_sequence += 1;
        log::debug!("history: {mv} ({source}), {} kept", self.history.len());
    }

    pub fn undo_moves(&self) -> &[Move] {
        &self.undo
    }

    pub fn history(&self) -> impl Iterator<Item = &MoveRecord> + '_ {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Moves that take the cube back to where the undo list began: newest
    /// first, each reversed.
    pub fn undo_sequence(&self) -> Vec<Move> {
        self.undo.iter().rev().map(|mv| mv.inverse()).collect()
    }

    /// Appends to the undo list without touching the analytical history.
    pub fn push_undo(&mut self, mv: Move) {
        self.undo.push(mv);
    }

    /// Removes and returns the newest undo entry.
    pub fn pop_undo(&mut self) -> Option<Move> {
        self.undo.pop()
    }

    /// The move that reverses the newest undo entry.
    pub fn next_reversal(&self) -> Option<Move> {
        self.undo.last().map(|mv| mv.inverse())
    }

    /// Forgets the undo list; the analytical history survives.
    pub fn clear(&mut self) {
        self.undo.clear();
    }

    pub fn clear_all(&mut self) {
        self.undo.clear();
        self.history.clear();
        log::info!("history cleared");
    }

    pub fn stats(&self) -> HistoryStats {
        let mut by_source = BTreeMap::new();
        let mut by_turn = BTreeMap::new();
        for record in &self.history {
            *by_source.entry(record.source).or_insert(0) += 1;
            *by_turn.entry(record.turn).or_insert(0) += 1;
        }

        let skip = self.history.len().saturating_sub(RECENT_LEN);
        let span_ms = self.session().duration_ms;
        let moves_per_minute =
            (span_ms > 0).then(|| self.history.len() as f64 * 60_000.0 / span_ms as f64);

        HistoryStats {
            total: self.history.len(),
            by_source,
            by_turn,
            recent: self.history.iter().skip(skip).copied().collect(),
            moves_per_minute,
        }
    }

    pub fn session(&self) -> SessionInfo {
        let start_ms = self.history.front().map(|record| record.timestamp_ms);
        let end_ms = self.history.back().map(|record| record.timestamp_ms);
        SessionInfo {
            start_ms,
            end_ms,
            duration_ms: match (start_ms, end_ms) {
                (Some(start), Some(end)) => end.saturating_sub(start),
                _ => 0,
            },
        }
    }

    pub fn export(&self, exported_at_ms: u64, cube: &dyn CubeOps) -> HistoryExport {
        HistoryExport {
            exported_at_ms,
            size: cube.dim(),
            final_index: cube.index().to_vec(),
            total_moves: self.history.len(),
            history: self.history.iter().copied().collect(),
            stats: self.stats(),
            session: self.session(),
        }
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(1000)
    }
}

/// Wall-clock milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
