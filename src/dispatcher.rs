//! The controller: owns the cube and everything that decides whether a
//! move may start, and drives scripted sequences one frame at a time.
//!
//! The owner calls [`Controller::tick`] every frame with the current time.
//! A tick advances the in-flight rotation, books its completion in the
//! ledger and starts the next scripted move once the script delay has
//! passed.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::build_cube;
use crate::config::Config;
use crate::error::CubeError;
use crate::faces::{Direction, Move, Turn};
use crate::ledger::{HistoryExport, Ledger, MoveRecord, Source};
use crate::lock::{AnimationLock, Debounce, Rejection};
use crate::rotation::{Completion, RotationEngine, Start};
use crate::CubeOps;

/// Outcome of a move request.
#[derive(Debug)]
pub enum Dispatch {
    Started,
    /// Dropped without side effects.
    Rejected(Rejection),
    /// The turn could not start; nothing moved.
    Aborted(CubeError),
}

impl Dispatch {
    pub fn is_started(&self) -> bool {
        matches!(self, Dispatch::Started)
    }
}

/// Outcome of asking for an auto-solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStart {
    /// Reversing `moves` undo entries.
    Started { moves: usize },
    /// The undo list was empty.
    AlreadySolved,
    AlreadyRunning,
}

#[derive(Debug, Clone)]
enum Steps {
    /// Fixed random moves.
    Scramble(VecDeque<Move>),
    /// Reverses the newest undo entry until the list is empty.
    Solve,
}

#[derive(Debug, Clone)]
struct Script {
    steps: Steps,
    /// Earliest time the next step may start.
    next_at: Instant,
}

impl Script {
    fn source(&self) -> Source {
        match self.steps {
            Steps::Scramble(_) => Source::Scramble,
            Steps::Solve => Source::Solve,
        }
    }
}

pub struct Controller {
    cube: Box<dyn CubeOps>,
    engine: RotationEngine,
    ledger: Ledger,
    debounce: Debounce,
    script: Option<Script>,
    move_count: usize,
    config: Config,
    rng: StdRng,
}

impl Controller {
    /// Builds a controller around a solved cube of edge `size` (2 or 4).
    pub fn new(size: usize, config: Config) -> Result<Self, CubeError> {
        Self::with_rng(size, config, StdRng::from_os_rng())
    }

    /// Same as [`Controller::new`] but with reproducible scrambles.
    pub fn with_seed(size: usize, config: Config, seed: u64) -> Result<Self, CubeError> {
        Self::with_rng(size, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(size: usize, config: Config, rng: StdRng) -> Result<Self, CubeError> {
        config.validate()?;
        let cube = build_cube(size, config.spacing, config.epsilon)?;
        log::info!("built {size}x{size}x{size} cube");
        Ok(Self {
            cube,
            engine: RotationEngine::new(config.rotation_duration(), config.easing),
            ledger: Ledger::new(config.history_capacity),
            debounce: Debounce::new(config.debounce_interval()),
            script: None,
            move_count: 0,
            config,
            rng,
        })
    }

    /// Requests a move.
    ///
    /// Interactive sources (`user`, `undo`) are gated on auto-solve, on any
    /// face animating and on the debounce, in that order. Every source then
    /// needs its own turn idle and no other rotation in flight.
    pub fn dispatch(&mut self, mv: Move, source: Source, now: Instant) -> Dispatch {
        let dim = self.cube.dim();
        if !mv.turn.supported_by(dim) {
            let err = CubeError::UnsupportedTurn { turn: mv.turn, size: dim };
            log::warn!("{mv} ({source}) aborted: {err}");
            return Dispatch::Aborted(err);
        }

        if source.is_interactive() {
            let gate = if self.is_auto_solving() {
                Some(Rejection::AutoSolveActive)
            } else if self.engine.lock().any_animating() {
                Some(Rejection::AnyFaceAnimating)
            } else if !self.debounce.try_accept(now) {
                Some(Rejection::Debounced)
            } else {
                None
            };
            if let Some(rejection) = gate {
                log::debug!("{mv} ({source}) rejected: {rejection}");
                return Dispatch::Rejected(rejection);
            }
        }

        match self.engine.rotate(self.cube.as_mut(), mv, source, now) {
            Ok(Start::Started) => Dispatch::Started,
            Ok(Start::Ignored(rejection)) => Dispatch::Rejected(rejection),
            Err(err) => Dispatch::Aborted(err),
        }
    }

    /// Advances the current frame. Returns the move that completed on this
    /// frame, if any.
    pub fn tick(&mut self, now: Instant) -> Option<Completion> {
        let completed = match self.engine.advance(self.cube.as_mut(), now) {
            Some(Ok(completion)) => {
                self.complete(completion, now);
                Some(completion)
            }
            Some(Err(err)) => {
                if self.script.take().is_some() {
                    log::warn!("script stopped after failed rotation: {err}");
                }
                None
            }
            None => None,
        };
        self.drive_script(now);
        completed
    }

    fn complete(&mut self, completion: Completion, now: Instant) {
        let Completion { mv, source } = completion;
        if source.consumes_undo() {
            if self.ledger.next_reversal() == Some(mv) {
                self.ledger.pop_undo();
            } else {
                // not a reversal of the newest entry, so it has to stay undoable
                log::warn!("{mv} ({source}) does not reverse the last move, keeping it in the undo list");
                self.ledger.push_undo(mv);
            }
        }
        self.ledger.record(mv, source);
        if source == Source::User {
            self.move_count += 1;
        }
        log::info!("{mv} ({source}) completed");

        if let Some(script) = &mut self.script {
            if script.source() == source {
                script.next_at = now + self.config.script_delay();
            }
        }
    }

    fn drive_script(&mut self, now: Instant) {
        if !self.engine.is_idle() {
            return;
        }
        let Some(script) = &mut self.script else {
            return;
        };
        if now < script.next_at {
            return;
        }

        let next = match &mut script.steps {
            Steps::Scramble(moves) => moves.pop_front(),
            Steps::Solve => self.ledger.next_reversal(),
        };
        let source = script.source();
        let Some(mv) = next else {
            self.script = None;
            if source == Source::Solve {
                self.ledger.clear_all();
            }
            log::info!("{source} finished");
            return;
        };

        match self.dispatch(mv, source, now) {
            Dispatch::Started => {}
            Dispatch::Rejected(rejection) => {
                log::warn!("scripted {mv} rejected: {rejection}");
                if let Some(Script { steps: Steps::Scramble(moves), .. }) = &mut self.script {
                    moves.push_front(mv);
                }
            }
            Dispatch::Aborted(err) => {
                log::error!("{source} stopped: {err}");
                self.script = None;
            }
        }
    }

    /// Queues `scramble_length` random moves, cancelling any auto-solve.
    pub fn scramble(&mut self, now: Instant) {
        self.stop_auto_solve();
        let turns = Turn::all_for(self.cube.dim());
        let moves: VecDeque<Move> = (0..self.config.scramble_length)
            .map(|_| {
                let turn = turns[self.rng.random_range(0..turns.len())];
                let direction = if self.rng.random_bool(0.5) {
                    Direction::Normal
                } else {
                    Direction::Reverse
                };
                Move::new(turn, direction)
            })
            .collect();
        log::info!("scramble queued: {} moves", moves.len());
        self.script = Some(Script {
            steps: Steps::Scramble(moves),
            next_at: now,
        });
        self.drive_script(now);
    }

    /// Starts reversing the undo list.
    pub fn auto_solve(&mut self, now: Instant) -> SolveStart {
        if self.is_auto_solving() {
            return SolveStart::AlreadyRunning;
        }
        let moves = self.ledger.undo_moves().len();
        if moves == 0 {
            log::info!("auto-solve: nothing to reverse");
            return SolveStart::AlreadySolved;
        }
        log::info!("auto-solve queued: {moves} moves");
        self.script = Some(Script {
            steps: Steps::Solve,
            next_at: now,
        });
        self.drive_script(now);
        SolveStart::Started { moves }
    }

    /// Drops queued auto-solve moves. A rotation already in flight finishes
    /// and is booked normally.
    pub fn stop_auto_solve(&mut self) {
        if self.is_auto_solving() {
            self.script = None;
            log::info!("auto-solve stopped");
        }
    }

    /// Reverses the newest undo entry, gated like a user move.
    pub fn undo_last(&mut self, now: Instant) -> Dispatch {
        match self.ledger.next_reversal() {
            Some(mv) => self.dispatch(mv, Source::Undo, now),
            None => Dispatch::Rejected(Rejection::NothingToUndo),
        }
    }

    /// Returns every cubelet home, zeroes the counter and forgets the undo
    /// list. The analytical history is kept. Refused mid-rotation.
    pub fn reset(&mut self) -> bool {
        if !self.engine.is_idle() {
            log::warn!("reset refused: {}", Rejection::RotationInFlight);
            return false;
        }
        self.script = None;
        self.cube.reset();
        self.move_count = 0;
        self.ledger.clear();
        log::info!("cube reset");
        true
    }

    /// Ticks in `frame` steps from `start` until no rotation or script is
    /// pending. Returns the time of the last tick.
    pub fn run_until_idle(&mut self, start: Instant, frame: Duration) -> Instant {
        let frame = frame.max(Duration::from_millis(1));
        let mut now = start;
        self.tick(now);
        while !self.is_idle() {
            now += frame;
            self.tick(now);
        }
        now
    }

    /// Dispatches `moves` one after another, each once the previous has
    /// completed and the debounce has lapsed. Returns the time of the last
    /// tick.
    pub fn apply_sequence(
        &mut self,
        moves: &[Move],
        source: Source,
        start: Instant,
    ) -> Result<Instant, CubeError> {
        let frame = Duration::from_millis(16);
        let gap = self.config.debounce_interval();
        let mut now = self.run_until_idle(start, frame);
        let mut last_start: Option<Instant> = None;
        for &mv in moves {
            if let Some(last) = last_start {
                now = now.max(last + gap);
            }
            match self.dispatch(mv, source, now) {
                Dispatch::Started => {}
                Dispatch::Rejected(rejection) => {
                    log::warn!("{mv} skipped: {rejection}");
                    continue;
                }
                Dispatch::Aborted(err) => return Err(err),
            }
            last_start = Some(now);
            now = self.run_until_idle(now, frame);
        }
        Ok(now)
    }

    /// No rotation in flight and no script queued.
    pub fn is_idle(&self) -> bool {
        self.engine.is_idle() && self.script.is_none()
    }

    pub fn is_auto_solving(&self) -> bool {
        matches!(self.script, Some(Script { steps: Steps::Solve, .. }))
    }

    pub fn is_scrambling(&self) -> bool {
        matches!(self.script, Some(Script { steps: Steps::Scramble(_), .. }))
    }

    /// Completed user moves since the last reset.
    pub fn move_count(&self) -> usize {
        self.move_count
    }

    pub fn cube(&self) -> &dyn CubeOps {
        self.cube.as_ref()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn lock(&self) -> &AnimationLock {
        self.engine.lock()
    }

    pub fn active_move(&self) -> Option<Move> {
        self.engine.active_move()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The analytical history together with the cube it left behind.
    pub fn export(&self, exported_at_ms: u64) -> HistoryExport {
        self.ledger.export(exported_at_ms, self.cube.as_ref())
    }

    /// Builds a fresh cube of the exported size and applies the exported
    /// history to it as scramble moves.
    pub fn replay(export: &HistoryExport, config: Config, now: Instant) -> Result<Self, CubeError> {
        let mut controller = Self::new(export.size, config)?;
        let moves: Vec<Move> = export.history.iter().map(MoveRecord::as_move).collect();
        controller.apply_sequence(&moves, Source::Scramble, now)?;
        log::info!("replayed {} moves", moves.len());
        Ok(controller)
    }

    /// Whether the cube sits where `export` says the exported one ended.
    pub fn matches_export(&self, export: &HistoryExport) -> bool {
        self.cube.dim() == export.size && self.cube.index() == export.final_index.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faces::parse_sequence;

    const FRAME: Duration = Duration::from_millis(16);

    fn fast_config() -> Config {
        Config {
            rotation_ms: 50,
            debounce_ms: 60,
            script_delay_ms: 10,
            scramble_length: 12,
            ..Config::default()
        }
    }

    fn controller(size: usize) -> Controller {
        Controller::with_seed(size, fast_config(), 7).unwrap()
    }

    fn mv(notation: &str) -> Move {
        notation.parse().unwrap()
    }

    #[test]
    fn test_r_sends_urf_corner_to_drf() {
        let mut ctl = controller(2);
        let urf = ctl.cube().occupant((1, 1, 1));
        let start = Instant::now();
        assert!(ctl.dispatch(mv("R"), Source::User, start).is_started());
        ctl.run_until_idle(start, FRAME);

        assert_eq!(ctl.cube().occupant((1, 0, 1)), urf);
        assert_eq!(ctl.move_count(), 1);
        assert_eq!(ctl.ledger().undo_moves(), &[mv("R")]);
    }

    #[test]
    fn test_same_face_while_animating_records_once() {
        let mut ctl = controller(2);
        let start = Instant::now();
        assert!(ctl.dispatch(mv("R"), Source::Scramble, start).is_started());
        let second = ctl.dispatch(mv("R"), Source::Scramble, start + FRAME);
        assert!(matches!(second, Dispatch::Rejected(Rejection::FaceAnimating)));
        ctl.run_until_idle(start + FRAME, FRAME);
        assert_eq!(ctl.ledger().history_len(), 1);
    }

    #[test]
    fn test_debounce_yields_one_record() {
        let mut ctl = controller(4);
        let start = Instant::now();
        assert!(ctl.dispatch(mv("U"), Source::User, start).is_started());
        // finish the turn inside the debounce window
        let now = ctl.run_until_idle(start, Duration::from_millis(5));
        assert!(now < start + Duration::from_millis(60));
        let second = ctl.dispatch(mv("F"), Source::User, now);
        assert!(matches!(second, Dispatch::Rejected(Rejection::Debounced)));
        ctl.run_until_idle(now, FRAME);
        assert_eq!(ctl.ledger().history_len(), 1);
    }

    #[test]
    fn test_user_input_blocked_while_any_face_animates() {
        let mut ctl = controller(4);
        let start = Instant::now();
        assert!(ctl.dispatch(mv("U"), Source::User, start).is_started());
        let later = start + Duration::from_millis(100);
        assert!(matches!(
            ctl.dispatch(mv("Rw"), Source::User, later),
            Dispatch::Rejected(Rejection::AnyFaceAnimating)
        ));
    }

    #[test]
    fn test_unsupported_turn_is_aborted() {
        let mut ctl = controller(2);
        let result = ctl.dispatch(mv("r"), Source::User, Instant::now());
        assert!(matches!(result, Dispatch::Aborted(CubeError::UnsupportedTurn { .. })));
        assert!(ctl.is_idle());
    }

    #[test]
    fn test_bijection_holds_under_random_sequences() {
        for size in [2, 4] {
            let mut ctl = controller(size);
            let mut rng = StdRng::seed_from_u64(42);
            let turns = Turn::all_for(size);
            let mut now = Instant::now();
            for _ in 0..40 {
                let turn = turns[rng.random_range(0..turns.len())];
                let direction = if rng.random_bool(0.5) {
                    Direction::Normal
                } else {
                    Direction::Reverse
                };
                assert!(ctl.dispatch(Move::new(turn, direction), Source::Scramble, now).is_started());
                now = ctl.run_until_idle(now, FRAME);
                assert!(ctl.cube().is_bijection(), "bijection broken on {size}");
            }
        }
    }

    #[test]
    fn test_fuzzed_dispatch_never_overlaps() {
        let mut ctl = controller(4);
        let mut rng = StdRng::seed_from_u64(3);
        let turns = Turn::all_for(4);
        let sources = [Source::User, Source::Scramble, Source::Undo];
        let mut now = Instant::now();
        for _ in 0..500 {
            now += Duration::from_millis(rng.random_range(0..30));
            let turn = turns[rng.random_range(0..turns.len())];
            let source = sources[rng.random_range(0..sources.len())];
            let _ = ctl.dispatch(Move::new(turn, Direction::Normal), source, now);
            ctl.tick(now);
            assert!(ctl.lock().animating_count() <= 1);
        }
        ctl.run_until_idle(now, FRAME);
        assert!(ctl.cube().is_bijection());
    }

    #[test]
    fn test_apply_then_undo_sequence_restores_index() {
        let mut ctl = controller(4);
        let solved = ctl.cube().index().to_vec();
        let moves = parse_sequence("R U' Fw l B' d r' Lw").unwrap();
        let now = ctl.apply_sequence(&moves, Source::User, Instant::now()).unwrap();
        assert_ne!(ctl.cube().index(), solved.as_slice());

        let undo = ctl.ledger().undo_sequence();
        assert_eq!(undo.len(), moves.len());
        ctl.apply_sequence(&undo, Source::Solve, now).unwrap();
        assert_eq!(ctl.cube().index(), solved.as_slice());
        assert!(ctl.cube().is_solved());
    }

    #[test]
    fn test_scramble_then_auto_solve() {
        let mut ctl = controller(2);
        let start = Instant::now();
        ctl.scramble(start);
        assert!(ctl.is_scrambling());
        let now = ctl.run_until_idle(start, FRAME);
        assert_eq!(ctl.ledger().undo_moves().len(), 12);
        assert_eq!(ctl.move_count(), 0, "scramble moves are not player moves");

        assert_eq!(ctl.auto_solve(now), SolveStart::Started { moves: 12 });
        assert!(matches!(
            ctl.dispatch(mv("R"), Source::User, now + Duration::from_secs(1)),
            Dispatch::Rejected(Rejection::AutoSolveActive)
        ));
        ctl.run_until_idle(now, FRAME);

        assert!(ctl.cube().is_solved());
        assert!(ctl.ledger().undo_moves().is_empty());
        assert_eq!(ctl.ledger().history_len(), 0);
    }

    #[test]
    fn test_stop_auto_solve_leaves_exact_undo_list() {
        let mut ctl = controller(4);
        let moves = parse_sequence("R U F").unwrap();
        let now = ctl.apply_sequence(&moves, Source::User, Instant::now()).unwrap();

        ctl.auto_solve(now);
        // let the first reversal (F') complete, then stop
        let mut t = now;
        while ctl.ledger().undo_moves().len() == 3 {
            t += FRAME;
            ctl.tick(t);
        }
        ctl.stop_auto_solve();
        ctl.run_until_idle(t, FRAME);
        assert_eq!(ctl.ledger().undo_moves(), parse_sequence("R U").unwrap().as_slice());

        // a fresh auto-solve picks up where the old one stopped
        ctl.auto_solve(t);
        ctl.run_until_idle(t, FRAME);
        assert!(ctl.cube().is_solved());
    }

    #[test]
    fn test_auto_solve_on_empty_undo_list() {
        let mut ctl = controller(2);
        assert_eq!(ctl.auto_solve(Instant::now()), SolveStart::AlreadySolved);
        assert!(!ctl.is_auto_solving());
    }

    #[test]
    fn test_undo_last_reverses_newest_move() {
        let mut ctl = controller(2);
        let moves = parse_sequence("R U").unwrap();
        let now = ctl.apply_sequence(&moves, Source::User, Instant::now()).unwrap();
        let later = now + Duration::from_secs(1);
        assert!(ctl.undo_last(later).is_started());
        ctl.run_until_idle(later, FRAME);
        assert_eq!(ctl.ledger().undo_moves(), &[mv("R")]);
        // undo moves are not booked in the analytical history
        assert_eq!(ctl.ledger().history_len(), 2);
    }

    #[test]
    fn test_stray_undo_move_stays_undoable() {
        let mut ctl = controller(2);
        let now = ctl
            .apply_sequence(&parse_sequence("U").unwrap(), Source::User, Instant::now())
            .unwrap();
        let later = now + Duration::from_secs(1);
        // R does not reverse U, so U must not be dropped from the undo list
        assert!(ctl.dispatch(mv("R"), Source::Undo, later).is_started());
        let now = ctl.run_until_idle(later, FRAME);
        assert_eq!(ctl.ledger().undo_moves(), parse_sequence("U R").unwrap().as_slice());
        assert!(!ctl.cube().is_solved());

        assert_eq!(ctl.auto_solve(now), SolveStart::Started { moves: 2 });
        ctl.run_until_idle(now, FRAME);
        assert!(ctl.cube().is_solved());
    }

    #[test]
    fn test_replay_matches_plain_session() {
        let mut ctl = controller(4);
        let moves = parse_sequence("Rw U' f D D").unwrap();
        ctl.apply_sequence(&moves, Source::User, Instant::now()).unwrap();
        let export = ctl.export(0);
        assert_eq!(export.size, 4);

        let replayed = Controller::replay(&export, fast_config(), Instant::now()).unwrap();
        assert!(replayed.matches_export(&export));
        assert_eq!(replayed.cube().index(), ctl.cube().index());
    }

    #[test]
    fn test_replay_reports_undo_and_reset_divergence() {
        let mut ctl = controller(2);
        let start = ctl
            .apply_sequence(&parse_sequence("R U").unwrap(), Source::User, Instant::now())
            .unwrap();
        let later = start + Duration::from_secs(1);
        assert!(ctl.undo_last(later).is_started());
        ctl.run_until_idle(later, FRAME);

        // the history keeps R U, the cube only carries R
        let export = ctl.export(0);
        assert_eq!(export.total_moves, 2);
        let replayed = Controller::replay(&export, fast_config(), Instant::now()).unwrap();
        assert!(!replayed.matches_export(&export));

        assert!(ctl.reset());
        let export = ctl.export(0);
        let replayed = Controller::replay(&export, fast_config(), Instant::now()).unwrap();
        assert!(!replayed.matches_export(&export));
        assert!(export.final_index.iter().enumerate().all(|(slot, &id)| slot == id));
    }

    #[test]
    fn test_controller_rejects_invalid_config() {
        let config = Config {
            spacing: 0.0,
            ..fast_config()
        };
        assert!(matches!(
            Controller::new(2, config),
            Err(CubeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_replay_rejects_unknown_size() {
        let mut export = controller(2).export(0);
        export.size = 3;
        assert!(matches!(
            Controller::replay(&export, fast_config(), Instant::now()),
            Err(CubeError::UnsupportedSize(3))
        ));
    }

    #[test]
    fn test_undo_with_nothing_to_undo() {
        let mut ctl = controller(2);
        assert!(matches!(
            ctl.undo_last(Instant::now()),
            Dispatch::Rejected(Rejection::NothingToUndo)
        ));
    }

    #[test]
    fn test_reset_keeps_history() {
        let mut ctl = controller(4);
        let moves = parse_sequence("R u").unwrap();
        let now = ctl.apply_sequence(&moves, Source::User, Instant::now()).unwrap();
        assert!(ctl.dispatch(mv("F"), Source::Scramble, now).is_started());
        assert!(!ctl.reset(), "reset must wait for the rotation");
        ctl.run_until_idle(now, FRAME);

        assert!(ctl.reset());
        assert!(ctl.cube().is_solved());
        assert_eq!(ctl.move_count(), 0);
        assert!(ctl.ledger().undo_moves().is_empty());
        assert_eq!(ctl.ledger().history_len(), 3);
    }
}
