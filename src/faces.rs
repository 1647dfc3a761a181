//! Face and layer identifiers, turn descriptors and move notation.
//!
//! Notation is `<FACE>[w][']`:
//! - `R` turns the outer right face,
//! - `r` turns the single inner layer next to it (4x4x4 only),
//! - `Rw` turns both of them together (4x4x4 only),
//! - a trailing `'` reverses the direction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CubeError;
use crate::geometry::{quarter_angle, Axis};

/// The six faces of a cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Face {
    U,
    D,
    L,
    R,
    F,
    B,
}

impl Face {
    pub const ALL: [Face; 6] = [Face::U, Face::D, Face::L, Face::R, Face::F, Face::B];

    /// Axis the face turns around.
    pub const fn axis(self) -> Axis {
        match self {
            Face::U | Face::D => Axis::Y,
            Face::L | Face::R => Axis::X,
            Face::F | Face::B => Axis::Z,
        }
    }

    /// `+1` when the face sits on the positive end of its axis.
    pub const fn side(self) -> i32 {
        match self {
            Face::U | Face::R | Face::F => 1,
            Face::D | Face::L | Face::B => -1,
        }
    }

    /// Sign of the normal-direction quarter turn about the positive axis.
    pub const fn base_direction(self) -> i32 {
        match self {
            Face::U | Face::L | Face::F => -1,
            Face::D | Face::R | Face::B => 1,
        }
    }

    pub const fn letter(self) -> char {
        match self {
            Face::U => 'U',
            Face::D => 'D',
            Face::L => 'L',
            Face::R => 'R',
            Face::F => 'F',
            Face::B => 'B',
        }
    }

    fn from_letter(letter: char) -> Option<Self> {
        Face::ALL
            .into_iter()
            .find(|face| face.letter() == letter.to_ascii_uppercase())
    }
}

/// How deep into the cube a turn reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    /// The outer face layer.
    Outer,
    /// The single layer directly behind the outer face.
    Inner,
    /// Outer and inner layers turned together.
    Wide,
}

impl Layer {
    pub const ALL: [Layer; 3] = [Layer::Outer, Layer::Inner, Layer::Wide];

    /// Layer depths counted from the face, 0 being the outer layer.
    pub const fn depths(self) -> &'static [usize] {
        match self {
            Layer::Outer => &[0],
            Layer::Inner => &[1],
            Layer::Wide => &[0, 1],
        }
    }
}

/// A turnable group of cubelets: a face plus a layer depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Turn {
    pub face: Face,
    pub layer: Layer,
}

/// One band of a turn: the grid index along the axis and its world coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub index: usize,
    pub value: f32,
}

/// Static geometry of a turn on a particular cube.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    pub axis: Axis,
    pub bands: Vec<Band>,
    pub base_direction: i32,
}

impl Turn {
    /// Number of distinct turn identifiers (6 faces x 3 layers).
    pub const COUNT: usize = 18;

    pub const fn new(face: Face, layer: Layer) -> Self {
        Self { face, layer }
    }

    pub const fn outer(face: Face) -> Self {
        Self::new(face, Layer::Outer)
    }

    /// Dense index for fixed-size per-turn tables.
    #[inline]
    pub const fn index(self) -> usize {
        self.face as usize * Layer::ALL.len() + self.layer as usize
    }

    /// Whether every layer of this turn exists on a `dim`-sized cube without
    /// reaching the opposite half.
    pub fn supported_by(self, dim: usize) -> bool {
        self.layer.depths().iter().all(|&depth| depth < dim / 2)
    }

    /// All turns a `dim`-sized cube supports, in a stable order.
    pub fn all_for(dim: usize) -> Vec<Turn> {
        Layer::ALL
            .into_iter()
            .flat_map(|layer| Face::ALL.into_iter().map(move |face| Turn::new(face, layer)))
            .filter(|turn| turn.supported_by(dim))
            .collect()
    }

    /// Axis, bands and base direction of this turn on a `dim` cube with the
    /// given slot spacing.
    pub fn descriptor(self, dim: usize, spacing: f32) -> Descriptor {
        let axis = self.face.axis();
        let bands = self
            .layer
            .depths()
            .iter()
            .map(|&depth| {
                let index = if self.face.side() > 0 {
                    dim - 1 - depth
                } else {
                    depth
                };
                // doubled centred coordinate of this grid index
                let doubled = 2 * index as i32 - (dim as i32 - 1);
                Band {
                    index,
                    value: doubled as f32 * spacing / 2.0,
                }
            })
            .collect();
        Descriptor {
            axis,
            bands,
            base_direction: self.face.base_direction(),
        }
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = self.face.letter();
        match self.layer {
            Layer::Outer => write!(f, "{letter}"),
            Layer::Inner => write!(f, "{}", letter.to_ascii_lowercase()),
            Layer::Wide => write!(f, "{letter}w"),
        }
    }
}

/// Turn direction, numbered the way the input layer reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Direction {
    Normal = 1,
    Reverse = 2,
}

impl Direction {
    pub const fn inverse(self) -> Self {
        match self {
            Direction::Normal => Direction::Reverse,
            Direction::Reverse => Direction::Normal,
        }
    }
}

impl From<Direction> for u8 {
    fn from(direction: Direction) -> u8 {
        direction as u8
    }
}

impl TryFrom<u8> for Direction {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Direction::Normal),
            2 => Ok(Direction::Reverse),
            other => Err(format!("direction must be 1 or 2, got {other}")),
        }
    }
}

/// A turn together with its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub turn: Turn,
    pub direction: Direction,
}

impl Move {
    pub const fn new(turn: Turn, direction: Direction) -> Self {
        Self { turn, direction }
    }

    pub const fn inverse(self) -> Self {
        Self::new(self.turn, self.direction.inverse())
    }

    /// Signed target angle in radians about the positive turn axis.
    pub fn angle(self) -> f32 {
        let reverse = match self.direction {
            Direction::Normal => 1,
            Direction::Reverse => -1,
        };
        quarter_angle(self.turn.face.base_direction() * reverse)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.turn)?;
        if self.direction == Direction::Reverse {
            write!(f, "'")?;
        }
        Ok(())
    }
}

impl FromStr for Turn {
    type Err = CubeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CubeError::Notation(s.to_string());
        let mut chars = s.chars();
        let letter = chars.next().ok_or_else(invalid)?;
        let face = Face::from_letter(letter).ok_or_else(invalid)?;
        let layer = match (letter.is_ascii_lowercase(), chars.as_str()) {
            (false, "") => Layer::Outer,
            (false, "w") => Layer::Wide,
            (true, "") => Layer::Inner,
            _ => return Err(invalid()),
        };
        Ok(Turn::new(face, layer))
    }
}

impl FromStr for Move {
    type Err = CubeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (body, direction) = match s.strip_suffix('\'') {
            Some(body) => (body, Direction::Reverse),
            None => (s, Direction::Normal),
        };
        let turn = body
            .parse::<Turn>()
            .map_err(|_| CubeError::Notation(s.to_string()))?;
        Ok(Move::new(turn, direction))
    }
}

/// Parses a whitespace-separated move sequence.
pub fn parse_sequence(text: &str) -> Result<Vec<Move>, CubeError> {
    text.split_whitespace().map(str::parse).collect()
}

/// Formats moves as a space-separated sequence.
pub fn format_sequence(moves: &[Move]) -> String {
    moves
        .iter()
        .map(Move::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns the opposite-direction notation for a single move.
pub fn invert(notation: &str) -> Result<String, CubeError> {
    Ok(notation.parse::<Move>()?.inverse().to_string())
}

impl Serialize for Turn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Turn {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notation_roundtrip_for_every_turn() {
        for turn in Turn::all_for(4) {
            for direction in [Direction::Normal, Direction::Reverse] {
                let mv = Move::new(turn, direction);
                let parsed: Move = mv.to_string().parse().unwrap();
                assert_eq!(parsed, mv, "notation {mv} did not parse back");
            }
        }
    }

    #[test]
    fn test_notation_forms() {
        assert_eq!("R".parse::<Turn>().unwrap(), Turn::outer(Face::R));
        assert_eq!("r".parse::<Turn>().unwrap(), Turn::new(Face::R, Layer::Inner));
        assert_eq!("Uw".parse::<Turn>().unwrap(), Turn::new(Face::U, Layer::Wide));
        assert!("rw".parse::<Turn>().is_err());
        assert!("X".parse::<Turn>().is_err());
        assert!("".parse::<Move>().is_err());
        assert!("R''".parse::<Move>().is_err());
    }

    #[test]
    fn test_invert_toggles_suffix() {
        assert_eq!(invert("R").unwrap(), "R'");
        assert_eq!(invert("Fw'").unwrap(), "Fw");
        assert_eq!(invert("d").unwrap(), "d'");
        assert!(invert("Q").is_err());
    }

    #[test]
    fn test_pocket_cube_supports_outer_turns_only() {
        let turns = Turn::all_for(2);
        assert_eq!(turns.len(), 6);
        assert!(turns.iter().all(|turn| turn.layer == Layer::Outer));
        assert_eq!(Turn::all_for(4).len(), Turn::COUNT);
    }

    #[test]
    fn test_turn_indices_are_dense() {
        let mut seen = [false; Turn::COUNT];
        for turn in Turn::all_for(4) {
            assert!(!seen[turn.index()], "duplicate index for {turn}");
            seen[turn.index()] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_descriptor_bands() {
        let right = Turn::outer(Face::R).descriptor(4, 1.0);
        assert_eq!(right.axis, Axis::X);
        assert_eq!(right.bands, vec![Band { index: 3, value: 1.5 }]);

        let inner_down = Turn::new(Face::D, Layer::Inner).descriptor(4, 1.0);
        assert_eq!(inner_down.bands, vec![Band { index: 1, value: -0.5 }]);

        let wide_front = Turn::new(Face::F, Layer::Wide).descriptor(4, 1.0);
        assert_eq!(wide_front.bands.len(), 2);
        assert_eq!(wide_front.base_direction, -1);

        let pocket_up = Turn::outer(Face::U).descriptor(2, 1.1);
        assert!((pocket_up.bands[0].value - 0.55).abs() < 1e-6);
    }

    #[test]
    fn test_move_angle_sign() {
        let r = Move::new(Turn::outer(Face::R), Direction::Normal);
        assert!(r.angle() > 0.0);
        assert!(r.inverse().angle() < 0.0);
        let l = Move::new(Turn::outer(Face::L), Direction::Normal);
        assert!(l.angle() < 0.0);
    }

    #[test]
    fn test_sequence_formatting() {
        let moves = parse_sequence("R U' Fw  b").unwrap();
        assert_eq!(moves.len(), 4);
        assert_eq!(format_sequence(&moves), "R U' Fw b");
    }
}
