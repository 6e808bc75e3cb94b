use crate::utils::error::{Result, SessionError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Grid cell on the resource field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(&self, other: &Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// One grid step towards `target`, x axis first. `None` when already there.
    pub fn step_toward(&self, target: &Position) -> Option<Direction> {
        if self.x < target.x {
            Some(Direction::East)
        } else if self.x > target.x {
            Some(Direction::West)
        } else if self.y < target.y {
            Some(Direction::South)
        } else if self.y > target.y {
            Some(Direction::North)
        } else {
            None
        }
    }

    pub fn offset(&self, direction: Direction) -> Position {
        match direction {
            Direction::North => Position::new(self.x, self.y - 1),
            Direction::South => Position::new(self.x, self.y + 1),
            Direction::East => Position::new(self.x + 1, self.y),
            Direction::West => Position::new(self.x - 1, self.y),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OreKind {
    Copper,
    Iron,
    Mithril,
    /// Looks like ore on a frame but yields nothing.
    Rock,
}

impl OreKind {
    pub const ALL: [OreKind; 4] = [OreKind::Copper, OreKind::Iron, OreKind::Mithril, OreKind::Rock];

    pub fn is_ore(&self) -> bool {
        !matches!(self, OreKind::Rock)
    }

    /// Reference (hue, brightness) signature a clean frame would show.
    pub fn signature(&self) -> (f32, f32) {
        match self {
            OreKind::Copper => (0.08, 0.55),
            OreKind::Iron => (0.02, 0.35),
            OreKind::Mithril => (0.60, 0.85),
            OreKind::Rock => (0.12, 0.45),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OreKind::Copper => "copper",
            OreKind::Iron => "iron",
            OreKind::Mithril => "mithril",
            OreKind::Rock => "rock",
        }
    }
}

/// Raw feature blob as captured from a frame, before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    pub position: Position,
    pub hue: f32,
    pub brightness: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub tick: u64,
    pub width: i32,
    pub height: i32,
    pub agent: Position,
    pub stamina: u32,
    pub blobs: Vec<Blob>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub position: Position,
    pub kind: OreKind,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub tick: u64,
    pub agent: Position,
    pub stamina: u32,
    pub detections: Vec<Detection>,
}

impl Observation {
    pub fn sees(&self, position: &Position) -> bool {
        self.detections.iter().any(|d| d.position == *position)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionPlan {
    Move { to: Position },
    Mine { at: Position },
    Rest,
    Scan,
}

impl ActionPlan {
    pub fn kind(&self) -> &'static str {
        match self {
            ActionPlan::Move { .. } => "move",
            ActionPlan::Mine { .. } => "mine",
            ActionPlan::Rest => "rest",
            ActionPlan::Scan => "scan",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Step(Direction),
    Swing,
    Rest,
    Idle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputStep {
    pub input: Input,
    pub hold: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSequence {
    pub steps: Vec<InputStep>,
}

impl InputSequence {
    pub fn total_hold(&self) -> Duration {
        self.steps.iter().map(|s| s.hold).sum()
    }
}

/// What the actuator reports back for a single input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEffect {
    Moved(Position),
    Blocked,
    SwingLanded { progress: u32 },
    Extracted(OreKind),
    NotOre,
    NothingThere,
    Exhausted,
    Rested { stamina: u32 },
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Moved { to: Position },
    Swung { progress: u32 },
    Extracted { kind: OreKind },
    NotOre,
    NothingThere,
    Exhausted,
    Rested { stamina: u32 },
    Idle,
}

impl ActionOutcome {
    /// `Some(success)` when this outcome ends a mining attempt.
    pub fn concludes_attempt(&self) -> Option<bool> {
        match self {
            ActionOutcome::Extracted { .. } => Some(true),
            ActionOutcome::NotOre | ActionOutcome::NothingThere => Some(false),
            _ => None,
        }
    }
}

impl From<InputEffect> for ActionOutcome {
    fn from(effect: InputEffect) -> Self {
        match effect {
            InputEffect::Moved(to) => ActionOutcome::Moved { to },
            InputEffect::Blocked | InputEffect::Idle => ActionOutcome::Idle,
            InputEffect::SwingLanded { progress } => ActionOutcome::Swung { progress },
            InputEffect::Extracted(kind) => ActionOutcome::Extracted { kind },
            InputEffect::NotOre => ActionOutcome::NotOre,
            InputEffect::NothingThere => ActionOutcome::NothingThere,
            InputEffect::Exhausted => ActionOutcome::Exhausted,
            InputEffect::Rested { stamina } => ActionOutcome::Rested { stamina },
        }
    }
}

/// Ore and Luno counters. `record_ore` is the only mutator so both always move together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OreLedger {
    ores_mined: u64,
    luno_earned: u64,
    luno_per_ore: u64,
}

impl OreLedger {
    pub fn new(luno_per_ore: u64) -> Self {
        Self {
            ores_mined: 0,
            luno_earned: 0,
            luno_per_ore,
        }
    }

    /// Fails without touching either counter if the Luno total would overflow.
    pub fn record_ore(&mut self) -> Result<()> {
        let luno_earned = self.luno_earned.checked_add(self.luno_per_ore).ok_or_else(|| {
            SessionError::simulation(format!(
                "Luno total overflowed after {} ores at {} per ore",
                self.ores_mined, self.luno_per_ore
            ))
        })?;
        self.ores_mined += 1;
        self.luno_earned = luno_earned;
        Ok(())
    }

    pub fn ores_mined(&self) -> u64 {
        self.ores_mined
    }

    pub fn luno_earned(&self) -> u64 {
        self.luno_earned
    }
}

impl Default for OreLedger {
    fn default() -> Self {
        Self::new(500)
    }
}
