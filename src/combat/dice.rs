//! Dice rolling system
//!
//! Parses and rolls formulas like "2d6+3", "d20", "15+1d6" or a plain "20".
//! Anything that does not parse rolls as a flat 1; this is relied upon by
//! callers that accept free-text formulas.

use std::collections::VecDeque;
use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;

/// Result of rolling a formula that could not be parsed
pub const FALLBACK_ROLL: i32 = 1;

/// Maximum assumed for a formula that could not be parsed
pub const FALLBACK_MAX: i32 = 6;

/// Upper bound on dice per roll and faces per die
const MAX_DICE: u32 = 1000;
const MAX_SIDES: u32 = 1_000_000;

static FLAT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[+-]?\d+$").unwrap());
static DICE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d*)d(\d+)(?:([+-])(\d+))?$").unwrap());
static OFFSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)([+-])(\d*)d(\d+)$").unwrap());

/// Source of randomness for every roll the engine makes
pub trait Roller: Send {
    /// Roll one die, uniform in `1..=sides`
    fn roll_die(&mut self, sides: u32) -> u32;

    /// Pick an index, uniform in `0..len`
    fn choose_index(&mut self, len: usize) -> usize;
}

/// Roller backed by a seedable standard RNG
pub struct RandomRoller {
    rng: StdRng,
}

impl RandomRoller {
    /// Create a roller seeded from the operating system
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Create a reproducible roller
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomRoller {
    fn default() -> Self {
        Self::new()
    }
}

impl Roller for RandomRoller {
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.rng.random_range(1..=sides.max(1))
    }

    fn choose_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.random_range(0..len)
    }
}

/// Roller that plays back a fixed script of values
///
/// Die rolls are clamped into `1..=sides` and indexes are taken modulo the
/// length. Once the script runs out the last value repeats (or 1 if the
/// script was empty).
#[derive(Debug, Clone, Default)]
pub struct ScriptedRoller {
    script: VecDeque<u32>,
    last: Option<u32>,
}

impl ScriptedRoller {
    /// Create a roller from the values to return, in order
    pub fn new(values: impl IntoIterator<Item = u32>) -> Self {
        Self {
            script: values.into_iter().collect(),
            last: None,
        }
    }

    fn next_value(&mut self) -> u32 {
        match self.script.pop_front() {
            Some(v) => {
                self.last = Some(v);
                v
            }
            None => self.last.unwrap_or(1),
        }
    }
}

impl Roller for ScriptedRoller {
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.next_value().clamp(1, sides.max(1))
    }

    fn choose_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.next_value() as usize % len
    }
}

/// Shared handle to the engine's roller
#[derive(Clone)]
pub struct Dice {
    roller: Arc<Mutex<Box<dyn Roller>>>,
}

impl Dice {
    /// Wrap a roller for sharing between services
    pub fn new(roller: impl Roller + 'static) -> Self {
        Self {
            roller: Arc::new(Mutex::new(Box::new(roller))),
        }
    }

    /// Dice backed by OS-seeded randomness
    pub fn random() -> Self {
        Self::new(RandomRoller::new())
    }

    /// Roll a formula (falls back to 1 when it does not parse)
    pub fn roll(&self, formula: &str) -> i32 {
        let mut roller = self.roller.lock();
        roll_formula(formula, roller.as_mut())
    }

    /// Roll a single die
    pub fn roll_die(&self, sides: u32) -> u32 {
        self.roller.lock().roll_die(sides)
    }

    /// Roll a d20
    pub fn d20(&self) -> u32 {
        self.roll_die(20)
    }

    /// Pick one element of a non-empty slice
    pub fn choose<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.roller.lock().choose_index(items.len());
        items.get(idx.min(items.len() - 1))
    }
}

/// A parsed dice roll specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceRoll {
    /// Number of dice to roll
    pub count: u32,
    /// Number of sides per die
    pub sides: u32,
    /// Modifier to add/subtract
    pub modifier: i32,
}

impl DiceRoll {
    /// Create a new dice roll
    pub fn new(count: u32, sides: u32, modifier: i32) -> Self {
        Self { count, sides, modifier }
    }

    /// Roll the dice and return the total
    pub fn roll(&self, roller: &mut dyn Roller) -> i32 {
        let mut total: i64 = 0;
        for _ in 0..self.count {
            total += i64::from(roller.roll_die(self.sides));
        }
        clamp_i32(total + i64::from(self.modifier))
    }

    /// Get the minimum possible result
    pub fn min(&self) -> i32 {
        clamp_i32(i64::from(self.count) + i64::from(self.modifier))
    }

    /// Get the maximum possible result
    pub fn max(&self) -> i32 {
        clamp_i32(i64::from(self.count) * i64::from(self.sides) + i64::from(self.modifier))
    }
}

impl std::fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.modifier > 0 {
            write!(f, "{}d{}+{}", self.count, self.sides, self.modifier)
        } else if self.modifier < 0 {
            write!(f, "{}d{}{}", self.count, self.sides, self.modifier)
        } else {
            write!(f, "{}d{}", self.count, self.sides)
        }
    }
}

/// Any formula accepted by the dice engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formula {
    /// A plain number, e.g. "20"
    Flat(i32),
    /// Dice with an optional trailing modifier, e.g. "2d6+3"
    Dice(DiceRoll),
    /// A base value with dice added or subtracted, e.g. "15+1d6" or "20-1d6"
    Offset {
        base: i32,
        subtract: bool,
        dice: DiceRoll,
    },
}

impl Formula {
    /// Roll the formula
    pub fn roll(&self, roller: &mut dyn Roller) -> i32 {
        match self {
            Formula::Flat(v) => *v,
            Formula::Dice(dice) => dice.roll(roller),
            Formula::Offset { base, subtract, dice } => {
                let rolled = i64::from(dice.roll(roller));
                let base = i64::from(*base);
                clamp_i32(if *subtract { base - rolled } else { base + rolled })
            }
        }
    }

    /// Highest value the formula can produce
    pub fn max(&self) -> i32 {
        match self {
            Formula::Flat(v) => *v,
            Formula::Dice(dice) => dice.max(),
            Formula::Offset { base, subtract, dice } => {
                if *subtract {
                    clamp_i32(i64::from(*base) - i64::from(dice.min()))
                } else {
                    clamp_i32(i64::from(*base) + i64::from(dice.max()))
                }
            }
        }
    }
}

/// Parse a formula like "2d6+3", "d8", "10+1d6" or "20"
///
/// Case-insensitive; whitespace is ignored. Returns `None` for anything
/// outside the grammar, including zero-sided dice.
pub fn parse_formula(notation: &str) -> Option<Formula> {
    let notation: String = notation
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    if FLAT_REGEX.is_match(&notation) {
        return notation.parse().ok().map(Formula::Flat);
    }

    if let Some(caps) = DICE_REGEX.captures(&notation) {
        let count = parse_count(caps.get(1).map_or("", |m| m.as_str()))?;
        let sides = parse_sides(&caps[2])?;
        let modifier = match (caps.get(3), caps.get(4)) {
            (Some(sign), Some(value)) => signed(sign.as_str(), value.as_str())?,
            _ => 0,
        };
        return Some(Formula::Dice(DiceRoll::new(count, sides, modifier)));
    }

    if let Some(caps) = OFFSET_REGEX.captures(&notation) {
        let base: i32 = caps[1].parse().ok()?;
        let subtract = &caps[2] == "-";
        let count = parse_count(&caps[3])?;
        let sides = parse_sides(&caps[4])?;
        return Some(Formula::Offset {
            base,
            subtract,
            dice: DiceRoll::new(count, sides, 0),
        });
    }

    None
}

/// Roll a formula, falling back to [`FALLBACK_ROLL`] when it does not parse
pub fn roll_formula(notation: &str, roller: &mut dyn Roller) -> i32 {
    match parse_formula(notation) {
        Some(formula) => formula.roll(roller),
        None => FALLBACK_ROLL,
    }
}

/// Maximum value of a formula, [`FALLBACK_MAX`] when it does not parse
pub fn max_value(notation: &str) -> i32 {
    parse_formula(notation).map_or(FALLBACK_MAX, |f| f.max())
}

fn parse_count(s: &str) -> Option<u32> {
    // "d6" means "1d6"
    let count = if s.is_empty() { 1 } else { s.parse().ok()? };
    (count <= MAX_DICE).then_some(count)
}

fn parse_sides(s: &str) -> Option<u32> {
    let sides: u32 = s.parse().ok()?;
    (1..=MAX_SIDES).contains(&sides).then_some(sides)
}

fn signed(sign: &str, value: &str) -> Option<i32> {
    let v: i32 = value.parse().ok()?;
    Some(if sign == "-" { -v } else { v })
}

fn clamp_i32(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
