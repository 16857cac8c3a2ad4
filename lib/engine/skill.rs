use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use test_strategy::Arbitrary;

/// How strongly an engine plays.
///
/// Ranges from `-1` to `20`, where `-1` stands for uniformly random moves.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[derive(Deserialize, Serialize, Arbitrary)]
#[serde(try_from = "i8", into = "i8")]
pub struct Skill(#[strategy(Skill::MIN..=Skill::MAX)] i8);

impl Skill {
    /// The lowest skill level.
    pub const MIN: i8 = -1;

    /// The highest skill level.
    pub const MAX: i8 = 20;

    /// The skill level that plays uniformly random moves.
    pub const RANDOM: Skill = Skill(-1);

    /// Constructs [`Skill`] if in range.
    pub fn new(level: i8) -> Result<Self, InvalidSkill> {
        if (Self::MIN..=Self::MAX).contains(&level) {
            Ok(Skill(level))
        } else {
            Err(InvalidSkill)
        }
    }

    /// The skill level.
    pub fn get(&self) -> i8 {
        self.0
    }

    /// Whether this skill level stands for uniformly random moves.
    pub fn is_random(&self) -> bool {
        *self == Self::RANDOM
    }
}

impl Default for Skill {
    fn default() -> Self {
        Skill(5)
    }
}

/// The reason why constructing [`Skill`] failed.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Error)]
#[display(fmt = "expected skill level in the range [{}, {}]", Skill::MIN, Skill::MAX)]
pub struct InvalidSkill;

impl TryFrom<i8> for Skill {
    type Error = InvalidSkill;

    fn try_from(level: i8) -> Result<Self, Self::Error> {
        Skill::new(level)
    }
}

impl From<Skill> for i8 {
    fn from(s: Skill) -> Self {
        s.0
    }
}

impl FromStr for Skill {
    type Err = InvalidSkill;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i8>().map_err(|_| InvalidSkill)?.try_into()
    }
}
