use crate::chess::Color;
use crate::engine::Skill;
use derive_more::{Display, Error};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The side chosen by the player when starting a new game.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[display(fmt = "white")]
    White,
    #[display(fmt = "black")]
    Black,
    #[display(fmt = "random")]
    Random,
}

impl Default for Side {
    fn default() -> Self {
        Side::White
    }
}

impl From<Color> for Side {
    fn from(c: Color) -> Self {
        match c {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

impl Side {
    /// The [`Color`] this side stands for, picking one at random if need be.
    pub fn resolve<R: Rng>(self, rng: &mut R) -> Color {
        match self {
            Side::White => Color::White,
            Side::Black => Color::Black,
            Side::Random if rng.gen() => Color::White,
            Side::Random => Color::Black,
        }
    }
}

/// The reason why parsing [`Side`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "expected one of 'w', 'b' or 'r'")]
pub struct ParseSideError;

impl FromStr for Side {
    type Err = ParseSideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "w" | "white" => Ok(Side::White),
            "b" | "black" => Ok(Side::Black),
            "r" | "random" => Ok(Side::Random),
            _ => Err(ParseSideError),
        }
    }
}

/// The settings of the game currently being played.
///
/// Every new game gets a fresh sequence number, so that replies meant for
/// a previous game can be told apart.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub struct GameSession {
    pub sequence: u64,
    pub human: Color,
    pub skill: Skill,
}

impl Default for GameSession {
    fn default() -> Self {
        GameSession {
            sequence: 0,
            human: Color::White,
            skill: Skill::default(),
        }
    }
}

impl GameSession {
    /// The session that follows this one.
    pub fn next(&self, human: Color, skill: Skill) -> Self {
        GameSession {
            sequence: self.sequence.wrapping_add(1),
            human,
            skill,
        }
    }
}
