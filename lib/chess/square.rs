use super::Color;
use derive_more::{DebugCustom, Display, Error};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use shakmaty as sm;
use proptest::strategy::Strategy;
use std::str::FromStr;
use test_strategy::Arbitrary;

/// A square on the chess board, in algebraic coordinates.
#[derive(DebugCustom, Display, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Arbitrary)]
#[debug(fmt = "Square({})", self)]
#[display(fmt = "{}", _0)]
pub struct Square(#[strategy((0u32..64).prop_map(sm::Square::new))] sm::Square);

impl Square {
    /// The rank of this square counting from 1 to 8.
    pub fn rank(&self) -> u8 {
        self.0.rank() as u8 + 1
    }

    /// Whether a pawn of the given [`Color`] promotes upon reaching this square.
    pub fn is_last_rank_for(&self, side: Color) -> bool {
        match side {
            Color::White => self.0.rank() == sm::Rank::Eighth,
            Color::Black => self.0.rank() == sm::Rank::First,
        }
    }
}

/// The reason why parsing [`Square`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "failed to parse square")]
pub struct ParseSquareError;

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Square).map_err(|_| ParseSquareError)
    }
}

impl Serialize for Square {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Square {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}

#[doc(hidden)]
impl From<sm::Square> for Square {
    fn from(s: sm::Square) -> Self {
        Square(s)
    }
}

#[doc(hidden)]
impl From<Square> for sm::Square {
    fn from(s: Square) -> Self {
        s.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[proptest]
    fn parsing_printed_square_is_an_identity(s: Square) {
        assert_eq!(s.to_string().parse(), Ok(s));
    }

    #[proptest]
    fn parsing_invalid_square_fails(
        #[by_ref]
        #[filter(#s.parse::<sm::Square>().is_err())]
        s: String,
    ) {
        assert!(s.parse::<Square>().is_err());
    }

    #[proptest]
    fn rank_counts_from_one(s: Square) {
        assert_eq!(s.to_string()[1..].parse(), Ok(s.rank()));
    }

    #[proptest]
    fn last_rank_depends_on_the_side(s: Square) {
        assert_eq!(s.is_last_rank_for(Color::White), s.rank() == 8);
        assert_eq!(s.is_last_rank_for(Color::Black), s.rank() == 1);
    }

    #[proptest]
    fn square_serializes_to_its_coordinates(s: Square) {
        assert_eq!(serde_json::to_string(&s)?, format!("\"{s}\""));
        assert_eq!(serde_json::from_str::<Square>(&format!("\"{s}\""))?, s);
    }

    #[proptest]
    fn square_has_an_equivalent_shakmaty_representation(s: Square) {
        assert_eq!(Square::from(sm::Square::from(s)), s);
    }
}
