use super::{Promotion, Square};
use derive_more::{Constructor, Display, Error};
use shakmaty as sm;
use std::str::FromStr;
use test_strategy::Arbitrary;

/// A chess move in pure coordinate notation.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Constructor, Arbitrary)]
#[filter(#self.whence != #self.whither)]
#[display(
    fmt = "{}{}{}",
    whence,
    whither,
    "promotion.map(|p| p.to_string()).unwrap_or_default()"
)]
pub struct Move {
    whence: Square,
    whither: Square,
    promotion: Option<Promotion>,
}

impl Move {
    /// The source [`Square`].
    pub fn whence(&self) -> Square {
        self.whence
    }

    /// The destination [`Square`].
    pub fn whither(&self) -> Square {
        self.whither
    }

    /// The [`Promotion`] specifier.
    pub fn promotion(&self) -> Option<Promotion> {
        self.promotion
    }
}

/// The reason why parsing [`Move`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "`{}` is not a move in pure coordinate notation", _0)]
pub struct ParseMoveError(#[error(not(source))] pub String);

impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseMoveError(s.into());

        let whence = s.get(0..2).ok_or_else(invalid)?;
        let whither = s.get(2..4).ok_or_else(invalid)?;
        let promotion = match s.get(4..).ok_or_else(invalid)? {
            "" => None,
            p => Some(p.parse().map_err(|_| invalid())?),
        };

        Ok(Move {
            whence: whence.parse().map_err(|_| invalid())?,
            whither: whither.parse().map_err(|_| invalid())?,
            promotion,
        })
    }
}

#[doc(hidden)]
impl TryFrom<sm::uci::Uci> for Move {
    type Error = ParseMoveError;

    fn try_from(m: sm::uci::Uci) -> Result<Self, Self::Error> {
        match m {
            sm::uci::Uci::Normal {
                from,
                to,
                promotion,
            } => Ok(Move {
                whence: from.into(),
                whither: to.into(),
                promotion: match promotion {
                    None => None,
                    Some(r) => Some(r.try_into().map_err(|_| ParseMoveError(m.to_string()))?),
                },
            }),

            _ => Err(ParseMoveError(m.to_string())),
        }
    }
}

#[doc(hidden)]
impl From<Move> for sm::uci::Uci {
    fn from(m: Move) -> Self {
        sm::uci::Uci::Normal {
            from: m.whence().into(),
            to: m.whither().into(),
            promotion: m.promotion().map(Into::into),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[proptest]
    fn parsing_printed_move_is_an_identity(m: Move) {
        assert_eq!(m.to_string().parse(), Ok(m));
    }

    #[proptest]
    fn move_serializes_to_pure_coordinate_notation(m: Move) {
        assert_eq!(m.to_string(), sm::uci::Uci::from(m).to_string());
    }

    #[proptest]
    fn move_has_an_equivalent_shakmaty_representation(m: Move) {
        assert_eq!(Move::try_from(sm::uci::Uci::from(m)), Ok(m));
    }

    #[test]
    fn parsing_move_fails_for_trailing_garbage() {
        assert!("e7e8x".parse::<Move>().is_err());
        assert!("e7e8qq".parse::<Move>().is_err());
        assert!("e7".parse::<Move>().is_err());
    }
}
