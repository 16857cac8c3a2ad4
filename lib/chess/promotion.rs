use super::Role;
use derive_more::{Display, Error};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use shakmaty as sm;
use std::str::FromStr;
use test_strategy::Arbitrary;

/// The piece a pawn may be promoted to.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Arbitrary)]
pub enum Promotion {
    #[display(fmt = "n")]
    Knight,
    #[display(fmt = "b")]
    Bishop,
    #[display(fmt = "r")]
    Rook,
    #[display(fmt = "q")]
    Queen,
}

impl Promotion {
    /// Every choice offered to the player, in the order a picker shows them.
    pub const ALL: [Promotion; 4] = [
        Promotion::Knight,
        Promotion::Bishop,
        Promotion::Rook,
        Promotion::Queen,
    ];
}

/// The reason why parsing [`Promotion`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "`{}` is not one of 'n', 'b', 'r' or 'q'", _0)]
pub struct ParsePromotionError(#[error(not(source))] pub String);

impl FromStr for Promotion {
    type Err = ParsePromotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "n" => Ok(Promotion::Knight),
            "b" => Ok(Promotion::Bishop),
            "r" => Ok(Promotion::Rook),
            "q" => Ok(Promotion::Queen),
            _ => Err(ParsePromotionError(s.into())),
        }
    }
}

impl Serialize for Promotion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Promotion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}

impl From<Promotion> for Role {
    fn from(p: Promotion) -> Self {
        match p {
            Promotion::Knight => Role::Knight,
            Promotion::Bishop => Role::Bishop,
            Promotion::Rook => Role::Rook,
            Promotion::Queen => Role::Queen,
        }
    }
}

#[doc(hidden)]
impl From<Promotion> for sm::Role {
    fn from(p: Promotion) -> Self {
        Role::from(p).into()
    }
}

#[doc(hidden)]
impl TryFrom<sm::Role> for Promotion {
    type Error = ParsePromotionError;

    fn try_from(r: sm::Role) -> Result<Self, Self::Error> {
        r.char().to_string().parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[proptest]
    fn parsing_printed_promotion_is_an_identity(p: Promotion) {
        assert_eq!(p.to_string().parse(), Ok(p));
    }

    #[proptest]
    fn parsing_promotion_fails_if_not_one_of_lowercase_nbrq(
        #[filter(!["n", "b", "r", "q"].contains(&#s.as_str()))] s: String,
    ) {
        assert_eq!(s.parse::<Promotion>(), Err(ParsePromotionError(s)));
    }

    #[test]
    fn pawns_and_kings_are_not_promotions() {
        assert!(Promotion::try_from(sm::Role::Pawn).is_err());
        assert!(Promotion::try_from(sm::Role::King).is_err());
    }

    #[proptest]
    fn promotion_has_an_equivalent_shakmaty_representation(p: Promotion) {
        assert_eq!(Promotion::try_from(sm::Role::from(p)), Ok(p));
    }

    #[proptest]
    fn promotion_deserializes_from_its_letter(p: Promotion) {
        assert_eq!(serde_json::from_str::<Promotion>(&format!("\"{p}\""))?, p);
    }
}
