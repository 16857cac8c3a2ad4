use crate::chess::Square;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

/// The visual style of a highlighted square.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub enum SquareStyle {
    /// The square of a king in check.
    Check,
    /// Where the last move came from.
    Origin,
    /// Where the last move went to.
    Destination,
}

impl SquareStyle {
    /// The CSS property this style overrides.
    pub fn property(&self) -> &'static str {
        match self {
            SquareStyle::Check => "background",
            SquareStyle::Origin | SquareStyle::Destination => "boxShadow",
        }
    }

    /// The CSS value of [`SquareStyle::property`].
    pub fn css(&self) -> &'static str {
        match self {
            SquareStyle::Check => "radial-gradient(circle, #dd4646ff 40%, transparent 70%)",
            SquareStyle::Origin | SquareStyle::Destination => {
                "inset 0 0 2px 5px rgba(136, 252, 4, 1)"
            }
        }
    }
}

impl Serialize for SquareStyle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.property(), self.css())?;
        map.end()
    }
}

/// The squares highlighted on the board.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub struct Highlights {
    pub check: Option<Square>,
    pub origin: Option<Square>,
    pub destination: Option<Square>,
}

impl Highlights {
    /// Maps every highlighted square to its [`SquareStyle`].
    ///
    /// The last move takes precedence over the check indicator, and its
    /// destination over its origin.
    pub fn styles(&self) -> BTreeMap<Square, SquareStyle> {
        [
            (self.check, SquareStyle::Check),
            (self.origin, SquareStyle::Origin),
            (self.destination, SquareStyle::Destination),
        ]
        .into_iter()
        .filter_map(|(s, style)| Some((s?, style)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[proptest]
    fn styles_contain_every_highlighted_square(h: Highlights) {
        let styles = h.styles();
        for s in [h.check, h.origin, h.destination].into_iter().flatten() {
            assert!(styles.contains_key(&s));
        }

        assert!(styles.len() <= 3);
    }

    #[proptest]
    fn destination_takes_precedence(h: Highlights) {
        if let Some(s) = h.destination {
            assert_eq!(h.styles().get(&s), Some(&SquareStyle::Destination));
        }
    }

    #[proptest]
    fn origin_takes_precedence_over_check(
        #[filter(#h.origin.is_some() && #h.origin != #h.destination)] h: Highlights,
    ) {
        let s = h.origin.unwrap();
        assert_eq!(h.styles().get(&s), Some(&SquareStyle::Origin));
    }

    #[test]
    fn no_highlights_by_default() {
        assert!(Highlights::default().styles().is_empty());
    }

    #[proptest]
    fn style_serializes_to_css(s: SquareStyle) {
        let json = serde_json::to_value(s)?;
        assert_eq!(json[s.property()], s.css());
    }
}
