use super::Color;
use derive_more::Display;
use serde::{Serialize, Serializer};

/// The state of a game as shown to the player.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub enum GameStatus {
    #[display(fmt = "In Progress")]
    InProgress,
    #[display(fmt = "White Wins")]
    WhiteWins,
    #[display(fmt = "Black Wins")]
    BlackWins,
    #[display(fmt = "Draw (50 Moves)")]
    DrawFiftyMove,
    #[display(fmt = "Draw (Stalemate)")]
    DrawStalemate,
    #[display(fmt = "Draw (Insufficient Material)")]
    DrawInsufficientMaterial,
    #[display(fmt = "Draw (Threefold Repetition)")]
    DrawThreefoldRepetition,
    #[display(fmt = "Draw")]
    DrawOther,
}

impl GameStatus {
    /// The status of a game won by the given side.
    pub fn win(side: Color) -> Self {
        match side {
            Color::White => GameStatus::WhiteWins,
            Color::Black => GameStatus::BlackWins,
        }
    }

    /// Whether the game has ended.
    pub fn is_over(&self) -> bool {
        *self != GameStatus::InProgress
    }

    /// Whether the game ended and neither side has won.
    pub fn is_draw(&self) -> bool {
        self.is_over() && self.winner().is_none()
    }

    /// The winning side, if any.
    pub fn winner(&self) -> Option<Color> {
        match self {
            GameStatus::WhiteWins => Some(Color::White),
            GameStatus::BlackWins => Some(Color::Black),
            _ => None,
        }
    }
}

impl Default for GameStatus {
    fn default() -> Self {
        GameStatus::InProgress
    }
}

impl Serialize for GameStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[proptest]
    fn finished_game_is_either_draw_or_decisive(#[filter(#s.is_over())] s: GameStatus) {
        assert_ne!(s.is_draw(), s.winner().is_some());
    }

    #[proptest]
    fn game_in_progress_has_no_winner(#[filter(!#s.is_over())] s: GameStatus) {
        assert_eq!(s.winner(), None);
        assert!(!s.is_draw());
    }

    #[proptest]
    fn winning_side_wins(c: Color) {
        assert_eq!(GameStatus::win(c).winner(), Some(c));
    }

    #[test]
    fn status_renders_as_prose() {
        assert_eq!(GameStatus::DrawFiftyMove.to_string(), "Draw (50 Moves)");
        assert_eq!(
            GameStatus::DrawThreefoldRepetition.to_string(),
            "Draw (Threefold Repetition)"
        );
        assert_eq!(GameStatus::WhiteWins.to_string(), "White Wins");
    }
}
