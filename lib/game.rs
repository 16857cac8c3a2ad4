use crate::chess::{Color, GameStatus, Move, ParsePositionError, Piece, Position};
use crate::chess::{Promotion, Role, Square};
use derive_more::{Display, Error};
use std::str::FromStr;
use tracing::instrument;

/// The reason why a move was not applied.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
pub enum IllegalMove {
    #[display(fmt = "the game is over")]
    GameOver,
    #[display(fmt = "there is no piece on square `{_0}`")]
    NoPiece(#[error(not(source))] Square),
    #[display(fmt = "move `{_0}` is illegal in this position")]
    Rejected(#[error(not(source))] Move),
}

/// The result of an accepted move.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MoveOutcome {
    /// The position after the move.
    pub position: Position,
    /// The square of the king of the side to move, if it is in check.
    pub check: Option<Square>,
    /// The state of the game after the move.
    pub status: GameStatus,
}

/// A single game of chess.
///
/// Tracks every position reached so far, so that draws by repetition can be
/// adjudicated on top of the rules that depend on the current position alone.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Game {
    position: Position,
    history: Vec<u64>,
}

impl Default for Game {
    fn default() -> Self {
        Position::default().into()
    }
}

impl From<Position> for Game {
    fn from(position: Position) -> Self {
        let history = vec![position.zobrist()];
        Game { position, history }
    }
}

impl FromStr for Game {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<Position>()?.into())
    }
}

impl Game {
    /// The current [`Position`].
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// The side to move.
    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    /// How many times the current position has been reached, this one included.
    pub fn repetitions(&self) -> usize {
        let zobrist = self.position.zobrist();
        self.history.iter().filter(|&&z| z == zobrist).count()
    }

    /// Whether the game is a draw by [threefold repetition].
    ///
    /// [threefold repetition]: https://en.wikipedia.org/wiki/Threefold_repetition
    pub fn is_draw_by_threefold_repetition(&self) -> bool {
        self.repetitions() >= 3
    }

    /// Whether the game is a draw by the [50-move rule].
    ///
    /// [50-move rule]: https://en.wikipedia.org/wiki/Fifty-move_rule
    pub fn is_draw_by_50_move_rule(&self) -> bool {
        self.position.halfmoves() >= 100
    }

    /// Whether no further move may be played.
    pub fn is_terminal(&self) -> bool {
        self.position.is_game_over()
            || self.is_draw_by_50_move_rule()
            || self.is_draw_by_threefold_repetition()
    }

    /// The current [`GameStatus`].
    ///
    /// When more than one draw condition holds, the 50-move rule takes
    /// precedence over stalemate, which takes precedence over insufficient
    /// material, which takes precedence over repetition.
    pub fn status(&self) -> GameStatus {
        if !self.is_terminal() {
            GameStatus::InProgress
        } else if self.position.is_checkmate() {
            GameStatus::win(!self.turn())
        } else if self.is_draw_by_50_move_rule() {
            GameStatus::DrawFiftyMove
        } else if self.position.is_stalemate() {
            GameStatus::DrawStalemate
        } else if self.position.is_material_insufficient() {
            GameStatus::DrawInsufficientMaterial
        } else if self.is_draw_by_threefold_repetition() {
            GameStatus::DrawThreefoldRepetition
        } else {
            GameStatus::DrawOther
        }
    }

    /// The square of the king of the side to move, if it is in check.
    pub fn check(&self) -> Option<Square> {
        if self.position.is_check() {
            self.position.king(self.turn())
        } else {
            None
        }
    }

    /// The legal moves of the piece on the given [`Square`].
    pub fn moves_from(&self, whence: Square) -> Vec<Move> {
        let mut moves = self.position.moves();
        moves.retain(|m| m.whence() == whence);
        moves
    }

    /// Whether moving from `whence` into `whither` is a legal pawn promotion.
    pub fn involves_promotion(&self, whence: Square, whither: Square) -> bool {
        match self.position.piece_on(whence) {
            Some(Piece(side, Role::Pawn)) if whither.is_last_rank_for(side) => self
                .moves_from(whence)
                .iter()
                .any(|m| m.whither() == whither),
            _ => false,
        }
    }

    /// Play a move if legal.
    ///
    /// The promotion is only taken into account if the move is a promotion,
    /// otherwise it is ignored. Nothing changes if the move is rejected.
    #[instrument(level = "debug", skip(self), err)]
    pub fn make(
        &mut self,
        whence: Square,
        whither: Square,
        promotion: Option<Promotion>,
    ) -> Result<MoveOutcome, IllegalMove> {
        if self.is_terminal() {
            return Err(IllegalMove::GameOver);
        } else if self.position.piece_on(whence).is_none() {
            return Err(IllegalMove::NoPiece(whence));
        }

        let promotion = promotion.filter(|_| self.involves_promotion(whence, whither));
        let m = Move::new(whence, whither, promotion);
        let next = self.position.make(m).ok_or(IllegalMove::Rejected(m))?;

        self.history.push(next.zobrist());
        self.position = next;

        Ok(MoveOutcome {
            position: self.position.clone(),
            check: self.check(),
            status: self.status(),
        })
    }
}
