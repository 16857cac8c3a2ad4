use super::{Color, Move, Piece, Square};
use derive_more::{DebugCustom, Display, Error, From};
use proptest::sample::{Selector, SelectorStrategy};
use proptest::{prelude::*, strategy::Map};
use shakmaty as sm;
use std::ops::Range;
use std::str::FromStr;

/// A snapshot of the chess board.
///
/// This type guarantees that it only holds valid positions.
#[derive(DebugCustom, Display, Default, Clone, Eq, PartialEq)]
#[debug(fmt = "Position({self})")]
#[display(
    fmt = "{}",
    "sm::fen::Fen::from_position(self.0.clone(), sm::EnPassantMode::Legal)"
)]
pub struct Position(sm::Chess);

impl Arbitrary for Position {
    type Parameters = ();
    type Strategy = Map<(Range<usize>, SelectorStrategy), fn((usize, Selector)) -> Position>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (0..128, any::<Selector>()).prop_map(|(moves, selector)| {
            let mut chess = sm::Chess::default();

            for _ in 0..moves {
                match selector.try_select(sm::Position::legal_moves(&chess)) {
                    None => break,
                    Some(m) => sm::Position::play_unchecked(&mut chess, &m),
                }
            }

            Position(chess)
        })
    }
}

impl Position {
    /// The side to move.
    pub fn turn(&self) -> Color {
        sm::Position::turn(&self.0).into()
    }

    /// The number of halfmoves since the last capture or pawn advance.
    pub fn halfmoves(&self) -> u32 {
        sm::Position::halfmoves(&self.0)
    }

    /// This position's [zobrist hash].
    ///
    /// [zobrist hash]: https://www.chessprogramming.org/Zobrist_Hashing
    pub fn zobrist(&self) -> u64 {
        sm::zobrist::ZobristHash::zobrist_hash::<u64>(&self.0)
    }

    /// The [`Piece`] on the given [`Square`], if any.
    pub fn piece_on(&self, s: Square) -> Option<Piece> {
        sm::Position::board(&self.0)
            .piece_at(s.into())
            .map(Piece::from)
    }

    /// The [`Square`] occupied by the king of the given color.
    pub fn king(&self, side: Color) -> Option<Square> {
        sm::Position::board(&self.0)
            .king_of(side.into())
            .map(Square::from)
    }

    /// Whether the side to move is in [check].
    ///
    /// [check]: https://www.chessprogramming.org/Check
    pub fn is_check(&self) -> bool {
        sm::Position::is_check(&self.0)
    }

    /// Whether this position is a [checkmate].
    ///
    /// [checkmate]: https://www.chessprogramming.org/Checkmate
    pub fn is_checkmate(&self) -> bool {
        sm::Position::is_checkmate(&self.0)
    }

    /// Whether this position is a [stalemate].
    ///
    /// [stalemate]: https://www.chessprogramming.org/Stalemate
    pub fn is_stalemate(&self) -> bool {
        sm::Position::is_stalemate(&self.0)
    }

    /// Whether neither side has enough material left to deliver checkmate.
    pub fn is_material_insufficient(&self) -> bool {
        sm::Position::is_insufficient_material(&self.0)
    }

    /// Whether the game cannot continue regardless of its history.
    pub fn is_game_over(&self) -> bool {
        self.is_checkmate() || self.is_stalemate() || self.is_material_insufficient()
    }

    /// The legal [`Move`]s in this position.
    pub fn moves(&self) -> Vec<Move> {
        sm::Position::legal_moves(&self.0)
            .iter()
            .filter_map(|m| Move::try_from(m.to_uci(sm::CastlingMode::Standard)).ok())
            .collect()
    }

    /// The position that follows playing a [`Move`], if legal.
    pub fn make(&self, m: Move) -> Option<Position> {
        match sm::uci::Uci::to_move(&m.into(), &self.0) {
            Ok(vm) if sm::Position::is_legal(&self.0, &vm) => {
                let mut next = self.0.clone();
                sm::Position::play_unchecked(&mut next, &vm);
                Some(Position(next))
            }

            _ => None,
        }
    }
}

/// The reason why parsing the FEN string failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error, From)]
pub enum ParsePositionError {
    #[display(fmt = "invalid FEN, {}", _0)]
    InvalidFen(InvalidFen),
    #[display(fmt = "illegal position")]
    IllegalPosition,
}

/// The field of a FEN string that failed to parse.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
pub enum InvalidFen {
    #[display(fmt = "syntax error at the piece placement field")]
    InvalidPlacement,
    #[display(fmt = "syntax error at the side to move field")]
    InvalidTurn,
    #[display(fmt = "syntax error at the castling rights field")]
    InvalidCastlingRights,
    #[display(fmt = "syntax error at the en passant square field")]
    InvalidEnPassantSquare,
    #[display(fmt = "syntax error at the halfmove clock field")]
    InvalidHalfmoveClock,
    #[display(fmt = "syntax error at the fullmove counter field")]
    InvalidFullmoves,
    #[display(fmt = "unspecified syntax error")]
    InvalidSyntax,
}

#[doc(hidden)]
impl From<sm::fen::ParseFenError> for InvalidFen {
    fn from(e: sm::fen::ParseFenError) -> Self {
        use sm::fen::ParseFenError as E;
        match e {
            E::InvalidBoard => InvalidFen::InvalidPlacement,
            E::InvalidTurn => InvalidFen::InvalidTurn,
            E::InvalidCastling => InvalidFen::InvalidCastlingRights,
            E::InvalidEpSquare => InvalidFen::InvalidEnPassantSquare,
            E::InvalidHalfmoveClock => InvalidFen::InvalidHalfmoveClock,
            E::InvalidFullmoves => InvalidFen::InvalidFullmoves,
            _ => InvalidFen::InvalidSyntax,
        }
    }
}

impl FromStr for Position {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fen: sm::fen::Fen = s.parse().map_err(InvalidFen::from)?;
        let chess: sm::Chess = sm::Setup::from(fen)
            .position(sm::CastlingMode::Standard)
            .map_err(|_| ParsePositionError::IllegalPosition)?;

        Ok(Position(chess))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::Role;
    use test_strategy::proptest;

    #[proptest]
    fn parsing_printed_position_is_an_identity(pos: Position) {
        assert_eq!(pos.to_string().parse(), Ok(pos));
    }

    #[proptest]
    fn king_returns_square_occupied_by_a_king(pos: Position, c: Color) {
        let king = pos.king(c).map(|s| pos.piece_on(s));
        assert_eq!(king, Some(Some(Piece(c, Role::King))));
    }

    #[proptest]
    fn checkmate_implies_check(pos: Position) {
        assert!(!pos.is_checkmate() || pos.is_check());
    }

    #[proptest]
    fn check_and_stalemate_are_mutually_exclusive(pos: Position) {
        assert!(!(pos.is_check() && pos.is_stalemate()));
    }

    #[proptest]
    fn game_over_implies_no_legal_moves_or_insufficient_material(pos: Position) {
        assert!(!pos.is_game_over() || pos.moves().is_empty() || pos.is_material_insufficient());
    }

    #[proptest]
    fn moves_are_made_by_the_side_to_move(pos: Position) {
        for m in pos.moves() {
            assert_eq!(pos.piece_on(m.whence()).map(|p| p.color()), Some(pos.turn()));
            assert_eq!(pos.make(m).map(|p| p.turn()), Some(!pos.turn()));
        }
    }

    #[proptest]
    fn make_rejects_moves_that_are_not_legal(
        pos: Position,
        #[filter(!#pos.moves().contains(&#m))] m: Move,
    ) {
        assert_eq!(pos.make(m), None);
    }

    #[proptest]
    fn zobrist_hash_identifies_the_position(pos: Position) {
        assert_eq!(pos.to_string().parse::<Position>()?.zobrist(), pos.zobrist());
    }

    #[test]
    fn default_position_is_the_standard_starting_position() {
        assert_eq!(
            Position::default().to_string(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
    }

    #[test]
    fn parsing_fen_with_missing_king_fails() {
        assert_eq!(
            "8/8/8/8/8/8/8/K7 w - - 0 1".parse::<Position>(),
            Err(ParsePositionError::IllegalPosition)
        );
    }

    #[test]
    fn parsing_garbage_fails() {
        assert!(matches!(
            "not a fen".parse::<Position>(),
            Err(ParsePositionError::InvalidFen(_))
        ));
    }
}
