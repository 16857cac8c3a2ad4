/// Interactive board: promotion picker, move gestures and highlights.
pub mod board;
/// Chess domain types.
pub mod chess;
/// Protocol spoken with move-generating engines.
pub mod engine;
/// Rules of a single game.
pub mod game;
