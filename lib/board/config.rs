use super::SquareStyle;
use crate::chess::{Color, Square};
use serde::Serialize;
use std::collections::BTreeMap;

/// The colors of the board.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardTheme {
    pub board: &'static str,
    pub dark_square: &'static str,
    pub light_square: &'static str,
}

impl Default for BoardTheme {
    fn default() -> Self {
        BoardTheme {
            board: "rgb(124, 94, 54)",
            dark_square: "#769656",
            light_square: "#eeeed2",
        }
    }
}

/// Everything a board widget needs to render the game.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardConfig {
    /// The position in FEN.
    pub position: String,
    /// The side shown at the bottom of the board.
    pub orientation: Color,
    pub allow_dragging: bool,
    pub styles: BTreeMap<Square, SquareStyle>,
    /// Where the promotion picker is anchored, if shown.
    pub promotion: Option<Square>,
    pub theme: BoardTheme,
}
