mod color;
mod r#move;
mod piece;
mod position;
mod promotion;
mod role;
mod square;
mod status;

pub use color::*;
pub use piece::*;
pub use position::*;
pub use promotion::*;
pub use r#move::*;
pub use role::*;
pub use square::*;
pub use status::*;
