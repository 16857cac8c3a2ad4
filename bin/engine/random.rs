use async_trait::async_trait;
use derive_more::{Display, Error, From};
use lib::chess::{ParsePositionError, Position};
use lib::engine::{Engine, EngineReply, EngineRequest};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use tracing::instrument;

/// The reason why [`Random`] failed to choose a move.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error, From)]
pub enum RandomError {
    #[display(fmt = "invalid position, {_0}")]
    InvalidPosition(ParsePositionError),
    #[display(fmt = "there are no legal moves in this position")]
    #[from(ignore)]
    NoLegalMoves,
}

/// An engine that plays uniformly random legal moves.
#[derive(Debug)]
pub struct Random {
    rng: StdRng,
}

impl Default for Random {
    fn default() -> Self {
        Random {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Random {
    /// Constructs a deterministic [`Random`] engine.
    pub fn with_seed(seed: u64) -> Self {
        Random {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

#[async_trait]
impl Engine for Random {
    type Error = RandomError;

    #[instrument(level = "debug", skip(self), ret, err)]
    async fn play(&mut self, req: &EngineRequest) -> Result<EngineReply, Self::Error> {
        let pos: Position = req.fen.parse()?;
        let moves = pos.moves();
        let m = moves.choose(&mut self.rng).ok_or(RandomError::NoLegalMoves)?;
        Ok(EngineReply::from(*m))
    }
}
