use crate::chess::{Move, Position};
use async_trait::async_trait;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

mod skill;

pub use skill::*;

/// A request for an engine to choose the next move.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub struct EngineRequest {
    /// The position in FEN.
    pub fen: String,
    /// How strongly the engine should play.
    #[serde(default)]
    pub skill_level: Skill,
}

impl EngineRequest {
    /// Constructs a request for the given [`Position`].
    pub fn new(pos: &Position, skill_level: Skill) -> Self {
        EngineRequest {
            fen: pos.to_string(),
            skill_level,
        }
    }
}

/// The move chosen by an engine, as received on the wire.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub struct EngineReply {
    pub from: String,
    pub to: String,
    pub promotion: Option<String>,
}

/// The reason why an [`EngineReply`] does not describe a [`Move`].
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "engine replied with an invalid move `{_0:?}`")]
pub struct InvalidReply(#[error(not(source))] pub EngineReply);

impl TryFrom<EngineReply> for Move {
    type Error = InvalidReply;

    fn try_from(reply: EngineReply) -> Result<Self, Self::Error> {
        let invalid = || InvalidReply(reply.clone());

        let whence = reply.from.parse().map_err(|_| invalid())?;
        let whither = reply.to.parse().map_err(|_| invalid())?;
        let promotion = match &reply.promotion {
            None => None,
            Some(p) => Some(p.parse().map_err(|_| invalid())?),
        };

        Ok(Move::new(whence, whither, promotion))
    }
}

impl From<Move> for EngineReply {
    fn from(m: Move) -> Self {
        EngineReply {
            from: m.whence().to_string(),
            to: m.whither().to_string(),
            promotion: m.promotion().map(|p| p.to_string()),
        }
    }
}

/// Trait for types that choose moves on behalf of the opponent.
#[async_trait]
#[cfg_attr(test, mockall::automock(type Error = String;))]
pub trait Engine {
    /// The reason why the engine failed to reply.
    type Error;

    /// Choose the next move.
    async fn play(&mut self, req: &EngineRequest) -> Result<EngineReply, Self::Error>;
}
