use super::{Random, RandomError};
use crate::io::Io;
use anyhow::{Context, Error as Anyhow};
use async_trait::async_trait;
use derive_more::{DebugCustom, Display, Error, From};
use lib::chess::{Move, ParseMoveError};
use lib::engine::{Engine, EngineReply, EngineRequest, Skill};
use std::{collections::HashMap, fmt::Debug, future::Future, io, pin::Pin, time::Duration};
use tokio::{runtime, task::block_in_place};
use tracing::{error, instrument};
use vampirc_uci::{self as uci, UciFen, UciMessage};

pub type UciOptions = HashMap<String, Option<String>>;

#[derive(DebugCustom)]
#[debug(bound = "T: Debug")]
enum Lazy<T, E> {
    #[debug(fmt = "{_0:?}")]
    Initialized(T),
    #[debug(fmt = "?")]
    Uninitialized(Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'static>>),
}

impl<T, E> Lazy<T, E> {
    async fn get_or_init(&mut self) -> Result<&mut T, E> {
        if let Lazy::Uninitialized(f) = self {
            *self = Lazy::Initialized(f.await?);
        }

        match self {
            Lazy::Initialized(v) => Ok(v),
            Lazy::Uninitialized(_) => unreachable!(),
        }
    }
}

/// The reason why a move could not be received from the UCI server.
#[derive(Debug, Display, Error, From)]
pub enum UciError {
    #[display(fmt = "the UCI server encountered an error")]
    Io(io::Error),
    #[display(fmt = "the UCI server replied with an invalid move")]
    InvalidMove(ParseMoveError),
    #[display(fmt = "failed to pick a random move")]
    Random(RandomError),
}

/// A Universal Chess Interface client for a chess engine.
#[derive(Debug)]
pub struct Uci<T: Io> {
    io: Lazy<T, UciError>,
    skill: Option<Skill>,
    movetime: Duration,
    random: Random,
}

impl<T: Io + Send + 'static> Uci<T> {
    /// How long the engine is given to think about each move.
    pub const MOVETIME: Duration = Duration::from_millis(100);

    /// Constructs [`Uci`] with the given [`UciOptions`].
    pub fn new(mut io: T, options: UciOptions) -> Self {
        Uci {
            skill: None,
            movetime: Self::MOVETIME,
            random: Random::default(),
            io: Lazy::Uninitialized(Box::pin(async move {
                io.send(&UciMessage::Uci.to_string()).await?;
                io.flush().await?;

                while !matches!(uci::parse_one(io.recv().await?.trim()), UciMessage::UciOk) {}

                for (name, value) in options {
                    let set_option = UciMessage::SetOption { name, value };
                    io.send(&set_option.to_string()).await?;
                }

                io.send(&UciMessage::UciNewGame.to_string()).await?;
                io.send(&UciMessage::IsReady.to_string()).await?;
                io.flush().await?;

                while !matches!(uci::parse_one(io.recv().await?.trim()), UciMessage::ReadyOk) {}

                Ok(io)
            })),
        }
    }

    async fn go(&mut self, req: &EngineRequest) -> Result<(), UciError> {
        let skill = match self.skill {
            Some(s) if s == req.skill_level => None,
            _ => Some(UciMessage::SetOption {
                name: "Skill Level".into(),
                value: Some(req.skill_level.to_string()),
            }),
        };

        let position = UciMessage::Position {
            startpos: false,
            fen: Some(UciFen(req.fen.clone())),
            moves: Vec::new(),
        };

        let go = UciMessage::go_movetime(
            uci::Duration::from_std(self.movetime).unwrap_or_else(|_| uci::Duration::max_value()),
        );

        let io = self.io.get_or_init().await?;

        if let Some(set_option) = skill {
            io.send(&set_option.to_string()).await?;
        }

        io.send(&position.to_string()).await?;
        io.send(&go.to_string()).await?;
        io.flush().await?;

        self.skill = Some(req.skill_level);

        Ok(())
    }
}

impl<T: Io> Drop for Uci<T> {
    #[instrument(level = "trace", skip(self))]
    fn drop(&mut self) {
        if let Lazy::Uninitialized(_) = self.io {
            return;
        }

        let result: Result<(), Anyhow> = block_in_place(|| {
            runtime::Handle::try_current()?.block_on(async {
                let io = self.io.get_or_init().await?;
                io.send(&UciMessage::Stop.to_string()).await?;
                io.send(&UciMessage::Quit.to_string()).await?;
                io.flush().await?;
                Ok(())
            })
        });

        if let Err(e) = result.context("failed to gracefully shutdown the uci engine") {
            error!("{:?}", e);
        }
    }
}

#[async_trait]
impl<T: Io + Send + 'static> Engine for Uci<T> {
    type Error = UciError;

    #[instrument(level = "debug", skip(self), ret, err)]
    async fn play(&mut self, req: &EngineRequest) -> Result<EngineReply, Self::Error> {
        if req.skill_level.is_random() {
            return Ok(self.random.play(req).await?);
        }

        self.go(req).await?;

        let io = self.io.get_or_init().await?;

        loop {
            if let UciMessage::BestMove { best_move: m, .. } =
                uci::parse_one(io.recv().await?.trim())
            {
                break Ok(m.to_string().parse::<Move>()?.into());
            }
        }
    }
}
