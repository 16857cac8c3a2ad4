use super::{BoardConfig, BoardTheme, GameSession, Highlights, PromotionRequest, PromotionResolver};
use crate::chess::{GameStatus, Move, Promotion, Square};
use crate::engine::{Engine, EngineReply, EngineRequest};
use crate::game::{Game, IllegalMove, MoveOutcome};
use std::fmt::Display;
use tracing::{debug, error, info, instrument, warn};

/// The stage of the interaction with the board.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Phase {
    /// Waiting for the player to move, or for the opponent to be asked.
    Idle,
    /// Waiting for the player to choose a promotion.
    PromotionPending { whence: Square, whither: Square },
    /// Waiting for the opponent's reply to a request stamped with `generation`.
    AwaitingOpponent { generation: u64 },
    /// The game is over.
    Terminal,
}

/// How a piece dropped on the board was handled.
#[derive(Debug)]
pub enum Gesture {
    /// The piece goes back to where it came from.
    Rejected,
    /// The move was played.
    Accepted,
    /// The move awaits the player's choice of promotion.
    Promotion(PromotionRequest),
}

/// A request for the opponent's move, stamped with a number that identifies it.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct OpponentRequest {
    pub generation: u64,
    pub request: EngineRequest,
}

/// Drives a game between the player and an engine.
///
/// The controller is the only one to ever touch the [`Game`], and it does so
/// one move at a time: the player may only drag pieces while [`Phase::Idle`]
/// on their own turn, and at most one request for the opponent's move is
/// ever outstanding.
#[derive(Debug)]
pub struct Controller {
    session: GameSession,
    game: Game,
    phase: Phase,
    generation: u64,
    resolver: PromotionResolver,
    highlights: Highlights,
    status: GameStatus,
}

impl Controller {
    /// Constructs a [`Controller`] for a new game.
    pub fn new(session: GameSession) -> Self {
        Self::with_game(session, Game::default())
    }

    /// Constructs a [`Controller`] that resumes a [`Game`].
    pub fn with_game(session: GameSession, game: Game) -> Self {
        let mut controller = Controller {
            session,
            game: Game::default(),
            phase: Phase::Idle,
            generation: 0,
            resolver: PromotionResolver::default(),
            highlights: Highlights::default(),
            status: GameStatus::InProgress,
        };

        controller.resume(session, game);
        controller
    }

    /// Starts a new game.
    pub fn start(&mut self, session: GameSession) {
        self.resume(session, Game::default())
    }

    /// Replaces the current game with the given one.
    ///
    /// Any pending promotion is cancelled and replies to requests issued
    /// before are discarded on arrival.
    #[instrument(level = "info", skip(self, game), fields(position = %game.position()))]
    pub fn resume(&mut self, session: GameSession, game: Game) {
        self.resolver.cancel();
        self.generation = self.generation.wrapping_add(1);
        self.session = session;
        self.status = game.status();
        self.phase = if game.is_terminal() {
            Phase::Terminal
        } else {
            Phase::Idle
        };

        self.game = game;
        self.highlights = Highlights::default();
    }

    /// The current session.
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// The current game.
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// The current phase.
    ///
    /// A promotion whose request was cancelled or dropped no longer holds the
    /// board.
    pub fn phase(&self) -> Phase {
        match self.phase {
            Phase::PromotionPending { whither, .. }
                if self.resolver.pending() != Some(whither) =>
            {
                Phase::Idle
            }

            phase => phase,
        }
    }

    /// The status of the current game.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// The squares currently highlighted.
    pub fn highlights(&self) -> &Highlights {
        &self.highlights
    }

    /// The slot through which the player's choice of promotion is settled.
    pub fn resolver(&self) -> &PromotionResolver {
        &self.resolver
    }

    /// Whether the player may drag pieces.
    pub fn can_drag(&self) -> bool {
        self.phase() == Phase::Idle && self.game.turn() == self.session.human
    }

    /// Everything the board widget needs to render.
    pub fn board(&self) -> BoardConfig {
        BoardConfig {
            position: self.game.position().to_string(),
            orientation: self.session.human,
            allow_dragging: self.can_drag(),
            styles: self.highlights.styles(),
            promotion: self.resolver.pending(),
            theme: BoardTheme::default(),
        }
    }

    /// Handles a piece dropped by the player.
    #[instrument(level = "debug", skip(self), ret)]
    pub fn drop_piece(&mut self, whence: Square, whither: Square) -> Gesture {
        self.phase = self.phase();

        if !self.can_drag() {
            Gesture::Rejected
        } else if self.game.involves_promotion(whence, whither) {
            self.phase = Phase::PromotionPending { whence, whither };
            Gesture::Promotion(self.resolver.request(whither))
        } else {
            match self.apply(whence, whither, None) {
                Ok(_) => Gesture::Accepted,
                Err(e) => {
                    debug!("{e}");
                    Gesture::Rejected
                }
            }
        }
    }

    /// Completes a promotion once the player has made a choice.
    ///
    /// Returns whether the move was played.
    #[instrument(level = "debug", skip(self, req), fields(anchor = %req.anchor()), ret)]
    pub async fn promote(&mut self, req: PromotionRequest) -> bool {
        let anchor = req.anchor();
        let choice = req.await;

        let (whence, whither) = match self.phase {
            Phase::PromotionPending { whence, whither } if whither == anchor => (whence, whither),
            _ => return false,
        };

        self.phase = Phase::Idle;

        match choice {
            None => false,
            Some(p) => match self.apply(whence, whither, Some(p)) {
                Ok(_) => true,
                Err(e) => {
                    debug!("{e}");
                    false
                }
            },
        }
    }

    /// Asks for the opponent's move if it's their turn.
    ///
    /// Returns [`None`] if it's not the opponent's turn, or if a request is
    /// already in flight.
    #[instrument(level = "debug", skip(self), ret)]
    pub fn request_opponent_move(&mut self) -> Option<OpponentRequest> {
        self.phase = self.phase();

        if self.phase != Phase::Idle || self.game.turn() == self.session.human {
            return None;
        }

        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        self.phase = Phase::AwaitingOpponent { generation };

        Some(OpponentRequest {
            generation,
            request: EngineRequest::new(self.game.position(), self.session.skill),
        })
    }

    /// Plays the opponent's reply to the request stamped with `generation`.
    ///
    /// Replies to any other request are discarded. Failures and invalid
    /// replies leave the game untouched.
    #[instrument(level = "debug", skip(self, reply), ret)]
    pub fn receive_opponent_move<E: Display>(
        &mut self,
        generation: u64,
        reply: Result<EngineReply, E>,
    ) -> bool {
        match self.phase {
            Phase::AwaitingOpponent { generation: g } if g == generation => {
                self.phase = Phase::Idle;
            }

            _ => {
                debug!(generation, "discarded stale reply");
                return false;
            }
        }

        let m = match reply.map(Move::try_from) {
            Ok(Ok(m)) => m,
            Ok(Err(e)) => {
                warn!("{e}");
                return false;
            }
            Err(e) => {
                error!("failed to retrieve the opponent's move: {e}");
                return false;
            }
        };

        match self.apply(m.whence(), m.whither(), m.promotion()) {
            Ok(_) => true,
            Err(e) => {
                warn!("opponent played an illegal move, {e}");
                false
            }
        }
    }

    /// Asks the engine for the opponent's move and plays it.
    ///
    /// Returns whether a move was played.
    pub async fn play_opponent<E: Engine + Send>(&mut self, engine: &mut E) -> bool
    where
        E::Error: Display,
    {
        match self.request_opponent_move() {
            None => false,
            Some(OpponentRequest {
                generation,
                request,
            }) => {
                let reply = engine.play(&request).await;
                self.receive_opponent_move(generation, reply)
            }
        }
    }

    fn apply(
        &mut self,
        whence: Square,
        whither: Square,
        promotion: Option<Promotion>,
    ) -> Result<MoveOutcome, IllegalMove> {
        let outcome = self.game.make(whence, whither, promotion)?;

        self.highlights = Highlights {
            check: outcome.check,
            origin: Some(whence),
            destination: Some(whither),
        };

        self.status = outcome.status;
        if self.game.is_terminal() {
            info!(status = %self.status, "game over");
            self.phase = Phase::Terminal;
        }

        Ok(outcome)
    }
}
