use crate::{build::Build, engine::EngineConfig, engine::UciOptions};
use anyhow::{Context, Error as Anyhow};
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{routing::get, routing::post, Router};
use clap::Parser;
use derive_more::{Display, Error, From};
use lib::chess::{ParsePositionError, Position};
use lib::engine::{Engine as _, EngineReply, EngineRequest};
use serde_json::{json, Value};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, instrument};

/// Serve an engine over HTTP.
#[derive(Debug, Parser)]
#[clap(disable_help_flag = true, disable_version_flag = true)]
pub struct Serve {
    /// The address to listen on.
    #[clap(short, long, default_value = "127.0.0.1:8000")]
    address: SocketAddr,

    /// Path to a UCI engine, such as Stockfish.
    ///
    /// Without it, every request is answered with a random move.
    #[clap(short, long, env = "CHESSAPP_STOCKFISH")]
    stockfish: Option<String>,
}

impl Serve {
    #[instrument(level = "trace", skip(self), err)]
    pub async fn execute(self) -> Result<(), Anyhow> {
        let listener = TcpListener::bind(self.address)
            .await
            .with_context(|| format!("failed to listen on `{}`", self.address))?;

        info!(address = %listener.local_addr()?, "listening");

        let service = Service {
            stockfish: self.stockfish,
        };

        axum::serve(listener, router(service)).await?;
        Ok(())
    }
}

/// The reason why the service refused to reply with a move.
#[derive(Debug, Display, Error, From)]
enum Failure {
    #[display(fmt = "Invalid FEN: {_0}")]
    InvalidFen(ParsePositionError),
    #[display(fmt = "Game is already over")]
    #[from(ignore)]
    GameOver,
    #[display(fmt = "Engine failed: {_0}")]
    #[from(ignore)]
    Engine(#[error(not(source))] String),
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let detail = json!({ "detail": self.to_string() });
        (StatusCode::BAD_REQUEST, Json(detail)).into_response()
    }
}

/// The halfmove clock at which a game ends without either side claiming a draw.
const SEVENTY_FIVE_MOVES: u32 = 150;

#[derive(Debug, Default, Clone)]
struct Service {
    stockfish: Option<String>,
}

impl Service {
    /// The engine that should handle `req`.
    fn engine(&self, req: &EngineRequest) -> EngineConfig {
        match &self.stockfish {
            Some(path) if !req.skill_level.is_random() => {
                let options = UciOptions::from([
                    ("Threads".into(), Some("1".into())),
                    ("Hash".into(), Some("16".into())),
                ]);

                EngineConfig::Uci(path.clone(), options)
            }

            _ => EngineConfig::Random(),
        }
    }
}

fn router(service: Service) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/new-game", get(new_game))
        .route("/engine-move", post(engine_move))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(service))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn new_game() -> Json<Value> {
    Json(json!({ "fen": Position::default().to_string() }))
}

#[instrument(level = "debug", skip(service), ret, err)]
async fn engine_move(
    State(service): State<Arc<Service>>,
    Json(req): Json<EngineRequest>,
) -> Result<Json<EngineReply>, Failure> {
    let pos: Position = req.fen.parse()?;
    if pos.is_game_over() || pos.halfmoves() >= SEVENTY_FIVE_MOVES {
        return Err(Failure::GameOver);
    }

    let mut engine = service
        .engine(&req)
        .build()
        .map_err(|e| Failure::Engine(e.to_string()))?;

    let reply = engine
        .play(&req)
        .await
        .map_err(|e| Failure::Engine(e.to_string()))?;

    Ok(Json(reply))
}
