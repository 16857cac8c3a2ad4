use crate::{build::Build, engine::EngineConfig, io::Io, io::Pipe};
use anyhow::{Context, Error as Anyhow};
use clap::Parser;
use lib::board::{BoardConfig, Controller, GameSession, Gesture, OpponentRequest};
use lib::board::{PromotionRequest, Side, SquareStyle};
use lib::chess::{Color, Move, Promotion, Square};
use lib::engine::{Engine, Skill};
use std::{fmt::Display, time::Duration};
use tokio::io::{stdin, stdout};
use tokio::time::sleep;
use tracing::{info, instrument};

/// Play against an engine on the terminal.
#[derive(Debug, Parser)]
#[clap(disable_help_flag = true, disable_version_flag = true)]
pub struct Play {
    /// The opponent.
    #[clap(short, long, env = "CHESSAPP_ENGINE", default_value = "random()")]
    engine: EngineConfig,

    /// The side to play, one of 'w', 'b' or 'r'.
    #[clap(short, long, default_value = "w")]
    side: Side,

    /// The opponent's skill level, from -1 to 20.
    #[clap(short = 'k', long, default_value = "5", allow_hyphen_values = true)]
    skill: Skill,
}

impl Play {
    #[instrument(level = "trace", skip(self), err)]
    pub async fn execute(self) -> Result<(), Anyhow> {
        let engine = self.engine.build()?;
        let io = Pipe::new(stdout(), stdin());
        let human = self.side.resolve(&mut rand::thread_rng());
        let session = GameSession::default().next(human, self.skill);
        Terminal::new(io, engine, session).run().await
    }
}

/// Renders the board as text, from the perspective of its orientation.
fn render(config: &BoardConfig) -> Vec<String> {
    let placement = config.position.split(' ').next().unwrap_or_default();
    let rows: Vec<Vec<char>> = placement
        .split('/')
        .map(|row| {
            row.chars()
                .flat_map(|c| match c.to_digit(10) {
                    Some(n) => vec!['.'; n as usize],
                    None => vec![c],
                })
                .collect()
        })
        .collect();

    let mut files: Vec<usize> = (0..8).collect();
    let mut ranks: Vec<usize> = (0..8).collect();
    if config.orientation == Color::Black {
        files.reverse();
        ranks.reverse();
    }

    let mut lines = Vec::with_capacity(10);
    for &r in &ranks {
        let mut line = format!("{} ", 8 - r);
        for &f in &files {
            let piece = rows.get(r).and_then(|row| row.get(f)).copied().unwrap_or('?');
            let square = format!("{}{}", char::from(b'a' + f as u8), 8 - r);
            let style = square.parse::<Square>().ok().and_then(|s| config.styles.get(&s));
            let marker = match style {
                None => ' ',
                Some(SquareStyle::Check) => '!',
                Some(SquareStyle::Origin | SquareStyle::Destination) => '*',
            };

            line.push(marker);
            line.push(piece);
        }

        lines.push(line);
    }

    let footer: String = files
        .iter()
        .map(|&f| format!(" {}", char::from(b'a' + f as u8)))
        .collect();

    lines.push(format!("  {footer}"));
    lines
}

/// A game played over a line-based interface.
struct Terminal<T: Io, E: Engine> {
    io: T,
    engine: E,
    controller: Controller,
    delay: Duration,
    stalled: bool,
}

impl<T: Io + Send, E: Engine + Send> Terminal<T, E>
where
    E::Error: Display,
{
    /// How long to wait before playing the opponent's reply.
    const DELAY: Duration = Duration::from_millis(200);

    fn new(io: T, engine: E, session: GameSession) -> Self {
        Terminal {
            io,
            engine,
            controller: Controller::new(session),
            delay: Self::DELAY,
            stalled: false,
        }
    }

    async fn say(&mut self, msg: impl Display) -> Result<(), Anyhow> {
        self.io.send(&msg.to_string()).await?;
        self.io.flush().await?;
        Ok(())
    }

    async fn show(&mut self) -> Result<(), Anyhow> {
        for line in render(&self.controller.board()) {
            self.io.send(&line).await?;
        }

        let status = self.controller.status();
        self.say(format!("status: {status}")).await?;

        if status.is_over() {
            let verdict = if status.is_draw() {
                "it's a draw"
            } else if status.winner() == Some(self.controller.session().human) {
                "you win"
            } else {
                "you lose"
            };

            self.say(format!("{verdict}, type `new` to play again")).await?;
        }

        Ok(())
    }

    async fn opponent(&mut self) -> Result<(), Anyhow> {
        if let Some(OpponentRequest {
            generation,
            request,
        }) = self.controller.request_opponent_move()
        {
            let reply = self.engine.play(&request).await;
            sleep(self.delay).await;

            if self.controller.receive_opponent_move(generation, reply) {
                self.show().await?;
            } else {
                self.stalled = true;
                let msg = "the opponent failed to move, type `retry` or start a `new` game";
                self.say(msg).await?;
            }
        }

        Ok(())
    }

    async fn promote(
        &mut self,
        choice: Option<Promotion>,
        req: PromotionRequest,
    ) -> Result<bool, Anyhow> {
        let choice = match choice {
            Some(p) => Some(p),
            None => {
                let choices: Vec<String> =
                    Promotion::ALL.iter().map(|p| p.to_string()).collect();
                self.say(format!("promote to ({})?", choices.join(", "))).await?;
                self.io.recv().await?.trim().parse().ok()
            }
        };

        let resolver = self.controller.resolver();
        match choice {
            Some(p) => resolver.resolve(p),
            None => resolver.cancel(),
        };

        Ok(self.controller.promote(req).await)
    }

    async fn new_game<'a, I>(&mut self, mut args: I) -> Result<(), Anyhow>
    where
        I: Iterator<Item = &'a str>,
    {
        let session = *self.controller.session();

        let side = match args.next() {
            None => Side::from(session.human),
            Some(s) => s.parse().context("invalid side")?,
        };

        let skill = match args.next() {
            None => session.skill,
            Some(s) => s.parse().context("invalid skill level")?,
        };

        let human = side.resolve(&mut rand::thread_rng());
        info!(%human, %skill, "new game");
        self.controller.start(session.next(human, skill));
        self.stalled = false;
        self.show().await
    }

    async fn moves(&mut self, square: Option<&str>) -> Result<(), Anyhow> {
        let whence: Square = square
            .context("missing square")?
            .parse()
            .context("invalid square")?;
        let mut moves: Vec<String> = self
            .controller
            .game()
            .moves_from(whence)
            .iter()
            .map(Move::to_string)
            .collect();

        moves.sort();
        self.say(moves.join(" ")).await
    }

    async fn play(&mut self, m: Move) -> Result<(), Anyhow> {
        let accepted = match self.controller.drop_piece(m.whence(), m.whither()) {
            Gesture::Accepted => true,
            Gesture::Rejected => false,
            Gesture::Promotion(req) => self.promote(m.promotion(), req).await?,
        };

        if accepted {
            self.show().await
        } else {
            self.say(format!("move `{m}` is not allowed")).await
        }
    }

    async fn execute(&mut self, line: &str) -> Result<bool, Anyhow> {
        let mut args = line.split_whitespace();

        match args.next() {
            None => {}
            Some("quit" | "exit") => return Ok(false),
            Some("new") => self.new_game(args).await?,
            Some("retry") => self.stalled = false,
            Some("show") => self.show().await?,
            Some("moves") => self.moves(args.next()).await?,
            Some(cmd) => match cmd.parse::<Move>() {
                Ok(m) => self.play(m).await?,
                Err(e) => self.say(e).await?,
            },
        }

        Ok(true)
    }

    async fn run(&mut self) -> Result<(), Anyhow> {
        self.show().await?;

        loop {
            if !self.stalled {
                self.opponent().await?;
            }

            let line = self.io.recv().await?;
            match self.execute(line.trim()).await {
                Ok(true) => continue,
                Ok(false) => break Ok(()),
                Err(e) => self.say(format!("{e:#}")).await?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MockIo;
    use async_trait::async_trait;
    use lib::chess::{Piece, Role};
    use lib::engine::{EngineReply, EngineRequest};
    use lib::game::Game;
    use std::collections::VecDeque;
    use std::future::ready;
    use std::sync::{Arc, Mutex};
    use tokio::runtime;

    mockall::mock! {
        Opponent {}

        #[async_trait]
        impl Engine for Opponent {
            type Error = String;
            async fn play(&mut self, req: &EngineRequest) -> Result<EngineReply, String>;
        }
    }

    fn reply(from: &str, to: &str) -> Result<EngineReply, String> {
        Ok(EngineReply {
            from: from.into(),
            to: to.into(),
            promotion: None,
        })
    }

    /// A terminal fed with the given lines, that records everything it prints.
    fn terminal(
        lines: &[&str],
        engine: MockOpponent,
        session: GameSession,
    ) -> (Terminal<MockIo, MockOpponent>, Arc<Mutex<Vec<String>>>) {
        let mut io = MockIo::new();
        let mut input: VecDeque<String> = lines.iter().map(|&l| l.into()).collect();
        let output = Arc::new(Mutex::new(Vec::new()));

        io.expect_recv().returning(move || {
            let line = input.pop_front().unwrap_or_else(|| "quit".into());
            Box::pin(ready(Ok(line)))
        });

        let sent = output.clone();
        io.expect_send().returning(move |msg| {
            sent.lock().unwrap().push(msg.to_string());
            Box::pin(ready(Ok(())))
        });

        io.expect_flush().returning(|| Box::pin(ready(Ok(()))));

        let mut terminal = Terminal::new(io, engine, session);
        terminal.delay = Duration::ZERO;
        (terminal, output)
    }

    fn session(human: Color) -> GameSession {
        GameSession::default().next(human, Skill::default())
    }

    #[test]
    fn render_shows_the_board_from_whites_perspective() {
        let controller = Controller::new(session(Color::White));
        let lines = render(&controller.board());
        assert_eq!(lines[0], "8  r n b q k b n r");
        assert_eq!(lines[7], "1  R N B Q K B N R");
        assert_eq!(lines[8], "   a b c d e f g h");
    }

    #[test]
    fn render_shows_the_board_from_blacks_perspective() {
        let controller = Controller::new(session(Color::Black));
        let lines = render(&controller.board());
        assert_eq!(lines[0], "1  R N B K Q B N R");
        assert_eq!(lines[8], "   h g f e d c b a");
    }

    #[test]
    fn render_marks_highlighted_squares() {
        let mut controller = Controller::new(session(Color::White));
        controller.drop_piece("e2".parse().unwrap(), "e4".parse().unwrap());
        let lines = render(&controller.board());
        assert_eq!(lines[4], "4  . . . .*P . . .");
        assert_eq!(lines[6], "2  P P P P*. P P P");
    }

    #[test]
    fn player_and_opponent_take_turns() {
        let rt = runtime::Builder::new_current_thread().enable_time().build().unwrap();

        let mut engine = MockOpponent::new();
        engine
            .expect_play()
            .once()
            .returning(|_| reply("e7", "e5"));

        let (mut t, _) = terminal(&["e2e4", "quit"], engine, session(Color::White));
        rt.block_on(t.run()).unwrap();

        assert_eq!(
            t.controller.game().position().to_string(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2"
        );
    }

    #[test]
    fn player_is_prompted_for_promotion() {
        let rt = runtime::Builder::new_current_thread().enable_time().build().unwrap();

        let mut engine = MockOpponent::new();
        engine
            .expect_play()
            .once()
            .returning(|_| Err("offline".to_string()));

        let (mut t, output) = terminal(&["c7b8", "n"], engine, session(Color::White));
        let game: Game = "rnbqkbnr/2Pp1ppp/p7/4p3/8/8/PP1PPPPP/RNBQKBNR w KQkq - 0 5"
            .parse()
            .unwrap();

        t.controller.resume(*t.controller.session(), game);
        rt.block_on(t.run()).unwrap();

        assert_eq!(
            t.controller.game().position().piece_on("b8".parse().unwrap()),
            Some(Piece(Color::White, Role::Knight))
        );

        assert!(output.lock().unwrap().iter().any(|l| l.starts_with("promote to")));
    }

    #[test]
    fn player_is_told_the_outcome() {
        let rt = runtime::Builder::new_current_thread().enable_time().build().unwrap();

        let mut engine = MockOpponent::new();
        engine.expect_play().never();

        let (mut t, output) = terminal(&["h5f7"], engine, session(Color::White));
        let game: Game = "r1bqkbnr/ppp2ppp/2np4/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 2 4"
            .parse()
            .unwrap();

        t.controller.resume(*t.controller.session(), game);
        rt.block_on(t.run()).unwrap();

        let output = output.lock().unwrap();
        assert!(output.iter().any(|l| l == "status: White Wins"));
        assert!(output.iter().any(|l| l == "you win, type `new` to play again"));
    }

    #[test]
    fn failed_opponent_is_not_retried_unless_asked() {
        let rt = runtime::Builder::new_current_thread().enable_time().build().unwrap();

        let mut engine = MockOpponent::new();
        engine
            .expect_play()
            .times(2)
            .returning(|_| Err("offline".to_string()));

        let (mut t, output) = terminal(&["show", "retry", "show"], engine, session(Color::Black));
        rt.block_on(t.run()).unwrap();

        assert_eq!(t.controller.game(), &Game::default());
        assert!(output.lock().unwrap().iter().any(|l| l.contains("failed to move")));
    }

    #[test]
    fn illegal_moves_are_reported() {
        let rt = runtime::Builder::new_current_thread().enable_time().build().unwrap();

        let mut engine = MockOpponent::new();
        engine.expect_play().never();

        let (mut t, output) = terminal(&["e2e5", "e2"], engine, session(Color::White));
        rt.block_on(t.run()).unwrap();

        assert_eq!(t.controller.game(), &Game::default());
        let output = output.lock().unwrap();
        assert!(output.iter().any(|l| l == "move `e2e5` is not allowed"));
        assert!(output.iter().any(|l| l.contains("not a move")));
    }

    #[test]
    fn new_game_switches_sides() {
        let rt = runtime::Builder::new_current_thread().enable_time().build().unwrap();

        let mut engine = MockOpponent::new();
        engine
            .expect_play()
            .once()
            .returning(|_| reply("d2", "d4"));

        let (mut t, _) = terminal(&["new b 3"], engine, session(Color::White));
        let sequence = t.controller.session().sequence;
        rt.block_on(t.run()).unwrap();

        assert_eq!(t.controller.session().human, Color::Black);
        assert_eq!(t.controller.session().skill, Skill::new(3).unwrap());
        assert_ne!(t.controller.session().sequence, sequence);
        assert!(t.controller.can_drag());
    }

    #[test]
    fn moves_lists_legal_moves_of_a_piece() {
        let rt = runtime::Builder::new_current_thread().enable_time().build().unwrap();

        let mut engine = MockOpponent::new();
        engine.expect_play().never();

        let (mut t, output) = terminal(&["moves b1"], engine, session(Color::White));
        rt.block_on(t.run()).unwrap();

        assert!(output.lock().unwrap().iter().any(|l| l == "b1a3 b1c3"));
    }
}
