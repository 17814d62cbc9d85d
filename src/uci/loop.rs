//! Minimal UCI event loop and state machine for Alfiere
//!
//! `go` is answered synchronously: the search runs to completion and the
//! `bestmove` line is part of the same response batch.

use std::io::{self, BufRead, Write};
use std::time::Instant;

use shakmaty::{Chess, Color, Position};
use tracing::{debug, warn};

use super::options::{UciOption, UciOptions};
use super::parser::{parse_uci_command, GoParams, UciCommand};
use crate::board::{apply_uci_moves, move_to_uci, position_from_fen, START_FEN};
use crate::book::{NoBook, PolyglotBook};
use crate::engine::{Engine, MoveSource, Strategy};
use crate::error::EngineError;
use crate::eval::INFINITE;
use crate::search::params::TimeManagement;
use crate::search::SearchParams;
use crate::time::TimeManager;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciState {
    Init,
    Ready,
}

pub struct UciEngine {
    state: UciState,
    position: Chess,
    running: bool,
    options: UciOptions,
    engine: Engine,
}

impl UciEngine {
    pub fn new() -> Self {
        Self::with_options(UciOptions::default())
    }

    pub fn with_options(options: UciOptions) -> Self {
        let engine = Engine::new(options.engine_config());
        Self {
            state: UciState::Init,
            position: Chess::default(),
            running: true,
            options,
            engine,
        }
    }

    pub fn state(&self) -> &UciState {
        &self.state
    }

    pub fn position(&self) -> &Chess {
        &self.position
    }

    pub fn options(&self) -> &UciOptions {
        &self.options
    }

    pub fn handle_command(&mut self, cmd: UciCommand) -> Vec<String> {
        let mut res = Vec::new();
        match cmd {
            UciCommand::Uci => {
                res.push(format!("id name {}", self.options.engine_name));
                res.push(format!("id author {}", self.options.author));
                res.extend(
                    UciOptions::definitions()
                        .iter()
                        .map(UciOption::to_uci_line),
                );
                res.push("uciok".to_string());
                self.state = UciState::Ready;
            }
            UciCommand::IsReady => {
                res.push("readyok".to_string());
            }
            UciCommand::Position { fen, moves } => {
                // Validate the whole command before replacing the current position
                let fen_str = fen.as_deref().unwrap_or(START_FEN);
                let result = position_from_fen(fen_str)
                    .and_then(|pos| apply_uci_moves(pos, moves.iter().map(String::as_str)));
                match result {
                    Ok(pos) => self.position = pos,
                    Err(e) => res.push(format!("info string {e}")),
                }
                self.state = UciState::Ready;
            }
            UciCommand::Go(go) => {
                self.go(&go, &mut res);
                self.state = UciState::Ready;
            }
            UciCommand::Stop => {
                // Searches are synchronous, nothing is running by now
                self.state = UciState::Ready;
            }
            UciCommand::UciNewGame => {
                self.position = Chess::default();
                self.engine.new_game();
                self.state = UciState::Ready;
            }
            UciCommand::SetOption { name, value } => {
                match self.options.set_option(&name, value.as_deref()) {
                    Ok(()) => {
                        self.apply_option(&name, &mut res);
                    }
                    Err(e) => res.push(format!("info string error: {e}")),
                }
            }
            UciCommand::Quit => {
                self.running = false;
            }
            UciCommand::Unknown(s) => {
                res.push(format!("info string unknown command: {}", s));
            }
        }
        res
    }

    /// Push the stored option value into the engine
    fn apply_option(&mut self, name: &str, res: &mut Vec<String>) {
        match name.to_ascii_lowercase().as_str() {
            "bookfile" => match &self.options.book_file {
                Some(path) => match PolyglotBook::open(path) {
                    Ok(book) => {
                        res.push(format!(
                            "info string book {} loaded ({} entries)",
                            path,
                            book.len()
                        ));
                        self.engine.set_book(Box::new(book));
                    }
                    Err(e) => {
                        warn!(path = %path, error = %e, "failed to load opening book");
                        res.push(format!("info string error: {e}"));
                        self.options.book_file = None;
                        self.engine.set_book(Box::new(NoBook));
                    }
                },
                None => self.engine.set_book(Box::new(NoBook)),
            },
            "mctsiterations" => {
                let params = self
                    .engine
                    .mcts_params()
                    .clone()
                    .iterations(self.options.mcts_iterations);
                self.engine.set_mcts_params(params);
            }
            "seed" => self.engine.reseed(self.options.rng_seed()),
            "usecache" => {
                let params = self
                    .engine
                    .search_params()
                    .clone()
                    .use_cache(self.options.use_cache);
                self.engine.set_search_params(params);
            }
            "piecesquaretables" => self.engine.set_piece_square(self.options.piece_square),
            _ => {}
        }
        debug!(option = name, "option applied");
    }

    fn go(&mut self, go: &GoParams, res: &mut Vec<String>) {
        let side_white = self.position.turn() == Color::White;
        let strategy = self.options.strategy;

        if strategy == Strategy::AlphaBeta {
            let params = self.engine.search_params().clone();
            let params = match go.depth {
                // Depth alone: no clock, the depth cap ends the search
                Some(depth) if !go.has_clock() => params.max_depth(depth).time_limit(u64::MAX),
                depth => {
                    let time_alloc = TimeManager::allocate_time(
                        &TimeManagement::new(),
                        go.wtime,
                        go.btime,
                        go.winc,
                        go.binc,
                        go.movetime,
                        go.movestogo,
                        side_white,
                    );
                    params
                        .max_depth(depth.unwrap_or(SearchParams::default().max_depth))
                        .time_limit(time_alloc)
                }
            };
            self.engine.set_search_params(params);
        }

        let search_start = Instant::now();
        match self.engine.choose_move(&self.position, strategy) {
            Ok(mv) => {
                let search_time_ms = search_start.elapsed().as_millis() as u64;
                match (self.engine.last_source(), strategy) {
                    (Some(MoveSource::Book), _) => {
                        res.push("info string book move".to_string());
                    }
                    (_, Strategy::AlphaBeta) => {
                        let stats = self.engine.stats();
                        res.push(format!(
                            "info depth {} score {} nodes {} time {}",
                            stats.completed_depth,
                            uci_score(self.engine.last_score(), side_white),
                            stats.nodes,
                            search_time_ms
                        ));
                    }
                    (_, Strategy::Mcts) => {
                        res.push(format!(
                            "info string mcts iterations {} time {}",
                            self.engine.mcts_params().iterations,
                            search_time_ms
                        ));
                    }
                }
                res.push(format!("bestmove {}", move_to_uci(&mv)));
            }
            Err(EngineError::NoLegalMoves) => {
                res.push("info string position is terminal (checkmate or stalemate)".to_string());
                res.push("bestmove 0000".to_string());
            }
            Err(e) => {
                res.push(format!("info string error: {e}"));
                res.push("bestmove 0000".to_string());
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Default for UciEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a White-positive score from the side to move's point of view
fn uci_score(score: Option<i32>, side_white: bool) -> String {
    let score = score.unwrap_or(0);
    let score = if side_white { score } else { -score };
    match score {
        INFINITE => "mate 1".to_string(),
        s if s == -INFINITE => "mate -1".to_string(),
        s => format!("cp {s}"),
    }
}

pub fn run_uci_loop() -> io::Result<()> {
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let stdout = io::stdout();
    let mut writer = stdout.lock();

    let mut engine = UciEngine::new();
    let mut buf = String::new();

    while engine.is_running() {
        buf.clear();
        let n = reader.read_line(&mut buf)?;
        if n == 0 {
            // EOF reached
            break;
        }
        let line = buf.trim();
        if line.is_empty() {
            continue;
        }

        let cmd = parse_uci_command(line);
        let responses = engine.handle_command(cmd);

        for r in responses {
            writeln!(writer, "{}", r)?;
        }

        // Always flush so the GUI sees each answer immediately
        writer.flush()?;
    }

    Ok(())
}

pub fn process_uci_line(line: &str, engine: &mut UciEngine) -> Vec<String> {
    let cmd = parse_uci_command(line);
    engine.handle_command(cmd)
}
