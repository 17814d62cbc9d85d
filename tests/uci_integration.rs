//! Integration tests for UCI protocol implementation

use alfiere::uci::{process_uci_line, UciEngine, UciOptions, UciState};
use shakmaty::Position;

fn seeded_engine() -> UciEngine {
    let mut options = UciOptions::new();
    options.seed = 12;
    options.mcts_iterations = 40;
    UciEngine::with_options(options)
}

#[test]
fn test_uci_engine_lifecycle() {
    let mut engine = UciEngine::new();
    assert_eq!(*engine.state(), UciState::Init);

    let responses = process_uci_line("uci", &mut engine);
    assert!(responses[0].starts_with("id name Alfiere"));
    assert!(responses[1].starts_with("id author"));
    assert!(responses
        .iter()
        .any(|r| r.starts_with("option name Strategy type combo")));
    assert_eq!(responses.last().map(String::as_str), Some("uciok"));
    assert_eq!(*engine.state(), UciState::Ready);
}

#[test]
fn test_basic_commands() {
    let mut engine = UciEngine::new();
    assert_eq!(process_uci_line("isready", &mut engine), vec!["readyok"]);

    let responses = process_uci_line("flip", &mut engine);
    assert_eq!(responses, vec!["info string unknown command: flip"]);

    assert!(engine.is_running());
    process_uci_line("quit", &mut engine);
    assert!(!engine.is_running());
}

#[test]
fn test_go_depth() {
    let mut engine = seeded_engine();
    process_uci_line("position startpos moves e2e4", &mut engine);
    let responses = process_uci_line("go depth 2", &mut engine);

    assert_eq!(responses.len(), 2);
    assert!(responses[0].starts_with("info depth 2 score cp"));
    assert!(responses[1].starts_with("bestmove "));
    assert_ne!(responses[1], "bestmove 0000");
}

#[test]
fn test_go_finds_mate() {
    let mut engine = seeded_engine();
    process_uci_line(
        "position fen r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4",
        &mut engine,
    );
    let responses = process_uci_line("go depth 1", &mut engine);
    assert!(responses[0].contains("score mate 1"));
    assert_eq!(responses[1], "bestmove h5f7");
}

#[test]
fn test_go_on_finished_game() {
    let mut engine = seeded_engine();
    process_uci_line("position fen 7k/5Q2/6K1/8/8/8/8/8 b - - 0 1", &mut engine);
    let responses = process_uci_line("go depth 3", &mut engine);
    assert_eq!(responses.last().map(String::as_str), Some("bestmove 0000"));
}

#[test]
fn test_illegal_move_keeps_previous_position() {
    let mut engine = seeded_engine();
    process_uci_line("position startpos moves e2e4", &mut engine);
    let before = engine.position().clone();

    let responses = process_uci_line("position startpos moves e2e4 e2e4", &mut engine);
    assert_eq!(responses, vec!["info string illegal move: e2e4"]);
    assert_eq!(engine.position().board(), before.board());
}

#[test]
fn test_invalid_fen_is_reported() {
    let mut engine = seeded_engine();
    let responses = process_uci_line("position fen not/a/fen w - - 0 1", &mut engine);
    assert_eq!(responses.len(), 1);
    assert!(responses[0].starts_with("info string invalid FEN"));
}

#[test]
fn test_mcts_strategy() {
    let mut engine = seeded_engine();
    let responses = process_uci_line("setoption name Strategy value MCTS", &mut engine);
    assert!(responses.is_empty());

    process_uci_line("position startpos", &mut engine);
    let responses = process_uci_line("go movetime 100", &mut engine);
    assert!(responses[0].starts_with("info string mcts iterations 40"));
    assert!(responses[1].starts_with("bestmove "));
}

#[test]
fn test_bad_option_is_reported() {
    let mut engine = seeded_engine();
    let responses = process_uci_line("setoption name Threads value 4", &mut engine);
    assert_eq!(
        responses,
        vec!["info string error: invalid option: unknown option: Threads"]
    );

    let responses = process_uci_line(
        "setoption name BookFile value /nonexistent/book.bin",
        &mut engine,
    );
    assert!(responses[0].starts_with("info string error: failed to read opening book"));
    assert!(engine.options().book_file.is_none());
}

#[test]
fn test_ucinewgame_resets_position() {
    let mut engine = seeded_engine();
    process_uci_line("position startpos moves e2e4 e7e5", &mut engine);
    process_uci_line("ucinewgame", &mut engine);
    assert_eq!(engine.position().board(), shakmaty::Chess::default().board());
}
