use std::process::ExitCode;
use std::time::Instant;

use alfiere::board::{move_to_uci, position_from_fen, START_FEN};
use alfiere::book::PolyglotBook;
use alfiere::search::{MctsParams, SearchParams};
use alfiere::{Engine, EngineConfig, EngineError, EngineResult, MoveSource, Strategy};
use clap::Parser;

/// Pick one move for a position and print it in UCI notation
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = String::from(START_FEN))]
    fen: String,

    /// alphabeta or mcts
    #[arg(short, long, default_value_t = Strategy::AlphaBeta)]
    strategy: Strategy,

    /// Maximum alpha-beta depth
    #[arg(short, long, default_value_t = 4)]
    depth: u8,

    #[arg(long, default_value_t = 1)]
    start_depth: u8,

    /// Alpha-beta time budget, checked between depths
    #[arg(short, long, default_value_t = 5000)]
    time_ms: u64,

    /// MCTS iterations
    #[arg(short, long, default_value_t = 1000)]
    iterations: u32,

    #[arg(long)]
    seed: Option<u64>,

    /// Polyglot opening book
    #[arg(short, long)]
    book: Option<String>,

    /// Material and pawn structure only
    #[arg(long)]
    no_piece_square: bool,

    /// Print alpha-beta search statistics after the move
    #[arg(long)]
    stats: bool,
}

fn run(args: &Args) -> EngineResult<()> {
    let pos = position_from_fen(&args.fen)?;

    let config = EngineConfig {
        search: SearchParams::new()
            .start_depth(args.start_depth)
            .max_depth(args.depth)
            .time_limit(args.time_ms),
        mcts: MctsParams::new().iterations(args.iterations),
        seed: args.seed,
        piece_square: !args.no_piece_square,
    };
    let mut engine = Engine::new(config);
    if let Some(path) = &args.book {
        engine.set_book(Box::new(PolyglotBook::open(path)?));
    }

    let start = Instant::now();
    let mv = engine.choose_move(&pos, args.strategy)?;
    let elapsed = start.elapsed();

    match engine.last_source() {
        Some(MoveSource::Book) => eprintln!("book move"),
        _ if args.strategy == Strategy::AlphaBeta => {
            let stats = engine.stats();
            eprintln!(
                "depth {} score {} nodes {} ({} ms)",
                stats.completed_depth,
                engine.last_score().unwrap_or(0),
                stats.nodes,
                elapsed.as_millis()
            );
        }
        _ => eprintln!("{} iterations ({} ms)", args.iterations, elapsed.as_millis()),
    }

    println!("{}", move_to_uci(&mv));
    if args.stats
        && args.strategy == Strategy::AlphaBeta
        && engine.last_source() == Some(MoveSource::Search)
    {
        engine.stats().print_summary();
        println!("Cache entries: {}", engine.cache_len());
    }
    Ok(())
}

fn main() -> ExitCode {
    alfiere::init_logging();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(EngineError::NoLegalMoves) => {
            println!("0000");
            eprintln!("no legal moves: the game is over");
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
