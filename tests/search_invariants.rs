use alfiere::board::{move_to_uci, position_from_fen};
use alfiere::eval::{Evaluate, Evaluator, INFINITE};
use alfiere::search::{Search, SearchParams};
use shakmaty::fen::Fen;
use shakmaty::{Chess, EnPassantMode, Position};

/// Plain minimax without pruning or caching
fn brute_force(evaluator: &Evaluator, pos: &Chess, depth: u8, maximizing: bool) -> i32 {
    if depth == 0 || pos.is_game_over() {
        return evaluator.evaluate(pos);
    }
    let scores = pos.legal_moves().into_iter().map(|mv| {
        let mut child = pos.clone();
        child.play_unchecked(&mv);
        brute_force(evaluator, &child, depth - 1, !maximizing)
    });
    if maximizing {
        scores.max().unwrap_or(-INFINITE)
    } else {
        scores.min().unwrap_or(INFINITE)
    }
}

fn fen_of(pos: &Chess) -> String {
    Fen::from_position(pos.clone(), EnPassantMode::Legal).to_string()
}

fn uncached_search() -> Search {
    Search::with_params(SearchParams::new().use_cache(false))
}

#[test]
fn alpha_beta_matches_brute_force() {
    let cases = [
        ("4k3/pppp4/8/8/8/8/PPPP4/R3K3 w - - 0 1", 3),
        ("8/5k2/8/3p4/2P5/8/5K2/8 b - - 0 1", 3),
        ("r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4", 2),
        ("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", 2),
    ];

    for (fen, max_depth) in cases {
        let pos = position_from_fen(fen).unwrap();
        let maximizing = pos.turn() == shakmaty::Color::White;
        for depth in 1..=max_depth {
            let expected = brute_force(&Evaluator::new(), &pos, depth, maximizing);
            let mut search = uncached_search();
            let got = search.minimax(&pos, depth, -INFINITE, INFINITE, maximizing);
            assert_eq!(got, expected, "{fen} at depth {depth}");
        }
    }
}

#[test]
fn root_score_matches_brute_force() {
    let pos = position_from_fen("8/5k2/8/3p4/2P5/8/5K2/8 w - - 0 1").unwrap();
    let params = SearchParams::new()
        .use_cache(false)
        .start_depth(2)
        .max_depth(2)
        .time_limit(0);
    let mut search = Search::with_params(params);

    let result = search.get_best_move(&pos, true).unwrap();
    let expected = brute_force(&Evaluator::new(), &pos, 2, true);
    assert_eq!(result.score, expected);

    let mut child = pos.clone();
    child.play_unchecked(&result.best_move);
    assert_eq!(brute_force(&Evaluator::new(), &child, 1, false), expected);
}

#[test]
fn pruning_does_less_work() {
    let pos = Chess::default();
    let mut search = uncached_search();
    search.minimax(&pos, 3, -INFINITE, INFINITE, true);
    assert!(search.stats().cutoffs > 0);
    // 1 + 20 + 400 + 8902 nodes without pruning
    assert!(search.stats().nodes < 9323);
}

#[test]
fn zero_budget_returns_legal_move() {
    let pos = Chess::default();
    let mut search = Search::with_params(SearchParams::new().time_limit(0));
    let result = search.get_best_move(&pos, true).unwrap();

    assert_eq!(result.depth, 1);
    assert!(pos.legal_moves().contains(&result.best_move));
}

#[test]
fn mate_in_1_simple() {
    // 1. e4 e5 2. Bc4 Nc6 3. Qh5 Nf6 4. Qxf7#
    let fen = "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4";
    let pos = position_from_fen(fen).unwrap();
    let mut search = Search::with_params(SearchParams::new().max_depth(2).time_limit(0));

    let result = search.get_best_move(&pos, true).unwrap();
    assert_eq!(move_to_uci(&result.best_move), "h5f7");
    assert_eq!(result.score, INFINITE);
}

#[test]
fn mate_in_1_for_black() {
    // Back-rank mate: Rd8-d1#
    let fen = "3r2k1/5ppp/8/8/8/8/5PPP/6K1 b - - 0 1";
    let pos = position_from_fen(fen).unwrap();
    let mut search = Search::with_params(SearchParams::new().max_depth(1).time_limit(0));

    let result = search.get_best_move(&pos, false).unwrap();
    assert_eq!(move_to_uci(&result.best_move), "d8d1");
    assert_eq!(result.score, -INFINITE);
}

#[test]
fn stalemate_has_no_move() {
    let pos = position_from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    let mut search = Search::with_params(SearchParams::new());
    assert!(search.get_best_move(&pos, false).is_err());
}

#[test]
fn search_does_not_touch_input_position() {
    let pos = position_from_fen("4k3/pppp4/8/8/8/8/PPPP4/R3K3 w - - 0 1").unwrap();
    let before = fen_of(&pos);
    let mut search = Search::with_params(SearchParams::new().max_depth(3).time_limit(0));
    search.get_best_move(&pos, true).unwrap();
    assert_eq!(fen_of(&pos), before);
}
