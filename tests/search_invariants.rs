use rand::rngs::StdRng;
use rand::SeedableRng;
use tavola::board::{Piece, Side};
use tavola::eval::{is_decisive, WIN};
use tavola::rules::board_from_fen;
use tavola::rules::kinds::{KING, ROOK};
use tavola::search::{Search, SearchParams};
use tavola::{Algorithm, Game, Rules, Variant};

fn find_mate(fen: &str, depth: u8, expected_move: &str) {
    let rules = Rules::new(Variant::Chess);
    let board = board_from_fen(fen).expect("Invalid FEN");
    let moves = rules.generate_moves(&board);

    for algorithm in [Algorithm::Minimax, Algorithm::Negamax] {
        let params = SearchParams::new().max_depth(depth).algorithm(algorithm);
        let mut search = Search::new(&rules, &board, params);
        let outcome = search.run(&moves, &mut StdRng::seed_from_u64(0)).unwrap();
        let mv = outcome.best_move.expect("a move");
        let text = rules.move_to_string(&board, &mv);

        assert!(outcome.score >= WIN, "Score {} indicates no mate found!", outcome.score);
        assert_eq!(text, expected_move, "Failed to find specific mate move ({algorithm})");
    }
}

#[test]
fn mate_in_1_back_rank() {
    // Near king g6, rook a1; Far king h8
    find_mate("7k/8/6K1/8/8/8/8/R7 w - - 0 1", 2, "a1-a8");
}

#[test]
fn mate_in_1_scholars() {
    // 1. e4 e5 2. Bc4 Nc6 3. Qh5 Nf6 4. Qxf7#
    find_mate(
        "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4",
        2,
        "h5xf7",
    );
}

#[test]
fn faster_mate_scores_higher() {
    let rules = Rules::new(Variant::Chess);
    let board = board_from_fen("7k/8/6K1/8/8/8/8/R7 w - - 0 1").unwrap();
    let moves = rules.generate_moves(&board);
    let shallow = Search::new(&rules, &board, SearchParams::new().max_depth(2))
        .run(&moves, &mut StdRng::seed_from_u64(0))
        .unwrap();
    let deep = Search::new(&rules, &board, SearchParams::new().max_depth(4))
        .run(&moves, &mut StdRng::seed_from_u64(0))
        .unwrap();
    // the mate is one ply deep either way; more remaining depth means a larger bonus
    assert_eq!(shallow.score, WIN + 1);
    assert_eq!(deep.score, WIN + 3);
    assert_eq!(shallow.best_move, deep.best_move);
}

#[test]
fn search_does_not_touch_the_game() {
    let mut game = Game::with_variant(Variant::Chess);
    game.new_game();
    let before = game.to_string();
    let mut rng = StdRng::seed_from_u64(11);
    let outcome = tavola::search::best_move(&game, SearchParams::new().max_depth(3), &mut rng).unwrap();
    assert!(outcome.best_move.is_some());
    assert_eq!(game.to_string(), before);
    assert!(game.history().is_empty());
}

#[test]
fn checkmated_root_yields_no_move() {
    let mut game = Game::with_variant(Variant::Chess);
    game.clear();
    game.set_piece(63, Some(Piece::new(KING, Side::Far))).unwrap();
    game.set_piece(56, Some(Piece::new(ROOK, Side::Near))).unwrap();
    game.set_piece(46, Some(Piece::new(KING, Side::Near))).unwrap();
    game.set_turn(Side::Far);

    let mut rng = StdRng::seed_from_u64(1);
    let outcome = tavola::search::best_move(&game, SearchParams::new(), &mut rng).unwrap();
    assert!(outcome.best_move.is_none());
    assert!(is_decisive(outcome.score));
    assert!(outcome.score < 0);
}

#[test]
fn randomized_ties_pick_among_equals() {
    // Opening position at depth 1 in checkers: every move keeps material level
    let rules = Rules::new(Variant::Checkers);
    let board = rules.setup_board();
    let moves = rules.generate_moves(&board);
    let params = SearchParams::new().max_depth(1).randomize_ties(true);

    let mut seen = std::collections::HashSet::new();
    let mut ties = 0;
    for seed in 0..32 {
        let outcome = Search::new(&rules, &board, params.clone())
            .run(&moves, &mut StdRng::seed_from_u64(seed))
            .unwrap();
        ties = outcome.ties;
        seen.insert(outcome.best_move.unwrap());
    }
    assert!(seen.len() <= ties.max(1));
    if ties > 1 {
        assert!(seen.len() > 1, "32 seeds always picked the same of {ties} tied moves");
    }
}
