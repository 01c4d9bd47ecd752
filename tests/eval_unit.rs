use tavola::board::{Piece, Side};
use tavola::eval::{evaluate, evaluate_board, heuristic, is_decisive, DRAW, HEURISTIC_LIMIT, LOSS, WIN};
use tavola::rules::board_from_fen;
use tavola::rules::kinds::{MAN, STONE};
use tavola::{Game, Rules, Variant};

#[test]
fn test_starting_positions_are_balanced() {
    for variant in Variant::ALL {
        let mut game = Game::with_variant(variant);
        game.new_game();
        assert_eq!(evaluate(&game, 0), 0, "{variant} start should be 0");
    }
}

#[test]
fn test_material_difference() {
    let rules = Rules::new(Variant::Chess);
    // Far missing the e-pawn
    let board = board_from_fen("rnbqkbnr/pppp1ppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
    let score = evaluate_board(&rules, &board, 0);
    assert!(score > 50, "Near should be up material, got {score}");

    // same position, Far to move: the sign flips
    let board = board_from_fen("rnbqkbnr/pppp1ppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1").unwrap();
    assert_eq!(evaluate_board(&rules, &board, 0), -score);
}

#[test]
fn test_knight_centralisation() {
    let rules = Rules::new(Variant::Chess);
    // a pawn keeps the material sufficient
    let corner = board_from_fen("N7/8/8/8/8/5k2/P7/5K2 w - - 0 1").unwrap();
    let centre = board_from_fen("8/8/8/3N4/8/5k2/P7/5K2 w - - 0 1").unwrap();
    let score_corner = evaluate_board(&rules, &corner, 0);
    let score_centre = evaluate_board(&rules, &centre, 0);
    assert!(
        score_centre > score_corner,
        "Knight in centre ({}) should be better than corner ({})",
        score_centre,
        score_corner
    );
}

#[test]
fn test_stalemate_scores_a_draw() {
    let rules = Rules::new(Variant::Chess);
    let board = board_from_fen("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1").unwrap();
    assert_eq!(evaluate_board(&rules, &board, 2), DRAW);
}

#[test]
fn test_decided_draughts_position() {
    let rules = Rules::new(Variant::Checkers);
    let mut board = rules.empty_board();
    board.set_piece(0, Some(Piece::new(MAN, Side::Near)));
    // Near to move with pieces, Far has none
    assert_eq!(evaluate_board(&rules, &board, 0), WIN);
    assert_eq!(evaluate_board(&rules, &board, 5), WIN + 5);

    let suicide = Rules::new(Variant::Suicide);
    assert_eq!(evaluate_board(&suicide, &board, 0), LOSS);
}

#[test]
fn test_heuristic_stays_inside_the_sentinels() {
    for variant in Variant::ALL {
        let rules = Rules::new(variant);
        let board = rules.setup_board();
        let h = heuristic(&rules, &board);
        assert!(h.abs() <= HEURISTIC_LIMIT);
        assert!(!is_decisive(h));
    }
}

#[test]
fn test_ugolki_progress() {
    let rules = Rules::new(Variant::Ugolki);
    let mut board = rules.empty_board();
    board.set_piece(0, Some(Piece::new(STONE, Side::Near)));
    board.set_piece(63, Some(Piece::new(STONE, Side::Far)));
    let level = evaluate_board(&rules, &board, 0);
    board.set_piece(0, None);
    board.set_piece(27, Some(Piece::new(STONE, Side::Near)));
    assert!(evaluate_board(&rules, &board, 0) > level);
}
