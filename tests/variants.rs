use tavola::board::{Piece, Side};
use tavola::rules::kinds::{DRAUGHTS_KING, MAN, STONE};
use tavola::search::SearchParams;
use tavola::{AiPlayer, Game, RandomPlayer, Rules, Status, Step, Variant};

#[test]
fn every_variant_starts_with_moves_and_balance() {
    for variant in Variant::ALL {
        let mut game = Game::with_variant(variant);
        game.new_game();
        assert!(!game.compute_moves().is_empty(), "{variant}");
        assert_eq!(game.status(), Status::Ongoing, "{variant}");
        assert_eq!(
            game.board().count(Side::Near),
            game.board().count(Side::Far),
            "{variant}"
        );
        assert_eq!(game.turn(), Side::Near);
    }
}

#[test]
fn board_shapes() {
    let shapes = [
        (Variant::Chess, (8, 8), 16),
        (Variant::DragonChess, (10, 8), 20),
        (Variant::Checkers, (8, 8), 12),
        (Variant::CanadianDraughts, (12, 12), 30),
        (Variant::Ugolki, (8, 8), 9),
    ];
    for (variant, dims, pieces) in shapes {
        let rules = Rules::new(variant);
        assert_eq!(rules.dimensions(), dims, "{variant}");
        assert_eq!(rules.setup_board().count(Side::Near), pieces, "{variant}");
    }
}

#[test]
fn ai_plays_a_few_moves_in_every_variant() {
    for variant in Variant::ALL {
        let mut game = Game::with_variant(variant);
        game.new_game();
        game.set_player(Side::Near, Some(Box::new(AiPlayer::with_seed(SearchParams::new().max_depth(2), 1))));
        game.set_player(Side::Far, Some(Box::new(RandomPlayer::new(2))));
        let mut moved = 0;
        for _ in 0..6 {
            match game.run_game().unwrap() {
                Step::Moved(_) => moved += 1,
                Step::Selected(_) => {}
                Step::Finished(_) => break,
            }
        }
        assert_eq!(game.history().len(), moved, "{variant}");
        assert!(moved > 0, "{variant}");
    }
}

#[test]
fn shashki_flying_king_lands_anywhere_past_the_capture() {
    let mut game = Game::with_variant(Variant::Shashki);
    // Near king a1, Far man c3: landings d4, e5, f6, g7, h8
    game.set_piece(0, Some(Piece::new(DRAUGHTS_KING, Side::Near))).unwrap();
    game.set_piece(18, Some(Piece::new(MAN, Side::Far))).unwrap();
    let mut landings: Vec<String> = game.compute_moves().iter().map(|m| game.move_to_string(m)).collect();
    landings.sort();
    assert_eq!(landings, vec!["a1xd4", "a1xe5", "a1xf6", "a1xg7", "a1xh8"]);

    // checkers kings only jump to the square right behind
    let mut game = Game::with_variant(Variant::Checkers);
    game.set_piece(0, Some(Piece::new(DRAUGHTS_KING, Side::Near))).unwrap();
    game.set_piece(9, Some(Piece::new(MAN, Side::Far))).unwrap();
    let moves: Vec<String> = game.compute_moves().iter().map(|m| game.move_to_string(m)).collect();
    assert_eq!(moves, vec!["a1xc3"]);
}

#[test]
fn shashki_men_capture_backwards() {
    let mut game = Game::with_variant(Variant::Shashki);
    // Near man d4, Far man c3 behind it
    game.set_piece(27, Some(Piece::new(MAN, Side::Near))).unwrap();
    game.set_piece(18, Some(Piece::new(MAN, Side::Far))).unwrap();
    game.set_piece(63, Some(Piece::new(MAN, Side::Far))).unwrap();
    let moves: Vec<String> = game.compute_moves().iter().map(|m| game.move_to_string(m)).collect();
    assert_eq!(moves, vec!["d4xb2"]);

    let mut game = Game::with_variant(Variant::Checkers);
    game.set_piece(27, Some(Piece::new(MAN, Side::Near))).unwrap();
    game.set_piece(18, Some(Piece::new(MAN, Side::Far))).unwrap();
    game.set_piece(63, Some(Piece::new(MAN, Side::Far))).unwrap();
    assert!(game.compute_moves().iter().all(|m| !m.is_capture()));
}

#[test]
fn ugolki_stones_jump_in_chains() {
    let mut game = Game::with_variant(Variant::Ugolki);
    // Near stone a1 with stones on a2 and a4 to hop over
    game.set_piece(0, Some(Piece::new(STONE, Side::Near))).unwrap();
    game.set_piece(8, Some(Piece::new(STONE, Side::Far))).unwrap();
    game.set_piece(24, Some(Piece::new(STONE, Side::Near))).unwrap();
    game.set_piece(63, Some(Piece::new(STONE, Side::Far))).unwrap();
    let from_a1: Vec<String> = game
        .compute_moves()
        .iter()
        .filter(|m| m.from == 0)
        .map(|m| game.move_to_string(m))
        .collect();
    assert_eq!(from_a1, vec!["a1-b1", "a1-a3", "a1-a5"]);
    game.play("a1a5").unwrap();
    // jumping captures nothing
    assert_eq!(game.board().count(Side::Far), 2);
}

#[test]
fn dragon_moves_as_knight_and_bishop() {
    let rules = Rules::new(Variant::DragonChess);
    let board = rules.setup_board();
    let moves = rules.generate_moves(&board);
    // 10 pawns with single and double pushes plus 2 knights and 2 dragons with 2 jumps each
    assert_eq!(moves.len(), 28);
    let d1 = board.square(3, 0).unwrap();
    assert_eq!(rules.piece_symbol(board.piece_on(d1).unwrap()), 'D');
}
