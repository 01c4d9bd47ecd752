use tavola::board::{Piece, Side};
use tavola::rules::kinds::{DRAUGHTS_KING, MAN};
use tavola::search::SearchParams;
use tavola::{AiPlayer, Game, GameError, GameState, Step, Variant};

// Near man c3; Far men d4 and f6; Near to move
fn double_jump(variant: Variant) -> Game {
    let mut game = Game::with_variant(variant);
    game.set_piece(18, Some(Piece::new(MAN, Side::Near))).unwrap();
    game.set_piece(27, Some(Piece::new(MAN, Side::Far))).unwrap();
    game.set_piece(45, Some(Piece::new(MAN, Side::Far))).unwrap();
    game.refresh_game_state();
    game
}

#[test]
fn capture_is_the_only_legal_move() {
    let game = double_jump(Variant::Checkers);
    let moves = game.compute_moves();
    assert_eq!(moves.len(), 1);
    assert_eq!(game.move_to_string(&moves[0]), "c3xe5");
    assert!(moves[0].continues());
}

#[test]
fn quiet_move_is_rejected_while_a_capture_exists() {
    let mut game = double_jump(Variant::Checkers);
    assert!(matches!(game.play("c3b4"), Err(GameError::IllegalMove { .. })));
    assert!(game.history().is_empty());
}

#[test]
fn multi_jump_keeps_the_turn() {
    let mut game = double_jump(Variant::Checkers);
    game.play("c3xe5").unwrap();
    assert_eq!(game.turn(), Side::Near);
    assert_eq!(game.board().chain(), Some(36));

    let moves = game.compute_moves();
    assert_eq!(moves.len(), 1);
    assert_eq!(game.move_to_string(&moves[0]), "e5xg7");

    game.play("e5g7").unwrap();
    assert_eq!(game.state(), GameState::Won(Side::Near));
    assert_eq!(game.winner(), Some(Side::Near));
    assert_eq!(game.board().count(Side::Far), 0);
}

#[test]
fn ai_completes_the_chain_through_run_game() {
    let mut game = double_jump(Variant::Checkers);
    let params = SearchParams::new().max_depth(3);
    game.set_player(Side::Near, Some(Box::new(AiPlayer::with_seed(params.clone(), 1))));
    game.set_player(Side::Far, Some(Box::new(AiPlayer::with_seed(params, 2))));

    let mut played = Vec::new();
    loop {
        match game.run_game().unwrap() {
            Step::Moved(mv) => played.push(game.rules().move_to_string(game.board(), &mv)),
            Step::Selected(_) => {}
            Step::Finished(state) => {
                assert_eq!(state, GameState::Won(Side::Near));
                break;
            }
        }
    }
    assert_eq!(played, vec!["c3xe5", "e5xg7"]);
}

#[test]
fn suicide_rewards_losing_everything() {
    let mut game = double_jump(Variant::Suicide);
    game.play("c3xe5").unwrap();
    game.play("e5xg7").unwrap();
    assert_eq!(game.winner(), Some(Side::Far));
}

#[test]
fn lone_king_walks_into_the_only_capture() {
    // Near king a1; Far kings c3 and h8; Near's only move is a1-b2, then c3xa1
    let mut game = Game::with_variant(Variant::Checkers);
    game.set_piece(0, Some(Piece::new(DRAUGHTS_KING, Side::Near))).unwrap();
    game.set_piece(18, Some(Piece::new(DRAUGHTS_KING, Side::Far))).unwrap();
    game.set_piece(63, Some(Piece::new(DRAUGHTS_KING, Side::Far))).unwrap();
    let params = SearchParams::new().max_depth(4);
    game.set_player(Side::Near, Some(Box::new(AiPlayer::with_seed(params.clone(), 5))));
    game.set_player(Side::Far, Some(Box::new(AiPlayer::with_seed(params, 6))));
    assert_eq!(game.state(), GameState::InProgress);

    let mut steps = 0;
    while !game.is_game_over() && steps < 10 {
        game.run_game().unwrap();
        steps += 1;
    }
    let texts: Vec<String> = {
        let mut replay = Game::with_variant(Variant::Checkers);
        replay.set_piece(0, Some(Piece::new(DRAUGHTS_KING, Side::Near))).unwrap();
        replay.set_piece(18, Some(Piece::new(DRAUGHTS_KING, Side::Far))).unwrap();
        replay.set_piece(63, Some(Piece::new(DRAUGHTS_KING, Side::Far))).unwrap();
        game.history()
            .iter()
            .map(|mv| {
                let text = replay.move_to_string(mv);
                replay.execute_move(mv).unwrap();
                text
            })
            .collect()
    };
    assert_eq!(texts, vec!["a1-b2", "c3xa1"]);
    assert_eq!(game.winner(), Some(Side::Far));
}

// Near king alone against two Far kings, both sides searched at `depth`
fn two_kings_against_one(near: usize, far: [usize; 2], depth: u8) -> Game {
    let mut game = Game::with_variant(Variant::Checkers);
    game.set_piece(near, Some(Piece::new(DRAUGHTS_KING, Side::Near))).unwrap();
    for square in far {
        game.set_piece(square, Some(Piece::new(DRAUGHTS_KING, Side::Far))).unwrap();
    }
    let params = SearchParams::new().max_depth(depth);
    game.set_player(Side::Near, Some(Box::new(AiPlayer::with_seed(params.clone(), 11))));
    game.set_player(Side::Far, Some(Box::new(AiPlayer::with_seed(params, 12))));
    game
}

#[test]
fn two_kings_hunt_down_a_lone_king() {
    let starts = [(27, [0, 2]), (54, [2, 16])];
    for (near, far) in starts {
        for depth in [3, 4] {
            let mut game = two_kings_against_one(near, far, depth);
            assert_eq!(game.turn(), Side::Near);
            assert!(game.compute_moves().len() > 1, "start {near} vs {far:?} is forced");

            let mut turns = 0;
            while !game.is_game_over() && turns < 60 {
                game.run_game().unwrap();
                turns += 1;
            }
            assert_eq!(
                game.winner(),
                Some(Side::Far),
                "{near} vs {far:?} at depth {depth}: {} after {turns} turns",
                game.state()
            );
        }
    }
}
