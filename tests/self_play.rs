use anyhow::{Context, Result};
use chess_core::{
    choose_random_move, new_game, spawn_search, ChessError, Color, GameState, GameStatus, Piece,
    Search, SearchConfig,
};

#[test]
fn test_search_self_play_keeps_state_consistent() -> Result<()> {
    let mut state = new_game();
    let mut search = Search::with_config(SearchConfig::default().with_depth(2).with_seed(11));

    for _ in 0..12 {
        let moves = state.legal_moves();
        if moves.is_empty() {
            break;
        }
        let before = state.clone();
        let mv = search
            .choose_move(&mut state, &moves)
            .context("search returned no move")?;
        // The search must leave the position exactly as it found it.
        assert_eq!(state, before);
        assert!(moves.contains(&mv));

        let mover = state.side_to_move();
        state.apply(&mv, Some(Piece::Queen));
        assert_eq!(state.side_to_move(), mover.opposite());
        assert!(!state.is_king_attacked(mover));
    }

    let plies = state.move_log().len();
    for _ in 0..plies {
        state.undo();
    }
    assert_eq!(state.to_fen(), new_game().to_fen());
    Ok(())
}

#[test]
fn test_random_games_undo_to_start() -> Result<()> {
    for _ in 0..5 {
        let mut state = new_game();
        let mut fens = vec![state.to_fen()];
        for _ in 0..40 {
            let moves = state.legal_moves();
            let Some(mv) = choose_random_move(&moves) else {
                assert_ne!(state.status(), GameStatus::Ongoing);
                break;
            };
            state.apply(&mv, Some(Piece::Knight));
            fens.push(state.to_fen());
        }
        while let Some(expected) = fens.pop() {
            assert_eq!(state.to_fen(), expected);
            state.undo();
        }
    }
    Ok(())
}

#[test]
fn test_scholars_mate_by_notation() -> Result<()> {
    let mut state = new_game();
    for text in ["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6", "h5f7"] {
        state.play(text).with_context(|| format!("playing {}", text))?;
    }
    assert!(state.legal_moves().is_empty());
    assert_eq!(state.status(), GameStatus::Checkmate(Color::White));
    assert_eq!(state.last_move().map(|mv| mv.notation()), Some("h5f7".to_string()));
    Ok(())
}

#[test]
fn test_illegal_notation_is_reported() -> Result<()> {
    let mut state = GameState::from_fen("4k3/8/8/8/4r3/8/4B3/4K3 w - - 0 1")?;
    let err = state.play("e2d3").unwrap_err();
    assert_eq!(err, ChessError::IllegalMove("e2d3".to_string()));
    assert_eq!(err.to_string(), "illegal move `e2d3`");
    Ok(())
}

#[test]
fn test_worker_search_finds_mate() -> Result<()> {
    let mut state = GameState::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1")?;
    let moves = state.legal_moves();
    let config = SearchConfig::default().with_depth(2).with_seed(3);
    let (mut state, best) = spawn_search(state, moves, config)
        .join()
        .map_err(|_| anyhow::anyhow!("search thread panicked"))?;
    let best = best.context("no move found")?;
    assert_eq!(best.notation(), "a1a8");

    state.apply(&best, None);
    assert!(state.legal_moves().is_empty());
    assert!(state.is_checkmate());
    Ok(())
}
