use std::thread::{self, JoinHandle};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, warn};

use crate::evaluation::{Evaluator, CHECKMATE};
use crate::game::GameState;
use crate::movegen::Move;

/// Bound just outside the range of any real score.
const INFINITY: i32 = CHECKMATE + 1;

pub const DEFAULT_DEPTH: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Plies searched below the root.
    pub depth: u32,
    /// Shuffle the root moves once so equal scores do not always pick the
    /// same move. Deeper plies keep generation order.
    pub shuffle_root: bool,
    /// Alpha-beta cutoffs. Off gives a plain full-width negamax.
    pub pruning: bool,
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            shuffle_root: true,
            pruning: true,
            seed: None,
        }
    }
}

impl SearchConfig {
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_shuffle_root(mut self, shuffle_root: bool) -> Self {
        self.shuffle_root = shuffle_root;
        self
    }

    pub fn with_pruning(mut self, pruning: bool) -> Self {
        self.pruning = pruning;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    pub best_move: Option<Move>,
    /// Score from the point of view of the side to move at the root.
    pub score: i32,
    pub nodes: u64,
}

pub struct Search {
    evaluator: Evaluator,
    config: SearchConfig,
    rng: StdRng,
    nodes_searched: u64,
}

impl Search {
    pub fn new() -> Self {
        Self::with_config(SearchConfig::default())
    }

    pub fn with_config(config: SearchConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            evaluator: Evaluator::new(),
            config,
            rng,
            nodes_searched: 0,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn set_max_depth(&mut self, depth: u32) {
        self.config.depth = depth;
    }

    pub fn nodes_searched(&self) -> u64 {
        self.nodes_searched
    }

    /// Best move for the side to move, falling back to a random legal move
    /// when the search retains none. `None` only for an empty move list.
    pub fn choose_move(&mut self, state: &mut GameState, legal_moves: &[Move]) -> Option<Move> {
        self.search(state, legal_moves).best_move
    }

    pub fn search(&mut self, state: &mut GameState, legal_moves: &[Move]) -> SearchOutcome {
        self.nodes_searched = 0;
        let depth = self.config.depth;
        let perspective = state.side_to_move().sign();

        let mut moves = legal_moves.to_vec();
        if self.config.shuffle_root {
            moves.shuffle(&mut self.rng);
        }
        debug!(depth, root_moves = moves.len(), side = ?state.side_to_move(), "search started");

        let (score, found) = self.negamax(state, &moves, depth, -INFINITY, INFINITY, perspective);
        let best_move = found.or_else(|| {
            if !moves.is_empty() {
                warn!("search kept no move, picking a random one");
            }
            self.random_move(&moves)
        });

        debug!(
            best_move = ?best_move.map(|mv| mv.notation()),
            score,
            nodes = self.nodes_searched,
            "search finished"
        );
        SearchOutcome {
            best_move,
            score,
            nodes: self.nodes_searched,
        }
    }

    /// Returns the score for the side to move, always maximised, together
    /// with the first move that reached it.
    fn negamax(
        &mut self,
        state: &mut GameState,
        moves: &[Move],
        depth: u32,
        mut alpha: i32,
        beta: i32,
        perspective: i32,
    ) -> (i32, Option<Move>) {
        self.nodes_searched += 1;

        if depth == 0 || moves.is_empty() {
            return (perspective * self.evaluator.evaluate(state), None);
        }

        let mut max_score = -INFINITY;
        let mut best_move = None;

        for mv in moves {
            state.apply(mv, None);
            let replies = state.legal_moves();
            let (reply_score, _) =
                self.negamax(state, &replies, depth - 1, -beta, -alpha, -perspective);
            let score = -reply_score;
            state.undo();

            // Ties keep the earlier move.
            if score > max_score {
                max_score = score;
                best_move = Some(*mv);
            }
            if max_score > alpha {
                alpha = max_score;
            }
            if self.config.pruning && alpha >= beta {
                break;
            }
        }

        (max_score, best_move)
    }

    fn random_move(&mut self, moves: &[Move]) -> Option<Move> {
        moves.choose(&mut self.rng).copied()
    }
}

impl Default for Search {
    fn default() -> Self {
        Search::new()
    }
}

/// Alpha-beta negamax `depth` plies deep with the default settings.
pub fn choose_move(state: &mut GameState, legal_moves: &[Move], depth: u32) -> Option<Move> {
    Search::with_config(SearchConfig::default().with_depth(depth)).choose_move(state, legal_moves)
}

/// Uniformly random pick; the strategy used when search is turned off.
pub fn choose_random_move(legal_moves: &[Move]) -> Option<Move> {
    legal_moves.choose(&mut rand::thread_rng()).copied()
}

/// Runs a search on its own thread. The state moves into the worker and
/// comes back with the result, so nothing else can touch it meanwhile.
pub fn spawn_search(
    mut state: GameState,
    legal_moves: Vec<Move>,
    config: SearchConfig,
) -> JoinHandle<(GameState, Option<Move>)> {
    thread::spawn(move || {
        let mut search = Search::with_config(config);
        let best_move = search.choose_move(&mut state, &legal_moves);
        (state, best_move)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(depth: u32) -> SearchConfig {
        SearchConfig::default()
            .with_depth(depth)
            .with_shuffle_root(false)
            .with_seed(7)
    }

    #[test]
    fn test_takes_hanging_queen() {
        let mut state = GameState::from_fen("4k3/8/8/3q4/8/8/3Q4/4K3 w - - 0 1").unwrap();
        let moves = state.legal_moves();
        let mut search = Search::with_config(fixed(2));
        let outcome = search.search(&mut state, &moves);
        assert_eq!(outcome.best_move.unwrap().notation(), "d2d5");
        assert!(outcome.score > 0);
        assert_eq!(outcome.nodes, search.nodes_searched());
    }

    #[test]
    fn test_pruning_keeps_choice() {
        let fens = [
            "4k3/8/8/3q4/8/8/3Q4/4K3 w - - 0 1",
            "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3",
            "r3k3/8/8/8/8/8/8/R3K3 b - - 0 1",
        ];
        for fen in fens {
            let mut state = GameState::from_fen(fen).unwrap();
            let moves = state.legal_moves();
            let before = state.clone();

            let mut pruned = Search::with_config(fixed(2));
            let with_cutoffs = pruned.search(&mut state, &moves);
            let mut full = Search::with_config(fixed(2).with_pruning(false));
            let full_width = full.search(&mut state, &moves);

            assert_eq!(with_cutoffs.best_move, full_width.best_move, "{}", fen);
            assert_eq!(with_cutoffs.score, full_width.score, "{}", fen);
            assert!(with_cutoffs.nodes <= full_width.nodes);
            assert_eq!(state, before);
        }
    }

    #[test]
    fn test_finds_mate_in_one() {
        let mut state = GameState::new();
        for text in ["f2f3", "e7e5", "g2g4"] {
            state.play(text).unwrap();
        }
        let moves = state.legal_moves();
        let mut search = Search::with_config(fixed(1));
        let outcome = search.search(&mut state, &moves);
        assert_eq!(outcome.best_move.unwrap().notation(), "d8h4");
        assert_eq!(outcome.score, CHECKMATE);
    }

    #[test]
    fn test_depth_zero_falls_back_to_random() {
        let mut state = GameState::new();
        let moves = state.legal_moves();
        let mut search = Search::with_config(fixed(0));
        let chosen = search.choose_move(&mut state, &moves).unwrap();
        assert!(moves.contains(&chosen));
    }

    #[test]
    fn test_empty_move_list() {
        let mut state = GameState::from_fen("7k/6Q1/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let moves = state.legal_moves();
        assert!(choose_move(&mut state, &moves, 2).is_none());
        assert!(choose_random_move(&moves).is_none());
    }

    #[test]
    fn test_random_move_is_legal() {
        let mut state = GameState::new();
        let moves = state.legal_moves();
        for _ in 0..20 {
            assert!(moves.contains(&choose_random_move(&moves).unwrap()));
        }
    }

    #[test]
    fn test_seeded_searches_agree() {
        let mut state = GameState::new();
        let moves = state.legal_moves();
        let config = SearchConfig::default().with_depth(1).with_seed(42);
        let first = Search::with_config(config).choose_move(&mut state, &moves);
        let second = Search::with_config(config).choose_move(&mut state, &moves);
        assert_eq!(first, second);
    }

    #[test]
    fn test_spawn_search_returns_state() {
        let mut state = GameState::new();
        state.play("e2e4").unwrap();
        let moves = state.legal_moves();
        let before = state.clone();
        let handle = spawn_search(state, moves.clone(), fixed(2));
        let (state, best_move) = handle.join().unwrap();
        assert_eq!(state, before);
        assert!(moves.contains(&best_move.unwrap()));
    }
}
