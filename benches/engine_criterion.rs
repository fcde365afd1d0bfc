use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use chess_core::{GameState, Search, SearchConfig};

const STARTPOS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
const KIWIPETE_FEN: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

fn perft_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft");
    for (name, fen, depth) in [("startpos", STARTPOS_FEN, 3), ("kiwipete", KIWIPETE_FEN, 2)] {
        group.bench_with_input(BenchmarkId::new(name, depth), &depth, |b, &depth| {
            let mut state = GameState::from_fen(fen).expect("valid FEN");
            b.iter(|| black_box(state.perft(depth)));
        });
    }
    group.finish();
}

fn search_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(10);
    for depth in [2u32, 3] {
        for pruning in [true, false] {
            let label = if pruning { "alpha_beta" } else { "full_width" };
            group.bench_with_input(BenchmarkId::new(label, depth), &depth, |b, &depth| {
                let mut state = GameState::from_fen(KIWIPETE_FEN).expect("valid FEN");
                let moves = state.legal_moves();
                let config = SearchConfig::default()
                    .with_depth(depth)
                    .with_shuffle_root(false)
                    .with_pruning(pruning);
                b.iter(|| {
                    let mut search = Search::with_config(config);
                    black_box(search.choose_move(&mut state, &moves))
                });
            });
        }
    }
    group.finish();
}

criterion_group!(benches, perft_bench, search_bench);
criterion_main!(benches);
