use proptest::prelude::*;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::collections::HashSet;
use tswpr::tsw_board::{Board, MarkOutcome, RevealOutcome, RoundState};

fn mine_cells(board: &Board) -> Vec<(usize, usize)> {
    let mut out = vec![];
    for y in 0..board.height() {
        for x in 0..board.width() {
            if board.cell(x, y).unwrap().mine {
                out.push((x, y));
            }
        }
    }
    out
}

fn brute_adjacency(board: &Board, x: usize, y: usize) -> u8 {
    let mut n = 0;
    for dy in -1i64..=1 {
        for dx in -1i64..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let (nx, ny) = (x as i64 + dx, y as i64 + dy);
            if nx < 0 || ny < 0 {
                continue;
            }
            if let Some(c) = board.cell(nx as usize, ny as usize) {
                if c.mine {
                    n += 1;
                }
            }
        }
    }
    n
}

/// Zero component containing (x, y) plus its ring, computed by plain BFS
fn expected_cascade(board: &Board, x: usize, y: usize) -> HashSet<(usize, usize)> {
    let mut seen = HashSet::new();
    let mut out = HashSet::new();
    let mut queue = vec![(x, y)];
    seen.insert((x, y));
    out.insert((x, y));
    while let Some((cx, cy)) = queue.pop() {
        for n in board.neighbors(cx, cy) {
            out.insert(n);
            let c = board.cell(n.0, n.1).unwrap();
            if !c.mine && c.adj == 0 && seen.insert(n) {
                queue.push(n);
            }
        }
    }
    out
}

fn board_params() -> impl Strategy<Value = (usize, usize, usize, u64)> {
    (1usize..=16, 1usize..=16, any::<u64>()).prop_flat_map(|(w, h, seed)| {
        (Just(w), Just(h), 0..w * h, Just(seed))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn placement_has_exact_distinct_mines((w, h, mines, seed) in board_params()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let board = Board::generate(w, h, mines, &mut rng).unwrap();
        let cells = mine_cells(&board);
        let distinct: HashSet<_> = cells.iter().copied().collect();
        prop_assert_eq!(cells.len(), mines);
        prop_assert_eq!(distinct.len(), mines);
    }

    #[test]
    fn adjacency_matches_brute_force((w, h, mines, seed) in board_params()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let board = Board::generate(w, h, mines, &mut rng).unwrap();
        for y in 0..h {
            for x in 0..w {
                let c = board.cell(x, y).unwrap();
                if !c.mine {
                    prop_assert_eq!(c.adj, brute_adjacency(&board, x, y));
                }
            }
        }
    }

    #[test]
    fn cascade_opens_component_and_ring((w, h, mines, seed) in board_params()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut board = Board::generate(w, h, mines, &mut rng).unwrap();
        let zero = (0..h)
            .flat_map(|y| (0..w).map(move |x| (x, y)))
            .find(|&(x, y)| {
                let c = board.cell(x, y).unwrap();
                !c.mine && c.adj == 0
            });
        if let Some((x, y)) = zero {
            let expected = expected_cascade(&board, x, y);
            let outcome = board.reveal(x, y);
            prop_assert_eq!(outcome, RevealOutcome::Cascade(expected.len()));
            for yy in 0..h {
                for xx in 0..w {
                    prop_assert_eq!(board.is_revealed(xx, yy), expected.contains(&(xx, yy)));
                }
            }
        }
    }

    #[test]
    fn reveal_is_idempotent((w, h, mines, seed) in board_params(), pick in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut board = Board::generate(w, h, mines, &mut rng).unwrap();
        let mut pick_rng = StdRng::seed_from_u64(pick);
        let (x, y) = (pick_rng.gen_range(0..w), pick_rng.gen_range(0..h));
        let first = board.reveal(x, y);
        prop_assert_ne!(first, RevealOutcome::Unchanged);
        let snapshot: Vec<_> = (0..h)
            .flat_map(|yy| (0..w).map(move |xx| (xx, yy)))
            .map(|(xx, yy)| board.cell(xx, yy))
            .collect();
        let state = board.state();
        prop_assert_eq!(board.reveal(x, y), RevealOutcome::Unchanged);
        let after: Vec<_> = (0..h)
            .flat_map(|yy| (0..w).map(move |xx| (xx, yy)))
            .map(|(xx, yy)| board.cell(xx, yy))
            .collect();
        prop_assert_eq!(snapshot, after);
        prop_assert_eq!(board.state(), state);
    }

    #[test]
    fn revealing_every_safe_cell_wins((w, h, mines, seed) in board_params()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut board = Board::generate(w, h, mines, &mut rng).unwrap();
        for y in 0..h {
            for x in 0..w {
                if !board.cell(x, y).unwrap().mine {
                    prop_assert_ne!(board.reveal(x, y), RevealOutcome::Lost);
                }
            }
        }
        prop_assert!(board.is_won());
        prop_assert_eq!(board.state(), RoundState::Won);
        prop_assert_eq!(board.revealed_safe_count(), w * h - mines);
    }

    #[test]
    fn reset_clears_round_state(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut board = Board::generate(10, 10, 16, &mut rng).unwrap();
        let mines = mine_cells(&board);
        prop_assert_eq!(board.mark(mines[0].0, mines[0].1), MarkOutcome::Marked);
        board.reveal(mines[1].0, mines[1].1);
        prop_assert_eq!(board.state(), RoundState::Lost);
        board.reset(&mut rng);
        prop_assert_eq!(board.state(), RoundState::Playing);
        prop_assert_eq!(board.marked_count(), 0);
        prop_assert_eq!(mine_cells(&board).len(), 16);
        prop_assert!((0..10).all(|y| (0..10).all(|x| !board.is_revealed(x, y))));
    }
}
