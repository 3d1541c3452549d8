//! Perft (performance test) for move generation correctness verification.

use crate::board::Board;
use crate::movegen::{count_legal_moves, generate_legal_moves};

/// Count the number of leaf nodes at the given depth.
///
/// Depth 0 returns 1 (the current position). Depth 1 counts legal moves
/// directly (bulk-counting optimization: no recursive do_move, and no
/// `MoveList` materialized since only the count is needed).
pub fn perft(board: &Board, depth: usize) -> u64 {
    if depth == 0 {
        return 1;
    }

    if depth == 1 {
        return count_legal_moves(board) as u64;
    }

    let moves = generate_legal_moves(board);
    let mut nodes = 0u64;
    for mv in moves.as_slice() {
        let mut child = *board;
        child.do_move(*mv);
        nodes += perft(&child, depth - 1);
    }
    nodes
}

/// Run perft with per-move breakdown (useful for debugging).
///
/// Returns a vector of `(move_text, node_count)` pairs sorted alphabetically.
pub fn divide(board: &Board, depth: usize) -> Vec<(String, u64)> {
    let moves = generate_legal_moves(board);
    let mut results: Vec<(String, u64)> = moves
        .as_slice()
        .iter()
        .map(|mv| {
            let mut child = *board;
            child.do_move(*mv);
            let count = if depth <= 1 { 1 } else { perft(&child, depth - 1) };
            (format!("{mv}"), count)
        })
        .collect();
    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}
