//! Final standings.

use std::collections::HashSet;

/// Ranks players by final score. `rankings[i]` is player `i`'s rank.
///
/// Distinct scores rank directly, highest first. When any two scores tie,
/// every player is keyed by score plus completed wall rows instead. Players
/// whose keys still tie share a rank, and the next lower key gets the next
/// rank with no gap (`[20, 20, 9]` ranks as `[1, 1, 2]`).
pub fn rank_players(scores: &[u32], completed_rows: &[usize]) -> Vec<u32> {
    if all_distinct(scores) {
        return dense_ranks(scores);
    }
    let keys: Vec<u32> = scores
        .iter()
        .zip(completed_rows)
        .map(|(score, rows)| score + *rows as u32)
        .collect();
    dense_ranks(&keys)
}

fn all_distinct(values: &[u32]) -> bool {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().all(|v| seen.insert(*v))
}

fn dense_ranks(keys: &[u32]) -> Vec<u32> {
    let mut levels = keys.to_vec();
    levels.sort_unstable_by(|a, b| b.cmp(a));
    levels.dedup();
    keys.iter()
        .map(|key| 1 + levels.iter().take_while(|level| *level > key).count() as u32)
        .collect()
}
