//! Brute-force reference answers.
//!
//! Everything here enumerates exhaustively and is only usable on small
//! universes.

use comboforge_core::{Combo, ComboState, Item, ItemMask};

/// Every legal combo of exactly `k` items.
pub fn all_combos(pool: &[Item], k: usize) -> Vec<Combo> {
    let mut out = Vec::new();
    let mut chosen = Vec::with_capacity(k);
    enumerate(pool, 0, k, ComboState::new(), &mut chosen, &mut |items: &[Item]| {
        out.push(Combo::new(items.iter().copied()));
    });
    out
}

/// The `n` best combo scores of exactly `k` items, descending.
pub fn top_scores(pool: &[Item], n: usize, k: usize) -> Vec<i64> {
    let mut scores: Vec<i64> = all_combos(pool, k).iter().map(Combo::score).collect();
    scores.sort_unstable_by(|a, b| b.cmp(a));
    scores.truncate(n);
    scores
}

/// Per item, the best score of a legal combo of size `1..=k` containing it.
pub fn potentials(pool: &[Item], k: usize) -> Vec<i64> {
    let mut best = vec![0i64; pool.len()];
    for size in 1..=k {
        for combo in all_combos(pool, size) {
            for (slot, item) in pool.iter().enumerate() {
                if combo.contains(item.index()) {
                    best[slot] = best[slot].max(combo.score());
                }
            }
        }
    }
    best
}

/// Best total score of `count` pairwise disjoint combos from `pool`, or
/// `None` if no such selection exists.
pub fn best_packing(pool: &[Combo], count: usize) -> Option<i64> {
    let masks: Vec<(ItemMask, i64)> = pool
        .iter()
        .map(|combo| (combo.item_mask(), combo.score()))
        .collect();
    pack(&masks, 0, count, ItemMask::empty())
}

fn pack(masks: &[(ItemMask, i64)], start: usize, remaining: usize, used: ItemMask) -> Option<i64> {
    if remaining == 0 {
        return Some(0);
    }
    let mut best = None;
    for i in start..masks.len() {
        let (mask, score) = &masks[i];
        if used.intersects(mask) {
            continue;
        }
        if let Some(rest) = pack(masks, i + 1, remaining - 1, used.union(mask)) {
            let total = score + rest;
            best = Some(best.map_or(total, |b: i64| b.max(total)));
        }
    }
    best
}

fn enumerate(
    pool: &[Item],
    start: usize,
    k: usize,
    state: ComboState,
    chosen: &mut Vec<Item>,
    emit: &mut impl FnMut(&[Item]),
) {
    if chosen.len() == k {
        emit(chosen);
        return;
    }
    for i in start..pool.len() {
        let item = &pool[i];
        if !state.can_add(item) {
            continue;
        }
        chosen.push(*item);
        enumerate(pool, i + 1, k, state.with(item), chosen, emit);
        chosen.pop();
    }
}
