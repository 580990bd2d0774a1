//! Admissible score bounds for the combo searches.
//!
//! A partial combo with `r` open slots can gain at most `r × max_weight` in
//! weight. Each added item holds at most `max_categories_per_item`
//! categories, and raising one category count by one never multiplies the
//! synergy product by more than 3 (the largest step ratio of the table,
//! 15 / 5). The product of the two gains bounds every completion.

use comboforge_core::{ComboState, PoolStats, MAX_COMBO_SIZE};

/// Upper bound on the score of any completion of a partial combo.
///
/// Arithmetic saturates, so an overflowing bound reads as `i64::MAX` and
/// never prunes.
///
/// # Example
///
/// ```
/// use comboforge_core::{CategoryMask, ComboState, Item, ItemMask, PoolStats};
/// use comboforge_solver::bound::ComboBounder;
///
/// let item = Item::new(0, 45, ItemMask::empty(), CategoryMask::from_bits(0b1)).unwrap();
/// let pool = [item];
/// let bounder = ComboBounder::new(&PoolStats::of(&pool));
///
/// let state = ComboState::of(&item);
/// // (45 + 1 × 45) × 1 × 3^1
/// assert_eq!(bounder.bound(&state, 1), 270);
/// assert_eq!(bounder.bound(&state, 0), 45);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ComboBounder {
    max_weight: i64,
    growth: [u64; MAX_COMBO_SIZE + 1],
}

impl ComboBounder {
    pub fn new(stats: &PoolStats) -> Self {
        let mut growth = [1u64; MAX_COMBO_SIZE + 1];
        let per_slot = 3u64.saturating_pow(stats.max_categories_per_item);
        for r in 1..growth.len() {
            growth[r] = growth[r - 1].saturating_mul(per_slot);
        }
        Self {
            max_weight: stats.max_weight as i64,
            growth,
        }
    }

    /// Synergy growth factor for `remaining` open slots.
    #[inline]
    pub fn growth(&self, remaining: usize) -> u64 {
        self.growth[remaining.min(MAX_COMBO_SIZE)]
    }

    /// Best score any completion of `state` with up to `remaining` more
    /// items could reach.
    #[inline]
    pub fn bound(&self, state: &ComboState, remaining: usize) -> i64 {
        if remaining == 0 {
            return state.score();
        }
        let weight = state
            .total_weight()
            .saturating_add((remaining as i64).saturating_mul(self.max_weight));
        let factor = state.multiplier().saturating_mul(self.growth(remaining));
        weight.saturating_mul(i64::try_from(factor).unwrap_or(i64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comboforge_core::{CategoryMask, Item, ItemMask};

    fn item(index: usize, weight: u32, bits: u16) -> Item {
        Item::new(index, weight, ItemMask::empty(), CategoryMask::from_bits(bits)).unwrap()
    }

    #[test]
    fn test_growth_powers() {
        let pool = [item(0, 5, 0b11), item(1, 5, 0b1)];
        let bounder = ComboBounder::new(&PoolStats::of(&pool));
        assert_eq!(bounder.growth(0), 1);
        assert_eq!(bounder.growth(1), 9);
        assert_eq!(bounder.growth(2), 81);
        assert_eq!(bounder.growth(9), bounder.growth(5));
    }

    #[test]
    fn test_bound_covers_real_completion() {
        let pool = [
            item(0, 45, 0b1),
            item(1, 45, 0b1),
            item(2, 45, 0b1),
            item(3, 45, 0b1),
        ];
        let bounder = ComboBounder::new(&PoolStats::of(&pool));
        let start = ComboState::of(&pool[0]);
        let full = pool[1..].iter().fold(start, |s, i| s.with(i));

        assert!(bounder.bound(&start, 3) >= full.score());
        assert!(bounder.bound(&start.with(&pool[1]), 2) >= full.score());
    }

    #[test]
    fn test_bound_saturates() {
        let pool = [item(0, u32::MAX, 0x1FFF)];
        let bounder = ComboBounder::new(&PoolStats::of(&pool));
        let state = ComboState::of(&pool[0]);
        assert_eq!(bounder.bound(&state, 4), i64::MAX);
    }
}
