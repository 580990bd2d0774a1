//! Pool-wide validation and summary values.

use crate::error::{ComboForgeError, Result};
use crate::item::Item;
use crate::mask::ItemMask;
use crate::state::MAX_COMBO_SIZE;

/// Pool-wide maxima feeding the admissible search bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Heaviest item weight in the pool.
    pub max_weight: u32,
    /// Largest number of categories held by one item.
    pub max_categories_per_item: u32,
    pub item_count: usize,
}

impl PoolStats {
    pub fn of(pool: &[Item]) -> Self {
        pool.iter().fold(
            Self {
                item_count: pool.len(),
                ..Self::default()
            },
            |acc, item| Self {
                max_weight: acc.max_weight.max(item.weight()),
                max_categories_per_item: acc
                    .max_categories_per_item
                    .max(item.categories().count()),
                item_count: acc.item_count,
            },
        )
    }
}

/// Checks a pool and combo size before a search starts.
///
/// # Errors
///
/// Rejects an empty pool, a combo size outside `1..=5` and duplicate indices.
pub fn validate_pool(pool: &[Item], combo_size: usize) -> Result<()> {
    if pool.is_empty() {
        return Err(ComboForgeError::EmptyPool);
    }
    if combo_size == 0 || combo_size > MAX_COMBO_SIZE {
        return Err(ComboForgeError::InvalidComboSize(combo_size));
    }
    let mut seen = ItemMask::empty();
    for item in pool {
        if seen.test(item.index()) {
            return Err(ComboForgeError::DuplicateItemIndex(item.index()));
        }
        seen.set(item.index());
    }
    Ok(())
}
