//! Search-ready items.

use crate::error::{ComboForgeError, Result};
use crate::mask::{CategoryMask, ItemMask, MAX_CATEGORIES, MAX_ITEMS};

/// Synergy multiplier by number of combo items sharing a category.
///
/// Counts at or above the last index use the last entry.
pub const MULTIPLIERS: [u64; 8] = [1, 1, 2, 5, 15, 30, 30, 30];

/// Multiplier contributed by one category holding `count` items.
#[inline(always)]
pub const fn multiplier_for(count: u64) -> u64 {
    let last = (MULTIPLIERS.len() - 1) as u64;
    let slot = if count > last { last } else { count };
    MULTIPLIERS[slot as usize]
}

/// An immutable, search-ready item.
///
/// Items carry every precomputed value the searches need: the incompatibility
/// mask, the category mask and its packed counter increment, and the best score
/// reachable by any combo containing the item (zero until analyzed).
///
/// # Example
///
/// ```
/// use comboforge_core::{CategoryMask, Item, ItemMask};
///
/// let item = Item::new(7, 45, ItemMask::from_indices([8]), CategoryMask::from_bits(0b101)).unwrap();
/// assert_eq!(item.index(), 7);
/// assert_eq!(item.category_increment(), 1 | (1 << 8));
/// assert!(!item.incompatible().test(7));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Item {
    index: u16,
    weight: u32,
    incompatible: ItemMask,
    categories: CategoryMask,
    category_increment: u64,
    max_potential: i64,
}

impl Item {
    /// Creates an item with no analyzed potential.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is outside the item universe or a
    /// category does not fit in the packed counter word.
    pub fn new(
        index: usize,
        weight: u32,
        mut incompatible: ItemMask,
        categories: CategoryMask,
    ) -> Result<Self> {
        if index >= MAX_ITEMS {
            return Err(ComboForgeError::InvalidItemIndex(index));
        }
        if let Some(category) = categories.iter().find(|&c| c >= MAX_CATEGORIES) {
            return Err(ComboForgeError::InvalidCategory { index, category });
        }
        incompatible.clear(index);

        Ok(Self {
            index: index as u16,
            weight,
            incompatible,
            categories,
            category_increment: categories.packed_increment(),
            max_potential: 0,
        })
    }

    /// Returns a copy carrying the given potential score.
    pub fn with_max_potential(mut self, max_potential: i64) -> Self {
        self.max_potential = max_potential;
        self
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index as usize
    }

    #[inline]
    pub fn weight(&self) -> u32 {
        self.weight
    }

    #[inline]
    pub fn incompatible(&self) -> &ItemMask {
        &self.incompatible
    }

    #[inline]
    pub fn categories(&self) -> CategoryMask {
        self.categories
    }

    #[inline]
    pub fn category_increment(&self) -> u64 {
        self.category_increment
    }

    /// Best score of any legal combo containing this item.
    #[inline]
    pub fn max_potential(&self) -> i64 {
        self.max_potential
    }

    /// Score of the combo holding only this item.
    pub fn solo_score(&self) -> i64 {
        self.weight as i64
    }

    pub fn is_compatible_with(&self, other: &Item) -> bool {
        !self.incompatible.test(other.index()) && !other.incompatible.test(self.index())
    }
}
