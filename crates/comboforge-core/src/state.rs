//! Copy-on-branch combination accumulator.
//!
//! [`ComboState`] is the search state shared by every phase. It is a small
//! `Copy` value: recursive searches branch by copying it and calling
//! [`ComboState::add`] on the copy, so no undo step or heap allocation is ever
//! needed.
//!
//! Category counts live in one `u64` as thirteen 4-bit fields. Adding an item
//! adds its packed increment to the word, and the multiplier reads the fields
//! back in a fixed, unrolled pass.
//!
//! # Example
//!
//! ```
//! use comboforge_core::{CategoryMask, ComboState, Item, ItemMask};
//!
//! let cool = CategoryMask::from_bits(0b1);
//! let a = Item::new(0, 45, ItemMask::empty(), cool).unwrap();
//! let b = Item::new(1, 45, ItemMask::empty(), cool).unwrap();
//!
//! let state = ComboState::of(&a).with(&b);
//! assert_eq!(state.size(), 2);
//! assert_eq!(state.multiplier(), 2);
//! assert_eq!(state.score(), 180);
//! ```

use crate::item::{multiplier_for, Item};
use crate::mask::{ItemMask, MAX_CATEGORIES};

/// Largest number of items in one combo.
///
/// Keeps every packed category count at or below 5, well inside 4 bits.
pub const MAX_COMBO_SIZE: usize = 5;

const SLOT_MASK: u64 = 0xF;

/// Incremental search state for one partial combo.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ComboState {
    packed_category_counts: u64,
    cumulative_incompatibility: ItemMask,
    total_weight: i64,
    size: u8,
}

macro_rules! unrolled_multiplier {
    ($packed:expr; $($slot:literal),+) => {
        1u64 $(.saturating_mul(multiplier_for(($packed >> (4 * $slot)) & SLOT_MASK)))+
    };
}

impl ComboState {
    /// The empty combo.
    pub const fn new() -> Self {
        Self {
            packed_category_counts: 0,
            cumulative_incompatibility: ItemMask::EMPTY,
            total_weight: 0,
            size: 0,
        }
    }

    /// The combo holding only `item`.
    pub fn of(item: &Item) -> Self {
        Self::new().with(item)
    }

    /// Folds `item` into the combo.
    #[inline]
    pub fn add(&mut self, item: &Item) {
        self.packed_category_counts += item.category_increment();
        self.cumulative_incompatibility
            .union_with(item.incompatible());
        self.total_weight += item.weight() as i64;
        self.size += 1;
    }

    /// Returns a copy with `item` folded in.
    #[inline]
    pub fn with(mut self, item: &Item) -> Self {
        self.add(item);
        self
    }

    /// Returns true if no member excludes `item`.
    #[inline]
    pub fn can_add(&self, item: &Item) -> bool {
        !self.cumulative_incompatibility.test(item.index())
    }

    /// Product of the synergy factors of all 13 category slots.
    #[inline]
    pub fn multiplier(&self) -> u64 {
        let packed = self.packed_category_counts;
        unrolled_multiplier!(packed; 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12)
    }

    /// Current score: total weight times the synergy multiplier.
    #[inline]
    pub fn score(&self) -> i64 {
        let multiplier = i64::try_from(self.multiplier()).unwrap_or(i64::MAX);
        self.total_weight.saturating_mul(multiplier)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size as usize
    }

    #[inline]
    pub fn total_weight(&self) -> i64 {
        self.total_weight
    }

    #[inline]
    pub fn cumulative_incompatibility(&self) -> &ItemMask {
        &self.cumulative_incompatibility
    }

    /// Number of members in `category`.
    pub fn category_count(&self, category: usize) -> u8 {
        if category >= MAX_CATEGORIES {
            return 0;
        }
        ((self.packed_category_counts >> (4 * category)) & SLOT_MASK) as u8
    }
}
