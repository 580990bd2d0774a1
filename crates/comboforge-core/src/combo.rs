//! Result combos and their packed projection.

use smallvec::SmallVec;

use crate::item::Item;
use crate::mask::{ItemMask, MAX_CATEGORIES};
use crate::state::{ComboState, MAX_COMBO_SIZE};

/// Inline storage for the members of one combo.
pub type ComboItems = SmallVec<[Item; MAX_COMBO_SIZE]>;

/// A scored combination of items.
///
/// Members are kept in increasing index order and the score is computed once
/// at construction.
///
/// # Example
///
/// ```
/// use comboforge_core::{CategoryMask, Combo, Item, ItemMask};
///
/// let cat = CategoryMask::from_bits(0b1);
/// let a = Item::new(4, 15, ItemMask::empty(), cat).unwrap();
/// let b = Item::new(2, 45, ItemMask::empty(), cat).unwrap();
///
/// let combo = Combo::new([a, b]);
/// assert_eq!(combo.indices().collect::<Vec<_>>(), vec![2, 4]);
/// assert_eq!(combo.base_weight(), 60);
/// assert_eq!(combo.score(), 120);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Combo {
    items: ComboItems,
    score: i64,
}

impl Combo {
    /// Builds a combo from its members and scores it.
    pub fn new(items: impl IntoIterator<Item = Item>) -> Self {
        let mut items: ComboItems = items.into_iter().collect();
        items.sort_unstable_by_key(|item| item.index());
        let score = items
            .iter()
            .fold(ComboState::new(), |state, item| state.with(item))
            .score();
        Self { items, score }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Member indices in increasing order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.items.iter().map(Item::index)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.items.iter().any(|item| item.index() == index)
    }

    /// Mask of the member indices.
    pub fn item_mask(&self) -> ItemMask {
        self.indices().collect()
    }

    /// Sum of member weights before synergy.
    pub fn base_weight(&self) -> i64 {
        self.items.iter().map(|item| item.weight() as i64).sum()
    }

    /// Synergy multiplier of the members.
    pub fn multiplier(&self) -> u64 {
        self.items
            .iter()
            .fold(ComboState::new(), |state, item| state.with(item))
            .multiplier()
    }

    /// Number of members in each category slot.
    pub fn category_counts(&self) -> [u8; MAX_CATEGORIES] {
        let mut counts = [0u8; MAX_CATEGORIES];
        for item in &self.items {
            for category in item.categories().iter() {
                counts[category] += 1;
            }
        }
        counts
    }

    /// Returns true if no member excludes another.
    pub fn is_legal(&self) -> bool {
        self.items.iter().enumerate().all(|(i, a)| {
            self.items[i + 1..]
                .iter()
                .all(|b| a.is_compatible_with(b))
        })
    }
}

/// Read-only projection of a [`Combo`] for set packing.
///
/// The member mask is built once so collision tests during packing are a
/// single mask intersection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PackedCombo {
    /// Position of the source combo in its pool.
    pub original_index: usize,
    pub score: i64,
    pub used_items: ItemMask,
}

impl PackedCombo {
    pub fn new(original_index: usize, combo: &Combo) -> Self {
        Self {
            original_index,
            score: combo.score(),
            used_items: combo.item_mask(),
        }
    }

    /// Packs every combo of a pool, keeping pool order.
    pub fn pack_all(pool: &[Combo]) -> Vec<PackedCombo> {
        pool.iter()
            .enumerate()
            .map(|(i, combo)| PackedCombo::new(i, combo))
            .collect()
    }
}
