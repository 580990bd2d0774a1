//! Fixed-width bitsets over item and category indices.
//!
//! An [`ItemMask`] holds one bit per item of the 512-item universe in eight
//! `u64` words. Every operation touches a constant number of words, so set,
//! test, union and intersection checks are O(1) regardless of how many items
//! are set.
//!
//! # Examples
//!
//! ```
//! use comboforge_core::ItemMask;
//!
//! let mut mask = ItemMask::empty();
//! mask.set(3);
//! mask.set(200);
//!
//! let other = ItemMask::from_indices([200, 511]);
//! assert!(mask.intersects(&other));
//! assert_eq!(mask.intersection(&other).iter().collect::<Vec<_>>(), vec![200]);
//! assert_eq!(mask.count(), 2);
//! ```

use std::fmt;

use crate::item::Item;

/// Number of addressable items.
pub const MAX_ITEMS: usize = 512;

/// Number of `u64` words backing an [`ItemMask`].
pub const MASK_WORDS: usize = MAX_ITEMS / 64;

/// Number of categories that fit in the packed 4-bit counter word.
pub const MAX_CATEGORIES: usize = 13;

/// A set of item indices in `[0, 512)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ItemMask {
    words: [u64; MASK_WORDS],
}

impl ItemMask {
    /// The mask with no bits set.
    pub const EMPTY: Self = Self {
        words: [0; MASK_WORDS],
    };

    /// Creates an empty mask.
    #[inline]
    pub const fn empty() -> Self {
        Self::EMPTY
    }

    /// Builds a mask from item indices.
    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        let mut mask = Self::EMPTY;
        for index in indices {
            mask.set(index);
        }
        mask
    }

    /// Mask of the indices of `items`.
    pub fn from_items(items: &[Item]) -> Self {
        items.iter().map(Item::index).collect()
    }

    #[inline]
    pub fn set(&mut self, index: usize) {
        debug_assert!(index < MAX_ITEMS, "item index {index} out of range");
        self.words[index >> 6] |= 1u64 << (index & 63);
    }

    #[inline]
    pub fn clear(&mut self, index: usize) {
        debug_assert!(index < MAX_ITEMS, "item index {index} out of range");
        self.words[index >> 6] &= !(1u64 << (index & 63));
    }

    #[inline]
    pub fn test(&self, index: usize) -> bool {
        debug_assert!(index < MAX_ITEMS, "item index {index} out of range");
        self.words[index >> 6] & (1u64 << (index & 63)) != 0
    }

    /// Adds every index of `other` to this mask.
    #[inline]
    pub fn union_with(&mut self, other: &Self) {
        for (word, rhs) in self.words.iter_mut().zip(other.words.iter()) {
            *word |= *rhs;
        }
    }

    /// Returns the union of two masks.
    #[inline]
    pub fn union(mut self, other: &Self) -> Self {
        self.union_with(other);
        self
    }

    /// Returns the indices present in both masks.
    #[inline]
    pub fn intersection(&self, other: &Self) -> Self {
        let mut words = [0u64; MASK_WORDS];
        for (i, word) in words.iter_mut().enumerate() {
            *word = self.words[i] & other.words[i];
        }
        Self { words }
    }

    /// Returns true if the masks share at least one index.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .fold(0u64, |acc, (a, b)| acc | (a & b))
            != 0
    }

    /// Number of set indices.
    #[inline]
    pub fn count(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Iterates set indices in ascending order.
    pub fn iter(&self) -> Iter {
        Iter {
            words: self.words,
            word_index: 0,
            current: self.words[0],
        }
    }
}

impl fmt::Debug for ItemMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<usize> for ItemMask {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self::from_indices(iter)
    }
}

impl<'a> IntoIterator for &'a ItemMask {
    type Item = usize;
    type IntoIter = Iter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ascending iterator over the indices of an [`ItemMask`].
#[derive(Debug, Clone)]
pub struct Iter {
    words: [u64; MASK_WORDS],
    word_index: usize,
    current: u64,
}

impl Iterator for Iter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1;
                return Some(self.word_index * 64 + bit);
            }
            self.word_index += 1;
            if self.word_index >= MASK_WORDS {
                return None;
            }
            self.current = self.words[self.word_index];
        }
    }
}

/// A set of category indices in `[0, 13)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CategoryMask(u16);

impl CategoryMask {
    pub const EMPTY: Self = Self(0);

    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    #[inline]
    pub fn insert(&mut self, category: usize) {
        debug_assert!(category < MAX_CATEGORIES, "category {category} out of range");
        self.0 |= 1 << category;
    }

    #[inline]
    pub fn contains(self, category: usize) -> bool {
        category < 16 && self.0 & (1 << category) != 0
    }

    #[inline]
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates member categories in ascending order.
    pub fn iter(self) -> impl Iterator<Item = usize> {
        let mut bits = self.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let category = bits.trailing_zeros() as usize;
            bits &= bits - 1;
            Some(category)
        })
    }

    /// Packed counter increment: a 1 in the 4-bit slot of every member category.
    ///
    /// Adding this value to a packed counter word bumps each member's count by one.
    pub fn packed_increment(self) -> u64 {
        self.iter()
            .filter(|&c| c < MAX_CATEGORIES)
            .fold(0u64, |acc, c| acc | (1u64 << (4 * c)))
    }
}

impl fmt::Debug for CategoryMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<usize> for CategoryMask {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut mask = Self::EMPTY;
        for category in iter {
            mask.insert(category);
        }
        mask
    }
}
