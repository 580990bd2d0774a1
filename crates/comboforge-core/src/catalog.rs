//! Catalog assembly: item specs in, search-ready items out.
//!
//! A catalog describes items by index, weight, category list and exclusion
//! list. [`CatalogBuilder`] validates the description, makes every exclusion
//! symmetric and precomputes the masks and counter increments each [`Item`]
//! carries.
//!
//! # Example
//!
//! ```
//! use comboforge_core::{CatalogBuilder, ItemSpec, Rarity};
//!
//! let items = CatalogBuilder::new()
//!     .item(ItemSpec::with_rarity(0, Rarity::Rare).category(1).incompatible_with(1))
//!     .item(ItemSpec::with_rarity(1, Rarity::Common).category(1))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(items[0].weight(), 45);
//! // Exclusions are made symmetric.
//! assert!(items[1].incompatible().test(0));
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ComboForgeError, Result};
use crate::item::Item;
use crate::mask::{CategoryMask, ItemMask, MAX_CATEGORIES, MAX_ITEMS};

/// Rarity tier of a catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Viral,
}

impl Rarity {
    /// Base weight granted by this tier.
    pub const fn base_weight(self) -> u32 {
        match self {
            Rarity::Common => 5,
            Rarity::Uncommon => 15,
            Rarity::Rare => 45,
            Rarity::Epic => 135,
            Rarity::Viral => 405,
        }
    }

    /// Tier for a numeric level, `0` (common) to `4` (viral).
    pub const fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(Rarity::Common),
            1 => Some(Rarity::Uncommon),
            2 => Some(Rarity::Rare),
            3 => Some(Rarity::Epic),
            4 => Some(Rarity::Viral),
            _ => None,
        }
    }
}

/// Catalog description of one item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub struct ItemSpec {
    pub index: usize,
    pub weight: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub categories: Vec<usize>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub incompatible: Vec<usize>,
}

impl ItemSpec {
    pub fn new(index: usize, weight: u32) -> Self {
        Self {
            index,
            weight,
            ..Self::default()
        }
    }

    pub fn with_rarity(index: usize, rarity: Rarity) -> Self {
        Self::new(index, rarity.base_weight())
    }

    pub fn category(mut self, category: usize) -> Self {
        self.categories.push(category);
        self
    }

    pub fn categories(mut self, categories: impl IntoIterator<Item = usize>) -> Self {
        self.categories.extend(categories);
        self
    }

    pub fn incompatible_with(mut self, index: usize) -> Self {
        self.incompatible.push(index);
        self
    }
}

/// Builds validated, symmetric items from specs.
#[derive(Debug, Clone, Default)]
pub struct CatalogBuilder {
    specs: Vec<ItemSpec>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item(mut self, spec: ItemSpec) -> Self {
        self.specs.push(spec);
        self
    }

    pub fn items(mut self, specs: impl IntoIterator<Item = ItemSpec>) -> Self {
        self.specs.extend(specs);
        self
    }

    /// Builds the items in spec order.
    ///
    /// # Errors
    ///
    /// Returns an error for out-of-range item or category indices and for
    /// duplicate item indices.
    pub fn build(self) -> Result<Vec<Item>> {
        let mut seen = ItemMask::empty();
        let mut exclusions = vec![ItemMask::empty(); MAX_ITEMS];

        for spec in &self.specs {
            if spec.index >= MAX_ITEMS {
                return Err(ComboForgeError::InvalidItemIndex(spec.index));
            }
            if seen.test(spec.index) {
                return Err(ComboForgeError::DuplicateItemIndex(spec.index));
            }
            seen.set(spec.index);

            for &other in &spec.incompatible {
                if other >= MAX_ITEMS {
                    return Err(ComboForgeError::InvalidItemIndex(other));
                }
                exclusions[spec.index].set(other);
                exclusions[other].set(spec.index);
            }
        }

        self.specs
            .iter()
            .map(|spec| {
                if let Some(&category) = spec.categories.iter().find(|&&c| c >= MAX_CATEGORIES) {
                    return Err(ComboForgeError::InvalidCategory {
                        index: spec.index,
                        category,
                    });
                }
                let categories: CategoryMask = spec.categories.iter().copied().collect();
                Item::new(spec.index, spec.weight, exclusions[spec.index], categories)
            })
            .collect()
    }
}

/// Returns copies of `items` carrying the matching potential scores.
///
/// # Errors
///
/// Returns [`ComboForgeError::LengthMismatch`] if the slices differ in length.
pub fn with_potentials(items: &[Item], potentials: &[i64]) -> Result<Vec<Item>> {
    if items.len() != potentials.len() {
        return Err(ComboForgeError::LengthMismatch {
            expected: items.len(),
            actual: potentials.len(),
        });
    }
    Ok(items
        .iter()
        .zip(potentials)
        .map(|(item, &potential)| item.with_max_potential(potential))
        .collect())
}

/// Items of `pool` whose index is set in `mask`, in pool order.
pub fn items_from_mask(pool: &[Item], mask: &ItemMask) -> Vec<Item> {
    pool.iter()
        .filter(|item| mask.test(item.index()))
        .copied()
        .collect()
}
