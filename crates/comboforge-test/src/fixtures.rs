//! Item universes for tests.

use comboforge_core::{CatalogBuilder, Item, ItemSpec, MAX_CATEGORIES};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Six mutually compatible items sharing category 0.
///
/// Weights are `[5, 15, 45, 5, 15, 45]`, so the best pair is items 2 and 5.
pub fn six_item_universe() -> Vec<Item> {
    build(
        [5, 15, 45, 5, 15, 45]
            .into_iter()
            .enumerate()
            .map(|(index, weight)| ItemSpec::new(index, weight).category(0)),
    )
}

/// Four heavy items in one category where items 0 and 1 exclude each other.
pub fn incompatible_pair_universe() -> Vec<Item> {
    build([
        ItemSpec::new(0, 405).category(0).incompatible_with(1),
        ItemSpec::new(1, 405).category(0),
        ItemSpec::new(2, 45).category(0),
        ItemSpec::new(3, 15).category(0),
    ])
}

/// `count` mutually compatible items, each in its own category slot.
///
/// Slots wrap after the thirteenth item.
pub fn disjoint_category_universe(count: usize) -> Vec<Item> {
    build((0..count).map(|index| {
        ItemSpec::new(index, 5 + index as u32 * 10).category(index % MAX_CATEGORIES)
    }))
}

/// Shape of a seeded random universe.
#[derive(Debug, Clone, Copy)]
pub struct RandomUniverse {
    pub seed: u64,
    pub item_count: usize,
    /// Number of category slots drawn from, at most 13.
    pub category_count: usize,
    pub max_categories_per_item: usize,
    /// Chance that any given pair of items excludes each other.
    pub exclusion_probability: f64,
}

impl RandomUniverse {
    pub fn new(seed: u64, item_count: usize) -> Self {
        Self {
            seed,
            item_count,
            category_count: 4,
            max_categories_per_item: 2,
            exclusion_probability: 0.1,
        }
    }

    pub fn with_categories(mut self, category_count: usize, max_per_item: usize) -> Self {
        self.category_count = category_count.min(MAX_CATEGORIES);
        self.max_categories_per_item = max_per_item;
        self
    }

    pub fn with_exclusion_probability(mut self, p: f64) -> Self {
        self.exclusion_probability = p;
        self
    }
}

/// Builds a reproducible universe with rarity-tier weights, random
/// categories and random pairwise exclusions.
pub fn random_universe(shape: RandomUniverse) -> Vec<Item> {
    const WEIGHTS: [u32; 5] = [5, 15, 45, 135, 405];

    let mut rng = ChaCha8Rng::seed_from_u64(shape.seed);
    let specs: Vec<ItemSpec> = (0..shape.item_count)
        .map(|index| {
            let mut spec = ItemSpec::new(index, WEIGHTS[rng.random_range(0..WEIGHTS.len())]);
            if shape.category_count > 0 {
                let n = rng.random_range(0..=shape.max_categories_per_item);
                for _ in 0..n {
                    spec = spec.category(rng.random_range(0..shape.category_count));
                }
            }
            for other in index + 1..shape.item_count {
                if rng.random_bool(shape.exclusion_probability) {
                    spec = spec.incompatible_with(other);
                }
            }
            spec
        })
        .collect();
    build(specs)
}

fn build(specs: impl IntoIterator<Item = ItemSpec>) -> Vec<Item> {
    CatalogBuilder::new()
        .items(specs)
        .build()
        .expect("fixture catalog is valid")
}
