//! Tests for items, accumulator scoring, combos and catalog assembly.

use super::*;

fn item(index: usize, weight: u32, categories: &[usize]) -> Item {
    Item::new(
        index,
        weight,
        ItemMask::empty(),
        categories.iter().copied().collect(),
    )
    .unwrap()
}

#[test]
fn test_multiplier_table_clamps() {
    assert_eq!(multiplier_for(0), 1);
    assert_eq!(multiplier_for(1), 1);
    assert_eq!(multiplier_for(2), 2);
    assert_eq!(multiplier_for(3), 5);
    assert_eq!(multiplier_for(4), 15);
    assert_eq!(multiplier_for(5), 30);
    assert_eq!(multiplier_for(6), 30);
    assert_eq!(multiplier_for(15), 30);
}

#[test]
fn test_empty_state_scores_zero() {
    let state = ComboState::new();
    assert_eq!(state.size(), 0);
    assert_eq!(state.multiplier(), 1);
    assert_eq!(state.score(), 0);
}

#[test]
fn test_single_item_scores_its_weight() {
    let a = item(0, 45, &[0, 3]);
    let state = ComboState::of(&a);
    assert_eq!(state.score(), 45);
    assert_eq!(a.solo_score(), 45);
}

#[test]
fn test_shared_categories_multiply() {
    // Five items in category 0, two of them also in category 1.
    let items = [
        item(0, 5, &[0, 1]),
        item(1, 5, &[0, 1]),
        item(2, 5, &[0]),
        item(3, 5, &[0]),
        item(4, 5, &[0]),
    ];
    let state = items.iter().fold(ComboState::new(), |s, i| s.with(i));

    assert_eq!(state.category_count(0), 5);
    assert_eq!(state.category_count(1), 2);
    assert_eq!(state.multiplier(), 30 * 2);
    assert_eq!(state.score(), 25 * 60);
}

#[test]
fn test_counts_per_slot_are_independent() {
    let items = [item(0, 1, &[12]), item(1, 1, &[12]), item(2, 1, &[11])];
    let state = items.iter().fold(ComboState::new(), |s, i| s.with(i));

    assert_eq!(state.category_count(12), 2);
    assert_eq!(state.category_count(11), 1);
    assert_eq!(state.category_count(0), 0);
    assert_eq!(state.category_count(40), 0);
}

#[test]
fn test_copy_on_branch_leaves_parent_untouched() {
    let a = item(0, 10, &[0]);
    let b = item(1, 20, &[0]);
    let parent = ComboState::of(&a);
    let child = parent.with(&b);

    assert_eq!(parent.size(), 1);
    assert_eq!(parent.total_weight(), 10);
    assert_eq!(child.size(), 2);
    assert_eq!(child.total_weight(), 30);
}

#[test]
fn test_can_add_respects_incompatibility() {
    let items = CatalogBuilder::new()
        .item(ItemSpec::new(0, 5).incompatible_with(2))
        .item(ItemSpec::new(1, 5))
        .item(ItemSpec::new(2, 5))
        .build()
        .unwrap();

    let state = ComboState::of(&items[0]);
    assert!(state.can_add(&items[1]));
    assert!(!state.can_add(&items[2]));

    // Symmetric: starting from the other side is also blocked.
    let state = ComboState::of(&items[2]);
    assert!(!state.can_add(&items[0]));
}

#[test]
fn test_item_rejects_out_of_range_index() {
    let err = Item::new(512, 5, ItemMask::empty(), CategoryMask::EMPTY).unwrap_err();
    assert_eq!(err, ComboForgeError::InvalidItemIndex(512));
}

#[test]
fn test_item_rejects_unpackable_category() {
    let err = Item::new(3, 5, ItemMask::empty(), CategoryMask::from_bits(1 << 13)).unwrap_err();
    assert_eq!(
        err,
        ComboForgeError::InvalidCategory {
            index: 3,
            category: 13
        }
    );
}

#[test]
fn test_item_drops_self_exclusion() {
    let a = Item::new(9, 5, ItemMask::from_indices([9, 10]), CategoryMask::EMPTY).unwrap();
    assert!(!a.incompatible().test(9));
    assert!(a.incompatible().test(10));
}

#[test]
fn test_combo_orders_members_and_scores() {
    let combo = Combo::new([item(7, 45, &[2]), item(3, 45, &[2]), item(5, 5, &[4])]);

    assert_eq!(combo.indices().collect::<Vec<_>>(), vec![3, 5, 7]);
    assert_eq!(combo.base_weight(), 95);
    assert_eq!(combo.multiplier(), 2);
    assert_eq!(combo.score(), 190);
    assert_eq!(combo.category_counts()[2], 2);
    assert_eq!(combo.category_counts()[4], 1);
    assert!(combo.contains(5));
    assert!(!combo.contains(4));
    assert!(combo.is_legal());
}

#[test]
fn test_combo_legality_detects_conflict() {
    let items = CatalogBuilder::new()
        .item(ItemSpec::new(0, 5).incompatible_with(1))
        .item(ItemSpec::new(1, 5))
        .build()
        .unwrap();
    assert!(!Combo::new(items).is_legal());
}

#[test]
fn test_packed_combo_projection() {
    let pool = vec![
        Combo::new([item(0, 5, &[]), item(1, 5, &[])]),
        Combo::new([item(2, 5, &[]), item(3, 5, &[])]),
    ];
    let packed = PackedCombo::pack_all(&pool);

    assert_eq!(packed.len(), 2);
    assert_eq!(packed[1].original_index, 1);
    assert_eq!(packed[1].score, 10);
    assert_eq!(packed[1].used_items.iter().collect::<Vec<_>>(), vec![2, 3]);
    assert!(!packed[0].used_items.intersects(&packed[1].used_items));
}

#[test]
fn test_rarity_weights() {
    let weights: Vec<u32> = (0..5)
        .filter_map(Rarity::from_level)
        .map(Rarity::base_weight)
        .collect();
    assert_eq!(weights, vec![5, 15, 45, 135, 405]);
    assert_eq!(Rarity::from_level(5), None);
}

#[test]
fn test_catalog_rejects_duplicates() {
    let err = CatalogBuilder::new()
        .item(ItemSpec::new(4, 5))
        .item(ItemSpec::new(4, 15))
        .build()
        .unwrap_err();
    assert_eq!(err, ComboForgeError::DuplicateItemIndex(4));
}

#[test]
fn test_catalog_rejects_bad_exclusion_target() {
    let err = CatalogBuilder::new()
        .item(ItemSpec::new(0, 5).incompatible_with(600))
        .build()
        .unwrap_err();
    assert_eq!(err, ComboForgeError::InvalidItemIndex(600));
}

#[test]
fn test_with_potentials() {
    let items = vec![item(0, 5, &[]), item(1, 15, &[])];
    let analyzed = with_potentials(&items, &[50, 150]).unwrap();
    assert_eq!(analyzed[0].max_potential(), 50);
    assert_eq!(analyzed[1].max_potential(), 150);

    let err = with_potentials(&items, &[1]).unwrap_err();
    assert_eq!(
        err,
        ComboForgeError::LengthMismatch {
            expected: 2,
            actual: 1
        }
    );
}

#[test]
fn test_items_from_mask() {
    let pool = vec![item(0, 5, &[]), item(3, 5, &[]), item(8, 5, &[])];
    let picked = items_from_mask(&pool, &ItemMask::from_indices([8, 0]));
    assert_eq!(picked.iter().map(Item::index).collect::<Vec<_>>(), vec![0, 8]);
}

#[test]
fn test_universe_mask_round_trips_pool() {
    let pool = vec![item(0, 5, &[]), item(3, 5, &[]), item(8, 5, &[])];
    let mask = ItemMask::from_items(&pool);
    assert_eq!(mask.count(), 3);
    assert_eq!(mask.iter().collect::<Vec<_>>(), vec![0, 3, 8]);
    assert_eq!(items_from_mask(&pool, &mask).len(), pool.len());
}

#[test]
fn test_validate_pool() {
    let pool = vec![item(0, 5, &[]), item(1, 5, &[])];
    assert!(validate_pool(&pool, 2).is_ok());
    assert_eq!(validate_pool(&[], 2), Err(ComboForgeError::EmptyPool));
    assert_eq!(
        validate_pool(&pool, 0),
        Err(ComboForgeError::InvalidComboSize(0))
    );
    assert_eq!(
        validate_pool(&pool, 6),
        Err(ComboForgeError::InvalidComboSize(6))
    );

    let dup = vec![item(2, 5, &[]), item(2, 5, &[])];
    assert_eq!(
        validate_pool(&dup, 1),
        Err(ComboForgeError::DuplicateItemIndex(2))
    );
}

#[test]
fn test_pool_stats() {
    let pool = vec![item(0, 5, &[0]), item(1, 405, &[1, 2, 3]), item(2, 45, &[])];
    let stats = PoolStats::of(&pool);
    assert_eq!(stats.max_weight, 405);
    assert_eq!(stats.max_categories_per_item, 3);
    assert_eq!(stats.item_count, 3);
}
