use std::collections::HashSet;

use chart_join::ChartError;
use chart_join::core::{DatasetJoiner, Key, KeyStrategy, Record};
use indexmap::IndexMap;
use proptest::prelude::*;

fn keyed(pairs: &[(f64, f64)]) -> Vec<Record> {
    pairs
        .iter()
        .map(|&(key, value)| Record::Keyed { key, value })
        .collect()
}

fn bound(records: &[Record], strategy: KeyStrategy) -> IndexMap<Key, Record> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| (strategy.key_of(record, index), *record))
        .collect()
}

fn by_field(record: &Record, index: usize) -> Key {
    KeyStrategy::Field.key_of(record, index)
}

#[test]
fn join_partitions_by_key_and_keeps_next_order() {
    let previous = bound(&keyed(&[(1.0, 10.0), (2.0, 20.0), (3.0, 30.0)]), KeyStrategy::Field);
    let next = keyed(&[(4.0, 40.0), (2.0, 22.0), (1.0, 11.0)]);

    let result = DatasetJoiner::join(&previous, &next, by_field).expect("unique keys");

    assert_eq!(result.enter_keys().cloned().collect::<Vec<_>>(), vec![Key::number(4.0)]);
    assert_eq!(
        result.update_keys().cloned().collect::<Vec<_>>(),
        vec![Key::number(2.0), Key::number(1.0)]
    );
    assert_eq!(result.exit_keys().cloned().collect::<Vec<_>>(), vec![Key::number(3.0)]);

    let update = &result.update[0];
    assert_eq!(update.index, 1);
    assert_eq!(update.previous, Record::Keyed { key: 2.0, value: 20.0 });
    assert_eq!(update.record, Record::Keyed { key: 2.0, value: 22.0 });
    assert_eq!(result.enter[0].index, 0);
    assert!(!result.is_stable());
}

#[test]
fn exit_order_follows_previous_collection() {
    let previous = bound(&keyed(&[(9.0, 1.0), (3.0, 1.0), (5.0, 1.0)]), KeyStrategy::Field);
    let result = DatasetJoiner::join(&previous, &keyed(&[(3.0, 1.0)]), by_field)
        .expect("unique keys");
    assert_eq!(
        result.exit_keys().cloned().collect::<Vec<_>>(),
        vec![Key::number(9.0), Key::number(5.0)]
    );
}

#[test]
fn empty_snapshot_exits_everything() {
    let previous = bound(&[Record::Scalar(1.0), Record::Scalar(2.0)], KeyStrategy::Index);
    let result = DatasetJoiner::join(&previous, &[], |record, index| {
        KeyStrategy::Index.key_of(record, index)
    })
    .expect("nothing to collide");
    assert!(result.enter.is_empty());
    assert!(result.update.is_empty());
    assert_eq!(result.exit.len(), 2);
}

#[test]
fn identical_snapshot_is_stable() {
    let records = keyed(&[(1.0, 5.0), (2.0, 6.0)]);
    let previous = bound(&records, KeyStrategy::Field);
    let result = DatasetJoiner::join(&previous, &records, by_field).expect("unique keys");
    assert!(result.is_stable());
    assert_eq!(result.update.len(), 2);
    assert!(result.update.iter().all(|entry| entry.previous == entry.record));
}

#[test]
fn duplicate_keys_are_rejected() {
    let previous: IndexMap<Key, Record> = IndexMap::new();
    let next = keyed(&[(1.0, 5.0), (2.0, 6.0), (1.0, 7.0)]);
    let err = DatasetJoiner::join(&previous, &next, by_field).expect_err("duplicate key");
    match err {
        ChartError::DuplicateKey {
            key,
            first_index,
            duplicate_index,
        } => {
            assert_eq!(key, "1");
            assert_eq!(first_index, 0);
            assert_eq!(duplicate_index, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn identity_keys_follow_coordinates() {
    let previous = bound(
        &[Record::Pair(10.0, 20.0), Record::Pair(480.0, 90.0)],
        KeyStrategy::Identity,
    );
    let next = [Record::Pair(10.0, 20.0), Record::Pair(300.0, 40.0)];
    let result = DatasetJoiner::join(&previous, &next, |record, index| {
        KeyStrategy::Identity.key_of(record, index)
    })
    .expect("unique keys");

    assert_eq!(result.update_keys().cloned().collect::<Vec<_>>(), vec![Key::pair(10.0, 20.0)]);
    assert_eq!(result.enter_keys().cloned().collect::<Vec<_>>(), vec![Key::pair(300.0, 40.0)]);
    assert_eq!(result.exit_keys().cloned().collect::<Vec<_>>(), vec![Key::pair(480.0, 90.0)]);

    let kept = &result.update[0];
    assert_eq!(kept.previous, Record::Pair(10.0, 20.0));
    assert_eq!(kept.record, Record::Pair(10.0, 20.0));
    assert_eq!(kept.index, 0);
}

#[test]
fn identity_keys_separate_coincident_records() {
    let records = [
        Record::Pair(3.0, 4.0),
        Record::Pair(3.0, 4.0),
        Record::Pair(7.0, 1.0),
        Record::Pair(3.0, 4.0),
    ];
    let keys = KeyStrategy::Identity.keys(&records);
    assert_eq!(
        keys,
        vec![
            Key::pair(3.0, 4.0),
            Key::Occurrence {
                base: Box::new(Key::pair(3.0, 4.0)),
                ordinal: 1,
            },
            Key::pair(7.0, 1.0),
            Key::Occurrence {
                base: Box::new(Key::pair(3.0, 4.0)),
                ordinal: 2,
            },
        ]
    );
    assert_eq!(keys[1].to_string(), "(3, 4)~1");

    let previous: IndexMap<Key, Record> = IndexMap::new();
    let result = DatasetJoiner::join(&previous, &records, |_, index| keys[index].clone())
        .expect("occurrences keep keys unique");
    assert_eq!(result.enter.len(), 4);

    let field_keys = KeyStrategy::Field.keys(&keyed(&[(1.0, 5.0), (1.0, 6.0)]));
    assert_eq!(field_keys, vec![Key::number(1.0), Key::number(1.0)]);
}

proptest! {
    #[test]
    fn join_is_an_exact_partition_of_both_key_sets(
        first in proptest::collection::hash_set(0u16..200, 0..60),
        second in proptest::collection::hash_set(0u16..200, 0..60)
    ) {
        let to_records = |keys: &HashSet<u16>| -> Vec<Record> {
            keys.iter()
                .map(|&key| Record::Keyed { key: f64::from(key), value: 1.0 })
                .collect()
        };
        let previous = bound(&to_records(&first), KeyStrategy::Field);
        let next = to_records(&second);

        let result = DatasetJoiner::join(&previous, &next, by_field).expect("unique keys");

        let enter: HashSet<Key> = result.enter_keys().cloned().collect();
        let update: HashSet<Key> = result.update_keys().cloned().collect();
        let exit: HashSet<Key> = result.exit_keys().cloned().collect();
        prop_assert_eq!(enter.len() + update.len() + exit.len(), result.len());
        prop_assert!(enter.is_disjoint(&update));
        prop_assert!(enter.is_disjoint(&exit));
        prop_assert!(update.is_disjoint(&exit));

        let union: HashSet<Key> = first
            .union(&second)
            .map(|&key| Key::number(f64::from(key)))
            .collect();
        let covered: HashSet<Key> = enter.union(&update).chain(exit.iter()).cloned().collect();
        prop_assert_eq!(covered, union);
    }
}
