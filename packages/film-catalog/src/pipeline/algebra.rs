//! Order-stable set operations over keyed records.
//!
//! All functions are pure: inputs are borrowed and a fresh sequence is
//! returned. Output order is always derived from input order.

use indexmap::{IndexMap, IndexSet};

use crate::types::record::Keyed;

/// Concatenate collections in argument order and drop later duplicates.
///
/// The first occurrence of a key keeps its position and its payload.
pub fn merge<'a, T, C>(collections: impl IntoIterator<Item = C>) -> Vec<T>
where
    T: Keyed + Clone + 'a,
    C: IntoIterator<Item = &'a T>,
{
    let mut merged: IndexMap<T::Key, T> = IndexMap::new();
    for record in collections.into_iter().flatten() {
        merged
            .entry(record.key())
            .or_insert_with(|| record.clone());
    }
    merged.into_values().collect()
}

/// Elements of `base` whose key does not appear in `exclude`.
pub fn difference<T, E>(base: &[T], exclude: &[E]) -> Vec<T>
where
    T: Keyed + Clone,
    E: Keyed<Key = T::Key>,
{
    let excluded = key_set(exclude);
    base.iter()
        .filter(|record| !excluded.contains(&record.key()))
        .cloned()
        .collect()
}

/// Build a collection that fully supersedes the current one.
///
/// Bare keys are lifted into minimal records through `Into`. Repeated keys
/// are collapsed to their first occurrence.
pub fn replace<T, U>(incoming: impl IntoIterator<Item = U>) -> Vec<T>
where
    T: Keyed + Clone,
    U: Into<T>,
{
    let lifted: Vec<T> = incoming.into_iter().map(Into::into).collect();
    merge([&lifted])
}

/// Remove duplicate keys.
///
/// Each key stays where it first appeared but carries the payload of its
/// last occurrence, so a later, fresher record updates an earlier one.
pub fn unique_by_key<T: Keyed + Clone>(records: &[T]) -> Vec<T> {
    let mut unique: IndexMap<T::Key, T> = IndexMap::with_capacity(records.len());
    for record in records {
        unique.insert(record.key(), record.clone());
    }
    unique.into_values().collect()
}

/// Keys of `records` in order.
pub fn keys<T: Keyed>(records: &[T]) -> Vec<T::Key> {
    records.iter().map(Keyed::key).collect()
}

/// Distinct keys of `records` in first-seen order.
pub fn key_set<T: Keyed>(records: &[T]) -> IndexSet<T::Key> {
    records.iter().map(Keyed::key).collect()
}

/// Number of records whose key already appeared earlier in the sequence.
pub fn duplicate_count<T: Keyed>(records: &[T]) -> usize {
    records.len() - key_set(records).len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::record::{FilmId, FilmRecord};
    use proptest::prelude::*;

    fn ids(raw: &[u64]) -> Vec<FilmId> {
        raw.iter().copied().map(FilmId).collect()
    }

    fn raw(ids: &[FilmId]) -> Vec<u64> {
        ids.iter().map(|id| id.get()).collect()
    }

    #[test]
    fn test_merge_keeps_first_seen_order() {
        let merged = merge([&ids(&[1, 2, 3]), &ids(&[3, 4])]);
        assert_eq!(raw(&merged), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_merge_keeps_first_payload() {
        let a = vec![FilmRecord::new(7u64).with_rating(4.0)];
        let b = vec![FilmRecord::new(7u64).with_rating(1.0), FilmRecord::new(8u64)];
        let merged = merge([&a, &b]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].rating, Some(4.0));
    }

    #[test]
    fn test_difference() {
        let result = difference(&ids(&[1, 2, 3]), &ids(&[2]));
        assert_eq!(raw(&result), vec![1, 3]);
        assert_eq!(raw(&difference(&ids(&[1, 2]), &ids(&[]))), vec![1, 2]);
    }

    #[test]
    fn test_difference_across_record_types() {
        let base = vec![FilmRecord::new(1u64), FilmRecord::new(2u64)];
        let result = difference(&base, &ids(&[1]));
        assert_eq!(result, vec![FilmRecord::new(2u64)]);
    }

    #[test]
    fn test_replace_lifts_bare_keys() {
        let replaced: Vec<FilmRecord> = replace(ids(&[5, 6, 5]));
        assert_eq!(replaced, vec![FilmRecord::new(5u64), FilmRecord::new(6u64)]);
    }

    #[test]
    fn test_unique_by_key_takes_last_payload() {
        let records = vec![
            FilmRecord::new(1u64).with_rating(2.0),
            FilmRecord::new(2u64),
            FilmRecord::new(1u64).with_rating(4.5),
        ];
        let unique = unique_by_key(&records);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].film_id, FilmId(1));
        assert_eq!(unique[0].rating, Some(4.5));
        assert_eq!(duplicate_count(&records), 1);
    }

    proptest! {
        #[test]
        fn prop_merge_is_unique_and_complete(
            a in prop::collection::vec(0u64..50, 0..40),
            b in prop::collection::vec(0u64..50, 0..40),
        ) {
            let (a, b) = (ids(&a), ids(&b));
            let merged = merge([&a, &b]);
            prop_assert_eq!(duplicate_count(&merged), 0);
            for id in a.iter().chain(b.iter()) {
                prop_assert!(merged.contains(id));
            }
        }

        #[test]
        fn prop_difference_drops_only_excluded(
            base in prop::collection::vec(0u64..50, 0..40),
            exclude in prop::collection::vec(0u64..50, 0..20),
        ) {
            let (base, exclude) = (ids(&base), ids(&exclude));
            let result = difference(&base, &exclude);
            prop_assert!(result.iter().all(|id| !exclude.contains(id)));
            let kept = base.iter().filter(|id| !exclude.contains(id)).count();
            prop_assert_eq!(result.len(), kept);
        }
    }
}
