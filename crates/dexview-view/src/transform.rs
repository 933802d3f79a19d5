//! Post-fetch shaping of the view list: dedup, category filter, stable sort.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use dexview_models::{DetailRecord, SortField, SortSpec};

/// Shape `records` into the visible list.
///
/// Order of operations: drop repeated ids (first occurrence wins), keep
/// records carrying `category` when one is set, then stable-sort by `sort`.
#[must_use]
pub fn derive_view(
    records: impl IntoIterator<Item = Arc<DetailRecord>>,
    category: Option<&str>,
    sort: &SortSpec,
) -> Vec<Arc<DetailRecord>> {
    let mut seen = HashSet::new();
    let mut items: Vec<Arc<DetailRecord>> = records
        .into_iter()
        .filter(|record| seen.insert(record.id))
        .filter(|record| category.is_none_or(|category| record.has_category(category)))
        .collect();
    sort_records(&mut items, sort);
    items
}

/// Stable sort in place.
///
/// Names compare case-sensitively. Records missing a measurement go after
/// every record that has one, whichever the direction. Unrecognized fields
/// leave the input order untouched; any order other than `asc` is descending.
pub fn sort_records(items: &mut [Arc<DetailRecord>], sort: &SortSpec) {
    let ascending = sort.order.is_ascending();
    match &sort.field {
        SortField::Name => items.sort_by(|a, b| directed(a.name.cmp(&b.name), ascending)),
        SortField::Id => items.sort_by(|a, b| directed(a.id.cmp(&b.id), ascending)),
        SortField::Height => {
            items.sort_by(|a, b| compare_measurement(a.height, b.height, ascending));
        }
        SortField::Weight => {
            items.sort_by(|a, b| compare_measurement(a.weight, b.weight, ascending));
        }
        SortField::Other(_) => {}
    }
}

const fn directed(ordering: Ordering, ascending: bool) -> Ordering {
    if ascending { ordering } else { ordering.reverse() }
}

fn compare_measurement(a: Option<u32>, b: Option<u32>, ascending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => directed(a.cmp(&b), ascending),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dexview_models::SortOrder;
    use dexview_test_support::fixtures::RecordBuilder;

    fn ids(items: &[Arc<DetailRecord>]) -> Vec<u32> {
        items.iter().map(|record| record.id).collect()
    }

    fn named(id: u32, name: &str) -> Arc<DetailRecord> {
        Arc::new(RecordBuilder::new(id, name).build())
    }

    #[test]
    fn equal_names_keep_their_input_order() {
        let input = vec![named(3, "b"), named(1, "b"), named(2, "a")];
        let sorted = derive_view(
            input,
            None,
            &SortSpec::new(SortField::Name, SortOrder::Asc),
        );
        assert_eq!(ids(&sorted), vec![2, 3, 1]);
    }

    #[test]
    fn names_compare_case_sensitively() {
        let input = vec![named(1, "abra"), named(2, "Zubat"), named(3, "Abra")];
        let sorted = derive_view(
            input,
            None,
            &SortSpec::new(SortField::Name, SortOrder::Asc),
        );
        assert_eq!(ids(&sorted), vec![3, 2, 1]);
    }

    #[test]
    fn missing_measurements_sort_last_in_both_directions() {
        let input = vec![
            Arc::new(RecordBuilder::new(1, "a").height(5).build()),
            Arc::new(RecordBuilder::new(2, "b").build()),
            Arc::new(RecordBuilder::new(3, "c").height(9).build()),
        ];
        let asc = derive_view(
            input.clone(),
            None,
            &SortSpec::new(SortField::Height, SortOrder::Asc),
        );
        assert_eq!(ids(&asc), vec![1, 3, 2]);

        let desc = derive_view(
            input,
            None,
            &SortSpec::new(SortField::Height, SortOrder::Desc),
        );
        assert_eq!(ids(&desc), vec![3, 1, 2]);
    }

    #[test]
    fn category_filter_and_dedup_run_before_sorting() {
        let fire = |id, name| Arc::new(RecordBuilder::new(id, name).weight(id).category("fire").build());
        let input = vec![
            fire(6, "charizard"),
            Arc::new(RecordBuilder::new(7, "squirtle").category("water").build()),
            fire(4, "charmander"),
            fire(6, "charizard-dup"),
        ];
        let sorted = derive_view(
            input,
            Some("fire"),
            &SortSpec::new(SortField::Weight, SortOrder::Desc),
        );
        assert_eq!(ids(&sorted), vec![6, 4]);
        assert_eq!(sorted[0].name, "charizard");
    }

    #[test]
    fn passthrough_field_keeps_order_and_passthrough_order_is_descending() {
        let input = vec![named(2, "b"), named(1, "a"), named(3, "c")];
        let untouched = derive_view(
            input.clone(),
            None,
            &SortSpec::new(SortField::Other("base_experience".into()), SortOrder::Asc),
        );
        assert_eq!(ids(&untouched), vec![2, 1, 3]);

        let sideways = derive_view(
            input,
            None,
            &SortSpec::new(SortField::Id, SortOrder::Other("sideways".into())),
        );
        assert_eq!(ids(&sideways), vec![3, 2, 1]);
    }
}
