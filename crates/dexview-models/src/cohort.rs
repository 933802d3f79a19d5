//! Cohort (generation) id ranges and the category tag vocabulary.

/// Highest catalog id that resolves to a full record.
pub const MAX_CATALOG_ID: u32 = 1_025;

/// Contiguous id range selected by a cohort filter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cohort {
    /// Human-readable label.
    pub label: &'static str,
    /// Filter value used in URLs.
    pub value: &'static str,
    /// First id in the cohort (inclusive).
    pub min_id: u32,
    /// Last id in the cohort (inclusive).
    pub max_id: u32,
}

impl Cohort {
    /// Number of ids in the cohort.
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.max_id - self.min_id + 1
    }

    /// Cohorts are never empty; present for API symmetry with `len`.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Whether `id` falls inside the cohort.
    #[must_use]
    pub const fn contains(&self, id: u32) -> bool {
        id >= self.min_id && id <= self.max_id
    }
}

/// Known cohorts in id order.
pub const COHORTS: [Cohort; 9] = [
    Cohort {
        label: "Generation I",
        value: "1",
        min_id: 1,
        max_id: 151,
    },
    Cohort {
        label: "Generation II",
        value: "2",
        min_id: 152,
        max_id: 251,
    },
    Cohort {
        label: "Generation III",
        value: "3",
        min_id: 252,
        max_id: 386,
    },
    Cohort {
        label: "Generation IV",
        value: "4",
        min_id: 387,
        max_id: 493,
    },
    Cohort {
        label: "Generation V",
        value: "5",
        min_id: 494,
        max_id: 649,
    },
    Cohort {
        label: "Generation VI",
        value: "6",
        min_id: 650,
        max_id: 721,
    },
    Cohort {
        label: "Generation VII",
        value: "7",
        min_id: 722,
        max_id: 809,
    },
    Cohort {
        label: "Generation VIII",
        value: "8",
        min_id: 810,
        max_id: 905,
    },
    Cohort {
        label: "Generation IX",
        value: "9",
        min_id: 906,
        max_id: 1_025,
    },
];

/// Category tags accepted by the category filter.
pub const CATEGORIES: [&str; 18] = [
    "normal", "fighting", "flying", "poison", "ground", "rock", "bug", "ghost", "steel", "fire",
    "water", "grass", "electric", "psychic", "ice", "dragon", "dark", "fairy",
];

/// Look up a cohort by its filter value.
#[must_use]
pub fn find_cohort(value: &str) -> Option<&'static Cohort> {
    COHORTS.iter().find(|cohort| cohort.value == value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cohorts_are_contiguous_and_cover_catalog() {
        let mut expected_min = 1;
        for cohort in &COHORTS {
            assert_eq!(cohort.min_id, expected_min, "{}", cohort.label);
            expected_min = cohort.max_id + 1;
        }
        assert_eq!(expected_min - 1, MAX_CATALOG_ID);
    }

    #[test]
    fn find_cohort_resolves_values() {
        let first = find_cohort("1").expect("generation one");
        assert_eq!(first.len(), 151);
        assert!(first.contains(151));
        assert!(!first.contains(152));
        assert!(find_cohort("10").is_none());
    }
}
