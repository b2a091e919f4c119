//! Location hierarchy tests
//!
//! Property-based and unit tests for:
//! - No duplicate divisions per estate or blocks per division
//! - Union of several reference sources
//! - Planting year lookups and malformed entry handling

use std::collections::HashMap;

use proptest::prelude::*;
use serde_json::{json, Value};
use shared::{AfdelingRecord, BlockRecord, EstateRecord, LocationHierarchy, SkipReason};

// ============================================================================
// Property Test Strategies
// ============================================================================

fn kebun_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("1KSD".to_string()),
        Just("1KTO".to_string()),
        Just("1KSB".to_string()),
    ]
}

fn afdeling_strategy() -> impl Strategy<Value = String> {
    "[A-D]"
}

fn block_strategy() -> impl Strategy<Value = BlockRecord> {
    ("[1-9]", prop::option::of("20[0-2][0-9]"))
        .prop_map(|(blok, tahuntanam)| BlockRecord { blok, tahuntanam })
}

fn estate_strategy() -> impl Strategy<Value = EstateRecord> {
    (
        kebun_strategy(),
        prop::collection::vec(
            (afdeling_strategy(), prop::collection::vec(block_strategy(), 0..5))
                .prop_map(|(afdeling, blocks)| AfdelingRecord { afdeling, blocks }),
            0..4,
        ),
    )
        .prop_map(|(kebun, afdelings)| EstateRecord { kebun, afdelings })
}

fn sources_strategy() -> impl Strategy<Value = Vec<Vec<EstateRecord>>> {
    prop::collection::vec(prop::collection::vec(estate_strategy(), 0..4), 1..4)
}

fn to_raw(sources: &[Vec<EstateRecord>]) -> Vec<Vec<Value>> {
    sources
        .iter()
        .map(|entries| {
            entries
                .iter()
                .map(|e| serde_json::to_value(e).unwrap())
                .collect()
        })
        .collect()
}

fn has_duplicates(values: &[String]) -> bool {
    let mut seen = std::collections::HashSet::new();
    values.iter().any(|v| !seen.insert(v))
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    /// Divisions and blocks are listed once each, whatever the input repeats
    #[test]
    fn test_no_duplicate_divisions_or_blocks(sources in sources_strategy()) {
        let hierarchy = LocationHierarchy::build(&to_raw(&sources));

        prop_assert!(!has_duplicates(hierarchy.estates()));
        for kebun in hierarchy.estates() {
            let divisions = hierarchy.divisions_for(kebun);
            prop_assert!(!has_duplicates(divisions));
            for afdeling in divisions {
                prop_assert!(!has_duplicates(hierarchy.blocks_for(kebun, afdeling)));
            }
        }
    }

    /// Every location in any source is reachable after the union
    #[test]
    fn test_union_keeps_every_location(sources in sources_strategy()) {
        let hierarchy = LocationHierarchy::build(&to_raw(&sources));

        for estate in sources.iter().flatten() {
            prop_assert!(hierarchy.has_estate(&estate.kebun));
            for afdeling in &estate.afdelings {
                prop_assert!(hierarchy
                    .divisions_for(&estate.kebun)
                    .contains(&afdeling.afdeling));
                for block in &afdeling.blocks {
                    prop_assert!(hierarchy
                        .blocks_for(&estate.kebun, &afdeling.afdeling)
                        .contains(&block.blok));
                }
            }
        }
    }

    /// The first non-empty planting year seen for a block wins
    #[test]
    fn test_first_planting_year_wins(sources in sources_strategy()) {
        let hierarchy = LocationHierarchy::build(&to_raw(&sources));

        let mut expected: HashMap<(String, String, String), String> = HashMap::new();
        for estate in sources.iter().flatten() {
            for afdeling in &estate.afdelings {
                for block in &afdeling.blocks {
                    if let Some(year) = &block.tahuntanam {
                        expected
                            .entry((estate.kebun.clone(), afdeling.afdeling.clone(), block.blok.clone()))
                            .or_insert_with(|| year.clone());
                    }
                }
            }
        }

        for ((kebun, afdeling, blok), year) in &expected {
            prop_assert_eq!(hierarchy.planting_year_for(kebun, afdeling, blok), Some(year.as_str()));
        }
    }

    /// Typed records and their JSON form index identically
    #[test]
    fn test_records_and_raw_sources_agree(sources in sources_strategy()) {
        let records: Vec<EstateRecord> = sources.iter().flatten().cloned().collect();
        prop_assert_eq!(
            LocationHierarchy::from_records(&records),
            LocationHierarchy::build(&to_raw(&sources))
        );
    }
}

// ============================================================================
// Unit Tests: Lookups
// ============================================================================

#[cfg(test)]
mod lookup_tests {
    use super::*;

    fn scenario() -> LocationHierarchy {
        LocationHierarchy::build(&[vec![json!({
            "kebun": "1KSD",
            "afdelings": [
                {
                    "afdeling": "A",
                    "blocks": [
                        { "blok": "1", "tahuntanam": "2010" },
                        { "blok": "2", "tahuntanam": "2012" }
                    ]
                }
            ]
        })]])
    }

    #[test]
    fn test_scenario_lookups() {
        let h = scenario();
        assert_eq!(h.divisions_for("1KSD"), ["A"]);
        assert_eq!(h.blocks_for("1KSD", "A"), ["1", "2"]);
        assert_eq!(h.planting_year_for("1KSD", "A", "1"), Some("2010"));
        assert_eq!(h.planting_year_for("1KSD", "A", "9"), None);
    }

    #[test]
    fn test_unknown_keys_are_empty() {
        let h = scenario();
        assert!(h.divisions_for("9XXX").is_empty());
        assert!(h.blocks_for("1KSD", "Z").is_empty());
        assert!(h.blocks_for("9XXX", "A").is_empty());
        assert_eq!(h.planting_year_for("9XXX", "A", "1"), None);
    }

    #[test]
    fn test_empty_sources() {
        let h = LocationHierarchy::build(&[]);
        assert!(h.is_empty());
        assert!(h.divisions_for("1KSD").is_empty());
    }

    #[test]
    fn test_numeric_names_are_read_as_text() {
        let h = LocationHierarchy::build(&[vec![json!({
            "kebun": "1KTO",
            "afdelings": [{ "afdeling": 3, "blocks": [{ "blok": 12, "tahuntanam": 2009 }] }]
        })]]);
        assert_eq!(h.blocks_for("1KTO", "3"), ["12"]);
        assert_eq!(h.planting_year_for("1KTO", "3", "12"), Some("2009"));
    }
}

// ============================================================================
// Unit Tests: Malformed Entries
// ============================================================================

#[cfg(test)]
mod malformed_entry_tests {
    use super::*;

    #[test]
    fn test_malformed_entries_are_skipped_and_reported() {
        let (h, skips) = LocationHierarchy::build_with_report(&[
            vec![
                json!("1KSD"),
                json!({ "afdelings": [] }),
                json!({ "kebun": "1KSB" }),
            ],
            vec![json!({
                "kebun": "1KSD",
                "afdelings": [
                    { "blocks": [] },
                    { "afdeling": "A" },
                    { "afdeling": "B", "blocks": [{ "tahuntanam": "2011" }, { "blok": "4" }] }
                ]
            })],
        ]);

        assert_eq!(h.estates(), ["1KSD"]);
        assert_eq!(h.divisions_for("1KSD"), ["A", "B"]);
        assert!(h.blocks_for("1KSD", "A").is_empty());
        assert_eq!(h.blocks_for("1KSD", "B"), ["4"]);

        let reasons: Vec<_> = skips.iter().map(|s| &s.reason).collect();
        assert_eq!(skips.len(), 6);
        assert_eq!(*reasons[0], SkipReason::NotAnObject);
        assert_eq!(*reasons[1], SkipReason::MissingKebun);
        assert!(matches!(reasons[2], SkipReason::MissingAfdelings { kebun } if kebun == "1KSB"));
        assert_eq!((skips[3].source, skips[3].entry), (1, 0));
    }
}
