//! Estate → division → block → planting year index
//!
//! Built once from the reference arrays and read-only afterwards. Raw entries
//! are checked one by one; malformed parts are skipped and reported, never
//! raised.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::{AfdelingRecord, BlockRecord, EstateRecord};

/// Why a piece of reference data was left out of the index
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    #[error("entry is not an object")]
    NotAnObject,
    #[error("entry has no kebun")]
    MissingKebun,
    #[error("kebun {kebun} has no afdelings list")]
    MissingAfdelings { kebun: String },
    #[error("kebun {kebun}: afdeling #{position} has no name")]
    MissingAfdeling { kebun: String, position: usize },
    #[error("kebun {kebun} afdeling {afdeling} has no blocks list")]
    MissingBlocks { kebun: String, afdeling: String },
    #[error("kebun {kebun} afdeling {afdeling}: block #{position} has no blok")]
    MissingBlok {
        kebun: String,
        afdeling: String,
        position: usize,
    },
}

/// Outcome of checking one raw estate entry
#[derive(Debug, Clone, PartialEq)]
pub enum EntryCheck {
    Valid(EstateRecord),
    Skipped(SkipReason),
}

/// A skip with the position of the entry it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skip {
    pub source: usize,
    pub entry: usize,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Names may be written as strings or bare numbers in the reference files
fn name_of(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Check a raw estate entry. Divisions and blocks that cannot be read are
/// dropped from the returned record and pushed onto `dropped`.
pub fn check_entry(value: &Value, dropped: &mut Vec<SkipReason>) -> EntryCheck {
    let Some(object) = value.as_object() else {
        return EntryCheck::Skipped(SkipReason::NotAnObject);
    };
    let Some(kebun) = name_of(object.get("kebun")) else {
        return EntryCheck::Skipped(SkipReason::MissingKebun);
    };
    let Some(raw_afdelings) = object.get("afdelings").and_then(Value::as_array) else {
        return EntryCheck::Skipped(SkipReason::MissingAfdelings { kebun });
    };

    let mut afdelings = Vec::with_capacity(raw_afdelings.len());
    for (position, raw) in raw_afdelings.iter().enumerate() {
        let Some(afdeling) = name_of(raw.get("afdeling")) else {
            dropped.push(SkipReason::MissingAfdeling {
                kebun: kebun.clone(),
                position,
            });
            continue;
        };

        let mut blocks = Vec::new();
        match raw.get("blocks").and_then(Value::as_array) {
            Some(raw_blocks) => {
                for (position, block) in raw_blocks.iter().enumerate() {
                    match name_of(block.get("blok")) {
                        Some(blok) => blocks.push(BlockRecord {
                            blok,
                            tahuntanam: name_of(block.get("tahuntanam")),
                        }),
                        None => dropped.push(SkipReason::MissingBlok {
                            kebun: kebun.clone(),
                            afdeling: afdeling.clone(),
                            position,
                        }),
                    }
                }
            }
            // The division is still listed, with no blocks
            None => dropped.push(SkipReason::MissingBlocks {
                kebun: kebun.clone(),
                afdeling: afdeling.clone(),
            }),
        }

        afdelings.push(AfdelingRecord { afdeling, blocks });
    }

    EntryCheck::Valid(EstateRecord { kebun, afdelings })
}

/// One estate's divisions, blocks and planting years
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocationNode {
    pub kebun_id: String,
    afdelings: Vec<String>,
    blocks_by_afdeling: HashMap<String, Vec<String>>,
    #[serde(skip)]
    planting_year_by_block: HashMap<(String, String), String>,
}

impl LocationNode {
    fn new(kebun_id: &str) -> Self {
        Self {
            kebun_id: kebun_id.to_string(),
            ..Default::default()
        }
    }

    fn merge(&mut self, afdeling: &AfdelingRecord) {
        let name = &afdeling.afdeling;
        if !self.blocks_by_afdeling.contains_key(name) {
            self.afdelings.push(name.clone());
            self.blocks_by_afdeling.insert(name.clone(), Vec::new());
        }
        let blocks = self.blocks_by_afdeling.entry(name.clone()).or_default();

        for block in &afdeling.blocks {
            if !blocks.contains(&block.blok) {
                blocks.push(block.blok.clone());
            }
            if let Some(year) = block.tahuntanam.as_deref().filter(|y| !y.is_empty()) {
                self.planting_year_by_block
                    .entry((name.clone(), block.blok.clone()))
                    .or_insert_with(|| year.to_string());
            }
        }
    }

    /// Divisions in first-seen order
    pub fn afdelings(&self) -> &[String] {
        &self.afdelings
    }

    pub fn blocks(&self, afdeling: &str) -> &[String] {
        self.blocks_by_afdeling
            .get(afdeling)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn planting_year(&self, afdeling: &str, blok: &str) -> Option<&str> {
        self.planting_year_by_block
            .get(&(afdeling.to_string(), blok.to_string()))
            .map(String::as_str)
    }
}

/// Index over every estate in the reference data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationHierarchy {
    order: Vec<String>,
    nodes: HashMap<String, LocationNode>,
}

impl LocationHierarchy {
    /// Build from several raw arrays, discarding the skip report
    pub fn build(sources: &[Vec<Value>]) -> Self {
        Self::build_with_report(sources).0
    }

    /// Build from several raw arrays. The same estate in several arrays is
    /// unioned by name.
    pub fn build_with_report(sources: &[Vec<Value>]) -> (Self, Vec<Skip>) {
        let mut hierarchy = Self::default();
        let mut skips = Vec::new();

        for (source, entries) in sources.iter().enumerate() {
            for (entry, value) in entries.iter().enumerate() {
                let mut dropped = Vec::new();
                match check_entry(value, &mut dropped) {
                    EntryCheck::Valid(record) => hierarchy.insert(&record),
                    EntryCheck::Skipped(reason) => dropped.insert(0, reason),
                }
                skips.extend(dropped.into_iter().map(|reason| Skip {
                    source,
                    entry,
                    reason,
                }));
            }
        }

        (hierarchy, skips)
    }

    /// Build from records that are already typed
    pub fn from_records(records: &[EstateRecord]) -> Self {
        let mut hierarchy = Self::default();
        for record in records {
            hierarchy.insert(record);
        }
        hierarchy
    }

    fn insert(&mut self, record: &EstateRecord) {
        if !self.nodes.contains_key(&record.kebun) {
            self.order.push(record.kebun.clone());
        }
        let node = self
            .nodes
            .entry(record.kebun.clone())
            .or_insert_with(|| LocationNode::new(&record.kebun));
        for afdeling in &record.afdelings {
            node.merge(afdeling);
        }
    }

    /// Estate codes in first-seen order
    pub fn estates(&self) -> &[String] {
        &self.order
    }

    pub fn node(&self, kebun: &str) -> Option<&LocationNode> {
        self.nodes.get(kebun)
    }

    pub fn has_estate(&self, kebun: &str) -> bool {
        self.nodes.contains_key(kebun)
    }

    pub fn has_division(&self, kebun: &str, afdeling: &str) -> bool {
        self.node(kebun)
            .map(|n| n.blocks_by_afdeling.contains_key(afdeling))
            .unwrap_or(false)
    }

    pub fn divisions_for(&self, kebun: &str) -> &[String] {
        self.node(kebun).map(LocationNode::afdelings).unwrap_or(&[])
    }

    pub fn blocks_for(&self, kebun: &str, afdeling: &str) -> &[String] {
        self.node(kebun).map(|n| n.blocks(afdeling)).unwrap_or(&[])
    }

    pub fn planting_year_for(&self, kebun: &str, afdeling: &str, blok: &str) -> Option<&str> {
        self.node(kebun)?.planting_year(afdeling, blok)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
