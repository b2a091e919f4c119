//! Estate asset aggregates for the dashboard and the overview map

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::EstateAsset;

/// Tree inventory goal for the program
pub const DEFAULT_INVENTORY_TARGET: i64 = 2_000_000;

/// Per-district totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictStats {
    pub distrik: String,
    pub total_luas: f64,
    pub total_inventaris: i64,
    pub total_rumah: usize,
    pub avg_luas_per_rumah: f64,
    pub avg_inventaris_per_rumah: f64,
}

/// Totals per district abbreviation, largest area first
pub fn district_stats(assets: &[EstateAsset]) -> Vec<DistrictStats> {
    let mut by_district: BTreeMap<&str, DistrictStats> = BTreeMap::new();

    for asset in assets {
        let stats = by_district
            .entry(asset.singkatan_distrik.as_str())
            .or_insert_with(|| DistrictStats {
                distrik: asset.singkatan_distrik.clone(),
                total_luas: 0.0,
                total_inventaris: 0,
                total_rumah: 0,
                avg_luas_per_rumah: 0.0,
                avg_inventaris_per_rumah: 0.0,
            });
        stats.total_luas += asset.luas_ha;
        stats.total_inventaris += asset.inventaris;
        stats.total_rumah += 1;
    }

    let mut stats: Vec<_> = by_district
        .into_values()
        .map(|mut s| {
            let houses = s.total_rumah as f64;
            s.avg_luas_per_rumah = s.total_luas / houses;
            s.avg_inventaris_per_rumah = s.total_inventaris as f64 / houses;
            s
        })
        .collect();
    stats.sort_by(|a, b| b.total_luas.total_cmp(&a.total_luas));
    stats
}

fn top_by<F>(assets: &[EstateAsset], n: usize, cmp: F) -> Vec<EstateAsset>
where
    F: Fn(&EstateAsset, &EstateAsset) -> Ordering,
{
    let mut sorted = assets.to_vec();
    sorted.sort_by(cmp);
    sorted.truncate(n);
    sorted
}

pub fn top_estates_by_area(assets: &[EstateAsset], n: usize) -> Vec<EstateAsset> {
    top_by(assets, n, |a, b| b.luas_ha.total_cmp(&a.luas_ha))
}

pub fn top_estates_by_inventory(assets: &[EstateAsset], n: usize) -> Vec<EstateAsset> {
    top_by(assets, n, |a, b| b.inventaris.cmp(&a.inventaris))
}

/// Inventory as a percentage of `target`, capped at 100
pub fn inventory_progress(assets: &[EstateAsset], target: i64) -> f64 {
    if target <= 0 {
        return 100.0;
    }
    let total: i64 = assets.iter().map(|a| a.inventaris).sum();
    (total as f64 / target as f64 * 100.0).min(100.0)
}

/// A house marker on the overview map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct House {
    pub id: serde_json::Value,
    pub coords: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstateHouses {
    pub label: String,
    pub luas_ha: f64,
    pub inventaris: i64,
    pub rumahs: Vec<House>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictHouses {
    pub label: String,
    pub kebuns: BTreeMap<String, EstateHouses>,
}

impl DistrictHouses {
    pub fn house_count(&self) -> usize {
        self.kebuns.values().map(|k| k.rumahs.len()).sum()
    }
}

/// district → estate → houses. Estates are listed even when none of their
/// houses has usable coordinates.
pub fn group_houses(assets: &[EstateAsset]) -> BTreeMap<String, DistrictHouses> {
    let mut grouped: BTreeMap<String, DistrictHouses> = BTreeMap::new();

    for asset in assets {
        let district = grouped
            .entry(asset.singkatan_distrik.clone())
            .or_insert_with(|| DistrictHouses {
                label: asset.distrik.clone(),
                kebuns: BTreeMap::new(),
            });
        let estate = district
            .kebuns
            .entry(asset.kode.clone())
            .or_insert_with(|| EstateHouses {
                label: asset.nama_kebun.clone(),
                luas_ha: asset.luas_ha,
                inventaris: asset.inventaris,
                rumahs: Vec::new(),
            });
        if let Some(coords) = asset.coordinates() {
            estate.rumahs.push(House {
                id: asset.rumah.clone(),
                coords,
            });
        }
    }

    grouped
}
