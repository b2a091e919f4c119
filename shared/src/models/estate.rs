//! Estate reference data models

use serde::{Deserialize, Serialize};

/// One estate's divisions and blocks as stored in the reference files
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EstateRecord {
    pub kebun: String,
    pub afdelings: Vec<AfdelingRecord>,
}

/// A division (afdeling) and its blocks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AfdelingRecord {
    pub afdeling: String,
    pub blocks: Vec<BlockRecord>,
}

/// A block and its planting year
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlockRecord {
    pub blok: String,
    #[serde(default)]
    pub tahuntanam: Option<String>,
}

/// Catalog entry for an estate
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct KebunInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub regional: &'static str,
}

/// Owned catalog entry, returned for codes outside the catalog too
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KebunDetail {
    pub id: String,
    pub name: String,
    pub regional: String,
}

impl From<&KebunInfo> for KebunDetail {
    fn from(info: &KebunInfo) -> Self {
        Self {
            id: info.id.to_string(),
            name: info.name.to_string(),
            regional: info.regional.to_string(),
        }
    }
}

macro_rules! kebun {
    ($id:literal, $name:literal, $regional:literal) => {
        KebunInfo {
            id: $id,
            name: $name,
            regional: $regional,
        }
    };
}

/// Estates taking part in the program
pub const KEBUN_CATALOG: &[KebunInfo] = &[
    kebun!("1KSD", "KEBUN SEI DAUN", "1R1"),
    kebun!("1KTO", "KEBUN TORGAMBA", "1R1"),
    kebun!("1KSB", "KEBUN SEI BARUHUR", "1R1"),
    kebun!("1KSK", "KEBUN SEI KEBARA", "1R1"),
    kebun!("1KAT", "KEBUN AEK TOROP", "1R1"),
    kebun!("1KAR", "KEBUN AEK RASO", "1R1"),
    kebun!("1KSU", "KEBUN SISUMUT", "1R1"),
    kebun!("1KAN", "KEBUN AEK NABARA UTARA", "1R1"),
    kebun!("1KAS", "KEBUN AEK NABARA SELATAN", "1R1"),
    kebun!("1KRP", "KEBUN RANTAU PRAPAT", "1R1"),
    kebun!("1KMM", "KEBUN MEMBANG MUDA", "1R1"),
    kebun!("1KLJ", "KEBUN LABUHAN HAJI", "1R1"),
    kebun!("1KMS", "KEBUN MERBAU SELATAN", "1R1"),
    kebun!("1KDP", "KEBUN SEI DADAP", "1R1"),
    kebun!("1KPM", "KEBUN PULAU MANDI", "1R1"),
    kebun!("1KAM", "KEBUN AMBALUTU", "1R1"),
    kebun!("1KSL", "KEBUN SEI SILAU", "1R1"),
    kebun!("1KHP", "KEBUN HUTA PADANG", "1R1"),
    kebun!("1KBS", "KEBUN BANDAR SELAMAT", "1R1"),
    kebun!("1KDH", "KEBUN DUSUN HULU", "1R1"),
    kebun!("1KBB", "KEBUN BANDAR BETSY", "1R1"),
    kebun!("1KBN", "KEBUN BANGUN", "1R1"),
    kebun!("1KGP", "KEBUN GUNUNG PAMELA", "1R1"),
    kebun!("1KGM", "KEBUN GUNUNG MONAKO", "1R1"),
    kebun!("1KSA", "KEBUN SILAU DUNIA", "1R1"),
    kebun!("1KGR", "KEBUN GUNUNG PARA", "1R1"),
    kebun!("1KSP", "KEBUN SEI PUTIH", "1R1"),
    kebun!("1KSG", "KEBUN SARANG GITING", "1R1"),
    kebun!("1KTR", "KEBUN TANAH RAJA", "1R1"),
    kebun!("1KRB", "KEBUN RAMBUTAN", "1R1"),
    kebun!("1KHG", "KEBUN HAPESONG", "1R1"),
    kebun!("1KBU", "KEBUN BATANG TORU", "1R1"),
    kebun!("1KSM", "KEBUN SEI MERANTI", "1R1 KSO 1DMT"),
    kebun!("1KBT", "KEBUN BUKIT TUJUH", "1R1 KSO 1DMT"),
    kebun!("1KKI", "KEBUN KARANG INONG", "1R1 KSO 1DAT"),
    kebun!("1KJA", "KEBUN JOLOK RAYEUK SELATAN", "1R1 KSO 1DAT"),
    kebun!("1KCB", "KEBUN CISALAK BARU", "1R1 KSO 1DJB"),
    kebun!("1KBO", "KEBUN BOJONG DATAR", "1R1 KSO 1DJB"),
    kebun!("1KPA", "KEBUN PANGLEJAR", "1R1 KSO 1DJB"),
    kebun!("1KKE", "KEBUN KERTAJAYA", "1R1 KSO 1DJB"),
    kebun!("1KTB", "KEBUN CIBUNGUNG", "1R1 KSO 1DJB"),
    kebun!("1KCI", "KEBUN CIKASUNGKA", "1R1 KSO 1DJB"),
    kebun!("1KKA", "KEBUN SUKA MAJU", "1R1 KSO 1DJB"),
];

/// Look up an estate, falling back to an `Unknown` entry for foreign codes
pub fn kebun_detail(kebun_id: &str) -> KebunDetail {
    KEBUN_CATALOG
        .iter()
        .find(|k| k.id == kebun_id)
        .map(KebunDetail::from)
        .unwrap_or_else(|| KebunDetail {
            id: kebun_id.to_string(),
            name: "Unknown".to_string(),
            regional: "Unknown".to_string(),
        })
}

/// Whether a code belongs to the catalog
pub fn is_known_kebun(kebun_id: &str) -> bool {
    KEBUN_CATALOG.iter().any(|k| k.id == kebun_id)
}

/// Per-house asset row used by the dashboard and overview map
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EstateAsset {
    pub kode: String,
    pub nama_kebun: String,
    pub singkatan_distrik: String,
    #[serde(default)]
    pub distrik: String,
    /// House (rumah) identifier within the estate
    #[serde(default)]
    pub rumah: serde_json::Value,
    #[serde(default)]
    pub luas_ha: f64,
    #[serde(default)]
    pub inventaris: i64,
    /// `[lat, lng]`; anything other than two numbers is ignored
    #[serde(default)]
    pub coords: serde_json::Value,
}

impl EstateAsset {
    /// Coordinates when they are exactly two numbers
    pub fn coordinates(&self) -> Option<[f64; 2]> {
        match self.coords.as_array().map(Vec::as_slice) {
            Some([lat, lng]) => Some([lat.as_f64()?, lng.as_f64()?]),
            _ => None,
        }
    }
}
