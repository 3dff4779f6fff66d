//! Monitored region catalog.
//!
//! Regions are static reference data. Grouping by city is computed once when
//! the catalog is built and is read-only afterwards.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::EewError;

/// Catalog shipped with the binary.
const BUNDLED_REGIONS: &str = include_str!("../data/regions.json");

/// City name -> region codes in catalog order.
pub type CityGroups = BTreeMap<String, Vec<u32>>;

/// A monitored region (township level).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Region {
    /// Stable region code (unique key)
    pub code: u32,

    /// City or county the region belongs to
    pub city: String,

    /// Township name
    pub town: String,

    /// Latitude (degrees)
    pub lat: f64,

    /// Longitude (degrees)
    pub lon: f64,

    /// Site amplification factor; the model default applies when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_effect: Option<f64>,
}

/// The set of monitored regions, grouped by city.
#[derive(Debug, Clone)]
pub struct RegionCatalog {
    regions: Vec<Region>,
    city_groups: CityGroups,
}

impl RegionCatalog {
    /// Build a catalog from a list of regions.
    ///
    /// # Errors
    ///
    /// Returns an error if two regions share a code.
    pub fn from_regions(regions: Vec<Region>) -> Result<Self, EewError> {
        let mut codes = HashSet::with_capacity(regions.len());
        let mut city_groups = CityGroups::new();

        for region in &regions {
            if !codes.insert(region.code) {
                return Err(EewError::Catalog(format!(
                    "duplicate region code {}",
                    region.code
                )));
            }
            city_groups
                .entry(region.city.clone())
                .or_default()
                .push(region.code);
        }

        debug!(
            "loaded {} regions in {} cities",
            regions.len(),
            city_groups.len()
        );

        Ok(Self {
            regions,
            city_groups,
        })
    }

    /// Parse a catalog from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, empty, or has duplicate codes.
    pub fn from_json(json: &str) -> Result<Self, EewError> {
        let regions: Vec<Region> = serde_json::from_str(json)?;
        if regions.is_empty() {
            return Err(EewError::Catalog("catalog contains no regions".into()));
        }
        Self::from_regions(regions)
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid catalog.
    pub fn from_file(path: &Path) -> Result<Self, EewError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// The catalog bundled with the binary.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled data is corrupt.
    pub fn bundled() -> Result<Self, EewError> {
        Self::from_json(BUNDLED_REGIONS)
    }

    /// All regions in catalog order.
    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// City -> region codes.
    #[must_use]
    pub fn city_groups(&self) -> &CityGroups {
        &self.city_groups
    }

    /// Look up a region by code.
    #[must_use]
    pub fn get(&self, code: u32) -> Option<&Region> {
        self.regions.iter().find(|r| r.code == code)
    }

    /// Get the number of regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Check if the catalog has no regions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(code: u32, city: &str) -> Region {
        Region {
            code,
            city: city.to_string(),
            town: format!("town-{code}"),
            lat: 24.0,
            lon: 121.0,
            site_effect: None,
        }
    }

    #[test]
    fn test_bundled_catalog() {
        let catalog = RegionCatalog::bundled().expect("bundled catalog");
        assert!(!catalog.is_empty());
        assert!(catalog.city_groups().contains_key("Taipei City"));

        let grouped: usize = catalog.city_groups().values().map(Vec::len).sum();
        assert_eq!(grouped, catalog.len());
    }

    #[test]
    fn test_groups_keep_catalog_order() {
        let catalog = RegionCatalog::from_regions(vec![
            region(3, "A"),
            region(1, "B"),
            region(2, "A"),
        ])
        .unwrap();

        assert_eq!(catalog.city_groups()["A"], vec![3, 2]);
        assert_eq!(catalog.city_groups()["B"], vec![1]);
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let result = RegionCatalog::from_regions(vec![region(1, "A"), region(1, "B")]);
        assert!(matches!(result, Err(EewError::Catalog(_))));
    }

    #[test]
    fn test_empty_json_rejected() {
        assert!(matches!(
            RegionCatalog::from_json("[]"),
            Err(EewError::Catalog(_))
        ));
    }

    #[test]
    fn test_site_effect_is_optional() {
        let json = r#"[
            {"code": 1, "city": "A", "town": "a", "lat": 24.0, "lon": 121.0},
            {"code": 2, "city": "A", "town": "b", "lat": 24.1, "lon": 121.1, "site_effect": 1.2}
        ]"#;
        let catalog = RegionCatalog::from_json(json).unwrap();
        assert_eq!(catalog.get(1).unwrap().site_effect, None);
        assert_eq!(catalog.get(2).unwrap().site_effect, Some(1.2));
    }
}
