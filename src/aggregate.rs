//! Per-city worst-case intensity.

use std::collections::BTreeMap;

use crate::errors::EewError;
use crate::model::RegionExpectedIntensity;
use crate::region::CityGroups;

/// Reduce a per-region table to the strongest region in each city.
///
/// Regions are compared by `Intensity` alone. When several regions share the
/// maximum, the one listed first in the city group (catalog order) wins.
///
/// # Errors
///
/// Returns `EewError::UnknownRegion` if a city lists a code that is not in
/// `table`.
pub fn city_max_intensity(
    table: &BTreeMap<u32, RegionExpectedIntensity>,
    city_groups: &CityGroups,
) -> Result<BTreeMap<String, RegionExpectedIntensity>, EewError> {
    let mut result = BTreeMap::new();

    for (city, codes) in city_groups {
        let mut best: Option<&RegionExpectedIntensity> = None;
        for code in codes {
            let entry = table.get(code).ok_or_else(|| EewError::UnknownRegion {
                city: city.clone(),
                code: *code,
            })?;
            // Strict comparison keeps the earliest of tied regions.
            if best.is_none_or(|b| entry.intensity > b.intensity) {
                best = Some(entry);
            }
        }
        if let Some(best) = best {
            result.insert(city.clone(), best.clone());
        }
    }

    Ok(result)
}
