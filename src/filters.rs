//! Prediction filtering logic.
//!
//! Narrows the rows printed for a prediction; it never changes what is
//! computed.

use crate::intensity::Intensity;
use crate::model::RegionExpectedIntensity;

/// Combined filter criteria.
#[derive(Debug, Default, Clone)]
pub struct PredictionFilter {
    pub min_intensity: Option<Intensity>,
    /// Cities to keep (case-insensitive); empty keeps all
    pub cities: Vec<String>,
    /// Maximum epicentral distance (km)
    pub radius_km: Option<f64>,
}

impl PredictionFilter {
    /// Check if a region row passes all filter criteria.
    #[must_use]
    pub fn matches(&self, city: &str, entry: &RegionExpectedIntensity) -> bool {
        self.check_intensity(entry) && self.check_city(city) && self.check_radius(entry)
    }

    fn check_intensity(&self, entry: &RegionExpectedIntensity) -> bool {
        self.min_intensity
            .is_none_or(|min| entry.intensity >= min)
    }

    fn check_city(&self, city: &str) -> bool {
        self.cities.is_empty() || self.cities.iter().any(|c| c.eq_ignore_ascii_case(city))
    }

    fn check_radius(&self, entry: &RegionExpectedIntensity) -> bool {
        self.radius_km
            .is_none_or(|radius| entry.surface_distance <= radius)
    }
}
