//! Earthquake records and their cached intensity prediction.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::aggregate::city_max_intensity;
use crate::errors::EewError;
use crate::interp::TravelDistance;
use crate::intensity::Intensity;
use crate::model::{AttenuationModel, RegionExpectedIntensity};
use crate::region::{CityGroups, Region, RegionCatalog};

/// Epicenter of an earthquake.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarthquakeLocation {
    lon: f64,
    lat: f64,
    name: Option<String>,
}

impl EarthquakeLocation {
    #[must_use]
    pub fn new(lon: f64, lat: f64, name: Option<String>) -> Self {
        Self { lon, lat, name }
    }

    /// Longitude (degrees).
    #[must_use]
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Latitude (degrees).
    #[must_use]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Human-readable place name, if reported.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Everything derived from one model run, set as a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    expected_intensity: BTreeMap<u32, RegionExpectedIntensity>,
    city_max_intensity: BTreeMap<String, RegionExpectedIntensity>,
    travel_distance: TravelDistance,
}

impl Prediction {
    /// Region code -> expected intensity.
    #[must_use]
    pub fn expected_intensity(&self) -> &BTreeMap<u32, RegionExpectedIntensity> {
        &self.expected_intensity
    }

    /// City -> strongest region in that city.
    #[must_use]
    pub fn city_max_intensity(&self) -> &BTreeMap<String, RegionExpectedIntensity> {
        &self.city_max_intensity
    }

    /// P/S wavefront interpolants.
    #[must_use]
    pub fn travel_distance(&self) -> &TravelDistance {
        &self.travel_distance
    }
}

/// Whether an earthquake's prediction has been computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PredictionState<'a> {
    Unset,
    Computed(&'a Prediction),
}

/// A reported earthquake.
///
/// The reported fields never change. The prediction is computed at most once;
/// a revised report is a new `Earthquake`.
#[derive(Debug, Clone)]
pub struct Earthquake {
    location: EarthquakeLocation,
    magnitude: f64,
    depth: u32,
    time: DateTime<Utc>,
    max_intensity: Option<Intensity>,
    prediction: OnceLock<Prediction>,
}

impl Earthquake {
    #[must_use]
    pub fn new(
        location: EarthquakeLocation,
        magnitude: f64,
        depth: u32,
        time: DateTime<Utc>,
        max_intensity: Option<Intensity>,
    ) -> Self {
        Self {
            location,
            magnitude,
            depth,
            time,
            max_intensity,
            prediction: OnceLock::new(),
        }
    }

    /// Epicenter.
    #[must_use]
    pub fn location(&self) -> &EarthquakeLocation {
        &self.location
    }

    /// Longitude of the epicenter (degrees).
    #[must_use]
    pub fn lon(&self) -> f64 {
        self.location.lon
    }

    /// Latitude of the epicenter (degrees).
    #[must_use]
    pub fn lat(&self) -> f64 {
        self.location.lat
    }

    /// Magnitude.
    #[must_use]
    pub fn mag(&self) -> f64 {
        self.magnitude
    }

    /// Depth in kilometers.
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Origin time.
    #[must_use]
    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    /// Maximum intensity reported by the provider, if any.
    #[must_use]
    pub fn max_intensity(&self) -> Option<Intensity> {
        self.max_intensity
    }

    /// Current prediction state.
    #[must_use]
    pub fn prediction(&self) -> PredictionState<'_> {
        match self.prediction.get() {
            Some(prediction) => PredictionState::Computed(prediction),
            None => PredictionState::Unset,
        }
    }

    fn computed(&self) -> Result<&Prediction, EewError> {
        match self.prediction() {
            PredictionState::Computed(prediction) => Ok(prediction),
            PredictionState::Unset => Err(EewError::NotComputed),
        }
    }

    /// Expected intensity per region code.
    ///
    /// # Errors
    ///
    /// Returns `EewError::NotComputed` before `calc_expected_intensity`.
    pub fn expected_intensity(&self) -> Result<&BTreeMap<u32, RegionExpectedIntensity>, EewError> {
        self.computed().map(Prediction::expected_intensity)
    }

    /// Strongest expected intensity per city.
    ///
    /// # Errors
    ///
    /// Returns `EewError::NotComputed` before `calc_expected_intensity`.
    pub fn city_max_intensity(
        &self,
    ) -> Result<&BTreeMap<String, RegionExpectedIntensity>, EewError> {
        self.computed().map(Prediction::city_max_intensity)
    }

    /// P and S wavefront distances (km) `seconds` after origin time.
    ///
    /// # Errors
    ///
    /// Returns `EewError::NotComputed` before `calc_expected_intensity`.
    pub fn travel_distance(&self, seconds: f64) -> Result<(f64, f64), EewError> {
        self.computed()
            .map(|prediction| prediction.travel_distance.distance_at(seconds))
    }

    /// Compute the prediction over every region of `catalog` with the default
    /// model.
    ///
    /// # Errors
    ///
    /// See [`Earthquake::calc_expected_intensity_with`].
    pub fn calc_expected_intensity(
        &self,
        catalog: &RegionCatalog,
    ) -> Result<&BTreeMap<u32, RegionExpectedIntensity>, EewError> {
        self.calc_expected_intensity_with(
            &AttenuationModel::default(),
            catalog.regions(),
            catalog.city_groups(),
        )
    }

    /// Compute the prediction over an explicit region list.
    ///
    /// Only the first successful call stores a result; later calls return the
    /// cached table without recomputing.
    ///
    /// # Errors
    ///
    /// Returns `EewError::UnknownRegion` if `city_groups` names a region that
    /// is not in `regions`. Nothing is cached in that case.
    pub fn calc_expected_intensity_with(
        &self,
        model: &AttenuationModel,
        regions: &[Region],
        city_groups: &CityGroups,
    ) -> Result<&BTreeMap<u32, RegionExpectedIntensity>, EewError> {
        if let Some(prediction) = self.prediction.get() {
            debug!("using cached prediction");
            return Ok(&prediction.expected_intensity);
        }

        let output = model.compute(self, regions);
        let city_max_intensity = city_max_intensity(&output.table, city_groups)?;
        let travel_distance = TravelDistance::new(
            &output.distances,
            &output.p_travel_times,
            &output.s_travel_times,
        );

        // A concurrent caller may have won the race; its value is equal.
        let prediction = self.prediction.get_or_init(|| Prediction {
            expected_intensity: output.table,
            city_max_intensity,
            travel_distance,
        });
        Ok(&prediction.expected_intensity)
    }
}
