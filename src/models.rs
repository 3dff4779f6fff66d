//! Wire models for EEW payloads and normalized output records.
//!
//! Input structures mirror the provider JSON field for field; conversion into
//! the domain types happens through `TryFrom`.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::earthquake::{Earthquake, EarthquakeLocation};
use crate::eew::{Eew, Provider};
use crate::errors::EewError;
use crate::intensity::Intensity;
use crate::model::RegionExpectedIntensity;
use crate::region::Region;

/// Earthquake parameters as published.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEarthquake {
    /// Epicenter longitude (degrees)
    pub lon: f64,

    /// Epicenter latitude (degrees)
    pub lat: f64,

    /// Place description
    pub loc: Option<String>,

    /// Magnitude
    pub mag: f64,

    /// Depth (km)
    pub depth: u32,

    /// Origin time (ms since epoch)
    pub time: i64,

    /// Reported maximum intensity code; `0` means not reported
    pub max: Option<i64>,
}

impl RawEarthquake {
    /// Validate coordinates.
    ///
    /// Magnitude and depth are not range-checked.
    ///
    /// # Errors
    ///
    /// Returns `EewError::InvalidEvent` if latitude or longitude is out of
    /// range.
    pub fn validate(&self) -> Result<(), EewError> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(EewError::InvalidEvent(format!(
                "latitude {} out of range [-90, 90]",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(EewError::InvalidEvent(format!(
                "longitude {} out of range [-180, 180]",
                self.lon
            )));
        }
        Ok(())
    }
}

impl TryFrom<RawEarthquake> for Earthquake {
    type Error = EewError;

    fn try_from(raw: RawEarthquake) -> Result<Self, Self::Error> {
        raw.validate()?;

        let max_intensity = match raw.max {
            None | Some(0) => None,
            Some(code) => Some(Intensity::try_from(code)?),
        };

        Ok(Earthquake::new(
            EarthquakeLocation::new(raw.lon, raw.lat, raw.loc),
            raw.mag,
            raw.depth,
            millis_to_datetime(raw.time)?,
            max_intensity,
        ))
    }
}

/// Final-report flag; providers send either a boolean or 0/1.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum FinalFlag {
    Bool(bool),
    Int(i64),
}

impl FinalFlag {
    #[must_use]
    pub fn is_set(self) -> bool {
        match self {
            Self::Bool(b) => b,
            Self::Int(i) => i != 0,
        }
    }
}

/// An early warning as published.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEew {
    /// Alert identifier
    pub id: String,

    /// Revision number
    pub serial: u32,

    /// Final report flag
    #[serde(rename = "final")]
    pub final_flag: FinalFlag,

    /// Earthquake parameters
    pub eq: RawEarthquake,

    /// Provider code
    pub author: String,

    /// Publish time (ms since epoch)
    pub time: i64,
}

impl RawEew {
    /// Validate the alert structure.
    ///
    /// # Errors
    ///
    /// Returns `EewError::InvalidEvent` if the id is empty or the earthquake
    /// coordinates are out of range.
    pub fn validate(&self) -> Result<(), EewError> {
        if self.id.is_empty() {
            return Err(EewError::InvalidEvent("empty alert ID".into()));
        }
        self.eq.validate()
    }
}

impl TryFrom<RawEew> for Eew {
    type Error = EewError;

    fn try_from(raw: RawEew) -> Result<Self, Self::Error> {
        raw.validate()?;
        let time = millis_to_datetime(raw.time)?;
        Ok(Eew::new(
            raw.id,
            raw.serial,
            raw.final_flag.is_set(),
            Earthquake::try_from(raw.eq)?,
            Provider::new(raw.author),
            time,
        ))
    }
}

/// Either a full alert or a bare earthquake.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InputRecord {
    Eew(RawEew),
    Earthquake(RawEarthquake),
}

impl InputRecord {
    /// Parse one JSON document.
    ///
    /// # Errors
    ///
    /// Returns `EewError::Parse` if the JSON is malformed or matches neither
    /// an alert nor an earthquake.
    pub fn from_json(json: &str) -> Result<Self, EewError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Convert to the domain earthquake, discarding alert metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, the reported intensity code is
    /// unknown, or a timestamp is out of range.
    pub fn into_earthquake(self) -> Result<Earthquake, EewError> {
        match self {
            Self::Eew(raw) => Ok(Eew::try_from(raw)?.earthquake().clone()),
            Self::Earthquake(raw) => Earthquake::try_from(raw),
        }
    }
}

fn millis_to_datetime(ms: i64) -> Result<DateTime<Utc>, EewError> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| EewError::InvalidEvent(format!("invalid timestamp {ms}")))
}

fn offset_time(origin: DateTime<Utc>, seconds: f64) -> String {
    // Sub-millisecond precision is noise for arrival estimates.
    #[allow(clippy::cast_possible_truncation)]
    let millis = (seconds * 1000.0).round() as i64;
    Duration::try_milliseconds(millis)
        .and_then(|offset| origin.checked_add_signed(offset))
        .map_or_else(|| "unknown".into(), |t| t.to_rfc3339())
}

/// Normalized per-region prediction for output.
#[derive(Debug, Clone, Serialize)]
pub struct OutputRegion {
    pub code: u32,
    pub city: String,
    pub town: Option<String>,
    pub intensity: Intensity,
    pub intensity_value: f64,
    pub distance_km: f64,
    pub surface_distance_km: f64,
    pub p_arrival_s: f64,
    pub s_arrival_s: f64,
    pub p_arrival_time: String,
    pub s_arrival_time: String,
}

impl OutputRegion {
    /// Build an output row; `region` supplies the town name when known.
    #[must_use]
    pub fn new(
        city: &str,
        entry: &RegionExpectedIntensity,
        region: Option<&Region>,
        origin: DateTime<Utc>,
    ) -> Self {
        Self {
            code: entry.code,
            city: city.to_string(),
            town: region.map(|r| r.town.clone()),
            intensity: entry.intensity,
            intensity_value: entry.value,
            distance_km: entry.distance,
            surface_distance_km: entry.surface_distance,
            p_arrival_s: entry.p_arrival,
            s_arrival_s: entry.s_arrival,
            p_arrival_time: offset_time(origin, entry.p_arrival),
            s_arrival_time: offset_time(origin, entry.s_arrival),
        }
    }
}

/// Wavefront position at one instant.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct OutputWavefront {
    pub seconds: f64,
    pub p_km: f64,
    pub s_km: f64,
}

/// Normalized earthquake summary for output.
#[derive(Debug, Clone, Serialize)]
pub struct OutputEarthquake {
    pub time: String,
    pub longitude: f64,
    pub latitude: f64,
    pub place: Option<String>,
    pub magnitude: f64,
    pub depth_km: u32,
    pub reported_max_intensity: Option<Intensity>,
}

impl From<&Earthquake> for OutputEarthquake {
    fn from(eq: &Earthquake) -> Self {
        Self {
            time: eq.time().to_rfc3339(),
            longitude: eq.lon(),
            latitude: eq.lat(),
            place: eq.location().name().map(str::to_string),
            magnitude: eq.mag(),
            depth_km: eq.depth(),
            reported_max_intensity: eq.max_intensity(),
        }
    }
}

/// Alert revision summary for output.
#[derive(Debug, Clone, Serialize)]
pub struct OutputAlert {
    pub id: String,
    pub serial: u32,
    #[serde(rename = "final")]
    pub is_final: bool,
    pub provider: String,
    pub provider_name: String,
    pub published: String,
    /// Whether this revises an alert already emitted
    pub update: bool,
}

impl OutputAlert {
    #[must_use]
    pub fn new(eew: &Eew, update: bool) -> Self {
        Self {
            id: eew.id().to_string(),
            serial: eew.serial(),
            is_final: eew.is_final(),
            provider: eew.provider().name().to_string(),
            provider_name: eew.provider().display_name().to_string(),
            published: eew.time().to_rfc3339(),
            update,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sample_alert() {
        let json = include_str!("../tools/sample_eew.json");
        let record = InputRecord::from_json(json).expect("failed to parse sample alert");

        let InputRecord::Eew(raw) = record else {
            panic!("sample should parse as an alert");
        };
        let eew = Eew::try_from(raw).expect("invalid alert");

        assert_eq!(eew.id(), "1130123");
        assert_eq!(eew.serial(), 3);
        assert!(!eew.is_final());
        assert_eq!(eew.provider().name(), "cwa");
        assert_eq!(eew.earthquake().depth(), 15);
        assert_eq!(eew.earthquake().max_intensity(), Some(Intensity::FiveWeak));
        assert_eq!(eew.earthquake().location().name(), Some("Hualien County Offshore"));
    }

    #[test]
    fn test_parse_bare_earthquake() {
        let json = r#"{"lon": 120.5, "lat": 23.1, "mag": 4.2, "depth": 8, "time": 1700000000000}"#;
        let eq = InputRecord::from_json(json).unwrap().into_earthquake().unwrap();

        assert_eq!(eq.depth(), 8);
        assert_eq!(eq.max_intensity(), None);
        assert_eq!(eq.location().name(), None);
        assert_eq!(eq.time().timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_zero_max_means_not_reported() {
        let json = r#"{"lon": 120.5, "lat": 23.1, "mag": 4.2, "depth": 8, "time": 0, "max": 0}"#;
        let eq = InputRecord::from_json(json).unwrap().into_earthquake().unwrap();
        assert_eq!(eq.max_intensity(), None);
    }

    #[test]
    fn test_invalid_max_intensity_rejected() {
        let json = r#"{"lon": 120.5, "lat": 23.1, "mag": 4.2, "depth": 8, "time": 0, "max": 12}"#;
        let err = InputRecord::from_json(json).unwrap().into_earthquake().unwrap_err();
        assert!(matches!(err, EewError::InvalidIntensity(12)));
    }

    #[test]
    fn test_final_flag_forms() {
        for (flag, expected) in [("true", true), ("false", false), ("1", true), ("0", false)] {
            let json = format!(
                r#"{{"id": "x", "serial": 1, "final": {flag}, "author": "cwa", "time": 0,
                    "eq": {{"lon": 121.0, "lat": 23.0, "mag": 5.0, "depth": 10, "time": 0}}}}"#
            );
            let InputRecord::Eew(raw) = InputRecord::from_json(&json).unwrap() else {
                panic!("expected an alert");
            };
            assert_eq!(raw.final_flag.is_set(), expected, "flag {flag}");
        }
    }

    #[test]
    fn test_out_of_range_coordinates_rejected() {
        let json = r#"{"lon": 200.0, "lat": 23.1, "mag": 4.2, "depth": 8, "time": 0}"#;
        let err = InputRecord::from_json(json).unwrap().into_earthquake().unwrap_err();
        assert!(matches!(err, EewError::InvalidEvent(_)));
    }

    #[test]
    fn test_implausible_magnitude_accepted() {
        let json = r#"{"lon": 121.0, "lat": 23.0, "mag": 11.5, "depth": 900, "time": 0}"#;
        let eq = InputRecord::from_json(json).unwrap().into_earthquake().unwrap();
        assert!((eq.mag() - 11.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_offset_time() {
        let origin = Utc.timestamp_millis_opt(0).unwrap();
        assert_eq!(offset_time(origin, 1.5), "1970-01-01T00:00:01.500+00:00");
        assert_eq!(offset_time(origin, 1.0e30), "unknown");
    }
}
