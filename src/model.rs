//! Attenuation and travel-time model.
//!
//! Predicts, for every monitored region, the expected intensity and the P/S
//! wave arrival times of an earthquake.
//!
//! Intensity comes from an empirical PGA attenuation relation; once shaking
//! exceeds intensity 3 a PGV relation may raise it. Travel times come from a
//! half-space whose velocity grows linearly with depth.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::earthquake::Earthquake;
use crate::geo::{haversine_distance, hypocentral_distance};
use crate::intensity::Intensity;
use crate::region::Region;

/// Hypocentral distances are floored here so regions at the epicenter stay
/// finite.
pub const MIN_DISTANCE_KM: f64 = 1.0;

/// Site amplification used when a region has none of its own.
pub const DEFAULT_SITE_EFFECT: f64 = 1.751;

/// Above this PGA-derived value the PGV relation is also consulted.
const PGV_SWITCH_INTENSITY: f64 = 3.0;

/// Expected shaking and arrival times at one region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionExpectedIntensity {
    /// Region code
    pub code: u32,
    /// Discrete intensity
    pub intensity: Intensity,
    /// Continuous intensity value before discretization
    pub value: f64,
    /// Hypocentral distance in km (floored at `MIN_DISTANCE_KM`)
    pub distance: f64,
    /// Epicentral surface distance in km
    pub surface_distance: f64,
    /// P-wave arrival, seconds after origin
    pub p_arrival: f64,
    /// S-wave arrival, seconds after origin
    pub s_arrival: f64,
}

/// Result of one model run.
///
/// `distances`, `p_travel_times` and `s_travel_times` are aligned with the
/// region order the model was given.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelOutput {
    pub table: BTreeMap<u32, RegionExpectedIntensity>,
    pub distances: Vec<f64>,
    pub p_travel_times: Vec<f64>,
    pub s_travel_times: Vec<f64>,
}

/// Seismic velocity that increases linearly with depth: `v(z) = v0 + k*z`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityModel {
    /// Velocity at the surface (km/s)
    pub surface_velocity: f64,
    /// Velocity gradient (1/s)
    pub gradient: f64,
}

impl VelocityModel {
    /// Velocity at `depth_km`.
    #[must_use]
    pub fn velocity_at(&self, depth_km: f64) -> f64 {
        self.surface_velocity + self.gradient * depth_km
    }

    /// Travel time (s) of a ray from a source at `depth_km` to a surface
    /// point `distance_km` away in a straight line.
    ///
    /// Rays in a linear gradient follow circular arcs; this is the closed-form
    /// time along such an arc. Non-negative and strictly increasing in
    /// distance for positive velocities.
    #[must_use]
    pub fn travel_time(&self, distance_km: f64, depth_km: f64) -> f64 {
        let v0 = self.surface_velocity;
        let k = self.gradient;
        if k.abs() < f64::EPSILON {
            return distance_km / v0;
        }
        let vz = self.velocity_at(depth_km);
        let arg = 1.0 + k * k * distance_km * distance_km / (2.0 * v0 * vz);
        arg.acosh() / k
    }

    /// The same model scaled down by a velocity ratio (e.g. Vp/Vs).
    #[must_use]
    pub fn scaled(&self, ratio: f64) -> Self {
        Self {
            surface_velocity: self.surface_velocity / ratio,
            gradient: self.gradient / ratio,
        }
    }
}

/// P and S velocity models.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TravelTimeModel {
    pub p: VelocityModel,
    pub s: VelocityModel,
}

impl TravelTimeModel {
    /// Default crustal P velocity at the surface (km/s).
    pub const DEFAULT_VP: f64 = 5.8;
    /// Default velocity gradient (1/s).
    pub const DEFAULT_GRADIENT: f64 = 0.01;
    /// Default Vp/Vs ratio (Poisson solid).
    pub const DEFAULT_VP_VS_RATIO: f64 = 1.732_050_807_568_877_2;

    /// Build a model from a P velocity model and a Vp/Vs ratio.
    ///
    /// With a shared ratio, S travel time is exactly `ratio` times the P time.
    #[must_use]
    pub fn from_p(p: VelocityModel, vp_vs_ratio: f64) -> Self {
        Self {
            p,
            s: p.scaled(vp_vs_ratio),
        }
    }
}

impl Default for TravelTimeModel {
    fn default() -> Self {
        Self::from_p(
            VelocityModel {
                surface_velocity: Self::DEFAULT_VP,
                gradient: Self::DEFAULT_GRADIENT,
            },
            Self::DEFAULT_VP_VS_RATIO,
        )
    }
}

/// Tunable model parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttenuationModel {
    /// Floor for hypocentral distance (km)
    pub min_distance_km: f64,
    /// Site amplification for regions without their own
    pub default_site_effect: f64,
    /// Velocity models for arrival times
    pub travel_time: TravelTimeModel,
}

impl Default for AttenuationModel {
    fn default() -> Self {
        Self {
            min_distance_km: MIN_DISTANCE_KM,
            default_site_effect: DEFAULT_SITE_EFFECT,
            travel_time: TravelTimeModel::default(),
        }
    }
}

impl AttenuationModel {
    /// Continuous intensity at `distance_km` from a hypocenter.
    ///
    /// The acceleration relation is used up to intensity 3; above it the
    /// velocity relation may raise the value but never lower it. The site
    /// factor scales both relations.
    ///
    /// Inputs are not validated; implausible magnitudes or depths give
    /// implausible but finite values.
    #[must_use]
    pub fn intensity_value(
        &self,
        magnitude: f64,
        depth_km: f64,
        distance_km: f64,
        site_effect: f64,
    ) -> f64 {
        let pga = 1.657 * (1.533 * magnitude).exp() * distance_km.powf(-1.607) * site_effect;
        let pga_value = 2.0 * pga.log10() + 0.7;
        if pga_value <= PGV_SWITCH_INTENSITY {
            return pga_value;
        }

        // Near-field distances are measured from the fault edge, not the
        // hypocenter.
        let half_fault = 10_f64.powf(0.5 * magnitude - 1.85) / 2.0;
        let x = (distance_km - half_fault).max(3.0);
        let gpv600 = 10_f64.powf(
            0.58 * magnitude + 0.0038 * depth_km
                - 1.29
                - (x + 0.0028 * 10_f64.powf(0.5 * magnitude)).log10()
                - 0.002 * x,
        );
        // Site factors are relative to the default site, so a default site
        // leaves the velocity relation unchanged.
        let pgv = gpv600 * 1.31 * site_effect / self.default_site_effect;
        let pgv_value = 2.68 + 1.72 * pgv.log10();

        // Never drop below the acceleration value, so intensity stays
        // continuous across the switch and non-increasing with distance.
        pgv_value.max(pga_value)
    }

    /// Predict one region.
    #[must_use]
    pub fn predict_region(&self, earthquake: &Earthquake, region: &Region) -> RegionExpectedIntensity {
        let depth = f64::from(earthquake.depth());
        let surface_distance =
            haversine_distance(earthquake.lat(), earthquake.lon(), region.lat, region.lon);
        let distance = hypocentral_distance(surface_distance, depth).max(self.min_distance_km);

        let site_effect = region.site_effect.unwrap_or(self.default_site_effect);
        let value = self.intensity_value(earthquake.mag(), depth, distance, site_effect);

        RegionExpectedIntensity {
            code: region.code,
            intensity: Intensity::from_value(value),
            value,
            distance,
            surface_distance,
            p_arrival: self.travel_time.p.travel_time(distance, depth),
            s_arrival: self.travel_time.s.travel_time(distance, depth),
        }
    }

    /// Predict every region.
    ///
    /// An empty region list yields an empty output.
    #[instrument(skip_all, fields(mag = earthquake.mag(), depth = earthquake.depth(), regions = regions.len()))]
    pub fn compute(&self, earthquake: &Earthquake, regions: &[Region]) -> ModelOutput {
        let mut output = ModelOutput {
            table: BTreeMap::new(),
            distances: Vec::with_capacity(regions.len()),
            p_travel_times: Vec::with_capacity(regions.len()),
            s_travel_times: Vec::with_capacity(regions.len()),
        };

        for region in regions {
            let entry = self.predict_region(earthquake, region);
            output.distances.push(entry.distance);
            output.p_travel_times.push(entry.p_arrival);
            output.s_travel_times.push(entry.s_arrival);
            output.table.insert(entry.code, entry);
        }

        debug!("predicted {} regions", output.table.len());
        output
    }
}

/// Predict every region with the default model.
#[must_use]
pub fn compute_expected_intensity(earthquake: &Earthquake, regions: &[Region]) -> ModelOutput {
    AttenuationModel::default().compute(earthquake, regions)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::earthquake::EarthquakeLocation;

    /// One degree of latitude in km on the haversine sphere.
    const KM_PER_DEGREE: f64 = std::f64::consts::PI * crate::geo::EARTH_RADIUS_KM / 180.0;

    fn quake(mag: f64, depth: u32) -> Earthquake {
        Earthquake::new(
            EarthquakeLocation::new(121.0, 23.0, None),
            mag,
            depth,
            Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
            None,
        )
    }

    /// Region due north of the test epicenter at `km` surface distance.
    fn region_north(code: u32, km: f64) -> Region {
        Region {
            code,
            city: "Test City".into(),
            town: format!("town-{code}"),
            lat: 23.0 + km / KM_PER_DEGREE,
            lon: 121.0,
            site_effect: None,
        }
    }

    #[test]
    fn test_one_entry_per_region() {
        let regions: Vec<Region> = (0..20).map(|i| region_north(100 + i, f64::from(i) * 15.0)).collect();
        let output = compute_expected_intensity(&quake(5.5, 20), &regions);

        assert_eq!(output.table.len(), regions.len());
        assert_eq!(output.distances.len(), regions.len());
        assert_eq!(output.p_travel_times.len(), regions.len());
        assert_eq!(output.s_travel_times.len(), regions.len());
        for (i, region) in regions.iter().enumerate() {
            let entry = &output.table[&region.code];
            assert_eq!(entry.code, region.code);
            assert!((output.distances[i] - entry.distance).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_empty_regions() {
        let output = compute_expected_intensity(&quake(6.0, 10), &[]);
        assert!(output.table.is_empty());
        assert!(output.distances.is_empty());
    }

    #[test]
    fn test_scenario_three_regions() {
        let regions = [
            region_north(1, 5.0),
            region_north(2, 50.0),
            region_north(3, 200.0),
        ];
        let output = compute_expected_intensity(&quake(6.0, 10), &regions);
        let (a, b, c) = (&output.table[&1], &output.table[&2], &output.table[&3]);

        assert!(a.intensity >= b.intensity);
        assert!(b.intensity >= c.intensity);
        assert!(a.p_arrival < b.p_arrival);
        assert!(b.p_arrival < c.p_arrival);
        assert!(a.intensity > c.intensity);
    }

    #[test]
    fn test_distance_floor_at_epicenter() {
        let output = compute_expected_intensity(&quake(4.0, 0), &[region_north(1, 0.0)]);
        let entry = &output.table[&1];

        assert!((entry.distance - MIN_DISTANCE_KM).abs() < 1e-9);
        assert!(entry.value.is_finite());
        assert!(entry.p_arrival.is_finite() && entry.p_arrival > 0.0);
        assert!(entry.s_arrival.is_finite() && entry.s_arrival > entry.p_arrival);
    }

    #[test]
    fn test_distance_monotonic_and_floored() {
        let regions: Vec<Region> = (0..50).map(|i| region_north(i, f64::from(i) * 8.0)).collect();
        let output = compute_expected_intensity(&quake(6.5, 15), &regions);

        let mut previous = 0.0;
        for region in &regions {
            let entry = &output.table[&region.code];
            assert!(entry.distance >= MIN_DISTANCE_KM);
            assert!(entry.distance > previous);
            previous = entry.distance;
        }
    }

    #[test]
    fn test_travel_time_strictly_increasing() {
        let model = TravelTimeModel::default();
        for depth in [0.0, 10.0, 100.0, 600.0] {
            let mut previous_p = -1.0;
            let mut previous_s = -1.0;
            for step in 0..200 {
                let distance = f64::from(step) * 5.0 + 0.5;
                let p = model.p.travel_time(distance, depth);
                let s = model.s.travel_time(distance, depth);
                assert!(p >= 0.0);
                assert!(p > previous_p, "depth={depth} distance={distance}");
                assert!(s > previous_s);
                assert!(s >= p);
                previous_p = p;
                previous_s = s;
            }
        }
    }

    #[test]
    fn test_s_time_is_ratio_of_p_time() {
        let model = TravelTimeModel::default();
        let p = model.p.travel_time(120.0, 30.0);
        let s = model.s.travel_time(120.0, 30.0);
        assert!((s / p - TravelTimeModel::DEFAULT_VP_VS_RATIO).abs() < 1e-9);
    }

    #[test]
    fn test_zero_gradient_is_straight_ray() {
        let model = VelocityModel {
            surface_velocity: 6.0,
            gradient: 0.0,
        };
        assert!((model.travel_time(60.0, 10.0) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_gradient_approaches_straight_ray_near_source() {
        let model = TravelTimeModel::default().p;
        let t = model.travel_time(1.0, 0.0);
        assert!((t - 1.0 / TravelTimeModel::DEFAULT_VP).abs() < 1e-4);
    }

    #[test]
    fn test_intensity_decreases_with_distance() {
        let model = AttenuationModel::default();
        let near = model.intensity_value(6.0, 10.0, 20.0, DEFAULT_SITE_EFFECT);
        let far = model.intensity_value(6.0, 10.0, 150.0, DEFAULT_SITE_EFFECT);
        assert!(near > far);
    }

    #[test]
    fn test_intensity_increases_with_magnitude() {
        let model = AttenuationModel::default();
        let small = model.intensity_value(4.0, 10.0, 50.0, DEFAULT_SITE_EFFECT);
        let large = model.intensity_value(7.0, 10.0, 50.0, DEFAULT_SITE_EFFECT);
        assert!(large > small);
    }

    #[test]
    fn test_implausible_inputs_are_accepted() {
        let regions = [region_north(1, 30.0)];
        for (mag, depth) in [(-3.0, 0), (12.0, 0), (5.0, 5_000)] {
            let output = compute_expected_intensity(&quake(mag, depth), &regions);
            let entry = &output.table[&1];
            assert!(entry.value.is_finite());
            assert!(entry.p_arrival.is_finite());
        }
    }

    #[test]
    fn test_site_effect_amplifies() {
        let mut soft = region_north(1, 150.0);
        soft.site_effect = Some(3.0);
        let mut hard = region_north(2, 150.0);
        hard.site_effect = Some(0.5);

        let output = compute_expected_intensity(&quake(5.0, 10), &[soft, hard]);
        assert!(output.table[&1].value > output.table[&2].value);
    }

    #[test]
    fn test_site_effect_amplifies_near_field() {
        let model = AttenuationModel::default();
        let soft = model.intensity_value(7.0, 10.0, 20.0, 3.0);
        let default = model.intensity_value(7.0, 10.0, 20.0, DEFAULT_SITE_EFFECT);
        let hard = model.intensity_value(7.0, 10.0, 20.0, 0.5);
        assert!(default > PGV_SWITCH_INTENSITY);
        assert!(soft > default);
        assert!(default > hard);
    }

    #[test]
    fn test_intensity_never_increases_with_distance() {
        let model = AttenuationModel::default();
        for mag in [3.6, 5.0, 6.4, 7.2, 8.2] {
            for depth in [10.0, 30.0, 100.0] {
                let mut previous =
                    model.intensity_value(mag, depth, MIN_DISTANCE_KM, DEFAULT_SITE_EFFECT);
                let mut km = MIN_DISTANCE_KM;
                while km < 1_000.0 {
                    km += 0.25;
                    let value = model.intensity_value(mag, depth, km, DEFAULT_SITE_EFFECT);
                    assert!(
                        value <= previous + 1e-9,
                        "M{mag} depth {depth}: {value} at {km} km exceeds {previous}"
                    );
                    assert!(Intensity::from_value(value) <= Intensity::from_value(previous));
                    previous = value;
                }
            }
        }
    }

    #[test]
    fn test_nearer_region_not_weaker_across_switch() {
        let regions = [region_north(1, 358.5), region_north(2, 359.5)];
        let output = compute_expected_intensity(&quake(7.2, 10), &regions);
        let near = &output.table[&1];
        let far = &output.table[&2];
        assert!(near.distance < far.distance);
        assert!(near.intensity >= far.intensity);
        assert!(near.value >= far.value);
    }

    #[test]
    fn test_compute_is_idempotent() {
        let regions: Vec<Region> = (0..10).map(|i| region_north(i, f64::from(i) * 20.0)).collect();
        let eq = quake(5.8, 12);
        assert_eq!(
            compute_expected_intensity(&eq, &regions),
            compute_expected_intensity(&eq, &regions)
        );
    }
}
