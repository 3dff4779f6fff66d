//! seismocast - earthquake early-warning intensity prediction.
//!
//! Given a reported earthquake and a catalog of monitored regions, predicts
//! the expected intensity and P/S wave arrival times at each region, the
//! strongest region per city, and how far the wavefronts have travelled at
//! any moment after origin time.

pub mod aggregate;
pub mod cli;
pub mod earthquake;
pub mod eew;
pub mod errors;
pub mod filters;
pub mod geo;
pub mod intensity;
pub mod interp;
pub mod model;
pub mod models;
pub mod output;
pub mod region;
pub mod revisions;

pub use earthquake::{Earthquake, EarthquakeLocation, Prediction, PredictionState};
pub use eew::{Eew, Provider};
pub use errors::EewError;
pub use intensity::Intensity;
pub use model::{AttenuationModel, RegionExpectedIntensity};
pub use region::{Region, RegionCatalog};
