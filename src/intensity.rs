//! Seismic intensity scale.
//!
//! Ten-level scale used by the Central Weather Administration (CWA):
//! `0, 1, 2, 3, 4, 5-, 5+, 6-, 6+, 7`, carried as codes `0..=9`.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::errors::EewError;

/// Discrete shaking intensity, ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Intensity {
    /// 0 - Not felt
    Zero,
    /// 1 - Micro
    One,
    /// 2 - Minor
    Two,
    /// 3 - Light
    Three,
    /// 4 - Moderate
    Four,
    /// 5- - Strong (weak side)
    FiveWeak,
    /// 5+ - Strong (strong side)
    FiveStrong,
    /// 6- - Very strong (weak side)
    SixWeak,
    /// 6+ - Very strong (strong side)
    SixStrong,
    /// 7 - Severe
    Seven,
}

/// Lower band edges for the continuous intensity value, ascending.
///
/// A value selects the highest band whose threshold it reaches
/// (`value >= threshold`); anything below the first edge is `Zero`.
pub const INTENSITY_BANDS: [(f64, Intensity); 9] = [
    (0.5, Intensity::One),
    (1.5, Intensity::Two),
    (2.5, Intensity::Three),
    (3.5, Intensity::Four),
    (4.5, Intensity::FiveWeak),
    (5.0, Intensity::FiveStrong),
    (5.5, Intensity::SixWeak),
    (6.0, Intensity::SixStrong),
    (6.5, Intensity::Seven),
];

impl Intensity {
    /// All levels in ascending order.
    pub const ALL: [Self; 10] = [
        Self::Zero,
        Self::One,
        Self::Two,
        Self::Three,
        Self::Four,
        Self::FiveWeak,
        Self::FiveStrong,
        Self::SixWeak,
        Self::SixStrong,
        Self::Seven,
    ];

    /// Discretize a continuous intensity value.
    ///
    /// NaN falls through every comparison and maps to `Zero`.
    #[must_use]
    pub fn from_value(value: f64) -> Self {
        INTENSITY_BANDS
            .iter()
            .rev()
            .find(|(threshold, _)| value >= *threshold)
            .map_or(Self::Zero, |(_, level)| *level)
    }

    /// Numeric code (0-9) used for ordering and wire representation.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Display label on the CWA scale.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Zero => "0",
            Self::One => "1",
            Self::Two => "2",
            Self::Three => "3",
            Self::Four => "4",
            Self::FiveWeak => "5-",
            Self::FiveStrong => "5+",
            Self::SixWeak => "6-",
            Self::SixStrong => "6+",
            Self::Seven => "7",
        }
    }
}

impl TryFrom<i64> for Intensity {
    type Error = EewError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        usize::try_from(code)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(EewError::InvalidIntensity(code))
    }
}

impl TryFrom<u8> for Intensity {
    type Error = EewError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::try_from(i64::from(code))
    }
}

impl std::str::FromStr for Intensity {
    type Err = EewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.label() == s)
            .ok_or_else(|| EewError::InvalidIntensityLabel(s.to_string()))
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Intensity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}
