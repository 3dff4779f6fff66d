//! Earthquake Early Warning (EEW) records.

use chrono::{DateTime, Utc};

use crate::earthquake::Earthquake;

/// Known provider codes and their display names.
const PROVIDER_DISPLAY: &[(&str, &str)] = &[("cwa", "中央氣象署")];

/// The agency that issued an alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    name: String,
}

impl Provider {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Provider code as reported (e.g. "cwa").
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable name; unknown providers display as their code.
    #[must_use]
    pub fn display_name(&self) -> &str {
        PROVIDER_DISPLAY
            .iter()
            .find(|(code, _)| *code == self.name)
            .map_or(self.name.as_str(), |(_, display)| *display)
    }
}

/// One published revision of an early warning.
///
/// Revisions of the same event share an `id` and carry increasing serials;
/// a `final` revision is the last one.
#[derive(Debug, Clone)]
pub struct Eew {
    id: String,
    serial: u32,
    is_final: bool,
    earthquake: Earthquake,
    provider: Provider,
    time: DateTime<Utc>,
}

impl Eew {
    #[must_use]
    pub fn new(
        id: String,
        serial: u32,
        is_final: bool,
        earthquake: Earthquake,
        provider: Provider,
        time: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            serial,
            is_final,
            earthquake,
            provider,
            time,
        }
    }

    /// Event identifier shared by all revisions.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Revision number.
    #[must_use]
    pub fn serial(&self) -> u32 {
        self.serial
    }

    /// Whether this is the final report.
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    #[must_use]
    pub fn earthquake(&self) -> &Earthquake {
        &self.earthquake
    }

    #[must_use]
    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    /// Publish time.
    #[must_use]
    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_display_name() {
        assert_eq!(Provider::new("cwa").display_name(), "中央氣象署");
        assert_eq!(Provider::new("trem").display_name(), "trem");
        assert_eq!(Provider::new("cwa").name(), "cwa");
    }
}
