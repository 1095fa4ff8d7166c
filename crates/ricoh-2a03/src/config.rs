//! Chip configuration.

use ricoh_apu_2a03::{ApuConfig, Region};

/// 2A03 construction parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CoreConfig {
    pub apu: ApuConfig,
    /// Run the reset sequence from the vector at $FFFC on the first ticks.
    /// When false the CPU starts fetching at whatever PC the host sets.
    pub power_on_reset: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            apu: ApuConfig::default(),
            power_on_reset: true,
        }
    }
}

impl CoreConfig {
    #[must_use]
    pub fn new(region: Region) -> Self {
        Self {
            apu: ApuConfig::new(region),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn region(&self) -> Region {
        self.apu.region
    }
}
