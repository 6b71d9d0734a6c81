//! Cycle configuration and per-junction timing profiles.

use crate::Phase;

/// Deployment-wide phase durations in ticks.
///
/// The default is the 10-second cycle at 10 ticks/second split 60 % green,
/// 10 % yellow, 30 % red.  Deployments typically keep green > red > yellow.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CycleConfig {
    pub green: u16,
    pub yellow: u16,
    pub red: u16,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self { green: 60, yellow: 10, red: 30 }
    }
}

impl CycleConfig {
    /// Duration of one full cycle, in ticks — the post-pass swap window.
    #[inline]
    pub fn total(&self) -> u32 {
        self.green as u32 + self.yellow as u32 + self.red as u32
    }

    #[inline]
    pub fn duration(&self, phase: Phase) -> u16 {
        match phase {
            Phase::Red => self.red,
            Phase::Green => self.green,
            Phase::Yellow => self.yellow,
        }
    }
}

/// One junction's (possibly tier-scaled) phase durations.
///
/// Two profiles exist per junction: the selected approach — the one the
/// priority agent arrives on, which drives the actual cycle — and the
/// cross-street "others" profile, which only shapes reported values.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimingProfile {
    pub green: u16,
    pub yellow: u16,
    pub red: u16,
}

impl TimingProfile {
    #[inline]
    pub fn duration(&self, phase: Phase) -> u16 {
        match phase {
            Phase::Red => self.red,
            Phase::Green => self.green,
            Phase::Yellow => self.yellow,
        }
    }
}

impl From<CycleConfig> for TimingProfile {
    fn from(c: CycleConfig) -> Self {
        Self { green: c.green, yellow: c.yellow, red: c.red }
    }
}
