//! Signal phases and per-junction state.

/// The three signal phases.  The cycle order is fixed:
/// RED → GREEN → YELLOW → RED; no other transitions exist.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Red,
    Green,
    Yellow,
}

impl Phase {
    /// The next phase in the cycle.
    #[inline]
    pub fn next(self) -> Phase {
        match self {
            Phase::Red => Phase::Green,
            Phase::Green => Phase::Yellow,
            Phase::Yellow => Phase::Red,
        }
    }

    /// Wire code used by the 16-bit signal word (0 = RED, 1 = GREEN,
    /// 2 = YELLOW).
    #[inline]
    pub fn code(self) -> u8 {
        match self {
            Phase::Red => 0,
            Phase::Green => 1,
            Phase::Yellow => 2,
        }
    }

    /// Decode a wire code; the reserved value 3 maps to `None`.
    #[inline]
    pub fn from_code(code: u8) -> Option<Phase> {
        match code {
            0 => Some(Phase::Red),
            1 => Some(Phase::Green),
            2 => Some(Phase::Yellow),
            _ => None,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Phase::Red => "RED",
            Phase::Green => "GREEN",
            Phase::Yellow => "YELLOW",
        })
    }
}

/// One junction's signal state: the current phase and the remaining ticks
/// before the next transition.  The timer never goes below zero.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SignalState {
    pub phase: Phase,
    pub timer: u16,
}

impl SignalState {
    #[inline]
    pub fn new(phase: Phase, timer: u16) -> Self {
        Self { phase, timer }
    }
}
