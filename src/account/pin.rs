//! Two-step PIN setup: enter, then confirm.

use super::types::Pin;
use crate::error::LedgerError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PinSetup {
    #[default]
    Enter,
    Confirm { first: Pin },
}

/// Outcome of a successful `PinSetup::submit`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinStep {
    /// First entry captured; ask for it again.
    ConfirmRequired,
    /// Both entries matched; the PIN is ready to persist.
    Confirmed(Pin),
}

impl PinSetup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_confirming(&self) -> bool {
        matches!(self, PinSetup::Confirm { .. })
    }

    /// Feed one 4-digit entry into the state machine.
    ///
    /// A malformed entry is rejected without changing state. A confirm entry
    /// that differs from the first one fails with `PinMismatch` and drops
    /// back to `Enter` with nothing captured. There is no retry limit.
    pub fn submit(&mut self, value: &str) -> Result<PinStep, LedgerError> {
        let entry = Pin::parse(value)?;
        match std::mem::take(self) {
            PinSetup::Enter => {
                *self = PinSetup::Confirm { first: entry };
                Ok(PinStep::ConfirmRequired)
            }
            PinSetup::Confirm { first } if first == entry => Ok(PinStep::Confirmed(entry)),
            PinSetup::Confirm { .. } => Err(LedgerError::PinMismatch),
        }
    }

    /// Abandon a captured first entry.
    pub fn reset(&mut self) {
        *self = PinSetup::Enter;
    }
}
