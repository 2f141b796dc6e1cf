//! Step sequencer for the three checkout steps.

use serde::{Deserialize, Serialize};

use super::validate::FieldErrors;

/// A checkout step, numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Shipping,
    Payment,
    Review,
}

impl Step {
    /// Steps in order.
    pub const ALL: [Self; 3] = [Self::Shipping, Self::Payment, Self::Review];

    pub const FIRST: Self = Self::Shipping;
    pub const LAST: Self = Self::Review;

    /// 1-based position.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Shipping => 1,
            Self::Payment => 2,
            Self::Review => 3,
        }
    }

    /// Step at a 1-based position.
    #[must_use]
    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::Shipping),
            2 => Some(Self::Payment),
            3 => Some(Self::Review),
            _ => None,
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Shipping => "Shipping",
            Self::Payment => "Payment",
            Self::Review => "Review",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Shipping => "Address & delivery",
            Self::Payment => "Payment method",
            Self::Review => "Confirm order",
        }
    }

    const fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    const fn previous(self) -> Option<Self> {
        Self::from_number(self.number() - 1)
    }
}

/// Tracks the active step and gates forward movement on validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StepSequencer {
    current: Step,
}

impl StepSequencer {
    #[must_use]
    pub const fn current(&self) -> Step {
        self.current
    }

    /// Move forward if `errors` (the validation of the current step) is
    /// empty. At the last step this is a no-op. Returns whether the guard
    /// passed.
    pub fn advance(&mut self, errors: &FieldErrors) -> bool {
        if !errors.is_empty() {
            return false;
        }
        if let Some(next) = self.current.next() {
            self.current = next;
        }
        true
    }

    /// Move back one step without validating. At the first step this is a
    /// no-op.
    pub fn retreat(&mut self) -> Step {
        if let Some(previous) = self.current.previous() {
            self.current = previous;
        }
        self.current
    }

    /// Jump back to `step`. Forward jumps are refused since they would skip
    /// validation. Returns whether the jump happened.
    pub fn jump_back(&mut self, step: Step) -> bool {
        if step > self.current {
            return false;
        }
        self.current = step;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocking_errors() -> FieldErrors {
        let mut errors = FieldErrors::default();
        errors.insert("first_name", "First name is required");
        errors
    }

    #[test]
    fn test_step_numbers_round_trip() {
        for step in Step::ALL {
            assert_eq!(Step::from_number(step.number()), Some(step));
        }
        assert_eq!(Step::from_number(0), None);
        assert_eq!(Step::from_number(4), None);
    }

    #[test]
    fn test_advance_requires_no_errors() {
        let mut sequencer = StepSequencer::default();
        assert!(!sequencer.advance(&blocking_errors()));
        assert_eq!(sequencer.current(), Step::Shipping);

        assert!(sequencer.advance(&FieldErrors::default()));
        assert_eq!(sequencer.current(), Step::Payment);
    }

    #[test]
    fn test_advance_at_last_step_is_noop() {
        let mut sequencer = StepSequencer::default();
        sequencer.advance(&FieldErrors::default());
        sequencer.advance(&FieldErrors::default());
        assert_eq!(sequencer.current(), Step::Review);

        sequencer.advance(&FieldErrors::default());
        assert_eq!(sequencer.current(), Step::Review);
    }

    #[test]
    fn test_retreat_at_first_step_is_noop() {
        let mut sequencer = StepSequencer::default();
        assert_eq!(sequencer.retreat(), Step::Shipping);

        sequencer.advance(&FieldErrors::default());
        assert_eq!(sequencer.retreat(), Step::Shipping);
    }

    #[test]
    fn test_jump_back_only() {
        let mut sequencer = StepSequencer::default();
        assert!(!sequencer.jump_back(Step::Review));
        sequencer.advance(&FieldErrors::default());
        sequencer.advance(&FieldErrors::default());
        assert!(sequencer.jump_back(Step::Shipping));
        assert_eq!(sequencer.current(), Step::Shipping);
    }
}
