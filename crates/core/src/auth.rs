//! Login attempt gate.
//!
//! Failed sign-ins are counted per visitor. From [`CAPTCHA_THRESHOLD`]
//! failures a math captcha must be answered with every attempt; from
//! [`COOLDOWN_THRESHOLD`] failures each further failure blocks attempts for
//! [`COOLDOWN_SECONDS`]. A successful sign-in resets the gate.

use core::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CAPTCHA_THRESHOLD: u32 = 3;
pub const COOLDOWN_THRESHOLD: u32 = 5;
pub const COOLDOWN_SECONDS: i64 = 30;

/// Why an attempt was refused before credentials were checked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginBlocked {
    #[error("Please complete the security verification")]
    CaptchaRequired,
    #[error("Too many login attempts. Please wait {seconds} seconds before trying again.")]
    CoolingDown { seconds: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptchaOperator {
    Plus,
    Minus,
}

/// A small arithmetic challenge shown after repeated failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptchaChallenge {
    left: i32,
    right: i32,
    operator: CaptchaOperator,
}

impl CaptchaChallenge {
    #[must_use]
    pub const fn new(left: i32, right: i32, operator: CaptchaOperator) -> Self {
        Self {
            left,
            right,
            operator,
        }
    }

    #[must_use]
    pub const fn answer(&self) -> i32 {
        match self.operator {
            CaptchaOperator::Plus => self.left + self.right,
            CaptchaOperator::Minus => self.left - self.right,
        }
    }

    /// Whether `input` (surrounding whitespace ignored) is the answer.
    #[must_use]
    pub fn is_answered_by(&self, input: &str) -> bool {
        input.trim().parse::<i32>().is_ok_and(|value| value == self.answer())
    }
}

impl fmt::Display for CaptchaChallenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.operator {
            CaptchaOperator::Plus => '+',
            CaptchaOperator::Minus => '-',
        };
        write!(f, "{} {op} {}", self.left, self.right)
    }
}

/// Per-visitor attempt state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginGate {
    failed_attempts: u32,
    captcha: Option<CaptchaChallenge>,
    locked_until: Option<DateTime<Utc>>,
}

impl LoginGate {
    #[must_use]
    pub const fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    #[must_use]
    pub const fn captcha_required(&self) -> bool {
        self.failed_attempts >= CAPTCHA_THRESHOLD
    }

    /// The challenge to show, once the captcha is required.
    #[must_use]
    pub const fn captcha(&self) -> Option<&CaptchaChallenge> {
        self.captcha.as_ref()
    }

    /// Whole seconds left in the cooldown, rounded up.
    #[must_use]
    pub fn cooldown_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        let until = self.locked_until?;
        let left = until - now;
        if left <= Duration::zero() {
            return None;
        }
        let millis = left.num_milliseconds();
        Some((millis + 999) / 1000)
    }

    /// Check whether an attempt may proceed.
    ///
    /// # Errors
    ///
    /// `CoolingDown` while the cooldown runs, then `CaptchaRequired` when a
    /// captcha is due and `captcha_input` does not answer it.
    pub fn check(&self, now: DateTime<Utc>, captcha_input: Option<&str>) -> Result<(), LoginBlocked> {
        if let Some(seconds) = self.cooldown_remaining(now) {
            return Err(LoginBlocked::CoolingDown { seconds });
        }
        if self.captcha_required() {
            let answered = match (self.captcha, captcha_input) {
                (Some(challenge), Some(input)) => challenge.is_answered_by(input),
                _ => false,
            };
            if !answered {
                return Err(LoginBlocked::CaptchaRequired);
            }
        }
        Ok(())
    }

    /// Count a failed attempt. `next_challenge` supplies a fresh captcha
    /// once one is required, so an answered challenge cannot be replayed.
    pub fn record_failure(
        &mut self,
        now: DateTime<Utc>,
        next_challenge: impl FnOnce() -> CaptchaChallenge,
    ) {
        self.failed_attempts = self.failed_attempts.saturating_add(1);
        if self.captcha_required() {
            self.captcha = Some(next_challenge());
        }
        if self.failed_attempts >= COOLDOWN_THRESHOLD {
            self.locked_until = Some(now + Duration::seconds(COOLDOWN_SECONDS));
        }
    }

    /// Replace the current challenge (the "refresh" button).
    pub fn refresh_captcha(&mut self, challenge: CaptchaChallenge) {
        if self.captcha_required() {
            self.captcha = Some(challenge);
        }
    }

    /// Clear all attempt state after a successful sign-in.
    pub fn record_success(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 14, 9, 0, 0).unwrap()
    }

    fn challenge() -> CaptchaChallenge {
        CaptchaChallenge::new(7, 3, CaptchaOperator::Minus)
    }

    fn failed(times: u32) -> LoginGate {
        let mut gate = LoginGate::default();
        for _ in 0..times {
            gate.record_failure(now(), challenge);
        }
        gate
    }

    #[test]
    fn test_challenge_display_and_answer() {
        let plus = CaptchaChallenge::new(4, 9, CaptchaOperator::Plus);
        assert_eq!(plus.to_string(), "4 + 9");
        assert!(plus.is_answered_by(" 13 "));
        assert!(!plus.is_answered_by("12"));
        assert!(challenge().is_answered_by("4"));
        assert!(CaptchaChallenge::new(2, 8, CaptchaOperator::Minus).is_answered_by("-6"));
    }

    #[test]
    fn test_no_captcha_below_threshold() {
        let gate = failed(2);
        assert!(!gate.captcha_required());
        assert!(gate.captcha().is_none());
        assert_eq!(gate.check(now(), None), Ok(()));
    }

    #[test]
    fn test_captcha_from_third_failure() {
        let gate = failed(3);
        assert!(gate.captcha_required());
        assert_eq!(gate.check(now(), None), Err(LoginBlocked::CaptchaRequired));
        assert_eq!(gate.check(now(), Some("5")), Err(LoginBlocked::CaptchaRequired));
        assert_eq!(gate.check(now(), Some("4")), Ok(()));
    }

    #[test]
    fn test_cooldown_from_fifth_failure() {
        let gate = failed(5);
        assert_eq!(gate.cooldown_remaining(now()), Some(30));
        assert_eq!(
            gate.check(now() + Duration::seconds(10), Some("4")),
            Err(LoginBlocked::CoolingDown { seconds: 20 })
        );
        assert_eq!(gate.check(now() + Duration::seconds(30), Some("4")), Ok(()));
    }

    #[test]
    fn test_cooldown_rounds_up() {
        let gate = failed(5);
        assert_eq!(
            gate.cooldown_remaining(now() + Duration::milliseconds(29_100)),
            Some(1)
        );
    }

    #[test]
    fn test_success_resets() {
        let mut gate = failed(4);
        gate.record_success();
        assert_eq!(gate.failed_attempts(), 0);
        assert!(!gate.captcha_required());
        assert_eq!(gate, LoginGate::default());
    }
}
