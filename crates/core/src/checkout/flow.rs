//! The checkout state machine.
//!
//! `GuestPrompt -> Steps(Shipping -> Payment -> Review) -> Processing ->
//! Completed`. The flow owns the form, the current step, the field errors of
//! the last validation pass and the applied promo. It is serializable so the
//! storefront can keep one per visitor session.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::form::{CheckoutForm, Field, FormError, SavedAddress, SavedPaymentMethod};
use super::order::OrderConfirmation;
use super::pricing::OrderTotals;
use super::promo::{self, AppliedPromo, PromoError};
use super::step::{Step, StepSequencer};
use super::validate::{FieldErrors, ValidationPolicy, validate};
use crate::cart::CartItem;
use crate::types::Money;

/// Errors from flow transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("checkout form cannot be edited in the {0:?} phase")]
    NotEditable(CheckoutPhase),
    #[error("orders can only be placed from the review step")]
    NotAtReview,
    #[error("payment details are incomplete")]
    PaymentInvalid,
    #[error("order is already being processed")]
    AlreadyProcessing,
    #[error("order has already been placed")]
    AlreadyCompleted,
    #[error("no order is being processed")]
    NotProcessing,
    #[error("cart is empty")]
    EmptyCart,
}

/// Where the visitor is in checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutPhase {
    /// Guests choose between continuing as guest and signing in.
    #[default]
    GuestPrompt,
    /// Filling in the steps.
    Steps,
    /// Order submitted, waiting on the simulated processor.
    Processing,
    /// Order placed.
    Completed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutFlow {
    phase: CheckoutPhase,
    sequencer: StepSequencer,
    form: CheckoutForm,
    errors: FieldErrors,
    promo: Option<AppliedPromo>,
    policy: ValidationPolicy,
    /// When the pending order was submitted.
    #[serde(default)]
    processing_since: Option<DateTime<Utc>>,
}

impl CheckoutFlow {
    /// Start a flow. Signed-in visitors go straight to the shipping step.
    #[must_use]
    pub fn new(authenticated: bool, policy: ValidationPolicy) -> Self {
        Self {
            phase: if authenticated {
                CheckoutPhase::Steps
            } else {
                CheckoutPhase::GuestPrompt
            },
            policy,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn phase(&self) -> CheckoutPhase {
        self.phase
    }

    #[must_use]
    pub const fn step(&self) -> Step {
        self.sequencer.current()
    }

    #[must_use]
    pub const fn form(&self) -> &CheckoutForm {
        &self.form
    }

    #[must_use]
    pub const fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    #[must_use]
    pub const fn promo(&self) -> Option<&AppliedPromo> {
        self.promo.as_ref()
    }

    #[must_use]
    pub fn discount(&self) -> Money {
        self.promo.as_ref().map_or(Money::ZERO, |promo| promo.discount)
    }

    /// Leave the guest prompt, either as a guest or after signing in.
    /// No-op in any other phase.
    pub fn dismiss_guest_prompt(&mut self) {
        if self.phase == CheckoutPhase::GuestPrompt {
            self.phase = CheckoutPhase::Steps;
        }
    }

    /// Apply named field updates in order. Errors for the edited fields are
    /// cleared; on failure the form is unchanged.
    ///
    /// # Errors
    ///
    /// `NotEditable` outside the steps phase, or the `FormError` of the
    /// first bad update.
    pub fn update<'a, I>(&mut self, updates: I) -> Result<(), CheckoutError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.ensure_editable()?;
        let (form, touched) = self.form.clone().with_fields(updates)?;
        self.form = form;
        for field in touched {
            self.errors.clear_field(field.as_str());
        }
        Ok(())
    }

    /// Set a single field.
    ///
    /// # Errors
    ///
    /// As [`Self::update`].
    pub fn set_field(&mut self, field: Field, value: &str) -> Result<(), CheckoutError> {
        self.update([(field.as_str(), value)])
    }

    /// Copy a saved address into the shipping form.
    ///
    /// # Errors
    ///
    /// `NotEditable` outside the steps phase.
    pub fn use_saved_address(&mut self, saved: &SavedAddress) -> Result<(), CheckoutError> {
        self.ensure_editable()?;
        self.form = self.form.clone().with_saved_address(saved);
        self.errors.clear();
        Ok(())
    }

    /// Pay with a saved card.
    ///
    /// # Errors
    ///
    /// `NotEditable` outside the steps phase.
    pub fn use_saved_payment(&mut self, saved: &SavedPaymentMethod) -> Result<(), CheckoutError> {
        self.ensure_editable()?;
        self.form = self.form.clone().with_saved_payment(saved);
        self.errors.clear();
        Ok(())
    }

    /// Validate the current step and move forward if it passes. The new
    /// error set replaces the old one either way. Returns whether the step
    /// passed.
    ///
    /// # Errors
    ///
    /// `NotEditable` outside the steps phase.
    pub fn advance(&mut self) -> Result<bool, CheckoutError> {
        self.ensure_editable()?;
        self.errors = validate(self.step(), &self.form, self.policy);
        Ok(self.sequencer.advance(&self.errors))
    }

    /// Move back one step without validating.
    ///
    /// # Errors
    ///
    /// `NotEditable` outside the steps phase.
    pub fn retreat(&mut self) -> Result<Step, CheckoutError> {
        self.ensure_editable()?;
        self.errors.clear();
        Ok(self.sequencer.retreat())
    }

    /// Jump back to an earlier step. Returns whether the jump happened.
    ///
    /// # Errors
    ///
    /// `NotEditable` outside the steps phase.
    pub fn edit(&mut self, step: Step) -> Result<bool, CheckoutError> {
        self.ensure_editable()?;
        let moved = self.sequencer.jump_back(step);
        if moved {
            self.errors.clear();
        }
        Ok(moved)
    }

    /// Apply a promo code. An empty code clears the promo; an unknown code
    /// clears it and reports the error.
    ///
    /// # Errors
    ///
    /// `PromoError::Unknown` when the code is not recognised.
    pub fn apply_promo(&mut self, code: &str) -> Result<Money, PromoError> {
        if code.trim().is_empty() {
            self.promo = None;
            return Ok(Money::ZERO);
        }
        match promo::resolve(code) {
            Ok(found) => {
                let applied = AppliedPromo::from(found);
                let discount = applied.discount;
                self.promo = Some(applied);
                Ok(discount)
            }
            Err(err) => {
                self.promo = None;
                Err(err)
            }
        }
    }

    /// Carry over a promo applied elsewhere (the cart page).
    pub fn set_promo(&mut self, promo: Option<AppliedPromo>) {
        self.promo = promo;
    }

    #[must_use]
    pub fn totals(&self, items: &[CartItem]) -> OrderTotals {
        OrderTotals::compute(items, self.form.shipping.delivery_option, self.discount())
    }

    /// Submit the order from the review step. Payment is validated again;
    /// on failure its errors are recorded and the flow stays on review.
    ///
    /// # Errors
    ///
    /// `AlreadyProcessing`, `AlreadyCompleted`, `NotAtReview`, `EmptyCart`
    /// or `PaymentInvalid`.
    pub fn begin_order(
        &mut self,
        items: &[CartItem],
        now: DateTime<Utc>,
    ) -> Result<(), CheckoutError> {
        match self.phase {
            CheckoutPhase::Processing => return Err(CheckoutError::AlreadyProcessing),
            CheckoutPhase::Completed => return Err(CheckoutError::AlreadyCompleted),
            CheckoutPhase::GuestPrompt => return Err(CheckoutError::NotAtReview),
            CheckoutPhase::Steps => {}
        }
        if self.step() != Step::Review {
            return Err(CheckoutError::NotAtReview);
        }
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let errors = validate(Step::Payment, &self.form, self.policy);
        if !errors.is_empty() {
            self.errors = errors;
            return Err(CheckoutError::PaymentInvalid);
        }
        self.errors.clear();
        self.phase = CheckoutPhase::Processing;
        self.processing_since = Some(now);
        Ok(())
    }

    /// Return a submission that never finished to the review step.
    ///
    /// A flow counts as stalled once it has been processing for `timeout`.
    /// Returns whether the flow was reset.
    pub fn recover_stalled(&mut self, now: DateTime<Utc>, timeout: TimeDelta) -> bool {
        if self.phase != CheckoutPhase::Processing {
            return false;
        }
        let stalled = self
            .processing_since
            .is_none_or(|since| now.signed_duration_since(since) >= timeout);
        if stalled {
            self.phase = CheckoutPhase::Steps;
            self.processing_since = None;
        }
        stalled
    }

    /// Finish a submitted order and build its confirmation.
    ///
    /// # Errors
    ///
    /// `NotProcessing` unless [`Self::begin_order`] succeeded first.
    pub fn complete(
        &mut self,
        items: Vec<CartItem>,
        now: DateTime<Utc>,
    ) -> Result<OrderConfirmation, CheckoutError> {
        if self.phase != CheckoutPhase::Processing {
            return Err(CheckoutError::NotProcessing);
        }
        let totals = self.totals(&items);
        let promo_code = self.promo.as_ref().map(|promo| promo.code.clone());
        let confirmation = OrderConfirmation::build(items, &self.form, totals, promo_code, now);
        self.phase = CheckoutPhase::Completed;
        self.processing_since = None;
        Ok(confirmation)
    }

    fn ensure_editable(&self) -> Result<(), CheckoutError> {
        if self.phase == CheckoutPhase::Steps {
            Ok(())
        } else {
            Err(CheckoutError::NotEditable(self.phase))
        }
    }
}
