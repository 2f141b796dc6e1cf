//! Per-step form validation.
//!
//! Validation is a pure function of `(step, form, policy)`. Each pass
//! produces a fresh [`FieldErrors`]; any entry blocks the step from
//! advancing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::form::{CheckoutForm, PaymentField, PaymentForm, ShippingField, ShippingForm};
use super::step::Step;
use crate::types::Email;

/// Field name to message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Record an error, replacing any earlier message for the field.
    pub fn insert(&mut self, field: &str, message: &str) {
        self.0.insert(field.to_owned(), message.to_owned());
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(field, message)| (field.as_str(), message.as_str()))
    }

    /// Drop the error for one field, as happens when the visitor edits it.
    pub fn clear_field(&mut self, field: &str) {
        self.0.remove(field);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// How thorough validation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// Required fields must be non-blank after trimming.
    #[default]
    PresenceOnly,
    /// Presence plus format checks on email, phone and card details.
    Strict,
}

const SHIPPING_REQUIRED: [(ShippingField, &str); 9] = [
    (ShippingField::FirstName, "First name is required"),
    (ShippingField::LastName, "Last name is required"),
    (ShippingField::Email, "Email is required"),
    (ShippingField::Phone, "Phone number is required"),
    (ShippingField::Address, "Address is required"),
    (ShippingField::City, "City is required"),
    (ShippingField::State, "State is required"),
    (ShippingField::ZipCode, "ZIP code is required"),
    (ShippingField::Country, "Country is required"),
];

const CARD_REQUIRED: [(PaymentField, &str); 5] = [
    (PaymentField::CardNumber, "Card number is required"),
    (PaymentField::CardholderName, "Cardholder name is required"),
    (PaymentField::ExpiryMonth, "Expiry month is required"),
    (PaymentField::ExpiryYear, "Expiry year is required"),
    (PaymentField::Cvv, "CVV is required"),
];

const BILLING_REQUIRED: [(PaymentField, &str); 5] = [
    (PaymentField::BillingFirstName, "Billing first name is required"),
    (PaymentField::BillingLastName, "Billing last name is required"),
    (PaymentField::BillingAddress, "Billing address is required"),
    (PaymentField::BillingCity, "Billing city is required"),
    (PaymentField::BillingZipCode, "Billing ZIP code is required"),
];

/// Validate the fields belonging to `step`. Review has no checks.
#[must_use]
pub fn validate(step: Step, form: &CheckoutForm, policy: ValidationPolicy) -> FieldErrors {
    match step {
        Step::Shipping => validate_shipping(&form.shipping, policy),
        Step::Payment => validate_payment(&form.payment, policy),
        Step::Review => FieldErrors::default(),
    }
}

fn blank(value: Option<&str>) -> bool {
    value.is_none_or(|value| value.trim().is_empty())
}

fn validate_shipping(shipping: &ShippingForm, policy: ValidationPolicy) -> FieldErrors {
    let mut errors = FieldErrors::default();
    for (field, message) in SHIPPING_REQUIRED {
        if blank(shipping.text(field)) {
            errors.insert(field.as_str(), message);
        }
    }

    if policy == ValidationPolicy::Strict {
        let email = ShippingField::Email.as_str();
        if !errors.contains(email) && Email::parse(&shipping.email).is_err() {
            errors.insert(email, "Enter a valid email address");
        }
        let phone = ShippingField::Phone.as_str();
        let digits = shipping.phone.chars().filter(char::is_ascii_digit).count();
        if !errors.contains(phone) && !(7..=15).contains(&digits) {
            errors.insert(phone, "Enter a valid phone number");
        }
    }
    errors
}

fn validate_payment(payment: &PaymentForm, policy: ValidationPolicy) -> FieldErrors {
    let mut errors = FieldErrors::default();

    // A saved payment method stands in for the card fields.
    let needs_card = payment.payment_method.requires_card() && !payment.uses_saved_method();
    if needs_card {
        for (field, message) in CARD_REQUIRED {
            if blank(payment.text(field)) {
                errors.insert(field.as_str(), message);
            }
        }
        if policy == ValidationPolicy::Strict {
            check_card_format(payment, &mut errors);
        }
    }

    if !payment.same_as_shipping {
        for (field, message) in BILLING_REQUIRED {
            if blank(payment.text(field)) {
                errors.insert(field.as_str(), message);
            }
        }
    }
    errors
}

fn check_card_format(payment: &PaymentForm, errors: &mut FieldErrors) {
    let number = PaymentField::CardNumber.as_str();
    if !errors.contains(number) && !luhn_valid(&payment.card_number) {
        errors.insert(number, "Enter a valid card number");
    }

    let month = PaymentField::ExpiryMonth.as_str();
    let month_ok = payment
        .expiry_month
        .trim()
        .parse::<u8>()
        .is_ok_and(|m| (1..=12).contains(&m));
    if !errors.contains(month) && !month_ok {
        errors.insert(month, "Enter a valid expiry month");
    }

    let year = PaymentField::ExpiryYear.as_str();
    let year_ok = payment.expiry_year.trim().len() == 4
        && payment.expiry_year.trim().chars().all(|c| c.is_ascii_digit());
    if !errors.contains(year) && !year_ok {
        errors.insert(year, "Enter a valid expiry year");
    }

    let cvv = PaymentField::Cvv.as_str();
    let cvv_value = payment.cvv.trim();
    let cvv_ok = (3..=4).contains(&cvv_value.len()) && cvv_value.chars().all(|c| c.is_ascii_digit());
    if !errors.contains(cvv) && !cvv_ok {
        errors.insert(cvv, "Enter a valid CVV");
    }
}

/// Luhn checksum over the digits of `number`; spaces and dashes are ignored.
fn luhn_valid(number: &str) -> bool {
    let mut digits = Vec::new();
    for c in number.chars() {
        match c {
            ' ' | '-' => {}
            _ => match c.to_digit(10) {
                Some(d) => digits.push(d),
                None => return false,
            },
        }
    }
    if !(12..=19).contains(&digits.len()) {
        return false;
    }
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::checkout::form::{Field, PaymentMethod};

    fn filled_shipping() -> CheckoutForm {
        let (form, _) = CheckoutForm::default()
            .with_fields([
                ("first_name", "John"),
                ("last_name", "Doe"),
                ("email", "john.doe@example.com"),
                ("phone", "+1 (555) 123-4567"),
                ("address", "123 Main Street"),
                ("city", "New York"),
                ("state", "NY"),
                ("zip_code", "10001"),
            ])
            .unwrap();
        form
    }

    fn filled_card(form: CheckoutForm) -> CheckoutForm {
        let (form, _) = form
            .with_fields([
                ("card_number", "4242 4242 4242 4242"),
                ("cardholder_name", "John Doe"),
                ("expiry_month", "12"),
                ("expiry_year", "2027"),
                ("cvv", "123"),
            ])
            .unwrap();
        form
    }

    #[test]
    fn test_empty_shipping_reports_every_required_field() {
        let mut form = CheckoutForm::default();
        form.shipping.country.clear();
        let errors = validate(Step::Shipping, &form, ValidationPolicy::PresenceOnly);
        assert_eq!(errors.len(), 9);
        assert_eq!(errors.get("first_name"), Some("First name is required"));
        assert_eq!(errors.get("zip_code"), Some("ZIP code is required"));
        assert!(!errors.contains("apartment"));
    }

    #[test]
    fn test_whitespace_counts_as_missing() {
        let form = filled_shipping()
            .with_field(Field::Shipping(ShippingField::City), "   ")
            .unwrap();
        let errors = validate(Step::Shipping, &form, ValidationPolicy::PresenceOnly);
        assert_eq!(errors.iter().collect::<Vec<_>>(), vec![("city", "City is required")]);
    }

    #[test]
    fn test_card_fields_only_for_card_method() {
        let form = filled_shipping();
        let errors = validate(Step::Payment, &form, ValidationPolicy::PresenceOnly);
        assert_eq!(errors.len(), 5);
        assert_eq!(errors.get("cvv"), Some("CVV is required"));

        let mut paypal = form;
        paypal.payment.payment_method = PaymentMethod::PayPal;
        assert!(validate(Step::Payment, &paypal, ValidationPolicy::PresenceOnly).is_empty());
    }

    #[test]
    fn test_saved_payment_skips_card_fields() {
        let mut form = filled_shipping();
        form.payment.saved_payment_id = "pm1".to_string();
        assert!(validate(Step::Payment, &form, ValidationPolicy::PresenceOnly).is_empty());
    }

    #[test]
    fn test_billing_required_when_not_same_as_shipping() {
        let form = filled_card(filled_shipping())
            .with_field(Field::Payment(PaymentField::SameAsShipping), "false")
            .unwrap();
        let errors = validate(Step::Payment, &form, ValidationPolicy::PresenceOnly);
        assert_eq!(errors.len(), 5);
        assert_eq!(
            errors.get("billing_zip_code"),
            Some("Billing ZIP code is required")
        );
    }

    #[test]
    fn test_review_never_fails() {
        let errors = validate(
            Step::Review,
            &CheckoutForm::default(),
            ValidationPolicy::Strict,
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn test_presence_only_accepts_malformed_values() {
        let form = filled_card(filled_shipping())
            .with_field(Field::Shipping(ShippingField::Email), "not-an-email")
            .unwrap()
            .with_field(Field::Payment(PaymentField::CardNumber), "1234")
            .unwrap();
        assert!(validate(Step::Shipping, &form, ValidationPolicy::PresenceOnly).is_empty());
        assert!(validate(Step::Payment, &form, ValidationPolicy::PresenceOnly).is_empty());
    }

    #[test]
    fn test_strict_checks_formats() {
        let form = filled_card(filled_shipping())
            .with_field(Field::Shipping(ShippingField::Email), "not-an-email")
            .unwrap()
            .with_field(Field::Payment(PaymentField::CardNumber), "4242 4242 4242 4241")
            .unwrap()
            .with_field(Field::Payment(PaymentField::ExpiryMonth), "13")
            .unwrap();

        let shipping = validate(Step::Shipping, &form, ValidationPolicy::Strict);
        assert_eq!(shipping.get("email"), Some("Enter a valid email address"));

        let payment = validate(Step::Payment, &form, ValidationPolicy::Strict);
        assert_eq!(payment.get("card_number"), Some("Enter a valid card number"));
        assert_eq!(payment.get("expiry_month"), Some("Enter a valid expiry month"));
        assert!(!payment.contains("cvv"));
    }

    #[test]
    fn test_strict_accepts_valid_card() {
        let form = filled_card(filled_shipping());
        assert!(validate(Step::Payment, &form, ValidationPolicy::Strict).is_empty());
        assert!(validate(Step::Shipping, &form, ValidationPolicy::Strict).is_empty());
    }

    #[test]
    fn test_luhn() {
        assert!(luhn_valid("4242424242424242"));
        assert!(luhn_valid("4111-1111-1111-1111"));
        assert!(!luhn_valid("4242424242424241"));
        assert!(!luhn_valid("4242"));
        assert!(!luhn_valid("4242x42424242424"));
    }
}
