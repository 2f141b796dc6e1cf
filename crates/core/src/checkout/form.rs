//! Checkout form state and its update function.
//!
//! The form is two independent records, shipping and payment. Every edit
//! goes through [`CheckoutForm::with_field`], which takes the current form, a
//! field and a raw value and returns the next form.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Money;

/// Errors from applying a field update.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("unknown form field: {0}")]
    UnknownField(String),
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

macro_rules! field_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $key:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Form field name.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $key),+
                }
            }
        }

        impl FromStr for $name {
            type Err = FormError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|field| field.as_str() == s)
                    .ok_or_else(|| FormError::UnknownField(s.to_owned()))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

field_enum! {
    /// Fields of the shipping step.
    ShippingField {
        FirstName => "first_name",
        LastName => "last_name",
        Email => "email",
        Phone => "phone",
        Address => "address",
        Apartment => "apartment",
        City => "city",
        State => "state",
        ZipCode => "zip_code",
        Country => "country",
        DeliveryOption => "delivery_option",
        SpecialInstructions => "special_instructions",
        SaveAddress => "save_address",
    }
}

field_enum! {
    /// Fields of the payment step.
    PaymentField {
        PaymentMethod => "payment_method",
        CardNumber => "card_number",
        CardholderName => "cardholder_name",
        ExpiryMonth => "expiry_month",
        ExpiryYear => "expiry_year",
        Cvv => "cvv",
        SameAsShipping => "same_as_shipping",
        BillingFirstName => "billing_first_name",
        BillingLastName => "billing_last_name",
        BillingAddress => "billing_address",
        BillingCity => "billing_city",
        BillingZipCode => "billing_zip_code",
        SavePaymentMethod => "save_payment_method",
        SavedPaymentId => "saved_payment_id",
    }
}

/// Any checkout form field. Names are unique across both records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Shipping(ShippingField),
    Payment(PaymentField),
}

impl Field {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shipping(field) => field.as_str(),
            Self::Payment(field) => field.as_str(),
        }
    }
}

impl FromStr for Field {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<ShippingField>()
            .map(Self::Shipping)
            .or_else(|_| s.parse::<PaymentField>().map(Self::Payment))
    }
}

/// Delivery speed, each with a fixed price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOption {
    #[default]
    Standard,
    Express,
    Overnight,
}

impl DeliveryOption {
    pub const ALL: [Self; 3] = [Self::Standard, Self::Express, Self::Overnight];

    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Express => "express",
            Self::Overnight => "overnight",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Standard => "Standard Delivery",
            Self::Express => "Express Delivery",
            Self::Overnight => "Overnight Delivery",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Standard => "5-7 business days",
            Self::Express => "2-3 business days",
            Self::Overnight => "Next business day",
        }
    }

    /// Standard 5.99, express 12.99, overnight 24.99.
    #[must_use]
    pub fn price(self) -> Money {
        match self {
            Self::Standard => Money::from_cents(599),
            Self::Express => Money::from_cents(1_299),
            Self::Overnight => Money::from_cents(2_499),
        }
    }
}

impl FromStr for DeliveryOption {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|option| option.id() == s).ok_or(())
    }
}

/// How the visitor pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Credit/debit card; the only method with card detail fields.
    #[default]
    Card,
    Razorpay,
    PayPal,
}

impl PaymentMethod {
    pub const ALL: [Self; 3] = [Self::Card, Self::Razorpay, Self::PayPal];

    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Razorpay => "razorpay",
            Self::PayPal => "paypal",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Card => "Credit/Debit Card",
            Self::Razorpay => "Razorpay",
            Self::PayPal => "PayPal",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Card => "Visa, Mastercard, American Express",
            Self::Razorpay => "UPI, Net Banking, Wallets",
            Self::PayPal => "Pay with your PayPal account",
        }
    }

    /// Whether card details are collected for this method.
    #[must_use]
    pub const fn requires_card(self) -> bool {
        matches!(self, Self::Card)
    }
}

impl FromStr for PaymentMethod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|method| method.id() == s).ok_or(())
    }
}

/// Shipping record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub apartment: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub delivery_option: DeliveryOption,
    pub special_instructions: String,
    pub save_address: bool,
}

impl Default for ShippingForm {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            apartment: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            country: "US".to_string(),
            delivery_option: DeliveryOption::default(),
            special_instructions: String::new(),
            save_address: false,
        }
    }
}

impl ShippingForm {
    /// Text value of a field; `None` for non-text fields.
    #[must_use]
    pub fn text(&self, field: ShippingField) -> Option<&str> {
        let value = match field {
            ShippingField::FirstName => &self.first_name,
            ShippingField::LastName => &self.last_name,
            ShippingField::Email => &self.email,
            ShippingField::Phone => &self.phone,
            ShippingField::Address => &self.address,
            ShippingField::Apartment => &self.apartment,
            ShippingField::City => &self.city,
            ShippingField::State => &self.state,
            ShippingField::ZipCode => &self.zip_code,
            ShippingField::Country => &self.country,
            ShippingField::SpecialInstructions => &self.special_instructions,
            ShippingField::DeliveryOption | ShippingField::SaveAddress => return None,
        };
        Some(value)
    }

    /// Recipient name as printed on the label.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    fn set(&mut self, field: ShippingField, value: &str) -> Result<(), FormError> {
        match field {
            ShippingField::DeliveryOption => {
                self.delivery_option = value
                    .parse()
                    .map_err(|()| invalid(field.as_str(), value))?;
            }
            ShippingField::SaveAddress => self.save_address = parse_flag(field.as_str(), value)?,
            ShippingField::FirstName => value.clone_into(&mut self.first_name),
            ShippingField::LastName => value.clone_into(&mut self.last_name),
            ShippingField::Email => value.clone_into(&mut self.email),
            ShippingField::Phone => value.clone_into(&mut self.phone),
            ShippingField::Address => value.clone_into(&mut self.address),
            ShippingField::Apartment => value.clone_into(&mut self.apartment),
            ShippingField::City => value.clone_into(&mut self.city),
            ShippingField::State => value.clone_into(&mut self.state),
            ShippingField::ZipCode => value.clone_into(&mut self.zip_code),
            ShippingField::Country => value.clone_into(&mut self.country),
            ShippingField::SpecialInstructions => value.clone_into(&mut self.special_instructions),
        }
        Ok(())
    }
}

/// Payment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentForm {
    pub payment_method: PaymentMethod,
    pub card_number: String,
    pub cardholder_name: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub cvv: String,
    pub same_as_shipping: bool,
    pub billing_first_name: String,
    pub billing_last_name: String,
    pub billing_address: String,
    pub billing_city: String,
    pub billing_zip_code: String,
    pub save_payment_method: bool,
    /// Id of a saved payment method; when set, card fields are not required.
    pub saved_payment_id: String,
}

impl Default for PaymentForm {
    fn default() -> Self {
        Self {
            payment_method: PaymentMethod::default(),
            card_number: String::new(),
            cardholder_name: String::new(),
            expiry_month: String::new(),
            expiry_year: String::new(),
            cvv: String::new(),
            same_as_shipping: true,
            billing_first_name: String::new(),
            billing_last_name: String::new(),
            billing_address: String::new(),
            billing_city: String::new(),
            billing_zip_code: String::new(),
            save_payment_method: false,
            saved_payment_id: String::new(),
        }
    }
}

impl PaymentForm {
    /// Text value of a field; `None` for non-text fields.
    #[must_use]
    pub fn text(&self, field: PaymentField) -> Option<&str> {
        let value = match field {
            PaymentField::CardNumber => &self.card_number,
            PaymentField::CardholderName => &self.cardholder_name,
            PaymentField::ExpiryMonth => &self.expiry_month,
            PaymentField::ExpiryYear => &self.expiry_year,
            PaymentField::Cvv => &self.cvv,
            PaymentField::BillingFirstName => &self.billing_first_name,
            PaymentField::BillingLastName => &self.billing_last_name,
            PaymentField::BillingAddress => &self.billing_address,
            PaymentField::BillingCity => &self.billing_city,
            PaymentField::BillingZipCode => &self.billing_zip_code,
            PaymentField::SavedPaymentId => &self.saved_payment_id,
            PaymentField::PaymentMethod
            | PaymentField::SameAsShipping
            | PaymentField::SavePaymentMethod => return None,
        };
        Some(value)
    }

    /// Whether a saved payment method is selected.
    #[must_use]
    pub fn uses_saved_method(&self) -> bool {
        !self.saved_payment_id.trim().is_empty()
    }

    /// Last four digits of the card number, if it has at least four.
    #[must_use]
    pub fn card_last_four(&self) -> Option<String> {
        let digits: Vec<char> = self.card_number.chars().filter(char::is_ascii_digit).collect();
        let start = digits.len().checked_sub(4)?;
        digits.get(start..).map(|tail| tail.iter().collect())
    }

    fn set(&mut self, field: PaymentField, value: &str) -> Result<(), FormError> {
        match field {
            PaymentField::PaymentMethod => {
                self.payment_method = value
                    .parse()
                    .map_err(|()| invalid(field.as_str(), value))?;
            }
            PaymentField::SameAsShipping => {
                self.same_as_shipping = parse_flag(field.as_str(), value)?;
            }
            PaymentField::SavePaymentMethod => {
                self.save_payment_method = parse_flag(field.as_str(), value)?;
            }
            PaymentField::CardNumber => {
                // Typing a card number replaces any saved selection.
                value.clone_into(&mut self.card_number);
                self.saved_payment_id.clear();
            }
            PaymentField::CardholderName => value.clone_into(&mut self.cardholder_name),
            PaymentField::ExpiryMonth => value.clone_into(&mut self.expiry_month),
            PaymentField::ExpiryYear => value.clone_into(&mut self.expiry_year),
            PaymentField::Cvv => value.clone_into(&mut self.cvv),
            PaymentField::BillingFirstName => value.clone_into(&mut self.billing_first_name),
            PaymentField::BillingLastName => value.clone_into(&mut self.billing_last_name),
            PaymentField::BillingAddress => value.clone_into(&mut self.billing_address),
            PaymentField::BillingCity => value.clone_into(&mut self.billing_city),
            PaymentField::BillingZipCode => value.clone_into(&mut self.billing_zip_code),
            PaymentField::SavedPaymentId => value.clone_into(&mut self.saved_payment_id),
        }
        Ok(())
    }
}

/// An address a signed-in visitor saved earlier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedAddress {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub apartment: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

/// A card a signed-in visitor saved earlier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPaymentMethod {
    pub id: String,
    pub cardholder_name: String,
    pub last_four: String,
    pub brand: String,
    pub expiry_month: String,
    pub expiry_year: String,
}

/// The whole checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutForm {
    pub shipping: ShippingForm,
    pub payment: PaymentForm,
}

impl CheckoutForm {
    /// Return the form with `field` set to `value`.
    ///
    /// Text fields take the value verbatim (trimming happens at
    /// validation). Flags accept `true/false`, `on/off`, `1/0` and empty.
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` for an unparseable enum or flag value. The
    /// input form is consumed either way; callers keep a clone if they
    /// need the old state.
    pub fn with_field(mut self, field: Field, value: &str) -> Result<Self, FormError> {
        match field {
            Field::Shipping(field) => self.shipping.set(field, value)?,
            Field::Payment(field) => self.payment.set(field, value)?,
        }
        Ok(self)
    }

    /// Apply a sequence of named updates in order; later values win.
    ///
    /// # Errors
    ///
    /// Returns the first `UnknownField` or `InvalidValue` error; the
    /// original form is returned untouched in that case via the caller's
    /// clone.
    pub fn with_fields<'a, I>(self, updates: I) -> Result<(Self, Vec<Field>), FormError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut form = self;
        let mut touched = Vec::new();
        for (name, value) in updates {
            let field: Field = name.parse()?;
            form = form.with_field(field, value)?;
            if !touched.contains(&field) {
                touched.push(field);
            }
        }
        Ok((form, touched))
    }

    /// Return the form with the shipping contact and address replaced by a
    /// saved address. Delivery option and instructions are kept.
    #[must_use]
    pub fn with_saved_address(mut self, saved: &SavedAddress) -> Self {
        let shipping = &mut self.shipping;
        shipping.first_name.clone_from(&saved.first_name);
        shipping.last_name.clone_from(&saved.last_name);
        shipping.email.clone_from(&saved.email);
        shipping.phone.clone_from(&saved.phone);
        shipping.address.clone_from(&saved.address);
        shipping.apartment.clone_from(&saved.apartment);
        shipping.city.clone_from(&saved.city);
        shipping.state.clone_from(&saved.state);
        shipping.zip_code.clone_from(&saved.zip_code);
        shipping.country.clone_from(&saved.country);
        self
    }

    /// Return the form paying with a saved card.
    #[must_use]
    pub fn with_saved_payment(mut self, saved: &SavedPaymentMethod) -> Self {
        let payment = &mut self.payment;
        payment.payment_method = PaymentMethod::Card;
        payment.card_number = format!("****-****-****-{}", saved.last_four);
        payment.cardholder_name.clone_from(&saved.cardholder_name);
        payment.expiry_month.clone_from(&saved.expiry_month);
        payment.expiry_year.clone_from(&saved.expiry_year);
        payment.cvv.clear();
        payment.saved_payment_id.clone_from(&saved.id);
        self
    }
}

fn invalid(field: &'static str, value: &str) -> FormError {
    FormError::InvalidValue {
        field,
        value: value.to_owned(),
    }
}

fn parse_flag(field: &'static str, value: &str) -> Result<bool, FormError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "1" | "yes" => Ok(true),
        "false" | "off" | "0" | "no" | "" => Ok(false),
        _ => Err(invalid(field, value)),
    }
}
