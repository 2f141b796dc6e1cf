//! Multi-step checkout: form state, validation, pricing, promo codes and the
//! flow that ties them together.

mod flow;
mod form;
mod order;
mod pricing;
mod promo;
mod step;
mod validate;

pub use flow::{CheckoutError, CheckoutFlow, CheckoutPhase};
pub use form::{
    CheckoutForm, DeliveryOption, Field, FormError, PaymentField, PaymentForm, PaymentMethod,
    SavedAddress, SavedPaymentMethod, ShippingField, ShippingForm,
};
pub use order::{DELIVERY_ESTIMATE_DAYS, OrderConfirmation, PaymentDescriptor};
pub use pricing::OrderTotals;
pub use promo::{AppliedPromo, PROMO_CODES, PromoCode, PromoError, resolve as resolve_promo};
pub use step::{Step, StepSequencer};
pub use validate::{FieldErrors, ValidationPolicy, validate};
