//! Application layer orchestrating a ticket purchase.
//!
//! `CheckoutService` validates orders, opens card checkout sessions and
//! submits validated card input to a `PaymentGateway`.

pub mod checkout;
