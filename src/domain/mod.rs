//! Domain types and rules: card validation, ticket orders and payments.

pub mod card;
pub mod order;
pub mod payment;
pub mod ports;
