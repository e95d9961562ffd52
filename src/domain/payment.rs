use crate::domain::card::PaymentInput;
use crate::domain::order::PaymentMethod;
use crate::error::{CheckoutError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Approved,
    Rejected,
    Pending,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Approved => "approved",
            PaymentStatus::Rejected => "rejected",
            PaymentStatus::Pending => "pending",
        };
        f.write_str(s)
    }
}

/// A strictly positive amount to charge.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(CheckoutError::InvalidAmount(value))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = CheckoutError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// Purchase data carried from the order step into the card checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub order_id: u64,
    pub preference_id: String,
    pub visit_date: NaiveDate,
    pub total: Decimal,
    pub quantity: usize,
}

/// A payment preference opened with the gateway for a card order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preference {
    pub preference_id: String,
    pub init_point: String,
}

/// Card payment as submitted to the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub card_number: String,
    pub holder_name: String,
    pub expiry_month: u32,
    pub expiry_year: u32,
    pub cvv: String,
    pub amount: Amount,
    pub order_id: Option<u64>,
    pub preference_id: Option<String>,
}

impl PaymentRequest {
    /// Normalizes the form input: whitespace-free card number, trimmed holder name.
    ///
    /// Fails with [`CheckoutError::InvalidAmount`] unless the session total is positive.
    pub fn new(input: &PaymentInput, session: &CheckoutSession) -> Result<Self> {
        Ok(Self {
            card_number: input.digits(),
            holder_name: input.holder_name.trim().to_string(),
            expiry_month: input.expiry_month,
            expiry_year: input.expiry_year,
            cvv: input.cvv.clone(),
            amount: Amount::new(session.total)?,
            order_id: Some(session.order_id),
            preference_id: Some(session.preference_id.clone()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub transaction_id: String,
    pub status: PaymentStatus,
    pub status_detail: String,
    pub payment_method: String,
    pub amount: Decimal,
    pub processed_at: DateTime<Utc>,
    pub message: String,
}

/// What the buyer is told once a purchase goes through.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseConfirmation {
    pub order_id: u64,
    pub visit_date: NaiveDate,
    pub quantity: usize,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    /// Set for card payments only.
    pub transaction_id: Option<String>,
}

impl PurchaseConfirmation {
    /// Confirmation for a card payment approved by the gateway.
    pub fn for_card_payment(session: &CheckoutSession, response: &PaymentResponse) -> Self {
        Self {
            order_id: session.order_id,
            visit_date: session.visit_date,
            quantity: session.quantity,
            total: response.amount,
            payment_method: PaymentMethod::Card,
            transaction_id: Some(response.transaction_id.clone()),
        }
    }
}
