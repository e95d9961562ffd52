use crate::domain::card::{
    YearMonth, check_card_number, check_cvv, check_expiry_at, strip_whitespace,
};
use crate::domain::payment::{Amount, PaymentRequest, PaymentResponse, PaymentStatus, Preference};
use crate::domain::ports::PaymentGateway;
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Sandbox cards that are always approved.
pub const APPROVED_CARDS: &[&str] = &["4509953566233704", "5031433215406351", "3711803032594270"];
/// Sandbox cards that are always rejected for insufficient funds.
pub const REJECTED_CARDS: &[&str] = &["4111111111111111", "5555555555554444"];
/// Sandbox cards that stay pending authorization.
pub const PENDING_CARDS: &[&str] = &["4000000000000002"];

const PAYMENT_METHOD: &str = "credit_card";

/// An in-memory stand-in for the card processor.
///
/// Re-validates the card fields, then decides the outcome from the sandbox
/// card lists. Cards not listed anywhere are approved. Every response is kept
/// in a shared log so it can be looked up by transaction id.
#[derive(Default, Clone)]
pub struct SimulatedGateway {
    transactions: Arc<RwLock<HashMap<String, PaymentResponse>>>,
    latency: Duration,
    reference: Option<YearMonth>,
}

impl SimulatedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every payment by `latency` before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Pins the month used for expiry checks instead of the wall clock.
    pub fn with_reference(mut self, reference: YearMonth) -> Self {
        self.reference = Some(reference);
        self
    }

    fn reference(&self) -> YearMonth {
        self.reference.unwrap_or_else(YearMonth::current)
    }

    fn decide(&self, request: &PaymentRequest) -> (PaymentStatus, &'static str, &'static str) {
        let digits = strip_whitespace(&request.card_number);
        let card = digits.as_str();

        if check_card_number(card).is_err() {
            return (
                PaymentStatus::Rejected,
                "invalid_card_number",
                "Payment rejected: invalid card number",
            );
        }
        if check_cvv(&request.cvv).is_err() {
            return (PaymentStatus::Rejected, "invalid_cvv", "Payment rejected: invalid CVV");
        }
        if check_expiry_at(request.expiry_month, request.expiry_year, self.reference()).is_err() {
            return (PaymentStatus::Rejected, "card_expired", "Payment rejected: card expired");
        }

        if APPROVED_CARDS.contains(&card) {
            (PaymentStatus::Approved, "accredited", "Payment approved")
        } else if REJECTED_CARDS.contains(&card) {
            (
                PaymentStatus::Rejected,
                "insufficient_funds",
                "Payment rejected: insufficient funds",
            )
        } else if PENDING_CARDS.contains(&card) {
            (
                PaymentStatus::Pending,
                "pending_authorization",
                "Payment pending authorization",
            )
        } else {
            (PaymentStatus::Approved, "accredited", "Payment approved")
        }
    }
}

fn generate_id(prefix: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, hex[..16].to_uppercase())
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn create_preference(&self, order_id: u64, total: Decimal) -> Result<Preference> {
        let preference_id = generate_id("PREF");
        let init_point = format!(
            "/pago-mercadopago?preference_id={}&compra_id={}",
            preference_id, order_id
        );
        tracing::debug!(%preference_id, order_id, %total, "created payment preference");

        Ok(Preference {
            preference_id,
            init_point,
        })
    }

    async fn process_payment(&self, request: PaymentRequest) -> Result<PaymentResponse> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let (status, detail, message) = self.decide(&request);
        let response = PaymentResponse {
            transaction_id: generate_id("TXN"),
            status,
            status_detail: detail.to_string(),
            payment_method: PAYMENT_METHOD.to_string(),
            amount: request.amount.value(),
            processed_at: chrono::Utc::now(),
            message: message.to_string(),
        };
        tracing::info!(
            transaction_id = %response.transaction_id,
            %status,
            detail,
            amount = %request.amount.value(),
            "processed card payment"
        );

        let mut transactions = self.transactions.write().await;
        transactions.insert(response.transaction_id.clone(), response.clone());
        Ok(response)
    }

    async fn transaction(&self, transaction_id: &str) -> Result<Option<PaymentResponse>> {
        let transactions = self.transactions.read().await;
        Ok(transactions.get(transaction_id).cloned())
    }
}
