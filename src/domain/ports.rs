use super::payment::{PaymentRequest, PaymentResponse, Preference, PurchaseConfirmation};
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_preference(&self, order_id: u64, total: Decimal) -> Result<Preference>;
    async fn process_payment(&self, request: PaymentRequest) -> Result<PaymentResponse>;
    async fn transaction(&self, transaction_id: &str) -> Result<Option<PaymentResponse>>;
}

/// Delivers the purchase confirmation to the buyer.
#[async_trait]
pub trait ConfirmationNotifier: Send + Sync {
    async fn send_confirmation(&self, confirmation: PurchaseConfirmation) -> Result<()>;
}

pub type PaymentGatewayBox = Box<dyn PaymentGateway>;
pub type ConfirmationNotifierBox = Box<dyn ConfirmationNotifier>;
