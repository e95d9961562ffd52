use crate::domain::payment::PurchaseConfirmation;
use crate::domain::ports::ConfirmationNotifier;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

pub const CONFIRMATION_SUBJECT: &str = "Purchase confirmation - Theme park";

/// A rendered confirmation message.
#[derive(Debug, Clone, PartialEq)]
pub struct SentConfirmation {
    pub order_id: u64,
    pub subject: String,
    pub body: String,
}

/// Plain-text body with visit date, ticket count and total.
pub fn render_body(confirmation: &PurchaseConfirmation) -> String {
    let mut body = format!(
        "Thank you for your purchase!\n\n\
         {}\n\
         ========================================\n\n\
         Order: {}\n\
         Visit date: {}\n\
         Tickets: {}\n\
         Payment method: {}\n",
        CONFIRMATION_SUBJECT,
        confirmation.order_id,
        confirmation.visit_date.format("%d/%m/%Y"),
        confirmation.quantity,
        confirmation.payment_method,
    );
    if let Some(transaction_id) = &confirmation.transaction_id {
        body.push_str(&format!("Transaction: {}\n", transaction_id));
    }
    body.push_str(&format!("\nTOTAL: ${}\n", confirmation.total));
    body.push_str("\nSee you at the park!\n");
    body
}

/// Keeps every confirmation in memory instead of delivering it.
///
/// Clones share the same outbox, so a test can hold one handle while the
/// checkout service owns another.
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    outbox: Arc<RwLock<Vec<SentConfirmation>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<SentConfirmation> {
        self.outbox.read().await.clone()
    }
}

#[async_trait]
impl ConfirmationNotifier for RecordingNotifier {
    async fn send_confirmation(&self, confirmation: PurchaseConfirmation) -> Result<()> {
        let message = SentConfirmation {
            order_id: confirmation.order_id,
            subject: CONFIRMATION_SUBJECT.to_string(),
            body: render_body(&confirmation),
        };
        tracing::info!(order_id = message.order_id, "purchase confirmation recorded");

        let mut outbox = self.outbox.write().await;
        outbox.push(message);
        Ok(())
    }
}
