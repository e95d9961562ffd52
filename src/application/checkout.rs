use crate::domain::card::{PaymentInput, YearMonth};
use crate::domain::order::{Order, PaymentMethod};
use crate::domain::payment::{
    CheckoutSession, PaymentRequest, PaymentResponse, PaymentStatus, PurchaseConfirmation,
};
use crate::domain::ports::{ConfirmationNotifierBox, PaymentGatewayBox};
use crate::error::{CheckoutError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};

/// Result of placing an order.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// Cash orders are settled at the gate; nothing else to do.
    Completed {
        order_id: u64,
        total: Decimal,
        quantity: usize,
    },
    /// Card orders continue on the card checkout page.
    Redirect {
        session: CheckoutSession,
        checkout_url: String,
    },
}

/// Drives a purchase from the order form to the card payment.
///
/// The service holds no purchase state of its own: the data a card payment
/// needs travels in the [`CheckoutSession`] returned by [`place_order`].
///
/// [`place_order`]: CheckoutService::place_order
pub struct CheckoutService {
    gateway: PaymentGatewayBox,
    notifier: ConfirmationNotifierBox,
    next_order_id: AtomicU64,
}

impl CheckoutService {
    pub fn new(gateway: PaymentGatewayBox, notifier: ConfirmationNotifierBox) -> Self {
        Self {
            gateway,
            notifier,
            next_order_id: AtomicU64::new(1),
        }
    }

    /// A failed confirmation never undoes the purchase; it is only logged.
    async fn confirm(&self, confirmation: PurchaseConfirmation) {
        let order_id = confirmation.order_id;
        if let Err(e) = self.notifier.send_confirmation(confirmation).await {
            tracing::warn!(order_id, error = %e, "purchase confirmation not sent");
        }
    }

    /// Validates the order against `today` and, for card orders, opens a
    /// payment preference with the gateway.
    pub async fn place_order(&self, order: &Order, today: NaiveDate) -> Result<CheckoutOutcome> {
        order.validate(today)?;

        let order_id = self.next_order_id.fetch_add(1, Ordering::Relaxed);
        let total = order.total();
        let quantity = order.quantity();
        tracing::info!(order_id, %total, quantity, visit_date = %order.visit_date, "order accepted");

        match order.payment_method {
            PaymentMethod::Cash => {
                self.confirm(PurchaseConfirmation {
                    order_id,
                    visit_date: order.visit_date,
                    quantity,
                    total,
                    payment_method: PaymentMethod::Cash,
                    transaction_id: None,
                })
                .await;
                Ok(CheckoutOutcome::Completed {
                    order_id,
                    total,
                    quantity,
                })
            }
            PaymentMethod::Card => {
                let preference = self.gateway.create_preference(order_id, total).await?;
                Ok(CheckoutOutcome::Redirect {
                    session: CheckoutSession {
                        order_id,
                        preference_id: preference.preference_id,
                        visit_date: order.visit_date,
                        total,
                        quantity,
                    },
                    checkout_url: preference.init_point,
                })
            }
        }
    }

    /// Submits a card payment for `session`.
    ///
    /// The input is validated first. The first failing field, in form order,
    /// is returned as [`CheckoutError::InvalidPayment`] and the gateway is not
    /// contacted. A confirmation is sent only when the gateway approves.
    pub async fn submit_payment(
        &self,
        session: &CheckoutSession,
        input: &PaymentInput,
        reference: YearMonth,
    ) -> Result<PaymentResponse> {
        let validation = input.validate_at(reference);
        if let Some(failure) = validation.first_failure() {
            tracing::warn!(order_id = session.order_id, %failure, "payment input rejected");
            return Err(CheckoutError::InvalidPayment(failure));
        }

        let request = PaymentRequest::new(input, session)?;
        let response = self.gateway.process_payment(request).await?;
        if response.status == PaymentStatus::Approved {
            self.confirm(PurchaseConfirmation::for_card_payment(session, &response))
                .await;
        }
        Ok(response)
    }

    pub async fn transaction(&self, transaction_id: &str) -> Result<Option<PaymentResponse>> {
        self.gateway.transaction(transaction_id).await
    }
}
