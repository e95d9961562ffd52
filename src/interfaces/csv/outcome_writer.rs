use crate::domain::card::{CardBrand, FieldFailure, PaymentInput, last_four};
use crate::domain::payment::PaymentResponse;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

/// Result of a single payment attempt, ready to be written as a CSV row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentOutcome {
    pub card: String,
    pub brand: CardBrand,
    pub status: String,
    pub status_detail: String,
    pub transaction_id: String,
}

impl PaymentOutcome {
    pub fn from_response(input: &PaymentInput, response: &PaymentResponse) -> Self {
        Self {
            card: mask(input),
            brand: input.brand(),
            status: response.status.to_string(),
            status_detail: response.status_detail.clone(),
            transaction_id: response.transaction_id.clone(),
        }
    }

    /// An attempt stopped by input validation, before reaching the gateway.
    pub fn invalid(input: &PaymentInput, failure: FieldFailure) -> Self {
        Self {
            card: mask(input),
            brand: input.brand(),
            status: "invalid".to_string(),
            status_detail: failure.to_string(),
            transaction_id: String::new(),
        }
    }
}

fn mask(input: &PaymentInput) -> String {
    format!("****{}", last_four(&input.card_number))
}

pub struct OutcomeWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OutcomeWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_outcome(&mut self, outcome: &PaymentOutcome) -> Result<()> {
        self.writer.serialize(outcome)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::card::{Field, RejectReason};
    use crate::domain::payment::PaymentStatus;
    use rust_decimal_macros::dec;

    fn input() -> PaymentInput {
        PaymentInput {
            card_number: "4509 9535 6623 3704".to_string(),
            holder_name: "JUAN PEREZ".to_string(),
            expiry_month: 12,
            expiry_year: 28,
            cvv: "123".to_string(),
        }
    }

    #[test]
    fn test_writes_header_and_rows() {
        let response = PaymentResponse {
            transaction_id: "TXN-0123456789ABCDEF".to_string(),
            status: PaymentStatus::Approved,
            status_detail: "accredited".to_string(),
            payment_method: "credit_card".to_string(),
            amount: dec!(5000),
            processed_at: chrono::Utc::now(),
            message: "Payment approved".to_string(),
        };
        let failure = FieldFailure {
            field: Field::Cvv,
            reason: RejectReason::InvalidFormat,
        };
        let outcomes = vec![
            PaymentOutcome::from_response(&input(), &response),
            PaymentOutcome::invalid(&input(), failure),
        ];

        let mut buffer = Vec::new();
        {
            let mut writer = OutcomeWriter::new(&mut buffer);
            for outcome in &outcomes {
                writer.write_outcome(outcome).unwrap();
            }
            writer.flush().unwrap();
        }
        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "card,brand,status,status_detail,transaction_id");
        assert_eq!(lines[1], "****3704,visa,approved,accredited,TXN-0123456789ABCDEF");
        assert_eq!(lines[2], "****3704,visa,invalid,cvv: invalid_format,");
    }
}
