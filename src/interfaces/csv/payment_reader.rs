use crate::domain::card::PaymentInput;
use crate::error::{CheckoutError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// One row of a payment attempts file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentAttempt {
    pub card_number: String,
    pub holder_name: String,
    pub expiry_month: u32,
    pub expiry_year: u32,
    pub cvv: String,
    pub amount: Option<Decimal>,
}

impl PaymentAttempt {
    pub fn input(&self) -> PaymentInput {
        PaymentInput {
            card_number: self.card_number.clone(),
            holder_name: self.holder_name.clone(),
            expiry_month: self.expiry_month,
            expiry_year: self.expiry_year,
            cvv: self.cvv.clone(),
        }
    }
}

/// Reads payment attempts from a CSV source.
///
/// Only the delimiters are trimmed, not the values: a card number typed as
/// `4509 9535 6623 3704` reaches the validator as is.
pub struct PaymentAttemptReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> PaymentAttemptReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes attempts; a malformed row yields an error and the
    /// following rows are still read.
    pub fn attempts(self) -> impl Iterator<Item = Result<PaymentAttempt>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(CheckoutError::from))
    }
}
