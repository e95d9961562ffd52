use crate::domain::card::FieldFailure;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Invalid payment input: {0}")]
    InvalidPayment(FieldFailure),
    #[error("The visit date {0} is in the past")]
    VisitDateInPast(NaiveDate),
    #[error("Cannot buy more than {max} tickets (got {count})")]
    TooManyTickets { count: usize, max: usize },
    #[error("No tickets were added to the order")]
    NoTickets,
    #[error("The park is closed on {0}")]
    ParkClosed(NaiveDate),
    #[error("Unknown pass type: {0}")]
    UnknownPassType(String),
    #[error("Unknown payment method: {0}")]
    UnknownPaymentMethod(String),
    #[error("Amount must be positive (got {0})")]
    InvalidAmount(rust_decimal::Decimal),
    #[error("Could not send purchase confirmation: {0}")]
    NotificationError(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

pub type Result<T> = std::result::Result<T, CheckoutError>;
