use crate::error::{CheckoutError, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MAX_TICKETS_PER_ORDER: usize = 10;

/// (month, day) pairs on which the park never opens.
const HOLIDAYS: &[(u32, u32)] = &[(12, 25), (1, 1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PassType {
    Regular,
    Vip,
}

impl PassType {
    pub fn price(&self) -> Decimal {
        match self {
            PassType::Regular => dec!(5000),
            PassType::Vip => dec!(10000),
        }
    }
}

impl FromStr for PassType {
    type Err = CheckoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "REGULAR" => Ok(PassType::Regular),
            "VIP" => Ok(PassType::Vip),
            _ => Err(CheckoutError::UnknownPassType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "EFECTIVO")]
    Cash,
    #[serde(rename = "TARJETA")]
    Card,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cash => f.write_str("EFECTIVO"),
            PaymentMethod::Card => f.write_str("TARJETA"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = CheckoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EFECTIVO" | "CASH" => Ok(PaymentMethod::Cash),
            "TARJETA" | "CARD" => Ok(PaymentMethod::Card),
            _ => Err(CheckoutError::UnknownPaymentMethod(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub age: u32,
    pub pass_type: PassType,
}

impl Ticket {
    pub fn new(age: u32, pass_type: PassType) -> Self {
        Self { age, pass_type }
    }

    pub fn price(&self) -> Decimal {
        self.pass_type.price()
    }
}

/// Closed on Mondays, Christmas and New Year's Day.
pub fn is_park_open(date: NaiveDate) -> bool {
    if date.weekday() == Weekday::Mon {
        return false;
    }
    !HOLIDAYS.contains(&(date.month(), date.day()))
}

/// A ticket purchase for a single visit date.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub visit_date: NaiveDate,
    pub tickets: Vec<Ticket>,
    pub payment_method: PaymentMethod,
}

impl Order {
    pub fn new(visit_date: NaiveDate, tickets: Vec<Ticket>, payment_method: PaymentMethod) -> Self {
        Self {
            visit_date,
            tickets,
            payment_method,
        }
    }

    /// Checks the purchase rules against `today`, stopping at the first broken one.
    pub fn validate(&self, today: NaiveDate) -> Result<()> {
        if self.visit_date < today {
            return Err(CheckoutError::VisitDateInPast(self.visit_date));
        }
        if self.tickets.len() > MAX_TICKETS_PER_ORDER {
            return Err(CheckoutError::TooManyTickets {
                count: self.tickets.len(),
                max: MAX_TICKETS_PER_ORDER,
            });
        }
        if self.tickets.is_empty() {
            return Err(CheckoutError::NoTickets);
        }
        if !is_park_open(self.visit_date) {
            return Err(CheckoutError::ParkClosed(self.visit_date));
        }
        Ok(())
    }

    pub fn quantity(&self) -> usize {
        self.tickets.len()
    }

    pub fn total(&self) -> Decimal {
        self.tickets.iter().map(Ticket::price).sum()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TicketForm {
    #[serde(rename = "edad")]
    pub age: u32,
    #[serde(rename = "tipoEntrada")]
    pub pass_type: String,
}

/// Order payload as posted by the purchase form.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderForm {
    #[serde(rename = "fecha")]
    pub visit_date: String,
    #[serde(rename = "entradas")]
    pub tickets: Vec<TicketForm>,
    #[serde(rename = "medioPago")]
    pub payment_method: String,
}

impl TryFrom<OrderForm> for Order {
    type Error = CheckoutError;

    fn try_from(form: OrderForm) -> Result<Self> {
        let visit_date = NaiveDate::parse_from_str(form.visit_date.trim(), "%Y-%m-%d")
            .map_err(|_| CheckoutError::InvalidDate(form.visit_date.clone()))?;
        let tickets = form
            .tickets
            .iter()
            .map(|t| -> Result<Ticket> { Ok(Ticket::new(t.age, t.pass_type.parse()?)) })
            .collect::<Result<Vec<_>>>()?;
        let payment_method = form.payment_method.parse()?;

        Ok(Order::new(visit_date, tickets, payment_method))
    }
}
