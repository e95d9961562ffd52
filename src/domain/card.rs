use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_CARD_DIGITS: usize = 13;
pub const MAX_CARD_DIGITS: usize = 19;
pub const MIN_HOLDER_NAME_CHARS: usize = 3;

/// Issuer classification inferred from the leading digits of a card number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
    Discover,
    Unknown,
}

impl CardBrand {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardBrand::Visa => "visa",
            CardBrand::Mastercard => "mastercard",
            CardBrand::Amex => "amex",
            CardBrand::Discover => "discover",
            CardBrand::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Checked top to bottom, first match wins. Keep the order.
const BRAND_RULES: &[(CardBrand, &[&str])] = &[
    (CardBrand::Visa, &["4"]),
    (CardBrand::Mastercard, &["51", "52", "53", "54", "55"]),
    (CardBrand::Amex, &["34", "37"]),
    (CardBrand::Discover, &["6011", "65"]),
];

/// Payment form fields a single field check can reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    CardNumber,
    Expiry,
    Cvv,
    HolderName,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::CardNumber => "card_number",
            Field::Expiry => "expiry",
            Field::Cvv => "cvv",
            Field::HolderName => "holder_name",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reason code attached to a rejected field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    NotNumeric,
    InvalidLength,
    ChecksumMismatch,
    MonthOutOfRange,
    YearOutOfRange,
    Expired,
    InvalidFormat,
    TooShort,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::NotNumeric => "not_numeric",
            RejectReason::InvalidLength => "invalid_length",
            RejectReason::ChecksumMismatch => "checksum_mismatch",
            RejectReason::MonthOutOfRange => "month_out_of_range",
            RejectReason::YearOutOfRange => "year_out_of_range",
            RejectReason::Expired => "expired",
            RejectReason::InvalidFormat => "invalid_format",
            RejectReason::TooShort => "too_short",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFailure {
    pub field: Field,
    pub reason: RejectReason,
}

impl fmt::Display for FieldFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// A calendar month with a two-digit year, as printed on a card.
///
/// Field order matters: the derived ordering compares the year first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct YearMonth {
    year: u32,
    month: u32,
}

impl YearMonth {
    /// Returns `None` unless `year` has at most two digits and `month` is in 1..=12.
    pub fn new(year: u32, month: u32) -> Option<Self> {
        if year < 100 && (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// Truncates a date to (year mod 100, month).
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year().rem_euclid(100) as u32,
            month: date.month(),
        }
    }

    /// The wall-clock month in the local timezone.
    pub fn current() -> Self {
        Self::from_date(chrono::Local::now().date_naive())
    }

    pub fn year(&self) -> u32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

pub(crate) fn strip_whitespace(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Luhn sum over ASCII digits, doubling every second digit from the right.
fn luhn_sum(digits: &str) -> u32 {
    digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                digit
            }
        })
        .sum()
}

/// Computes the digit that, appended to `payload`, makes it pass the Luhn check.
///
/// Returns `None` if `payload` contains anything other than ASCII digits.
pub fn luhn_check_digit(payload: &str) -> Option<u8> {
    if !payload.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let sum = luhn_sum(&format!("{payload}0"));
    Some(((10 - sum % 10) % 10) as u8)
}

pub fn check_card_number(raw: &str) -> Result<(), RejectReason> {
    let digits = strip_whitespace(raw);
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RejectReason::NotNumeric);
    }
    if !(MIN_CARD_DIGITS..=MAX_CARD_DIGITS).contains(&digits.len()) {
        return Err(RejectReason::InvalidLength);
    }
    if luhn_sum(&digits) % 10 != 0 {
        return Err(RejectReason::ChecksumMismatch);
    }
    Ok(())
}

/// Whitespace is ignored; anything else that is not a digit makes the number invalid.
pub fn validate_card_number(raw: &str) -> bool {
    check_card_number(raw).is_ok()
}

pub fn check_expiry_at(month: u32, year: u32, reference: YearMonth) -> Result<(), RejectReason> {
    if !(1..=12).contains(&month) {
        return Err(RejectReason::MonthOutOfRange);
    }
    let expiry = YearMonth::new(year, month).ok_or(RejectReason::YearOutOfRange)?;
    if expiry < reference {
        return Err(RejectReason::Expired);
    }
    Ok(())
}

/// A card expiring in the reference month is still valid.
pub fn validate_expiry_at(month: u32, year: u32, reference: YearMonth) -> bool {
    check_expiry_at(month, year, reference).is_ok()
}

pub fn validate_expiry(month: u32, year: u32) -> bool {
    validate_expiry_at(month, year, YearMonth::current())
}

pub fn check_cvv(raw: &str) -> Result<(), RejectReason> {
    if raw.bytes().all(|b| b.is_ascii_digit()) && matches!(raw.len(), 3 | 4) {
        Ok(())
    } else {
        Err(RejectReason::InvalidFormat)
    }
}

pub fn validate_cvv(raw: &str) -> bool {
    check_cvv(raw).is_ok()
}

pub fn check_holder_name(raw: &str) -> Result<(), RejectReason> {
    if raw.trim().chars().count() >= MIN_HOLDER_NAME_CHARS {
        Ok(())
    } else {
        Err(RejectReason::TooShort)
    }
}

pub fn validate_holder_name(raw: &str) -> bool {
    check_holder_name(raw).is_ok()
}

pub fn detect_card_brand(digits: &str) -> CardBrand {
    BRAND_RULES
        .iter()
        .find(|(_, prefixes)| prefixes.iter().any(|prefix| digits.starts_with(prefix)))
        .map(|(brand, _)| *brand)
        .unwrap_or(CardBrand::Unknown)
}

/// Groups the number in blocks of four, the way it is shown in the card field.
pub fn format_card_number(raw: &str) -> String {
    let chars: Vec<char> = strip_whitespace(raw).chars().collect();
    chars
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Last four characters of the number with whitespace removed.
pub fn last_four(raw: &str) -> String {
    let digits = strip_whitespace(raw);
    let skip = digits.chars().count().saturating_sub(4);
    digits.chars().skip(skip).collect()
}

/// Raw payment fields as typed into the checkout form.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PaymentInput {
    pub card_number: String,
    pub holder_name: String,
    pub expiry_month: u32,
    pub expiry_year: u32,
    pub cvv: String,
}

impl PaymentInput {
    /// The card number without whitespace.
    pub fn digits(&self) -> String {
        strip_whitespace(&self.card_number)
    }

    pub fn brand(&self) -> CardBrand {
        detect_card_brand(&self.digits())
    }

    /// Runs every field check against `reference` as the current month.
    pub fn validate_at(&self, reference: YearMonth) -> ValidationResult {
        let checks = [
            (Field::CardNumber, check_card_number(&self.card_number)),
            (
                Field::Expiry,
                check_expiry_at(self.expiry_month, self.expiry_year, reference),
            ),
            (Field::Cvv, check_cvv(&self.cvv)),
            (Field::HolderName, check_holder_name(&self.holder_name)),
        ];

        let failures = checks
            .into_iter()
            .filter_map(|(field, outcome)| outcome.err().map(|reason| FieldFailure { field, reason }))
            .collect();

        ValidationResult { failures }
    }

    pub fn validate(&self) -> ValidationResult {
        self.validate_at(YearMonth::current())
    }
}

/// Outcome of validating a [`PaymentInput`].
///
/// Failures are kept in submission order: card number, expiry, CVV, holder name.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValidationResult {
    failures: Vec<FieldFailure>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[FieldFailure] {
        &self.failures
    }

    pub fn first_failure(&self) -> Option<FieldFailure> {
        self.failures.first().copied()
    }

    pub fn reason_for(&self, field: Field) -> Option<RejectReason> {
        self.failures
            .iter()
            .find(|failure| failure.field == field)
            .map(|failure| failure.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(year: u32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    fn sample_input() -> PaymentInput {
        PaymentInput {
            card_number: "4509 9535 6623 3704".to_string(),
            holder_name: "JUAN PEREZ".to_string(),
            expiry_month: 12,
            expiry_year: 28,
            cvv: "123".to_string(),
        }
    }

    #[test]
    fn test_card_number_vectors() {
        assert!(validate_card_number("4509953566233704"));
        assert!(!validate_card_number("4509953566233705"));
    }

    #[test]
    fn test_card_number_ignores_whitespace() {
        assert!(validate_card_number("4509 9535 6623 3704"));
        assert!(validate_card_number(" 4509\t9535 6623 3704 "));
    }

    #[test]
    fn test_card_number_rejection_reasons() {
        assert_eq!(check_card_number("4509-9535-6623-3704"), Err(RejectReason::NotNumeric));
        assert_eq!(check_card_number("45O9953566233704"), Err(RejectReason::NotNumeric));
        assert_eq!(check_card_number(""), Err(RejectReason::InvalidLength));
        // 12 digits, Luhn-valid
        assert_eq!(check_card_number("000000000000"), Err(RejectReason::InvalidLength));
        // 20 digits, Luhn-valid
        assert_eq!(
            check_card_number("00000000000000000000"),
            Err(RejectReason::InvalidLength)
        );
        assert_eq!(
            check_card_number("4509953566233705"),
            Err(RejectReason::ChecksumMismatch)
        );
    }

    #[test]
    fn test_card_number_length_bounds() {
        assert!(validate_card_number("0000000000000"));
        assert!(validate_card_number("0000000000000000000"));
    }

    #[test]
    fn test_luhn_check_digit() {
        assert_eq!(luhn_check_digit("450995356623370"), Some(4));
        assert_eq!(luhn_check_digit("411111111111111"), Some(1));
        assert_eq!(luhn_check_digit("4x"), None);
    }

    #[test]
    fn test_expiry_month_out_of_range() {
        assert!(!validate_expiry(13, 28));
        assert!(!validate_expiry(0, 28));
        assert_eq!(
            check_expiry_at(13, 28, reference(26, 10)),
            Err(RejectReason::MonthOutOfRange)
        );
    }

    #[test]
    fn test_expiry_past_year() {
        assert!(!validate_expiry(1, 20));
        assert_eq!(
            check_expiry_at(1, 20, reference(26, 10)),
            Err(RejectReason::Expired)
        );
    }

    #[test]
    fn test_expiry_against_injected_reference() {
        assert!(validate_expiry_at(12, 28, reference(26, 10)));
        assert!(validate_expiry_at(12, 28, reference(28, 12)));
        assert!(!validate_expiry_at(12, 28, reference(29, 1)));
    }

    #[test]
    fn test_expiry_same_year() {
        let now = reference(26, 10);
        assert!(validate_expiry_at(10, 26, now));
        assert!(validate_expiry_at(11, 26, now));
        assert!(!validate_expiry_at(9, 26, now));
    }

    #[test]
    fn test_expiry_rejects_four_digit_year() {
        assert_eq!(
            check_expiry_at(12, 2028, reference(26, 10)),
            Err(RejectReason::YearOutOfRange)
        );
    }

    #[test]
    fn test_year_month_from_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let ym = YearMonth::from_date(date);
        assert_eq!(ym.year(), 26);
        assert_eq!(ym.month(), 10);
        assert!(YearMonth::new(100, 1).is_none());
        assert!(YearMonth::new(26, 0).is_none());
    }

    #[test]
    fn test_cvv() {
        assert!(!validate_cvv("12"));
        assert!(validate_cvv("123"));
        assert!(validate_cvv("1234"));
        assert!(!validate_cvv("12345"));
        assert!(!validate_cvv("12a"));
        assert!(!validate_cvv(" 123"));
        assert!(!validate_cvv(""));
    }

    #[test]
    fn test_holder_name() {
        assert!(validate_holder_name("JUAN PEREZ"));
        assert!(validate_holder_name("  Ana  "));
        assert!(!validate_holder_name(" Al "));
        assert!(!validate_holder_name(""));
    }

    #[test]
    fn test_detect_card_brand() {
        assert_eq!(detect_card_brand("4509953566233704"), CardBrand::Visa);
        assert_eq!(detect_card_brand("5105105105105100"), CardBrand::Mastercard);
        assert_eq!(detect_card_brand("341111111111111"), CardBrand::Amex);
        assert_eq!(detect_card_brand("378282246310005"), CardBrand::Amex);
        assert_eq!(detect_card_brand("6011111111111117"), CardBrand::Discover);
        assert_eq!(detect_card_brand("6500000000000002"), CardBrand::Discover);
        assert_eq!(detect_card_brand("9999999999999995"), CardBrand::Unknown);
    }

    #[test]
    fn test_detect_card_brand_edges() {
        assert_eq!(detect_card_brand("50"), CardBrand::Unknown);
        assert_eq!(detect_card_brand("56"), CardBrand::Unknown);
        assert_eq!(detect_card_brand("35"), CardBrand::Unknown);
        assert_eq!(detect_card_brand("601"), CardBrand::Unknown);
        assert_eq!(detect_card_brand(""), CardBrand::Unknown);
        assert_eq!(CardBrand::Mastercard.to_string(), "mastercard");
    }

    #[test]
    fn test_format_card_number() {
        assert_eq!(format_card_number("4509953566233704"), "4509 9535 6623 3704");
        assert_eq!(format_card_number("45099 5356"), "4509 9535 6");
        assert_eq!(format_card_number(""), "");
    }

    #[test]
    fn test_last_four() {
        assert_eq!(last_four("4509 9535 6623 3704"), "3704");
        assert_eq!(last_four("12"), "12");
    }

    #[test]
    fn test_payment_input_valid() {
        let result = sample_input().validate_at(reference(26, 10));
        assert!(result.is_valid());
        assert_eq!(result.first_failure(), None);
        assert_eq!(sample_input().brand(), CardBrand::Visa);
    }

    #[test]
    fn test_payment_input_reports_every_field_in_order() {
        let input = PaymentInput {
            card_number: "4509953566233705".to_string(),
            holder_name: "AB".to_string(),
            expiry_month: 1,
            expiry_year: 20,
            cvv: "12".to_string(),
        };

        let result = input.validate_at(reference(26, 10));
        assert!(!result.is_valid());
        let fields: Vec<Field> = result.failures().iter().map(|f| f.field).collect();
        assert_eq!(
            fields,
            vec![Field::CardNumber, Field::Expiry, Field::Cvv, Field::HolderName]
        );
        assert_eq!(result.reason_for(Field::Expiry), Some(RejectReason::Expired));
        assert_eq!(
            result.first_failure().unwrap().to_string(),
            "card_number: checksum_mismatch"
        );
    }
}
