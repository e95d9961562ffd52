use parkpay::domain::card::luhn_check_digit;
use rand::Rng;
use std::io::{Error, Write};
use tempfile::NamedTempFile;

/// Random digit string of `len` digits whose last digit satisfies the Luhn check.
#[allow(dead_code)]
pub fn luhn_valid_number<R: Rng>(rng: &mut R, len: usize) -> String {
    let payload: String = (0..len - 1)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect();
    let check = luhn_check_digit(&payload).expect("payload is all digits");
    format!("{}{}", payload, check)
}

/// Writes payment attempt rows (without header) to a temporary CSV file.
#[allow(dead_code)]
pub fn attempts_file(rows: &[&str]) -> Result<NamedTempFile, Error> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "card_number,holder_name,expiry_month,expiry_year,cvv,amount")?;
    for row in rows {
        writeln!(file, "{}", row)?;
    }
    file.flush()?;
    Ok(file)
}
