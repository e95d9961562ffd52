mod common;

use parkpay::domain::card::{RejectReason, check_card_number, validate_card_number};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn test_generated_luhn_numbers_validate() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..2_000 {
        let len = rng.gen_range(13..=19);
        let number = common::luhn_valid_number(&mut rng, len);
        assert!(validate_card_number(&number), "{} should be valid", number);
    }
}

#[test]
fn test_single_digit_mutation_breaks_checksum() {
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..2_000 {
        let len = rng.gen_range(13..=19);
        let number = common::luhn_valid_number(&mut rng, len);

        let mut digits = number.into_bytes();
        let position = rng.gen_range(0..digits.len());
        let original = digits[position];
        let replacement = loop {
            let candidate = b'0' + rng.gen_range(0..10u8);
            if candidate != original {
                break candidate;
            }
        };
        digits[position] = replacement;
        let mutated = String::from_utf8(digits).unwrap();

        assert_eq!(
            check_card_number(&mutated),
            Err(RejectReason::ChecksumMismatch),
            "{} should fail the checksum",
            mutated
        );
    }
}

#[test]
fn test_luhn_valid_numbers_outside_length_bounds() {
    let mut rng = StdRng::seed_from_u64(7);

    for len in [2, 12, 20, 25] {
        let number = common::luhn_valid_number(&mut rng, len);
        assert_eq!(check_card_number(&number), Err(RejectReason::InvalidLength));
    }
}
