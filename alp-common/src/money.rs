//! Fixed-point monetary and fraction helpers
//!
//! Money carries 2 fractional digits (centavos) and is persisted as integer
//! centavos. Split fractions carry at most 4 fractional digits and are
//! persisted as canonical decimal text.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::{Error, Result};

/// Fractional digits of a monetary amount
pub const MONEY_SCALE: u32 = 2;

/// Fractional digits allowed in a split fraction (0.01 % steps)
pub const FRACTION_SCALE: u32 = 4;

/// Validate a monetary amount and bring it to exactly [`MONEY_SCALE`] digits
pub fn normalize_amount(amount: Decimal, field: &str) -> Result<Decimal> {
    let normalized = amount.normalize();
    if normalized.scale() > MONEY_SCALE {
        return Err(Error::InvalidInput(format!(
            "{} has more than {} fractional digits: {}",
            field, MONEY_SCALE, amount
        )));
    }
    let mut fixed = normalized;
    fixed.rescale(MONEY_SCALE);
    // rescale keeps a lower scale when the mantissa has no room left
    if fixed.scale() != MONEY_SCALE {
        return Err(Error::InvalidInput(format!("{} is out of range: {}", field, amount)));
    }
    Ok(fixed)
}

/// Validate a split fraction: within [0,1] and at most [`FRACTION_SCALE`] digits
pub fn normalize_fraction(fraction: Decimal, field: &str) -> Result<Decimal> {
    if fraction < Decimal::ZERO || fraction > Decimal::ONE {
        return Err(Error::InvalidInput(format!(
            "{} must be within [0, 1], got {}",
            field, fraction
        )));
    }
    let normalized = fraction.normalize();
    if normalized.scale() > FRACTION_SCALE {
        return Err(Error::InvalidInput(format!(
            "{} has more than {} fractional digits: {}",
            field, FRACTION_SCALE, fraction
        )));
    }
    Ok(normalized)
}

/// Convert an amount to integer centavos for storage
pub fn to_cents(amount: Decimal) -> Result<i64> {
    let fixed = normalize_amount(amount, "amount")?;
    fixed
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.to_i64())
        .ok_or_else(|| Error::InvalidInput(format!("amount out of range: {}", amount)))
}

/// Convert stored integer centavos back to an amount
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, MONEY_SCALE)
}

/// Parse a stored fraction column
pub fn fraction_from_db(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw).map_err(|e| Error::Persistence(sqlx::Error::Decode(Box::new(e))))
}

/// Render a fraction for storage
pub fn fraction_to_db(fraction: Decimal) -> String {
    fraction.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_normalize_amount_pads_to_centavos() {
        let amount = normalize_amount(d("1000"), "base_price").unwrap();
        assert_eq!(amount.to_string(), "1000.00");
        assert_eq!(normalize_amount(d("12.5000"), "x").unwrap().to_string(), "12.50");
    }

    #[test]
    fn test_normalize_amount_rejects_sub_centavo() {
        let err = normalize_amount(d("10.001"), "base_price").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_normalize_fraction_bounds() {
        assert!(normalize_fraction(d("0"), "f").is_ok());
        assert!(normalize_fraction(d("1"), "f").is_ok());
        assert!(normalize_fraction(d("0.1234"), "f").is_ok());
        assert!(matches!(normalize_fraction(d("1.0001"), "f"), Err(Error::InvalidInput(_))));
        assert!(matches!(normalize_fraction(d("-0.1"), "f"), Err(Error::InvalidInput(_))));
        assert!(matches!(normalize_fraction(d("0.12345"), "f"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_cents_conversion() {
        assert_eq!(to_cents(d("1000.00")).unwrap(), 100_000);
        assert_eq!(to_cents(d("0.07")).unwrap(), 7);
        assert_eq!(from_cents(70_000), d("700.00"));
        assert_eq!(from_cents(70_000).to_string(), "700.00");
    }

    #[test]
    fn test_amounts_beyond_storage_range_are_rejected() {
        assert!(matches!(normalize_amount(Decimal::MAX, "base_price"), Err(Error::InvalidInput(_))));
        assert!(matches!(to_cents(Decimal::MAX), Err(Error::InvalidInput(_))));
        assert!(matches!(
            to_cents(d("79228162514264337593543950335")),
            Err(Error::InvalidInput(_))
        ));
        // Fits a Decimal at scale 2 but not i64 centavos
        assert!(matches!(to_cents(d("100000000000000000000.00")), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_fraction_db_text_is_canonical() {
        assert_eq!(fraction_to_db(d("0.7000")), "0.7");
        assert_eq!(fraction_from_db("0.7").unwrap(), d("0.70"));
        assert!(fraction_from_db("seventy").is_err());
    }
}
