use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{InventoryError, InventoryResult};

/// Rounds a money value to two decimal places, half away from zero.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `quantity * price` rounded to cents, or a validation error when the
/// product does not fit a `Decimal`.
pub fn line_amount(quantity: i64, price: Decimal) -> InventoryResult<Decimal> {
    Decimal::from(quantity)
        .checked_mul(price)
        .map(round2)
        .ok_or_else(|| {
            InventoryError::validation(format!("{quantity} x {price} is out of range"))
        })
}

/// Unit prices are positive and carry at most two decimal places.
pub fn ensure_unit_price(price: Decimal) -> InventoryResult<()> {
    if price <= Decimal::ZERO {
        return Err(InventoryError::validation("price must be positive"));
    }
    if price.normalize().scale() > 2 {
        return Err(InventoryError::validation(
            "price must have at most 2 decimal places",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midpoints_round_away_from_zero() {
        assert_eq!(round2(Decimal::new(1005, 3)), Decimal::new(101, 2));
        assert_eq!(round2(Decimal::new(1015, 3)), Decimal::new(102, 2));
        assert_eq!(round2(Decimal::new(-1005, 3)), Decimal::new(-101, 2));
    }

    #[test]
    fn thirds_are_truncated_to_cents() {
        let value = Decimal::from(100) / Decimal::from(3);
        assert_eq!(round2(value), Decimal::new(3333, 2));
    }

    #[test]
    fn line_amount_reports_overflow_instead_of_panicking() {
        assert_eq!(line_amount(5, Decimal::new(12, 0)), Ok(Decimal::from(60)));

        let err = line_amount(i64::MAX, Decimal::from(1_000_000_000_000_i64)).unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)));
    }

    #[test]
    fn unit_price_allows_cents_only() {
        assert!(ensure_unit_price(Decimal::new(1234, 2)).is_ok());
        assert!(ensure_unit_price(Decimal::new(12340, 3)).is_ok());
        assert_eq!(
            ensure_unit_price(Decimal::new(12345, 3)),
            Err(InventoryError::validation(
                "price must have at most 2 decimal places"
            ))
        );
        assert_eq!(
            ensure_unit_price(Decimal::ZERO),
            Err(InventoryError::validation("price must be positive"))
        );
    }
}
