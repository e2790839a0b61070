use ngo_core::{
    CentralItem, InventoryError, InventoryResult, SchoolItem, StockOutcome, ensure_unit_price,
    line_amount, round2,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Quantity and valuation of one item at one location.
///
/// Every transition keeps `total_amount` as the running stock value and
/// derives `price` from it, so restocks at a new cost blend into a weighted
/// average instead of overwriting the old price.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockPosition {
    pub quantity: i64,
    pub price: Decimal,
    pub total_amount: Decimal,
}

impl StockPosition {
    pub fn opening(quantity: i64, price: Decimal) -> InventoryResult<Self> {
        if quantity <= 0 {
            return Err(InventoryError::InvalidQuantity(
                "opening quantity must be positive".to_string(),
            ));
        }
        ensure_unit_price(price)?;

        Ok(Self {
            quantity,
            price,
            total_amount: line_amount(quantity, price)?,
        })
    }

    /// Applies a signed quantity change valued at `unit_price`.
    pub fn restock(
        &self,
        quantity_change: i64,
        unit_price: Decimal,
    ) -> InventoryResult<StockOutcome<Self>> {
        ensure_unit_price(unit_price)?;

        let new_quantity = self.add_units(quantity_change)?;
        if new_quantity < 0 {
            return Err(InventoryError::InvalidQuantity(format!(
                "quantity can't be negative: {} on hand, change of {quantity_change}",
                self.quantity
            )));
        }
        if new_quantity == 0 {
            return Ok(StockOutcome::Deleted);
        }

        let new_total = self.add_value(quantity_change, unit_price)?;
        if new_total <= Decimal::ZERO {
            return Err(InventoryError::validation(format!(
                "removing {} units at {unit_price} would leave a stock value of {new_total}",
                quantity_change.unsigned_abs()
            )));
        }

        Ok(StockOutcome::Updated(Self {
            quantity: new_quantity,
            price: round2(new_total / Decimal::from(new_quantity)),
            total_amount: new_total,
        }))
    }

    /// Takes `quantity` units out at the current average price.
    pub fn withdraw(&self, quantity: i64) -> InventoryResult<StockOutcome<Self>> {
        if quantity <= 0 {
            return Err(InventoryError::InvalidQuantity(
                "quantity must be positive".to_string(),
            ));
        }
        if quantity > self.quantity {
            return Err(InventoryError::InsufficientStock {
                requested: quantity,
                available: self.quantity,
            });
        }
        if quantity == self.quantity {
            return Ok(StockOutcome::Deleted);
        }

        self.restock(-quantity, self.price)
    }

    /// Adds incoming units priced at `price` into an existing position.
    pub fn merge(&self, quantity: i64, price: Decimal) -> InventoryResult<Self> {
        if quantity <= 0 {
            return Err(InventoryError::InvalidQuantity(
                "quantity must be positive".to_string(),
            ));
        }
        ensure_unit_price(price)?;

        let new_quantity = self.add_units(quantity)?;
        let new_total = self.add_value(quantity, price)?;

        Ok(Self {
            quantity: new_quantity,
            price: round2(new_total / Decimal::from(new_quantity)),
            total_amount: new_total,
        })
    }

    /// Overwrites the position with an absolute quantity and unit price.
    pub fn adjust(quantity: i64, price: Decimal) -> InventoryResult<StockOutcome<Self>> {
        if quantity < 0 {
            return Err(InventoryError::InvalidQuantity(
                "quantity can't be negative".to_string(),
            ));
        }
        if quantity == 0 {
            return Ok(StockOutcome::Deleted);
        }
        ensure_unit_price(price)?;

        Ok(StockOutcome::Updated(Self {
            quantity,
            price,
            total_amount: line_amount(quantity, price)?,
        }))
    }

    /// `total_amount == quantity * price` up to the half-cent lost when the
    /// average price is rounded.
    pub fn holds_invariant(&self) -> bool {
        let quantity = Decimal::from(self.quantity);
        let expected = quantity.checked_mul(self.price);
        let tolerance = Decimal::new(5, 3)
            .checked_mul(quantity)
            .and_then(|value| value.checked_add(Decimal::new(1, 2)));
        match (expected, tolerance) {
            (Some(expected), Some(tolerance)) => {
                (self.total_amount - expected).abs() <= tolerance
            }
            _ => false,
        }
    }

    fn add_units(&self, change: i64) -> InventoryResult<i64> {
        self.quantity.checked_add(change).ok_or_else(|| {
            InventoryError::InvalidQuantity(format!(
                "quantity out of range: {} on hand, change of {change}",
                self.quantity
            ))
        })
    }

    fn add_value(&self, change: i64, unit_price: Decimal) -> InventoryResult<Decimal> {
        line_amount(change, unit_price)?
            .checked_add(self.total_amount)
            .map(round2)
            .ok_or_else(|| {
                InventoryError::validation(format!(
                    "stock value out of range: {} plus {change} x {unit_price}",
                    self.total_amount
                ))
            })
    }
}

impl From<&CentralItem> for StockPosition {
    fn from(item: &CentralItem) -> Self {
        Self {
            quantity: item.quantity,
            price: item.price,
            total_amount: item.total_amount,
        }
    }
}

impl From<&SchoolItem> for StockPosition {
    fn from(item: &SchoolItem) -> Self {
        Self {
            quantity: item.quantity,
            price: item.price,
            total_amount: item.total_amount,
        }
    }
}
