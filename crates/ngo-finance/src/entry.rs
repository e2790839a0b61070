use std::str::FromStr;

use chrono::NaiveDate;
use ngo_core::{
    InventoryError, InventoryResult, NewTransaction, TransactionType, ensure_unit_price,
    line_amount, round2,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SALE_CATEGORY: &str = "Item Sale";
pub const PURCHASE_CATEGORY: &str = "consumables";

/// A ledger entry as submitted by an admin, before validation.
///
/// `quantity` and `price` are kept as raw JSON so a non-numeric value is
/// reported as a validation failure instead of a decode error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerEntryRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category: Option<String>,
    pub amount: Option<Decimal>,
    pub date: Option<NaiveDate>,
    pub school_id: Option<String>,
    pub student_id: Option<String>,
    pub item_name: Option<String>,
    pub quantity: Option<Value>,
    pub price: Option<Value>,
    pub description: Option<String>,
}

impl LedgerEntryRequest {
    pub fn validate(self) -> InventoryResult<NewTransaction> {
        let (Some(kind), Some(category), Some(amount), Some(date)) = (
            non_empty(self.kind),
            non_empty(self.category),
            self.amount,
            self.date,
        ) else {
            return Err(InventoryError::validation(
                "type, category, amount, date are required",
            ));
        };

        let kind = TransactionType::from_str(&kind)?;
        if amount <= Decimal::ZERO {
            return Err(InventoryError::validation("amount must be positive"));
        }

        let quantity = self.quantity.map(parse_quantity).transpose()?;
        let price = self.price.map(parse_price).transpose()?;
        if let (Some(quantity), Some(price)) = (quantity, price) {
            let expected = line_amount(quantity, price)?;
            if round2(amount) != expected {
                return Err(InventoryError::validation(format!(
                    "amount {amount} does not match quantity {quantity} x price {price}"
                )));
            }
        }

        Ok(NewTransaction {
            date,
            kind,
            category,
            school_id: non_empty(self.school_id),
            school_name: None,
            student_id: non_empty(self.student_id),
            item_name: non_empty(self.item_name),
            quantity,
            price,
            amount: round2(amount),
            description: non_empty(self.description),
        })
    }
}

/// Income entry for items sold from a school's stock to a student.
pub fn sale_entry(
    date: NaiveDate,
    school_id: &str,
    student_id: &str,
    item_name: &str,
    quantity: i64,
    price: Decimal,
) -> InventoryResult<NewTransaction> {
    Ok(NewTransaction {
        date,
        kind: TransactionType::Income,
        category: SALE_CATEGORY.to_string(),
        school_id: Some(school_id.to_string()),
        school_name: None,
        student_id: Some(student_id.to_string()),
        item_name: Some(item_name.to_string()),
        quantity: Some(quantity),
        price: Some(price),
        amount: line_amount(quantity, price)?,
        description: Some(format!(
            "Sold {quantity} of {item_name} to student {student_id}"
        )),
    })
}

/// Expense entry for stock bought into the central warehouse.
pub fn purchase_entry(
    date: NaiveDate,
    item_name: &str,
    quantity: i64,
    price: Decimal,
) -> InventoryResult<NewTransaction> {
    Ok(NewTransaction {
        date,
        kind: TransactionType::Expense,
        category: PURCHASE_CATEGORY.to_string(),
        school_id: None,
        school_name: None,
        student_id: None,
        item_name: Some(item_name.to_string()),
        quantity: Some(quantity),
        price: Some(price),
        amount: line_amount(quantity, price)?,
        description: Some("Item added to central inventory".to_string()),
    })
}

fn parse_quantity(value: Value) -> InventoryResult<i64> {
    let quantity = value
        .as_i64()
        .ok_or_else(|| InventoryError::validation("quantity must be a number"))?;
    if quantity <= 0 {
        return Err(InventoryError::validation("quantity must be positive"));
    }
    Ok(quantity)
}

fn parse_price(value: Value) -> InventoryResult<Decimal> {
    let Value::Number(number) = value else {
        return Err(InventoryError::validation("price must be a number"));
    };
    let price = Decimal::from_str(&number.to_string())
        .or_else(|_| Decimal::from_scientific(&number.to_string()))
        .map_err(|_| InventoryError::validation("price must be a number"))?;
    ensure_unit_price(price)?;
    Ok(price)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn request(body: Value) -> LedgerEntryRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn required_fields_are_enforced() {
        let err = request(json!({ "type": "income", "category": "fees", "amount": "10" }))
            .validate()
            .unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)));

        let err = request(json!({
            "type": "income", "category": "  ", "amount": "10", "date": "2024-05-01"
        }))
        .validate()
        .unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = request(json!({
            "type": "refund", "category": "fees", "amount": "10", "date": "2024-05-01"
        }))
        .validate()
        .unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)));
    }

    #[test]
    fn non_numeric_quantity_is_a_validation_error() {
        let err = request(json!({
            "type": "income", "category": "Item Sale", "amount": "10",
            "date": "2024-05-01", "quantity": "two"
        }))
        .validate()
        .unwrap_err();
        assert_eq!(
            err,
            InventoryError::validation("quantity must be a number")
        );

        let err = request(json!({
            "type": "income", "category": "Item Sale", "amount": "10",
            "date": "2024-05-01", "price": "5"
        }))
        .validate()
        .unwrap_err();
        assert_eq!(err, InventoryError::validation("price must be a number"));
    }

    #[test]
    fn amount_must_match_item_fields() {
        let err = request(json!({
            "type": "income", "category": "Item Sale", "amount": "61",
            "date": "2024-05-01", "quantity": 5, "price": 12
        }))
        .validate()
        .unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)));

        let entry = request(json!({
            "type": "income", "category": "Item Sale", "amount": "60",
            "date": "2024-05-01", "quantity": 5, "price": 12.0,
            "school_id": "S1", "student_id": " STU-1 ", "item_name": "Notebook",
            "description": ""
        }))
        .validate()
        .unwrap();
        assert_eq!(entry.kind, TransactionType::Income);
        assert_eq!(entry.student_id.as_deref(), Some("STU-1"));
        assert_eq!(entry.price, Some(Decimal::from(12)));
        assert_eq!(entry.description, None);
        assert_eq!(entry.school_name, None);
    }

    #[test]
    fn sale_entry_amount_is_quantity_times_price() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let entry = sale_entry(date, "S1", "STU-1", "Notebook", 5, Decimal::from(12)).unwrap();
        assert_eq!(entry.amount, Decimal::from(60));
        assert_eq!(entry.kind, TransactionType::Income);
        assert_eq!(entry.category, SALE_CATEGORY);

        let entry = purchase_entry(date, "Notebook", 100, Decimal::from(10)).unwrap();
        assert_eq!(entry.amount, Decimal::from(1000));
        assert_eq!(entry.kind, TransactionType::Expense);
    }

    #[test]
    fn oversized_entries_are_validation_errors() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let price = Decimal::from(1_000_000_000_000_i64);

        let err = sale_entry(date, "S1", "STU-1", "Notebook", i64::MAX, price).unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)));
        let err = purchase_entry(date, "Notebook", i64::MAX, price).unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)));

        let err = request(json!({
            "type": "income", "category": "Item Sale", "amount": "10",
            "date": "2024-05-01", "quantity": i64::MAX, "price": 1_000_000_000_000_i64
        }))
        .validate()
        .unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)));
    }

    #[test]
    fn ledger_price_is_limited_to_cents() {
        let err = request(json!({
            "type": "income", "category": "Item Sale", "amount": "61.73",
            "date": "2024-05-01", "quantity": 5, "price": 12.345
        }))
        .validate()
        .unwrap_err();
        assert_eq!(
            err,
            InventoryError::validation("price must have at most 2 decimal places")
        );
    }
}
