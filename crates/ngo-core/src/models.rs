use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::InventoryError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// An item held at the central warehouse.
///
/// At rest `total_amount` equals `quantity * price` within cent rounding; the
/// price is a weighted average over every restock since the row was created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CentralItem {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub quantity: i64,
    pub price: Decimal,
    pub total_amount: Decimal,
    pub category_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCentralItem {
    pub name: String,
    pub description: Option<String>,
    pub quantity: i64,
    pub price: Decimal,
    pub category_id: Uuid,
}

/// Stock of one central item held by one school. Keyed by `(school_id, item_id)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchoolItem {
    pub school_id: String,
    pub item_id: Uuid,
    pub name: String,
    pub quantity: i64,
    pub price: Decimal,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of a decrementing stock mutation. A row that reaches zero is removed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", content = "item", rename_all = "lowercase")]
pub enum StockOutcome<T> {
    Updated(T),
    Deleted,
}

impl<T> StockOutcome<T> {
    pub fn updated(&self) -> Option<&T> {
        match self {
            Self::Updated(value) => Some(value),
            Self::Deleted => None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = InventoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(InventoryError::validation(format!(
                "type must be income or expense, found {other:?}"
            ))),
        }
    }
}

/// A ledger row. Rows are only ever appended, relabelled during alumni
/// conversion, or deleted by an admin correction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    pub id: Uuid,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    pub school_id: Option<String>,
    pub school_name: Option<String>,
    pub student_id: Option<String>,
    pub item_name: Option<String>,
    pub quantity: Option<i64>,
    pub price: Option<Decimal>,
    pub amount: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated ledger row that has not been persisted yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTransaction {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    pub school_id: Option<String>,
    pub school_name: Option<String>,
    pub student_id: Option<String>,
    pub item_name: Option<String>,
    pub quantity: Option<i64>,
    pub price: Option<Decimal>,
    pub amount: Decimal,
    pub description: Option<String>,
}

impl NewTransaction {
    pub fn into_transaction(self, id: Uuid, now: DateTime<Utc>) -> Transaction {
        Transaction {
            id,
            date: self.date,
            kind: self.kind,
            category: self.category,
            school_id: self.school_id,
            school_name: self.school_name,
            student_id: self.student_id,
            item_name: self.item_name,
            quantity: self.quantity,
            price: self.price,
            amount: self.amount,
            description: self.description,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerFilter {
    pub school_id: Option<String>,
    pub student_id: Option<String>,
}

impl LedgerFilter {
    pub fn school(school_id: impl Into<String>) -> Self {
        Self {
            school_id: Some(school_id.into()),
            student_id: None,
        }
    }

    pub fn student(student_id: impl Into<String>) -> Self {
        Self {
            school_id: None,
            student_id: Some(student_id.into()),
        }
    }

    pub fn matches(&self, transaction: &Transaction) -> bool {
        let school_ok = self
            .school_id
            .as_deref()
            .is_none_or(|id| transaction.school_id.as_deref() == Some(id));
        let student_ok = self
            .student_id
            .as_deref()
            .is_none_or(|id| transaction.student_id.as_deref() == Some(id));
        school_ok && student_ok
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FinanceSummary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net_balance: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PurchaseHistoryRow {
    pub date: NaiveDate,
    pub school_id: Option<String>,
    pub student_id: Option<String>,
    pub item_name: String,
    pub quantity: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PurchaseHistoryFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub student_id: Option<String>,
    pub item_name: Option<String>,
    pub school_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestockCommand {
    pub item_id: Uuid,
    pub quantity_change: i64,
    pub unit_price: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchCommand {
    pub school_id: String,
    pub item_id: Uuid,
    pub quantity: i64,
    /// Unit price booked on the school side; the central price when absent.
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub central_item: StockOutcome<CentralItem>,
    pub school_item: SchoolItem,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleCommand {
    pub school_id: String,
    pub item_id: Uuid,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaleOutcome {
    pub school_item: StockOutcome<SchoolItem>,
    pub ledger_entry: Transaction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_outcome_serializes_with_status_tag() {
        let deleted: StockOutcome<u32> = StockOutcome::Deleted;
        assert_eq!(
            serde_json::to_value(&deleted).unwrap(),
            serde_json::json!({ "status": "deleted" })
        );

        let updated = StockOutcome::Updated(7_u32);
        assert_eq!(
            serde_json::to_value(&updated).unwrap(),
            serde_json::json!({ "status": "updated", "item": 7 })
        );
    }

    #[test]
    fn transaction_type_parses_case_insensitively() {
        assert_eq!(
            " Income ".parse::<TransactionType>().unwrap(),
            TransactionType::Income
        );
        assert!("refund".parse::<TransactionType>().is_err());
    }

    #[test]
    fn ledger_filter_requires_every_supplied_field() {
        let now = Utc::now();
        let row = NewTransaction {
            date: now.date_naive(),
            kind: TransactionType::Income,
            category: "Item Sale".to_string(),
            school_id: Some("S1".to_string()),
            school_name: None,
            student_id: Some("STU-1".to_string()),
            item_name: None,
            quantity: None,
            price: None,
            amount: Decimal::ONE,
            description: None,
        }
        .into_transaction(Uuid::now_v7(), now);

        assert!(LedgerFilter::default().matches(&row));
        assert!(LedgerFilter::school("S1").matches(&row));
        assert!(!LedgerFilter::school("S2").matches(&row));
        assert!(LedgerFilter::student("STU-1").matches(&row));
        let both = LedgerFilter {
            school_id: Some("S1".to_string()),
            student_id: Some("STU-2".to_string()),
        };
        assert!(!both.matches(&row));
    }
}
