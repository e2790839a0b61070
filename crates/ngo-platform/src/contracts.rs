use chrono::NaiveDate;
use ngo_core::Transaction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    pub description: Option<String>,
    pub quantity: i64,
    pub price: Decimal,
    pub category_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestockItemRequest {
    /// Signed; negative values remove stock.
    pub quantity_change: i64,
    pub new_price: Decimal,
    pub description: Option<String>,
    /// Books the added units as a purchase expense.
    #[serde(default)]
    pub record_purchase: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub school_id: String,
    pub item_id: Uuid,
    pub name: Option<String>,
    pub quantity: i64,
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellRequest {
    pub school_id: String,
    pub item_id: Uuid,
    pub student_id: String,
    pub quantity: i64,
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustSchoolItemRequest {
    pub quantity: i64,
    pub price: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerQuery {
    pub school_id: Option<String>,
    pub student_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PurchaseHistoryQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub student_id: Option<String>,
    pub item_name: Option<String>,
    pub school_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlumniConversionRequest {
    pub student_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemListResponse<T> {
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerListResponse {
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub deleted: u64,
}
