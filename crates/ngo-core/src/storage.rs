use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::InventoryResult;
use crate::models::{
    Category, CategoryUpdate, CentralItem, DispatchCommand, DispatchOutcome, LedgerFilter,
    NewCategory, NewCentralItem, NewTransaction, RestockCommand, SaleCommand, SaleOutcome,
    SchoolItem, StockOutcome, Transaction,
};

#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn create_category(&self, category: NewCategory) -> InventoryResult<Category>;
    async fn get_category(&self, id: Uuid) -> InventoryResult<Option<Category>>;
    async fn list_categories(&self) -> InventoryResult<Vec<Category>>;
    async fn update_category(&self, id: Uuid, update: CategoryUpdate)
    -> InventoryResult<Category>;
    /// Fails with `CategoryInUse` while any central item still references it.
    async fn delete_category(&self, id: Uuid) -> InventoryResult<()>;
}

/// Central warehouse stock.
///
/// Methods taking a `NewTransaction` persist the stock change and the ledger
/// row as one atomic unit.
#[async_trait]
pub trait CentralItemStore: Send + Sync {
    async fn create_item(
        &self,
        item: NewCentralItem,
        purchase: Option<NewTransaction>,
    ) -> InventoryResult<CentralItem>;
    async fn get_item(&self, id: Uuid) -> InventoryResult<Option<CentralItem>>;
    async fn find_item_by_name(&self, name: &str) -> InventoryResult<Option<CentralItem>>;
    async fn list_items_by_category(&self, category_id: Uuid) -> InventoryResult<Vec<CentralItem>>;
    async fn restock_item(
        &self,
        command: RestockCommand,
        purchase: Option<NewTransaction>,
    ) -> InventoryResult<StockOutcome<CentralItem>>;
    async fn delete_item(&self, id: Uuid) -> InventoryResult<()>;
}

#[async_trait]
pub trait SchoolItemStore: Send + Sync {
    async fn get_school_item(
        &self,
        school_id: &str,
        item_id: Uuid,
    ) -> InventoryResult<Option<SchoolItem>>;
    async fn list_school_items(&self, school_id: &str) -> InventoryResult<Vec<SchoolItem>>;
    /// Moves stock from the central row into the school row atomically.
    async fn dispatch_to_school(&self, command: DispatchCommand)
    -> InventoryResult<DispatchOutcome>;
    /// Decrements the school row and appends the income entry atomically.
    async fn sell_school_item(
        &self,
        command: SaleCommand,
        entry: NewTransaction,
    ) -> InventoryResult<SaleOutcome>;
    /// Overwrites quantity and price; a zero quantity removes the row.
    async fn adjust_school_item(
        &self,
        school_id: &str,
        item_id: Uuid,
        quantity: i64,
        price: Decimal,
    ) -> InventoryResult<StockOutcome<SchoolItem>>;
}

#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn append_transaction(&self, entry: NewTransaction) -> InventoryResult<Transaction>;
    async fn get_transaction(&self, id: Uuid) -> InventoryResult<Option<Transaction>>;
    async fn delete_transaction(&self, id: Uuid) -> InventoryResult<()>;
    async fn delete_transactions_by_school(&self, school_id: &str) -> InventoryResult<u64>;
    /// Newest first, ties broken by id so repeated reads are identical.
    async fn list_transactions(&self, filter: &LedgerFilter) -> InventoryResult<Vec<Transaction>>;
    /// Rewrites `student_id` on every matching row; returns the number touched.
    async fn relabel_student(&self, from: &str, to: &str) -> InventoryResult<u64>;
}
