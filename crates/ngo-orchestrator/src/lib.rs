use chrono::{NaiveDate, Utc};
use ngo_core::{
    Category, CategoryStore, CategoryUpdate, CentralItem, CentralItemStore, DispatchCommand,
    DispatchOutcome, FinanceSummary, InventoryError, InventoryResult, LedgerFilter, LedgerStore,
    NewCategory, NewCentralItem, PurchaseHistoryFilter, PurchaseHistoryRow, RestockCommand,
    SaleCommand, SaleOutcome, SchoolDirectory, SchoolItem, SchoolItemStore, StockOutcome,
    StudentDirectory, Transaction, ensure_unit_price,
};
use ngo_finance::{LedgerEntryRequest, alumni_id_for, purchase_entry, sale_entry, summarize};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

const MAX_NAME_LEN: usize = 100;

/// Every store capability the orchestrator writes through.
pub trait InventoryStore: CategoryStore + CentralItemStore + SchoolItemStore + LedgerStore {}

impl<T> InventoryStore for T where T: CategoryStore + CentralItemStore + SchoolItemStore + LedgerStore {}

/// Registry lookups the orchestrator needs from the school and student services.
pub trait Directory: SchoolDirectory + StudentDirectory {}

impl<T> Directory for T where T: SchoolDirectory + StudentDirectory {}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchoolFinance {
    pub school_id: String,
    pub transactions: Vec<Transaction>,
    #[serde(flatten)]
    pub summary: FinanceSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlumniConversion {
    pub student_id: String,
    pub alumni_id: String,
    pub transactions_updated: u64,
}

#[derive(Debug, Clone)]
pub struct DispatchInput {
    pub school_id: String,
    pub item_id: Uuid,
    /// When present it must name the central item being dispatched.
    pub name: Option<String>,
    pub quantity: i64,
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct SaleInput {
    pub school_id: String,
    pub item_id: Uuid,
    pub student_id: String,
    pub quantity: i64,
    pub price: Decimal,
}

/// Coordinates stock movements between central and school inventories and
/// the ledger rows they produce.
pub struct StockTransferService<S, D>
where
    S: InventoryStore,
    D: Directory,
{
    store: S,
    directory: D,
}

impl<S, D> StockTransferService<S, D>
where
    S: InventoryStore,
    D: Directory,
{
    pub fn new(store: S, directory: D) -> Self {
        Self { store, directory }
    }

    pub async fn create_category(
        &self,
        name: &str,
        description: Option<String>,
    ) -> InventoryResult<Category> {
        let name = normalize_name("category name", name)?;
        let category = self
            .store
            .create_category(NewCategory {
                name,
                description: non_empty(description),
            })
            .await?;
        info!(category_id = %category.id, name = %category.name, "category created");
        Ok(category)
    }

    pub async fn get_category(&self, id: Uuid) -> InventoryResult<Category> {
        self.store
            .get_category(id)
            .await?
            .ok_or_else(|| InventoryError::not_found("category", id))
    }

    pub async fn list_categories(&self) -> InventoryResult<Vec<Category>> {
        self.store.list_categories().await
    }

    pub async fn update_category(
        &self,
        id: Uuid,
        name: Option<String>,
        description: Option<String>,
    ) -> InventoryResult<Category> {
        let name = name
            .map(|name| normalize_name("category name", &name))
            .transpose()?;
        self.store
            .update_category(
                id,
                CategoryUpdate {
                    name,
                    description: non_empty(description),
                },
            )
            .await
    }

    pub async fn delete_category(&self, id: Uuid) -> InventoryResult<()> {
        self.store.delete_category(id).await?;
        info!(category_id = %id, "category deleted");
        Ok(())
    }

    /// Creates a central item and books the opening stock as a purchase expense.
    pub async fn create_central_item(&self, item: NewCentralItem) -> InventoryResult<CentralItem> {
        let name = normalize_name("item name", &item.name)?;
        ensure_positive_quantity(item.quantity)?;
        ensure_unit_price(item.price)?;
        if let Some(existing) = self.store.find_item_by_name(&name).await? {
            return Err(InventoryError::DuplicateName(format!(
                "item {} (restock {} instead)",
                existing.name, existing.id
            )));
        }

        let purchase = purchase_entry(today(), &name, item.quantity, item.price)?;
        let created = self
            .store
            .create_item(
                NewCentralItem {
                    name,
                    description: non_empty(item.description),
                    ..item
                },
                Some(purchase),
            )
            .await?;

        info!(
            item_id = %created.id,
            name = %created.name,
            quantity = created.quantity,
            "central item created"
        );
        Ok(created)
    }

    pub async fn restock_central_item(
        &self,
        item_id: Uuid,
        quantity_change: i64,
        new_price: Decimal,
        description: Option<String>,
        record_purchase: bool,
    ) -> InventoryResult<StockOutcome<CentralItem>> {
        ensure_unit_price(new_price)?;

        let purchase = if record_purchase && quantity_change > 0 {
            let item = self
                .store
                .get_item(item_id)
                .await?
                .ok_or_else(|| InventoryError::not_found("item", item_id))?;
            Some(purchase_entry(today(), &item.name, quantity_change, new_price)?)
        } else {
            None
        };

        let outcome = self
            .store
            .restock_item(
                RestockCommand {
                    item_id,
                    quantity_change,
                    unit_price: new_price,
                    description,
                },
                purchase,
            )
            .await?;

        match &outcome {
            StockOutcome::Updated(item) => info!(
                %item_id,
                quantity = item.quantity,
                price = %item.price,
                "central item restocked"
            ),
            StockOutcome::Deleted => info!(%item_id, "central item depleted and removed"),
        }
        Ok(outcome)
    }

    pub async fn delete_central_item(&self, item_id: Uuid) -> InventoryResult<()> {
        self.store.delete_item(item_id).await?;
        info!(%item_id, "central item deleted");
        Ok(())
    }

    pub async fn list_items_by_category(
        &self,
        category_id: Uuid,
    ) -> InventoryResult<Vec<CentralItem>> {
        self.get_category(category_id).await?;
        self.store.list_items_by_category(category_id).await
    }

    /// Moves stock from the central warehouse to a school. Internal transfers
    /// carry no ledger row; the money was booked when the stock was bought.
    pub async fn dispatch_to_school(&self, input: DispatchInput) -> InventoryResult<DispatchOutcome> {
        let school_id = normalize_id("school_id", &input.school_id)?;
        ensure_positive_quantity(input.quantity)?;
        if let Some(price) = input.price {
            ensure_unit_price(price)?;
        }

        if self.directory.school_name(&school_id).await?.is_none() {
            return Err(InventoryError::not_found("school", &school_id));
        }

        if let Some(name) = non_empty(input.name) {
            let item = self
                .store
                .get_item(input.item_id)
                .await?
                .ok_or_else(|| InventoryError::not_found("item", input.item_id))?;
            if !item.name.trim().eq_ignore_ascii_case(&name) {
                return Err(InventoryError::validation(format!(
                    "item {} is named {:?}, not {name:?}",
                    input.item_id, item.name
                )));
            }
        }

        let outcome = self
            .store
            .dispatch_to_school(DispatchCommand {
                school_id: school_id.clone(),
                item_id: input.item_id,
                quantity: input.quantity,
                price: input.price,
            })
            .await?;

        info!(
            school_id = %school_id,
            item_id = %input.item_id,
            quantity = input.quantity,
            central_depleted = outcome.central_item.is_deleted(),
            "stock dispatched to school"
        );
        Ok(outcome)
    }

    /// Sells school stock to a student and books the income.
    pub async fn sell_to_student(&self, input: SaleInput) -> InventoryResult<SaleOutcome> {
        let school_id = normalize_id("school_id", &input.school_id)?;
        let student_id = normalize_id("student_id", &input.student_id)?;
        ensure_positive_quantity(input.quantity)?;
        ensure_unit_price(input.price)?;

        if !self.directory.student_exists(&student_id).await? {
            return Err(InventoryError::not_found("student", &student_id));
        }

        let row = self
            .store
            .get_school_item(&school_id, input.item_id)
            .await?
            .ok_or_else(|| {
                InventoryError::not_found("school item", format!("{school_id}/{}", input.item_id))
            })?;
        if input.quantity > row.quantity {
            return Err(InventoryError::InsufficientStock {
                requested: input.quantity,
                available: row.quantity,
            });
        }

        let mut entry = sale_entry(
            today(),
            &school_id,
            &student_id,
            &row.name,
            input.quantity,
            input.price,
        )?;
        entry.school_name = self.resolve_school_name(Some(&school_id)).await;

        let outcome = self
            .store
            .sell_school_item(
                SaleCommand {
                    school_id: school_id.clone(),
                    item_id: input.item_id,
                    quantity: input.quantity,
                },
                entry,
            )
            .await?;

        info!(
            school_id = %school_id,
            student_id = %student_id,
            item_id = %input.item_id,
            quantity = input.quantity,
            amount = %outcome.ledger_entry.amount,
            "item sold to student"
        );
        Ok(outcome)
    }

    pub async fn list_school_items(&self, school_id: &str) -> InventoryResult<Vec<SchoolItem>> {
        let school_id = normalize_id("school_id", school_id)?;
        self.store.list_school_items(&school_id).await
    }

    /// Manual stock correction; quantity zero removes the row.
    pub async fn adjust_school_item(
        &self,
        school_id: &str,
        item_id: Uuid,
        quantity: i64,
        price: Decimal,
    ) -> InventoryResult<StockOutcome<SchoolItem>> {
        let school_id = normalize_id("school_id", school_id)?;
        let outcome = self
            .store
            .adjust_school_item(&school_id, item_id, quantity, price)
            .await?;
        info!(school_id = %school_id, %item_id, quantity, "school item adjusted");
        Ok(outcome)
    }

    pub async fn append_ledger_entry(
        &self,
        request: LedgerEntryRequest,
    ) -> InventoryResult<Transaction> {
        let mut entry = request.validate()?;
        entry.school_name = self.resolve_school_name(entry.school_id.as_deref()).await;

        let transaction = self.store.append_transaction(entry).await?;
        info!(
            transaction_id = %transaction.id,
            kind = %transaction.kind,
            amount = %transaction.amount,
            "ledger entry appended"
        );
        Ok(transaction)
    }

    pub async fn delete_ledger_entry(&self, id: Uuid) -> InventoryResult<()> {
        self.store.delete_transaction(id).await?;
        info!(transaction_id = %id, "ledger entry deleted");
        Ok(())
    }

    pub async fn delete_school_ledger(&self, school_id: &str) -> InventoryResult<u64> {
        let school_id = normalize_id("school_id", school_id)?;
        let deleted = self.store.delete_transactions_by_school(&school_id).await?;
        info!(school_id = %school_id, deleted, "school ledger cleared");
        Ok(deleted)
    }

    pub async fn list_ledger(&self, filter: &LedgerFilter) -> InventoryResult<Vec<Transaction>> {
        self.store.list_transactions(filter).await
    }

    /// Totals for one school when the filter names one, otherwise for every row.
    pub async fn finance_summary(&self, filter: &LedgerFilter) -> InventoryResult<FinanceSummary> {
        let entries = self.store.list_transactions(filter).await?;
        Ok(summarize(&entries))
    }

    pub async fn school_finance(&self, school_id: &str) -> InventoryResult<SchoolFinance> {
        let school_id = normalize_id("school_id", school_id)?;
        let transactions = self
            .store
            .list_transactions(&LedgerFilter::school(school_id.clone()))
            .await?;
        let summary = summarize(&transactions);
        Ok(SchoolFinance {
            school_id,
            transactions,
            summary,
        })
    }

    pub async fn purchase_history(
        &self,
        filter: &PurchaseHistoryFilter,
    ) -> InventoryResult<Vec<PurchaseHistoryRow>> {
        let entries = self.store.list_transactions(&LedgerFilter::default()).await?;
        Ok(ngo_finance::purchase_history(&entries, filter))
    }

    /// Relabels a graduating student's ledger rows from `STU-` to `ALU-`.
    pub async fn convert_student_to_alumni(
        &self,
        student_id: &str,
    ) -> InventoryResult<AlumniConversion> {
        let student_id = student_id.trim().to_string();
        let alumni_id = alumni_id_for(&student_id)?;
        let transactions_updated = self.store.relabel_student(&student_id, &alumni_id).await?;

        info!(
            student_id = %student_id,
            alumni_id = %alumni_id,
            transactions_updated,
            "student ledger rows relabelled"
        );
        Ok(AlumniConversion {
            student_id,
            alumni_id,
            transactions_updated,
        })
    }

    async fn resolve_school_name(&self, school_id: Option<&str>) -> Option<String> {
        let school_id = school_id?;
        match self.directory.school_name(school_id).await {
            Ok(name) => name,
            Err(err) => {
                warn!(school_id, error = %err, "school name lookup failed; recording entry without it");
                None
            }
        }
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn normalize_name(field: &str, value: &str) -> InventoryResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(InventoryError::validation(format!("{field} is required")));
    }
    if value.chars().count() > MAX_NAME_LEN {
        return Err(InventoryError::validation(format!(
            "{field} must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(value.to_string())
}

fn normalize_id(field: &str, value: &str) -> InventoryResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(InventoryError::validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn ensure_positive_quantity(quantity: i64) -> InventoryResult<()> {
    if quantity <= 0 {
        return Err(InventoryError::InvalidQuantity(
            "quantity must be positive".to_string(),
        ));
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use ngo_core::TransactionType;
    use ngo_store::{InMemoryDirectory, InMemoryStore};

    use super::*;

    type Service = StockTransferService<InMemoryStore, InMemoryDirectory>;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn directory() -> InMemoryDirectory {
        InMemoryDirectory::new()
            .with_school("S1", "Hillside Primary")
            .with_student("STU-20240001")
    }

    fn service() -> Service {
        StockTransferService::new(InMemoryStore::new(), directory())
    }

    async fn seed_item(service: &Service, name: &str, quantity: i64, price: &str) -> CentralItem {
        let category = match service.create_category("Stationery", None).await {
            Ok(category) => category,
            Err(_) => service.list_categories().await.unwrap().remove(0),
        };
        service
            .create_central_item(NewCentralItem {
                name: name.to_string(),
                description: None,
                quantity,
                price: dec(price),
                category_id: category.id,
            })
            .await
            .unwrap()
    }

    fn ledger_request(kind: &str, amount: &str) -> LedgerEntryRequest {
        LedgerEntryRequest {
            kind: Some(kind.to_string()),
            category: Some("donation".to_string()),
            amount: Some(dec(amount)),
            date: NaiveDate::from_ymd_opt(2024, 3, 1),
            school_id: Some("S1".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn stock_flows_from_purchase_to_student_sale() {
        let service = service();
        let item = seed_item(&service, "Notebook", 100, "10").await;

        let ledger = service.list_ledger(&LedgerFilter::default()).await.unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].kind, TransactionType::Expense);
        assert_eq!(ledger[0].category, "consumables");
        assert_eq!(ledger[0].amount, dec("1000"));

        let dispatch = service
            .dispatch_to_school(DispatchInput {
                school_id: "S1".to_string(),
                item_id: item.id,
                name: Some("notebook".to_string()),
                quantity: 20,
                price: None,
            })
            .await
            .unwrap();
        assert_eq!(dispatch.central_item.updated().unwrap().quantity, 80);
        assert_eq!(dispatch.school_item.total_amount, dec("200"));
        assert_eq!(
            service.list_ledger(&LedgerFilter::default()).await.unwrap().len(),
            1
        );

        let sale = service
            .sell_to_student(SaleInput {
                school_id: "S1".to_string(),
                item_id: item.id,
                student_id: "STU-20240001".to_string(),
                quantity: 5,
                price: dec("12"),
            })
            .await
            .unwrap();
        let row = sale.school_item.updated().unwrap();
        assert_eq!(row.quantity, 15);
        assert_eq!(row.total_amount, dec("150"));
        assert_eq!(row.price, dec("10"));

        let entry = &sale.ledger_entry;
        assert_eq!(entry.kind, TransactionType::Income);
        assert_eq!(entry.category, "Item Sale");
        assert_eq!(entry.amount, dec("60"));
        assert_eq!(entry.school_name.as_deref(), Some("Hillside Primary"));
        assert_eq!(entry.item_name.as_deref(), Some("Notebook"));

        let history = service
            .purchase_history(&PurchaseHistoryFilter {
                student_id: Some("STU-20240001".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].quantity, Some(5));

        let summary = service
            .finance_summary(&LedgerFilter::default())
            .await
            .unwrap();
        assert_eq!(summary.total_income, dec("60"));
        assert_eq!(summary.total_expense, dec("1000"));
        assert_eq!(summary.net_balance, dec("-940"));
    }

    #[tokio::test]
    async fn restock_blends_price_and_books_purchase_on_request() {
        let service = service();
        let item = seed_item(&service, "Chalk", 10, "5").await;

        let outcome = service
            .restock_central_item(item.id, 5, dec("8"), None, true)
            .await
            .unwrap();
        let restocked = outcome.updated().unwrap();
        assert_eq!(restocked.quantity, 15);
        assert_eq!(restocked.total_amount, dec("90"));
        assert_eq!(restocked.price, dec("6.00"));

        let outcome = service
            .restock_central_item(item.id, 1, dec("6"), None, false)
            .await
            .unwrap();
        assert_eq!(outcome.updated().unwrap().quantity, 16);

        let expenses = service.list_ledger(&LedgerFilter::default()).await.unwrap();
        assert_eq!(expenses.len(), 2);
        assert_eq!(expenses[0].amount, dec("40"));

        let outcome = service
            .restock_central_item(item.id, -16, dec("6"), None, true)
            .await
            .unwrap();
        assert!(outcome.is_deleted());
        assert_eq!(
            service.list_ledger(&LedgerFilter::default()).await.unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn dispatch_requires_known_school_and_matching_name() {
        let service = service();
        let item = seed_item(&service, "Pencil", 10, "1").await;

        let err = service
            .dispatch_to_school(DispatchInput {
                school_id: "S404".to_string(),
                item_id: item.id,
                name: None,
                quantity: 1,
                price: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::NotFound { entity: "school", .. }));

        let err = service
            .dispatch_to_school(DispatchInput {
                school_id: "S1".to_string(),
                item_id: item.id,
                name: Some("Eraser".to_string()),
                quantity: 1,
                price: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)));
        assert_eq!(
            service.list_school_items("S1").await.unwrap(),
            Vec::<SchoolItem>::new()
        );
    }

    #[tokio::test]
    async fn sale_to_unknown_student_is_rejected_before_any_write() {
        let service = service();
        let item = seed_item(&service, "Ruler", 10, "2").await;
        service
            .dispatch_to_school(DispatchInput {
                school_id: "S1".to_string(),
                item_id: item.id,
                name: None,
                quantity: 4,
                price: None,
            })
            .await
            .unwrap();

        let err = service
            .sell_to_student(SaleInput {
                school_id: "S1".to_string(),
                item_id: item.id,
                student_id: "STU-99999999".to_string(),
                quantity: 1,
                price: dec("3"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::NotFound { entity: "student", .. }));

        let err = service
            .sell_to_student(SaleInput {
                school_id: "S1".to_string(),
                item_id: item.id,
                student_id: "STU-20240001".to_string(),
                quantity: 5,
                price: dec("3"),
            })
            .await
            .unwrap_err();
        assert_eq!(
            err,
            InventoryError::InsufficientStock {
                requested: 5,
                available: 4
            }
        );

        let rows = service.list_school_items("S1").await.unwrap();
        assert_eq!(rows[0].quantity, 4);
        assert_eq!(
            service
                .list_ledger(&LedgerFilter::school("S1"))
                .await
                .unwrap()
                .len(),
            0
        );
    }

    #[tokio::test]
    async fn ledger_entry_survives_school_lookup_failure() {
        let service = StockTransferService::new(
            InMemoryStore::new(),
            directory().failing_school_lookup(),
        );

        let entry = service
            .append_ledger_entry(ledger_request("income", "250"))
            .await
            .unwrap();
        assert_eq!(entry.school_id.as_deref(), Some("S1"));
        assert_eq!(entry.school_name, None);

        let named = StockTransferService::new(InMemoryStore::new(), directory())
            .append_ledger_entry(ledger_request("income", "250"))
            .await
            .unwrap();
        assert_eq!(named.school_name.as_deref(), Some("Hillside Primary"));
    }

    #[tokio::test]
    async fn invalid_ledger_entries_are_not_persisted() {
        let service = service();
        let mut request = ledger_request("income", "10");
        request.category = None;

        let err = service.append_ledger_entry(request).await.unwrap_err();
        assert_eq!(
            err,
            InventoryError::validation("type, category, amount, date are required")
        );
        assert!(
            service
                .list_ledger(&LedgerFilter::default())
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn school_finance_totals_only_that_school() {
        let service = service();
        service
            .append_ledger_entry(ledger_request("income", "100"))
            .await
            .unwrap();
        service
            .append_ledger_entry(ledger_request("expense", "30.50"))
            .await
            .unwrap();
        let mut other = ledger_request("income", "999");
        other.school_id = Some("S2".to_string());
        service.append_ledger_entry(other).await.unwrap();

        let finance = service.school_finance("S1").await.unwrap();
        assert_eq!(finance.transactions.len(), 2);
        assert_eq!(finance.summary.net_balance, dec("69.50"));

        let value = serde_json::to_value(&finance).unwrap();
        assert!(value.get("net_balance").is_some());
        assert!(value.get("summary").is_none());

        assert_eq!(service.delete_school_ledger("S1").await.unwrap(), 2);
        assert_eq!(
            service
                .finance_summary(&LedgerFilter::school("S1"))
                .await
                .unwrap(),
            FinanceSummary::default()
        );
    }

    #[tokio::test]
    async fn alumni_conversion_relabels_history() {
        let service = service();
        let mut request = ledger_request("income", "40");
        request.student_id = Some("STU-20240001".to_string());
        service.append_ledger_entry(request.clone()).await.unwrap();
        service.append_ledger_entry(request).await.unwrap();

        let conversion = service
            .convert_student_to_alumni("STU-20240001")
            .await
            .unwrap();
        assert_eq!(conversion.alumni_id, "ALU-20240001");
        assert_eq!(conversion.transactions_updated, 2);
        assert!(
            service
                .list_ledger(&LedgerFilter::student("STU-20240001"))
                .await
                .unwrap()
                .is_empty()
        );

        let err = service
            .convert_student_to_alumni("ALU-20240001")
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::InvalidFormat(_)));
    }

    #[tokio::test]
    async fn listing_items_of_missing_category_is_not_found() {
        let service = service();
        let err = service
            .list_items_by_category(Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::NotFound { entity: "category", .. }));
    }

    #[tokio::test]
    async fn inverted_purchase_history_range_is_empty() {
        let service = service();
        let item = seed_item(&service, "Notebook", 10, "5").await;
        service
            .dispatch_to_school(DispatchInput {
                school_id: "S1".to_string(),
                item_id: item.id,
                name: None,
                quantity: 2,
                price: None,
            })
            .await
            .unwrap();
        service
            .sell_to_student(SaleInput {
                school_id: "S1".to_string(),
                item_id: item.id,
                student_id: "STU-20240001".to_string(),
                quantity: 1,
                price: dec("6"),
            })
            .await
            .unwrap();

        let today = today();
        let rows = service
            .purchase_history(&PurchaseHistoryFilter {
                start_date: today.succ_opt(),
                end_date: today.pred_opt(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn oversized_quantities_fail_without_touching_state() {
        let service = service();
        let category = service.create_category("Stationery", None).await.unwrap();

        let err = service
            .create_central_item(NewCentralItem {
                name: "Notebook".to_string(),
                description: None,
                quantity: i64::MAX,
                price: dec("1000000000000"),
                category_id: category.id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)));
        assert!(
            service
                .list_ledger(&LedgerFilter::default())
                .await
                .unwrap()
                .is_empty()
        );
        assert!(
            service
                .list_items_by_category(category.id)
                .await
                .unwrap()
                .is_empty()
        );

        let item = seed_item(&service, "Pencil", 10, "5").await;
        for record_purchase in [false, true] {
            let err = service
                .restock_central_item(item.id, i64::MAX, dec("1"), None, record_purchase)
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                InventoryError::InvalidQuantity(_) | InventoryError::Validation(_)
            ));
        }

        let items = service.list_items_by_category(category.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 10);
        assert_eq!(items[0].total_amount, dec("50"));
        assert_eq!(
            service.list_ledger(&LedgerFilter::default()).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn sub_cent_prices_are_rejected_everywhere() {
        let service = service();
        let category = service.create_category("Stationery", None).await.unwrap();
        let price = dec("12.345");

        let err = service
            .create_central_item(NewCentralItem {
                name: "Notebook".to_string(),
                description: None,
                quantity: 5,
                price,
                category_id: category.id,
            })
            .await
            .unwrap_err();
        assert_eq!(
            err,
            InventoryError::validation("price must have at most 2 decimal places")
        );

        let item = seed_item(&service, "Notebook", 10, "12.30").await;
        assert!(
            service
                .restock_central_item(item.id, 5, price, None, true)
                .await
                .is_err()
        );
        assert!(
            service
                .dispatch_to_school(DispatchInput {
                    school_id: "S1".to_string(),
                    item_id: item.id,
                    name: None,
                    quantity: 5,
                    price: Some(price),
                })
                .await
                .is_err()
        );

        service
            .dispatch_to_school(DispatchInput {
                school_id: "S1".to_string(),
                item_id: item.id,
                name: None,
                quantity: 5,
                price: None,
            })
            .await
            .unwrap();
        let err = service
            .sell_to_student(SaleInput {
                school_id: "S1".to_string(),
                item_id: item.id,
                student_id: "STU-20240001".to_string(),
                quantity: 5,
                price,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)));
        assert!(
            service
                .adjust_school_item("S1", item.id, 5, price)
                .await
                .is_err()
        );

        let rows = service.list_school_items("S1").await.unwrap();
        assert_eq!(rows[0].quantity, 5);
        assert_eq!(rows[0].price, dec("12.30"));
        assert_eq!(
            service.list_ledger(&LedgerFilter::default()).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn depleted_item_name_can_be_created_again() {
        let service = service();
        let first = seed_item(&service, "Notebook", 10, "5").await;

        let outcome = service
            .restock_central_item(first.id, -10, dec("5"), None, false)
            .await
            .unwrap();
        assert!(outcome.is_deleted());

        let second = seed_item(&service, "Notebook", 10, "7").await;
        assert_ne!(second.id, first.id);
        assert_eq!(second.quantity, 10);
        assert_eq!(second.price, dec("7"));
        assert_eq!(second.total_amount, dec("70"));

        let err = service
            .restock_central_item(first.id, 1, dec("5"), None, false)
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::NotFound { entity: "item", .. }));
    }
}
