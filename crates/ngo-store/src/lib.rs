mod directory;

pub use directory::InMemoryDirectory;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ngo_core::{
    Category, CategoryStore, CategoryUpdate, CentralItem, CentralItemStore, DispatchCommand,
    DispatchOutcome, InventoryError, InventoryResult, LedgerFilter, LedgerStore, NewCategory,
    NewCentralItem, NewTransaction, RestockCommand, SaleCommand, SaleOutcome, SchoolItem,
    SchoolItemStore, StockOutcome, Transaction,
};
use ngo_inventory::StockPosition;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Default)]
struct StoreState {
    categories: HashMap<Uuid, Category>,
    items: HashMap<Uuid, CentralItem>,
    school_items: HashMap<(String, Uuid), SchoolItem>,
    transactions: HashMap<Uuid, Transaction>,
}

impl StoreState {
    fn item_name_taken(&self, name: &str) -> bool {
        self.items
            .values()
            .any(|item| same_name(&item.name, name))
    }

    fn push_transaction(&mut self, entry: NewTransaction, now: DateTime<Utc>) -> Transaction {
        let transaction = entry.into_transaction(Uuid::now_v7(), now);
        self.transactions
            .insert(transaction.id, transaction.clone());
        transaction
    }
}

/// Process-local backend for every store trait.
///
/// All state sits behind one lock and each mutating call holds the write
/// guard from its first read to its last write, so stock changes and their
/// ledger rows land together and operations on the same item serialize.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryStore for InMemoryStore {
    async fn create_category(&self, category: NewCategory) -> InventoryResult<Category> {
        let mut state = self.state.write().await;
        if state
            .categories
            .values()
            .any(|existing| same_name(&existing.name, &category.name))
        {
            return Err(InventoryError::DuplicateName(format!(
                "category {}",
                category.name
            )));
        }

        let now = Utc::now();
        let created = Category {
            id: Uuid::new_v4(),
            name: category.name,
            description: category.description,
            created_at: now,
            updated_at: now,
        };
        state.categories.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_category(&self, id: Uuid) -> InventoryResult<Option<Category>> {
        Ok(self.state.read().await.categories.get(&id).cloned())
    }

    async fn list_categories(&self) -> InventoryResult<Vec<Category>> {
        let state = self.state.read().await;
        let mut categories: Vec<Category> = state.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(categories)
    }

    async fn update_category(
        &self,
        id: Uuid,
        update: CategoryUpdate,
    ) -> InventoryResult<Category> {
        let mut state = self.state.write().await;
        if let Some(name) = update.name.as_deref() {
            if state
                .categories
                .values()
                .any(|existing| existing.id != id && same_name(&existing.name, name))
            {
                return Err(InventoryError::DuplicateName(format!("category {name}")));
            }
        }

        let category = state
            .categories
            .get_mut(&id)
            .ok_or_else(|| InventoryError::not_found("category", id))?;
        if let Some(name) = update.name {
            category.name = name;
        }
        if let Some(description) = update.description {
            category.description = Some(description);
        }
        category.updated_at = Utc::now();
        Ok(category.clone())
    }

    async fn delete_category(&self, id: Uuid) -> InventoryResult<()> {
        let mut state = self.state.write().await;
        let Some(category) = state.categories.get(&id) else {
            return Err(InventoryError::not_found("category", id));
        };
        if state.items.values().any(|item| item.category_id == id) {
            return Err(InventoryError::CategoryInUse(category.name.clone()));
        }
        state.categories.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl CentralItemStore for InMemoryStore {
    async fn create_item(
        &self,
        item: NewCentralItem,
        purchase: Option<NewTransaction>,
    ) -> InventoryResult<CentralItem> {
        let mut state = self.state.write().await;
        if !state.categories.contains_key(&item.category_id) {
            return Err(InventoryError::not_found("category", item.category_id));
        }
        if state.item_name_taken(&item.name) {
            return Err(InventoryError::DuplicateName(format!("item {}", item.name)));
        }

        let position = StockPosition::opening(item.quantity, item.price)?;
        let now = Utc::now();
        let created = CentralItem {
            id: Uuid::new_v4(),
            name: item.name,
            description: item.description,
            quantity: position.quantity,
            price: position.price,
            total_amount: position.total_amount,
            category_id: item.category_id,
            created_at: now,
            updated_at: now,
        };
        state.items.insert(created.id, created.clone());
        if let Some(purchase) = purchase {
            state.push_transaction(purchase, now);
        }
        Ok(created)
    }

    async fn get_item(&self, id: Uuid) -> InventoryResult<Option<CentralItem>> {
        Ok(self.state.read().await.items.get(&id).cloned())
    }

    async fn find_item_by_name(&self, name: &str) -> InventoryResult<Option<CentralItem>> {
        let state = self.state.read().await;
        Ok(state
            .items
            .values()
            .find(|item| same_name(&item.name, name))
            .cloned())
    }

    async fn list_items_by_category(&self, category_id: Uuid) -> InventoryResult<Vec<CentralItem>> {
        let state = self.state.read().await;
        let mut items: Vec<CentralItem> = state
            .items
            .values()
            .filter(|item| item.category_id == category_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn restock_item(
        &self,
        command: RestockCommand,
        purchase: Option<NewTransaction>,
    ) -> InventoryResult<StockOutcome<CentralItem>> {
        let mut state = self.state.write().await;
        let item = state
            .items
            .get(&command.item_id)
            .ok_or_else(|| InventoryError::not_found("item", command.item_id))?;

        let outcome =
            StockPosition::from(item).restock(command.quantity_change, command.unit_price)?;
        let now = Utc::now();

        let result = match outcome {
            StockOutcome::Deleted => {
                state.items.remove(&command.item_id);
                debug!(item_id = %command.item_id, "central item depleted");
                StockOutcome::Deleted
            }
            StockOutcome::Updated(position) => {
                let Some(item) = state.items.get_mut(&command.item_id) else {
                    return Err(InventoryError::not_found("item", command.item_id));
                };
                apply_to_central(item, position, now);
                if let Some(description) = command
                    .description
                    .filter(|description| !description.trim().is_empty())
                {
                    item.description = Some(description);
                }
                StockOutcome::Updated(item.clone())
            }
        };

        if let Some(purchase) = purchase {
            state.push_transaction(purchase, now);
        }
        Ok(result)
    }

    async fn delete_item(&self, id: Uuid) -> InventoryResult<()> {
        let mut state = self.state.write().await;
        state
            .items
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| InventoryError::not_found("item", id))
    }
}

#[async_trait]
impl SchoolItemStore for InMemoryStore {
    async fn get_school_item(
        &self,
        school_id: &str,
        item_id: Uuid,
    ) -> InventoryResult<Option<SchoolItem>> {
        let state = self.state.read().await;
        Ok(state
            .school_items
            .get(&(school_id.to_string(), item_id))
            .cloned())
    }

    async fn list_school_items(&self, school_id: &str) -> InventoryResult<Vec<SchoolItem>> {
        let state = self.state.read().await;
        let mut items: Vec<SchoolItem> = state
            .school_items
            .values()
            .filter(|item| item.school_id == school_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name).then(a.item_id.cmp(&b.item_id)));
        Ok(items)
    }

    async fn dispatch_to_school(
        &self,
        command: DispatchCommand,
    ) -> InventoryResult<DispatchOutcome> {
        let mut state = self.state.write().await;
        let central = state
            .items
            .get(&command.item_id)
            .cloned()
            .ok_or_else(|| InventoryError::not_found("item", command.item_id))?;

        let central_outcome = StockPosition::from(&central).withdraw(command.quantity)?;
        let item_name = central.name.clone();
        let school_price = command.price.unwrap_or(central.price);
        let key = (command.school_id.clone(), command.item_id);
        let school_position = match state.school_items.get(&key) {
            Some(existing) => StockPosition::from(existing).merge(command.quantity, school_price)?,
            None => StockPosition::opening(command.quantity, school_price)?,
        };

        let now = Utc::now();
        let central_item = match central_outcome {
            StockOutcome::Deleted => {
                state.items.remove(&command.item_id);
                StockOutcome::Deleted
            }
            StockOutcome::Updated(position) => {
                let mut updated = central;
                apply_to_central(&mut updated, position, now);
                state.items.insert(updated.id, updated.clone());
                StockOutcome::Updated(updated)
            }
        };

        let school_item = state
            .school_items
            .entry(key)
            .and_modify(|row| apply_to_school(row, school_position, now))
            .or_insert_with(|| SchoolItem {
                school_id: command.school_id.clone(),
                item_id: command.item_id,
                name: item_name,
                quantity: school_position.quantity,
                price: school_position.price,
                total_amount: school_position.total_amount,
                created_at: now,
                updated_at: now,
            })
            .clone();

        Ok(DispatchOutcome {
            central_item,
            school_item,
        })
    }

    async fn sell_school_item(
        &self,
        command: SaleCommand,
        entry: NewTransaction,
    ) -> InventoryResult<SaleOutcome> {
        let mut state = self.state.write().await;
        let key = (command.school_id.clone(), command.item_id);
        let row = state.school_items.get(&key).ok_or_else(|| {
            InventoryError::not_found(
                "school item",
                format!("{}/{}", command.school_id, command.item_id),
            )
        })?;

        if command.quantity <= 0 {
            return Err(InventoryError::InvalidQuantity(
                "quantity must be positive".to_string(),
            ));
        }
        if command.quantity > row.quantity {
            return Err(InventoryError::InsufficientStock {
                requested: command.quantity,
                available: row.quantity,
            });
        }

        let outcome = StockPosition::adjust(row.quantity - command.quantity, row.price)?;
        let now = Utc::now();
        let school_item = write_school_outcome(&mut state, &key, outcome, now);
        let ledger_entry = state.push_transaction(entry, now);

        Ok(SaleOutcome {
            school_item,
            ledger_entry,
        })
    }

    async fn adjust_school_item(
        &self,
        school_id: &str,
        item_id: Uuid,
        quantity: i64,
        price: Decimal,
    ) -> InventoryResult<StockOutcome<SchoolItem>> {
        let mut state = self.state.write().await;
        let key = (school_id.to_string(), item_id);
        if !state.school_items.contains_key(&key) {
            return Err(InventoryError::not_found(
                "school item",
                format!("{school_id}/{item_id}"),
            ));
        }

        let outcome = StockPosition::adjust(quantity, price)?;
        Ok(write_school_outcome(&mut state, &key, outcome, Utc::now()))
    }
}

#[async_trait]
impl LedgerStore for InMemoryStore {
    async fn append_transaction(&self, entry: NewTransaction) -> InventoryResult<Transaction> {
        let mut state = self.state.write().await;
        Ok(state.push_transaction(entry, Utc::now()))
    }

    async fn get_transaction(&self, id: Uuid) -> InventoryResult<Option<Transaction>> {
        Ok(self.state.read().await.transactions.get(&id).cloned())
    }

    async fn delete_transaction(&self, id: Uuid) -> InventoryResult<()> {
        let mut state = self.state.write().await;
        state
            .transactions
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| InventoryError::not_found("transaction", id))
    }

    async fn delete_transactions_by_school(&self, school_id: &str) -> InventoryResult<u64> {
        let mut state = self.state.write().await;
        let before = state.transactions.len();
        state
            .transactions
            .retain(|_, entry| entry.school_id.as_deref() != Some(school_id));
        Ok((before - state.transactions.len()) as u64)
    }

    async fn list_transactions(&self, filter: &LedgerFilter) -> InventoryResult<Vec<Transaction>> {
        let state = self.state.read().await;
        let mut entries: Vec<Transaction> = state
            .transactions
            .values()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(entries)
    }

    async fn relabel_student(&self, from: &str, to: &str) -> InventoryResult<u64> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let mut touched = 0;
        for entry in state.transactions.values_mut() {
            if entry.student_id.as_deref() == Some(from) {
                entry.student_id = Some(to.to_string());
                entry.updated_at = now;
                touched += 1;
            }
        }
        Ok(touched)
    }
}

fn write_school_outcome(
    state: &mut StoreState,
    key: &(String, Uuid),
    outcome: StockOutcome<StockPosition>,
    now: DateTime<Utc>,
) -> StockOutcome<SchoolItem> {
    match outcome {
        StockOutcome::Deleted => {
            state.school_items.remove(key);
            StockOutcome::Deleted
        }
        StockOutcome::Updated(position) => match state.school_items.get_mut(key) {
            Some(row) => {
                apply_to_school(row, position, now);
                StockOutcome::Updated(row.clone())
            }
            None => StockOutcome::Deleted,
        },
    }
}

fn apply_to_central(item: &mut CentralItem, position: StockPosition, now: DateTime<Utc>) {
    item.quantity = position.quantity;
    item.price = position.price;
    item.total_amount = position.total_amount;
    item.updated_at = now;
}

fn apply_to_school(row: &mut SchoolItem, position: StockPosition, now: DateTime<Utc>) {
    row.quantity = position.quantity;
    row.price = position.price;
    row.total_amount = position.total_amount;
    row.updated_at = now;
}

fn same_name(left: &str, right: &str) -> bool {
    left.trim().eq_ignore_ascii_case(right.trim())
}
