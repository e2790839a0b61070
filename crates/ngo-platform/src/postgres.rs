use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use ngo_core::{
    Category, CategoryStore, CategoryUpdate, CentralItem, CentralItemStore, DispatchCommand,
    DispatchOutcome, InventoryError, InventoryResult, LedgerFilter, LedgerStore, NewCategory,
    NewCentralItem, NewTransaction, RestockCommand, SaleCommand, SaleOutcome, SchoolItem,
    SchoolItemStore, StockOutcome, Transaction, TransactionType,
};
use ngo_inventory::StockPosition;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool, Row, postgres::PgRow};
use tracing::debug;
use uuid::Uuid;

const CATEGORY_COLUMNS: &str = "id, name, description, created_at, updated_at";
const ITEM_COLUMNS: &str =
    "id, name, description, quantity, price, total_amount, category_id, created_at, updated_at";
const SCHOOL_ITEM_COLUMNS: &str =
    "school_id, item_id, name, quantity, price, total_amount, created_at, updated_at";
const TRANSACTION_COLUMNS: &str = "id, date, type, category, school_id, school_name, student_id, \
     item_name, quantity, price, amount, description, created_at, updated_at";

/// Postgres backend for every store trait.
///
/// Each mutation runs in one transaction and locks the rows it reads with
/// `FOR UPDATE`, so concurrent writers to the same item queue behind each
/// other and a stock change commits together with its ledger row.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryStore for PgStore {
    async fn create_category(&self, category: NewCategory) -> InventoryResult<Category> {
        let sql = format!(
            "INSERT INTO categories ({CATEGORY_COLUMNS}) VALUES ($1, $2, $3, $4, $4) \
             RETURNING {CATEGORY_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(&category.name)
            .bind(&category.description)
            .bind(db_now())
            .fetch_one(&self.pool)
            .await
            .map_err(|err| duplicate_or_storage(err, format!("category {}", category.name)))?;

        category_from_row(&row).map_err(storage_error)
    }

    async fn get_category(&self, id: Uuid) -> InventoryResult<Option<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.as_ref()
            .map(category_from_row)
            .transpose()
            .map_err(storage_error)
    }

    async fn list_categories(&self) -> InventoryResult<Vec<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY created_at, id");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        rows.iter()
            .map(category_from_row)
            .collect::<Result<_, _>>()
            .map_err(storage_error)
    }

    async fn update_category(
        &self,
        id: Uuid,
        update: CategoryUpdate,
    ) -> InventoryResult<Category> {
        let label = update.name.clone().unwrap_or_default();
        let sql = format!(
            "UPDATE categories \
             SET name = COALESCE($2, name), description = COALESCE($3, description), updated_at = $4 \
             WHERE id = $1 \
             RETURNING {CATEGORY_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(update.name)
            .bind(update.description)
            .bind(db_now())
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| duplicate_or_storage(err, format!("category {label}")))?;

        let Some(row) = row else {
            return Err(InventoryError::not_found("category", id));
        };
        category_from_row(&row).map_err(storage_error)
    }

    async fn delete_category(&self, id: Uuid) -> InventoryResult<()> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        let row = sqlx::query("SELECT name FROM categories WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage_error)?;
        let Some(row) = row else {
            return Err(InventoryError::not_found("category", id));
        };
        let name: String = row.try_get("name").map_err(storage_error)?;

        let in_use: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM central_items WHERE category_id = $1)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(storage_error)?;
        if in_use {
            return Err(InventoryError::CategoryInUse(name));
        }

        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;

        tx.commit().await.map_err(storage_error)
    }
}

#[async_trait]
impl CentralItemStore for PgStore {
    async fn create_item(
        &self,
        item: NewCentralItem,
        purchase: Option<NewTransaction>,
    ) -> InventoryResult<CentralItem> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        // FOR SHARE keeps a concurrent delete_category out until this commits.
        let category = sqlx::query("SELECT id FROM categories WHERE id = $1 FOR SHARE")
            .bind(item.category_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage_error)?;
        if category.is_none() {
            return Err(InventoryError::not_found("category", item.category_id));
        }

        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM central_items WHERE LOWER(TRIM(name)) = LOWER(TRIM($1)))",
        )
        .bind(&item.name)
        .fetch_one(&mut *tx)
        .await
        .map_err(storage_error)?;
        if taken {
            return Err(InventoryError::DuplicateName(format!("item {}", item.name)));
        }

        let position = StockPosition::opening(item.quantity, item.price)?;
        let now = db_now();
        let sql = format!(
            "INSERT INTO central_items ({ITEM_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8) \
             RETURNING {ITEM_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(&item.name)
            .bind(&item.description)
            .bind(position.quantity)
            .bind(position.price)
            .bind(position.total_amount)
            .bind(item.category_id)
            .bind(now)
            .fetch_one(&mut *tx)
            .await
            .map_err(|err| duplicate_or_storage(err, format!("item {}", item.name)))?;
        let created = item_from_row(&row).map_err(storage_error)?;

        if let Some(purchase) = purchase {
            insert_transaction(&mut tx, purchase, now)
                .await
                .map_err(storage_error)?;
        }

        tx.commit().await.map_err(storage_error)?;
        Ok(created)
    }

    async fn get_item(&self, id: Uuid) -> InventoryResult<Option<CentralItem>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM central_items WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.as_ref()
            .map(item_from_row)
            .transpose()
            .map_err(storage_error)
    }

    async fn find_item_by_name(&self, name: &str) -> InventoryResult<Option<CentralItem>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM central_items WHERE LOWER(TRIM(name)) = LOWER(TRIM($1))"
        );
        let row = sqlx::query(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.as_ref()
            .map(item_from_row)
            .transpose()
            .map_err(storage_error)
    }

    async fn list_items_by_category(&self, category_id: Uuid) -> InventoryResult<Vec<CentralItem>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM central_items WHERE category_id = $1 ORDER BY created_at, id"
        );
        let rows = sqlx::query(&sql)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        rows.iter()
            .map(item_from_row)
            .collect::<Result<_, _>>()
            .map_err(storage_error)
    }

    async fn restock_item(
        &self,
        command: RestockCommand,
        purchase: Option<NewTransaction>,
    ) -> InventoryResult<StockOutcome<CentralItem>> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        let item = lock_central_item(&mut tx, command.item_id)
            .await?
            .ok_or_else(|| InventoryError::not_found("item", command.item_id))?;
        let outcome =
            StockPosition::from(&item).restock(command.quantity_change, command.unit_price)?;
        let now = db_now();

        let description = command
            .description
            .filter(|description| !description.trim().is_empty());
        let result = write_central_outcome(&mut tx, command.item_id, outcome, description, now)
            .await?;

        if let Some(purchase) = purchase {
            insert_transaction(&mut tx, purchase, now)
                .await
                .map_err(storage_error)?;
        }

        tx.commit().await.map_err(storage_error)?;
        Ok(result)
    }

    async fn delete_item(&self, id: Uuid) -> InventoryResult<()> {
        let result = sqlx::query("DELETE FROM central_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(InventoryError::not_found("item", id));
        }
        Ok(())
    }
}

#[async_trait]
impl SchoolItemStore for PgStore {
    async fn get_school_item(
        &self,
        school_id: &str,
        item_id: Uuid,
    ) -> InventoryResult<Option<SchoolItem>> {
        let sql = format!(
            "SELECT {SCHOOL_ITEM_COLUMNS} FROM school_items WHERE school_id = $1 AND item_id = $2"
        );
        let row = sqlx::query(&sql)
            .bind(school_id)
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.as_ref()
            .map(school_item_from_row)
            .transpose()
            .map_err(storage_error)
    }

    async fn list_school_items(&self, school_id: &str) -> InventoryResult<Vec<SchoolItem>> {
        let sql = format!(
            "SELECT {SCHOOL_ITEM_COLUMNS} FROM school_items WHERE school_id = $1 ORDER BY name, item_id"
        );
        let rows = sqlx::query(&sql)
            .bind(school_id)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        rows.iter()
            .map(school_item_from_row)
            .collect::<Result<_, _>>()
            .map_err(storage_error)
    }

    async fn dispatch_to_school(
        &self,
        command: DispatchCommand,
    ) -> InventoryResult<DispatchOutcome> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        let central = lock_central_item(&mut tx, command.item_id)
            .await?
            .ok_or_else(|| InventoryError::not_found("item", command.item_id))?;
        let central_outcome = StockPosition::from(&central).withdraw(command.quantity)?;

        let school_price = command.price.unwrap_or(central.price);
        let existing = lock_school_item(&mut tx, &command.school_id, command.item_id).await?;
        let school_position = match &existing {
            Some(row) => StockPosition::from(row).merge(command.quantity, school_price)?,
            None => StockPosition::opening(command.quantity, school_price)?,
        };

        let now = db_now();
        let central_item =
            write_central_outcome(&mut tx, command.item_id, central_outcome, None, now).await?;

        let school_item = if existing.is_some() {
            update_school_row(&mut tx, &command.school_id, command.item_id, school_position, now)
                .await?
        } else {
            let sql = format!(
                "INSERT INTO school_items ({SCHOOL_ITEM_COLUMNS}) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $7) \
                 RETURNING {SCHOOL_ITEM_COLUMNS}"
            );
            let row = sqlx::query(&sql)
                .bind(&command.school_id)
                .bind(command.item_id)
                .bind(&central.name)
                .bind(school_position.quantity)
                .bind(school_position.price)
                .bind(school_position.total_amount)
                .bind(now)
                .fetch_one(&mut *tx)
                .await
                .map_err(storage_error)?;
            school_item_from_row(&row).map_err(storage_error)?
        };

        tx.commit().await.map_err(storage_error)?;
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
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        let row = lock_school_item(&mut tx, &command.school_id, command.item_id)
            .await?
            .ok_or_else(|| {
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
        let now = db_now();
        let school_item =
            write_school_outcome(&mut tx, &command.school_id, command.item_id, outcome, now)
                .await?;
        let ledger_entry = insert_transaction(&mut tx, entry, now)
            .await
            .map_err(storage_error)?;

        tx.commit().await.map_err(storage_error)?;
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
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        if lock_school_item(&mut tx, school_id, item_id).await?.is_none() {
            return Err(InventoryError::not_found(
                "school item",
                format!("{school_id}/{item_id}"),
            ));
        }

        let outcome = StockPosition::adjust(quantity, price)?;
        let result = write_school_outcome(&mut tx, school_id, item_id, outcome, db_now()).await?;

        tx.commit().await.map_err(storage_error)?;
        Ok(result)
    }
}

#[async_trait]
impl LedgerStore for PgStore {
    async fn append_transaction(&self, entry: NewTransaction) -> InventoryResult<Transaction> {
        let mut conn = self.pool.acquire().await.map_err(storage_error)?;
        insert_transaction(&mut conn, entry, db_now())
            .await
            .map_err(storage_error)
    }

    async fn get_transaction(&self, id: Uuid) -> InventoryResult<Option<Transaction>> {
        let sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.as_ref()
            .map(transaction_from_row)
            .transpose()
            .map_err(storage_error)
    }

    async fn delete_transaction(&self, id: Uuid) -> InventoryResult<()> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(InventoryError::not_found("transaction", id));
        }
        Ok(())
    }

    async fn delete_transactions_by_school(&self, school_id: &str) -> InventoryResult<u64> {
        let result = sqlx::query("DELETE FROM transactions WHERE school_id = $1")
            .bind(school_id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(result.rows_affected())
    }

    async fn list_transactions(&self, filter: &LedgerFilter) -> InventoryResult<Vec<Transaction>> {
        let sql = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions \
             WHERE ($1::text IS NULL OR school_id = $1) \
               AND ($2::text IS NULL OR student_id = $2) \
             ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(filter.school_id.as_deref())
            .bind(filter.student_id.as_deref())
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        rows.iter()
            .map(transaction_from_row)
            .collect::<Result<_, _>>()
            .map_err(storage_error)
    }

    async fn relabel_student(&self, from: &str, to: &str) -> InventoryResult<u64> {
        let result = sqlx::query(
            "UPDATE transactions SET student_id = $2, updated_at = $3 WHERE student_id = $1",
        )
        .bind(from)
        .bind(to)
        .bind(db_now())
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(result.rows_affected())
    }
}

async fn lock_central_item(
    conn: &mut PgConnection,
    item_id: Uuid,
) -> InventoryResult<Option<CentralItem>> {
    let sql = format!("SELECT {ITEM_COLUMNS} FROM central_items WHERE id = $1 FOR UPDATE");
    let row = sqlx::query(&sql)
        .bind(item_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(storage_error)?;

    row.as_ref()
        .map(item_from_row)
        .transpose()
        .map_err(storage_error)
}

async fn write_central_outcome(
    conn: &mut PgConnection,
    item_id: Uuid,
    outcome: StockOutcome<StockPosition>,
    description: Option<String>,
    now: DateTime<Utc>,
) -> InventoryResult<StockOutcome<CentralItem>> {
    let position = match outcome {
        StockOutcome::Deleted => {
            sqlx::query("DELETE FROM central_items WHERE id = $1")
                .bind(item_id)
                .execute(&mut *conn)
                .await
                .map_err(storage_error)?;
            debug!(%item_id, "central item depleted");
            return Ok(StockOutcome::Deleted);
        }
        StockOutcome::Updated(position) => position,
    };

    let sql = format!(
        "UPDATE central_items \
         SET quantity = $2, price = $3, total_amount = $4, \
             description = COALESCE($5, description), updated_at = $6 \
         WHERE id = $1 \
         RETURNING {ITEM_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(item_id)
        .bind(position.quantity)
        .bind(position.price)
        .bind(position.total_amount)
        .bind(description)
        .bind(now)
        .fetch_one(&mut *conn)
        .await
        .map_err(storage_error)?;

    item_from_row(&row)
        .map(StockOutcome::Updated)
        .map_err(storage_error)
}

async fn lock_school_item(
    conn: &mut PgConnection,
    school_id: &str,
    item_id: Uuid,
) -> InventoryResult<Option<SchoolItem>> {
    let sql = format!(
        "SELECT {SCHOOL_ITEM_COLUMNS} FROM school_items \
         WHERE school_id = $1 AND item_id = $2 FOR UPDATE"
    );
    let row = sqlx::query(&sql)
        .bind(school_id)
        .bind(item_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(storage_error)?;

    row.as_ref()
        .map(school_item_from_row)
        .transpose()
        .map_err(storage_error)
}

async fn update_school_row(
    conn: &mut PgConnection,
    school_id: &str,
    item_id: Uuid,
    position: StockPosition,
    now: DateTime<Utc>,
) -> InventoryResult<SchoolItem> {
    let sql = format!(
        "UPDATE school_items \
         SET quantity = $3, price = $4, total_amount = $5, updated_at = $6 \
         WHERE school_id = $1 AND item_id = $2 \
         RETURNING {SCHOOL_ITEM_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(school_id)
        .bind(item_id)
        .bind(position.quantity)
        .bind(position.price)
        .bind(position.total_amount)
        .bind(now)
        .fetch_one(&mut *conn)
        .await
        .map_err(storage_error)?;

    school_item_from_row(&row).map_err(storage_error)
}

async fn write_school_outcome(
    conn: &mut PgConnection,
    school_id: &str,
    item_id: Uuid,
    outcome: StockOutcome<StockPosition>,
    now: DateTime<Utc>,
) -> InventoryResult<StockOutcome<SchoolItem>> {
    match outcome {
        StockOutcome::Deleted => {
            sqlx::query("DELETE FROM school_items WHERE school_id = $1 AND item_id = $2")
                .bind(school_id)
                .bind(item_id)
                .execute(&mut *conn)
                .await
                .map_err(storage_error)?;
            debug!(school_id, %item_id, "school item depleted");
            Ok(StockOutcome::Deleted)
        }
        StockOutcome::Updated(position) => {
            update_school_row(conn, school_id, item_id, position, now)
                .await
                .map(StockOutcome::Updated)
        }
    }
}

async fn insert_transaction(
    conn: &mut PgConnection,
    entry: NewTransaction,
    now: DateTime<Utc>,
) -> Result<Transaction, sqlx::Error> {
    let transaction = entry.into_transaction(Uuid::now_v7(), now);
    let sql = format!(
        "INSERT INTO transactions ({TRANSACTION_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)"
    );
    sqlx::query(&sql)
        .bind(transaction.id)
        .bind(transaction.date)
        .bind(transaction.kind.as_str())
        .bind(&transaction.category)
        .bind(&transaction.school_id)
        .bind(&transaction.school_name)
        .bind(&transaction.student_id)
        .bind(&transaction.item_name)
        .bind(transaction.quantity)
        .bind(transaction.price)
        .bind(transaction.amount)
        .bind(&transaction.description)
        .bind(now)
        .execute(&mut *conn)
        .await?;

    Ok(transaction)
}

fn category_from_row(row: &PgRow) -> Result<Category, sqlx::Error> {
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn item_from_row(row: &PgRow) -> Result<CentralItem, sqlx::Error> {
    Ok(CentralItem {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        quantity: row.try_get("quantity")?,
        price: row.try_get("price")?,
        total_amount: row.try_get("total_amount")?,
        category_id: row.try_get("category_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn school_item_from_row(row: &PgRow) -> Result<SchoolItem, sqlx::Error> {
    Ok(SchoolItem {
        school_id: row.try_get("school_id")?,
        item_id: row.try_get("item_id")?,
        name: row.try_get("name")?,
        quantity: row.try_get("quantity")?,
        price: row.try_get("price")?,
        total_amount: row.try_get("total_amount")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn transaction_from_row(row: &PgRow) -> Result<Transaction, sqlx::Error> {
    let kind: String = row.try_get("type")?;
    let kind: TransactionType = kind
        .parse()
        .map_err(|err: InventoryError| sqlx::Error::Decode(Box::new(err)))?;

    Ok(Transaction {
        id: row.try_get("id")?,
        date: row.try_get("date")?,
        kind,
        category: row.try_get("category")?,
        school_id: row.try_get("school_id")?,
        school_name: row.try_get("school_name")?,
        student_id: row.try_get("student_id")?,
        item_name: row.try_get("item_name")?,
        quantity: row.try_get("quantity")?,
        price: row.try_get("price")?,
        amount: row.try_get("amount")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Postgres keeps microseconds; truncating up front keeps returned rows equal to stored ones.
fn db_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn storage_error(err: sqlx::Error) -> InventoryError {
    InventoryError::Storage(err.to_string())
}

fn duplicate_or_storage(err: sqlx::Error, what: String) -> InventoryError {
    let unique_violation = err
        .as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation());
    if unique_violation {
        InventoryError::DuplicateName(what)
    } else {
        storage_error(err)
    }
}
