pub mod directory;
pub mod error;
pub mod models;
pub mod money;
pub mod storage;

pub use directory::{SchoolDirectory, StudentDirectory, TokenVerifier};
pub use error::{InventoryError, InventoryResult};
pub use models::{
    Category, CategoryUpdate, CentralItem, DispatchCommand, DispatchOutcome, FinanceSummary,
    LedgerFilter, NewCategory, NewCentralItem, NewTransaction, PurchaseHistoryFilter,
    PurchaseHistoryRow, RestockCommand, SaleCommand, SaleOutcome, SchoolItem, StockOutcome,
    Transaction, TransactionType,
};
pub use money::{ensure_unit_price, line_amount, round2};
pub use storage::{CategoryStore, CentralItemStore, LedgerStore, SchoolItemStore};
