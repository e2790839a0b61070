pub mod auth;
pub mod config;
pub mod contracts;
pub mod db;
pub mod directory;
pub mod postgres;

pub use auth::StaticTokenVerifier;
pub use config::ServiceConfig;
pub use contracts::{
    AdjustSchoolItemRequest, AlumniConversionRequest, CreateCategoryRequest, CreateItemRequest,
    DeletedResponse, DispatchRequest, ItemListResponse, LedgerListResponse, LedgerQuery,
    PurchaseHistoryQuery, RestockItemRequest, SellRequest, UpdateCategoryRequest,
};
pub use db::{connect_database, run_migrations};
pub use directory::PgDirectory;
pub use postgres::PgStore;
