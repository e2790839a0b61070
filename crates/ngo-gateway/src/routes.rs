use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{FromRef, Path, Query, State},
    routing::{delete, get, post, put},
};
use ngo_core::{
    Category, CentralItem, DispatchOutcome, FinanceSummary, LedgerFilter, NewCentralItem,
    PurchaseHistoryFilter, PurchaseHistoryRow, SaleOutcome, SchoolItem, StockOutcome, Transaction,
    TokenVerifier,
};
use ngo_finance::LedgerEntryRequest;
use ngo_orchestrator::{
    AlumniConversion, Directory, DispatchInput, InventoryStore, SaleInput, SchoolFinance,
    StockTransferService,
};
use ngo_platform::{
    AdjustSchoolItemRequest, AlumniConversionRequest, CreateCategoryRequest, CreateItemRequest,
    DeletedResponse, DispatchRequest, ItemListResponse, LedgerListResponse, LedgerQuery,
    PurchaseHistoryQuery, RestockItemRequest, SellRequest, UpdateCategoryRequest,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::{AdminVerifier, RequireAdmin};
use crate::error::ApiResult;

pub struct AppState<S, D>
where
    S: InventoryStore,
    D: Directory,
{
    pub service: Arc<StockTransferService<S, D>>,
    pub verifier: AdminVerifier,
}

impl<S, D> AppState<S, D>
where
    S: InventoryStore,
    D: Directory,
{
    pub fn new(service: StockTransferService<S, D>, verifier: impl TokenVerifier + 'static) -> Self {
        Self {
            service: Arc::new(service),
            verifier: AdminVerifier(Arc::new(verifier)),
        }
    }
}

impl<S, D> Clone for AppState<S, D>
where
    S: InventoryStore,
    D: Directory,
{
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            verifier: self.verifier.clone(),
        }
    }
}

impl<S, D> FromRef<AppState<S, D>> for AdminVerifier
where
    S: InventoryStore,
    D: Directory,
{
    fn from_ref(state: &AppState<S, D>) -> Self {
        state.verifier.clone()
    }
}

pub fn build_router<S, D>(state: AppState<S, D>) -> Router
where
    S: InventoryStore + 'static,
    D: Directory + 'static,
{
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/api/inventory/categories",
            get(list_categories::<S, D>).post(create_category::<S, D>),
        )
        .route(
            "/api/inventory/categories/{id}",
            get(get_category::<S, D>)
                .put(update_category::<S, D>)
                .delete(delete_category::<S, D>),
        )
        .route("/api/inventory/items", post(create_item::<S, D>))
        .route(
            "/api/inventory/items/category/{category_id}",
            get(list_items_by_category::<S, D>),
        )
        .route("/api/inventory/items/{id}/stock", put(restock_item::<S, D>))
        .route("/api/inventory/items/{id}", delete(delete_item::<S, D>))
        .route(
            "/api/inventory/school-items/dispatch",
            post(dispatch_to_school::<S, D>),
        )
        .route("/api/inventory/school-items/sell", post(sell_to_student::<S, D>))
        .route(
            "/api/inventory/school-items/{school_id}",
            get(list_school_items::<S, D>),
        )
        .route(
            "/api/inventory/school-items/{school_id}/{item_id}",
            put(adjust_school_item::<S, D>),
        )
        .route(
            "/api/inventory/purchase-history",
            get(purchase_history::<S, D>),
        )
        .route(
            "/api/transactions",
            get(list_ledger::<S, D>).post(append_ledger_entry::<S, D>),
        )
        .route("/api/transactions/summary", get(finance_summary::<S, D>))
        .route(
            "/api/transactions/alumni-conversion",
            post(convert_student_to_alumni::<S, D>),
        )
        .route(
            "/api/transactions/school/{school_id}",
            get(school_finance::<S, D>).delete(delete_school_ledger::<S, D>),
        )
        .route(
            "/api/transactions/{id}",
            delete(delete_ledger_entry::<S, D>),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn list_categories<S, D>(
    _admin: RequireAdmin,
    State(state): State<AppState<S, D>>,
) -> ApiResult<Json<ItemListResponse<Category>>>
where
    S: InventoryStore + 'static,
    D: Directory + 'static,
{
    let items = state.service.list_categories().await?;
    Ok(Json(ItemListResponse { items }))
}

async fn create_category<S, D>(
    _admin: RequireAdmin,
    State(state): State<AppState<S, D>>,
    Json(payload): Json<CreateCategoryRequest>,
) -> ApiResult<Json<Category>>
where
    S: InventoryStore + 'static,
    D: Directory + 'static,
{
    let category = state
        .service
        .create_category(&payload.name, payload.description)
        .await?;
    Ok(Json(category))
}

async fn get_category<S, D>(
    _admin: RequireAdmin,
    State(state): State<AppState<S, D>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Category>>
where
    S: InventoryStore + 'static,
    D: Directory + 'static,
{
    Ok(Json(state.service.get_category(id).await?))
}

async fn update_category<S, D>(
    _admin: RequireAdmin,
    State(state): State<AppState<S, D>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> ApiResult<Json<Category>>
where
    S: InventoryStore + 'static,
    D: Directory + 'static,
{
    let category = state
        .service
        .update_category(id, payload.name, payload.description)
        .await?;
    Ok(Json(category))
}

async fn delete_category<S, D>(
    _admin: RequireAdmin,
    State(state): State<AppState<S, D>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeletedResponse>>
where
    S: InventoryStore + 'static,
    D: Directory + 'static,
{
    state.service.delete_category(id).await?;
    Ok(Json(DeletedResponse { deleted: 1 }))
}

async fn create_item<S, D>(
    _admin: RequireAdmin,
    State(state): State<AppState<S, D>>,
    Json(payload): Json<CreateItemRequest>,
) -> ApiResult<Json<CentralItem>>
where
    S: InventoryStore + 'static,
    D: Directory + 'static,
{
    let item = state
        .service
        .create_central_item(NewCentralItem {
            name: payload.name,
            description: payload.description,
            quantity: payload.quantity,
            price: payload.price,
            category_id: payload.category_id,
        })
        .await?;
    Ok(Json(item))
}

async fn list_items_by_category<S, D>(
    _admin: RequireAdmin,
    State(state): State<AppState<S, D>>,
    Path(category_id): Path<Uuid>,
) -> ApiResult<Json<ItemListResponse<CentralItem>>>
where
    S: InventoryStore + 'static,
    D: Directory + 'static,
{
    let items = state.service.list_items_by_category(category_id).await?;
    Ok(Json(ItemListResponse { items }))
}

async fn restock_item<S, D>(
    _admin: RequireAdmin,
    State(state): State<AppState<S, D>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RestockItemRequest>,
) -> ApiResult<Json<StockOutcome<CentralItem>>>
where
    S: InventoryStore + 'static,
    D: Directory + 'static,
{
    let outcome = state
        .service
        .restock_central_item(
            id,
            payload.quantity_change,
            payload.new_price,
            payload.description,
            payload.record_purchase,
        )
        .await?;
    Ok(Json(outcome))
}

async fn delete_item<S, D>(
    _admin: RequireAdmin,
    State(state): State<AppState<S, D>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeletedResponse>>
where
    S: InventoryStore + 'static,
    D: Directory + 'static,
{
    state.service.delete_central_item(id).await?;
    Ok(Json(DeletedResponse { deleted: 1 }))
}

async fn dispatch_to_school<S, D>(
    _admin: RequireAdmin,
    State(state): State<AppState<S, D>>,
    Json(payload): Json<DispatchRequest>,
) -> ApiResult<Json<DispatchOutcome>>
where
    S: InventoryStore + 'static,
    D: Directory + 'static,
{
    let outcome = state
        .service
        .dispatch_to_school(DispatchInput {
            school_id: payload.school_id,
            item_id: payload.item_id,
            name: payload.name,
            quantity: payload.quantity,
            price: payload.price,
        })
        .await?;
    Ok(Json(outcome))
}

async fn sell_to_student<S, D>(
    _admin: RequireAdmin,
    State(state): State<AppState<S, D>>,
    Json(payload): Json<SellRequest>,
) -> ApiResult<Json<SaleOutcome>>
where
    S: InventoryStore + 'static,
    D: Directory + 'static,
{
    let outcome = state
        .service
        .sell_to_student(SaleInput {
            school_id: payload.school_id,
            item_id: payload.item_id,
            student_id: payload.student_id,
            quantity: payload.quantity,
            price: payload.price,
        })
        .await?;
    Ok(Json(outcome))
}

async fn list_school_items<S, D>(
    _admin: RequireAdmin,
    State(state): State<AppState<S, D>>,
    Path(school_id): Path<String>,
) -> ApiResult<Json<ItemListResponse<SchoolItem>>>
where
    S: InventoryStore + 'static,
    D: Directory + 'static,
{
    let items = state.service.list_school_items(&school_id).await?;
    Ok(Json(ItemListResponse { items }))
}

async fn adjust_school_item<S, D>(
    _admin: RequireAdmin,
    State(state): State<AppState<S, D>>,
    Path((school_id, item_id)): Path<(String, Uuid)>,
    Json(payload): Json<AdjustSchoolItemRequest>,
) -> ApiResult<Json<StockOutcome<SchoolItem>>>
where
    S: InventoryStore + 'static,
    D: Directory + 'static,
{
    let outcome = state
        .service
        .adjust_school_item(&school_id, item_id, payload.quantity, payload.price)
        .await?;
    Ok(Json(outcome))
}

async fn purchase_history<S, D>(
    _admin: RequireAdmin,
    State(state): State<AppState<S, D>>,
    Query(query): Query<PurchaseHistoryQuery>,
) -> ApiResult<Json<ItemListResponse<PurchaseHistoryRow>>>
where
    S: InventoryStore + 'static,
    D: Directory + 'static,
{
    let filter = PurchaseHistoryFilter {
        start_date: query.start_date,
        end_date: query.end_date,
        student_id: query.student_id,
        item_name: query.item_name,
        school_id: query.school_id,
    };
    let items = state.service.purchase_history(&filter).await?;
    Ok(Json(ItemListResponse { items }))
}

async fn list_ledger<S, D>(
    _admin: RequireAdmin,
    State(state): State<AppState<S, D>>,
    Query(query): Query<LedgerQuery>,
) -> ApiResult<Json<LedgerListResponse>>
where
    S: InventoryStore + 'static,
    D: Directory + 'static,
{
    let transactions = state.service.list_ledger(&ledger_filter(query)).await?;
    Ok(Json(LedgerListResponse { transactions }))
}

async fn append_ledger_entry<S, D>(
    _admin: RequireAdmin,
    State(state): State<AppState<S, D>>,
    Json(payload): Json<LedgerEntryRequest>,
) -> ApiResult<Json<Transaction>>
where
    S: InventoryStore + 'static,
    D: Directory + 'static,
{
    Ok(Json(state.service.append_ledger_entry(payload).await?))
}

async fn delete_ledger_entry<S, D>(
    _admin: RequireAdmin,
    State(state): State<AppState<S, D>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeletedResponse>>
where
    S: InventoryStore + 'static,
    D: Directory + 'static,
{
    state.service.delete_ledger_entry(id).await?;
    Ok(Json(DeletedResponse { deleted: 1 }))
}

async fn finance_summary<S, D>(
    _admin: RequireAdmin,
    State(state): State<AppState<S, D>>,
    Query(query): Query<LedgerQuery>,
) -> ApiResult<Json<FinanceSummary>>
where
    S: InventoryStore + 'static,
    D: Directory + 'static,
{
    let summary = state.service.finance_summary(&ledger_filter(query)).await?;
    Ok(Json(summary))
}

async fn school_finance<S, D>(
    _admin: RequireAdmin,
    State(state): State<AppState<S, D>>,
    Path(school_id): Path<String>,
) -> ApiResult<Json<SchoolFinance>>
where
    S: InventoryStore + 'static,
    D: Directory + 'static,
{
    Ok(Json(state.service.school_finance(&school_id).await?))
}

async fn delete_school_ledger<S, D>(
    _admin: RequireAdmin,
    State(state): State<AppState<S, D>>,
    Path(school_id): Path<String>,
) -> ApiResult<Json<DeletedResponse>>
where
    S: InventoryStore + 'static,
    D: Directory + 'static,
{
    let deleted = state.service.delete_school_ledger(&school_id).await?;
    Ok(Json(DeletedResponse { deleted }))
}

async fn convert_student_to_alumni<S, D>(
    _admin: RequireAdmin,
    State(state): State<AppState<S, D>>,
    Json(payload): Json<AlumniConversionRequest>,
) -> ApiResult<Json<AlumniConversion>>
where
    S: InventoryStore + 'static,
    D: Directory + 'static,
{
    let conversion = state
        .service
        .convert_student_to_alumni(&payload.student_id)
        .await?;
    Ok(Json(conversion))
}

fn ledger_filter(query: LedgerQuery) -> LedgerFilter {
    let non_empty = |value: Option<String>| {
        value
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };
    LedgerFilter {
        school_id: non_empty(query.school_id),
        student_id: non_empty(query.student_id),
    }
}
