use crate::error::{EndpointError, KitchenError, KitchenServiceError};
use crate::metrics;
use crate::service::KitchenService;
use crate::state::KitchenAppState;
use crate::stream::StreamingResponse;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use axum_extra::extract::WithRejection;
use const_format::concatcp;
use kitchen_core::KitchenEngine;
use kitchen_core::model::{
    BarcodeProduct, Challenge, Deal, InventoryItem, NewChallenge, NewDeal, NewEntity,
    NewInventoryItem, NewRecipe, NewUser, NewWasteItem, Recipe, User, WasteItem,
};
use kitchen_core::views::ExpiryNotification;
use requests::JsonBody;
use responses::{HealthResponse, MessageResponse};
use serde::Serialize;
use serde_json::json;
use tracing::{info, instrument};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

mod requests;
mod responses;

const ROOT_PATH: &str = "/";
const API_ROOT_PATH: &str = "/api";

const SWAGGER_UI_PATH: &str = concatcp!(API_ROOT_PATH, "/swagger-ui");
const OPENAPI_PATH: &str = concatcp!(API_ROOT_PATH, "/api-docs/openapi.json");

const HEALTH_PATH: &str = "/health";
const METRICS_PATH: &str = "/metrics";
const INVENTORY_PATH: &str = "/inventory";
const INVENTORY_ITEM_PATH: &str = concatcp!(INVENTORY_PATH, "/{item_id}");
const BARCODE_PATH: &str = "/barcode/{code}";
const RECIPES_PATH: &str = "/recipes";
const EXPIRING_RECIPES_PATH: &str = concatcp!(RECIPES_PATH, "/expiring");
const CHALLENGES_PATH: &str = "/challenges";
const WASTE_PATH: &str = "/waste";
const DEALS_PATH: &str = "/deals";
const USERS_PATH: &str = "/users";
const EXPIRY_NOTIFICATIONS_PATH: &str = "/notifications/expiring";

#[derive(OpenApi)]
#[openapi(
    info(title = "SmartKitchen API"),
    nest(
        (path = API_ROOT_PATH, api = KitchenDocs),
    )
)]
struct ApiDoc;

#[derive(OpenApi)]
#[openapi(paths(
    health,
    list_inventory,
    create_inventory_item,
    update_inventory_item,
    delete_inventory_item,
    lookup_barcode,
    list_recipes,
    create_recipe,
    list_expiring_recipes,
    list_active_challenges,
    create_challenge,
    list_waste,
    create_waste_item,
    list_deals,
    create_deal,
    list_users,
    create_user,
    list_expiry_notifications,
))]
struct KitchenDocs;

type ApiResult = Result<Response, EndpointError<KitchenServiceError>>;

pub fn build<T: KitchenEngine>(app_state: KitchenAppState<T>) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(routes(app_state))
        .split_for_parts();

    router
        .merge(SwaggerUi::new(SWAGGER_UI_PATH).url(OPENAPI_PATH, api))
        .fallback(unknown_route)
        .method_not_allowed_fallback(unsupported_method)
}

fn routes<S, T: KitchenEngine>(app_state: KitchenAppState<T>) -> OpenApiRouter<S> {
    let api_router = OpenApiRouter::new()
        .route(HEALTH_PATH, get(health))
        .route(
            INVENTORY_PATH,
            get(list_inventory::<T>).post(create_inventory_item::<T>),
        )
        .route(
            INVENTORY_ITEM_PATH,
            put(update_inventory_item::<T>).delete(delete_inventory_item::<T>),
        )
        .route(BARCODE_PATH, get(lookup_barcode::<T>))
        .route(RECIPES_PATH, get(list_recipes::<T>).post(create_recipe::<T>))
        .route(EXPIRING_RECIPES_PATH, get(list_expiring_recipes::<T>))
        .route(
            CHALLENGES_PATH,
            get(list_active_challenges::<T>).post(create_challenge::<T>),
        )
        .route(WASTE_PATH, get(list_waste::<T>).post(create_waste_item::<T>))
        .route(DEALS_PATH, get(list_deals::<T>).post(create_deal::<T>))
        .route(USERS_PATH, get(list_users::<T>).post(create_user::<T>))
        .route(
            EXPIRY_NOTIFICATIONS_PATH,
            get(list_expiry_notifications::<T>),
        );

    let api_router = match app_state.metrics.clone() {
        Some(handle) => {
            info!("metrics enabled, setting up metrics handler");
            api_router
                .route(METRICS_PATH, get(move || async move { handle.render() }))
                .route_layer(middleware::from_fn(metrics::track_http))
        }
        None => {
            info!("metrics not enabled, setting up service unavailable metrics handler");
            api_router.route(METRICS_PATH, get(metrics_disabled))
        }
    };

    OpenApiRouter::new()
        .route(ROOT_PATH, get(root))
        .nest(API_ROOT_PATH, api_router)
        .with_state(app_state)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "SmartKitchen API is running!" }))
}

async fn metrics_disabled() -> impl IntoResponse {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        "Metrics endpoint is disabled. Metrics must be enabled and the service restarted",
    )
}

async fn unknown_route() -> KitchenError {
    KitchenError::route_not_found()
}

async fn unsupported_method() -> KitchenError {
    KitchenError::method_not_allowed()
}

fn list_response<R>(records: Vec<R>) -> Response
where
    R: Serialize + Send + Sync + 'static,
{
    StreamingResponse::ok(records).into_response()
}

async fn create_response<T, N>(service: &KitchenService<T>, new: N) -> ApiResult
where
    T: KitchenEngine,
    N: NewEntity,
{
    let entity = service.create(new).await?;
    Ok(MessageResponse::created(&entity).into_response())
}

#[utoipa::path(
    get,
    path = HEALTH_PATH,
    tag = "health",
    responses(
        (status = OK, description = "The service is up", body = HealthResponse),
    )
)]
async fn health() -> HealthResponse {
    HealthResponse::healthy()
}

/// Every inventory item, oldest first.
#[utoipa::path(
    get,
    path = INVENTORY_PATH,
    tag = "inventory",
    responses(
        (status = OK, description = "All inventory items", body = Vec<InventoryItem>),
        (status = INTERNAL_SERVER_ERROR, description = "Storage failed", body = KitchenError),
    )
)]
#[instrument(skip_all, err(Debug))]
async fn list_inventory<T: KitchenEngine>(State(service): State<KitchenService<T>>) -> ApiResult {
    Ok(list_response(service.list::<InventoryItem>().await?))
}

#[utoipa::path(
    post,
    path = INVENTORY_PATH,
    tag = "inventory",
    responses(
        (status = OK, description = "The item was stored", body = MessageResponse),
        (status = UNPROCESSABLE_ENTITY, description = "A required field was missing or had the wrong type", body = KitchenError),
    ),
    request_body = NewInventoryItem
)]
#[instrument(skip_all, err(Debug), fields(req.name = %item.name))]
async fn create_inventory_item<T: KitchenEngine>(
    State(service): State<KitchenService<T>>,
    WithRejection(Json(item), _): JsonBody<NewInventoryItem>,
) -> ApiResult {
    create_response(&service, item).await
}

/// Replaces every field of the item. Omitted optional fields go back to their defaults.
#[utoipa::path(
    put,
    path = INVENTORY_ITEM_PATH,
    tag = "inventory",
    responses(
        (status = OK, description = "The item was replaced", body = MessageResponse),
        (status = NOT_FOUND, description = "No item has the given id", body = KitchenError),
        (status = UNPROCESSABLE_ENTITY, description = "A required field was missing or had the wrong type", body = KitchenError),
    ),
    params(
        ("item_id" = String, Path, description = "Id of the item to replace"),
    ),
    request_body = NewInventoryItem
)]
#[instrument(skip(service, item), err(Debug))]
async fn update_inventory_item<T: KitchenEngine>(
    State(service): State<KitchenService<T>>,
    Path(item_id): Path<String>,
    WithRejection(Json(item), _): JsonBody<NewInventoryItem>,
) -> ApiResult {
    let res = match service.replace_inventory(item_id, item).await? {
        Some(_) => MessageResponse::new("Item updated successfully").into_response(),
        None => KitchenError::item_not_found().into_response(),
    };
    Ok(res)
}

#[utoipa::path(
    delete,
    path = INVENTORY_ITEM_PATH,
    tag = "inventory",
    responses(
        (status = OK, description = "The item was deleted", body = MessageResponse),
        (status = NOT_FOUND, description = "No item has the given id", body = KitchenError),
    ),
    params(
        ("item_id" = String, Path, description = "Id of the item to delete"),
    )
)]
#[instrument(skip(service), err(Debug))]
async fn delete_inventory_item<T: KitchenEngine>(
    State(service): State<KitchenService<T>>,
    Path(item_id): Path<String>,
) -> ApiResult {
    let res = match service.delete_inventory(&item_id).await? {
        Some(_) => MessageResponse::new("Item deleted successfully").into_response(),
        None => KitchenError::item_not_found().into_response(),
    };
    Ok(res)
}

/// Stored products first, then the built-in reference table. Unknown codes get a
/// placeholder product that is not stored.
#[utoipa::path(
    get,
    path = BARCODE_PATH,
    tag = "barcode",
    responses(
        (status = OK, description = "The product for the barcode", body = BarcodeProduct),
    ),
    params(
        ("code" = String, Path, description = "The scanned barcode"),
    )
)]
#[instrument(skip(service), err(Debug))]
async fn lookup_barcode<T: KitchenEngine>(
    State(service): State<KitchenService<T>>,
    Path(code): Path<String>,
) -> ApiResult {
    Ok(Json(service.lookup_barcode(&code).await?).into_response())
}

#[utoipa::path(
    get,
    path = RECIPES_PATH,
    tag = "recipes",
    responses(
        (status = OK, description = "All recipes", body = Vec<Recipe>),
    )
)]
#[instrument(skip_all, err(Debug))]
async fn list_recipes<T: KitchenEngine>(State(service): State<KitchenService<T>>) -> ApiResult {
    Ok(list_response(service.list::<Recipe>().await?))
}

#[utoipa::path(
    post,
    path = RECIPES_PATH,
    tag = "recipes",
    responses(
        (status = OK, description = "The recipe was stored", body = MessageResponse),
        (status = UNPROCESSABLE_ENTITY, description = "A required field was missing or had the wrong type", body = KitchenError),
    ),
    request_body = NewRecipe
)]
#[instrument(skip_all, err(Debug), fields(req.name = %recipe.name))]
async fn create_recipe<T: KitchenEngine>(
    State(service): State<KitchenService<T>>,
    WithRejection(Json(recipe), _): JsonBody<NewRecipe>,
) -> ApiResult {
    create_response(&service, recipe).await
}

/// Recipes that use at least one in-stock item expiring within three days.
#[utoipa::path(
    get,
    path = EXPIRING_RECIPES_PATH,
    tag = "recipes",
    responses(
        (status = OK, description = "Recipes using soon-to-expire items", body = Vec<Recipe>),
    )
)]
#[instrument(skip_all, err(Debug))]
async fn list_expiring_recipes<T: KitchenEngine>(
    State(service): State<KitchenService<T>>,
) -> ApiResult {
    Ok(list_response(service.expiring_recipes().await?))
}

/// Only challenges whose status is `active`.
#[utoipa::path(
    get,
    path = CHALLENGES_PATH,
    tag = "challenges",
    responses(
        (status = OK, description = "Active challenges", body = Vec<Challenge>),
    )
)]
#[instrument(skip_all, err(Debug))]
async fn list_active_challenges<T: KitchenEngine>(
    State(service): State<KitchenService<T>>,
) -> ApiResult {
    Ok(list_response(service.active_challenges().await?))
}

#[utoipa::path(
    post,
    path = CHALLENGES_PATH,
    tag = "challenges",
    responses(
        (status = OK, description = "The challenge was stored", body = MessageResponse),
        (status = UNPROCESSABLE_ENTITY, description = "A required field was missing or had the wrong type", body = KitchenError),
    ),
    request_body = NewChallenge
)]
#[instrument(skip_all, err(Debug), fields(req.title = %challenge.title))]
async fn create_challenge<T: KitchenEngine>(
    State(service): State<KitchenService<T>>,
    WithRejection(Json(challenge), _): JsonBody<NewChallenge>,
) -> ApiResult {
    create_response(&service, challenge).await
}

#[utoipa::path(
    get,
    path = WASTE_PATH,
    tag = "waste",
    responses(
        (status = OK, description = "Every discarded item", body = Vec<WasteItem>),
    )
)]
#[instrument(skip_all, err(Debug))]
async fn list_waste<T: KitchenEngine>(State(service): State<KitchenService<T>>) -> ApiResult {
    Ok(list_response(service.list::<WasteItem>().await?))
}

#[utoipa::path(
    post,
    path = WASTE_PATH,
    tag = "waste",
    responses(
        (status = OK, description = "The waste record was stored", body = MessageResponse),
        (status = UNPROCESSABLE_ENTITY, description = "A required field was missing or had the wrong type", body = KitchenError),
    ),
    request_body = NewWasteItem
)]
#[instrument(skip_all, err(Debug), fields(req.item_name = %waste.item_name))]
async fn create_waste_item<T: KitchenEngine>(
    State(service): State<KitchenService<T>>,
    WithRejection(Json(waste), _): JsonBody<NewWasteItem>,
) -> ApiResult {
    create_response(&service, waste).await
}

#[utoipa::path(
    get,
    path = DEALS_PATH,
    tag = "deals",
    responses(
        (status = OK, description = "Every deal, expired or not", body = Vec<Deal>),
    )
)]
#[instrument(skip_all, err(Debug))]
async fn list_deals<T: KitchenEngine>(State(service): State<KitchenService<T>>) -> ApiResult {
    Ok(list_response(service.list::<Deal>().await?))
}

#[utoipa::path(
    post,
    path = DEALS_PATH,
    tag = "deals",
    responses(
        (status = OK, description = "The deal was stored", body = MessageResponse),
        (status = UNPROCESSABLE_ENTITY, description = "A required field was missing or had the wrong type", body = KitchenError),
    ),
    request_body = NewDeal
)]
#[instrument(skip_all, err(Debug), fields(req.title = %deal.title))]
async fn create_deal<T: KitchenEngine>(
    State(service): State<KitchenService<T>>,
    WithRejection(Json(deal), _): JsonBody<NewDeal>,
) -> ApiResult {
    create_response(&service, deal).await
}

#[utoipa::path(
    get,
    path = USERS_PATH,
    tag = "users",
    responses(
        (status = OK, description = "Every user", body = Vec<User>),
    )
)]
#[instrument(skip_all, err(Debug))]
async fn list_users<T: KitchenEngine>(State(service): State<KitchenService<T>>) -> ApiResult {
    Ok(list_response(service.list::<User>().await?))
}

#[utoipa::path(
    post,
    path = USERS_PATH,
    tag = "users",
    responses(
        (status = OK, description = "The user was stored", body = MessageResponse),
        (status = UNPROCESSABLE_ENTITY, description = "A required field was missing or had the wrong type", body = KitchenError),
    ),
    request_body = NewUser
)]
#[instrument(skip_all, err(Debug), fields(req.name = %user.name))]
async fn create_user<T: KitchenEngine>(
    State(service): State<KitchenService<T>>,
    WithRejection(Json(user), _): JsonBody<NewUser>,
) -> ApiResult {
    create_response(&service, user).await
}

/// One warning per in-stock item expiring within three days.
#[utoipa::path(
    get,
    path = EXPIRY_NOTIFICATIONS_PATH,
    tag = "notifications",
    responses(
        (status = OK, description = "Expiry warnings", body = Vec<ExpiryNotification>),
    )
)]
#[instrument(skip_all, err(Debug))]
async fn list_expiry_notifications<T: KitchenEngine>(
    State(service): State<KitchenService<T>>,
) -> ApiResult {
    Ok(list_response(service.expiry_notifications().await?))
}
