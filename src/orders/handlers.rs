use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode},
    routing::{get, patch},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{OrderCreated, OrderDeleted, OrderEnvelope, OrderList, OrderRequest},
    repo_types::Order,
    services::validate_order,
};
use crate::{
    auth::{
        extractors::{AdminUser, AuthUser},
        handlers::bad_body,
    },
    error::{AppError, AppResult},
    state::AppState,
};

// --- routers ---

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/", get(list_orders).post(create_order))
        .route(
            "/orders/:id",
            get(get_order).put(replace_order).delete(delete_order),
        )
}

pub fn status_routes() -> Router<AppState> {
    Router::new()
        .route("/orders/:id/done", patch(toggle_done))
        .route("/orders/:id/paid", patch(toggle_paid))
}

// --- handlers ---

/// POST /orders/
#[instrument(skip(state, payload))]
pub async fn create_order(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> AppResult<(StatusCode, HeaderMap, Json<OrderCreated>)> {
    let Json(payload) = payload.map_err(bad_body)?;
    let new = validate_order(payload)?;
    let order = state.orders.create(new).await?;
    info!(order_id = order.id, user_id, "order created");

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/orders/{}", order.id)) {
        headers.insert(LOCATION, location);
    }

    Ok((
        StatusCode::CREATED,
        headers,
        Json(OrderCreated {
            message: "Success",
            id: order.id,
        }),
    ))
}

/// GET /orders/
#[instrument(skip(state))]
pub async fn list_orders(State(state): State<AppState>) -> AppResult<Json<OrderList>> {
    let data = state.orders.list().await?;
    Ok(Json(OrderList { data }))
}

#[instrument(skip(state))]
pub async fn get_order(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderEnvelope>> {
    let data = find(&state, id).await?;
    Ok(Json(OrderEnvelope { data }))
}

/// PUT /orders/:id replaces the customer-supplied fields; status flags stay.
#[instrument(skip(state, admin, payload))]
pub async fn replace_order(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> AppResult<Json<OrderEnvelope>> {
    let Json(payload) = payload.map_err(bad_body)?;
    let new = validate_order(payload)?;
    let current = find(&state, id).await?;

    let edited = Order {
        name: new.name,
        email: new.email,
        phone_number: new.phone_number,
        problem_statement: new.problem_statement,
        leading_channel: new.leading_channel,
        project_type: new.project_type,
        preferred_software: new.preferred_software,
        description: new.description,
        ..current
    };
    let data = state
        .orders
        .update(&edited)
        .await?
        .ok_or(AppError::NotFound("order"))?;
    info!(order_id = id, admin_id = admin.id, "order replaced");
    Ok(Json(OrderEnvelope { data }))
}

#[instrument(skip(state, admin))]
pub async fn toggle_done(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderEnvelope>> {
    let data = state
        .orders
        .toggle_done(id)
        .await?
        .ok_or(AppError::NotFound("order"))?;
    info!(order_id = id, admin_id = admin.id, done = data.done, "order done toggled");
    Ok(Json(OrderEnvelope { data }))
}

#[instrument(skip(state, admin))]
pub async fn toggle_paid(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderEnvelope>> {
    let data = state
        .orders
        .toggle_paid(id)
        .await?
        .ok_or(AppError::NotFound("order"))?;
    info!(order_id = id, admin_id = admin.id, paid = data.paid, "order paid toggled");
    Ok(Json(OrderEnvelope { data }))
}

#[instrument(skip(state, admin))]
pub async fn delete_order(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderDeleted>> {
    if !state.orders.delete(id).await? {
        return Err(AppError::NotFound("order"));
    }
    info!(order_id = id, admin_id = admin.id, "order deleted");
    Ok(Json(OrderDeleted {
        message: "Deleted",
        id,
    }))
}

async fn find(state: &AppState, id: i64) -> AppResult<Order> {
    state
        .orders
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("order"))
}
