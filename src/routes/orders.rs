use std::collections::HashMap;

use anyhow::Context;
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use diesel::{ExpressionMethods, QueryDsl, SelectableHelper};
use diesel_async::{AsyncConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    core::{
        app_error::{AppError, StdResponse},
        app_state::AppState,
        middleware, outbox,
    },
    events::OrderStatusChangedEvent,
    models::{OrderEntity, OrderItemEntity},
    schema::{order_items, orders},
    status::{self, OrderStatus, UnknownStatus},
};

/// Defines seller-facing order-management routes with OpenAPI specs.
pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    utoipa_axum::router::OpenApiRouter::new().nest(
        "/orders",
        OpenApiRouter::new()
            .routes(utoipa_axum::routes!(get_store_orders))
            .routes(utoipa_axum::routes!(get_store_orders_summary))
            .routes(utoipa_axum::routes!(update_order_status))
            .route_layer(axum::middleware::from_fn(
                middleware::sellers_authorization,
            )),
    )
}

#[derive(Deserialize)]
struct StoreOrdersQuery {
    status: Option<String>,
}

#[derive(Serialize, ToSchema)]
struct StoreOrderRes {
    pub order: OrderEntity,
    pub items: Vec<OrderItemEntity>,
}

/// Fetch all orders belonging to a store, newest first. An empty result is
/// an empty list, never an error.
#[utoipa::path(
    get,
    path = "/store/{store_id}",
    tags = ["Orders"],
    params(
        ("store_id" = i32, Path, description = "Store whose orders to list"),
        ("status" = Option<String>, Query, description = "Restrict to one lifecycle status")
    ),
    responses(
        (status = 200, description = "List store orders", body = StdResponse<Vec<StoreOrderRes>, String>)
    )
)]
async fn get_store_orders(
    Path(store_id): Path<i32>,
    Query(query): Query<StoreOrdersQuery>,
    State(state): State<AppState>,
    Extension(caller_store_id): Extension<i32>,
) -> Result<impl IntoResponse, AppError> {
    if store_id != caller_store_id {
        return Err(AppError::ForbiddenResource(
            "Seller does not own this store".into(),
        ));
    }

    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let fetched: Vec<OrderEntity> = orders::table
        .filter(orders::store_id.eq(store_id))
        .order_by(orders::created_at.desc())
        .get_results(conn)
        .await
        .context("Failed to get store orders")?;

    let fetched = match query.status.as_deref() {
        Some(raw) => {
            let wanted: OrderStatus = raw
                .parse()
                .map_err(|err: UnknownStatus| AppError::BadRequest(err.to_string()))?;
            status::filter_by_status(fetched, wanted)
        }
        None => fetched,
    };

    let order_ids: Vec<i32> = fetched.iter().map(|order| order.id).collect();
    let items: Vec<OrderItemEntity> = order_items::table
        .filter(order_items::order_id.eq_any(&order_ids))
        .get_results(conn)
        .await
        .context("Failed to get order items")?;

    let mut group: HashMap<i32, Vec<OrderItemEntity>> = HashMap::new();
    for item in items {
        group.entry(item.order_id).or_default().push(item);
    }

    let orders_with_items: Vec<StoreOrderRes> = fetched
        .into_iter()
        .map(|order| StoreOrderRes {
            items: group.remove(&order.id).unwrap_or_default(),
            order,
        })
        .collect();

    Ok(StdResponse {
        data: Some(orders_with_items),
        message: Some("Get store orders successfully"),
    })
}

#[derive(Serialize, ToSchema)]
struct StoreOrdersSummaryRes {
    pub counts: HashMap<String, usize>,
}

/// Per-status order counts for the dashboard overview cards.
#[utoipa::path(
    get,
    path = "/store/{store_id}/summary",
    tags = ["Orders"],
    params(
        ("store_id" = i32, Path, description = "Store whose orders to summarize")
    ),
    responses(
        (status = 200, description = "Per-status order counts", body = StdResponse<StoreOrdersSummaryRes, String>)
    )
)]
async fn get_store_orders_summary(
    Path(store_id): Path<i32>,
    State(state): State<AppState>,
    Extension(caller_store_id): Extension<i32>,
) -> Result<impl IntoResponse, AppError> {
    if store_id != caller_store_id {
        return Err(AppError::ForbiddenResource(
            "Seller does not own this store".into(),
        ));
    }

    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let statuses: Vec<String> = orders::table
        .filter(orders::store_id.eq(store_id))
        .select(orders::status)
        .get_results(conn)
        .await
        .context("Failed to get store order statuses")?;

    Ok(StdResponse {
        data: Some(StoreOrdersSummaryRes {
            counts: status_counts(&statuses),
        }),
        message: Some("Get store order summary successfully"),
    })
}

fn status_counts(statuses: &[String]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for status in statuses {
        *counts.entry(status.clone()).or_insert(0) += 1;
    }
    counts
}

#[derive(Deserialize, ToSchema)]
struct UpdateOrderStatusReq {
    status: String,
}

/// Overwrite an order's lifecycle status. The value must be one of the
/// enumerated statuses and the order must belong to the caller's store; no
/// other field is touched. A change event goes out through the outbox in
/// the same transaction.
#[utoipa::path(
    put,
    path = "/{id}/status",
    tags = ["Orders"],
    params(
        ("id" = i32, Path, description = "Order ID to transition")
    ),
    request_body = UpdateOrderStatusReq,
    responses(
        (status = 200, description = "Updated order status successfully", body = StdResponse<OrderEntity, String>)
    )
)]
async fn update_order_status(
    Path(id): Path<i32>,
    State(state): State<AppState>,
    Extension(store_id): Extension<i32>,
    Json(body): Json<UpdateOrderStatusReq>,
) -> Result<impl IntoResponse, AppError> {
    // Reject unknown statuses before anything reaches the database.
    let new_status: OrderStatus = body
        .status
        .parse()
        .map_err(|err: UnknownStatus| AppError::BadRequest(err.to_string()))?;

    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let updated_order = conn
        .transaction(move |conn| {
            Box::pin(async move {
                let updated_order: OrderEntity = diesel::update(
                    orders::table
                        .find(id)
                        .filter(orders::store_id.eq(store_id)),
                )
                .set((
                    orders::status.eq(new_status.as_str()),
                    orders::updated_at.eq(diesel::dsl::now),
                ))
                .returning(OrderEntity::as_returning())
                .get_result(conn)
                .await
                .map_err(|_| AppError::NotFound)?;

                outbox::publish(
                    conn,
                    "orders.status_changed".into(),
                    OrderStatusChangedEvent {
                        order_id: updated_order.id,
                        status: new_status.to_string(),
                    },
                )
                .await?;

                Ok::<OrderEntity, AppError>(updated_order)
            })
        })
        .await?;

    Ok(StdResponse {
        data: Some(updated_order),
        message: Some("Updated order status successfully"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_group_statuses_by_value() {
        let statuses: Vec<String> = ["pending", "delivered", "pending", "cancelled"]
            .into_iter()
            .map(String::from)
            .collect();
        let counts = status_counts(&statuses);
        assert_eq!(counts.get("pending"), Some(&2));
        assert_eq!(counts.get("delivered"), Some(&1));
        assert_eq!(counts.get("cancelled"), Some(&1));
        assert_eq!(counts.get("shipped"), None);
    }

    #[test]
    fn counts_on_empty_input_are_empty() {
        assert!(status_counts(&[]).is_empty());
    }
}
