use std::collections::HashMap;

use anyhow::Context;
use axum::{
    Extension,
    extract::{Query, State},
    response::IntoResponse,
};
use diesel::{ExpressionMethods, QueryDsl};
use diesel_async::RunQueryDsl;
use serde::Deserialize;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    api::products::get_product_metadata,
    core::{
        app_error::{AppError, StdResponse},
        app_state::AppState,
        middleware,
    },
    models::{OrderEntity, OrderItemEntity},
    projection::{self, OrderView},
    schema::{order_items, orders},
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    utoipa_axum::router::OpenApiRouter::new().nest(
        "/order-items",
        OpenApiRouter::new()
            .routes(utoipa_axum::routes!(get_order_items))
            .route_layer(axum::middleware::from_fn(
                middleware::sellers_authorization,
            )),
    )
}

#[derive(Deserialize)]
struct OrderItemsQuery {
    #[serde(rename = "orderId")]
    order_id: i32,
}

/// Fetch an order's items projected for display, with catalog metadata
/// joined in where the catalog still knows the product. A catalog outage
/// degrades the views to the purchase-time snapshots instead of failing.
#[utoipa::path(
    get,
    path = "/",
    tags = ["Order items"],
    params(
        ("orderId" = i32, Query, description = "Order whose items to fetch")
    ),
    responses(
        (status = 200, description = "Get order items successfully", body = StdResponse<OrderView, String>)
    )
)]
async fn get_order_items(
    Query(query): Query<OrderItemsQuery>,
    State(state): State<AppState>,
    Extension(store_id): Extension<i32>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let order: OrderEntity = orders::table
        .find(query.order_id)
        .filter(orders::store_id.eq(store_id))
        .get_result(conn)
        .await
        .map_err(|_| AppError::NotFound)?;

    let items: Vec<OrderItemEntity> = order_items::table
        .filter(order_items::order_id.eq(order.id))
        .get_results(conn)
        .await
        .context("Failed to get order items")?;

    let product_ids = items.iter().map(|item| item.product_id).collect();
    let metadata = get_product_metadata(state.http_client, product_ids)
        .await
        .unwrap_or_else(|err| {
            tracing::warn!("Falling back to snapshot-only item views: {err:#}");
            HashMap::new()
        });

    let view = projection::project_order(&order, &items, &metadata);

    Ok(StdResponse {
        data: Some(view),
        message: Some("Get order items successfully"),
    })
}
