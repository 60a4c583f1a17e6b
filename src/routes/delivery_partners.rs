use anyhow::Context;
use axum::{
    Extension, Json,
    extract::State,
    response::IntoResponse,
};
use diesel::{ExpressionMethods, QueryDsl};
use diesel_async::RunQueryDsl;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    core::{
        app_error::{AppError, StdResponse},
        app_state::AppState,
        middleware, outbox,
    },
    dispatch::{self, DispatchResult},
    events::DeliveryRequestedEvent,
    models::{DeliveryPartnerEntity, OrderEntity},
    schema::{delivery_partners, orders},
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    utoipa_axum::router::OpenApiRouter::new().nest(
        "/delivery-partners",
        OpenApiRouter::new()
            .routes(utoipa_axum::routes!(notify_delivery_partners))
            .route_layer(axum::middleware::from_fn(
                middleware::sellers_authorization,
            )),
    )
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct NotifyDeliveryPartnersReq {
    order_id: i32,
    message: String,
    is_assigned: bool,
    store_id: i32,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
struct PartnerNotification {
    order_id: i32,
    message: String,
    is_assigned: bool,
}

/// Broadcast an order alert to every available delivery partner at once.
/// First-accept-wins: the external assignment service arbitrates concurrent
/// acceptances and reports the single winner back over the broker. Partner
/// callbacks that fail are collected in the result, not raised.
#[utoipa::path(
    post,
    path = "/notify",
    tags = ["Delivery partners"],
    request_body = NotifyDeliveryPartnersReq,
    responses(
        (status = 200, description = "Dispatch outcome per partner", body = StdResponse<DispatchResult, String>)
    )
)]
async fn notify_delivery_partners(
    State(state): State<AppState>,
    Extension(store_id): Extension<i32>,
    Json(body): Json<NotifyDeliveryPartnersReq>,
) -> Result<impl IntoResponse, AppError> {
    if body.store_id != store_id {
        return Err(AppError::ForbiddenResource(
            "Seller does not own this store".into(),
        ));
    }

    // The connection goes back to the pool before the fan-out; partner
    // webhooks can be slow and must not hold a pooled connection hostage.
    let (order, partners) = {
        let conn = &mut state
            .db_pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        let order: OrderEntity = orders::table
            .find(body.order_id)
            .filter(orders::store_id.eq(store_id))
            .get_result(conn)
            .await
            .map_err(|_| AppError::NotFound)?;

        let partners: Vec<DeliveryPartnerEntity> = delivery_partners::table
            .filter(delivery_partners::is_available.eq(true))
            .get_results(conn)
            .await
            .context("Failed to get delivery partners")?;

        (order, partners)
    };

    let notification = PartnerNotification {
        order_id: order.id,
        message: body.message.clone(),
        is_assigned: body.is_assigned,
    };
    let client = state.http_client.clone();

    let result = dispatch::fan_out(&partners, |partner| {
        let client = client.clone();
        let url = partner.callback_url.clone();
        let notification = notification.clone();
        async move {
            client
                .post(&url)
                .json(&notification)
                .send()
                .await
                .context("Failed to reach delivery partner")?
                .error_for_status()
                .context("Delivery partner rejected notification")?;
            Ok(())
        }
    })
    .await;

    tracing::info!(
        "Order #{} broadcast to {} partners ({} failed)",
        order.id,
        result.requested,
        result.failed.len()
    );

    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    outbox::publish(
        conn,
        "deliveries.delivery_requested".into(),
        DeliveryRequestedEvent {
            order_id: order.id,
            store_id,
            message: body.message,
        },
    )
    .await?;

    Ok(StdResponse {
        data: Some(result),
        message: Some("Delivery partners notified"),
    })
}
