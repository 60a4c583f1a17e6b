use std::sync::Arc;

use anyhow::Result;
use diesel::ExpressionMethods;
use diesel_async::RunQueryDsl;
use futures::future::BoxFuture;
use lapin::{message::Delivery, options::BasicAckOptions};
use tracing::info;

use crate::core::app_state::AppState;
use crate::events::{DeliveryCompletedEvent, PartnerAssignedEvent};
use crate::schema::orders;
use crate::status::OrderStatus;

/// Applies the assignment the external first-accept-wins arbiter resolved.
/// Terminal orders are left alone; a late assignment of a cancelled order
/// must not resurrect it.
pub fn partner_assigned(
    delivery: Delivery,
    state: Arc<AppState>,
) -> BoxFuture<'static, Result<()>> {
    Box::pin(async move {
        let conn = &mut state.db_pool.get().await?;
        let payload: PartnerAssignedEvent = serde_json::from_str(str::from_utf8(&delivery.data)?)?;
        info!("Received event: {:?}", payload);

        let updated = diesel::update(orders::table)
            .filter(orders::id.eq(payload.order_id))
            .filter(orders::status.ne_all(OrderStatus::TERMINAL.to_vec()))
            .set((
                orders::status.eq(OrderStatus::AssignedForDelivery.as_str()),
                orders::delivery_partner_id.eq(payload.partner_id),
                orders::updated_at.eq(diesel::dsl::now),
            ))
            .execute(conn)
            .await?;

        if updated == 0 {
            info!(
                "Order #{} is already closed, assignment skipped",
                payload.order_id
            );
        } else {
            info!(
                "Order #{} has been assigned to partner {}",
                payload.order_id, payload.partner_id
            );
        }

        delivery.ack(BasicAckOptions::default()).await?;

        Ok(())
    })
}

/// Marks an order delivered once the partner reports completion. Terminal
/// orders are left alone; a completion arriving after a cancellation must
/// not flip the order to `delivered`.
pub fn delivery_completed(
    delivery: Delivery,
    state: Arc<AppState>,
) -> BoxFuture<'static, Result<()>> {
    Box::pin(async move {
        let conn = &mut state.db_pool.get().await?;
        let payload: DeliveryCompletedEvent =
            serde_json::from_str(str::from_utf8(&delivery.data)?)?;
        info!("Received event: {:?}", payload);

        let updated = diesel::update(orders::table)
            .filter(orders::id.eq(payload.order_id))
            .filter(orders::status.ne_all(OrderStatus::TERMINAL.to_vec()))
            .set((
                orders::status.eq(OrderStatus::Delivered.as_str()),
                orders::updated_at.eq(diesel::dsl::now),
            ))
            .execute(conn)
            .await?;

        if updated == 0 {
            info!(
                "Order #{} is already closed, completion skipped",
                payload.order_id
            );
        } else {
            info!(
                "Order #{} has been successfully delivered",
                payload.order_id
            );
        }

        delivery.ack(BasicAckOptions::default()).await?;

        Ok(())
    })
}
