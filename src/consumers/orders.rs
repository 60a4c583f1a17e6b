use std::sync::Arc;

use anyhow::{Context, Result};
use diesel::SelectableHelper;
use diesel_async::{AsyncConnection, RunQueryDsl};
use futures::future::BoxFuture;
use lapin::{message::Delivery, options::BasicAckOptions};
use tracing::info;

use crate::core::app_state::AppState;
use crate::events::OrderPlacedEvent;
use crate::models::{CreateOrderEntity, CreateOrderItemEntity, OrderEntity};
use crate::schema::{order_items, orders};
use crate::status::OrderStatus;

/// Records an order placed by the checkout service, items included, in a
/// single transaction. New orders always start out `pending`.
pub fn order_placed(delivery: Delivery, state: Arc<AppState>) -> BoxFuture<'static, Result<()>> {
    Box::pin(async move {
        let conn = &mut state.db_pool.get().await?;
        let payload: OrderPlacedEvent = serde_json::from_str(str::from_utf8(&delivery.data)?)?;
        info!("Received event: {:?}", payload);

        let order = conn
            .transaction(move |conn| {
                Box::pin(async move {
                    let order = diesel::insert_into(orders::table)
                        .values(CreateOrderEntity {
                            store_id: payload.store_id,
                            customer_id: payload.customer_id,
                            customer_name: payload.customer_name,
                            total_amount: payload.total_amount,
                            status: OrderStatus::Pending.to_string(),
                            shipping_address: payload.shipping_address,
                            latitude: payload.latitude,
                            longitude: payload.longitude,
                            payment_method: payload.payment_method,
                            phone: payload.phone,
                        })
                        .returning(OrderEntity::as_returning())
                        .get_result(conn)
                        .await
                        .context("Failed to create order")?;

                    let items: Vec<CreateOrderItemEntity> = payload
                        .items
                        .iter()
                        .map(|item| CreateOrderItemEntity {
                            order_id: order.id,
                            product_id: item.product_id,
                            store_id: order.store_id,
                            quantity: item.quantity,
                            unit_price: item.unit_price,
                        })
                        .collect();

                    diesel::insert_into(order_items::table)
                        .values(&items)
                        .execute(conn)
                        .await
                        .context("Failed to create order items")?;

                    Ok::<OrderEntity, anyhow::Error>(order)
                })
            })
            .await
            .context("Transaction failed")?;

        info!("Order #{} has been recorded", order.id);

        delivery.ack(BasicAckOptions::default()).await?;

        Ok(())
    })
}
