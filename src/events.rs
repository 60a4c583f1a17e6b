use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Published through the outbox after a successful status transition so
/// other services (and the seller dashboard gateway) refetch instead of
/// polling.
#[derive(Serialize, Deserialize, Debug)]
pub struct OrderStatusChangedEvent {
    pub order_id: i32,
    pub status: String,
}

/// Published when a broadcast to delivery partners has been dispatched; the
/// assignment service uses it to open a first-accept-wins claim window.
#[derive(Serialize, Deserialize, Debug)]
pub struct DeliveryRequestedEvent {
    pub order_id: i32,
    pub store_id: i32,
    pub message: String,
}

/// Emitted by the assignment service once exactly one partner has claimed
/// the order. At-most-one-winner is its invariant to uphold, not ours.
#[derive(Serialize, Deserialize, Debug)]
pub struct PartnerAssignedEvent {
    pub order_id: i32,
    pub partner_id: Uuid,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct DeliveryCompletedEvent {
    pub order_id: i32,
}

/// Emitted by the checkout service when a customer places an order.
#[derive(Serialize, Deserialize, Debug)]
pub struct OrderPlacedEvent {
    pub store_id: i32,
    pub customer_id: i32,
    pub customer_name: String,
    pub total_amount: f32,
    pub shipping_address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub payment_method: String,
    pub phone: String,
    pub items: Vec<PlacedOrderItem>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct PlacedOrderItem {
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price: f32,
}
