use chrono::{DateTime, Utc};
use diesel::{
    Selectable,
    prelude::{Insertable, Queryable},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// Orders

#[derive(Queryable, Selectable, Serialize, Debug, Clone, ToSchema)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderEntity {
    pub id: i32,
    pub store_id: i32,
    pub customer_id: i32,
    pub customer_name: String,
    pub total_amount: f32,
    pub status: String,
    pub shipping_address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub payment_method: String,
    pub phone: String,
    pub delivery_partner_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Deserialize, Debug)]
#[diesel(table_name = crate::schema::orders)]
pub struct CreateOrderEntity {
    pub store_id: i32,
    pub customer_id: i32,
    pub customer_name: String,
    pub total_amount: f32,
    pub status: String,
    pub shipping_address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub payment_method: String,
    pub phone: String,
}

// Order items

#[derive(Queryable, Selectable, Serialize, Debug, Clone, ToSchema)]
#[diesel(table_name = crate::schema::order_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemEntity {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub store_id: i32,
    pub quantity: i32,
    pub unit_price: f32,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Deserialize, Debug)]
#[diesel(table_name = crate::schema::order_items)]
pub struct CreateOrderItemEntity {
    pub order_id: i32,
    pub product_id: i32,
    pub store_id: i32,
    pub quantity: i32,
    pub unit_price: f32,
}

// Delivery partners

#[derive(Queryable, Selectable, Serialize, Debug, Clone, ToSchema)]
#[diesel(table_name = crate::schema::delivery_partners)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DeliveryPartnerEntity {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub callback_url: String,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
