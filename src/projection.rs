use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{OrderEntity, OrderItemEntity};

/// Catalog metadata joined onto order items for display. May be missing
/// entirely when the product was deleted or never linked.
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct ProductMetadata {
    pub id: i32,
    pub name: String,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct OrderItemView {
    pub product_id: i32,
    pub name: String,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub quantity: i32,
    pub unit_price: f32,
    pub subtotal: f32,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct OrderView {
    pub order_id: i32,
    pub status: String,
    pub total_amount: f32,
    pub items_total: f32,
    pub items: Vec<OrderItemView>,
}

/// Projects one item for display. A missed product lookup degrades the view
/// instead of failing it: the name falls back to `Product #<id>` and the
/// optional metadata fields stay empty.
pub fn project_item(item: &OrderItemEntity, product: Option<&ProductMetadata>) -> OrderItemView {
    let name = product
        .map(|product| product.name.clone())
        .unwrap_or_else(|| format!("Product #{}", item.product_id));

    OrderItemView {
        product_id: item.product_id,
        name,
        image_url: product.and_then(|product| product.image_url.clone()),
        description: product.and_then(|product| product.description.clone()),
        category: product.and_then(|product| product.category.clone()),
        quantity: item.quantity,
        unit_price: item.unit_price,
        subtotal: item.unit_price * item.quantity as f32,
    }
}

/// Assembles the full order view. `items_total` is the sum of the snapshot
/// subtotals; the persisted `total_amount` is reported as-is and not
/// reconciled against it.
pub fn project_order(
    order: &OrderEntity,
    items: &[OrderItemEntity],
    products: &HashMap<i32, ProductMetadata>,
) -> OrderView {
    let items: Vec<OrderItemView> = items
        .iter()
        .map(|item| project_item(item, products.get(&item.product_id)))
        .collect();
    let items_total = items.iter().map(|view| view.subtotal).sum();

    OrderView {
        order_id: order.id,
        status: order.status.clone(),
        total_amount: order.total_amount,
        items_total,
        items,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn item(product_id: i32, quantity: i32, unit_price: f32) -> OrderItemEntity {
        OrderItemEntity {
            id: 1,
            order_id: 7,
            product_id,
            store_id: 3,
            quantity,
            unit_price,
            created_at: Utc::now(),
        }
    }

    fn metadata(id: i32, name: &str) -> ProductMetadata {
        ProductMetadata {
            id,
            name: name.into(),
            image_url: Some("https://cdn.example/pakora.jpg".into()),
            description: Some("Crispy onion pakora".into()),
            category: Some("Snacks".into()),
        }
    }

    #[test]
    fn missed_lookup_falls_back_to_product_id() {
        let view = project_item(&item(42, 2, 30.0), None);
        assert_eq!(view.name, "Product #42");
        assert_eq!(view.image_url, None);
        assert_eq!(view.description, None);
        assert_eq!(view.category, None);
        assert_eq!(view.subtotal, 60.0);
    }

    #[test]
    fn resolved_lookup_carries_metadata_through() {
        let product = metadata(42, "Onion Pakora");
        let view = project_item(&item(42, 3, 25.0), Some(&product));
        assert_eq!(view.name, "Onion Pakora");
        assert_eq!(view.image_url.as_deref(), Some("https://cdn.example/pakora.jpg"));
        assert_eq!(view.category.as_deref(), Some("Snacks"));
        assert_eq!(view.subtotal, 75.0);
    }

    #[test]
    fn order_view_sums_item_subtotals_without_touching_stored_total() {
        let order = OrderEntity {
            id: 7,
            store_id: 3,
            customer_id: 10,
            customer_name: "Asha".into(),
            total_amount: 500.0,
            status: "pending".into(),
            shipping_address: "12 Market Road".into(),
            latitude: None,
            longitude: None,
            payment_method: "upi".into(),
            phone: "9999999999".into(),
            delivery_partner_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let items = vec![item(42, 2, 30.0), item(43, 1, 100.0)];
        let mut products = HashMap::new();
        products.insert(42, metadata(42, "Onion Pakora"));

        let view = project_order(&order, &items, &products);
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.items[0].name, "Onion Pakora");
        assert_eq!(view.items[1].name, "Product #43");
        assert_eq!(view.items_total, 160.0);
        // Stored total is reported verbatim even though it disagrees.
        assert_eq!(view.total_amount, 500.0);
    }
}
