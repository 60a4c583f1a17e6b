use std::fmt;
use std::str::FromStr;

use crate::models::OrderEntity;

/// Lifecycle states an order moves through. The seller dashboard may set any
/// non-terminal order to any of these values; forward-only ordering is not
/// enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Pending,
    Processing,
    ReadyForPickup,
    AssignedForDelivery,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::ReadyForPickup,
        OrderStatus::AssignedForDelivery,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Status strings that refuse further transitions, in the stored form
    /// used by `orders.status` filters.
    pub const TERMINAL: [&'static str; 2] = [
        OrderStatus::Delivered.as_str(),
        OrderStatus::Cancelled.as_str(),
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::ReadyForPickup => "ready_for_pickup",
            OrderStatus::AssignedForDelivery => "assigned_for_delivery",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Terminal orders accept no further transitions or assignments.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("'{0}' is not a recognized order status")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "ready_for_pickup" => Ok(OrderStatus::ReadyForPickup),
            "assigned_for_delivery" => Ok(OrderStatus::AssignedForDelivery),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Keeps only the orders whose persisted status matches `status`.
pub fn filter_by_status(orders: Vec<OrderEntity>, status: OrderStatus) -> Vec<OrderEntity> {
    orders
        .into_iter()
        .filter(|order| order.status == status.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn order(id: i32, status: &str) -> OrderEntity {
        OrderEntity {
            id,
            store_id: 1,
            customer_id: 10,
            customer_name: "Asha".into(),
            total_amount: 500.0,
            status: status.into(),
            shipping_address: "12 Market Road".into(),
            latitude: None,
            longitude: None,
            payment_method: "cod".into(),
            phone: "9999999999".into(),
            delivery_partner_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn every_status_round_trips_through_parse() {
        for status in OrderStatus::ALL {
            let parsed: OrderStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = "paid".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err.to_string(), "'paid' is not a recognized order status");
        assert!("PENDING".parse::<OrderStatus>().is_err());
        assert!("".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn only_delivered_and_cancelled_are_terminal() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        for status in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::ReadyForPickup,
            OrderStatus::AssignedForDelivery,
            OrderStatus::Shipped,
        ] {
            assert!(!status.is_terminal());
        }
    }

    #[test]
    fn terminal_list_agrees_with_is_terminal() {
        for status in OrderStatus::ALL {
            assert_eq!(
                OrderStatus::TERMINAL.contains(&status.as_str()),
                status.is_terminal()
            );
        }
        assert_eq!(OrderStatus::TERMINAL.len(), 2);
    }

    #[test]
    fn filter_returns_exactly_the_matching_subset() {
        let orders = vec![
            order(1, "pending"),
            order(2, "delivered"),
            order(3, "pending"),
        ];
        let pending = filter_by_status(orders, OrderStatus::Pending);
        let ids: Vec<i32> = pending.iter().map(|order| order.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn filter_on_empty_list_returns_empty() {
        let delivered = filter_by_status(Vec::new(), OrderStatus::Delivered);
        assert!(delivered.is_empty());
    }
}
