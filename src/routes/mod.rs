pub mod delivery_partners;
pub mod order_items;
pub mod orders;
