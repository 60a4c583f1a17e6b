pub mod deliveries;
pub mod orders;
