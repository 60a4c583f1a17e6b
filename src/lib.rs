pub mod api;
pub mod consumers;
pub mod core;
pub mod dispatch;
pub mod events;
pub mod models;
pub mod projection;
pub mod routes;
pub mod schema;
pub mod status;
