use anyhow::Result;
use axum::Router;
use bazaar_orderservice::core::{
    bootstrap::{self, bootstrap},
    config, db, swagger,
};
use bazaar_orderservice::{consumers, routes};
use diesel_migrations::{EmbeddedMigrations, embed_migrations};

/// Migrations embedded into the binary which helps with streamlining image building process
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[tokio::main]
async fn main() -> Result<()> {
    bootstrap::init_tracing();
    bootstrap::init_env();

    let routes = routes::orders::routes_with_openapi()
        .merge(routes::order_items::routes_with_openapi())
        .merge(routes::delivery_partners::routes_with_openapi());

    let mut openapi = routes.get_openapi().clone();
    openapi.info = utoipa::openapi::InfoBuilder::new()
        .title("Bazaar OrderService API")
        .version("1.0.0")
        .build();
    let swagger_ui = swagger::create_swagger_ui(openapi)?;

    let app = Router::new().merge(routes).merge(swagger_ui);

    tracing::info!("Running migrations...");
    let config = config::load()?;
    let migrations_count = db::run_migrations_blocking(MIGRATIONS, &config.database.url).await?;
    tracing::info!("Run {} new migrations successfully", migrations_count);

    tracing::info!("Bootstrapping...");
    bootstrap(
        "OrderService",
        app,
        &[
            ("orders.order_placed", consumers::orders::order_placed),
            (
                "deliveries.partner_assigned",
                consumers::deliveries::partner_assigned,
            ),
            (
                "deliveries.delivery_completed",
                consumers::deliveries::delivery_completed,
            ),
        ],
    )
    .await?;
    Ok(())
}
