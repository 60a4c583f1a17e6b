use reqwest::Client;

use crate::core::aliases::DbPool;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: DbPool,
    pub http_client: Client,
}
