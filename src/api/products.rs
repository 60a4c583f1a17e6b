use std::collections::HashMap;

use anyhow::{Context, Result};
use reqwest::Client;

use crate::api::ApiUrls;
use crate::core::app_error::AppError;
use crate::projection::ProductMetadata;

/// Fetches display metadata for a batch of products from the catalog
/// service. Products the catalog no longer knows about are simply absent
/// from the returned map.
pub async fn get_product_metadata(
    client: Client,
    ids: Vec<i32>,
) -> Result<HashMap<i32, ProductMetadata>> {
    let url = ApiUrls::get_catalog_service_url();
    let ids_query = ids
        .into_iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",");

    let products: Vec<ProductMetadata> = client
        .get(format!("{url}/products"))
        .query(&[("ids", ids_query)])
        .send()
        .await
        .map_err(|_| AppError::ServiceUnreachable("CatalogService".into()))?
        .json()
        .await
        .context("Failed to parse JSON")?;

    let metadata: HashMap<i32, ProductMetadata> =
        products.into_iter().map(|p| (p.id, p)).collect();

    Ok(metadata)
}
