use axum::{extract::Request, middleware::Next, response::Response};

use crate::core::app_error::AppError;

/// Resolves the calling seller's store from the `x-store-id` header set by
/// the gateway and exposes it as an `Extension<i32>` for handlers.
pub async fn sellers_authorization(mut req: Request, next: Next) -> Result<Response, AppError> {
    let store_id = req
        .headers()
        .get("x-store-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<i32>().ok())
        .ok_or(AppError::Unauthorized)?;

    req.extensions_mut().insert(store_id);
    Ok(next.run(req).await)
}
