//! services/api/src/web/catalog.rs
//!
//! Public read-only endpoints: the style catalog and the live price preview.

use axum::{
    extract::{Query, State},
    Json,
};
use painting_order_core::{catalog::load_active_styles, pricing::compute_price_for_label};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::error::ApiResult;
use crate::web::rest::{PriceResponse, StyleResponse};
use crate::web::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PricingQuery {
    /// Canvas size label, e.g. `50x70`.
    pub canvas_size: String,
    #[serde(default)]
    pub is_rush: bool,
}

/// GET /styles - The active painting styles
#[utoipa::path(
    get,
    path = "/styles",
    responses(
        (status = 200, description = "Active styles in catalog order", body = [StyleResponse]),
        (status = 503, description = "Catalog unavailable")
    )
)]
pub async fn list_styles_handler(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<StyleResponse>>> {
    let styles = load_active_styles(state.ports.catalog.as_ref()).await?;
    Ok(Json(styles.iter().map(StyleResponse::from).collect()))
}

/// GET /pricing - Price for a size and rush flag
#[utoipa::path(
    get,
    path = "/pricing",
    params(PricingQuery),
    responses(
        (status = 200, description = "Price breakdown", body = PriceResponse),
        (status = 422, description = "Unknown canvas size")
    )
)]
pub async fn pricing_handler(Query(query): Query<PricingQuery>) -> ApiResult<Json<PriceResponse>> {
    let price = compute_price_for_label(&query.canvas_size, query.is_rush)?;
    Ok(Json(price.into()))
}
