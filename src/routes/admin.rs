use axum::{extract::{Query, State}, http::StatusCode, response::IntoResponse, Json};

use super::{message, parse_id, AppJson, IdQuery};
use crate::domain::NewProduct;
use crate::error::Result;
use crate::state::AppState;

pub(super) async fn add_product(State(state): State<AppState>, AppJson(new): AppJson<NewProduct>) -> Result<impl IntoResponse> {
    let product = state.catalog().create_product(new).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub(super) async fn add_many_products(State(state): State<AppState>, AppJson(batch): AppJson<Vec<NewProduct>>) -> Result<impl IntoResponse> {
    let products = state.catalog().create_products(batch).await?;
    Ok((StatusCode::CREATED, Json(products)))
}

pub(super) async fn delete_product(State(state): State<AppState>, Query(q): Query<IdQuery>) -> Result<impl IntoResponse> {
    let product_id = parse_id(q.id.as_deref(), "id")?;
    state.catalog().delete_product(product_id).await?;
    Ok(message("Successfully deleted product"))
}
