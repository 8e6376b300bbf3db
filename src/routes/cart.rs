use axum::{extract::{Query, State}, Extension, Json};

use super::{parse_id, user_id_or_caller, CartQuery, Caller, IdQuery, InstantBuyQuery};
use crate::domain::Order;
use crate::error::Result;
use crate::services::CartView;
use crate::state::AppState;

pub(super) async fn add_to_cart(State(state): State<AppState>, Extension(caller): Caller, Query(q): Query<CartQuery>) -> Result<Json<CartView>> {
    let product_id = parse_id(q.id.as_deref(), "id")?;
    let user_id = user_id_or_caller(q.userid.as_deref(), "userid", &caller)?;
    Ok(Json(state.cart().add_to_cart(user_id, product_id).await?))
}

pub(super) async fn remove_item(State(state): State<AppState>, Extension(caller): Caller, Query(q): Query<CartQuery>) -> Result<Json<CartView>> {
    let product_id = parse_id(q.id.as_deref(), "id")?;
    let user_id = user_id_or_caller(q.userid.as_deref(), "userid", &caller)?;
    Ok(Json(state.cart().remove_from_cart(user_id, product_id).await?))
}

pub(super) async fn list_cart(State(state): State<AppState>, Extension(caller): Caller, Query(q): Query<IdQuery>) -> Result<Json<CartView>> {
    let user_id = user_id_or_caller(q.id.as_deref(), "id", &caller)?;
    Ok(Json(state.cart().list_cart(user_id).await?))
}

pub(super) async fn checkout(State(state): State<AppState>, Extension(caller): Caller, Query(q): Query<IdQuery>) -> Result<Json<Order>> {
    let user_id = user_id_or_caller(q.id.as_deref(), "id", &caller)?;
    Ok(Json(state.cart().buy_from_cart(user_id).await?))
}

pub(super) async fn instant_buy(State(state): State<AppState>, Extension(caller): Caller, Query(q): Query<InstantBuyQuery>) -> Result<Json<Order>> {
    let product_id = parse_id(q.pid.as_deref(), "pid")?;
    let user_id = user_id_or_caller(q.userid.as_deref(), "userid", &caller)?;
    Ok(Json(state.cart().instant_buy(user_id, product_id).await?))
}
