use axum::{extract::{Query, State}, http::StatusCode, response::IntoResponse, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{message, parse_id, user_id_or_caller, AppJson, Caller, IdQuery, ProductUserQuery, SearchQuery};
use crate::domain::{Address, Cart, Order, Product, ProductSnapshot, User};
use crate::error::{EcommerceError, Result};
use crate::services::{LoginRequest, SignUpRequest};
use crate::state::AppState;

/// A user as returned over HTTP; never carries the password hash.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub token: String,
    pub refresh_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub addresses: Vec<Address>,
    pub cart: Cart,
    pub favorites: Vec<ProductSnapshot>,
    pub orders: Vec<Order>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id, first_name: user.first_name, last_name: user.last_name,
            email: user.email.into(), phone: user.phone, token: user.token, refresh_token: user.refresh_token,
            created_at: user.created_at, updated_at: user.updated_at,
            addresses: user.addresses, cart: user.cart, favorites: user.favorites, orders: user.orders,
        }
    }
}

#[derive(Debug, Serialize)]
struct SignUpResponse {
    message: &'static str,
    user_id: Uuid,
    token: String,
    refresh_token: String,
}

pub(super) async fn sign_up(State(state): State<AppState>, AppJson(request): AppJson<SignUpRequest>) -> Result<impl IntoResponse> {
    let user = state.users().sign_up(request).await?;
    let body = SignUpResponse { message: "Successfully signed up", user_id: user.user_id, token: user.token, refresh_token: user.refresh_token };
    Ok((StatusCode::CREATED, Json(body)))
}

pub(super) async fn login(State(state): State<AppState>, AppJson(request): AppJson<LoginRequest>) -> Result<Json<UserView>> {
    let user = state.users().login(request).await?;
    Ok(Json(user.into()))
}

pub(super) async fn user_info(State(state): State<AppState>, Extension(caller): Caller, Query(q): Query<IdQuery>) -> Result<Json<UserView>> {
    let user_id = user_id_or_caller(q.id.as_deref(), "id", &caller)?;
    Ok(Json(state.users().get_user(user_id).await?.into()))
}

pub(super) async fn user_delete(State(state): State<AppState>, Extension(caller): Caller, Query(q): Query<IdQuery>) -> Result<impl IntoResponse> {
    let user_id = user_id_or_caller(q.id.as_deref(), "id", &caller)?;
    state.users().delete_user(user_id).await?;
    Ok(message("Successfully deleted user"))
}

pub(super) async fn product_view(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.catalog().list_products().await?))
}

pub(super) async fn search(State(state): State<AppState>, Query(q): Query<SearchQuery>) -> Result<Json<Vec<Product>>> {
    let name = q.name.ok_or_else(|| EcommerceError::validation("name is empty"))?;
    Ok(Json(state.catalog().search_products(&name).await?))
}

pub(super) async fn add_favorite(State(state): State<AppState>, Extension(caller): Caller, Query(q): Query<ProductUserQuery>) -> Result<Json<Vec<ProductSnapshot>>> {
    let product_id = parse_id(q.id.as_deref(), "id")?;
    let user_id = user_id_or_caller(q.user_id.as_deref(), "user_id", &caller)?;
    Ok(Json(state.favorites().add_favorite(user_id, product_id).await?))
}

pub(super) async fn remove_favorite(State(state): State<AppState>, Extension(caller): Caller, Query(q): Query<ProductUserQuery>) -> Result<Json<Vec<ProductSnapshot>>> {
    let product_id = parse_id(q.id.as_deref(), "id")?;
    let user_id = user_id_or_caller(q.user_id.as_deref(), "user_id", &caller)?;
    Ok(Json(state.favorites().remove_favorite(user_id, product_id).await?))
}
