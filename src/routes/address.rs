use axum::{extract::{Query, State}, http::StatusCode, response::IntoResponse, Extension, Json};

use super::{message, user_id_or_caller, AppJson, Caller, IdQuery};
use crate::domain::{Address, AddressFields, AddressRole};
use crate::error::Result;
use crate::state::AppState;

pub(super) async fn add_address(State(state): State<AppState>, Extension(caller): Caller, Query(q): Query<IdQuery>, AppJson(fields): AppJson<AddressFields>) -> Result<impl IntoResponse> {
    let user_id = user_id_or_caller(q.id.as_deref(), "id", &caller)?;
    let address = state.users().add_address(user_id, fields).await?;
    Ok((StatusCode::CREATED, Json(address)))
}

pub(super) async fn edit_home_address(State(state): State<AppState>, Extension(caller): Caller, Query(q): Query<IdQuery>, AppJson(fields): AppJson<AddressFields>) -> Result<Json<Address>> {
    let user_id = user_id_or_caller(q.id.as_deref(), "id", &caller)?;
    Ok(Json(state.users().edit_address(user_id, AddressRole::Home, fields).await?))
}

pub(super) async fn edit_work_address(State(state): State<AppState>, Extension(caller): Caller, Query(q): Query<IdQuery>, AppJson(fields): AppJson<AddressFields>) -> Result<Json<Address>> {
    let user_id = user_id_or_caller(q.id.as_deref(), "id", &caller)?;
    Ok(Json(state.users().edit_address(user_id, AddressRole::Work, fields).await?))
}

pub(super) async fn delete_addresses(State(state): State<AppState>, Extension(caller): Caller, Query(q): Query<IdQuery>) -> Result<impl IntoResponse> {
    let user_id = user_id_or_caller(q.id.as_deref(), "id", &caller)?;
    state.users().clear_addresses(user_id).await?;
    Ok(message("Successfully deleted addresses"))
}
